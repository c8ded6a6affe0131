use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    DatabaseConnection, PaginatorTrait, QueryFilter,
    entity::prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::ride;
use crate::core::{CRUDResource, ResourcePayload, set_optional, set_required};
use crate::errors::ApiError;
use crate::validation::{
    ValidationErrors, ValidationMode, optional, required,
    validators::{validate_email, validate_max_length, validate_text},
};

const NAME_MAX: usize = 255;
const EMAIL_MAX: usize = 254;
const PHONE_MAX: usize = 20;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ride::Entity")]
    Rides,
}

impl Related<super::ride::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rides.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A person who rents vehicles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Set by the server when the record is created
    pub created: DateTime<Utc>,
}

impl From<Model> for Customer {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            created: model.created,
        }
    }
}

/// Body of create, replace and partial update requests.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct CustomerPayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub first_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub last_name: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub email: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>, nullable)]
    pub phone: Option<Option<String>>,
}

impl ResourcePayload<ActiveModel> for CustomerPayload {
    fn validate(&self, mode: ValidationMode, errors: &mut ValidationErrors) {
        if let Some(first_name) = required(errors, mode, "first_name", &self.first_name) {
            validate_text(errors, "first_name", first_name, NAME_MAX);
        }
        if let Some(last_name) = required(errors, mode, "last_name", &self.last_name) {
            validate_text(errors, "last_name", last_name, NAME_MAX);
        }
        if let Some(email) = optional(&self.email) {
            validate_email(errors, "email", email);
            validate_max_length(errors, "email", email, EMAIL_MAX);
        }
        if let Some(phone) = optional(&self.phone) {
            validate_max_length(errors, "phone", phone, PHONE_MAX);
        }
    }

    fn merge_into_activemodel(self, mut model: ActiveModel) -> Result<ActiveModel, ApiError> {
        set_required(&mut model.first_name, "first_name", self.first_name)?;
        set_required(&mut model.last_name, "last_name", self.last_name)?;
        set_optional(&mut model.email, self.email);
        set_optional(&mut model.phone, self.phone);
        Ok(model)
    }
}

#[async_trait]
impl CRUDResource for Customer {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type Payload = CustomerPayload;

    const RESOURCE_NAME_SINGULAR: &'static str = "customer";
    const RESOURCE_NAME_PLURAL: &'static str = "customers";

    fn id(&self) -> Uuid {
        self.id
    }

    fn new_active_model() -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            first_name: NotSet,
            last_name: NotSet,
            email: Set(None),
            phone: Set(None),
            created: Set(Utc::now()),
        }
    }

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("first_name", Column::FirstName),
            ("last_name", Column::LastName),
            ("email", Column::Email),
            ("phone", Column::Phone),
            ("created", Column::Created),
        ]
    }

    async fn validate_with_store(
        db: &DatabaseConnection,
        payload: &CustomerPayload,
        existing: Option<&Model>,
        errors: &mut ValidationErrors,
    ) -> Result<(), ApiError> {
        let Some(email) = optional(&payload.email) else {
            return Ok(());
        };
        let mut query = Entity::find().filter(Column::Email.eq(email.as_str()));
        if let Some(existing) = existing {
            query = query.filter(Column::Id.ne(existing.id));
        }
        if query.count(db).await? > 0 {
            errors.add("email", "customer with this email already exists.");
        }
        Ok(())
    }

    /// Rides outlive their customer; the reference is cleared.
    async fn before_delete(db: &DatabaseConnection, existing: &Model) -> Result<(), ApiError> {
        let cleared = ride::Entity::update_many()
            .col_expr(ride::Column::CustomerId, Expr::value(Option::<Uuid>::None))
            .filter(ride::Column::CustomerId.eq(existing.id))
            .exec(db)
            .await?;
        if cleared.rows_affected > 0 {
            tracing::info!(
                customer = %existing.id,
                rides = cleared.rows_affected,
                "Detached rides from deleted customer"
            );
        }
        Ok(())
    }
}

crate::crud_handlers!(
    Customer,
    CustomerPayload,
    "customers",
    "/customers/",
    "/customers/{id}"
);

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::IntoActiveModel;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> CustomerPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_absent_and_null_are_distinct() {
        let p = payload(json!({"first_name": "Ada", "email": null}));
        assert_eq!(p.first_name, Some(Some("Ada".to_string())));
        assert_eq!(p.email, Some(None));
        assert_eq!(p.phone, None);
    }

    #[test]
    fn test_create_requires_names() {
        let mut errors = ValidationErrors::new();
        payload(json!({"email": "ada@example.com"})).validate(ValidationMode::Create, &mut errors);
        assert!(errors.has_field("first_name"));
        assert!(errors.has_field("last_name"));
        assert!(!errors.has_field("email"));
    }

    #[test]
    fn test_partial_checks_only_present_fields() {
        let mut errors = ValidationErrors::new();
        payload(json!({"phone": "+44 20 7946 0000"})).validate(ValidationMode::Partial, &mut errors);
        assert!(errors.is_empty());

        payload(json!({"email": "not-an-email", "phone": "0".repeat(21)}))
            .validate(ValidationMode::Partial, &mut errors);
        assert!(errors.has_field("email"));
        assert!(errors.has_field("phone"));
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let id = Uuid::new_v4();
        let stored = Model {
            id,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            phone: None,
            created: Utc::now(),
        };
        let merged = payload(json!({"phone": "555-0100", "email": null}))
            .merge_into_activemodel(stored.clone().into_active_model())
            .unwrap();
        assert_eq!(merged.first_name, sea_orm::ActiveValue::Unchanged("Ada".to_string()));
        assert_eq!(merged.phone, Set(Some("555-0100".to_string())));
        assert_eq!(merged.email, Set(None));
    }

    #[test]
    fn test_merge_rejects_null_name() {
        let err = payload(json!({"last_name": null}))
            .merge_into_activemodel(Customer::new_active_model())
            .unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }
}
