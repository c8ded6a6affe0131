use async_trait::async_trait;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    DatabaseConnection, PaginatorTrait, QueryFilter,
    entity::prelude::*,
    sea_query::StringLen,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ride;
use crate::core::{CRUDResource, ResourcePayload, set_required};
use crate::errors::ApiError;
use crate::validation::{
    ValidationErrors, ValidationMode, not_null, required,
    validators::{validate_min, validate_text},
};

const TEXT_MAX: usize = 50;

/// What a vehicle runs on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    #[sea_orm(string_value = "gasoline")]
    Gasoline,
    #[sea_orm(string_value = "diesel")]
    Diesel,
    #[sea_orm(string_value = "electric")]
    #[serde(alias = "ev")]
    Electric,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[sea_orm(unique)]
    pub registration: String,
    pub seats: i32,
    pub fuel: FuelType,
    pub available: bool,
    pub odometer: i32,
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

/// A car in the rental fleet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Vehicle {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub registration: String,
    pub seats: i32,
    pub fuel: FuelType,
    pub available: bool,
    /// Total distance driven; advanced when rides complete
    pub odometer: i32,
}

impl From<Model> for Vehicle {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            make: model.make,
            model: model.model,
            year: model.year,
            registration: model.registration,
            seats: model.seats,
            fuel: model.fuel,
            available: model.available,
            odometer: model.odometer,
        }
    }
}

/// Body of create, replace and partial update requests.
///
/// `available` defaults to `true` and `odometer` to `0` on create.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct VehiclePayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub make: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub model: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub year: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub registration: Option<Option<String>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub seats: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<FuelType>)]
    pub fuel: Option<Option<FuelType>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<bool>)]
    pub available: Option<Option<bool>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>)]
    pub odometer: Option<Option<i32>>,
}

impl ResourcePayload<ActiveModel> for VehiclePayload {
    fn validate(&self, mode: ValidationMode, errors: &mut ValidationErrors) {
        if let Some(make) = required(errors, mode, "make", &self.make) {
            validate_text(errors, "make", make, TEXT_MAX);
        }
        if let Some(model) = required(errors, mode, "model", &self.model) {
            validate_text(errors, "model", model, TEXT_MAX);
        }
        required(errors, mode, "year", &self.year);
        if let Some(registration) = required(errors, mode, "registration", &self.registration) {
            validate_text(errors, "registration", registration, TEXT_MAX);
        }
        if let Some(seats) = required(errors, mode, "seats", &self.seats) {
            validate_min(errors, "seats", *seats, 1);
        }
        required(errors, mode, "fuel", &self.fuel);
        not_null(errors, "available", &self.available);
        if let Some(odometer) = not_null(errors, "odometer", &self.odometer) {
            validate_min(errors, "odometer", odometer, 0);
        }
    }

    fn merge_into_activemodel(self, mut active: ActiveModel) -> Result<ActiveModel, ApiError> {
        set_required(&mut active.make, "make", self.make)?;
        set_required(&mut active.model, "model", self.model)?;
        set_required(&mut active.year, "year", self.year)?;
        set_required(&mut active.registration, "registration", self.registration)?;
        set_required(&mut active.seats, "seats", self.seats)?;
        set_required(&mut active.fuel, "fuel", self.fuel)?;
        set_required(&mut active.available, "available", self.available)?;
        set_required(&mut active.odometer, "odometer", self.odometer)?;
        Ok(active)
    }
}

#[async_trait]
impl CRUDResource for Vehicle {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type Payload = VehiclePayload;

    const RESOURCE_NAME_SINGULAR: &'static str = "vehicle";
    const RESOURCE_NAME_PLURAL: &'static str = "vehicles";

    fn id(&self) -> Uuid {
        self.id
    }

    fn new_active_model() -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            make: NotSet,
            model: NotSet,
            year: NotSet,
            registration: NotSet,
            seats: NotSet,
            fuel: NotSet,
            available: Set(true),
            odometer: Set(0),
        }
    }

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("make", Column::Make),
            ("model", Column::Model),
            ("year", Column::Year),
            ("registration", Column::Registration),
            ("seats", Column::Seats),
            ("fuel", Column::Fuel),
            ("available", Column::Available),
            ("odometer", Column::Odometer),
        ]
    }

    /// `?fuel=` accepts the same aliases as request bodies.
    fn canonical_filter_value<'a>(field: &str, raw: &'a str) -> Cow<'a, str> {
        if field == "fuel" {
            if let Ok(fuel) = serde_json::from_value::<FuelType>(raw.trim().into()) {
                return Cow::Owned(fuel.to_value());
            }
        }
        Cow::Borrowed(raw)
    }

    async fn validate_with_store(
        db: &DatabaseConnection,
        payload: &VehiclePayload,
        existing: Option<&Model>,
        errors: &mut ValidationErrors,
    ) -> Result<(), ApiError> {
        let Some(Some(registration)) = &payload.registration else {
            return Ok(());
        };
        let mut query = Entity::find().filter(Column::Registration.eq(registration.as_str()));
        if let Some(existing) = existing {
            query = query.filter(Column::Id.ne(existing.id));
        }
        if query.count(db).await? > 0 {
            errors.add(
                "registration",
                "vehicle with this registration already exists.",
            );
        }
        Ok(())
    }

    /// A vehicle with ride history cannot be deleted.
    async fn before_delete(db: &DatabaseConnection, existing: &Model) -> Result<(), ApiError> {
        let rides = ride::Entity::find()
            .filter(ride::Column::VehicleId.eq(existing.id))
            .count(db)
            .await?;
        if rides > 0 {
            tracing::warn!(vehicle = %existing.id, rides, "Refusing to delete vehicle with rides");
            return Err(ApiError::conflict(format!(
                "Cannot delete vehicle: it is referenced by {rides} ride(s)."
            )));
        }
        Ok(())
    }
}

crate::crud_handlers!(
    Vehicle,
    VehiclePayload,
    "vehicles",
    "/vehicles/",
    "/vehicles/{id}"
);
