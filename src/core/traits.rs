use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ActiveValue, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryFilter, Value, entity::prelude::*,
};
use serde::{Serialize, de::DeserializeOwned};
use std::borrow::Cow;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::validation::{ValidationErrors, ValidationMode};

/// The serialization contract of a resource: raw request input that can be
/// checked and then folded into an active model.
///
/// Create, replace and partial update share one payload type. Every field is
/// optional so that "absent" can be told apart from `null`; the
/// [`ValidationMode`] decides which fields are required.
pub trait ResourcePayload<ActiveModelType>: DeserializeOwned + Send + Sync {
    /// Record every stateless field problem into `errors`.
    fn validate(&self, mode: ValidationMode, errors: &mut ValidationErrors);

    /// Merge the fields present in this payload into an active model.
    ///
    /// # Errors
    ///
    /// Returns a `BadRequest` if a required field is explicitly `null`.
    fn merge_into_activemodel(self, existing: ActiveModelType) -> Result<ActiveModelType, ApiError>;
}

/// Merge a required field: absent leaves the target alone, `null` is refused.
///
/// # Errors
///
/// Returns `BadRequest` when the payload sets the field to `null`.
pub fn set_required<T>(
    target: &mut ActiveValue<T>,
    field: &str,
    value: Option<Option<T>>,
) -> Result<(), ApiError>
where
    T: Into<Value>,
{
    match value {
        Some(Some(value)) => {
            *target = ActiveValue::Set(value);
            Ok(())
        }
        Some(None) => Err(ApiError::bad_request(format!(
            "Field '{field}' is required and cannot be set to null"
        ))),
        None => Ok(()),
    }
}

/// Merge a nullable field: absent leaves the target alone, `null` clears it.
pub fn set_optional<T>(target: &mut ActiveValue<Option<T>>, value: Option<Option<T>>)
where
    Option<T>: Into<Value>,
{
    if let Some(value) = value {
        *target = ActiveValue::Set(value);
    }
}

/// One entity kind exposed through the generic resource handlers.
///
/// Implementors pick the store (`EntityType`), the wire shape (`Self`, built
/// from the stored model) and the payload contract; the default methods carry
/// list, get, create, replace, partial update and delete. Kinds with extra
/// rules override the `validate_with_store` hook and the `before_*` hooks.
#[async_trait]
pub trait CRUDResource: Sized + Serialize + Send + Sync
where
    Self::EntityType: EntityTrait + Sync,
    Self::ActiveModelType: ActiveModelTrait + ActiveModelBehavior + Send + Sync,
    <Self::EntityType as EntityTrait>::Model: Sync + IntoActiveModel<Self::ActiveModelType>,
    <<Self::EntityType as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
    Self: From<<Self::EntityType as EntityTrait>::Model>,
{
    type EntityType: EntityTrait + Sync;
    type ColumnType: ColumnTrait + std::fmt::Debug;
    type ActiveModelType: ActiveModelTrait<Entity = Self::EntityType>;
    type Payload: ResourcePayload<Self::ActiveModelType>;

    const RESOURCE_NAME_SINGULAR: &'static str;
    const RESOURCE_NAME_PLURAL: &'static str;

    fn id(&self) -> Uuid;

    /// A fresh active model with the identity assigned and defaults filled in.
    /// Required fields stay `NotSet` until a validated payload is merged.
    fn new_active_model() -> Self::ActiveModelType;

    /// Query parameters that narrow a listing, paired with the column they compare.
    fn filterable_columns() -> Vec<(&'static str, Self::ColumnType)>;

    /// Rewrite a raw filter value into its stored form before type coercion.
    fn canonical_filter_value<'a>(_field: &str, raw: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(raw)
    }

    async fn get_all(db: &DatabaseConnection, condition: Condition) -> Result<Vec<Self>, ApiError> {
        let models = Self::EntityType::find().filter(condition).all(db).await?;
        Ok(models.into_iter().map(Self::from).collect())
    }

    async fn fetch_model(
        db: &DatabaseConnection,
        id: Uuid,
    ) -> Result<<Self::EntityType as EntityTrait>::Model, ApiError> {
        Self::EntityType::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ApiError::not_found(Self::RESOURCE_NAME_SINGULAR, Some(id.to_string())))
    }

    async fn get_one(db: &DatabaseConnection, id: Uuid) -> Result<Self, ApiError> {
        Ok(Self::from(Self::fetch_model(db, id).await?))
    }

    /// Store-aware checks (uniqueness, references). `existing` is the stored
    /// record on replace and partial update, `None` on create.
    async fn validate_with_store(
        _db: &DatabaseConnection,
        _payload: &Self::Payload,
        _existing: Option<&<Self::EntityType as EntityTrait>::Model>,
        _errors: &mut ValidationErrors,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    /// Run the payload's own checks and the store-aware checks together.
    async fn validate(
        db: &DatabaseConnection,
        payload: &Self::Payload,
        mode: ValidationMode,
        existing: Option<&<Self::EntityType as EntityTrait>::Model>,
    ) -> Result<(), ApiError> {
        let mut errors = ValidationErrors::new();
        payload.validate(mode, &mut errors);
        Self::validate_with_store(db, payload, existing, &mut errors).await?;
        errors.result().map_err(ApiError::validation_failed)
    }

    /// Runs after create validation succeeded and before the record is inserted.
    async fn before_create(_db: &DatabaseConnection, _payload: &Self::Payload) -> Result<(), ApiError> {
        Ok(())
    }

    async fn create(db: &DatabaseConnection, payload: Self::Payload) -> Result<Self, ApiError> {
        Self::validate(db, &payload, ValidationMode::Create, None).await?;
        Self::before_create(db, &payload).await?;
        let active_model = payload.merge_into_activemodel(Self::new_active_model())?;
        let created = Self::from(active_model.insert(db).await?);
        tracing::info!(
            resource = Self::RESOURCE_NAME_SINGULAR,
            id = %created.id(),
            "Created record"
        );
        Ok(created)
    }

    /// Runs after validation succeeded and before the record is written.
    async fn before_update(
        _db: &DatabaseConnection,
        _existing: &<Self::EntityType as EntityTrait>::Model,
        _payload: &Self::Payload,
        _mode: ValidationMode,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    /// Shared flow of replace and partial update: load, validate, hook, write.
    async fn apply_update(
        db: &DatabaseConnection,
        id: Uuid,
        payload: Self::Payload,
        mode: ValidationMode,
    ) -> Result<Self, ApiError> {
        let existing = Self::fetch_model(db, id).await?;
        Self::validate(db, &payload, mode, Some(&existing)).await?;
        Self::before_update(db, &existing, &payload, mode).await?;

        let active_model = payload.merge_into_activemodel(existing.clone().into_active_model())?;
        if !active_model.is_changed() {
            return Ok(Self::from(existing));
        }
        let updated = active_model.update(db).await?;
        tracing::info!(
            resource = Self::RESOURCE_NAME_SINGULAR,
            id = %id,
            partial = mode.is_partial(),
            "Updated record"
        );
        Ok(Self::from(updated))
    }

    async fn replace(
        db: &DatabaseConnection,
        id: Uuid,
        payload: Self::Payload,
    ) -> Result<Self, ApiError> {
        Self::apply_update(db, id, payload, ValidationMode::Replace).await
    }

    async fn partial_update(
        db: &DatabaseConnection,
        id: Uuid,
        payload: Self::Payload,
    ) -> Result<Self, ApiError> {
        Self::apply_update(db, id, payload, ValidationMode::Partial).await
    }

    /// Refuse or prepare a deletion, e.g. when other records depend on this one.
    async fn before_delete(
        _db: &DatabaseConnection,
        _existing: &<Self::EntityType as EntityTrait>::Model,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<Uuid, ApiError> {
        let existing = Self::fetch_model(db, id).await?;
        Self::before_delete(db, &existing).await?;

        let res = Self::EntityType::delete_by_id(id).exec(db).await?;
        match res.rows_affected {
            0 => Err(ApiError::not_found(
                Self::RESOURCE_NAME_SINGULAR,
                Some(id.to_string()),
            )),
            _ => {
                tracing::info!(resource = Self::RESOURCE_NAME_SINGULAR, id = %id, "Deleted record");
                Ok(id)
            }
        }
    }
}
