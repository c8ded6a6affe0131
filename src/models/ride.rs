use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    DatabaseConnection,
    entity::prelude::*,
    sea_query::StringLen,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{customer, vehicle};
use crate::core::{CRUDResource, ResourcePayload, set_optional, set_required};
use crate::errors::ApiError;
use crate::mileage;
use crate::validation::{
    ValidationErrors, ValidationMode, effective, not_null, optional, required,
    validators::validate_min,
};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    #[default]
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rides")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub vehicle_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub odometer_start: Option<i32>,
    pub odometer_end: Option<i32>,
    pub status: RideStatus,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id",
        on_delete = "Restrict"
    )]
    Vehicle,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id",
        on_delete = "SetNull"
    )]
    Customer,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// One rental of one vehicle over an inclusive date range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Ride {
    pub id: Uuid,
    /// Id of the rented vehicle
    pub vehicle: Uuid,
    /// Id of the renting customer; cleared when the customer is deleted
    pub customer: Option<Uuid>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub odometer_start: Option<i32>,
    pub odometer_end: Option<i32>,
    pub status: RideStatus,
}

impl From<Model> for Ride {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            vehicle: model.vehicle_id,
            customer: model.customer_id,
            start_date: model.start_date,
            end_date: model.end_date,
            odometer_start: model.odometer_start,
            odometer_end: model.odometer_end,
            status: model.status,
        }
    }
}

/// Body of create, replace and partial update requests.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct RidePayload {
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub vehicle: Option<Option<Uuid>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<Uuid>, nullable)]
    pub customer: Option<Option<Uuid>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub odometer_start: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<i32>, nullable)]
    pub odometer_end: Option<Option<i32>>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<RideStatus>)]
    pub status: Option<Option<RideStatus>>,
}

impl ResourcePayload<ActiveModel> for RidePayload {
    fn validate(&self, mode: ValidationMode, errors: &mut ValidationErrors) {
        required(errors, mode, "vehicle", &self.vehicle);
        required(errors, mode, "start_date", &self.start_date);
        required(errors, mode, "end_date", &self.end_date);
        if let Some(odometer_start) = optional(&self.odometer_start) {
            validate_min(errors, "odometer_start", *odometer_start, 0);
        }
        if let Some(odometer_end) = optional(&self.odometer_end) {
            validate_min(errors, "odometer_end", *odometer_end, 0);
        }
        not_null(errors, "status", &self.status);
    }

    fn merge_into_activemodel(self, mut model: ActiveModel) -> Result<ActiveModel, ApiError> {
        set_required(&mut model.vehicle_id, "vehicle", self.vehicle)?;
        set_optional(&mut model.customer_id, self.customer);
        set_required(&mut model.start_date, "start_date", self.start_date)?;
        set_required(&mut model.end_date, "end_date", self.end_date)?;
        set_optional(&mut model.odometer_start, self.odometer_start);
        set_optional(&mut model.odometer_end, self.odometer_end);
        set_required(&mut model.status, "status", self.status)?;
        Ok(model)
    }
}

fn missing_reference(errors: &mut ValidationErrors, field: &str, id: Uuid) {
    errors.add(field, format!("Invalid pk \"{id}\" - object does not exist."));
}

#[async_trait]
impl CRUDResource for Ride {
    type EntityType = Entity;
    type ColumnType = Column;
    type ActiveModelType = ActiveModel;
    type Payload = RidePayload;

    const RESOURCE_NAME_SINGULAR: &'static str = "ride";
    const RESOURCE_NAME_PLURAL: &'static str = "rides";

    fn id(&self) -> Uuid {
        self.id
    }

    fn new_active_model() -> ActiveModel {
        ActiveModel {
            id: Set(Uuid::new_v4()),
            vehicle_id: NotSet,
            customer_id: Set(None),
            start_date: NotSet,
            end_date: NotSet,
            odometer_start: Set(None),
            odometer_end: Set(None),
            status: Set(RideStatus::default()),
        }
    }

    fn filterable_columns() -> Vec<(&'static str, Column)> {
        vec![
            ("id", Column::Id),
            ("vehicle", Column::VehicleId),
            ("customer", Column::CustomerId),
            ("start_date", Column::StartDate),
            ("end_date", Column::EndDate),
            ("odometer_start", Column::OdometerStart),
            ("odometer_end", Column::OdometerEnd),
            ("status", Column::Status),
        ]
    }

    async fn validate_with_store(
        db: &DatabaseConnection,
        payload: &RidePayload,
        existing: Option<&Model>,
        errors: &mut ValidationErrors,
    ) -> Result<(), ApiError> {
        if let Some(Some(vehicle_id)) = payload.vehicle {
            if vehicle::Entity::find_by_id(vehicle_id).one(db).await?.is_none() {
                missing_reference(errors, "vehicle", vehicle_id);
            }
        }
        if let Some(Some(customer_id)) = payload.customer {
            if customer::Entity::find_by_id(customer_id).one(db).await?.is_none() {
                missing_reference(errors, "customer", customer_id);
            }
        }

        let start_date = effective(&payload.start_date, existing.map(|ride| ride.start_date));
        let end_date = effective(&payload.end_date, existing.map(|ride| ride.end_date));
        if let (Some(start_date), Some(end_date)) = (start_date, end_date) {
            if end_date < start_date {
                errors.add("end_date", "End date must not be before start date.");
            }
        }

        let odometer_start = effective(
            &payload.odometer_start,
            existing.and_then(|ride| ride.odometer_start),
        );
        let odometer_end = effective(
            &payload.odometer_end,
            existing.and_then(|ride| ride.odometer_end),
        );
        if let (Some(odometer_start), Some(odometer_end)) = (odometer_start, odometer_end) {
            if odometer_end < odometer_start {
                errors.add(
                    "odometer_end",
                    "Odometer end reading must not be lower than the start reading.",
                );
            }
        }
        Ok(())
    }

    /// A ride created as `completed` books its mileage before it is inserted.
    async fn before_create(db: &DatabaseConnection, payload: &RidePayload) -> Result<(), ApiError> {
        mileage::apply_new_ride_completion(db, payload).await
    }

    /// Replace and partial update book the ride's mileage on its vehicle first.
    async fn before_update(
        db: &DatabaseConnection,
        existing: &Model,
        payload: &RidePayload,
        _mode: ValidationMode,
    ) -> Result<(), ApiError> {
        mileage::apply_ride_completion(db, existing, payload).await
    }
}

crate::crud_handlers!(Ride, RidePayload, "rides", "/rides/", "/rides/{id}");
