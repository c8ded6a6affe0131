//! Entities, wire representations and payload contracts for each resource.
//!
//! Every module follows the same layout: the Sea-ORM `Model` (storage), the
//! API struct built from it (wire shape), a payload type shared by create,
//! replace and partial update, and the `CRUDResource` impl binding them.

pub mod customer;
pub mod ride;
pub mod vehicle;

pub use customer::{Customer, CustomerPayload};
pub use ride::{Ride, RidePayload, RideStatus};
pub use vehicle::{FuelType, Vehicle, VehiclePayload};
