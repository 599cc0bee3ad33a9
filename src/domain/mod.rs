//! Domain models - core value types and the session model
//!
//! This module contains the canonical data types used throughout the system:
//! - `Vehicle` / `VehicleVariant` - the car being parked and its class
//! - `Location` - a (floor, slot) coordinate
//! - `VariantSet` - which variants a slot admits
//! - `ParkingSession` / `Receipt` - one visit and its computed fee
//! - `ParkingError` - validation failures surfaced by lot operations

pub mod error;
pub mod session;
pub mod types;

pub use error::ParkingError;
pub use session::{ParkingSession, Receipt, SessionState};
pub use types::{Location, VariantSet, Vehicle, VehicleVariant};
