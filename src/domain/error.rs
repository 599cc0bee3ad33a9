//! Domain error kinds for lot operations
//!
//! Every variant is a synchronous validation failure. Nothing here is
//! transient, so callers should never retry: the same input fails the same way.

use crate::domain::session::SessionState;
use crate::domain::types::{Location, VehicleVariant};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParkingError {
    #[error("invalid lot configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid vehicle: {0}")]
    InvalidVehicle(String),

    #[error("session for {plate} has no assigned location")]
    MissingLocation { plate: String },

    #[error("{variant} vehicle {plate} is not allowed at {location}")]
    SlotTypeMismatch { plate: String, variant: VehicleVariant, location: Location },

    #[error("{location} is already occupied by {occupant}")]
    SlotOccupied { location: Location, occupant: String },

    #[error("{plate} is not parked at {location}")]
    NotParked { plate: String, location: String },

    #[error("no active session for {plate}")]
    NotFound { plate: String },

    #[error("session for {plate} is incomplete: {reason}")]
    IncompleteSession { plate: String, reason: &'static str },

    #[error("{location} is outside a lot of {floors} floors x {slots_per_floor} slots")]
    OutOfRange { location: Location, floors: u32, slots_per_floor: u32 },

    #[error("cannot {action} a session in state {state}")]
    InvalidTransition { state: SessionState, action: &'static str },

    #[error("negative parking duration: {0} minutes")]
    NegativeDuration(i64),

    #[error("fee for {minutes} minutes exceeds the representable range")]
    CostOverflow { minutes: i64 },

    #[error("cannot advance the clock by {minutes} minutes")]
    ClockOverflow { minutes: i64 },
}

pub type Result<T> = std::result::Result<T, ParkingError>;
