//! Services - policies and the lot orchestrator
//!
//! This module contains the business logic:
//! - `assignment` - which vehicle variants each slot admits
//! - `cost` - tariff applied to a parked duration
//! - `clock` - injectable current-time source
//! - `parking_lot` - session lifecycle, occupancy and billing
//! - `snapshot` - diagnostic occupancy view

pub mod assignment;
pub mod clock;
pub mod cost;
pub mod parking_lot;
pub mod snapshot;

// Re-export commonly used types
pub use assignment::{SlotAssignmentPolicy, StandardSlotPolicy};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cost::{BillingMode, CostPolicy, StandardCostPolicy};
pub use parking_lot::{ParkingLot, ParkingLotBuilder};
pub use snapshot::OccupancySnapshot;
