//! Parking session data model: one vehicle's visit from entry to receipt

use crate::domain::error::{ParkingError, Result};
use crate::domain::types::{Location, Vehicle};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Generate a new UUIDv7 (time-sortable)
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}

/// Lifecycle position of a session
///
/// Billing is not a state: it is the existence of a [`Receipt`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Created,
    LocationAssigned,
    Parked,
    Departed,
}

impl SessionState {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Created => "created",
            SessionState::LocationAssigned => "location_assigned",
            SessionState::Parked => "parked",
            SessionState::Departed => "departed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one vehicle's visit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParkingSession {
    pub(crate) id: String,
    pub(crate) vehicle: Vehicle,
    pub(crate) lot_name: String,
    pub(crate) location: Option<Location>,
    pub(crate) enter_time: NaiveDateTime,
    pub(crate) leave_time: Option<NaiveDateTime>,
    pub(crate) state: SessionState,
}

impl ParkingSession {
    pub(crate) fn new(vehicle: Vehicle, lot_name: &str, enter_time: NaiveDateTime) -> Self {
        Self {
            id: new_uuid_v7(),
            vehicle,
            lot_name: lot_name.to_string(),
            location: None,
            enter_time,
            leave_time: None,
            state: SessionState::Created,
        }
    }

    /// Build a session with explicit times, bypassing `enter`.
    ///
    /// Used for seeding a lot and for billing historical visits. The state is
    /// derived from what is set: a leave time makes it `Departed`, a location
    /// makes it `LocationAssigned`.
    pub fn historical(
        vehicle: Vehicle,
        lot_name: &str,
        location: Option<Location>,
        enter_time: NaiveDateTime,
        leave_time: Option<NaiveDateTime>,
    ) -> Self {
        let state = match (location, leave_time) {
            (_, Some(_)) => SessionState::Departed,
            (Some(_), None) => SessionState::LocationAssigned,
            (None, None) => SessionState::Created,
        };
        Self {
            id: new_uuid_v7(),
            vehicle,
            lot_name: lot_name.to_string(),
            location,
            enter_time,
            leave_time,
            state,
        }
    }

    /// Stage a target slot. Only allowed before the session is parked.
    pub fn assign_location(&mut self, location: Location) -> Result<()> {
        match self.state {
            SessionState::Created | SessionState::LocationAssigned => {
                self.location = Some(location);
                self.state = SessionState::LocationAssigned;
                Ok(())
            }
            state => Err(ParkingError::InvalidTransition { state, action: "assign a location to" }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn plate(&self) -> &str {
        self.vehicle.plate()
    }

    pub fn lot_name(&self) -> &str {
        &self.lot_name
    }

    pub fn location(&self) -> Option<Location> {
        self.location
    }

    pub fn enter_time(&self) -> NaiveDateTime {
        self.enter_time
    }

    pub fn leave_time(&self) -> Option<NaiveDateTime> {
        self.leave_time
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn is_departed(&self) -> bool {
        self.leave_time.is_some()
    }

    /// Whole minutes between entry and departure
    ///
    /// Fails when the vehicle has not left yet or the times are inverted.
    pub fn elapsed_minutes(&self) -> Result<i64> {
        let Some(leave_time) = self.leave_time else {
            return Err(ParkingError::IncompleteSession {
                plate: self.plate().to_string(),
                reason: "leave time is not set",
            });
        };
        if leave_time < self.enter_time {
            return Err(ParkingError::IncompleteSession {
                plate: self.plate().to_string(),
                reason: "leave time precedes enter time",
            });
        }
        Ok((leave_time - self.enter_time).num_minutes())
    }
}

/// Computed fee for a departed session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub session: ParkingSession,
    pub minutes: i64,
    pub cost: u64,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = self
            .session
            .location
            .map(|l| l.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{} {} @ {}: {} min, cost {}",
            self.session.lot_name, self.session.vehicle, location, self.minutes, self.cost
        )
    }
}
