//! Simulation scripts - a JSON list of lot operations replayed in order
//!
//! Example:
//! ```json
//! [
//!   {"op": "enter", "vehicle": {"plate": "200-2000", "variant": "standard"}},
//!   {"op": "assign", "plate": "200-2000", "floor": 2, "slot": 2},
//!   {"op": "park", "plate": "200-2000"},
//!   {"op": "advance", "minutes": 144},
//!   {"op": "leave", "plate": "200-2000"},
//!   {"op": "calculate", "plate": "200-2000"},
//!   {"op": "move_out", "plate": "200-2000"}
//! ]
//! ```
//!
//! The runner keeps the caller-side session handle per plate, the way a
//! ticket machine would hand one to the driver. A failing step is reported
//! and the run continues.

use crate::domain::error::ParkingError;
use crate::domain::session::ParkingSession;
use crate::domain::types::{Location, Vehicle};
use crate::services::clock::ManualClock;
use crate::services::parking_lot::ParkingLot;
use anyhow::Context;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Enter { vehicle: Vehicle },
    Assign { plate: String, floor: u32, slot: u32 },
    Park { plate: String },
    MoveOut { plate: String },
    Leave { plate: String },
    Calculate { plate: String },
    Find { plate: String },
    Advance { minutes: i64 },
    Show,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Enter { .. } => "enter",
            Step::Assign { .. } => "assign",
            Step::Park { .. } => "park",
            Step::MoveOut { .. } => "move_out",
            Step::Leave { .. } => "leave",
            Step::Calculate { .. } => "calculate",
            Step::Find { .. } => "find",
            Step::Advance { .. } => "advance",
            Step::Show => "show",
        }
    }
}

/// Parse a script from JSON text
pub fn parse_script(json: &str) -> anyhow::Result<Vec<Step>> {
    serde_json::from_str(json).context("Failed to parse simulation script")
}

/// Read and parse a script file
pub fn load_script<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Step>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    parse_script(&content).with_context(|| format!("Invalid script {}", path.display()))
}

/// Result of one script step
#[derive(Debug)]
pub struct StepOutcome {
    pub index: usize,
    pub step: &'static str,
    pub result: Result<String, ParkingError>,
}

/// Replays steps against a lot driven by a manual clock
pub struct ScriptRunner {
    lot: ParkingLot,
    clock: ManualClock,
    /// Latest caller-side session per plate
    handles: FxHashMap<String, ParkingSession>,
}

impl ScriptRunner {
    /// `clock` must be a handle to the clock the lot was built with
    pub fn new(lot: ParkingLot, clock: ManualClock) -> Self {
        Self { lot, clock, handles: FxHashMap::default() }
    }

    pub fn lot(&self) -> &ParkingLot {
        &self.lot
    }

    pub fn run(&mut self, steps: &[Step]) -> Vec<StepOutcome> {
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let result = self.apply(step);
                debug!(index = %index, step = %step.name(), ok = %result.is_ok(), "script_step");
                StepOutcome { index, step: step.name(), result }
            })
            .collect()
    }

    fn apply(&mut self, step: &Step) -> Result<String, ParkingError> {
        match step {
            Step::Enter { vehicle } => {
                let session = self.lot.enter(vehicle);
                let message = format!("{} entered at {}", vehicle, session.enter_time());
                self.handles.insert(vehicle.plate().to_string(), session);
                Ok(message)
            }
            Step::Assign { plate, floor, slot } => {
                let location = Location::new(*floor, *slot);
                lookup_mut(&mut self.handles, plate)?.assign_location(location)?;
                Ok(format!("{plate} assigned {location}"))
            }
            Step::Park { plate } => {
                let session = lookup_mut(&mut self.handles, plate)?;
                self.lot.park(session)?;
                let location = session.location().map(|l| l.to_string()).unwrap_or_default();
                Ok(format!("{plate} parked at {location}"))
            }
            Step::MoveOut { plate } => {
                let vacated = self.lot.move_out(lookup(&self.handles, plate)?)?;
                let location = vacated.location().map(|l| l.to_string()).unwrap_or_default();
                let message = format!("{plate} moved out of {location}");
                self.handles.insert(plate.clone(), vacated);
                Ok(message)
            }
            Step::Leave { plate } => {
                let vehicle = lookup(&self.handles, plate)?.vehicle().clone();
                let departed = self.lot.leave(&vehicle)?;
                let message = format!(
                    "{plate} left at {}",
                    departed.leave_time().map(|t| t.to_string()).unwrap_or_default()
                );
                self.handles.insert(plate.clone(), departed);
                Ok(message)
            }
            Step::Calculate { plate } => {
                let receipt = self.lot.calculate(lookup(&self.handles, plate)?)?;
                Ok(receipt.to_string())
            }
            Step::Find { plate } => {
                let vehicle = lookup(&self.handles, plate)?.vehicle().clone();
                Ok(match self.lot.find(&vehicle) {
                    Some(session) => format!(
                        "{plate} found ({}, {})",
                        session.state(),
                        session.location().map(|l| l.to_string()).unwrap_or_else(|| "-".to_string())
                    ),
                    None => format!("{plate} not in lot"),
                })
            }
            Step::Advance { minutes } => {
                let now = self.clock.advance_minutes(*minutes)?;
                Ok(format!("clock now {}", now.format("%Y-%m-%d %H:%M")))
            }
            Step::Show => Ok(self.lot.show().to_string()),
        }
    }
}

fn lookup<'a>(
    handles: &'a FxHashMap<String, ParkingSession>,
    plate: &str,
) -> Result<&'a ParkingSession, ParkingError> {
    handles.get(plate).ok_or_else(|| ParkingError::NotFound { plate: plate.to_string() })
}

fn lookup_mut<'a>(
    handles: &'a mut FxHashMap<String, ParkingSession>,
    plate: &str,
) -> Result<&'a mut ParkingSession, ParkingError> {
    handles.get_mut(plate).ok_or_else(|| ParkingError::NotFound { plate: plate.to_string() })
}
