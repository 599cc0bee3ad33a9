//! Parking lot - session lifecycle, slot occupancy and billing
//!
//! The lot is the single owner of two structures:
//! - `sessions`: every active session (entered, parked, or departed but unbilled)
//! - `occupancy`: location -> id of the session parked there
//!
//! Invariant: every id in `occupancy` is present in `sessions`. A session
//! leaves `sessions` once it is departed and no longer holds a slot, either
//! by `move_out` after departure or by `calculate` after the slot is vacated.

use crate::domain::error::{ParkingError, Result};
use crate::domain::session::{ParkingSession, Receipt, SessionState};
use crate::domain::types::{Location, VariantSet, Vehicle, VehicleVariant};
use crate::infra::metrics::{LotMetrics, MetricsSummary};
use crate::services::assignment::{SlotAssignmentPolicy, StandardSlotPolicy};
use crate::services::clock::{Clock, SystemClock};
use crate::services::cost::CostPolicy;
use crate::services::snapshot::{OccupancySnapshot, SlotEntry};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Default lot name when none is configured
pub const DEFAULT_LOT_NAME: &str = "ParkingLot";

/// Builder for [`ParkingLot`]
///
/// Dimensions and a cost policy are required. The slot policy defaults to
/// [`StandardSlotPolicy`] and the clock to [`SystemClock`].
pub struct ParkingLotBuilder {
    name: String,
    floors: u32,
    slots_per_floor: u32,
    assignment: Box<dyn SlotAssignmentPolicy>,
    cost: Option<Box<dyn CostPolicy>>,
    clock: Box<dyn Clock>,
    seeds: Vec<Seed>,
}

enum Seed {
    Vehicle(Vehicle, Location),
    Session(ParkingSession),
}

impl ParkingLotBuilder {
    pub fn new(floors: u32, slots_per_floor: u32) -> Self {
        Self {
            name: DEFAULT_LOT_NAME.to_string(),
            floors,
            slots_per_floor,
            assignment: Box::new(StandardSlotPolicy),
            cost: None,
            clock: Box::new(SystemClock),
            seeds: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn assignment_policy(mut self, policy: impl SlotAssignmentPolicy + 'static) -> Self {
        self.assignment = Box::new(policy);
        self
    }

    pub fn cost_policy(mut self, policy: impl CostPolicy + 'static) -> Self {
        self.cost = Some(Box::new(policy));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Park `vehicle` at `location` when the lot is built, entered at build time
    pub fn seed(mut self, vehicle: Vehicle, location: Location) -> Self {
        self.seeds.push(Seed::Vehicle(vehicle, location));
        self
    }

    /// Park a pre-built session (e.g. with a historical enter time) when the lot is built
    pub fn seed_session(mut self, session: ParkingSession) -> Self {
        self.seeds.push(Seed::Session(session));
        self
    }

    /// Validate the configuration and park every seed.
    ///
    /// Seeds go through the same checks as [`ParkingLot::park`], so a seed in
    /// a mismatched or taken slot fails the build.
    pub fn build(self) -> Result<ParkingLot> {
        if self.floors == 0 {
            return Err(ParkingError::InvalidConfiguration(
                "floor count must be positive".to_string(),
            ));
        }
        if self.slots_per_floor == 0 {
            return Err(ParkingError::InvalidConfiguration(
                "slots per floor must be positive".to_string(),
            ));
        }
        let Some(cost) = self.cost else {
            return Err(ParkingError::InvalidConfiguration("cost policy is required".to_string()));
        };

        let mut lot = ParkingLot {
            name: self.name,
            floors: self.floors,
            slots_per_floor: self.slots_per_floor,
            assignment: self.assignment,
            cost,
            clock: self.clock,
            sessions: FxHashMap::default(),
            occupancy: BTreeMap::new(),
            metrics: LotMetrics::new(),
        };

        for seed in self.seeds {
            let mut session = match seed {
                Seed::Vehicle(vehicle, location) => {
                    let mut session = ParkingSession::new(vehicle, &lot.name, lot.clock.now());
                    session.assign_location(location)?;
                    session
                }
                Seed::Session(mut session) => {
                    session.lot_name = lot.name.clone();
                    session
                }
            };
            lot.park(&mut session)?;
            info!(
                lot = %lot.name,
                plate = %session.plate(),
                location = ?session.location(),
                "session_seeded"
            );
        }

        Ok(lot)
    }
}

/// A parking facility: floors x slots, policies, and the sessions inside it
pub struct ParkingLot {
    name: String,
    floors: u32,
    slots_per_floor: u32,
    assignment: Box<dyn SlotAssignmentPolicy>,
    cost: Box<dyn CostPolicy>,
    clock: Box<dyn Clock>,
    /// Active sessions by session id
    sessions: FxHashMap<String, ParkingSession>,
    /// occupancy[location] = id of the parked session
    occupancy: BTreeMap<Location, String>,
    metrics: LotMetrics,
}

impl std::fmt::Debug for ParkingLot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingLot")
            .field("name", &self.name)
            .field("floors", &self.floors)
            .field("slots_per_floor", &self.slots_per_floor)
            .field("sessions", &self.sessions)
            .field("occupancy", &self.occupancy)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl ParkingLot {
    pub fn builder(floors: u32, slots_per_floor: u32) -> ParkingLotBuilder {
        ParkingLotBuilder::new(floors, slots_per_floor)
    }

    /// Admit a vehicle: stamp the enter time and track the session.
    ///
    /// The session has no location yet and occupancy is untouched.
    pub fn enter(&mut self, vehicle: &Vehicle) -> ParkingSession {
        let session = ParkingSession::new(vehicle.clone(), &self.name, self.clock.now());
        debug!(
            lot = %self.name,
            plate = %vehicle.plate(),
            variant = %vehicle.variant(),
            session_id = %session.id(),
            "session_entered"
        );
        self.sessions.insert(session.id.clone(), session.clone());
        self.metrics.record_enter();
        session
    }

    /// Park a session at its assigned location.
    ///
    /// On success the caller's copy is marked `Parked` as well.
    pub fn park(&mut self, session: &mut ParkingSession) -> Result<()> {
        match self.try_park(session) {
            Ok(location) => {
                self.metrics.record_park();
                debug!(
                    lot = %self.name,
                    plate = %session.plate(),
                    location = %location,
                    "vehicle_parked"
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.record_park_rejected();
                warn!(lot = %self.name, plate = %session.plate(), error = %e, "park_rejected");
                Err(e)
            }
        }
    }

    fn try_park(&mut self, session: &mut ParkingSession) -> Result<Location> {
        if session.state == SessionState::Departed {
            return Err(ParkingError::InvalidTransition { state: session.state, action: "park" });
        }
        // The caller's copy may be stale; the tracked record is authoritative
        if let Some(stored) = self.sessions.get(&session.id) {
            if matches!(stored.state, SessionState::Parked | SessionState::Departed) {
                return Err(ParkingError::InvalidTransition { state: stored.state, action: "park" });
            }
        }

        let location = session
            .location
            .ok_or_else(|| ParkingError::MissingLocation { plate: session.plate().to_string() })?;
        self.check_in_range(location)?;

        let variant = session.vehicle.variant();
        if !self.allowed_variants(location).contains(variant) {
            return Err(ParkingError::SlotTypeMismatch {
                plate: session.plate().to_string(),
                variant,
                location,
            });
        }

        if let Some(occupant) = self.session_at(location) {
            return Err(ParkingError::SlotOccupied {
                location,
                occupant: occupant.plate().to_string(),
            });
        }

        session.state = SessionState::Parked;
        self.occupancy.insert(location, session.id.clone());
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(location)
    }

    /// Vacate the slot held by `session`.
    ///
    /// The slot must be held by a session for the same plate. A departed
    /// session is dropped from active tracking and returned as a historical
    /// record; otherwise it returns to `LocationAssigned` and may be parked again.
    pub fn move_out(&mut self, session: &ParkingSession) -> Result<ParkingSession> {
        let not_parked = |location: String| ParkingError::NotParked {
            plate: session.plate().to_string(),
            location,
        };

        let location = session.location.ok_or_else(|| not_parked("-".to_string()))?;
        let id = match self.session_at(location) {
            Some(occupant) if occupant.plate() == session.plate() => occupant.id.clone(),
            _ => return Err(not_parked(location.to_string())),
        };

        self.occupancy.remove(&location);
        let vacated = match self.sessions.remove(&id) {
            Some(stored) if stored.is_departed() => stored,
            Some(mut stored) => {
                stored.state = SessionState::LocationAssigned;
                self.sessions.insert(id, stored.clone());
                stored
            }
            None => return Err(not_parked(location.to_string())),
        };

        self.metrics.record_move_out();
        debug!(
            lot = %self.name,
            plate = %vacated.plate(),
            location = %location,
            departed = %vacated.is_departed(),
            "vehicle_moved_out"
        );
        Ok(vacated)
    }

    /// Find the active session for `vehicle`, matched by plate.
    ///
    /// With several matches the earliest entry wins. Absence is a normal outcome.
    pub fn find(&self, vehicle: &Vehicle) -> Option<&ParkingSession> {
        self.sessions
            .values()
            .filter(|s| s.plate() == vehicle.plate())
            .min_by_key(|s| (s.enter_time, s.location))
    }

    /// Mark the vehicle as departed and return the updated session.
    ///
    /// Only a session that has been parked (and possibly moved out since) can
    /// leave. A plate whose only active sessions were entered but never parked
    /// fails with `InvalidTransition`. The slot stays occupied until
    /// [`ParkingLot::move_out`].
    pub fn leave(&mut self, vehicle: &Vehicle) -> Result<ParkingSession> {
        let now = self.clock.now();
        let plate = vehicle.plate();
        let id = self
            .sessions
            .values()
            .filter(|s| {
                s.plate() == plate
                    && matches!(s.state, SessionState::Parked | SessionState::LocationAssigned)
            })
            .min_by_key(|s| (s.enter_time, s.location))
            .map(|s| s.id.clone());

        let Some(session) = id.and_then(|id| self.sessions.get_mut(&id)) else {
            let unparked = self
                .sessions
                .values()
                .any(|s| s.plate() == plate && s.state == SessionState::Created);
            return Err(if unparked {
                ParkingError::InvalidTransition { state: SessionState::Created, action: "leave" }
            } else {
                ParkingError::NotFound { plate: plate.to_string() }
            });
        };

        session.leave_time = Some(now);
        session.state = SessionState::Departed;
        self.metrics.record_departure();
        debug!(
            lot = %self.name,
            plate = %session.plate(),
            leave_time = %now,
            "vehicle_left"
        );
        Ok(session.clone())
    }

    /// Compute the receipt for a departed session.
    ///
    /// Sessions the lot never tracked (historical records) are billed the same
    /// way. A tracked session that no longer holds a slot is dropped from
    /// active tracking.
    pub fn calculate(&mut self, session: &ParkingSession) -> Result<Receipt> {
        let minutes = session.elapsed_minutes()?;
        let cost = self.cost.cost(minutes)?;

        if !self.holds_slot(&session.id) && self.sessions.remove(&session.id).is_some() {
            debug!(lot = %self.name, plate = %session.plate(), "session_closed");
        }

        self.metrics.record_receipt(minutes.unsigned_abs(), cost);
        info!(
            lot = %self.name,
            plate = %session.plate(),
            minutes = %minutes,
            cost = %cost,
            "receipt_issued"
        );
        Ok(Receipt { session: session.clone(), minutes, cost })
    }

    /// Snapshot of current occupancy for display
    pub fn show(&self) -> OccupancySnapshot {
        let entries = self
            .occupancy
            .iter()
            .filter_map(|(location, id)| {
                self.sessions.get(id).map(|s| SlotEntry {
                    location: *location,
                    vehicle: s.vehicle.clone(),
                    state: s.state,
                    enter_time: s.enter_time,
                })
            })
            .collect();
        OccupancySnapshot {
            lot_name: self.name.clone(),
            floors: self.floors,
            slots_per_floor: self.slots_per_floor,
            entries,
        }
    }

    /// First free location, in (floor, slot) order, that admits `variant`
    pub fn first_available(&self, variant: VehicleVariant) -> Option<Location> {
        (1..=self.floors)
            .flat_map(|floor| (1..=self.slots_per_floor).map(move |slot| Location::new(floor, slot)))
            .find(|location| {
                !self.occupancy.contains_key(location)
                    && self.allowed_variants(*location).contains(variant)
            })
    }

    pub fn allowed_variants(&self, location: Location) -> VariantSet {
        self.assignment.allowed_variants(location, self.floors, self.slots_per_floor)
    }

    pub fn session_at(&self, location: Location) -> Option<&ParkingSession> {
        self.occupancy.get(&location).and_then(|id| self.sessions.get(id))
    }

    #[inline]
    pub fn is_occupied(&self, location: Location) -> bool {
        self.occupancy.contains_key(&location)
    }

    pub fn occupied_count(&self) -> usize {
        self.occupancy.len()
    }

    pub fn capacity(&self) -> usize {
        self.floors as usize * self.slots_per_floor as usize
    }

    pub fn active_sessions(&self) -> impl Iterator<Item = &ParkingSession> {
        self.sessions.values()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn floors(&self) -> u32 {
        self.floors
    }

    pub fn slots_per_floor(&self) -> u32 {
        self.slots_per_floor
    }

    pub fn cost_policy(&self) -> &dyn CostPolicy {
        self.cost.as_ref()
    }

    pub fn metrics(&self) -> &LotMetrics {
        &self.metrics
    }

    pub fn report(&self) -> MetricsSummary {
        self.metrics.report(self.occupied_count(), self.capacity())
    }

    fn check_in_range(&self, location: Location) -> Result<()> {
        let floor_ok = (1..=self.floors).contains(&location.floor);
        let slot_ok = (1..=self.slots_per_floor).contains(&location.slot);
        if floor_ok && slot_ok {
            Ok(())
        } else {
            Err(ParkingError::OutOfRange {
                location,
                floors: self.floors,
                slots_per_floor: self.slots_per_floor,
            })
        }
    }

    fn holds_slot(&self, id: &str) -> bool {
        self.sessions
            .get(id)
            .and_then(|s| s.location)
            .is_some_and(|location| self.occupancy.get(&location).is_some_and(|held| held == id))
    }
}
