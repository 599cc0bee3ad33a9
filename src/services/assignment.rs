//! Slot assignment policy - which vehicle variants a slot admits
//!
//! A policy is a pure function of the location and lot dimensions. The lot
//! queries it on every park; it never holds state.

use crate::domain::types::{Location, VariantSet, VehicleVariant};

pub trait SlotAssignmentPolicy {
    /// Variants allowed at `location` in a lot of the given dimensions.
    ///
    /// Locations outside the lot yield an empty set.
    fn allowed_variants(&self, location: Location, floors: u32, slots_per_floor: u32) -> VariantSet;
}

/// Per-floor layout:
/// - last slot is bus-only
/// - remaining even slots take standard cars, and compacts may use them too
/// - remaining odd slots are compact-only
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSlotPolicy;

impl SlotAssignmentPolicy for StandardSlotPolicy {
    fn allowed_variants(&self, location: Location, floors: u32, slots_per_floor: u32) -> VariantSet {
        let Location { floor, slot } = location;
        if floor == 0 || floor > floors || slot == 0 || slot > slots_per_floor {
            return VariantSet::EMPTY;
        }

        if slot == slots_per_floor {
            VariantSet::only(VehicleVariant::Bus)
        } else if slot % 2 == 0 {
            VariantSet::only(VehicleVariant::Standard).with(VehicleVariant::Compact)
        } else {
            VariantSet::only(VehicleVariant::Compact)
        }
    }
}
