//! Shared value types: vehicles, variants and slot coordinates

use crate::domain::error::ParkingError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle class, used to decide which slots a vehicle may take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleVariant {
    Compact,
    Standard,
    Bus,
}

impl VehicleVariant {
    pub const ALL: [VehicleVariant; 3] =
        [VehicleVariant::Compact, VehicleVariant::Standard, VehicleVariant::Bus];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleVariant::Compact => "compact",
            VehicleVariant::Standard => "standard",
            VehicleVariant::Bus => "bus",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        match self {
            VehicleVariant::Compact => 0b001,
            VehicleVariant::Standard => 0b010,
            VehicleVariant::Bus => 0b100,
        }
    }
}

impl fmt::Display for VehicleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VehicleVariant {
    type Err = ParkingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(VehicleVariant::Compact),
            "standard" => Ok(VehicleVariant::Standard),
            "bus" => Ok(VehicleVariant::Bus),
            other => Err(ParkingError::InvalidVehicle(format!("unknown vehicle variant '{other}'"))),
        }
    }
}

/// Set of vehicle variants admitted by a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariantSet(u8);

impl VariantSet {
    pub const EMPTY: VariantSet = VariantSet(0);

    pub fn only(variant: VehicleVariant) -> Self {
        Self(variant.bit())
    }

    #[must_use]
    pub fn with(self, variant: VehicleVariant) -> Self {
        Self(self.0 | variant.bit())
    }

    #[inline]
    pub fn contains(&self, variant: VehicleVariant) -> bool {
        self.0 & variant.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = VehicleVariant> + '_ {
        VehicleVariant::ALL.into_iter().filter(|v| self.contains(*v))
    }
}

impl FromIterator<VehicleVariant> for VariantSet {
    fn from_iter<I: IntoIterator<Item = VehicleVariant>>(iter: I) -> Self {
        iter.into_iter().fold(VariantSet::EMPTY, VariantSet::with)
    }
}

impl fmt::Display for VariantSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.iter().map(|v| v.as_str()).collect();
        f.write_str(&names.join("+"))
    }
}

/// A (floor, slot) coordinate. Both parts are 1-based.
///
/// Bounds against a concrete lot are checked by the lot, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub floor: u32,
    pub slot: u32,
}

impl Location {
    #[inline]
    pub fn new(floor: u32, slot: u32) -> Self {
        Self { floor, slot }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}F-{}", self.floor, self.slot)
    }
}

/// Wire shape of a vehicle before plate validation
#[derive(Deserialize)]
struct VehicleRecord {
    plate: Option<String>,
    variant: VehicleVariant,
}

impl TryFrom<VehicleRecord> for Vehicle {
    type Error = ParkingError;

    fn try_from(record: VehicleRecord) -> Result<Self, Self::Error> {
        Vehicle::new(record.plate.unwrap_or_default(), record.variant)
    }
}

/// Immutable vehicle value: a plate number and a variant
///
/// Equality compares plate and variant. The lot itself matches sessions by
/// plate only (see `ParkingLot::find` and `ParkingLot::leave`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "VehicleRecord")]
pub struct Vehicle {
    plate: String,
    variant: VehicleVariant,
}

impl Vehicle {
    /// Build a vehicle, rejecting empty or blank plates.
    ///
    /// # Example
    ///
    /// ```
    /// use parking_sim::domain::types::{Vehicle, VehicleVariant};
    ///
    /// let bus = Vehicle::new("100-1000", VehicleVariant::Bus).unwrap();
    /// assert_eq!(bus.plate(), "100-1000");
    /// assert!(Vehicle::new("  ", VehicleVariant::Compact).is_err());
    /// ```
    pub fn new(plate: impl Into<String>, variant: VehicleVariant) -> Result<Self, ParkingError> {
        let plate = plate.into().trim().to_string();
        if plate.is_empty() {
            return Err(ParkingError::InvalidVehicle(format!(
                "{variant} vehicle has an empty plate number"
            )));
        }
        Ok(Self { plate, variant })
    }

    #[inline]
    pub fn plate(&self) -> &str {
        &self.plate
    }

    #[inline]
    pub fn variant(&self) -> VehicleVariant {
        self.variant
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.variant, self.plate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_from_str() {
        assert_eq!("BUS".parse::<VehicleVariant>().unwrap(), VehicleVariant::Bus);
        assert_eq!(" compact ".parse::<VehicleVariant>().unwrap(), VehicleVariant::Compact);
        assert!(matches!(
            "truck".parse::<VehicleVariant>(),
            Err(ParkingError::InvalidVehicle(_))
        ));
    }

    #[test]
    fn test_empty_plate_rejected_for_every_variant() {
        for variant in VehicleVariant::ALL {
            assert!(matches!(Vehicle::new("", variant), Err(ParkingError::InvalidVehicle(_))));
            assert!(matches!(Vehicle::new(" \t", variant), Err(ParkingError::InvalidVehicle(_))));
        }
    }

    #[test]
    fn test_plate_is_trimmed() {
        let car = Vehicle::new("  200-2000 ", VehicleVariant::Standard).unwrap();
        assert_eq!(car.plate(), "200-2000");
        assert_eq!(car.to_string(), "[standard] 200-2000");
    }

    #[test]
    fn test_deserialize_validates_plate() {
        let ok: Vehicle = serde_json::from_str(r#"{"plate":"300-3000","variant":"compact"}"#).unwrap();
        assert_eq!(ok.variant(), VehicleVariant::Compact);

        assert!(serde_json::from_str::<Vehicle>(r#"{"plate":"","variant":"bus"}"#).is_err());
        assert!(serde_json::from_str::<Vehicle>(r#"{"variant":"bus"}"#).is_err());
    }

    #[test]
    fn test_variant_set() {
        let set = VariantSet::only(VehicleVariant::Standard).with(VehicleVariant::Compact);
        assert!(set.contains(VehicleVariant::Compact));
        assert!(set.contains(VehicleVariant::Standard));
        assert!(!set.contains(VehicleVariant::Bus));
        assert_eq!(set.to_string(), "compact+standard");
        assert_eq!(VariantSet::EMPTY.to_string(), "none");

        let collected: VariantSet = [VehicleVariant::Bus].into_iter().collect();
        assert_eq!(collected, VariantSet::only(VehicleVariant::Bus));
    }

    #[test]
    fn test_location_ordering_and_display() {
        assert!(Location::new(1, 100) < Location::new(2, 1));
        assert!(Location::new(3, 2) < Location::new(3, 10));
        assert_eq!(Location::new(10, 8).to_string(), "10F-8");
    }

    #[test]
    fn test_vehicle_equality_includes_variant() {
        let compact = Vehicle::new("100-1000", VehicleVariant::Compact).unwrap();
        let bus = Vehicle::new("100-1000", VehicleVariant::Bus).unwrap();
        assert_ne!(compact, bus);
        assert_eq!(compact.plate(), bus.plate());
        assert_eq!(compact, Vehicle::new(" 100-1000 ", VehicleVariant::Compact).unwrap());
    }
}
