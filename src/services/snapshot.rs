//! Human-readable occupancy snapshot
//!
//! Diagnostic output only; the layout is not a stable format.

use crate::domain::session::SessionState;
use crate::domain::types::{Location, Vehicle};
use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone)]
pub struct SlotEntry {
    pub location: Location,
    pub vehicle: Vehicle,
    pub state: SessionState,
    pub enter_time: NaiveDateTime,
}

/// Occupied slots of a lot, in (floor, slot) order
#[derive(Debug, Clone)]
pub struct OccupancySnapshot {
    pub lot_name: String,
    pub floors: u32,
    pub slots_per_floor: u32,
    pub entries: Vec<SlotEntry>,
}

impl OccupancySnapshot {
    pub fn capacity(&self) -> usize {
        self.floors as usize * self.slots_per_floor as usize
    }

    /// Occupied slot count per floor; floors with no vehicles are omitted
    pub fn per_floor(&self) -> Vec<(u32, usize)> {
        let mut counts: Vec<(u32, usize)> = Vec::new();
        for entry in &self.entries {
            match counts.last_mut() {
                Some((floor, count)) if *floor == entry.location.floor => *count += 1,
                _ => counts.push((entry.location.floor, 1)),
            }
        }
        counts
    }
}

impl fmt::Display for OccupancySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {}/{} occupied ({} floors x {} slots)",
            self.lot_name,
            self.entries.len(),
            self.capacity(),
            self.floors,
            self.slots_per_floor
        )?;
        for (floor, count) in self.per_floor() {
            writeln!(f, "  floor {floor}: {count}/{}", self.slots_per_floor)?;
        }
        for entry in &self.entries {
            let marker = if entry.state == SessionState::Departed { " (departed)" } else { "" };
            writeln!(
                f,
                "  {:<8} {:<22} since {}{}",
                entry.location.to_string(),
                entry.vehicle.to_string(),
                entry.enter_time.format("%Y-%m-%d %H:%M"),
                marker
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::VehicleVariant;
    use chrono::NaiveDate;

    fn entry(floor: u32, slot: u32, plate: &str, state: SessionState) -> SlotEntry {
        SlotEntry {
            location: Location::new(floor, slot),
            vehicle: Vehicle::new(plate, VehicleVariant::Compact).unwrap(),
            state,
            enter_time: NaiveDate::from_ymd_opt(2022, 5, 15)
                .unwrap()
                .and_hms_opt(13, 0, 0)
                .unwrap(),
        }
    }

    fn snapshot() -> OccupancySnapshot {
        OccupancySnapshot {
            lot_name: "Central".to_string(),
            floors: 10,
            slots_per_floor: 100,
            entries: vec![
                entry(3, 1, "300-3000", SessionState::Parked),
                entry(10, 8, "100-9901", SessionState::Parked),
                entry(10, 16, "200-9902", SessionState::Departed),
            ],
        }
    }

    #[test]
    fn test_per_floor_counts() {
        assert_eq!(snapshot().per_floor(), vec![(3, 1), (10, 2)]);
    }

    #[test]
    fn test_display_lists_every_entry() {
        let text = snapshot().to_string();
        assert!(text.starts_with("Central: 3/1000 occupied"));
        assert!(text.contains("10F-8"));
        assert!(text.contains("[compact] 200-9902"));
        assert!(text.contains("(departed)"));
        assert!(text.contains("since 2022-05-15 13:00"));
    }

    #[test]
    fn test_empty_snapshot() {
        let empty = OccupancySnapshot {
            lot_name: "Empty".to_string(),
            floors: 1,
            slots_per_floor: 4,
            entries: Vec::new(),
        };
        assert_eq!(empty.to_string(), "Empty: 0/4 occupied (1 floors x 4 slots)\n");
    }
}
