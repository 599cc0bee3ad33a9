//! Configuration loading from TOML files
//!
//! Config file is selected via:
//! 1. --config <path> command line argument (parsed by the binary)
//! 2. CONFIG_FILE environment variable
//! 3. Default: config/dev.toml

use crate::domain::session::ParkingSession;
use crate::domain::types::{Location, Vehicle, VehicleVariant};
use crate::services::clock::Clock;
use crate::services::cost::{BillingMode, StandardCostPolicy};
use crate::services::parking_lot::{ParkingLot, DEFAULT_LOT_NAME};
use anyhow::Context;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Deserialize)]
pub struct LotConfig {
    #[serde(default = "default_lot_name")]
    pub name: String,
    pub floors: u32,
    pub slots_per_floor: u32,
}

fn default_lot_name() -> String {
    DEFAULT_LOT_NAME.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TariffConfig {
    /// Fee charged per block
    pub fee: u64,
    /// Block length in minutes
    #[serde(default = "default_block_minutes")]
    pub block_minutes: u64,
    #[serde(default)]
    pub billing: BillingMode,
}

fn default_block_minutes() -> u64 {
    10
}

/// A vehicle parked when the lot is built
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedConfig {
    pub plate: String,
    pub variant: VehicleVariant,
    pub floor: u32,
    pub slot: u32,
    /// Enter time as "YYYY-MM-DDTHH:MM:SS"; defaults to the lot clock at build
    #[serde(default)]
    pub entered_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    pub lot: LotConfig,
    pub tariff: TariffConfig,
    #[serde(default)]
    pub seed: Vec<SeedConfig>,
}

/// Main configuration struct used throughout the application
#[derive(Debug, Clone)]
pub struct Config {
    lot_name: String,
    floors: u32,
    slots_per_floor: u32,
    fee: u64,
    block_minutes: u64,
    billing: BillingMode,
    seeds: Vec<SeedConfig>,
    config_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lot_name: DEFAULT_LOT_NAME.to_string(),
            floors: 10,
            slots_per_floor: 100,
            fee: 500,
            block_minutes: 10,
            billing: BillingMode::Prorated,
            seeds: Vec::new(),
            config_file: "default".to_string(),
        }
    }
}

impl Config {
    /// Pick the config file: the `--config` value if given, then `CONFIG_FILE`,
    /// then config/dev.toml
    pub fn resolve_config_path(cli_path: Option<String>) -> String {
        cli_path
            .or_else(|| env::var("CONFIG_FILE").ok())
            .unwrap_or_else(|| "config/dev.toml".to_string())
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
            .map(|config| config.with_config_file(path.display().to_string()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let toml_config: TomlConfig = toml::from_str(content)?;
        Ok(Self {
            lot_name: toml_config.lot.name,
            floors: toml_config.lot.floors,
            slots_per_floor: toml_config.lot.slots_per_floor,
            fee: toml_config.tariff.fee,
            block_minutes: toml_config.tariff.block_minutes,
            billing: toml_config.tariff.billing,
            seeds: toml_config.seed,
            config_file: "inline".to_string(),
        })
    }

    /// Load from an explicit path, falling back to defaults on any error
    pub fn load_from_path(path: &str) -> Self {
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %format!("{e:#}"), "config_fallback_to_defaults");
                Self::default()
            }
        }
    }

    /// Build a lot from this configuration: standard slot layout, the
    /// configured tariff, and every seed parked.
    pub fn build_lot(&self, clock: impl Clock + 'static) -> anyhow::Result<ParkingLot> {
        let tariff = StandardCostPolicy::new(self.fee, self.block_minutes, self.billing)
            .context("Invalid tariff")?;

        let mut builder = ParkingLot::builder(self.floors, self.slots_per_floor)
            .name(self.lot_name.clone())
            .cost_policy(tariff)
            .clock(clock);

        for seed in &self.seeds {
            let vehicle = Vehicle::new(seed.plate.clone(), seed.variant)
                .with_context(|| format!("Invalid seed vehicle at {}F-{}", seed.floor, seed.slot))?;
            let location = Location::new(seed.floor, seed.slot);
            builder = match seed.entered_at {
                Some(entered_at) => builder.seed_session(ParkingSession::historical(
                    vehicle,
                    &self.lot_name,
                    Some(location),
                    entered_at,
                    None,
                )),
                None => builder.seed(vehicle, location),
            };
        }

        builder.build().context("Invalid lot configuration")
    }

    fn with_config_file(mut self, config_file: String) -> Self {
        self.config_file = config_file;
        self
    }

    pub fn lot_name(&self) -> &str {
        &self.lot_name
    }

    pub fn floors(&self) -> u32 {
        self.floors
    }

    pub fn slots_per_floor(&self) -> u32 {
        self.slots_per_floor
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn block_minutes(&self) -> u64 {
        self.block_minutes
    }

    pub fn billing(&self) -> BillingMode {
        self.billing
    }

    pub fn seeds(&self) -> &[SeedConfig] {
        &self.seeds
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    /// Builder method for tests to add a seed
    #[cfg(test)]
    pub fn with_seed(mut self, plate: &str, variant: VehicleVariant, floor: u32, slot: u32) -> Self {
        self.seeds.push(SeedConfig {
            plate: plate.to_string(),
            variant,
            floor,
            slot,
            entered_at: None,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ParkingError;
    use crate::services::clock::ManualClock;
    use chrono::NaiveDate;

    fn clock() -> ManualClock {
        ManualClock::new(NaiveDate::from_ymd_opt(2022, 5, 15).unwrap().and_hms_opt(9, 0, 0).unwrap())
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.lot_name(), "ParkingLot");
        assert_eq!(config.floors(), 10);
        assert_eq!(config.slots_per_floor(), 100);
        assert_eq!(config.fee(), 500);
        assert_eq!(config.block_minutes(), 10);
        assert_eq!(config.billing(), BillingMode::Prorated);
        assert!(config.seeds().is_empty());
    }

    #[test]
    fn test_resolve_config_path() {
        env::set_var("CONFIG_FILE", "config/airport.toml");
        let from_env = Config::resolve_config_path(None);
        let from_cli = Config::resolve_config_path(Some("config/mall.toml".to_string()));
        env::remove_var("CONFIG_FILE");

        assert_eq!(from_env, "config/airport.toml");
        assert_eq!(from_cli, "config/mall.toml");
    }

    #[test]
    fn test_from_toml_str_defaults() {
        let config = Config::from_toml_str(
            r#"
[lot]
floors = 2
slots_per_floor = 6

[tariff]
fee = 300
"#,
        )
        .unwrap();
        assert_eq!(config.lot_name(), "ParkingLot");
        assert_eq!(config.block_minutes(), 10);
        assert_eq!(config.billing(), BillingMode::Prorated);
    }

    #[test]
    fn test_from_toml_str_rejects_negative_floors() {
        let result = Config::from_toml_str(
            r#"
[lot]
floors = -10
slots_per_floor = 100

[tariff]
fee = 500
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_lot_with_seeds() {
        let config = Config::default()
            .with_seed("100-9901", VehicleVariant::Compact, 10, 8)
            .with_seed("100-1000", VehicleVariant::Bus, 1, 100);

        let lot = config.build_lot(clock()).unwrap();

        assert_eq!(lot.occupied_count(), 2);
        assert!(lot.is_occupied(Location::new(1, 100)));
    }

    #[test]
    fn test_build_lot_rejects_mismatched_seed() {
        let config = Config::default().with_seed("200-2000", VehicleVariant::Standard, 1, 1);
        let err = config.build_lot(clock()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParkingError>(),
            Some(ParkingError::SlotTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_build_lot_rejects_zero_floors() {
        let mut config = Config::default();
        config.floors = 0;
        let err = config.build_lot(clock()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParkingError>(),
            Some(ParkingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_build_lot_rejects_empty_seed_plate() {
        let config = Config::default().with_seed("", VehicleVariant::Compact, 1, 1);
        let err = config.build_lot(clock()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ParkingError>(),
            Some(ParkingError::InvalidVehicle(_))
        ));
    }
}
