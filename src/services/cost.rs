//! Cost policy - turns a parked duration into a fee

use crate::domain::error::{ParkingError, Result};
use serde::Deserialize;

pub trait CostPolicy {
    /// Fee for `minutes` of parking. Negative durations are rejected.
    fn cost(&self, minutes: i64) -> Result<u64>;
}

/// How partial blocks are charged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    /// Charge per minute at the block rate, rounding up to the next currency unit
    #[default]
    Prorated,
    /// Round any started block up to a full block
    WholeBlocks,
}

impl BillingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingMode::Prorated => "prorated",
            BillingMode::WholeBlocks => "whole_blocks",
        }
    }
}

/// Flat fee per block of minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardCostPolicy {
    fee: u64,
    block_minutes: u64,
    mode: BillingMode,
}

impl StandardCostPolicy {
    pub fn new(fee: u64, block_minutes: u64, mode: BillingMode) -> Result<Self> {
        if block_minutes == 0 {
            return Err(ParkingError::InvalidConfiguration(
                "tariff block length must be at least one minute".to_string(),
            ));
        }
        Ok(Self { fee, block_minutes, mode })
    }

    /// Fee per `block_minutes`, prorated
    pub fn per_block(fee: u64, block_minutes: u64) -> Result<Self> {
        Self::new(fee, block_minutes, BillingMode::Prorated)
    }

    pub fn fee(&self) -> u64 {
        self.fee
    }

    pub fn block_minutes(&self) -> u64 {
        self.block_minutes
    }

    pub fn mode(&self) -> BillingMode {
        self.mode
    }
}

impl CostPolicy for StandardCostPolicy {
    fn cost(&self, minutes: i64) -> Result<u64> {
        let elapsed = u64::try_from(minutes).map_err(|_| ParkingError::NegativeDuration(minutes))?;
        let cost = match self.mode {
            BillingMode::Prorated => elapsed
                .checked_mul(self.fee)
                .map(|total| total.div_ceil(self.block_minutes)),
            BillingMode::WholeBlocks => elapsed.div_ceil(self.block_minutes).checked_mul(self.fee),
        };
        cost.ok_or(ParkingError::CostOverflow { minutes })
    }
}
