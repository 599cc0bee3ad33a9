//! Lot activity counters and summary reporting
//!
//! NOTE: All atomics use Relaxed ordering intentionally—these are statistical
//! counters only. Do NOT use these atomics for coordination or logic decisions.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Counters for one lot
#[derive(Debug, Default)]
pub struct LotMetrics {
    sessions_entered: AtomicU64,
    vehicles_parked: AtomicU64,
    park_rejections: AtomicU64,
    vehicles_moved_out: AtomicU64,
    departures: AtomicU64,
    receipts_issued: AtomicU64,
    revenue: AtomicU64,
    billed_minutes: AtomicU64,
}

impl LotMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_enter(&self) {
        self.sessions_entered.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_park(&self) {
        self.vehicles_parked.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_park_rejected(&self) {
        self.park_rejections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_move_out(&self) {
        self.vehicles_moved_out.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_departure(&self) {
        self.departures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_receipt(&self, minutes: u64, cost: u64) {
        self.receipts_issued.fetch_add(1, Ordering::Relaxed);
        self.billed_minutes.fetch_add(minutes, Ordering::Relaxed);
        self.revenue.fetch_add(cost, Ordering::Relaxed);
    }

    pub fn sessions_entered(&self) -> u64 {
        self.sessions_entered.load(Ordering::Relaxed)
    }

    pub fn vehicles_parked(&self) -> u64 {
        self.vehicles_parked.load(Ordering::Relaxed)
    }

    pub fn park_rejections(&self) -> u64 {
        self.park_rejections.load(Ordering::Relaxed)
    }

    pub fn receipts_issued(&self) -> u64 {
        self.receipts_issued.load(Ordering::Relaxed)
    }

    pub fn revenue(&self) -> u64 {
        self.revenue.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of every counter plus current occupancy
    pub fn report(&self, occupied: usize, capacity: usize) -> MetricsSummary {
        let receipts = self.receipts_issued.load(Ordering::Relaxed);
        let billed_minutes = self.billed_minutes.load(Ordering::Relaxed);
        MetricsSummary {
            sessions_entered: self.sessions_entered.load(Ordering::Relaxed),
            vehicles_parked: self.vehicles_parked.load(Ordering::Relaxed),
            park_rejections: self.park_rejections.load(Ordering::Relaxed),
            vehicles_moved_out: self.vehicles_moved_out.load(Ordering::Relaxed),
            departures: self.departures.load(Ordering::Relaxed),
            receipts_issued: receipts,
            revenue: self.revenue.load(Ordering::Relaxed),
            avg_billed_minutes: if receipts > 0 { billed_minutes / receipts } else { 0 },
            occupied,
            capacity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSummary {
    pub sessions_entered: u64,
    pub vehicles_parked: u64,
    pub park_rejections: u64,
    pub vehicles_moved_out: u64,
    pub departures: u64,
    pub receipts_issued: u64,
    pub revenue: u64,
    pub avg_billed_minutes: u64,
    pub occupied: usize,
    pub capacity: usize,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            entered = %self.sessions_entered,
            parked = %self.vehicles_parked,
            rejected = %self.park_rejections,
            moved_out = %self.vehicles_moved_out,
            departed = %self.departures,
            receipts = %self.receipts_issued,
            revenue = %self.revenue,
            avg_billed_minutes = %self.avg_billed_minutes,
            occupied = %self.occupied,
            capacity = %self.capacity,
            "metrics"
        );
    }
}
