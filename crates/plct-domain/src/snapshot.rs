//! Read-only snapshots for analytics consumers
//!
//! Consumers fetch a fresh snapshot per request and decide for themselves
//! whether it is still fresh enough; nothing here caches.

use crate::{Company, CompanyId, Sector};
use std::time::Duration;

/// Filter applied when taking a snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotFilter {
    /// Restrict to one sector
    pub sector: Option<Sector>,
    /// Restrict to one report year
    pub report_year: Option<u16>,
    /// Include companies flagged `has_no_valid_initiatives`
    pub include_flagged: bool,
    /// Maximum companies to return
    pub limit: Option<usize>,
}

/// A persisted company with its initiative count
#[derive(Debug, Clone, PartialEq)]
pub struct CompanySummary {
    /// Storage id
    pub id: CompanyId,
    /// Company record
    pub company: Company,
    /// Number of stored initiatives
    pub initiative_count: usize,
}

/// Point-in-time view of persisted companies
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Unix seconds when the snapshot was read
    pub taken_at_secs: u64,
    /// Companies matching the filter
    pub companies: Vec<CompanySummary>,
}

impl Snapshot {
    /// Whether the snapshot is older than `freshness` at time `now_secs`
    pub fn is_stale(&self, now_secs: u64, freshness: Duration) -> bool {
        now_secs.saturating_sub(self.taken_at_secs) > freshness.as_secs()
    }

    /// Total initiatives across all companies
    pub fn initiative_total(&self) -> usize {
        self.companies.iter().map(|c| c.initiative_count).sum()
    }
}
