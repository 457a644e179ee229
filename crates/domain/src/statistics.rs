//! Terminal occupancy statistics.

use serde::{Deserialize, Serialize};

use crate::choices::ContainerSize;

/// Number of visits per container size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeCount {
    pub size: ContainerSize,
    pub count: i64,
}

/// Snapshot of visits and occupancy at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalStatistics {
    /// Every visit ever registered.
    pub total_visits: i64,
    /// Active visits (containers currently in the terminal).
    pub in_terminal: i64,
    /// Dispatched visits.
    pub left_terminal: i64,
    /// Active visits with an empty container.
    pub empty_in_terminal: i64,
    /// Active visits with a loaded container.
    pub loaded_in_terminal: i64,
    /// Active visits broken down by container size.
    pub in_terminal_by_size: Vec<SizeCount>,
    /// Visits registered today (UTC).
    pub arrived_today: i64,
    /// Visits dispatched today (UTC).
    pub dispatched_today: i64,
}
