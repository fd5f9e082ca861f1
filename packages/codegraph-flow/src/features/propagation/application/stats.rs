//! Solver statistics

use serde::{Deserialize, Serialize};

/// Counters accumulated since the last reset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverStats {
    pub variants_created: usize,
    pub nodes_created: usize,
    pub rounds: usize,
    /// Work items that actually ran (stale items are not counted)
    pub work_executed: u64,
    pub optimizer_passes: usize,
    pub components_collapsed: usize,
    pub nodes_collapsed: usize,
    pub duration_ms: u64,
}

impl SolverStats {
    /// Average number of work items per round
    pub fn work_per_round(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.work_executed as f64 / self.rounds as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_per_round() {
        let mut stats = SolverStats::default();
        assert_eq!(stats.work_per_round(), 0.0);

        stats.rounds = 4;
        stats.work_executed = 10;
        assert_eq!(stats.work_per_round(), 2.5);
    }
}
