//! Precomputed phase schedule of a configuration.

use serde::Serialize;

use crate::types::{Phase, TabataConfig};

/// One countdown segment of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedPhase {
    /// Phase of the segment
    pub phase: Phase,
    /// Round the segment belongs to
    pub round: u32,
    /// Segment length in seconds
    pub seconds: u32,
}

/// The segments a run visits, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionPlan {
    /// Configuration the plan was built from
    pub config: TabataConfig,
    /// Segments in visiting order (Done excluded)
    pub phases: Vec<PlannedPhase>,
}

impl SessionPlan {
    /// Builds the plan for `config`.
    pub fn from_config(config: &TabataConfig) -> Self {
        let mut phases = Vec::with_capacity(config.total_rounds as usize * 2);
        phases.push(PlannedPhase {
            phase: Phase::Prepare,
            round: 1,
            seconds: config.prepare_seconds,
        });

        for round in 1..=config.total_rounds {
            phases.push(PlannedPhase {
                phase: Phase::Work,
                round,
                seconds: config.work_seconds,
            });
            if round < config.total_rounds {
                phases.push(PlannedPhase {
                    phase: Phase::Rest,
                    round,
                    seconds: config.rest_seconds,
                });
            }
        }

        Self {
            config: *config,
            phases,
        }
    }

    /// Total length of the run in seconds.
    pub fn total_seconds(&self) -> u64 {
        self.phases.iter().map(|p| u64::from(p.seconds)).sum()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Returns true if the plan has no segments.
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}
