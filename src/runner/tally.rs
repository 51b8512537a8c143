// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Run-wide success/failure accounting and the final exit code.
//!
//! Every host counts exactly once: a success, or a failure of either kind.
//! The exit code only distinguishes "everything succeeded" from "something
//! failed"; which hosts failed and why is reported per host as it happens.

use crate::error::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::session::SessionOutcome;

/// Increment-only counters for a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunTally {
    success_count: usize,
    failure_count: usize,
}

impl RunTally {
    pub fn record(&mut self, outcome: SessionOutcome) {
        if outcome.is_success() {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }
    }

    pub fn successes(&self) -> usize {
        self.success_count
    }

    pub fn failures(&self) -> usize {
        self.failure_count
    }

    /// Number of hosts processed.
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// 0 when no host failed, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.failure_count > 0 {
            EXIT_FAILURE
        } else {
            EXIT_SUCCESS
        }
    }
}

/// What a finished (or interrupted) run reports back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub tally: RunTally,
    /// The operator interrupted the run before the list was exhausted.
    pub interrupted: bool,
}

impl RunSummary {
    /// An interrupted run never reports full success.
    pub fn exit_code(&self) -> u8 {
        if self.interrupted {
            EXIT_FAILURE
        } else {
            self.tally.exit_code()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tally_succeeds() {
        let tally = RunTally::default();
        assert_eq!(tally.total(), 0);
        assert_eq!(tally.exit_code(), 0);
    }

    #[test]
    fn test_all_success() {
        let mut tally = RunTally::default();
        for _ in 0..3 {
            tally.record(SessionOutcome::Success);
        }
        assert_eq!(tally.successes(), 3);
        assert_eq!(tally.failures(), 0);
        assert_eq!(tally.exit_code(), 0);
    }

    #[test]
    fn test_any_failure_exits_one() {
        let mut tally = RunTally::default();
        tally.record(SessionOutcome::Success);
        tally.record(SessionOutcome::SudoFailure);
        assert_eq!(tally.exit_code(), 1);

        let mut tally = RunTally::default();
        tally.record(SessionOutcome::LoginFailure);
        assert_eq!(tally.exit_code(), 1);
    }

    #[test]
    fn test_counts_sum_to_total() {
        let mut tally = RunTally::default();
        let outcomes = [
            SessionOutcome::Success,
            SessionOutcome::LoginFailure,
            SessionOutcome::Success,
            SessionOutcome::SudoFailure,
            SessionOutcome::LoginFailure,
        ];
        for outcome in outcomes {
            tally.record(outcome);
        }
        assert_eq!(tally.successes(), 2);
        assert_eq!(tally.failures(), 3);
        assert_eq!(tally.total(), outcomes.len());
    }

    #[test]
    fn test_interrupted_run_fails() {
        let summary = RunSummary {
            tally: RunTally::default(),
            interrupted: true,
        };
        assert_eq!(summary.exit_code(), 1);

        let summary = RunSummary {
            tally: RunTally::default(),
            interrupted: false,
        };
        assert_eq!(summary.exit_code(), 0);
    }
}
