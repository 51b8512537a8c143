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

use owo_colors::OwoColorize;
use std::time::Duration;

use crate::hostlist::Host;
use crate::runner::RunTally;
use crate::session::{SessionOutcome, SessionReport};

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format_command_header(command: &str, server_list: &str) -> String {
        format!(
            "\n{} {} on hosts from {}:\n{}\n",
            "►".cyan().bold(),
            "Executing".cyan(),
            server_list.bold(),
            format!("  {command}").dimmed()
        )
    }

    /// Progress line printed when a host is started.
    pub fn format_host_start(host: &Host) -> String {
        format!("{} {}: {}", "◐".yellow(), host.raw().bold(), "connecting".yellow())
    }

    /// Line printed when a host finishes successfully.
    pub fn format_host_success(report: &SessionReport) -> String {
        format!(
            "{} {}: {} {}",
            "●".green(),
            report.host.raw().bold(),
            "done".green(),
            format!("({})", format_duration(report.elapsed)).dimmed()
        )
    }

    /// Diagnostic printed to stderr when a host fails.
    pub fn format_host_failure(report: &SessionReport) -> String {
        let stage = match report.outcome {
            SessionOutcome::SudoFailure => "sudo",
            SessionOutcome::LoginFailure | SessionOutcome::Success => "login",
        };
        let message = format!("Unable to {stage} on {}", report.host.raw());
        match &report.reason {
            Some(reason) => format!(
                "{} {} {}",
                "●".red(),
                message.red(),
                format!("({reason})").dimmed()
            ),
            None => format!("{} {}", "●".red(), message.red()),
        }
    }

    /// Final summary. All-success summaries go to stdout, others to stderr.
    pub fn format_summary(tally: &RunTally, interrupted: bool) -> String {
        if interrupted {
            format!(
                "\n{} {}",
                "✗".yellow(),
                format!(
                    "interrupted after {} successes and {} failures",
                    tally.successes(),
                    tally.failures()
                )
                .yellow()
                .bold()
            )
        } else if tally.failures() == 0 {
            format!(
                "\n{} {}",
                "✓".green(),
                format!("completed successfully on {} systems", tally.successes())
                    .green()
                    .bold()
            )
        } else {
            format!(
                "\n{} {}",
                "✗".red(),
                format!(
                    "completed with {} failures and {} successes",
                    tally.failures(),
                    tally.successes()
                )
                .red()
                .bold()
            )
        }
    }
}

/// Format a Duration into a human-readable string
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs_f64();

    if total_seconds < 1.0 {
        format!("{:.1} ms", total_seconds * 1000.0)
    } else if total_seconds < 60.0 {
        format!("{total_seconds:.2} s")
    } else {
        let minutes = duration.as_secs() / 60;
        let seconds = duration.as_secs() % 60;
        if seconds == 0 {
            format!("{minutes}m")
        } else {
            format!("{minutes}m {seconds}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Context, FailureReason};

    fn report(outcome: SessionOutcome, reason: Option<FailureReason>) -> SessionReport {
        SessionReport {
            host: Host::parse("web1.example.com"),
            outcome,
            reason,
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_failure_lines_name_the_stage() {
        let line = OutputFormatter::format_host_failure(&report(
            SessionOutcome::LoginFailure,
            Some(FailureReason::DnsResolution),
        ));
        assert!(line.contains("Unable to login on web1.example.com"));
        assert!(line.contains("could not resolve hostname"));

        let line = OutputFormatter::format_host_failure(&report(
            SessionOutcome::SudoFailure,
            Some(FailureReason::Timeout(Context::Sudo)),
        ));
        assert!(line.contains("Unable to sudo on web1.example.com"));
    }

    #[test]
    fn test_success_line() {
        let line = OutputFormatter::format_host_success(&report(SessionOutcome::Success, None));
        assert!(line.contains("web1.example.com"));
        assert!(line.contains("1.50 s"));
    }

    #[test]
    fn test_summary_all_success() {
        let mut tally = RunTally::default();
        tally.record(SessionOutcome::Success);
        tally.record(SessionOutcome::Success);
        let summary = OutputFormatter::format_summary(&tally, false);
        assert!(summary.contains("completed successfully on 2 systems"));
    }

    #[test]
    fn test_summary_with_failures() {
        let mut tally = RunTally::default();
        tally.record(SessionOutcome::Success);
        tally.record(SessionOutcome::LoginFailure);
        tally.record(SessionOutcome::SudoFailure);
        let summary = OutputFormatter::format_summary(&tally, false);
        assert!(summary.contains("completed with 2 failures and 1 successes"));
    }

    #[test]
    fn test_summary_when_interrupted() {
        let mut tally = RunTally::default();
        tally.record(SessionOutcome::Success);
        tally.record(SessionOutcome::Success);
        let summary = OutputFormatter::format_summary(&tally, true);
        assert!(summary.contains("interrupted after 2 successes and 0 failures"));
        assert!(!summary.contains("completed successfully"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250.0 ms");
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.50 s");
        assert_eq!(format_duration(Duration::from_secs(120)), "2m");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
