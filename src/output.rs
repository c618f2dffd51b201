// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes for dispatch reports.

use serde::Serialize;
use std::time::Instant;

use crate::controller::{DispatchReport, Outcome, Reconciliation, Submission};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with one line per handled event
    Normal,
    /// Only the final unit status
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    fn elapsed_secs(&self) -> Option<f64> {
        self.start_time.map(|t| t.elapsed().as_secs_f64())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => self.json_line(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.elapsed_secs(),
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.elapsed_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print the outcome of a dispatch.
    pub fn report(&self, report: &DispatchReport) {
        match self.mode {
            OutputMode::Normal => {
                for reconciliation in &report.handled {
                    println!("{}", describe(reconciliation));
                    for warning in &reconciliation.warnings {
                        println!("  warning: {}", warning.message);
                    }
                }
                if !report.pending.is_empty() {
                    let pending: Vec<&str> = report.pending.iter().map(|k| k.as_str()).collect();
                    println!("Deferred: {}", pending.join(", "));
                }
                if let Some(secs) = self.elapsed_secs() {
                    println!("Done in {secs:.1}s");
                }
            }
            OutputMode::Quiet => {
                if let Some(current) = report.current() {
                    println!("{}", current.unit);
                }
            }
            OutputMode::Json => {
                for reconciliation in &report.handled {
                    self.json_line(reconciliation);
                }
            }
        }
    }

    /// Print a serializable value: YAML for people, one JSON line otherwise.
    pub fn document(&self, value: &impl Serialize) {
        match self.mode {
            OutputMode::Json => self.json_line(value),
            OutputMode::Normal | OutputMode::Quiet => match serde_yaml::to_string(value) {
                Ok(yaml) => print!("{yaml}"),
                Err(e) => self.error(&format!("cannot render output: {e}")),
            },
        }
    }

    fn json_line(&self, value: &impl Serialize) {
        if let Ok(json) = serde_json::to_string(value) {
            println!("{json}");
        }
    }
}

fn describe(reconciliation: &Reconciliation) -> String {
    let mut line = format!("{}: unit {}", reconciliation.event, reconciliation.unit);
    if let Some(app) = &reconciliation.app {
        line.push_str(&format!(", application {app}"));
    }
    match reconciliation.submission {
        Submission::Submitted => line.push_str(", pod spec submitted"),
        Submission::Unchanged => line.push_str(", pod spec unchanged"),
        Submission::NotAttempted => {}
    }
    if reconciliation.outcome == Outcome::Deferred {
        line.push_str(" (deferred)");
    }
    line
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
