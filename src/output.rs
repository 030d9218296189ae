// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Prints operation results as text or JSON lines.

use serde::Serialize;
use std::time::Instant;

use crate::publish::{DeploymentResult, OperationResult};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
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

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a plain success message.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("{message}"),
            OutputMode::Json => self.emit(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration_secs(),
                result: None::<()>,
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Error: {message}"),
            OutputMode::Json => {
                let event = JsonEvent {
                    event: "error",
                    message,
                    duration_secs: self.duration_secs(),
                    result: None::<()>,
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    eprintln!("{json}");
                }
            }
        }
    }

    /// Print an operation result; returns whether it succeeded.
    pub fn operation(&self, result: &OperationResult) -> bool {
        match self.mode {
            OutputMode::Normal => {
                if result.success() {
                    self.timed(result.message());
                    for (key, value) in result.details() {
                        print_detail(key, value);
                    }
                } else {
                    eprintln!("Error: {}", result.message());
                }
            }
            OutputMode::Json => self.emit(&JsonEvent {
                event: event_name(result.success()),
                message: result.message(),
                duration_secs: self.duration_secs(),
                result: Some(result),
            }),
        }
        result.success()
    }

    /// Print a deploy or promote result; returns whether it succeeded.
    pub fn deployment(&self, result: &DeploymentResult) -> bool {
        match self.mode {
            OutputMode::Normal => {
                if result.success {
                    self.timed(&result.message);
                    if let Some(id) = &result.deployment_id {
                        println!("  edit: {id}");
                    }
                } else {
                    eprintln!("Error: {}", result.message);
                }
            }
            OutputMode::Json => self.emit(&JsonEvent {
                event: event_name(result.success),
                message: &result.message,
                duration_secs: self.duration_secs(),
                result: Some(result),
            }),
        }
        result.success
    }

    fn timed(&self, message: &str) {
        let elapsed = self.elapsed_secs();
        if elapsed > 0.0 {
            println!("{message} ({:.1}s)", elapsed);
        } else {
            println!("{message}");
        }
    }

    fn emit<T: Serialize>(&self, event: &JsonEvent<'_, T>) {
        if let Ok(json) = serde_json::to_string(event) {
            println!("{json}");
        }
    }
}

fn event_name(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

fn print_detail(key: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Array(items) if items.iter().all(|v| v.is_object()) => {
            println!("  {key}:");
            for item in items {
                println!("    {item}");
            }
        }
        serde_json::Value::String(text) => println!("  {key}: {text}"),
        other => println!("  {key}: {other}"),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonEvent<'a, T> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<T>,
}
