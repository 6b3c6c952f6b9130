//! Structured log stream handling.
//!
//! Remote runs emit newline-delimited JSON log lines alongside the plan.
//! Once the first `planned_change` log arrives, every later log that is not
//! itself plan output is held back and replayed after the rendered diff, so
//! the diff is not interleaved with unrelated logs. Lines that do not parse
//! as JSON pass straight through.

use serde::Deserialize;

/// The recognised log line types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    Version,
    PlannedChange,
    RefreshStart,
    RefreshComplete,
    ApplyStart,
    ApplyComplete,
    ChangeSummary,
    Outputs,
    Other,
}

impl<'de> Deserialize<'de> for LogType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "version" => LogType::Version,
            "planned_change" => LogType::PlannedChange,
            "refresh_start" => LogType::RefreshStart,
            "refresh_complete" => LogType::RefreshComplete,
            "apply_start" => LogType::ApplyStart,
            "apply_complete" => LogType::ApplyComplete,
            "change_summary" => LogType::ChangeSummary,
            "outputs" => LogType::Outputs,
            _ => LogType::Other,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct LogLine {
    #[serde(rename = "type")]
    log_type: LogType,
    #[serde(rename = "@message", default)]
    message: Option<String>,
}

/// Tracks plan progress in a log stream and defers logs that arrive
/// mid-plan.
#[derive(Debug, Default)]
pub struct LogStream {
    plan_started: bool,
    deferred: Vec<String>,
}

impl LogStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one line from the stream; returns the text to print now, if
    /// any. `planned_change` lines flip the stream into plan mode and are
    /// swallowed (the diff itself comes from the rendered plan).
    pub fn process_line(&mut self, line: &str) -> Option<String> {
        let Ok(log) = serde_json::from_str::<LogLine>(line) else {
            return Some(line.to_string());
        };

        if log.log_type == LogType::PlannedChange {
            self.plan_started = true;
            return None;
        }

        let text = log.message.unwrap_or_else(|| line.to_string());
        if self.plan_started {
            self.deferred.push(text);
            return None;
        }
        Some(text)
    }

    /// Whether a `planned_change` log has been seen.
    pub fn plan_started(&self) -> bool {
        self.plan_started
    }

    /// The logs held back during the plan, for replay after the diff.
    pub fn take_deferred(&mut self) -> Vec<String> {
        std::mem::take(&mut self.deferred)
    }
}
