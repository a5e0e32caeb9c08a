//! Flow-level session state
//!
//! Holds the completion report for the current run through the quiz. The
//! report is handed to an external notifier as JSON; how it is sent is not
//! this crate's business. Restarting the flow clears it.

use serde::{Deserialize, Serialize};

/// What gets reported once the user accepts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionReport {
    /// Times the decline control was clicked or dodged the pointer
    pub evasions: u32,
    /// Clock time (ms) of the accept
    pub accepted_at_ms: f64,
}

/// One run through the flow
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    completion: Option<CompletionReport>,
    /// How many times the flow was restarted from the beginning
    pub restarts: u32,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the completion; only the first report of a run is kept
    ///
    /// Returns the report if this call recorded it.
    pub fn record_completion(
        &mut self,
        evasions: u32,
        accepted_at_ms: f64,
    ) -> Option<CompletionReport> {
        if self.completion.is_some() {
            log::debug!("Completion already recorded, ignoring repeat");
            return None;
        }
        let report = CompletionReport {
            evasions,
            accepted_at_ms,
        };
        self.completion = Some(report);
        log::info!("Session complete ({} evasions)", evasions);
        Some(report)
    }

    pub fn completion(&self) -> Option<&CompletionReport> {
        self.completion.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// Payload for the external notifier
    pub fn payload_json(&self) -> Option<String> {
        let report = self.completion.as_ref()?;
        match serde_json::to_string(report) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("Failed to encode completion report: {}", e);
                None
            }
        }
    }

    /// Start over from the first screen
    ///
    /// The caller resets its evasion engine alongside this.
    pub fn restart(&mut self) {
        self.completion = None;
        self.restarts += 1;
        log::info!("Session restarted ({} restarts)", self.restarts);
    }
}
