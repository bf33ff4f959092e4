//! Cycle controller: generate, validate, then approve, retry or give up.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use super::generator::generate_outfit;
use super::state::OutfitState;
use super::validator::OutfitValidator;
use crate::ai::TextGenerator;

/// Where the loop stands after a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStatus {
    /// Inconsistent, attempts remain: generate again.
    Running,
    /// Consistent outfit found.
    Approved,
    /// Attempts exhausted with an inconsistent outfit.
    GivenUp,
}

impl CycleStatus {
    /// Whether the loop stops in this state.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

impl fmt::Display for CycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Approved => "approved",
            Self::GivenUp => "given_up",
        })
    }
}

/// Final result of one workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowOutcome {
    /// Identifier attached to this run's log records.
    pub run_id: Uuid,
    /// Terminal status (`Approved` or `GivenUp`).
    pub status: CycleStatus,
    /// Last state, returned as-is.
    pub state: OutfitState,
}

/// Drives the generate/validate loop with a fixed attempt bound.
#[derive(Debug, Clone, Copy)]
pub struct CycleController {
    max_attempts: u32,
    validator: OutfitValidator,
}

impl CycleController {
    /// Create a controller that gives up after `max_attempts` validation passes.
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts, validator: OutfitValidator::new() }
    }

    /// The configured attempt bound.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decide what happens after a validation pass.
    pub fn route(&self, state: &OutfitState) -> CycleStatus {
        if state.is_consistent() {
            CycleStatus::Approved
        } else if state.attempts >= self.max_attempts {
            CycleStatus::GivenUp
        } else {
            CycleStatus::Running
        }
    }

    /// Run one cycle: fan out generation, join, validate.
    pub async fn cycle<G>(&self, llm: &G, state: OutfitState) -> anyhow::Result<OutfitState>
    where
        G: TextGenerator + ?Sized,
    {
        tracing::info!(
            attempt = state.attempts + 1,
            max = self.max_attempts,
            "Starting outfit generation attempt"
        );

        let items = generate_outfit(llm).await?;
        let state = state.with_items(items);
        let verdict = self.validator.validate(llm, &state).await?;
        Ok(state.with_verdict(verdict))
    }

    /// Run the loop to a terminal status.
    ///
    /// Model failures abort the run; exhausting attempts does not.
    pub async fn run<G>(&self, llm: &G) -> anyhow::Result<WorkflowOutcome>
    where
        G: TextGenerator + ?Sized,
    {
        self.run_observed(llm, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_step` with the state after every cycle.
    pub async fn run_observed<G, F>(&self, llm: &G, mut on_step: F) -> anyhow::Result<WorkflowOutcome>
    where
        G: TextGenerator + ?Sized,
        F: FnMut(&OutfitState) + Send,
    {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("outfit_run", %run_id, provider = llm.name());

        async move {
            tracing::info!(max_attempts = self.max_attempts, "Workflow start");
            let mut state = OutfitState::new();

            loop {
                let attempt_span = tracing::info_span!("cycle", attempt = state.attempts + 1);
                state = self.cycle(llm, state).instrument(attempt_span).await?;
                on_step(&state);

                let status = self.route(&state);
                match status {
                    CycleStatus::Running => continue,
                    CycleStatus::Approved => {
                        tracing::info!(gender = ?state.gender, attempts = state.attempts, "Outfit approved");
                    }
                    CycleStatus::GivenUp => {
                        tracing::warn!(
                            max_attempts = self.max_attempts,
                            "Max attempts reached with inconsistent outfit, giving up"
                        );
                    }
                }

                tracing::info!(%status, "Workflow complete");
                return Ok(WorkflowOutcome { run_id, status, state });
            }
        }
        .instrument(span)
        .await
    }
}

impl Default for CycleController {
    fn default() -> Self {
        Self::new(crate::core::DEFAULT_MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::state::{Gender, GenderMap, Verdict};

    fn after(consistent: bool, attempts: u32) -> OutfitState {
        let gender = if consistent { Gender::Female } else { Gender::None };
        OutfitState::new().with_verdict(Verdict {
            genders: GenderMap::uniform(gender),
            gender,
            consistent,
            attempts,
        })
    }

    #[test]
    fn test_route_approves_consistent() {
        let controller = CycleController::new(5);
        assert_eq!(controller.route(&after(true, 1)), CycleStatus::Approved);
        assert_eq!(controller.route(&after(true, 5)), CycleStatus::Approved);
        assert_eq!(controller.route(&after(true, 99)), CycleStatus::Approved);
    }

    #[test]
    fn test_route_retries_below_limit() {
        let controller = CycleController::new(5);
        for attempts in 1..5 {
            assert_eq!(controller.route(&after(false, attempts)), CycleStatus::Running);
        }
    }

    #[test]
    fn test_route_gives_up_at_limit() {
        let controller = CycleController::new(5);
        assert_eq!(controller.route(&after(false, 5)), CycleStatus::GivenUp);
        assert_eq!(controller.route(&after(false, 6)), CycleStatus::GivenUp);
    }

    #[test]
    fn test_zero_limit_gives_up_after_first_pass() {
        let controller = CycleController::new(0);
        assert_eq!(controller.route(&after(false, 1)), CycleStatus::GivenUp);
    }

    #[test]
    fn test_status_terminal_and_display() {
        assert!(!CycleStatus::Running.is_terminal());
        assert!(CycleStatus::Approved.is_terminal());
        assert!(CycleStatus::GivenUp.is_terminal());
        assert_eq!(CycleStatus::GivenUp.to_string(), "given_up");
        assert_eq!(serde_json::to_value(CycleStatus::GivenUp).unwrap(), "given_up");
    }

    #[test]
    fn test_outcome_serializes_run_id() {
        let outcome = WorkflowOutcome {
            run_id: Uuid::nil(),
            status: CycleStatus::Approved,
            state: after(true, 1),
        };
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["run_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["status"], "approved");
        assert_eq!(json["state"]["attempts"], 1);
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(CycleController::default().max_attempts(), 5);
    }
}
