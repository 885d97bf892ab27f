// Step ledger for multi-step remote workflows
//
// Provisioning and teardown are sequences of independent remote calls with
// no transaction around them. The ledger holds the planned steps, runs them
// one at a time in plan order, and records how far it got so a failure can
// report exactly what was done and what was never attempted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::{debug, error};

use crate::error::{BotError, Result};
use crate::workspace::ChannelRole;

/// A single remote mutation in a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowStep {
    CreateCategory,
    CreateChannel { role: ChannelRole },
    SeedChannel { role: ChannelRole },
    Announce,
    AddReaction,
    DeleteChannel { name: String },
    DeleteCategory,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowStep::CreateCategory => write!(f, "create category"),
            WorkflowStep::CreateChannel { role } => write!(f, "create #{}", role),
            WorkflowStep::SeedChannel { role } => write!(f, "seed #{}", role),
            WorkflowStep::Announce => write!(f, "announce"),
            WorkflowStep::AddReaction => write!(f, "add reaction"),
            WorkflowStep::DeleteChannel { name } => write!(f, "delete #{}", name),
            WorkflowStep::DeleteCategory => write!(f, "delete category"),
        }
    }
}

/// Where a step stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Completed,
    Failed,
}

/// A step and its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: WorkflowStep,
    pub status: StepStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Failure message (only for failed steps)
    pub error: Option<String>,
}

impl StepRecord {
    fn pending(step: WorkflowStep) -> Self {
        Self {
            step,
            status: StepStatus::Pending,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }
}

/// Full account of a workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    /// Human readable workflow label, e.g. `provision 'ExampleCTF'`
    pub workflow: String,
    pub steps: Vec<StepRecord>,
}

impl StepReport {
    pub fn new(workflow: impl Into<String>, plan: Vec<WorkflowStep>) -> Self {
        Self {
            workflow: workflow.into(),
            steps: plan.into_iter().map(StepRecord::pending).collect(),
        }
    }

    pub fn completed(&self) -> Vec<&WorkflowStep> {
        self.with_status(StepStatus::Completed)
    }

    pub fn pending(&self) -> Vec<&WorkflowStep> {
        self.with_status(StepStatus::Pending)
    }

    pub fn failed(&self) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.status == StepStatus::Failed)
    }

    /// Every planned step completed
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|r| r.status == StepStatus::Completed)
    }

    fn with_status(&self, status: StepStatus) -> Vec<&WorkflowStep> {
        self.steps
            .iter()
            .filter(|r| r.status == status)
            .map(|r| &r.step)
            .collect()
    }
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} of {} steps completed",
            self.workflow,
            self.completed().len(),
            self.steps.len()
        )?;

        if let Some(failed) = self.failed() {
            write!(f, "; failed at {}", failed.step)?;
            if let Some(error) = &failed.error {
                write!(f, " ({})", error)?;
            }
        }

        let pending = self.pending();
        if !pending.is_empty() {
            let names: Vec<String> = pending.iter().map(|s| s.to_string()).collect();
            write!(f, "; not attempted: {}", names.join(", "))?;
        }

        Ok(())
    }
}

/// Runs planned steps in order and records the outcome of each
#[derive(Debug)]
pub struct StepLedger {
    report: StepReport,
    cursor: usize,
}

impl StepLedger {
    pub fn new(workflow: impl Into<String>, plan: Vec<WorkflowStep>) -> Self {
        Self {
            report: StepReport::new(workflow, plan),
            cursor: 0,
        }
    }

    /// The step that runs next, if any
    pub fn next_step(&self) -> Option<&WorkflowStep> {
        self.report.steps.get(self.cursor).map(|r| &r.step)
    }

    /// Run the next planned step
    ///
    /// On success the step is marked completed and the cursor advances. On
    /// failure the step is marked failed and the error is returned; the
    /// remaining steps stay pending.
    pub async fn run<T, Fut>(&mut self, fut: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let index = self.cursor;
        match self.report.steps.get_mut(index) {
            Some(record) => {
                record.started_at = Some(Utc::now());
                debug!(workflow = %self.report.workflow, step = %record.step, "Running step");
            }
            None => {
                return Err(BotError::internal(format!(
                    "{}: no planned step left at position {}",
                    self.report.workflow, index
                )))
            }
        }

        let outcome = fut.await;

        let record = &mut self.report.steps[index];
        record.finished_at = Some(Utc::now());
        match outcome {
            Ok(value) => {
                record.status = StepStatus::Completed;
                self.cursor += 1;
                Ok(value)
            }
            Err(e) => {
                error!(workflow = %self.report.workflow, step = %record.step, error = %e, "Step failed");
                record.status = StepStatus::Failed;
                record.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn report(&self) -> &StepReport {
        &self.report
    }

    pub fn into_report(self) -> StepReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> Vec<WorkflowStep> {
        vec![
            WorkflowStep::CreateCategory,
            WorkflowStep::CreateChannel {
                role: ChannelRole::FlagFeedback,
            },
            WorkflowStep::CreateChannel {
                role: ChannelRole::General,
            },
        ]
    }

    #[tokio::test]
    async fn test_ledger_records_completion() {
        let mut ledger = StepLedger::new("provision 'x'", plan());
        for _ in 0..3 {
            ledger.run(async { Ok(()) }).await.unwrap();
        }

        let report = ledger.into_report();
        assert!(report.is_complete());
        assert_eq!(report.completed().len(), 3);
        assert!(report.steps.iter().all(|r| r.finished_at.is_some()));
    }

    #[tokio::test]
    async fn test_ledger_records_failure_and_pending() {
        let mut ledger = StepLedger::new("provision 'x'", plan());
        ledger.run(async { Ok(1u64) }).await.unwrap();
        let err = ledger
            .run(async { Err::<(), _>(BotError::platform("Missing Access")) })
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Platform(_)));

        let report = ledger.into_report();
        assert!(!report.is_complete());
        assert_eq!(report.completed(), vec![&WorkflowStep::CreateCategory]);
        let failed = report.failed().unwrap();
        assert_eq!(
            failed.step,
            WorkflowStep::CreateChannel {
                role: ChannelRole::FlagFeedback
            }
        );
        assert_eq!(
            report.pending(),
            vec![&WorkflowStep::CreateChannel {
                role: ChannelRole::General
            }]
        );

        let text = report.to_string();
        assert!(text.contains("1 of 3 steps completed"));
        assert!(text.contains("failed at create #flag-feedback"));
        assert!(text.contains("Missing Access"));
        assert!(text.contains("not attempted: create #general"));
    }

    #[tokio::test]
    async fn test_ledger_rejects_unplanned_step() {
        let mut ledger = StepLedger::new("empty", Vec::new());
        let err = ledger.run(async { Ok(()) }).await.unwrap_err();
        assert!(matches!(err, BotError::Internal(_)));
    }
}
