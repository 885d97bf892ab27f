// Workspace teardown
//
// Deletes a category and its children, but only after the validator has
// accepted a fresh snapshot of it. A rejected category is a normal outcome.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{BotError, Result};
use crate::ids::Snowflake;
use crate::step::{StepLedger, StepReport, WorkflowStep};
use crate::traits::ChatPlatform;
use crate::validate::{validate_for_teardown, TeardownCandidate, Validation};
use crate::workspace::GuildContext;

/// What happened to a teardown request
#[derive(Debug, Clone)]
pub enum TeardownOutcome {
    /// Category and all of its channels were deleted
    Deleted {
        name: String,
        channels_deleted: usize,
        report: StepReport,
    },
    /// Category does not look like a CTF workspace; nothing was touched
    Rejected {
        name: String,
        missing: Vec<&'static str>,
    },
}

/// Steps a teardown will take: every child channel, then the category
pub fn plan_teardown(candidate: &TeardownCandidate) -> Vec<WorkflowStep> {
    let mut plan: Vec<WorkflowStep> = candidate
        .group()
        .channels
        .iter()
        .map(|c| WorkflowStep::DeleteChannel {
            name: c.name.clone(),
        })
        .collect();
    plan.push(WorkflowStep::DeleteCategory);
    plan
}

/// Removes validated CTF workspaces
pub struct WorkspaceTeardown {
    platform: Arc<dyn ChatPlatform>,
}

impl WorkspaceTeardown {
    pub fn new(platform: Arc<dyn ChatPlatform>) -> Self {
        Self { platform }
    }

    pub async fn teardown(
        &self,
        guild: &GuildContext,
        category: Snowflake,
    ) -> Result<TeardownOutcome> {
        let group = self
            .platform
            .fetch_category(guild, category)
            .await?
            .ok_or_else(|| BotError::not_found(format!("category {}", category)))?;

        match validate_for_teardown(group) {
            Validation::Rejected { group, missing } => {
                warn!(
                    category_id = %group.id,
                    name = %group.name,
                    missing = ?missing,
                    "Refusing to tear down non-CTF category"
                );
                Ok(TeardownOutcome::Rejected {
                    name: group.name,
                    missing,
                })
            }
            Validation::Validated(candidate) => self.delete(candidate).await,
        }
    }

    async fn delete(&self, candidate: TeardownCandidate) -> Result<TeardownOutcome> {
        let mut ledger = StepLedger::new(
            format!("teardown '{}'", candidate.group().name),
            plan_teardown(&candidate),
        );

        let group = candidate.into_group();
        info!(
            category_id = %group.id,
            name = %group.name,
            channels = group.channels.len(),
            "Tearing down workspace"
        );

        let mut result = Ok(());
        for channel in &group.channels {
            result = ledger.run(self.platform.delete_channel(channel.id)).await;
            if result.is_err() {
                break;
            }
        }
        if result.is_ok() {
            result = ledger.run(self.platform.delete_channel(group.id)).await;
        }

        match result {
            Ok(()) => {
                info!(name = %group.name, "Workspace deleted");
                Ok(TeardownOutcome::Deleted {
                    name: group.name,
                    channels_deleted: group.channels.len(),
                    report: ledger.into_report(),
                })
            }
            Err(_) => Err(BotError::PartialTeardown(Box::new(ledger.into_report()))),
        }
    }
}
