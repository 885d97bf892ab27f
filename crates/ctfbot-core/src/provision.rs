// Workspace Provisioner
//
// Turns a WorkspaceSpec into a category with the fixed channel topology,
// optionally seeded and announced. Every platform call is one planned step
// in a StepLedger; the first failing step ends the run and the error carries
// the ledger's report. Nothing already created is rolled back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{BotError, Result};
use crate::ids::Snowflake;
use crate::seed::{self, ANNOUNCEMENT_REACTION};
use crate::step::{StepLedger, StepReport, WorkflowStep};
use crate::traits::ChatPlatform;
use crate::workspace::{
    ChannelGroup, ChannelRole, GroupChannel, GuildContext, PermissionOverride, ProvisionOptions,
    WorkspaceSpec,
};

/// Deployment settings consumed by the provisioner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionSettings {
    /// Identity mentioned in the flag-feedback seed message
    pub reset_identity: String,
    /// Channel that receives workspace announcements
    pub announcements_channel: Snowflake,
}

/// Result of a completed provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionedWorkspace {
    pub group: ChannelGroup,
    /// Announcement message id, when announced
    pub announcement: Option<Snowflake>,
    pub report: StepReport,
}

/// Steps a provisioning run will take, in order
pub fn plan_provisioning(spec: &WorkspaceSpec, options: ProvisionOptions) -> Vec<WorkflowStep> {
    let mut plan = vec![WorkflowStep::CreateCategory];
    plan.extend(
        spec.topology()
            .iter()
            .map(|role| WorkflowStep::CreateChannel { role: *role }),
    );

    if options.seed_headers {
        plan.extend(
            spec.topology()
                .iter()
                .map(|role| WorkflowStep::SeedChannel { role: *role }),
        );
    }

    if options.announce {
        plan.push(WorkflowStep::Announce);
        plan.push(WorkflowStep::AddReaction);
    }

    plan
}

/// Creates CTF workspaces on a chat platform
///
/// Callers must have passed the authorization policy before calling
/// `provision`; see `WorkspaceService` for the guarded entry point.
pub struct WorkspaceProvisioner {
    platform: Arc<dyn ChatPlatform>,
    settings: ProvisionSettings,
}

impl WorkspaceProvisioner {
    pub fn new(platform: Arc<dyn ChatPlatform>, settings: ProvisionSettings) -> Self {
        Self { platform, settings }
    }

    pub fn settings(&self) -> &ProvisionSettings {
        &self.settings
    }

    /// Provision a workspace
    ///
    /// Two calls with the same name create two independent categories.
    pub async fn provision(
        &self,
        spec: &WorkspaceSpec,
        options: ProvisionOptions,
        guild: &GuildContext,
    ) -> Result<ProvisionedWorkspace> {
        info!(
            workspace = spec.name(),
            guild_id = %guild.guild_id,
            seed_headers = options.seed_headers,
            announce = options.announce,
            "Provisioning workspace"
        );

        let mut ledger = StepLedger::new(
            format!("provision '{}'", spec.name()),
            plan_provisioning(spec, options),
        );

        match self.execute(&mut ledger, spec, options, guild).await {
            Ok((group, announcement)) => {
                info!(
                    workspace = spec.name(),
                    category_id = %group.id,
                    channels = group.channels.len(),
                    "Workspace provisioned"
                );
                Ok(ProvisionedWorkspace {
                    group,
                    announcement,
                    report: ledger.into_report(),
                })
            }
            Err(e) => {
                let report = ledger.into_report();
                warn!(
                    workspace = spec.name(),
                    error = %e,
                    completed = report.completed().len(),
                    pending = report.pending().len(),
                    "Provisioning stopped"
                );
                Err(BotError::PartialProvisioning(Box::new(report)))
            }
        }
    }

    async fn execute(
        &self,
        ledger: &mut StepLedger,
        spec: &WorkspaceSpec,
        options: ProvisionOptions,
        guild: &GuildContext,
    ) -> Result<(ChannelGroup, Option<Snowflake>)> {
        let category = ledger
            .run(self.platform.create_category(guild, spec.name()))
            .await?;

        // Channels keep the role they were created for; seeding uses the
        // tag, never the channel's current name.
        let mut created: Vec<(ChannelRole, Snowflake)> = Vec::with_capacity(spec.topology().len());
        for role in spec.topology() {
            let overrides = if role.is_read_only() {
                vec![PermissionOverride::read_only(guild.default_role_id)]
            } else {
                Vec::new()
            };

            let channel = ledger
                .run(self.platform.create_text_channel(
                    guild,
                    category,
                    role.channel_name(),
                    &overrides,
                ))
                .await?;
            created.push((*role, channel));
        }

        if options.seed_headers {
            for (role, channel) in &created {
                let content =
                    seed::seed_message(*role, spec.name(), &self.settings.reset_identity);
                ledger
                    .run(self.platform.send_message(*channel, &content))
                    .await?;
            }
        }

        let announcement = if options.announce {
            let channel = self.settings.announcements_channel;
            let content = seed::announcement(spec.name());
            let message = ledger
                .run(self.platform.send_message(channel, &content))
                .await?;
            ledger
                .run(
                    self.platform
                        .add_reaction(channel, message, ANNOUNCEMENT_REACTION),
                )
                .await?;
            Some(message)
        } else {
            None
        };

        let group = ChannelGroup {
            id: category,
            name: spec.name().to_string(),
            channels: created
                .into_iter()
                .map(|(role, id)| GroupChannel {
                    id,
                    name: role.channel_name().to_string(),
                    role: Some(role),
                })
                .collect(),
        };

        Ok((group, announcement))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_without_options() {
        let plan = plan_provisioning(&WorkspaceSpec::new("x"), ProvisionOptions::default());
        assert_eq!(plan.len(), 9);
        assert_eq!(plan[0], WorkflowStep::CreateCategory);
        assert_eq!(
            plan[1],
            WorkflowStep::CreateChannel {
                role: ChannelRole::FlagFeedback
            }
        );
        assert_eq!(
            plan[8],
            WorkflowStep::CreateChannel {
                role: ChannelRole::Misc
            }
        );
    }

    #[test]
    fn test_plan_with_all_options() {
        let plan = plan_provisioning(
            &WorkspaceSpec::new("x"),
            ProvisionOptions {
                seed_headers: true,
                announce: true,
            },
        );
        assert_eq!(plan.len(), 1 + 8 + 8 + 2);
        assert_eq!(
            plan[9],
            WorkflowStep::SeedChannel {
                role: ChannelRole::FlagFeedback
            }
        );
        assert_eq!(plan[17], WorkflowStep::Announce);
        assert_eq!(plan[18], WorkflowStep::AddReaction);
    }
}
