// Guarded workspace workflows
//
// WorkspaceService is the entry point the command surface uses: every call
// takes the authorization policy and the actor, and no platform call happens
// unless the policy approves.

use std::sync::Arc;

use tracing::warn;

use crate::auth::{ensure_authorized, Actor, AuthorizationPolicy};
use crate::error::Result;
use crate::ids::Snowflake;
use crate::provision::{ProvisionSettings, ProvisionedWorkspace, WorkspaceProvisioner};
use crate::teardown::{TeardownOutcome, WorkspaceTeardown};
use crate::traits::ChatPlatform;
use crate::workspace::{GuildContext, ProvisionOptions, WorkspaceSpec};

pub struct WorkspaceService {
    provisioner: WorkspaceProvisioner,
    teardown: WorkspaceTeardown,
}

impl WorkspaceService {
    pub fn new(platform: Arc<dyn ChatPlatform>, settings: ProvisionSettings) -> Self {
        Self {
            provisioner: WorkspaceProvisioner::new(platform.clone(), settings),
            teardown: WorkspaceTeardown::new(platform),
        }
    }

    pub fn provisioner(&self) -> &WorkspaceProvisioner {
        &self.provisioner
    }

    /// Authorize, then provision
    pub async fn provision(
        &self,
        policy: &dyn AuthorizationPolicy,
        actor: &Actor,
        spec: &WorkspaceSpec,
        options: ProvisionOptions,
        guild: &GuildContext,
    ) -> Result<ProvisionedWorkspace> {
        if let Err(e) = ensure_authorized(policy, actor) {
            warn!(actor_id = actor.id, workspace = spec.name(), "Provisioning denied");
            return Err(e);
        }
        self.provisioner.provision(spec, options, guild).await
    }

    /// Authorize, validate, then delete
    pub async fn teardown(
        &self,
        policy: &dyn AuthorizationPolicy,
        actor: &Actor,
        guild: &GuildContext,
        category: Snowflake,
    ) -> Result<TeardownOutcome> {
        if let Err(e) = ensure_authorized(policy, actor) {
            warn!(actor_id = actor.id, category_id = %category, "Teardown denied");
            return Err(e);
        }
        self.teardown.teardown(guild, category).await
    }
}
