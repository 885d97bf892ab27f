// CTF Workspace Core
//
// This crate holds the platform-agnostic part of the bot:
// - Catalog records and the event formatter (read path)
// - The authorization guard, provisioner, validator and teardown (workflow path)
//
// Key design decisions:
// - Platform and catalog access go through traits (ChatPlatform, EventCatalog)
// - Authorization is an AuthorizationPolicy passed in at call time
// - Multi-step remote workflows run through a StepLedger that reports what
//   completed and what was never attempted; nothing is rolled back
// - Seeding addresses channels by the role tag attached at creation

pub mod auth;
pub mod error;
pub mod event;
pub mod format;
pub mod ids;
pub mod provision;
pub mod seed;
pub mod service;
pub mod step;
pub mod teardown;
pub mod traits;
pub mod validate;
pub mod workspace;

// In-memory implementations for tests and dry runs
pub mod memory;

// Re-exports for convenience
pub use auth::{authorize, ensure_authorized, Actor, AuthorizationPolicy, SingleOperatorPolicy};
pub use error::{BotError, Result};
pub use event::{normalize_event_id, EventRecord};
pub use format::{
    format_event, parse_event_timestamp, EventSummary, TimestampStyle, EVENT_TIMESTAMP_FORMAT,
};
pub use ids::Snowflake;
pub use provision::{
    plan_provisioning, ProvisionSettings, ProvisionedWorkspace, WorkspaceProvisioner,
};
pub use service::WorkspaceService;
pub use step::{StepLedger, StepReport, StepStatus, WorkflowStep};
pub use teardown::{TeardownOutcome, WorkspaceTeardown};
pub use traits::{ChatPlatform, EventCatalog};
pub use validate::{
    is_ctf_workspace, validate_for_teardown, TeardownCandidate, Validation, WorkspaceLifecycle,
};
pub use workspace::{
    ChannelGroup, ChannelRole, GroupChannel, GuildContext, Permission, PermissionOverride,
    ProvisionOptions, WorkspaceSpec,
};
