// Integration tests for the provisioning workflow
//
// These tests run the provisioner and the guarded service against the
// in-memory platform and check the observable platform state.

use std::sync::Arc;

use ctfbot_core::memory::{InMemoryChatPlatform, PlatformOperation};
use ctfbot_core::{
    Actor, BotError, ChannelRole, GuildContext, Permission, ProvisionOptions, ProvisionSettings,
    SingleOperatorPolicy, Snowflake, WorkflowStep, WorkspaceProvisioner, WorkspaceService,
    WorkspaceSpec,
};

const GUILD: Snowflake = Snowflake(500);
const OWNER: u64 = 4242;
const RESET_ID: &str = "777";

struct Fixture {
    platform: InMemoryChatPlatform,
    announcements: Snowflake,
    service: WorkspaceService,
    guild: GuildContext,
}

async fn fixture() -> Fixture {
    let platform = InMemoryChatPlatform::new();
    let announcements = platform.add_text_channel(GUILD, "announcements").await;
    let settings = ProvisionSettings {
        reset_identity: RESET_ID.to_string(),
        announcements_channel: announcements,
    };
    let service = WorkspaceService::new(Arc::new(platform.clone()), settings);
    Fixture {
        platform,
        announcements,
        service,
        guild: GuildContext::new(GUILD, GUILD),
    }
}

fn options(seed_headers: bool, announce: bool) -> ProvisionOptions {
    ProvisionOptions {
        seed_headers,
        announce,
    }
}

async fn provision(f: &Fixture, name: &str, opts: ProvisionOptions) -> ctfbot_core::Result<ctfbot_core::ProvisionedWorkspace> {
    f.service
        .provision(
            &SingleOperatorPolicy::new(OWNER),
            &Actor::new(OWNER),
            &WorkspaceSpec::new(name),
            opts,
            &f.guild,
        )
        .await
}

#[tokio::test]
async fn test_channels_created_in_fixed_order() {
    let f = fixture().await;
    let workspace = provision(&f, "ExampleCTF", options(false, false)).await.unwrap();

    let categories = f.platform.categories().await;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "ExampleCTF");
    assert_eq!(categories[0].id, workspace.group.id);

    let names: Vec<String> = f
        .platform
        .channels_in(workspace.group.id)
        .await
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(
        names,
        vec!["flag-feedback", "general", "web", "crypto", "pwn", "rev", "forensics", "misc"]
    );

    let roles: Vec<_> = workspace.group.channels.iter().map(|c| c.role).collect();
    assert_eq!(
        roles,
        ChannelRole::TOPOLOGY.iter().map(|r| Some(*r)).collect::<Vec<_>>()
    );
    assert!(workspace.report.is_complete());
}

#[tokio::test]
async fn test_only_flag_feedback_has_override() {
    let f = fixture().await;
    let workspace = provision(&f, "ExampleCTF", options(false, false)).await.unwrap();

    for channel in f.platform.channels_in(workspace.group.id).await {
        if channel.name == "flag-feedback" {
            assert_eq!(channel.overrides.len(), 1);
            let o = &channel.overrides[0];
            assert_eq!(o.role_id, GUILD);
            assert_eq!(o.allow, vec![Permission::ViewChannel]);
            assert_eq!(o.deny, vec![Permission::SendMessages]);
        } else {
            assert!(channel.overrides.is_empty(), "#{} has overrides", channel.name);
        }
    }
}

#[tokio::test]
async fn test_no_seed_no_announce_posts_nothing() {
    let f = fixture().await;
    provision(&f, "ExampleCTF", options(false, false)).await.unwrap();

    assert!(f.platform.messages().await.is_empty());
    assert_eq!(f.platform.call_count(PlatformOperation::AddReaction).await, 0);
}

#[tokio::test]
async fn test_seed_headers_posts_one_message_per_channel() {
    let f = fixture().await;
    let workspace = provision(&f, "ExampleCTF", options(true, false)).await.unwrap();

    let channels = f.platform.channels_in(workspace.group.id).await;
    let mut total = 0;
    for channel in &channels {
        let messages = f.platform.messages_in(channel.id).await;
        assert_eq!(messages.len(), 1, "#{} should have one seed", channel.name);
        total += messages.len();

        let content = &messages[0].content;
        match channel.name.as_str() {
            "flag-feedback" => {
                assert!(content.contains("FLAG FEEDBACK channel for ExampleCTF"));
                assert!(content.contains("<@777>"));
            }
            "general" => assert!(content.contains("General CTF Channel for ExampleCTF")),
            name => assert!(content.contains(name), "#{} seed should name itself", name),
        }
    }
    assert_eq!(total, 8);
    assert!(f.platform.messages_in(f.announcements).await.is_empty());
}

#[tokio::test]
async fn test_announce_posts_once_with_one_reaction() {
    let f = fixture().await;
    let workspace = provision(&f, "ExampleCTF", options(false, true)).await.unwrap();

    let announcements = f.platform.messages_in(f.announcements).await;
    assert_eq!(announcements.len(), 1);
    assert_eq!(announcements[0].content, "new ctf category for ExampleCTF added!");
    assert_eq!(announcements[0].reactions, vec!["\u{1F973}"]);
    assert_eq!(workspace.announcement, Some(announcements[0].id));
    assert_eq!(f.platform.messages().await.len(), 1);
}

#[tokio::test]
async fn test_seed_uses_creation_tags_not_names() {
    let platform = InMemoryChatPlatform::new();
    let announcements = platform.add_text_channel(GUILD, "announcements").await;
    let provisioner = WorkspaceProvisioner::new(
        Arc::new(platform.clone()),
        ProvisionSettings {
            reset_identity: RESET_ID.to_string(),
            announcements_channel: announcements,
        },
    );
    let workspace = provisioner
        .provision(
            &WorkspaceSpec::new("ExampleCTF"),
            options(true, false),
            &GuildContext::new(GUILD, GUILD),
        )
        .await
        .unwrap();

    let pwn = workspace.group.channel_for(ChannelRole::Pwn).unwrap();
    let seeds = platform.messages_in(pwn.id).await;
    assert_eq!(seeds.len(), 1);
    assert!(seeds[0].content.contains("related to pwn!"));
}

#[tokio::test]
async fn test_same_name_twice_creates_two_groups() {
    let f = fixture().await;
    let first = provision(&f, "ExampleCTF", options(false, false)).await.unwrap();
    let second = provision(&f, "ExampleCTF", options(false, false)).await.unwrap();

    assert_ne!(first.group.id, second.group.id);
    assert_eq!(f.platform.categories().await.len(), 2);
}

#[tokio::test]
async fn test_empty_name_is_not_validated() {
    let f = fixture().await;
    let workspace = provision(&f, "", options(false, false)).await.unwrap();
    assert_eq!(workspace.group.name, "");
}

#[tokio::test]
async fn test_non_owner_never_creates_category() {
    let f = fixture().await;
    let err = f
        .service
        .provision(
            &SingleOperatorPolicy::new(OWNER),
            &Actor::new(OWNER + 1),
            &WorkspaceSpec::new("ExampleCTF"),
            options(true, true),
            &f.guild,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, BotError::Unauthorized { actor_id } if actor_id == OWNER + 1));
    assert!(f.platform.calls().await.is_empty());
    assert!(f.platform.categories().await.is_empty());
}

#[tokio::test]
async fn test_channel_failure_reports_partial_provisioning() {
    let f = fixture().await;
    // Fourth channel is crypto
    f.platform.fail_on(PlatformOperation::CreateChannel, 4).await;

    let err = provision(&f, "ExampleCTF", options(true, true)).await.unwrap_err();
    let report = match &err {
        BotError::PartialProvisioning(report) => report,
        other => panic!("expected partial provisioning, got {:?}", other),
    };

    assert_eq!(report.completed().len(), 4);
    assert_eq!(
        report.failed().map(|r| r.step.clone()),
        Some(WorkflowStep::CreateChannel {
            role: ChannelRole::Crypto
        })
    );
    // pwn, rev, forensics, misc, 8 seeds, announce, reaction
    assert_eq!(report.pending().len(), 4 + 8 + 2);

    // No rollback: category and the first three channels remain
    let categories = f.platform.categories().await;
    assert_eq!(categories.len(), 1);
    let names: Vec<String> = f
        .platform
        .channels_in(categories[0].id)
        .await
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["flag-feedback", "general", "web"]);
    assert!(f.platform.messages().await.is_empty());
}

#[tokio::test]
async fn test_announcement_failure_keeps_workspace() {
    let f = fixture().await;
    // 8 seeds succeed, the announcement is the ninth message
    f.platform.fail_on(PlatformOperation::SendMessage, 9).await;

    let err = provision(&f, "ExampleCTF", options(true, true)).await.unwrap_err();
    let report = err.step_report().unwrap();
    assert_eq!(report.failed().map(|r| r.step.clone()), Some(WorkflowStep::Announce));
    assert_eq!(report.pending(), vec![&WorkflowStep::AddReaction]);
    assert_eq!(f.platform.messages().await.len(), 8);
    assert!(err.to_string().contains("not attempted: add reaction"));
}

#[tokio::test]
async fn test_category_failure_creates_nothing() {
    let f = fixture().await;
    f.platform.fail_on(PlatformOperation::CreateCategory, 1).await;

    let err = provision(&f, "ExampleCTF", options(false, false)).await.unwrap_err();
    let report = err.step_report().unwrap();
    assert!(report.completed().is_empty());
    assert_eq!(report.pending().len(), 8);
    assert_eq!(f.platform.call_count(PlatformOperation::CreateChannel).await, 0);
}
