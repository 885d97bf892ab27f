// Seed content posted into freshly provisioned channels

use crate::workspace::ChannelRole;

/// Reaction attached to the workspace announcement
pub const ANNOUNCEMENT_REACTION: &str = "\u{1F973}";

const RULE: &str = "-----------------------------";

/// Claim-flag instructions for the read-only flag-feedback channel
pub fn flag_feedback_header(ctf_name: &str, reset_identity: &str) -> String {
    format!(
        "🔥 This is the FLAG FEEDBACK channel for {ctf_name}! 🚩💻\n\n\
         here <@{reset_identity}> will send the claimed flag from the current CTF.\n\n\
         **You can claim a flag with /flag NAME_OF_THE_CHALLENGE_HERE.**\n\n\
         *please do not spam the bot with fake solved challenges🙏*\n\
         {RULE}"
    )
}

/// Etiquette notice for the general channel
pub fn general_header(ctf_name: &str) -> String {
    format!(
        "🌐 Welcome to the General CTF Channel for {ctf_name}! 🏴\u{200d}☠️💻\n\n\
         here you can talk about pretty much everything (please keep it related to the ctf though 🙏) \
         and please don't share flags here\n\
         {RULE}"
    )
}

/// Collaboration notice for a topic channel, naming the channel itself
pub fn topic_header(channel_name: &str) -> String {
    format!(
        "🚩 Welcome to the CTF Channel related to {channel_name}! 🕵️\u{200d}♂️💻\n\n\
         Share your knowledge, discuss vulns, and collaborate here! Let's get this! 💪\n\
         **Important: it's not good practice to share the flags here as intruders could steal them from us ( and we dont want that ofc )**\n\
         Remember, keep the conversation focused on {channel_name} CTF topic. Go Reset!! :ResetSec:\n\
         {RULE}"
    )
}

/// Seed message for a channel role
pub fn seed_message(role: ChannelRole, ctf_name: &str, reset_identity: &str) -> String {
    match role {
        ChannelRole::FlagFeedback => flag_feedback_header(ctf_name, reset_identity),
        ChannelRole::General => general_header(ctf_name),
        other => topic_header(other.channel_name()),
    }
}

/// Public announcement of a new workspace
pub fn announcement(ctf_name: &str) -> String {
    format!("new ctf category for {ctf_name} added!")
}
