// Workspace Validator
//
// Structural check used to gate teardown. It only looks at channel names, so
// an unrelated category that happens to contain "web" and "forensics"
// passes.

use crate::workspace::ChannelGroup;

/// Channel names a group must contain to count as a CTF workspace
pub const REQUIRED_CHANNELS: [&str; 2] = ["web", "forensics"];

/// Required names absent from the group
pub fn missing_required_channels(group: &ChannelGroup) -> Vec<&'static str> {
    REQUIRED_CHANNELS
        .into_iter()
        .filter(|required| !group.channel_names().any(|name| name == *required))
        .collect()
}

/// True iff the group's channel names are a superset of `REQUIRED_CHANNELS`
pub fn is_ctf_workspace(group: &ChannelGroup) -> bool {
    missing_required_channels(group).is_empty()
}

/// Lifecycle of a workspace with respect to teardown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceLifecycle {
    /// In use; not cleared for deletion
    Active,
    /// Passed validation; may be deleted
    ValidatedForTeardown,
}

/// A group that passed validation
///
/// Only `validate_for_teardown` constructs one, so holding a candidate proves
/// the check ran against this snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownCandidate {
    group: ChannelGroup,
}

impl TeardownCandidate {
    pub fn group(&self) -> &ChannelGroup {
        &self.group
    }

    pub fn into_group(self) -> ChannelGroup {
        self.group
    }
}

/// Validator verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Validated(TeardownCandidate),
    Rejected {
        group: ChannelGroup,
        missing: Vec<&'static str>,
    },
}

impl Validation {
    pub fn lifecycle(&self) -> WorkspaceLifecycle {
        match self {
            Validation::Validated(_) => WorkspaceLifecycle::ValidatedForTeardown,
            Validation::Rejected { .. } => WorkspaceLifecycle::Active,
        }
    }
}

/// Run the validator over a snapshot
pub fn validate_for_teardown(group: ChannelGroup) -> Validation {
    let missing = missing_required_channels(&group);
    if missing.is_empty() {
        Validation::Validated(TeardownCandidate { group })
    } else {
        Validation::Rejected { group, missing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Snowflake;
    use crate::workspace::GroupChannel;

    fn group(names: &[&str]) -> ChannelGroup {
        ChannelGroup {
            id: Snowflake(1),
            name: "ExampleCTF".to_string(),
            channels: names
                .iter()
                .enumerate()
                .map(|(idx, name)| GroupChannel {
                    id: Snowflake(100 + idx as u64),
                    name: name.to_string(),
                    role: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_full_topology_is_ctf_workspace() {
        let g = group(&[
            "flag-feedback",
            "general",
            "web",
            "crypto",
            "pwn",
            "rev",
            "forensics",
            "misc",
        ]);
        assert!(is_ctf_workspace(&g));
    }

    #[test]
    fn test_minimal_superset() {
        assert!(is_ctf_workspace(&group(&["forensics", "web"])));
        assert!(is_ctf_workspace(&group(&["memes", "web", "forensics", "random"])));
    }

    #[test]
    fn test_missing_either_name() {
        assert!(!is_ctf_workspace(&group(&["web", "crypto", "pwn"])));
        assert!(!is_ctf_workspace(&group(&["forensics", "misc"])));
        assert!(!is_ctf_workspace(&group(&[])));
    }

    #[test]
    fn test_duplicate_names_do_not_count_twice() {
        assert!(!is_ctf_workspace(&group(&["web", "web"])));
        assert_eq!(missing_required_channels(&group(&["web", "web"])), vec!["forensics"]);
    }

    #[test]
    fn test_match_is_exact() {
        assert!(!is_ctf_workspace(&group(&["Web", "forensics-2"])));
    }

    #[test]
    fn test_validation_lifecycle() {
        let validated = validate_for_teardown(group(&["web", "forensics"]));
        assert_eq!(validated.lifecycle(), WorkspaceLifecycle::ValidatedForTeardown);

        let rejected = validate_for_teardown(group(&["general"]));
        assert_eq!(rejected.lifecycle(), WorkspaceLifecycle::Active);
        match rejected {
            Validation::Rejected { missing, .. } => assert_eq!(missing, vec!["web", "forensics"]),
            Validation::Validated(_) => panic!("expected rejection"),
        }
    }
}
