// Slash command definitions

use std::fmt;
use std::str::FromStr;

use crate::model::{option_type, ApplicationCommand, CommandOptionDefinition, GUILD_CATEGORY};

/// Commands the bot answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    EventInfo,
    Upcoming,
    AddWorkspace,
    DeleteWorkspace,
}

impl CommandName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::EventInfo => "ctfinfo",
            CommandName::Upcoming => "upcoming",
            CommandName::AddWorkspace => "addctfchannels",
            CommandName::DeleteWorkspace => "delctfcategory",
        }
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ctfinfo" => Ok(CommandName::EventInfo),
            "upcoming" => Ok(CommandName::Upcoming),
            "addctfchannels" => Ok(CommandName::AddWorkspace),
            "delctfcategory" => Ok(CommandName::DeleteWorkspace),
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}

fn option(kind: u8, name: &str, description: &str) -> CommandOptionDefinition {
    CommandOptionDefinition {
        kind,
        name: name.to_string(),
        description: description.to_string(),
        required: true,
        channel_types: Vec::new(),
    }
}

/// Definitions to register with Discord
///
/// `delctfcategory` is only included when teardown is enabled.
pub fn command_definitions(teardown_enabled: bool) -> Vec<ApplicationCommand> {
    let mut commands = vec![
        ApplicationCommand {
            name: CommandName::EventInfo.to_string(),
            description: "Get more information about a CTF event".to_string(),
            options: vec![option(
                option_type::NUMBER,
                "eventid",
                "the event id of the ctf on ctftime",
            )],
        },
        ApplicationCommand {
            name: CommandName::Upcoming.to_string(),
            description: "Get the next 7 days of CTF events".to_string(),
            options: Vec::new(),
        },
        ApplicationCommand {
            name: CommandName::AddWorkspace.to_string(),
            description: "add ctf category channel by name".to_string(),
            options: vec![
                option(option_type::STRING, "ctf_name", "the name of the ctf"),
                option(
                    option_type::BOOLEAN,
                    "headers",
                    "if you need first message of the channel to be a header from the bot with disclaimers",
                ),
                option(
                    option_type::BOOLEAN,
                    "announce",
                    "announce the new category in the announcements channel",
                ),
            ],
        },
    ];

    if teardown_enabled {
        let mut category = option(option_type::CHANNEL, "category", "the ctf category to delete");
        category.channel_types = vec![GUILD_CATEGORY];
        commands.push(ApplicationCommand {
            name: CommandName::DeleteWorkspace.to_string(),
            description: "del ctf category channels by name".to_string(),
            options: vec![category],
        });
    }

    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for name in [
            CommandName::EventInfo,
            CommandName::Upcoming,
            CommandName::AddWorkspace,
            CommandName::DeleteWorkspace,
        ] {
            assert_eq!(name.as_str().parse::<CommandName>(), Ok(name));
        }
        assert!("ping".parse::<CommandName>().is_err());
    }

    #[test]
    fn test_teardown_command_is_gated() {
        let names: Vec<String> = command_definitions(false)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["ctfinfo", "upcoming", "addctfchannels"]);

        let with_teardown = command_definitions(true);
        assert_eq!(with_teardown.len(), 4);
        let del = &with_teardown[3];
        assert_eq!(del.name, "delctfcategory");
        assert_eq!(del.options[0].channel_types, vec![GUILD_CATEGORY]);
    }

    #[test]
    fn test_add_workspace_options_are_required() {
        let commands = command_definitions(false);
        let add = commands.iter().find(|c| c.name == "addctfchannels").unwrap();
        let kinds: Vec<(String, u8, bool)> = add
            .options
            .iter()
            .map(|o| (o.name.clone(), o.kind, o.required))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("ctf_name".to_string(), option_type::STRING, true),
                ("headers".to_string(), option_type::BOOLEAN, true),
                ("announce".to_string(), option_type::BOOLEAN, true),
            ]
        );
    }
}
