//! # Role Lookup Commands
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.1.0

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

pub fn create_commands() -> Vec<CreateApplicationCommand> {
    let mut roles = CreateApplicationCommand::default();
    roles
        .name("roles")
        .description("Check the roles of a user")
        .create_option(|option| {
            option
                .name("target")
                .description("User to check the roles of")
                .kind(CommandOptionType::User)
                .required(true)
        });

    let mut members = CreateApplicationCommand::default();
    members
        .name("members")
        .description("Check the members of a role")
        .create_option(|option| {
            option
                .name("role")
                .description("Role to check members for")
                .kind(CommandOptionType::Role)
                .required(true)
        });

    vec![roles, members]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_lookup_options_are_required() {
        for command in create_commands() {
            let options = command.0.get("options").unwrap().as_array().unwrap();
            assert_eq!(options.len(), 1);
            assert_eq!(options[0].get("required").and_then(|v| v.as_bool()), Some(true));
        }
    }
}
