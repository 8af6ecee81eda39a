use std::collections::HashMap;

use super::error::{EventCommandKind, EventIssue, ValidationError, ValidationReport};
use crate::models::{Command, CommandVariant, EventPhase, Events};

impl EventCommandKind {
    /// Kind of command each lifecycle phase may run
    pub fn for_phase(phase: EventPhase) -> Self {
        match phase {
            EventPhase::PreStart | EventPhase::PostStop => EventCommandKind::Apply,
            EventPhase::PostStart | EventPhase::PreStop => EventCommandKind::Exec,
        }
    }

    fn accepts(&self, command: &Command) -> bool {
        match self {
            EventCommandKind::Apply => command.is_apply(),
            EventCommandKind::Exec => command.is_exec(),
        }
    }
}

/// Check that every event names a known command of the kind its phase runs.
///
/// Composite commands are accepted when their direct sub-commands all have the
/// right kind. Sub-commands that do not exist are left to command validation.
pub fn validate_events(events: &Events, commands: &[Command]) -> Result<(), ValidationReport> {
    let by_id: HashMap<String, &Command> = commands
        .iter()
        .map(|command| (command.id.to_lowercase(), command))
        .collect();

    let mut report = ValidationReport::new();
    for phase in EventPhase::ALL {
        for error in validate_phase(phase, events.phase(phase), &by_id) {
            report.push(error);
        }
    }
    report.into_result()
}

fn validate_phase(
    phase: EventPhase,
    names: &[String],
    by_id: &HashMap<String, &Command>,
) -> Vec<ValidationError> {
    let required = EventCommandKind::for_phase(phase);
    let mut unknown: Vec<String> = Vec::new();
    let mut wrong_type: Vec<String> = Vec::new();

    for name in names {
        let Some(command) = by_id.get(&name.to_lowercase()) else {
            push_unique(&mut unknown, name);
            continue;
        };

        let accepted = match command.variant() {
            Ok(Some(CommandVariant::Composite(composite))) => composite
                .commands
                .iter()
                .filter_map(|sub| by_id.get(&sub.to_lowercase()))
                .all(|sub| required.accepts(sub)),
            _ => required.accepts(command),
        };
        if !accepted {
            push_unique(&mut wrong_type, name);
        }
    }

    let mut errors = Vec::new();
    if !unknown.is_empty() {
        errors.push(ValidationError::InvalidEvent {
            phase,
            issue: EventIssue::UnknownCommands(unknown),
        });
    }
    if !wrong_type.is_empty() {
        errors.push(ValidationError::InvalidEvent {
            phase,
            issue: EventIssue::WrongCommandType {
                required,
                ids: wrong_type,
            },
        });
    }
    errors
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApplyCommand, CompositeCommand, ExecCommand};

    fn commands() -> Vec<Command> {
        vec![
            Command::exec("install", ExecCommand::new("tools", "npm install")),
            Command::exec("serve", ExecCommand::new("tools", "npm start")),
            Command::apply("init-db", ApplyCommand::new("db")),
            Command::apply("cleanup", ApplyCommand::new("db")),
            Command::composite("setup", CompositeCommand::new(["install", "serve"])),
            Command::composite("mixed", CompositeCommand::new(["install", "init-db"])),
            Command::composite("prepare", CompositeCommand::new(["init-db", "ghost"])),
        ]
    }

    fn messages(events: Events) -> Vec<String> {
        match validate_events(&events, &commands()) {
            Ok(()) => Vec::new(),
            Err(report) => report.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn phases_accept_their_command_kind() {
        let events = Events {
            pre_start: vec!["init-db".into(), "prepare".into()],
            post_start: vec!["install".into(), "SETUP".into()],
            pre_stop: vec!["serve".into()],
            post_stop: vec!["cleanup".into()],
        };
        assert!(messages(events).is_empty());
    }

    #[test]
    fn unknown_commands_are_reported_once() {
        let events = Events {
            post_start: vec!["missing".into(), "missing".into(), "other".into()],
            ..Default::default()
        };
        assert_eq!(
            messages(events),
            vec![
                "postStart type events are invalid: missing, other does not map to a valid devfile command"
            ]
        );
    }

    #[test]
    fn wrong_kinds_are_reported_per_phase() {
        let events = Events {
            pre_start: vec!["install".into(), "mixed".into()],
            pre_stop: vec!["cleanup".into(), "nope".into()],
            ..Default::default()
        };
        assert_eq!(
            messages(events),
            vec![
                "preStart type events are invalid: install, mixed should either map to an apply command or a composite command with apply commands",
                "preStop type events are invalid: nope does not map to a valid devfile command",
                "preStop type events are invalid: cleanup should either map to an exec command or a composite command with exec commands",
            ]
        );
    }

    #[test]
    fn no_events_pass() {
        assert!(messages(Events::default()).is_empty());
    }
}
