use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use super::error::{CommandIssue, DefaultCommandRef, ValidationError, ValidationReport, Violation};
use super::provenance::{ImportProvenance, resolve_import_attributes};
use crate::models::{
    ApplyCommand, Command, CommandVariant, Component, ExecCommand, GroupKind, find_duplicate_key,
};

/// Validate the command list against the component list.
///
/// Duplicate ids and per-command reference errors stop at the first failure.
/// Group default errors are collected for every group kind.
pub fn validate_commands(
    commands: &[Command],
    components: &[Component],
) -> Result<(), ValidationReport> {
    if let Some(duplicate) = find_duplicate_key(commands) {
        return Err(ValidationReport::single(ValidationError::DuplicateKey {
            key: duplicate.id.clone(),
        }));
    }

    let index = CommandIndex::new(commands);
    for command in commands {
        if let Err(error) = index.validate(command, components) {
            return Err(ValidationReport::single(resolve_import_attributes(
                error,
                &command.attributes,
            )));
        }
    }

    let mut groups: BTreeMap<GroupKind, Vec<&Command>> = BTreeMap::new();
    for command in commands {
        if let Some(group) = command.group() {
            groups.entry(group.kind).or_default().push(command);
        }
    }

    let mut report = ValidationReport::new();
    for (kind, members) in groups {
        if let Some(violation) = validate_group(kind, &members) {
            report.push(violation);
        }
    }

    debug!(
        "Checked {} commands ({} violations)",
        commands.len(),
        report.len()
    );
    report.into_result()
}

/// Case-insensitive lookup of commands and their composite sub-command lists
struct CommandIndex<'a> {
    by_id: HashMap<String, &'a Command>,
    subcommands: HashMap<String, &'a [String]>,
}

impl<'a> CommandIndex<'a> {
    fn new(commands: &'a [Command]) -> Self {
        let mut by_id = HashMap::new();
        let mut subcommands = HashMap::new();

        for command in commands {
            let key = command.id.to_lowercase();
            if let Ok(Some(CommandVariant::Composite(composite))) = command.variant() {
                subcommands.insert(key.clone(), composite.commands.as_slice());
            }
            by_id.insert(key, command);
        }

        Self { by_id, subcommands }
    }

    fn validate(&self, command: &Command, components: &[Component]) -> Result<(), ValidationError> {
        let mut visiting = HashSet::new();
        self.visit(command, components, &mut visiting)
    }

    fn visit(
        &self,
        command: &Command,
        components: &[Component],
        visiting: &mut HashSet<String>,
    ) -> Result<(), ValidationError> {
        let variant = command
            .variant()
            .map_err(|reason| ValidationError::InvalidUnion {
                entity: format!("command \"{}\"", command.id),
                reason,
            })?;

        match variant {
            Some(CommandVariant::Composite(_)) => {
                self.visit_composite(command, components, visiting)
            }
            Some(CommandVariant::Exec(ExecCommand { component, .. }))
            | Some(CommandVariant::Apply(ApplyCommand { component, .. })) => {
                validate_command_component(command, component, components)
            }
            _ => Err(ValidationError::InvalidCommandType {
                id: command.id.clone(),
            }),
        }
    }

    fn visit_composite(
        &self,
        command: &Command,
        components: &[Component],
        visiting: &mut HashSet<String>,
    ) -> Result<(), ValidationError> {
        let key = command.id.to_lowercase();
        let invalid = |issue| ValidationError::InvalidCommand {
            id: command.id.clone(),
            issue,
        };

        visiting.insert(key.clone());
        let subcommands = self.subcommands.get(&key).copied().unwrap_or_default();

        for sub_id in subcommands {
            let sub_key = sub_id.to_lowercase();
            if sub_key == key {
                return Err(invalid(CommandIssue::SelfReference));
            }
            if visiting.contains(&sub_key) {
                return Err(invalid(CommandIssue::IndirectSelfReference));
            }
            let Some(sub) = self.by_id.get(&sub_key) else {
                return Err(invalid(CommandIssue::MissingSubCommand(sub_id.clone())));
            };

            self.visit(sub, components, visiting)?;
            visiting.remove(&sub_key);
        }

        Ok(())
    }
}

/// An exec or apply command must name an existing container component
fn validate_command_component(
    command: &Command,
    component_name: &str,
    components: &[Component],
) -> Result<(), ValidationError> {
    let found = components
        .iter()
        .any(|component| component.name == component_name && component.is_container());

    if found {
        Ok(())
    } else {
        Err(ValidationError::InvalidCommand {
            id: command.id.clone(),
            issue: CommandIssue::NotContainerComponent,
        })
    }
}

/// A group with more than one command needs exactly one default
fn validate_group(kind: GroupKind, members: &[&Command]) -> Option<Violation> {
    if members.len() <= 1 {
        return None;
    }

    let defaults: Vec<&Command> = members
        .iter()
        .copied()
        .filter(|command| command.group().is_some_and(|group| group.is_default))
        .collect();

    match defaults.len() {
        0 => Some(ValidationError::MissingDefaultCommand { kind }.into()),
        1 => None,
        _ => Some(
            ValidationError::MultipleDefaultCommands {
                kind,
                commands: defaults
                    .iter()
                    .map(|command| DefaultCommandRef {
                        id: command.id.clone(),
                        provenance: ImportProvenance::from_attributes(&command.attributes),
                    })
                    .collect(),
            }
            .into(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Attributes, CommandGroup, CompositeCommand, ContainerComponent, CustomCommand,
        IMPORT_SOURCE_ATTRIBUTE, VolumeComponent,
    };
    use crate::validation::error::ViolationKind;

    fn components() -> Vec<Component> {
        vec![
            Component::container("tools", ContainerComponent::new("golang")),
            Component::volume("data", VolumeComponent::sized("1Gi")),
        ]
    }

    fn exec(id: &str) -> Command {
        Command::exec(id, ExecCommand::new("tools", "make"))
    }

    fn composite(id: &str, subs: &[&str]) -> Command {
        Command::composite(id, CompositeCommand::new(subs.iter().copied()))
    }

    fn single_error(result: Result<(), ValidationReport>) -> String {
        let report = result.unwrap_err();
        assert_eq!(report.len(), 1, "{report}");
        report.to_string()
    }

    #[test]
    fn valid_commands_pass() {
        let commands = vec![
            exec("build"),
            Command::apply("deploy", ApplyCommand::new("tools")),
            composite("all", &["build", "deploy"]),
        ];
        assert!(validate_commands(&commands, &components()).is_ok());
    }

    #[test]
    fn duplicate_ids_are_case_insensitive() {
        let commands = vec![exec("Build"), exec("build")];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "duplicate key: build"
        );
    }

    #[test]
    fn exec_must_reference_container() {
        let commands = vec![Command::exec("run", ExecCommand::new("data", "ls"))];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "the command \"run\" is invalid - command does not map to a container component"
        );

        let commands = vec![Command::apply("deploy", ApplyCommand::new("missing"))];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "the command \"deploy\" is invalid - command does not map to a container component"
        );
    }

    #[test]
    fn custom_and_empty_commands_have_invalid_type() {
        let commands = vec![Command::custom("gen", CustomCommand::default())];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "command gen has invalid type"
        );

        let empty = Command {
            id: "nothing".into(),
            ..Default::default()
        };
        let report = validate_commands(&[empty], &components()).unwrap_err();
        assert_eq!(report.kinds(), vec![ViolationKind::InvalidCommandType]);
    }

    #[test]
    fn composite_self_reference() {
        let commands = vec![composite("loop", &["LOOP"])];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "the command \"loop\" is invalid - composite command cannot reference itself"
        );
    }

    #[test]
    fn composite_indirect_self_reference() {
        let commands = vec![composite("a", &["b"]), composite("b", &["a"])];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "the command \"b\" is invalid - composite command cannot indirectly reference itself"
        );
    }

    #[test]
    fn composite_missing_subcommand() {
        let commands = vec![exec("build"), composite("all", &["build", "test"])];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "the command \"all\" is invalid - the command \"test\" mentioned in the composite command does not exist"
        );
    }

    #[test]
    fn composite_reports_nested_component_errors() {
        let commands = vec![
            Command::exec("bad", ExecCommand::new("data", "ls")),
            composite("all", &["bad"]),
        ];
        // the first command fails before the composite is visited
        assert!(single_error(validate_commands(&commands, &components())).contains("\"bad\""));
    }

    #[test]
    fn shared_subcommands_are_not_cycles() {
        let commands = vec![
            exec("build"),
            composite("left", &["build"]),
            composite("right", &["build"]),
            composite("all", &["left", "right", "build"]),
        ];
        assert!(validate_commands(&commands, &components()).is_ok());
    }

    #[test]
    fn group_needs_exactly_one_default() {
        let in_group = |id: &str, is_default: bool| {
            let group = CommandGroup {
                kind: GroupKind::Run,
                is_default,
            };
            Command::exec(id, ExecCommand::new("tools", "run").in_group(group))
        };

        let commands = vec![in_group("a", false), in_group("b", false)];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "command group run error - there should be exactly one default command, currently there is no default command"
        );

        let commands = vec![in_group("a", true), in_group("b", true), in_group("c", false)];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "command group run error - there should be exactly one default command, currently there are multiple default commands; command: a; command: b"
        );

        let commands = vec![in_group("a", false)];
        assert!(validate_commands(&commands, &components()).is_ok());
    }

    #[test]
    fn group_errors_accumulate_in_kind_order() {
        let commands = vec![
            Command::exec(
                "t1",
                ExecCommand::new("tools", "t").in_group(CommandGroup::new(GroupKind::Test)),
            ),
            Command::exec(
                "t2",
                ExecCommand::new("tools", "t").in_group(CommandGroup::new(GroupKind::Test)),
            ),
            Command::exec(
                "b1",
                ExecCommand::new("tools", "b").in_group(CommandGroup::default_of(GroupKind::Build)),
            ),
            Command::exec(
                "b2",
                ExecCommand::new("tools", "b").in_group(CommandGroup::default_of(GroupKind::Build)),
            ),
        ];
        let report = validate_commands(&commands, &components()).unwrap_err();
        assert_eq!(
            report.kinds(),
            vec![
                ViolationKind::MultipleDefaultCommands,
                ViolationKind::MissingDefaultCommand
            ]
        );
    }

    #[test]
    fn imported_command_errors_carry_provenance() {
        let attributes = Attributes::new().with(IMPORT_SOURCE_ATTRIBUTE, "uri: parent.yaml");
        let commands =
            vec![Command::exec("run", ExecCommand::new("missing", "ls")).with_attributes(attributes)];
        assert_eq!(
            single_error(validate_commands(&commands, &components())),
            "the command \"run\" is invalid - command does not map to a container component, imported from uri: parent.yaml"
        );
    }
}
