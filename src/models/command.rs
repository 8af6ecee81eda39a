use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use super::attributes::Attributes;
use super::component::EnvVar;
use super::keyed::Keyed;
use super::union::{Union, UnionError, impl_union, visit_union};

/// A devfile command: an id plus exactly one command body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,

    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    #[serde(flatten)]
    pub union: CommandUnion,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandUnion {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub command_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecCommand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply: Option<ApplyCommand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeCommand>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomCommand>,
}

impl_union!(CommandUnion, "CommandUnion", command_type, {
    "Exec" => exec,
    "Apply" => apply,
    "Composite" => composite,
    "Custom" => custom,
});

/// Runs a command line inside a container component
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecCommand {
    #[serde(default)]
    pub component: String,

    #[serde(default)]
    pub command_line: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub working_dir: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hot_reload_capable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<CommandGroup>,
}

/// Applies a kubernetes, openshift or image component
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCommand {
    #[serde(default)]
    pub component: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<CommandGroup>,
}

/// Runs other commands, in sequence or in parallel
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompositeCommand {
    #[serde(default)]
    pub commands: Vec<String>,

    #[serde(default)]
    pub parallel: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<CommandGroup>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomCommand {
    #[serde(default)]
    pub command_class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_resource: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommandGroup {
    pub kind: GroupKind,

    #[serde(default)]
    pub is_default: bool,
}

impl CommandGroup {
    pub fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            is_default: false,
        }
    }

    pub fn default_of(kind: GroupKind) -> Self {
        Self {
            kind,
            is_default: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    Build,
    Run,
    Test,
    Debug,
    Deploy,
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupKind::Build => "build",
            GroupKind::Run => "run",
            GroupKind::Test => "test",
            GroupKind::Debug => "debug",
            GroupKind::Deploy => "deploy",
        };
        f.write_str(name)
    }
}

/// Borrowed view of the populated command body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandVariant<'a> {
    Exec(&'a ExecCommand),
    Apply(&'a ApplyCommand),
    Composite(&'a CompositeCommand),
    Custom(&'a CustomCommand),
}

impl Command {
    pub fn exec(id: impl Into<String>, exec: ExecCommand) -> Self {
        Self::from_union(
            id,
            CommandUnion {
                exec: Some(exec),
                ..Default::default()
            },
        )
    }

    pub fn apply(id: impl Into<String>, apply: ApplyCommand) -> Self {
        Self::from_union(
            id,
            CommandUnion {
                apply: Some(apply),
                ..Default::default()
            },
        )
    }

    pub fn composite(id: impl Into<String>, composite: CompositeCommand) -> Self {
        Self::from_union(
            id,
            CommandUnion {
                composite: Some(composite),
                ..Default::default()
            },
        )
    }

    pub fn custom(id: impl Into<String>, custom: CustomCommand) -> Self {
        Self::from_union(
            id,
            CommandUnion {
                custom: Some(custom),
                ..Default::default()
            },
        )
    }

    fn from_union(id: impl Into<String>, mut union: CommandUnion) -> Self {
        // a single populated member always normalizes
        let _ = union.normalize();
        Self {
            id: id.into(),
            attributes: Attributes::default(),
            union,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// The populated command body, or `None` for an empty union
    pub fn variant(&self) -> Result<Option<CommandVariant<'_>>, UnionError> {
        let union = &self.union;
        let variant = match visit_union(union, CommandUnion::MEMBERS)? {
            Some("Exec") => union.exec.as_ref().map(CommandVariant::Exec),
            Some("Apply") => union.apply.as_ref().map(CommandVariant::Apply),
            Some("Composite") => union.composite.as_ref().map(CommandVariant::Composite),
            Some("Custom") => union.custom.as_ref().map(CommandVariant::Custom),
            _ => None,
        };
        Ok(variant)
    }

    /// Group of exec, apply and composite commands
    pub fn group(&self) -> Option<&CommandGroup> {
        match self.variant() {
            Ok(Some(CommandVariant::Exec(exec))) => exec.group.as_ref(),
            Ok(Some(CommandVariant::Apply(apply))) => apply.group.as_ref(),
            Ok(Some(CommandVariant::Composite(composite))) => composite.group.as_ref(),
            _ => None,
        }
    }

    pub fn is_exec(&self) -> bool {
        matches!(self.variant(), Ok(Some(CommandVariant::Exec(_))))
    }

    pub fn is_apply(&self) -> bool {
        matches!(self.variant(), Ok(Some(CommandVariant::Apply(_))))
    }
}

impl ExecCommand {
    pub fn new(component: impl Into<String>, command_line: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            command_line: command_line.into(),
            ..Default::default()
        }
    }

    pub fn in_group(mut self, group: CommandGroup) -> Self {
        self.group = Some(group);
        self
    }
}

impl ApplyCommand {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Default::default()
        }
    }

    pub fn in_group(mut self, group: CommandGroup) -> Self {
        self.group = Some(group);
        self
    }
}

impl CompositeCommand {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn in_group(mut self, group: CommandGroup) -> Self {
        self.group = Some(group);
        self
    }
}

impl Keyed for Command {
    fn key(&self) -> &str {
        &self.id
    }

    fn normalized_key(&self) -> Cow<'_, str> {
        Cow::Owned(self.id.to_lowercase())
    }
}
