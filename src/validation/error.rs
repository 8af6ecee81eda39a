use miette::Diagnostic;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use super::provenance::ImportProvenance;
use crate::models::{EventPhase, GroupKind, UnionError};

/// A single devfile rule violation
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum ValidationError {
    #[error("duplicate key: {key}")]
    #[diagnostic(
        code(devfile::duplicate_key),
        help("command ids are compared case-insensitively")
    )]
    DuplicateKey { key: String },

    #[error("{entity}: {reason}")]
    #[diagnostic(code(devfile::invalid_union))]
    InvalidUnion { entity: String, reason: UnionError },

    #[error("command {id} has invalid type")]
    #[diagnostic(
        code(devfile::invalid_command_type),
        help("a command must be one of exec, apply or composite")
    )]
    InvalidCommandType { id: String },

    #[error("the command \"{id}\" is invalid - {issue}")]
    #[diagnostic(code(devfile::invalid_command))]
    InvalidCommand { id: String, issue: CommandIssue },

    #[error(
        "command group {kind} error - there should be exactly one default command, currently there are multiple default commands; {}",
        join_display(.commands, "; ")
    )]
    #[diagnostic(code(devfile::multiple_default_commands))]
    MultipleDefaultCommands {
        kind: GroupKind,
        commands: Vec<DefaultCommandRef>,
    },

    #[error(
        "command group {kind} error - there should be exactly one default command, currently there is no default command"
    )]
    #[diagnostic(
        code(devfile::missing_default_command),
        help("mark one command of the group with `isDefault: true`")
    )]
    MissingDefaultCommand { kind: GroupKind },

    #[error("env variable {env} is reserved and cannot be customized in component {component}")]
    #[diagnostic(code(devfile::reserved_env))]
    ReservedEnv { env: String, component: String },

    #[error(
        "the volume \"{name}\" is invalid - size {size} for volume component is invalid, {reason}. Example - 2Gi, 1024Mi"
    )]
    #[diagnostic(code(devfile::invalid_volume))]
    InvalidVolume {
        name: String,
        size: String,
        reason: String,
    },

    #[error(
        "unable to find the following volume mounts in devfile volume components:\n{}",
        join_display(.mounts, "\n")
    )]
    #[diagnostic(code(devfile::missing_volume_mount))]
    MissingVolumeMounts { mounts: Vec<MissingVolumeMount> },

    #[error("devfile contains multiple endpoint entries with same name: {name}")]
    #[diagnostic(code(devfile::duplicate_endpoint_name))]
    DuplicateEndpointName { name: String, component: String },

    #[error("devfile contains multiple containers with same endpoint targetPort: {port}")]
    #[diagnostic(code(devfile::duplicate_endpoint_port))]
    DuplicateEndpointPort { port: u32, component: String },

    #[error("the component \"{name}\" is invalid - {reason}")]
    #[diagnostic(code(devfile::invalid_component))]
    InvalidComponent { name: String, reason: String },

    #[error("error parsing {resource} requirement for component {component}: {reason}")]
    #[diagnostic(
        code(devfile::resource_requirement),
        help("resource quantities look like 512Mi, 1Gi or 500m")
    )]
    ResourceRequirement {
        component: String,
        resource: ResourceKind,
        reason: String,
    },

    #[error(
        "invalid resource request for component {component}: {request} is greater than {limit}."
    )]
    #[diagnostic(code(devfile::invalid_resource_request))]
    InvalidResourceRequest {
        component: String,
        request: ResourceKind,
        limit: ResourceKind,
    },

    #[error(
        "{annotation_type} annotation: {key} has been declared multiple times and with different values"
    )]
    #[diagnostic(code(devfile::annotation_conflict))]
    AnnotationConflict {
        annotation_type: AnnotationType,
        key: String,
    },

    #[error("project {name} should have at least one remote")]
    #[diagnostic(code(devfile::missing_project_remote))]
    MissingProjectRemote { name: String },

    #[error("{object_type} {name} should have at least one remote")]
    #[diagnostic(code(devfile::missing_remote))]
    MissingRemote {
        object_type: GitObjectType,
        name: String,
    },

    #[error("{object_type} {name} should have one remote only")]
    #[diagnostic(code(devfile::multiple_remote))]
    MultipleRemote {
        object_type: GitObjectType,
        name: String,
    },

    #[error(
        "project {name} has more than one remote defined, but has no checkoutfrom remote defined"
    )]
    #[diagnostic(code(devfile::missing_checkout_remote))]
    MissingCheckoutRemote { name: String },

    #[error(
        "{object_type} {name} has invalid checkout remote: {remote}, checkout remote must be one of remotes"
    )]
    #[diagnostic(code(devfile::invalid_checkout_remote))]
    InvalidCheckoutRemote {
        object_type: GitObjectType,
        name: String,
        remote: String,
    },

    #[error("{phase} type events are invalid: {issue}")]
    #[diagnostic(code(devfile::invalid_event))]
    InvalidEvent { phase: EventPhase, issue: EventIssue },
}

/// Stable machine-readable category of a [`ValidationError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    DuplicateKey,
    InvalidUnion,
    InvalidCommandType,
    InvalidCommand,
    MultipleDefaultCommands,
    MissingDefaultCommand,
    ReservedEnv,
    InvalidVolume,
    MissingVolumeMount,
    InvalidEndpoint,
    InvalidComponent,
    ResourceRequirement,
    InvalidResourceRequest,
    AnnotationConflict,
    MissingProjectRemote,
    MissingRemote,
    MultipleRemote,
    MissingCheckoutRemote,
    InvalidCheckoutRemote,
    InvalidEvent,
}

impl ViolationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationKind::DuplicateKey => "duplicate-key",
            ViolationKind::InvalidUnion => "invalid-union",
            ViolationKind::InvalidCommandType => "invalid-command-type",
            ViolationKind::InvalidCommand => "invalid-command",
            ViolationKind::MultipleDefaultCommands => "multiple-default-commands",
            ViolationKind::MissingDefaultCommand => "missing-default-command",
            ViolationKind::ReservedEnv => "reserved-env",
            ViolationKind::InvalidVolume => "invalid-volume",
            ViolationKind::MissingVolumeMount => "missing-volume-mount",
            ViolationKind::InvalidEndpoint => "invalid-endpoint",
            ViolationKind::InvalidComponent => "invalid-component",
            ViolationKind::ResourceRequirement => "resource-requirement",
            ViolationKind::InvalidResourceRequest => "invalid-resource-request",
            ViolationKind::AnnotationConflict => "annotation-conflict",
            ViolationKind::MissingProjectRemote => "missing-project-remote",
            ViolationKind::MissingRemote => "missing-remote",
            ViolationKind::MultipleRemote => "multiple-remote",
            ViolationKind::MissingCheckoutRemote => "missing-checkout-remote",
            ViolationKind::InvalidCheckoutRemote => "invalid-checkout-remote",
            ViolationKind::InvalidEvent => "invalid-event",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ValidationError {
    pub fn kind(&self) -> ViolationKind {
        match self {
            ValidationError::DuplicateKey { .. } => ViolationKind::DuplicateKey,
            ValidationError::InvalidUnion { .. } => ViolationKind::InvalidUnion,
            ValidationError::InvalidCommandType { .. } => ViolationKind::InvalidCommandType,
            ValidationError::InvalidCommand { .. } => ViolationKind::InvalidCommand,
            ValidationError::MultipleDefaultCommands { .. } => {
                ViolationKind::MultipleDefaultCommands
            }
            ValidationError::MissingDefaultCommand { .. } => ViolationKind::MissingDefaultCommand,
            ValidationError::ReservedEnv { .. } => ViolationKind::ReservedEnv,
            ValidationError::InvalidVolume { .. } => ViolationKind::InvalidVolume,
            ValidationError::MissingVolumeMounts { .. } => ViolationKind::MissingVolumeMount,
            ValidationError::DuplicateEndpointName { .. }
            | ValidationError::DuplicateEndpointPort { .. } => ViolationKind::InvalidEndpoint,
            ValidationError::InvalidComponent { .. } => ViolationKind::InvalidComponent,
            ValidationError::ResourceRequirement { .. } => ViolationKind::ResourceRequirement,
            ValidationError::InvalidResourceRequest { .. } => {
                ViolationKind::InvalidResourceRequest
            }
            ValidationError::AnnotationConflict { .. } => ViolationKind::AnnotationConflict,
            ValidationError::MissingProjectRemote { .. } => ViolationKind::MissingProjectRemote,
            ValidationError::MissingRemote { .. } => ViolationKind::MissingRemote,
            ValidationError::MultipleRemote { .. } => ViolationKind::MultipleRemote,
            ValidationError::MissingCheckoutRemote { .. } => ViolationKind::MissingCheckoutRemote,
            ValidationError::InvalidCheckoutRemote { .. } => ViolationKind::InvalidCheckoutRemote,
            ValidationError::InvalidEvent { .. } => ViolationKind::InvalidEvent,
        }
    }

    /// Id or name of the offending entity, when there is a single one
    pub fn entity(&self) -> Option<String> {
        match self {
            ValidationError::DuplicateKey { key } => Some(key.clone()),
            ValidationError::InvalidUnion { entity, .. } => Some(entity.clone()),
            ValidationError::InvalidCommandType { id }
            | ValidationError::InvalidCommand { id, .. } => Some(id.clone()),
            ValidationError::MultipleDefaultCommands { kind, .. }
            | ValidationError::MissingDefaultCommand { kind } => Some(kind.to_string()),
            ValidationError::ReservedEnv { component, .. }
            | ValidationError::DuplicateEndpointName { component, .. }
            | ValidationError::DuplicateEndpointPort { component, .. }
            | ValidationError::ResourceRequirement { component, .. }
            | ValidationError::InvalidResourceRequest { component, .. } => Some(component.clone()),
            ValidationError::InvalidVolume { name, .. }
            | ValidationError::InvalidComponent { name, .. }
            | ValidationError::MissingProjectRemote { name }
            | ValidationError::MissingRemote { name, .. }
            | ValidationError::MultipleRemote { name, .. }
            | ValidationError::MissingCheckoutRemote { name }
            | ValidationError::InvalidCheckoutRemote { name, .. } => Some(name.clone()),
            ValidationError::AnnotationConflict { key, .. } => Some(key.clone()),
            ValidationError::InvalidEvent { phase, .. } => Some(phase.to_string()),
            ValidationError::MissingVolumeMounts { .. } => None,
        }
    }
}

/// Why a command failed its reference checks
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandIssue {
    #[error("command does not map to a container component")]
    NotContainerComponent,

    #[error("composite command cannot reference itself")]
    SelfReference,

    #[error("composite command cannot indirectly reference itself")]
    IndirectSelfReference,

    #[error("the command \"{0}\" mentioned in the composite command does not exist")]
    MissingSubCommand(String),
}

/// Why the commands bound to an event phase are rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventIssue {
    #[error("{} does not map to a valid devfile command", .0.join(", "))]
    UnknownCommands(Vec<String>),

    #[error(
        "{} should either map to an {required} command or a composite command with {required} commands",
        .ids.join(", ")
    )]
    WrongCommandType {
        required: EventCommandKind,
        ids: Vec<String>,
    },
}

/// Command kind an event phase accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCommandKind {
    Apply,
    Exec,
}

impl fmt::Display for EventCommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCommandKind::Apply => f.write_str("apply"),
            EventCommandKind::Exec => f.write_str("exec"),
        }
    }
}

/// A default command listed in a multiple-defaults violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultCommandRef {
    pub id: String,
    pub provenance: Option<ImportProvenance>,
}

impl fmt::Display for DefaultCommandRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command: {}", self.id)?;
        if let Some(provenance) = &self.provenance {
            write!(f, "{provenance}")?;
        }
        Ok(())
    }
}

/// A container volume mount with no matching volume component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVolumeMount {
    pub volume: String,
    pub component: String,
    pub provenance: Option<ImportProvenance>,
}

impl fmt::Display for MissingVolumeMount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "volume mount {} belonging to the container component {}",
            self.volume, self.component
        )?;
        if let Some(provenance) = &self.provenance {
            write!(f, "{provenance}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    MemoryLimit,
    MemoryRequest,
    CpuLimit,
    CpuRequest,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::MemoryLimit => "memoryLimit",
            ResourceKind::MemoryRequest => "memoryRequest",
            ResourceKind::CpuLimit => "cpuLimit",
            ResourceKind::CpuRequest => "cpuRequest",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AnnotationType {
    Deployment,
    Service,
}

impl fmt::Display for AnnotationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationType::Deployment => f.write_str("deployment"),
            AnnotationType::Service => f.write_str("service"),
        }
    }
}

/// Owner of a git source checked by the remote rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitObjectType {
    Project,
    StarterProject,
    Component,
}

impl fmt::Display for GitObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GitObjectType::Project => f.write_str("project"),
            GitObjectType::StarterProject => f.write_str("starterProject"),
            GitObjectType::Component => f.write_str("component"),
        }
    }
}

/// A [`ValidationError`] plus the import provenance of the entity that caused it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub error: ValidationError,
    pub provenance: Option<ImportProvenance>,
}

impl Violation {
    pub fn kind(&self) -> ViolationKind {
        self.error.kind()
    }

    pub fn entity(&self) -> Option<String> {
        self.error.entity()
    }

    pub fn record(&self) -> ViolationRecord {
        ViolationRecord {
            kind: self.kind(),
            entity: self.entity(),
            message: self.to_string(),
            provenance: self.provenance.clone(),
        }
    }
}

impl From<ValidationError> for Violation {
    fn from(error: ValidationError) -> Self {
        Self {
            error,
            provenance: None,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(provenance) = &self.provenance {
            write!(f, "{provenance}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Violation {}

impl Diagnostic for Violation {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.error.code()
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.error.help()
    }
}

/// Serialized form of a violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationRecord {
    pub kind: ViolationKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub provenance: Option<ImportProvenance>,
}

/// Every violation a validator found, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(violation: impl Into<Violation>) -> Self {
        Self {
            violations: vec![violation.into()],
        }
    }

    pub fn push(&mut self, violation: impl Into<Violation>) {
        self.violations.push(violation.into());
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }

    /// Fold a validator result into this report
    pub fn absorb(&mut self, result: Result<(), ValidationReport>) {
        if let Err(report) = result {
            self.merge(report);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    pub fn kinds(&self) -> Vec<ViolationKind> {
        self.violations.iter().map(Violation::kind).collect()
    }

    pub fn records(&self) -> Vec<ViolationRecord> {
        self.violations.iter().map(Violation::record).collect()
    }

    /// `Ok` when nothing was reported
    pub fn into_result(self) -> Result<(), ValidationReport> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", join_display(&self.violations, "\n"))
    }
}

impl std::error::Error for ValidationReport {}

impl Diagnostic for ValidationReport {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("devfile::invalid"))
    }

    fn related<'a>(&'a self) -> Option<Box<dyn Iterator<Item = &'a dyn Diagnostic> + 'a>> {
        Some(Box::new(
            self.violations.iter().map(|v| v as &dyn Diagnostic),
        ))
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.violations.iter().map(Violation::record))
    }
}

impl IntoIterator for ValidationReport {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

fn join_display<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiple_defaults_lists_every_command() {
        let error = ValidationError::MultipleDefaultCommands {
            kind: GroupKind::Build,
            commands: vec![
                DefaultCommandRef {
                    id: "a".into(),
                    provenance: None,
                },
                DefaultCommandRef {
                    id: "b".into(),
                    provenance: Some(ImportProvenance {
                        imported_from: "uri: parent.yaml".into(),
                        parent_override_from: None,
                        plugin_override_from: None,
                    }),
                },
            ],
        };
        assert_eq!(
            error.to_string(),
            "command group build error - there should be exactly one default command, currently there are multiple default commands; command: a; command: b, imported from uri: parent.yaml"
        );
    }

    #[test]
    fn missing_volume_mounts_are_listed_one_per_line() {
        let error = ValidationError::MissingVolumeMounts {
            mounts: vec![
                MissingVolumeMount {
                    volume: "cache".into(),
                    component: "runtime".into(),
                    provenance: None,
                },
                MissingVolumeMount {
                    volume: "data".into(),
                    component: "db".into(),
                    provenance: None,
                },
            ],
        };
        assert_eq!(
            error.to_string(),
            "unable to find the following volume mounts in devfile volume components:\nvolume mount cache belonging to the container component runtime\nvolume mount data belonging to the container component db"
        );
    }

    #[test]
    fn event_issues_join_command_ids() {
        let error = ValidationError::InvalidEvent {
            phase: EventPhase::PreStart,
            issue: EventIssue::WrongCommandType {
                required: EventCommandKind::Apply,
                ids: vec!["a".into(), "b".into()],
            },
        };
        assert_eq!(
            error.to_string(),
            "preStart type events are invalid: a, b should either map to an apply command or a composite command with apply commands"
        );
    }

    #[test]
    fn report_serializes_records() {
        let mut report = ValidationReport::new();
        report.push(ValidationError::InvalidCommandType { id: "run".into() });
        report.push(ValidationError::MissingDefaultCommand {
            kind: GroupKind::Test,
        });

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {
                    "kind": "invalid-command-type",
                    "entity": "run",
                    "message": "command run has invalid type"
                },
                {
                    "kind": "missing-default-command",
                    "entity": "test",
                    "message": "command group test error - there should be exactly one default command, currently there is no default command"
                }
            ])
        );
        assert_eq!(report.to_string().lines().count(), 2);
    }

    #[test]
    fn empty_report_is_ok() {
        assert!(ValidationReport::new().into_result().is_ok());
        let mut report = ValidationReport::new();
        report.absorb(Err(ValidationReport::single(
            ValidationError::MissingProjectRemote { name: "app".into() },
        )));
        report.absorb(Ok(()));
        assert_eq!(report.kinds(), vec![ViolationKind::MissingProjectRemote]);
    }
}
