//! Devfile semantic validation
//!
//! Each rule family lives in its own module and returns every violation it
//! found as a [`ValidationReport`]. [`Validator`] runs them all.

mod command;
mod component;
mod error;
mod event;
mod project;
mod provenance;
mod quantity;
mod uri;
mod validator;

pub use command::validate_commands;
pub use component::{RESERVED_ENV_VARS, SeenEndpoints, validate_components, validate_endpoints};
pub use error::{
    AnnotationType, CommandIssue, DefaultCommandRef, EventCommandKind, EventIssue, GitObjectType,
    MissingVolumeMount, ResourceKind, ValidationError, ValidationReport, Violation, ViolationKind,
    ViolationRecord,
};
pub use event::validate_events;
pub use project::{validate_projects, validate_starter_projects};
pub use provenance::{ImportProvenance, resolve_import_attributes};
pub use quantity::{Quantity, QuantityError};
pub use uri::{UriError, UriIssue, validate_uri};
pub use validator::Validator;
