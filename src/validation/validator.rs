use tracing::{debug, info};

use super::command::validate_commands;
use super::component::validate_components;
use super::error::ValidationReport;
use super::event::validate_events;
use super::project::{validate_projects, validate_starter_projects};
use crate::models::Devfile;

/// Runs every rule family over a flattened devfile
#[derive(Debug, Default, Clone, Copy)]
pub struct Validator;

impl Validator {
    pub fn new() -> Self {
        Self
    }

    /// Collect the violations of every rule family.
    ///
    /// Families that stop at their first problem (duplicate keys, command
    /// references) only contribute that one violation.
    pub fn validate_devfile(&self, devfile: &Devfile) -> Result<(), ValidationReport> {
        let mut report = ValidationReport::new();

        debug!("Validating commands...");
        report.absorb(validate_commands(&devfile.commands, &devfile.components));

        debug!("Validating components...");
        report.absorb(validate_components(&devfile.components));

        if let Some(events) = &devfile.events {
            debug!("Validating events...");
            report.absorb(validate_events(events, &devfile.commands));
        }

        debug!("Validating projects...");
        report.absorb(validate_projects(&devfile.projects));
        report.absorb(validate_starter_projects(&devfile.starter_projects));

        if report.is_empty() {
            info!("✓ Devfile validation passed");
        } else {
            info!("✗ Devfile validation found {} problem(s)", report.len());
        }
        report.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ViolationKind;

    #[test]
    fn merges_all_rule_families() {
        let devfile = Devfile::from_yaml(
            r#"
schemaVersion: 2.2.0
components:
  - name: tools
    container:
      image: golang
      env:
        - name: PROJECTS_ROOT
          value: /tmp
commands:
  - id: build
    exec:
      component: nowhere
      commandLine: go build
events:
  postStop: [build]
projects:
  - name: app
    git:
      remotes: {}
starterProjects:
  - name: hello
    git:
      remotes:
        a: https://example.com/a.git
        b: https://example.com/b.git
"#,
        )
        .unwrap();

        let report = Validator::new().validate_devfile(&devfile).unwrap_err();
        assert_eq!(
            report.kinds(),
            vec![
                ViolationKind::InvalidCommand,
                ViolationKind::ReservedEnv,
                ViolationKind::InvalidEvent,
                ViolationKind::MissingProjectRemote,
                ViolationKind::MultipleRemote,
            ]
        );
    }

    #[test]
    fn empty_devfile_is_valid() {
        assert!(Validator::new().validate_devfile(&Devfile::default()).is_ok());
    }
}
