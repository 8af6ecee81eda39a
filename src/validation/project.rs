use tracing::debug;

use super::error::{GitObjectType, ValidationError, ValidationReport};
use super::provenance::resolve_import_attributes;
use crate::models::{
    Attributes, GitLikeProjectSource, Project, ProjectSource, ProjectSourceVariant,
    StarterProject, find_duplicate_key,
};

/// Validate git remotes of projects.
///
/// A project may list several remotes as long as `checkoutFrom` picks one of them.
pub fn validate_projects(projects: &[Project]) -> Result<(), ValidationReport> {
    if let Some(duplicate) = find_duplicate_key(projects) {
        return Err(ValidationReport::single(ValidationError::DuplicateKey {
            key: duplicate.name.clone(),
        }));
    }

    let mut report = ValidationReport::new();
    for project in projects {
        let Some(git) = git_source(
            || format!("project \"{}\"", project.name),
            &project.source,
            &project.attributes,
        )? else {
            continue;
        };

        let result = match (git.remotes.len(), git.checkout_from_remote()) {
            (0, _) => Err(ValidationError::MissingProjectRemote {
                name: project.name.clone(),
            }),
            (1, None) => Ok(()),
            (_, None) => Err(ValidationError::MissingCheckoutRemote {
                name: project.name.clone(),
            }),
            (_, Some(remote)) => {
                validate_remote_map(GitObjectType::Project, &project.name, git, remote)
            }
        };

        if let Err(error) = result {
            report.push(resolve_import_attributes(error, &project.attributes));
        }
    }

    debug!(
        "Checked {} projects ({} violations)",
        projects.len(),
        report.len()
    );
    report.into_result()
}

/// Validate git remotes of starter projects, which must use exactly one remote
pub fn validate_starter_projects(starters: &[StarterProject]) -> Result<(), ValidationReport> {
    if let Some(duplicate) = find_duplicate_key(starters) {
        return Err(ValidationReport::single(ValidationError::DuplicateKey {
            key: duplicate.name.clone(),
        }));
    }

    let mut report = ValidationReport::new();
    for starter in starters {
        let Some(git) = git_source(
            || format!("starter project \"{}\"", starter.name),
            &starter.source,
            &starter.attributes,
        )? else {
            continue;
        };

        if let Err(error) =
            validate_single_remote_git_src(GitObjectType::StarterProject, &starter.name, git)
        {
            report.push(resolve_import_attributes(error, &starter.attributes));
        }
    }

    report.into_result()
}

/// Git sources outside `projects` may name a single remote only
pub(crate) fn validate_single_remote_git_src(
    object_type: GitObjectType,
    name: &str,
    git: &GitLikeProjectSource,
) -> Result<(), ValidationError> {
    match git.remotes.len() {
        0 => Err(ValidationError::MissingRemote {
            object_type,
            name: name.to_string(),
        }),
        1 => match git.checkout_from_remote() {
            Some(remote) => validate_remote_map(object_type, name, git, remote),
            None => Ok(()),
        },
        _ => Err(ValidationError::MultipleRemote {
            object_type,
            name: name.to_string(),
        }),
    }
}

fn validate_remote_map(
    object_type: GitObjectType,
    name: &str,
    git: &GitLikeProjectSource,
    remote: &str,
) -> Result<(), ValidationError> {
    if git.remotes.contains_key(remote) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCheckoutRemote {
            object_type,
            name: name.to_string(),
            remote: remote.to_string(),
        })
    }
}

/// The git member of a project source, or `None` for other source kinds
fn git_source<'a>(
    entity: impl FnOnce() -> String,
    source: &'a ProjectSource,
    attributes: &Attributes,
) -> Result<Option<&'a GitLikeProjectSource>, ValidationReport> {
    match source.variant() {
        Ok(Some(ProjectSourceVariant::Git(git))) => Ok(Some(git)),
        Ok(_) => Ok(None),
        Err(reason) => Err(ValidationReport::single(resolve_import_attributes(
            ValidationError::InvalidUnion {
                entity: entity(),
                reason,
            },
            attributes,
        ))),
    }
}
