use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::attributes::Attributes;
use super::command::Command;
use super::component::Component;
use super::events::Events;
use super::project::{Project, StarterProject};
use super::union::{Union, UnionError};

/// Union normalization failure, located at the entity that owns the union
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{entity}: {source}")]
pub struct NormalizeError {
    pub entity: String,
    #[source]
    pub source: UnionError,
}

/// A flattened devfile document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Devfile {
    #[serde(default)]
    pub schema_version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Events>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<Project>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub starter_projects: Vec<StarterProject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl Devfile {
    /// Decode a devfile from YAML (JSON is accepted as well)
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn events(&self) -> Events {
        self.events.clone().unwrap_or_default()
    }

    /// Infer every union discriminator in the document and drop inactive members.
    ///
    /// Empty unions are left alone so the validators can report them.
    pub fn normalize(&mut self) -> Result<(), NormalizeError> {
        for command in &mut self.commands {
            normalize_at(&mut command.union, || format!("command \"{}\"", command.id))?;
        }

        for component in &mut self.components {
            let entity = format!("component \"{}\"", component.name);
            let union = &mut component.union;
            normalize_at(union, || entity.clone())?;

            if let Some(kubernetes) = union.kubernetes.as_mut() {
                normalize_at(&mut kubernetes.location, || entity.clone())?;
            }
            if let Some(openshift) = union.openshift.as_mut() {
                normalize_at(&mut openshift.location, || entity.clone())?;
            }
            if let Some(plugin) = union.plugin.as_mut() {
                normalize_at(&mut plugin.reference, || entity.clone())?;
            }
            if let Some(image) = union.image.as_mut() {
                normalize_at(&mut image.image, || entity.clone())?;
                if let Some(dockerfile) = image.image.dockerfile.as_mut() {
                    normalize_at(&mut dockerfile.src, || entity.clone())?;
                }
            }
        }

        for project in &mut self.projects {
            normalize_at(&mut project.source, || format!("project \"{}\"", project.name))?;
        }

        for starter in &mut self.starter_projects {
            normalize_at(&mut starter.source, || {
                format!("starter project \"{}\"", starter.name)
            })?;
        }

        Ok(())
    }
}

fn normalize_at<U: Union>(
    union: &mut U,
    entity: impl FnOnce() -> String,
) -> Result<(), NormalizeError> {
    match union.normalize() {
        Ok(()) | Err(UnionError::MissingDiscriminator { .. }) => Ok(()),
        Err(source) => Err(NormalizeError {
            entity: entity(),
            source,
        }),
    }
}
