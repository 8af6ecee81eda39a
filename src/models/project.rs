use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::attributes::Attributes;
use super::keyed::Keyed;
use super::union::{Union, UnionError, impl_union, visit_union};

/// A project cloned into the workspace
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,

    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub clone_path: String,

    #[serde(flatten)]
    pub source: ProjectSource,
}

/// A template project used to bootstrap a new workspace
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StarterProject {
    pub name: String,

    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sub_dir: String,

    #[serde(flatten)]
    pub source: ProjectSource,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSource {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git: Option<GitProjectSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<ZipProjectSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom: Option<CustomProjectSource>,
}

impl_union!(ProjectSource, "ProjectSource", source_type, {
    "Git" => git,
    "Zip" => zip,
    "Custom" => custom,
});

pub type GitProjectSource = GitLikeProjectSource;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GitLikeProjectSource {
    #[serde(default)]
    pub remotes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_from: Option<CheckoutFrom>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutFrom {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub revision: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remote: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ZipProjectSource {
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomProjectSource {
    #[serde(default)]
    pub project_source_class: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedded_resource: Option<serde_json::Value>,
}

/// Borrowed view of the populated project source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectSourceVariant<'a> {
    Git(&'a GitProjectSource),
    Zip(&'a ZipProjectSource),
    Custom(&'a CustomProjectSource),
}

impl ProjectSource {
    pub fn git(git: GitProjectSource) -> Self {
        Self::from_parts(Self {
            git: Some(git),
            ..Default::default()
        })
    }

    pub fn zip(zip: ZipProjectSource) -> Self {
        Self::from_parts(Self {
            zip: Some(zip),
            ..Default::default()
        })
    }

    pub fn custom(custom: CustomProjectSource) -> Self {
        Self::from_parts(Self {
            custom: Some(custom),
            ..Default::default()
        })
    }

    fn from_parts(mut source: Self) -> Self {
        let _ = source.normalize();
        source
    }

    pub fn variant(&self) -> Result<Option<ProjectSourceVariant<'_>>, UnionError> {
        let variant = match visit_union(self, Self::MEMBERS)? {
            Some("Git") => self.git.as_ref().map(ProjectSourceVariant::Git),
            Some("Zip") => self.zip.as_ref().map(ProjectSourceVariant::Zip),
            Some("Custom") => self.custom.as_ref().map(ProjectSourceVariant::Custom),
            _ => None,
        };
        Ok(variant)
    }
}

impl GitLikeProjectSource {
    pub fn new<I, K, V>(remotes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            remotes: remotes
                .into_iter()
                .map(|(name, url)| (name.into(), url.into()))
                .collect(),
            checkout_from: None,
        }
    }

    pub fn checkout_remote(mut self, remote: impl Into<String>) -> Self {
        self.checkout_from = Some(CheckoutFrom {
            revision: String::new(),
            remote: remote.into(),
        });
        self
    }

    /// Remote named by `checkoutFrom`, when one is set
    pub fn checkout_from_remote(&self) -> Option<&str> {
        self.checkout_from
            .as_ref()
            .map(|checkout| checkout.remote.as_str())
            .filter(|remote| !remote.is_empty())
    }
}

impl Project {
    pub fn new(name: impl Into<String>, source: ProjectSource) -> Self {
        Self {
            name: name.into(),
            source,
            ..Default::default()
        }
    }

    pub fn git(name: impl Into<String>, git: GitProjectSource) -> Self {
        Self::new(name, ProjectSource::git(git))
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl StarterProject {
    pub fn new(name: impl Into<String>, source: ProjectSource) -> Self {
        Self {
            name: name.into(),
            source,
            ..Default::default()
        }
    }

    pub fn git(name: impl Into<String>, git: GitProjectSource) -> Self {
        Self::new(name, ProjectSource::git(git))
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl Keyed for Project {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Keyed for StarterProject {
    fn key(&self) -> &str {
        &self.name
    }
}
