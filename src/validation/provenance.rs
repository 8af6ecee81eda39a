//! Import provenance for entities merged in from parents and plugins

use serde::Serialize;
use std::fmt;

use super::error::{ValidationError, Violation};
use crate::models::{
    Attributes, IMPORT_SOURCE_ATTRIBUTE, PARENT_OVERRIDE_ATTRIBUTE, PLUGIN_OVERRIDE_ATTRIBUTE,
};

/// Where an entity came from when it was not declared in the devfile itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportProvenance {
    pub imported_from: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_override_from: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_override_from: Option<String>,
}

impl ImportProvenance {
    /// Read provenance from the well-known attributes. Parent overrides take precedence over plugin overrides.
    pub fn from_attributes(attributes: &Attributes) -> Option<Self> {
        let imported_from = attributes.get_string(IMPORT_SOURCE_ATTRIBUTE)?;
        let parent_override_from = attributes.get_string(PARENT_OVERRIDE_ATTRIBUTE);
        let plugin_override_from = if parent_override_from.is_none() {
            attributes.get_string(PLUGIN_OVERRIDE_ATTRIBUTE)
        } else {
            None
        };

        Some(Self {
            imported_from,
            parent_override_from,
            plugin_override_from,
        })
    }
}

impl fmt::Display for ImportProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ", imported from {}", self.imported_from)?;
        if let Some(parent) = &self.parent_override_from {
            write!(f, ", in parent overrides from {parent}")?;
        } else if let Some(plugin) = &self.plugin_override_from {
            write!(f, ", in plugin overrides from {plugin}")?;
        }
        Ok(())
    }
}

/// Attach the import provenance found in `attributes` to `error`
pub fn resolve_import_attributes(error: ValidationError, attributes: &Attributes) -> Violation {
    Violation {
        error,
        provenance: ImportProvenance::from_attributes(attributes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error() -> ValidationError {
        ValidationError::InvalidCommandType { id: "run".into() }
    }

    #[test]
    fn plain_attributes_leave_message_untouched() {
        let violation = resolve_import_attributes(error(), &Attributes::new());
        assert_eq!(violation.to_string(), "command run has invalid type");
        assert!(violation.provenance.is_none());
    }

    #[test]
    fn appends_import_source() {
        let attributes = Attributes::new().with(IMPORT_SOURCE_ATTRIBUTE, "uri: parent.yaml");
        let violation = resolve_import_attributes(error(), &attributes);
        assert_eq!(
            violation.to_string(),
            "command run has invalid type, imported from uri: parent.yaml"
        );
    }

    #[test]
    fn parent_override_wins_over_plugin_override() {
        let attributes = Attributes::new()
            .with(IMPORT_SOURCE_ATTRIBUTE, "uri: parent.yaml")
            .with(PARENT_OVERRIDE_ATTRIBUTE, "main-devfile")
            .with(PLUGIN_OVERRIDE_ATTRIBUTE, "plugin-a");
        let violation = resolve_import_attributes(error(), &attributes);
        assert_eq!(
            violation.to_string(),
            "command run has invalid type, imported from uri: parent.yaml, in parent overrides from main-devfile"
        );
    }

    #[test]
    fn plugin_override_is_reported_without_parent() {
        let attributes = Attributes::new()
            .with(IMPORT_SOURCE_ATTRIBUTE, "id: nodejs, registryURL: https://registry.devfile.io")
            .with(PLUGIN_OVERRIDE_ATTRIBUTE, "main-devfile");
        let violation = resolve_import_attributes(error(), &attributes);
        assert!(
            violation
                .to_string()
                .ends_with(", in plugin overrides from main-devfile")
        );
    }

    #[test]
    fn override_without_import_is_ignored() {
        let attributes = Attributes::new().with(PARENT_OVERRIDE_ATTRIBUTE, "main-devfile");
        assert!(ImportProvenance::from_attributes(&attributes).is_none());
    }
}
