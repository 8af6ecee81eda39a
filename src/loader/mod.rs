//! Locate, decode and normalize a devfile, then run validation over it

use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::error_utils::create_named_source;
use crate::models::{Devfile, NormalizeError};
use crate::validation::{ValidationReport, Validator};

/// File names tried, in order, when the loader is pointed at a directory
pub const DEVFILE_NAMES: [&str; 4] = [
    "devfile.yaml",
    ".devfile.yaml",
    "devfile.yml",
    ".devfile.yml",
];

/// YAML that could not be decoded into a devfile
#[derive(Error, Debug, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(devfile::syntax))]
pub struct DevfileSyntaxError {
    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,

    pub message: String,
}

impl DevfileSyntaxError {
    fn from_yaml_error(error: &serde_yaml::Error, path: &Path, content: String) -> Self {
        let span = error
            .location()
            .map(|location| SourceSpan::new(location.index().into(), 1));

        Self {
            src: create_named_source(path, content),
            span,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no devfile found in {}; looked for {}", .dir.display(), DEVFILE_NAMES.join(", "))]
    NotFound { dir: PathBuf },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Syntax(Box<DevfileSyntaxError>),

    #[error("{}: {error}", .path.display())]
    Normalize { path: PathBuf, error: NormalizeError },

    #[error("{} has {} validation problem(s)", .path.display(), .report.len())]
    Invalid {
        path: PathBuf,
        report: ValidationReport,
    },
}

/// A decoded devfile together with where it came from
#[derive(Debug, Clone)]
pub struct LoadedDevfile {
    pub path: PathBuf,
    pub content: String,
    pub devfile: Devfile,
}

pub struct DevfileLoader {
    path: PathBuf,
    validator: Validator,
}

impl DevfileLoader {
    /// `path` may be a devfile or a directory containing one
    pub fn new(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let path = if path.is_dir() {
            find_devfile(path)?
        } else {
            path.to_path_buf()
        };

        Ok(Self {
            path,
            validator: Validator::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read, decode and normalize the devfile without validating it
    pub fn load(&self) -> Result<LoadedDevfile, LoadError> {
        debug!("Reading devfile from {}", self.path.display());
        let content = std::fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })?;

        let devfile = parse_devfile(&self.path, content.clone())?;
        Ok(LoadedDevfile {
            path: self.path.clone(),
            content,
            devfile,
        })
    }

    /// Load the devfile and fail with every violation found
    pub fn load_validated(&self) -> Result<LoadedDevfile, LoadError> {
        let loaded = self.load()?;

        self.validator
            .validate_devfile(&loaded.devfile)
            .map_err(|report| LoadError::Invalid {
                path: self.path.clone(),
                report,
            })?;

        info!("✓ {} is valid", self.path.display());
        Ok(loaded)
    }
}

/// First well-known devfile name present in `dir`
pub fn find_devfile(dir: &Path) -> Result<PathBuf, LoadError> {
    DEVFILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| LoadError::NotFound {
            dir: dir.to_path_buf(),
        })
}

/// Decode `content` and normalize every union in it
pub fn parse_devfile(path: &Path, content: String) -> Result<Devfile, LoadError> {
    let mut devfile = match Devfile::from_yaml(&content) {
        Ok(devfile) => devfile,
        Err(error) => {
            return Err(LoadError::Syntax(Box::new(
                DevfileSyntaxError::from_yaml_error(&error, path, content),
            )));
        }
    };

    devfile
        .normalize()
        .map_err(|error| LoadError::Normalize {
            path: path.to_path_buf(),
            error,
        })?;

    debug!(
        "Loaded devfile with {} components, {} commands, {} projects",
        devfile.components.len(),
        devfile.commands.len(),
        devfile.projects.len()
    );
    Ok(devfile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VALID: &str = r#"
schemaVersion: 2.2.0
components:
  - name: tools
    container:
      image: golang
commands:
  - id: build
    exec:
      component: tools
      commandLine: go build
"#;

    #[test]
    fn finds_devfile_in_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".devfile.yaml"), VALID).unwrap();

        let loader = DevfileLoader::new(dir.path()).unwrap();
        assert_eq!(loader.path(), dir.path().join(".devfile.yaml"));

        let loaded = loader.load_validated().unwrap();
        assert_eq!(loaded.devfile.commands[0].union.command_type, "Exec");
    }

    #[test]
    fn prefers_devfile_yaml() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("devfile.yml"), VALID).unwrap();
        fs::write(dir.path().join("devfile.yaml"), VALID).unwrap();
        assert_eq!(
            find_devfile(dir.path()).unwrap(),
            dir.path().join("devfile.yaml")
        );
    }

    #[test]
    fn missing_devfile_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = DevfileLoader::new(dir.path()).err().unwrap();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(err.to_string().contains("looked for devfile.yaml"));
    }

    #[test]
    fn syntax_errors_carry_a_location() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devfile.yaml");
        fs::write(&path, "components:\n  - name: [unclosed\n").unwrap();

        let err = DevfileLoader::new(&path).unwrap().load().unwrap_err();
        let LoadError::Syntax(syntax) = err else {
            panic!("expected syntax error");
        };
        assert!(syntax.span.is_some());
    }

    #[test]
    fn ambiguous_unions_fail_normalization() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devfile.yaml");
        fs::write(
            &path,
            "components:\n  - name: both\n    container:\n      image: a\n    volume: {}\n",
        )
        .unwrap();

        let err = DevfileLoader::new(&path).unwrap().load().unwrap_err();
        assert!(matches!(err, LoadError::Normalize { .. }));
        assert!(
            err.to_string()
                .ends_with("component \"both\": only one union member should be set: ComponentUnion")
        );
    }

    #[test]
    fn violations_are_returned_as_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("devfile.yaml");
        fs::write(
            &path,
            "commands:\n  - id: run\n    exec:\n      component: ghost\n",
        )
        .unwrap();

        let err = DevfileLoader::new(&path).unwrap().load_validated().unwrap_err();
        let LoadError::Invalid { report, .. } = err else {
            panic!("expected validation failure");
        };
        assert_eq!(
            report.to_string(),
            "the command \"run\" is invalid - command does not map to a container component"
        );
    }
}
