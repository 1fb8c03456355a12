//! Domain-specific error types for the native asset synchronizer.
//!
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`ProjectError`]) while tasks and command handlers convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! NativeAssetsError
//! ├── Config(ConfigError)   : configuration file loading and project discovery
//! ├── Resolve(ResolveError) : per-descriptor source resolution (non-fatal)
//! └── Project(ProjectError) : project manifest parsing and graph structure
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the synchronizer.
#[derive(Error, Debug)]
pub enum NativeAssetsError {
    /// Configuration-related error (parsing, I/O, project discovery).
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A descriptor could not be resolved into concrete source files.
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// The native project manifest is malformed or structurally incomplete.
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),
}

/// Errors that arise from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("Invalid configuration in {file}: {message}")]
    InvalidSyntax {
        /// Path to the offending file.
        file: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a configuration file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No `*.xcodeproj` bundle exists in the iOS project directory.
    #[error("no .xcodeproj found in {}", .0.display())]
    ProjectNotFound(PathBuf),

    /// More than one `*.xcodeproj` bundle exists and no name was configured.
    #[error("multiple .xcodeproj bundles in {}: set ios.project_name", .0.display())]
    AmbiguousProject(PathBuf),
}

/// Errors that arise while resolving a descriptor against the filesystem.
///
/// These are non-fatal: the caller skips the descriptor and continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A required source file is absent.
    #[error("source file does not exist: {}", path.display())]
    MissingSourceFile {
        /// Absolute path that was looked up.
        path: PathBuf,
    },
}

/// Errors that arise from reading or navigating a project manifest.
#[derive(Error, Debug)]
pub enum ProjectError {
    /// The manifest text could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number where parsing failed.
        line: usize,
        /// Human-readable description of the failure.
        message: String,
    },

    /// The manifest has no usable `rootObject`.
    #[error("manifest has no root project object")]
    MissingRootObject,

    /// A record referenced by id does not exist or has the wrong shape.
    #[error("record {uuid} is missing or malformed: {reason}")]
    InvalidRecord {
        /// Record identifier.
        uuid: String,
        /// Why the record could not be used.
        reason: String,
    },

    /// The project declares no native target to attach resources to.
    #[error("project has no native target")]
    NoNativeTarget,

    /// An I/O error occurred while reading or writing the manifest.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path of the manifest.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn config_error_not_found_display() {
        let e = ConfigError::NotFound(PathBuf::from("/app/native-assets.toml"));
        assert_eq!(
            e.to_string(),
            "Configuration file not found: /app/native-assets.toml"
        );
    }

    #[test]
    fn config_error_invalid_syntax_display() {
        let e = ConfigError::InvalidSyntax {
            file: "native-assets.toml".to_string(),
            message: "unknown variant `gif`".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Invalid configuration in native-assets.toml: unknown variant `gif`"
        );
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: "/app/native-assets.toml".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.to_string().contains("/app/native-assets.toml"));
        assert!(e.source().is_some());
    }

    #[test]
    fn config_error_ambiguous_project_mentions_setting() {
        let e = ConfigError::AmbiguousProject(PathBuf::from("ios"));
        assert!(e.to_string().contains("ios.project_name"));
    }

    #[test]
    fn resolve_error_missing_source_display() {
        let e = ResolveError::MissingSourceFile {
            path: PathBuf::from("/app/assets/icon.png"),
        };
        assert_eq!(
            e.to_string(),
            "source file does not exist: /app/assets/icon.png"
        );
    }

    #[test]
    fn project_error_parse_display() {
        let e = ProjectError::Parse {
            line: 12,
            message: "expected ';'".to_string(),
        };
        assert_eq!(e.to_string(), "parse error at line 12: expected ';'");
    }

    #[test]
    fn project_error_invalid_record_display() {
        let e = ProjectError::InvalidRecord {
            uuid: "83CBB9F71A601CBA00E9B192".to_string(),
            reason: "not a dictionary".to_string(),
        };
        assert!(e.to_string().contains("83CBB9F71A601CBA00E9B192"));
        assert!(e.to_string().contains("not a dictionary"));
    }

    #[test]
    fn native_assets_error_from_sub_errors() {
        let e: NativeAssetsError = ProjectError::NoNativeTarget.into();
        assert!(e.to_string().contains("Project error"));
        let e: NativeAssetsError = ConfigError::NotFound(PathBuf::from("x")).into();
        assert!(e.to_string().contains("Configuration error"));
        let e: NativeAssetsError = ResolveError::MissingSourceFile {
            path: PathBuf::from("x"),
        }
        .into();
        assert!(e.to_string().contains("Resolve error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<NativeAssetsError>();
        assert_send_sync::<ConfigError>();
        assert_send_sync::<ResolveError>();
        assert_send_sync::<ProjectError>();
    }

    #[test]
    fn project_error_converts_to_anyhow() {
        let e = ProjectError::MissingRootObject;
        let _anyhow_err: anyhow::Error = e.into();
    }
}
