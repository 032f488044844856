//! nodelift.toml configuration parsing and serialization

use std::path::PathBuf;

use camino::Utf8Path;
use nodelift_core::error::LiftError;
use serde::{Deserialize, Serialize};

use crate::credentials::{encode_credentials, Credentials};
use crate::ConfigResult;

/// Default npm registry
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org";

/// Default remote the converted packages are served from
pub const DEFAULT_REMOTE: &str = "https://npm.jspm.io";

/// Default endpoint name recorded in converted manifests
pub const DEFAULT_ENDPOINT_NAME: &str = "npm";

/// Largest tarball the downloader accepts
pub const DEFAULT_MAX_PAYLOAD_BYTES: u64 = 50_000_000;

/// Complete nodelift.toml configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeliftToml {
    /// Registry endpoint settings
    #[serde(default)]
    pub endpoint: EndpointSection,

    /// Tree build settings
    #[serde(default)]
    pub build: BuildSection,

    /// Shim namespace overrides
    #[serde(default)]
    pub shim: ShimSection,
}

/// Registry endpoint settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EndpointSection {
    /// Endpoint name written to `registry` in converted manifests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Registry URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<String>,

    /// Remote serving converted packages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,

    /// Encoded credentials (see `credentials`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    /// Directory for lookup caches and downloads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmp_dir: Option<PathBuf>,

    /// Deprecated plain-text username, migrated into `auth`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Deprecated plain-text password, migrated into `auth`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Tree build settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BuildSection {
    /// Worker threads used to rewrite files (defaults to the CPU count)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Maximum accepted tarball size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_payload_bytes: Option<u64>,
}

/// Shim namespace overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShimSection {
    /// Dependency target of the platform shim package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodelibs: Option<String>,

    /// Builtin module names redirected to the shim package
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builtins: Option<Vec<String>>,
}

impl EndpointSection {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_ENDPOINT_NAME)
    }

    pub fn registry(&self) -> &str {
        self.registry
            .as_deref()
            .unwrap_or(DEFAULT_REGISTRY)
            .trim_end_matches('/')
    }

    pub fn remote(&self) -> &str {
        self.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    /// Cache directory, defaulting to `~/.nodelift/tmp`
    pub fn tmp_dir(&self) -> PathBuf {
        self.tmp_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(".nodelift")
                .join("tmp")
        })
    }

    /// Move deprecated plain-text credentials into `auth`
    pub fn migrate_legacy_credentials(&mut self) -> bool {
        if self.auth.is_some() {
            return false;
        }

        match (self.username.take(), self.password.take()) {
            (Some(username), password) => {
                let credentials = Credentials::new(username, password.unwrap_or_default());
                self.auth = Some(encode_credentials(&credentials));
                true
            },
            (None, password) => {
                self.password = password;
                false
            },
        }
    }

    /// Overlay the fields set in `other`
    pub fn merge(&mut self, other: EndpointSection) {
        macro_rules! overlay {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        overlay!(name, registry, remote, auth, tmp_dir, username, password);
    }
}

impl BuildSection {
    pub fn max_payload_bytes(&self) -> u64 {
        self.max_payload_bytes.unwrap_or(DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl NodeliftToml {
    /// Overlay another configuration layer
    pub fn merge(&mut self, other: NodeliftToml) {
        self.endpoint.merge(other.endpoint);

        if other.build.concurrency.is_some() {
            self.build.concurrency = other.build.concurrency;
        }
        if other.build.max_payload_bytes.is_some() {
            self.build.max_payload_bytes = other.build.max_payload_bytes;
        }
        if other.shim.nodelibs.is_some() {
            self.shim.nodelibs = other.shim.nodelibs;
        }
        if other.shim.builtins.is_some() {
            self.shim.builtins = other.shim.builtins;
        }
    }
}

/// Parse nodelift.toml content
pub fn parse_nodelift_toml(content: &str) -> ConfigResult<NodeliftToml> {
    let mut config: NodeliftToml = toml::from_str(content).map_err(|e| LiftError::TomlParse {
        file: "nodelift.toml".to_string(),
        message: e.to_string(),
    })?;

    config.endpoint.migrate_legacy_credentials();
    validate_config(&config)?;
    Ok(config)
}

/// Serialize configuration to TOML
pub fn serialize_nodelift_toml(config: &NodeliftToml) -> ConfigResult<String> {
    toml::to_string_pretty(config).map_err(|e| LiftError::ConfigValidation {
        field: "config".to_string(),
        reason: format!("Failed to serialize: {}", e),
    })
}

/// Validate configuration values
pub fn validate_config(config: &NodeliftToml) -> ConfigResult<()> {
    for (field, value) in [
        ("endpoint.registry", &config.endpoint.registry),
        ("endpoint.remote", &config.endpoint.remote),
    ] {
        if let Some(url) = value {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(LiftError::ConfigValidation {
                    field: field.to_string(),
                    reason: format!("'{}' must be an http(s) URL", url),
                });
            }
        }
    }

    if config.build.concurrency == Some(0) {
        return Err(LiftError::ConfigValidation {
            field: "build.concurrency".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if let Some(builtins) = &config.shim.builtins {
        if let Some(bad) = builtins.iter().find(|name| name.is_empty() || name.contains('/')) {
            return Err(LiftError::ConfigValidation {
                field: "shim.builtins".to_string(),
                reason: format!("'{}' is not a module name", bad),
            });
        }
    }

    Ok(())
}

/// Load configuration from file
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<NodeliftToml> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LiftError::io(format!("Failed to read {}", path), e))?;

    parse_nodelift_toml(&content).map_err(|e| match e {
        LiftError::TomlParse { message, .. } => LiftError::TomlParse {
            file: path.to_string(),
            message,
        },
        other => other,
    })
}

/// Save configuration to file, creating parent directories
pub async fn save_to_file(path: &Utf8Path, config: &NodeliftToml) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LiftError::io(format!("Failed to create {}", parent), e))?;
    }

    let content = serialize_nodelift_toml(config)?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| LiftError::io(format!("Failed to write {}", path), e))
}
