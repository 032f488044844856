//! Configuration layering, `.npmrc` fallback, and environment overrides
//!
//! Layers, lowest priority first:
//! 1. `~/.nodelift/config.toml`
//! 2. the nearest `nodelift.toml` walking up from the working directory
//! 3. `~/.npmrc`, which only fills `registry` and `auth` when still unset
//! 4. `NODELIFT_*` environment variables

use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use nodelift_core::error::LiftError;
use tracing::debug;

use crate::toml::NodeliftToml;
use crate::ConfigResult;

/// Project configuration file name
pub const CONFIG_FILE_NAME: &str = "nodelift.toml";

/// Main configuration loading interface
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Home directory override, used instead of `dirs::home_dir`
    home: Option<Utf8PathBuf>,
}

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Global config file
    Global(Utf8PathBuf),
    /// Project nodelift.toml
    Project(Utf8PathBuf),
    /// npm user config
    Npmrc(Utf8PathBuf),
    /// Environment variable
    Environment(String),
}

/// The subset of `.npmrc` nodelift understands
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NpmrcSettings {
    pub registry: Option<String>,
    pub auth: Option<String>,
}

impl NpmrcSettings {
    /// Parse `key = value` lines, ignoring comments and unknown keys
    pub fn parse(content: &str) -> Self {
        let mut settings = Self::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').to_string();
            if value.is_empty() {
                continue;
            }

            match key.trim() {
                "registry" => settings.registry = Some(value),
                "_auth" => settings.auth = Some(value),
                _ => {},
            }
        }

        settings
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self { cwd, home: None }
    }

    /// Use a fixed home directory for the global and npmrc layers
    pub fn with_home(mut self, home: Utf8PathBuf) -> Self {
        self.home = Some(home);
        self
    }

    /// Load the merged configuration with process environment overrides
    pub async fn load(&self) -> ConfigResult<(NodeliftToml, Vec<ConfigSource>)> {
        self.load_with_env(&Self::collect_env_overrides()).await
    }

    /// Load the merged configuration with explicit environment overrides
    pub async fn load_with_env(
        &self,
        env: &HashMap<String, String>,
    ) -> ConfigResult<(NodeliftToml, Vec<ConfigSource>)> {
        let mut config = NodeliftToml::default();
        let mut sources = Vec::new();

        if let Some((global, path)) = self.load_global_config().await? {
            config.merge(global);
            sources.push(ConfigSource::Global(path));
        }

        if let Some(path) = self.find_project_config() {
            let project = crate::toml::load_from_file(&path).await?;
            config.merge(project);
            sources.push(ConfigSource::Project(path));
        }

        if let Some((npmrc, path)) = self.load_npmrc().await? {
            let mut used = false;
            if config.endpoint.registry.is_none() && npmrc.registry.is_some() {
                config.endpoint.registry = npmrc.registry;
                used = true;
            }
            if config.endpoint.auth.is_none() && npmrc.auth.is_some() {
                config.endpoint.auth = npmrc.auth;
                used = true;
            }
            if used {
                sources.push(ConfigSource::Npmrc(path));
            }
        }

        sources.extend(Self::apply_env_overrides(&mut config, env));
        crate::toml::validate_config(&config)?;

        debug!("configuration loaded from {:?}", sources);
        Ok((config, sources))
    }

    /// Nearest nodelift.toml at or above the working directory
    pub fn find_project_config(&self) -> Option<Utf8PathBuf> {
        self.cwd
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|path| path.exists())
    }

    /// Path a new project configuration is written to
    pub fn project_config_path(&self) -> Utf8PathBuf {
        self.find_project_config()
            .unwrap_or_else(|| self.cwd.join(CONFIG_FILE_NAME))
    }

    /// Path of the global configuration file
    pub fn global_config_path(&self) -> ConfigResult<Utf8PathBuf> {
        Ok(self.home_dir()?.join(".nodelift").join("config.toml"))
    }

    /// Load global configuration
    pub async fn load_global_config(&self) -> ConfigResult<Option<(NodeliftToml, Utf8PathBuf)>> {
        let path = self.global_config_path()?;
        if !path.exists() {
            return Ok(None);
        }

        let config = crate::toml::load_from_file(&path).await?;
        Ok(Some((config, path)))
    }

    /// Load `~/.npmrc`, if present
    pub async fn load_npmrc(&self) -> ConfigResult<Option<(NpmrcSettings, Utf8PathBuf)>> {
        let path = self.home_dir()?.join(".npmrc");
        if !path.exists() {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| LiftError::io(format!("Failed to read {}", path), e))?;
        Ok(Some((NpmrcSettings::parse(&content), path)))
    }

    /// Apply `NODELIFT_*` overrides, returning the sources used
    pub fn apply_env_overrides(
        config: &mut NodeliftToml,
        overrides: &HashMap<String, String>,
    ) -> Vec<ConfigSource> {
        let mut applied = Vec::new();
        let mut keys: Vec<_> = overrides.keys().collect();
        keys.sort();

        for key in keys {
            let value = &overrides[key];
            match key.as_str() {
                "NODELIFT_REGISTRY" => config.endpoint.registry = Some(value.clone()),
                "NODELIFT_AUTH" => config.endpoint.auth = Some(value.clone()),
                "NODELIFT_TMP_DIR" => config.endpoint.tmp_dir = Some(value.into()),
                _ => continue,
            }
            applied.push(ConfigSource::Environment(key.clone()));
        }

        applied
    }

    /// Collect environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        std::env::vars()
            .filter(|(key, _)| key.starts_with("NODELIFT_"))
            .collect()
    }

    fn home_dir(&self) -> ConfigResult<Utf8PathBuf> {
        if let Some(home) = &self.home {
            return Ok(home.clone());
        }

        let home = dirs::home_dir().ok_or_else(|| LiftError::ConfigValidation {
            field: "home_dir".to_string(),
            reason: "Could not determine home directory".to_string(),
        })?;

        Utf8PathBuf::try_from(home).map_err(|e| LiftError::ConfigValidation {
            field: "home_dir".to_string(),
            reason: format!("Invalid home directory path: {}", e),
        })
    }

    /// Working directory the loader searches from
    pub fn cwd(&self) -> &Utf8Path {
        &self.cwd
    }
}
