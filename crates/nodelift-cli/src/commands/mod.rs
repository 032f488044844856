//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking the shared [`CommandContext`].

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use nodelift_build::shim::{DEFAULT_NODELIBS, NODE_BUILTINS};
use nodelift_build::{ManifestNormalizer, ShimConfig};
use nodelift_config::{ConfigLoader, NodeliftToml};
use nodelift_core::error::{LiftError, LiftResult};
use tracing::{debug, info};

pub mod build;
pub mod config;
pub mod import;
pub mod lookup;
pub mod normalize;
pub mod translate;

#[cfg(test)]
mod tests;

use crate::{output::OutputHandler, Commands};

/// Shared context for all commands
pub struct CommandContext {
    pub cwd: Utf8PathBuf,
    /// Home directory override for the global and `.npmrc` config layers
    pub home: Option<Utf8PathBuf>,
    pub output: OutputHandler,
}

impl CommandContext {
    pub fn new() -> LiftResult<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| LiftError::io("Failed to get current directory".to_string(), e))?;
        let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|path| LiftError::ConfigValidation {
            field: "cwd".to_string(),
            reason: format!("{} is not valid UTF-8", path.display()),
        })?;

        Ok(Self {
            cwd,
            home: None,
            output: OutputHandler::new(),
        })
    }

    pub fn config_loader(&self) -> ConfigLoader {
        let loader = ConfigLoader::new(self.cwd.clone());
        match &self.home {
            Some(home) => loader.with_home(home.clone()),
            None => loader,
        }
    }

    /// Load the layered configuration
    pub async fn load_config(&self) -> LiftResult<NodeliftToml> {
        let (config, sources) = self.config_loader().load().await?;
        debug!("configuration sources: {:?}", sources);
        Ok(config)
    }

    /// Resolve a command-line path against the working directory
    pub fn resolve(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.cwd.join(path)
    }
}

/// Shim settings from the `[shim]` section
pub fn shim_config(config: &NodeliftToml) -> ShimConfig {
    let namespace = config.shim.nodelibs.as_deref().unwrap_or(DEFAULT_NODELIBS);
    let builtins = match &config.shim.builtins {
        Some(builtins) => builtins.clone(),
        None => NODE_BUILTINS.iter().map(|name| name.to_string()).collect(),
    };
    ShimConfig::new(namespace, builtins)
}

/// Manifest normalizer for the configured endpoint
pub fn normalizer(config: &NodeliftToml, shim: Arc<ShimConfig>) -> ManifestNormalizer {
    ManifestNormalizer::new(shim, config.endpoint.name())
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> LiftResult<()> {
    match command {
        Commands::Translate { ranges } => {
            info!("Translating {} ranges", ranges.len());
            translate::execute(ranges, ctx).await
        },
        Commands::Normalize { manifest, write } => {
            info!("Normalizing manifest (write: {})", write);
            normalize::execute(manifest, write, ctx).await
        },
        Commands::Build { dir } => {
            info!("Building package tree");
            build::execute(dir, ctx).await
        },
        Commands::Lookup { name } => {
            info!("Looking up {}", name);
            lookup::execute(name, ctx).await
        },
        Commands::Import { package, out } => {
            info!("Importing {} into {}", package, out);
            import::execute(package, out, ctx).await
        },
        Commands::Config {
            registry,
            username,
            password,
            global,
        } => {
            info!("Configuring endpoint (global: {})", global);
            let credentials = username.zip(password);
            config::execute(registry, credentials, global, ctx).await
        },
    }
}
