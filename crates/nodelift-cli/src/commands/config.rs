//! `nodelift config` command implementation.
//!
//! Without options, prints the merged configuration. With `--registry` or
//! credentials, updates the project (or `--global`) config file. New
//! credentials are tested against the registry before they are saved.

use nodelift_config::toml::{self as config_toml, NodeliftToml};
use nodelift_config::{encode_credentials, Credentials};
use nodelift_core::error::{LiftError, LiftResult};
use nodelift_registry::{CredentialCheck, RegistryClient};

use super::CommandContext;

pub async fn execute(
    registry: Option<String>,
    credentials: Option<(String, String)>,
    global: bool,
    ctx: &CommandContext,
) -> LiftResult<()> {
    let loader = ctx.config_loader();

    if registry.is_none() && credentials.is_none() {
        let (config, sources) = loader.load().await?;
        for source in &sources {
            ctx.output.info(&format!("loaded {:?}", source));
        }
        ctx.output.print(config_toml::serialize_nodelift_toml(&config)?.trim_end());
        return Ok(());
    }

    let path = if global {
        loader.global_config_path()?
    } else {
        loader.project_config_path()
    };
    let mut config = if path.exists() {
        config_toml::load_from_file(&path).await?
    } else {
        NodeliftToml::default()
    };

    if let Some(registry) = registry {
        config.endpoint.registry = Some(registry);
    }
    config_toml::validate_config(&config)?;

    if let Some((username, password)) = credentials {
        let credentials = Credentials::new(username, password);
        let registry = config.endpoint.registry().to_string();
        let client = RegistryClient::with_base_url(&registry)?.with_credentials(credentials.clone());

        match client.test_credentials().await? {
            CredentialCheck::Authorized => ctx.output.success(&format!("Credentials accepted by {}", registry)),
            CredentialCheck::Unauthorized => return Err(LiftError::AuthenticationFailed { registry }),
            CredentialCheck::UnexpectedStatus(status) => ctx.output.warn(&format!(
                "{} answered {} when testing credentials; saving them anyway",
                registry, status
            )),
        }

        config.endpoint.auth = Some(encode_credentials(&credentials));
    }

    config_toml::save_to_file(&path, &config).await?;
    ctx.output.success(&format!("Wrote {}", path));
    Ok(())
}
