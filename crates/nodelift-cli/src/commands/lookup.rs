//! `nodelift lookup` command implementation.

use nodelift_core::error::{LiftError, LiftResult};
use nodelift_registry::{LookupOutcome, RegistryClient};

use super::CommandContext;

/// Print `<version> <shasum>` for every published version
pub async fn execute(name: String, ctx: &CommandContext) -> LiftResult<()> {
    let config = ctx.load_config().await?;
    let client = RegistryClient::from_config(&config.endpoint, &config.build)?;

    match client.lookup(&name).await? {
        LookupOutcome::Found { versions } => {
            for (version, entry) in &versions {
                ctx.output.print(&format!("{} {}", version, entry.hash));
            }
            Ok(())
        },
        LookupOutcome::NotFound => Err(LiftError::PackageNotFound { name }),
    }
}
