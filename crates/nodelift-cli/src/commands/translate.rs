//! `nodelift translate` command implementation.

use nodelift_core::error::LiftResult;
use nodelift_semver::translate;

use super::CommandContext;

/// Print the target form of each npm range
pub async fn execute(ranges: Vec<String>, ctx: &CommandContext) -> LiftResult<()> {
    for range in &ranges {
        let target = translate(range)?;
        ctx.output.print(&format!("{} -> {}", range, target));
    }
    Ok(())
}
