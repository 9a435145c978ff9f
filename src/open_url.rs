use anyhow::{Context, Result};
use std::process::Command;
use tracing::{debug, warn};

pub fn open_url(url: &str, open_command: Option<&str>) -> Result<()> {
    if url.trim().is_empty() {
        warn!("story has no url, nothing to open");
        return Ok(());
    }
    if let Some(cmd) = open_command {
        Command::new(cmd)
            .arg(url)
            .spawn()
            .with_context(|| format!("failed to run open command: {}", cmd))?;
        return Ok(());
    }
    // Try using the system default
    if open::that(url).is_ok() {
        return Ok(());
    }
    debug!(url, "system opener failed, trying firefox");
    Command::new("firefox")
        .arg(url)
        .spawn()
        .context("no browser available")?;
    Ok(())
}
