use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(level: &Path, output: Option<&Path>) -> Result<()> {
    let decoded = rev1::read_level_file(level)
        .with_context(|| format!("Failed to read {}", level.display()))?;
    let target = output.unwrap_or(level);
    rev1::write_level_file(target, &decoded)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    println!(
        "Wrote {} ({} commands, version {})",
        target.display(),
        decoded.cmds.len(),
        decoded.version
    );
    Ok(())
}
