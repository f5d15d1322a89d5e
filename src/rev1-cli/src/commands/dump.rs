use anyhow::{Context, Result};
use std::path::Path;

pub fn handle(level: &Path, json: bool) -> Result<()> {
    let decoded = rev1::read_level_file(level)
        .with_context(|| format!("Failed to read {}", level.display()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        for line in rev1::dump_lines(&decoded.cmds) {
            println!("{line}");
        }
    }
    Ok(())
}
