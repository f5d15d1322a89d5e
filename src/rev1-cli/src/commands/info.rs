use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::Path;

pub fn handle(level: &Path) -> Result<()> {
    let decoded = rev1::read_level_file(level)
        .with_context(|| format!("Failed to read {}", level.display()))?;

    println!("{}", level.display());
    println!("  Version:  {}", decoded.version);
    println!("  Commands: {}", decoded.cmds.len());

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for cmd in &decoded.cmds {
        *counts.entry(format!("{:?}", cmd.tag)).or_default() += 1;
    }
    for (name, count) in &counts {
        println!("    {count:6}  {name}");
    }
    Ok(())
}
