use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Lists the names harvested from a bundle. Game objects are filtered to
/// the `entity_` prefabs levels can reference unless `all` is set; a
/// material name appearing twice (case-insensitive) gets a warning, since
/// level conversion picks one of them arbitrarily.
pub fn handle(file: &Path, all: bool) -> Result<()> {
    let names = rev1_bundle::read_bundle_file(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut seen = HashSet::new();
    println!("Materials:");
    for material in &names.materials {
        if !seen.insert(material.to_lowercase()) {
            eprintln!(
                "WARNING: Bundle {} contains multiple versions of {material}",
                file.display()
            );
            continue;
        }
        println!("  {material}");
    }

    println!("Game objects:");
    for object in &names.game_objects {
        if all || object.to_lowercase().starts_with("entity_") {
            println!("  {object}");
        }
    }
    Ok(())
}
