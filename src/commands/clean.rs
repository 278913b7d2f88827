use crate::cache::IncrementalCache;
use anyhow::{Context, Result};
use std::path::Path;

pub fn clean_cache(path: &Path) -> Result<()> {
    let project_root = path
        .canonicalize()
        .with_context(|| format!("project root {} not found", path.display()))?;

    if IncrementalCache::clean(&project_root)? {
        println!("Removed incremental cache for {}", project_root.display());
    } else {
        println!("No incremental cache found for {}", project_root.display());
    }
    Ok(())
}
