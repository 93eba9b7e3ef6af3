use crate::error::Result;
use crate::models::RepositoryTarget;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Immediate, non-hidden subdirectories of `vault_path` that contain a `.git`.
///
/// Order follows the directory listing and is not guaranteed.
pub fn list_candidates(vault_path: &Path) -> Result<Vec<RepositoryTarget>> {
    let mut seen_any = false;
    let mut candidates = Vec::new();

    for entry in fs::read_dir(vault_path)? {
        let entry = entry?;
        seen_any = true;

        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();

        if name.starts_with('.') || !path.is_dir() {
            continue;
        }

        if !path.join(".git").exists() {
            debug!(repo = %name, "Skipping directory without .git");
            continue;
        }

        candidates.push(RepositoryTarget::new(name, path));
    }

    if !seen_any {
        warn!("No directories found in vault path {}", vault_path.display());
    }

    Ok(candidates)
}
