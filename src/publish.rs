//! Crash-safe replacement of the published feed file.
//!
//! Replacement runs backup -> stage -> rename -> cleanup. The output path
//! only ever changes through rename, and content is fully staged before any
//! rename targets it, so readers observe either the previous document or
//! the new one, never a partial write. On failure at any step the staging
//! file is dropped and the backup is restored.

use std::path::{Path, PathBuf};

use crate::error::{FeedError, FeedResult};

/// The three paths of the commit protocol. Backup and staging are siblings
/// of the output and exist only during the commit window.
#[derive(Debug, Clone)]
pub struct PublishPaths {
    pub output: PathBuf,
    pub backup: PathBuf,
    pub staging: PathBuf,
}

impl PublishPaths {
    pub fn for_output(output: &Path) -> PublishPaths {
        PublishPaths {
            output: output.to_path_buf(),
            backup: sibling(output, "bak"),
            staging: sibling(output, "new"),
        }
    }
}

/// Append an extension without touching the existing one
/// ("feed.ics" -> "feed.ics.bak").
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Commit `content` to the output path. On any failure the previous
/// document is restored before the error is reported.
pub fn publish(paths: &PublishPaths, content: &str) -> FeedResult<()> {
    match try_publish(paths, content) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Publish failed, rolling back: {}", e);
            rollback(paths);
            Err(e)
        }
    }
}

fn try_publish(paths: &PublishPaths, content: &str) -> FeedResult<()> {
    if paths.output.exists() {
        if paths.backup.exists() {
            std::fs::remove_file(&paths.backup).map_err(|e| step_error("clear stale backup", e))?;
        }
        std::fs::rename(&paths.output, &paths.backup)
            .map_err(|e| step_error("move output to backup", e))?;
        log::info!(
            "Moved existing {} to backup {}",
            paths.output.display(),
            paths.backup.display()
        );
    }

    std::fs::write(&paths.staging, content).map_err(|e| step_error("write staging file", e))?;
    log::info!("Wrote new document to staging file {}", paths.staging.display());

    std::fs::rename(&paths.staging, &paths.output)
        .map_err(|e| step_error("commit staging to output", e))?;
    log::info!("Replaced {} with new document", paths.output.display());

    if paths.backup.exists() {
        std::fs::remove_file(&paths.backup).map_err(|e| step_error("remove backup", e))?;
        log::info!("Removed backup {}", paths.backup.display());
    }

    Ok(())
}

fn step_error(step: &'static str, source: std::io::Error) -> FeedError {
    FeedError::Publish { step, source }
}

/// Undo a partial publish: drop the staging file, then put the backup back
/// at the output path. Best effort; every miss is logged.
fn rollback(paths: &PublishPaths) {
    if paths.staging.exists() {
        if let Err(e) = std::fs::remove_file(&paths.staging) {
            log::warn!(
                "Could not remove staging file {}: {}",
                paths.staging.display(),
                e
            );
        }
    }

    if !paths.backup.exists() {
        return;
    }
    if paths.output.exists() {
        if let Err(e) = std::fs::remove_file(&paths.output) {
            log::warn!(
                "Could not remove partial output {}: {}",
                paths.output.display(),
                e
            );
        }
    }
    match std::fs::rename(&paths.backup, &paths.output) {
        Ok(()) => log::info!("Restored backup to {}", paths.output.display()),
        Err(e) => log::error!("Failed to restore backup: {}", e),
    }
}
