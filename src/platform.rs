//! OS-specific concerns: privilege elevation and output-file permissions.
//!
//! The game client's install root often sits under a protected directory on
//! Windows. When a write fails there, the aggregator re-launches the process
//! elevated instead of surfacing the raw error; after an elevated run the
//! generated files are re-granted to the Users group so a later unelevated
//! run can overwrite them.

use std::path::Path;

use crate::errors::{Error, Result};

/// Re-launch the current executable with elevated privileges and the given
/// arguments. On success the elevated process takes over; the caller must
/// not resume its own run.
#[cfg(windows)]
pub fn elevate(args: &[&str]) -> Result<()> {
    use std::process::Command;

    let exe = std::env::current_exe().map_err(|err| Error::Elevate(err.to_string()))?;
    let arg_list = args.join(" ");
    let command = format!(
        "Start-Process -FilePath '{}' -ArgumentList '{}' -Verb RunAs",
        exe.display(),
        arg_list
    );

    let status = Command::new("powershell")
        .args(["-NoProfile", "-Command", &command])
        .status()
        .map_err(|err| Error::Elevate(err.to_string()))?;

    if !status.success() {
        return Err(Error::Elevate(
            "elevation request was declined".to_string(),
        ));
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn elevate(_args: &[&str]) -> Result<()> {
    Err(Error::Elevate(
        "privilege elevation is only supported on Windows".to_string(),
    ))
}

/// Grant the Users group full access to every generated file under `root`,
/// so unelevated runs can overwrite files an elevated run created.
#[cfg(windows)]
pub fn set_output_permissions(root: &Path) -> Result<()> {
    use std::process::Command;
    use tracing::warn;
    use walkdir::WalkDir;

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let result = Command::new("icacls")
            .arg(entry.path())
            .args(["/grant", "Users:F"])
            .status();
        match result {
            Ok(status) if status.success() => {}
            Ok(status) => {
                warn!(path = %entry.path().display(), %status, "icacls grant failed")
            }
            Err(err) => warn!(path = %entry.path().display(), %err, "icacls unavailable"),
        }
    }
    Ok(())
}

#[cfg(not(windows))]
pub fn set_output_permissions(_root: &Path) -> Result<()> {
    Ok(())
}
