use std::path::Path;
use std::process::Command;

/// Open `path` with the platform's default application.
///
/// Failure is logged and otherwise ignored; the spreadsheet is already on disk.
pub fn open(path: &Path) {
    let mut command = opener();
    let status = command.arg(path).status();
    match status {
        Ok(s) if s.success() => tracing::info!(path = %path.display(), "opened spreadsheet"),
        Ok(s) => tracing::warn!(path = %path.display(), status = %s, "opener exited with failure"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not launch opener"),
    }
}

#[cfg(target_os = "macos")]
fn opener() -> Command {
    Command::new("open")
}

#[cfg(target_os = "windows")]
fn opener() -> Command {
    let mut command = Command::new("cmd");
    // The empty argument is the window title `start` expects first.
    command.args(["/C", "start", ""]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener() -> Command {
    Command::new("xdg-open")
}
