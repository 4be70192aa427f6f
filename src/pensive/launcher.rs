//! Opening attachments with external programs.
//!
//! URLs go to the configured browser. Files go to the platform opener:
//! - macOS: `open`
//! - Linux: `xdg-open`
//! - Windows: `cmd /C start`
//!
//! Programs are spawned detached; pensive does not wait for them.

use crate::error::{PensiveError, Result};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

fn spawn(mut command: Command) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!(program = %program, "launching");
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|e| PensiveError::Api(format!("Failed to launch {}: {}", program, e)))
}

/// Opens `url` with `browser` (a program name or path, no arguments).
pub fn open_url(browser: &str, url: &str) -> Result<()> {
    if browser.trim().is_empty() {
        return Err(PensiveError::Api("No browser configured".to_string()));
    }
    let mut command = Command::new(browser);
    command.arg(url);
    spawn(command)
}

/// Opens a file or directory with the platform's default application.
pub fn open_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(PensiveError::Api(format!(
            "'{}' does not exist",
            path.display()
        )));
    }

    #[cfg(target_os = "macos")]
    {
        let mut command = Command::new("open");
        command.arg(path);
        spawn(command)
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        spawn(command)
    }

    #[cfg(target_os = "windows")]
    {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(path);
        spawn(command)
    }

    #[cfg(not(any(unix, target_os = "windows")))]
    {
        Err(PensiveError::Api(
            "Opening files is not supported on this platform".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let err = open_path(Path::new("/no/such/pensive/file")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn empty_browser_is_rejected() {
        assert!(open_url("  ", "https://example.org").is_err());
    }

    #[test]
    fn unknown_browser_fails_to_launch() {
        let err = open_url("pensive-no-such-browser", "https://example.org").unwrap_err();
        assert!(err.to_string().contains("Failed to launch"));
    }
}
