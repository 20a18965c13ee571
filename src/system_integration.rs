use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Result, TagError};

/// Prints the POSIX path of every item selected in the frontmost Finder
/// window, one per line.
const SELECTION_SCRIPT: &str = r#"
set output to ""
tell application "Finder"
    repeat with selectedItem in (get selection)
        set output to output & POSIX path of (selectedItem as alias) & linefeed
    end repeat
end tell
return output
"#;

/// The current Finder selection. Any automation failure is logged and
/// reads as an empty selection.
pub fn finder_selection() -> Vec<PathBuf> {
    match try_finder_selection() {
        Ok(paths) => paths,
        Err(err) => {
            warn!(%err, "treating Finder selection as empty");
            Vec::new()
        }
    }
}

/// Asks Finder for its selection via `osascript`.
pub fn try_finder_selection() -> Result<Vec<PathBuf>> {
    if !cfg!(target_os = "macos") {
        return Err(TagError::Automation(
            "Finder automation is only available on macOS".to_string(),
        ));
    }

    let output = Command::new("osascript")
        .arg("-e")
        .arg(SELECTION_SCRIPT)
        .output()
        .map_err(|e| TagError::Automation(format!("osascript execution failed: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(TagError::Automation(stderr.trim().to_string()));
    }

    let paths = parse_selection_output(&output.stdout);
    debug!(count = paths.len(), "read Finder selection");
    Ok(paths)
}

/// `osascript` output parsing (pure function)
fn parse_selection_output(stdout: &[u8]) -> Vec<PathBuf> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}
