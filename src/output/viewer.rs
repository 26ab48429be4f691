//! Handing the saved image to the host's default viewer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// What to do with the image once it has been saved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayPolicy {
    /// Never open a viewer
    Skip,
    /// Open a viewer when possible; headless hosts and launch failures are logged
    #[default]
    BestEffort,
    /// Failing to open a viewer is an error
    Require,
}

impl FromStr for DisplayPolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "skip" | "never" | "off" => Ok(Self::Skip),
            "best-effort" | "best_effort" | "auto" => Ok(Self::BestEffort),
            "require" | "always" => Ok(Self::Require),
            other => Err(format!(
                "Unknown display policy '{other}', expected skip, best-effort or require"
            )),
        }
    }
}

/// Result of the display step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status", content = "reason")]
pub enum DisplayOutcome {
    /// A viewer was launched
    Opened,
    /// The policy said not to display
    Skipped,
    /// No graphical session was found
    Headless,
    /// Launching the viewer failed
    Failed(String),
}

impl fmt::Display for DisplayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opened => f.write_str("opened in default viewer"),
            Self::Skipped => f.write_str("skipped"),
            Self::Headless => f.write_str("no graphical session"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

/// Whether this process can reach a graphical session.
///
/// Only X11/Wayland hosts can be headless in a detectable way; Windows and
/// macOS always report a session.
pub fn is_headless() -> bool {
    headless_with(|key| std::env::var_os(key).is_some_and(|v| !v.is_empty()))
}

#[cfg(all(unix, not(target_os = "macos")))]
fn headless_with(has_var: impl Fn(&str) -> bool) -> bool {
    !has_var("DISPLAY") && !has_var("WAYLAND_DISPLAY")
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn headless_with(_has_var: impl Fn(&str) -> bool) -> bool {
    false
}

/// Open `path` in the default image viewer according to `policy`.
///
/// Under [`DisplayPolicy::BestEffort`] this never fails; the outcome records
/// what happened instead.
pub fn present(path: &Path, policy: DisplayPolicy) -> Result<DisplayOutcome> {
    present_with(path, policy, is_headless(), |p| open::that(p))
}

fn present_with(
    path: &Path,
    policy: DisplayPolicy,
    headless: bool,
    launch: impl FnOnce(&Path) -> std::io::Result<()>,
) -> Result<DisplayOutcome> {
    if policy == DisplayPolicy::Skip {
        tracing::debug!("Display disabled by configuration");
        return Ok(DisplayOutcome::Skipped);
    }

    if headless {
        if policy == DisplayPolicy::Require {
            return Err(Error::Display(
                "no graphical session (DISPLAY/WAYLAND_DISPLAY unset)".to_string(),
            ));
        }
        tracing::info!(
            path = %path.display(),
            "No graphical session detected, not opening a viewer"
        );
        return Ok(DisplayOutcome::Headless);
    }

    match launch(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Opened image viewer");
            Ok(DisplayOutcome::Opened)
        }
        Err(e) if policy == DisplayPolicy::Require => Err(Error::Display(format!(
            "Failed to open {}: {e}",
            path.display()
        ))),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to open image viewer: {e}");
            Ok(DisplayOutcome::Failed(e.to_string()))
        }
    }
}
