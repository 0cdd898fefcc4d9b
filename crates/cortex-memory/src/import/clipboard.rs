//! Clipboard access
//!
//! There is no portable clipboard API, so [`SystemClipboard`] shells out to
//! whichever paste tool the platform provides.

use std::io::ErrorKind;
use std::process::Command;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard tool found (tried {0})")]
    NoTool(String),

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("clipboard content is not valid UTF-8")]
    InvalidUtf8,
}

/// Source of clipboard text
pub trait ClipboardProvider {
    fn read_text(&self) -> Result<String, ClipboardError>;
}

/// Reads the system clipboard through the platform paste command.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClipboard;

#[cfg(target_os = "macos")]
const PASTE_COMMANDS: &[(&str, &[&str])] = &[("pbpaste", &[])];

#[cfg(target_os = "windows")]
const PASTE_COMMANDS: &[(&str, &[&str])] = &[(
    "powershell",
    &["-NoProfile", "-Command", "Get-Clipboard -Raw"],
)];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PASTE_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-paste", &["--no-newline"]),
    ("xclip", &["-selection", "clipboard", "-o"]),
    ("xsel", &["--clipboard", "--output"]),
];

impl ClipboardProvider for SystemClipboard {
    fn read_text(&self) -> Result<String, ClipboardError> {
        let mut last_failure = None;

        for (program, args) in PASTE_COMMANDS {
            let output = match Command::new(program).args(*args).output() {
                Ok(output) => output,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    last_failure = Some(ClipboardError::ToolFailed {
                        tool: program.to_string(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            if output.status.success() {
                tracing::debug!(tool = program, "Read clipboard");
                return String::from_utf8(output.stdout).map_err(|_| ClipboardError::InvalidUtf8);
            }

            last_failure = Some(ClipboardError::ToolFailed {
                tool: program.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Err(last_failure.unwrap_or_else(|| {
            ClipboardError::NoTool(
                PASTE_COMMANDS
                    .iter()
                    .map(|(program, _)| *program)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClipboardError::ToolFailed {
            tool: "xclip".to_string(),
            message: "Error: Can't open display".to_string(),
        };
        assert_eq!(err.to_string(), "xclip failed: Error: Can't open display");
        assert!(
            ClipboardError::NoTool("pbpaste".to_string())
                .to_string()
                .contains("pbpaste")
        );
    }

    #[test]
    fn test_paste_commands_configured() {
        assert!(!PASTE_COMMANDS.is_empty());
    }
}
