//! Copy text to the system clipboard.
//!
//! The clipboard command (`wl-copy`, `xclip`, `pbcopy`, `clip` or a configured
//! one) is tried first. When none of them works the text is sent to the
//! terminal as an OSC 52 selection sequence, which most terminal emulators
//! forward to the clipboard.

use base64::Engine;
use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;

/// How long the "copied" confirmation stays on screen.
pub const COPY_NOTICE_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("no clipboard command available")]
    NoCommand,
    #[error("clipboard command {program} failed: {reason}")]
    Command { program: String, reason: String },
    #[error("terminal selection copy failed: {0}")]
    Terminal(#[from] std::io::Error),
}

/// How the text reached the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    Command,
    TerminalSelection,
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    /// Program and arguments overriding the platform defaults
    command: Option<Vec<String>>,
}

impl Clipboard {
    pub fn new(command: Option<Vec<String>>) -> Self {
        Self {
            command: command.filter(|c| !c.is_empty()),
        }
    }

    /// Copy `text`, falling back to the terminal selection sequence on stdout.
    pub fn copy(&self, text: &str) -> Result<CopyMethod, ClipboardError> {
        let mut stdout = std::io::stdout();
        self.copy_with_fallback(text, &mut stdout)
    }

    pub fn copy_with_fallback(&self, text: &str, terminal: &mut dyn Write) -> Result<CopyMethod, ClipboardError> {
        match self.copy_with_command(text) {
            Ok(()) => Ok(CopyMethod::Command),
            Err(e) => {
                tracing::debug!("Clipboard command unavailable ({}), using terminal selection", e);
                write_osc52(text, terminal)?;
                Ok(CopyMethod::TerminalSelection)
            }
        }
    }

    fn copy_with_command(&self, text: &str) -> Result<(), ClipboardError> {
        let candidates = match self.command {
            Some(ref cmd) => vec![cmd.clone()],
            None => default_commands(),
        };
        if candidates.is_empty() {
            return Err(ClipboardError::NoCommand);
        }

        let mut last_error = ClipboardError::NoCommand;
        for candidate in candidates {
            match run_copy_command(&candidate, text) {
                Ok(()) => return Ok(()),
                Err(e) => last_error = e,
            }
        }
        Err(last_error)
    }
}

fn default_commands() -> Vec<Vec<String>> {
    let to_vec = |args: &[&str]| args.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    #[cfg(target_os = "macos")]
    {
        vec![to_vec(&["pbcopy"])]
    }
    #[cfg(target_os = "windows")]
    {
        vec![to_vec(&["clip"])]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let mut commands = Vec::new();
        if std::env::var_os("WAYLAND_DISPLAY").is_some() {
            commands.push(to_vec(&["wl-copy"]));
        }
        if std::env::var_os("DISPLAY").is_some() {
            commands.push(to_vec(&["xclip", "-selection", "clipboard"]));
            commands.push(to_vec(&["xsel", "--clipboard", "--input"]));
        }
        commands
    }
}

fn run_copy_command(command: &[String], text: &str) -> Result<(), ClipboardError> {
    let Some((program, args)) = command.split_first() else {
        return Err(ClipboardError::NoCommand);
    };
    let failed = |reason: String| ClipboardError::Command {
        program: program.clone(),
        reason,
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| failed(e.to_string()))?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return Err(failed(e.to_string()));
        }
    }

    let status = child.wait().map_err(|e| failed(e.to_string()))?;
    if status.success() {
        Ok(())
    } else {
        Err(failed(status.to_string()))
    }
}

/// OSC 52 "set clipboard" sequence for `text`.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{}\x07", encoded)
}

fn write_osc52(text: &str, terminal: &mut dyn Write) -> std::io::Result<()> {
    terminal.write_all(osc52_sequence(text).as_bytes())?;
    terminal.flush()
}

/// Transient "copied" confirmation.
#[derive(Debug, Clone, Copy)]
pub struct CopyNotice {
    shown_at: Instant,
    duration: Duration,
}

impl CopyNotice {
    pub fn new(shown_at: Instant) -> Self {
        Self {
            shown_at,
            duration: COPY_NOTICE_DURATION,
        }
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) < self.duration
    }

    pub fn message(&self) -> &'static str {
        "복사되었습니다."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("hi"), "\x1b]52;c;aGk=\x07");
    }

    #[test]
    fn test_failing_command_falls_back_to_terminal() {
        let clipboard = Clipboard::new(Some(vec!["/nonexistent/copy-tool".to_string()]));
        let mut terminal = Vec::new();
        let method = clipboard.copy_with_fallback("3333-00-0000000", &mut terminal).unwrap();

        assert_eq!(method, CopyMethod::TerminalSelection);
        assert_eq!(
            String::from_utf8(terminal).unwrap(),
            osc52_sequence("3333-00-0000000")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_working_command_is_used() {
        let clipboard = Clipboard::new(Some(vec!["cat".to_string()]));
        let mut terminal = Vec::new();
        let method = clipboard.copy_with_fallback("hello", &mut terminal).unwrap();

        assert_eq!(method, CopyMethod::Command);
        assert!(terminal.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_that_ignores_input_is_an_error() {
        // `true` exits without reading, so a payload larger than the pipe
        // buffer fails with a broken pipe
        let text = "x".repeat(1024 * 1024);
        let result = run_copy_command(&["true".to_string()], &text);
        assert!(matches!(result, Err(ClipboardError::Command { .. })));

        let clipboard = Clipboard::new(Some(vec!["true".to_string()]));
        let mut terminal = Vec::new();
        let method = clipboard.copy_with_fallback(&text, &mut terminal).unwrap();
        assert_eq!(method, CopyMethod::TerminalSelection);
    }

    #[test]
    fn test_notice_expires_after_two_seconds() {
        let t0 = Instant::now();
        let notice = CopyNotice::new(t0);
        assert!(notice.is_visible(t0 + Duration::from_millis(1999)));
        assert!(!notice.is_visible(t0 + Duration::from_millis(2000)));
    }
}
