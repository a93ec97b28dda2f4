//! Hand URLs and files to the system opener.

use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    Exit { program: String, status: String },
}

/// What happened after handing a target to the opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The opener accepted the target
    Opened,
    /// Still running when the wait ran out; assumed to have taken over
    Pending,
}

/// Opens URLs in whatever application handles them.
pub trait UrlLauncher: Send + Sync {
    /// Launch `target` and wait up to `wait` for the opener to report back.
    fn launch(&self, target: &str, wait: Duration) -> Result<LaunchOutcome, LaunchError>;
}

/// Launcher backed by `xdg-open`, `open` or `start`, or a configured command.
#[derive(Debug, Clone, Default)]
pub struct SystemLauncher {
    command: Option<String>,
}

impl SystemLauncher {
    pub fn new(command: Option<String>) -> Self {
        Self { command }
    }

    fn command_for(&self, target: &str) -> Command {
        if let Some(ref opener) = self.command {
            let mut cmd = Command::new(opener);
            cmd.arg(target);
            return cmd;
        }

        #[cfg(target_os = "macos")]
        {
            let mut cmd = Command::new("open");
            cmd.arg(target);
            cmd
        }
        #[cfg(target_os = "windows")]
        {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", "start", "", target]);
            cmd
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            let mut cmd = Command::new("xdg-open");
            cmd.arg(target);
            cmd
        }
    }
}

impl UrlLauncher for SystemLauncher {
    fn launch(&self, target: &str, wait: Duration) -> Result<LaunchOutcome, LaunchError> {
        let mut cmd = self.command_for(target);
        let program = cmd.get_program().to_string_lossy().to_string();
        let child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: program.clone(),
                source,
            })?;

        tracing::debug!(%program, %target, "Launched opener");
        wait_for_exit(child, &program, wait)
    }
}

/// Poll a child until it exits or `wait` elapses.
pub fn wait_for_exit(mut child: Child, program: &str, wait: Duration) -> Result<LaunchOutcome, LaunchError> {
    let deadline = Instant::now() + wait;
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(LaunchOutcome::Opened),
            Ok(Some(status)) => {
                return Err(LaunchError::Exit {
                    program: program.to_string(),
                    status: status.to_string(),
                })
            }
            Ok(None) if Instant::now() >= deadline => {
                reap_in_background(child, program);
                return Ok(LaunchOutcome::Pending);
            }
            Ok(None) => std::thread::sleep(Duration::from_millis(25)),
            Err(source) => {
                return Err(LaunchError::Spawn {
                    program: program.to_string(),
                    source,
                })
            }
        }
    }
}

/// Wait for a child that outlived the launch wait so it does not linger as a
/// zombie once it exits.
pub fn reap_in_background(mut child: Child, program: &str) -> JoinHandle<Option<ExitStatus>> {
    let program = program.to_string();
    std::thread::spawn(move || match child.wait() {
        Ok(status) => {
            tracing::debug!(%program, %status, "Opener exited");
            Some(status)
        }
        Err(e) => {
            tracing::debug!(%program, "Failed to wait for opener: {}", e);
            None
        }
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_failing_opener_reports_exit() {
        let launcher = SystemLauncher::new(Some("false".to_string()));
        let result = launcher.launch("kakaomap://search?q=x", Duration::from_secs(2));
        assert!(matches!(result, Err(LaunchError::Exit { .. })));
    }

    #[test]
    fn test_succeeding_opener() {
        let launcher = SystemLauncher::new(Some("true".to_string()));
        let result = launcher.launch("https://example.com", Duration::from_secs(2));
        assert_eq!(result.unwrap(), LaunchOutcome::Opened);
    }

    #[test]
    fn test_slow_opener_is_pending() {
        let launcher = SystemLauncher::new(Some("sleep".to_string()));
        // `sleep 1` outlives a 50 ms wait
        let result = launcher.launch("1", Duration::from_millis(50));
        assert_eq!(result.unwrap(), LaunchOutcome::Pending);
    }

    #[test]
    fn test_background_reaper_collects_exit_status() {
        let child = Command::new("sleep").arg("0.2").spawn().unwrap();
        let handle = reap_in_background(child, "sleep");
        let status = handle.join().unwrap().unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_missing_opener_fails_to_spawn() {
        let launcher = SystemLauncher::new(Some("/nonexistent/opener-binary".to_string()));
        let result = launcher.launch("https://example.com", Duration::from_millis(10));
        assert!(matches!(result, Err(LaunchError::Spawn { .. })));
    }
}
