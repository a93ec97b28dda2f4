//! Looping background music played through an external player process.

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

/// Background music toggle. Starts muted; playback is never required for
/// the rest of the invitation to work.
pub struct BackgroundMusic {
    track: PathBuf,
    player: Vec<String>,
    child: Option<Child>,
    muted: bool,
}

impl BackgroundMusic {
    pub fn new(track: PathBuf, player: Vec<String>) -> Self {
        Self {
            track,
            player,
            child: None,
            muted: true,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Flip between muted and playing. Returns the new muted state.
    pub fn toggle(&mut self) -> anyhow::Result<bool> {
        if self.muted {
            self.play()?;
        } else {
            self.stop();
        }
        Ok(self.muted)
    }

    fn play(&mut self) -> anyhow::Result<()> {
        let Some((program, args)) = self.player.split_first() else {
            anyhow::bail!("no audio player configured");
        };
        let remote = self
            .track
            .to_str()
            .is_some_and(|t| t.starts_with("http://") || t.starts_with("https://"));
        if !remote && !self.track.exists() {
            anyhow::bail!("music file not found: {}", self.track.display());
        }

        let child = Command::new(program)
            .args(args)
            .arg(&self.track)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| anyhow::anyhow!("Failed to start {}: {}", program, e))?;

        tracing::info!(player = %program, track = %self.track.display(), "Background music started");
        self.child = Some(child);
        self.muted = false;
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                tracing::debug!("Player already exited: {}", e);
            }
            let _ = child.wait();
        }
        self.muted = true;
        tracing::info!("Background music muted");
    }

    /// Re-sync the muted flag if the player exited on its own.
    pub fn poll(&mut self) {
        if let Some(ref mut child) = self.child {
            if let Ok(Some(status)) = child.try_wait() {
                tracing::warn!("Audio player exited with {}", status);
                self.child = None;
                self.muted = true;
            }
        }
    }
}

impl Drop for BackgroundMusic {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Default looping player invocation.
pub fn default_player() -> Vec<String> {
    ["mpv", "--no-video", "--really-quiet", "--loop=inf"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_track_stays_muted() {
        let mut music = BackgroundMusic::new(PathBuf::from("/nonexistent/music.mp3"), default_player());
        assert!(music.is_muted());
        assert!(music.toggle().is_err());
        assert!(music.is_muted());
    }

    #[test]
    fn test_empty_player_is_an_error() {
        let mut music = BackgroundMusic::new(PathBuf::from("music.mp3"), Vec::new());
        assert!(music.toggle().is_err());
        assert!(music.is_muted());
    }

    #[cfg(unix)]
    #[test]
    fn test_toggle_starts_and_stops_player() {
        let dir = tempfile::tempdir().unwrap();
        let track = dir.path().join("background-music.mp3");
        std::fs::write(&track, b"not really audio").unwrap();

        // `tail -f` keeps running until killed, like a looping player
        let mut music = BackgroundMusic::new(track, vec!["tail".to_string(), "-f".to_string()]);
        assert!(!music.toggle().unwrap());
        music.poll();
        assert!(!music.is_muted());
        assert!(music.toggle().unwrap());
        assert!(music.is_muted());
    }
}
