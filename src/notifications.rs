//! Timer-up notifications with fallbacks.
//!
//! Strategies are tried in order until one succeeds:
//! 1. Audio cue (only after a genuine user interaction)
//! 2. Desktop notification (subject to the permission setting)
//! 3. Terminal title flash (always works)

use crossterm::{execute, terminal::SetTitle};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a strategy did not deliver; every variant means "try the next one"
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("no user interaction recorded yet")]
    NoInteraction,
    #[error("no audio cue available")]
    NoAudio,
    #[error("audio playback failed: {0}")]
    Playback(String),
    #[error("desktop notifications are not supported on this platform")]
    Unsupported,
    #[error("desktop notification permission denied")]
    PermissionDenied,
    #[error("desktop notification failed: {0}")]
    Display(String),
}

/// Desktop notification permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; asking resolves it
    #[default]
    Default,
}

/// Which strategy delivered the notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Audio,
    Desktop,
    TitleFlash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyOptions {
    pub title: String,
    pub body: String,
    /// Text alternated with the original title
    pub flash_text: String,
    /// Number of alert/original pairs
    pub flash_count: u32,
    pub flash_interval: Duration,
}

impl Default for NotifyOptions {
    fn default() -> Self {
        Self {
            title: "Timer Up!".to_string(),
            body: "Your timer has finished.".to_string(),
            flash_text: "🔔 TIMER UP! 🔔".to_string(),
            flash_count: 10,
            flash_interval: Duration::from_millis(500),
        }
    }
}

pub trait AudioCue {
    fn play(&mut self) -> Result<(), NotifyError>;
    /// Stop playback and free the handle
    fn release(&mut self);
}

pub trait DesktopNotifier {
    fn supported(&self) -> bool;
    fn permission(&self) -> Permission;
    fn request_permission(&mut self) -> Result<Permission, NotifyError>;
    fn show(&mut self, title: &str, body: &str) -> Result<(), NotifyError>;
}

pub trait TitleSink {
    fn set_title(&mut self, title: &str);
}

/// How long a fresh player process is watched for an early failure
const PLAYER_STARTUP_WINDOW: Duration = Duration::from_millis(200);
const PLAYER_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Plays a sound file through an external player process
pub struct SoundPlayer {
    path: PathBuf,
    player: String,
    child: Option<Child>,
}

impl SoundPlayer {
    pub fn new(path: PathBuf, player: impl Into<String>) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "sound file not found; audio notifications will fall through");
        }
        Self {
            path,
            player: player.into(),
            child: None,
        }
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// Wait out the startup window; a player that exits non-zero in it failed
    fn watch_startup(&self, child: &mut Child) -> Result<(), NotifyError> {
        let deadline = Instant::now() + PLAYER_STARTUP_WINDOW;
        loop {
            match child.try_wait() {
                Ok(Some(status)) if status.success() => return Ok(()),
                Ok(Some(status)) => {
                    return Err(NotifyError::Playback(format!(
                        "{} exited with {}",
                        self.player, status
                    )))
                }
                Ok(None) if Instant::now() >= deadline => return Ok(()),
                Ok(None) => std::thread::sleep(PLAYER_POLL_INTERVAL),
                Err(e) => return Err(NotifyError::Playback(format!("{}: {}", self.player, e))),
            }
        }
    }
}

impl AudioCue for SoundPlayer {
    fn play(&mut self) -> Result<(), NotifyError> {
        if !self.path.exists() {
            return Err(NotifyError::Playback(format!(
                "missing sound file {}",
                self.path.display()
            )));
        }
        // Rewind: a cue still playing starts over
        self.stop();

        let mut child = Command::new(&self.player)
            .arg(&self.path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| NotifyError::Playback(format!("{}: {}", self.player, e)))?;

        if let Err(e) = self.watch_startup(&mut child) {
            let _ = child.wait();
            return Err(e);
        }
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) {
        self.stop();
    }
}

/// Default audio player for this platform
pub fn default_audio_player() -> &'static str {
    if cfg!(target_os = "macos") {
        "afplay"
    } else {
        "paplay"
    }
}

/// Desktop notifications via `osascript` (macOS) or `notify-send`
pub struct CommandNotifier {
    program: Option<&'static str>,
    permission: Permission,
}

impl CommandNotifier {
    pub fn new(permission: Permission) -> Self {
        let program = if cfg!(target_os = "macos") {
            Some("osascript")
        } else if cfg!(unix) {
            Some("notify-send")
        } else {
            None
        };
        Self {
            program,
            permission,
        }
    }
}

/// Whether `program` is an executable file somewhere on `PATH`
fn on_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

impl DesktopNotifier for CommandNotifier {
    fn supported(&self) -> bool {
        self.program.is_some()
    }

    fn permission(&self) -> Permission {
        self.permission
    }

    fn request_permission(&mut self) -> Result<Permission, NotifyError> {
        let program = self.program.ok_or(NotifyError::Unsupported)?;
        self.permission = if on_path(program) {
            Permission::Granted
        } else {
            Permission::Denied
        };
        debug!(program, permission = ?self.permission, "resolved notification permission");
        Ok(self.permission)
    }

    fn show(&mut self, title: &str, body: &str) -> Result<(), NotifyError> {
        let program = self.program.ok_or(NotifyError::Unsupported)?;
        let mut cmd = Command::new(program);
        if program == "osascript" {
            let script = format!(
                r#"display notification "{}" with title "{}""#,
                body.replace('"', "\\\""),
                title.replace('"', "\\\"")
            );
            cmd.arg("-e").arg(script);
        } else {
            cmd.arg(title).arg(body);
        }

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| NotifyError::Display(e.to_string()))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(NotifyError::Display(format!("{} exited with {}", program, output.status)))
        }
    }
}

/// Writes the terminal window title
pub struct TerminalTitle;

impl TitleSink for TerminalTitle {
    fn set_title(&mut self, title: &str) {
        if let Err(e) = execute!(io::stdout(), SetTitle(title)) {
            debug!(error = %e, "could not set terminal title");
        }
    }
}

/// Alternates the title between an alert and the original a fixed number of times
#[derive(Debug, Clone)]
pub struct TitleFlasher {
    original: String,
    alert: String,
    current: String,
    toggles_left: u32,
    interval: Duration,
    next_at: Option<Instant>,
}

impl TitleFlasher {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            current: original.clone(),
            original,
            alert: String::new(),
            toggles_left: 0,
            interval: Duration::from_millis(500),
            next_at: None,
        }
    }

    pub fn is_flashing(&self) -> bool {
        self.next_at.is_some()
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn start(&mut self, alert: &str, count: u32, interval: Duration, now: Instant) {
        self.alert = alert.to_string();
        self.toggles_left = count.max(1) * 2;
        self.interval = interval.max(Duration::from_millis(1));
        self.next_at = Some(now + self.interval);
    }

    /// Apply every toggle due by `now`
    pub fn pump(&mut self, now: Instant, sink: &mut dyn TitleSink) {
        while let Some(at) = self.next_at {
            if at > now {
                break;
            }
            self.current = if self.current == self.alert {
                self.original.clone()
            } else {
                self.alert.clone()
            };
            self.toggles_left = self.toggles_left.saturating_sub(1);

            if self.toggles_left == 0 {
                self.next_at = None;
                self.current = self.original.clone();
            } else {
                self.next_at = Some(at + self.interval);
            }
            sink.set_title(&self.current);
        }
    }

    /// Stop any flash in progress and put the original title back
    pub fn cancel(&mut self, sink: &mut dyn TitleSink) {
        if self.next_at.take().is_some() || self.current != self.original {
            self.toggles_left = 0;
            self.current = self.original.clone();
            sink.set_title(&self.original);
        }
    }
}

/// Source of a qualifying user interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    KeyPress,
    Click,
}

/// One-shot interaction listener: records the first event, then stops listening
#[derive(Debug, Clone)]
pub struct InteractionTracker {
    interacted: bool,
    listening: bool,
}

impl InteractionTracker {
    pub fn new() -> Self {
        Self {
            interacted: false,
            listening: true,
        }
    }

    pub fn observe(&mut self, kind: Interaction) {
        if self.listening {
            self.listening = false;
            self.interacted = true;
            debug!(?kind, "user interaction detected, audio enabled");
        }
    }

    pub fn mark(&mut self) {
        self.interacted = true;
    }

    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

impl Default for InteractionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the audio handle and the title for one timer's lifetime
pub struct NotificationManager {
    audio: Option<Box<dyn AudioCue>>,
    desktop: Box<dyn DesktopNotifier>,
    title: Box<dyn TitleSink>,
    flasher: TitleFlasher,
    interaction: InteractionTracker,
    destroyed: bool,
}

impl NotificationManager {
    pub fn new(
        original_title: &str,
        audio: Option<Box<dyn AudioCue>>,
        desktop: Box<dyn DesktopNotifier>,
        mut title: Box<dyn TitleSink>,
    ) -> Self {
        title.set_title(original_title);
        Self {
            audio,
            desktop,
            title,
            flasher: TitleFlasher::new(original_title),
            interaction: InteractionTracker::new(),
            destroyed: false,
        }
    }

    /// Feed an input event to the one-shot interaction listener
    pub fn observe_interaction(&mut self, kind: Interaction) {
        self.interaction.observe(kind);
    }

    /// Count an explicit UI action (e.g. starting the timer) as an interaction
    pub fn mark_user_interaction(&mut self) {
        self.interaction.mark();
    }

    pub fn has_user_interacted(&self) -> bool {
        self.interaction.has_interacted()
    }

    /// Title currently shown (alert text while flashing)
    pub fn current_title(&self) -> &str {
        self.flasher.current()
    }

    pub fn is_flashing(&self) -> bool {
        self.flasher.is_flashing()
    }

    fn try_audio(&mut self) -> Result<(), NotifyError> {
        if !self.interaction.has_interacted() {
            return Err(NotifyError::NoInteraction);
        }
        let audio = self.audio.as_mut().ok_or(NotifyError::NoAudio)?;
        audio.play()
    }

    fn try_desktop(&mut self, options: &NotifyOptions) -> Result<(), NotifyError> {
        if !self.desktop.supported() {
            return Err(NotifyError::Unsupported);
        }
        let permission = match self.desktop.permission() {
            Permission::Default => self.desktop.request_permission()?,
            other => other,
        };
        match permission {
            Permission::Granted => self.desktop.show(&options.title, &options.body),
            _ => Err(NotifyError::PermissionDenied),
        }
    }

    /// Deliver a timer-up notification through the first strategy that works
    pub fn notify(&mut self, options: &NotifyOptions, now: Instant) -> NotifyOutcome {
        debug!(interacted = self.interaction.has_interacted(), "attempting to notify");

        match self.try_audio() {
            Ok(()) => return NotifyOutcome::Audio,
            Err(NotifyError::NoInteraction) => {
                warn!("cannot play audio: no user interaction detected")
            }
            Err(e) => warn!(error = %e, "audio notification failed"),
        }

        match self.try_desktop(options) {
            Ok(()) => return NotifyOutcome::Desktop,
            Err(e) => debug!(error = %e, "desktop notification unavailable"),
        }

        debug!("using title flash fallback");
        self.flasher
            .start(&options.flash_text, options.flash_count, options.flash_interval, now);
        NotifyOutcome::TitleFlash
    }

    /// Advance the title flash
    pub fn pump(&mut self, now: Instant) {
        self.flasher.pump(now, self.title.as_mut());
    }

    pub fn cancel_flash(&mut self) {
        self.flasher.cancel(self.title.as_mut());
    }

    /// Release the audio handle and restore the original title
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(mut audio) = self.audio.take() {
            audio.release();
        }
        self.flasher.cancel(self.title.as_mut());
        let original = self.flasher.current().to_string();
        self.title.set_title(&original);
    }
}

impl Drop for NotificationManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Resolve a sound path against the data directory unless it is absolute
pub fn resolve_sound_path(base: &Path, sound: &Path) -> PathBuf {
    if sound.is_absolute() {
        sound.to_path_buf()
    } else {
        base.join(sound)
    }
}
