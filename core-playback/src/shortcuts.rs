//! Keyboard shortcuts for the audio controls.
//!
//! | Key | Command |
//! |-----|---------|
//! | `Space` | play / pause |
//! | `Escape` | stop everything |
//! | `ArrowLeft` / `ArrowRight` | seek -5 s / +5 s |
//! | `ArrowUp` / `ArrowDown` | volume +10 % / -10 % |
//! | `KeyM` | mute toggle |
//! | `KeyR` | restart |
//!
//! Seek, volume, mute and restart act on the playing session only.

use tracing::debug;

use crate::manager::SessionManager;

const SEEK_STEP_SECS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutCommand {
    TogglePlay,
    StopAll,
    SeekBackward,
    SeekForward,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    Restart,
}

impl ShortcutCommand {
    /// Map a `KeyboardEvent.code`. Keys typed into editable elements are
    /// never shortcuts.
    pub fn from_key(code: &str, in_editable: bool) -> Option<Self> {
        if in_editable {
            return None;
        }
        match code {
            "Space" => Some(ShortcutCommand::TogglePlay),
            "Escape" => Some(ShortcutCommand::StopAll),
            "ArrowLeft" => Some(ShortcutCommand::SeekBackward),
            "ArrowRight" => Some(ShortcutCommand::SeekForward),
            "ArrowUp" => Some(ShortcutCommand::VolumeUp),
            "ArrowDown" => Some(ShortcutCommand::VolumeDown),
            "KeyM" => Some(ShortcutCommand::ToggleMute),
            "KeyR" => Some(ShortcutCommand::Restart),
            _ => None,
        }
    }

    /// Apply to `manager`. Returns the feedback message to flash, or `None`
    /// when nothing happened.
    pub async fn apply(self, manager: &SessionManager) -> Option<String> {
        let feedback = match self {
            ShortcutCommand::TogglePlay => {
                if let Some(playing) = manager.playing() {
                    playing.pause().ok()?;
                    "⏸️ 已暂停".to_string()
                } else {
                    let session = manager.first_available()?;
                    // Loading and failures show up in the session's own controls.
                    let _ = session.play().await;
                    "▶️ 开始播放".to_string()
                }
            }
            ShortcutCommand::StopAll => {
                let stopped = manager.stop_all();
                if stopped == 0 {
                    return None;
                }
                format!("⏹️ 已停止 {} 个音频", stopped)
            }
            ShortcutCommand::SeekBackward => {
                manager.playing()?.seek_by(-SEEK_STEP_SECS).ok()?;
                "⏪ 后退5秒".to_string()
            }
            ShortcutCommand::SeekForward => {
                manager.playing()?.seek_by(SEEK_STEP_SECS).ok()?;
                "⏩ 前进5秒".to_string()
            }
            ShortcutCommand::VolumeUp => {
                let volume = manager.playing()?.adjust_volume(1).ok()?;
                format!("🔊 音量: {}%", (volume * 100.0).round() as i64)
            }
            ShortcutCommand::VolumeDown => {
                let volume = manager.playing()?.adjust_volume(-1).ok()?;
                format!("🔉 音量: {}%", (volume * 100.0).round() as i64)
            }
            ShortcutCommand::ToggleMute => {
                if manager.playing()?.toggle_mute().ok()? {
                    "🔇 已静音".to_string()
                } else {
                    "🔊 取消静音".to_string()
                }
            }
            ShortcutCommand::Restart => {
                manager.playing()?.restart().ok()?;
                "🔄 重新播放".to_string()
            }
        };
        debug!(command = ?self, %feedback, "Shortcut applied");
        Some(feedback)
    }
}
