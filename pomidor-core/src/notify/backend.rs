//! Speech and audio backends.
//!
//! Speech goes through `espeak-ng` on Linux and through the platform
//! engine (`tts`) elsewhere. Clips go through `mpg123` or `afplay`, or
//! through `rodio` when the `rodio` feature is enabled.
//!
//! Nothing here waits on a child process: spawned programs run detached and
//! stopped ones are reaped on a helper thread.

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use tracing::debug;

use super::clips::AudioClip;
use super::voice::Voice;
use super::{AudioPlayer, Speaker};
use crate::error::NotifyError;

fn spawn_quiet(cmd: &mut Command, program: &str) -> Result<Child, NotifyError> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| NotifyError::Spawn {
            program: program.to_string(),
            source,
        })
}

/// Kills `child` if it is still going. Reaping happens off the caller's thread.
fn stop(mut child: Child) {
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }
    let _ = child.kill();
    std::thread::spawn(move || {
        let _ = child.wait();
    });
}

/// Speech through an espeak-compatible program. At most one utterance is
/// in flight; starting a new one stops the previous.
#[derive(Debug)]
pub struct CommandSpeaker {
    program: String,
    child: Option<Child>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: None,
        }
    }
}

impl Speaker for CommandSpeaker {
    fn cancel(&mut self) {
        if let Some(child) = self.child.take() {
            stop(child);
        }
    }

    /// Runs `<program> --voices` and waits for it.
    fn voices(&mut self) -> Vec<Voice> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match output {
            Ok(out) if out.status.success() => parse_espeak_voices(&String::from_utf8_lossy(&out.stdout)),
            Ok(out) => {
                debug!(program = %self.program, status = %out.status, "Voice listing failed");
                Vec::new()
            }
            Err(e) => {
                debug!(program = %self.program, error = %e, "Voice listing unavailable");
                Vec::new()
            }
        }
    }

    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<(), NotifyError> {
        let mut cmd = Command::new(&self.program);
        if let Some(voice) = voice {
            cmd.arg("-v").arg(&voice.id);
        }
        cmd.arg(text);
        self.child = Some(spawn_quiet(&mut cmd, &self.program)?);
        Ok(())
    }
}

impl Drop for CommandSpeaker {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// `espeak-ng --voices`: `Pty Language Age/Gender VoiceName File ...`
pub fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            let lang = cols.get(1)?;
            Some(Voice::new(*lang, *lang))
        })
        .collect()
}

/// The platform speech engine (SAPI/WinRT, AVFoundation).
#[cfg(not(target_os = "linux"))]
pub struct TtsSpeaker {
    tts: tts::Tts,
    voices: Vec<tts::Voice>,
}

#[cfg(not(target_os = "linux"))]
impl TtsSpeaker {
    pub fn new() -> Result<Self, NotifyError> {
        let mut tts = tts::Tts::default().map_err(|e| NotifyError::Tts(e.to_string()))?;
        let _ = tts.set_rate(tts.normal_rate());
        let voices = if tts.supported_features().voice {
            tts.voices().unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(Self { tts, voices })
    }
}

#[cfg(not(target_os = "linux"))]
impl Speaker for TtsSpeaker {
    fn cancel(&mut self) {
        if let Err(e) = self.tts.stop() {
            debug!(error = %e, "Failed to stop utterance");
        }
    }

    fn voices(&mut self) -> Vec<Voice> {
        self.voices
            .iter()
            .map(|v| Voice::new(v.id(), v.language().to_string()))
            .collect()
    }

    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<(), NotifyError> {
        if let Some(wanted) = voice {
            if let Some(v) = self.voices.iter().find(|v| v.id() == wanted.id) {
                self.tts
                    .set_voice(v)
                    .map_err(|e| NotifyError::Tts(e.to_string()))?;
            }
        }
        self.tts
            .speak(text, true)
            .map_err(|e| NotifyError::Tts(e.to_string()))?;
        Ok(())
    }
}

/// The speaker used when no program is configured, if the platform has one.
#[cfg(target_os = "linux")]
pub fn platform_speaker() -> Option<Box<dyn Speaker>> {
    Some(Box::new(CommandSpeaker::new("espeak-ng")))
}

#[cfg(not(target_os = "linux"))]
pub fn platform_speaker() -> Option<Box<dyn Speaker>> {
    match TtsSpeaker::new() {
        Ok(speaker) => Some(Box::new(speaker)),
        Err(e) => {
            debug!(error = %e, "No speech engine");
            None
        }
    }
}

/// Plays clip files with an external player.
#[derive(Debug)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
    child: Option<Child>,
}

impl CommandPlayer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            child: None,
        }
    }

    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            Self::new("afplay", Vec::new())
        } else {
            Self::new("mpg123", vec!["-q".to_string()])
        }
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(&mut self, clip: Arc<AudioClip>) -> Result<(), NotifyError> {
        if let Some(previous) = self.child.take() {
            stop(previous);
        }
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(&clip.path);
        self.child = Some(spawn_quiet(&mut cmd, &self.program)?);
        Ok(())
    }
}

impl Drop for CommandPlayer {
    fn drop(&mut self) {
        if let Some(child) = self.child.take() {
            stop(child);
        }
    }
}

/// Decodes clips in-process on a playback thread.
#[cfg(feature = "rodio")]
#[derive(Debug, Default)]
pub struct RodioPlayer;

#[cfg(feature = "rodio")]
impl AudioPlayer for RodioPlayer {
    fn play(&mut self, clip: Arc<AudioClip>) -> Result<(), NotifyError> {
        std::thread::spawn(move || {
            use rodio::{Decoder, OutputStream, Sink};
            use std::io::Cursor;

            let bytes = match clip.bytes() {
                Ok(bytes) => bytes,
                Err(e) => {
                    debug!(error = %e, "Sound clip unreadable");
                    return;
                }
            };
            let Ok((_stream, handle)) = OutputStream::try_default() else {
                debug!("No audio output device");
                return;
            };
            let Ok(source) = Decoder::new(Cursor::new(bytes)) else {
                debug!(path = ?clip.path, "Undecodable sound clip");
                return;
            };
            let Ok(sink) = Sink::try_new(&handle) else {
                return;
            };
            sink.append(source);
            sink.sleep_until_end();
        });
        Ok(())
    }
}
