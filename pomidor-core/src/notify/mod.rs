//! Phase-completion announcements.
//!
//! One announcement produces at most one sound: speech when the speaker
//! starts, otherwise the mode's audio clip. Every failure is logged and
//! swallowed; nothing here can stop the countdown.
//!
//! [`Dispatcher::dispatch`] runs on the event loop and never waits on a
//! child process or reads a file. The speaker's voice list, which may
//! take a while to produce, is fetched once when the dispatcher is built.

pub mod backend;
pub mod clips;
pub mod locale;
pub mod phrases;
pub mod plural;
pub mod voice;

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::NotificationConfig;
use crate::error::NotifyError;
use crate::mode::Mode;
use backend::{platform_speaker, CommandPlayer, CommandSpeaker};
use clips::{AudioClip, ClipCache};
use voice::{select_voice, Voice};

pub trait Speaker {
    /// Stops the utterance in flight, if any.
    fn cancel(&mut self);

    /// Voices on offer. May block; the dispatcher calls it once.
    fn voices(&mut self) -> Vec<Voice>;

    /// Starts speaking and returns without waiting for the end.
    fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<(), NotifyError>;
}

pub trait AudioPlayer {
    /// Starts playback and returns without waiting for the end.
    fn play(&mut self, clip: Arc<AudioClip>) -> Result<(), NotifyError>;
}

/// Which channel an announcement went out on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    /// Sound is switched off.
    Silent,
    Spoken,
    Played,
    /// Both channels failed.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub mode: Mode,
    pub text: String,
    pub feedback: Feedback,
}

pub struct Dispatcher {
    locale: String,
    speaker: Option<Box<dyn Speaker>>,
    voices: Vec<Voice>,
    player: Box<dyn AudioPlayer>,
    clips: ClipCache,
}

impl Dispatcher {
    /// Asks `speaker` for its voices before returning.
    pub fn new(
        locale: impl Into<String>,
        mut speaker: Option<Box<dyn Speaker>>,
        player: Box<dyn AudioPlayer>,
        clips: ClipCache,
    ) -> Self {
        let voices = speaker
            .as_mut()
            .map(|speaker| speaker.voices())
            .unwrap_or_default();
        debug!(count = voices.len(), "Speech voices");
        Self {
            locale: locale.into(),
            speaker,
            voices,
            player,
            clips,
        }
    }

    /// Platform backends as configured. Speech off leaves only the clips.
    pub fn from_config(config: &NotificationConfig) -> Self {
        let locale = locale::detect(config.locale.as_deref());
        let speaker: Option<Box<dyn Speaker>> = match (&config.speech_program, config.speech) {
            (_, false) => None,
            (Some(program), true) => Some(Box::new(CommandSpeaker::new(program.clone()))),
            (None, true) => platform_speaker(),
        };
        let player = default_player(config.audio_program.as_deref());
        let clips = ClipCache::new(config.sounds_dir());
        info!(%locale, speech = config.speech, sounds = ?clips.dir(), "Notifications ready");
        Self::new(locale, speaker, player, clips)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    /// Sentence for `mode` given that mode's configured length.
    pub fn phrase(&self, mode: Mode, duration_secs: u32) -> String {
        let minutes = if mode.is_break() {
            (duration_secs + 30) / 60
        } else {
            0
        };
        phrases::resolve(&self.locale, mode, minutes)
    }

    pub fn dispatch(&mut self, mode: Mode, duration_secs: u32, sound_enabled: bool) -> Announcement {
        let text = self.phrase(mode, duration_secs);
        if !sound_enabled {
            return Announcement {
                mode,
                text,
                feedback: Feedback::Silent,
            };
        }

        let feedback = match self.speak(&text) {
            Ok(()) => Feedback::Spoken,
            Err(e) => {
                debug!(error = %e, "Speech failed, falling back to sound clip");
                match self.play(mode) {
                    Ok(()) => Feedback::Played,
                    Err(e) => {
                        debug!(error = %e, "Sound clip failed");
                        Feedback::Failed
                    }
                }
            }
        };
        debug!(?mode, ?feedback, %text, "Announced");
        Announcement {
            mode,
            text,
            feedback,
        }
    }

    fn speak(&mut self, text: &str) -> Result<(), NotifyError> {
        let speaker = self
            .speaker
            .as_mut()
            .ok_or(NotifyError::SpeechUnavailable)?;
        speaker.cancel();
        let voice = select_voice(&self.voices, &self.locale);
        speaker.speak(text, voice)
    }

    fn play(&mut self, mode: Mode) -> Result<(), NotifyError> {
        let clip = self.clips.get(mode)?;
        self.player.play(clip)
    }
}

#[cfg(feature = "rodio")]
fn default_player(program: Option<&str>) -> Box<dyn AudioPlayer> {
    match program {
        Some(program) => Box::new(CommandPlayer::new(program, Vec::new())),
        None => Box::new(backend::RodioPlayer),
    }
}

#[cfg(not(feature = "rodio"))]
fn default_player(program: Option<&str>) -> Box<dyn AudioPlayer> {
    match program {
        Some(program) => Box::new(CommandPlayer::new(program, Vec::new())),
        None => Box::new(CommandPlayer::platform_default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        listings: usize,
        cancels: usize,
        spoken: Vec<(String, Option<String>)>,
        played: Vec<Mode>,
    }

    struct FakeSpeaker {
        log: Rc<RefCell<Log>>,
        voices: Vec<Voice>,
        fail: bool,
    }

    impl Speaker for FakeSpeaker {
        fn cancel(&mut self) {
            self.log.borrow_mut().cancels += 1;
        }

        fn voices(&mut self) -> Vec<Voice> {
            self.log.borrow_mut().listings += 1;
            self.voices.clone()
        }

        fn speak(&mut self, text: &str, voice: Option<&Voice>) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::SpeechUnavailable);
            }
            self.log
                .borrow_mut()
                .spoken
                .push((text.to_string(), voice.map(|v| v.id.clone())));
            Ok(())
        }
    }

    struct FakePlayer {
        log: Rc<RefCell<Log>>,
        fail: bool,
    }

    impl AudioPlayer for FakePlayer {
        fn play(&mut self, clip: Arc<AudioClip>) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Playback("rejected".into()));
            }
            self.log.borrow_mut().played.push(clip.mode);
            Ok(())
        }
    }

    fn sounds_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for mode in Mode::ALL {
            std::fs::write(dir.path().join(format!("{}.mp3", mode.key())), b"ID3").unwrap();
        }
        dir
    }

    fn dispatcher(
        locale: &str,
        speech: Option<bool>,
        player_fails: bool,
        dir: &tempfile::TempDir,
    ) -> (Dispatcher, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let speaker = speech.map(|works| {
            Box::new(FakeSpeaker {
                log: Rc::clone(&log),
                voices: vec![Voice::new("Thomas", "fr_FR"), Voice::new("Alex", "en_US")],
                fail: !works,
            }) as Box<dyn Speaker>
        });
        let player = Box::new(FakePlayer {
            log: Rc::clone(&log),
            fail: player_fails,
        });
        let d = Dispatcher::new(locale, speaker, player, ClipCache::new(dir.path()));
        (d, log)
    }

    #[test]
    fn sound_off_is_a_no_op() {
        let dir = sounds_dir();
        let (mut d, log) = dispatcher("en-US", Some(true), false, &dir);
        let a = d.dispatch(Mode::Focus, 1500, false);
        assert_eq!(a.feedback, Feedback::Silent);
        let log = log.borrow();
        assert_eq!(log.cancels, 0);
        assert!(log.spoken.is_empty());
        assert!(log.played.is_empty());
    }

    #[test]
    fn speaks_with_matching_voice_and_cancels_first() {
        let dir = sounds_dir();
        let (mut d, log) = dispatcher("fr-FR", Some(true), false, &dir);
        let a = d.dispatch(Mode::ShortBreak, 300, true);
        assert_eq!(a.feedback, Feedback::Spoken);
        assert_eq!(a.text, "Il est temps de faire une pause de 5 minutes.");

        let log = log.borrow();
        assert_eq!(log.cancels, 1);
        assert_eq!(
            log.spoken,
            vec![(a.text.clone(), Some("Thomas".to_string()))]
        );
        assert!(log.played.is_empty());
    }

    #[test]
    fn voices_are_listed_once_up_front() {
        let dir = sounds_dir();
        let (mut d, log) = dispatcher("en-US", Some(true), false, &dir);
        assert_eq!(log.borrow().listings, 1);
        d.dispatch(Mode::ShortBreak, 300, true);
        d.dispatch(Mode::Focus, 1500, true);
        assert_eq!(log.borrow().listings, 1);
        assert_eq!(d.voices().len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn slow_speech_program_does_not_hold_up_dispatch() {
        use std::os::unix::fs::PermissionsExt;
        use std::time::{Duration, Instant};

        let bin = tempfile::tempdir().unwrap();
        let program = bin.path().join("slow-espeak");
        std::fs::write(
            &program,
            "#!/bin/sh
             if [ \"$1\" = \"--voices\" ]; then
               sleep 2
               echo 'Pty Language Age/Gender VoiceName File'
               echo ' 5  en-us --/M English gmw/en-US'
               exit 0
             fi
             sleep 5
",
        )
        .unwrap();
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

        let speaker = backend::CommandSpeaker::new(program.to_string_lossy());
        let sounds = sounds_dir();
        let player = Box::new(FakePlayer {
            log: Rc::new(RefCell::new(Log::default())),
            fail: false,
        });
        let mut d = Dispatcher::new("en-US", Some(Box::new(speaker)), player, ClipCache::new(sounds.path()));
        assert_eq!(d.voices(), &[Voice::new("en-us", "en-us")][..]);

        let started = Instant::now();
        assert_eq!(d.dispatch(Mode::ShortBreak, 300, true).feedback, Feedback::Spoken);
        // The second one stops the first utterance, still sleeping.
        assert_eq!(d.dispatch(Mode::Focus, 1500, true).feedback, Feedback::Spoken);
        assert!(started.elapsed() < Duration::from_millis(500), "{:?}", started.elapsed());
    }

    #[test]
    fn speech_failure_falls_back_to_clip_only() {
        let dir = sounds_dir();
        let (mut d, log) = dispatcher("en-US", Some(false), false, &dir);
        let a = d.dispatch(Mode::LongBreak, 900, true);
        assert_eq!(a.feedback, Feedback::Played);
        let log = log.borrow();
        assert!(log.spoken.is_empty());
        assert_eq!(log.played, vec![Mode::LongBreak]);
    }

    #[test]
    fn without_speaker_goes_straight_to_clip() {
        let dir = sounds_dir();
        let (mut d, log) = dispatcher("en-US", None, false, &dir);
        assert_eq!(d.dispatch(Mode::Focus, 1500, true).feedback, Feedback::Played);
        assert_eq!(log.borrow().played, vec![Mode::Focus]);
        assert!(d.voices().is_empty());
    }

    #[test]
    fn rejected_playback_is_swallowed() {
        let dir = sounds_dir();
        let (mut d, _log) = dispatcher("en-US", None, true, &dir);
        assert_eq!(d.dispatch(Mode::Focus, 1500, true).feedback, Feedback::Failed);
    }

    #[test]
    fn missing_clip_counts_as_failure() {
        let empty = tempfile::tempdir().unwrap();
        let (mut d, log) = dispatcher("en-US", Some(false), false, &empty);
        assert_eq!(d.dispatch(Mode::ShortBreak, 300, true).feedback, Feedback::Failed);
        assert!(log.borrow().played.is_empty());
    }

    #[test]
    fn phrase_rounds_break_minutes() {
        let dir = sounds_dir();
        let (d, _) = dispatcher("en", None, false, &dir);
        assert_eq!(
            d.phrase(Mode::ShortBreak, 60),
            "It's time to take a 1-minute break."
        );
        assert_eq!(d.phrase(Mode::Focus, 1500), "It's time to focus.");
    }
}
