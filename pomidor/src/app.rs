use crate::config::Config;
use chrono::{DateTime, Duration, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use pomidor_core::settings::form::DurationInputs;
use pomidor_core::settings::{cycle_option, COLORS, FONTS};
use pomidor_core::{Controller, Mode, Phase, Scheduled, Snapshot};
use tracing::{debug, warn};

#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppMode {
    #[default]
    Normal,
    Settings,
}

/// Rows of the settings modal, top to bottom.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Field {
    Minutes(Mode),
    AutoCycle,
    Sound,
    Font,
    Color,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Minutes(Mode::Focus),
        Field::Minutes(Mode::ShortBreak),
        Field::Minutes(Mode::LongBreak),
        Field::AutoCycle,
        Field::Sound,
        Field::Font,
        Field::Color,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Minutes(mode) => mode.label(),
            Field::AutoCycle => "auto-cycle",
            Field::Sound => "sound",
            Field::Font => "font",
            Field::Color => "color",
        }
    }
}

/// Draft state of the settings modal. Only the minute inputs are held
/// back until the form is applied.
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub inputs: DurationInputs,
    pub selected: usize,
}

impl SettingsForm {
    pub fn field(&self) -> Field {
        Field::ALL[self.selected % Field::ALL.len()]
    }

    fn move_selection(&mut self, forward: bool) {
        let len = Field::ALL.len();
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
    }
}

pub struct App {
    pub controller: Controller,
    pub snapshot: Snapshot,
    pub mode: AppMode,
    pub form: SettingsForm,
    pub config: Config,
    pub desktop_notifications: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: Controller, config: Config, desktop_notifications: bool) -> Self {
        let snapshot = controller.snapshot();
        Self {
            controller,
            snapshot,
            mode: AppMode::Normal,
            form: SettingsForm::default(),
            config,
            desktop_notifications,
            should_quit: false,
        }
    }

    /// Wall-clock time the running phase will end at.
    pub fn ends_at(&self) -> Option<DateTime<Local>> {
        (self.snapshot.phase == Phase::Running)
            .then(|| Local::now() + Duration::seconds(i64::from(self.snapshot.remaining_secs)))
    }

    pub fn on_scheduled(&mut self, event: Scheduled) {
        self.controller.handle(event);
        self.refresh();
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.mode {
            AppMode::Normal => self.on_normal_key(key.code),
            AppMode::Settings => self.on_settings_key(key.code),
        }
        self.refresh();
    }

    fn on_normal_key(&mut self, code: KeyCode) {
        let current = self.snapshot.mode;
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') | KeyCode::Enter => self.controller.toggle(),
            KeyCode::Char('r') => self.controller.reset(),
            KeyCode::Char('s') => self.open_settings(),
            KeyCode::Char(c @ '1'..='3') => {
                let idx = c as usize - '1' as usize;
                self.controller.switch_mode(Mode::ALL[idx]);
            }
            KeyCode::Right | KeyCode::Tab => self.controller.switch_mode(current.cycle_tab(true)),
            KeyCode::Left | KeyCode::BackTab => {
                self.controller.switch_mode(current.cycle_tab(false))
            }
            KeyCode::Home => self.controller.switch_mode(Mode::ALL[0]),
            KeyCode::End => self.controller.switch_mode(Mode::ALL[Mode::ALL.len() - 1]),
            _ => {}
        }
    }

    fn open_settings(&mut self) {
        self.form = SettingsForm {
            inputs: DurationInputs::from_durations(&self.controller.settings().durations),
            selected: 0,
        };
        self.mode = AppMode::Settings;
    }

    fn on_settings_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.mode = AppMode::Normal,
            KeyCode::Enter => {
                self.controller.apply_durations(&self.form.inputs);
                self.mode = AppMode::Normal;
            }
            KeyCode::Down | KeyCode::Tab => self.form.move_selection(true),
            KeyCode::Up | KeyCode::BackTab => self.form.move_selection(false),
            KeyCode::Right | KeyCode::Char('+') => self.adjust(true),
            KeyCode::Left | KeyCode::Char('-') => self.adjust(false),
            KeyCode::Char(' ') => self.adjust(true),
            KeyCode::Char(c) if c.is_ascii_digit() => {
                if let Field::Minutes(mode) = self.form.field() {
                    let input = self.form.inputs.get_mut(mode);
                    if input.len() < 3 {
                        input.push(c);
                    }
                }
            }
            KeyCode::Backspace => {
                if let Field::Minutes(mode) = self.form.field() {
                    self.form.inputs.get_mut(mode).pop();
                }
            }
            _ => {}
        }
    }

    fn adjust(&mut self, forward: bool) {
        let settings = self.controller.settings().clone();
        match self.form.field() {
            Field::Minutes(mode) => self.form.inputs.spin(mode, if forward { 1 } else { -1 }),
            Field::AutoCycle => self.controller.set_auto_cycle(!settings.auto_cycle_enabled),
            Field::Sound => self.controller.set_sound(!settings.sound_enabled),
            Field::Font => self
                .controller
                .select_font(cycle_option(&FONTS, &settings.selected_font, forward)),
            Field::Color => self
                .controller
                .select_color(cycle_option(&COLORS, &settings.selected_color, forward)),
        }
    }

    fn refresh(&mut self) {
        let next = self.controller.snapshot();
        let expired_now = next.phase == Phase::Expired && self.snapshot.phase != Phase::Expired;
        if expired_now && self.desktop_notifications {
            if let Some(announcement) = &next.last_announcement {
                send_notification(next.mode.label(), &announcement.text);
            }
        }
        self.snapshot = next;
    }
}

fn send_notification(title: &str, body: &str) {
    match notify_rust::Notification::new()
        .summary(title)
        .body(body)
        .appname("pomidor")
        .show()
    {
        Ok(_) => debug!(title, "Desktop notification shown"),
        Err(e) => warn!(error = %e, "Failed to send desktop notification"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use pomidor_core::notify::clips::{AudioClip, ClipCache};
    use pomidor_core::notify::AudioPlayer;
    use pomidor_core::{Dispatcher, MemoryStore, NotifyError, SettingsStore};
    use std::rc::Rc;
    use tokio::sync::mpsc;

    struct Mute;

    impl AudioPlayer for Mute {
        fn play(&mut self, _clip: std::sync::Arc<AudioClip>) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    fn app() -> (App, Rc<MemoryStore>) {
        let store = Rc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new("en", None, Box::new(Mute), ClipCache::new("/nonexistent"));
        let (tx, _rx) = mpsc::unbounded_channel();
        let controller = Controller::new(Box::new(Rc::clone(&store)), dispatcher, tx);
        (App::new(controller, Config::default(), false), store)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn number_keys_and_arrows_switch_tabs() {
        let (mut app, _) = app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.snapshot.mode, Mode::LongBreak);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.snapshot.mode, Mode::Focus);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.snapshot.mode, Mode::LongBreak);
        press(&mut app, KeyCode::Home);
        assert_eq!(app.snapshot.mode, Mode::Focus);
        press(&mut app, KeyCode::End);
        assert_eq!(app.snapshot.mode, Mode::LongBreak);
    }

    #[tokio::test]
    async fn space_toggles_and_shows_end_time() {
        let (mut app, _) = app();
        assert!(app.ends_at().is_none());
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.snapshot.phase, Phase::Running);
        assert!(app.ends_at().is_some());
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.snapshot.phase, Phase::Paused);
    }

    #[tokio::test]
    async fn settings_form_applies_clamped_minutes() {
        let (mut app, store) = app();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.mode, AppMode::Settings);
        assert_eq!(app.form.inputs.focus, "25");

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('9'));
        press(&mut app, KeyCode::Char('9'));
        press(&mut app, KeyCode::Char('9'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.snapshot.remaining_secs, 60 * 60);
        assert_eq!(store.load().durations.focus, 60 * 60);
    }

    #[tokio::test]
    async fn escape_discards_minute_edits() {
        let (mut app, _) = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.form.inputs.focus, "26");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.snapshot.remaining_secs, 25 * 60);
    }

    #[tokio::test]
    async fn toggles_and_pickers_save_immediately() {
        let (mut app, store) = app();
        press(&mut app, KeyCode::Char('s'));
        for _ in 0..3 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.form.field(), Field::AutoCycle);
        press(&mut app, KeyCode::Char(' '));
        assert!(store.load().auto_cycle_enabled);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.form.field(), Field::Font);
        press(&mut app, KeyCode::Left);
        assert_eq!(store.load().selected_font, "Space Mono");

        press(&mut app, KeyCode::Esc);
        assert!(app.snapshot.settings.auto_cycle_enabled);
    }

    #[tokio::test]
    async fn selection_wraps_around_the_form() {
        let (mut app, _) = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Up);
        assert_eq!(app.form.field(), Field::Color);
    }

    #[tokio::test]
    async fn q_quits_only_outside_the_form() {
        let (mut app, _) = app();
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
