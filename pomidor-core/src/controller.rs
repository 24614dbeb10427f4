//! Owns the timer and turns its transitions into side effects.
//!
//! The controller is driven from a single task. User commands call its
//! methods directly; ticks and the auto-cycle advance arrive as
//! [`Scheduled`] events on the channel handed to [`Controller::new`] and
//! must be passed back through [`Controller::handle`].

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::display;
use crate::mode::Mode;
use crate::notify::{Announcement, Dispatcher};
use crate::scheduler::{Scheduler, TaskHandle};
use crate::settings::form::DurationInputs;
use crate::settings::{Durations, Settings};
use crate::store::{save_or_warn, SettingsStore};
use crate::timer::{Phase, Timer, Transition};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
pub const AUTO_CYCLE_DELAY: Duration = Duration::from_secs(1);

/// Events posted by the controller's own scheduled tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheduled {
    Tick { token: u64 },
    Advance { token: u64 },
}

/// Everything a view needs to render the timer.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub mode: Mode,
    pub phase: Phase,
    pub remaining_secs: u32,
    pub duration_secs: u32,
    pub completed_focus: u32,
    pub next_mode: Mode,
    pub settings: Settings,
    pub last_announcement: Option<Announcement>,
}

impl Snapshot {
    pub fn clock(&self) -> String {
        display::format_clock(self.remaining_secs)
    }

    pub fn progress(&self) -> f64 {
        display::progress(self.duration_secs, self.remaining_secs)
    }

    /// Label of the start/pause/restart button.
    pub fn button_label(&self) -> &'static str {
        match self.phase {
            Phase::Running => "PAUSE",
            Phase::Expired => "RESTART",
            Phase::Idle | Phase::Paused => "START",
        }
    }
}

/// A scheduled task together with the token its events carry.
struct Owned {
    token: u64,
    _handle: TaskHandle,
}

pub struct Controller {
    timer: Timer,
    settings: Settings,
    store: Box<dyn SettingsStore>,
    dispatcher: Dispatcher,
    scheduler: Scheduler<Scheduled>,
    tick: Option<Owned>,
    advance: Option<Owned>,
    next_token: u64,
    last_announcement: Option<Announcement>,
    snapshots: watch::Sender<Snapshot>,
}

impl Controller {
    /// Loads settings from `store`. Scheduled events go to `events`.
    pub fn new(
        store: Box<dyn SettingsStore>,
        dispatcher: Dispatcher,
        events: UnboundedSender<Scheduled>,
    ) -> Self {
        let settings = store.load();
        let timer = Timer::new(settings.durations);
        let snapshot = Self::build_snapshot(&timer, &settings, None);
        let (snapshots, _) = watch::channel(snapshot);
        info!(
            focus = settings.durations.focus,
            auto_cycle = settings.auto_cycle_enabled,
            sound = settings.sound_enabled,
            "Timer ready"
        );
        Self {
            timer,
            settings,
            store,
            dispatcher,
            scheduler: Scheduler::new(events),
            tick: None,
            advance: None,
            next_token: 0,
            last_announcement: None,
            snapshots,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn snapshot(&self) -> Snapshot {
        Self::build_snapshot(&self.timer, &self.settings, self.last_announcement.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    pub fn is_ticking(&self) -> bool {
        self.tick.is_some()
    }

    pub fn advance_pending(&self) -> bool {
        self.advance.is_some()
    }

    // ── Timer commands ───────────────────────────────────────────────

    pub fn start(&mut self) {
        let t = self.timer.start();
        self.apply(t);
    }

    pub fn pause(&mut self) {
        let t = self.timer.pause();
        self.apply(t);
    }

    pub fn toggle(&mut self) {
        let t = self.timer.toggle();
        self.apply(t);
    }

    pub fn reset(&mut self) {
        let t = self.timer.reset();
        self.apply(Some(t));
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        let t = self.timer.switch_mode(mode);
        self.apply(Some(t));
    }

    pub fn handle(&mut self, event: Scheduled) {
        match event {
            Scheduled::Tick { token } => {
                if !owns(&self.tick, token) {
                    debug!(token, "Dropping stale tick");
                    return;
                }
                let t = self.timer.tick();
                self.apply(t);
            }
            Scheduled::Advance { token } => {
                if !owns(&self.advance, token) {
                    debug!(token, "Dropping stale advance");
                    return;
                }
                self.advance = None;
                let next = self.timer.advance();
                info!(mode = ?next, completed_focus = self.timer.completed_focus(), "Auto-cycling");
                let t = self.timer.start();
                self.apply(t);
            }
        }
    }

    // ── Settings commands ────────────────────────────────────────────

    /// Applies the settings form's duration inputs, clamped, and saves.
    pub fn apply_durations(&mut self, inputs: &DurationInputs) {
        self.set_durations(inputs.to_durations());
    }

    pub fn set_durations(&mut self, durations: Durations) {
        self.settings.durations = durations.clamped();
        let t = self.timer.set_durations(self.settings.durations);
        self.save();
        self.apply(Some(t));
    }

    pub fn set_auto_cycle(&mut self, enabled: bool) {
        self.settings.auto_cycle_enabled = enabled;
        if !enabled {
            self.advance = None;
        }
        self.save();
        self.publish();
    }

    pub fn set_sound(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
        self.save();
        self.publish();
    }

    pub fn select_font(&mut self, font: &str) {
        self.settings.selected_font = font.to_string();
        self.settings = self.settings.clone().sanitized();
        self.save();
        self.publish();
    }

    pub fn select_color(&mut self, color: &str) {
        self.settings.selected_color = color.to_string();
        self.settings = self.settings.clone().sanitized();
        self.save();
        self.publish();
    }

    /// Changes settings for this session only. Nothing is saved.
    pub fn override_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings);
        self.settings = self.settings.clone().sanitized();
        if self.settings.durations != *self.timer.durations() {
            let t = self.timer.set_durations(self.settings.durations);
            self.apply(Some(t));
        } else {
            self.publish();
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply(&mut self, transition: Option<Transition>) {
        let Some(transition) = transition else {
            return;
        };
        match transition {
            Transition::Started => {
                let token = self.token();
                let handle = self
                    .scheduler
                    .every(TICK_PERIOD, move || Scheduled::Tick { token });
                // Replacing the field aborts any previous tick task.
                self.tick = Some(Owned {
                    token,
                    _handle: handle,
                });
                debug!(mode = ?self.timer.mode(), remaining = self.timer.remaining_secs(), "Started");
            }
            Transition::Paused => {
                self.tick = None;
                debug!(remaining = self.timer.remaining_secs(), "Paused");
            }
            Transition::Reset { mode } => {
                self.tick = None;
                self.advance = None;
                debug!(?mode, "Reset");
            }
            Transition::Ticked { .. } => {}
            Transition::Expired { mode } => {
                self.tick = None;
                self.on_expired(mode);
            }
        }
        self.publish();
    }

    fn on_expired(&mut self, mode: Mode) {
        let next = self.timer.next_mode();
        info!(?mode, ?next, "Phase complete");
        let announcement = self.dispatcher.dispatch(
            next,
            self.settings.durations[next],
            self.settings.sound_enabled,
        );
        self.last_announcement = Some(announcement);

        if self.settings.auto_cycle_enabled {
            let token = self.token();
            let handle = self
                .scheduler
                .after(AUTO_CYCLE_DELAY, Scheduled::Advance { token });
            self.advance = Some(Owned {
                token,
                _handle: handle,
            });
        }
    }

    fn token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    fn save(&self) {
        save_or_warn(self.store.as_ref(), &self.settings);
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }

    fn build_snapshot(
        timer: &Timer,
        settings: &Settings,
        last_announcement: Option<Announcement>,
    ) -> Snapshot {
        Snapshot {
            mode: timer.mode(),
            phase: timer.phase(),
            remaining_secs: timer.remaining_secs(),
            duration_secs: timer.duration_secs(),
            completed_focus: timer.completed_focus(),
            next_mode: timer.next_mode(),
            settings: settings.clone(),
            last_announcement,
        }
    }
}

fn owns(slot: &Option<Owned>, token: u64) -> bool {
    slot.as_ref().is_some_and(|owned| owned.token == token)
}
