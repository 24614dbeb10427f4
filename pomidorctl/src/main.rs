use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pomidor_core::notify::{locale, phrases};
use pomidor_core::settings::form::clamp_minutes;
use pomidor_core::settings::{is_hex_color, FONTS};
use pomidor_core::{
    paths, Config, Controller, Dispatcher, Feedback, JsonFileStore, MemoryStore, Mode, Phase,
    Settings, SettingsStore,
};
use std::io::Write;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pomidorctl")]
#[command(about = "Headless pomodoro timer and settings tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the timer in the terminal until the phase ends (or forever with auto-cycle)
    Run {
        #[arg(short, long, value_enum, default_value_t = ModeArg::Focus)]
        mode: ModeArg,
        /// Move to the next phase automatically, for this run only
        #[arg(long)]
        auto_cycle: bool,
        /// No speech or sound, for this run only
        #[arg(long)]
        no_sound: bool,
        /// Do not write the settings file
        #[arg(long)]
        ephemeral: bool,
    },
    /// Show or change the saved settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Print the announcement sentence for a mode
    Phrase {
        #[arg(value_enum)]
        mode: ModeArg,
        #[arg(short, long)]
        locale: Option<String>,
        /// Break length to mention; defaults to the saved setting
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Announce a mode through speech or sound, as at the end of a phase
    Announce {
        #[arg(value_enum)]
        mode: ModeArg,
        #[arg(short, long)]
        locale: Option<String>,
    },
    /// List the voices of the speech program
    Voices,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the settings document
    Show,
    /// Change one or more settings
    Set {
        /// Minutes; out-of-range values are clamped
        #[arg(long)]
        focus: Option<String>,
        #[arg(long)]
        short_break: Option<String>,
        #[arg(long)]
        long_break: Option<String>,
        #[arg(long)]
        auto_cycle: Option<bool>,
        #[arg(long)]
        sound: Option<bool>,
        #[arg(long)]
        font: Option<String>,
        /// `#rrggbb`
        #[arg(long)]
        color: Option<String>,
    },
    /// Restore the defaults
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    #[value(alias = "pomodoro")]
    Focus,
    #[value(alias = "shortBreak")]
    ShortBreak,
    #[value(alias = "longBreak")]
    LongBreak,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Focus => Mode::Focus,
            ModeArg::ShortBreak => Mode::ShortBreak,
            ModeArg::LongBreak => Mode::LongBreak,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = pomidor_core::config::load_config()?;
    init_logging(&config.logging.level);

    match cli.command {
        Commands::Run {
            mode,
            auto_cycle,
            no_sound,
            ephemeral,
        } => run(&config, mode.into(), auto_cycle, no_sound, ephemeral).await,
        Commands::Settings { action } => settings(action),
        Commands::Phrase {
            mode,
            locale: tag,
            minutes,
        } => {
            let mode = Mode::from(mode);
            let tag = tag.as_deref().or(config.notifications.locale.as_deref());
            let locale = locale::detect(tag);
            let minutes = minutes.unwrap_or_else(|| file_store().load().durations.minutes(mode));
            println!("{}", phrases::resolve(&locale, mode, minutes));
            Ok(())
        }
        Commands::Announce { mode, locale } => {
            let mode = Mode::from(mode);
            let mut dispatcher = Dispatcher::from_config(&config.notifications);
            if let Some(locale) = locale {
                dispatcher.set_locale(locale);
            }
            let settings = file_store().load();
            let announcement = dispatcher.dispatch(mode, settings.durations[mode], true);
            println!("{}", announcement.text);
            match announcement.feedback {
                Feedback::Spoken | Feedback::Played => {
                    println!("({:?})", announcement.feedback);
                    Ok(())
                }
                Feedback::Silent | Feedback::Failed => {
                    bail!("No speech or sound could be played")
                }
            }
        }
        Commands::Voices => {
            let dispatcher = Dispatcher::from_config(&config.notifications);
            let voices = dispatcher.voices();
            if voices.is_empty() {
                println!("No voices available (locale {})", dispatcher.locale());
            }
            for voice in voices {
                println!("{:<24} {}", voice.id, voice.lang);
            }
            Ok(())
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn file_store() -> Box<dyn SettingsStore> {
    match paths::settings_file() {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::new()),
    }
}

fn ephemeral_store() -> Box<dyn SettingsStore> {
    let document = paths::settings_file()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .unwrap_or_default();
    Box::new(MemoryStore::with_document(document))
}

async fn run(config: &Config, mode: Mode, auto_cycle: bool, no_sound: bool, ephemeral: bool) -> Result<()> {
    let store = if ephemeral {
        ephemeral_store()
    } else {
        file_store()
    };
    let dispatcher = Dispatcher::from_config(&config.notifications);
    let (tx, mut scheduled) = mpsc::unbounded_channel();
    let mut controller = Controller::new(store, dispatcher, tx);
    controller.override_settings(|s| {
        s.auto_cycle_enabled |= auto_cycle;
        s.sound_enabled &= !no_sound;
    });
    let mut snapshots = controller.subscribe();

    controller.switch_mode(mode);
    controller.start();
    info!(?mode, "Running");

    let mut out = std::io::stdout();
    let mut announced = 0usize;
    loop {
        {
            let snapshot = snapshots.borrow_and_update();
            write!(out, "\r{:<12} {}", snapshot.mode.label(), snapshot.clock())?;
            if snapshot.phase == Phase::Expired {
                if let Some(a) = &snapshot.last_announcement {
                    writeln!(out)?;
                    writeln!(out, "{}", a.text)?;
                    announced += 1;
                }
            }
            out.flush()?;
            if snapshot.phase == Phase::Expired && !controller.advance_pending() {
                return Ok(());
            }
        }

        tokio::select! {
            Some(event) = scheduled.recv() => controller.handle(event),
            res = tokio::signal::ctrl_c() => {
                res.context("Failed to listen for Ctrl-C")?;
                writeln!(out)?;
                info!(announced, "Interrupted");
                return Ok(());
            }
        }
    }
}

fn settings(action: SettingsAction) -> Result<()> {
    let path = paths::settings_file().context("No home directory for the settings file")?;
    let store = JsonFileStore::new(&path);
    match action {
        SettingsAction::Show => {
            let settings = store.load();
            println!("{}", settings.to_json()?);
        }
        SettingsAction::Set {
            focus,
            short_break,
            long_break,
            auto_cycle,
            sound,
            font,
            color,
        } => {
            let mut settings = store.load();
            for (mode, input) in [
                (Mode::Focus, focus),
                (Mode::ShortBreak, short_break),
                (Mode::LongBreak, long_break),
            ] {
                if let Some(input) = input {
                    settings.durations[mode] = clamp_minutes(mode, &input) * 60;
                }
            }
            if let Some(enabled) = auto_cycle {
                settings.auto_cycle_enabled = enabled;
            }
            if let Some(enabled) = sound {
                settings.sound_enabled = enabled;
            }
            if let Some(font) = font {
                if !FONTS.contains(&font.as_str()) {
                    bail!("Unknown font {font:?}, expected one of {}", FONTS.join(", "));
                }
                settings.selected_font = font;
            }
            if let Some(color) = color {
                if !is_hex_color(&color) {
                    bail!("Invalid color {color:?}, expected #rrggbb");
                }
                settings.selected_color = color;
            }
            store
                .save(&settings)
                .with_context(|| format!("Failed to save settings to {:?}", path))?;
            println!("{}", settings.to_json()?);
        }
        SettingsAction::Reset => {
            store
                .save(&Settings::default())
                .with_context(|| format!("Failed to save settings to {:?}", path))?;
            println!("Settings reset to defaults");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn mode_accepts_document_keys() {
        let cli = Cli::try_parse_from(["pomidorctl", "phrase", "shortBreak", "--minutes", "1"]).unwrap();
        match cli.command {
            Commands::Phrase { mode, minutes, .. } => {
                assert_eq!(Mode::from(mode), Mode::ShortBreak);
                assert_eq!(minutes, Some(1));
            }
            _ => panic!("expected phrase"),
        }
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from(["pomidorctl", "run", "--mode", "long-break", "--auto-cycle", "--ephemeral"])
            .unwrap();
        match cli.command {
            Commands::Run {
                mode,
                auto_cycle,
                no_sound,
                ephemeral,
            } => {
                assert_eq!(Mode::from(mode), Mode::LongBreak);
                assert!(auto_cycle);
                assert!(!no_sound);
                assert!(ephemeral);
            }
            _ => panic!("expected run"),
        }
    }
}
