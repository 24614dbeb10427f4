//! Timer engine, settings and notifications shared by `pomidor` and `pomidorctl`.
//!
//! The crate is split into a pure layer and an effectful layer:
//!
//! - [`timer`], [`display`] and [`settings`] are plain state and functions
//!   with no I/O and no clock.
//! - [`controller`] owns one [`Timer`] and turns its transitions into
//!   scheduled ticks, persisted settings and notifications.
//! - [`store`] and [`notify`] are the ports the controller talks to.

pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod mode;
pub mod notify;
pub mod paths;
pub mod scheduler;
pub mod settings;
pub mod store;
pub mod timer;

pub use config::Config;
pub use controller::{Controller, Scheduled, Snapshot};
pub use error::{ConfigError, NotifyError, StoreError};
pub use mode::Mode;
pub use notify::{Dispatcher, Feedback};
pub use settings::{Durations, Settings};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
pub use timer::{Phase, Timer, Transition};
