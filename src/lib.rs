#![no_std]

pub mod board;
pub mod bounds;
pub mod channel;
pub mod color;
pub mod command;
pub mod config;
pub mod controller;
pub mod frame_scheduler;
pub mod groups;
pub mod math8;
pub mod pattern;
pub mod renderer;
pub mod signal;
pub mod startup;
pub mod status;

/// Number of physical output channels
pub const MAX_CHANNELS: usize = 8;

/// Pixel capacity of one channel buffer
pub const MAX_PIXELS_PER_CHANNEL: usize = 300;

/// Size of the group state table, across all channels
pub const MAX_GROUPS: usize = 100;

/// Number of configurable states, state 0 being off
pub const STATE_COUNT: usize = 10;

/// Capacity of the command line buffer
pub const MAX_LINE: usize = 512;

/// Firmware version reported by `V`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use board::{Board, ConfigStorage, Console, PixelOutput, StatusLed, StorageError, Watchdog};
pub use channel::{ChannelConsole, InputChannel, InputReceiver, InputSender};
pub use command::{Command, CommandError, CommandStats, Dispatcher, LineBuffer, LineEvent};
pub use config::{Config, ConfigError, ConfigUpdate, ValidationReport};
pub use controller::Controller;
pub use frame_scheduler::{CadenceKind, Scheduler};
pub use groups::{ChannelId, FillPercent, GroupIndex, GroupTable, SlotState};
pub use pattern::PatternId;
pub use renderer::{PaintFrame, Renderer};
pub use signal::SchedulerSignals;
pub use startup::StartupSequence;
pub use status::{StatusIndicator, StatusMode};

pub use color::{PixelFormat, Rgb, Rgbw};
pub use embassy_time::{Duration, Instant};
