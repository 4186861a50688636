//! Main loop of the controller
//!
//! [`Controller`] owns the configuration, the group state table and the
//! renderer, and borrows the board for every side effect. The firmware
//! calls [`Controller::poll`] in a loop, sleeping until
//! [`Controller::next_deadline`] in between; nothing in `poll` blocks.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::board::{Board, StorageError};
use crate::command::{
    BELL, CommandEffects, CommandStats, Dispatcher, LineBuffer, LineEvent, SystemRequest,
    warn_corrections,
};
use crate::config::{self, BLOB_LEN, CONFIG_PATH, Config, ConfigError, ValidationReport};
use crate::frame_scheduler::Scheduler;
use crate::groups::GroupTable;
use crate::renderer::Renderer;
use crate::signal::SchedulerSignals;
use crate::startup::StartupSequence;
use crate::status::{StatusIndicator, StatusMode};
use crate::{MAX_LINE, VERSION};

/// Watchdog period; `poll` must run more often than this
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(5);

/// Input bytes handled per `poll`, bounding the work of one iteration
pub const INPUT_BUDGET: usize = 64;

pub struct Controller<'a, B: Board> {
    board: B,
    signals: &'a SchedulerSignals,
    config: Config,
    table: GroupTable,
    renderer: Renderer,
    scheduler: Scheduler,
    status: StatusIndicator,
    startup: Option<StartupSequence>,
    line: LineBuffer<MAX_LINE>,
    dispatcher: Dispatcher,
    booted_at: Instant,
}

impl<'a, B: Board> Controller<'a, B> {
    /// Arm the watchdog and load the stored configuration.
    ///
    /// A missing or corrupt record falls back to defaults. A storage
    /// driver failure also falls back to defaults but leaves the status
    /// indicator in `Error`.
    pub fn new(mut board: B, signals: &'a SchedulerSignals, now: Instant) -> Self {
        board.arm(WATCHDOG_TIMEOUT);
        let mut status = StatusIndicator::new(now);

        let config = match read_stored(&mut board) {
            Ok((config, report)) => {
                warn_corrections(&mut board, "boot", &report);
                config
            }
            Err(ConfigError::Storage(StorageError::NotFound)) => {
                #[cfg(feature = "esp32-log")]
                println!("[Controller.new] no stored configuration, using defaults");
                Config::defaults()
            }
            Err(err @ ConfigError::Storage(_)) => {
                #[cfg(feature = "esp32-log")]
                println!("[Controller.new] storage failed: {}", err);
                let _ = writeln!(board, "ERR boot: {err}, using defaults");
                status.enter_error();
                Config::defaults()
            }
            Err(err) => {
                #[cfg(feature = "esp32-log")]
                println!("[Controller.new] stored configuration rejected: {}", err);
                let _ = writeln!(board, "WARN boot: {err}, using defaults");
                Config::defaults()
            }
        };
        status.enter_normal();

        let _ = writeln!(
            board,
            "{} {} ready, H for help",
            config.identity(),
            VERSION
        );

        Self {
            startup: config
                .startup_animation
                .then(|| StartupSequence::new(&config)),
            scheduler: Scheduler::new(&config.timing, now),
            board,
            signals,
            config,
            table: GroupTable::new(),
            renderer: Renderer::new(),
            status,
            line: LineBuffer::new(),
            dispatcher: Dispatcher::new(),
            booted_at: now,
        }
    }

    /// One main loop iteration
    pub fn poll(&mut self, now: Instant) {
        self.board.kick();
        self.scheduler.poll(now, self.signals);

        if self.signals.blink_toggled.take() {
            self.status.on_blink(self.signals.blink_phase());
        }
        if let Some(color) = self.status.advance(now) {
            self.board.set_status_color(color);
        }

        for _ in 0..self.signals.take_animation_ticks() {
            self.renderer.advance_animation();
            if let Some(startup) = &mut self.startup {
                startup.tick();
            }
        }

        self.drain_input(now);

        if self.signals.transmit_due.take() {
            self.board.paint(&self.renderer.paint_frame(&self.config));
        }
        if self.signals.pixels_dirty.take() {
            self.render();
        }
    }

    /// Earliest instant at which `poll` has scheduled work
    pub fn next_deadline(&self) -> Instant {
        self.scheduler.next_deadline()
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn table(&self) -> &GroupTable {
        &self.table
    }

    pub const fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub const fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub const fn status(&self) -> &StatusIndicator {
        &self.status
    }

    pub const fn stats(&self) -> &CommandStats {
        self.dispatcher.stats()
    }

    pub const fn is_starting_up(&self) -> bool {
        self.startup.is_some()
    }

    pub const fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    fn render(&mut self) {
        if let Some(startup) = self.startup {
            if !startup.is_finished() {
                startup.render(&mut self.renderer, &self.config);
                return;
            }
            self.startup = None;
            self.renderer.clear();
        }
        self.renderer
            .render_all(&self.config, &self.table, self.signals.blink_phase());
    }

    fn drain_input(&mut self, now: Instant) {
        for _ in 0..INPUT_BUDGET {
            let Some(byte) = self.board.read_byte() else {
                break;
            };
            match self.line.push(byte) {
                LineEvent::Complete => self.dispatch_line(now),
                LineEvent::Overflow => {
                    let _ = self.board.write_char(char::from(BELL));
                    let _ = writeln!(
                        self.board,
                        "WARN line truncated at {} characters",
                        LineBuffer::<MAX_LINE>::LIMIT
                    );
                    self.dispatch_line(now);
                }
                LineEvent::Cancelled => {
                    let _ = writeln!(self.board, "^C");
                }
                LineEvent::Appended(_)
                | LineEvent::Erased
                | LineEvent::Ignored
                | LineEvent::Empty => {}
            }
        }
    }

    fn dispatch_line(&mut self, now: Instant) {
        let effects = self.dispatcher.execute(
            self.line.line(),
            &mut self.config,
            &mut self.table,
            &mut self.board,
        );
        self.line.clear();
        self.apply(effects, now);
    }

    fn apply(&mut self, effects: CommandEffects, now: Instant) {
        let effects = match effects.request {
            Some(request) => self.handle_request(request, now),
            None => effects,
        };
        if let Some(retime) = effects.retime {
            for &kind in retime.kinds() {
                self.scheduler.rearm(kind, &self.config.timing, now);
            }
        }
        if effects.relayout {
            self.renderer.clear();
        }
        if effects.redraw {
            self.startup = None;
            self.signals.pixels_dirty.raise();
        }
    }

    fn handle_request(&mut self, request: SystemRequest, now: Instant) -> CommandEffects {
        match request {
            SystemRequest::Info => {
                self.write_info(now);
                CommandEffects::default()
            }
            SystemRequest::Save => {
                let blob = config::save(&self.config);
                match self.board.write_all(CONFIG_PATH, &blob) {
                    Ok(()) => {
                        let _ = writeln!(
                            self.board,
                            "OK S saved {} bytes to {}",
                            blob.len(),
                            CONFIG_PATH
                        );
                    }
                    Err(err) => {
                        #[cfg(feature = "esp32-log")]
                        println!("[Controller.save] write failed: {}", err);
                        self.dispatcher
                            .report_error(&mut self.board, &ConfigError::Storage(err));
                    }
                }
                CommandEffects::default()
            }
            SystemRequest::Load => match read_stored(&mut self.board) {
                Ok((config, report)) => {
                    self.config = config;
                    warn_corrections(&mut self.board, "L", &report);
                    let _ = writeln!(self.board, "OK L loaded from {CONFIG_PATH}");
                    CommandEffects::reconfigured()
                }
                Err(err @ ConfigError::Storage(StorageError::Failed)) => {
                    self.dispatcher.report_error(&mut self.board, &err);
                    CommandEffects::default()
                }
                Err(err) => {
                    #[cfg(feature = "esp32-log")]
                    println!("[Controller.load] falling back to defaults: {}", err);
                    self.config = Config::defaults();
                    let _ = writeln!(self.board, "WARN L: {err}, using defaults");
                    let _ = writeln!(self.board, "OK L defaults restored, S to persist");
                    CommandEffects::reconfigured()
                }
            },
            SystemRequest::Reboot => {
                let _ = writeln!(self.board, "OK R rebooting");
                self.board.reboot();
                CommandEffects::default()
            }
        }
    }

    fn write_info(&mut self, now: Instant) {
        let device = self.board.unique_id();
        let uptime = now.as_millis().saturating_sub(self.booted_at.as_millis());
        let stats = *self.dispatcher.stats();
        let overruns = self.board.overruns();
        let active = self.config.active_groups();
        let status = self.status.mode();
        let _ = writeln!(self.board, "  device: {device}");
        let _ = writeln!(self.board, "  identity: {}", self.config.identity());
        let _ = writeln!(self.board, "  version: {VERSION}");
        let _ = writeln!(self.board, "  uptime: {}.{:03} s", uptime / 1000, uptime % 1000);
        let _ = writeln!(self.board, "  status: {}", status.as_str());
        let _ = writeln!(
            self.board,
            "  commands: {} errors: {}",
            stats.commands(),
            stats.errors()
        );
        let _ = writeln!(self.board, "  input overruns: {overruns}");
        let _ = writeln!(
            self.board,
            "  groups: {} of {} lit",
            self.table.lit_count(active),
            active
        );
        if status == StatusMode::Error {
            let _ = writeln!(self.board, "  storage failed at boot, running on defaults");
        }
        let _ = writeln!(self.board, "OK I");
    }
}

/// Read and verify the stored record
fn read_stored<B: Board>(board: &mut B) -> Result<(Config, ValidationReport), ConfigError> {
    let mut blob = [0u8; BLOB_LEN];
    let len = board.read_all(CONFIG_PATH, &mut blob)?;
    config::load(&blob[..len.min(BLOB_LEN)])
}
