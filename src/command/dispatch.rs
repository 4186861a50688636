//! Command execution
//!
//! The dispatcher owns only its counters. Configuration and the group
//! table are borrowed per line; anything that needs the board (storage,
//! reboot, device info) is handed back as a [`SystemRequest`] for the
//! controller to carry out.

use core::fmt::{self, Write};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::color::rgb_to_u32;
use crate::config::{self, Config, ConfigUpdate, EXPORT_TAG, HEX_LEN, ValidationReport};
use crate::frame_scheduler::CadenceKind;
use crate::groups::{FillPercent, GroupIndex, GroupTable, SlotState};
use crate::{MAX_CHANNELS, STATE_COUNT, VERSION};

use super::{Command, CommandError};

const HELP: &str = "\
Group control:
  T<id>:<s>          set group state (s 0-9)
  P<id>:<s>:<pct>    set group state with fill percent 0-100
  A:<s>              set every group
  M:<digits>         set groups from 1 upwards, one digit each
  X                  all groups off
  Q                  state digits per physical channel
  G                  full group listing
Configuration:
  Ci:<text>  identity          Cl:<n>  pixels per channel
  Cc:<n>     active channels   Cg:<n>  groups per channel
  Cw:<n>     spacer width      Co:<n>  start offset
  Cu:<ms>    update interval   Cb:<ms> blink interval
  Ca:<ms>    animation step    Cr:<n>  brightness
  Cf:<n>     animation fade    Ck:<n>  blink fade
  Cs:<s>:<RRGGBB>:<pattern>    state color and pattern (id or name)
  Cm:<8 digits> channel order  Cp:<ch>:<pin> channel pin
  Ct:<0|1>   startup animation Ce:<0|1> echo
  Cx:<0|1>   RGB / RGBW output Cd      reset to defaults
System:
  V version  H/? help  D dump  I info  S save  Se export
  L load  Li:CONFIG:<hex> import  R reboot";

/// Operational counters; never persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandStats {
    commands: u32,
    errors: u32,
}

impl CommandStats {
    pub const fn commands(&self) -> u32 {
        self.commands
    }

    pub const fn errors(&self) -> u32 {
        self.errors
    }

    fn record_command(&mut self) {
        self.commands = self.commands.wrapping_add(1);
    }

    fn record_error(&mut self) {
        self.errors = self.errors.wrapping_add(1);
    }
}

/// Cadences to restart after a timing change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retime {
    /// Update interval changed; the push interval follows it
    Refresh,
    Blink,
    Animate,
    All,
}

impl Retime {
    pub const fn kinds(self) -> &'static [CadenceKind] {
        match self {
            Self::Refresh => &[CadenceKind::Refresh, CadenceKind::Push],
            Self::Blink => &[CadenceKind::Blink],
            Self::Animate => &[CadenceKind::Animate],
            Self::All => &CadenceKind::ALL,
        }
    }
}

/// Work only the controller can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemRequest {
    Info,
    Save,
    Load,
    Reboot,
}

/// Side effects of a command for the controller to apply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandEffects {
    pub retime: Option<Retime>,
    /// Group geometry changed; stale pixels must be cleared
    pub relayout: bool,
    /// Pixel data must be rendered again
    pub redraw: bool,
    pub request: Option<SystemRequest>,
}

impl CommandEffects {
    const fn redraw() -> Self {
        Self {
            retime: None,
            relayout: false,
            redraw: true,
            request: None,
        }
    }

    /// Everything derived from the configuration must be rebuilt
    pub const fn reconfigured() -> Self {
        Self {
            retime: Some(Retime::All),
            relayout: true,
            redraw: true,
            request: None,
        }
    }

    const fn request(request: SystemRequest) -> Self {
        Self {
            retime: None,
            relayout: false,
            redraw: false,
            request: Some(request),
        }
    }

    pub const fn has_effects(&self) -> bool {
        self.retime.is_some() || self.relayout || self.redraw || self.request.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dispatcher {
    stats: CommandStats,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self {
            stats: CommandStats {
                commands: 0,
                errors: 0,
            },
        }
    }

    pub const fn stats(&self) -> &CommandStats {
        &self.stats
    }

    /// Parse and execute one line, writing the response to `out`
    pub fn execute<W: Write>(
        &mut self,
        line: &str,
        config: &mut Config,
        table: &mut GroupTable,
        out: &mut W,
    ) -> CommandEffects {
        let line = line.trim();
        if line.is_empty() {
            return CommandEffects::default();
        }
        if config.echo {
            let _ = writeln!(out, "> {line}");
        }
        self.stats.record_command();

        let result = Command::parse(line).and_then(|command| run(command, config, table, out));
        match result {
            Ok(effects) => effects,
            Err(err) => {
                self.report_error(out, &err);
                CommandEffects::default()
            }
        }
    }

    /// Count and print a failure, including ones raised by the controller
    pub fn report_error<W: Write>(&mut self, out: &mut W, err: &dyn fmt::Display) {
        #[cfg(feature = "esp32-log")]
        println!("[Dispatcher.report_error] {}", err);
        self.stats.record_error();
        let _ = writeln!(out, "ERR {err}");
    }
}

fn run<W: Write>(
    command: Command<'_>,
    config: &mut Config,
    table: &mut GroupTable,
    out: &mut W,
) -> Result<CommandEffects, CommandError> {
    let effects = match command {
        Command::SetGroup {
            group,
            state,
            percent,
        } => {
            let index = group_index(config, group)?;
            let state = SlotState::new(state).ok_or(CommandError::OutOfRange {
                field: "state",
                value: u32::from(state),
                min: 0,
                max: STATE_COUNT as u32 - 1,
            })?;
            let fill = u8::try_from(percent)
                .ok()
                .and_then(FillPercent::new)
                .ok_or(CommandError::OutOfRange {
                    field: "percent",
                    value: percent,
                    min: 0,
                    max: 100,
                })?;
            table.set(index, state, fill);
            let stored = table.fill(index);
            if stored.is_full() {
                let _ = writeln!(out, "OK T{}:{}", index.number(), table.state(index).get());
            } else {
                let _ = writeln!(
                    out,
                    "OK P{}:{}:{}",
                    index.number(),
                    table.state(index).get(),
                    stored.get()
                );
            }
            CommandEffects::redraw()
        }
        Command::SetAll(state) => {
            let state = SlotState::new(state).unwrap_or(SlotState::OFF);
            table.set_all(state);
            let _ = writeln!(out, "OK A:{}", state.get());
            CommandEffects::redraw()
        }
        Command::SetMany(digits) => {
            let active = config.active_groups();
            let mut set = 0usize;
            for (i, digit) in digits.bytes().enumerate().take(active) {
                if let (Some(index), Some(state)) =
                    (GroupIndex::new(i), SlotState::new(digit - b'0'))
                {
                    table.set(index, state, FillPercent::FULL);
                    set += 1;
                }
            }
            let excess = digits.len().saturating_sub(active);
            let _ = writeln!(out, "OK M set {set} groups");
            if excess > 0 {
                let _ = writeln!(
                    out,
                    "WARN M: {excess} digits beyond group {active} ignored"
                );
            }
            CommandEffects::redraw()
        }
        Command::AllOff => {
            table.clear();
            let _ = writeln!(out, "OK X all off");
            CommandEffects::redraw()
        }
        Command::Summary => {
            write_summary(out, config, table);
            CommandEffects::default()
        }
        Command::Listing => {
            write_listing(out, config, table);
            CommandEffects::default()
        }
        Command::Configure(update) => configure(update, config, out)?,
        Command::Defaults => {
            *config = Config::defaults();
            let _ = writeln!(out, "OK Cd defaults restored, S to persist");
            CommandEffects::reconfigured()
        }
        Command::Version => {
            let _ = writeln!(out, "OK V {} {}", env!("CARGO_PKG_NAME"), VERSION);
            CommandEffects::default()
        }
        Command::Help => {
            let _ = writeln!(out, "{HELP}");
            let _ = writeln!(out, "OK H");
            CommandEffects::default()
        }
        Command::Dump => {
            write_dump(out, config);
            let _ = writeln!(out, "OK D");
            CommandEffects::default()
        }
        Command::Export => {
            let mut hex = [0u8; HEX_LEN];
            let _ = writeln!(out, "{}{}", EXPORT_TAG, config::export_hex(config, &mut hex));
            let _ = writeln!(out, "OK Se {} bytes", config::BLOB_LEN);
            CommandEffects::default()
        }
        Command::Import(text) => {
            let (imported, report) = config::import_hex(text)?;
            *config = imported;
            warn_corrections(out, "Li", &report);
            let _ = writeln!(out, "OK Li imported, S to persist");
            CommandEffects::reconfigured()
        }
        Command::Info => CommandEffects::request(SystemRequest::Info),
        Command::Save => CommandEffects::request(SystemRequest::Save),
        Command::Load => CommandEffects::request(SystemRequest::Load),
        Command::Reboot => CommandEffects::request(SystemRequest::Reboot),
    };
    Ok(effects)
}

fn group_index(config: &Config, group: u32) -> Result<GroupIndex, CommandError> {
    let active = config.active_groups();
    usize::try_from(group)
        .ok()
        .filter(|&number| number <= active)
        .and_then(GroupIndex::from_number)
        .ok_or(CommandError::OutOfRange {
            field: "group",
            value: group,
            min: 1,
            max: u32::try_from(active).unwrap_or(u32::MAX),
        })
}

fn configure<W: Write>(
    update: ConfigUpdate<'_>,
    config: &mut Config,
    out: &mut W,
) -> Result<CommandEffects, CommandError> {
    config.apply(update)?;

    let index = match update {
        ConfigUpdate::State { state, .. } => state as usize,
        ConfigUpdate::Pin { channel, .. } => channel as usize,
        _ => 0,
    };
    let _ = write!(out, "OK ");
    write_item(out, config, update.code(), index);

    let mut effects = CommandEffects::redraw();
    effects.relayout = update.changes_layout();
    effects.retime = match update {
        ConfigUpdate::UpdateInterval(_) => Some(Retime::Refresh),
        ConfigUpdate::BlinkInterval(_) => Some(Retime::Blink),
        ConfigUpdate::AnimateInterval(_) => Some(Retime::Animate),
        _ => None,
    };
    Ok(effects)
}

/// Print one setting in the form it is entered.
///
/// `index` selects the state for `s` and the channel for `p`.
fn write_item<W: Write>(out: &mut W, config: &Config, code: char, index: usize) {
    let _ = match code {
        'i' => writeln!(out, "Ci:{}", config.identity()),
        'l' => writeln!(out, "Cl:{}", config.pixels_per_channel),
        'c' => writeln!(out, "Cc:{}", config.channels),
        'g' => writeln!(out, "Cg:{}", config.groups_per_channel),
        'w' => writeln!(out, "Cw:{}", config.spacer),
        'o' => writeln!(out, "Co:{}", config.start_offset),
        'u' => writeln!(
            out,
            "Cu:{} (push {} ms)",
            config.timing.update_ms, config.timing.push_ms
        ),
        'b' => writeln!(out, "Cb:{}", config.timing.blink_ms),
        'a' => writeln!(out, "Ca:{}", config.timing.animate_ms),
        'r' => writeln!(out, "Cr:{}", config.brightness),
        'f' => writeln!(out, "Cf:{}", config.animation_fade),
        'k' => writeln!(out, "Ck:{}", config.blink_fade),
        's' => {
            let entry = config.states[index.min(STATE_COUNT - 1)];
            writeln!(
                out,
                "Cs:{}:{:06x}:{} ({})",
                index,
                rgb_to_u32(entry.color),
                entry.pattern,
                entry.pattern().as_str()
            )
        }
        'm' => {
            let _ = write!(out, "Cm:");
            for id in config.channel_order {
                let _ = write!(out, "{id}");
            }
            writeln!(out)
        }
        'p' => {
            let channel = index.clamp(1, MAX_CHANNELS);
            writeln!(out, "Cp:{}:{}", channel, config.pins[channel - 1])
        }
        't' => writeln!(out, "Ct:{}", u8::from(config.startup_animation)),
        'e' => writeln!(out, "Ce:{}", u8::from(config.echo)),
        'x' => writeln!(
            out,
            "Cx:{} ({})",
            config.pixel_format.as_u8(),
            config.pixel_format.as_str()
        ),
        _ => Ok(()),
    };
}

fn write_dump<W: Write>(out: &mut W, config: &Config) {
    for code in ['i', 'l', 'c', 'g', 'w', 'o', 'u', 'b', 'a', 'r', 'f', 'k'] {
        write_item(out, config, code, 0);
    }
    for state in 1..STATE_COUNT {
        write_item(out, config, 's', state);
    }
    write_item(out, config, 'm', 0);
    for channel in 1..=MAX_CHANNELS {
        write_item(out, config, 'p', channel);
    }
    for code in ['t', 'e', 'x'] {
        write_item(out, config, code, 0);
    }
}

/// One line per active physical channel, in physical id order
fn write_summary<W: Write>(out: &mut W, config: &Config, table: &GroupTable) {
    let per_channel = usize::from(config.groups_per_channel);
    for id in 1..=MAX_CHANNELS as u8 {
        let Some(position) = config.logical_position(id) else {
            continue;
        };
        let _ = write!(out, "CH{id}:");
        let first = position * per_channel;
        for (_, state, _) in table.iter(first + per_channel).skip(first) {
            let _ = write!(out, "{}", state.get());
        }
        let _ = writeln!(out);
    }
    let active = config.active_groups();
    let _ = writeln!(
        out,
        "OK Q {} of {} groups lit",
        table.lit_count(active),
        active
    );
}

fn write_listing<W: Write>(out: &mut W, config: &Config, table: &GroupTable) {
    let per_channel = usize::from(config.groups_per_channel).max(1);
    let active = config.active_groups();
    for (group, state, fill) in table.iter(active) {
        let channel = config
            .active_channel_ids()
            .get(group.get() / per_channel)
            .copied()
            .unwrap_or(0);
        let _ = writeln!(
            out,
            "{:03} CH{} S{} P{}",
            group.number(),
            channel,
            state.get(),
            fill.get()
        );
    }
    let _ = writeln!(out, "OK G {active} groups");
}

/// Name every field that was reset while loading or importing
pub(crate) fn warn_corrections<W: Write>(out: &mut W, command: &str, report: &ValidationReport) {
    if !report.is_corrected() {
        return;
    }
    let _ = write!(out, "WARN {command} corrected to defaults:");
    for field in report.fields() {
        let _ = write!(out, " {field};");
    }
    let _ = writeln!(out);
}
