//! Controller configuration
//!
//! A single value object holding geometry, timing, visual and per-state
//! settings. Every field has a documented range; [`Config::validate_and_clamp`]
//! resets out-of-range fields to their defaults one by one, and
//! [`Config::apply`] validates single-field updates coming from the console.

mod error;
mod store;

use embassy_time::Duration;
use heapless::Vec;

pub use error::{ConfigError, ImportError};
pub use store::{
    BLOB_LEN, CONFIG_PATH, DIGEST_LEN, EXPORT_TAG, HEX_LEN, RECORD_LEN, RawConfig, export_hex,
    import_hex, load, save,
};

use crate::color::{PixelFormat, Rgb, rgb_from_u32};
use crate::pattern::{PATTERN_COUNT, PatternId};
use crate::{MAX_CHANNELS, MAX_GROUPS, MAX_PIXELS_PER_CHANNEL, STATE_COUNT};

/// Identity buffer size, including the terminating NUL
pub const IDENTITY_LEN: usize = 32;

/// Inclusive range of a numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub field: &'static str,
    pub min: u32,
    pub max: u32,
}

impl Limit {
    const fn new(field: &'static str, min: u32, max: u32) -> Self {
        Self { field, min, max }
    }

    pub const fn contains(self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Check `value`, reporting the attempted value and the valid range
    pub const fn check(self, value: u32) -> Result<u32, ConfigError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ConfigError::OutOfRange {
                field: self.field,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
pub const PIXELS_PER_CHANNEL: Limit =
    Limit::new("pixels per channel", 1, MAX_PIXELS_PER_CHANNEL as u32);
#[allow(clippy::cast_possible_truncation)]
pub const CHANNELS: Limit = Limit::new("channels", 1, MAX_CHANNELS as u32);
#[allow(clippy::cast_possible_truncation)]
pub const GROUPS_PER_CHANNEL: Limit = Limit::new("groups per channel", 1, MAX_GROUPS as u32);
pub const SPACER: Limit = Limit::new("spacer width", 0, 100);
#[allow(clippy::cast_possible_truncation)]
pub const START_OFFSET: Limit =
    Limit::new("start offset", 0, MAX_PIXELS_PER_CHANNEL as u32 - 1);
pub const UPDATE_INTERVAL: Limit = Limit::new("update interval", 10, 1000);
pub const BLINK_INTERVAL: Limit = Limit::new("blink interval", 50, 5000);
pub const ANIMATE_INTERVAL: Limit = Limit::new("animation interval", 10, 2000);
pub const BRIGHTNESS: Limit = Limit::new("brightness", 0, 255);
pub const ANIMATION_FADE: Limit = Limit::new("animation fade", 0, 255);
pub const BLINK_FADE: Limit = Limit::new("blink fade", 0, 255);
#[allow(clippy::cast_possible_truncation)]
pub const STATE: Limit = Limit::new("state", 1, STATE_COUNT as u32 - 1);
pub const COLOR: Limit = Limit::new("color", 0, 0x00FF_FFFF);
#[allow(clippy::cast_possible_truncation)]
pub const PATTERN: Limit = Limit::new("pattern", 0, PATTERN_COUNT as u32 - 1);
#[allow(clippy::cast_possible_truncation)]
pub const CHANNEL: Limit = Limit::new("channel", 1, MAX_CHANNELS as u32);
pub const PIN: Limit = Limit::new("pin", 0, 48);
pub const FLAG: Limit = Limit::new("flag", 0, 1);

const DEFAULT_IDENTITY: &[u8] = b"sight";
const DEFAULT_PIXELS_PER_CHANNEL: u16 = 100;
const DEFAULT_CHANNELS: u8 = 1;
const DEFAULT_GROUPS_PER_CHANNEL: u8 = 10;
const DEFAULT_UPDATE_MS: u16 = 20;
const DEFAULT_BLINK_MS: u16 = 500;
const DEFAULT_ANIMATE_MS: u16 = 60;
const DEFAULT_BRIGHTNESS: u8 = 128;
const DEFAULT_ANIMATION_FADE: u8 = 96;
const DEFAULT_BLINK_FADE: u8 = 255;
const DEFAULT_CHANNEL_ORDER: [u8; MAX_CHANNELS] = [1, 2, 3, 4, 5, 6, 7, 8];
const DEFAULT_PINS: [u8; MAX_CHANNELS] = [16, 17, 18, 19, 21, 22, 23, 25];

const DEFAULT_STATES: [StateEntry; STATE_COUNT] = [
    StateEntry::new(0x00_0000, PatternId::Solid),
    StateEntry::new(0xFF_0000, PatternId::Solid),
    StateEntry::new(0x00_FF00, PatternId::Solid),
    StateEntry::new(0x00_00FF, PatternId::Solid),
    StateEntry::new(0xFF_FF00, PatternId::Solid),
    StateEntry::new(0x00_FFFF, PatternId::Solid),
    StateEntry::new(0xFF_00FF, PatternId::Solid),
    StateEntry::new(0xFF_FFFF, PatternId::Solid),
    StateEntry::new(0xFF_8000, PatternId::Blink),
    StateEntry::new(0x80_00FF, PatternId::SweepUp),
];

/// Color and pattern of one state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateEntry {
    pub color: Rgb,
    /// Raw pattern id, validated against [`PATTERN`]
    pub pattern: u8,
}

impl StateEntry {
    pub const fn new(color: u32, pattern: PatternId) -> Self {
        Self {
            color: rgb_from_u32(color),
            pattern: pattern as u8,
        }
    }

    /// Resolved pattern; unknown ids render solid
    pub const fn pattern(self) -> PatternId {
        match PatternId::from_raw(self.pattern) {
            Some(pattern) => pattern,
            None => PatternId::Solid,
        }
    }
}

/// Cadence intervals in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub update_ms: u16,
    pub blink_ms: u16,
    pub animate_ms: u16,
    /// Always `2 x update_ms`
    pub push_ms: u16,
}

impl Timing {
    pub const fn update(self) -> Duration {
        Duration::from_millis(self.update_ms as u64)
    }

    pub const fn blink(self) -> Duration {
        Duration::from_millis(self.blink_ms as u64)
    }

    pub const fn animate(self) -> Duration {
        Duration::from_millis(self.animate_ms as u64)
    }

    pub const fn push(self) -> Duration {
        Duration::from_millis(self.push_ms as u64)
    }
}

/// Fields corrected while validating a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    corrected: Vec<&'static str, 32>,
}

impl ValidationReport {
    pub const fn new() -> Self {
        Self {
            corrected: Vec::new(),
        }
    }

    pub fn flag(&mut self, field: &'static str) {
        if !self.corrected.contains(&field) {
            let _ = self.corrected.push(field);
        }
    }

    pub fn merge(&mut self, other: &Self) {
        for field in &other.corrected {
            self.flag(field);
        }
    }

    pub fn is_corrected(&self) -> bool {
        !self.corrected.is_empty()
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.corrected
    }
}

/// Single-field update addressed by its console item code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigUpdate<'a> {
    Identity(&'a str),
    PixelsPerChannel(u32),
    Channels(u32),
    GroupsPerChannel(u32),
    Spacer(u32),
    StartOffset(u32),
    UpdateInterval(u32),
    BlinkInterval(u32),
    AnimateInterval(u32),
    Brightness(u32),
    AnimationFade(u32),
    BlinkFade(u32),
    State { state: u32, color: u32, pattern: u32 },
    ChannelOrder(&'a str),
    Pin { channel: u32, pin: u32 },
    StartupAnimation(u32),
    Echo(u32),
    PixelFormat(u32),
}

impl ConfigUpdate<'_> {
    /// Console item code of this update
    pub const fn code(&self) -> char {
        match self {
            Self::Identity(_) => 'i',
            Self::PixelsPerChannel(_) => 'l',
            Self::Channels(_) => 'c',
            Self::GroupsPerChannel(_) => 'g',
            Self::Spacer(_) => 'w',
            Self::StartOffset(_) => 'o',
            Self::UpdateInterval(_) => 'u',
            Self::BlinkInterval(_) => 'b',
            Self::AnimateInterval(_) => 'a',
            Self::Brightness(_) => 'r',
            Self::AnimationFade(_) => 'f',
            Self::BlinkFade(_) => 'k',
            Self::State { .. } => 's',
            Self::ChannelOrder(_) => 'm',
            Self::Pin { .. } => 'p',
            Self::StartupAnimation(_) => 't',
            Self::Echo(_) => 'e',
            Self::PixelFormat(_) => 'x',
        }
    }

    /// Whether the update changes which pixels belong to which group
    pub const fn changes_layout(&self) -> bool {
        matches!(
            self,
            Self::PixelsPerChannel(_)
                | Self::Channels(_)
                | Self::GroupsPerChannel(_)
                | Self::Spacer(_)
                | Self::StartOffset(_)
                | Self::ChannelOrder(_)
        )
    }
}

/// The persisted controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// NUL-terminated identity string
    pub identity: [u8; IDENTITY_LEN],
    pub pixels_per_channel: u16,
    pub channels: u8,
    pub groups_per_channel: u8,
    pub spacer: u8,
    pub start_offset: u16,
    pub timing: Timing,
    pub brightness: u8,
    pub animation_fade: u8,
    pub blink_fade: u8,
    pub states: [StateEntry; STATE_COUNT],
    /// Logical position to physical channel id (1-8)
    pub channel_order: [u8; MAX_CHANNELS],
    pub pins: [u8; MAX_CHANNELS],
    pub startup_animation: bool,
    pub echo: bool,
    pub pixel_format: PixelFormat,
}

impl Config {
    /// Compiled-in defaults
    pub const fn defaults() -> Self {
        Self {
            identity: padded_identity(DEFAULT_IDENTITY),
            pixels_per_channel: DEFAULT_PIXELS_PER_CHANNEL,
            channels: DEFAULT_CHANNELS,
            groups_per_channel: DEFAULT_GROUPS_PER_CHANNEL,
            spacer: 0,
            start_offset: 0,
            timing: Timing {
                update_ms: DEFAULT_UPDATE_MS,
                blink_ms: DEFAULT_BLINK_MS,
                animate_ms: DEFAULT_ANIMATE_MS,
                push_ms: DEFAULT_UPDATE_MS * 2,
            },
            brightness: DEFAULT_BRIGHTNESS,
            animation_fade: DEFAULT_ANIMATION_FADE,
            blink_fade: DEFAULT_BLINK_FADE,
            states: DEFAULT_STATES,
            channel_order: DEFAULT_CHANNEL_ORDER,
            pins: DEFAULT_PINS,
            startup_animation: true,
            echo: false,
            pixel_format: PixelFormat::Rgb,
        }
    }

    /// Identity as text; empty if the stored bytes are not valid
    pub fn identity(&self) -> &str {
        let len = self
            .identity
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(IDENTITY_LEN);
        core::str::from_utf8(&self.identity[..len]).unwrap_or("")
    }

    /// Number of groups currently addressable
    pub const fn active_groups(&self) -> usize {
        self.channels as usize * self.groups_per_channel as usize
    }

    /// Pixels reserved per group, spacer included
    pub const fn pixels_per_group(&self) -> usize {
        if self.groups_per_channel == 0 {
            return 0;
        }
        self.pixels_per_channel as usize / self.groups_per_channel as usize
    }

    /// Physical channel ids of the active logical positions
    pub fn active_channel_ids(&self) -> &[u8] {
        let count = (self.channels as usize).min(MAX_CHANNELS);
        &self.channel_order[..count]
    }

    /// Logical position of a physical channel, if it is active
    pub fn logical_position(&self, channel_id: u8) -> Option<usize> {
        self.active_channel_ids()
            .iter()
            .position(|&id| id == channel_id)
    }

    /// Reset every out-of-range field to its default.
    ///
    /// Fields are corrected independently; only the two products of the
    /// group capacity and the two ordered intervals are reset together.
    pub fn validate_and_clamp(mut self) -> (Self, ValidationReport) {
        let defaults = Self::defaults();
        let mut report = ValidationReport::new();

        if !identity_is_valid(&self.identity) {
            self.identity = defaults.identity;
            report.flag("identity");
        }

        clamp_u16(
            &mut self.pixels_per_channel,
            PIXELS_PER_CHANNEL,
            defaults.pixels_per_channel,
            &mut report,
        );
        clamp_u8(&mut self.channels, CHANNELS, defaults.channels, &mut report);
        clamp_u8(
            &mut self.groups_per_channel,
            GROUPS_PER_CHANNEL,
            defaults.groups_per_channel,
            &mut report,
        );
        clamp_u8(&mut self.spacer, SPACER, defaults.spacer, &mut report);
        clamp_u16(
            &mut self.start_offset,
            START_OFFSET,
            defaults.start_offset,
            &mut report,
        );
        clamp_u16(
            &mut self.timing.update_ms,
            UPDATE_INTERVAL,
            defaults.timing.update_ms,
            &mut report,
        );
        clamp_u16(
            &mut self.timing.blink_ms,
            BLINK_INTERVAL,
            defaults.timing.blink_ms,
            &mut report,
        );
        clamp_u16(
            &mut self.timing.animate_ms,
            ANIMATE_INTERVAL,
            defaults.timing.animate_ms,
            &mut report,
        );

        for (index, entry) in self.states.iter_mut().enumerate() {
            let default = defaults.states[index];
            let valid = if index == 0 {
                *entry == default
            } else {
                PATTERN.contains(u32::from(entry.pattern))
            };
            if !valid {
                *entry = default;
                report.flag("state table");
            }
        }

        if !is_channel_permutation(&self.channel_order) {
            self.channel_order = defaults.channel_order;
            report.flag("channel order");
        }

        for (pin, default) in self.pins.iter_mut().zip(defaults.pins) {
            clamp_u8(pin, PIN, default, &mut report);
        }

        if self.timing.update_ms >= self.timing.blink_ms {
            self.timing.update_ms = defaults.timing.update_ms;
            self.timing.blink_ms = defaults.timing.blink_ms;
            report.flag(UPDATE_INTERVAL.field);
            report.flag(BLINK_INTERVAL.field);
        }

        let push_ms = self.timing.update_ms * 2;
        if self.timing.push_ms != push_ms {
            self.timing.push_ms = push_ms;
            report.flag("state push interval");
        }

        if self.active_groups() > MAX_GROUPS {
            self.channels = defaults.channels;
            self.groups_per_channel = defaults.groups_per_channel;
            report.flag(CHANNELS.field);
            report.flag(GROUPS_PER_CHANNEL.field);
        }

        (self, report)
    }

    /// Validate and apply a single-field update.
    ///
    /// On failure the record is left unchanged.
    pub fn apply(&mut self, update: ConfigUpdate<'_>) -> Result<(), ConfigError> {
        match update {
            ConfigUpdate::Identity(text) => {
                let bytes = text.as_bytes();
                if bytes.is_empty()
                    || bytes.len() >= IDENTITY_LEN
                    || !bytes.iter().all(is_printable)
                {
                    return Err(ConfigError::Malformed {
                        field: "identity",
                        expected: "1-31 printable ASCII characters",
                    });
                }
                self.identity = padded_identity(bytes);
            }
            ConfigUpdate::PixelsPerChannel(value) => {
                self.pixels_per_channel = narrow_u16(PIXELS_PER_CHANNEL.check(value)?);
            }
            ConfigUpdate::Channels(value) => {
                let channels = CHANNELS.check(value)?;
                self.check_capacity(channels, u32::from(self.groups_per_channel))?;
                self.channels = narrow_u8(channels);
            }
            ConfigUpdate::GroupsPerChannel(value) => {
                let groups = GROUPS_PER_CHANNEL.check(value)?;
                self.check_capacity(u32::from(self.channels), groups)?;
                self.groups_per_channel = narrow_u8(groups);
            }
            ConfigUpdate::Spacer(value) => self.spacer = narrow_u8(SPACER.check(value)?),
            ConfigUpdate::StartOffset(value) => {
                self.start_offset = narrow_u16(START_OFFSET.check(value)?);
            }
            ConfigUpdate::UpdateInterval(value) => {
                let update = UPDATE_INTERVAL.check(value)?;
                let blink = u32::from(self.timing.blink_ms);
                if update >= blink {
                    return Err(ConfigError::Ordering {
                        field: UPDATE_INTERVAL.field,
                        value: update,
                        requirement: "below blink interval",
                        limit: blink,
                    });
                }
                self.timing.update_ms = narrow_u16(update);
                self.timing.push_ms = narrow_u16(update * 2);
            }
            ConfigUpdate::BlinkInterval(value) => {
                let blink = BLINK_INTERVAL.check(value)?;
                let update = u32::from(self.timing.update_ms);
                if blink <= update {
                    return Err(ConfigError::Ordering {
                        field: BLINK_INTERVAL.field,
                        value: blink,
                        requirement: "above update interval",
                        limit: update,
                    });
                }
                self.timing.blink_ms = narrow_u16(blink);
            }
            ConfigUpdate::AnimateInterval(value) => {
                self.timing.animate_ms = narrow_u16(ANIMATE_INTERVAL.check(value)?);
            }
            ConfigUpdate::Brightness(value) => {
                self.brightness = narrow_u8(BRIGHTNESS.check(value)?);
            }
            ConfigUpdate::AnimationFade(value) => {
                self.animation_fade = narrow_u8(ANIMATION_FADE.check(value)?);
            }
            ConfigUpdate::BlinkFade(value) => {
                self.blink_fade = narrow_u8(BLINK_FADE.check(value)?);
            }
            ConfigUpdate::State {
                state,
                color,
                pattern,
            } => {
                let state = STATE.check(state)?;
                let color = COLOR.check(color)?;
                let pattern = PATTERN.check(pattern)?;
                self.states[state as usize] = StateEntry {
                    color: rgb_from_u32(color),
                    pattern: narrow_u8(pattern),
                };
            }
            ConfigUpdate::ChannelOrder(digits) => {
                self.channel_order = parse_channel_order(digits)?;
            }
            ConfigUpdate::Pin { channel, pin } => {
                let channel = CHANNEL.check(channel)?;
                let pin = PIN.check(pin)?;
                self.pins[channel as usize - 1] = narrow_u8(pin);
            }
            ConfigUpdate::StartupAnimation(value) => {
                self.startup_animation = FLAG.check(value)? == 1;
            }
            ConfigUpdate::Echo(value) => self.echo = FLAG.check(value)? == 1,
            ConfigUpdate::PixelFormat(value) => {
                let raw = narrow_u8(FLAG.check(value)?);
                self.pixel_format = PixelFormat::from_u8(raw).unwrap_or_default();
            }
        }
        Ok(())
    }

    fn check_capacity(&self, channels: u32, groups_per_channel: u32) -> Result<(), ConfigError> {
        if channels as usize * groups_per_channel as usize > MAX_GROUPS {
            return Err(ConfigError::CapacityExceeded {
                channels,
                groups_per_channel,
                max: MAX_GROUPS,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

const fn is_printable(byte: &u8) -> bool {
    byte.is_ascii_graphic() || *byte == b' '
}

const fn padded_identity(text: &[u8]) -> [u8; IDENTITY_LEN] {
    let mut out = [0u8; IDENTITY_LEN];
    let mut i = 0;
    while i < text.len() && i < IDENTITY_LEN - 1 {
        out[i] = text[i];
        i += 1;
    }
    out
}

/// Non-empty printable prefix, NUL terminated, zero tail
fn identity_is_valid(identity: &[u8; IDENTITY_LEN]) -> bool {
    let Some(len) = identity.iter().position(|&b| b == 0) else {
        return false;
    };
    len > 0
        && identity[..len].iter().all(is_printable)
        && identity[len..].iter().all(|&b| b == 0)
}

/// Every physical channel id appears exactly once
pub fn is_channel_permutation(order: &[u8; MAX_CHANNELS]) -> bool {
    let mut seen = [false; MAX_CHANNELS];
    for &id in order {
        let Some(slot) = (id as usize).checked_sub(1).filter(|&s| s < MAX_CHANNELS) else {
            return false;
        };
        if seen[slot] {
            return false;
        }
        seen[slot] = true;
    }
    true
}

fn parse_channel_order(digits: &str) -> Result<[u8; MAX_CHANNELS], ConfigError> {
    let malformed = ConfigError::Malformed {
        field: "channel order",
        expected: "8 distinct digits 1-8",
    };
    let bytes = digits.as_bytes();
    if bytes.len() != MAX_CHANNELS {
        return Err(malformed);
    }
    let mut order = [0u8; MAX_CHANNELS];
    for (slot, byte) in order.iter_mut().zip(bytes) {
        if !byte.is_ascii_digit() {
            return Err(malformed);
        }
        *slot = byte - b'0';
    }
    if !is_channel_permutation(&order) {
        return Err(malformed);
    }
    Ok(order)
}

fn clamp_u8(value: &mut u8, limit: Limit, default: u8, report: &mut ValidationReport) {
    if !limit.contains(u32::from(*value)) {
        *value = default;
        report.flag(limit.field);
    }
}

fn clamp_u16(value: &mut u16, limit: Limit, default: u16, report: &mut ValidationReport) {
    if !limit.contains(u32::from(*value)) {
        *value = default;
        report.flag(limit.field);
    }
}

// Values reaching these helpers have already passed a `Limit` check.
#[allow(clippy::cast_possible_truncation)]
const fn narrow_u8(value: u32) -> u8 {
    value as u8
}

#[allow(clippy::cast_possible_truncation)]
const fn narrow_u16(value: u32) -> u16 {
    value as u16
}
