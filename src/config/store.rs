//! Binary persistence of the configuration record
//!
//! Layout: `[raw record][SHA-256 of the raw record]`. The raw record is a
//! byte-only `#[repr(C)]` struct, so its size and field offsets are fixed
//! and multi-byte values are stored little-endian.

use bytemuck::{Pod, Zeroable};
use sha2::{Digest, Sha256};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use super::{Config, ConfigError, IDENTITY_LEN, ImportError, StateEntry, Timing, ValidationReport};
use crate::color::{PixelFormat, Rgb};
use crate::{MAX_CHANNELS, STATE_COUNT};

/// Record layout version
const RECORD_VERSION: u8 = 1;

/// Size of the raw record
pub const RECORD_LEN: usize = core::mem::size_of::<RawConfig>();

/// Size of the trailing digest
pub const DIGEST_LEN: usize = 32;

/// Size of a persisted blob
pub const BLOB_LEN: usize = RECORD_LEN + DIGEST_LEN;

/// Length of the hex payload of an export
pub const HEX_LEN: usize = BLOB_LEN * 2;

/// Literal tag in front of exported hex
pub const EXPORT_TAG: &str = "CONFIG:";

/// Storage path of the persisted blob
pub const CONFIG_PATH: &str = "/sight/config.bin";

#[derive(Debug, Clone, Copy, Zeroable, Pod)]
#[repr(C)]
pub struct RawConfig {
    version: u8,
    identity: [u8; IDENTITY_LEN],
    pixels_per_channel: [u8; 2],
    channels: u8,
    groups_per_channel: u8,
    spacer: u8,
    start_offset: [u8; 2],
    update_ms: [u8; 2],
    blink_ms: [u8; 2],
    animate_ms: [u8; 2],
    push_ms: [u8; 2],
    brightness: u8,
    animation_fade: u8,
    blink_fade: u8,
    /// R, G, B, pattern per state
    states: [[u8; 4]; STATE_COUNT],
    channel_order: [u8; MAX_CHANNELS],
    pins: [u8; MAX_CHANNELS],
    startup_animation: u8,
    echo: u8,
    pixel_format: u8,
}

impl From<&Config> for RawConfig {
    fn from(config: &Config) -> Self {
        let mut states = [[0u8; 4]; STATE_COUNT];
        for (raw, entry) in states.iter_mut().zip(config.states.iter()) {
            *raw = [entry.color.r, entry.color.g, entry.color.b, entry.pattern];
        }
        Self {
            version: RECORD_VERSION,
            identity: config.identity,
            pixels_per_channel: config.pixels_per_channel.to_le_bytes(),
            channels: config.channels,
            groups_per_channel: config.groups_per_channel,
            spacer: config.spacer,
            start_offset: config.start_offset.to_le_bytes(),
            update_ms: config.timing.update_ms.to_le_bytes(),
            blink_ms: config.timing.blink_ms.to_le_bytes(),
            animate_ms: config.timing.animate_ms.to_le_bytes(),
            push_ms: config.timing.push_ms.to_le_bytes(),
            brightness: config.brightness,
            animation_fade: config.animation_fade,
            blink_fade: config.blink_fade,
            states,
            channel_order: config.channel_order,
            pins: config.pins,
            startup_animation: u8::from(config.startup_animation),
            echo: u8::from(config.echo),
            pixel_format: config.pixel_format.as_u8(),
        }
    }
}

impl RawConfig {
    /// Decode into a typed record.
    ///
    /// Flags and enumerations outside their domain fall back to defaults
    /// and are reported; numeric ranges are left to validation.
    pub fn decode(&self) -> (Config, ValidationReport) {
        let defaults = Config::defaults();
        let mut report = ValidationReport::new();
        if self.version != RECORD_VERSION {
            report.flag("record version");
        }

        let mut states = defaults.states;
        for (entry, raw) in states.iter_mut().zip(self.states.iter()) {
            *entry = StateEntry {
                color: Rgb {
                    r: raw[0],
                    g: raw[1],
                    b: raw[2],
                },
                pattern: raw[3],
            };
        }

        let mut flag = |raw: u8, default: bool, field: &'static str| match raw {
            0 => false,
            1 => true,
            _ => {
                report.flag(field);
                default
            }
        };
        let startup_animation = flag(
            self.startup_animation,
            defaults.startup_animation,
            "startup animation",
        );
        let echo = flag(self.echo, defaults.echo, "echo");

        let pixel_format = PixelFormat::from_u8(self.pixel_format).unwrap_or_else(|| {
            report.flag("pixel format");
            defaults.pixel_format
        });

        let config = Config {
            identity: self.identity,
            pixels_per_channel: u16::from_le_bytes(self.pixels_per_channel),
            channels: self.channels,
            groups_per_channel: self.groups_per_channel,
            spacer: self.spacer,
            start_offset: u16::from_le_bytes(self.start_offset),
            timing: Timing {
                update_ms: u16::from_le_bytes(self.update_ms),
                blink_ms: u16::from_le_bytes(self.blink_ms),
                animate_ms: u16::from_le_bytes(self.animate_ms),
                push_ms: u16::from_le_bytes(self.push_ms),
            },
            brightness: self.brightness,
            animation_fade: self.animation_fade,
            blink_fade: self.blink_fade,
            states,
            channel_order: self.channel_order,
            pins: self.pins,
            startup_animation,
            echo,
            pixel_format,
        };
        (config, report)
    }
}

fn digest(record: &[u8]) -> [u8; DIGEST_LEN] {
    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&Sha256::digest(record));
    out
}

/// Serialize `config` followed by its digest
pub fn save(config: &Config) -> [u8; BLOB_LEN] {
    let raw = RawConfig::from(config);
    let record = bytemuck::bytes_of(&raw);

    let mut blob = [0u8; BLOB_LEN];
    blob[..RECORD_LEN].copy_from_slice(record);
    blob[RECORD_LEN..].copy_from_slice(&digest(record));
    blob
}

/// Verify and parse a blob produced by [`save`].
///
/// A digest mismatch rejects the whole blob; otherwise the record is
/// validated and individually corrected fields are reported.
pub fn load(blob: &[u8]) -> Result<(Config, ValidationReport), ConfigError> {
    if blob.len() != BLOB_LEN {
        #[cfg(feature = "esp32-log")]
        println!("[config] blob has {} bytes, expected {}", blob.len(), BLOB_LEN);
        return Err(ConfigError::CorruptConfig);
    }
    let (record, stored) = blob.split_at(RECORD_LEN);
    if digest(record) != stored {
        #[cfg(feature = "esp32-log")]
        println!("[config] digest mismatch");
        return Err(ConfigError::CorruptConfig);
    }

    let raw: RawConfig = bytemuck::pod_read_unaligned(record);
    let (config, mut report) = raw.decode();
    let (config, validation) = config.validate_and_clamp();
    report.merge(&validation);

    #[cfg(feature = "esp32-log")]
    {
        if report.is_corrected() {
            println!("[config] corrected fields: {:?}", report.fields());
        }
    }
    Ok((config, report))
}

/// Hex-encode the saved blob of `config` into `out`
pub fn export_hex<'a>(config: &Config, out: &'a mut [u8; HEX_LEN]) -> &'a str {
    let blob = save(config);
    // Output length is exactly twice the blob length.
    let _ = hex::encode_to_slice(blob, out);
    core::str::from_utf8(out).unwrap_or("")
}

/// Decode an export line (`CONFIG:<hex>`).
///
/// Format errors are reported before any decoding happens; the caller's
/// configuration is only replaced by the returned value.
pub fn import_hex(text: &str) -> Result<(Config, ValidationReport), ConfigError> {
    let payload = text
        .trim()
        .strip_prefix(EXPORT_TAG)
        .ok_or(ImportError::MissingTag)?;

    if payload.len() != HEX_LEN {
        return Err(ImportError::WrongLength {
            expected: HEX_LEN,
            actual: payload.len(),
        }
        .into());
    }
    if let Some((position, found)) = payload.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(ImportError::NotHex { position, found }.into());
    }

    let mut blob = [0u8; BLOB_LEN];
    hex::decode_to_slice(payload, &mut blob).map_err(|_| ImportError::WrongLength {
        expected: HEX_LEN,
        actual: payload.len(),
    })?;
    load(&blob)
}
