//! Pixel addressing of groups
//!
//! All index arithmetic from group number to pixel range lives here, and
//! every slice handed to a pattern goes through [`bounded`], so no
//! configuration value can address outside a channel buffer.

use crate::color::Rgb;
use crate::config::Config;
use crate::groups::{ChannelId, GroupIndex};
use crate::math8::percent_of;

/// Pixel window of one group on its physical channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupWindow {
    pub channel: ChannelId,
    /// First pixel of the group
    pub start: usize,
    /// Pixels reserved for the group, spacer included
    pub span: usize,
    /// Drawable pixels, spacer excluded
    pub width: usize,
}

impl GroupWindow {
    /// Resolve the window of `group` under `config`.
    ///
    /// Returns `None` for groups beyond the active count or when the
    /// channel order does not name a valid physical channel.
    pub fn resolve(config: &Config, group: GroupIndex) -> Option<Self> {
        let groups_per_channel = usize::from(config.groups_per_channel);
        if groups_per_channel == 0 || group.get() >= config.active_groups() {
            return None;
        }

        let position = group.get() / groups_per_channel;
        let channel = ChannelId::new(*config.channel_order.get(position)?)?;

        let index_in_channel = group.get() % groups_per_channel;
        let span = config.pixels_per_group();
        let start = index_in_channel * span + usize::from(config.start_offset);
        let width = span.saturating_sub(usize::from(config.spacer));

        Some(Self {
            channel,
            start,
            span,
            width,
        })
    }

    /// Narrow the drawable width to `percent` of itself
    pub const fn with_fill(self, percent: u8) -> Self {
        Self {
            width: percent_of(self.width, percent),
            ..self
        }
    }
}

/// Get the `len` pixels starting at `start`, clipped to `limit` and the
/// buffer length
pub fn bounded(leds: &mut [Rgb], start: usize, len: usize, limit: usize) -> &mut [Rgb] {
    let limit = limit.min(leds.len());
    let end = start.saturating_add(len).min(limit);
    let start = start.min(end);
    &mut leds[start..end]
}
