#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::bounds::{GroupWindow, bounded};
use crate::color::{BLACK, PixelFormat, Rgb, fade_all, fill};
use crate::config::Config;
use crate::groups::{ChannelId, FillPercent, GroupIndex, GroupTable, SlotState};
use crate::pattern::{PATTERN_COUNT, PatternFrame, PatternId};
use crate::{MAX_CHANNELS, MAX_PIXELS_PER_CHANNEL};

/// One pixel buffer per physical channel
#[derive(Debug, Clone)]
pub struct ChannelBuffers {
    pixels: [[Rgb; MAX_PIXELS_PER_CHANNEL]; MAX_CHANNELS],
}

impl ChannelBuffers {
    pub const fn new() -> Self {
        Self {
            pixels: [[BLACK; MAX_PIXELS_PER_CHANNEL]; MAX_CHANNELS],
        }
    }

    pub fn channel(&self, id: ChannelId) -> &[Rgb] {
        &self.pixels[id.slot()]
    }

    fn channel_mut(&mut self, id: ChannelId) -> &mut [Rgb] {
        &mut self.pixels[id.slot()]
    }

    pub fn clear(&mut self) {
        for channel in &mut self.pixels {
            fill(channel, BLACK);
        }
    }
}

impl Default for ChannelBuffers {
    fn default() -> Self {
        Self::new()
    }
}

/// Animation step counter of every pattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepCounters([u32; PATTERN_COUNT]);

impl StepCounters {
    pub const fn new() -> Self {
        Self([0; PATTERN_COUNT])
    }

    /// Advance every counter by one; periods are applied at render time
    pub fn advance(&mut self) {
        for step in &mut self.0 {
            *step = step.wrapping_add(1);
        }
    }

    pub const fn get(&self, pattern: PatternId) -> u32 {
        self.0[pattern.index()]
    }
}

/// Everything the pixel output needs for one transmission
#[derive(Debug, Clone, Copy)]
pub struct PaintFrame<'a> {
    pub buffers: &'a ChannelBuffers,
    /// Physical ids of the active channels, in logical order
    pub channel_ids: &'a [u8],
    pub pins: &'a [u8; MAX_CHANNELS],
    pub pixels_per_channel: usize,
    pub brightness: u8,
    pub format: PixelFormat,
}

impl<'a> PaintFrame<'a> {
    /// Active channels with their output pin and visible pixels
    pub fn channels(&self) -> impl Iterator<Item = (ChannelId, u8, &'a [Rgb])> + 'a {
        let len = self.pixels_per_channel.min(MAX_PIXELS_PER_CHANNEL);
        let buffers = self.buffers;
        let pins = self.pins;
        self.channel_ids.iter().filter_map(move |&id| {
            let channel = ChannelId::new(id)?;
            Some((channel, pins[channel.slot()], &buffers.channel(channel)[..len]))
        })
    }
}

/// Group renderer
///
/// Turns the group state table into pixels on the channel buffers. The
/// renderer owns the buffers and the animation step counters; the
/// configuration and the table are borrowed for every call.
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    buffers: ChannelBuffers,
    steps: StepCounters,
}

impl Renderer {
    pub const fn new() -> Self {
        Self {
            buffers: ChannelBuffers::new(),
            steps: StepCounters::new(),
        }
    }

    pub const fn buffers(&self) -> &ChannelBuffers {
        &self.buffers
    }

    pub const fn steps(&self) -> &StepCounters {
        &self.steps
    }

    /// One animation tick
    pub fn advance_animation(&mut self) {
        self.steps.advance();
    }

    /// Blank every channel, used after layout changes
    pub fn clear(&mut self) {
        #[cfg(feature = "esp32-log")]
        println!("[Renderer.clear] clearing channel buffers");
        self.buffers.clear();
    }

    /// Render every active group of `table`
    pub fn render_all(&mut self, config: &Config, table: &GroupTable, phase: bool) {
        for (group, state, fill) in table.iter(config.active_groups()) {
            self.render_group(config, group, state, fill, phase);
        }
    }

    /// Draw one group into its channel buffer.
    ///
    /// A partial fill always renders solid over the narrowed width; a full
    /// group uses the pattern configured for its state.
    pub fn render_group(
        &mut self,
        config: &Config,
        group: GroupIndex,
        state: SlotState,
        fill_percent: FillPercent,
        phase: bool,
    ) {
        let Some(window) = GroupWindow::resolve(config, group) else {
            return;
        };
        let entry = config.states[usize::from(state.get())];
        let (pattern, window) = if fill_percent.is_full() {
            (entry.pattern(), window)
        } else {
            (PatternId::Solid, window.with_fill(fill_percent.get()))
        };

        let limit = usize::from(config.pixels_per_channel);
        let leds = self.buffers.channel_mut(window.channel);

        let span = bounded(leds, window.start, window.span, limit);
        if pattern.is_continuous() {
            fade_all(span, config.animation_fade);
        } else {
            fill(span, BLACK);
        }

        let frame = PatternFrame {
            color: entry.color,
            phase,
            step: self.steps.get(pattern),
            blink_fade: config.blink_fade,
        };
        pattern.render(bounded(leds, window.start, window.width, limit), &frame);
    }

    /// Light one whole group in a single color, ignoring the state table
    pub fn fill_group(&mut self, config: &Config, group: GroupIndex, color: Rgb) {
        let Some(window) = GroupWindow::resolve(config, group) else {
            return;
        };
        let limit = usize::from(config.pixels_per_channel);
        let leds = self.buffers.channel_mut(window.channel);
        fill(bounded(leds, window.start, window.span, limit), BLACK);
        fill(bounded(leds, window.start, window.width, limit), color);
    }

    /// Borrow the buffers for transmission under `config`
    pub fn paint_frame<'a>(&'a self, config: &'a Config) -> PaintFrame<'a> {
        PaintFrame {
            buffers: &self.buffers,
            channel_ids: config.active_channel_ids(),
            pins: &config.pins,
            pixels_per_channel: usize::from(config.pixels_per_channel),
            brightness: config.brightness,
            format: config.pixel_format,
        }
    }
}
