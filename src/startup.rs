//! Boot sweep over the configured layout
//!
//! Lights the active groups one per animation tick, cycling through the
//! colors of states 1-9, then hands the buffers back to the group state
//! table. The table itself is never touched.

use crate::STATE_COUNT;
use crate::config::Config;
use crate::groups::GroupIndex;
use crate::renderer::Renderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupSequence {
    lit: usize,
    total: usize,
}

impl StartupSequence {
    pub const fn new(config: &Config) -> Self {
        Self {
            lit: 0,
            total: config.active_groups(),
        }
    }

    /// Number of groups currently shown
    pub const fn lit(&self) -> usize {
        if self.lit < self.total {
            self.lit
        } else {
            self.total
        }
    }

    /// Every group was shown for at least one tick
    pub const fn is_finished(&self) -> bool {
        self.lit > self.total
    }

    /// One animation tick
    pub fn tick(&mut self) {
        if !self.is_finished() {
            self.lit += 1;
        }
    }

    /// Color of the `index`-th group of the sweep
    pub const fn color_index(index: usize) -> usize {
        index % (STATE_COUNT - 1) + 1
    }

    pub fn render(&self, renderer: &mut Renderer, config: &Config) {
        for index in 0..self.lit() {
            let Some(group) = GroupIndex::new(index) else {
                break;
            };
            let color = config.states[Self::color_index(index)].color;
            renderer.fill_group(config, group, color);
        }
    }
}
