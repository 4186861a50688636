//! Group state table
//!
//! Fixed-capacity arena holding the state and fill percentage of every
//! group slot. Capacity is the compile-time ceiling `MAX_GROUPS`; the
//! configured active group count never exceeds it.

use crate::{MAX_CHANNELS, MAX_GROUPS, STATE_COUNT};

/// Zero-based index of a group slot, always below `MAX_GROUPS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupIndex(u8);

impl GroupIndex {
    /// Validate a zero-based index against the table ceiling
    pub const fn new(index: usize) -> Option<Self> {
        if index < MAX_GROUPS {
            #[allow(clippy::cast_possible_truncation)]
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Validate a one-based operator-facing group number
    pub const fn from_number(number: usize) -> Option<Self> {
        if number == 0 {
            return None;
        }
        Self::new(number - 1)
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    /// One-based number as printed to the operator
    pub const fn number(self) -> usize {
        self.0 as usize + 1
    }
}

/// Physical channel id, 1 to `MAX_CHANNELS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChannelId(u8);

impl ChannelId {
    pub const fn new(id: u8) -> Option<Self> {
        if id >= 1 && id as usize <= MAX_CHANNELS {
            Some(Self(id))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based buffer slot of this channel
    pub const fn slot(self) -> usize {
        self.0 as usize - 1
    }
}

/// Group state, 0 (off) to 9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotState(u8);

impl SlotState {
    pub const OFF: Self = Self(0);

    pub const fn new(state: u8) -> Option<Self> {
        if (state as usize) < STATE_COUNT {
            Some(Self(state))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_off(self) -> bool {
        self.0 == 0
    }
}

/// Fill percentage, 0 to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPercent(u8);

impl FillPercent {
    pub const FULL: Self = Self(100);

    pub const fn new(percent: u8) -> Option<Self> {
        if percent <= 100 {
            Some(Self(percent))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    pub const fn is_full(self) -> bool {
        self.0 >= 100
    }
}

impl Default for FillPercent {
    fn default() -> Self {
        Self::FULL
    }
}

/// State and fill of every group slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupTable {
    states: [SlotState; MAX_GROUPS],
    fill: [FillPercent; MAX_GROUPS],
}

impl GroupTable {
    pub const fn new() -> Self {
        Self {
            states: [SlotState::OFF; MAX_GROUPS],
            fill: [FillPercent::FULL; MAX_GROUPS],
        }
    }

    pub const fn state(&self, group: GroupIndex) -> SlotState {
        self.states[group.get()]
    }

    pub const fn fill(&self, group: GroupIndex) -> FillPercent {
        self.fill[group.get()]
    }

    pub fn set(&mut self, group: GroupIndex, state: SlotState, fill: FillPercent) {
        self.states[group.get()] = state;
        self.fill[group.get()] = fill;
    }

    /// Set every slot, including those beyond the active group count
    pub fn set_all(&mut self, state: SlotState) {
        self.states = [state; MAX_GROUPS];
        self.fill = [FillPercent::FULL; MAX_GROUPS];
    }

    pub fn clear(&mut self) {
        self.set_all(SlotState::OFF);
    }

    /// Iterate the first `count` slots
    pub fn iter(
        &self,
        count: usize,
    ) -> impl Iterator<Item = (GroupIndex, SlotState, FillPercent)> + '_ {
        self.states
            .iter()
            .zip(self.fill.iter())
            .take(count.min(MAX_GROUPS))
            .enumerate()
            .filter_map(|(i, (state, fill))| Some((GroupIndex::new(i)?, *state, *fill)))
    }

    /// Number of slots within the first `count` that are not off
    pub fn lit_count(&self, count: usize) -> usize {
        self.iter(count).filter(|(_, state, _)| !state.is_off()).count()
    }
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::new()
    }
}
