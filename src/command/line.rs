//! Line assembly with minimal editing
//!
//! Bytes from the console are collected into a fixed-capacity buffer.
//! Backspace removes one character, Escape and Ctrl-C discard the pending
//! line, CR or LF completes it. A line holds at most `N - 1` characters.

use heapless::String;

pub const BACKSPACE: u8 = 0x08;
pub const DELETE: u8 = 0x7F;
pub const ESCAPE: u8 = 0x1B;
pub const CTRL_C: u8 = 0x03;
pub const BELL: u8 = 0x07;

/// What a single received byte did to the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEvent {
    /// Character appended
    Appended(char),
    /// Last character removed
    Erased,
    /// Backspace on an empty line
    Ignored,
    /// Pending line discarded
    Cancelled,
    /// Terminator received with nothing collected
    Empty,
    /// Terminator received, the line is ready
    Complete,
    /// The line is full; the byte was rejected and the collected text is
    /// ready for dispatch
    Overflow,
}

impl LineEvent {
    /// Whether [`LineBuffer::line`] should be dispatched now
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Complete | Self::Overflow)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LineBuffer<const N: usize> {
    text: String<N>,
}

impl<const N: usize> LineBuffer<N> {
    /// Longest line kept before force-dispatching
    pub const LIMIT: usize = N - 1;

    pub const fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// Feed one received byte.
    ///
    /// After [`LineEvent::Complete`] or [`LineEvent::Overflow`] the caller
    /// reads [`Self::line`] and then calls [`Self::clear`].
    pub fn push(&mut self, byte: u8) -> LineEvent {
        match byte {
            b'\r' | b'\n' if self.text.is_empty() => LineEvent::Empty,
            b'\r' | b'\n' => LineEvent::Complete,
            BACKSPACE | DELETE => {
                if self.text.pop().is_some() {
                    LineEvent::Erased
                } else {
                    LineEvent::Ignored
                }
            }
            ESCAPE | CTRL_C => {
                self.text.clear();
                LineEvent::Cancelled
            }
            0x20..=0x7E => {
                if self.text.len() >= Self::LIMIT {
                    return LineEvent::Overflow;
                }
                let ch = char::from(byte);
                match self.text.push(ch) {
                    Ok(()) => LineEvent::Appended(ch),
                    Err(()) => LineEvent::Overflow,
                }
            }
            _ => LineEvent::Ignored,
        }
    }

    pub fn line(&self) -> &str {
        self.text.trim()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
