//! Console input channel for `no_std` environments.
//!
//! Bytes received in an interrupt handler are queued here and drained by
//! the main loop. The queue is a fixed-size `heapless::Deque` guarded by a
//! critical section; bytes arriving while it is full are dropped and
//! counted.

use core::cell::RefCell;
use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use critical_section::Mutex;
use heapless::Deque;

use crate::board::Console;

/// Error returned when a byte could not be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overrun(pub u8);

/// A bounded byte queue shared between an interrupt and the main loop
pub struct InputChannel<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<u8, SIZE>>>,
    overruns: AtomicU32,
}

impl<const SIZE: usize> InputChannel<SIZE> {
    /// Create a new empty channel.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
            overruns: AtomicU32::new(0),
        }
    }

    /// Get the producer handle, used by the receive interrupt.
    pub const fn sender(&self) -> InputSender<'_, SIZE> {
        InputSender { channel: self }
    }

    /// Get the consumer handle, used by the main loop.
    pub const fn receiver(&self) -> InputReceiver<'_, SIZE> {
        InputReceiver { channel: self }
    }

    /// Queue a byte, counting it as an overrun if the queue is full.
    pub fn try_send(&self, byte: u8) -> Result<(), Overrun> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(byte).map_err(Overrun)
        })
        .inspect_err(|_| {
            self.overruns.fetch_add(1, Ordering::Relaxed);
        })
    }

    /// Take the oldest queued byte.
    pub fn try_receive(&self) -> Option<u8> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().pop_front())
    }

    /// Number of bytes dropped because the queue was full
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl<const SIZE: usize> Default for InputChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle of an [`InputChannel`]
#[derive(Clone, Copy)]
pub struct InputSender<'a, const SIZE: usize> {
    channel: &'a InputChannel<SIZE>,
}

impl<const SIZE: usize> InputSender<'_, SIZE> {
    /// Queue every byte of `bytes`, returning how many were accepted
    pub fn send_all(&self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .filter(|&&byte| self.channel.try_send(byte).is_ok())
            .count()
    }

    pub fn try_send(&self, byte: u8) -> Result<(), Overrun> {
        self.channel.try_send(byte)
    }
}

/// Consumer handle of an [`InputChannel`]
#[derive(Clone, Copy)]
pub struct InputReceiver<'a, const SIZE: usize> {
    channel: &'a InputChannel<SIZE>,
}

impl<const SIZE: usize> InputReceiver<'_, SIZE> {
    pub fn try_receive(&self) -> Option<u8> {
        self.channel.try_receive()
    }

    pub fn overruns(&self) -> u32 {
        self.channel.overruns()
    }
}

/// Console built from an input channel and an output sink
pub struct ChannelConsole<'a, W: fmt::Write, const SIZE: usize> {
    input: InputReceiver<'a, SIZE>,
    output: W,
}

impl<'a, W: fmt::Write, const SIZE: usize> ChannelConsole<'a, W, SIZE> {
    pub const fn new(input: InputReceiver<'a, SIZE>, output: W) -> Self {
        Self { input, output }
    }

    pub const fn output(&self) -> &W {
        &self.output
    }
}

impl<W: fmt::Write, const SIZE: usize> fmt::Write for ChannelConsole<'_, W, SIZE> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.write_str(s)
    }
}

impl<W: fmt::Write, const SIZE: usize> Console for ChannelConsole<'_, W, SIZE> {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.try_receive()
    }

    fn overruns(&self) -> u32 {
        self.input.overruns()
    }
}
