// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::PWM_CHANNEL_COUNT;
use crate::observability::messages::{hardware::PwmDriverCall, StructuredLog};
use crate::traits::PwmDriver;

/// Tracks which hardware channels are claimed.
#[derive(Debug, Default)]
pub struct ChannelAllocator {
    in_use: [bool; PWM_CHANNEL_COUNT],
}

impl ChannelAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the lowest free channel.
    pub fn allocate(&mut self) -> Option<u8> {
        let index = self.in_use.iter().position(|used| !used)?;
        self.in_use[index] = true;
        u8::try_from(index).ok()
    }

    pub fn release(&mut self, channel: u8) {
        if let Some(slot) = self.in_use.get_mut(channel as usize) {
            *slot = false;
        }
    }

    pub fn available(&self) -> usize {
        self.in_use.iter().filter(|used| !**used).count()
    }
}

/// Driver for hosts without a PWM peripheral: every call becomes a debug
/// event.
#[derive(Debug, Default)]
pub struct LogPwmDriver;

impl LogPwmDriver {
    pub fn new() -> Self {
        Self
    }
}

impl PwmDriver for LogPwmDriver {
    fn configure(&self, channel: u8, frequency_hz: u32, resolution_bits: u8) {
        PwmDriverCall {
            operation: "configure",
            channel: Some(channel),
            pin: None,
            value: frequency_hz,
        }
        .log();
        PwmDriverCall {
            operation: "resolution",
            channel: Some(channel),
            pin: None,
            value: resolution_bits as u32,
        }
        .log();
    }

    fn attach_pin(&self, channel: u8, pin: u8) {
        PwmDriverCall {
            operation: "attach",
            channel: Some(channel),
            pin: Some(pin),
            value: 0,
        }
        .log();
    }

    fn detach_pin(&self, pin: u8) {
        PwmDriverCall {
            operation: "detach",
            channel: None,
            pin: Some(pin),
            value: 0,
        }
        .log();
    }

    fn write(&self, channel: u8, duty: u32) {
        PwmDriverCall {
            operation: "write",
            channel: Some(channel),
            pin: None,
            value: duty,
        }
        .log();
    }
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum PwmCall {
    Configure { channel: u8, frequency_hz: u32, resolution_bits: u8 },
    Attach { channel: u8, pin: u8 },
    Detach { pin: u8 },
    Write { channel: u8, duty: u32 },
}

/// Driver that records every call for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingPwmDriver {
    calls: std::cell::RefCell<Vec<PwmCall>>,
}

#[cfg(test)]
impl RecordingPwmDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PwmCall> {
        self.calls.borrow().clone()
    }

    pub fn last_write(&self, channel: u8) -> Option<u32> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            PwmCall::Write { channel: c, duty } if *c == channel => Some(*duty),
            _ => None,
        })
    }
}

#[cfg(test)]
impl PwmDriver for RecordingPwmDriver {
    fn configure(&self, channel: u8, frequency_hz: u32, resolution_bits: u8) {
        self.calls.borrow_mut().push(PwmCall::Configure {
            channel,
            frequency_hz,
            resolution_bits,
        });
    }

    fn attach_pin(&self, channel: u8, pin: u8) {
        self.calls.borrow_mut().push(PwmCall::Attach { channel, pin });
    }

    fn detach_pin(&self, pin: u8) {
        self.calls.borrow_mut().push(PwmCall::Detach { pin });
    }

    fn write(&self, channel: u8, duty: u32) {
        self.calls.borrow_mut().push(PwmCall::Write { channel, duty });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocates_lowest_free_channel() {
        let mut allocator = ChannelAllocator::new();
        assert_eq!(allocator.allocate(), Some(0));
        assert_eq!(allocator.allocate(), Some(1));
        allocator.release(0);
        assert_eq!(allocator.allocate(), Some(0));
        assert_eq!(allocator.available(), PWM_CHANNEL_COUNT - 2);
    }

    #[test]
    fn runs_out_after_all_channels() {
        let mut allocator = ChannelAllocator::new();
        for expected in 0..PWM_CHANNEL_COUNT {
            assert_eq!(allocator.allocate(), Some(expected as u8));
        }
        assert_eq!(allocator.allocate(), None);
        allocator.release(200);
        assert_eq!(allocator.available(), 0);
    }
}
