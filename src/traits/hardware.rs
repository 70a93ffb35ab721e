// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Register-level access to the PWM peripheral.
pub trait PwmDriver {
    fn configure(&self, channel: u8, frequency_hz: u32, resolution_bits: u8);

    fn attach_pin(&self, channel: u8, pin: u8);

    fn detach_pin(&self, pin: u8);

    /// Writes a raw duty value in `0..=2^resolution - 1`.
    fn write(&self, channel: u8, duty: u32);
}
