// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! PWM output stage.
//!
//! [`PwmChannel`] modules claim one of the peripheral's channels from the
//! graph's [`ChannelAllocator`] and drive it through a [`PwmDriver`]
//! implementation.
//!
//! [`PwmDriver`]: crate::traits::PwmDriver

pub mod driver;
pub mod pwm;

pub use driver::{ChannelAllocator, LogPwmDriver};
#[cfg(test)]
pub use driver::{PwmCall, RecordingPwmDriver};
pub use pwm::PwmChannel;
