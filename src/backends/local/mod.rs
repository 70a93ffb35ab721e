// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process signal modules.

pub mod gain;
pub mod sequence_processor;

pub use gain::GainModule;
pub use sequence_processor::{Phase, SequenceProcessor};
