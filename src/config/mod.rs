// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
mod document;
mod settings;
mod store;

pub use document::ConfigDocument;
pub use settings::Settings;
pub use store::ConfigStore;
