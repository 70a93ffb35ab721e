// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Rejections returned by the administrative surface.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdminError {
    #[error("Invalid JSON fragment: {0}")]
    InvalidJson(String),

    #[error("The root node cannot be replaced")]
    RootPath,
}
