// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A recoverable problem found while parsing a sequence string.
///
/// Parsing never fails: the offending field falls back to a neutral value
/// and one of these is recorded so callers can surface it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceWarning {
    /// A numeric field did not parse and was read as zero.
    #[error("malformed {field} '{text}', using 0")]
    MalformedNumber { field: &'static str, text: String },
    /// The repeat prefix was neither `inf`, empty, nor a positive integer.
    #[error("malformed repeat '{0}', using 1")]
    MalformedRepeat(String),
    /// A closing brace had no matching opening brace.
    #[error("unmatched '}}' at offset {offset}")]
    UnbalancedClose { offset: usize },
    /// The input ended with groups still open.
    #[error("{depth} group(s) left open at end of input")]
    UnclosedGroup { depth: usize },
    /// An element carried more than three `;`-separated fields.
    #[error("element '{0}' has more than three fields")]
    ExtraFields(String),
}
