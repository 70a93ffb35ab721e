// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Data-flow direction of a node.
///
/// `Undefined` is only meaningful as a lookup filter, where it matches any
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
    None,
    Undefined,
}

impl Direction {
    /// True when a node with direction `self` satisfies the lookup `filter`.
    pub fn satisfies(self, filter: Direction) -> bool {
        filter == Direction::Undefined || filter == self
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Input => "Input",
            Direction::Output => "Output",
            Direction::None => "None",
            Direction::Undefined => "Undefined",
        };
        f.write_str(name)
    }
}

/// Value type carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Double,
    Float,
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Bool,
    None,
    Undefined,
}

impl PrimitiveType {
    pub fn satisfies(self, filter: PrimitiveType) -> bool {
        filter == PrimitiveType::Undefined || filter == self
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Double => "Double",
            PrimitiveType::Float => "Float",
            PrimitiveType::String => "String",
            PrimitiveType::Int8 => "Int8",
            PrimitiveType::Int16 => "Int16",
            PrimitiveType::Int32 => "Int32",
            PrimitiveType::Int64 => "Int64",
            PrimitiveType::UInt8 => "UInt8",
            PrimitiveType::UInt16 => "UInt16",
            PrimitiveType::UInt32 => "UInt32",
            PrimitiveType::UInt64 => "UInt64",
            PrimitiveType::Bool => "Bool",
            PrimitiveType::None => "None",
            PrimitiveType::Undefined => "Undefined",
        };
        f.write_str(name)
    }
}
