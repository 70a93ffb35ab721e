// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::fmt;

use crate::graph::PrimitiveType;

/// Value types a port can carry.
///
/// The set is closed: every implementation maps to exactly one
/// [`PrimitiveType`], which is what typed lookups filter on.
pub trait PortValue: Clone + PartialEq + Default + fmt::Debug + fmt::Display + 'static {
    const PRIMITIVE: PrimitiveType;

    /// Parses the textual form used by the network namespace.
    fn parse(text: &str) -> Option<Self>;

    fn to_json(&self) -> Value;

    fn from_json(value: &Value) -> Option<Self>;
}

macro_rules! signed_port_value {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl PortValue for $ty {
                const PRIMITIVE: PrimitiveType = PrimitiveType::$primitive;

                fn parse(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }

                fn to_json(&self) -> Value {
                    Value::from(*self)
                }

                fn from_json(value: &Value) -> Option<Self> {
                    value.as_i64().and_then(|n| <$ty>::try_from(n).ok())
                }
            }
        )*
    };
}

macro_rules! unsigned_port_value {
    ($($ty:ty => $primitive:ident),* $(,)?) => {
        $(
            impl PortValue for $ty {
                const PRIMITIVE: PrimitiveType = PrimitiveType::$primitive;

                fn parse(text: &str) -> Option<Self> {
                    text.trim().parse().ok()
                }

                fn to_json(&self) -> Value {
                    Value::from(*self)
                }

                fn from_json(value: &Value) -> Option<Self> {
                    value.as_u64().and_then(|n| <$ty>::try_from(n).ok())
                }
            }
        )*
    };
}

signed_port_value!(i8 => Int8, i16 => Int16, i32 => Int32, i64 => Int64);
unsigned_port_value!(u8 => UInt8, u16 => UInt16, u32 => UInt32, u64 => UInt64);

impl PortValue for f64 {
    const PRIMITIVE: PrimitiveType = PrimitiveType::Double;

    fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl PortValue for f32 {
    const PRIMITIVE: PrimitiveType = PrimitiveType::Float;

    fn parse(text: &str) -> Option<Self> {
        text.trim().parse().ok()
    }

    fn to_json(&self) -> Value {
        Value::from(*self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_f64().map(|n| n as f32)
    }
}

impl PortValue for bool {
    const PRIMITIVE: PrimitiveType = PrimitiveType::Bool;

    fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "true" | "1" | "on" => Some(true),
            "false" | "0" | "off" => Some(false),
            _ => None,
        }
    }

    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl PortValue for String {
    const PRIMITIVE: PrimitiveType = PrimitiveType::String;

    fn parse(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_textual_payloads() {
        assert_eq!(f64::parse(" 42.5 "), Some(42.5));
        assert_eq!(u8::parse("300"), None);
        assert_eq!(i16::parse("-12"), Some(-12));
        assert_eq!(bool::parse("1"), Some(true));
        assert_eq!(bool::parse("maybe"), None);
        assert_eq!(String::parse(" raw "), Some(" raw ".to_string()));
    }

    #[test]
    fn json_conversion_respects_ranges() {
        assert_eq!(u8::from_json(&json!(255)), Some(255));
        assert_eq!(u8::from_json(&json!(256)), None);
        assert_eq!(i8::from_json(&json!(-3)), Some(-3));
        assert_eq!(f64::from_json(&json!(3)), Some(3.0));
        assert_eq!(true.to_json(), json!(true));
        assert_eq!(String::from_json(&json!(1)), None);
    }

    #[test]
    fn primitive_descriptors() {
        assert_eq!(f64::PRIMITIVE, PrimitiveType::Double);
        assert_eq!(f32::PRIMITIVE, PrimitiveType::Float);
        assert_eq!(u64::PRIMITIVE, PrimitiveType::UInt64);
        assert_eq!(String::PRIMITIVE, PrimitiveType::String);
    }
}
