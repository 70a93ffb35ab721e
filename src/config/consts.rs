// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Configuration document loaded at boot when no settings override it
pub const DEFAULT_DOCUMENT_PATH: &str = "Config.json";
/// Cooperative tick period of the main loop
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;
/// Node under which network variables are materialised
pub const DEFAULT_NAMESPACE_PATH: &str = "/Connectors/mqtt";
/// Suffix marking a creation broadcast as covering a whole subtree
pub const DEFAULT_WILDCARD_SUFFIX: &str = "*";
/// Log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Topic prefix identifying this node on the broker
pub const DEFAULT_EDGE_NAME: &str = "model-controller";

/// Key holding the module type discriminator in a fragment
pub const TYPE_KEY: &str = "type";
/// Binding value that disables a port's default binding
pub const BINDING_DISABLED: &str = "none";

/// Number of hardware PWM channels
pub const PWM_CHANNEL_COUNT: usize = 16;
pub const DEFAULT_PWM_RESOLUTION_BITS: u8 = 16;
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 500;

pub const DEFAULT_GAIN: f64 = 1.0;

pub const DEFAULT_MQTT_SERVER: &str = "localhost";
pub const DEFAULT_MQTT_PORT: u16 = 1883;
