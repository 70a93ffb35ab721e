// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Module implementations for the model controller.
//!
//! Every module is created from its configuration fragment through the
//! [`ModuleFactory`], which dispatches on the fragment's `type` field.
//!
//! # Available Modules
//!
//! ## Local
//! In-process signal blocks:
//! - **gain**: scales its input by a constant
//! - **sequence**: plays configured modes wrapped in on/off transitions
//!
//! ## Hardware
//! - **pwm**: drives a PWM channel from a 0-100 % input
//!
//! ## Network
//! - **mqtt**: namespace whose ports map onto messaging topics
//!
//! # Architecture
//!
//! ```text
//! Configuration fragment → ModuleFactory → module node + ports → Graph
//! ```
//!
//! Each module inserts its own node, creates its ports under it, and
//! finally installs itself as the node body. Removing the node drops the
//! module together with its ports and periodic tasks.
//!
//! # Example
//!
//! ```rust
//! use model_controller::backends::ModuleFactory;
//! use model_controller::config::Settings;
//! use model_controller::engine::Graph;
//! use serde_json::json;
//!
//! let graph = Graph::new(Settings::default());
//! let fragment = json!({"type": "gain", "gain": 2.0});
//! let id = ModuleFactory::create_module(
//!     &graph,
//!     graph.root(),
//!     "Gain1",
//!     "gain",
//!     fragment.as_object().unwrap(),
//! );
//! assert!(id.is_ok());
//! ```

pub mod factory;
pub mod hardware;
pub mod local;
pub mod network;

pub use factory::{module_node, ModuleFactory};
