//! Type definitions for fbctl runtime configuration

mod runtime_config;

pub use runtime_config::*;
