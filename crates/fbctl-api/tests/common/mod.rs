//! Common test infrastructure for fbctl-api tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::*;
//! ```
//!
//! - `constants`: project ids and names shared across tests
//! - `mock_server`: wiremock setup helpers for Google-style APIs

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod mock_server;

pub use constants::*;
pub use mock_server::*;
