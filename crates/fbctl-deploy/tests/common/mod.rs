//! Common test infrastructure for fbctl-deploy tests
//!
//! - `constants`: project identifiers shared across tests
//! - `mock_server`: wiremock helpers for the functions and secrets APIs

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod mock_server;

pub use constants::*;
pub use mock_server::*;
