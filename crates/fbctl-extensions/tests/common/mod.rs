//! Common test utilities for fbctl-extensions
//!
//! - Constants shared by the tests
//! - Local extension directory fixtures
//! - Mock server helpers for the publisher and registry APIs

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod constants;
pub mod fixtures;
pub mod mock_server;

pub use constants::*;
pub use fixtures::*;
pub use mock_server::*;
