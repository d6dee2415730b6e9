//! CLI command implementations

pub mod database;
pub mod deploy;
pub mod emulators;
pub mod ext;
pub mod functions;
pub mod hosting;
