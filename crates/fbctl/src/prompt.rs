//! Interactive prompts
//!
//! Every prompt falls back to its default when the session is not
//! interactive. Errors are plain `io::Error`s so library callbacks can
//! propagate them through their own error types.

use dialoguer::{Confirm, Input, Password};
use std::io;

fn io_error(err: dialoguer::Error) -> io::Error {
    io::Error::other(err)
}

/// Yes/no question; returns `default` without asking when not interactive
pub fn confirm(interactive: bool, message: &str, default: bool) -> io::Result<bool> {
    if !interactive {
        return Ok(default);
    }
    Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()
        .map_err(io_error)
}

/// Free text that must not be empty
pub fn input_non_empty(message: &str) -> io::Result<String> {
    Input::<String>::new()
        .with_prompt(message)
        .validate_with(|s: &String| -> Result<(), &str> {
            if s.trim().is_empty() {
                Err("Value must not be empty")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(io_error)
}

/// Hidden input
pub fn password(message: &str) -> io::Result<String> {
    Password::new()
        .with_prompt(message)
        .interact()
        .map_err(io_error)
}
