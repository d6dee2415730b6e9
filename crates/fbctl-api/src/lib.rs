//! # fbctl-api
//!
//! REST clients for the remote management APIs used by fbctl:
//! - A shared JSON client with bearer auth and Google-style error decoding
//! - FireData and the Realtime Database management API
//! - Firebase projects and Hosting sites
//! - Secret Manager, Cloud Storage, IAM and Resource Manager
//! - Cloud Functions (v1) and long-running operation polling

pub mod client;
pub mod database;
pub mod error;
pub mod firedata;
pub mod functions;
pub mod hosting;
pub mod iam;
pub mod operations;
pub mod projects;
pub mod resource_manager;
pub mod secret_manager;
pub mod storage;

pub use client::{ApiClient, ApiRequest, ApiResponse, ClientOptions, RawResponse};
pub use error::{ApiError, Result};
pub use operations::{Operation, PollOptions};
