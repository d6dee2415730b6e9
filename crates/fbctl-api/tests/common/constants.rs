//! Shared constants for test infrastructure

pub const PROJECT_ID: &str = "my-project";
pub const PROJECT_NUMBER: &str = "123456789";
pub const TEST_TOKEN: &str = "test-access-token";
