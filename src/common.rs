pub mod error;
pub mod serde_utils;
