//! Command handlers.

pub mod export;
pub mod import;
pub mod init;
pub mod serve;
pub mod stats;
