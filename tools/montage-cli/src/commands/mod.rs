//! CLI subcommand implementations.

pub mod bake;
pub mod export;
pub mod info;
pub mod init;
pub mod validate;
