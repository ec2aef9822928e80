//! tfm: terminal file manager
//!
//! This library provides the file operations behind the `tfm` binary.
//! Each operation is recorded in an append-only operation log.

pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod error;
pub mod init;
pub mod logger;
pub mod ops;
pub mod path_checker;
pub mod remover;
pub mod shell;
