//! hbg library - expose modules for testing
//!
//! The binary is a thin layer over [`generator::generate`] and the command
//! handlers in [`commands`].

pub mod commands;
pub mod common;
pub mod errors;
pub mod generator;

pub use common::GlobalOpts;
pub use hbg_logger as logger;
