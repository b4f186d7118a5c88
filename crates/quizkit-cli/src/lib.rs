//! Command-line editor for quizkit workspaces.
//!
//! The binary is a thin shell: [`cli`] parses arguments, [`settings`] and
//! [`logging`] set up the environment, and [`commands::run`] performs one
//! editing operation against a directory workspace.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod settings;
