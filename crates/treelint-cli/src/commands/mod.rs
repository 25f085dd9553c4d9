//! Subcommand implementations.

pub mod check;
pub mod dump_ast;
pub mod init;
pub mod list_checks;
pub mod output;
