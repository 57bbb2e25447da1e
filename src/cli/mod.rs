//! CLI module - Command-line interface for Learning Log
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Learning Log - keep track of what you are learning
#[derive(Parser)]
#[command(name = "learning-log")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server (default)
    #[command(alias = "web", alias = "runserver")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Manage user accounts
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List all registered users
    #[command(alias = "ls")]
    List,

    /// Delete a user together with their topics and entries
    #[command(alias = "rm")]
    Delete {
        /// Username to delete
        username: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

pub use commands::*;
