//! Command-line interface for Merits
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Merits - Points Ledger & Shop
/// Track reward points and fulfill shop orders
#[derive(Parser)]
#[command(name = "merits")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    #[command(alias = "server")]
    Serve,

    /// Create default config file
    Init,

    /// Manage accounts
    #[command(alias = "accounts")]
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Inspect and fulfill shop orders
    Orders {
        #[command(subcommand)]
        command: OrderCommands,
    },

    /// Write CSV reports
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// List accounts, five per page
    #[command(alias = "ls")]
    List {
        /// Case-insensitive filter on name or login
        search: Option<String>,
        /// Page to show
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Create an account
    Create {
        /// Login name, must be unique
        username: String,
        /// Display name shown in listings and reports
        #[arg(long)]
        name: Option<String>,
        /// Role: user, supervisor or superadmin
        #[arg(long, default_value = "user")]
        role: String,
        /// Starting points balance
        #[arg(long, default_value = "1")]
        points: i64,
        /// Password; a random one is generated when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Adjust an account's points balance
    Points {
        /// Login of the account to adjust
        username: String,
        /// Operation: add, remove or set
        op: String,
        /// Point amount, must be positive
        amount: i64,
    },

    /// Delete an account
    #[command(alias = "rm")]
    Remove {
        /// Login of the account to delete
        username: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// List orders, newest first
    #[command(alias = "ls")]
    List {
        /// Include fulfilled orders
        #[arg(long)]
        all: bool,
    },

    /// Mark a pending order fulfilled
    Fulfill {
        /// Order ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Write the account roster CSV
    Users {
        /// Output path; defaults to users_<date>.csv
        #[arg(long)]
        output: Option<String>,
    },

    /// Write the order history CSV
    Orders {
        /// Output path; defaults to orders_<date>.csv
        #[arg(long)]
        output: Option<String>,
    },
}

pub use commands::*;
