//! CLI module - Command-line interface for Marquee
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Marquee - cached movie and TV discovery
#[derive(Parser)]
#[command(name = "marquee")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Run one search through the cache and print the response as JSON
    #[command(alias = "s")]
    Search {
        /// Parameters as key=value, e.g. media_type=movie start_date=2020-01-01
        #[arg(required = true)]
        params: Vec<String>,
    },

    /// Fetch genre lists from TMDB into the local catalog
    SyncGenres {
        /// movie or tv; both when omitted
        media_type: Option<String>,
    },

    /// Create default config file
    Init,
}

pub use commands::*;
