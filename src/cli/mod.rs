//! CLI module for the document parsing gateway
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `parse`: parse a local file once and print the result

pub mod parse;
pub mod serve;

use clap::{Parser, Subcommand};

/// Document parsing gateway - upload a PDF or image, get heading-delimited chunks back
#[derive(Parser)]
#[command(name = "docview-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Parse a local document and print the rendered chunks
    Parse(parse::ParseArgs),
}
