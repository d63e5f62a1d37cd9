use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "saveit")]
#[command(about = "Parse web pages into readable documents and keep the ones worth saving")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of a SaveIt server to use instead of the local save file
    #[arg(long, global = true)]
    pub api: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a URL and print the extracted document
    Parse {
        url: String,

        /// Number of pages to follow through next-page links
        #[arg(short, long, default_value_t = 1)]
        depth: usize,

        /// Print a rendered HTML page instead of JSON
        #[arg(long)]
        html: bool,

        /// Save the document once parsed
        #[arg(long)]
        save: bool,
    },

    /// List saved documents
    Saves {
        #[arg(long)]
        html: bool,
    },

    /// Print one saved document
    Show {
        id: u64,

        #[arg(long)]
        html: bool,
    },

    /// Remove one saved document
    Remove { id: u64 },

    /// Remove every saved document
    RemoveAll,

    /// Render a content JSON file (or stdin) to an HTML page
    Render { file: Option<PathBuf> },
}
