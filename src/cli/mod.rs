pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::PublicationKind;

#[derive(Parser)]
#[command(name = "panels")]
#[command(about = "Browse the comics, series, stories and events a character appears in", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/panels/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List characters
    Characters {
        /// Page to show, starting at 0
        #[arg(short, long, default_value_t = 0)]
        page: u32,
    },
    /// Show a character and a preview of what it appears in
    Character {
        /// Character id
        id: u64,
    },
    /// Page through one kind of publication for a character
    Feed {
        /// Character id
        id: u64,

        /// comics, series, stories or events (default from config)
        #[arg(short, long)]
        kind: Option<PublicationKind>,

        /// Pages to load, including the first (default from config)
        #[arg(short, long)]
        pages: Option<u32>,

        /// Prefetch thumbnails of the loaded items
        #[arg(long)]
        prefetch: bool,

        /// Save the first item's thumbnail to this path
        #[arg(long)]
        hero: Option<PathBuf>,
    },
}
