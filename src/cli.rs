use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "playwatch",
    version,
    about = "Headless video playback controller: replay traces and inspect stored watch state"
)]
pub struct Cli {
    /// Database file (overrides PLAYWATCH_DB and the config file).
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Config file (overrides PLAYWATCH_CONFIG).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Drive the controller with a scripted JSON trace.
    Replay {
        trace: PathBuf,
        /// Keep all state in memory instead of the database.
        #[arg(long)]
        dry_run: bool,
        /// Post counted views to this backend base URL.
        #[arg(long, value_name = "URL")]
        report_url: Option<String>,
    },
    /// List stored resume positions.
    Positions,
    /// List last-viewed marks.
    Views,
    /// Delete stored state for one video.
    Forget { video_id: String },
    /// Evaluate the view-eligibility rule.
    Check {
        #[arg(long)]
        duration: f64,
        #[arg(long)]
        watched: f64,
    },
    Tui,
}
