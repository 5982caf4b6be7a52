use crate::triage_core::config::Config;
use clap::{Parser, Subcommand};
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Triage dated photo folders: keep, skip or demote one photo at a time")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable file logging to phototriage.log
    #[arg(long = "log", global = true)]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug, global = true)]
    pub log_level: LevelFilter,

    /// Configuration file (defaults to the standard config location)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Root of the active photo collection
    #[arg(long, global = true)]
    pub photos_root: Option<PathBuf>,

    /// Root of the rejected photo collection
    #[arg(long, global = true)]
    pub rejected_root: Option<PathBuf>,

    /// Photos rated at or above this are skipped when moving forward
    #[arg(long, global = true)]
    pub skip_threshold: Option<u8>,

    /// File holding the resumable session checkpoint
    #[arg(long, global = true)]
    pub checkpoint_file: Option<PathBuf>,
}

impl Cli {
    /// Command-line flags take precedence over the config file.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(root) = &self.photos_root {
            config.photos_root = root.clone();
        }
        if let Some(root) = &self.rejected_root {
            config.rejected_root = root.clone();
        }
        if let Some(threshold) = self.skip_threshold {
            config.skip_threshold = threshold;
        }
        if let Some(file) = &self.checkpoint_file {
            config.checkpoint_file = file.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the folders available for review
    Folders,

    /// List the photos in a folder, in review order
    Photos {
        /// Folder name under the photos root
        #[arg(required = true)]
        folder: String,
    },

    /// Show the star rating embedded in a photo
    Rating {
        #[arg(required = true)]
        folder: String,

        #[arg(required = true)]
        filename: String,
    },

    /// Copy a photo's bytes to a destination file
    Fetch {
        #[arg(required = true)]
        folder: String,

        #[arg(required = true)]
        filename: String,

        /// Where to write the photo
        #[arg(required = true)]
        dest: PathBuf,
    },

    /// Move a photo to the rejected collection
    Reject {
        #[arg(required = true)]
        folder: String,

        #[arg(required = true)]
        filename: String,
    },

    /// Review photos interactively.
    ///
    /// Moving forward skips photos already rated at or above the skip
    /// threshold; moving back shows every photo. Demoting a photo moves it
    /// to the rejected collection. Quitting keeps your place so the next run
    /// can resume.
    Review {
        /// Folder to start with (opens the folder menu when omitted)
        folder: Option<String>,
    },

    /// Resume the last interrupted review
    Resume,

    /// Show the saved review position
    Checkpoint {
        /// Discard the saved position instead
        #[arg(long)]
        clear: bool,
    },
}
