pub mod catalog;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod mover;
pub mod photo;
pub mod rating;
pub mod review;
pub mod session;

pub use catalog::PhotoCatalog;
pub use checkpoint::{Checkpoint, CheckpointStore, JsonCheckpointStore};
pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::{Result, TriageError};
pub use library::PhotoLibrary;
pub use mover::PhotoMover;
pub use photo::{DisplayedPhoto, PhotoData};
pub use rating::{RatingSource, extract_rating};
pub use session::{PhotoBackend, ReviewSession, SessionState, Step};
