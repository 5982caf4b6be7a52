use anyhow::Result;
use clap::Parser;
use phototriage::triage_core::photo::stars;
use phototriage::triage_core::review::{Console, ReviewStart};
use phototriage::triage_core::{
    CheckpointStore, Cli, Commands, Config, JsonCheckpointStore, PhotoCatalog, PhotoLibrary,
    PhotoMover, RatingSource, ReviewSession,
};
use simplelog::{CombinedLogger, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::{self, File};
use std::io;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        simplelog::Config::default(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            simplelog::Config::default(),
            File::create("phototriage.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    let mut config = Config::load_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    let config = config.validate()?;

    let library = PhotoLibrary::new(&config);

    match cli.command {
        Commands::Folders => {
            for folder in library.list_folders()? {
                println!("{}", folder);
            }
        }

        Commands::Photos { folder } => {
            let photos = library.list_photos(&folder)?;
            if photos.is_empty() {
                println!("No photos in {}", folder);
            }
            for photo in photos {
                println!("{}", photo);
            }
        }

        Commands::Rating { folder, filename } => {
            // Fail loudly on a bad path; an unreadable rating is just "No rating".
            library.photo_path(&folder, &filename)?;
            match library.rating(&folder, &filename) {
                Some(rating) => println!("{} ({}/5)", stars(Some(rating)), rating),
                None => println!("No rating"),
            }
        }

        Commands::Fetch {
            folder,
            filename,
            dest,
        } => {
            let photo = library.read_photo(&folder, &filename)?;
            fs::write(&dest, &photo.bytes)?;
            println!(
                "Wrote {} bytes ({}) to {}",
                photo.bytes.len(),
                photo.content_type,
                dest.display()
            );
        }

        Commands::Reject { folder, filename } => {
            let dest = library.move_to_rejected(&folder, &filename)?;
            println!("Moved {}/{} to {}", folder, filename, dest.display());
        }

        Commands::Review { folder } => {
            let start = folder.map_or(ReviewStart::Menu, ReviewStart::Folder);
            run_review(&config, library, start)?;
        }

        Commands::Resume => {
            run_review(&config, library, ReviewStart::Resume)?;
        }

        Commands::Checkpoint { clear } => {
            let mut store = JsonCheckpointStore::new(&config.checkpoint_file);
            if clear {
                store.clear()?;
                println!("Saved review position cleared");
            } else {
                match store.load()? {
                    Some(checkpoint) => {
                        println!(
                            "{} / {} (photo {})",
                            checkpoint.folder,
                            checkpoint.filename,
                            checkpoint.position_hint + 1
                        );
                        if let Some(saved_at) = checkpoint.saved_at {
                            println!("  saved {}", saved_at);
                        }
                    }
                    None => println!("No saved review position"),
                }
            }
        }
    }

    Ok(())
}

fn run_review(config: &Config, library: PhotoLibrary, start: ReviewStart) -> Result<()> {
    let store = JsonCheckpointStore::new(&config.checkpoint_file);
    let mut session = ReviewSession::new(library, store, config.skip_threshold);

    let stdin = io::stdin();
    let stdout = io::stdout();
    Console::new(stdin.lock(), stdout.lock(), &config.photos_root)
        .with_viewer(config.viewer_command.clone())
        .run(&mut session, start)?;
    Ok(())
}
