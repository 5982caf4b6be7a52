//! Interactive review on a terminal: a folder menu and a photo prompt
//! driving a [`ReviewSession`].

use crate::triage_core::checkpoint::CheckpointStore;
use crate::triage_core::error::{Result, TriageError};
use crate::triage_core::photo::DisplayedPhoto;
use crate::triage_core::session::{PhotoBackend, ReviewSession, Step};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command};

const PHOTO_PROMPT: &str = "[n]ext  [p]revious  [d]emote  [x] folders  [q]uit: ";
const MENU_PROMPT: &str = "Choose a folder number, [r]esume or [q]uit: ";

/// Where an interactive review begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewStart {
    Menu,
    Folder(String),
    Resume,
}

enum MenuChoice {
    Folder(String),
    Resume,
    Quit,
    Invalid,
}

pub struct Console<R, W> {
    input: R,
    out: W,
    photos_root: PathBuf,
    viewer: Option<String>,
    /// The viewer showing the current photo; replaced on every display.
    viewer_child: Option<Child>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W, photos_root: &Path) -> Self {
        Console {
            input,
            out,
            photos_root: photos_root.to_path_buf(),
            viewer: None,
            viewer_child: None,
        }
    }

    /// Launch `viewer` with the path of every displayed photo.
    pub fn with_viewer(mut self, viewer: Option<String>) -> Self {
        self.viewer = viewer;
        self
    }

    /// Run until the user quits or input ends. Quitting keeps the
    /// checkpoint; leaving a folder with `x` clears it.
    pub fn run<B: PhotoBackend, S: CheckpointStore>(
        &mut self,
        session: &mut ReviewSession<B, S>,
        start: ReviewStart,
    ) -> Result<()> {
        let mut current = match start {
            ReviewStart::Menu => None,
            ReviewStart::Folder(folder) => self.enter(session.start(&folder))?,
            ReviewStart::Resume => self.enter(session.resume_saved())?,
        };

        loop {
            let Some(photo) = current.take() else {
                current = match self.folder_menu(session)? {
                    MenuChoice::Folder(folder) => self.enter(session.start(&folder))?,
                    MenuChoice::Resume => self.enter(session.resume_saved())?,
                    MenuChoice::Quit => return Ok(()),
                    MenuChoice::Invalid => None,
                };
                continue;
            };

            self.show(&photo)?;
            let Some(choice) = self.prompt(PHOTO_PROMPT)? else {
                return Ok(());
            };

            let result = match choice.as_str() {
                "" | "n" => session.next(),
                "p" => session.previous(),
                "d" => session.reject(),
                "x" => {
                    session.exit()?;
                    continue;
                }
                "q" => return Ok(()),
                other => {
                    writeln!(self.out, "Unknown command '{}'", other)?;
                    current = Some(refreshed(session, photo));
                    continue;
                }
            };

            current = match result {
                Ok(step) => self.step(step)?,
                Err(e) if e.is_recoverable() => {
                    writeln!(self.out, "{}", e)?;
                    Some(refreshed(session, photo))
                }
                Err(e) => return Err(e),
            };
        }
    }

    /// Report the outcome of starting or resuming; failures send the user
    /// back to the folder menu.
    fn enter(&mut self, result: Result<Step>) -> Result<Option<DisplayedPhoto>> {
        match result {
            Ok(step) => self.step(step),
            Err(e @ TriageError::Io(_)) => Err(e),
            Err(e) => {
                log::warn!("{}", e);
                writeln!(self.out, "{}", e)?;
                Ok(None)
            }
        }
    }

    fn step(&mut self, step: Step) -> Result<Option<DisplayedPhoto>> {
        match step {
            Step::Displayed(photo) => Ok(Some(photo)),
            Step::Completed { folder } => {
                writeln!(self.out, "Finished reviewing '{}'", folder)?;
                Ok(None)
            }
        }
    }

    fn show(&mut self, photo: &DisplayedPhoto) -> Result<()> {
        let path = self.photos_root.join(&photo.folder).join(&photo.filename);
        writeln!(self.out, "\n{}", photo)?;
        writeln!(self.out, "  {}", path.display())?;

        self.close_viewer();
        if let Some(viewer) = &self.viewer {
            let mut parts = viewer.split_whitespace();
            if let Some(program) = parts.next() {
                match Command::new(program).args(parts).arg(&path).spawn() {
                    Ok(child) => self.viewer_child = Some(child),
                    Err(e) => log::warn!("Could not launch viewer '{}': {}", viewer, e),
                }
            }
        }
        Ok(())
    }

    fn folder_menu<B: PhotoBackend, S: CheckpointStore>(
        &mut self,
        session: &ReviewSession<B, S>,
    ) -> Result<MenuChoice> {
        let folders = session.backend().list_folders()?;
        let saved = session.saved_checkpoint();

        writeln!(self.out, "\nFolders:")?;
        if let Some(checkpoint) = &saved {
            writeln!(
                self.out,
                "  r) Resume: {} ({})",
                checkpoint.folder, checkpoint.filename
            )?;
        }
        for (i, folder) in folders.iter().enumerate() {
            writeln!(self.out, "  {}) {}", i + 1, folder)?;
        }
        if folders.is_empty() {
            writeln!(self.out, "  (no folders)")?;
        }

        let Some(choice) = self.prompt(MENU_PROMPT)? else {
            return Ok(MenuChoice::Quit);
        };

        let choice = match choice.as_str() {
            "q" => MenuChoice::Quit,
            "r" if saved.is_some() => MenuChoice::Resume,
            other => match other.parse::<usize>() {
                Ok(n) if (1..=folders.len()).contains(&n) => {
                    MenuChoice::Folder(folders[n - 1].clone())
                }
                _ => {
                    writeln!(self.out, "Unknown choice '{}'", other)?;
                    MenuChoice::Invalid
                }
            },
        };
        Ok(choice)
    }

    /// Print a prompt and read one trimmed, lowercased line. `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.out, "{}", prompt)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.out)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }
}

impl<R, W> Console<R, W> {
    /// Stop the viewer of the previous photo, if it is still open, and reap it.
    fn close_viewer(&mut self) {
        let Some(mut child) = self.viewer_child.take() else {
            return;
        };
        if let Ok(None) = child.try_wait() {
            if let Err(e) = child.kill() {
                log::debug!("Could not stop viewer {}: {}", child.id(), e);
            }
        }
        if let Err(e) = child.wait() {
            log::warn!("Could not reap viewer {}: {}", child.id(), e);
        }
    }
}

impl<R, W> Drop for Console<R, W> {
    fn drop(&mut self) {
        self.close_viewer();
    }
}

/// The same photo with its rating read again from disk.
fn refreshed<B: PhotoBackend, S: CheckpointStore>(
    session: &ReviewSession<B, S>,
    mut photo: DisplayedPhoto,
) -> DisplayedPhoto {
    photo.rating = session.backend().rating(&photo.folder, &photo.filename);
    photo
}
