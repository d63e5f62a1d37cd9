use crate::content::{ParsedDocument, SaveEntry, SaveId, SaveReceipt};
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const SAVED_MESSAGE: &str = "Content saved successfully";
pub const ALREADY_SAVED_MESSAGE: &str = "Content already saved";

/// Saved documents, kept as a JSON array in one file.
///
/// The file and its parent directories are created on first use.
#[derive(Debug, Clone)]
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn list(&self) -> Result<Vec<SaveEntry>> {
        if !self.path.exists() {
            ::log::debug!("Creating save file {}", self.path.display());
            self.write(&[])?;
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn get(&self, id: SaveId) -> Result<SaveEntry> {
        self.list()?
            .into_iter()
            .find(|entry| entry.id == id)
            .ok_or(Error::NotFound(id))
    }

    /// Save a document under the next free id. A document whose url is
    /// already saved is not stored twice; the existing id is returned.
    pub fn save(&self, document: ParsedDocument) -> Result<SaveReceipt> {
        if document.url.trim().is_empty() {
            return Err(Error::MissingField("URL"));
        }

        let mut entries = self.list()?;
        if let Some(existing) = entries.iter().find(|entry| entry.url == document.url) {
            ::log::debug!("{} is already saved as {}", document.url, existing.id);
            return Ok(SaveReceipt {
                id: existing.id,
                message: ALREADY_SAVED_MESSAGE.to_string(),
            });
        }

        let id = SaveId(entries.iter().map(|entry| entry.id.0).max().unwrap_or(0) + 1);
        ::log::info!("Saving {} as {}", document.url, id);
        entries.push(SaveEntry::from_document(id, document));
        self.write(&entries)?;

        Ok(SaveReceipt {
            id,
            message: SAVED_MESSAGE.to_string(),
        })
    }

    pub fn remove(&self, id: SaveId) -> Result<()> {
        let mut entries = self.list()?;
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(Error::NotFound(id));
        }

        ::log::info!("Removed save {}", id);
        self.write(&entries)
    }

    /// Remove every saved document
    pub fn clear(&self) -> Result<()> {
        ::log::info!("Removing all saves from {}", self.path.display());
        self.write(&[])
    }

    fn write(&self, entries: &[SaveEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(entries)?)?;
        Ok(())
    }
}
