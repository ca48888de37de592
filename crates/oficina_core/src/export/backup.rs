//! Backup file writer.
//!
//! # Responsibility
//! - Re-serialize the current document verbatim into a date-stamped file.
//!
//! # Invariants
//! - The backup is pretty-printed JSON of the document, nothing more; a
//!   backup fed back through import round-trips with zero issues.
//!
//! # See also
//! - docs/architecture/export.md

use chrono::Local;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::model::entities::WorkshopData;

const BACKUP_BASENAME: &str = "oficina-do-escritor_backup";

#[derive(Debug)]
pub enum BackupError {
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialize(err) => write!(f, "failed to serialize backup: {err}"),
            Self::Io(err) => write!(f, "failed to write backup file: {err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

/// Returns the backup filename for the given date stamp.
pub fn backup_file_name(date_stamp: &str) -> String {
    format!("{BACKUP_BASENAME}_{date_stamp}.json")
}

/// Writes a date-stamped backup of `data` into `dir` and returns its path.
pub fn write_backup(data: &WorkshopData, dir: &Path) -> Result<PathBuf, BackupError> {
    let payload = serde_json::to_string_pretty(data).map_err(BackupError::Serialize)?;
    let file_name = backup_file_name(&Local::now().format("%Y-%m-%d").to_string());
    let path = dir.join(file_name);

    std::fs::write(&path, payload).map_err(BackupError::Io)?;
    info!(
        "event=backup_write module=export status=ok path={}",
        path.display()
    );
    Ok(path)
}
