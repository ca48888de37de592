//! Workshop document use-case service.
//!
//! # Responsibility
//! - Load the persisted document through the sanitizer at startup.
//! - Apply wholesale collection replacements and persist after each one.
//! - Run user-supplied backup files through the import pipeline.
//! - Share the `[[Title]]` cross-reference scan between viewers and export.
//!
//! # Invariants
//! - An absent slot is indistinguishable from `raw = null`: empty document,
//!   one reported issue.
//! - A stored payload that is not valid JSON is cleared and treated as
//!   absent; user imports with invalid JSON are rejected instead.
//! - Every mutation persists the full document (last write wins).
//!
//! # See also
//! - docs/architecture/persistence.md

use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use crate::model::entities::{Article, Character, Plot, Project, WorkshopData, World};
use crate::sanitize::sanitize;
use crate::store::state_store::{StateStore, StoreError};

static CROSS_REFERENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[(.*?)\]\]").expect("valid cross-reference regex"));

/// Service error for workshop document use-cases.
#[derive(Debug)]
pub enum WorkshopServiceError {
    /// Imported payload is not syntactically valid JSON. Surfaced to the
    /// user as a blocking error, never silently recovered.
    InvalidJson(serde_json::Error),
    /// Import file does not look like a JSON file.
    UnsupportedFile(PathBuf),
    /// Import file could not be read.
    Io(std::io::Error),
    /// The in-memory document failed to serialize for persistence.
    Serialize(serde_json::Error),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for WorkshopServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "invalid JSON in imported file: {err}"),
            Self::UnsupportedFile(path) => {
                write!(f, "unsupported file type, expected .json: {}", path.display())
            }
            Self::Io(err) => write!(f, "failed to read import file: {err}"),
            Self::Serialize(err) => write!(f, "failed to serialize document: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkshopServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) | Self::Serialize(err) => Some(err),
            Self::UnsupportedFile(_) => None,
            Self::Io(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for WorkshopServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// What the load path had to do to produce a usable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Structural repairs performed by the sanitizer.
    pub issues_found: u32,
    /// True when a stored payload was unparseable and had to be discarded.
    pub recovered_from_corruption: bool,
}

/// Facade over the sanitizer and the persistence slot.
pub struct WorkshopService<S: StateStore> {
    store: S,
    data: WorkshopData,
}

impl<S: StateStore> WorkshopService<S> {
    /// Loads whatever the slot holds and repairs it into a usable document.
    ///
    /// The slot is not written back here; persistence happens on the first
    /// mutation, as in the original application.
    pub fn load(store: S) -> Result<(Self, LoadReport), WorkshopServiceError> {
        let (raw, recovered) = match store.load_raw()? {
            None => (Value::Null, false),
            Some(payload) => match serde_json::from_str::<Value>(&payload) {
                Ok(value) => (value, false),
                Err(err) => {
                    warn!(
                        "event=slot_load module=service status=recovered error_code=corrupt_payload error={err}"
                    );
                    store.clear()?;
                    (Value::Null, true)
                }
            },
        };

        let outcome = sanitize(&raw);
        info!(
            "event=slot_load module=service status=ok issues={} recovered={recovered}",
            outcome.issues_found
        );

        Ok((
            Self {
                store,
                data: outcome.data,
            },
            LoadReport {
                issues_found: outcome.issues_found,
                recovered_from_corruption: recovered,
            },
        ))
    }

    /// Read access for presentation and export consumers.
    pub fn data(&self) -> &WorkshopData {
        &self.data
    }

    /// Replaces the character collection wholesale and persists.
    pub fn replace_characters(
        &mut self,
        characters: Vec<Character>,
    ) -> Result<(), WorkshopServiceError> {
        self.data.characters = characters;
        self.persist()
    }

    /// Replaces the plot collection wholesale and persists.
    pub fn replace_plots(&mut self, plots: Vec<Plot>) -> Result<(), WorkshopServiceError> {
        self.data.plots = plots;
        self.persist()
    }

    /// Replaces the world collection (including owned articles) and persists.
    pub fn replace_worlds(&mut self, worlds: Vec<World>) -> Result<(), WorkshopServiceError> {
        self.data.worlds = worlds;
        self.persist()
    }

    /// Replaces the project collection wholesale and persists.
    pub fn replace_projects(
        &mut self,
        projects: Vec<Project>,
    ) -> Result<(), WorkshopServiceError> {
        self.data.projects = projects;
        self.persist()
    }

    /// Imports a user-supplied backup payload.
    ///
    /// Syntactically invalid JSON is a hard error; structurally broken but
    /// parseable documents are repaired and the issue count returned for the
    /// "N integrity issues were fixed" summary.
    pub fn import_payload(&mut self, payload: &str) -> Result<u32, WorkshopServiceError> {
        let raw =
            serde_json::from_str::<Value>(payload).map_err(WorkshopServiceError::InvalidJson)?;
        let outcome = sanitize(&raw);
        self.data = outcome.data;
        self.persist()?;
        info!(
            "event=import module=service status=ok issues={}",
            outcome.issues_found
        );
        Ok(outcome.issues_found)
    }

    /// Imports a backup file, rejecting anything that does not claim to be
    /// JSON before its contents are even read.
    pub fn import_file(&mut self, path: &Path) -> Result<u32, WorkshopServiceError> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !is_json {
            return Err(WorkshopServiceError::UnsupportedFile(path.to_path_buf()));
        }

        let payload = std::fs::read_to_string(path).map_err(WorkshopServiceError::Io)?;
        self.import_payload(&payload)
    }

    fn persist(&self) -> Result<(), WorkshopServiceError> {
        let payload =
            serde_json::to_string(&self.data).map_err(WorkshopServiceError::Serialize)?;
        self.store.save_raw(&payload)?;
        Ok(())
    }
}

/// Extracts `[[Title]]` cross-reference markers from rich-text content,
/// in order of appearance.
pub fn extract_cross_references(content: &str) -> Vec<&str> {
    CROSS_REFERENCE_RE
        .captures_iter(content)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Resolves a cross-reference marker to an article by case-insensitive
/// title match, the way viewers render `[[Title]]` links.
pub fn resolve_cross_reference<'data>(
    data: &'data WorkshopData,
    title: &str,
) -> Option<&'data Article> {
    let needle = title.to_lowercase();
    data.all_articles()
        .find(|article| article.title.to_lowercase() == needle)
}
