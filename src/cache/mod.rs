//! Incremental build cache.
//!
//! One JSON snapshot per project root records a content hash per file.
//! Every run re-derives an Added/Modified/Deleted/Unchanged classification
//! from that snapshot; only Added and Modified files re-enter the pipeline.
//! The snapshot is loaded once at the start of a run and written exactly
//! once at the end, so a crashed run leaves the previous cache intact.

use crate::core::{CodemaskError, CodemaskResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub const CACHE_FILE_NAME: &str = ".obfuscation_cache.json";

/// Bumped whenever the snapshot schema changes; a mismatch forces a full
/// rebuild rather than a decode attempt.
pub const CACHE_VERSION: u32 = 1;

const HASH_CHUNK_SIZE: usize = 8192;

/// Classification of one file relative to the previous run. Re-derived
/// every run; never a persisted state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeState {
    Added,
    Modified,
    Deleted,
    Unchanged,
}

/// Per-file snapshot entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub content_hash: String,
    pub modified_time: DateTime<Utc>,
    pub size: u64,
    pub last_checked: DateTime<Utc>,
    pub change_state: ChangeState,
}

/// Classification of the whole file set for one run
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub added: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub deleted: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.modified.is_empty() || !self.deleted.is_empty()
    }
}

/// The persisted snapshot: the only state kept between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncrementalCache {
    pub project_path: PathBuf,
    pub last_build_time: DateTime<Utc>,
    pub file_metadata: im::HashMap<PathBuf, FileMetadata>,
    pub total_files: usize,
    pub cache_version: u32,
}

impl IncrementalCache {
    /// Fresh cache for a project that has never been processed
    pub fn new(project_path: &Path) -> Self {
        Self {
            project_path: project_path.to_path_buf(),
            last_build_time: Utc::now(),
            file_metadata: im::HashMap::new(),
            total_files: 0,
            cache_version: CACHE_VERSION,
        }
    }

    pub fn cache_path(project_path: &Path) -> PathBuf {
        project_path.join(CACHE_FILE_NAME)
    }

    /// Load the snapshot for a project root. A missing, corrupt or
    /// undecodable cache file is treated as "no cache".
    pub fn load(project_path: &Path) -> Option<Self> {
        let path = Self::cache_path(project_path);
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str::<Self>(&contents) {
            Ok(cache) => Some(cache),
            Err(e) => {
                log::warn!("discarding corrupt cache {}: {e}", path.display());
                None
            }
        }
    }

    /// Load the snapshot, or start fresh when none is usable
    pub fn load_or_new(project_path: &Path) -> Self {
        Self::load(project_path).unwrap_or_else(|| Self::new(project_path))
    }

    /// Classify the current file set against the snapshot and return the
    /// files that must be reprocessed (Added + Modified) plus the full
    /// classification.
    ///
    /// A version mismatch or `force` classifies every file as Added and
    /// forces a full run.
    pub fn get_files_to_process(
        &self,
        all_files: &[PathBuf],
        force: bool,
    ) -> (Vec<PathBuf>, ChangeSet) {
        let mut changes = ChangeSet::default();

        if force || self.cache_version != CACHE_VERSION {
            changes.added = all_files.to_vec();
            return (all_files.to_vec(), changes);
        }

        let current: BTreeSet<&PathBuf> = all_files.iter().collect();

        for path in all_files {
            match self.file_metadata.get(path) {
                None => changes.added.push(path.clone()),
                Some(snapshot) => match hash_file(path) {
                    Ok(hash) if hash == snapshot.content_hash => {
                        changes.unchanged.push(path.clone())
                    }
                    Ok(_) => changes.modified.push(path.clone()),
                    Err(e) => {
                        // Unreadable now; let the pipeline surface the error.
                        log::warn!("failed to hash {}: {e}", path.display());
                        changes.modified.push(path.clone());
                    }
                },
            }
        }

        for path in self.file_metadata.keys() {
            if !current.contains(path) {
                changes.deleted.push(path.clone());
            }
        }

        let mut to_process = changes.added.clone();
        to_process.extend(changes.modified.iter().cloned());
        (to_process, changes)
    }

    /// Merge the outcome of a completed run into the snapshot and persist
    /// it. This is the single write of the cache lifecycle.
    pub fn finalize(
        &mut self,
        processed_files: &[PathBuf],
        deleted_files: &[PathBuf],
    ) -> CodemaskResult<()> {
        let now = Utc::now();

        for path in processed_files {
            match file_metadata(path, now) {
                Ok(metadata) => {
                    self.file_metadata.insert(path.clone(), metadata);
                }
                Err(e) => log::warn!("not caching {}: {e}", path.display()),
            }
        }

        for path in deleted_files {
            self.file_metadata.remove(path);
        }

        self.total_files = self.file_metadata.len();
        self.last_build_time = now;
        self.save()
    }

    fn save(&self) -> CodemaskResult<()> {
        let path = Self::cache_path(&self.project_path);
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CodemaskError::Cache(format!("failed to encode cache: {e}")))?;
        fs::write(&path, contents)
            .map_err(|e| CodemaskError::Cache(format!("failed to write {}: {e}", path.display())))
    }

    /// Remove the persisted snapshot for a project root
    pub fn clean(project_path: &Path) -> CodemaskResult<bool> {
        let path = Self::cache_path(project_path);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .map_err(|e| CodemaskError::Cache(format!("failed to remove {}: {e}", path.display())))?;
        Ok(true)
    }
}

/// SHA-256 of a file's contents, read in fixed-size chunks so arbitrarily
/// large files stay in bounded memory.
pub fn hash_file(path: &Path) -> CodemaskResult<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; HASH_CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn file_metadata(path: &Path, now: DateTime<Utc>) -> CodemaskResult<FileMetadata> {
    let metadata = fs::metadata(path)?;
    let modified_time = metadata
        .modified()
        .map(DateTime::from)
        .unwrap_or(now);
    Ok(FileMetadata {
        path: path.to_path_buf(),
        content_hash: hash_file(path)?,
        modified_time,
        size: metadata.len(),
        last_checked: now,
        change_state: ChangeState::Unchanged,
    })
}
