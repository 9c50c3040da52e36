//! Model Store - versioned snapshots and the published pointer
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/models/<version>.json   one snapshot per trained model
//! <root>/CURRENT                 version id of the published model
//! ```
//!
//! Every file is written to a temp file, fsynced, then renamed over the
//! target. A crash mid-write leaves at worst a stray temp file; `CURRENT`
//! always names a complete snapshot.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::snapshot;
use crate::error::{BidAnomalyError, Result};
use crate::logic::model::EnsembleModel;

const MODELS_DIR: &str = "models";
const CURRENT_FILE: &str = "CURRENT";
const SNAPSHOT_EXT: &str = "json";
const TMP_MARKER: &str = ".tmp-";

pub struct ModelStore {
    root: PathBuf,
    current: RwLock<Option<Arc<EnsembleModel>>>,
    /// Serializes publishers; readers never take it
    publish_lock: Mutex<()>,
}

impl ModelStore {
    /// Open (or create) a store and restore the published model
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(MODELS_DIR))?;

        let store = Self {
            root,
            current: RwLock::new(None),
            publish_lock: Mutex::new(()),
        };
        store.remove_stale_temp_files();

        if let Some(version) = store.read_current_pointer()? {
            match store.load(&version).and_then(|m| {
                snapshot::check_compatible(&m)?;
                Ok(m)
            }) {
                Ok(model) => {
                    log::info!("Restored published model {}", version);
                    *store.current.write() = Some(Arc::new(model));
                }
                Err(e) => {
                    log::error!("Published model {} cannot be restored: {}", version, e);
                }
            }
        } else {
            log::info!("Model store at {:?} has no published model", store.root);
        }

        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist a snapshot (not yet published); returns its version id
    pub fn save(&self, model: &EnsembleModel) -> Result<String> {
        let version = model.version_id().to_string();
        let path = self.snapshot_path(&version)?;
        let bytes = snapshot::encode(model)?;

        write_atomic(&path, &bytes)?;
        log::debug!("Saved snapshot {} ({} bytes)", version, bytes.len());
        Ok(version)
    }

    /// Load and verify a snapshot
    pub fn load(&self, version: &str) -> Result<EnsembleModel> {
        let path = self.snapshot_path(version)?;
        let bytes = fs::read(&path)?;
        snapshot::decode(version, &bytes)
    }

    /// Make `version` the model served to every subsequent reader.
    ///
    /// The snapshot is re-read and verified first; a corrupt or incompatible
    /// snapshot is refused and the previous model stays published.
    pub fn publish(&self, version: &str) -> Result<Arc<EnsembleModel>> {
        let _guard = self.publish_lock.lock();

        let model = self.load(version)?;
        snapshot::check_compatible(&model)?;

        write_atomic(&self.root.join(CURRENT_FILE), version.as_bytes())?;

        let model = Arc::new(model);
        let previous = self.current.write().replace(Arc::clone(&model));

        log::info!(
            "Published model {} (previous: {})",
            version,
            previous.as_ref().map(|m| m.version_id()).unwrap_or("none")
        );
        Ok(model)
    }

    /// Save then publish in one step
    pub fn save_and_publish(&self, model: &EnsembleModel) -> Result<Arc<EnsembleModel>> {
        let version = self.save(model)?;
        self.publish(&version)
    }

    /// The published model (a consistent snapshot for the caller's lifetime)
    pub fn current(&self) -> Result<Arc<EnsembleModel>> {
        self.current
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(BidAnomalyError::ModelUnavailable)
    }

    pub fn current_version(&self) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .map(|m| m.version_id().to_string())
    }

    /// All saved snapshot versions, oldest first
    pub fn list_versions(&self) -> Result<Vec<String>> {
        let mut versions = Vec::new();
        for entry in fs::read_dir(self.root.join(MODELS_DIR))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXT) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_valid_version(stem) {
                    versions.push(stem.to_string());
                }
            }
        }
        versions.sort();
        Ok(versions)
    }

    // ------------------------------------------------------------------------

    fn snapshot_path(&self, version: &str) -> Result<PathBuf> {
        if !is_valid_version(version) {
            return Err(BidAnomalyError::Storage(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid model version id {:?}", version),
            )));
        }
        Ok(self
            .root
            .join(MODELS_DIR)
            .join(format!("{}.{}", version, SNAPSHOT_EXT)))
    }

    fn read_current_pointer(&self) -> Result<Option<String>> {
        match fs::read_to_string(self.root.join(CURRENT_FILE)) {
            Ok(content) => {
                let version = content.trim();
                Ok((!version.is_empty()).then(|| version.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Leftovers of interrupted writes
    fn remove_stale_temp_files(&self) {
        for dir in [self.root.clone(), self.root.join(MODELS_DIR)] {
            let Ok(entries) = fs::read_dir(&dir) else { continue };
            for entry in entries.flatten() {
                let name = entry.file_name();
                if name.to_string_lossy().contains(TMP_MARKER) {
                    log::warn!("Removing interrupted write {:?}", entry.path());
                    let _ = fs::remove_file(entry.path());
                }
            }
        }
    }
}

/// Version ids are file names: ASCII alphanumerics, '-' and '_' only
fn is_valid_version(version: &str) -> bool {
    !version.is_empty()
        && version
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// temp file → fsync → rename → fsync parent
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = dir.join(format!(
        "{}{}{}",
        file_name,
        TMP_MARKER,
        uuid::Uuid::new_v4().simple()
    ));

    let result = (|| {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
        return result;
    }

    // Directory fsync makes the rename durable (not supported everywhere)
    if let Ok(d) = File::open(dir) {
        let _ = d.sync_all();
    }
    Ok(())
}
