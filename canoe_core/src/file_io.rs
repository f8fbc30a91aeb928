//! # File I/O Module
//!
//! Reading and writing model files:
//! - **Atomic saves**: write to `.tmp`, sync, rename over the target
//! - **File locking**: keep two sessions from editing the same model
//! - **Validation on load**: schema version first, then every model invariant
//!
//! Lock files sit next to the model as `<name>.canoe.lock` and record who
//! holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use canoe_core::canoe::Canoe;
//! use canoe_core::file_io::{load_model, save_model, FileLock};
//! use canoe_core::model::CanoeModel;
//! use std::path::Path;
//!
//! let model = CanoeModel::new("Design Team", "Shark Bait", Canoe::default());
//! let path = Path::new("shark_bait.canoe");
//!
//! let lock = FileLock::acquire(path, "team@example.com").unwrap();
//! save_model(&model, path).unwrap();
//! drop(lock);
//!
//! let loaded = load_model(path).unwrap();
//! assert_eq!(loaded.meta.id, model.meta.id);
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::{CanoeError, CanoeResult};
use crate::model::{CanoeModel, SCHEMA_VERSION};

/// Locks older than this are taken over regardless of owner
const STALE_LOCK_HOURS: i64 = 24;

/// Contents of a `.lock` file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a model file, released on drop.
///
/// Holds an OS-level lock (fs2) on the `.lock` file and writes [`LockInfo`]
/// into it so other users can see who has the model open.
pub struct FileLock {
    model_path: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire the lock for the model at `path`.
    ///
    /// Fails with `FileLocked` when a live lock is held by someone else.
    /// Stale locks (owner process gone, or older than a day) are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CanoeResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = FileLock::check(path) {
            return Err(CanoeError::file_locked(
                path.display().to_string(),
                format!("{} ({})", existing.user_id, existing.machine),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| CanoeError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CanoeError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(|e| CanoeError::serialization(e.to_string()))?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| CanoeError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;
        lock_file
            .sync_all()
            .map_err(|e| CanoeError::file_error("sync lock", lock_path.display().to_string(), e.to_string()))?;

        debug!("Locked {} for {}", path.display(), info.user_id);
        Ok(FileLock {
            model_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock on `path`, if anyone. Stale locks count as free.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if !lock_path.exists() {
            return None;
        }
        read_lock_info(&lock_path).ok().filter(|info| !is_lock_stale(info))
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // The OS lock goes with _lock_file
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `model.canoe` -> `model.canoe.lock`
fn lock_path_for(model_path: &Path) -> PathBuf {
    let mut lock_path = model_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// `model.canoe` -> `model.canoe.tmp`
fn tmp_path_for(model_path: &Path) -> PathBuf {
    let mut tmp_path = model_path.to_path_buf();
    let extension = tmp_path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

fn read_to_string(path: &Path, operation: &str) -> CanoeResult<String> {
    let mut file =
        File::open(path).map_err(|e| CanoeError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CanoeError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

fn read_lock_info(lock_path: &Path) -> CanoeResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(|e| CanoeError::serialization(e.to_string()))
}

/// A lock is stale when its process is gone from this machine or it is
/// older than [`STALE_LOCK_HOURS`].
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().as_deref() == Some(info.machine.as_str()) {
        #[cfg(windows)]
        {
            use std::process::Command;
            let output = Command::new("tasklist")
                .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                .output();
            if let Ok(output) = output {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if stdout.contains("No tasks") || !stdout.contains(&info.pid.to_string()) {
                    return true;
                }
            }
        }
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }

    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

/// Save a model with atomic write semantics.
///
/// The model is validated first so an invalid model never reaches disk. The
/// JSON is written to `<path>.tmp`, synced, then renamed over `path`.
pub fn save_model(model: &CanoeModel, path: &Path) -> CanoeResult<()> {
    model.validate()?;
    let json = serde_json::to_string_pretty(model).map_err(|e| CanoeError::serialization(e.to_string()))?;

    let tmp_path = tmp_path_for(path);
    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CanoeError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| CanoeError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;
    tmp_file
        .sync_all()
        .map_err(|e| CanoeError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CanoeError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    info!("Saved model '{}' to {}", model.meta.name, path.display());
    Ok(())
}

/// Load a model and check it.
///
/// # Errors
///
/// - `FileError` when the file cannot be read
/// - `SerializationError` for malformed JSON, or for data that breaks a
///   construction rule (the reason carries the rule)
/// - `VersionMismatch` for an incompatible schema version
/// - `InvalidInput` when the settings do not fit the canoe
pub fn load_model(path: &Path) -> CanoeResult<CanoeModel> {
    let contents = read_to_string(path, "read")?;

    // Check the version before the full parse so a newer file reports a
    // version problem rather than a confusing field error
    let header: VersionHeader = serde_json::from_str(&contents)
        .map_err(|e| CanoeError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;
    validate_version(&header.meta.version)?;

    let model: CanoeModel = serde_json::from_str(&contents)
        .map_err(|e| CanoeError::serialization(format!("Invalid model in {}: {}", path.display(), e)))?;
    model.validate()?;

    debug!("Loaded model '{}' ({} loads)", model.meta.name, model.canoe.loads().len());
    Ok(model)
}

/// Load a model and report whether someone else holds its lock.
pub fn load_model_with_lock_check(path: &Path) -> CanoeResult<(CanoeModel, Option<LockInfo>)> {
    let model = load_model(path)?;
    let lock_info = FileLock::check(path);
    Ok((model, lock_info))
}

#[derive(Deserialize)]
struct VersionHeader {
    meta: VersionMeta,
}

#[derive(Deserialize)]
struct VersionMeta {
    version: String,
}

/// Major versions must match; within 0.x a newer minor is refused.
pub fn validate_version(file_version: &str) -> CanoeResult<()> {
    let mismatch = || CanoeError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };

    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);
    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }
    Ok(())
}
