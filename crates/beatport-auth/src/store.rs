//! Persistence for the token record
//!
//! `TokenStore` is the seam between the manager and wherever the record
//! lives. `FileTokenStore` keeps it in one JSON file and re-reads that file on
//! every load, so edits made by another process are picked up. Writes go
//! through a temp file + rename so a crash mid-write never leaves a truncated
//! record. There is no cross-process locking.
//!
//! `MemoryTokenStore` holds the record in memory, for tests and for callers
//! that do not want anything on disk.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::record::TokenRecord;

/// Load/save access to the single persisted token record.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn TokenStore>`).
pub trait TokenStore: Send + Sync {
    /// The stored record, or `None` if nothing has been stored yet.
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Option<TokenRecord>>> + Send + '_>>;

    /// Replace the stored record wholesale.
    fn save<'a>(
        &'a self,
        record: &'a TokenRecord,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Token record kept in a JSON file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Option<TokenRecord>>> + Send + '_>> {
        Box::pin(async move {
            let contents = match tokio::fs::read_to_string(&self.path).await {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %self.path.display(), "no token file");
                    return Ok(None);
                }
                Err(e) => {
                    return Err(Error::Store(format!(
                        "reading token file {}: {e}",
                        self.path.display()
                    )));
                }
            };

            let record = serde_json::from_str::<TokenRecord>(&contents).map_err(|e| {
                Error::Store(format!("parsing token file {}: {e}", self.path.display()))
            })?;
            Ok(Some(record))
        })
    }

    fn save<'a>(
        &'a self,
        record: &'a TokenRecord,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(write_atomic(&self.path, record))
    }
}

/// Token record held in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<TokenRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: TokenRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Pin<Box<dyn Future<Output = Result<Option<TokenRecord>>> + Send + '_>> {
        Box::pin(async move { Ok(self.record.lock().await.clone()) })
    }

    fn save<'a>(
        &'a self,
        record: &'a TokenRecord,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            *self.record.lock().await = Some(record.clone());
            Ok(())
        })
    }
}

/// Write the record to a file atomically.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. Sets permissions to 0600 (owner read/write only) since the
/// file holds bearer and refresh tokens.
async fn write_atomic(path: &Path, record: &TokenRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)
        .map_err(|e| Error::Store(format!("serializing token record: {e}")))?;

    // A bare file name has an empty parent; that means the working directory.
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::Store(format!("creating token directory: {e}")))?;

    let tmp_path = dir.join(format!(".beatport_token.tmp.{}", std::process::id()));

    if let Err(e) = replace_with_temp(&tmp_path, path, json.as_bytes()).await {
        // Best effort; the write error is what the caller needs.
        if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
            debug!(path = %tmp_path.display(), error = %cleanup, "temp token file not removed");
        }
        return Err(e);
    }

    debug!(path = %path.display(), "persisted token record");
    Ok(())
}

async fn replace_with_temp(tmp_path: &Path, path: &Path, contents: &[u8]) -> Result<()> {
    tokio::fs::write(tmp_path, contents)
        .await
        .map_err(|e| Error::Store(format!("writing temp token file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(tmp_path, perms)
            .await
            .map_err(|e| Error::Store(format!("setting token file permissions: {e}")))?;
    }

    tokio::fs::rename(tmp_path, path)
        .await
        .map_err(|e| Error::Store(format!("renaming temp token file: {e}")))
}
