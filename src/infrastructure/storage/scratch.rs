use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tracing::{error, info, warn};
use uuid::Uuid;

const GIB: u64 = 1024 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to prepare storage area {path}: {source}")]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage area {path} is not writable: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to query free space of {path}: {source}")]
    FreeSpace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("insufficient disk space: {free} bytes free, {required} bytes required")]
    InsufficientSpace { free: u64, required: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiskSpace {
    pub total: u64,
    /// Available to unprivileged users (`f_bavail`).
    pub free: u64,
    /// Blocks in use (`f_blocks - f_bfree`); root-reserved blocks count as
    /// neither used nor free.
    pub used: u64,
}

impl DiskSpace {
    pub fn from_blocks(
        fragment: u64,
        blocks: u64,
        blocks_free: u64,
        blocks_available: u64,
    ) -> Self {
        Self {
            total: blocks.saturating_mul(fragment),
            free: blocks_available.saturating_mul(fragment),
            used: blocks.saturating_sub(blocks_free).saturating_mul(fragment),
        }
    }
}

/// Shared scratch directory holding the artifacts of in-flight requests.
///
/// Created once at startup. Anything already inside is left over from a run
/// that did not shut down cleanly and is purged before the first request.
#[derive(Clone, Debug)]
pub struct StorageArea {
    root: Arc<PathBuf>,
}

impl StorageArea {
    pub async fn init(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();

        fs::create_dir_all(&root)
            .await
            .map_err(|source| StorageError::Prepare {
                path: root.clone(),
                source,
            })?;

        let purged = purge_entries(&root).await?;
        if purged > 0 {
            warn!("Purged {} stale entries from {}", purged, root.display());
        }

        check_writable(&root).await?;

        info!("Initialized temporary directory: {}", root.display());
        Ok(Self {
            root: Arc::new(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    #[cfg(unix)]
    pub fn disk_space(&self) -> Result<DiskSpace, StorageError> {
        let stat = nix::sys::statvfs::statvfs(self.root.as_path()).map_err(|errno| {
            StorageError::FreeSpace {
                path: self.root.to_path_buf(),
                source: std::io::Error::from(errno),
            }
        })?;

        Ok(DiskSpace::from_blocks(
            stat.fragment_size() as u64,
            stat.blocks() as u64,
            stat.blocks_free() as u64,
            stat.blocks_available() as u64,
        ))
    }

    #[cfg(not(unix))]
    pub fn disk_space(&self) -> Result<DiskSpace, StorageError> {
        Err(StorageError::FreeSpace {
            path: self.root.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::Unsupported),
        })
    }

    /// Logs the current free space and refuses admission only when
    /// `min_free` is non-zero and not met. A failed query never blocks.
    pub fn check_space(&self, min_free: u64) -> Result<(), StorageError> {
        let space = match self.disk_space() {
            Ok(space) => space,
            Err(e) => {
                error!("Error checking disk space: {}", e);
                return Ok(());
            }
        };

        info!("Available disk space: {}GB", space.free / GIB);

        if space.free < space.used {
            warn!(
                "Low disk space: {}GB free, {}GB used",
                space.free / GIB,
                space.used / GIB
            );
        }

        if min_free > 0 && space.free < min_free {
            return Err(StorageError::InsufficientSpace {
                free: space.free,
                required: min_free,
            });
        }

        Ok(())
    }
}

async fn purge_entries(root: &Path) -> Result<usize, StorageError> {
    let mut entries = fs::read_dir(root)
        .await
        .map_err(|source| StorageError::Prepare {
            path: root.to_path_buf(),
            source,
        })?;

    let mut purged = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(source) => {
                return Err(StorageError::Prepare {
                    path: root.to_path_buf(),
                    source,
                });
            }
        };

        let path = entry.path();
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        let removed = if is_dir {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };

        match removed {
            Ok(()) => purged += 1,
            Err(e) => error!("Error purging stale entry {}: {}", path.display(), e),
        }
    }

    Ok(purged)
}

async fn check_writable(root: &Path) -> Result<(), StorageError> {
    let marker = root.join(format!(".write_check_{}", Uuid::new_v4()));
    let not_writable = |source| StorageError::NotWritable {
        path: root.to_path_buf(),
        source,
    };

    fs::write(&marker, b"").await.map_err(not_writable)?;
    fs::remove_file(&marker).await.map_err(not_writable)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn init_creates_missing_directory() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("scratch");

        let storage = StorageArea::init(&root).await.unwrap();

        assert!(root.is_dir());
        assert_eq!(storage.root(), root.as_path());
        assert_eq!(storage.path_for("a.mp4"), root.join("a.mp4"));
    }

    #[tokio::test]
    async fn init_purges_stale_entries() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("scratch");
        std::fs::create_dir_all(root.join("leftover_dir")).unwrap();
        std::fs::write(root.join("video_stale.mp4"), b"old").unwrap();
        std::fs::write(root.join("leftover_dir/nested"), b"old").unwrap();

        StorageArea::init(&root).await.unwrap();

        assert!(root.is_dir());
        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 0);
    }

    #[test]
    fn used_excludes_reserved_blocks() {
        // 1000 blocks, 300 free of which 250 are available to non-root.
        let space = DiskSpace::from_blocks(4096, 1000, 300, 250);

        assert_eq!(space.total, 1000 * 4096);
        assert_eq!(space.free, 250 * 4096);
        assert_eq!(space.used, 700 * 4096);
        assert!(space.used + space.free < space.total);
    }

    #[test]
    fn bogus_block_counts_do_not_overflow() {
        let space = DiskSpace::from_blocks(u64::MAX, 2, 5, 1);

        assert_eq!(space.used, 0);
        assert_eq!(space.total, u64::MAX);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn reports_space_of_the_storage_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageArea::init(dir.path()).await.unwrap();

        let space = storage.disk_space().unwrap();
        assert!(space.total > 0);
        assert!(space.free <= space.total);
        assert!(space.used <= space.total);
    }

    #[tokio::test]
    async fn advisory_check_never_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageArea::init(dir.path()).await.unwrap();

        assert!(storage.check_space(0).is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn enforced_check_rejects_when_below_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageArea::init(dir.path()).await.unwrap();

        let err = storage.check_space(u64::MAX).unwrap_err();
        assert!(matches!(err, StorageError::InsufficientSpace { .. }));
    }
}
