//! Durable publication of extracted archive members
//!
//! After extraction the working directory holds the archive's full content;
//! only the payload members matter — `.mmdb` databases from tarballs, `.csv`
//! tables from zip archives. Members are published flat under
//! `{edition_id}/{version}/{filename}`, dropping whatever directory nesting
//! the vendor wrapped them in.

use crate::error::{Error, Result};
use crate::storage::ObjectStore;
use crate::types::{ArchiveFormat, EditionId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Copies payload members from the working directory into the object store
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
}

impl Publisher {
    /// Create a publisher over an object store
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    /// Publish every payload member found under `work` and return how many
    /// were written.
    ///
    /// Members are selected by the format's payload extension and uploaded in
    /// filename order. A mid-batch failure leaves the already-published
    /// objects in place; the version marker is only advanced by the caller
    /// after the whole batch succeeds, so a later run re-publishes the full
    /// set.
    pub async fn publish(
        &self,
        work: &Path,
        edition: &EditionId,
        version: &str,
        format: ArchiveFormat,
    ) -> Result<usize> {
        let members = collect_members(work, format.member_extension()).map_err(|e| {
            Error::Publish {
                key: format!("{edition}/{version}"),
                reason: format!("failed to scan working directory: {e}"),
            }
        })?;

        if members.is_empty() {
            return Err(Error::Publish {
                key: format!("{edition}/{version}"),
                reason: format!(
                    "archive contained no .{} members",
                    format.member_extension()
                ),
            });
        }

        for member in &members {
            let filename = member
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| Error::Publish {
                    key: format!("{edition}/{version}"),
                    reason: format!("member has non-UTF-8 filename: {}", member.display()),
                })?;
            let key = format!("{edition}/{version}/{filename}");
            self.store
                .put_file(&key, member)
                .await
                .map_err(|e| Error::Publish {
                    key: key.clone(),
                    reason: e.to_string(),
                })?;
            info!(edition = %edition, version, key = %key, "published member");
        }

        Ok(members.len())
    }
}

/// Walk `root` and collect files carrying `extension`, sorted by filename so
/// publication order is deterministic.
fn collect_members(root: &Path, extension: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut members = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some(extension) {
                members.push(path);
            }
        }
    }
    members.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(members)
}
