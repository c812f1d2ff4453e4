//! Per-request scratch files for generated documents.
//!
//! Each request writes its PDF to a file named after its own request id and
//! reads it back before responding. Files are removed when the handle drops,
//! including on the error paths, so nothing accumulates in the scratch dir.

use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the scratch directory if it does not exist yet.
    pub fn ensure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    /// Writes `bytes` to `resume-<request_id>.pdf`, reads the file back and
    /// deletes it. Returns what was read from disk.
    pub async fn persist_and_read(
        &self,
        request_id: Uuid,
        bytes: &[u8],
    ) -> std::io::Result<Vec<u8>> {
        let root = self.root.clone();
        let bytes = bytes.to_vec();

        tokio::task::spawn_blocking(move || round_trip(&root, request_id, &bytes))
            .await
            .map_err(std::io::Error::other)?
    }
}

fn round_trip(root: &Path, request_id: Uuid, bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("resume-{request_id}"))
        .suffix(".pdf")
        .rand_bytes(0)
        .tempfile_in(root)?;

    file.write_all(bytes)?;
    file.flush()?;
    debug!(request_id = %request_id, path = %file.path().display(), "Wrote scratch PDF");

    let handle = file.as_file_mut();
    handle.seek(SeekFrom::Start(0))?;
    let mut read_back = Vec::with_capacity(bytes.len());
    handle.read_to_end(&mut read_back)?;

    // `file` drops here and removes the path.
    Ok(read_back)
}
