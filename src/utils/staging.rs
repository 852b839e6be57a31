use std::path::{Path, PathBuf};
use ulid::Ulid;

#[derive(Debug)]
pub enum Error {
    WriteFailed,
    DeleteFailed,
}

/// Local directory holding uploads between receipt and forwarding to the media host.
#[derive(Clone, Debug)]
pub struct TempStorage {
    dir: PathBuf,
}

fn sanitize_file_name(file_name: &str) -> Option<&str> {
    file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

impl TempStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies `source` into the staging directory under a name unique to this call.
    pub async fn write(&self, file_name: &str, source: &Path) -> Result<PathBuf, Error> {
        let file_name = sanitize_file_name(file_name).unwrap_or("upload");
        let path = self.dir.join(format!("{}-{}", Ulid::new(), file_name));

        tokio::fs::create_dir_all(&self.dir).await.map_err(|err| {
            tracing::error!(
                "Failed to create staging directory {}: {:?}",
                self.dir.display(),
                err
            );
            Error::WriteFailed
        })?;

        tokio::fs::copy(source, &path).await.map_err(|err| {
            tracing::error!("Failed to stage file {}: {:?}", path.display(), err);
            Error::WriteFailed
        })?;

        tracing::debug!("Staged {}", path.display());

        Ok(path)
    }

    pub async fn delete(&self, path: &Path) -> Result<(), Error> {
        match tokio::fs::remove_file(path).await {
            Ok(_) => {
                tracing::debug!("Deleted staged file {}", path.display());
                Ok(())
            }
            Err(err) => {
                tracing::error!("Failed to delete staged file {}: {:?}", path.display(), err);
                Err(Error::DeleteFailed)
            }
        }
    }
}
