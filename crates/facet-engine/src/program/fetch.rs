use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Retrieves shader source text by location.
///
/// A failed fetch reports `Error::Fetch` with the location and a status text.
pub trait SourceFetcher {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<String>>;
}

/// Reads sources relative to a root directory.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceFetcher for FileFetcher {
    async fn fetch(&self, location: &str) -> Result<String> {
        let path = self.root.join(location);
        log::debug!("fetching shader source {}", path.display());

        tokio::fs::read_to_string(&path).await.map_err(|e| Error::Fetch {
            location: location.to_owned(),
            status: status_text(&e),
        })
    }
}

fn status_text(e: &io::Error) -> String {
    match e.kind() {
        io::ErrorKind::NotFound => "404 Not Found".to_owned(),
        io::ErrorKind::PermissionDenied => "403 Forbidden".to_owned(),
        _ => e.to_string(),
    }
}

/// In-memory source table.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    sources: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, location: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(location, source);
        self
    }

    pub fn insert(&mut self, location: impl Into<String>, source: impl Into<String>) {
        self.sources.insert(location.into(), source.into());
    }
}

impl SourceFetcher for StaticFetcher {
    async fn fetch(&self, location: &str) -> Result<String> {
        self.sources.get(location).cloned().ok_or_else(|| Error::Fetch {
            location: location.to_owned(),
            status: "404 Not Found".to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_fetcher_serves_table() {
        let fetcher = StaticFetcher::new().with("a.wgsl", "source");
        assert_eq!(fetcher.fetch("a.wgsl").await.unwrap(), "source");

        match fetcher.fetch("b.wgsl").await.unwrap_err() {
            Error::Fetch { location, status } => {
                assert_eq!(location, "b.wgsl");
                assert_eq!(status, "404 Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn file_fetcher_reads_under_root() {
        let dir = std::env::temp_dir().join(format!("facet-fetch-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("flat.wgsl"), "// flat").unwrap();

        let fetcher = FileFetcher::new(&dir);
        assert_eq!(fetcher.fetch("flat.wgsl").await.unwrap(), "// flat");
        assert!(matches!(
            fetcher.fetch("missing.wgsl").await,
            Err(Error::Fetch { status, .. }) if status == "404 Not Found"
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
