//! Seen-URL store backed by a line-delimited text file.
//!
//! The file holds one absolute URL per line, sorted ascending. It is read in
//! full at the start of every cycle and rewritten in full when the cycle
//! discovered at least one new URL. Cycles never overlap, so no locking is
//! done.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read seen URLs from {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write seen URLs to {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// In-memory set of URLs already processed.
///
/// Backed by a `BTreeSet` so iteration, and therefore the persisted file,
/// is always in ascending order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeenUrls(BTreeSet<String>);

impl SeenUrls {
    pub fn contains(&self, url: &str) -> bool {
        self.0.contains(url)
    }

    /// Returns `true` if the URL was not present before.
    pub fn insert(&mut self, url: &str) -> bool {
        self.0.insert(url.to_string())
    }

    pub fn remove(&mut self, url: &str) -> bool {
        self.0.remove(url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the on-disk representation. Blank lines are ignored.
    pub fn parse(contents: &str) -> Self {
        Self(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Render the on-disk representation: sorted, one URL per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for url in &self.0 {
            out.push_str(url);
            out.push('\n');
        }
        out
    }
}

impl<S: Into<String>> FromIterator<S> for SeenUrls {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Location of the seen-URL file.
#[derive(Debug, Clone)]
pub struct SeenUrlStore {
    path: PathBuf,
}

impl SeenUrlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the seen set.
    ///
    /// Each non-blank line is one URL; surrounding whitespace is trimmed.
    ///
    /// # Returns
    ///
    /// The stored set, or an empty one when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// [`StoreError::Read`] for any other I/O failure, such as a permission
    /// error or a path that is a directory.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = SeenUrlStore::new("seen_urls.txt");
    /// let mut seen = store.load().await?;
    /// ```
    #[instrument(level = "debug", skip_all, fields(path = %self.path().display()))]
    pub async fn load(&self) -> Result<SeenUrls, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let seen = SeenUrls::parse(&contents);
                debug!(count = seen.len(), "Loaded seen URLs");
                Ok(seen)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No seen-URL file yet; starting empty");
                Ok(SeenUrls::default())
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Overwrite the file with the full, sorted set.
    ///
    /// # Arguments
    ///
    /// * `seen` - Every URL seen so far; written one per line in sorted order
    ///
    /// # Errors
    ///
    /// [`StoreError::Write`] if the file cannot be written.
    ///
    /// # Example
    ///
    /// ```ignore
    /// seen.insert(&article.url);
    /// store.save(&seen).await?;
    /// ```
    #[instrument(level = "debug", skip_all, fields(path = %self.path().display()))]
    pub async fn save(&self, seen: &SeenUrls) -> Result<(), StoreError> {
        fs::write(&self.path, seen.render())
            .await
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })?;
        info!(count = seen.len(), "Persisted seen URLs");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = SeenUrlStore::new(dir.path().join("seen_urls.txt"));
        let seen = store.load().await.unwrap();
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_set_and_sorts_file() {
        let dir = tempdir().unwrap();
        let store = SeenUrlStore::new(dir.path().join("seen_urls.txt"));
        let seen: SeenUrls = [
            "https://example.com/c",
            "https://example.com/a",
            "https://example.com/b",
        ]
        .into_iter()
        .collect();

        store.save(&seen).await.unwrap();
        let reloaded = store.load().await.unwrap();
        assert_eq!(reloaded, seen);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            raw,
            "https://example.com/a\nhttps://example.com/b\nhttps://example.com/c\n"
        );
    }

    #[test]
    fn test_parse_ignores_blank_lines_and_whitespace() {
        let seen = SeenUrls::parse("  https://example.com/a  \n\n\nhttps://example.com/b\n");
        assert_eq!(seen.len(), 2);
        assert!(seen.contains("https://example.com/a"));
        assert!(seen.contains("https://example.com/b"));
    }

    #[test]
    fn test_insert_reports_novelty() {
        let mut seen = SeenUrls::default();
        assert!(seen.insert("https://example.com/a"));
        assert!(!seen.insert("https://example.com/a"));
        assert!(seen.remove("https://example.com/a"));
        assert!(seen.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_path_is_an_error() {
        let dir = tempdir().unwrap();
        // A directory cannot be read as a file.
        let store = SeenUrlStore::new(dir.path());
        assert!(matches!(store.load().await, Err(StoreError::Read { .. })));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let store = SeenUrlStore::new(dir.path().join("missing").join("seen_urls.txt"));
        let seen: SeenUrls = ["https://example.com/a".to_string()].into_iter().collect();
        assert!(matches!(store.save(&seen).await, Err(StoreError::Write { .. })));
    }
}
