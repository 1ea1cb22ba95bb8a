//! Photo gallery of a customer booking.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// File name used when a photo URL has no usable last segment.
pub const FALLBACK_FILE_NAME: &str = "image";

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("no photo to download")]
    Empty,

    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("download failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to write photo: {0}")]
    Io(#[from] std::io::Error),
}

/// Browsable list of photo URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoGallery {
    photos: Vec<Url>,
    index: usize,
    original_size: bool,
}

impl PhotoGallery {
    pub fn new(photos: Vec<Url>) -> Self {
        Self {
            photos,
            index: 0,
            original_size: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Url> {
        self.photos.get(self.index)
    }

    /// Move forward, wrapping around. No-op with fewer than two photos.
    pub fn next(&mut self) {
        if self.photos.len() > 1 {
            self.index = (self.index + 1) % self.photos.len();
        }
    }

    /// Move backward, wrapping around. No-op with fewer than two photos.
    pub fn previous(&mut self) {
        if self.photos.len() > 1 {
            self.index = (self.index + self.photos.len() - 1) % self.photos.len();
        }
    }

    pub fn is_original_size(&self) -> bool {
        self.original_size
    }

    pub fn toggle_original_size(&mut self) -> bool {
        self.original_size = !self.original_size;
        self.original_size
    }

    /// Position as `n / m`, or `None` when there are no photos.
    pub fn counter(&self) -> Option<String> {
        (!self.is_empty()).then(|| format!("{} / {}", self.index + 1, self.photos.len()))
    }

    /// Download the current photo into `dir` and return the written path.
    pub async fn download_current(
        &self,
        http: &reqwest::Client,
        dir: &Path,
    ) -> Result<PathBuf, GalleryError> {
        let url = self.current().ok_or(GalleryError::Empty)?;
        debug!(%url, "Downloading photo");

        let resp = http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(GalleryError::Status(status));
        }
        let bytes = resp.bytes().await?;

        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name(url));
        tokio::fs::write(&path, &bytes).await?;

        info!(%url, path = %path.display(), size = bytes.len(), "Photo downloaded");
        Ok(path)
    }
}

/// Last path segment of `url`, or [`FALLBACK_FILE_NAME`].
pub fn file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(FALLBACK_FILE_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn urls(names: &[&str]) -> Vec<Url> {
        names
            .iter()
            .map(|n| Url::parse(&format!("https://cdn.example.com/mot/{n}")).unwrap())
            .collect()
    }

    #[test]
    fn test_navigation_wraps() {
        let mut gallery = PhotoGallery::new(urls(&["a.jpg", "b.jpg", "c.jpg"]));
        assert_eq!(gallery.counter().as_deref(), Some("1 / 3"));

        gallery.previous();
        assert_eq!(gallery.index(), 2);
        gallery.next();
        assert_eq!(gallery.index(), 0);
        gallery.next();
        assert_eq!(gallery.counter().as_deref(), Some("2 / 3"));
    }

    #[test]
    fn test_single_and_empty_gallery() {
        let mut single = PhotoGallery::new(urls(&["a.jpg"]));
        single.next();
        single.previous();
        assert_eq!(single.index(), 0);

        let empty = PhotoGallery::new(Vec::new());
        assert!(empty.current().is_none());
        assert!(empty.counter().is_none());
    }

    #[test]
    fn test_toggle_original_size() {
        let mut gallery = PhotoGallery::new(urls(&["a.jpg"]));
        assert!(gallery.toggle_original_size());
        assert!(!gallery.toggle_original_size());
    }

    #[test]
    fn test_file_name() {
        let url = Url::parse("https://cdn.example.com/mot/front.jpg?v=2").unwrap();
        assert_eq!(file_name(&url), "front.jpg");

        let url = Url::parse("https://cdn.example.com/mot/").unwrap();
        assert_eq!(file_name(&url), FALLBACK_FILE_NAME);

        let url = Url::parse("https://cdn.example.com").unwrap();
        assert_eq!(file_name(&url), FALLBACK_FILE_NAME);
    }

    #[tokio::test]
    async fn test_download_current() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/mot/rear.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
            .mount(&server)
            .await;

        let photo = Url::parse(&format!("{}/mot/rear.jpg", server.uri())).unwrap();
        let gallery = PhotoGallery::new(vec![photo]);
        let dir = tempfile::tempdir().unwrap();

        let written = gallery
            .download_current(&reqwest::Client::new(), dir.path())
            .await
            .unwrap();
        assert_eq!(written, dir.path().join("rear.jpg"));
        assert_eq!(std::fs::read(written).unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn test_download_failure_status() {
        let server = MockServer::start().await;
        let photo = Url::parse(&format!("{}/mot/missing.jpg", server.uri())).unwrap();
        let gallery = PhotoGallery::new(vec![photo]);
        let dir = tempfile::tempdir().unwrap();

        let err = gallery
            .download_current(&reqwest::Client::new(), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Status(s) if s.as_u16() == 404));
    }
}
