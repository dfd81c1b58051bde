//! Media attachments and their previews
//!
//! An attachment is accepted as-is: the declared MIME type comes from the file
//! extension and only decides how the preview is drawn. Previews live in a
//! [`PreviewStore`] and are addressed by handle, so the composer can revoke
//! them when the attachment is replaced, removed or torn down.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Declared type for files with an unknown extension
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// Extensions offered by the picker's (advisory) media filter
const MIME_TABLE: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
    ("heic", "image/heic"),
    ("mp4", "video/mp4"),
    ("m4v", "video/x-m4v"),
    ("mov", "video/quicktime"),
    ("webm", "video/webm"),
    ("mkv", "video/x-matroska"),
    ("avi", "video/x-msvideo"),
];

/// Declared MIME type for a path, based on its extension
pub fn declared_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext {
        Some(ext) => MIME_TABLE
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, mime)| *mime)
            .unwrap_or(UNKNOWN_MIME),
        None => UNKNOWN_MIME,
    }
}

/// Whether the picker's media filter would list this file
pub fn is_media_file(path: &Path) -> bool {
    let mime = declared_mime(path);
    mime.starts_with("image/") || mime.starts_with("video/")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// `image*` is an image, anything else is shown as video
    pub fn from_mime(mime: &str) -> Self {
        if mime.starts_with("image") {
            MediaKind::Image
        } else {
            MediaKind::Video
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAttachment {
    pub path: PathBuf,
    pub name: String,
    pub mime: String,
    pub size: Option<u64>,
}

impl MediaAttachment {
    /// Describe the file at `path`; never rejects a file
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let size = std::fs::metadata(&path).ok().map(|m| m.len());

        Self {
            mime: declared_mime(&path).to_string(),
            path,
            name,
            size,
        }
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::from_mime(&self.mime)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(u64);

/// Display data derived from an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub kind: MediaKind,
    pub name: String,
    pub mime: String,
    pub size: Option<u64>,
    pub dimensions: Option<(u32, u32)>,
}

/// Owner of live preview resources
#[derive(Debug, Default)]
pub struct PreviewStore {
    next_id: u64,
    live: HashMap<PreviewId, Preview>,
}

impl PreviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, media: &MediaAttachment) -> PreviewId {
        self.next_id += 1;
        let id = PreviewId(self.next_id);

        let dimensions = match media.kind() {
            MediaKind::Image => image_size(&media.path),
            MediaKind::Video => None,
        };

        self.live.insert(id, Preview {
            kind: media.kind(),
            name: media.name.clone(),
            mime: media.mime.clone(),
            size: media.size,
            dimensions,
        });
        tracing::debug!(preview = id.0, file = %media.name, "Preview created");
        id
    }

    pub fn get(&self, id: PreviewId) -> Option<&Preview> {
        self.live.get(&id)
    }

    /// Release a preview; returns false if it was already gone
    pub fn revoke(&mut self, id: PreviewId) -> bool {
        let removed = self.live.remove(&id).is_some();
        if removed {
            tracing::debug!(preview = id.0, "Preview revoked");
        }
        removed
    }

    pub fn revoke_all(&mut self) {
        if !self.live.is_empty() {
            tracing::debug!(count = self.live.len(), "Revoking all previews");
        }
        self.live.clear();
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl Drop for PreviewStore {
    fn drop(&mut self) {
        self.revoke_all();
    }
}

/// Width and height from the image header; `None` for undecodable files
fn image_size(path: &Path) -> Option<(u32, u32)> {
    match image::image_dimensions(path) {
        Ok(dims) => Some(dims),
        Err(e) => {
            tracing::debug!(path = %path.display(), "No image dimensions: {}", e);
            None
        }
    }
}

/// Human-readable byte count ("1.5 MiB")
pub fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    const GIB: u64 = MIB * 1024;

    if bytes >= GIB {
        format!("{:.1} GiB", bytes as f64 / GIB as f64)
    } else if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_image(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(w, h).save(&path).unwrap();
        path
    }

    #[test]
    fn test_declared_mime() {
        assert_eq!(declared_mime(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(declared_mime(Path::new("clip.webm")), "video/webm");
        assert_eq!(declared_mime(Path::new("notes.txt")), UNKNOWN_MIME);
        assert_eq!(declared_mime(Path::new("Makefile")), UNKNOWN_MIME);
        assert!(is_media_file(Path::new("x.gif")));
        assert!(!is_media_file(Path::new("x.pdf")));
    }

    #[test]
    fn test_kind_by_prefix() {
        assert_eq!(MediaKind::from_mime("image/png"), MediaKind::Image);
        assert_eq!(MediaKind::from_mime("video/mp4"), MediaKind::Video);
        // Anything that is not an image is shown as video
        assert_eq!(MediaKind::from_mime(UNKNOWN_MIME), MediaKind::Video);
    }

    #[test]
    fn test_attachment_accepts_any_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let media = MediaAttachment::from_path(&path);

        assert_eq!(media.name, "report.pdf");
        assert_eq!(media.size, Some(8));
        assert_eq!(media.kind(), MediaKind::Video);
    }

    #[test]
    fn test_preview_reads_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_image(dir.path(), "shot.png", 640, 480);

        let mut store = PreviewStore::new();
        let id = store.create(&MediaAttachment::from_path(&path));
        let preview = store.get(id).unwrap();

        assert_eq!(preview.kind, MediaKind::Image);
        assert_eq!(preview.dimensions, Some((640, 480)));
    }

    #[test]
    fn test_preview_dimensions_beyond_png() {
        let dir = tempfile::tempdir().unwrap();
        let jpeg = write_image(dir.path(), "photo.jpg", 640, 480);
        let gif = write_image(dir.path(), "loop.gif", 320, 240);
        let bmp = write_image(dir.path(), "icon.bmp", 16, 9);

        let mut store = PreviewStore::new();
        for (path, dims) in [(jpeg, (640, 480)), (gif, (320, 240)), (bmp, (16, 9))] {
            let id = store.create(&MediaAttachment::from_path(&path));
            assert_eq!(store.get(id).unwrap().dimensions, Some(dims), "{}", path.display());
        }
    }

    #[test]
    fn test_preview_of_broken_image_has_no_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"garbage").unwrap();

        let mut store = PreviewStore::new();
        let id = store.create(&MediaAttachment::from_path(&path));
        let preview = store.get(id).unwrap();

        // Still attached and shown as an image, just without a size line
        assert_eq!(preview.kind, MediaKind::Image);
        assert_eq!(preview.dimensions, None);
    }

    #[test]
    fn test_revoke() {
        let mut store = PreviewStore::new();
        let media = MediaAttachment::from_path("/nonexistent/clip.mp4");
        let a = store.create(&media);
        let b = store.create(&media);

        assert_ne!(a, b);
        assert_eq!(store.live_count(), 2);
        assert!(store.revoke(a));
        assert!(!store.revoke(a));
        assert!(store.get(a).is_none());
        store.revoke_all();
        assert_eq!(store.live_count(), 0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KiB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MiB");
    }
}
