//! Media file picker
//!
//! Lists directories first, then files, skipping hidden entries. The
//! image/video filter is only a convenience: it can be switched off and the
//! picker hands back whatever file the user chooses.

use std::path::{Path, PathBuf};

use crate::media::is_media_file;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserEntry {
    pub name: String,
    pub is_dir: bool,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    /// Stayed in the picker (moved into a directory, or nothing selected)
    Browsing,
    /// A file was chosen
    Picked(PathBuf),
}

#[derive(Debug, Clone)]
pub struct FileBrowser {
    pub path: PathBuf,
    pub entries: Vec<BrowserEntry>,
    pub selected: usize,
    pub media_only: bool,
}

impl FileBrowser {
    pub fn new(start: impl Into<PathBuf>) -> Self {
        let mut browser = Self {
            path: start.into(),
            entries: Vec::new(),
            selected: 0,
            media_only: true,
        };
        browser.refresh();
        browser
    }

    pub fn refresh(&mut self) {
        self.entries.clear();

        // Add parent directory entry if not at root
        if let Some(parent) = self.path.parent() {
            self.entries.push(BrowserEntry {
                name: "..".to_string(),
                is_dir: true,
                path: parent.to_path_buf(),
            });
        }

        match std::fs::read_dir(&self.path) {
            Ok(entries) => {
                let mut dirs: Vec<BrowserEntry> = Vec::new();
                let mut files: Vec<BrowserEntry> = Vec::new();

                for entry in entries.flatten() {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().to_string();

                    // Skip hidden files
                    if name.starts_with('.') {
                        continue;
                    }

                    if path.is_dir() {
                        dirs.push(BrowserEntry { name, is_dir: true, path });
                    } else if !self.media_only || is_media_file(&path) {
                        files.push(BrowserEntry { name, is_dir: false, path });
                    }
                }

                // Sort alphabetically
                dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                files.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

                self.entries.extend(dirs);
                self.entries.extend(files);
            }
            Err(e) => tracing::warn!("Cannot list {}: {}", self.path.display(), e),
        }

        if self.selected >= self.entries.len() {
            self.selected = 0;
        }
    }

    pub fn move_down(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    pub fn move_up(&mut self) {
        if !self.entries.is_empty() {
            self.selected = self.selected.checked_sub(1)
                .unwrap_or(self.entries.len() - 1);
        }
    }

    /// Open the selected directory or pick the selected file
    pub fn activate(&mut self) -> PickOutcome {
        match self.entries.get(self.selected).cloned() {
            Some(entry) if entry.is_dir => {
                self.cd(entry.path);
                PickOutcome::Browsing
            }
            Some(entry) => PickOutcome::Picked(entry.path),
            None => PickOutcome::Browsing,
        }
    }

    pub fn go_parent(&mut self) {
        if let Some(parent) = self.path.parent().map(Path::to_path_buf) {
            self.cd(parent);
        }
    }

    pub fn go_home(&mut self) {
        self.cd(dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")));
    }

    pub fn toggle_filter(&mut self) {
        self.media_only = !self.media_only;
        self.refresh();
    }

    fn cd(&mut self, path: PathBuf) {
        self.path = path;
        self.selected = 0;
        self.refresh();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Vacation")).unwrap();
        std::fs::create_dir(dir.path().join("archive")).unwrap();
        std::fs::write(dir.path().join("beach.JPG"), b"").unwrap();
        std::fs::write(dir.path().join("Clip.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();
        std::fs::write(dir.path().join(".hidden.png"), b"").unwrap();
        dir
    }

    fn names(browser: &FileBrowser) -> Vec<&str> {
        browser.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_lists_dirs_then_media() {
        let dir = fixture();
        let browser = FileBrowser::new(dir.path());

        assert_eq!(names(&browser), ["..", "archive", "Vacation", "beach.JPG", "Clip.mp4"]);
    }

    #[test]
    fn test_filter_is_advisory() {
        let dir = fixture();
        let mut browser = FileBrowser::new(dir.path());
        browser.toggle_filter();

        assert!(names(&browser).contains(&"notes.txt"));

        browser.selected = browser.entries.iter().position(|e| e.name == "notes.txt").unwrap();
        assert_eq!(browser.activate(), PickOutcome::Picked(dir.path().join("notes.txt")));
    }

    #[test]
    fn test_navigation() {
        let dir = fixture();
        let mut browser = FileBrowser::new(dir.path());

        browser.move_up();
        assert_eq!(browser.selected, browser.entries.len() - 1);
        browser.move_down();
        assert_eq!(browser.selected, 0);

        browser.selected = 2; // Vacation
        assert_eq!(browser.activate(), PickOutcome::Browsing);
        assert_eq!(browser.path, dir.path().join("Vacation"));
        assert_eq!(names(&browser), [".."]);

        browser.go_parent();
        assert_eq!(browser.path, dir.path());
    }
}
