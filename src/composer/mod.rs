//! Draft state and the submit flow
//!
//! The composer owns everything the user edits: platform selection, caption,
//! the optional attachment (and its preview) and the post mode. Submitting
//! either rejects an empty draft untouched or "posts" it and resets the draft.

pub mod selection;

use thiserror::Error;

use crate::media::{MediaAttachment, Preview, PreviewId, PreviewStore};
use crate::platform::PlatformTable;

pub use selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostMode {
    #[default]
    Instant,
    Scheduled,
}

impl PostMode {
    pub fn toggled(self) -> Self {
        match self {
            PostMode::Instant => PostMode::Scheduled,
            PostMode::Scheduled => PostMode::Instant,
        }
    }

    pub fn is_scheduled(self) -> bool {
        self == PostMode::Scheduled
    }

    /// Word used in the confirmation toast
    pub fn verb(self) -> &'static str {
        match self {
            PostMode::Instant => "shared",
            PostMode::Scheduled => "scheduled",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            PostMode::Instant => "Post Now",
            PostMode::Scheduled => "Schedule Post",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("⚠️ Please add a caption or media before posting.")]
    EmptyDraft,
}

/// Result of a successful (simulated) post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub mode: PostMode,
    pub platforms: Vec<String>,
    pub caption: String,
    pub media: Option<MediaAttachment>,
}

impl PostReceipt {
    pub fn message(&self) -> String {
        format!("✅ Post {} to {}!", self.mode.verb(), self.platforms.join(", "))
    }
}

#[derive(Debug)]
struct Attached {
    media: MediaAttachment,
    preview: PreviewId,
}

#[derive(Debug)]
pub struct Composer {
    platforms: PlatformTable,
    selection: Selection,
    caption: String,
    attachment: Option<Attached>,
    mode: PostMode,
    previews: PreviewStore,
}

impl Composer {
    pub fn new(platforms: PlatformTable) -> Self {
        Self {
            platforms,
            selection: Selection::new(),
            caption: String::new(),
            attachment: None,
            mode: PostMode::default(),
            previews: PreviewStore::new(),
        }
    }

    pub fn platforms(&self) -> &PlatformTable {
        &self.platforms
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Toggle a platform; ids missing from the table are ignored.
    /// Returns true if the platform is selected afterwards.
    pub fn toggle_platform(&mut self, id: &str) -> bool {
        if !self.platforms.contains(id) {
            tracing::debug!("Ignoring toggle of unknown platform: {}", id);
            return false;
        }
        self.selection.toggle(id)
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Append pasted text as-is
    pub fn push_str(&mut self, text: &str) {
        self.caption.push_str(text);
    }

    pub fn push_char(&mut self, c: char) {
        self.caption.push(c);
    }

    pub fn pop_char(&mut self) {
        self.caption.pop();
    }

    pub fn mode(&self) -> PostMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: PostMode) {
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> PostMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Attach a file, replacing (and releasing) any previous one
    pub fn attach(&mut self, media: MediaAttachment) {
        self.release_attachment();
        let preview = self.previews.create(&media);
        tracing::info!(file = %media.name, mime = %media.mime, "Media attached");
        self.attachment = Some(Attached { media, preview });
    }

    /// Drop the attachment; returns false if there was none
    pub fn remove_attachment(&mut self) -> bool {
        self.release_attachment().is_some()
    }

    pub fn attachment(&self) -> Option<&MediaAttachment> {
        self.attachment.as_ref().map(|a| &a.media)
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.attachment
            .as_ref()
            .and_then(|a| self.previews.get(a.preview))
    }

    #[cfg(test)]
    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    fn release_attachment(&mut self) -> Option<MediaAttachment> {
        let attached = self.attachment.take()?;
        self.previews.revoke(attached.preview);
        Some(attached.media)
    }

    pub fn is_empty_draft(&self) -> bool {
        self.caption.is_empty() && self.attachment.is_none()
    }

    /// Validate and "post" the draft.
    ///
    /// An empty draft (no caption, no media) leaves every field untouched.
    /// Otherwise caption, attachment and selection are reset; the mode is kept.
    pub fn submit(&mut self) -> Result<PostReceipt, ComposeError> {
        if self.is_empty_draft() {
            return Err(ComposeError::EmptyDraft);
        }

        let receipt = PostReceipt {
            mode: self.mode,
            platforms: self.selection.take(),
            caption: std::mem::take(&mut self.caption),
            media: self.release_attachment(),
        };
        tracing::info!(
            mode = receipt.mode.verb(),
            platforms = %receipt.platforms.join(","),
            caption_chars = receipt.caption.chars().count(),
            media = receipt.media.as_ref().map(|m| m.name.as_str()).unwrap_or("-"),
            "Post submitted"
        );
        Ok(receipt)
    }
}
