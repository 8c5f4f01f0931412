//! Maps a file name to the [`ContentCategory`] that decides which parser sees it.
//!
//! Classification is a fixed extension table: no content sniffing, no state,
//! no failure mode. Anything not in the table is [`ContentCategory::Unsupported`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Content type of one file, derived purely from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentCategory {
    /// JavaScript / TypeScript, with or without JSX.
    Script,
    /// JSON documents.
    StructuredData,
    /// HTML.
    Markup,
    /// CSS.
    Stylesheet,
    /// Markdown.
    Prose,
    /// Images, audio, video, fonts, archives and other binaries.
    Media,
    Unsupported,
}

impl ContentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Script => "Script",
            ContentCategory::StructuredData => "StructuredData",
            ContentCategory::Markup => "Markup",
            ContentCategory::Stylesheet => "Stylesheet",
            ContentCategory::Prose => "Prose",
            ContentCategory::Media => "Media",
            ContentCategory::Unsupported => "Unsupported",
        }
    }

    /// Whether files of this category go through a parser at all.
    pub fn is_parsed(&self) -> bool {
        !matches!(self, ContentCategory::Media | ContentCategory::Unsupported)
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SCRIPT_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];
const STRUCTURED_EXTENSIONS: &[&str] = &["json"];
const MARKUP_EXTENSIONS: &[&str] = &["html", "htm"];
const STYLESHEET_EXTENSIONS: &[&str] = &["css"];
const PROSE_EXTENSIONS: &[&str] = &["md", "markdown"];
const MEDIA_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svg", "tif", "tiff", "avif", "heic",
    // audio / video
    "mp3", "wav", "ogg", "flac", "aac", "m4a", "mp4", "webm", "mov", "avi", "mkv",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // documents and archives
    "pdf", "zip", "gz", "tgz", "tar", "rar", "7z", "bz2", "xz",
    // compiled artifacts
    "exe", "dll", "so", "dylib", "bin", "wasm", "class", "jar", "o", "a",
];

/// Classify `path` by its (case-insensitive) extension.
pub fn classify<P: AsRef<Path>>(path: P) -> ContentCategory {
    let ext = match path.as_ref().extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.to_ascii_lowercase(),
        None => return ContentCategory::Unsupported,
    };
    let ext = ext.as_str();

    if SCRIPT_EXTENSIONS.contains(&ext) {
        ContentCategory::Script
    } else if STRUCTURED_EXTENSIONS.contains(&ext) {
        ContentCategory::StructuredData
    } else if MARKUP_EXTENSIONS.contains(&ext) {
        ContentCategory::Markup
    } else if STYLESHEET_EXTENSIONS.contains(&ext) {
        ContentCategory::Stylesheet
    } else if PROSE_EXTENSIONS.contains(&ext) {
        ContentCategory::Prose
    } else if MEDIA_EXTENSIONS.contains(&ext) {
        ContentCategory::Media
    } else {
        ContentCategory::Unsupported
    }
}
