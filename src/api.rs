//! # Quick Start API
//!
//! High-level, ergonomic API for common use cases. Start here if you want
//! QR images without touching [`Config`] or [`Converter`] directly.
//!
//! ## Examples
//!
//! ```no_run
//! use textqr::api::{Encode, Level};
//!
//! // Simplest usage - writes qrcode.png (or qrcode_<i>_of_<n>.png)
//! Encode::text("Hello, World!").save()?;
//!
//! // Custom settings
//! Encode::text("a long secret note")
//!     .level(Level::High)
//!     .module_size(8)
//!     .border(2)
//!     .output("./codes/note")
//!     .save()?;
//!
//! // Just measure
//! let info = Encode::text("Hello").info()?;
//! assert_eq!(info.segment_count, 1);
//! # Ok::<(), textqr::Error>(())
//! ```

use crate::{Config, Converter, ErrorCorrection, Rendered, Result, TextInfo};
use std::path::{Path, PathBuf};

/// Error-correction level for the quick start API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Most capacity, least redundancy
    Low,
    /// Balanced default
    Medium,
    /// More redundancy
    Quartile,
    /// Most redundancy, least capacity
    High,
}

impl From<Level> for ErrorCorrection {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => Self::Low,
            Level::Medium => Self::Medium,
            Level::Quartile => Self::Quartile,
            Level::High => Self::High,
        }
    }
}

/// Entry point for the quick start API.
///
/// # Examples
///
/// ```no_run
/// use textqr::api::*;
///
/// let paths = Encode::text("Hello").output("hello").save()?;
/// assert_eq!(paths.len(), 1);
/// # Ok::<(), textqr::Error>(())
/// ```
#[derive(Debug, Clone)]
#[must_use = "call .save(), .images(), .preview() or .info() to run the conversion"]
pub struct Encode {
    text: String,
    level: Level,
    module_size: u32,
    border: u32,
    output: PathBuf,
    backup: bool,
    manifest: bool,
}

impl Encode {
    /// Start a conversion of the given text.
    pub fn text(text: impl Into<String>) -> Self {
        let defaults = Config::default();

        Self {
            text: text.into(),
            level: Level::Medium,
            module_size: defaults.render.module_size,
            border: defaults.render.border,
            output: defaults.output_prefix,
            backup: false,
            manifest: false,
        }
    }

    /// Set the error-correction level.
    ///
    /// Default: `Level::Medium`
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set the pixel size of one module.
    ///
    /// Default: `10`
    pub fn module_size(mut self, pixels: u32) -> Self {
        self.module_size = pixels;
        self
    }

    /// Set the quiet-zone width in modules.
    ///
    /// Default: `4`
    pub fn border(mut self, modules: u32) -> Self {
        self.border = modules;
        self
    }

    /// Set the output path prefix.
    ///
    /// Default: `qrcode`
    pub fn output(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.output = prefix.into();
        self
    }

    /// Back up images that would be overwritten.
    pub fn backup(mut self) -> Self {
        self.backup = true;
        self
    }

    /// Also write a `<prefix>.json` manifest.
    pub fn manifest(mut self) -> Self {
        self.manifest = true;
        self
    }

    /// Measure the text without encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the text is blank.
    pub fn info(self) -> Result<TextInfo> {
        let (converter, text) = self.into_parts()?;
        converter.describe(&text)
    }

    /// Render images in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank or a segment fails to encode.
    pub fn images(self) -> Result<Vec<Rendered>> {
        let (converter, text) = self.into_parts()?;
        converter.render(&text)
    }

    /// Render and write images, returning their paths in scan order.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn save(self) -> Result<Vec<PathBuf>> {
        let (converter, text) = self.into_parts()?;
        converter.render_and_persist(&text)
    }

    /// Render each part for a terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank or a segment fails to encode.
    pub fn preview(self) -> Result<Vec<String>> {
        let (converter, text) = self.into_parts()?;
        converter.preview(&text)
    }

    fn into_parts(self) -> Result<(Converter, String)> {
        let config = Config::builder()
            .error_correction(self.level.into())
            .module_size(self.module_size)
            .border(self.border)
            .output_prefix(self.output)
            .backup_existing(self.backup)
            .write_manifest(self.manifest)
            .build()?;

        Ok((Converter::new(config)?, self.text))
    }
}

/// Measure a text with default settings.
///
/// # Errors
///
/// Returns an error if the text is blank.
pub fn info(text: &str) -> Result<TextInfo> {
    Encode::text(text).info()
}

/// Write QR images for a text under the given prefix with default settings.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn save(text: &str, prefix: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    Encode::text(text).output(prefix.as_ref()).save()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn encode_builder_has_sensible_defaults() {
        let encode = Encode::text("hi");
        assert_eq!(encode.level, Level::Medium);
        assert_eq!(encode.module_size, 10);
        assert_eq!(encode.border, 4);
        assert_eq!(encode.output, PathBuf::from("qrcode"));
    }

    #[test]
    fn encode_builder_is_fluent() {
        let encode = Encode::text("hi")
            .level(Level::Quartile)
            .module_size(3)
            .border(1)
            .output("codes/hi")
            .backup()
            .manifest();

        assert_eq!(encode.level, Level::Quartile);
        assert_eq!(encode.module_size, 3);
        assert_eq!(encode.border, 1);
        assert!(encode.backup);
        assert!(encode.manifest);
    }

    #[test]
    fn info_uses_selected_level() {
        let info = Encode::text("x".repeat(1700)).level(Level::Quartile).info().unwrap();
        assert_eq!(info.capacity, 1600);
        assert_eq!(info.segment_count, 2);

        assert_eq!(super::info("x".repeat(1700).as_str()).unwrap().segment_count, 1);
    }

    #[test]
    fn invalid_module_size_is_reported() {
        assert!(Encode::text("hi").module_size(0).images().unwrap_err().is_config());
    }

    #[test]
    fn save_writes_images() {
        let temp = assert_fs::TempDir::new().unwrap();
        let paths = save("Hello, World!", temp.path().join("hello")).unwrap();

        assert_eq!(paths, vec![temp.path().join("hello.png")]);
        assert!(temp.child("hello.png").exists());
    }
}
