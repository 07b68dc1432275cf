use crate::capacity::ErrorCorrection;
use crate::encoder::RenderOptions;
use crate::error::{Error, Result};
use std::path::PathBuf;

const DEFAULT_OUTPUT_PREFIX: &str = "qrcode";

/// Configuration for a [`Converter`](crate::Converter).
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Error-correction level, which also fixes the segment budget
    pub error_correction: ErrorCorrection,

    /// Module pixel size and quiet-zone width
    pub render: RenderOptions,

    /// Output path prefix; images are written as `<prefix>.png` or
    /// `<prefix>_<i>_of_<n>.png`
    pub output_prefix: PathBuf,

    /// Create backups of images that would be overwritten
    pub backup_existing: bool,

    /// Write a `<prefix>.json` manifest next to the images
    pub write_manifest: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use textqr::{Config, ErrorCorrection};
    ///
    /// let config = Config::builder()
    ///     .error_correction(ErrorCorrection::High)
    ///     .module_size(8)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Module size is zero
    /// - Output prefix is empty or names a directory
    pub fn validate(&self) -> Result<()> {
        if self.render.module_size == 0 {
            return Err(Error::config("module size must be greater than 0"));
        }

        if self.output_prefix.as_os_str().is_empty() {
            return Err(Error::config("output prefix must not be empty"));
        }

        if self.output_prefix.file_name().is_none() {
            return Err(Error::config(format!(
                "output prefix must end in a file name: {}",
                self.output_prefix.display()
            )));
        }

        Ok(())
    }

    /// Returns the segment budget in bytes for the configured level.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.error_correction.capacity()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::default(),
            render: RenderOptions::default(),
            output_prefix: PathBuf::from(DEFAULT_OUTPUT_PREFIX),
            backup_existing: false,
            write_manifest: false,
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    error_correction: Option<ErrorCorrection>,
    module_size: Option<u32>,
    border: Option<u32>,
    output_prefix: Option<PathBuf>,
    backup_existing: bool,
    write_manifest: bool,
}

impl ConfigBuilder {
    /// Sets the error-correction level.
    #[must_use]
    pub fn error_correction(mut self, level: ErrorCorrection) -> Self {
        self.error_correction = Some(level);
        self
    }

    /// Sets the pixel size of one module.
    #[must_use]
    pub fn module_size(mut self, pixels: u32) -> Self {
        self.module_size = Some(pixels);
        self
    }

    /// Sets the quiet-zone width in modules.
    #[must_use]
    pub fn border(mut self, modules: u32) -> Self {
        self.border = Some(modules);
        self
    }

    /// Sets the output path prefix.
    #[must_use]
    pub fn output_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.output_prefix = Some(prefix.into());
        self
    }

    /// Enables or disables backups of overwritten images.
    #[must_use]
    pub fn backup_existing(mut self, enabled: bool) -> Self {
        self.backup_existing = enabled;
        self
    }

    /// Enables or disables the JSON manifest.
    #[must_use]
    pub fn write_manifest(mut self, enabled: bool) -> Self {
        self.write_manifest = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let defaults = RenderOptions::default();

        let config = Config {
            error_correction: self.error_correction.unwrap_or_default(),
            render: RenderOptions::new(
                self.module_size.unwrap_or(defaults.module_size),
                self.border.unwrap_or(defaults.border),
            ),
            output_prefix: self
                .output_prefix
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PREFIX)),
            backup_existing: self.backup_existing,
            write_manifest: self.write_manifest,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::builder().build().unwrap();

        assert_eq!(config.error_correction, ErrorCorrection::Medium);
        assert_eq!(config.render, RenderOptions::new(10, 4));
        assert_eq!(config.output_prefix, PathBuf::from("qrcode"));
        assert_eq!(config.capacity(), 2300);
        assert!(!config.backup_existing);
        assert!(!config.write_manifest);
    }

    #[test]
    fn test_builder_overrides() {
        let config = Config::builder()
            .error_correction(ErrorCorrection::Quartile)
            .module_size(6)
            .border(0)
            .output_prefix("out/note")
            .backup_existing(true)
            .write_manifest(true)
            .build()
            .unwrap();

        assert_eq!(config.capacity(), 1600);
        assert_eq!(config.render, RenderOptions::new(6, 0));
        assert_eq!(config.output_prefix, PathBuf::from("out/note"));
        assert!(config.backup_existing);
        assert!(config.write_manifest);
    }

    #[test]
    fn test_zero_module_size() {
        let result = Config::builder().module_size(0).build();
        assert!(result.unwrap_err().is_config());
    }

    #[test]
    fn test_invalid_prefix() {
        assert!(Config::builder().output_prefix("").build().is_err());
        assert!(Config::builder().output_prefix("out/..").build().is_err());
    }
}
