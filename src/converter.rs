use crate::{
    capacity::ErrorCorrection,
    config::Config,
    encoder::{render_terminal, QrEncoder, QrImage},
    error::Result,
    source::ensure_not_blank,
    splitter::{Segment, Splitter},
    writer::ImageWriter,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Summary of a text measured against the configured capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextInfo {
    /// Number of Unicode scalar values
    pub char_count: usize,

    /// UTF-8 length in bytes
    pub byte_count: usize,

    /// Error-correction level in effect
    pub error_correction: ErrorCorrection,

    /// Payload budget per symbol in bytes
    pub capacity: usize,

    /// Number of QR codes the text needs
    pub segment_count: usize,
}

impl TextInfo {
    /// Returns true if the text needs more than one QR code.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        self.segment_count > 1
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║                  Text Information                     ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Characters:           {:>8}                        ║",
            self.char_count
        );
        println!(
            "║ Bytes (UTF-8):        {:>8}                        ║",
            self.byte_count
        );
        println!(
            "║ Error correction:     {:>8} ({:>2}% recovery)         ║",
            self.error_correction,
            self.error_correction.recovery_percent()
        );
        println!(
            "║ Capacity per code:    {:>8} bytes                  ║",
            self.capacity
        );
        println!(
            "║ QR codes needed:      {:>8}                        ║",
            self.segment_count
        );
        println!("╚═══════════════════════════════════════════════════════╝");

        if self.is_split() {
            println!(
                "\nNote: the text is long and will be split into {} QR codes.",
                self.segment_count
            );
        }
    }
}

/// One rendered QR symbol and the segment it encodes.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Rendered symbol
    pub image: QrImage,

    /// Segment carried by the symbol
    pub segment: Segment,
}

/// Converts text into QR images using a fixed configuration.
///
/// Holds no state between calls beyond its configuration.
pub struct Converter {
    config: Config,
    splitter: Splitter,
    encoder: Arc<dyn QrEncoder>,
    writer: ImageWriter,
}

impl Converter {
    /// Creates a converter with the default `qrcode`-backed encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        let encoder = config.render.create_encoder();
        Self::with_encoder(config, encoder)
    }

    /// Creates a converter with a custom encoder.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn with_encoder(config: Config, encoder: Arc<dyn QrEncoder>) -> Result<Self> {
        config.validate()?;

        let splitter = Splitter::for_level(config.error_correction);
        let writer = ImageWriter::new(&config);

        Ok(Self {
            config,
            splitter,
            encoder,
            writer,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Measures the text without encoding it.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use textqr::{Config, Converter};
    ///
    /// let converter = Converter::new(Config::default())?;
    /// let info = converter.describe("Hello, World!")?;
    ///
    /// assert_eq!(info.byte_count, 13);
    /// assert_eq!(info.segment_count, 1);
    /// # Ok::<(), textqr::Error>(())
    /// ```
    pub fn describe(&self, text: &str) -> Result<TextInfo> {
        ensure_not_blank(text)?;

        Ok(TextInfo {
            char_count: text.chars().count(),
            byte_count: text.len(),
            error_correction: self.config.error_correction,
            capacity: self.splitter.budget(),
            segment_count: self.splitter.count(text),
        })
    }

    /// Splits the text and encodes every segment, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank or any segment fails to
    /// encode; no partial result is returned.
    #[instrument(skip_all, fields(bytes = text.len(), level = %self.config.error_correction))]
    pub fn render(&self, text: &str) -> Result<Vec<Rendered>> {
        ensure_not_blank(text)?;

        let segments = self.splitter.split(text);
        let mut rendered = Vec::with_capacity(segments.len());

        for segment in segments {
            let image = self.encoder.encode(&segment, self.config.error_correction)?;
            debug!(
                "Encoded segment {}/{} into {}x{} px",
                segment.index,
                segment.total,
                image.width(),
                image.height()
            );
            rendered.push(Rendered { image, segment });
        }

        info!("Rendered {} QR code(s)", rendered.len());
        Ok(rendered)
    }

    /// Renders the text and writes one image per segment.
    ///
    /// Returns the written paths in segment order. A failed write stops the
    /// remaining writes; files already written are left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or a file cannot be written.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use textqr::{Config, Converter};
    ///
    /// let config = Config::builder().output_prefix("out/note").build()?;
    /// let paths = Converter::new(config)?.render_and_persist("Hello, World!")?;
    ///
    /// assert_eq!(paths[0].to_str(), Some("out/note.png"));
    /// # Ok::<(), textqr::Error>(())
    /// ```
    #[instrument(skip_all, fields(prefix = %self.config.output_prefix.display()))]
    pub fn render_and_persist(&self, text: &str) -> Result<Vec<PathBuf>> {
        let rendered = self.render(text)?;
        let paths = self.writer.write_images(&rendered)?;

        if self.config.write_manifest {
            self.writer
                .write_manifest(&rendered, &paths, self.config.error_correction)?;
        }

        Ok(paths)
    }

    /// Renders each segment for a terminal instead of an image.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is blank or any segment fails to encode.
    pub fn preview(&self, text: &str) -> Result<Vec<String>> {
        ensure_not_blank(text)?;

        self.splitter
            .split(text)
            .iter()
            .map(|segment| render_terminal(segment, self.config.error_correction))
            .collect()
    }
}
