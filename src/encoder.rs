use crate::{
    capacity::ErrorCorrection,
    error::{Error, Result},
    splitter::Segment,
};
use image::{GrayImage, Luma};
use qrcode::{bits::Bits, render::unicode, types::QrError, Color, QrCode, Version};
use serde::Serialize;
use std::sync::Arc;
use tracing::trace;

const MAX_VERSION: i16 = 40;
const DEFAULT_MODULE_SIZE: u32 = 10;
const DEFAULT_BORDER: u32 = 4;

/// Largest image the rasteriser will allocate (256 MiB of 8-bit pixels).
const MAX_PIXELS: u64 = 1 << 28;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Rendered QR symbol: 8-bit grayscale, black modules on white.
pub type QrImage = GrayImage;

/// Rasterisation parameters passed through to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    /// Pixel size of one module (symbol cell)
    pub module_size: u32,

    /// Width of the quiet zone, in modules
    pub border: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_size: DEFAULT_MODULE_SIZE,
            border: DEFAULT_BORDER,
        }
    }
}

impl RenderOptions {
    /// Creates render options.
    #[must_use]
    pub const fn new(module_size: u32, border: u32) -> Self {
        Self {
            module_size,
            border,
        }
    }

    /// Creates the default encoder for these options.
    #[must_use]
    pub fn create_encoder(self) -> Arc<dyn QrEncoder> {
        Arc::new(QrCodeEncoder::new(self))
    }
}

/// Turns one segment into a QR image.
///
/// Implementations must pick the symbol version themselves and report a
/// rejected payload as [`Error::Encoding`] carrying the segment index.
pub trait QrEncoder: Send + Sync {
    /// Encodes the segment's text (marker included) at the given level.
    fn encode(&self, segment: &Segment, level: ErrorCorrection) -> Result<QrImage>;
}

/// Encoder backed by the `qrcode` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeEncoder {
    options: RenderOptions,
}

impl QrCodeEncoder {
    /// Creates an encoder with the given render options.
    #[must_use]
    pub const fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Returns the render options.
    #[must_use]
    pub const fn options(&self) -> RenderOptions {
        self.options
    }

    /// Paints every dark module as a `module_size` square inside the quiet zone.
    fn rasterize(&self, code: &QrCode, segment: usize) -> Result<QrImage> {
        let RenderOptions {
            module_size,
            border,
        } = self.options;
        let width = code.width();

        let side = u32::try_from(width)
            .ok()
            .and_then(|w| w.checked_add(border.checked_mul(2)?))
            .and_then(|modules| modules.checked_mul(module_size))
            .ok_or_else(|| Error::encoding(segment, "rendered image dimensions overflow"))?;

        let pixels = u64::from(side) * u64::from(side);
        if pixels > MAX_PIXELS {
            return Err(Error::encoding(
                segment,
                format!(
                    "rendered image would be {side}x{side} pixels, above the limit of {MAX_PIXELS}"
                ),
            ));
        }

        let mut image = GrayImage::from_pixel(side, side, LIGHT);

        for (i, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }

            // i % width and i / width are below 177
            let x0 = ((i % width) as u32 + border) * module_size;
            let y0 = ((i / width) as u32 + border) * module_size;

            for dy in 0..module_size {
                for dx in 0..module_size {
                    image.put_pixel(x0 + dx, y0 + dy, DARK);
                }
            }
        }

        Ok(image)
    }
}

impl QrEncoder for QrCodeEncoder {
    fn encode(&self, segment: &Segment, level: ErrorCorrection) -> Result<QrImage> {
        let code = build_code(segment, level)?;

        trace!(
            "Segment {}/{} encoded as {:?} ({} modules wide)",
            segment.index,
            segment.total,
            code.version(),
            code.width()
        );

        self.rasterize(&code, segment.index)
    }
}

/// Renders the segment as Unicode half blocks for a terminal.
///
/// Colours are inverted so the symbol reads on dark backgrounds.
///
/// # Errors
///
/// Returns an error if the encoder rejects the segment.
pub fn render_terminal(segment: &Segment, level: ErrorCorrection) -> Result<String> {
    let code = build_code(segment, level)?;

    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

/// Encodes the segment text in byte mode in the smallest version that fits.
///
/// Byte mode keeps UTF-8 intact; automatic mode selection may read
/// multi-byte sequences as Shift JIS kanji.
pub(crate) fn build_code(segment: &Segment, level: ErrorCorrection) -> Result<QrCode> {
    let data = segment.text();
    let ec_level = level.to_ec_level();

    for number in 1..=MAX_VERSION {
        let mut bits = Bits::new(Version::Normal(number));
        let fits = bits
            .push_byte_data(data.as_bytes())
            .and_then(|()| bits.push_terminator(ec_level));

        match fits {
            Ok(()) => {
                return QrCode::with_bits(bits, ec_level)
                    .map_err(|e| Error::encoding(segment.index, e.to_string()));
            }
            Err(QrError::DataTooLong) => {}
            Err(e) => return Err(Error::encoding(segment.index, e.to_string())),
        }
    }

    Err(Error::encoding(
        segment.index,
        format!(
            "{} bytes exceed the largest symbol at level {level}",
            data.len()
        ),
    ))
}
