//! # textqr
//!
//! Converts text into one or more scannable QR code images.
//!
//! ## Features
//!
//! - UTF-8-safe splitting of long text into `[i/n]`-labelled parts
//! - Per-level capacity budgets (L / M / Q / H)
//! - PNG output with configurable module size and quiet zone
//! - Terminal preview and reassembly of scanned parts
//!
//! ## Quick Start
//!
//! ```no_run
//! use textqr::{Config, Converter, ErrorCorrection};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .error_correction(ErrorCorrection::High)
//!     .output_prefix("out/note")
//!     .build()?;
//!
//! let paths = Converter::new(config)?.render_and_persist("some long note")?;
//! println!("wrote {} image(s)", paths.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! 1. **Capacity**: maps the error-correction level to a byte budget
//! 2. **Splitter**: cuts text into budget-sized parts on character boundaries
//! 3. **Encoder**: turns each part into a QR image
//! 4. **Writer**: persists images as `<prefix>.png` or `<prefix>_<i>_of_<n>.png`

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod capacity;
mod config;
mod converter;
mod encoder;
mod error;
mod source;
mod splitter;
mod writer;

pub mod api;

pub use capacity::ErrorCorrection;
pub use config::{Config, ConfigBuilder};
pub use converter::{Converter, Rendered, TextInfo};
pub use encoder::{render_terminal, QrCodeEncoder, QrEncoder, QrImage, RenderOptions};
pub use error::{Error, Result};
pub use source::{ensure_not_blank, TextSource};
pub use splitter::{reassemble, Segment, Splitter};

/// Renders and writes QR images for a text with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - Text is blank
/// - A segment cannot be encoded
/// - An image cannot be written
///
/// # Examples
///
/// ```no_run
/// use textqr::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder().output_prefix("greeting").build()?;
/// run(config, "Hello, World!")?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config, text: &str) -> Result<Vec<std::path::PathBuf>> {
    Converter::new(config)?.render_and_persist(text)
}
