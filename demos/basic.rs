//! Basic example of using textqr as a library
//!
//! Converts a short greeting into a single QR image.

use textqr::{Config, Converter};

fn main() -> anyhow::Result<()> {
    let config = Config::builder().output_prefix("./output/hello").build()?;
    let converter = Converter::new(config)?;

    let info = converter.describe("Hello, World!")?;
    info.print_summary();

    let paths = converter.render_and_persist("Hello, World!")?;
    println!("\n✓ Wrote {}", paths[0].display());

    Ok(())
}
