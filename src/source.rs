use crate::error::{Error, Result};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

/// Where the text to convert comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSource {
    /// Text given directly
    Literal(String),

    /// UTF-8 text file
    File(PathBuf),

    /// Standard input, read to the end
    Stdin,
}

impl TextSource {
    /// Reads the whole text from this source.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, or if the
    /// content is not valid UTF-8.
    pub fn read(&self) -> Result<String> {
        match self {
            Self::Literal(text) => Ok(text.clone()),
            Self::File(path) => {
                let file = File::open(path).map_err(|e| Error::source_read(self.to_string(), &e))?;
                read_utf8(BufReader::new(file), &self.to_string())
            }
            Self::Stdin => read_utf8(io::stdin().lock(), &self.to_string()),
        }
    }
}

impl fmt::Display for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(_) => write!(f, "command line"),
            Self::File(path) => write!(f, "'{}'", path.display()),
            Self::Stdin => write!(f, "standard input"),
        }
    }
}

fn read_utf8(mut reader: impl Read, name: &str) -> Result<String> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::source_read(name, &e))?;
    Ok(text)
}

/// Rejects text that is empty or whitespace-only.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] for blank text.
pub fn ensure_not_blank(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(())
}
