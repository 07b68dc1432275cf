use crate::{
    capacity::ErrorCorrection,
    config::Config,
    converter::Rendered,
    encoder::QrImage,
    error::{Error, Result},
};
use image::ImageFormat;
use serde::Serialize;
use std::{
    fs,
    io::{Cursor, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

const IMAGE_EXTENSION: &str = "png";
const MANIFEST_EXTENSION: &str = "json";

/// Manifest describing a set of written images.
#[derive(Debug, Serialize)]
pub(crate) struct Manifest {
    /// Error-correction level letter
    pub error_correction: String,

    /// Segment budget in bytes
    pub capacity: usize,

    /// Number of images written
    pub total_segments: usize,

    /// Individual image entries, in scan order
    pub segments: Vec<ManifestEntry>,

    /// Generation timestamp
    pub generated_at: String,
}

/// Manifest entry for one image.
#[derive(Debug, Serialize)]
pub(crate) struct ManifestEntry {
    /// Segment index (1-based)
    pub index: usize,

    /// Output filename
    pub file: String,

    /// Bytes of original text carried
    pub payload_bytes: usize,

    /// Bytes encoded in the symbol, marker included
    pub encoded_bytes: usize,
}

/// Writes rendered QR images to files derived from the output prefix.
pub(crate) struct ImageWriter {
    output_prefix: PathBuf,
    backup_existing: bool,
}

impl ImageWriter {
    /// Creates a new writer from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            output_prefix: config.output_prefix.clone(),
            backup_existing: config.backup_existing,
        }
    }

    /// Writes every image in order and returns the paths written.
    ///
    /// Stops at the first failure; images already written stay on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output directory cannot be created
    /// - PNG encoding fails
    /// - A file write fails
    pub(crate) fn write_images(&self, rendered: &[Rendered]) -> Result<Vec<PathBuf>> {
        self.ensure_parent_dir()?;

        let total = rendered.len();
        let mut paths = Vec::with_capacity(total);

        for item in rendered {
            let path = self.output_path(item.segment.index, total);
            self.write_image(&item.image, &path)?;

            debug!(
                "Wrote segment {}/{} ({}x{} px) to {}",
                item.segment.index,
                total,
                item.image.width(),
                item.image.height(),
                path.display()
            );

            paths.push(path);
        }

        info!("Wrote {} QR image(s)", paths.len());
        Ok(paths)
    }

    /// Generates the output path for a segment.
    ///
    /// `<prefix>.png` when there is one segment, `<prefix>_<i>_of_<n>.png`
    /// otherwise.
    pub(crate) fn output_path(&self, index: usize, total: usize) -> PathBuf {
        let filename = if total > 1 {
            format!("{}_{index}_of_{total}.{IMAGE_EXTENSION}", self.prefix_name())
        } else {
            format!("{}.{IMAGE_EXTENSION}", self.prefix_name())
        };

        self.output_prefix.with_file_name(filename)
    }

    /// Returns the path of the manifest file.
    pub(crate) fn manifest_path(&self) -> PathBuf {
        self.output_prefix
            .with_file_name(format!("{}.{MANIFEST_EXTENSION}", self.prefix_name()))
    }

    fn prefix_name(&self) -> String {
        self.output_prefix
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        match self.output_prefix.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent).map_err(|e| Error::persist(parent, e))
            }
            _ => Ok(()),
        }
    }

    /// Encodes the image as PNG and writes it atomically.
    fn write_image(&self, image: &QrImage, path: &Path) -> Result<()> {
        let mut buffer = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| Error::persist(path, e))?;

        self.write_file_atomic(path, &buffer)
    }

    /// Writes a file atomically with optional backup.
    ///
    /// # Process
    ///
    /// 1. Creates backup if file exists and backup is enabled
    /// 2. Writes content to temporary file
    /// 3. Syncs temporary file to disk
    /// 4. Atomically renames temporary file to target path
    fn write_file_atomic(&self, path: &Path, content: &[u8]) -> Result<()> {
        if path.exists() && self.backup_existing {
            self.backup_file(path)?;
        }

        let temp_path = path.with_extension("tmp");
        let mut temp_file =
            fs::File::create(&temp_path).map_err(|e| Error::persist(&temp_path, e))?;

        temp_file
            .write_all(content)
            .map_err(|e| Error::persist(&temp_path, e))?;

        temp_file
            .sync_all()
            .map_err(|e| Error::persist(&temp_path, e))?;

        drop(temp_file);

        if let Err(e) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::persist(path, e));
        }

        Ok(())
    }

    /// Creates a timestamped backup of an existing file.
    fn backup_file(&self, path: &Path) -> Result<()> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S%.9f");

        let filename = path
            .file_name()
            .ok_or_else(|| Error::persist(path, "invalid file path"))?
            .to_string_lossy();

        let backup_path = path.with_file_name(format!("{filename}.backup.{timestamp}"));

        fs::copy(path, &backup_path).map_err(|e| Error::persist(&backup_path, e))?;

        debug!("Created backup: {}", backup_path.display());
        Ok(())
    }

    /// Writes a JSON manifest describing the written images.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest file cannot be written.
    pub(crate) fn write_manifest(
        &self,
        rendered: &[Rendered],
        paths: &[PathBuf],
        level: ErrorCorrection,
    ) -> Result<PathBuf> {
        let manifest = Manifest {
            error_correction: level.to_string(),
            capacity: level.capacity(),
            total_segments: rendered.len(),
            segments: rendered
                .iter()
                .zip(paths)
                .map(|(item, path)| ManifestEntry {
                    index: item.segment.index,
                    file: path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    payload_bytes: item.segment.payload_bytes(),
                    encoded_bytes: item.segment.text_bytes(),
                })
                .collect(),
            generated_at: chrono::Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        };

        let manifest_path = self.manifest_path();
        let content =
            serde_json::to_vec_pretty(&manifest).map_err(|e| Error::persist(&manifest_path, e))?;

        self.write_file_atomic(&manifest_path, &content)?;

        info!("Wrote manifest to {}", manifest_path.display());
        Ok(manifest_path)
    }
}
