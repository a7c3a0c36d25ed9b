//! Page rendering through poppler's `pdftoppm`.

use crate::error::{Error, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Renders single PDF pages to PNG bytes.
#[derive(Debug, Clone)]
pub struct PageRasterizer {
    program: PathBuf,
    dpi: u32,
}

impl PageRasterizer {
    /// Name of the rasterizer executable.
    pub const PROGRAM: &'static str = "pdftoppm";

    /// Find `pdftoppm` on `PATH`.
    pub fn locate() -> Option<PathBuf> {
        which::which(Self::PROGRAM).ok()
    }

    /// Create a rasterizer running `program` at `dpi`.
    pub fn new(program: PathBuf, dpi: u32) -> Self {
        Self { program, dpi }
    }

    /// Render resolution.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Render one 1-indexed page.
    pub fn render_page(&self, pdf_path: &Path, page: u32) -> Result<Vec<u8>> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");

        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(page.to_string())
            .arg("-l")
            .arg(page.to_string())
            .arg("-singlefile")
            .arg(pdf_path)
            .arg(&prefix)
            .output()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => Error::ToolNotFound(Self::PROGRAM.to_string()),
                _ => Error::Io(e),
            })?;

        if !output.status.success() {
            return Err(Error::Rasterize {
                page,
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let png_path = prefix.with_extension("png");
        let bytes = fs::read(&png_path).map_err(|_| Error::Rasterize {
            page,
            reason: format!("{} produced no image", Self::PROGRAM),
        })?;
        log::debug!("Rendered page {} at {} dpi ({} bytes)", page, self.dpi, bytes.len());
        Ok(bytes)
    }
}
