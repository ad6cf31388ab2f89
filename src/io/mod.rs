//! Mesh file I/O.
//!
//! # Supported Formats
//!
//! | Format | Extension | Load | Save | Notes |
//! |--------|-----------|------|------|-------|
//! | Gmsh MSH | `.msh` | ✓ | ✗ | Version 2.x, ASCII |
//! | OpenFOAM polyMesh | directory | ✗ | ✓ | ASCII, see [`foam`] |
//!
//! # Usage
//!
//! ```no_run
//! use polyfoam::algo::{convert, ConvertOptions};
//! use polyfoam::io::{load, write_poly_mesh};
//!
//! let mesh = load("cavity.msh").unwrap();
//! let poly = convert(&mesh, &ConvertOptions::default()).unwrap();
//! write_poly_mesh(&poly, "cavity/constant/polyMesh").unwrap();
//! ```

pub mod foam;
pub mod gmsh;

use std::path::Path;

use crate::error::{ExportError, Result};
use crate::mesh::VolumeMesh;

pub use foam::{prepare_output_dir, write_poly_mesh};

/// Supported input mesh formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Gmsh MSH format.
    Gmsh,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "msh" => Some(Format::Gmsh),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Load a volume mesh with automatic format detection.
///
/// The format is determined by the file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<VolumeMesh> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| ExportError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    match format {
        Format::Gmsh => gmsh::load(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(Format::from_extension("MSH"), Some(Format::Gmsh));
        assert_eq!(Format::from_path("a/b/mesh.msh"), Some(Format::Gmsh));
        assert_eq!(Format::from_path("mesh.unv"), None);
        assert_eq!(Format::from_path("mesh"), None);
    }

    #[test]
    fn test_load_unsupported() {
        match load("mesh.unv").unwrap_err() {
            ExportError::UnsupportedFormat { extension } => assert_eq!(extension, "unv"),
            other => panic!("unexpected error {:?}", other),
        }
        match load("mesh").unwrap_err() {
            ExportError::UnsupportedFormat { extension } => assert_eq!(extension, "(none)"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
