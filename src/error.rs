//! Error types for polyfoam.
//!
//! This module defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

use crate::mesh::{ElementId, NodeId};

/// Result type alias using [`ExportError`].
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while loading, converting or writing a mesh.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The mesh has no volumetric cells.
    #[error("mesh has no volume cells")]
    EmptyMesh,

    /// A face element is a member of more than one boundary group.
    #[error("face element {element} ({nodes:?}) belongs to two or more groups, one is \"{group}\"")]
    DuplicateGroupFace {
        /// The face element.
        element: ElementId,
        /// Node ids of the face.
        nodes: Vec<NodeId>,
        /// The group in which the duplicate was found.
        group: String,
    },

    /// A boundary face was sighted by a cell after both of its sides were owned.
    #[error("boundary face {nodes:?} touched by cell {cell} could not be resolved: {reason}")]
    BaffleResolution {
        /// Output label of the cell that touched the face.
        cell: usize,
        /// Node ids of the face.
        nodes: Vec<NodeId>,
        /// What went wrong.
        reason: &'static str,
    },

    /// An internal face was touched by more than two cells.
    #[error("face {nodes:?} is shared by more than two cells (third cell {cell})")]
    NonManifoldFace {
        /// Output label of the third cell.
        cell: usize,
        /// Node ids of the face.
        nodes: Vec<NodeId>,
    },

    /// An internal face was only touched by one cell.
    #[error("internal face {face} ({nodes:?}) has no neighbour cell; is the face missing from the boundary?")]
    UnmatchedInternalFace {
        /// Internal face index.
        face: usize,
        /// Node ids of the face.
        nodes: Vec<NodeId>,
    },

    /// A boundary face was never touched by any cell.
    #[error("boundary face {face} of patch \"{patch}\" is not touched by any cell")]
    UnownedBoundaryFace {
        /// Patch name.
        patch: String,
        /// Boundary face index within the boundary face list.
        face: usize,
    },

    /// The classified face counts disagree with the counts implied by the free-face set.
    #[error("expected {expected} internal faces but found {found}")]
    FaceCountMismatch {
        /// Count implied by cell face totals and the free-face set.
        expected: usize,
        /// Count produced by classification.
        found: usize,
    },

    /// A face or cell references a node that does not exist.
    #[error("unknown node {node}")]
    UnknownNode {
        /// The node id.
        node: NodeId,
    },

    /// A group references an element that is not a face element.
    #[error("group \"{group}\" references unknown face element {element}")]
    UnknownElement {
        /// Group name.
        group: String,
        /// The element id.
        element: ElementId,
    },

    /// A volume group references an element that is not a cell.
    #[error("cell zone \"{zone}\" references unknown cell {element}")]
    UnknownZoneCell {
        /// Zone name.
        zone: String,
        /// The element id.
        element: ElementId,
    },

    /// An element id or node id was added twice.
    #[error("duplicate {kind} id {id}")]
    DuplicateId {
        /// "node" or "element".
        kind: &'static str,
        /// The raw id.
        id: u32,
    },

    /// An element has the wrong node count or repeated nodes.
    #[error("element {element} is invalid: {reason}")]
    InvalidElement {
        /// The element id.
        element: ElementId,
        /// Description of the problem.
        reason: String,
    },

    /// The output directory could not be created.
    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        /// The directory.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error loading mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Malformed input text.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Error message.
        message: String,
    },

    /// Unsupported file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl ExportError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        ExportError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create a parse error at the given line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        ExportError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Whether this error means the mesh topology is inconsistent.
    ///
    /// These are fatal for a conversion: the input must be fixed.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            ExportError::DuplicateGroupFace { .. }
                | ExportError::BaffleResolution { .. }
                | ExportError::NonManifoldFace { .. }
                | ExportError::UnmatchedInternalFace { .. }
                | ExportError::UnownedBoundaryFace { .. }
                | ExportError::FaceCountMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_classification() {
        let err = ExportError::DuplicateGroupFace {
            element: ElementId::new(7),
            nodes: vec![NodeId::new(1), NodeId::new(2), NodeId::new(3)],
            group: "inlet".to_string(),
        };
        assert!(err.is_integrity_violation());
        assert!(err.to_string().contains("inlet"));

        assert!(!ExportError::EmptyMesh.is_integrity_violation());
        let io = ExportError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(!io.is_integrity_violation());
    }

    #[test]
    fn test_parse_message() {
        let err = ExportError::parse(12, "expected $EndNodes");
        assert_eq!(err.to_string(), "parse error at line 12: expected $EndNodes");
    }
}
