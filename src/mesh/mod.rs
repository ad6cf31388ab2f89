//! Source mesh data structures.
//!
//! This module describes the unstructured volume mesh the converter reads
//! from, and the output [`PolyMesh`] it produces.
//!
//! # Overview
//!
//! The converter does not own the source mesh. It talks to it through the
//! [`MeshSource`] trait, which mirrors what a meshing platform exposes: node
//! coordinates, cells and their face loops, face elements, named groups and
//! a free-face filter. [`VolumeMesh`] implements the trait in memory and is
//! what the file readers build.
//!
//! # Identifiers
//!
//! - [`NodeId`] - a node in the source numbering
//! - [`ElementId`] - a face element or cell in the source numbering
//! - [`CellId`] - a 0-based cell label in the output
//!
//! # Face identity
//!
//! [`FaceKey`] is the orientation-independent identity of a face, used to
//! find the faces two cells share.
//!
//! ```
//! use polyfoam::mesh::{FaceKey, NodeId};
//!
//! let loop_a = [NodeId::new(1), NodeId::new(2), NodeId::new(3)];
//! let loop_b = [NodeId::new(3), NodeId::new(2), NodeId::new(1)];
//! assert_eq!(FaceKey::forward(&loop_a), FaceKey::forward(&loop_b));
//! ```

mod face;
mod index;
mod poly;
mod shape;
mod source;
mod volume;

pub use face::{FaceKey, KeyOrientation};
pub use index::{CellId, ElementId, NodeId};
pub use poly::{CellZone, MeshSummary, Patch, PatchType, PolyMesh};
pub use shape::CellShape;
pub use source::{Group, GroupKind, MeshSource};
pub use volume::{Cell, VolumeMesh};

#[cfg(test)]
pub(crate) use volume::test_meshes;
