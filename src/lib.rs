//! # Polyfoam
//!
//! Converts unstructured volume meshes to the OpenFOAM polyMesh format.
//!
//! A volume mesh describes cells by their nodes; a polyMesh describes them
//! by their faces. Polyfoam finds every face shared by two cells, assigns
//! each face an owner (and a neighbour for internal faces), lays boundary
//! faces out patch by patch from the mesh's named face groups, and sorts
//! internal faces into the upper-triangular order OpenFOAM expects.
//!
//! ## Features
//!
//! - **Any cell shape**: tetrahedra, pyramids, prisms, hexahedra and polyhedra
//! - **Baffles**: face groups inside the domain become two-sided boundary patches
//! - **Cell zones**: volume groups are written to `cellZones`
//! - **Host-agnostic**: any mesh behind the [`mesh::MeshSource`] trait converts
//! - **Safe output**: nothing is written unless the whole conversion succeeds
//!
//! ## Quick Start
//!
//! ```no_run
//! use polyfoam::prelude::*;
//!
//! let mesh = polyfoam::io::load("cavity.msh").unwrap();
//! let poly = convert(&mesh, &ConvertOptions::default()).unwrap();
//!
//! println!("{}", poly.summary());
//! for patch in &poly.patches {
//!     println!("{}: {} faces from {}", patch.name, patch.n_faces, patch.start_face);
//! }
//!
//! polyfoam::io::write_poly_mesh(&poly, "cavity/constant/polyMesh").unwrap();
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use polyfoam::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh = VolumeMesh::new();
//! let coords = [
//!     [0.0, 0.0, 0.0],
//!     [1.0, 0.0, 0.0],
//!     [0.0, 1.0, 0.0],
//!     [0.0, 0.0, 1.0],
//!     [1.0, 1.0, 1.0],
//! ];
//! for (i, c) in coords.iter().enumerate() {
//!     mesh.add_node(NodeId::new(i + 1), Point3::new(c[0], c[1], c[2])).unwrap();
//! }
//! let tet = |ids: [usize; 4]| ids.iter().map(|&i| NodeId::new(i)).collect();
//! mesh.add_cell(ElementId::new(1), CellShape::Tetrahedron, tet([1, 2, 3, 4])).unwrap();
//! mesh.add_cell(ElementId::new(2), CellShape::Tetrahedron, tet([2, 3, 4, 5])).unwrap();
//! mesh.add_missing_boundary_faces();
//!
//! let poly = convert(&mesh, &ConvertOptions::default()).unwrap();
//! assert_eq!(poly.num_internal_faces(), 1);
//! assert_eq!(poly.num_boundary_faces(), 6);
//! assert_eq!(poly.patches[0].name, "defaultPatches");
//! ```
//!
//! ## Named Boundaries
//!
//! Face groups become patches, in the order they were declared:
//!
//! ```
//! use polyfoam::prelude::*;
//! use nalgebra::Point3;
//!
//! # let mut mesh = VolumeMesh::new();
//! # let coords = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
//! # for (i, c) in coords.iter().enumerate() {
//! #     mesh.add_node(NodeId::new(i + 1), Point3::new(c[0], c[1], c[2])).unwrap();
//! # }
//! # let nodes = (1..=4).map(NodeId::new).collect();
//! # mesh.add_cell(ElementId::new(1), CellShape::Tetrahedron, nodes).unwrap();
//! let bottom = vec![NodeId::new(1), NodeId::new(3), NodeId::new(2)];
//! mesh.add_face(ElementId::new(10), bottom).unwrap();
//! mesh.add_group(Group::new("floor", GroupKind::Face, vec![ElementId::new(10)]));
//! mesh.add_missing_boundary_faces();
//!
//! let poly = convert(&mesh, &ConvertOptions::default()).unwrap();
//! assert_eq!(poly.patch("floor").unwrap().n_faces, 1);
//! assert_eq!(poly.patch("defaultPatches").unwrap().n_faces, 3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use polyfoam::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{convert, convert_with_progress, ConvertOptions, Progress};
    pub use crate::error::{ExportError, Result};
    pub use crate::mesh::{
        CellId, CellShape, CellZone, ElementId, Group, GroupKind, MeshSource, NodeId, Patch,
        PatchType, PolyMesh, VolumeMesh,
    };
}

// Re-export nalgebra for convenience
pub use nalgebra;
