//! Cell/face classification.
//!
//! Every face of every cell is looked up by its canonical key:
//!
//! 1. Already seen as an internal face: this cell is its neighbour.
//! 2. Registered as a boundary face: this cell owns it. If the slot is
//!    already owned the face is a baffle and this cell takes the twin slot.
//! 3. Otherwise the face is a new internal face owned by this cell.
//!
//! Faces are stored in the owner's winding, so internal face normals point
//! from owner to neighbour and boundary face normals point out of the domain.

use std::collections::HashMap;

use nalgebra::Point3;
use rayon::prelude::*;

use super::groups::{patch_at, BoundaryRegistry, PatchLayout};
use super::orientation::{cell_nodes, is_outward, positions};
use super::progress::Progress;
use crate::error::{ExportError, Result};
use crate::mesh::{CellId, ElementId, FaceKey, MeshSource, NodeId};

/// Face loops and canonical keys of one cell, fetched once up front.
#[derive(Debug, Clone)]
pub struct CellFaces {
    /// Face loops in local order.
    pub faces: Vec<Vec<NodeId>>,
    /// Forward key of each face.
    pub keys: Vec<FaceKey>,
}

impl CellFaces {
    /// Compute keys for a cell's face loops.
    pub fn new(faces: Vec<Vec<NodeId>>) -> Self {
        let keys = faces.iter().map(|f| FaceKey::forward(f)).collect();
        Self { faces, keys }
    }

    /// Number of faces.
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether the cell has no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Fetch the faces of every cell, in cell order.
///
/// With `parallel` the source is queried from the rayon pool; the result
/// order is the same either way.
pub fn buffer_cells<S>(source: &S, cells: &[ElementId], parallel: bool) -> Vec<CellFaces>
where
    S: MeshSource + Sync + ?Sized,
{
    let buffer = |&cell: &ElementId| CellFaces::new(source.cell_faces(cell));
    if parallel {
        cells.par_iter().map(buffer).collect()
    } else {
        cells.iter().map(buffer).collect()
    }
}

/// Result of classifying all cell faces.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Internal face loops, in discovery order.
    pub internal_faces: Vec<Vec<NodeId>>,
    /// Owner of each internal face.
    pub owner: Vec<CellId>,
    /// Neighbour of each internal face.
    pub neighbour: Vec<CellId>,
    /// Boundary face loops in boundary index order, wound as their owner sees them.
    pub boundary_faces: Vec<Vec<NodeId>>,
    /// Owner of each boundary face.
    pub boundary_owner: Vec<CellId>,
    /// Patch layout carried over from the registry.
    pub patches: Vec<PatchLayout>,
}

impl Classification {
    /// Number of internal faces.
    pub fn num_internal_faces(&self) -> usize {
        self.internal_faces.len()
    }

    /// Number of boundary faces.
    pub fn num_boundary_faces(&self) -> usize {
        self.boundary_faces.len()
    }

    /// Name of the patch holding boundary face `index`.
    pub fn patch_of(&self, index: usize) -> Option<&str> {
        patch_at(&self.patches, index).map(|p| p.name.as_str())
    }
}

/// Classify the faces of `cells` against the boundary `registry`.
///
/// Cell `i` of `cells` is labelled `CellId(i)`. With `verify_orientation`,
/// new internal faces that wind into their owner are reversed; this needs
/// node coordinates from `source`.
pub fn classify<S: MeshSource + ?Sized>(
    source: &S,
    cells: &[CellFaces],
    registry: BoundaryRegistry,
    verify_orientation: bool,
    progress: &Progress,
) -> Result<Classification> {
    let (boundary_keys, mut boundary_faces, patches) = registry.into_parts();
    let mut boundary_owner: Vec<Option<CellId>> = vec![None; boundary_faces.len()];

    let capacity = cells.iter().map(CellFaces::len).sum::<usize>() / 2;
    let mut internal_keys: HashMap<FaceKey, usize> = HashMap::with_capacity(capacity);
    let mut internal_faces: Vec<Vec<NodeId>> = Vec::with_capacity(capacity);
    let mut owner: Vec<CellId> = Vec::with_capacity(capacity);
    let mut neighbour: Vec<Option<CellId>> = Vec::with_capacity(capacity);

    for (index, cell) in cells.iter().enumerate() {
        let cell_id = CellId::new(index);
        let mut cell_points: Option<Vec<Point3<f64>>> = None;

        for (nodes, key) in cell.faces.iter().zip(&cell.keys) {
            if let Some(&face) = internal_keys.get(key) {
                if neighbour[face].is_some() {
                    return Err(ExportError::NonManifoldFace {
                        cell: index,
                        nodes: nodes.clone(),
                    });
                }
                log::trace!("cell {}: internal face {} gets its neighbour", index, face);
                neighbour[face] = Some(cell_id);
            } else if let Some(&slot) = boundary_keys.get(key) {
                let slot = if boundary_owner[slot].is_none() {
                    slot
                } else {
                    match boundary_keys.get(&key.flipped()) {
                        None => {
                            return Err(ExportError::BaffleResolution {
                                cell: index,
                                nodes: nodes.clone(),
                                reason: "face is already owned and is not part of a baffle",
                            })
                        }
                        Some(&twin) if boundary_owner[twin].is_some() => {
                            return Err(ExportError::BaffleResolution {
                                cell: index,
                                nodes: nodes.clone(),
                                reason: "both sides of the baffle are already owned",
                            })
                        }
                        Some(&twin) => twin,
                    }
                };
                log::trace!("cell {}: boundary face {}", index, slot);
                boundary_owner[slot] = Some(cell_id);
                boundary_faces[slot] = nodes.clone();
            } else {
                let mut nodes = nodes.clone();
                if verify_orientation {
                    if cell_points.is_none() {
                        cell_points = Some(positions(source, &cell_nodes(&cell.faces))?);
                    }
                    let face_points = positions(source, &nodes)?;
                    if let Some(points) = &cell_points {
                        if !is_outward(points, &face_points) {
                            log::debug!("cell {}: face {:?} winds inward, reversing", index, nodes);
                            nodes.reverse();
                        }
                    }
                }
                internal_keys.insert(key.clone(), internal_faces.len());
                internal_faces.push(nodes);
                owner.push(cell_id);
                neighbour.push(None);
            }
        }

        progress.report_every(index + 1, cells.len(), 50, "Classifying faces");
    }

    let neighbour = neighbour
        .into_iter()
        .enumerate()
        .map(|(face, n)| {
            n.ok_or_else(|| ExportError::UnmatchedInternalFace {
                face,
                nodes: internal_faces[face].clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let boundary_owner = boundary_owner
        .into_iter()
        .enumerate()
        .map(|(face, o)| {
            o.ok_or_else(|| ExportError::UnownedBoundaryFace {
                patch: patch_at(&patches, face)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                face,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Classification {
        internal_faces,
        owner,
        neighbour,
        boundary_faces,
        boundary_owner,
        patches,
    })
}
