//! The capability interface a host mesh exposes to the converter.
//!
//! A meshing platform knows its own cells, faces, groups and connectivity.
//! The converter only needs a handful of queries against it; they are
//! collected in the [`MeshSource`] trait so any host can be plugged in.
//! [`VolumeMesh`](super::VolumeMesh) is the in-memory implementation used by
//! the file readers.

use nalgebra::Point3;

use super::index::{ElementId, NodeId};

/// The kind of entities a group holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Nodes.
    Node,
    /// Edge elements.
    Edge,
    /// Face elements. Exported as boundary patches.
    Face,
    /// Volume cells. Exported as cell zones.
    Volume,
}

/// A named group of mesh elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// Group name.
    pub name: String,
    /// What the members are.
    pub kind: GroupKind,
    /// Member element ids, in declaration order.
    pub members: Vec<ElementId>,
}

impl Group {
    /// Create a group.
    pub fn new(name: impl Into<String>, kind: GroupKind, members: Vec<ElementId>) -> Self {
        Self {
            name: name.into(),
            kind,
            members,
        }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Queries the converter issues against a host mesh.
pub trait MeshSource {
    /// All node ids, in the order points are emitted.
    fn node_ids(&self) -> Vec<NodeId>;

    /// Coordinates of a node.
    fn node_position(&self, node: NodeId) -> Option<Point3<f64>>;

    /// All volumetric cells, in the order cells are labelled.
    fn cell_ids(&self) -> Vec<ElementId>;

    /// Node loop of the `local`-th face of `cell`, oriented out of the cell.
    ///
    /// Returns `None` once `local` runs past the cell's last face.
    fn cell_face_nodes(&self, cell: ElementId, local: usize) -> Option<Vec<NodeId>>;

    /// Node loop of a face element.
    fn element_nodes(&self, element: ElementId) -> Option<Vec<NodeId>>;

    /// Named groups in declaration order.
    fn groups(&self) -> Vec<Group>;

    /// Face elements touching exactly one cell.
    fn free_faces(&self) -> Vec<ElementId>;

    /// Name of the mesh, if it has one.
    fn name(&self) -> Option<String> {
        None
    }

    /// All faces of a cell, in local order.
    fn cell_faces(&self, cell: ElementId) -> Vec<Vec<NodeId>> {
        let mut faces = Vec::new();
        while let Some(nodes) = self.cell_face_nodes(cell, faces.len()) {
            if nodes.is_empty() {
                break;
            }
            faces.push(nodes);
        }
        faces
    }
}
