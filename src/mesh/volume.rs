//! In-memory volumetric mesh.
//!
//! [`VolumeMesh`] stores nodes, face elements, cells and groups keyed by
//! their source ids, and answers the [`MeshSource`] queries from that
//! storage. Free faces are derived from cell connectivity.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;

use super::face::{has_repeated_nodes, FaceKey};
use super::index::{ElementId, NodeId};
use super::shape::CellShape;
use super::source::{Group, MeshSource};
use crate::error::{ExportError, Result};

/// A volumetric cell.
#[derive(Debug, Clone)]
pub struct Cell {
    /// The cell shape.
    pub shape: CellShape,
    /// Cell nodes in the shape's local ordering.
    pub nodes: Vec<NodeId>,
}

impl Cell {
    /// Node loop of a local face.
    pub fn face_nodes(&self, local: usize) -> Option<Vec<NodeId>> {
        self.shape
            .local_face(local)
            .map(|face| face.iter().map(|&i| self.nodes[i]).collect())
    }
}

#[derive(Debug, Clone)]
enum Element {
    Face(Vec<NodeId>),
    Cell(Cell),
}

/// An unstructured volume mesh held in memory.
///
/// # Example
///
/// ```
/// use polyfoam::mesh::{CellShape, ElementId, MeshSource, NodeId, VolumeMesh};
/// use nalgebra::Point3;
///
/// let mut mesh = VolumeMesh::new();
/// let coords = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
/// for (i, c) in coords.iter().enumerate() {
///     mesh.add_node(NodeId::new(i + 1), Point3::new(c[0], c[1], c[2])).unwrap();
/// }
/// let nodes = (1..=4).map(NodeId::new).collect();
/// mesh.add_cell(ElementId::new(1), CellShape::Tetrahedron, nodes).unwrap();
///
/// assert_eq!(mesh.add_missing_boundary_faces(), 4);
/// assert_eq!(mesh.free_faces().len(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VolumeMesh {
    name: Option<String>,
    nodes: Vec<NodeId>,
    positions: HashMap<NodeId, Point3<f64>>,
    elements: HashMap<ElementId, Element>,
    cells: Vec<ElementId>,
    faces: Vec<ElementId>,
    groups: Vec<Group>,
}

impl VolumeMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with a name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of volumetric cells.
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of face elements.
    pub fn num_face_elements(&self) -> usize {
        self.faces.len()
    }

    /// Get a cell by id.
    pub fn cell(&self, id: ElementId) -> Option<&Cell> {
        match self.elements.get(&id) {
            Some(Element::Cell(cell)) => Some(cell),
            _ => None,
        }
    }

    /// Add a node.
    pub fn add_node(&mut self, id: NodeId, position: Point3<f64>) -> Result<()> {
        if self.positions.insert(id, position).is_some() {
            return Err(ExportError::DuplicateId {
                kind: "node",
                id: id.raw(),
            });
        }
        self.nodes.push(id);
        Ok(())
    }

    /// Add a standard cell. The node count must match the shape.
    pub fn add_cell(&mut self, id: ElementId, shape: CellShape, nodes: Vec<NodeId>) -> Result<()> {
        if let Some(expected) = shape.node_count() {
            if nodes.len() != expected {
                return Err(ExportError::InvalidElement {
                    element: id,
                    reason: format!(
                        "{} needs {} nodes, got {}",
                        shape.name(),
                        expected,
                        nodes.len()
                    ),
                });
            }
        }
        self.check_nodes(id, &nodes)?;
        if has_repeated_nodes(&nodes) {
            return Err(ExportError::InvalidElement {
                element: id,
                reason: "cell repeats a node".to_string(),
            });
        }
        if let CellShape::Polyhedron { faces } = &shape {
            if faces.len() < 4 {
                return Err(ExportError::InvalidElement {
                    element: id,
                    reason: format!("polyhedron needs at least 4 faces, got {}", faces.len()),
                });
            }
            for face in faces {
                if face.len() < 3 || face.iter().any(|&i| i >= nodes.len()) {
                    return Err(ExportError::InvalidElement {
                        element: id,
                        reason: format!("polyhedron face {:?} is invalid", face),
                    });
                }
            }
        }
        self.insert_element(id, Element::Cell(Cell { shape, nodes }))?;
        self.cells.push(id);
        Ok(())
    }

    /// Add a polyhedral cell from its face loops given as node ids.
    pub fn add_polyhedron(&mut self, id: ElementId, faces: Vec<Vec<NodeId>>) -> Result<()> {
        let mut nodes: Vec<NodeId> = Vec::new();
        let mut local_of: HashMap<NodeId, usize> = HashMap::new();
        let local_faces: Vec<Vec<usize>> = faces
            .iter()
            .map(|face| {
                face.iter()
                    .map(|&n| {
                        *local_of.entry(n).or_insert_with(|| {
                            nodes.push(n);
                            nodes.len() - 1
                        })
                    })
                    .collect::<Vec<usize>>()
            })
            .collect();
        self.add_cell(id, CellShape::Polyhedron { faces: local_faces }, nodes)
    }

    /// Add a face element (triangle, quad or polygon).
    pub fn add_face(&mut self, id: ElementId, nodes: Vec<NodeId>) -> Result<()> {
        if nodes.len() < 3 {
            return Err(ExportError::InvalidElement {
                element: id,
                reason: format!("face needs at least 3 nodes, got {}", nodes.len()),
            });
        }
        self.check_nodes(id, &nodes)?;
        if has_repeated_nodes(&nodes) {
            return Err(ExportError::InvalidElement {
                element: id,
                reason: "face repeats a node".to_string(),
            });
        }
        self.insert_element(id, Element::Face(nodes))?;
        self.faces.push(id);
        Ok(())
    }

    /// Add a named group.
    pub fn add_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Create face elements for every cell face that touches one cell and
    /// has no face element yet. Returns how many were created.
    ///
    /// New ids continue above the largest element id in use.
    pub fn add_missing_boundary_faces(&mut self) -> usize {
        let counts = self.cell_face_counts();
        let existing: HashSet<FaceKey> = self
            .faces
            .iter()
            .filter_map(|id| match self.elements.get(id) {
                Some(Element::Face(nodes)) => Some(FaceKey::forward(nodes)),
                _ => None,
            })
            .collect();

        let mut missing = Vec::new();
        for id in &self.cells {
            if let Some(Element::Cell(cell)) = self.elements.get(id) {
                for local in 0..cell.shape.face_count() {
                    if let Some(nodes) = cell.face_nodes(local) {
                        let key = FaceKey::forward(&nodes);
                        if counts.get(&key) == Some(&1) && !existing.contains(&key) {
                            missing.push(nodes);
                        }
                    }
                }
            }
        }

        let mut next = self.elements.keys().map(|e| e.index()).max().unwrap_or(0) + 1;
        let created = missing.len();
        for nodes in missing {
            let id = ElementId::new(next);
            next += 1;
            self.elements.insert(id, Element::Face(nodes));
            self.faces.push(id);
        }
        if created > 0 {
            log::debug!("created {} missing boundary face elements", created);
        }
        created
    }

    fn cell_face_counts(&self) -> HashMap<FaceKey, usize> {
        let mut counts = HashMap::new();
        for id in &self.cells {
            if let Some(Element::Cell(cell)) = self.elements.get(id) {
                for local in 0..cell.shape.face_count() {
                    if let Some(nodes) = cell.face_nodes(local) {
                        *counts.entry(FaceKey::forward(&nodes)).or_insert(0) += 1;
                    }
                }
            }
        }
        counts
    }

    fn check_nodes(&self, element: ElementId, nodes: &[NodeId]) -> Result<()> {
        if let Some(&node) = nodes.iter().find(|n| !self.positions.contains_key(n)) {
            log::debug!("element {} references unknown node {}", element, node);
            return Err(ExportError::UnknownNode { node });
        }
        Ok(())
    }

    fn insert_element(&mut self, id: ElementId, element: Element) -> Result<()> {
        if self.elements.contains_key(&id) {
            return Err(ExportError::DuplicateId {
                kind: "element",
                id: id.raw(),
            });
        }
        self.elements.insert(id, element);
        Ok(())
    }
}

impl MeshSource for VolumeMesh {
    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.clone()
    }

    fn node_position(&self, node: NodeId) -> Option<Point3<f64>> {
        self.positions.get(&node).copied()
    }

    fn cell_ids(&self) -> Vec<ElementId> {
        self.cells.clone()
    }

    fn cell_face_nodes(&self, cell: ElementId, local: usize) -> Option<Vec<NodeId>> {
        self.cell(cell)?.face_nodes(local)
    }

    fn element_nodes(&self, element: ElementId) -> Option<Vec<NodeId>> {
        match self.elements.get(&element) {
            Some(Element::Face(nodes)) => Some(nodes.clone()),
            _ => None,
        }
    }

    fn groups(&self) -> Vec<Group> {
        self.groups.clone()
    }

    fn free_faces(&self) -> Vec<ElementId> {
        let counts = self.cell_face_counts();
        self.faces
            .iter()
            .copied()
            .filter(|id| match self.elements.get(id) {
                Some(Element::Face(nodes)) => counts.get(&FaceKey::forward(nodes)) == Some(&1),
                _ => false,
            })
            .collect()
    }

    fn name(&self) -> Option<String> {
        self.name.clone()
    }
}

#[cfg(test)]
pub(crate) mod test_meshes {
    //! Small meshes shared by the unit tests of several modules.

    use super::*;
    use crate::mesh::GroupKind;

    fn n(i: usize) -> NodeId {
        NodeId::new(i)
    }

    /// Two tetrahedra sharing the triangle (2, 3, 4); no groups, no face elements.
    pub fn two_tets() -> VolumeMesh {
        let mut mesh = VolumeMesh::with_name("two_tets");
        let coords = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        for (i, c) in coords.iter().enumerate() {
            mesh.add_node(n(i + 1), Point3::new(c[0], c[1], c[2])).unwrap();
        }
        mesh.add_cell(ElementId::new(1), CellShape::Tetrahedron, vec![n(1), n(2), n(3), n(4)])
            .unwrap();
        // Node 5 lies on the far side of face (2, 3, 4).
        mesh.add_cell(ElementId::new(2), CellShape::Tetrahedron, vec![n(2), n(3), n(4), n(5)])
            .unwrap();
        mesh
    }

    /// A row of `nx` unit hexahedra along x, with face elements for the whole boundary.
    pub fn hex_row(nx: usize) -> VolumeMesh {
        let mut mesh = VolumeMesh::with_name("hex_row");
        // Node id = 1 + i + (nx + 1) * (j + 2 * k)
        let id = |i: usize, j: usize, k: usize| n(1 + i + (nx + 1) * (j + 2 * k));
        for k in 0..2 {
            for j in 0..2 {
                for i in 0..=nx {
                    mesh.add_node(id(i, j, k), Point3::new(i as f64, j as f64, k as f64))
                        .unwrap();
                }
            }
        }
        for i in 0..nx {
            let nodes = vec![
                id(i, 0, 0),
                id(i + 1, 0, 0),
                id(i + 1, 1, 0),
                id(i, 1, 0),
                id(i, 0, 1),
                id(i + 1, 0, 1),
                id(i + 1, 1, 1),
                id(i, 1, 1),
            ];
            mesh.add_cell(ElementId::new(1000 + i), CellShape::Hexahedron, nodes)
                .unwrap();
        }
        mesh.add_missing_boundary_faces();
        mesh
    }

    /// Face element ids of `mesh` whose nodes all satisfy `pred` on their position.
    pub fn faces_where(mesh: &VolumeMesh, pred: impl Fn(&Point3<f64>) -> bool) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = mesh
            .faces
            .iter()
            .copied()
            .filter(|&f| {
                mesh.element_nodes(f)
                    .map(|nodes| {
                        nodes
                            .iter()
                            .all(|&node| pred(&mesh.node_position(node).unwrap()))
                    })
                    .unwrap_or(false)
            })
            .collect();
        ids.sort();
        ids
    }

    /// Two hexahedra separated by a baffle: the face at x = 1 carries a face element
    /// that belongs to the group `baffle`; the rest of the boundary is `walls`.
    pub fn baffled_pair() -> VolumeMesh {
        let mut mesh = hex_row(2);
        let mid = ElementId::new(5000);
        // The shared face at x = 1, oriented out of the first cell.
        let nodes: Vec<NodeId> = mesh.cell(ElementId::new(1000)).unwrap().face_nodes(3).unwrap();
        mesh.add_face(mid, nodes).unwrap();
        let walls: Vec<ElementId> = mesh.free_faces();
        mesh.add_group(Group::new("walls", GroupKind::Face, walls));
        mesh.add_group(Group::new("baffle", GroupKind::Face, vec![mid]));
        mesh
    }
}
