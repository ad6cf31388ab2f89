//! Face-based polyhedral output mesh.

use std::fmt;
use std::str::FromStr;

use nalgebra::Point3;

use super::index::CellId;
use crate::error::ExportError;

/// Boundary condition class written for a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchType {
    /// Generic patch.
    Patch,
    /// Solid wall.
    Wall,
    /// Empty (2D or axisymmetric front/back).
    Empty,
    /// Symmetry plane.
    Symmetry,
}

impl PatchType {
    /// The keyword used in the `boundary` file.
    pub fn keyword(self) -> &'static str {
        match self {
            PatchType::Patch => "patch",
            PatchType::Wall => "wall",
            PatchType::Empty => "empty",
            PatchType::Symmetry => "symmetry",
        }
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.keyword())
    }
}

impl FromStr for PatchType {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "patch" => Ok(PatchType::Patch),
            "wall" => Ok(PatchType::Wall),
            "empty" => Ok(PatchType::Empty),
            "symmetry" => Ok(PatchType::Symmetry),
            _ => Err(ExportError::invalid_param(
                "patch type",
                s,
                "expected patch, wall, empty or symmetry",
            )),
        }
    }
}

/// A boundary patch: a contiguous range of boundary faces.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Patch name.
    pub name: String,
    /// Boundary condition class.
    pub patch_type: PatchType,
    /// Index of the first face in the combined face list.
    pub start_face: usize,
    /// Number of faces.
    pub n_faces: usize,
    /// Whether the patch is a baffle (each face appears once per side).
    pub baffle: bool,
}

/// A named set of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct CellZone {
    /// Zone name.
    pub name: String,
    /// Member cell labels.
    pub cells: Vec<CellId>,
}

/// The four counts every polyMesh header note carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSummary {
    /// Number of points.
    pub n_points: usize,
    /// Number of cells.
    pub n_cells: usize,
    /// Number of faces (internal and boundary).
    pub n_faces: usize,
    /// Number of internal faces.
    pub n_internal_faces: usize,
}

impl fmt::Display for MeshSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nPoints: {} nCells: {} nFaces: {} nInternalFaces: {}",
            self.n_points, self.n_cells, self.n_faces, self.n_internal_faces
        )
    }
}

/// A boundary-represented polyhedral mesh.
///
/// Faces are stored internal faces first (in upper-triangular order), then
/// boundary faces patch by patch. `owner` has one entry per face,
/// `neighbour` one per internal face.
#[derive(Debug, Clone, Default)]
pub struct PolyMesh {
    /// Point coordinates, indexed by point label.
    pub points: Vec<Point3<f64>>,
    /// Face loops as point labels.
    pub faces: Vec<Vec<u32>>,
    /// Owner cell of every face.
    pub owner: Vec<CellId>,
    /// Neighbour cell of every internal face.
    pub neighbour: Vec<CellId>,
    /// Boundary patches in face order.
    pub patches: Vec<Patch>,
    /// Cell zones.
    pub cell_zones: Vec<CellZone>,
    /// Number of cells.
    pub n_cells: usize,
}

impl PolyMesh {
    /// Number of internal faces.
    pub fn num_internal_faces(&self) -> usize {
        self.neighbour.len()
    }

    /// Number of boundary faces.
    pub fn num_boundary_faces(&self) -> usize {
        self.faces.len() - self.neighbour.len()
    }

    /// Header counts.
    pub fn summary(&self) -> MeshSummary {
        MeshSummary {
            n_points: self.points.len(),
            n_cells: self.n_cells,
            n_faces: self.faces.len(),
            n_internal_faces: self.neighbour.len(),
        }
    }

    /// Find a patch by name.
    pub fn patch(&self, name: &str) -> Option<&Patch> {
        self.patches.iter().find(|p| p.name == name)
    }
}
