//! Volume mesh to polyMesh conversion.
//!
//! The conversion is one pass over the cells plus one reorder pass:
//!
//! - [`groups`]: lay out boundary faces by named group, detect baffles, and
//!   gather ungrouped free faces into a default patch
//! - [`classify`]: walk every cell face and assign owners and neighbours
//! - [`reorder`]: put internal faces in upper-triangular order
//! - [`orientation`]: optional winding check for new internal faces
//!
//! [`convert`] runs all of them and renumbers the result into a [`PolyMesh`].
//!
//! # Example
//!
//! ```no_run
//! use polyfoam::algo::{convert, ConvertOptions};
//! use polyfoam::mesh::PatchType;
//!
//! let mesh = polyfoam::io::load("pipe.msh").unwrap();
//! let options = ConvertOptions::default()
//!     .with_verify_orientation(true)
//!     .with_patch_type("outlet", PatchType::Patch);
//! let poly = convert(&mesh, &options).unwrap();
//! println!("{}", poly.summary());
//! ```

pub mod classify;
pub mod groups;
pub mod orientation;
pub mod progress;
pub mod reorder;

pub use progress::Progress;

use std::collections::{HashMap, HashSet};

use crate::error::{ExportError, Result};
use crate::mesh::{
    CellId, CellZone, ElementId, GroupKind, MeshSource, NodeId, Patch, PatchType, PolyMesh,
};

use classify::{buffer_cells, classify, CellFaces};
use groups::{collect_default_patch, collect_groups, BoundaryRegistry};

/// Options for [`convert`].
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Check the winding of every new internal face and reverse it if it
    /// points into its owner (default: false).
    pub verify_orientation: bool,

    /// Fetch cell faces from the source in parallel (default: true).
    pub parallel: bool,

    /// Patch type for patches whose name does not mention "wall" (default: wall).
    pub default_patch_type: PatchType,

    /// Patch types by patch name, overriding the inferred type.
    pub patch_types: HashMap<String, PatchType>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            verify_orientation: false,
            parallel: true,
            default_patch_type: PatchType::Wall,
            patch_types: HashMap::new(),
        }
    }
}

impl ConvertOptions {
    /// Enable or disable the orientation check.
    pub fn with_verify_orientation(mut self, verify: bool) -> Self {
        self.verify_orientation = verify;
        self
    }

    /// Enable or disable parallel face buffering.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the fallback patch type.
    pub fn with_default_patch_type(mut self, patch_type: PatchType) -> Self {
        self.default_patch_type = patch_type;
        self
    }

    /// Force the type of one patch.
    pub fn with_patch_type(mut self, name: impl Into<String>, patch_type: PatchType) -> Self {
        self.patch_types.insert(name.into(), patch_type);
        self
    }

    /// Create options for sequential execution.
    pub fn sequential() -> Self {
        Self::default().with_parallel(false)
    }

    /// Patch type for a patch name: explicit override, then "wall" in the
    /// name, then the default.
    pub fn patch_type_for(&self, name: &str) -> PatchType {
        if let Some(&patch_type) = self.patch_types.get(name) {
            return patch_type;
        }
        if name.to_lowercase().contains("wall") {
            PatchType::Wall
        } else {
            self.default_patch_type
        }
    }
}

/// Face counts implied by cell connectivity and the free-face set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCounts {
    /// All faces, internal and boundary.
    pub total: usize,
    /// Internal faces.
    pub internal: usize,
    /// Boundary faces, including both copies of every baffle face.
    pub boundary: usize,
}

impl FaceCounts {
    /// Counts for a mesh whose cells have `cell_faces` faces in total,
    /// `free_faces` of them touching one cell, and `baffle_faces` shared
    /// faces that are split into two boundary faces.
    ///
    /// ```
    /// use polyfoam::algo::FaceCounts;
    ///
    /// // Two hexahedra with a baffle between them.
    /// let counts = FaceCounts::expected(12, 10, 1);
    /// assert_eq!(counts.total, 12);
    /// assert_eq!(counts.internal, 0);
    /// assert_eq!(counts.boundary, 12);
    /// ```
    pub fn expected(cell_faces: usize, free_faces: usize, baffle_faces: usize) -> Self {
        let total = (cell_faces + free_faces) / 2 + baffle_faces;
        let boundary = free_faces + 2 * baffle_faces;
        Self {
            total,
            internal: total.saturating_sub(boundary),
            boundary,
        }
    }
}

/// What a conversion would produce, without producing it.
#[derive(Debug, Clone)]
pub struct MeshReport {
    /// Number of nodes.
    pub n_nodes: usize,
    /// Number of volumetric cells.
    pub n_cells: usize,
    /// Number of free faces.
    pub n_free_faces: usize,
    /// Patches in output order with their face counts.
    pub patches: Vec<(String, usize)>,
    /// Names of the baffle groups.
    pub baffles: Vec<String>,
    /// Names and sizes of the volume groups.
    pub zones: Vec<(String, usize)>,
    /// Expected face counts.
    pub counts: FaceCounts,
}

/// Convert a volume mesh to a polyMesh.
///
/// Fails on an empty mesh, on any face that cannot be placed consistently
/// (see [`ExportError::is_integrity_violation`]), and on dangling node or
/// element references.
pub fn convert<S>(source: &S, options: &ConvertOptions) -> Result<PolyMesh>
where
    S: MeshSource + Sync + ?Sized,
{
    convert_with_progress(source, options, &Progress::none())
}

/// Convert a volume mesh to a polyMesh, reporting classification progress.
pub fn convert_with_progress<S>(
    source: &S,
    options: &ConvertOptions,
    progress: &Progress,
) -> Result<PolyMesh>
where
    S: MeshSource + Sync + ?Sized,
{
    let cells = source.cell_ids();
    if cells.is_empty() {
        return Err(ExportError::EmptyMesh);
    }
    log::info!("converting {} cells", cells.len());

    let free = source.free_faces();
    let registry = collect_boundary(source, &free)?;
    let buffered = buffer_cells(source, &cells, options.parallel);
    let counts = expected_counts(&buffered, free.len(), &registry);
    log::info!(
        "expecting {} faces, {} internal and {} boundary",
        counts.total,
        counts.internal,
        counts.boundary
    );

    let mut result = classify(
        source,
        &buffered,
        registry,
        options.verify_orientation,
        progress,
    )?;
    drop(buffered);

    if result.num_internal_faces() != counts.internal {
        return Err(ExportError::FaceCountMismatch {
            expected: counts.internal,
            found: result.num_internal_faces(),
        });
    }

    reorder::upper_triangular_order(
        &result.owner,
        &mut result.neighbour,
        &mut result.internal_faces,
    );

    let node_ids = source.node_ids();
    let labels: HashMap<NodeId, u32> = node_ids
        .iter()
        .enumerate()
        .map(|(i, &node)| (node, i as u32))
        .collect();
    let points = node_ids
        .iter()
        .map(|&node| {
            source
                .node_position(node)
                .ok_or(ExportError::UnknownNode { node })
        })
        .collect::<Result<Vec<_>>>()?;

    let n_internal = result.num_internal_faces();
    let faces = result
        .internal_faces
        .iter()
        .chain(&result.boundary_faces)
        .map(|face| relabel(face, &labels))
        .collect::<Result<Vec<_>>>()?;

    let mut owner = result.owner;
    owner.extend(result.boundary_owner);

    let patches: Vec<Patch> = result
        .patches
        .iter()
        .map(|layout| Patch {
            name: layout.name.clone(),
            patch_type: options.patch_type_for(&layout.name),
            start_face: n_internal + layout.offset,
            n_faces: layout.n_faces,
            baffle: layout.baffle,
        })
        .collect();
    for patch in &patches {
        log::debug!(
            "patch \"{}\" ({}): {} faces from {}",
            patch.name,
            patch.patch_type,
            patch.n_faces,
            patch.start_face
        );
    }

    let cell_zones = map_cell_zones(source, &cells)?;

    let mesh = PolyMesh {
        points,
        faces,
        owner,
        neighbour: result.neighbour,
        patches,
        cell_zones,
        n_cells: cells.len(),
    };
    log::info!("{}", mesh.summary());
    Ok(mesh)
}

/// Collect boundary groups and expected face counts without classifying.
pub fn analyze<S>(source: &S, options: &ConvertOptions) -> Result<MeshReport>
where
    S: MeshSource + Sync + ?Sized,
{
    let cells = source.cell_ids();
    if cells.is_empty() {
        return Err(ExportError::EmptyMesh);
    }
    let free = source.free_faces();
    let registry = collect_boundary(source, &free)?;
    let buffered = buffer_cells(source, &cells, options.parallel);
    let counts = expected_counts(&buffered, free.len(), &registry);

    let zones = source
        .groups()
        .into_iter()
        .filter(|g| g.kind == GroupKind::Volume)
        .map(|g| (g.name, g.members.len()))
        .collect();

    Ok(MeshReport {
        n_nodes: source.node_ids().len(),
        n_cells: cells.len(),
        n_free_faces: free.len(),
        patches: registry
            .patches()
            .iter()
            .map(|p| (p.name.clone(), p.n_faces))
            .collect(),
        baffles: registry
            .patches()
            .iter()
            .filter(|p| p.baffle)
            .map(|p| p.name.clone())
            .collect(),
        zones,
        counts,
    })
}

fn collect_boundary<S: MeshSource + ?Sized>(
    source: &S,
    free: &[ElementId],
) -> Result<BoundaryRegistry> {
    let free_set: HashSet<ElementId> = free.iter().copied().collect();
    let mut registry = collect_groups(source, &free_set)?;
    collect_default_patch(source, &mut registry, free)?;
    Ok(registry)
}

fn expected_counts(cells: &[CellFaces], free: usize, registry: &BoundaryRegistry) -> FaceCounts {
    let cell_faces = cells.iter().map(CellFaces::len).sum();
    FaceCounts::expected(cell_faces, free, registry.baffle_face_count())
}

fn relabel(face: &[NodeId], labels: &HashMap<NodeId, u32>) -> Result<Vec<u32>> {
    face.iter()
        .map(|node| {
            labels
                .get(node)
                .copied()
                .ok_or(ExportError::UnknownNode { node: *node })
        })
        .collect()
}

fn map_cell_zones<S: MeshSource + ?Sized>(source: &S, cells: &[ElementId]) -> Result<Vec<CellZone>> {
    let labels: HashMap<ElementId, CellId> = cells
        .iter()
        .enumerate()
        .map(|(i, &cell)| (cell, CellId::new(i)))
        .collect();

    let mut zones = Vec::new();
    for group in source.groups() {
        if group.kind != GroupKind::Volume {
            continue;
        }
        let cells = group
            .members
            .iter()
            .map(|element| {
                labels
                    .get(element)
                    .copied()
                    .ok_or_else(|| ExportError::UnknownZoneCell {
                        zone: group.name.clone(),
                        element: *element,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("cell zone \"{}\" with {} cells", group.name, cells.len());
        zones.push(CellZone {
            name: group.name,
            cells,
        });
    }
    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::{baffled_pair, faces_where, hex_row, two_tets};
    use crate::mesh::{Group, VolumeMesh};

    fn sequential() -> ConvertOptions {
        ConvertOptions::sequential()
    }

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::default()
            .with_verify_orientation(true)
            .with_default_patch_type(PatchType::Patch)
            .with_patch_type("sym", PatchType::Symmetry);
        assert!(options.verify_orientation);
        assert!(options.parallel);
        assert!(!ConvertOptions::sequential().parallel);

        assert_eq!(options.patch_type_for("sym"), PatchType::Symmetry);
        assert_eq!(options.patch_type_for("topWall"), PatchType::Wall);
        assert_eq!(options.patch_type_for("inlet"), PatchType::Patch);
        assert_eq!(
            ConvertOptions::default().patch_type_for("inlet"),
            PatchType::Wall
        );
    }

    #[test]
    fn test_two_tets_scenario() {
        let mut mesh = two_tets();
        mesh.add_missing_boundary_faces();
        let poly = convert(&mesh, &sequential()).unwrap();

        assert_eq!(poly.num_internal_faces(), 1);
        assert_eq!(poly.num_boundary_faces(), 6);
        assert_eq!(poly.owner.len(), 7);
        assert_eq!(poly.owner[0], CellId::new(0));
        assert_eq!(poly.neighbour, vec![CellId::new(1)]);
        // Source nodes 2, 3, 4 become points 1, 2, 3.
        assert_eq!(poly.faces[0], vec![1, 2, 3]);

        assert_eq!(poly.patches.len(), 1);
        let patch = &poly.patches[0];
        assert_eq!(patch.name, "defaultPatches");
        assert_eq!(patch.start_face, 1);
        assert_eq!(patch.n_faces, 6);
        assert_eq!(patch.patch_type, PatchType::Wall);

        let summary = poly.summary();
        assert_eq!(summary.n_points, 5);
        assert_eq!(summary.n_cells, 2);
        assert_eq!(summary.n_faces, 7);
    }

    #[test]
    fn test_patch_starts_follow_internal_faces() {
        let mut mesh = hex_row(3);
        let inlet = faces_where(&mesh, |p| p.x == 0.0);
        let outlet = faces_where(&mesh, |p| p.x == 3.0);
        mesh.add_group(Group::new("inlet", GroupKind::Face, inlet));
        mesh.add_group(Group::new("outlet", GroupKind::Face, outlet));
        let options = sequential().with_default_patch_type(PatchType::Patch);
        let poly = convert(&mesh, &options).unwrap();

        assert_eq!(poly.num_internal_faces(), 2);
        let starts: Vec<(usize, usize)> = poly
            .patches
            .iter()
            .map(|p| (p.start_face, p.n_faces))
            .collect();
        assert_eq!(starts, vec![(2, 1), (3, 1), (4, 12)]);
        assert_eq!(poly.patch("outlet").unwrap().patch_type, PatchType::Patch);

        // Group coverage: every boundary face lies in exactly one patch.
        let covered: usize = poly.patches.iter().map(|p| p.n_faces).sum();
        assert_eq!(covered, poly.num_boundary_faces());
        assert!(reorder::is_upper_triangular(
            &poly.owner[..poly.num_internal_faces()],
            &poly.neighbour
        ));
    }

    #[test]
    fn test_baffle_scenario() {
        let mesh = baffled_pair();
        let poly = convert(&mesh, &sequential()).unwrap();

        // Naive free-face count is 10, the baffle adds one face per side.
        assert_eq!(poly.num_internal_faces(), 0);
        assert_eq!(poly.num_boundary_faces(), 12);

        let baffle = poly.patch("baffle").unwrap();
        assert!(baffle.baffle);
        assert_eq!(baffle.start_face, 10);
        assert_eq!(baffle.n_faces, 2);
        assert_ne!(poly.owner[10], poly.owner[11]);
    }

    /// `hex_row(4)` with face elements at x = 1 and x = 3 in one baffle
    /// group, declared between `inlet` and `outlet`.
    fn baffled_row() -> VolumeMesh {
        let mut mesh = hex_row(4);
        let inlet = faces_where(&mesh, |p| p.x == 0.0);
        let outlet = faces_where(&mesh, |p| p.x == 4.0);
        let mut baffle = Vec::new();
        for (cell, id) in [(1000, 5000), (1002, 5001)] {
            let nodes = mesh.cell(ElementId::new(cell)).unwrap().face_nodes(3).unwrap();
            mesh.add_face(ElementId::new(id), nodes).unwrap();
            baffle.push(ElementId::new(id));
        }
        mesh.add_group(Group::new("inlet", GroupKind::Face, inlet));
        mesh.add_group(Group::new("baffle", GroupKind::Face, baffle));
        mesh.add_group(Group::new("outlet", GroupKind::Face, outlet));
        mesh
    }

    /// Every face key occurs once, except baffle faces which occur twice.
    fn assert_unique_keys(poly: &PolyMesh) {
        let mut seen: HashMap<Vec<u32>, usize> = HashMap::new();
        for face in &poly.faces {
            let mut key = face.clone();
            key.sort_unstable();
            *seen.entry(key).or_default() += 1;
        }
        let in_baffle = |face: usize| {
            poly.patches
                .iter()
                .any(|p| p.baffle && face >= p.start_face && face < p.start_face + p.n_faces)
        };
        for (face, nodes) in poly.faces.iter().enumerate() {
            let mut key = nodes.clone();
            key.sort_unstable();
            let expected = if in_baffle(face) { 2 } else { 1 };
            assert_eq!(seen[&key], expected, "face {} {:?}", face, nodes);
        }
    }

    #[test]
    fn test_face_keys_are_unique() {
        let poly = convert(&hex_row(5), &sequential()).unwrap();
        assert_eq!(poly.faces.len(), 26);
        assert_unique_keys(&poly);

        assert_unique_keys(&convert(&baffled_pair(), &sequential()).unwrap());
        assert_unique_keys(&convert(&baffled_row(), &sequential()).unwrap());
    }

    #[test]
    fn test_baffle_between_internal_faces() {
        let poly = convert(&baffled_row(), &sequential()).unwrap();

        // Only the face at x = 2 stays internal.
        assert_eq!(poly.num_internal_faces(), 1);
        assert_eq!(poly.num_boundary_faces(), 22);
        let layout: Vec<(&str, usize, usize)> = poly
            .patches
            .iter()
            .map(|p| (p.name.as_str(), p.start_face, p.n_faces))
            .collect();
        assert_eq!(
            layout,
            vec![
                ("inlet", 1, 1),
                ("baffle", 2, 4),
                ("outlet", 6, 1),
                ("defaultPatches", 7, 16),
            ]
        );

        // Forward copies go to the first cell touching each face, twins to the second.
        let baffle = poly.patch("baffle").unwrap();
        let owners: Vec<usize> = poly.owner[baffle.start_face..baffle.start_face + baffle.n_faces]
            .iter()
            .map(|c| c.index())
            .collect();
        assert_eq!(owners, vec![0, 2, 1, 3]);

        let n_internal = poly.num_internal_faces();
        assert!(reorder::is_upper_triangular(
            &poly.owner[..n_internal],
            &poly.neighbour
        ));
    }

    #[test]
    fn test_duplicated_free_face_is_a_count_mismatch() {
        let mut mesh = two_tets();
        mesh.add_missing_boundary_faces();
        // A second face element over an existing boundary face.
        let first = mesh.free_faces()[0];
        let nodes = mesh.element_nodes(first).unwrap();
        mesh.add_face(ElementId::new(100), nodes).unwrap();
        assert_eq!(mesh.free_faces().len(), 7);

        let err = convert(&mesh, &sequential()).unwrap_err();
        assert!(matches!(
            err,
            ExportError::FaceCountMismatch {
                expected: 0,
                found: 1
            }
        ));
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn test_owner_completeness() {
        let mesh = hex_row(6);
        let poly = convert(&mesh, &ConvertOptions::default()).unwrap();
        assert_eq!(poly.owner.len(), poly.faces.len());
        assert!(poly.owner.iter().all(|c| c.index() < poly.n_cells));
        assert!(poly.neighbour.iter().all(|c| c.index() < poly.n_cells));
        for (o, n) in poly.owner.iter().zip(&poly.neighbour) {
            assert!(o < n);
        }
    }

    #[test]
    fn test_cell_zones() {
        let mut mesh = hex_row(3);
        mesh.add_group(Group::new(
            "solid",
            GroupKind::Volume,
            vec![ElementId::new(1002), ElementId::new(1000)],
        ));
        let poly = convert(&mesh, &sequential()).unwrap();
        assert_eq!(poly.cell_zones.len(), 1);
        assert_eq!(
            poly.cell_zones[0].cells,
            vec![CellId::new(2), CellId::new(0)]
        );

        mesh.add_group(Group::new(
            "broken",
            GroupKind::Volume,
            vec![ElementId::new(1)],
        ));
        let err = convert(&mesh, &sequential()).unwrap_err();
        assert!(matches!(err, ExportError::UnknownZoneCell { .. }));
    }

    #[test]
    fn test_empty_mesh() {
        let err = convert(&VolumeMesh::new(), &sequential()).unwrap_err();
        assert!(matches!(err, ExportError::EmptyMesh));
    }

    #[test]
    fn test_duplicate_group_face_aborts() {
        let mut mesh = hex_row(1);
        let inlet = faces_where(&mesh, |p| p.x == 0.0);
        mesh.add_group(Group::new("a", GroupKind::Face, inlet.clone()));
        mesh.add_group(Group::new("b", GroupKind::Face, inlet));
        let err = convert(&mesh, &sequential()).unwrap_err();
        assert!(err.is_integrity_violation());
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let mesh = baffled_pair();
        let a = convert(&mesh, &sequential()).unwrap();
        let b = convert(&mesh, &ConvertOptions::default()).unwrap();
        assert_eq!(a.faces, b.faces);
        assert_eq!(a.owner, b.owner);
        assert_eq!(a.neighbour, b.neighbour);
        assert_eq!(a.patches, b.patches);
    }

    #[test]
    fn test_analyze() {
        let mesh = baffled_pair();
        let report = analyze(&mesh, &sequential()).unwrap();
        assert_eq!(report.n_cells, 2);
        assert_eq!(report.n_free_faces, 10);
        assert_eq!(report.baffles, vec!["baffle".to_string()]);
        assert_eq!(
            report.patches,
            vec![("walls".to_string(), 10), ("baffle".to_string(), 2)]
        );
        assert_eq!(report.counts, FaceCounts::expected(12, 10, 1));
    }
}
