//! Face orientation check.
//!
//! A face stored in the output must wind so that its right-hand normal
//! points out of its owner cell. Host meshes normally guarantee this, but the
//! check below can be switched on to catch (and repair) faces that wind the
//! wrong way.

use nalgebra::{Point3, Vector3};

use crate::error::{ExportError, Result};
use crate::mesh::{MeshSource, NodeId};

/// Arithmetic mean of a set of points.
pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Normal of a face loop: (second - first) x (last - first).
///
/// The result is not normalized. Faces with fewer than three points give a zero vector.
pub fn face_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    if points.len() < 3 {
        return Vector3::zeros();
    }
    let p0 = points[0];
    let u = points[1] - p0;
    let v = points[points.len() - 1] - p0;
    u.cross(&v)
}

/// Whether the face loop `face` points out of the cell spanned by `cell`.
///
/// The face is outward iff its normal does not point towards the cell
/// centroid: `dot(normal, cell_centroid - face_centroid) <= 0`.
///
/// # Example
///
/// ```
/// use polyfoam::algo::orientation::is_outward;
/// use nalgebra::Point3;
///
/// let cell = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(0.0, 0.0, 1.0),
/// ];
/// // Bottom face wound clockwise seen from above: normal points down, out of the cell.
/// assert!(is_outward(&cell, &[cell[0], cell[2], cell[1]]));
/// assert!(!is_outward(&cell, &[cell[0], cell[1], cell[2]]));
/// ```
pub fn is_outward(cell: &[Point3<f64>], face: &[Point3<f64>]) -> bool {
    let to_cell = centroid(cell) - centroid(face);
    face_normal(face).dot(&to_cell) <= 0.0
}

/// Look up node coordinates through a mesh source.
pub fn positions<S: MeshSource + ?Sized>(source: &S, nodes: &[NodeId]) -> Result<Vec<Point3<f64>>> {
    nodes
        .iter()
        .map(|&node| {
            source
                .node_position(node)
                .ok_or(ExportError::UnknownNode { node })
        })
        .collect()
}

/// Distinct nodes of a cell, gathered from its face loops in first-seen order.
pub fn cell_nodes(faces: &[Vec<NodeId>]) -> Vec<NodeId> {
    let mut nodes: Vec<NodeId> = Vec::new();
    for face in faces {
        for &node in face {
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_cube() -> Vec<Point3<f64>> {
        let mut points = Vec::new();
        for &z in &[0.0, 1.0] {
            points.push(Point3::new(0.0, 0.0, z));
            points.push(Point3::new(1.0, 0.0, z));
            points.push(Point3::new(1.0, 1.0, z));
            points.push(Point3::new(0.0, 1.0, z));
        }
        points
    }

    #[test]
    fn test_centroid() {
        let c = centroid(&unit_cube());
        assert!((c - Point3::new(0.5, 0.5, 0.5)).norm() < 1e-12);
        assert_eq!(centroid(&[]), Point3::origin());
    }

    #[test]
    fn test_face_normal() {
        let cube = unit_cube();
        let n = face_normal(&[cube[4], cube[5], cube[6], cube[7]]);
        assert!((n - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        assert_eq!(face_normal(&cube[..2]), Vector3::zeros());
    }

    #[test]
    fn test_correct_face_is_kept() {
        let cube = unit_cube();
        let top = [cube[4], cube[5], cube[6], cube[7]];
        assert!(is_outward(&cube, &top));
    }

    #[test]
    fn test_reversed_face_needs_reversal() {
        let cube = unit_cube();
        let mut top = vec![cube[4], cube[5], cube[6], cube[7]];
        top.reverse();
        assert!(!is_outward(&cube, &top));
    }

    #[test]
    fn test_cell_nodes_deduplicates() {
        let f = |raw: &[usize]| raw.iter().map(|&i| NodeId::new(i)).collect::<Vec<_>>();
        let nodes = cell_nodes(&[f(&[1, 3, 2]), f(&[1, 2, 4]), f(&[1, 4, 3]), f(&[2, 3, 4])]);
        assert_eq!(nodes, f(&[1, 3, 2, 4]));
    }
}
