//! Volumetric cell shapes and their local face tables.
//!
//! Node ordering follows the Gmsh convention for linear elements. Every face
//! is listed so that the right-hand rule over its node loop gives a normal
//! pointing out of the cell.

/// Local faces of a tetrahedron (nodes 0-2 form the base, 3 is the apex).
const TETRAHEDRON_FACES: &[&[usize]] = &[&[0, 2, 1], &[0, 1, 3], &[0, 3, 2], &[1, 2, 3]];

/// Local faces of a pyramid (nodes 0-3 form the base quad, 4 is the apex).
const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];

/// Local faces of a prism (nodes 0-2 bottom triangle, 3-5 top triangle).
const PRISM_FACES: &[&[usize]] = &[
    &[0, 2, 1],
    &[3, 4, 5],
    &[0, 1, 4, 3],
    &[1, 2, 5, 4],
    &[0, 3, 5, 2],
];

/// Local faces of a hexahedron (nodes 0-3 bottom quad, 4-7 top quad).
const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
    &[0, 1, 5, 4],
    &[1, 2, 6, 5],
    &[2, 3, 7, 6],
    &[0, 4, 7, 3],
];

/// The shape of a volumetric cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellShape {
    /// Four nodes, four triangular faces.
    Tetrahedron,
    /// Five nodes, one quad and four triangles.
    Pyramid,
    /// Six nodes, two triangles and three quads.
    Prism,
    /// Eight nodes, six quads.
    Hexahedron,
    /// Arbitrary polyhedron; each face lists local node indices, oriented outward.
    Polyhedron {
        /// Local faces.
        faces: Vec<Vec<usize>>,
    },
}

impl CellShape {
    /// Number of nodes the shape requires, or `None` for polyhedra.
    pub fn node_count(&self) -> Option<usize> {
        match self {
            CellShape::Tetrahedron => Some(4),
            CellShape::Pyramid => Some(5),
            CellShape::Prism => Some(6),
            CellShape::Hexahedron => Some(8),
            CellShape::Polyhedron { .. } => None,
        }
    }

    /// Number of faces of the shape.
    pub fn face_count(&self) -> usize {
        match self {
            CellShape::Tetrahedron => TETRAHEDRON_FACES.len(),
            CellShape::Pyramid => PYRAMID_FACES.len(),
            CellShape::Prism => PRISM_FACES.len(),
            CellShape::Hexahedron => HEXAHEDRON_FACES.len(),
            CellShape::Polyhedron { faces } => faces.len(),
        }
    }

    /// Local node indices of face `local`, or `None` past the last face.
    pub fn local_face(&self, local: usize) -> Option<&[usize]> {
        match self {
            CellShape::Tetrahedron => TETRAHEDRON_FACES.get(local).copied(),
            CellShape::Pyramid => PYRAMID_FACES.get(local).copied(),
            CellShape::Prism => PRISM_FACES.get(local).copied(),
            CellShape::Hexahedron => HEXAHEDRON_FACES.get(local).copied(),
            CellShape::Polyhedron { faces } => faces.get(local).map(Vec::as_slice),
        }
    }

    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            CellShape::Tetrahedron => "tetrahedron",
            CellShape::Pyramid => "pyramid",
            CellShape::Prism => "prism",
            CellShape::Hexahedron => "hexahedron",
            CellShape::Polyhedron { .. } => "polyhedron",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};

    /// Check that every face normal points away from the cell centroid.
    fn assert_outward(shape: &CellShape, points: &[Point3<f64>]) {
        let centroid = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / points.len() as f64;
        for local in 0..shape.face_count() {
            let face = shape.local_face(local).unwrap();
            let p0 = points[face[0]];
            let p1 = points[face[1]];
            let pn = points[face[face.len() - 1]];
            let normal = (p1 - p0).cross(&(pn - p0));
            let face_centroid = face.iter().fold(Vector3::zeros(), |acc, &i| acc + points[i].coords)
                / face.len() as f64;
            assert!(
                normal.dot(&(face_centroid - centroid)) > 0.0,
                "{} face {} points inward",
                shape.name(),
                local
            );
        }
    }

    #[test]
    fn test_tetrahedron_faces_outward() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ];
        assert_outward(&CellShape::Tetrahedron, &points);
    }

    #[test]
    fn test_pyramid_faces_outward() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        assert_outward(&CellShape::Pyramid, &points);
    }

    #[test]
    fn test_prism_faces_outward() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        assert_outward(&CellShape::Prism, &points);
    }

    #[test]
    fn test_hexahedron_faces_outward() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        assert_outward(&CellShape::Hexahedron, &points);
    }

    #[test]
    fn test_face_enumeration_terminates() {
        assert!(CellShape::Tetrahedron.local_face(3).is_some());
        assert!(CellShape::Tetrahedron.local_face(4).is_none());
        let poly = CellShape::Polyhedron {
            faces: vec![vec![0, 2, 1], vec![0, 1, 3], vec![0, 3, 2], vec![1, 2, 3]],
        };
        assert_eq!(poly.face_count(), 4);
        assert_eq!(poly.local_face(1), Some(&[0, 1, 3][..]));
        assert!(poly.local_face(4).is_none());
        assert_eq!(poly.node_count(), None);
    }
}
