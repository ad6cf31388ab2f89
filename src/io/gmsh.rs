//! Gmsh MSH 2.x ASCII support.
//!
//! Reads nodes, first-order triangles, quadrangles, tetrahedra, hexahedra,
//! prisms and pyramids. The first tag of every element is its physical
//! group: physical surfaces become boundary face groups and physical volumes
//! become cell zones. Other element types are skipped.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Point3;

use crate::error::{ExportError, Result};
use crate::mesh::{CellShape, ElementId, Group, GroupKind, NodeId, VolumeMesh};

/// Load a volume mesh from an MSH 2.x ASCII file.
///
/// The mesh is named after the file stem. Boundary faces that no face
/// element covers are created, so every free face can be grouped.
///
/// # Example
///
/// ```no_run
/// use polyfoam::io::gmsh;
///
/// let mesh = gmsh::load("cavity.msh").unwrap();
/// println!("{} cells", mesh.num_cells());
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<VolumeMesh> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mesh");

    parse(BufReader::new(file), name).map_err(|e| match e {
        ExportError::Parse { .. } => ExportError::LoadError {
            path: path.to_path_buf(),
            message: e.to_string(),
        },
        other => other,
    })
}

/// Parse an MSH 2.x ASCII mesh from a reader.
///
/// ```
/// use polyfoam::io::gmsh;
/// use polyfoam::mesh::MeshSource;
///
/// let text = "\
/// $MeshFormat
/// 2.2 0 8
/// $EndMeshFormat
/// $Nodes
/// 4
/// 1 0 0 0
/// 2 1 0 0
/// 3 0 1 0
/// 4 0 0 1
/// $EndNodes
/// $Elements
/// 1
/// 1 4 2 7 1 1 2 3 4
/// $EndElements
/// ";
/// let mesh = gmsh::parse(text.as_bytes(), "tet").unwrap();
/// assert_eq!(mesh.num_cells(), 1);
/// assert_eq!(mesh.free_faces().len(), 4);
/// assert_eq!(mesh.groups()[0].name, "zone_7");
/// ```
pub fn parse<R: BufRead>(reader: R, name: &str) -> Result<VolumeMesh> {
    let mut lines = Lines::new(reader);
    let mut mesh = VolumeMesh::with_name(name);
    let mut names: HashMap<(u32, u32), String> = HashMap::new();
    let mut physical: BTreeMap<(u32, u32), Vec<ElementId>> = BTreeMap::new();
    let mut format_seen = false;
    let mut skipped = 0usize;

    while let Some(line) = lines.next_line()? {
        let section = line.trim();
        if section.is_empty() {
            continue;
        }
        match section {
            "$MeshFormat" => {
                read_format(&mut lines)?;
                format_seen = true;
            }
            "$PhysicalNames" => read_physical_names(&mut lines, &mut names)?,
            "$Nodes" => {
                require_format(&lines, format_seen)?;
                read_nodes(&mut lines, &mut mesh)?;
            }
            "$Elements" => {
                require_format(&lines, format_seen)?;
                skipped += read_elements(&mut lines, &mut mesh, &mut physical)?;
            }
            other if other.starts_with('$') && !other.starts_with("$End") => {
                log::debug!("skipping section {}", other);
                skip_section(&mut lines, &other[1..])?;
            }
            other => {
                return Err(ExportError::parse(
                    lines.line,
                    format!("unexpected \"{}\" outside of a section", other),
                ))
            }
        }
    }
    require_format(&lines, format_seen)?;

    if skipped > 0 {
        log::debug!("skipped {} elements of unsupported types", skipped);
    }

    for ((dim, tag), members) in physical {
        let (kind, prefix) = if dim == 2 {
            (GroupKind::Face, "patch")
        } else {
            (GroupKind::Volume, "zone")
        };
        let name = names
            .remove(&(dim, tag))
            .unwrap_or_else(|| format!("{}_{}", prefix, tag));
        mesh.add_group(Group::new(name, kind, members));
    }

    let created = mesh.add_missing_boundary_faces();
    log::info!(
        "read {} nodes, {} cells and {} face elements ({} created)",
        mesh.num_nodes(),
        mesh.num_cells(),
        mesh.num_face_elements(),
        created
    );
    Ok(mesh)
}

/// Line reader that tracks 1-based line numbers.
struct Lines<R> {
    inner: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        match self.inner.next() {
            Some(line) => {
                self.line += 1;
                Ok(Some(line?))
            }
            None => Ok(None),
        }
    }

    fn expect_line(&mut self, what: &str) -> Result<String> {
        self.next_line()?
            .ok_or_else(|| ExportError::parse(self.line, format!("unexpected end of file, expected {}", what)))
    }

    fn expect_count(&mut self, what: &str) -> Result<usize> {
        let line = self.expect_line(what)?;
        line.trim()
            .parse()
            .map_err(|_| ExportError::parse(self.line, format!("invalid {} \"{}\"", what, line.trim())))
    }

    fn expect_end(&mut self, section: &str) -> Result<()> {
        let line = self.expect_line(section)?;
        if line.trim() != format!("$End{}", section) {
            return Err(ExportError::parse(
                self.line,
                format!("expected $End{}, found \"{}\"", section, line.trim()),
            ));
        }
        Ok(())
    }
}

fn require_format<R>(lines: &Lines<R>, seen: bool) -> Result<()> {
    if seen {
        Ok(())
    } else {
        Err(ExportError::parse(lines.line, "missing $MeshFormat section"))
    }
}

fn field<T: std::str::FromStr>(parts: &[&str], index: usize, what: &str, line: usize) -> Result<T> {
    parts
        .get(index)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ExportError::parse(line, format!("missing or invalid {}", what)))
}

fn read_format<R: BufRead>(lines: &mut Lines<R>) -> Result<()> {
    let line = lines.expect_line("format line")?;
    let parts: Vec<&str> = line.split_whitespace().collect();
    let version: f64 = field(&parts, 0, "version", lines.line)?;
    let file_type: u32 = field(&parts, 1, "file type", lines.line)?;

    if !(2.0..3.0).contains(&version) {
        return Err(ExportError::parse(
            lines.line,
            format!("MSH version {} is not supported, save the mesh as version 2", version),
        ));
    }
    if file_type != 0 {
        return Err(ExportError::parse(lines.line, "binary MSH files are not supported"));
    }
    lines.expect_end("MeshFormat")
}

fn read_physical_names<R: BufRead>(
    lines: &mut Lines<R>,
    names: &mut HashMap<(u32, u32), String>,
) -> Result<()> {
    let count = lines.expect_count("physical name count")?;
    for _ in 0..count {
        let line = lines.expect_line("physical name")?;
        let parts: Vec<&str> = line.splitn(3, char::is_whitespace).collect();
        let dim: u32 = field(&parts, 0, "physical dimension", lines.line)?;
        let tag: u32 = field(&parts, 1, "physical tag", lines.line)?;
        let name = parts
            .get(2)
            .map(|s| s.trim().trim_matches('"').to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ExportError::parse(lines.line, "missing physical name"))?;
        names.insert((dim, tag), name);
    }
    lines.expect_end("PhysicalNames")
}

fn read_nodes<R: BufRead>(lines: &mut Lines<R>, mesh: &mut VolumeMesh) -> Result<()> {
    let count = lines.expect_count("node count")?;
    for _ in 0..count {
        let line = lines.expect_line("node")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let n = lines.line;
        let id: u32 = field(&parts, 0, "node id", n)?;
        let x: f64 = field(&parts, 1, "x coordinate", n)?;
        let y: f64 = field(&parts, 2, "y coordinate", n)?;
        let z: f64 = field(&parts, 3, "z coordinate", n)?;
        mesh.add_node(NodeId::from(id), Point3::new(x, y, z))?;
    }
    lines.expect_end("Nodes")
}

/// Dimension, cell shape (`None` for faces) and node count of a supported element type.
fn element_kind(element_type: u32) -> Option<(u32, Option<CellShape>, usize)> {
    match element_type {
        2 => Some((2, None, 3)),
        3 => Some((2, None, 4)),
        4 => Some((3, Some(CellShape::Tetrahedron), 4)),
        5 => Some((3, Some(CellShape::Hexahedron), 8)),
        6 => Some((3, Some(CellShape::Prism), 6)),
        7 => Some((3, Some(CellShape::Pyramid), 5)),
        _ => None,
    }
}

/// Returns the number of elements skipped because of their type.
fn read_elements<R: BufRead>(
    lines: &mut Lines<R>,
    mesh: &mut VolumeMesh,
    physical: &mut BTreeMap<(u32, u32), Vec<ElementId>>,
) -> Result<usize> {
    let count = lines.expect_count("element count")?;
    let mut skipped = 0;
    for _ in 0..count {
        let line = lines.expect_line("element")?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let n = lines.line;
        let id: u32 = field(&parts, 0, "element id", n)?;
        let element_type: u32 = field(&parts, 1, "element type", n)?;
        let n_tags: usize = field(&parts, 2, "tag count", n)?;

        let Some((dim, shape, n_nodes)) = element_kind(element_type) else {
            skipped += 1;
            continue;
        };

        let first_node = n_tags
            .checked_add(3)
            .filter(|&first| first <= parts.len())
            .ok_or_else(|| {
                ExportError::parse(n, format!("element {} claims {} tags", id, n_tags))
            })?;
        if parts.len() != first_node + n_nodes {
            return Err(ExportError::parse(
                n,
                format!(
                    "element {} of type {} needs {} nodes, found {}",
                    id,
                    element_type,
                    n_nodes,
                    parts.len().saturating_sub(first_node)
                ),
            ));
        }
        let nodes = (first_node..parts.len())
            .map(|i| field::<u32>(&parts, i, "node id", n).map(NodeId::from))
            .collect::<Result<Vec<_>>>()?;

        let element = ElementId::from(id);
        match shape {
            Some(shape) => mesh.add_cell(element, shape, nodes)?,
            None => mesh.add_face(element, nodes)?,
        }

        if n_tags > 0 {
            let tag: u32 = field(&parts, 3, "physical tag", n)?;
            if tag > 0 {
                physical.entry((dim, tag)).or_default().push(element);
            }
        }
    }
    lines.expect_end("Elements")?;
    Ok(skipped)
}

fn skip_section<R: BufRead>(lines: &mut Lines<R>, section: &str) -> Result<()> {
    let end = format!("$End{}", section);
    loop {
        let line = lines.expect_line(&end)?;
        if line.trim() == end {
            return Ok(());
        }
    }
}
