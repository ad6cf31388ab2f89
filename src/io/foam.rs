//! OpenFOAM polyMesh output.
//!
//! Writes `points`, `faces`, `owner`, `neighbour`, `boundary` and, when the
//! mesh has cell zones, `cellZones` in ASCII format.
//!
//! Every file is first written to a temporary file next to its target. The
//! temporaries are renamed into place only once all of them were written,
//! so a failed export leaves an existing polyMesh untouched.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use crate::error::{ExportError, Result};
use crate::mesh::{MeshSummary, PatchType, PolyMesh};

/// Create the output directory (and its parents) if needed.
///
/// Call this before converting, so an unwritable destination is reported
/// before any work is done.
pub fn prepare_output_dir<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ExportError::OutputDir {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(dir.to_path_buf())
}

/// Write all polyMesh files into `dir`.
///
/// # Example
///
/// ```no_run
/// use polyfoam::algo::{convert, ConvertOptions};
/// use polyfoam::io::foam;
///
/// let mesh = polyfoam::io::load("cavity.msh").unwrap();
/// let dir = foam::prepare_output_dir("cavity/constant/polyMesh").unwrap();
/// let poly = convert(&mesh, &ConvertOptions::default()).unwrap();
/// foam::write_poly_mesh(&poly, &dir).unwrap();
/// ```
pub fn write_poly_mesh<P: AsRef<Path>>(mesh: &PolyMesh, dir: P) -> Result<()> {
    let dir = prepare_output_dir(dir)?;

    let mut staged: Vec<(NamedTempFile, &'static str)> = vec![
        (stage(&dir, "points", |w| write_points(mesh, w))?, "points"),
        (stage(&dir, "faces", |w| write_faces(mesh, w))?, "faces"),
        (stage(&dir, "owner", |w| write_owner(mesh, w))?, "owner"),
        (stage(&dir, "neighbour", |w| write_neighbour(mesh, w))?, "neighbour"),
        (stage(&dir, "boundary", |w| write_boundary(mesh, w))?, "boundary"),
    ];
    if !mesh.cell_zones.is_empty() {
        staged.push((
            stage(&dir, "cellZones", |w| write_cell_zones(mesh, w))?,
            "cellZones",
        ));
    }

    for (file, name) in staged {
        let target = dir.join(name);
        file.persist(&target).map_err(|e| ExportError::Io(e.error))?;
        log::debug!("wrote {}", target.display());
    }

    let stale = dir.join("cellZones");
    if mesh.cell_zones.is_empty() && stale.exists() {
        log::info!("removing stale {}", stale.display());
        fs::remove_file(&stale)?;
    }

    log::info!("wrote polyMesh to {}", dir.display());
    Ok(())
}

fn stage<F>(dir: &Path, name: &str, write: F) -> Result<NamedTempFile>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let mut file = Builder::new()
        .prefix(&format!(".{}.", name))
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    Ok(file)
}

fn write_header(
    w: &mut dyn Write,
    object: &str,
    class: &str,
    note: Option<MeshSummary>,
) -> Result<()> {
    writeln!(w, "/*{}*\\", "-".repeat(68))?;
    writeln!(w, "|{:<70}|", "")?;
    writeln!(
        w,
        "|{:<70}|",
        format!("    Written by polyfoam {}", env!("CARGO_PKG_VERSION"))
    )?;
    writeln!(w, "|{:<70}|", "")?;
    writeln!(w, "\\*{}*/", "-".repeat(68))?;
    writeln!(w, "FoamFile")?;
    writeln!(w, "{{")?;
    writeln!(w, "\tversion\t\t2.0;")?;
    writeln!(w, "\tformat\t\tascii;")?;
    writeln!(w, "\tclass\t\t{};", class)?;
    if let Some(summary) = note {
        writeln!(w, "\tnote\t\t\"{}\";", summary)?;
    }
    writeln!(w, "\tlocation\t\"constant/polyMesh\";")?;
    writeln!(w, "\tobject\t\t{};", object)?;
    writeln!(w, "}}")?;
    writeln!(w)?;
    Ok(())
}

/// Write the `points` file.
pub fn write_points(mesh: &PolyMesh, w: &mut dyn Write) -> Result<()> {
    write_header(w, "points", "vectorField", None)?;
    writeln!(w, "{}", mesh.points.len())?;
    writeln!(w, "(")?;
    for p in &mesh.points {
        writeln!(w, "({} {} {})", p.x, p.y, p.z)?;
    }
    writeln!(w, ")")?;
    Ok(())
}

/// Write the `faces` file: internal faces, then boundary faces.
pub fn write_faces(mesh: &PolyMesh, w: &mut dyn Write) -> Result<()> {
    write_header(w, "faces", "faceList", None)?;
    writeln!(w, "{}", mesh.faces.len())?;
    writeln!(w, "(")?;
    for face in &mesh.faces {
        let labels: Vec<String> = face.iter().map(|p| p.to_string()).collect();
        writeln!(w, "{}({})", face.len(), labels.join(" "))?;
    }
    writeln!(w, ")")?;
    Ok(())
}

/// Write the `owner` file.
pub fn write_owner(mesh: &PolyMesh, w: &mut dyn Write) -> Result<()> {
    write_header(w, "owner", "labelList", Some(mesh.summary()))?;
    writeln!(w, "{}", mesh.owner.len())?;
    writeln!(w, "(")?;
    for cell in &mesh.owner {
        writeln!(w, "{}", cell)?;
    }
    writeln!(w, ")")?;
    Ok(())
}

/// Write the `neighbour` file.
pub fn write_neighbour(mesh: &PolyMesh, w: &mut dyn Write) -> Result<()> {
    write_header(w, "neighbour", "labelList", Some(mesh.summary()))?;
    writeln!(w, "{}", mesh.neighbour.len())?;
    writeln!(w, "(")?;
    for cell in &mesh.neighbour {
        writeln!(w, "{}", cell)?;
    }
    writeln!(w, ")")?;
    Ok(())
}

/// Write the `boundary` file.
pub fn write_boundary(mesh: &PolyMesh, w: &mut dyn Write) -> Result<()> {
    write_header(w, "boundary", "polyBoundaryMesh", None)?;
    writeln!(w, "{}", mesh.patches.len())?;
    writeln!(w, "(")?;
    for patch in &mesh.patches {
        writeln!(w, "\t{}", patch.name)?;
        writeln!(w, "\t{{")?;
        writeln!(w, "\t\ttype\t\t{};", patch.patch_type)?;
        if patch.patch_type == PatchType::Wall {
            writeln!(w, "\t\tinGroups\tList<word> 1(wall);")?;
        }
        writeln!(w, "\t\tnFaces\t\t{};", patch.n_faces)?;
        writeln!(w, "\t\tstartFace\t{};", patch.start_face)?;
        writeln!(w, "\t}}")?;
    }
    writeln!(w, ")")?;
    Ok(())
}

/// Write the `cellZones` file.
pub fn write_cell_zones(mesh: &PolyMesh, w: &mut dyn Write) -> Result<()> {
    write_header(w, "cellZones", "regIOobject", None)?;
    writeln!(w, "{}", mesh.cell_zones.len())?;
    writeln!(w, "(")?;
    for zone in &mesh.cell_zones {
        writeln!(w, "{}", zone.name)?;
        writeln!(w, "{{")?;
        writeln!(w, "\ttype\tcellZone;")?;
        writeln!(w, "\tcellLabels\tList<label>")?;
        writeln!(w, "{}", zone.cells.len())?;
        writeln!(w, "(")?;
        for cell in &zone.cells {
            writeln!(w, "{}", cell)?;
        }
        writeln!(w, ");")?;
        writeln!(w, "}}")?;
    }
    writeln!(w, ")")?;
    Ok(())
}
