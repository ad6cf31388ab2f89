//! Boundary face collection.
//!
//! Walks the named face groups of the source mesh and lays out the boundary
//! face list: one contiguous range per group, in declaration order, followed
//! by a catch-all `defaultPatches` range for free faces no group claimed.
//!
//! # Baffles
//!
//! A group that contains a face touching two cells is a baffle: a zero
//! thickness wall inside the domain. Each of its faces is registered twice,
//! once under its forward key and once under its twin key, so that both
//! cells touching it can own a copy. The twin copies follow the group's own
//! faces, so a baffle group of N faces covers 2N boundary faces.

use std::collections::{HashMap, HashSet};

use crate::error::{ExportError, Result};
use crate::mesh::{ElementId, FaceKey, GroupKind, MeshSource, NodeId};

/// Base name of the catch-all patch for ungrouped boundary faces.
pub const DEFAULT_PATCH_NAME: &str = "defaultPatches";

/// Placement of one patch within the boundary face list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchLayout {
    /// Patch name.
    pub name: String,
    /// Index of the patch's first face within the boundary face list.
    pub offset: usize,
    /// Number of boundary faces (twice the group size for baffles).
    pub n_faces: usize,
    /// Whether the group is a baffle.
    pub baffle: bool,
    /// Whether this is the generated catch-all patch.
    pub generated: bool,
}

/// Boundary faces registered by canonical key, in output order.
#[derive(Debug, Default)]
pub struct BoundaryRegistry {
    keys: HashMap<FaceKey, usize>,
    faces: Vec<Vec<NodeId>>,
    patches: Vec<PatchLayout>,
    grouped_free_faces: usize,
}

impl BoundaryRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Boundary index registered for a key.
    pub fn get(&self, key: &FaceKey) -> Option<usize> {
        self.keys.get(key).copied()
    }

    /// Whether a key is registered.
    pub fn contains(&self, key: &FaceKey) -> bool {
        self.keys.contains_key(key)
    }

    /// Number of registry entries (equal to the number of boundary faces).
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Boundary face loops in boundary index order.
    pub fn faces(&self) -> &[Vec<NodeId>] {
        &self.faces
    }

    /// Patch layout in output order.
    pub fn patches(&self) -> &[PatchLayout] {
        &self.patches
    }

    /// Number of extra faces introduced by baffles (the twin copies).
    pub fn baffle_face_count(&self) -> usize {
        self.patches
            .iter()
            .filter(|p| p.baffle)
            .map(|p| p.n_faces / 2)
            .sum()
    }

    /// Consume the registry, returning its key map and face loops.
    pub(crate) fn into_parts(self) -> (HashMap<FaceKey, usize>, Vec<Vec<NodeId>>, Vec<PatchLayout>) {
        (self.keys, self.faces, self.patches)
    }

    fn register(&mut self, key: FaceKey, nodes: Vec<NodeId>) -> bool {
        if self.keys.contains_key(&key) {
            return false;
        }
        self.keys.insert(key, self.faces.len());
        self.faces.push(nodes);
        true
    }
}

/// Patch of `patches` whose range contains boundary index `index`.
pub fn patch_at(patches: &[PatchLayout], index: usize) -> Option<&PatchLayout> {
    patches
        .iter()
        .find(|p| index >= p.offset && index < p.offset + p.n_faces)
}

/// Register the faces of every face group.
///
/// Fails with [`ExportError::DuplicateGroupFace`] if a face belongs to two
/// groups, and with [`ExportError::UnknownElement`] if a member is not a
/// face element.
pub fn collect_groups<S: MeshSource + ?Sized>(
    source: &S,
    free_faces: &HashSet<ElementId>,
) -> Result<BoundaryRegistry> {
    let mut registry = BoundaryRegistry::new();

    for group in source.groups() {
        if group.kind != GroupKind::Face {
            continue;
        }
        if group.is_empty() {
            log::warn!("face group \"{}\" is empty, skipping it", group.name);
            continue;
        }
        log::debug!("found face group \"{}\" with {} faces", group.name, group.len());

        let offset = registry.faces.len();
        let mut members = Vec::with_capacity(group.len());
        for &element in &group.members {
            let nodes = source
                .element_nodes(element)
                .ok_or_else(|| ExportError::UnknownElement {
                    group: group.name.clone(),
                    element,
                })?;
            if !registry.register(FaceKey::forward(&nodes), nodes.clone()) {
                return Err(ExportError::DuplicateGroupFace {
                    element,
                    nodes,
                    group: group.name.clone(),
                });
            }
            members.push(nodes);
        }

        let baffle = group.members.iter().any(|e| !free_faces.contains(e));
        if baffle {
            log::info!("group \"{}\" is a baffle", group.name);
            for nodes in members {
                let key = FaceKey::twin(&nodes);
                // Forward keys of this group were unique, so their twins are too.
                registry.register(key, nodes);
            }
        } else {
            registry.grouped_free_faces += group.len();
        }

        registry.patches.push(PatchLayout {
            name: group.name.clone(),
            offset,
            n_faces: registry.faces.len() - offset,
            baffle,
            generated: false,
        });
    }

    Ok(registry)
}

/// Put every free face not claimed by a group into a generated catch-all patch.
///
/// Does nothing when the groups already cover all free faces. Returns the
/// name of the generated patch, if one was created.
pub fn collect_default_patch<S: MeshSource + ?Sized>(
    source: &S,
    registry: &mut BoundaryRegistry,
    free_faces: &[ElementId],
) -> Result<Option<String>> {
    if registry.grouped_free_faces >= free_faces.len() {
        return Ok(None);
    }

    let name = unique_default_name(registry);
    let mut sorted = free_faces.to_vec();
    sorted.sort();

    let offset = registry.faces.len();
    for element in sorted {
        let nodes = source
            .element_nodes(element)
            .ok_or_else(|| ExportError::UnknownElement {
                group: name.clone(),
                element,
            })?;
        let key = FaceKey::forward(&nodes);
        if !registry.contains(&key) {
            registry.register(key, nodes);
        }
    }

    let n_faces = registry.faces.len() - offset;
    if n_faces == 0 {
        return Ok(None);
    }
    log::warn!(
        "{} boundary faces have no group, adding them to \"{}\"",
        n_faces,
        name
    );
    registry.patches.push(PatchLayout {
        name: name.clone(),
        offset,
        n_faces,
        baffle: false,
        generated: true,
    });
    Ok(Some(name))
}

/// `defaultPatches`, or `defaultPatches_N` with the first free N.
fn unique_default_name(registry: &BoundaryRegistry) -> String {
    let taken = |name: &str| registry.patches.iter().any(|p| p.name == name);
    let mut name = DEFAULT_PATCH_NAME.to_string();
    let mut n = 1;
    while taken(&name) {
        name = format!("{}_{}", DEFAULT_PATCH_NAME, n);
        n += 1;
    }
    name
}
