//! Upper-triangular ordering of internal faces.
//!
//! Internal faces come out of classification grouped by owner, because
//! each cell creates its internal faces while it is visited. Within one
//! owner the neighbours still appear in discovery order. OpenFOAM needs them
//! ascending, so each owner run is stable-sorted by neighbour and the same
//! permutation is applied to the face loops.

use crate::mesh::CellId;

/// Sort each run of equal owners by neighbour, ascending.
///
/// `neighbour` and `faces` are permuted together and must have the same
/// length as `owner`. Runs are maximal ranges of consecutive equal owners,
/// so owners that are not contiguous are left where they are.
///
/// # Example
///
/// ```
/// use polyfoam::algo::reorder::{is_upper_triangular, upper_triangular_order};
/// use polyfoam::mesh::CellId;
///
/// let c = CellId::new;
/// let owner = vec![c(0), c(0), c(0), c(1)];
/// let mut neighbour = vec![c(3), c(1), c(2), c(2)];
/// let mut faces = vec!["a", "b", "c", "d"];
///
/// upper_triangular_order(&owner, &mut neighbour, &mut faces);
/// assert_eq!(neighbour, vec![c(1), c(2), c(3), c(2)]);
/// assert_eq!(faces, vec!["b", "c", "a", "d"]);
/// assert!(is_upper_triangular(&owner, &neighbour));
/// ```
pub fn upper_triangular_order<T>(owner: &[CellId], neighbour: &mut [CellId], faces: &mut [T]) {
    debug_assert_eq!(owner.len(), neighbour.len());
    debug_assert_eq!(owner.len(), faces.len());

    let mut moved = 0usize;
    for (start, end) in owner_runs(owner) {
        if end - start < 2 || is_sorted(&neighbour[start..end]) {
            continue;
        }

        let mut order: Vec<usize> = (start..end).collect();
        order.sort_by_key(|&i| neighbour[i]);

        let sorted: Vec<CellId> = order.iter().map(|&i| neighbour[i]).collect();
        neighbour[start..end].copy_from_slice(&sorted);
        apply_permutation(&mut faces[start..end], &order, start);
        moved += 1;
    }

    if moved > 0 {
        log::debug!("reordered internal faces of {} owner cells", moved);
    }
}

/// Whether neighbours ascend within every run of equal owners.
pub fn is_upper_triangular(owner: &[CellId], neighbour: &[CellId]) -> bool {
    owner
        .windows(2)
        .zip(neighbour.windows(2))
        .all(|(o, n)| o[0] != o[1] || n[0] <= n[1])
}

/// Maximal `[start, end)` ranges of equal consecutive owners.
fn owner_runs(owner: &[CellId]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=owner.len() {
        if i == owner.len() || owner[i] != owner[start] {
            if i > start {
                runs.push((start, i));
            }
            start = i;
        }
    }
    runs
}

fn is_sorted(values: &[CellId]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}

/// Reorder `slice` so that position `k` holds what was at `order[k] - base`.
///
/// Follows the cycles of the permutation with swaps, so no element is cloned.
fn apply_permutation<T>(slice: &mut [T], order: &[usize], base: usize) {
    let mut done = vec![false; slice.len()];
    for k in 0..slice.len() {
        if done[k] {
            continue;
        }
        let mut current = k;
        loop {
            done[current] = true;
            let source = order[current] - base;
            if done[source] {
                break;
            }
            slice.swap(current, source);
            current = source;
        }
    }
}
