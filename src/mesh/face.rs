//! Orientation-independent face identity.
//!
//! Two faces are the same face when they are built from the same set of
//! nodes, regardless of where the node loop starts or which way it winds.
//! [`FaceKey`] captures that: it stores the node ids sorted ascending.
//!
//! A baffle face has to appear twice in the output (once per side), so it
//! also needs a second identity. [`FaceKey::twin`] produces it: the same
//! sorted nodes tagged [`KeyOrientation::Twin`], which never compares equal
//! to a forward key.

use super::index::NodeId;

/// Which of the two identities of a face a key represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyOrientation {
    /// The ordinary key shared by every cell touching the face.
    Forward,
    /// The second identity given to the back side of a baffle face.
    Twin,
}

/// Canonical, hashable identity of a face.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceKey {
    nodes: Box<[NodeId]>,
    orientation: KeyOrientation,
}

impl FaceKey {
    /// The forward key of a face given its node loop.
    ///
    /// ```
    /// use polyfoam::mesh::{FaceKey, NodeId};
    ///
    /// let a: Vec<NodeId> = [4, 1, 7].iter().map(|&i| NodeId::new(i)).collect();
    /// let b: Vec<NodeId> = [7, 1, 4].iter().map(|&i| NodeId::new(i)).collect();
    /// assert_eq!(FaceKey::forward(&a), FaceKey::forward(&b));
    /// assert_ne!(FaceKey::forward(&a), FaceKey::twin(&a));
    /// ```
    pub fn forward(nodes: &[NodeId]) -> Self {
        Self::with_orientation(nodes, KeyOrientation::Forward)
    }

    /// The twin key of a face, used for the reverse-oriented copy of a baffle face.
    pub fn twin(nodes: &[NodeId]) -> Self {
        Self::with_orientation(nodes, KeyOrientation::Twin)
    }

    fn with_orientation(nodes: &[NodeId], orientation: KeyOrientation) -> Self {
        let mut sorted: Box<[NodeId]> = nodes.into();
        sorted.sort_unstable();
        Self {
            nodes: sorted,
            orientation,
        }
    }

    /// The sorted node ids.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Which identity this key represents.
    pub fn orientation(&self) -> KeyOrientation {
        self.orientation
    }

    /// The key for the other side of the face.
    pub fn flipped(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            orientation: match self.orientation {
                KeyOrientation::Forward => KeyOrientation::Twin,
                KeyOrientation::Twin => KeyOrientation::Forward,
            },
        }
    }
}

/// Whether a node loop repeats any node.
pub(crate) fn has_repeated_nodes(nodes: &[NodeId]) -> bool {
    let mut sorted = nodes.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).any(|w| w[0] == w[1])
}
