use crate::scene::NodeHandle;
use crate::scene::transform::Transform;
use glam::Affine3A;

/// A scene node: hierarchy links, a transform, and the two flags the avatar
/// runtime cares about.
///
/// # Hierarchy
///
/// Nodes form a tree through parent-child relationships:
/// - `parent`: optional handle to the parent node (`None` for roots)
/// - `children`: list of child node handles
///
/// # Joints
///
/// Nodes referenced by a loaded skin are flagged `is_joint`; the
/// diagnostics extractor and the attachment resolver only consider those.
#[derive(Debug, Clone)]
pub struct Node {
    /// Node name (bone names for joints, asset names for subtree roots)
    pub name: String,

    // === Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    // === Spatial data ===
    pub transform: Transform,

    // === State ===
    /// Whether a loaded skin references this node as a joint
    pub is_joint: bool,
    /// Visibility flag (propagated by the host renderer, not interpreted here)
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            is_joint: false,
            visible: true,
        }
    }

    /// Returns the parent node handle, if any.
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    /// Returns a read-only slice of child node handles.
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// Sets the parent of this node. Prefer [`Scene::attach`] which keeps
    /// both sides in sync; this is exposed for low-level construction
    /// (e.g. instantiating a loaded hierarchy).
    ///
    /// [`Scene::attach`]: crate::scene::Scene::attach
    #[inline]
    pub fn set_parent_raw(&mut self, parent: Option<NodeHandle>) {
        self.parent = parent;
    }

    /// Appends a child handle. Prefer [`Scene::attach`] which keeps both
    /// sides in sync; this is exposed for low-level construction.
    ///
    /// [`Scene::attach`]: crate::scene::Scene::attach
    #[inline]
    pub fn push_child_raw(&mut self, child: NodeHandle) {
        self.children.push(child);
    }

    /// Returns a reference to the world transformation matrix.
    ///
    /// Updated by [`Scene::update_matrix_world`](crate::scene::Scene::update_matrix_world).
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
