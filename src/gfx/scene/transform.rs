// src/gfx/scene/transform.rs
//! Transform graph
//!
//! Transforms live in an arena and reference their parent by index, so the
//! graph cannot dangle. Cycles are rejected when an edge is created, never
//! checked during traversal.

use cgmath::{Matrix4, Quaternion, Vector3};
use thiserror::Error;

/// Maximum parent chain length accepted by [`TransformArena::set_parent`]
pub const MAX_PARENT_DEPTH: usize = 64;

/// Handle to a transform in a [`TransformArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformId(u32);

impl TransformId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("parenting transform {0:?} would create a cycle")]
    Cycle(TransformId),

    #[error("parent chain exceeds the maximum depth of {MAX_PARENT_DEPTH}")]
    DepthExceeded,
}

/// Local position, orientation, and scale of an entity
///
/// The parent reference is managed by the arena; use
/// [`TransformArena::set_parent`] to change it.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
    parent: Option<TransformId>,
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            parent: None,
        }
    }

    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    pub fn parent(&self) -> Option<TransformId> {
        self.parent
    }

    /// Local matrix: translation * rotation * scale
    pub fn local_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena of transforms with index-based parent references
///
/// Allocation only grows; entities are created at scene setup and never
/// destroyed, so ids stay valid for the arena's lifetime.
pub struct TransformArena {
    nodes: Vec<Transform>,
}

impl TransformArena {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn alloc(&mut self, transform: Transform) -> TransformId {
        let id = TransformId(self.nodes.len() as u32);
        self.nodes.push(transform);
        id
    }

    pub fn get(&self, id: TransformId) -> &Transform {
        &self.nodes[id.index()]
    }

    pub fn get_mut(&mut self, id: TransformId) -> &mut Transform {
        &mut self.nodes[id.index()]
    }

    /// Re-parents `child`, validating the new chain
    ///
    /// Walks up from the proposed parent: finding `child` on that chain is a
    /// cycle and the edit is rejected, as is a chain deeper than
    /// [`MAX_PARENT_DEPTH`]. A rejected edit leaves the arena unchanged.
    pub fn set_parent(
        &mut self,
        child: TransformId,
        parent: Option<TransformId>,
    ) -> Result<(), TransformError> {
        if let Some(parent_id) = parent {
            let mut cursor = Some(parent_id);
            let mut depth = 0usize;
            while let Some(id) = cursor {
                if id == child {
                    return Err(TransformError::Cycle(child));
                }
                depth += 1;
                if depth > MAX_PARENT_DEPTH {
                    return Err(TransformError::DepthExceeded);
                }
                cursor = self.nodes[id.index()].parent;
            }
        }
        self.nodes[child.index()].parent = parent;
        Ok(())
    }

    /// World matrix: the product of local matrices from the root down
    ///
    /// Computed on demand. The walk terminates because `set_parent` keeps
    /// the graph acyclic and depth-bounded.
    pub fn world_matrix(&self, id: TransformId) -> Matrix4<f32> {
        let node = self.get(id);
        let mut world = node.local_matrix();
        let mut cursor = node.parent;
        while let Some(parent_id) = cursor {
            let parent = self.get(parent_id);
            world = parent.local_matrix() * world;
            cursor = parent.parent;
        }
        world
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for TransformArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, Rotation3, SquareMatrix};

    fn assert_matrix_near(a: Matrix4<f32>, b: Matrix4<f32>) {
        for col in 0..4 {
            for row in 0..4 {
                assert!(
                    (a[col][row] - b[col][row]).abs() < 1e-5,
                    "matrices differ at [{}][{}]: {} vs {}",
                    col,
                    row,
                    a[col][row],
                    b[col][row]
                );
            }
        }
    }

    #[test]
    fn test_root_world_matrix_equals_local() {
        let mut arena = TransformArena::new();
        let mut transform = Transform::from_position(Vector3::new(1.0, 2.0, 3.0));
        transform.rotation = Quaternion::from_angle_y(Deg(45.0));
        let id = arena.alloc(transform);

        assert_matrix_near(arena.world_matrix(id), transform.local_matrix());
    }

    #[test]
    fn test_world_matrix_is_chain_product() {
        let mut arena = TransformArena::new();
        let mut root_t = Transform::from_position(Vector3::new(5.0, 0.0, 0.0));
        root_t.rotation = Quaternion::from_angle_z(Deg(90.0));
        let root = arena.alloc(root_t);

        let mid_t = Transform::from_position(Vector3::new(0.0, 1.0, 0.0));
        let mid = arena.alloc(mid_t);
        arena.set_parent(mid, Some(root)).unwrap();

        let leaf_t = Transform::from_position(Vector3::new(0.0, 0.0, 2.0));
        let leaf = arena.alloc(leaf_t);
        arena.set_parent(leaf, Some(mid)).unwrap();

        let expected = root_t.local_matrix() * mid_t.local_matrix() * leaf_t.local_matrix();
        assert_matrix_near(arena.world_matrix(leaf), expected);
    }

    #[test]
    fn test_parent_translation_shifts_descendants() {
        let mut arena = TransformArena::new();
        let root = arena.alloc(Transform::new());
        let child = arena.alloc(Transform::from_position(Vector3::new(1.0, 0.0, 0.0)));
        let leaf = arena.alloc(Transform::from_position(Vector3::new(0.0, 1.0, 0.0)));
        arena.set_parent(child, Some(root)).unwrap();
        arena.set_parent(leaf, Some(child)).unwrap();

        let before_child = arena.world_matrix(child);
        let before_leaf = arena.world_matrix(leaf);

        let delta = Vector3::new(3.0, -2.0, 7.0);
        arena.get_mut(root).position += delta;

        let after_child = arena.world_matrix(child);
        let after_leaf = arena.world_matrix(leaf);

        for (before, after) in [(before_child, after_child), (before_leaf, after_leaf)] {
            assert!((after[3][0] - before[3][0] - delta.x).abs() < 1e-5);
            assert!((after[3][1] - before[3][1] - delta.y).abs() < 1e-5);
            assert!((after[3][2] - before[3][2] - delta.z).abs() < 1e-5);
        }
    }

    #[test]
    fn test_cycle_is_rejected_and_arena_unchanged() {
        let mut arena = TransformArena::new();
        let a = arena.alloc(Transform::new());
        let b = arena.alloc(Transform::new());
        let c = arena.alloc(Transform::new());
        arena.set_parent(b, Some(a)).unwrap();
        arena.set_parent(c, Some(b)).unwrap();

        assert!(matches!(
            arena.set_parent(a, Some(c)),
            Err(TransformError::Cycle(_))
        ));
        assert!(matches!(
            arena.set_parent(a, Some(a)),
            Err(TransformError::Cycle(_))
        ));

        // The failed edits left the graph intact
        assert_eq!(arena.get(a).parent(), None);
        assert_eq!(arena.get(b).parent(), Some(a));
        assert_eq!(arena.get(c).parent(), Some(b));
    }

    #[test]
    fn test_depth_bound_is_enforced() {
        let mut arena = TransformArena::new();
        let mut previous = arena.alloc(Transform::new());
        for _ in 0..MAX_PARENT_DEPTH {
            let next = arena.alloc(Transform::new());
            arena.set_parent(next, Some(previous)).unwrap();
            previous = next;
        }

        let overflow = arena.alloc(Transform::new());
        assert!(matches!(
            arena.set_parent(overflow, Some(previous)),
            Err(TransformError::DepthExceeded)
        ));
    }

    #[test]
    fn test_reparent_to_none_detaches() {
        let mut arena = TransformArena::new();
        let root = arena.alloc(Transform::from_position(Vector3::new(10.0, 0.0, 0.0)));
        let child = arena.alloc(Transform::new());
        arena.set_parent(child, Some(root)).unwrap();
        arena.set_parent(child, None).unwrap();

        assert_matrix_near(arena.world_matrix(child), Matrix4::identity());
    }
}
