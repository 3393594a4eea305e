use std::sync::Arc;

use glam::Affine3A;
use marionette_core::interner::{self, BoneName};
use marionette_core::{MarionetteError, Result, Transform};

use crate::skeleton::Skeleton;

/// Runtime state of one bone of a [`SkeletonInstance`].
#[derive(Debug, Clone)]
pub struct BoneNode {
    pub index: usize,
    pub name: BoneName,
    pub parent: Option<usize>,

    /// `motion_matrix * user_offset_matrix`.
    pub(crate) local_matrix: Affine3A,
    /// `parent.global_matrix * local_matrix`; stale while `is_dirty`.
    pub(crate) global_matrix: Affine3A,
    /// Parent-relative pose written by the motion system.
    pub(crate) motion_matrix: Affine3A,
    /// Extra parent-relative offset applied after the motion (procedural
    /// look-at, recoil...).
    pub(crate) user_offset_matrix: Affine3A,
    pub(crate) is_dirty: bool,
}

impl BoneNode {
    #[inline]
    #[must_use]
    pub fn name_str(&self) -> &'static str {
        interner::resolve(self.name)
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &Affine3A {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn motion_matrix(&self) -> &Affine3A {
        &self.motion_matrix
    }

    #[inline]
    #[must_use]
    pub fn user_offset_matrix(&self) -> &Affine3A {
        &self.user_offset_matrix
    }

    /// Whether the cached global matrix needs to be recomputed.
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    fn set_motion(&mut self, matrix: Affine3A) {
        self.motion_matrix = matrix;
        self.local_matrix = self.motion_matrix * self.user_offset_matrix;
        self.is_dirty = true;
    }
}

/// Per-entity pose of a shared [`Skeleton`].
///
/// Owns no asset data. Motion matrices are written by
/// [`MotionSystem`](crate::system::MotionSystem); global matrices are derived
/// lazily on first access after a change.
#[derive(Debug, Clone)]
pub struct SkeletonInstance {
    skeleton: Arc<Skeleton>,
    nodes: Vec<BoneNode>,
    // Set when a motion pose was bound; cleared by `set_identity`.
    dirty: bool,
    globals_dirty: bool,
}

impl SkeletonInstance {
    #[must_use]
    pub fn new(skeleton: Arc<Skeleton>) -> Self {
        let nodes = skeleton
            .bones()
            .iter()
            .enumerate()
            .map(|(index, bone)| {
                let bind = bone.default_local.to_affine();
                BoneNode {
                    index,
                    name: bone.name,
                    parent: bone.parent,
                    local_matrix: bind,
                    global_matrix: Affine3A::IDENTITY,
                    motion_matrix: bind,
                    user_offset_matrix: Affine3A::IDENTITY,
                    is_dirty: true,
                }
            })
            .collect();

        Self {
            skeleton,
            nodes,
            dirty: false,
            globals_dirty: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&BoneNode> {
        self.nodes.get(index)
    }

    #[must_use]
    pub fn bone_by_name(&self, name: &str) -> Option<&BoneNode> {
        self.nodes.get(self.skeleton.find_bone(name)?)
    }

    pub fn bones(&self) -> impl ExactSizeIterator<Item = &BoneNode> {
        self.nodes.iter()
    }

    fn node_mut(&mut self, index: usize) -> Result<&mut BoneNode> {
        let count = self.nodes.len();
        self.nodes
            .get_mut(index)
            .ok_or_else(|| MarionetteError::bone_out_of_range(index, count))
    }

    pub fn set_motion_matrix(&mut self, index: usize, matrix: Affine3A) -> Result<()> {
        self.node_mut(index)?.set_motion(matrix);
        self.globals_dirty = true;
        Ok(())
    }

    pub fn set_user_offset(&mut self, index: usize, matrix: Affine3A) -> Result<()> {
        let node = self.node_mut(index)?;
        node.user_offset_matrix = matrix;
        node.local_matrix = node.motion_matrix * matrix;
        node.is_dirty = true;
        self.globals_dirty = true;
        Ok(())
    }

    /// Writes a full pose, one parent-relative transform per bone. Extra
    /// transforms are ignored; bones without one keep their matrix.
    pub(crate) fn bind_pose(&mut self, pose: &[Transform]) {
        for (node, transform) in self.nodes.iter_mut().zip(pose) {
            node.set_motion(transform.to_affine());
        }
        self.globals_dirty = true;
    }

    /// Marks the instance as driven by a motion pose.
    #[inline]
    pub fn set_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Resets every motion matrix to the skeleton's bind pose and clears the
    /// dirty flag. User offsets are preserved.
    pub fn set_identity(&mut self) {
        for (node, bone) in self.nodes.iter_mut().zip(self.skeleton.bones()) {
            node.set_motion(bone.default_local.to_affine());
        }
        self.globals_dirty = true;
        self.dirty = false;
    }

    /// Recomputes stale global matrices.
    ///
    /// Parents precede children, so one forward pass suffices; a bone is
    /// recomputed when it or any ancestor changed.
    pub fn update_global_matrices(&mut self) {
        if !self.globals_dirty {
            return;
        }

        for index in 0..self.nodes.len() {
            let (parent_global, parent_dirty) = match self.nodes[index].parent {
                Some(parent) => {
                    let p = &self.nodes[parent];
                    (p.global_matrix, p.is_dirty)
                }
                None => (Affine3A::IDENTITY, false),
            };

            let node = &mut self.nodes[index];
            if node.is_dirty || parent_dirty {
                node.global_matrix = parent_global * node.local_matrix;
                node.is_dirty = true;
            }
        }

        // Children read their parent's flag above, so clear after the pass.
        for node in &mut self.nodes {
            node.is_dirty = false;
        }
        self.globals_dirty = false;
    }

    /// Model-space matrix of a bone.
    pub fn global_matrix(&mut self, index: usize) -> Result<Affine3A> {
        if index >= self.nodes.len() {
            return Err(MarionetteError::bone_out_of_range(index, self.nodes.len()));
        }
        self.update_global_matrices();
        Ok(self.nodes[index].global_matrix)
    }

    /// All model-space matrices, in bone order.
    pub fn global_matrices(&mut self) -> impl ExactSizeIterator<Item = Affine3A> + '_ {
        self.update_global_matrices();
        self.nodes.iter().map(|n| n.global_matrix)
    }
}
