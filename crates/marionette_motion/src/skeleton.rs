use marionette_core::interner::{self, BoneName};
use marionette_core::{MarionetteError, Result, Transform};
use rustc_hash::FxHashMap;
use uuid::Uuid;

/// A node of the bind-pose hierarchy.
#[derive(Debug, Clone)]
pub struct Bone {
    pub name: BoneName,
    /// Parent bone index, `None` for roots. Always smaller than the bone's own
    /// index.
    pub parent: Option<usize>,
    /// Parent-relative transform of the bind pose.
    pub default_local: Transform,
}

impl Bone {
    #[must_use]
    pub fn new(name: &str, parent: Option<usize>, default_local: Transform) -> Self {
        Self {
            name: interner::intern(name),
            parent,
            default_local,
        }
    }

    #[inline]
    #[must_use]
    pub fn name_str(&self) -> &'static str {
        interner::resolve(self.name)
    }
}

/// Immutable bind-pose bone hierarchy, shared by every instance of a model.
#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    pub name: String,

    // Ordered so that parents always precede children; a single forward pass
    // over `bones` visits every parent before its descendants.
    bones: Vec<Bone>,
    lookup: FxHashMap<BoneName, usize>,
}

impl Skeleton {
    pub fn new(name: &str, bones: Vec<Bone>) -> Result<Self> {
        let mut lookup = FxHashMap::default();
        lookup.reserve(bones.len());

        for (index, bone) in bones.iter().enumerate() {
            if let Some(parent) = bone.parent
                && parent >= index
            {
                return Err(MarionetteError::InvalidHierarchy {
                    bone: index,
                    parent,
                });
            }
            if lookup.insert(bone.name, index).is_some() {
                return Err(MarionetteError::InvalidArgument(format!(
                    "duplicate bone name '{}' in skeleton '{name}'",
                    bone.name_str()
                )));
            }
        }

        log::debug!("Skeleton '{name}' created with {} bones", bones.len());

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            bones,
            lookup,
        })
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[inline]
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    #[inline]
    #[must_use]
    pub fn bone_index(&self, name: BoneName) -> Option<usize> {
        self.lookup.get(&name).copied()
    }

    /// Looks a bone up by its string name.
    #[must_use]
    pub fn find_bone(&self, name: &str) -> Option<usize> {
        self.bone_index(interner::get(name)?)
    }

    /// The bind pose, one parent-relative transform per bone.
    pub fn bind_pose(&self) -> impl ExactSizeIterator<Item = Transform> + '_ {
        self.bones.iter().map(|b| b.default_local)
    }
}
