use glam::{Affine3A, EulerRot, Mat4, Quat, Vec3};

/// Scale / rotation / translation triple.
///
/// The unit of keyframe interpolation and pose blending. Unlike a scene-graph
/// transform it carries no matrix cache: matrices are produced on demand with
/// [`Transform::to_affine`] when a pose is bound to a skeleton instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        scale: Vec3::ONE,
        rotation: Quat::IDENTITY,
        translation: Vec3::ZERO,
    };

    #[must_use]
    pub const fn new(scale: Vec3, rotation: Quat, translation: Vec3) -> Self {
        Self {
            scale,
            rotation,
            translation,
        }
    }

    #[must_use]
    pub const fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub const fn from_rotation(rotation: Quat) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub const fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::IDENTITY
        }
    }

    /// Helper: builds a rotation from XYZ euler angles.
    #[must_use]
    pub fn from_euler(x: f32, y: f32, z: f32) -> Self {
        Self::from_rotation(Quat::from_euler(EulerRot::XYZ, x, y, z))
    }

    /// Decomposes an affine matrix.
    ///
    /// Shear is lost in the decomposition.
    #[must_use]
    pub fn from_affine(mat: &Affine3A) -> Self {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        Self {
            scale,
            rotation,
            translation,
        }
    }

    /// Composes the TRS triple into an affine matrix.
    #[inline]
    #[must_use]
    pub fn to_affine(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    #[inline]
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from(self.to_affine())
    }

    /// Interpolates toward `other`: lerp on scale and translation, slerp on
    /// rotation.
    #[inline]
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            scale: self.scale.lerp(other.scale, t),
            rotation: self.rotation.slerp(other.rotation, t),
            translation: self.translation.lerp(other.translation, t),
        }
    }

    /// Component-wise comparison with tolerance. Rotations compare as
    /// orientations, so `q` and `-q` are equal.
    #[must_use]
    pub fn abs_diff_eq(&self, other: &Self, max_abs_diff: f32) -> bool {
        self.scale.abs_diff_eq(other.scale, max_abs_diff)
            && self.translation.abs_diff_eq(other.translation, max_abs_diff)
            && self.rotation.dot(other.rotation).abs() >= 1.0 - max_abs_diff
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<Transform> for Affine3A {
    fn from(t: Transform) -> Self {
        t.to_affine()
    }
}
