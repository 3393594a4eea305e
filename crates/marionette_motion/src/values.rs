use glam::{Quat, Vec3};
use marionette_core::Transform;

/// A value a keyframe track can interpolate between.
pub trait Interpolatable: Clone {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;
}

impl Interpolatable for f32 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.lerp(*end, t)
    }
}

impl Interpolatable for Quat {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.slerp(*end, t)
    }
}

impl Interpolatable for Transform {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}
