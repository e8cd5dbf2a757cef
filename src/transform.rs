/// A 4x4 affine transform owned by a scene node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    matrix: glam::Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: glam::Mat4::IDENTITY,
        }
    }
}

impl Transform {
    pub fn load_identity(&mut self) {
        self.matrix = glam::Mat4::IDENTITY;
    }

    pub fn translate(&mut self, offset: glam::Vec3) {
        self.matrix *= glam::Mat4::from_translation(offset);
    }

    pub fn rotate(&mut self, angle: f32, axis: glam::Vec3) {
        self.matrix *= glam::Mat4::from_axis_angle(axis.normalize(), angle);
    }

    pub fn scale(&mut self, factor: glam::Vec3) {
        self.matrix *= glam::Mat4::from_scale(factor);
    }

    pub fn matrix(&self) -> &glam::Mat4 {
        &self.matrix
    }

    pub fn set_matrix(&mut self, matrix: glam::Mat4) {
        self.matrix = matrix;
    }

    /// Composes this (local) transform under `parent`.
    pub fn apply(&self, parent: &glam::Mat4) -> glam::Mat4 {
        *parent * self.matrix
    }
}
