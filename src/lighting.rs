pub const POINT_LIGHT_COUNT: usize = 13;
pub const POINT_LIGHT_HEIGHT: f32 = 5.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    pub direction: glam::Vec3,
    pub color: glam::Vec3,
    pub ambient_intensity: f32,
    pub specular_strength: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: glam::Vec3::new(0.0, 5.0, 0.0),
            color: glam::Vec3::ONE,
            ambient_intensity: 0.1,
            specular_strength: 0.3,
        }
    }
}

impl DirectionalLight {
    pub fn to_raw(&self) -> DirectionalLightRaw {
        DirectionalLightRaw {
            direction: self.direction,
            ambient_intensity: self.ambient_intensity,
            color: self.color,
            specular_strength: self.specular_strength,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub position: glam::Vec3,
    pub color: glam::Vec3,
    pub ambient_intensity: f32,
    pub specular_strength: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    pub fn at(position: glam::Vec3) -> Self {
        Self {
            position,
            color: glam::Vec3::ONE,
            ambient_intensity: 8.0,
            specular_strength: 0.2,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }

    /// Distance falloff used by the fragment shader.
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    pub fn to_raw(&self) -> PointLightRaw {
        PointLightRaw {
            position: self.position,
            ambient_intensity: self.ambient_intensity,
            color: self.color,
            specular_strength: self.specular_strength,
            constant: self.constant,
            linear: self.linear,
            quadratic: self.quadratic,
            _padding: 0.0,
        }
    }
}

/// Thirteen point lights hung over a `x_segments * z_segments` grid:
/// the centre, the four corners, four inner corners and four edge
/// midpoints.
pub fn point_light_layout(x_segments: u32, z_segments: u32) -> [PointLight; POINT_LIGHT_COUNT] {
    let ox = (x_segments / 2) as f32 * 0.8;
    let oz = (z_segments / 2) as f32 * 0.8;
    let h = POINT_LIGHT_HEIGHT;
    [
        glam::Vec3::new(0.0, h, 0.0),
        glam::Vec3::new(-ox, h, -oz),
        glam::Vec3::new(-ox, h, oz),
        glam::Vec3::new(ox, h, -oz),
        glam::Vec3::new(ox, h, oz),
        glam::Vec3::new(-ox / 1.75, h, -oz / 1.75),
        glam::Vec3::new(-ox / 1.75, h, oz / 1.75),
        glam::Vec3::new(ox / 1.75, h, -oz / 1.75),
        glam::Vec3::new(ox / 1.75, h, oz / 1.75),
        glam::Vec3::new(-ox / 1.25, h, 0.0),
        glam::Vec3::new(ox / 1.25, h, 0.0),
        glam::Vec3::new(0.0, h, -oz / 1.25),
        glam::Vec3::new(0.0, h, oz / 1.25),
    ]
    .map(PointLight::at)
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRaw {
    pub direction: glam::Vec3,
    pub ambient_intensity: f32,
    pub color: glam::Vec3,
    pub specular_strength: f32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    pub position: glam::Vec3,
    pub ambient_intensity: f32,
    pub color: glam::Vec3,
    pub specular_strength: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    _padding: f32,
}
