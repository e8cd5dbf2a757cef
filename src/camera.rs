use core::f32;

pub trait Camera {
    fn view_matrix(&self) -> &glam::Mat4;
    fn eye_position(&self) -> glam::Vec3;
}

/// Fixed viewpoints around the terrain, each looking at the origin.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewPreset {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

impl ViewPreset {
    /// Eye position, view direction and up vector for a camera placed
    /// `distance` away from the origin.
    pub fn view(self, distance: f32) -> (glam::Vec3, glam::Vec3, glam::Vec3) {
        use glam::Vec3;
        match self {
            ViewPreset::Top => (Vec3::new(0.0, distance, 0.0), Vec3::NEG_Y, Vec3::NEG_Z),
            ViewPreset::Bottom => (Vec3::new(0.0, -distance, 0.0), Vec3::Y, Vec3::NEG_Z),
            ViewPreset::Left => (Vec3::new(-distance, 0.0, 0.0), Vec3::X, Vec3::Y),
            ViewPreset::Right => (Vec3::new(distance, 0.0, 0.0), Vec3::NEG_X, Vec3::Y),
            ViewPreset::Front => (Vec3::new(0.0, 0.0, distance), Vec3::NEG_Z, Vec3::Y),
            ViewPreset::Back => (Vec3::new(0.0, 0.0, -distance), Vec3::Z, Vec3::Y),
        }
    }
}

/// Camera distance that keeps a `x_segments * z_segments` grid in view.
pub fn preset_distance(x_segments: u32, z_segments: u32) -> f32 {
    x_segments.max(z_segments) as f32 * 1.5
}

#[derive(Debug)]
pub struct FlyCamera {
    pub eye: glam::Vec3,
    pub view_direction: glam::Vec3,
    pub up: glam::Vec3,
    pub mouse_speed: f32,
    old_mouse_position: glam::Vec2,
    view_matrix: glam::Mat4,
}

impl Camera for FlyCamera {
    fn view_matrix(&self) -> &glam::Mat4 {
        &self.view_matrix
    }
    fn eye_position(&self) -> glam::Vec3 {
        self.eye
    }
}

impl Default for FlyCamera {
    fn default() -> Self {
        let mut cam = Self {
            eye: glam::Vec3::ZERO,
            view_direction: glam::Vec3::NEG_Z,
            up: glam::Vec3::Y,
            mouse_speed: 0.005,
            old_mouse_position: glam::Vec2::ZERO,
            view_matrix: glam::Mat4::IDENTITY,
        };
        cam.update();
        cam
    }
}

impl FlyCamera {
    pub fn update(&mut self) {
        self.view_matrix =
            glam::Mat4::look_at_rh(self.eye, self.eye + self.view_direction, self.up);
    }

    pub fn set_view(&mut self, eye: glam::Vec3, view_direction: glam::Vec3, up: glam::Vec3) {
        log::debug!("New view: eye {eye} direction {view_direction} up {up}");
        self.eye = eye;
        self.view_direction = view_direction;
        self.up = up;
        self.update();
    }

    pub fn set_preset(&mut self, preset: ViewPreset, distance: f32) {
        let (eye, direction, up) = preset.view(distance);
        self.set_view(eye, direction, up);
    }

    /// Makes `mouse_position` the reference point for the next
    /// [`FlyCamera::mouse_look`], so the view does not jump when mouse
    /// look is switched on.
    pub fn anchor_mouse(&mut self, mouse_position: glam::Vec2) {
        self.old_mouse_position = mouse_position;
    }

    /// Turns the view direction around the up vector by the horizontal
    /// distance the mouse travelled since the previous call.
    pub fn mouse_look(&mut self, mouse_position: glam::Vec2) {
        let mouse_delta = (mouse_position - self.old_mouse_position) * self.mouse_speed;
        log::trace!("Mouse Delta: {mouse_delta}");
        let rotation = glam::Mat3::from_axis_angle(self.up.normalize(), -mouse_delta.x);
        self.view_direction = rotation * self.view_direction;
        self.old_mouse_position = mouse_position;
        self.update();
    }

    pub fn move_forward(&mut self, speed: f32) {
        self.eye += self.view_direction * speed;
        self.moved();
    }

    pub fn move_backward(&mut self, speed: f32) {
        self.eye -= self.view_direction * speed;
        self.moved();
    }

    pub fn move_left(&mut self, speed: f32) {
        self.eye -= self.right() * speed;
        self.moved();
    }

    pub fn move_right(&mut self, speed: f32) {
        self.eye += self.right() * speed;
        self.moved();
    }

    pub fn move_up(&mut self, speed: f32) {
        self.eye += self.up * speed;
        self.moved();
    }

    pub fn move_down(&mut self, speed: f32) {
        self.eye -= self.up * speed;
        self.moved();
    }

    fn right(&self) -> glam::Vec3 {
        self.view_direction.cross(self.up).normalize()
    }

    fn moved(&mut self) {
        log::debug!("Camera position: {}", self.eye);
        self.update();
    }
}

/// Perspective projection that follows the window aspect ratio.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    pub fovy: f32,
    pub z_near: f32,
    pub z_far: f32,
    aspect: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fovy: 45_f32.to_radians(),
            z_near: 0.1,
            z_far: 1000.0,
            aspect: 16.0 / 9.0,
        }
    }
}

impl Projection {
    pub fn update_aspect(&mut self, window_size: glam::UVec2) {
        self.aspect = if window_size.x == 0 || window_size.y == 0 {
            1.0
        } else {
            window_size.x as f32 / window_size.y as f32
        };
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn matrix(&self) -> glam::Mat4 {
        glam::Mat4::perspective_rh(self.fovy, self.aspect, self.z_near, self.z_far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: glam::Vec3, b: glam::Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn top_preset_looks_down_at_origin() {
        let mut cam = FlyCamera::default();
        cam.set_preset(ViewPreset::Top, preset_distance(40, 10));
        assert_eq!(cam.eye, glam::Vec3::new(0.0, 60.0, 0.0));
        let origin_in_view = cam.view_matrix().transform_point3(glam::Vec3::ZERO);
        assert!(approx(origin_in_view, glam::Vec3::new(0.0, 0.0, -60.0)));
    }

    #[test]
    fn every_preset_faces_origin() {
        use ViewPreset::*;
        for preset in [Top, Bottom, Left, Right, Front, Back] {
            let (eye, dir, up) = preset.view(10.0);
            assert!(approx(eye + dir * 10.0, glam::Vec3::ZERO), "{preset:?}");
            assert_eq!(dir.dot(up), 0.0);
        }
    }

    #[test]
    fn strafing_is_perpendicular_to_view() {
        let mut cam = FlyCamera::default();
        cam.set_view(glam::Vec3::ZERO, glam::Vec3::NEG_Z, glam::Vec3::Y);
        cam.move_right(5.0);
        assert!(approx(cam.eye, glam::Vec3::new(5.0, 0.0, 0.0)));
        cam.move_left(5.0);
        cam.move_forward(2.0);
        cam.move_up(1.0);
        assert!(approx(cam.eye, glam::Vec3::new(0.0, 1.0, -2.0)));
        cam.move_backward(2.0);
        cam.move_down(1.0);
        assert!(approx(cam.eye, glam::Vec3::ZERO));
    }

    #[test]
    fn mouse_look_turns_around_up() {
        let mut cam = FlyCamera::default();
        cam.set_view(glam::Vec3::ZERO, glam::Vec3::NEG_Z, glam::Vec3::Y);
        let quarter_turn = f32::consts::FRAC_PI_2 / cam.mouse_speed;
        cam.mouse_look(glam::Vec2::new(quarter_turn, 0.0));
        // Moving the mouse right turns the view right.
        assert!(approx(cam.view_direction, glam::Vec3::X));
        // Vertical motion is ignored.
        cam.mouse_look(glam::Vec2::new(quarter_turn, 250.0));
        assert!(approx(cam.view_direction, glam::Vec3::X));
    }

    #[test]
    fn anchored_mouse_does_not_jump() {
        let mut cam = FlyCamera::default();
        cam.set_view(glam::Vec3::ZERO, glam::Vec3::NEG_Z, glam::Vec3::Y);
        let cursor = glam::Vec2::new(640.0, 360.0);
        cam.anchor_mouse(cursor);
        cam.mouse_look(cursor);
        assert!(approx(cam.view_direction, glam::Vec3::NEG_Z));
        cam.mouse_look(cursor + glam::Vec2::new(f32::consts::FRAC_PI_2 / cam.mouse_speed, 0.0));
        assert!(approx(cam.view_direction, glam::Vec3::X));
    }

    #[test]
    fn projection_handles_zero_sized_window() {
        let mut projection = Projection::default();
        projection.update_aspect(glam::UVec2::new(0, 600));
        assert_eq!(projection.aspect(), 1.0);
        projection.update_aspect(glam::UVec2::new(800, 400));
        assert_eq!(projection.aspect(), 2.0);
    }
}
