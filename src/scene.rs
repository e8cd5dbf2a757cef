//! Scene graph: an owned tree of nodes that each carry a local transform,
//! an optional drawable object and the per-frame uniform state for it.
//!
//! A frame runs in two traversals. [`SceneNode::update`] walks the tree
//! top-down, composing world transforms and snapshotting camera, wave and
//! light state into [`NodeUniforms`]. [`SceneNode::draw`] then visits the
//! drawable nodes in the same pre-order so the renderer can issue one draw
//! per node.

use bytemuck::Zeroable;

use crate::geometry::Geometry;
use crate::lighting::{
    DirectionalLight, DirectionalLightRaw, POINT_LIGHT_COUNT, PointLight, PointLightRaw,
    point_light_layout,
};
use crate::terrain::{RenderMode, Terrain};
use crate::transform::Transform;
use crate::wave::{PlaneMode, WaveParams};

pub const MATERIAL_SHININESS: f32 = 32.0;

/// Anything the renderer can draw from a scene node.
pub trait SceneObject {
    fn geometry(&self) -> &Geometry;
    fn render_mode(&self) -> RenderMode;
    fn set_render_mode(&mut self, render_mode: RenderMode);
}

impl SceneObject for Terrain {
    fn geometry(&self) -> &Geometry {
        Terrain::geometry(self)
    }
    fn render_mode(&self) -> RenderMode {
        Terrain::render_mode(self)
    }
    fn set_render_mode(&mut self, render_mode: RenderMode) {
        Terrain::set_render_mode(self, render_mode)
    }
}

/// Per-frame values handed down the tree.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    pub projection: glam::Mat4,
    pub view: glam::Mat4,
    pub eye: glam::Vec3,
    pub delta_ms: f32,
}

/// Uniform block consumed by `terrain.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct NodeUniforms {
    pub model: glam::Mat4,
    pub view: glam::Mat4,
    pub projection: glam::Mat4,
    pub view_pos: glam::Vec3,
    pub time: f32,
    pub amplitude: f32,
    pub wave_number: f32,
    pub wave_period: f32,
    pub shininess: f32,
    pub plane_mode: u32,
    pub point_light_count: u32,
    _padding: [u32; 2],
    pub dir_light: DirectionalLightRaw,
    pub point_lights: [PointLightRaw; POINT_LIGHT_COUNT],
}

impl Default for NodeUniforms {
    fn default() -> Self {
        Self::zeroed()
    }
}

pub struct SceneNode {
    object: Option<Box<dyn SceneObject>>,
    children: Vec<SceneNode>,
    local_transform: Transform,
    world_transform: Transform,
    pub wave: WaveParams,
    pub plane_mode: PlaneMode,
    pub dir_light: DirectionalLight,
    pub point_lights: [PointLight; POINT_LIGHT_COUNT],
    elapsed_ms: f32,
    uniforms: NodeUniforms,
}

impl SceneNode {
    /// A node without an object; it only groups and transforms children.
    pub fn group() -> Self {
        Self {
            object: None,
            children: Vec::new(),
            local_transform: Transform::default(),
            world_transform: Transform::default(),
            wave: WaveParams::default(),
            plane_mode: PlaneMode::default(),
            dir_light: DirectionalLight::default(),
            point_lights: point_light_layout(0, 0),
            elapsed_ms: 0.0,
            uniforms: NodeUniforms::default(),
        }
    }

    pub fn new(object: Box<dyn SceneObject>) -> Self {
        Self {
            object: Some(object),
            ..Self::group()
        }
    }

    /// A terrain node whose point lights are spread over the grid.
    pub fn terrain(terrain: Terrain) -> Self {
        let point_lights = point_light_layout(terrain.x_segments(), terrain.z_segments());
        Self {
            point_lights,
            ..Self::new(Box::new(terrain))
        }
    }

    pub fn add_child(&mut self, node: SceneNode) {
        self.children.push(node);
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [SceneNode] {
        &mut self.children
    }

    pub fn object(&self) -> Option<&dyn SceneObject> {
        self.object.as_deref()
    }

    pub fn object_mut(&mut self) -> Option<&mut (dyn SceneObject + 'static)> {
        self.object.as_deref_mut()
    }

    pub fn local_transform(&mut self) -> &mut Transform {
        &mut self.local_transform
    }

    pub fn world_transform(&self) -> &Transform {
        &self.world_transform
    }

    pub fn uniforms(&self) -> &NodeUniforms {
        &self.uniforms
    }

    /// Elapsed animation time in the units the shader expects.
    pub fn time(&self) -> f32 {
        self.elapsed_ms / 60.0
    }

    /// Advances this node's clock, composes its world transform under
    /// `parent_world` and refreshes its uniforms, then recurses into every
    /// child.
    pub fn update(&mut self, parent_world: &glam::Mat4, frame: &FrameContext) {
        self.elapsed_ms += frame.delta_ms;
        let world = self.local_transform.apply(parent_world);
        self.world_transform.set_matrix(world);

        if self.object.is_some() {
            let mut point_lights = [PointLightRaw::zeroed(); POINT_LIGHT_COUNT];
            for (raw, light) in point_lights.iter_mut().zip(&self.point_lights) {
                *raw = light.to_raw();
            }
            self.uniforms = NodeUniforms {
                model: world,
                view: frame.view,
                projection: frame.projection,
                view_pos: frame.eye,
                time: self.time(),
                amplitude: self.wave.amplitude,
                wave_number: self.wave.wave_number,
                wave_period: self.wave.wave_period,
                shininess: MATERIAL_SHININESS,
                plane_mode: self.plane_mode.id(),
                point_light_count: POINT_LIGHT_COUNT as u32,
                _padding: [0; 2],
                dir_light: self.dir_light.to_raw(),
                point_lights,
            };
        }

        for child in &mut self.children {
            child.update(&world, frame);
        }
    }

    /// Visits every node that carries an object, parents before children.
    pub fn draw<F: FnMut(&SceneNode)>(&self, visit: &mut F) {
        if self.object.is_some() {
            visit(self);
        }
        for child in &self.children {
            child.draw(visit);
        }
    }

    /// Number of nodes [`SceneNode::draw`] will visit.
    pub fn drawable_count(&self) -> usize {
        let mut count = 0;
        self.draw(&mut |_: &SceneNode| count += 1);
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(delta_ms: f32) -> FrameContext {
        FrameContext {
            projection: glam::Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0),
            view: glam::Mat4::look_at_rh(
                glam::Vec3::new(0.0, 9.0, 0.0),
                glam::Vec3::ZERO,
                glam::Vec3::NEG_Z,
            ),
            eye: glam::Vec3::new(0.0, 9.0, 0.0),
            delta_ms,
        }
    }

    fn terrain_node() -> SceneNode {
        SceneNode::terrain(Terrain::flat(4, 4).unwrap())
    }

    #[test]
    fn uniform_block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<NodeUniforms>(), 896);
        assert_eq!(std::mem::size_of::<NodeUniforms>() % 16, 0);
    }

    #[test]
    fn world_transforms_compose_down_the_tree() {
        let mut root = terrain_node();
        root.local_transform().translate(glam::Vec3::new(1.0, 0.0, 0.0));
        let mut child = terrain_node();
        child.local_transform().translate(glam::Vec3::new(0.0, 2.0, 0.0));
        let mut grandchild = terrain_node();
        grandchild.local_transform().scale(glam::Vec3::splat(2.0));
        child.add_child(grandchild);
        root.add_child(child);

        root.update(&glam::Mat4::IDENTITY, &frame(16.0));

        let grandchild = &root.children()[0].children()[0];
        let origin = grandchild.world_transform().matrix().transform_point3(glam::Vec3::ZERO);
        assert_eq!(origin, glam::Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(grandchild.uniforms().model, *grandchild.world_transform().matrix());
    }

    #[test]
    fn every_child_is_updated() {
        let mut root = SceneNode::group();
        for i in 0..3 {
            let mut child = terrain_node();
            child.wave.amplitude = i as f32;
            root.add_child(child);
        }
        root.update(&glam::Mat4::IDENTITY, &frame(60.0));
        for (i, child) in root.children().iter().enumerate() {
            assert_eq!(child.uniforms().amplitude, i as f32);
            assert_eq!(child.uniforms().time, 1.0);
            assert_eq!(child.uniforms().view_pos, glam::Vec3::new(0.0, 9.0, 0.0));
        }
    }

    #[test]
    fn group_nodes_propagate_transforms() {
        let mut root = SceneNode::group();
        root.local_transform().translate(glam::Vec3::new(0.0, 0.0, 3.0));
        root.add_child(terrain_node());
        root.update(&glam::Mat4::IDENTITY, &frame(1.0));
        let model = root.children()[0].uniforms().model;
        assert_eq!(model.w_axis.z, 3.0);
        // A group has nothing to draw, so its uniforms stay untouched.
        assert_eq!(root.uniforms().model, glam::Mat4::ZERO);
    }

    #[test]
    fn time_accumulates_in_sixtieths() {
        let mut node = terrain_node();
        node.update(&glam::Mat4::IDENTITY, &frame(30.0));
        node.update(&glam::Mat4::IDENTITY, &frame(90.0));
        assert_eq!(node.time(), 2.0);
        assert_eq!(node.uniforms().time, 2.0);
    }

    #[test]
    fn uniforms_carry_wave_and_lights() {
        let mut node = terrain_node();
        node.plane_mode = PlaneMode::XyAxis;
        node.wave.wave_number = 1.5;
        node.update(&glam::Mat4::IDENTITY, &frame(1.0));
        let u = node.uniforms();
        assert_eq!(u.plane_mode, 2);
        assert_eq!(u.wave_number, 1.5);
        assert_eq!(u.shininess, MATERIAL_SHININESS);
        assert_eq!(u.point_light_count, 13);
        assert_eq!(u.point_lights[0].position, glam::Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(u.point_lights[4].position, glam::Vec3::new(1.6, 5.0, 1.6));
        assert_eq!(u.dir_light.specular_strength, 0.3);
    }

    #[test]
    fn draw_visits_drawables_in_preorder() {
        let mut root = SceneNode::group();
        let mut a = terrain_node();
        a.wave.amplitude = 1.0;
        let mut b = terrain_node();
        b.wave.amplitude = 2.0;
        let mut c = terrain_node();
        c.wave.amplitude = 3.0;
        a.add_child(b);
        root.add_child(a);
        root.add_child(c);

        let mut order = Vec::new();
        root.draw(&mut |node: &SceneNode| order.push(node.wave.amplitude));
        assert_eq!(order, vec![1.0, 2.0, 3.0]);
        assert_eq!(root.drawable_count(), 3);
    }

    #[test]
    fn render_mode_reaches_the_object() {
        let mut node = terrain_node();
        if let Some(object) = node.object_mut() {
            object.set_render_mode(RenderMode::Points);
        }
        assert_eq!(node.object().unwrap().render_mode(), RenderMode::Points);
    }
}
