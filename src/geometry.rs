use crate::error::{Result, TerrainError};

/// Placeholder used for normals, tangents and bitangents until a face
/// contributes a real frame.
const PLACEHOLDER_AXIS: glam::Vec3 = glam::Vec3::Z;

/// Interleaved vertex layout for normal-mapped terrain: 14 floats.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: glam::Vec3,
    pub normal: glam::Vec3,
    pub uv: glam::Vec2,
    pub tangent: glam::Vec3,
    pub bitangent: glam::Vec3,
}

impl TerrainVertex {
    pub const FLOATS: usize = 14;

    const ATTRIBS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
        4 => Float32x3
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TerrainVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// CPU-side mesh builder.
///
/// Vertices are added one at a time, then indices (either raw with
/// [`Geometry::add_index`] or per triangle with [`Geometry::make_triangle`]).
/// Every triangle that goes through [`Geometry::compute_face_frame`]
/// contributes a face normal, tangent and bitangent to its three corners;
/// the contributions are averaged when [`Geometry::generate`] interleaves the
/// final vertex array.
#[derive(Debug, Default, Clone)]
pub struct Geometry {
    positions: Vec<glam::Vec3>,
    tex_coords: Vec<glam::Vec2>,
    normals: Vec<glam::Vec3>,
    tangents: Vec<glam::Vec3>,
    bitangents: Vec<glam::Vec3>,
    face_counts: Vec<u32>,
    indices: Vec<u32>,
    vertices: Vec<TerrainVertex>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) {
        self.positions.push(glam::Vec3::new(x, y, z));
        self.normals.push(PLACEHOLDER_AXIS);
        self.tangents.push(PLACEHOLDER_AXIS);
        self.bitangents.push(PLACEHOLDER_AXIS);
        self.face_counts.push(0);
    }

    pub fn add_tex_coord(&mut self, s: f32, t: f32) {
        self.tex_coords.push(glam::Vec2::new(s, t));
    }

    /// Appends a single index. Indices that do not name an existing
    /// vertex are rejected and never stored.
    pub fn add_index(&mut self, index: u32) -> Result<()> {
        self.check_index(index)?;
        self.indices.push(index);
        Ok(())
    }

    pub fn make_triangle(&mut self, v0: u32, v1: u32, v2: u32) -> Result<()> {
        self.compute_face_frame(v0, v1, v2)?;
        self.indices.extend_from_slice(&[v0, v1, v2]);
        Ok(())
    }

    /// Accumulates the face normal, tangent and bitangent of the triangle
    /// `(v0, v1, v2)` into its corners without emitting any index.
    pub fn compute_face_frame(&mut self, v0: u32, v1: u32, v2: u32) -> Result<()> {
        for index in [v0, v1, v2] {
            self.check_index(index)?;
        }
        let (i0, i1, i2) = (v0 as usize, v1 as usize, v2 as usize);

        let edge_u = self.positions[i1] - self.positions[i0];
        let edge_v = self.positions[i2] - self.positions[i0];
        let normal = edge_u.cross(edge_v);

        // Tangent space needs UVs on all three corners.
        let frame = match (
            self.tex_coords.get(i0),
            self.tex_coords.get(i1),
            self.tex_coords.get(i2),
        ) {
            (Some(t0), Some(t1), Some(t2)) => tangent_frame(edge_u, edge_v, *t1 - *t0, *t2 - *t0),
            _ => None,
        };

        for i in [i0, i1, i2] {
            if self.face_counts[i] == 0 {
                self.normals[i] = glam::Vec3::ZERO;
                self.tangents[i] = glam::Vec3::ZERO;
                self.bitangents[i] = glam::Vec3::ZERO;
            }
            self.face_counts[i] += 1;
            self.normals[i] += normal;
            if let Some((tangent, bitangent)) = frame {
                self.tangents[i] += tangent;
                self.bitangents[i] += bitangent;
            }
        }
        Ok(())
    }

    /// Builds the interleaved vertex array from everything added so far.
    pub fn generate(&mut self) -> Result<()> {
        if !self.tex_coords.is_empty() && self.tex_coords.len() != self.positions.len() {
            return Err(TerrainError::TexCoordMismatch {
                vertices: self.positions.len(),
                tex_coords: self.tex_coords.len(),
            });
        }

        self.vertices = (0..self.positions.len())
            .map(|i| TerrainVertex {
                position: self.positions[i],
                normal: normalize_or_placeholder(self.normals[i]),
                uv: self.tex_coords.get(i).copied().unwrap_or(glam::Vec2::ZERO),
                tangent: normalize_or_placeholder(self.tangents[i]),
                bitangent: normalize_or_placeholder(self.bitangents[i]),
            })
            .collect();
        log::debug!(
            "Generated geometry: {} vertices, {} indices",
            self.vertices.len(),
            self.indices.len()
        );
        Ok(())
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[glam::Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    pub fn size_in_bytes(&self) -> usize {
        std::mem::size_of_val(self.vertices.as_slice())
    }

    fn check_index(&self, index: u32) -> Result<()> {
        if (index as usize) < self.positions.len() {
            Ok(())
        } else {
            log::warn!(
                "Rejected index {index}, only {} vertices",
                self.positions.len()
            );
            Err(TerrainError::IndexOutOfRange {
                index,
                vertex_count: self.positions.len(),
            })
        }
    }
}

/// Tangent and bitangent of a face from its two edges and UV deltas.
/// Returns `None` when the UV mapping is degenerate.
fn tangent_frame(
    edge_u: glam::Vec3,
    edge_v: glam::Vec3,
    delta_uv0: glam::Vec2,
    delta_uv1: glam::Vec2,
) -> Option<(glam::Vec3, glam::Vec3)> {
    let det = delta_uv0.x * delta_uv1.y - delta_uv1.x * delta_uv0.y;
    if det.abs() <= f32::EPSILON {
        return None;
    }
    let f = 1.0 / det;
    let tangent = f * (delta_uv1.y * edge_u - delta_uv0.y * edge_v);
    let bitangent = f * (-delta_uv1.x * edge_u + delta_uv0.x * edge_v);
    Some((tangent.try_normalize()?, bitangent.try_normalize()?))
}

fn normalize_or_placeholder(v: glam::Vec3) -> glam::Vec3 {
    v.try_normalize().unwrap_or(PLACEHOLDER_AXIS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        let mut g = Geometry::new();
        g.add_vertex(-1.0, -1.0, 0.0);
        g.add_tex_coord(0.0, 0.0);
        g.add_vertex(1.0, -1.0, 0.0);
        g.add_tex_coord(1.0, 0.0);
        g.add_vertex(1.0, 1.0, 0.0);
        g.add_tex_coord(1.0, 1.0);
        g.add_vertex(-1.0, 1.0, 0.0);
        g.add_tex_coord(0.0, 1.0);
        g
    }

    fn approx(a: glam::Vec3, b: glam::Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn vertex_layout_is_fourteen_floats() {
        assert_eq!(
            std::mem::size_of::<TerrainVertex>(),
            TerrainVertex::FLOATS * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn quad_gets_facing_frame() {
        let mut g = quad();
        g.make_triangle(0, 1, 2).unwrap();
        g.make_triangle(2, 3, 0).unwrap();
        g.generate().unwrap();

        assert_eq!(g.indices(), &[0, 1, 2, 2, 3, 0]);
        for v in g.vertices() {
            assert!(approx(v.normal, glam::Vec3::Z));
            assert!(approx(v.tangent, glam::Vec3::X));
            assert!(approx(v.bitangent, glam::Vec3::Y));
        }
        assert_eq!(g.vertices()[2].uv, glam::Vec2::new(1.0, 1.0));
    }

    #[test]
    fn add_index_rejects_out_of_range() {
        let mut g = quad();
        assert!(g.add_index(3).is_ok());
        let err = g.add_index(4).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::IndexOutOfRange {
                index: 4,
                vertex_count: 4
            }
        ));
        assert_eq!(g.indices(), &[3]);
    }

    #[test]
    fn make_triangle_with_bad_index_leaves_indices_untouched() {
        let mut g = quad();
        assert!(g.make_triangle(0, 1, 9).is_err());
        assert!(g.indices().is_empty());
    }

    #[test]
    fn untouched_vertices_keep_placeholder() {
        let mut g = quad();
        g.make_triangle(0, 1, 2).unwrap();
        g.generate().unwrap();
        let lonely = g.vertices()[3];
        assert_eq!(lonely.normal, PLACEHOLDER_AXIS);
        assert_eq!(lonely.tangent, PLACEHOLDER_AXIS);
    }

    #[test]
    fn missing_tex_coords_yield_normals_only() {
        let mut g = Geometry::new();
        g.add_vertex(0.0, 0.0, 0.0);
        g.add_vertex(0.0, 0.0, 1.0);
        g.add_vertex(1.0, 0.0, 0.0);
        g.make_triangle(0, 1, 2).unwrap();
        g.generate().unwrap();
        let v = g.vertices()[0];
        assert!(approx(v.normal, glam::Vec3::Y));
        assert_eq!(v.uv, glam::Vec2::ZERO);
        assert_eq!(v.tangent, PLACEHOLDER_AXIS);
    }

    #[test]
    fn collapsed_uvs_skip_tangent_frame() {
        let mut g = Geometry::new();
        for (x, z) in [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0)] {
            g.add_vertex(x, 0.0, z);
            g.add_tex_coord(0.5, 0.5);
        }
        g.make_triangle(0, 1, 2).unwrap();
        g.generate().unwrap();
        for v in g.vertices() {
            assert!(approx(v.normal, glam::Vec3::Y));
            assert_eq!(v.tangent, PLACEHOLDER_AXIS);
            assert_eq!(v.bitangent, PLACEHOLDER_AXIS);
        }
    }

    #[test]
    fn mismatched_tex_coords_fail_generate() {
        let mut g = quad();
        g.add_vertex(5.0, 5.0, 5.0);
        assert!(matches!(
            g.generate(),
            Err(TerrainError::TexCoordMismatch {
                vertices: 5,
                tex_coords: 4
            })
        ));
    }

    #[test]
    fn shared_vertex_normals_are_averaged() {
        // Two faces meeting at a ridge along the z axis.
        let mut g = Geometry::new();
        g.add_vertex(0.0, 0.0, 0.0);
        g.add_vertex(0.0, 0.0, 1.0);
        g.add_vertex(1.0, -1.0, 0.0);
        g.add_vertex(-1.0, -1.0, 0.0);
        g.make_triangle(0, 1, 2).unwrap();
        g.make_triangle(0, 3, 1).unwrap();
        g.generate().unwrap();
        assert!(approx(g.vertices()[0].normal, glam::Vec3::Y));
    }
}
