use std::path::Path;

use crate::error::{Result, TerrainError};
use crate::geometry::Geometry;

/// Height maps are scaled down by this factor to keep the relief flat.
pub const HEIGHT_SCALE: f32 = 2.0;

/// How the terrain index buffer is drawn.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    TriangleStrip,
    Points,
}

impl RenderMode {
    pub fn name(self) -> &'static str {
        match self {
            RenderMode::TriangleStrip => "triangle strip",
            RenderMode::Points => "points",
        }
    }
}

/// A regular grid of `x_segments * z_segments` vertices centred on the
/// origin, drawn as a single triangle strip.
///
/// Rows are stitched with degenerate triangles: the last index of a row
/// and the first index of the next row are each emitted twice, so the
/// whole grid goes out in one draw call while keeping strip parity.
#[derive(Debug, Clone)]
pub struct Terrain {
    x_segments: u32,
    z_segments: u32,
    geometry: Geometry,
    render_mode: RenderMode,
}

impl Terrain {
    /// A flat plane at `y = 0`.
    pub fn flat(x_segments: u32, z_segments: u32) -> Result<Self> {
        let vertex_count = check_dimensions(x_segments, z_segments)?;
        let heights = vec![0.0; vertex_count];
        Self::from_heights(x_segments, z_segments, &heights)
    }

    /// Builds the grid from a height map image. Each vertex takes the red
    /// channel of one pixel; sampling clamps to the image edges when the
    /// image is smaller than the grid.
    pub fn from_height_map(x_segments: u32, z_segments: u32, path: &Path) -> Result<Self> {
        let vertex_count = check_dimensions(x_segments, z_segments)?;
        let image = image::open(path)
            .map_err(|source| TerrainError::HeightMap {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        log::debug!(
            "Loaded height map {:?} ({}x{})",
            path,
            image.width(),
            image.height()
        );

        let (width, height) = image.dimensions();
        let mut heights = Vec::with_capacity(vertex_count);
        for z in 0..z_segments {
            for x in 0..x_segments {
                let px = x.min(width.saturating_sub(1));
                let pz = z.min(height.saturating_sub(1));
                heights.push(image.get_pixel(px, pz)[0] as f32 / HEIGHT_SCALE);
            }
        }
        Self::from_heights(x_segments, z_segments, &heights)
    }

    /// Builds the grid from row-major heights (`x + z * x_segments`).
    pub fn from_heights(x_segments: u32, z_segments: u32, heights: &[f32]) -> Result<Self> {
        let expected = check_dimensions(x_segments, z_segments)?;
        if heights.len() != expected {
            return Err(TerrainError::HeightDataSize {
                expected,
                actual: heights.len(),
            });
        }

        let mut geometry = Geometry::new();
        let (xs, zs) = (x_segments as f32, z_segments as f32);
        for z in 0..z_segments {
            for x in 0..x_segments {
                let height = heights[(x + z * x_segments) as usize];
                geometry.add_vertex(x as f32 - xs / 2.0, height, z as f32 - zs / 2.0);
                geometry.add_tex_coord(1.0 - x as f32 / xs, 1.0 - z as f32 / zs);
            }
        }

        for index in strip_indices(x_segments, z_segments) {
            geometry.add_index(index)?;
        }

        for z in 0..z_segments - 1 {
            for x in 0..x_segments - 1 {
                let i0 = x + z * x_segments;
                geometry.compute_face_frame(i0, i0 + x_segments, i0 + 1)?;
                geometry.compute_face_frame(i0 + 1, i0 + x_segments, i0 + x_segments + 1)?;
            }
        }
        geometry.generate()?;

        log::debug!(
            "Built {}x{} terrain with {} strip indices",
            x_segments,
            z_segments,
            geometry.indices().len()
        );
        Ok(Self {
            x_segments,
            z_segments,
            geometry,
            render_mode: RenderMode::default(),
        })
    }

    pub fn x_segments(&self) -> u32 {
        self.x_segments
    }

    pub fn z_segments(&self) -> u32 {
        self.z_segments
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn set_render_mode(&mut self, render_mode: RenderMode) {
        self.render_mode = render_mode;
    }

    /// The non-degenerate triangles of the strip, with odd triangles
    /// flipped back to the strip's winding.
    pub fn strip_triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.geometry
            .indices()
            .windows(3)
            .enumerate()
            .filter(|(_, w)| w[0] != w[1] && w[1] != w[2] && w[0] != w[2])
            .map(|(i, w)| {
                if i % 2 == 0 {
                    [w[0], w[1], w[2]]
                } else {
                    [w[1], w[0], w[2]]
                }
            })
    }
}

/// Number of indices in a stitched strip over the given grid. Grids
/// without at least one full row pair have no strip.
pub fn strip_index_count(x_segments: u32, z_segments: u32) -> usize {
    if x_segments == 0 || z_segments < 2 {
        return 0;
    }
    let (x, z) = (x_segments as usize, z_segments as usize);
    2 * x * (z - 1) + 2 * (z - 2)
}

/// Triangle strip indices over a row-major grid, rows joined by
/// degenerate triangles. Empty when the grid has no row pair or its
/// vertices cannot be addressed with `u32` indices.
pub fn strip_indices(x_segments: u32, z_segments: u32) -> Vec<u32> {
    if x_segments == 0 || x_segments.checked_mul(z_segments).is_none() {
        return Vec::new();
    }
    let mut indices = Vec::with_capacity(strip_index_count(x_segments, z_segments));
    for z in 0..z_segments.saturating_sub(1) {
        let row = z * x_segments;
        if z > 0 {
            // Degenerate begin: repeat the first vertex of this row.
            indices.push(row);
        }
        for x in 0..x_segments {
            indices.push(row + x);
            indices.push(row + x_segments + x);
        }
        if z + 2 < z_segments {
            // Degenerate end: repeat the last vertex of this row.
            indices.push(row + x_segments + x_segments - 1);
        }
    }
    indices
}

/// Validates the grid size and returns its vertex count.
fn check_dimensions(x: u32, z: u32) -> Result<usize> {
    match x.checked_mul(z) {
        Some(count) if x >= 2 && z >= 2 => Ok(count as usize),
        _ => Err(TerrainError::InvalidDimensions { x, z }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(terrain: &Terrain, tri: [u32; 3]) -> glam::Vec3 {
        let p = terrain.geometry().positions();
        let [a, b, c] = tri.map(|i| p[i as usize]);
        (b - a).cross(c - a)
    }

    #[test]
    fn strip_for_three_by_three() {
        assert_eq!(
            strip_indices(3, 3),
            vec![0, 3, 1, 4, 2, 5, 5, 3, 3, 6, 4, 7, 5, 8]
        );
    }

    #[test]
    fn single_row_pair_has_no_degenerates() {
        assert_eq!(strip_indices(4, 2), vec![0, 4, 1, 5, 2, 6, 3, 7]);
    }

    #[test]
    fn index_count_matches_formula() {
        for (x, z) in [(2, 2), (3, 3), (7, 4), (16, 9), (64, 64)] {
            assert_eq!(strip_indices(x, z).len(), strip_index_count(x, z));
        }
    }

    #[test]
    fn zero_width_grid_has_no_strip() {
        assert!(strip_indices(0, 3).is_empty());
        assert_eq!(strip_index_count(0, 3), 0);
        assert!(strip_indices(4, 1).is_empty());
        assert_eq!(strip_index_count(4, 1), 0);
    }

    #[test]
    fn oversized_grid_is_rejected() {
        assert!(matches!(
            Terrain::flat(70_000, 70_000),
            Err(TerrainError::InvalidDimensions {
                x: 70_000,
                z: 70_000
            })
        ));
        assert!(strip_indices(70_000, 70_000).is_empty());
    }

    #[test]
    fn non_square_grids_use_x_as_row_stride() {
        let terrain = Terrain::flat(5, 3).unwrap();
        let max = *terrain.geometry().indices().iter().max().unwrap();
        assert_eq!(max, 5 * 3 - 1);
        // Narrow in x too.
        let terrain = Terrain::flat(3, 5).unwrap();
        assert_eq!(terrain.geometry().vertex_count(), 15);
        assert_eq!(terrain.strip_triangles().count(), 2 * 2 * 4);
    }

    #[test]
    fn strip_covers_every_cell_twice_and_faces_up() {
        let terrain = Terrain::flat(6, 4).unwrap();
        let triangles: Vec<_> = terrain.strip_triangles().collect();
        assert_eq!(triangles.len(), 2 * 5 * 3);
        for tri in triangles {
            let n = face_normal(&terrain, tri);
            assert!(n.y > 0.0, "triangle {tri:?} faces {n}");
        }
    }

    #[test]
    fn grid_is_centred_with_mirrored_uvs() {
        let terrain = Terrain::flat(4, 2).unwrap();
        let v = terrain.geometry().vertices();
        assert_eq!(v[0].position, glam::Vec3::new(-2.0, 0.0, -1.0));
        assert_eq!(v[0].uv, glam::Vec2::new(1.0, 1.0));
        assert_eq!(v[7].position, glam::Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(v[7].uv, glam::Vec2::new(0.25, 0.5));
    }

    #[test]
    fn flat_terrain_frame() {
        let terrain = Terrain::flat(4, 4).unwrap();
        for v in terrain.geometry().vertices() {
            assert!((v.normal - glam::Vec3::Y).length() < 1e-5);
            // u falls as x grows, v falls as z grows.
            assert!((v.tangent + glam::Vec3::X).length() < 1e-5);
            assert!((v.bitangent + glam::Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn heights_feed_positions() {
        let heights: Vec<f32> = (0..9).map(|i| i as f32).collect();
        let terrain = Terrain::from_heights(3, 3, &heights).unwrap();
        assert_eq!(terrain.geometry().positions()[5].y, 5.0);
    }

    #[test]
    fn wrong_height_count_is_rejected() {
        let err = Terrain::from_heights(3, 3, &[0.0; 4]).unwrap_err();
        assert!(matches!(
            err,
            TerrainError::HeightDataSize {
                expected: 9,
                actual: 4
            }
        ));
    }

    #[test]
    fn too_small_grid_is_rejected() {
        assert!(matches!(
            Terrain::flat(1, 5),
            Err(TerrainError::InvalidDimensions { x: 1, z: 5 })
        ));
    }

    #[test]
    fn missing_height_map_reports_path() {
        let err = Terrain::from_height_map(4, 4, Path::new("does/not/exist.ppm")).unwrap_err();
        assert!(err.to_string().contains("exist.ppm"));
    }

    #[test]
    fn height_map_is_clamped_and_scaled() {
        let dir = std::env::temp_dir().join("sine-terrain-heightmap-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ramp.png");
        let img = image::RgbImage::from_fn(2, 2, |x, y| image::Rgb([(x * 100 + y * 10) as u8, 0, 0]));
        img.save(&path).unwrap();

        let terrain = Terrain::from_height_map(3, 3, &path).unwrap();
        let p = terrain.geometry().positions();
        assert_eq!(p[0].y, 0.0);
        assert_eq!(p[1].y, 50.0);
        // x = 2 clamps to the last column.
        assert_eq!(p[2].y, 50.0);
        assert_eq!(p[2 + 2 * 3].y, 55.0);
    }

    #[test]
    fn render_mode_toggles() {
        let mut terrain = Terrain::flat(2, 2).unwrap();
        assert_eq!(terrain.render_mode(), RenderMode::TriangleStrip);
        terrain.set_render_mode(RenderMode::Points);
        assert_eq!(terrain.render_mode(), RenderMode::Points);
    }
}
