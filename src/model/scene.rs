use glam::{Mat4, Vec3, Vec4};

use crate::model::{Camera, HeightMap};

/// Colors and extents of the fixed scene furniture
#[derive(Debug, Clone, PartialEq)]
pub struct SceneStyle {
    pub sky_color: Vec4,
    pub ground_color: Vec4,
    pub block_color: Vec4,
    /// Edge length of the sky box; applied as a negative scale so its faces point inward
    pub sky_extent: f32,
    pub ground_extent: f32,
    pub ground_thickness: f32,
    pub clear_color: [f64; 4],
}

impl Default for SceneStyle {
    fn default() -> Self {
        Self {
            sky_color: Vec4::new(0.45, 0.7, 1.0, 1.0),
            ground_color: Vec4::new(0.25, 0.6, 0.2, 1.0),
            block_color: Vec4::ONE,
            sky_extent: 250.0,
            ground_extent: 200.0,
            ground_thickness: 0.1,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeKind {
    Sky,
    Ground,
    Stack { row: usize, col: usize, level: u32 },
}

/// One cube to draw this frame. Built fresh every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeInstance {
    pub kind: CubeKind,
    pub model: Mat4,
    /// 0 = pure tint, 1 = pure texture
    pub texture_weight: f32,
    pub color: Vec4,
}

impl CubeInstance {
    pub fn sky(style: &SceneStyle) -> Self {
        Self {
            kind: CubeKind::Sky,
            // negative scale turns the faces inward
            model: Mat4::from_scale(Vec3::splat(-style.sky_extent)),
            texture_weight: 0.0,
            color: style.sky_color,
        }
    }

    pub fn ground(style: &SceneStyle) -> Self {
        let t = style.ground_thickness;
        Self {
            kind: CubeKind::Ground,
            model: Mat4::from_translation(Vec3::new(0.0, -t / 2.0, 0.0))
                * Mat4::from_scale(Vec3::new(style.ground_extent, t, style.ground_extent)),
            texture_weight: 0.0,
            color: style.ground_color,
        }
    }

    pub fn stack(row: usize, col: usize, level: u32, style: &SceneStyle) -> Self {
        let center = Vec3::new(col as f32, level as f32 + 0.5, row as f32);
        Self {
            kind: CubeKind::Stack { row, col, level },
            model: Mat4::from_translation(center),
            texture_weight: 1.0,
            color: style.block_color,
        }
    }
}

/// Ordered draw list: sky, ground, then every stacked cube in row-major cell
/// order, bottom to top.
pub fn compose_cubes(height_map: &HeightMap, style: &SceneStyle) -> Vec<CubeInstance> {
    let mut cubes = Vec::with_capacity(2 + height_map.cube_count());
    cubes.push(CubeInstance::sky(style));
    cubes.push(CubeInstance::ground(style));

    for (row, col, height) in height_map.cells() {
        cubes.extend((0..height).map(|level| CubeInstance::stack(row, col, level, style)));
    }
    cubes
}

/// Everything a frame depends on. Input mutates it and raises `dirty`; the
/// frame loop clears `dirty` once it has drawn.
pub struct Scene {
    pub camera: Camera,
    pub height_map: HeightMap,
    pub style: SceneStyle,
    dirty: bool,
}

impl Scene {
    pub fn new(camera: Camera, height_map: HeightMap, style: SceneStyle) -> Self {
        Self { camera, height_map, style, dirty: true }
    }

    pub fn compose(&self) -> Vec<CubeInstance> {
        compose_cubes(&self.height_map, &self.style)
    }

    pub fn mark_dirty(&mut self) { self.dirty = true; }

    pub fn is_dirty(&self) -> bool { self.dirty }

    /// Returns whether a redraw was pending and clears it
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TERRACED_HILL;

    fn hill_scene() -> Scene {
        Scene::new(Camera::new(800, 600), HeightMap::from_rows(&TERRACED_HILL).unwrap(), SceneStyle::default())
    }

    fn stack_kinds(cubes: &[CubeInstance]) -> Vec<(usize, usize, u32)> {
        cubes
            .iter()
            .filter_map(|c| match c.kind {
                CubeKind::Stack { row, col, level } => Some((row, col, level)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn small_grid_composes_sky_ground_then_three_cubes() {
        let map = HeightMap::from_rows(&[[1u32, 0], [0, 2]]).unwrap();
        let cubes = compose_cubes(&map, &SceneStyle::default());

        assert_eq!(cubes.len(), 5);
        assert_eq!(cubes[0].kind, CubeKind::Sky);
        assert_eq!(cubes[1].kind, CubeKind::Ground);
        assert_eq!(stack_kinds(&cubes[2..]), vec![(0, 0, 0), (1, 1, 0), (1, 1, 1)]);
    }

    #[test]
    fn stacked_cubes_rise_one_unit_per_level() {
        let map = HeightMap::from_rows(&[[3u32]]).unwrap();
        let cubes = compose_cubes(&map, &SceneStyle::default());
        let heights: Vec<f32> = cubes[2..].iter().map(|c| c.model.w_axis.y).collect();
        assert_eq!(heights, vec![0.5, 1.5, 2.5]);
    }

    #[test]
    fn sky_and_ground_are_untextured_blocks_are_textured() {
        let style = SceneStyle::default();
        let map = HeightMap::from_rows(&[[1u32]]).unwrap();
        let cubes = compose_cubes(&map, &style);

        assert_eq!(cubes[0].texture_weight, 0.0);
        assert_eq!(cubes[0].color, style.sky_color);
        assert!(cubes[0].model.determinant() < 0.0);

        assert_eq!(cubes[1].texture_weight, 0.0);
        assert_eq!(cubes[1].color, style.ground_color);
        let ground_top = cubes[1].model.transform_point3(Vec3::new(0.0, 0.5, 0.0)).y;
        assert!(ground_top.abs() < 1e-6);

        assert_eq!(cubes[2].texture_weight, 1.0);
        assert_eq!(cubes[2].color.w, 1.0);
    }

    #[test]
    fn sky_extent_is_the_full_edge_length() {
        let style = SceneStyle::default();
        let sky = compose_cubes(&HeightMap::from_rows(&[[0u32]]).unwrap(), &style)[0].model;
        let a = sky.transform_point3(Vec3::splat(-0.5));
        let b = sky.transform_point3(Vec3::splat(0.5));
        assert!(((a - b).abs() - Vec3::splat(style.sky_extent)).length() < 1e-3);
        assert!((a.x - style.sky_extent / 2.0).abs() < 1e-3);
    }

    #[test]
    fn composing_twice_is_identical() {
        let scene = hill_scene();
        assert_eq!(scene.compose(), scene.compose());
    }

    #[test]
    fn dirty_flag_is_consumed_once() {
        let mut scene = hill_scene();
        assert!(scene.take_dirty());
        assert!(!scene.take_dirty());
        scene.mark_dirty();
        scene.mark_dirty();
        assert!(scene.is_dirty());
        assert!(scene.take_dirty());
        assert!(!scene.is_dirty());
    }
}
