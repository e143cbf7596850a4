use wgpu::util::DeviceExt;
use bytemuck::{NoUninit, Pod, Zeroable};

use crate::model::CubeInstance;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Per-instance data as laid out in the instance buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub texture_weight: f32,
    pub _pad: [f32; 3],
}

impl InstanceRaw {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        3 => Float32x4,
        4 => Float32x4,
        5 => Float32x4,
        6 => Float32x4,
        7 => Float32x4,
        8 => Float32,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

impl From<&CubeInstance> for InstanceRaw {
    fn from(cube: &CubeInstance) -> Self {
        Self {
            model: cube.model.to_cols_array_2d(),
            color: cube.color.to_array(),
            texture_weight: cube.texture_weight,
            _pad: [0.0; 3],
        }
    }
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Unit cube centred at the origin (edges from -0.5 to 0.5), faces wound
/// counter-clockwise when seen from outside
pub fn create_unit_cube_mesh() -> Mesh {
    // (normal, four corners: bottom-left, bottom-right, top-right, top-left)
    let p = 0.5_f32;
    #[rustfmt::skip]
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0],  [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
        ([0.0, 0.0, -1.0], [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
        ([1.0, 0.0, 0.0],  [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
        ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
        ([0.0, 1.0, 0.0],  [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
        ([0.0, -1.0, 0.0], [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
    ];
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        for (pos, uv) in corners.into_iter().zip(uvs) {
            vertices.push(Vertex { pos, normal, uv });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn unit_cube_has_six_quads() {
        let mesh = create_unit_cube_mesh();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
        for v in &mesh.vertices {
            assert!(v.pos.iter().all(|c| c.abs() == 0.5));
        }
    }

    #[test]
    fn triangles_face_outward() {
        let mesh = create_unit_cube_mesh();
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(mesh.vertices[i as usize].pos));
            let n = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            let face_normal = (b - a).cross(c - a);
            assert!(face_normal.dot(n) > 0.0, "triangle {tri:?} is wound inward");
            assert!(a.dot(n) > 0.0);
        }
    }

    #[test]
    fn shader_consumes_every_vertex_attribute() {
        let source = include_str!("shaders/cube.wgsl");
        for attr in ["vertex.position", "vertex.normal", "vertex.uv"] {
            assert!(source.contains(attr), "cube.wgsl never reads {attr}");
        }
        assert_eq!(Vertex::ATTRIBS.len(), 3);
    }

    #[test]
    fn instance_layout_matches_attributes() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 96);
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
    }
}
