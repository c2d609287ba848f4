//! Procedural environment geometry.
//!
//! The scene has no model files. The ground is a subdivided plane and the
//! translucent props are cuboids, all built here as indexed triangle lists.

use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4};

/// Mesh vertex as laid out in the vertex buffer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Linear RGBA; alpha below 1 is drawn in the translucent pass.
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Indexed triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Square plane at height `y`, facing up, split into `divisions²` cells.
    ///
    /// Subdividing keeps per-vertex point lighting from smearing across one
    /// huge triangle.
    pub fn ground_plane(half_extent: f32, y: f32, divisions: u32, color: Vec4) -> Self {
        let divisions = divisions.max(1);
        let row = divisions + 1;
        let size = half_extent * 2.0;

        let mut vertices = Vec::with_capacity((row * row) as usize);
        for iz in 0..row {
            for ix in 0..row {
                let x = -half_extent + size * ix as f32 / divisions as f32;
                let z = -half_extent + size * iz as f32 / divisions as f32;
                vertices.push(Vertex {
                    position: [x, y, z],
                    normal: [0.0, 1.0, 0.0],
                    color: color.to_array(),
                });
            }
        }

        let mut indices = Vec::with_capacity((divisions * divisions * 6) as usize);
        for iz in 0..divisions {
            for ix in 0..divisions {
                let a = iz * row + ix;
                let b = a + 1;
                let c = a + row;
                let d = c + 1;
                // Counter-clockwise seen from above
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }

        Self { vertices, indices }
    }

    /// Axis-aligned box with flat-shaded faces.
    pub fn cuboid(center: Vec3, half_size: Vec3, color: Vec4) -> Self {
        // (normal, tangent u, tangent v) with u × v = normal
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];

        let mut mesh = Mesh {
            vertices: Vec::with_capacity(24),
            indices: Vec::with_capacity(36),
        };
        for (normal, u, v) in FACES {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let corner = normal + u * su + v * sv;
                mesh.vertices.push(Vertex {
                    position: (center + corner * half_size).to_array(),
                    normal: normal.to_array(),
                    color: color.to_array(),
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }
}

/// Ground at the rain's recycle height.
pub fn ground(half_extent: f32, y: f32) -> Mesh {
    Mesh::ground_plane(half_extent, y, 32, Vec4::new(0.18, 0.22, 0.2, 1.0))
}

/// Translucent props: a pool of water, a glass pane and a bottle.
pub fn translucent_props(ground_y: f32) -> Mesh {
    let mut props = Mesh::cuboid(
        Vec3::new(-1.8, ground_y + 0.02, -1.0),
        Vec3::new(0.9, 0.02, 0.6),
        Vec4::new(0.2, 0.35, 0.55, 0.45),
    );
    props.append(&Mesh::cuboid(
        Vec3::new(-0.6, ground_y + 0.8, -1.6),
        Vec3::new(0.5, 0.8, 0.02),
        Vec4::new(0.75, 0.85, 0.9, 0.25),
    ));
    props.append(&Mesh::cuboid(
        Vec3::new(-1.3, ground_y + 0.3, 0.2),
        Vec3::new(0.08, 0.3, 0.08),
        Vec4::new(0.3, 0.6, 0.35, 0.5),
    ));
    props
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_normal(mesh: &Mesh, tri: usize) -> Vec3 {
        let p = |i: usize| Vec3::from_array(mesh.vertices[mesh.indices[tri * 3 + i] as usize].position);
        (p(1) - p(0)).cross(p(2) - p(0)).normalize()
    }

    #[test]
    fn test_ground_plane_counts() {
        let mesh = Mesh::ground_plane(10.0, -1.0, 4, Vec4::ONE);
        assert_eq!(mesh.vertices.len(), 25);
        assert_eq!(mesh.indices.len(), 4 * 4 * 6);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == -1.0));
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_ground_plane_winding_faces_up() {
        let mesh = Mesh::ground_plane(1.0, 0.0, 2, Vec4::ONE);
        for tri in 0..mesh.indices.len() / 3 {
            assert!((triangle_normal(&mesh, tri) - Vec3::Y).length() < 1e-5);
        }
    }

    #[test]
    fn test_cuboid_winding_matches_normals() {
        let mesh = Mesh::cuboid(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 1.0, 2.0), Vec4::ONE);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.indices.len(), 36);
        for tri in 0..12 {
            let stored = Vec3::from_array(mesh.vertices[mesh.indices[tri * 3] as usize].normal);
            assert!((triangle_normal(&mesh, tri) - stored).length() < 1e-5);
        }
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut a = Mesh::cuboid(Vec3::ZERO, Vec3::ONE, Vec4::ONE);
        a.append(&Mesh::cuboid(Vec3::X * 3.0, Vec3::ONE, Vec4::ONE));
        assert_eq!(a.vertices.len(), 48);
        assert_eq!(*a.indices.iter().max().unwrap(), 47);
    }

    #[test]
    fn test_props_are_translucent() {
        let props = translucent_props(-1.0);
        assert!(!props.is_empty());
        assert!(props.vertices.iter().all(|v| v.color[3] < 1.0));
    }
}
