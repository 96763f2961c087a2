//! GPU copies of scene resources
//!
//! Geometry buffers are shared by every node pointing at the same geometry.
//! Node uniforms are uploaded when a node first appears and re-uploaded only
//! while it carries transform or material dirty flags.

use std::collections::HashMap;
use std::sync::Arc;

use palletview_core::{DirtyFlags, Geometry, NodeKey, NodeKind, SceneGraph, SceneNode, Topology};
use slotmap::SecondaryMap;
use wgpu::util::DeviceExt;

use super::scene_pipeline::PipelineKind;
use super::types::{NodeUniforms, Vertex};

/// Which index list of a geometry a draw uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexSource {
    /// The geometry's own indices
    Primary,
    /// Deduplicated triangle edges
    Wire,
}

/// Pipeline and index list used to draw `node`
///
/// Line geometry always draws as lines. Triangle geometry draws as its edges
/// when the node is a line node or its material is in wireframe mode.
pub fn draw_mode(node: &SceneNode) -> (PipelineKind, IndexSource) {
    match node.geometry().topology() {
        Topology::Lines => (PipelineKind::Lines, IndexSource::Primary),
        Topology::Triangles if node.kind() == NodeKind::LineSegments || node.material().wireframe => {
            (PipelineKind::Lines, IndexSource::Wire)
        }
        Topology::Triangles => (PipelineKind::Mesh(node.material().side), IndexSource::Primary),
    }
}

/// Interleaved vertices of a geometry; missing normals default to +Y
pub fn vertices(geometry: &Geometry) -> Vec<Vertex> {
    let normals = geometry.normals();
    geometry
        .positions()
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: p.to_array(),
            normal: normals.get(i).map(|n| n.to_array()).unwrap_or([0.0, 1.0, 0.0]),
        })
        .collect()
}

struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexBuffer {
    fn new(device: &wgpu::Device, label: &str, indices: &[u32]) -> Self {
        Self {
            buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            count: indices.len() as u32,
        }
    }
}

/// Buffers of one geometry
pub struct GpuGeometry {
    // Keeps the allocation alive so its address stays a valid cache key
    _source: Arc<Geometry>,
    vertex_buffer: wgpu::Buffer,
    indices: IndexBuffer,
    wire: Option<IndexBuffer>,
}

impl GpuGeometry {
    fn new(device: &wgpu::Device, geometry: &Arc<Geometry>) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Geometry Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices(geometry)),
            usage: wgpu::BufferUsages::VERTEX,
        });
        Self {
            _source: Arc::clone(geometry),
            vertex_buffer,
            indices: IndexBuffer::new(device, "Geometry Index Buffer", geometry.indices()),
            wire: None,
        }
    }

    fn ensure_wire(&mut self, device: &wgpu::Device, geometry: &Geometry) {
        if self.wire.is_none() {
            self.wire = Some(IndexBuffer::new(device, "Wireframe Index Buffer", &geometry.wireframe_indices()));
        }
    }

    /// Bind the vertex and index buffers and issue the draw
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, source: IndexSource) {
        let indices = match source {
            IndexSource::Primary => &self.indices,
            IndexSource::Wire => match &self.wire {
                Some(wire) => wire,
                None => return,
            },
        };
        if indices.count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(indices.buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..indices.count, 0, 0..1);
    }
}

/// Uniform buffer and bind group of one node
pub struct GpuNode {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl GpuNode {
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// GPU resources mirrored from a scene graph
#[derive(Default)]
pub struct GpuScene {
    geometries: HashMap<usize, GpuGeometry>,
    nodes: SecondaryMap<NodeKey, GpuNode>,
}

fn geometry_key(geometry: &Arc<Geometry>) -> usize {
    Arc::as_ptr(geometry) as usize
}

impl GpuScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the GPU copies up to date with `scene`
    ///
    /// Returns the number of node uniform uploads.
    pub fn sync(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &SceneGraph,
        node_layout: &wgpu::BindGroupLayout,
        linear: bool,
    ) -> usize {
        let mut uploads = 0;
        for (key, node) in scene.iter() {
            let geometry = node.geometry();
            let gpu_geometry = self
                .geometries
                .entry(geometry_key(geometry))
                .or_insert_with(|| GpuGeometry::new(device, geometry));
            if draw_mode(node).1 == IndexSource::Wire {
                gpu_geometry.ensure_wire(device, geometry);
            }

            let uniforms = NodeUniforms::from_node(node, linear);
            match self.nodes.get(key) {
                Some(gpu_node) => {
                    if node.dirty_flags().intersects(DirtyFlags::TRANSFORM | DirtyFlags::MATERIAL) {
                        queue.write_buffer(&gpu_node.buffer, 0, bytemuck::bytes_of(&uniforms));
                        uploads += 1;
                    }
                }
                None => {
                    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Node Uniform Buffer"),
                        contents: bytemuck::bytes_of(&uniforms),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    });
                    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                        label: Some("Node Bind Group"),
                        layout: node_layout,
                        entries: &[wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        }],
                    });
                    self.nodes.insert(key, GpuNode { buffer, bind_group });
                    uploads += 1;
                }
            }
        }
        uploads
    }

    pub fn node(&self, key: NodeKey) -> Option<&GpuNode> {
        self.nodes.get(key)
    }

    pub fn geometry(&self, geometry: &Arc<Geometry>) -> Option<&GpuGeometry> {
        self.geometries.get(&geometry_key(geometry))
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palletview_core::{Color, EdgesData, Material, Shading, Side};

    fn mesh(material: Material) -> SceneNode {
        SceneNode::new(NodeKind::Mesh, Arc::new(Geometry::unit_cube()), material)
    }

    #[test]
    fn test_mesh_uses_side_pipeline() {
        let mut material = Material::new(Shading::Phong, Color::WHITE);
        material.side = Side::Double;
        assert_eq!(
            draw_mode(&mesh(material)),
            (PipelineKind::Mesh(Side::Double), IndexSource::Primary)
        );
    }

    #[test]
    fn test_wireframe_mesh_draws_edges() {
        let mut material = Material::new(Shading::Phong, Color::WHITE);
        material.wireframe = true;
        assert_eq!(draw_mode(&mesh(material)), (PipelineKind::Lines, IndexSource::Wire));
    }

    #[test]
    fn test_line_geometry_draws_lines() {
        let edges = Geometry::edges(&EdgesData {
            vertices: vec![[0.0; 3], [1.0, 0.0, 0.0]],
            edges: vec![[0, 1]],
        });
        let node = SceneNode::new(
            NodeKind::LineSegments,
            Arc::new(edges),
            Material::new(Shading::Line, Color::BLACK),
        );
        assert_eq!(draw_mode(&node), (PipelineKind::Lines, IndexSource::Primary));

        let verts = vertices(node.geometry());
        assert_eq!(verts.len(), 2);
        assert_eq!(verts[1].normal, [0.0, 1.0, 0.0]);
    }
}
