//! Vertex layout shared by both chunk meshes.

/// A vertex of a chunk mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] world space (12 bytes)
/// - Normal: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] atlas space (8 bytes)
///
/// Total size: 32 bytes, tightly packed so a mesh can be uploaded with
/// `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World-space position.
    pub position: [f32; 3],
    /// Unit face normal.
    pub normal: [f32; 3],
    /// Atlas-space texture coordinates.
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Builds a vertex from its three attributes.
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Vertex {
            position,
            normal,
            tex_coords,
        }
    }
}
