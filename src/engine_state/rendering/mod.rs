//! Rendering side of the terrain pipeline.
//!
//! Nothing here talks to a GPU directly. Meshes are extracted into plain
//! vertex/index buffers, and everything a backend must do with them goes
//! through the [`RenderGateway`] trait.

pub mod gateway;
pub mod meshing;
pub mod tasks;
mod vertex;

pub use gateway::{GatewayCall, RecordingGateway, RenderGateway};
pub use vertex::Vertex;
