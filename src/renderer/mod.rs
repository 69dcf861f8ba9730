//! WebGPU rendering module
//!
//! Draws a [`Snapshot`](crate::sim::Snapshot) as flat-colored quads. The
//! renderer never touches simulation state.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use vertex::Vertex;
