//! Draw dispatch: vertex stream descriptors, fixed-function state, the
//! backend seam and its wgpu implementation.

mod arrays;
mod backend;
mod dispatch;
mod state;

pub mod gpu;
pub mod wide_line;

pub use arrays::{ArrayDesc, Topology, VertexArrays, VertexData};
pub use backend::{
    AlphaImage, Backend, BackendCapabilities, DrawCall, DrawUniforms, PipelineKind, PrimitiveKind,
};
pub use dispatch::{Dispatcher, DrawRequest};
pub use gpu::{GpuTexture, WgpuBackend, WgpuBackendInit};
pub use state::{DrawState, StateChange};
