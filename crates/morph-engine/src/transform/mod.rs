//! Compute-driven mesh transformation.
//!
//! The host encodes an [`OperationRequest`] into the 16-byte [`OperationParams`]
//! block, dispatches `ceil(vertex_count / 64)` workgroups of the deformation
//! kernel, waits for the queue, and reads the output positions back.
//!
//! Kernel bindings (group 0):
//! - 0: read-only storage, packed `f32` triples (input positions)
//! - 1: read-write storage, same layout (output positions)
//! - 2: uniform `{u32 op, f32 param, u32 vertex_count, u32 reserved}`

mod engine;
pub mod kernel;
mod op;

pub use engine::{workgroup_count, TransformEngine, WORKGROUP_SIZE};
pub use op::{Operation, OperationParams, OperationRequest};
