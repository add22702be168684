use std::fmt;

use bytemuck::{Pod, Zeroable};

/// The four deformations the kernel implements.
///
/// Discriminants are the `op` codes written into the parameter block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u32)]
pub enum Operation {
    Scale = 0,
    Rotate = 1,
    /// Lifts along Y only. X and Z are left untouched.
    Translate = 2,
    Inflate = 3,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Scale,
        Operation::Rotate,
        Operation::Translate,
        Operation::Inflate,
    ];

    /// Parses a host-facing operation name.
    ///
    /// Unknown names fall back to `Scale` rather than failing.
    pub fn from_name(name: &str) -> Operation {
        match name {
            "scale" => Operation::Scale,
            "rotate" => Operation::Rotate,
            "translate" => Operation::Translate,
            "inflate" => Operation::Inflate,
            other => {
                log::warn!("unknown operation \"{other}\"; falling back to scale");
                Operation::Scale
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operation::Scale => "scale",
            Operation::Rotate => "rotate",
            Operation::Translate => "translate",
            Operation::Inflate => "inflate",
        }
    }

    #[inline]
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One user-triggered deformation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OperationRequest {
    pub operation: Operation,
    pub param: f32,
}

impl OperationRequest {
    #[inline]
    pub const fn new(operation: Operation, param: f32) -> Self {
        Self { operation, param }
    }

    pub fn from_name(name: &str, param: f32) -> Self {
        Self::new(Operation::from_name(name), param)
    }
}

/// Kernel parameter block (binding 2). Exactly 16 bytes, little-endian:
/// `{u32 op, f32 param, u32 vertex_count, u32 reserved}`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct OperationParams {
    pub op: u32,
    pub param: f32,
    pub vertex_count: u32,
    pub reserved: u32,
}

impl OperationParams {
    pub const SIZE: u64 = std::mem::size_of::<OperationParams>() as u64;

    pub fn encode(request: OperationRequest, vertex_count: u32) -> Self {
        Self {
            op: request.operation.code(),
            param: request.param,
            vertex_count,
            reserved: 0,
        }
    }
}

const _: () = assert!(std::mem::size_of::<OperationParams>() == 16);
