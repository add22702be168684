//! Engine error taxonomy.
//!
//! Initialization failures (`AdapterUnavailable`, `DeviceRequestFailed`) abort
//! startup. Per-operation failures abort only that operation; callers keep the
//! previous mesh and buffers and may issue the next request.

use thiserror::Error;

/// Result alias used across the engine.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// No GPU adapter compatible with the requested options exists.
    #[error("no compatible GPU adapter available: {0}")]
    AdapterUnavailable(String),

    /// The adapter refused to create a logical device.
    #[error("failed to create GPU device: {0}")]
    DeviceRequestFailed(#[from] wgpu::RequestDeviceError),

    /// The device was lost after acquisition. Fatal for the running session.
    #[error("GPU device lost ({reason}): {message}")]
    DeviceLost { reason: String, message: String },

    /// Buffer size and initial data length disagree.
    #[error("buffer size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    /// An operation ran before the pipeline or buffers it needs exist.
    #[error("bind group not ready: {0}")]
    BindGroupNotReady(&'static str),

    /// Mapping a staging buffer for read failed.
    #[error("buffer map failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    /// Waiting on the device failed.
    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("failed to create surface: {0}")]
    SurfaceCreate(#[from] wgpu::CreateSurfaceError),

    /// The swapchain reported an unrecoverable error (out of memory).
    #[error("surface error: {0}")]
    Surface(wgpu::SurfaceError),

    /// The surface reports no formats usable with the adapter.
    #[error("surface is not supported by the selected adapter")]
    SurfaceUnsupported,

    /// A GPU completion callback was dropped without firing.
    #[error("GPU callback dropped before completion: {0}")]
    Canceled(&'static str),
}

impl EngineError {
    /// Returns true for errors that leave the session unusable.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            EngineError::AdapterUnavailable(_)
                | EngineError::DeviceRequestFailed(_)
                | EngineError::DeviceLost { .. }
                | EngineError::Surface(_)
                | EngineError::SurfaceUnsupported
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_mismatch_message_names_both_sizes() {
        let e = EngineError::SizeMismatch { expected: 16, actual: 12 };
        let msg = e.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains("12"));
        assert!(!e.is_fatal());
    }

    #[test]
    fn device_lost_is_fatal() {
        let e = EngineError::DeviceLost {
            reason: "Unknown".into(),
            message: "driver reset".into(),
        };
        assert!(e.is_fatal());
        assert!(e.to_string().contains("driver reset"));
    }

    #[test]
    fn bind_group_not_ready_is_per_operation() {
        assert!(!EngineError::BindGroupNotReady("transform engine").is_fatal());
    }
}
