use morph_engine::device::{DeviceContext, DeviceInit};
use morph_engine::EngineError;

/// Acquires a headless device, or `None` when the machine has no adapter.
pub fn device() -> Option<DeviceContext> {
    match pollster::block_on(DeviceContext::acquire(&DeviceInit::headless())) {
        Ok(ctx) => Some(ctx),
        Err(EngineError::AdapterUnavailable(reason)) => {
            eprintln!("skipping GPU test: {reason}");
            None
        }
        Err(e) => panic!("device acquisition failed: {e}"),
    }
}

pub fn assert_close(actual: &[f32], expected: &[f32], eps: f32) {
    assert_eq!(actual.len(), expected.len());
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() <= eps, "component {i}: {a} vs {e}");
    }
}
