use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::channel::oneshot;
use wgpu::util::DeviceExt;

use crate::error::{EngineError, Result};

use super::DeviceInit;

/// Record of an asynchronous device loss.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DeviceLost {
    pub reason: String,
    pub message: String,
}

impl fmt::Display for DeviceLost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reason, self.message)
    }
}

impl From<DeviceLost> for EngineError {
    fn from(lost: DeviceLost) -> Self {
        EngineError::DeviceLost {
            reason: lost.reason,
            message: lost.message,
        }
    }
}

type LostNotifier = Box<dyn FnOnce(DeviceLost) + Send>;

#[derive(Default)]
struct LostState {
    lost: Option<DeviceLost>,
    notifiers: Vec<LostNotifier>,
}

fn lock_lost(state: &Mutex<LostState>) -> MutexGuard<'_, LostState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn record_loss(state: &Mutex<LostState>, lost: DeviceLost) {
    let notifiers = {
        let mut guard = lock_lost(state);
        if guard.lost.is_some() {
            return;
        }
        guard.lost = Some(lost.clone());
        std::mem::take(&mut guard.notifiers)
    };

    for notify in notifiers {
        notify(lost.clone());
    }
}

/// Queues `notify` for the next loss, or runs it now if the device is already lost.
fn register_notifier(state: &Mutex<LostState>, notify: LostNotifier) {
    let already = {
        let mut guard = lock_lost(state);
        match guard.lost.clone() {
            Some(lost) => lost,
            None => {
                guard.notifiers.push(notify);
                return;
            }
        }
    };
    // Outside the lock: the notifier may call back into the context.
    notify(already);
}

/// Owns the wgpu adapter, logical device and queue.
///
/// This is the single source of GPU resource creation:
/// - acquires the adapter/device once at startup
/// - allocates device buffers, optionally with initial contents
/// - reads device buffers back through transient staging buffers
/// - reports device loss to registered observers (never recovers)
pub struct DeviceContext {
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    lost: Arc<Mutex<LostState>>,
}

impl DeviceContext {
    /// Creates the wgpu instance described by `init`.
    ///
    /// Split from acquisition so a window surface can be created first and
    /// passed to [`acquire_with`](Self::acquire_with) for adapter compatibility.
    pub fn create_instance(init: &DeviceInit) -> wgpu::Instance {
        wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        })
    }

    /// Acquires a headless device (no surface compatibility requirement).
    pub async fn acquire(init: &DeviceInit) -> Result<Self> {
        let instance = Self::create_instance(init);
        Self::acquire_with(instance, init, None).await
    }

    /// Acquires an adapter/device from `instance`.
    ///
    /// Fails with `AdapterUnavailable` when no compatible adapter exists and
    /// with `DeviceRequestFailed` when logical-device creation fails.
    pub async fn acquire_with(
        instance: wgpu::Instance,
        init: &DeviceInit,
        compatible_surface: Option<&wgpu::Surface<'_>>,
    ) -> Result<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .map_err(|e| EngineError::AdapterUnavailable(e.to_string()))?;

        let info = adapter.get_info();
        log::info!(
            "using adapter \"{}\" ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("morph-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await?;

        let lost = Arc::new(Mutex::new(LostState::default()));
        let lost_cb = Arc::clone(&lost);
        device.set_device_lost_callback(move |reason, message| {
            // Dropping the device reports `Destroyed`; that is shutdown, not loss.
            if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                log::debug!("GPU device destroyed: {message}");
                return;
            }
            let lost = DeviceLost {
                reason: format!("{reason:?}"),
                message,
            };
            log::error!("GPU device lost: {lost}");
            record_loss(&lost_cb, lost);
        });

        Ok(Self {
            adapter,
            device,
            queue,
            lost,
        })
    }

    pub fn adapter(&self) -> &wgpu::Adapter {
        &self.adapter
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Registers an observer fired once when the device is lost.
    ///
    /// Fires immediately if the loss has already been recorded.
    pub fn on_device_lost(&self, notify: impl FnOnce(DeviceLost) + Send + 'static) {
        register_notifier(&self.lost, Box::new(notify));
    }

    /// The recorded device loss, if any.
    pub fn lost(&self) -> Option<DeviceLost> {
        lock_lost(&self.lost).lost.clone()
    }

    /// Fails with `DeviceLost` once the device has been lost.
    pub fn ensure_alive(&self) -> Result<()> {
        match self.lost() {
            Some(lost) => Err(lost.into()),
            None => Ok(()),
        }
    }

    /// Allocates a device buffer of `size` bytes.
    ///
    /// With `initial`, its length must equal `size` exactly.
    pub fn create_buffer(
        &self,
        label: &str,
        size: u64,
        usage: wgpu::BufferUsages,
        initial: Option<&[u8]>,
    ) -> Result<wgpu::Buffer> {
        let buffer = match initial {
            Some(data) => {
                let actual = data.len() as u64;
                if actual != size {
                    return Err(EngineError::SizeMismatch { expected: size, actual });
                }
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: data,
                        usage,
                    })
            }
            None => self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage,
                mapped_at_creation: false,
            }),
        };

        log::debug!("allocated buffer \"{label}\" ({size} bytes, {usage:?})");
        Ok(buffer)
    }

    /// Queues a write into `buffer`. Non-blocking.
    pub fn write_buffer(&self, buffer: &wgpu::Buffer, offset: u64, bytes: &[u8]) {
        self.queue.write_buffer(buffer, offset, bytes);
    }

    /// Copies the first `size` bytes of `source` into a staging buffer and returns them.
    ///
    /// Suspends until the mapping completes. The returned bytes are detached;
    /// the staging buffer is released before returning. The copy is padded to
    /// `COPY_BUFFER_ALIGNMENT`; the padded range must fit inside `source`.
    pub async fn read_buffer(&self, source: &wgpu::Buffer, size: u64) -> Result<Vec<u8>> {
        self.ensure_alive()?;

        let copy_size = readback_copy_size(source.size(), size)?;
        if copy_size == 0 {
            return Ok(Vec::new());
        }

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("morph staging readback"),
            size: copy_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("morph readback encoder"),
            });
        encoder.copy_buffer_to_buffer(source, 0, &staging, 0, copy_size);
        let index = self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = oneshot::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        self.wait_for(index)?;
        rx.await
            .map_err(|_| EngineError::Canceled("staging buffer map"))??;

        let bytes = {
            let view = slice.get_mapped_range();
            view[..size as usize].to_vec()
        };
        staging.unmap();
        Ok(bytes)
    }

    /// Submits `commands` and suspends until the queue reports the work done.
    ///
    /// Returns the submit-to-completion wall time.
    pub async fn submit_and_wait(&self, commands: wgpu::CommandBuffer) -> Result<Duration> {
        self.ensure_alive()?;

        let (tx, rx) = oneshot::channel();
        let started = Instant::now();
        let index = self.queue.submit(std::iter::once(commands));
        self.queue.on_submitted_work_done(move || {
            let _ = tx.send(());
        });

        self.wait_for(index)?;
        rx.await
            .map_err(|_| EngineError::Canceled("submitted work done"))?;
        Ok(started.elapsed())
    }

    fn wait_for(&self, index: wgpu::SubmissionIndex) -> Result<()> {
        self.device.poll(wgpu::PollType::Wait {
            submission_index: Some(index),
            timeout: None,
        })?;
        Ok(())
    }
}

/// Aligned copy size for reading `requested` bytes out of a `source_size` buffer.
fn readback_copy_size(source_size: u64, requested: u64) -> Result<u64> {
    let padded = requested.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
    if padded > source_size {
        return Err(EngineError::SizeMismatch {
            expected: source_size,
            actual: padded,
        });
    }
    Ok(padded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn lost(msg: &str) -> DeviceLost {
        DeviceLost {
            reason: "Unknown".into(),
            message: msg.into(),
        }
    }

    #[test]
    fn first_loss_wins_and_notifies_once() {
        let state = Mutex::new(LostState::default());
        let fired = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&fired);
        lock_lost(&state).notifiers.push(Box::new(move |l: DeviceLost| {
            assert_eq!(l.message, "first");
            f.fetch_add(1, Ordering::SeqCst);
        }));

        record_loss(&state, lost("first"));
        record_loss(&state, lost("second"));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(lock_lost(&state).lost, Some(lost("first")));
        assert!(lock_lost(&state).notifiers.is_empty());
    }

    #[test]
    fn late_observer_fires_immediately() {
        let state = Mutex::new(LostState::default());
        record_loss(&state, lost("gone"));

        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        register_notifier(&state, Box::new(move |l: DeviceLost| {
            *s.lock().unwrap() = Some(l.message);
        }));

        assert_eq!(seen.lock().unwrap().as_deref(), Some("gone"));
        assert!(lock_lost(&state).notifiers.is_empty());
    }

    #[test]
    fn early_observer_waits_for_loss() {
        let state = Mutex::new(LostState::default());
        let fired = Arc::new(AtomicUsize::new(0));

        let f = Arc::clone(&fired);
        register_notifier(&state, Box::new(move |_: DeviceLost| {
            f.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(lock_lost(&state).notifiers.len(), 1);

        record_loss(&state, lost("reset"));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn readback_size_is_padded_and_bounded() {
        assert_eq!(readback_copy_size(96, 96).unwrap(), 96);
        assert_eq!(readback_copy_size(8, 6).unwrap(), 8);
        assert_eq!(readback_copy_size(8, 0).unwrap(), 0);
        assert!(matches!(
            readback_copy_size(8, 16),
            Err(EngineError::SizeMismatch { expected: 8, actual: 16 })
        ));
        // 6 bytes pad to 8, which overruns a 6-byte source.
        assert!(matches!(
            readback_copy_size(6, 6),
            Err(EngineError::SizeMismatch { expected: 6, actual: 8 })
        ));
    }

    #[test]
    fn device_lost_converts_into_engine_error() {
        let err: EngineError = lost("hung").into();
        assert!(matches!(err, EngineError::DeviceLost { ref message, .. } if message == "hung"));
    }
}
