use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{DeviceContext, DeviceInit, DeviceLost, SurfaceTarget};
use crate::error::EngineError;
use crate::input::platform::winit::translate_window_event;
use crate::input::InputState;
use crate::session::MorphSession;
use crate::time::{FpsMeter, FrameClock};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "morph".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Events injected into the winit loop from outside the window system.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    DeviceLost(DeviceLost),
}

/// Whether the render loop reschedules itself after each frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, acquires the device and drives `app` until exit.
    ///
    /// Startup failures are returned after the event loop has shut down.
    pub fn run<A>(config: RuntimeConfig, init: DeviceInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::<RuntimeEvent>::with_user_event()
            .build()
            .context("failed to create winit EventLoop")?;
        let proxy = event_loop.create_proxy();
        let mut state = AppState::new(config, init, proxy, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    surface: SurfaceTarget<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    init: DeviceInit,
    proxy: EventLoopProxy<RuntimeEvent>,
    app: A,

    entry: Option<WindowEntry>,
    session: Option<MorphSession>,
    input: InputState,
    clock: FrameClock,
    fps: FpsMeter,

    loop_state: LoopState,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, init: DeviceInit, proxy: EventLoopProxy<RuntimeEvent>, app: A) -> Self {
        Self {
            config,
            init,
            proxy,
            app,
            entry: None,
            session: None,
            input: InputState::default(),
            clock: FrameClock::default(),
            fps: FpsMeter::default(),
            loop_state: LoopState::Stopped,
            fatal: None,
        }
    }

    /// Window, surface, device and session, in that order.
    ///
    /// The surface exists before the adapter is chosen so the adapter can be
    /// required to present to it.
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);
        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let instance = DeviceContext::create_instance(&self.init);
        let mut entry = WindowEntryTryBuilder {
            window,
            surface_builder: |w| SurfaceTarget::new(&instance, w),
        }
        .try_build()
        .context("failed to create window surface")?;

        let ctx = entry
            .with_surface(|s| pollster::block_on(DeviceContext::acquire_with(instance, &self.init, Some(s.surface()))))
            .context("GPU initialization failed")?;

        let proxy = self.proxy.clone();
        ctx.on_device_lost(move |lost| {
            if proxy.send_event(RuntimeEvent::DeviceLost(lost)).is_err() {
                log::debug!("device lost after event loop closed");
            }
        });

        let init = &self.init;
        let format = entry
            .with_surface_mut(|s| s.configure(&ctx, init))
            .context("failed to configure window surface")?;

        let mut session = MorphSession::new(ctx, format).context("failed to create session")?;
        let size = entry.borrow_window().inner_size();
        entry.with_surface_mut(|s| session.configure_surface(s, size));

        if self.app.on_start(&mut session) == AppControl::Exit {
            event_loop.exit();
        }

        self.entry = Some(entry);
        self.session = Some(session);
        self.start_loop();
        Ok(())
    }

    fn start_loop(&mut self) {
        self.loop_state = LoopState::Running;
        self.clock.reset();
        if let Some(entry) = &self.entry {
            entry.borrow_window().request_redraw();
        }
    }

    fn stop_loop(&mut self) {
        if self.loop_state == LoopState::Running {
            log::debug!("render loop stopped");
        }
        self.loop_state = LoopState::Stopped;
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.stop_loop();
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.fatal = Some(err);
        self.shutdown(event_loop);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        if self.loop_state != LoopState::Running {
            return;
        }
        let (Some(entry), Some(session)) = (self.entry.as_mut(), self.session.as_mut()) else {
            return;
        };

        let ft = self.clock.tick();
        if let Some(fps) = self.fps.record(&ft) {
            log::debug!("{fps:.1} fps (frame {})", ft.frame_index);
        }

        let app = &mut self.app;
        let control = entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: fields.window,
                surface: fields.surface,
                session,
            };
            app.on_frame(&mut ctx)
        });

        if control == AppControl::Exit {
            self.shutdown(event_loop);
            return;
        }

        // Reschedule: one frame per display refresh while running.
        entry.borrow_window().request_redraw();
    }

    fn device_lost(&mut self, lost: DeviceLost) {
        self.stop_loop();

        if let Some(entry) = &self.entry {
            entry
                .borrow_window()
                .set_title(&format!("{} - GPU device lost: {lost}", self.config.title));
        }
        log::error!("{}", EngineError::from(lost.clone()));
        self.app.on_device_lost(&lost);
    }
}

impl<A> ApplicationHandler<RuntimeEvent> for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Wait);

        if let Err(e) = self.start(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: RuntimeEvent) {
        match event {
            RuntimeEvent::DeviceLost(lost) => self.device_lost(lost),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        if entry.borrow_window().id() != window_id {
            return;
        }

        if let Some(ev) = translate_window_event(entry.borrow_window(), &self.input, &event) {
            self.input.apply_event(&ev);

            if let Some(session) = self.session.as_mut() {
                if self.loop_state == LoopState::Running {
                    session.handle_input(&ev);
                }
                if self.app.on_input(session, &ev) == AppControl::Exit {
                    self.shutdown(event_loop);
                    return;
                }
            }
        }

        match &event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),

            WindowEvent::Resized(size) => {
                if let Some(session) = self.session.as_mut() {
                    entry.with_surface_mut(|s| session.configure_surface(s, *size));
                }
                if self.loop_state == LoopState::Running {
                    entry.borrow_window().request_redraw();
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = entry.borrow_window().inner_size();
                if let Some(session) = self.session.as_mut() {
                    entry.with_surface_mut(|s| session.configure_surface(s, size));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Surface before device: the session holds the device.
        self.entry = None;
        self.session = None;
    }
}
