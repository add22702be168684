mod controls;

use anyhow::Result;

use morph_engine::core::{App, AppControl};
use morph_engine::device::{DeviceInit, DeviceLost};
use morph_engine::input::InputEvent;
use morph_engine::logging::{init_logging, LoggingConfig};
use morph_engine::window::{Runtime, RuntimeConfig};
use morph_engine::MorphSession;

use controls::{Command, Controls};

#[derive(Default)]
struct Studio {
    controls: Controls,
}

impl Studio {
    fn apply(&self, session: &mut MorphSession) {
        let request = self.controls.request();
        let name = request.operation.name();

        match pollster::block_on(session.process(name, request.param)) {
            Ok(elapsed_ms) => log::info!(
                "{name}({:.2}): {elapsed_ms:.3} ms, {} vertices",
                request.param,
                session.vertex_count()
            ),
            Err(e) => log::error!("{name}({:.2}) failed: {e}", request.param),
        }
    }

    fn reset(&self, session: &mut MorphSession) {
        if let Err(e) = session.reset() {
            log::error!("reset failed: {e}");
        }
    }
}

impl App for Studio {
    fn on_start(&mut self, session: &mut MorphSession) -> AppControl {
        log::info!(
            "{} vertices; keys: 1-4 operation, Up/Down param, Enter/Space apply, R reset, Esc quit",
            session.vertex_count()
        );
        log::info!("drag to orbit, scroll to zoom");
        AppControl::Continue
    }

    fn on_input(&mut self, session: &mut MorphSession, event: &InputEvent) -> AppControl {
        let Some(key) = event.key_pressed() else {
            return AppControl::Continue;
        };

        match self.controls.handle_key(key) {
            Some(Command::Apply(_)) => self.apply(session),
            Some(Command::Reset) => self.reset(session),
            Some(Command::Exit) => return AppControl::Exit,
            None => {}
        }
        AppControl::Continue
    }

    fn on_device_lost(&mut self, lost: &DeviceLost) {
        log::error!("GPU device lost ({lost}); restart morph-studio to continue");
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    Runtime::run(
        RuntimeConfig {
            title: "Morph Studio".to_string(),
            ..RuntimeConfig::default()
        },
        DeviceInit::default(),
        Studio::default(),
    )
}
