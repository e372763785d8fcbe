//! Attune demo - binds a simulated headset device layer to a console UI.
//!
//! Demonstrates property reads and watches, transactional writes, derived
//! speech analytics, and three-dot button customization. Startup ordering
//! matters here: the device event subscription is taken before the property
//! factory is constructed so no attach event is missed, and all
//! property-dependent handling gates on the readiness latch.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod console;
mod signals;

use attune_buttons::ButtonTransport;
use attune_core::{DeviceEvent, OutputMeta, TransportContext, UiSink};
use attune_properties::{PropertyDefinition, PropertyFactory, PropertyTransport};
use attune_session::{ReadinessLatch, SessionController};
use attune_sim::SimHeadset;

use console::ConsoleSink;

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config()?;

    // Developer logs go to stderr; the UI sink owns stdout.
    let mut filter = EnvFilter::from_default_env();
    for target in [
        "attune_app",
        "attune_core",
        "attune_properties",
        "attune_buttons",
        "attune_session",
        "attune_sim",
    ] {
        filter = filter.add_directive(
            format!("{target}={}", config.app.log_level).parse().context("Invalid log level")?,
        );
    }
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_env_filter(filter).init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Attune demo");

    let console = Arc::new(ConsoleSink::new());
    let sink: Arc<dyn UiSink> = Arc::clone(&console) as Arc<dyn UiSink>;

    let sim = Arc::new(SimHeadset::new(config.sim.to_sim_config()?));

    // Subscribe to device events before constructing the property factory so
    // no attach event is missed; handling parks on the readiness latch until
    // the factory exists.
    let mut device_events = sim.subscribe_devices();

    let latch = ReadinessLatch::new();
    latch.begin();

    let factory = Arc::new(PropertyFactory::new(
        PropertyDefinition::builtin(),
        Arc::clone(&sim) as Arc<dyn PropertyTransport>,
    ));
    let controller = SessionController::new(
        Arc::clone(&sink),
        factory,
        Arc::clone(&sim) as Arc<dyn ButtonTransport>,
        latch.subscribe(),
        config.device.supported_models.clone(),
    );

    latch.signal();

    announce_transport(&sink, &sim);
    Arc::clone(&sim).start();

    let mut shutdown_rx = signals::setup_signal_handlers()?;
    let mut command_rx = commands::spawn_stdin_loop();

    info!("Demo running. Type 'help' for commands, Ctrl+C to exit.");

    loop {
        tokio::select! {
            event = device_events.recv() => match event {
                Ok(DeviceEvent::Attached(device)) => controller.on_device_added(device).await,
                Ok(DeviceEvent::Detached { serial_number }) => {
                    controller.on_device_removed(&serial_number).await;
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "Device event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            Some(line) = command_rx.recv() => {
                if commands::dispatch(&line, &console, &sim).is_break() {
                    break;
                }
            }

            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Attune demo stopped");
    Ok(())
}

/// Report the negotiated transport and surface the pairing control when the
/// transport requires an explicit permission flow.
fn announce_transport(sink: &Arc<dyn UiSink>, sim: &Arc<SimHeadset>) {
    match sim.transport_context() {
        TransportContext::PermissionGated => {
            sink.write_output(
                "Initialized using a permission-gated transport. Devices appear only after pairing.",
                OutputMeta::default(),
            );
            let sim = Arc::clone(sim);
            sink.enable_pairing_control(Arc::new(move || Arc::clone(&sim).request_pairing()));
        }
        TransportContext::Direct => {
            sink.write_output(
                "Initialized using the direct transport. Devices will appear automatically.",
                OutputMeta::default(),
            );
        }
    }
}
