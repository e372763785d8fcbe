//! Button takeover controller and handles.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use attune_core::DeviceInfo;
use attune_core::led::{Color, LedMode};

use crate::error::ButtonResult;

/// Buttons available for application takeover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonId {
    ThreeDot,
}

/// Interaction kinds a button can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonInteraction {
    Down,
    Up,
    Tap,
}

/// Signals delivered on a button listener stream.
///
/// The stream ends (channel closes) when listening stops, e.g. on detach.
#[derive(Debug, Clone)]
pub enum ButtonSignal {
    Interaction(ButtonInteraction),
    Error(String),
}

/// Transport seam to the device-side button implementation.
#[async_trait]
pub trait ButtonTransport: Send + Sync {
    /// Negotiate a customization session with the device.
    async fn open(&self, serial: &str) -> ButtonResult<()>;

    /// Take ownership of a button, suppressing its default behavior.
    async fn take_button(&self, serial: &str, button: ButtonId) -> ButtonResult<()>;

    /// Subscribe to interaction events for a taken button.
    async fn listen(
        &self,
        serial: &str,
        button: ButtonId,
        interaction: ButtonInteraction,
    ) -> ButtonResult<mpsc::Receiver<ButtonSignal>>;

    /// Set the button LED color and illumination mode.
    async fn set_color(
        &self,
        serial: &str,
        button: ButtonId,
        color: Color,
        mode: LedMode,
    ) -> ButtonResult<()>;
}

/// Create a button controller for one device.
///
/// # Errors
/// Fails when the device does not support button customization or cannot be
/// reached.
pub async fn create_device_controller(
    device: &DeviceInfo,
    transport: Arc<dyn ButtonTransport>,
) -> ButtonResult<DeviceController> {
    transport.open(&device.serial_number).await?;
    debug!(device = %device.name, serial = %device.serial_number, "button controller created");
    Ok(DeviceController { serial: device.serial_number.clone(), transport })
}

/// Per-device handle for taking over customizable buttons.
pub struct DeviceController {
    serial: String,
    transport: Arc<dyn ButtonTransport>,
}

impl DeviceController {
    /// Take over one button.
    ///
    /// # Errors
    /// Fails when the button is absent or the takeover is refused.
    pub async fn button(&self, id: ButtonId) -> ButtonResult<Button> {
        self.transport.take_button(&self.serial, id).await?;
        Ok(Button { id, serial: self.serial.clone(), transport: Arc::clone(&self.transport) })
    }
}

/// A taken-over button.
#[derive(Clone)]
pub struct Button {
    id: ButtonId,
    serial: String,
    transport: Arc<dyn ButtonTransport>,
}

impl Button {
    #[must_use]
    pub fn id(&self) -> ButtonId {
        self.id
    }

    /// Set the LED color and illumination mode.
    ///
    /// # Errors
    /// Whatever the transport reports.
    pub async fn set_color(&self, color: Color, mode: LedMode) -> ButtonResult<()> {
        self.transport.set_color(&self.serial, self.id, color, mode).await
    }

    /// Subscribe to one interaction kind for this button.
    ///
    /// # Errors
    /// Whatever the transport reports.
    pub async fn listen_for(
        &self,
        interaction: ButtonInteraction,
    ) -> ButtonResult<mpsc::Receiver<ButtonSignal>> {
        self.transport.listen(&self.serial, self.id, interaction).await
    }
}
