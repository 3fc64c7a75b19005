//! Device listing and context-driven output streams.

use crate::backend::{AudioBackend, BackendStreamConfig, OutputCallback, StreamHandle};
use crate::Result;
use cpal::Device;
use cpal::traits::{DeviceTrait, HostTrait};
use keytone_core::SharedContext;

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Output device information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Default sample rate in Hz.
    pub default_sample_rate: u32,
    /// Default channel count.
    pub channels: u16,
    /// Whether this is the host's default output.
    pub is_default: bool,
}

fn describe(device: &Device, default_name: Option<&str>) -> Option<AudioDevice> {
    let name = device_name(device).ok()?;
    let (default_sample_rate, channels) = device
        .default_output_config()
        .map(|c| (c.sample_rate(), c.channels()))
        .unwrap_or((48000, 2));
    Some(AudioDevice {
        is_default: default_name == Some(name.as_str()),
        name,
        default_sample_rate,
        channels,
    })
}

/// List output devices on the default host.
pub fn list_output_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| device_name(&d).ok());

    let mut devices = Vec::new();
    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Some(info) = describe(&device, default_name.as_deref())
                && !devices.iter().any(|d: &AudioDevice| d.name == info.name)
            {
                devices.push(info);
            }
        }
    }
    Ok(devices)
}

/// The default output device on the default host, if any.
pub fn default_output_device() -> Result<Option<AudioDevice>> {
    let host = cpal::default_host();
    Ok(host.default_output_device().and_then(|d| {
        let name = device_name(&d).ok();
        describe(&d, name.as_deref())
    }))
}

/// Output callback that renders `shared` into each buffer.
///
/// Never blocks: if the control side holds the context lock, that buffer is
/// silent.
pub fn context_callback(shared: SharedContext, channels: u16) -> OutputCallback {
    let channels = usize::from(channels.max(1));
    Box::new(move |buffer: &mut [f32]| {
        shared.try_render_interleaved(buffer, channels);
    })
}

/// Start an output stream on `backend` that plays `shared`.
///
/// Resumes the context first. Stream errors are logged.
pub fn start_output(
    backend: &dyn AudioBackend,
    config: &BackendStreamConfig,
    shared: SharedContext,
) -> Result<StreamHandle> {
    if let Ok(mut ctx) = shared.lock() {
        ctx.resume();
    }
    let callback = context_callback(shared, config.channels);
    let handle = backend.build_output_stream(
        config,
        callback,
        Box::new(|msg: &str| tracing::error!(error = msg, "output stream error")),
    )?;
    tracing::debug!(
        backend = backend.name(),
        sample_rate = backend.actual_sample_rate(config),
        "context attached to output"
    );
    Ok(handle)
}
