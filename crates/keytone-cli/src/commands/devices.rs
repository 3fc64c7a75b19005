//! Output device listing command.

use keytone_io::{AudioBackend, CpalBackend};

pub fn run() -> anyhow::Result<()> {
    let backend = CpalBackend::new();
    let devices = backend.list_output_devices()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Output Devices ({})", backend.name());
    println!("==============\n");
    for (idx, device) in devices.iter().enumerate() {
        let default = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} Hz, {} ch){}",
            idx, device.name, device.default_sample_rate, device.channels, default
        );
    }
    println!();
    println!("Set `output_device` under [audio] in the config to pick one by name.");
    Ok(())
}
