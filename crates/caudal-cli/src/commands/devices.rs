//! Output device listing command.

use caudal_driver::list_output_devices;
use clap::Args;

#[derive(Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_output_devices()?;

    if devices.is_empty() {
        println!("No output devices found.");
        return Ok(());
    }

    println!("Available Output Devices");
    println!("========================\n");

    for (idx, device) in devices.iter().enumerate() {
        let default = if device.is_default { " (default)" } else { "" };
        println!(
            "  [{}] {} ({} Hz){}",
            idx, device.name, device.default_sample_rate, default
        );
    }

    println!();
    println!("Total: {} output(s)", devices.len());
    println!();
    println!("Tip: Use a partial name with --device:");
    println!("  caudal play --device \"USB\"");

    Ok(())
}
