// Spacefn CLI
// Grabs one physical keyboard and re-emits a layer-shifted stream

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use log::info;

use spacefn_core::input::{capabilities_of, is_keyboard, EvdevSource};
use spacefn_core::machine::StateMachine;
use spacefn_core::output::VirtualOutput;

/// Spacebar/dot key-overloading remapper
#[derive(Parser, Debug)]
#[command(name = "spacefn")]
#[command(about = "Key-overloading remapper: trigger keys shift layers when held", long_about = None)]
struct Args {
    /// Physical input device to grab (e.g. /dev/input/event3)
    #[arg(value_name = "DEVICE", required_unless_present = "list_devices")]
    device: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// List available keyboard devices and exit
    #[arg(long)]
    list_devices: bool,
}

/// Enumerate evdev nodes that look like keyboards.
fn list_devices() -> anyhow::Result<()> {
    let mut found = 0;
    for (path, device) in evdev::enumerate() {
        if device
            .name()
            .is_some_and(|name| name.contains(VirtualOutput::DEVICE_NAME))
        {
            continue;
        }
        if is_keyboard(&capabilities_of(&device)) {
            println!(
                "  {}: {}",
                path.display(),
                device.name().unwrap_or("Unknown")
            );
            found += 1;
        }
    }
    if found == 0 {
        anyhow::bail!("no keyboard devices found");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(
        if args.verbose { "debug" } else { "info" },
    ))
    .init();

    if args.list_devices {
        return list_devices();
    }

    let path = args
        .device
        .context("a device path is required (see --list-devices)")?;

    let mut source = EvdevSource::open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let profile = source.profile();
    info!(
        "remapping {} (apple keyboard: {})",
        source.name(),
        profile.is_apple
    );

    // Create the virtual device before grabbing so a creation failure
    // never leaves the physical keyboard dead.
    let sink = VirtualOutput::new().context("failed to create virtual output device")?;
    source.grab().context("failed to grab input device")?;

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context("failed to install signal handler")?;
    }

    info!("spacefn is running; press Ctrl+C to exit");
    let mut machine = StateMachine::new(source, sink, profile, shutdown);
    machine.run()?;

    info!("exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_device_path() {
        let args = Args::parse_from(["spacefn", "/dev/input/event3"]);
        assert_eq!(args.device, Some(PathBuf::from("/dev/input/event3")));
        assert!(!args.verbose);
        assert!(!args.list_devices);
    }

    #[test]
    fn test_args_missing_device_is_usage_error() {
        assert!(Args::try_parse_from(["spacefn"]).is_err());
    }

    #[test]
    fn test_args_list_devices_needs_no_device() {
        let args = Args::try_parse_from(["spacefn", "--list-devices"]).unwrap();
        assert!(args.list_devices);
        assert_eq!(args.device, None);
    }

    #[test]
    fn test_args_verbose() {
        let args = Args::parse_from(["spacefn", "-v", "/dev/input/event0"]);
        assert!(args.verbose);
    }
}
