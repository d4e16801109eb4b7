use dfpu_transport::{enumerate, DeviceFilter, DeviceInfo};

use crate::cmd::DevicesArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_devices, OutputFormat};

pub fn run(args: DevicesArgs, format: OutputFormat) -> CliResult<i32> {
    let filter = DeviceFilter::default();
    let devices = enumerate().map_err(|err| transport_error("device enumeration failed", err))?;
    print_devices(&classify(devices, &filter, args.matching), format);
    Ok(SUCCESS)
}

fn classify(
    devices: Vec<DeviceInfo>,
    filter: &DeviceFilter,
    matching_only: bool,
) -> Vec<(DeviceInfo, bool)> {
    devices
        .into_iter()
        .map(|info| {
            let accelerator = filter.matches(&info);
            (info, accelerator)
        })
        .filter(|(_, accelerator)| *accelerator || !matching_only)
        .collect()
}
