use dfpu_dispatch::DEFAULT_TIMEOUT;
use dfpu_transport::DeviceFilter;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("dfpu {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let filter = DeviceFilter::default();
    println!("name: dfpu");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("DFPU_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("hid_backend: {}", hid_backend());
    println!(
        "device_filter: {:04x}:{:04x} usage {:04x}:{:04x}",
        filter.vendor_id, filter.product_id, filter.usage_page, filter.usage
    );
    println!("default_timeout: {}ms", DEFAULT_TIMEOUT.as_millis());
    println!(
        "features: dispatch={}, cli=true",
        cfg!(feature = "dispatch")
    );

    Ok(SUCCESS)
}

fn hid_backend() -> &'static str {
    if cfg!(target_os = "linux") {
        "hidraw"
    } else if cfg!(windows) {
        "windows-hid"
    } else {
        "none"
    }
}
