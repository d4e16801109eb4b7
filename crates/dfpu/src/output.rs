use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use dfpu_decimal::{Decimal, Packed};
use dfpu_dispatch::Dispatch;
use dfpu_frame::Operation;
use dfpu_transport::DeviceInfo;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct LaneOutput {
    lane: usize,
    a: String,
    b: String,
    value: String,
    format: String,
    integer_places: u8,
    decimal_places: u8,
    significand: i32,
    nan: bool,
}

impl LaneOutput {
    fn new(lane: usize, a: Decimal, b: Decimal, result: Decimal) -> Self {
        Self {
            lane,
            a: a.to_string(),
            b: b.to_string(),
            value: result.to_string(),
            format: format!("{}.{}", result.integer_places, result.decimal_places),
            integer_places: result.integer_places,
            decimal_places: result.decimal_places,
            significand: result.significand,
            nan: result.is_nan(),
        }
    }
}

#[derive(Serialize)]
struct DispatchOutput<'a> {
    operation: &'a str,
    route: &'a str,
    lanes: Vec<LaneOutput>,
}

pub fn print_dispatch(
    operation: Operation,
    a: &Packed,
    b: &Packed,
    dispatch: &Dispatch,
    format: OutputFormat,
) {
    let lanes: Vec<LaneOutput> = a
        .iter()
        .zip(b)
        .zip(&dispatch.lanes)
        .enumerate()
        .map(|(i, ((a, b), r))| LaneOutput::new(i, *a, *b, *r))
        .collect();

    match format {
        OutputFormat::Json => {
            let out = DispatchOutput {
                operation: operation.name(),
                route: dispatch.route.as_str(),
                lanes,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "LANE",
                    "A",
                    "B",
                    "RESULT",
                    "FORMAT",
                    "SIGNIFICAND",
                    "NAN",
                ]);
            for lane in &lanes {
                table.add_row(vec![
                    lane.lane.to_string(),
                    lane.a.clone(),
                    lane.b.clone(),
                    lane.value.clone(),
                    lane.format.clone(),
                    lane.significand.to_string(),
                    lane.nan.to_string(),
                ]);
            }
            println!("{operation} via {}", dispatch.route);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for lane in &lanes {
                println!(
                    "{operation}[{}] {} {} {} = {} ({}, significand={}) via {}",
                    lane.lane,
                    lane.a,
                    symbol(operation),
                    lane.b,
                    lane.value,
                    lane.format,
                    lane.significand,
                    dispatch.route
                );
            }
        }
    }
}

#[derive(Serialize)]
struct DeviceOutput<'a> {
    path: &'a str,
    vendor_id: String,
    product_id: String,
    usage_page: String,
    usage: String,
    product: Option<&'a str>,
    accelerator: bool,
}

impl<'a> DeviceOutput<'a> {
    fn new(info: &'a DeviceInfo, accelerator: bool) -> Self {
        Self {
            path: &info.path,
            vendor_id: format!("{:04x}", info.vendor_id),
            product_id: format!("{:04x}", info.product_id),
            usage_page: format!("{:04x}", info.usage_page),
            usage: format!("{:04x}", info.usage),
            product: info.product.as_deref(),
            accelerator,
        }
    }
}

#[derive(Serialize)]
struct DevicesOutput<'a> {
    count: usize,
    devices: Vec<DeviceOutput<'a>>,
}

/// Print enumerated devices; each entry pairs a device with whether it is the
/// accelerator.
pub fn print_devices(devices: &[(DeviceInfo, bool)], format: OutputFormat) {
    let rows: Vec<DeviceOutput<'_>> = devices
        .iter()
        .map(|(info, accelerator)| DeviceOutput::new(info, *accelerator))
        .collect();

    match format {
        OutputFormat::Json => {
            let out = DevicesOutput {
                count: rows.len(),
                devices: rows,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "USAGE", "PRODUCT", "PATH", "DFPU"]);
            for row in &rows {
                table.add_row(vec![
                    format!("{}:{}", row.vendor_id, row.product_id),
                    format!("{}:{}", row.usage_page, row.usage),
                    row.product.unwrap_or("-").to_string(),
                    row.path.to_string(),
                    if row.accelerator { "yes" } else { "" }.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if rows.is_empty() {
                println!("no HID devices found");
            }
            for row in &rows {
                println!(
                    "{}{}:{} usage={}:{} product={} path={}",
                    if row.accelerator { "* " } else { "  " },
                    row.vendor_id,
                    row.product_id,
                    row.usage_page,
                    row.usage,
                    row.product.unwrap_or("-"),
                    row.path
                );
            }
        }
    }
}

fn symbol(operation: Operation) -> char {
    match operation {
        Operation::Add => '+',
        Operation::Subtract => '-',
        Operation::Multiply => '×',
        Operation::Divide => '÷',
    }
}
