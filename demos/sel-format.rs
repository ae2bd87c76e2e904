use clap::Parser;
use ipmi_sel::{
    format::{format, hex_dump, FormatContext, FormatFlags, FormatOptions},
    oem::OemContext,
    output::OUTPUT_CAPACITY,
    storage::sel::{decode_with, DecodeOptions},
    LogOutput, Logger,
};

/// Decode raw SEL records and render them through a format template.
#[derive(Parser)]
pub struct Command {
    /// The template to render every record with
    #[clap(long, short, default_value = "%i:%d %t:%T %s:%e:%E")]
    template: String,

    /// Manufacturer ID of the BMC that wrote the records
    #[clap(long)]
    manufacturer_id: Option<u32>,

    /// Product ID of the BMC that wrote the records
    #[clap(long, default_value = "0")]
    product_id: u16,

    /// Apply vendor specific interpretations
    #[clap(long)]
    interpret_oem_data: bool,

    /// Decode records of this (hex) record type as system events
    #[clap(long, value_parser = parse_hex_u8)]
    assume_system_event: Vec<u8>,

    #[clap(long, short)]
    verbose: bool,

    /// Print the raw bytes instead of rendering a template
    #[clap(long)]
    hex_dump: bool,

    /// Show the decoded records in the debug log
    #[clap(long)]
    show_decoded: bool,

    /// Raw 16 byte records, in hex
    #[clap(required = true)]
    records: Vec<String>,
}

fn parse_hex_u8(input: &str) -> Result<u8, std::num::ParseIntError> {
    u8::from_str_radix(input.trim_start_matches("0x"), 16)
}

fn error<T>(val: T) -> std::io::Error
where
    T: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    std::io::Error::new(std::io::ErrorKind::Other, val)
}

fn main() -> std::io::Result<()> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or("info".to_string()))
        .init();

    let command = Command::parse();

    let decode_options = command
        .assume_system_event
        .iter()
        .fold(DecodeOptions::new(), |options, record_type| {
            options.assume_system_event(*record_type)
        });

    let mut flags = FormatFlags::IGNORE_UNAVAILABLE
        | FormatFlags::OUTPUT_NOT_AVAILABLE
        | FormatFlags::DATE_MONTH_STRING;

    if command.verbose {
        flags |= FormatFlags::VERBOSE;
    }
    if command.interpret_oem_data {
        flags |= FormatFlags::INTERPRET_OEM_DATA;
    }

    let options = FormatOptions::new(flags);
    let oem = command
        .manufacturer_id
        .map(|id| OemContext::new(id, command.product_id));

    let log_output = LogOutput::LogTarget(log::Level::Debug, "sel_format".into());

    for input in &command.records {
        let raw = hex::decode(input.replace(' ', ""))
            .map_err(|e| error(format!("Invalid record {input}: {e}")))?;

        let record = match decode_with(&raw, &decode_options) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Cannot decode {input}: {e}");
                continue;
            }
        };

        if command.show_decoded {
            Logger::log(&log_output, &record);
        }

        if command.hex_dump {
            println!("{}", hex_dump(&record));
            continue;
        }

        let ctx = FormatContext::new(&record, &options).with_oem(oem.as_ref());

        let formatted = format(&ctx, &command.template, OUTPUT_CAPACITY)
            .map_err(|e| error(format!("Invalid template: {e}")))?;

        println!("{}", formatted.text);
    }

    Ok(())
}
