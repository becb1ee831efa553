//! Bidi Extension CLI - Entry Point
//!
//! Stands in for the print monitor: opens the printer, invokes one extension
//! entry point and prints what it reported. Retrying a `1` result is left to
//! the operator.

use anyhow::{anyhow, Context, Result};
use bidi_extension::{
    bidi::{
        frames::{ResponseShape, FRAMES},
        PollMode, QueueContext, StatusPoller,
    },
    core::config::Config,
    device::{StreamAccess, UsbPrinterStream},
    get_schemas, get_status, monitor, request_status, set_schema, BidiSchemaElement,
    ResponseSet, SchemaValue, ScriptStatus,
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "bidi-extension", about = "Exercise the USB Bidi extension against a printer")]
struct Cli {
    /// Config file (defaults to the per-user config location)
    #[arg(long)]
    config: Option<PathBuf>,

    /// USB vendor id, overrides the config file
    #[arg(long, value_parser = parse_u16)]
    vid: Option<u16>,

    /// USB product id, overrides the config file
    #[arg(long, value_parser = parse_u16)]
    pid: Option<u16>,

    /// Queue property visible to the extension, may be repeated
    #[arg(long = "property", value_name = "NAME=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query one or more Bidi Schema keys
    Query {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Set a Bidi Schema value
    Set {
        name: String,
        value: String,
        #[arg(long, value_enum, default_value_t = ValueKind::Auto)]
        kind: ValueKind,
    },
    /// Read status as during a print job
    Status {
        /// Write a poll trigger before reading (alternate status interface)
        #[arg(long)]
        solicited: bool,
        /// Keep polling until the device reports no further status
        #[arg(long)]
        watch: bool,
    },
    /// Print the printer command table
    Frames,
    /// Print the config path and embedded defaults
    Config {
        /// Write the current config to the default location
        #[arg(long)]
        write: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
    Auto,
    Bool,
    Int,
    String,
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid id {:?}: {}", s, e))
}

fn parse_property(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected NAME=VALUE, got {:?}", s))
}

fn parse_value(kind: ValueKind, raw: &str) -> Result<SchemaValue> {
    match kind {
        ValueKind::Bool => raw
            .parse()
            .map(SchemaValue::Bool)
            .with_context(|| format!("Invalid boolean: {}", raw)),
        ValueKind::Int => raw
            .parse()
            .map(SchemaValue::Int32)
            .with_context(|| format!("Invalid integer: {}", raw)),
        ValueKind::String => Ok(SchemaValue::String(raw.to_string())),
        ValueKind::Auto => Ok(if let Ok(b) = raw.parse() {
            SchemaValue::Bool(b)
        } else if let Ok(n) = raw.parse() {
            SchemaValue::Int32(n)
        } else {
            SchemaValue::String(raw.to_string())
        }),
    }
}

fn print_result(json: bool, status: ScriptStatus, responses: &ResponseSet) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "status": status.code(),
            "responses": responses.responses,
            "requery": responses.requery_keys,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    for resp in &responses.responses {
        println!("{} = {}", resp.key, resp.value);
    }
    for key in &responses.requery_keys {
        println!("requery: {}", key);
    }
    println!("status: {} ({})", status.code(), status);
    Ok(())
}

fn print_frames() {
    for spec in FRAMES {
        let mut command: Vec<String> = spec.command.iter().map(|b| format!("{:02X}", b)).collect();
        if spec.operand {
            command.push("<value>".to_string());
        }
        let response = match spec.response {
            ResponseShape::None => "-".to_string(),
            ResponseShape::Exact(n) => format!("{} bytes", n),
            ResponseShape::Any => "any".to_string(),
        };
        println!("{:<18} {:<24} {}", format!("{:?}", spec.operation), command.join(" "), response);
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(vid) = cli.vid {
        config.device.vendor_id = vid;
    }
    if let Some(pid) = cli.pid {
        config.device.product_id = pid;
    }
    for (name, value) in &cli.properties {
        config.properties.queue.insert(name.as_str(), value.as_str());
    }
    let context = config.properties.script_context();

    match cli.command {
        Commands::Query { keys } => {
            let mut stream = UsbPrinterStream::open(&config.device, StreamAccess::ReadWrite)?;
            let mut responses = ResponseSet::new();
            let status = get_schemas(&context, &mut stream, &keys, &mut responses);
            print_result(cli.json, status, &responses)?;
        }
        Commands::Set { name, value, kind } => {
            let element = BidiSchemaElement::new(name, parse_value(kind, &value)?);
            let mut stream = UsbPrinterStream::open(&config.device, StreamAccess::ReadWrite)?;
            let status = set_schema(&context, &mut stream, &element);
            print_result(cli.json, status, &ResponseSet::new())?;
        }
        Commands::Status { solicited, watch } => {
            let (mode, access) = if solicited {
                (PollMode::Solicited, StreamAccess::ReadWrite)
            } else {
                (PollMode::Unsolicited, StreamAccess::ReadOnly)
            };
            let mut stream = UsbPrinterStream::open(&config.device, access)?;

            if watch {
                let interval = Duration::from_millis(config.status.poll_interval_ms);
                watch_status(cli.json, mode, &context, &mut stream, interval)?;
            } else {
                let mut responses = ResponseSet::new();
                let status = match mode {
                    PollMode::Unsolicited => get_status(&context, &mut stream, &mut responses),
                    PollMode::Solicited => request_status(&context, &mut stream, &mut responses),
                };
                print_result(cli.json, status, &responses)?;
            }
        }
        Commands::Frames => print_frames(),
        Commands::Config { write } => {
            let path = Config::config_path()?;
            if write {
                config.save()?;
                println!("Wrote {}", path.display());
            } else {
                println!("# {}", path.display());
                print!("{}", Config::default_config_str());
            }
        }
    }

    Ok(())
}

/// Poll until the device reports no further status or Ctrl-C
fn watch_status(
    json: bool,
    mode: PollMode,
    context: &QueueContext,
    stream: &mut UsbPrinterStream,
    interval: Duration,
) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to create tokio runtime: {}", e))?;

    rt.block_on(async {
        let mut poller = StatusPoller::new(mode);
        info!("Watching status ({:?}), Ctrl-C to stop", mode);

        let mut report_error = None;
        let watch = monitor::watch_status(&mut poller, context, stream, interval, |responses| {
            if let Err(e) = print_result(json, ScriptStatus::Success, responses) {
                report_error.get_or_insert(e);
            }
        });

        tokio::select! {
            polls = watch => info!("Status stream exhausted after {} polls", polls),
            _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        }

        report_error.map_or(Ok(()), Err)
    })
}
