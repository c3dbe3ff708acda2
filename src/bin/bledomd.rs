use bledom::{discover_characteristic, scan, Effect, LedDevice, ScanConfig};
use btleplug::platform::Peripheral;
use color_eyre::eyre::Result;
use std::env;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: bledomd <id/mac address>";

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the OK/ERR replies
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("bledom=warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
    color_eyre::install()?;

    // Get a target id/mac address from command line arguments.
    let args: Vec<_> = env::args().collect();
    if args.len() < 2 {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    if args[1] == "-h" || args[1] == "--help" {
        eprintln!("{USAGE}");
        std::process::exit(0);
    }

    let config = ScanConfig::from_env().with_address(&args[1]);
    let peripheral = scan::find_peripherals(&config)
        .await?
        .into_iter()
        .next()
        .ok_or(bledom::Error::NoCompatibleDevice)?;
    scan::connect(&peripheral).await?;
    let characteristic = discover_characteristic(&peripheral)?;
    let mut device = LedDevice::attach(peripheral.clone(), characteristic).await?;

    // Inform about successful initialization
    println!("OK");

    // Mainloop: wait for user input, line by line
    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("Received command line: {}", line);

        match execute(&mut device, line).await {
            Ok(()) => println!("OK"),
            Err(Reply::Rejected(reason)) => println!("ERR {reason}"),
            Err(Reply::Fatal(e)) => {
                println!("ERR {e}");
                scan::disconnect(&peripheral).await;
                return Err(e.into());
            }
        }
    }

    info!("Input closed, disconnecting");
    scan::disconnect(&peripheral).await;
    Ok(())
}

/// Why a command line was not executed
enum Reply {
    /// Bad input; the daemon keeps going
    Rejected(String),
    /// The device is unusable and must be re-attached
    Fatal(bledom::Error),
}

impl From<bledom::Error> for Reply {
    fn from(e: bledom::Error) -> Self {
        if e.is_transport() {
            Reply::Fatal(e)
        } else {
            Reply::Rejected(e.to_string())
        }
    }
}

async fn execute(device: &mut LedDevice<Peripheral>, line: &str) -> Result<(), Reply> {
    let (name, arg) = match line.split_once(':') {
        Some((name, arg)) => (name.trim(), Some(arg.trim())),
        None => (line, None),
    };
    let required = || arg.ok_or_else(|| Reply::Rejected(format!("{name} needs an argument")));
    let level = |text: &str| {
        text.parse::<i32>()
            .map_err(|_| Reply::Rejected(format!("invalid number '{text}'")))
    };

    match name {
        "power_on" => device.power_on().await?,
        "power_off" => device.power_off().await?,
        "sync_time" => device.sync_local_time().await?,
        "set_color" => {
            let rgb = required()?
                .split(',')
                .map(|s| s.trim().parse::<u8>())
                .collect::<std::result::Result<Vec<u8>, _>>()
                .map_err(|_| Reply::Rejected("invalid color".to_string()))?;
            let [red, green, blue] = rgb[..] else {
                return Err(Reply::Rejected(
                    "Invalid color format. Use R,G,B (e.g., 255,0,0 for red)".to_string(),
                ));
            };
            device.set_color(red, green, blue).await?;
        }
        "set_brightness" => device.set_brightness(level(required()?)?).await?,
        "set_effect" => {
            let effect: Effect = required()?.parse()?;
            device.set_effect(effect).await?;
        }
        "set_effect_speed" => device.set_effect_speed(level(required()?)?).await?,
        other => return Err(Reply::Rejected(format!("Unknown command: {other}"))),
    }
    Ok(())
}
