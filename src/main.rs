use std::str::FromStr;

use bledom::{config, discover_characteristic, scan, DaySet, Effect, LedDevice, ScanConfig};
use btleplug::platform::Peripheral;
use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use rand::Rng;
use tokio::time::Duration;
use tracing::{debug, error, info, instrument, trace, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Advertised name prefix of the strips to control
    #[arg(long, env = config::NAME_PREFIX_ENV, default_value = config::DEFAULT_NAME_PREFIX)]
    prefix: String,

    /// MAC address or platform id of a single strip (overrides --prefix)
    #[arg(short, long)]
    address: Option<String>,

    /// Seconds to scan for strips
    #[arg(long, default_value_t = config::DEFAULT_SCAN_TIMEOUT.as_secs())]
    scan_secs: u64,

    /// Times a session is started over after a Bluetooth failure
    #[arg(long, default_value_t = config::DEFAULT_RETRIES)]
    retries: u32,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Demonstration of LED features
    Demo {
        /// Duration of each demo step in seconds
        #[arg(short, long, default_value_t = 5)]
        duration: u64,
    },
    /// Turn LED strip on
    On,
    /// Turn LED strip off
    Off,
    /// Set a static color: a name (red, purple, ...), RRGGBB hex or R,G,B
    Color {
        color: Rgb,
    },
    /// Set brightness
    Brightness {
        /// Brightness level (0-100)
        #[arg(allow_negative_numbers = true)]
        level: i32,
    },
    /// Set effect
    Effect {
        /// Effect name (see `effects`)
        effect: Effect,
        /// Effect speed (0-100)
        #[arg(short, long)]
        speed: Option<i32>,
    },
    /// Set the speed of the running effect
    Speed {
        /// Effect speed (0-100)
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
    /// Schedule to turn on
    ScheduleOn(ScheduleArgs),
    /// Schedule to turn off
    ScheduleOff(ScheduleArgs),
    /// Sync the strip's clock with this machine
    SyncTime,
    /// List available effects
    Effects,
    /// Show random colors
    Random {
        /// Delay between colors in milliseconds
        #[arg(short, long, default_value_t = 500)]
        interval_ms: u64,
        /// Number of colors to show (forever if omitted)
        #[arg(short, long)]
        count: Option<u32>,
    },
}

#[derive(clap::Args, Debug, Clone)]
struct ScheduleArgs {
    /// Hour (0-23)
    #[arg(long)]
    hour: u32,
    /// Minute (0-59)
    #[arg(short, long, default_value_t = 0)]
    minute: u32,
    /// Days (mon,tue,wed,thu,fri,sat,sun,all,weekdays,weekend)
    #[arg(short, long, default_value = "weekdays")]
    days: DaySet,
    /// Store the timer disabled
    #[arg(long)]
    disable: bool,
}

/// An RGB triple parsed from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rgb(u8, u8, u8);

const NAMED_COLORS: &[(&str, Rgb)] = &[
    ("black", Rgb(0, 0, 0)),
    ("white", Rgb(255, 255, 255)),
    ("red", Rgb(255, 0, 0)),
    ("green", Rgb(0, 255, 0)),
    ("blue", Rgb(0, 0, 255)),
    ("yellow", Rgb(255, 255, 0)),
    ("cyan", Rgb(0, 255, 255)),
    ("magenta", Rgb(255, 0, 255)),
    ("purple", Rgb(128, 0, 128)),
    ("orange", Rgb(255, 165, 0)),
    ("pink", Rgb(255, 192, 203)),
    ("warm", Rgb(255, 147, 41)),
];

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        if let Some((_, rgb)) = NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
        {
            return Ok(*rgb);
        }

        if s.contains(',') {
            let parts = s
                .split(',')
                .map(|p| p.trim().parse::<u8>())
                .collect::<std::result::Result<Vec<u8>, _>>()
                .map_err(|e| format!("invalid color component: {e}"))?;
            return match parts[..] {
                [r, g, b] => Ok(Rgb(r, g, b)),
                _ => Err("use R,G,B (e.g., 255,0,0 for red)".to_string()),
            };
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() == 6 && hex.is_ascii() {
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("invalid hex color: {e}"))
            };
            return Ok(Rgb(channel(0)?, channel(2)?, channel(4)?));
        }

        Err(format!("unknown color '{s}'"))
    }
}

/// Rejects level arguments the codec refuses before any Bluetooth traffic
fn validate(command: &Commands) -> bledom::Result<()> {
    match *command {
        Commands::Brightness { level } => {
            bledom::codec::encode_brightness(level)?;
        }
        Commands::Speed { value } => {
            bledom::codec::encode_effect_speed(value)?;
        }
        Commands::Effect { speed: Some(speed), .. } => {
            bledom::codec::encode_effect_speed(speed)?;
        }
        _ => {}
    }
    Ok(())
}

#[tokio::main]
#[instrument]
async fn main() -> Result<()> {
    // Initialize tracing with pretty colors
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RUST_LOG").unwrap_or_else(|_| EnvFilter::new("bledom=info")),
        )
        .compact()
        .init();

    // Initialize color-eyre for pretty error reporting
    color_eyre::install()?;

    let cli = Cli::parse();
    debug!("Parsed command line arguments");

    let command = cli.command.clone().unwrap_or(Commands::Demo { duration: 5 });
    if let Commands::Effects = command {
        for effect in Effect::ALL {
            println!("{:<22} {:#04x} {:?}", effect, effect.code(), effect.family());
        }
        return Ok(());
    }

    validate(&command)?;

    let config = ScanConfig {
        name_prefix: cli.prefix.clone(),
        address: cli.address.clone(),
        scan_timeout: Duration::from_secs(cli.scan_secs),
        retries: cli.retries,
    };

    // Bluetooth failures restart the whole session: scan, connect, attach, command
    let mut attempt = 0;
    loop {
        match run_session(&config, &command).await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_transport() && attempt < config.retries => {
                attempt += 1;
                warn!(
                    "Session failed (attempt {}/{}): {}",
                    attempt,
                    config.retries + 1,
                    e
                );
                sleep_ms(500).await;
            }
            Err(e) => {
                error!("Failed to control device: {}", e);
                return Err(e.into());
            }
        }
    }
}

/// Runs `command` on every strip found with `config`
#[instrument(skip(config))]
async fn run_session(config: &ScanConfig, command: &Commands) -> bledom::Result<()> {
    for peripheral in scan::find_peripherals(config).await? {
        let result = control(&peripheral, command).await;
        scan::disconnect(&peripheral).await;
        result?;
    }
    Ok(())
}

async fn control(peripheral: &Peripheral, command: &Commands) -> bledom::Result<()> {
    scan::connect(peripheral).await?;
    let characteristic = discover_characteristic(peripheral)?;
    let mut device = LedDevice::attach(peripheral.clone(), characteristic).await?;

    match command {
        Commands::Demo { duration } => run_demo(&mut device, *duration).await?,
        // attach already powered the strip on
        Commands::On => {}
        Commands::Off => device.power_off().await?,
        Commands::Color { color } => {
            let Rgb(red, green, blue) = *color;
            device.set_color(red, green, blue).await?;
        }
        Commands::Brightness { level } => device.set_brightness(*level).await?,
        Commands::Effect { effect, speed } => {
            debug!("Using effect code: {:#04x}", effect.code());
            device.set_effect(*effect).await?;
            if let Some(speed) = speed {
                device.set_effect_speed(*speed).await?;
            }
        }
        Commands::Speed { value } => device.set_effect_speed(*value).await?,
        Commands::ScheduleOn(args) => {
            debug!("Days value: {:#04x}", args.days.bits());
            device
                .set_schedule_on(args.days, args.hour, args.minute, !args.disable)
                .await?;
        }
        Commands::ScheduleOff(args) => {
            debug!("Days value: {:#04x}", args.days.bits());
            device
                .set_schedule_off(args.days, args.hour, args.minute, !args.disable)
                .await?;
        }
        Commands::SyncTime => device.sync_local_time().await?,
        Commands::Effects => {}
        Commands::Random { interval_ms, count } => {
            run_random(&mut device, *interval_ms, *count).await?
        }
    }

    Ok(())
}

/// Sleep for specified number of milliseconds
async fn sleep_ms(millis: u64) {
    trace!("Sleeping for {}ms", millis);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Cycle through random colors
#[instrument(skip(device))]
async fn run_random(
    device: &mut LedDevice<Peripheral>,
    interval_ms: u64,
    count: Option<u32>,
) -> bledom::Result<()> {
    let mut shown = 0;
    while count.map_or(true, |count| shown < count) {
        let (red, green, blue) = {
            let mut rng = rand::thread_rng();
            (rng.gen(), rng.gen(), rng.gen())
        };
        device.set_color(red, green, blue).await?;
        shown += 1;
        sleep_ms(interval_ms).await;
    }
    Ok(())
}

/// Run a demonstration of various LED strip features
#[instrument(skip(device))]
async fn run_demo(device: &mut LedDevice<Peripheral>, duration: u64) -> bledom::Result<()> {
    info!("Running LED strip demo with {}s intervals", duration);
    let step = duration * 1000;

    info!("Turning LEDs off");
    device.power_off().await?;
    sleep_ms(step).await;

    info!("Turning LEDs on");
    device.power_on().await?;
    sleep_ms(step).await;

    for (name, Rgb(red, green, blue)) in [
        ("red", Rgb(255, 0, 0)),
        ("green", Rgb(0, 255, 0)),
        ("blue", Rgb(0, 0, 255)),
    ] {
        info!("Setting color to {}", name);
        device.set_color(red, green, blue).await?;
        sleep_ms(step).await;
    }

    for level in [50, 100] {
        info!("Setting brightness to {}%", level);
        device.set_brightness(level).await?;
        sleep_ms(step).await;
    }

    for effect in [Effect::CrossfadeAll, Effect::JumpRedGreenBlue, Effect::BlinkAll] {
        info!("Setting {} effect", effect);
        device.set_effect(effect).await?;
        sleep_ms(step).await;
    }

    for speed in [20, 80] {
        info!("Setting effect speed to {}", speed);
        device.set_effect_speed(speed).await?;
        sleep_ms(step).await;
    }

    info!("Back to static white");
    device.set_color(255, 255, 255).await?;
    sleep_ms(1000).await;

    info!("Turning LEDs off to end demo");
    device.power_off().await?;

    info!("Demo completed!");
    Ok(())
}
