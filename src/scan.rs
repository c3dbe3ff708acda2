//! Finding and connecting ELK-BLEDOM strips with btleplug.

use std::collections::HashSet;

use btleplug::api::{Central, CentralEvent, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use tokio::time;
use tracing::{debug, error, info, instrument};

use crate::config::ScanConfig;
use crate::{Error, Result};

/// Gets the default Bluetooth adapter
#[instrument(skip(manager))]
pub async fn first_adapter(manager: &Manager) -> Result<Adapter> {
    debug!("Getting default Bluetooth adapter");
    let adapter = manager
        .adapters()
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            error!("No Bluetooth adapters found");
            Error::NoBluetoothAdapters
        })?;

    debug!("Using Bluetooth adapter");
    Ok(adapter)
}

/// Scans for strips matching `config`
///
/// Collects every match seen within the scan window, or returns as soon as the
/// single targeted address shows up.
#[instrument]
pub async fn find_peripherals(config: &ScanConfig) -> Result<Vec<Peripheral>> {
    info!("Initializing BLE LED controller");
    let manager = Manager::new().await?;
    let central = first_adapter(&manager).await?;

    let mut events = central.events().await?;
    info!("Scanning for compatible BLE devices...");
    central.start_scan(ScanFilter::default()).await?;

    let deadline = time::Instant::now() + config.scan_timeout;
    let mut seen = HashSet::new();
    let mut found = Vec::new();

    while let Ok(Some(event)) = time::timeout_at(deadline, events.next()).await {
        let id = match event {
            CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => id,
            _ => continue,
        };
        if seen.contains(&id) {
            continue;
        }

        let peripheral = central.peripheral(&id).await?;
        let Some(props) = peripheral.properties().await? else {
            continue;
        };
        let name = props.local_name.as_deref();
        debug!("Found device: {} {:?}", id, name);

        if config.matches(name, &id.to_string(), &props.address.to_string()) {
            info!("Found compatible device: {} ({})", name.unwrap_or("?"), id);
            seen.insert(id);
            found.push(peripheral);
            if config.single_target() {
                break;
            }
        }
    }

    central.stop_scan().await?;

    if found.is_empty() {
        error!(
            "No compatible LED device found within {} seconds",
            config.scan_timeout.as_secs()
        );
        return Err(Error::NoCompatibleDevice);
    }
    Ok(found)
}

/// Connects if needed and discovers services so characteristics are available
#[instrument(skip(peripheral))]
pub async fn connect(peripheral: &Peripheral) -> Result<()> {
    info!("Connecting to device...");
    if !peripheral.is_connected().await? {
        peripheral.connect().await?;
    }

    debug!("Discovering services...");
    peripheral.discover_services().await?;
    Ok(())
}

/// Disconnects, logging instead of failing when the link is already gone
#[instrument(skip(peripheral))]
pub async fn disconnect(peripheral: &Peripheral) {
    if let Err(e) = peripheral.disconnect().await {
        debug!("Disconnect failed: {}", e);
    }
}
