/*!
 # ELK-BLEDOM Bluetooth LED Strip Controller Library

 A Rust library for controlling ELK-BLEDOM Bluetooth LED strips through their
 fixed 9-byte command protocol.

 ## Layout

 * [`frame`] and [`codec`] build and decode command frames without any I/O
 * [`schedule`] and [`effects`] hold the day-set and effect vocabularies
 * [`device`] turns semantic operations into single characteristic writes
 * [`transport`] is the write seam, implemented for btleplug peripherals
 * [`scan`] and [`config`] find and connect strips for the binaries

 ## Example

 ```rust,no_run
 use bledom::*;

 #[tokio::main]
 async fn main() -> Result<()> {
     // Initialize tracing for logs
     tracing_subscriber::fmt::init();

     let config = ScanConfig::default();
     for peripheral in scan::find_peripherals(&config).await? {
         scan::connect(&peripheral).await?;
         let characteristic = discover_characteristic(&peripheral)?;

         // Syncs the clock and powers the strip on
         let mut device = LedDevice::attach(peripheral, characteristic).await?;

         device.set_color(255, 0, 0).await?; // Set to red
         device.set_brightness(80).await?; // 80% brightness
         device.set_effect(Effect::CrossfadeAll).await?;
     }

     Ok(())
 }
 ```
*/

use thiserror::Error;

/// Errors reported by a write channel
#[derive(Error, Debug)]
pub enum TransportError {
    /// Error from btleplug
    #[error(transparent)]
    Ble(#[from] btleplug::Error),

    /// The peripheral is no longer connected
    #[error("Peripheral disconnected")]
    Disconnected,

    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

/// Custom error types for the BLEDOM controller library
#[derive(Error, Debug)]
pub enum Error {
    /// A value outside the domain an operation accepts
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Bytes that are not a valid command frame
    #[error("Invalid command frame: {0}")]
    InvalidFrame(String),

    /// Failed to find required BLE characteristic
    #[error("Could not find required BLE characteristic: {0}")]
    CharacteristicNotFound(String),

    /// Writing a command to the characteristic failed
    #[error("Transport failure: {0}")]
    TransportFailure(#[source] TransportError),

    /// No Bluetooth adapters found
    #[error("No Bluetooth adapters found")]
    NoBluetoothAdapters,

    /// No compatible LED device found
    #[error("No compatible LED device found")]
    NoCompatibleDevice,

    /// Error from btleplug while scanning or connecting
    #[error(transparent)]
    Ble(#[from] btleplug::Error),
}

impl Error {
    /// Whether the error came from the Bluetooth stack rather than from the
    /// caller's input, so that starting a fresh session may succeed
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::TransportFailure(_) | Error::Ble(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod codec;
pub mod config;
pub mod device;
pub mod effects;
pub mod frame;
pub mod scan;
pub mod schedule;
pub mod transport;

// Re-export key types
pub use codec::Command;
pub use config::ScanConfig;
pub use device::LedDevice;
pub use effects::{Effect, EffectFamily};
pub use frame::{CommandFrame, CommandId};
pub use schedule::DaySet;
pub use transport::{discover_characteristic, WriteChannel, BLEDOM_CHARACTERISTIC};
