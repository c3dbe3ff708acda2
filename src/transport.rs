/*!
 # Transport seam

 The device layer only needs to push bytes into one GATT characteristic. That
 capability is the [`WriteChannel`] trait; the btleplug peripheral implements it
 for real hardware and tests plug in an in-memory recorder.
*/

use async_trait::async_trait;
use btleplug::api::{CharPropFlags, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use crate::{Error, Result, TransportError};

/// Write characteristic exposed by ELK-BLEDOM controllers
pub const BLEDOM_CHARACTERISTIC: Uuid = Uuid::from_u128(0x0000fff3_0000_1000_8000_00805f9b34fb);

/// A channel that can write raw bytes to a characteristic
///
/// Implementations are not required to be reentrant: callers keep at most one
/// write in flight per characteristic.
#[async_trait]
pub trait WriteChannel: Send + Sync {
    /// Handle identifying the characteristic to write to
    type Characteristic: Send + Sync;

    /// Writes `bytes` to `characteristic`, waiting until the write completes
    async fn write_bytes(
        &self,
        characteristic: &Self::Characteristic,
        bytes: &[u8],
    ) -> std::result::Result<(), TransportError>;
}

#[async_trait]
impl WriteChannel for Peripheral {
    type Characteristic = Characteristic;

    async fn write_bytes(
        &self,
        characteristic: &Characteristic,
        bytes: &[u8],
    ) -> std::result::Result<(), TransportError> {
        // Prefer WriteWithResponse when supported
        let write_type = if characteristic.properties.contains(CharPropFlags::WRITE) {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };

        trace!(?write_type, "Writing {} bytes to {}", bytes.len(), characteristic.uuid);
        self.write(characteristic, bytes, write_type).await?;
        Ok(())
    }
}

/// Finds the command characteristic on a connected peripheral whose services
/// have already been discovered
#[instrument(skip(peripheral))]
pub fn discover_characteristic(peripheral: &Peripheral) -> Result<Characteristic> {
    find_characteristic(peripheral.characteristics(), BLEDOM_CHARACTERISTIC)
}

/// Picks the characteristic with `uuid` out of a discovered set
pub fn find_characteristic<I>(characteristics: I, uuid: Uuid) -> Result<Characteristic>
where
    I: IntoIterator<Item = Characteristic>,
{
    let found = characteristics
        .into_iter()
        .find(|c| c.uuid == uuid)
        .ok_or_else(|| Error::CharacteristicNotFound(uuid.to_string()))?;

    debug!("Found write characteristic: {}", found.uuid);
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn characteristic(uuid: Uuid) -> Characteristic {
        Characteristic {
            uuid,
            service_uuid: Uuid::from_u128(0x0000fff0_0000_1000_8000_00805f9b34fb),
            properties: CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE,
            descriptors: BTreeSet::new(),
        }
    }

    #[test]
    fn characteristic_uuid() {
        assert_eq!(
            BLEDOM_CHARACTERISTIC.to_string(),
            "0000fff3-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn finds_the_command_characteristic() {
        let read = Uuid::from_u128(0x0000fff4_0000_1000_8000_00805f9b34fb);
        let found = find_characteristic(
            vec![characteristic(read), characteristic(BLEDOM_CHARACTERISTIC)],
            BLEDOM_CHARACTERISTIC,
        )
        .unwrap();
        assert_eq!(found.uuid, BLEDOM_CHARACTERISTIC);
    }

    #[test]
    fn missing_characteristic_is_an_error() {
        let read = Uuid::from_u128(0x0000fff4_0000_1000_8000_00805f9b34fb);
        let err = find_characteristic(vec![characteristic(read)], BLEDOM_CHARACTERISTIC)
            .unwrap_err();
        assert!(matches!(err, Error::CharacteristicNotFound(_)));
    }
}
