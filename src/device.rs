use chrono::{self, Datelike, Timelike};
use tracing::{debug, error, info, instrument, warn};

use crate::codec::{self, Command, MAX_LEVEL};
use crate::effects::Effect;
use crate::frame::CommandFrame;
use crate::schedule::DaySet;
use crate::transport::WriteChannel;
use crate::{Error, Result};

/// A ready-to-use LED strip bound to one write channel and characteristic
///
/// The only way to obtain one is [`LedDevice::attach`], which performs the
/// setup writes first. Every operation encodes exactly one frame and writes it
/// once; the device keeps no copy of color, brightness or schedules.
///
/// Operations take `&mut self` so a device never has two writes in flight. After
/// any transport failure the device should be dropped and re-attached.
pub struct LedDevice<W: WriteChannel> {
    /// Channel used for sending commands
    channel: W,
    /// Characteristic the commands are written to
    characteristic: W::Characteristic,
}

impl<W: WriteChannel> LedDevice<W> {
    /// Binds a device to a connected channel, syncs its clock to local time
    /// and powers it on
    #[instrument(skip(channel, characteristic))]
    pub async fn attach(channel: W, characteristic: W::Characteristic) -> Result<Self> {
        Self::attach_at(channel, characteristic, &chrono::Local::now()).await
    }

    /// Like [`LedDevice::attach`] but syncs the clock to `now`
    #[instrument(skip(channel, characteristic, now))]
    pub async fn attach_at<T>(channel: W, characteristic: W::Characteristic, now: &T) -> Result<Self>
    where
        T: Datelike + Timelike + Sync,
    {
        let mut device = LedDevice {
            channel,
            characteristic,
        };

        debug!("Synchronizing device time");
        device.sync_time(now).await?;

        debug!("Powering on device");
        device.power_on().await?;

        info!("LED device ready");
        Ok(device)
    }

    /// Releases the underlying channel and characteristic
    pub fn into_inner(self) -> (W, W::Characteristic) {
        (self.channel, self.characteristic)
    }

    /// Synchronizes the device's internal clock with `now`
    #[instrument(skip(self, now))]
    pub async fn sync_time<T>(&mut self, now: &T) -> Result<()>
    where
        T: Datelike + Timelike + Sync,
    {
        debug!(
            "Syncing device time to {}:{:02}:{:02} day:{}",
            now.hour(),
            now.minute(),
            now.second(),
            now.weekday().number_from_monday()
        );

        self.write(codec::encode_time_of(now)).await?;
        debug!("Time synchronization complete");
        Ok(())
    }

    /// Synchronizes the device's internal clock with the system time
    pub async fn sync_local_time(&mut self) -> Result<()> {
        self.sync_time(&chrono::Local::now()).await
    }

    /// Sets a custom time on the device
    ///
    /// # Arguments
    ///
    /// * `hour` - Hour (0-23)
    /// * `minute` - Minute (0-59)
    /// * `second` - Second (0-59)
    /// * `day_of_week` - Day of week (1-7, where 1 is Monday)
    #[instrument(skip(self))]
    pub async fn set_custom_time(
        &mut self,
        hour: u32,
        minute: u32,
        second: u32,
        day_of_week: i32,
    ) -> Result<()> {
        self.write(codec::encode_time(hour, minute, second, day_of_week))
            .await?;
        debug!("Custom time set successfully");
        Ok(())
    }

    /// Turns the LED strip on
    #[instrument(skip(self))]
    pub async fn power_on(&mut self) -> Result<()> {
        self.write(codec::encode_power_on()).await?;
        info!("LED strip powered on");
        Ok(())
    }

    /// Turns the LED strip off
    #[instrument(skip(self))]
    pub async fn power_off(&mut self) -> Result<()> {
        self.write(codec::encode_power_off()).await?;
        info!("LED strip powered off");
        Ok(())
    }

    /// Sets the RGB color of the LED strip
    #[instrument(skip(self))]
    pub async fn set_color(&mut self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.write(codec::encode_color(red, green, blue)).await?;
        info!("Color set to RGB({}, {}, {})", red, green, blue);
        Ok(())
    }

    /// Sets the brightness level
    ///
    /// Values above 100 are limited to 100; negative values are rejected
    /// without writing anything.
    #[instrument(skip(self))]
    pub async fn set_brightness(&mut self, value: i32) -> Result<()> {
        let frame = codec::encode_brightness(value)?;
        if value > i32::from(MAX_LEVEL) {
            warn!(
                "Brightness value {} out of range (0-100), limiting to 100",
                value
            );
        }

        self.write(frame).await?;
        info!("Brightness set to {}%", frame.args()[0]);
        Ok(())
    }

    /// Sets a light effect mode
    #[instrument(skip(self))]
    pub async fn set_effect(&mut self, effect: Effect) -> Result<()> {
        self.write(codec::encode_effect(effect)).await?;
        info!("Effect mode set to {}", effect);
        Ok(())
    }

    /// Sets the speed of the current effect (0-100, same range policy as
    /// brightness)
    #[instrument(skip(self))]
    pub async fn set_effect_speed(&mut self, value: i32) -> Result<()> {
        let frame = codec::encode_effect_speed(value)?;
        if value > i32::from(MAX_LEVEL) {
            warn!(
                "Effect speed {} out of range (0-100), limiting to 100",
                value
            );
        }

        self.write(frame).await?;
        info!("Effect speed set to {}", frame.args()[0]);
        Ok(())
    }

    /// Sets a schedule to turn on the device
    ///
    /// # Arguments
    ///
    /// * `days` - Days the timer fires on
    /// * `hour` - Hour to turn on (0-23)
    /// * `minute` - Minute to turn on (0-59)
    /// * `enabled` - Whether to enable or disable this schedule
    #[instrument(skip(self))]
    pub async fn set_schedule_on(
        &mut self,
        days: DaySet,
        hour: u32,
        minute: u32,
        enabled: bool,
    ) -> Result<()> {
        self.write(codec::encode_schedule_on(days, hour, minute, enabled))
            .await?;
        info!(
            "Schedule set to turn on at {}:{:02} on {}",
            hour.min(23),
            minute.min(59),
            days
        );
        Ok(())
    }

    /// Sets a schedule to turn off the device
    ///
    /// Arguments as for [`LedDevice::set_schedule_on`].
    #[instrument(skip(self))]
    pub async fn set_schedule_off(
        &mut self,
        days: DaySet,
        hour: u32,
        minute: u32,
        enabled: bool,
    ) -> Result<()> {
        self.write(codec::encode_schedule_off(days, hour, minute, enabled))
            .await?;
        info!(
            "Schedule set to turn off at {}:{:02} on {}",
            hour.min(23),
            minute.min(59),
            days
        );
        Ok(())
    }

    /// Sends an already decoded command
    #[instrument(skip(self))]
    pub async fn send(&mut self, command: Command) -> Result<()> {
        self.write(command.encode()).await
    }

    /// Writes one frame through the bound channel, without retries
    async fn write(&mut self, frame: CommandFrame) -> Result<()> {
        debug!(?frame, "Sending command");
        self.channel
            .write_bytes(&self.characteristic, frame.as_ref())
            .await
            .map_err(|e| {
                error!("Command failed: {}", e);
                Error::TransportFailure(e)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        frames: Mutex<Vec<Vec<u8>>>,
        fail_after: Option<usize>,
    }

    #[async_trait]
    impl WriteChannel for Recorder {
        type Characteristic = u16;

        async fn write_bytes(
            &self,
            _characteristic: &u16,
            bytes: &[u8],
        ) -> std::result::Result<(), TransportError> {
            let mut frames = self.frames.lock();
            if self.fail_after.is_some_and(|n| frames.len() >= n) {
                return Err(TransportError::Disconnected);
            }
            frames.push(bytes.to_vec());
            Ok(())
        }
    }

    fn monday_morning() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(8, 15, 30)
            .unwrap()
    }

    #[tokio::test]
    async fn attach_syncs_time_then_powers_on() {
        let device = LedDevice::attach_at(Recorder::default(), 3, &monday_morning())
            .await
            .unwrap();
        let (recorder, characteristic) = device.into_inner();
        assert_eq!(characteristic, 3);
        assert_eq!(
            *recorder.frames.lock(),
            vec![
                vec![0x7e, 0x00, 0x83, 8, 15, 30, 1, 0x00, 0xef],
                vec![0x7e, 0x00, 0x04, 0xf0, 0x00, 0x01, 0xff, 0x00, 0xef],
            ]
        );
    }

    #[tokio::test]
    async fn negative_brightness_writes_nothing() {
        let mut device = LedDevice::attach_at(Recorder::default(), 0, &monday_morning())
            .await
            .unwrap();
        let err = device.set_brightness(-1).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let (recorder, _) = device.into_inner();
        assert_eq!(recorder.frames.lock().len(), 2);
    }

    #[tokio::test]
    async fn failed_power_on_returns_no_device() {
        let recorder = Recorder {
            fail_after: Some(1),
            ..Default::default()
        };
        let result = LedDevice::attach_at(recorder, 0, &monday_morning()).await;
        assert!(matches!(
            result,
            Err(Error::TransportFailure(TransportError::Disconnected))
        ));
    }
}
