/*!
 # Command codec

 Pure translation between semantic LED commands and [`CommandFrame`]s. Nothing
 here performs I/O, so every command can be checked byte-for-byte without a
 device.
*/

use chrono::{Datelike, Timelike};

use crate::effects::Effect;
use crate::frame::{CommandFrame, CommandId};
use crate::schedule::DaySet;
use crate::{Error, Result};

/// Highest brightness / effect speed level the controller accepts
pub const MAX_LEVEL: u8 = 100;

/// High bit of the schedule value byte marking the timer as enabled
pub const SCHEDULE_ENABLED: u8 = 0x80;

const POWER_ON_ARGS: [u8; 5] = [0xf0, 0x00, 0x01, 0xff, 0x00];
const POWER_OFF_ARGS: [u8; 5] = [0x00, 0x00, 0x00, 0xff, 0x00];
const COLOR_RGB_MODE: u8 = 0x03;
const SCHEDULE_ON: u8 = 0x00;
const SCHEDULE_OFF: u8 = 0x01;

/// Switches the strip on
pub fn encode_power_on() -> CommandFrame {
    CommandFrame::new(CommandId::Power, POWER_ON_ARGS)
}

/// Switches the strip off
pub fn encode_power_off() -> CommandFrame {
    CommandFrame::new(CommandId::Power, POWER_OFF_ARGS)
}

/// Static RGB color; every byte triple is valid
pub fn encode_color(red: u8, green: u8, blue: u8) -> CommandFrame {
    CommandFrame::new(CommandId::Color, [COLOR_RGB_MODE, red, green, blue, 0x00])
}

/// Brightness level. Values above 100 saturate, negative values are rejected.
pub fn encode_brightness(value: i32) -> Result<CommandFrame> {
    Ok(level_frame(CommandId::Brightness, checked_level("brightness", value)?))
}

/// Effect speed. Same range policy as [`encode_brightness`].
pub fn encode_effect_speed(value: i32) -> Result<CommandFrame> {
    Ok(level_frame(CommandId::EffectSpeed, checked_level("effect speed", value)?))
}

/// Starts a built-in effect
pub fn encode_effect(effect: Effect) -> CommandFrame {
    CommandFrame::new(CommandId::Effect, [effect.code(), 0x00, 0x00, 0x00, 0x00])
}

/// Clock synchronization frame
///
/// # Arguments
///
/// * `hour` - Hour, saturated to 23
/// * `minute` - Minute, saturated to 59
/// * `second` - Second, saturated to 59
/// * `day_of_week` - Day of week, clamped to 1 (Monday) ..= 7 (Sunday)
pub fn encode_time(hour: u32, minute: u32, second: u32, day_of_week: i32) -> CommandFrame {
    CommandFrame::new(
        CommandId::Time,
        [
            saturate(hour, 23),
            saturate(minute, 59),
            saturate(second, 59),
            day_of_week.clamp(1, 7) as u8,
            0x00,
        ],
    )
}

/// Clock synchronization frame for a timestamp
pub fn encode_time_of<T: Datelike + Timelike>(now: &T) -> CommandFrame {
    encode_time(
        now.hour(),
        now.minute(),
        now.second(),
        now.weekday().number_from_monday() as i32,
    )
}

/// Timer that switches the strip on at `hour:minute` on `days`
pub fn encode_schedule_on(days: DaySet, hour: u32, minute: u32, enabled: bool) -> CommandFrame {
    schedule_frame(SCHEDULE_ON, days, hour, minute, enabled)
}

/// Timer that switches the strip off at `hour:minute` on `days`
pub fn encode_schedule_off(days: DaySet, hour: u32, minute: u32, enabled: bool) -> CommandFrame {
    schedule_frame(SCHEDULE_OFF, days, hour, minute, enabled)
}

fn schedule_frame(
    discriminator: u8,
    days: DaySet,
    hour: u32,
    minute: u32,
    enabled: bool,
) -> CommandFrame {
    let value = days.bits() | if enabled { SCHEDULE_ENABLED } else { 0x00 };
    CommandFrame::new(
        CommandId::Schedule,
        [
            saturate(hour, 23),
            saturate(minute, 59),
            0x00,
            discriminator,
            value,
        ],
    )
}

fn level_frame(id: CommandId, level: u8) -> CommandFrame {
    CommandFrame::new(id, [level.min(MAX_LEVEL), 0x00, 0x00, 0x00, 0x00])
}

fn checked_level(what: &str, value: i32) -> Result<u8> {
    if value < 0 {
        return Err(Error::InvalidArgument(format!(
            "{what} must not be negative, got {value}"
        )));
    }
    Ok(value.min(i32::from(MAX_LEVEL)) as u8)
}

fn saturate(value: u32, max: u8) -> u8 {
    value.min(u32::from(max)) as u8
}

/// A decoded, semantic LED command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the strip on
    PowerOn,
    /// Switch the strip off
    PowerOff,
    /// Static RGB color
    Color {
        red: u8,
        green: u8,
        blue: u8,
    },
    /// Brightness level (0-100)
    Brightness(u8),
    /// Built-in effect
    Effect(Effect),
    /// Effect speed (0-100)
    EffectSpeed(u8),
    /// Clock synchronization
    Time {
        hour: u8,
        minute: u8,
        second: u8,
        /// 1 (Monday) ..= 7 (Sunday)
        day_of_week: u8,
    },
    /// Timer switching the strip on
    ScheduleOn {
        days: DaySet,
        hour: u8,
        minute: u8,
        enabled: bool,
    },
    /// Timer switching the strip off
    ScheduleOff {
        days: DaySet,
        hour: u8,
        minute: u8,
        enabled: bool,
    },
}

impl Command {
    /// Builds the frame for this command, applying the same saturation as the
    /// `encode_*` functions
    pub fn encode(&self) -> CommandFrame {
        match *self {
            Command::PowerOn => encode_power_on(),
            Command::PowerOff => encode_power_off(),
            Command::Color { red, green, blue } => encode_color(red, green, blue),
            Command::Brightness(level) => level_frame(CommandId::Brightness, level),
            Command::Effect(effect) => encode_effect(effect),
            Command::EffectSpeed(level) => level_frame(CommandId::EffectSpeed, level),
            Command::Time {
                hour,
                minute,
                second,
                day_of_week,
            } => encode_time(
                hour.into(),
                minute.into(),
                second.into(),
                day_of_week.into(),
            ),
            Command::ScheduleOn {
                days,
                hour,
                minute,
                enabled,
            } => encode_schedule_on(days, hour.into(), minute.into(), enabled),
            Command::ScheduleOff {
                days,
                hour,
                minute,
                enabled,
            } => encode_schedule_off(days, hour.into(), minute.into(), enabled),
        }
    }

    /// Recovers the command carried by a frame
    pub fn decode(frame: &CommandFrame) -> Result<Command> {
        let args = frame.args();
        match frame.command_id() {
            CommandId::Power => match args {
                POWER_ON_ARGS => Ok(Command::PowerOn),
                POWER_OFF_ARGS => Ok(Command::PowerOff),
                _ => Err(malformed(frame, "unknown power arguments")),
            },
            CommandId::Color => {
                if args[0] != COLOR_RGB_MODE {
                    return Err(malformed(frame, "unsupported color mode"));
                }
                Ok(Command::Color {
                    red: args[1],
                    green: args[2],
                    blue: args[3],
                })
            }
            CommandId::Brightness => Ok(Command::Brightness(decode_level(frame)?)),
            CommandId::EffectSpeed => Ok(Command::EffectSpeed(decode_level(frame)?)),
            CommandId::Effect => Effect::try_from(args[0])
                .map(Command::Effect)
                .map_err(|_| malformed(frame, "unknown effect code")),
            CommandId::Time => {
                let [hour, minute, second, day_of_week, _] = args;
                if hour > 23 || minute > 59 || second > 59 || !(1..=7).contains(&day_of_week) {
                    return Err(malformed(frame, "time out of range"));
                }
                Ok(Command::Time {
                    hour,
                    minute,
                    second,
                    day_of_week,
                })
            }
            CommandId::Schedule => {
                let [hour, minute, _, discriminator, value] = args;
                if hour > 23 || minute > 59 {
                    return Err(malformed(frame, "schedule time out of range"));
                }
                let days = DaySet::from_bits_truncate(value);
                let enabled = value & SCHEDULE_ENABLED != 0;
                match discriminator {
                    SCHEDULE_ON => Ok(Command::ScheduleOn {
                        days,
                        hour,
                        minute,
                        enabled,
                    }),
                    SCHEDULE_OFF => Ok(Command::ScheduleOff {
                        days,
                        hour,
                        minute,
                        enabled,
                    }),
                    _ => Err(malformed(frame, "unknown schedule kind")),
                }
            }
        }
    }
}

impl From<Command> for CommandFrame {
    fn from(command: Command) -> Self {
        command.encode()
    }
}

impl TryFrom<CommandFrame> for Command {
    type Error = Error;

    fn try_from(frame: CommandFrame) -> Result<Self> {
        Command::decode(&frame)
    }
}

fn decode_level(frame: &CommandFrame) -> Result<u8> {
    let level = frame.args()[0];
    if level > MAX_LEVEL {
        return Err(malformed(frame, "level above 100"));
    }
    Ok(level)
}

fn malformed(frame: &CommandFrame, reason: &str) -> Error {
    Error::InvalidFrame(format!("{reason}: {frame:?}"))
}
