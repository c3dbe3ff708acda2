/*!
 # Effect modes for LED strips

 The controller has a fixed table of built-in animations, each selected by a
 single code byte between `0x87` and `0x9c`. Effects are mutually exclusive
 modes, so they are modeled as a closed enum rather than flags.
*/

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// How an effect moves between its colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectFamily {
    /// Instant switch from one color to the next
    Jump,
    /// Smooth transition between colors
    Crossfade,
    /// On/off flashing
    Blink,
}

/// Built-in effect modes with their command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Effect {
    /// Red, green, blue jump effect
    JumpRedGreenBlue = 0x87,
    /// All colors jump effect
    JumpAll = 0x88,
    /// Red, green, blue crossfade effect
    CrossfadeRedGreenBlue = 0x89,
    /// All colors crossfade effect
    CrossfadeAll = 0x8a,
    /// Red crossfade effect
    CrossfadeRed = 0x8b,
    /// Green crossfade effect
    CrossfadeGreen = 0x8c,
    /// Blue crossfade effect
    CrossfadeBlue = 0x8d,
    /// Yellow crossfade effect
    CrossfadeYellow = 0x8e,
    /// Cyan crossfade effect
    CrossfadeCyan = 0x8f,
    /// Magenta crossfade effect
    CrossfadeMagenta = 0x90,
    /// White crossfade effect
    CrossfadeWhite = 0x91,
    /// Red and green crossfade effect
    CrossfadeRedGreen = 0x92,
    /// Red and blue crossfade effect
    CrossfadeRedBlue = 0x93,
    /// Green and blue crossfade effect
    CrossfadeGreenBlue = 0x94,
    /// All colors blink effect
    BlinkAll = 0x95,
    /// Red blink effect
    BlinkRed = 0x96,
    /// Green blink effect
    BlinkGreen = 0x97,
    /// Blue blink effect
    BlinkBlue = 0x98,
    /// Yellow blink effect
    BlinkYellow = 0x99,
    /// Cyan blink effect
    BlinkCyan = 0x9a,
    /// Magenta blink effect
    BlinkMagenta = 0x9b,
    /// White blink effect
    BlinkWhite = 0x9c,
}

impl Effect {
    /// Every effect, in code order
    pub const ALL: [Effect; 22] = [
        Effect::JumpRedGreenBlue,
        Effect::JumpAll,
        Effect::CrossfadeRedGreenBlue,
        Effect::CrossfadeAll,
        Effect::CrossfadeRed,
        Effect::CrossfadeGreen,
        Effect::CrossfadeBlue,
        Effect::CrossfadeYellow,
        Effect::CrossfadeCyan,
        Effect::CrossfadeMagenta,
        Effect::CrossfadeWhite,
        Effect::CrossfadeRedGreen,
        Effect::CrossfadeRedBlue,
        Effect::CrossfadeGreenBlue,
        Effect::BlinkAll,
        Effect::BlinkRed,
        Effect::BlinkGreen,
        Effect::BlinkBlue,
        Effect::BlinkYellow,
        Effect::BlinkCyan,
        Effect::BlinkMagenta,
        Effect::BlinkWhite,
    ];

    /// Code byte sent in the effect command
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Family the effect belongs to
    pub const fn family(self) -> EffectFamily {
        match self {
            Effect::JumpRedGreenBlue | Effect::JumpAll => EffectFamily::Jump,
            Effect::BlinkAll
            | Effect::BlinkRed
            | Effect::BlinkGreen
            | Effect::BlinkBlue
            | Effect::BlinkYellow
            | Effect::BlinkCyan
            | Effect::BlinkMagenta
            | Effect::BlinkWhite => EffectFamily::Blink,
            _ => EffectFamily::Crossfade,
        }
    }

    /// Kebab-case name used on the command line
    pub const fn name(self) -> &'static str {
        match self {
            Effect::JumpRedGreenBlue => "jump-rgb",
            Effect::JumpAll => "jump-all",
            Effect::CrossfadeRedGreenBlue => "crossfade-rgb",
            Effect::CrossfadeAll => "crossfade-all",
            Effect::CrossfadeRed => "crossfade-red",
            Effect::CrossfadeGreen => "crossfade-green",
            Effect::CrossfadeBlue => "crossfade-blue",
            Effect::CrossfadeYellow => "crossfade-yellow",
            Effect::CrossfadeCyan => "crossfade-cyan",
            Effect::CrossfadeMagenta => "crossfade-magenta",
            Effect::CrossfadeWhite => "crossfade-white",
            Effect::CrossfadeRedGreen => "crossfade-red-green",
            Effect::CrossfadeRedBlue => "crossfade-red-blue",
            Effect::CrossfadeGreenBlue => "crossfade-green-blue",
            Effect::BlinkAll => "blink-all",
            Effect::BlinkRed => "blink-red",
            Effect::BlinkGreen => "blink-green",
            Effect::BlinkBlue => "blink-blue",
            Effect::BlinkYellow => "blink-yellow",
            Effect::BlinkCyan => "blink-cyan",
            Effect::BlinkMagenta => "blink-magenta",
            Effect::BlinkWhite => "blink-white",
        }
    }
}

impl From<Effect> for u8 {
    fn from(effect: Effect) -> u8 {
        effect.code()
    }
}

impl TryFrom<u8> for Effect {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        Effect::ALL
            .into_iter()
            .find(|effect| effect.code() == code)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown effect code {code:#04x}")))
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Effect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        // Short aliases
        let wanted = match wanted.as_str() {
            "rainbow" => "crossfade-all",
            "jump" => "jump-rgb",
            "blink" => "blink-all",
            other => other,
        };
        Effect::ALL
            .into_iter()
            .find(|effect| effect.name() == wanted)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown effect '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_cover_the_whole_range() {
        let mut codes: Vec<u8> = Effect::ALL.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        assert_eq!(codes, (0x87..=0x9c).collect::<Vec<u8>>());
    }

    #[test]
    fn try_from_code() {
        for effect in Effect::ALL {
            assert_eq!(Effect::try_from(effect.code()).unwrap(), effect);
        }
        assert!(Effect::try_from(0x86).is_err());
        assert!(Effect::try_from(0x9d).is_err());
        assert!(Effect::try_from(0x00).is_err());
    }

    #[test]
    fn families() {
        assert_eq!(Effect::JumpAll.family(), EffectFamily::Jump);
        assert_eq!(Effect::CrossfadeAll.family(), EffectFamily::Crossfade);
        assert_eq!(Effect::CrossfadeGreenBlue.family(), EffectFamily::Crossfade);
        assert_eq!(Effect::BlinkAll.family(), EffectFamily::Blink);
        assert_eq!(Effect::BlinkWhite.family(), EffectFamily::Blink);

        let count = |family| Effect::ALL.iter().filter(|e| e.family() == family).count();
        assert_eq!(count(EffectFamily::Jump), 2);
        assert_eq!(count(EffectFamily::Crossfade), 12);
        assert_eq!(count(EffectFamily::Blink), 8);
    }

    #[test]
    fn parse_names() {
        for effect in Effect::ALL {
            assert_eq!(effect.to_string().parse::<Effect>().unwrap(), effect);
        }
        assert_eq!("rainbow".parse::<Effect>().unwrap(), Effect::CrossfadeAll);
        assert_eq!("BLINK_RED".parse::<Effect>().unwrap(), Effect::BlinkRed);
        assert!("strobe".parse::<Effect>().is_err());
    }
}
