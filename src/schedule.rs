/*!
 # Scheduling days

 The strip's on/off timers fire on a set of weekdays, sent as one byte whose low
 seven bits are the days and whose high bit marks the timer as enabled.
*/

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not, Sub};
use std::str::FromStr;

use chrono::Weekday;

use crate::{Error, Result};

/// Set of weekdays a schedule applies to
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DaySet(u8);

impl DaySet {
    /// Monday (0x01)
    pub const MONDAY: DaySet = DaySet(1 << 0);
    /// Tuesday (0x02)
    pub const TUESDAY: DaySet = DaySet(1 << 1);
    /// Wednesday (0x04)
    pub const WEDNESDAY: DaySet = DaySet(1 << 2);
    /// Thursday (0x08)
    pub const THURSDAY: DaySet = DaySet(1 << 3);
    /// Friday (0x10)
    pub const FRIDAY: DaySet = DaySet(1 << 4);
    /// Saturday (0x20)
    pub const SATURDAY: DaySet = DaySet(1 << 5);
    /// Sunday (0x40)
    pub const SUNDAY: DaySet = DaySet(1 << 6);

    /// No days
    pub const NONE: DaySet = DaySet(0);
    /// Every day of the week
    pub const ALL: DaySet = Self::MONDAY
        .union(Self::TUESDAY)
        .union(Self::WEDNESDAY)
        .union(Self::THURSDAY)
        .union(Self::FRIDAY)
        .union(Self::SATURDAY)
        .union(Self::SUNDAY);
    /// Saturday and Sunday
    pub const WEEKEND: DaySet = Self::SATURDAY.union(Self::SUNDAY);
    /// Monday to Friday
    pub const WEEKDAYS: DaySet = Self::ALL.difference(Self::WEEKEND);

    /// Raw bitmask as sent to the device
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Builds a set from a raw bitmask, rejecting bits that are not days
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits & !Self::ALL.0 != 0 {
            return Err(Error::InvalidArgument(format!(
                "day mask {bits:#04x} has bits outside {:#04x}",
                Self::ALL.0
            )));
        }
        Ok(DaySet(bits))
    }

    /// Builds a set from a raw bitmask, dropping bits that are not days
    pub const fn from_bits_truncate(bits: u8) -> Self {
        DaySet(bits & Self::ALL.0)
    }

    /// Days in either set
    pub const fn union(self, other: DaySet) -> Self {
        DaySet(self.0 | other.0)
    }

    /// Days in both sets
    pub const fn intersection(self, other: DaySet) -> Self {
        DaySet(self.0 & other.0)
    }

    /// Days in `self` but not in `other`
    pub const fn difference(self, other: DaySet) -> Self {
        DaySet(self.0 & !other.0)
    }

    /// Days not in this set
    pub const fn complement(self) -> Self {
        Self::ALL.difference(self)
    }

    /// Whether every day of `other` is in this set
    pub const fn contains(self, other: DaySet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether the set has no days
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of days in the set
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// The single-day set for a chrono weekday
    pub const fn from_weekday(day: Weekday) -> Self {
        match day {
            Weekday::Mon => Self::MONDAY,
            Weekday::Tue => Self::TUESDAY,
            Weekday::Wed => Self::WEDNESDAY,
            Weekday::Thu => Self::THURSDAY,
            Weekday::Fri => Self::FRIDAY,
            Weekday::Sat => Self::SATURDAY,
            Weekday::Sun => Self::SUNDAY,
        }
    }

    /// Weekdays in the set, Monday first
    pub fn weekdays(self) -> impl Iterator<Item = Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(move |day| self.contains(Self::from_weekday(*day)))
    }
}

impl From<Weekday> for DaySet {
    fn from(day: Weekday) -> Self {
        DaySet::from_weekday(day)
    }
}

impl FromIterator<Weekday> for DaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter()
            .fold(DaySet::NONE, |set, day| set | DaySet::from_weekday(day))
    }
}

impl BitOr for DaySet {
    type Output = DaySet;

    fn bitor(self, rhs: DaySet) -> DaySet {
        self.union(rhs)
    }
}

impl BitOrAssign for DaySet {
    fn bitor_assign(&mut self, rhs: DaySet) {
        *self = self.union(rhs);
    }
}

impl BitAnd for DaySet {
    type Output = DaySet;

    fn bitand(self, rhs: DaySet) -> DaySet {
        self.intersection(rhs)
    }
}

impl BitAndAssign for DaySet {
    fn bitand_assign(&mut self, rhs: DaySet) {
        *self = self.intersection(rhs);
    }
}

impl Sub for DaySet {
    type Output = DaySet;

    fn sub(self, rhs: DaySet) -> DaySet {
        self.difference(rhs)
    }
}

// Complement stays inside the seven day bits so it never touches the enabled flag.
impl Not for DaySet {
    type Output = DaySet;

    fn not(self) -> DaySet {
        self.complement()
    }
}

impl fmt::Debug for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DaySet({self} = {:#04x})", self.0)
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DaySet::NONE => return write!(f, "none"),
            DaySet::ALL => return write!(f, "all"),
            DaySet::WEEKDAYS => return write!(f, "weekdays"),
            DaySet::WEEKEND => return write!(f, "weekend"),
            _ => {}
        }

        let names: Vec<&str> = self
            .weekdays()
            .map(|day| match day {
                Weekday::Mon => "mon",
                Weekday::Tue => "tue",
                Weekday::Wed => "wed",
                Weekday::Thu => "thu",
                Weekday::Fri => "fri",
                Weekday::Sat => "sat",
                Weekday::Sun => "sun",
            })
            .collect();
        write!(f, "{}", names.join(","))
    }
}

/// Parses day names (`mon`, `monday`, ...), the groups `all`, `weekdays`,
/// `weekend`, `none`, or a comma-separated mix of them
impl FromStr for DaySet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut set = DaySet::NONE;
        for part in s.split(',') {
            let part = part.trim().to_lowercase();
            set |= match part.as_str() {
                "mon" | "monday" => DaySet::MONDAY,
                "tue" | "tuesday" => DaySet::TUESDAY,
                "wed" | "wednesday" => DaySet::WEDNESDAY,
                "thu" | "thursday" => DaySet::THURSDAY,
                "fri" | "friday" => DaySet::FRIDAY,
                "sat" | "saturday" => DaySet::SATURDAY,
                "sun" | "sunday" => DaySet::SUNDAY,
                "all" | "daily" => DaySet::ALL,
                "weekdays" | "workdays" => DaySet::WEEKDAYS,
                "weekend" => DaySet::WEEKEND,
                "none" => DaySet::NONE,
                other => {
                    return Err(Error::InvalidArgument(format!(
                        "unknown day '{other}'"
                    )))
                }
            };
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SINGLE_DAYS: [DaySet; 7] = [
        DaySet::MONDAY,
        DaySet::TUESDAY,
        DaySet::WEDNESDAY,
        DaySet::THURSDAY,
        DaySet::FRIDAY,
        DaySet::SATURDAY,
        DaySet::SUNDAY,
    ];

    #[test]
    fn all_days() {
        let union = SINGLE_DAYS.iter().fold(DaySet::NONE, |acc, d| acc | *d);
        assert_eq!(DaySet::ALL, union);
        assert_eq!(DaySet::ALL, DaySet::WEEKDAYS | DaySet::WEEKEND);
        assert_eq!(DaySet::ALL.bits(), 0x7f);
    }

    #[test]
    fn weekend_days() {
        assert_eq!(DaySet::WEEKEND, DaySet::SATURDAY | DaySet::SUNDAY);
    }

    #[test]
    fn week_days() {
        assert_eq!(DaySet::WEEKDAYS, DaySet::ALL & !DaySet::WEEKEND);
        assert_eq!(
            DaySet::WEEKDAYS,
            DaySet::MONDAY
                | DaySet::TUESDAY
                | DaySet::WEDNESDAY
                | DaySet::THURSDAY
                | DaySet::FRIDAY
        );
        assert!((DaySet::WEEKDAYS & DaySet::WEEKEND).is_empty());
    }

    #[test]
    fn atomic_days_are_distinct_bits_below_enabled_flag() {
        for (i, a) in SINGLE_DAYS.iter().enumerate() {
            assert_eq!(a.len(), 1);
            assert_eq!(a.bits() & 0x80, 0);
            for b in &SINGLE_DAYS[i + 1..] {
                assert!((*a & *b).is_empty());
            }
        }
    }

    #[test]
    fn complement_stays_within_days() {
        assert_eq!(!DaySet::NONE, DaySet::ALL);
        assert_eq!(!DaySet::ALL, DaySet::NONE);
        assert_eq!(!DaySet::WEEKEND, DaySet::WEEKDAYS);
        assert_eq!((!DaySet::MONDAY).bits() & 0x80, 0);
    }

    #[test]
    fn from_bits_rejects_enabled_flag() {
        assert!(DaySet::from_bits(0x80).is_err());
        assert_eq!(DaySet::from_bits(0x60).unwrap(), DaySet::WEEKEND);
        assert_eq!(DaySet::from_bits_truncate(0xff), DaySet::ALL);
    }

    #[test]
    fn weekday_conversion() {
        assert_eq!(DaySet::from(Weekday::Sat), DaySet::SATURDAY);
        let set: DaySet = [Weekday::Sat, Weekday::Sun].into_iter().collect();
        assert_eq!(set, DaySet::WEEKEND);
        assert_eq!(
            DaySet::WEEKEND.weekdays().collect::<Vec<_>>(),
            vec![Weekday::Sat, Weekday::Sun]
        );
    }

    #[test]
    fn parse_names_and_lists() {
        assert_eq!("weekdays".parse::<DaySet>().unwrap(), DaySet::WEEKDAYS);
        assert_eq!("Weekend".parse::<DaySet>().unwrap(), DaySet::WEEKEND);
        assert_eq!(
            "mon, wednesday,fri".parse::<DaySet>().unwrap(),
            DaySet::MONDAY | DaySet::WEDNESDAY | DaySet::FRIDAY
        );
        assert_eq!("sat,weekdays".parse::<DaySet>().unwrap().bits(), 0x3f);
        assert!("someday".parse::<DaySet>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for set in [
            DaySet::NONE,
            DaySet::ALL,
            DaySet::WEEKDAYS,
            DaySet::WEEKEND,
            DaySet::MONDAY | DaySet::SUNDAY,
        ] {
            assert_eq!(set.to_string().parse::<DaySet>().unwrap(), set);
        }
        assert_eq!((DaySet::MONDAY | DaySet::SUNDAY).to_string(), "mon,sun");
    }
}
