// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A point in time, in seconds since the start of the service day.
///
/// Times may be negative or exceed 24h, depending on the service day the
/// trip belongs to. All the engine arithmetic is done on this type.
pub type Time = i32;

/// A duration in seconds, used on the hot path together with [`Time`].
pub type Duration = i32;

pub const SECONDS_PER_MINUTE: i32 = 60;
pub const SECONDS_PER_DAY: i32 = 24 * 60 * 60;

#[derive(Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash, Default)]
pub struct PositiveDuration {
    pub(crate) seconds: u32,
}

impl PositiveDuration {
    pub const fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> PositiveDuration {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        PositiveDuration {
            seconds: total_seconds,
        }
    }

    pub const fn from_seconds(seconds: u32) -> PositiveDuration {
        PositiveDuration { seconds }
    }

    pub fn total_seconds(&self) -> u64 {
        u64::from(self.seconds)
    }

    /// The duration as an engine [`Duration`], saturating at `i32::MAX`.
    pub fn as_engine_duration(&self) -> Duration {
        i32::try_from(self.seconds).unwrap_or(i32::MAX)
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        write!(f, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unable to parse `{input}` as a duration or a time, expected HH:MM:SS or a number of seconds")]
pub struct ParseDurationError {
    input: String,
}

impl FromStr for PositiveDuration {
    type Err = ParseDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let seconds = parse_hms(s)?;
        let seconds = u32::try_from(seconds).map_err(|_| ParseDurationError {
            input: s.to_string(),
        })?;
        Ok(PositiveDuration { seconds })
    }
}

impl Serialize for PositiveDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PositiveDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PositiveDuration::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl std::ops::Add for PositiveDuration {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl std::ops::Mul<u32> for PositiveDuration {
    type Output = Self;

    fn mul(self, rhs: u32) -> Self::Output {
        PositiveDuration {
            seconds: self.seconds * rhs,
        }
    }
}

/// Parse `HH:MM:SS`, `HH:MM` or a plain number of seconds.
/// Hours may exceed 24 and a leading `-` is accepted.
pub fn parse_time(s: &str) -> Result<Time, ParseDurationError> {
    parse_hms(s)
}

fn parse_hms(s: &str) -> Result<i32, ParseDurationError> {
    let err = || ParseDurationError {
        input: s.to_string(),
    };
    let trimmed = s.trim();
    let (sign, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed),
    };
    if body.is_empty() {
        return Err(err());
    }
    let mut fields = body.split(':');
    let first: i32 = fields.next().ok_or_else(err)?.parse().map_err(|_| err())?;
    let seconds = match (fields.next(), fields.next(), fields.next()) {
        (None, None, None) => first,
        (Some(minutes), None, None) => {
            let minutes: i32 = minutes.parse().map_err(|_| err())?;
            first * 3600 + minutes * 60
        }
        (Some(minutes), Some(seconds), None) => {
            let minutes: i32 = minutes.parse().map_err(|_| err())?;
            let seconds: i32 = seconds.parse().map_err(|_| err())?;
            if !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
                return Err(err());
            }
            first * 3600 + minutes * 60 + seconds
        }
        _ => return Err(err()),
    };
    Ok(sign * seconds)
}

/// Format a time as `HH:MM:SS`, with a `-` prefix for times before the
/// start of the service day. Used for logs and debug output.
pub fn time_to_str(time: Time) -> String {
    let sign = if time < 0 { "-" } else { "" };
    let abs = time.unsigned_abs();
    format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        abs / 3600,
        (abs / 60) % 60,
        abs % 60
    )
}

/// Round a duration down to whole minutes: 0 to 59 seconds becomes 0,
/// 60 seconds stays 60.
///
/// # Panics
/// Panics if `seconds` is negative.
pub fn round_down_to_nearest_minute(seconds: Duration) -> Duration {
    assert!(
        seconds >= 0,
        "Negative durations are not supported, got {} seconds",
        seconds
    );
    seconds - seconds % SECONDS_PER_MINUTE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_duration_parse_and_display() {
        let duration = PositiveDuration::from_str("01:02:03").unwrap();
        assert_eq!(duration.total_seconds(), 3723);
        assert_eq!(duration.to_string(), "01:02:03");
        assert_eq!(PositiveDuration::from_str("90").unwrap().total_seconds(), 90);
        assert!(PositiveDuration::from_str("-00:01:00").is_err());
        assert!(PositiveDuration::from_str("00:61:00").is_err());
        assert!(PositiveDuration::from_str("").is_err());
    }

    #[test]
    fn parse_times_after_midnight() {
        assert_eq!(parse_time("08:00:00").unwrap(), 28_800);
        assert_eq!(parse_time("25:10").unwrap(), 25 * 3600 + 600);
        assert_eq!(parse_time("-00:00:30").unwrap(), -30);
        assert_eq!(time_to_str(29_400), "08:10:00");
        assert_eq!(time_to_str(-30), "-00:00:30");
    }

    #[test]
    fn round_down_to_minutes() {
        assert_eq!(round_down_to_nearest_minute(0), 0);
        assert_eq!(round_down_to_nearest_minute(59), 0);
        assert_eq!(round_down_to_nearest_minute(60), 60);
        assert_eq!(round_down_to_nearest_minute(1259), 1200);
    }

    #[test]
    #[should_panic]
    fn round_down_rejects_negative_durations() {
        round_down_to_nearest_minute(-1);
    }
}
