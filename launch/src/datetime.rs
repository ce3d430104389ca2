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

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use mcraptor::{SearchDirection, Time};

/// Does the datetime of a request give the departure or the arrival of
/// the journeys ?
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DateTimeRepresent {
    Departure,
    Arrival,
}

impl Default for DateTimeRepresent {
    fn default() -> Self {
        DateTimeRepresent::Departure
    }
}

impl DateTimeRepresent {
    pub fn search_direction(&self) -> SearchDirection {
        match self {
            DateTimeRepresent::Departure => SearchDirection::Forward,
            DateTimeRepresent::Arrival => SearchDirection::Reverse,
        }
    }
}

impl std::fmt::Display for DateTimeRepresent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateTimeRepresent::Departure => write!(f, "departure"),
            DateTimeRepresent::Arrival => write!(f, "arrival"),
        }
    }
}

impl std::str::FromStr for DateTimeRepresent {
    type Err = DateTimeRepresentConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let datetime_represent = match s {
            "departure" => DateTimeRepresent::Departure,
            "arrival" => DateTimeRepresent::Arrival,
            _ => {
                return Err(DateTimeRepresentConfigError {
                    datetime_represent_name: s.to_string(),
                })
            }
        };
        Ok(datetime_represent)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Bad datetime_represent : `{datetime_represent_name}`")]
pub struct DateTimeRepresentConfigError {
    datetime_represent_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unable to parse {string_datetime} as a datetime. Expected format is 20190628T163215")]
pub struct BadDateTime {
    string_datetime: String,
}

pub fn parse_datetime(string_datetime: &str) -> Result<NaiveDateTime, BadDateTime> {
    NaiveDateTime::parse_from_str(string_datetime, "%Y%m%dT%H%M%S").map_err(|_| BadDateTime {
        string_datetime: string_datetime.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("The datetime {datetime} is too far from the service day {service_day}")]
pub struct DateTimeOutOfBound {
    datetime: NaiveDateTime,
    service_day: NaiveDate,
}

/// Seconds between the start of `service_day` and `datetime`, the time
/// representation of the engine.
pub fn to_engine_time(
    datetime: &NaiveDateTime,
    service_day: &NaiveDate,
) -> Result<Time, DateTimeOutOfBound> {
    let seconds = datetime
        .signed_duration_since(service_day.and_hms(0, 0, 0))
        .num_seconds();
    Time::try_from(seconds).map_err(|_| DateTimeOutOfBound {
        datetime: *datetime,
        service_day: *service_day,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_time_of_a_datetime() {
        let datetime = parse_datetime("20200101T081000").unwrap();
        let day = NaiveDate::from_ymd(2020, 1, 1);
        assert_eq!(to_engine_time(&datetime, &day), Ok(29_400));

        let previous_day = NaiveDate::from_ymd(2019, 12, 31);
        assert_eq!(to_engine_time(&datetime, &previous_day), Ok(86_400 + 29_400));

        assert!(parse_datetime("2020-01-01 08:10").is_err());
    }

    #[test]
    fn datetime_represent() {
        use std::str::FromStr;
        assert_eq!(
            DateTimeRepresent::from_str("arrival").unwrap().search_direction(),
            SearchDirection::Reverse
        );
        assert!(DateTimeRepresent::from_str("now").is_err());
    }
}
