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

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::time::{Duration, PositiveDuration, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchDirection {
    /// depart after the earliest departure time
    Forward,
    /// arrive before the latest arrival time
    Reverse,
}

impl SearchDirection {
    pub fn is_forward(&self) -> bool {
        matches!(self, SearchDirection::Forward)
    }

    pub fn reversed(&self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Reverse,
            SearchDirection::Reverse => SearchDirection::Forward,
        }
    }
}

impl FromStr for SearchDirection {
    type Err = ConfigValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward" | "depart_after" => Ok(SearchDirection::Forward),
            "reverse" | "arrive_before" => Ok(SearchDirection::Reverse),
            _ => Err(ConfigValueError::new("search direction", s)),
        }
    }
}

impl std::fmt::Display for SearchDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchDirection::Forward => write!(f, "forward"),
            SearchDirection::Reverse => write!(f, "reverse"),
        }
    }
}

/// Which cost criteria take part in the pareto comparison of stop arrivals
/// and destination paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParetoSetCost {
    /// time and number of transfers only
    None,
    UseC1,
    UseC1AndC2,
    /// Paths are grouped by c2. Inside a group c1 is compared strictly,
    /// across groups c1 is compared against the relaxed c1 of the other path.
    UseC1RelaxedIfC2IsOptimal,
}

impl ParetoSetCost {
    pub fn include_c1(&self) -> bool {
        !matches!(self, ParetoSetCost::None)
    }

    pub fn include_c2(&self) -> bool {
        matches!(
            self,
            ParetoSetCost::UseC1AndC2 | ParetoSetCost::UseC1RelaxedIfC2IsOptimal
        )
    }
}

impl FromStr for ParetoSetCost {
    type Err = ConfigValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParetoSetCost::*;
        let cost = match s {
            "none" => None,
            "use_c1" => UseC1,
            "use_c1_and_c2" => UseC1AndC2,
            "use_c1_relaxed_if_c2_is_optimal" => UseC1RelaxedIfC2IsOptimal,
            _ => return Err(ConfigValueError::new("pareto set cost", s)),
        };
        Ok(cost)
    }
}

impl std::fmt::Display for ParetoSetCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ParetoSetCost::*;
        match self {
            None => write!(f, "none"),
            UseC1 => write!(f, "use_c1"),
            UseC1AndC2 => write!(f, "use_c1_and_c2"),
            UseC1RelaxedIfC2IsOptimal => write!(f, "use_c1_relaxed_if_c2_is_optimal"),
        }
    }
}

/// Which time criteria take part in the pareto comparison of destination paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParetoSetTime {
    /// range raptor iteration departure time and arrival time
    UseTimetable,
    UseArrivalTime,
    UseDepartureTime,
}

impl FromStr for ParetoSetTime {
    type Err = ConfigValueError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ParetoSetTime::*;
        let time = match s {
            "use_timetable" => UseTimetable,
            "use_arrival_time" => UseArrivalTime,
            "use_departure_time" => UseDepartureTime,
            _ => return Err(ConfigValueError::new("pareto set time", s)),
        };
        Ok(time)
    }
}

impl std::fmt::Display for ParetoSetTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ParetoSetTime::*;
        match self {
            UseTimetable => write!(f, "use_timetable"),
            UseArrivalTime => write!(f, "use_arrival_time"),
            UseDepartureTime => write!(f, "use_departure_time"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Bad {kind} given : `{value}`")]
pub struct ConfigValueError {
    kind: &'static str,
    value: String,
}

impl ConfigValueError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// `relax(v) = ratio * v + slack`, used to compare c1 across c2 groups.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelaxFunction {
    pub ratio: f64,
    pub slack: i32,
}

impl RelaxFunction {
    pub const NORMAL: RelaxFunction = RelaxFunction {
        ratio: 1.0,
        slack: 0,
    };

    pub fn relax(&self, value: i32) -> i32 {
        (self.ratio * f64::from(value)).round() as i32 + self.slack
    }
}

impl Default for RelaxFunction {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicSearchWindowCoefficients {
    #[serde(default = "default_min_transit_time_coefficient")]
    pub min_transit_time_coefficient: f64,

    #[serde(default = "default_min_wait_time_coefficient")]
    pub min_wait_time_coefficient: f64,

    #[serde(default = "default_min_window")]
    pub min_window: PositiveDuration,

    #[serde(default = "default_max_window")]
    pub max_window: PositiveDuration,

    /// the computed search window is rounded to a multiple of this
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
}

pub const DEFAULT_MIN_TRANSIT_TIME_COEFFICIENT: f64 = 0.5;
pub const DEFAULT_MIN_WAIT_TIME_COEFFICIENT: f64 = 0.5;
pub const DEFAULT_MIN_WINDOW: PositiveDuration = PositiveDuration::from_hms(0, 40, 0);
pub const DEFAULT_MAX_WINDOW: PositiveDuration = PositiveDuration::from_hms(3, 0, 0);
pub const DEFAULT_STEP_MINUTES: u32 = 10;

pub fn default_min_transit_time_coefficient() -> f64 {
    DEFAULT_MIN_TRANSIT_TIME_COEFFICIENT
}

pub fn default_min_wait_time_coefficient() -> f64 {
    DEFAULT_MIN_WAIT_TIME_COEFFICIENT
}

pub fn default_min_window() -> PositiveDuration {
    DEFAULT_MIN_WINDOW
}

pub fn default_max_window() -> PositiveDuration {
    DEFAULT_MAX_WINDOW
}

pub fn default_step_minutes() -> u32 {
    DEFAULT_STEP_MINUTES
}

impl Default for DynamicSearchWindowCoefficients {
    fn default() -> Self {
        Self {
            min_transit_time_coefficient: default_min_transit_time_coefficient(),
            min_wait_time_coefficient: default_min_wait_time_coefficient(),
            min_window: default_min_window(),
            max_window: default_max_window(),
            step_minutes: default_step_minutes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RaptorTuningParameters {
    /// maximum number of transfers, the number of rounds is this plus one
    #[serde(default = "default_max_number_of_transfers")]
    pub max_number_of_transfers: u8,

    /// step between two range raptor iterations
    #[serde(default = "default_iteration_departure_step")]
    pub iteration_departure_step: PositiveDuration,

    #[serde(default)]
    pub dynamic_search_window: DynamicSearchWindowCoefficients,
}

pub const DEFAULT_MAX_NUMBER_OF_TRANSFERS: u8 = 12;
pub const DEFAULT_ITERATION_DEPARTURE_STEP: PositiveDuration = PositiveDuration::from_hms(0, 1, 0);

pub fn default_max_number_of_transfers() -> u8 {
    DEFAULT_MAX_NUMBER_OF_TRANSFERS
}

pub fn default_iteration_departure_step() -> PositiveDuration {
    DEFAULT_ITERATION_DEPARTURE_STEP
}

impl Default for RaptorTuningParameters {
    fn default() -> Self {
        Self {
            max_number_of_transfers: default_max_number_of_transfers(),
            iteration_departure_step: default_iteration_departure_step(),
            dynamic_search_window: DynamicSearchWindowCoefficients::default(),
        }
    }
}

impl RaptorTuningParameters {
    pub fn number_of_rounds(&self) -> usize {
        usize::from(self.max_number_of_transfers) + 1
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlackParams {
    /// minimum time between the arrival at a stop and the boarding of a trip
    #[serde(default)]
    pub board_slack: PositiveDuration,

    /// time needed to leave the vehicle after it reached a stop
    #[serde(default)]
    pub alight_slack: PositiveDuration,

    /// additional time needed before boarding when changing vehicle
    #[serde(default)]
    pub transfer_slack: PositiveDuration,
}

/// Parameters of the generalized cost `c1`.
/// Costs are expressed in seconds of riding time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostParams {
    #[serde(default)]
    pub board_cost: u32,

    #[serde(default = "default_transfer_cost")]
    pub transfer_cost: u32,

    #[serde(default = "default_reluctance")]
    pub wait_reluctance: f64,

    #[serde(default = "default_reluctance")]
    pub transit_reluctance: f64,
}

pub const DEFAULT_TRANSFER_COST: u32 = 300;
pub const DEFAULT_RELUCTANCE: f64 = 1.0;

pub fn default_transfer_cost() -> u32 {
    DEFAULT_TRANSFER_COST
}

pub fn default_reluctance() -> f64 {
    DEFAULT_RELUCTANCE
}

impl Default for CostParams {
    fn default() -> Self {
        Self {
            board_cost: 0,
            transfer_cost: default_transfer_cost(),
            wait_reluctance: default_reluctance(),
            transit_reluctance: default_reluctance(),
        }
    }
}

/// Time bounds of a search as given in the request: at most two of the
/// three values are expected, the others are derived by the
/// [`RaptorSearchWindowCalculator`](crate::engine::search_window::RaptorSearchWindowCalculator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub earliest_departure_time: Option<Time>,
    pub latest_arrival_time: Option<Time>,
    pub search_window: Option<Duration>,
}

impl SearchParams {
    pub fn depart_after(earliest_departure_time: Time) -> Self {
        Self {
            earliest_departure_time: Some(earliest_departure_time),
            ..Default::default()
        }
    }

    pub fn arrive_before(latest_arrival_time: Time) -> Self {
        Self {
            latest_arrival_time: Some(latest_arrival_time),
            ..Default::default()
        }
    }

    pub fn with_search_window(mut self, search_window: Duration) -> Self {
        self.search_window = Some(search_window);
        self
    }

    pub fn with_latest_arrival_time(mut self, latest_arrival_time: Time) -> Self {
        self.latest_arrival_time = Some(latest_arrival_time);
        self
    }

    pub fn is_complete(&self) -> bool {
        self.earliest_departure_time.is_some()
            && self.latest_arrival_time.is_some()
            && self.search_window.is_some()
    }
}

/// Search bounds once every value is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSearchParams {
    pub earliest_departure_time: Time,
    pub latest_arrival_time: Time,
    pub search_window: Duration,
}

impl std::fmt::Display for ResolvedSearchParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "earliest departure {} latest arrival {} search window {}s",
            crate::time::time_to_str(self.earliest_departure_time),
            crate::time::time_to_str(self.latest_arrival_time),
            self.search_window
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_enums() {
        assert_eq!(
            ParetoSetCost::from_str("use_c1_and_c2").unwrap(),
            ParetoSetCost::UseC1AndC2
        );
        assert_eq!(
            ParetoSetTime::from_str("use_timetable").unwrap(),
            ParetoSetTime::UseTimetable
        );
        assert_eq!(
            SearchDirection::from_str("arrive_before").unwrap(),
            SearchDirection::Reverse
        );
        assert!(ParetoSetCost::from_str("cheapest").is_err());
        assert_eq!(ParetoSetCost::UseC1.to_string(), "use_c1");
    }

    #[test]
    fn relax_function() {
        let relax = RelaxFunction {
            ratio: 1.5,
            slack: 100,
        };
        assert_eq!(relax.relax(600), 1000);
        assert_eq!(RelaxFunction::NORMAL.relax(600), 600);
    }

    #[test]
    fn tuning_defaults() {
        let params = RaptorTuningParameters::default();
        assert_eq!(params.number_of_rounds(), 13);
        assert_eq!(params.iteration_departure_step.total_seconds(), 60);
        assert_eq!(params.dynamic_search_window.step_minutes, 10);
    }
}
