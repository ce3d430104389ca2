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
use structopt::StructOpt;

use mcraptor::config::{
    self as engine_config, CostParams, DynamicSearchWindowCoefficients, RaptorTuningParameters,
    SlackParams,
};
use mcraptor::{ParetoSetCost, ParetoSetTime, PositiveDuration, RelaxFunction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
#[structopt(rename_all = "snake_case")]
#[serde(deny_unknown_fields)]
pub struct RequestParams {
    /// maximum number of transfers in a journey
    #[structopt(long, default_value = DEFAULT_MAX_NB_OF_TRANSFERS)]
    #[serde(default = "default_max_nb_of_transfers")]
    pub max_nb_of_transfers: u8,

    /// step between two departure times explored by range raptor
    #[structopt(long, default_value = DEFAULT_ITERATION_DEPARTURE_STEP)]
    #[serde(default = "default_iteration_departure_step")]
    pub iteration_departure_step: PositiveDuration,

    /// minimum time between the arrival at a stop and the boarding of a vehicle
    #[structopt(long, default_value = DEFAULT_SLACK)]
    #[serde(default)]
    pub board_slack: PositiveDuration,

    /// time needed to leave a vehicle
    #[structopt(long, default_value = DEFAULT_SLACK)]
    #[serde(default)]
    pub alight_slack: PositiveDuration,

    /// additional time needed to board when changing vehicle
    #[structopt(long, default_value = DEFAULT_SLACK)]
    #[serde(default)]
    pub transfer_slack: PositiveDuration,

    /// cost of boarding a vehicle, in seconds of riding time
    #[structopt(long, default_value = DEFAULT_BOARD_COST)]
    #[serde(default)]
    pub board_cost: u32,

    /// cost of changing vehicle, in seconds of riding time
    #[structopt(long, default_value = DEFAULT_TRANSFER_COST)]
    #[serde(default = "default_transfer_cost")]
    pub transfer_cost: u32,

    #[structopt(long, default_value = DEFAULT_RELUCTANCE)]
    #[serde(default = "default_reluctance")]
    pub wait_reluctance: f64,

    #[structopt(long, default_value = DEFAULT_RELUCTANCE)]
    #[serde(default = "default_reluctance")]
    pub transit_reluctance: f64,

    /// criteria compared between journeys besides time and transfers :
    /// none, use_c1, use_c1_and_c2, use_c1_relaxed_if_c2_is_optimal
    #[structopt(long, default_value = DEFAULT_PARETO_SET_COST)]
    #[serde(default = "default_pareto_set_cost")]
    pub pareto_set_cost: ParetoSetCost,

    /// time criteria compared between journeys :
    /// use_timetable, use_arrival_time, use_departure_time
    #[structopt(long, default_value = DEFAULT_PARETO_SET_TIME)]
    #[serde(default = "default_pareto_set_time")]
    pub pareto_set_time: ParetoSetTime,

    /// c1 of journeys with a better c2 is compared to `ratio * c1 + slack`
    #[structopt(long, default_value = DEFAULT_RELAX_C1_RATIO)]
    #[serde(default = "default_relax_c1_ratio")]
    pub relax_c1_ratio: f64,

    #[structopt(long, default_value = DEFAULT_RELAX_C1_SLACK)]
    #[serde(default)]
    pub relax_c1_slack: i32,

    /// drop stop arrivals from which the destination cannot be reached in time
    #[structopt(long)]
    #[serde(default)]
    pub heuristic_pruning: bool,

    /// minimum time spent at a via stop
    #[structopt(long, default_value = DEFAULT_SLACK)]
    #[serde(default)]
    pub via_min_wait_time: PositiveDuration,

    #[structopt(long, default_value = DEFAULT_MIN_TRANSIT_TIME_COEFFICIENT)]
    #[serde(default = "default_min_transit_time_coefficient")]
    pub min_transit_time_coefficient: f64,

    #[structopt(long, default_value = DEFAULT_MIN_WAIT_TIME_COEFFICIENT)]
    #[serde(default = "default_min_wait_time_coefficient")]
    pub min_wait_time_coefficient: f64,

    /// smallest search window computed from the heuristics
    #[structopt(long, default_value = DEFAULT_MIN_SEARCH_WINDOW)]
    #[serde(default = "default_min_search_window")]
    pub min_search_window: PositiveDuration,

    /// largest search window computed from the heuristics
    #[structopt(long, default_value = DEFAULT_MAX_SEARCH_WINDOW)]
    #[serde(default = "default_max_search_window")]
    pub max_search_window: PositiveDuration,

    /// the computed search window is rounded to a multiple of this number of minutes
    #[structopt(long, default_value = DEFAULT_SEARCH_WINDOW_STEP_MINUTES)]
    #[serde(default = "default_search_window_step_minutes")]
    pub search_window_step_minutes: u32,
}

pub const DEFAULT_MAX_NB_OF_TRANSFERS: &str = "12";
pub const DEFAULT_ITERATION_DEPARTURE_STEP: &str = "00:01:00";
pub const DEFAULT_SLACK: &str = "00:00:00";
pub const DEFAULT_BOARD_COST: &str = "0";
pub const DEFAULT_TRANSFER_COST: &str = "300";
pub const DEFAULT_RELUCTANCE: &str = "1.0";
pub const DEFAULT_PARETO_SET_COST: &str = "use_c1";
pub const DEFAULT_PARETO_SET_TIME: &str = "use_timetable";
pub const DEFAULT_RELAX_C1_RATIO: &str = "1.0";
pub const DEFAULT_RELAX_C1_SLACK: &str = "0";
pub const DEFAULT_MIN_TRANSIT_TIME_COEFFICIENT: &str = "0.5";
pub const DEFAULT_MIN_WAIT_TIME_COEFFICIENT: &str = "0.5";
pub const DEFAULT_MIN_SEARCH_WINDOW: &str = "00:40:00";
pub const DEFAULT_MAX_SEARCH_WINDOW: &str = "03:00:00";
pub const DEFAULT_SEARCH_WINDOW_STEP_MINUTES: &str = "10";

pub fn default_max_nb_of_transfers() -> u8 {
    engine_config::DEFAULT_MAX_NUMBER_OF_TRANSFERS
}

pub fn default_iteration_departure_step() -> PositiveDuration {
    engine_config::DEFAULT_ITERATION_DEPARTURE_STEP
}

pub fn default_transfer_cost() -> u32 {
    engine_config::DEFAULT_TRANSFER_COST
}

pub fn default_reluctance() -> f64 {
    engine_config::DEFAULT_RELUCTANCE
}

pub fn default_pareto_set_cost() -> ParetoSetCost {
    ParetoSetCost::UseC1
}

pub fn default_pareto_set_time() -> ParetoSetTime {
    ParetoSetTime::UseTimetable
}

pub fn default_relax_c1_ratio() -> f64 {
    RelaxFunction::NORMAL.ratio
}

pub fn default_min_transit_time_coefficient() -> f64 {
    engine_config::DEFAULT_MIN_TRANSIT_TIME_COEFFICIENT
}

pub fn default_min_wait_time_coefficient() -> f64 {
    engine_config::DEFAULT_MIN_WAIT_TIME_COEFFICIENT
}

pub fn default_min_search_window() -> PositiveDuration {
    engine_config::DEFAULT_MIN_WINDOW
}

pub fn default_max_search_window() -> PositiveDuration {
    engine_config::DEFAULT_MAX_WINDOW
}

pub fn default_search_window_step_minutes() -> u32 {
    engine_config::DEFAULT_STEP_MINUTES
}

impl Default for RequestParams {
    fn default() -> Self {
        Self {
            max_nb_of_transfers: default_max_nb_of_transfers(),
            iteration_departure_step: default_iteration_departure_step(),
            board_slack: PositiveDuration::zero(),
            alight_slack: PositiveDuration::zero(),
            transfer_slack: PositiveDuration::zero(),
            board_cost: 0,
            transfer_cost: default_transfer_cost(),
            wait_reluctance: default_reluctance(),
            transit_reluctance: default_reluctance(),
            pareto_set_cost: default_pareto_set_cost(),
            pareto_set_time: default_pareto_set_time(),
            relax_c1_ratio: default_relax_c1_ratio(),
            relax_c1_slack: 0,
            heuristic_pruning: false,
            via_min_wait_time: PositiveDuration::zero(),
            min_transit_time_coefficient: default_min_transit_time_coefficient(),
            min_wait_time_coefficient: default_min_wait_time_coefficient(),
            min_search_window: default_min_search_window(),
            max_search_window: default_max_search_window(),
            search_window_step_minutes: default_search_window_step_minutes(),
        }
    }
}

impl RequestParams {
    pub fn tuning_parameters(&self) -> RaptorTuningParameters {
        RaptorTuningParameters {
            max_number_of_transfers: self.max_nb_of_transfers,
            iteration_departure_step: self.iteration_departure_step,
            dynamic_search_window: DynamicSearchWindowCoefficients {
                min_transit_time_coefficient: self.min_transit_time_coefficient,
                min_wait_time_coefficient: self.min_wait_time_coefficient,
                min_window: self.min_search_window,
                max_window: self.max_search_window,
                step_minutes: self.search_window_step_minutes,
            },
        }
    }

    pub fn slack_params(&self) -> SlackParams {
        SlackParams {
            board_slack: self.board_slack,
            alight_slack: self.alight_slack,
            transfer_slack: self.transfer_slack,
        }
    }

    pub fn cost_params(&self) -> CostParams {
        CostParams {
            board_cost: self.board_cost,
            transfer_cost: self.transfer_cost,
            wait_reluctance: self.wait_reluctance,
            transit_reluctance: self.transit_reluctance,
        }
    }

    pub fn relax_c1(&self) -> RelaxFunction {
        RelaxFunction {
            ratio: self.relax_c1_ratio,
            slack: self.relax_c1_slack,
        }
    }
}
