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

use crate::access_egress::RaptorAccessEgress;
use crate::config::{CostParams, SearchDirection};
use crate::time::{Duration, Time};
use crate::traits::{StopIdx, TransferConstraint};

/// Computes the generalized cost `c1` of the legs of a path.
pub trait CostCalculator {
    /// Cost of waiting at `board_stop` from `prev_arrival_time` and boarding
    /// a trip at `board_time`.
    fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: Time,
        board_stop: StopIdx,
        board_time: Time,
        constraint: Option<&TransferConstraint>,
    ) -> i32;

    /// Cost only valid to compare rides of the same trip pattern boarded in
    /// the same round : the riding cost from an arbitrary origin to
    /// `board_time`, counted negatively.
    fn on_trip_relative_riding_cost(&self, board_time: Time) -> i32;

    /// Cost at the alight stop of a ride boarded with `board_c1`.
    fn transit_arrival_cost(
        &self,
        board_c1: i32,
        alight_slack: Duration,
        transit_time: Duration,
        to_stop: StopIdx,
    ) -> i32;

    fn waiting_time_cost(&self, waiting_time: Duration) -> i32;

    fn cost_egress(&self, egress: &RaptorAccessEgress) -> i32;

    /// A lower bound of the cost of boarding, used by heuristics.
    fn min_boarding_cost(&self, first_boarding: bool) -> i32;

    fn transit_cost(&self, transit_time: Duration) -> i32;
}

#[derive(Debug, Clone)]
pub struct DefaultCostCalculator {
    board_cost: i32,
    transfer_cost: i32,
    wait_reluctance: f64,
    transit_reluctance: f64,
    stop_transfer_costs: Option<Vec<i32>>,
    direction: SearchDirection,
}

fn weighted(duration: Duration, reluctance: f64) -> i32 {
    (f64::from(duration) * reluctance).round() as i32
}

impl DefaultCostCalculator {
    pub fn new(params: &CostParams, direction: SearchDirection) -> Self {
        Self {
            board_cost: i32::try_from(params.board_cost).unwrap_or(i32::MAX),
            transfer_cost: i32::try_from(params.transfer_cost).unwrap_or(i32::MAX),
            wait_reluctance: params.wait_reluctance,
            transit_reluctance: params.transit_reluctance,
            stop_transfer_costs: None,
            direction,
        }
    }

    /// Additional cost of changing vehicle at each stop.
    pub fn with_stop_transfer_costs(mut self, stop_transfer_costs: Vec<i32>) -> Self {
        self.stop_transfer_costs = Some(stop_transfer_costs);
        self
    }

    fn stop_transfer_cost(&self, stop: StopIdx) -> i32 {
        self.stop_transfer_costs
            .as_ref()
            .and_then(|costs| costs.get(stop).copied())
            .unwrap_or(0)
    }
}

impl CostCalculator for DefaultCostCalculator {
    fn boarding_cost(
        &self,
        first_boarding: bool,
        prev_arrival_time: Time,
        board_stop: StopIdx,
        board_time: Time,
        constraint: Option<&TransferConstraint>,
    ) -> i32 {
        let wait_cost = weighted((board_time - prev_arrival_time).abs(), self.wait_reluctance);
        if first_boarding {
            return wait_cost + self.board_cost;
        }
        if constraint.map_or(false, |constraint| constraint.is_facilitated()) {
            return wait_cost;
        }
        wait_cost + self.board_cost + self.transfer_cost + self.stop_transfer_cost(board_stop)
    }

    fn on_trip_relative_riding_cost(&self, board_time: Time) -> i32 {
        let cost = weighted(board_time, self.transit_reluctance);
        match self.direction {
            SearchDirection::Forward => -cost,
            SearchDirection::Reverse => cost,
        }
    }

    fn transit_arrival_cost(
        &self,
        board_c1: i32,
        alight_slack: Duration,
        transit_time: Duration,
        _to_stop: StopIdx,
    ) -> i32 {
        board_c1
            + weighted(transit_time, self.transit_reluctance)
            + weighted(alight_slack, self.wait_reluctance)
    }

    fn waiting_time_cost(&self, waiting_time: Duration) -> i32 {
        weighted(waiting_time, self.wait_reluctance)
    }

    fn cost_egress(&self, egress: &RaptorAccessEgress) -> i32 {
        egress.c1
    }

    fn min_boarding_cost(&self, first_boarding: bool) -> i32 {
        if first_boarding {
            self.board_cost
        } else {
            self.board_cost + self.transfer_cost
        }
    }

    fn transit_cost(&self, transit_time: Duration) -> i32 {
        weighted(transit_time, self.transit_reluctance)
    }
}
