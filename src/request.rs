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
use crate::config::{ParetoSetCost, ParetoSetTime, RelaxFunction, SearchDirection, SearchParams};
use crate::engine::via::ViaConnections;
use crate::error::RaptorError;
use crate::time::Time;
use crate::traits::StopIdx;

/// A journey search, expressed in the real world direction : `accesses`
/// leave the origin, `egresses` reach the destination and `via` points are
/// visited in the given order, whatever the direction of the search.
#[derive(Debug, Clone, PartialEq)]
pub struct RaptorRequest {
    pub direction: SearchDirection,
    pub search: SearchParams,
    pub accesses: Vec<RaptorAccessEgress>,
    pub egresses: Vec<RaptorAccessEgress>,
    pub via: Vec<ViaConnections>,
    /// ordered groups of alternative stops the journey must go through
    pub pass_through: Vec<Vec<StopIdx>>,
    pub pareto_set_cost: ParetoSetCost,
    pub pareto_set_time: ParetoSetTime,
    pub relax_c1: RelaxFunction,
    /// drop arrivals at stops the destination cannot be reached from in time
    pub use_heuristic_pruning: bool,
    /// `Some(vec![])` logs the events of every stop
    pub debug_stops: Option<Vec<StopIdx>>,
}

impl RaptorRequest {
    fn new(direction: SearchDirection, search: SearchParams) -> Self {
        Self {
            direction,
            search,
            accesses: Vec::new(),
            egresses: Vec::new(),
            via: Vec::new(),
            pass_through: Vec::new(),
            pareto_set_cost: ParetoSetCost::UseC1,
            pareto_set_time: ParetoSetTime::UseTimetable,
            relax_c1: RelaxFunction::NORMAL,
            use_heuristic_pruning: false,
            debug_stops: None,
        }
    }

    /// Journeys leaving the origin at `earliest_departure_time` or later.
    pub fn depart_after(earliest_departure_time: Time) -> Self {
        Self::new(
            SearchDirection::Forward,
            SearchParams::depart_after(earliest_departure_time),
        )
    }

    /// Journeys reaching the destination at `latest_arrival_time` or earlier.
    pub fn arrive_before(latest_arrival_time: Time) -> Self {
        Self::new(
            SearchDirection::Reverse,
            SearchParams::arrive_before(latest_arrival_time),
        )
    }

    pub fn with_search(mut self, search: SearchParams) -> Self {
        self.search = search;
        self
    }

    pub fn with_access(mut self, access: RaptorAccessEgress) -> Self {
        self.accesses.push(access);
        self
    }

    pub fn with_egress(mut self, egress: RaptorAccessEgress) -> Self {
        self.egresses.push(egress);
        self
    }

    pub fn with_via(mut self, via: ViaConnections) -> Self {
        self.via.push(via);
        self
    }

    pub fn with_pass_through(mut self, stops: Vec<StopIdx>) -> Self {
        self.pass_through.push(stops);
        self
    }

    pub fn with_pareto_set_cost(mut self, pareto_set_cost: ParetoSetCost) -> Self {
        self.pareto_set_cost = pareto_set_cost;
        self
    }

    pub fn with_pareto_set_time(mut self, pareto_set_time: ParetoSetTime) -> Self {
        self.pareto_set_time = pareto_set_time;
        self
    }

    pub fn with_relax_c1(mut self, relax_c1: RelaxFunction) -> Self {
        self.relax_c1 = relax_c1;
        self
    }

    pub fn with_heuristic_pruning(mut self) -> Self {
        self.use_heuristic_pruning = true;
        self
    }

    pub fn with_debug_stops(mut self, stops: Vec<StopIdx>) -> Self {
        self.debug_stops = Some(stops);
        self
    }

    /// Check that every stop of the request exists in a network of
    /// `nb_of_stops` stops.
    pub fn check_stops(&self, nb_of_stops: usize) -> Result<(), RaptorError> {
        let legs = self.accesses.iter().chain(self.egresses.iter());
        let via = self
            .via
            .iter()
            .flat_map(|via| via.connections())
            .flat_map(|connection| [connection.from_stop, connection.to_stop]);
        let pass_through = self.pass_through.iter().flatten().copied();
        let debug = self.debug_stops.iter().flatten().copied();
        match legs
            .map(|leg| leg.stop)
            .chain(via)
            .chain(pass_through)
            .chain(debug)
            .find(|stop| *stop >= nb_of_stops)
        {
            Some(stop) => Err(RaptorError::UnknownStop { stop, nb_of_stops }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::via::ViaConnection;

    #[test]
    fn unknown_stops_are_reported() {
        let request = RaptorRequest::depart_after(28_800)
            .with_access(RaptorAccessEgress::walk(0, 60, 60))
            .with_egress(RaptorAccessEgress::walk(2, 0, 0));
        assert_eq!(request.check_stops(3), Ok(()));
        assert_eq!(request.direction, SearchDirection::Forward);

        let request = request.with_via(
            ViaConnections::new(0, vec![ViaConnection::transfer(1, 5, 60, 0)]).unwrap(),
        );
        assert_eq!(
            request.check_stops(3),
            Err(RaptorError::UnknownStop {
                stop: 5,
                nb_of_stops: 3
            })
        );
    }
}
