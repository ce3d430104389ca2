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

use std::rc::Rc;

use crate::engine::cost::CostCalculator;
use crate::engine::mc_stop_arrivals::McStopArrivals;
use crate::engine::pareto_set::ParetoSet;
use crate::engine::pass_through::PassThroughPointsService;
use crate::engine::pattern_ride::{PatternRide, PatternRideComparator};
use crate::engine::slack::SlackProvider;
use crate::engine::stop_arrival::{ArrivalKind, ArrivalRef, McStopArrival};
use crate::engine::time_calculator::TransitCalculator;
use crate::engine::trip_search::{board_search, TripSearch, TripSearchResult};
use crate::time::{Duration, Time};
use crate::traits::{
    RouteIdx, RoutePattern, StopIdx, TransferConstraint, TransitDataProvider, TripSchedule,
};

type Rides<T, C> = ParetoSet<PatternRide<T>, PatternRideComparator<C>>;

/// How a trip can be boarded from a given arrival.
enum Boarding {
    Blocked,
    Trip {
        found: TripSearchResult,
        constraint: Option<TransferConstraint>,
    },
}

/// Boards and alights the trips of one pattern, for the multi-criteria
/// search.
pub struct MultiCriteriaRoutingStrategy<'data, D, C> {
    data: &'data D,
    slack: Rc<dyn SlackProvider>,
    cost: Rc<dyn CostCalculator>,
    pass_through: Option<Rc<dyn PassThroughPointsService>>,
    ride_comparator: PatternRideComparator<C>,
    /// step between two range raptor iterations, set when there are
    /// several of them
    iteration_step: Option<Duration>,
    first_iteration: bool,
}

impl<'data, D, C> MultiCriteriaRoutingStrategy<'data, D, C>
where
    D: TransitDataProvider,
    D::Trip: 'static,
    C: TransitCalculator,
{
    pub fn new(
        data: &'data D,
        slack: Rc<dyn SlackProvider>,
        cost: Rc<dyn CostCalculator>,
        pass_through: Option<Rc<dyn PassThroughPointsService>>,
        iteration_step: Option<Duration>,
    ) -> Self {
        let c2_dominance = pass_through
            .as_ref()
            .map(|service| service.dominance_function());
        Self {
            data,
            slack,
            cost,
            pass_through,
            ride_comparator: PatternRideComparator::new(c2_dominance),
            iteration_step,
            first_iteration: true,
        }
    }

    pub fn set_first_iteration(&mut self, first_iteration: bool) {
        self.first_iteration = first_iteration;
    }

    /// Ride `route` from the arrivals of the previous round and push the
    /// resulting transit arrivals to `alighted`.
    pub fn route(
        &self,
        round: usize,
        route: RouteIdx,
        arrivals: &McStopArrivals<D::Trip, C>,
        alighted: &mut Vec<ArrivalRef<D::Trip>>,
    ) {
        let pattern = self.data.pattern(route);
        let trips = self.data.trips(route);
        let nb_of_positions = pattern.nb_of_positions();
        if trips.is_empty() {
            return;
        }
        let mut rides: Rides<D::Trip, C> = ParetoSet::new(self.ride_comparator.clone());

        for index in 0..nb_of_positions {
            let pos = C::stop_pos_in_search_order(nb_of_positions, index);
            let stop = pattern.stop_at(pos);

            if !rides.is_empty() {
                self.pass_through(stop, &mut rides);
                if C::alight_allowed(pattern, pos) {
                    for ride in rides.iter() {
                        alighted.push(self.alight(ride, pattern, stop, pos));
                    }
                }
            }

            let last_position = index + 1 == nb_of_positions;
            if last_position || !C::board_allowed(pattern, pos) {
                continue;
            }
            for previous in arrivals.list_arrivals_after_marker(stop) {
                if let Some(ride) = self.board(round, route, pattern, stop, pos, previous) {
                    rides.add(ride);
                }
            }
        }
    }

    fn pass_through(&self, stop: StopIdx, rides: &mut Rides<D::Trip, C>) {
        let service = match &self.pass_through {
            Some(service) if service.is_pass_through_point(stop) => service,
            _ => return,
        };
        let mut updated: Rides<D::Trip, C> = ParetoSet::new(self.ride_comparator.clone());
        for ride in rides.iter() {
            match service.update_c2(ride.c2, stop) {
                Some(c2) => updated.add(ride.with_c2(c2)),
                None => updated.add(ride.clone()),
            };
        }
        *rides = updated;
    }

    fn alight(
        &self,
        ride: &PatternRide<D::Trip>,
        pattern: &RoutePattern,
        stop: StopIdx,
        pos: usize,
    ) -> ArrivalRef<D::Trip> {
        let alight_slack = self.slack.alight_slack(pattern.slack_index);
        let alight_time = C::alight_time(&ride.trip, pos);
        let arrival_time = C::plus_duration(alight_time, alight_slack);
        let transit_time = C::duration(ride.board_time, alight_time);
        let c1 = self
            .cost
            .transit_arrival_cost(ride.board_c1, alight_slack, transit_time, stop);
        Rc::new(McStopArrival::transit(
            ride.previous.clone(),
            ride.trip.clone(),
            ride.board_stop,
            ride.board_pos,
            ride.board_time,
            stop,
            pos,
            alight_time,
            arrival_time,
            c1,
            ride.c2,
            ride.constraint,
        ))
    }

    fn board(
        &self,
        round: usize,
        route: RouteIdx,
        pattern: &RoutePattern,
        stop: StopIdx,
        pos: usize,
        previous: &ArrivalRef<D::Trip>,
    ) -> Option<PatternRide<D::Trip>> {
        let trips = self.data.trips(route);
        let board_slack = self.slack.board_slack(pattern.slack_index);

        let boarding = if self.data.has_constrained_transfers() {
            self.constrained_board(route, pos, previous, board_slack)
        } else {
            None
        };
        let (found, constraint) = match boarding {
            Some(Boarding::Blocked) => return None,
            Some(Boarding::Trip { found, constraint }) => (found, constraint),
            None => (self.regular_board(round, route, pos, previous, board_slack)?, None),
        };
        let trip = trips[found.trip_index].clone();
        let board_time = found.time;

        let previous = self.time_shift_access(previous, board_time, board_slack);
        let board_c1 = previous.c1
            + self.cost.boarding_cost(
                previous.round == 0,
                previous.arrival_time,
                stop,
                board_time,
                constraint.as_ref(),
            );
        let relative_c1 = board_c1 + self.cost.on_trip_relative_riding_cost(board_time);
        Some(PatternRide {
            c2: previous.c2,
            previous,
            trip,
            board_stop: stop,
            board_pos: pos,
            board_time,
            board_c1,
            relative_c1,
            constraint,
        })
    }

    fn regular_board(
        &self,
        round: usize,
        route: RouteIdx,
        pos: usize,
        previous: &ArrivalRef<D::Trip>,
        board_slack: Duration,
    ) -> Option<TripSearchResult> {
        let slack = if previous.is_access() {
            board_slack
        } else {
            board_slack + self.slack.transfer_slack()
        };
        let earliest_board_time = C::plus_duration(previous.arrival_time, slack);
        // trips leaving later from the access were boarded by the previous
        // iterations
        let search = match self.iteration_step {
            Some(step) if round == 1 && !self.first_iteration && previous.is_access() => {
                TripSearch::ExactMatch { slack: step }
            }
            _ => TripSearch::Regular,
        };
        search.search::<C, _>(self.data.trips(route), pos, earliest_board_time)
    }

    /// `None` when no constrained transfer applies, the regular boarding
    /// is used then. `Boarding::Blocked` when one applies and no trip of
    /// the route satisfies it.
    fn constrained_board(
        &self,
        route: RouteIdx,
        pos: usize,
        previous: &ArrivalRef<D::Trip>,
        board_slack: Duration,
    ) -> Option<Boarding> {
        let transit = previous.most_recent_transit()?;
        let (from_trip, from_alight_time) = match &transit.kind {
            ArrivalKind::Transit {
                trip, alight_time, ..
            } => (trip, *alight_time),
            _ => return None,
        };
        let trips = self.data.trips(route);
        let candidates: Vec<_> = C::constrained_transfers(self.data, route, pos)
            .iter()
            .filter(|transfer| C::constraint_source(transfer).matches(from_trip, transit.stop))
            .collect();
        if candidates.is_empty() {
            return None;
        }

        let route_wide = candidates
            .iter()
            .find(|transfer| C::constraint_target(transfer).trip.is_none())
            .map(|transfer| transfer.constraint);
        if route_wide.map_or(false, |constraint| constraint.not_allowed) {
            return Some(Boarding::Blocked);
        }

        // a constraint on a given trip of the route takes precedence
        for transfer in candidates
            .iter()
            .filter(|transfer| C::constraint_target(transfer).trip.is_some())
        {
            let constraint = transfer.constraint;
            if !constraint.is_facilitated() {
                continue;
            }
            let target_trip = C::constraint_target(transfer).trip;
            let trip_index = match trips
                .iter()
                .position(|trip| target_trip == Some(trip.trip_sort_index()))
            {
                Some(trip_index) => trip_index,
                None => continue,
            };
            let board_time = C::board_time(&trips[trip_index], pos);
            if !C::is_before(board_time, from_alight_time) {
                return Some(Boarding::Trip {
                    found: TripSearchResult {
                        trip_index,
                        time: board_time,
                    },
                    constraint: Some(constraint),
                });
            }
        }

        // trips of the route that cannot be boarded from this arrival : the
        // not allowed ones, and the ones leaving before the min transfer time
        let forbidden: Vec<usize> = candidates
            .iter()
            .filter_map(|transfer| {
                let target_trip = C::constraint_target(transfer).trip?;
                let constraint = transfer.constraint;
                let rejected = constraint.not_allowed
                    || match constraint.min_transfer_time {
                        Some(min_transfer_time) if !constraint.is_facilitated() => {
                            let after_transfer =
                                C::plus_duration(from_alight_time, min_transfer_time);
                            trips
                                .iter()
                                .find(|trip| trip.trip_sort_index() == target_trip)
                                .map_or(false, |trip| {
                                    C::is_before(C::board_time(trip, pos), after_transfer)
                                })
                        }
                        _ => false,
                    };
                rejected.then(|| target_trip)
            })
            .collect();
        let constraint = route_wide
            .filter(|constraint| constraint.is_facilitated() || constraint.min_transfer_time.is_some());
        let earliest_board_time = match constraint {
            Some(constraint) if constraint.is_facilitated() => from_alight_time,
            Some(TransferConstraint {
                min_transfer_time: Some(min_transfer_time),
                ..
            }) => {
                let after_transfer = C::plus_duration(from_alight_time, min_transfer_time);
                if C::is_before(previous.arrival_time, after_transfer) {
                    after_transfer
                } else {
                    previous.arrival_time
                }
            }
            _ => C::plus_duration(
                previous.arrival_time,
                board_slack + self.slack.transfer_slack(),
            ),
        };
        if constraint.is_none() && forbidden.is_empty() {
            return None;
        }

        // from here a constraint applies, the regular boarding must not be
        // used as a fallback
        let mut found = match board_search::<C, _>(trips, pos, earliest_board_time) {
            Some(found) => found,
            None => return Some(Boarding::Blocked),
        };
        while forbidden.contains(&trips[found.trip_index].trip_sort_index()) {
            let next = if C::search_forward() {
                found.trip_index.checked_add(1)
            } else {
                found.trip_index.checked_sub(1)
            };
            let trip_index = match next.filter(|&next| next < trips.len()) {
                Some(next) => next,
                None => return Some(Boarding::Blocked),
            };
            found = TripSearchResult {
                trip_index,
                time: C::board_time(&trips[trip_index], pos),
            };
        }
        Some(Boarding::Trip { found, constraint })
    }

    /// An access is left as late as possible before the boarding.
    fn time_shift_access(
        &self,
        previous: &ArrivalRef<D::Trip>,
        board_time: Time,
        board_slack: Duration,
    ) -> ArrivalRef<D::Trip> {
        let leg = match &previous.kind {
            ArrivalKind::Access { leg, .. } if previous.round == 0 => leg,
            _ => return previous.clone(),
        };
        let limit = C::minus_duration(board_time, board_slack);
        let arrival_time = C::latest_leg_arrival_time(leg, limit);
        if !C::is_after(arrival_time, previous.arrival_time) {
            return previous.clone();
        }
        let departure_time = C::minus_duration(arrival_time, leg.duration);
        Rc::new(previous.time_shifted_access(arrival_time, departure_time))
    }
}
