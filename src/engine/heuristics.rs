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

use fixedbitset::FixedBitSet;
use tracing::{debug, trace};

use crate::access_egress::RaptorAccessEgress;
use crate::engine::cost::CostCalculator;
use crate::engine::slack::SlackProvider;
use crate::engine::time_calculator::TransitCalculator;
use crate::time::{Duration, Time};
use crate::traits::{StopIdx, TransitDataProvider, TripSchedule};

/// Value of a heuristic for a stop the targets cannot be reached from.
pub const UNREACHED: i32 = i32::MAX;

/// Value of [`Heuristics::min_number_of_transfers`] for a stop the targets
/// cannot be reached from.
pub const UNREACHED_TRANSFERS: usize = usize::MAX;

/// Lower bounds, for every stop, on what it takes to go from this stop to
/// the targets of the heuristic search.
#[derive(Debug, Clone)]
pub struct Heuristics {
    min_durations: Vec<Duration>,
    min_transfers: Vec<usize>,
    min_costs: Vec<i32>,
    /// smallest duration from the origin legs to the targets, `UNREACHED`
    /// if none of the origin stops is reached.
    min_transit_time: Duration,
    /// smallest waiting time along a journey, computed by
    /// [`HeuristicSearch::min_wait_time`]
    min_wait_time: Duration,
}

impl Heuristics {
    pub fn min_travel_duration(&self, stop: StopIdx) -> Duration {
        self.min_durations[stop]
    }

    pub fn min_number_of_transfers(&self, stop: StopIdx) -> usize {
        self.min_transfers[stop]
    }

    pub fn min_cost(&self, stop: StopIdx) -> i32 {
        self.min_costs[stop]
    }

    pub fn is_reached(&self, stop: StopIdx) -> bool {
        self.min_durations[stop] != UNREACHED
    }

    pub fn destination_reached(&self) -> bool {
        self.min_transit_time != UNREACHED
    }

    pub fn min_transit_time(&self) -> Duration {
        self.min_transit_time
    }

    pub fn min_wait_time(&self) -> Duration {
        self.min_wait_time
    }

    pub fn set_min_wait_time(&mut self, min_wait_time: Duration) {
        self.min_wait_time = min_wait_time.max(0);
    }

    /// Pruning of the main search : an arrival at a stop is useless if the
    /// destination cannot be reached from it, or not within `time_limit`
    /// when there is one.
    pub fn destination_pruning(&self, time_limit: Option<Time>) -> DestinationPruning {
        DestinationPruning {
            min_durations: self.min_durations.clone(),
            time_limit,
        }
    }
}

/// Rejects arrivals from which the destination is out of reach.
#[derive(Debug, Clone)]
pub struct DestinationPruning {
    min_durations: Vec<Duration>,
    time_limit: Option<Time>,
}

impl DestinationPruning {
    pub fn new(min_durations: Vec<Duration>, time_limit: Option<Time>) -> Self {
        Self {
            min_durations,
            time_limit,
        }
    }

    pub fn is_pruned<C: TransitCalculator>(&self, stop: StopIdx, time: Time) -> bool {
        match self.min_durations.get(stop) {
            Some(&duration) if duration != UNREACHED => match self.time_limit {
                Some(time_limit) => {
                    C::exceeds_time_limit(C::plus_duration(time, duration), time_limit)
                }
                None => false,
            },
            _ => true,
        }
    }
}

/// Time independent search of lower bounds.
///
/// Routes are ridden in the direction of `C`, starting from `targets`, so
/// that the bounds computed for a stop are bounds on the way from the stop
/// to the targets in the opposite direction. For a forward journey search,
/// run it with the reverse calculator from the egress legs.
pub struct HeuristicSearch<'data, D, C> {
    data: &'data D,
    slack: &'data dyn SlackProvider,
    cost: &'data dyn CostCalculator,
    number_of_rounds: usize,
    _calculator: std::marker::PhantomData<C>,
}

// Smallest on board duration between consecutive positions of a route, in
// search order, and smallest dwell time at each position.
fn min_segment_durations<C: TransitCalculator, T: TripSchedule>(
    trips: &[T],
    nb_of_positions: usize,
) -> (Vec<Duration>, Vec<Duration>) {
    let mut hops = vec![UNREACHED; nb_of_positions.saturating_sub(1)];
    let mut dwells = vec![UNREACHED; nb_of_positions];
    for trip in trips {
        for index in 0..nb_of_positions {
            let pos = C::stop_pos_in_search_order(nb_of_positions, index);
            let dwell = C::duration(C::alight_time(trip, pos), C::board_time(trip, pos)).max(0);
            dwells[index] = dwells[index].min(dwell);
            if index + 1 < nb_of_positions {
                let next = C::stop_pos_in_search_order(nb_of_positions, index + 1);
                let hop = C::duration(C::board_time(trip, pos), C::alight_time(trip, next)).max(0);
                hops[index] = hops[index].min(hop);
            }
        }
    }
    (hops, dwells)
}

fn saturating_add(value: i32, increment: i32) -> i32 {
    if value == UNREACHED || increment == UNREACHED {
        UNREACHED
    } else {
        value.saturating_add(increment)
    }
}

impl<'data, D: TransitDataProvider, C: TransitCalculator> HeuristicSearch<'data, D, C> {
    pub fn new(
        data: &'data D,
        slack: &'data dyn SlackProvider,
        cost: &'data dyn CostCalculator,
        number_of_rounds: usize,
    ) -> Self {
        Self {
            data,
            slack,
            cost,
            number_of_rounds,
            _calculator: std::marker::PhantomData,
        }
    }

    /// Bounds from every stop to `targets`, and the smallest of them from
    /// the `origins` legs.
    pub fn run(
        &self,
        targets: &[RaptorAccessEgress],
        origins: &[RaptorAccessEgress],
    ) -> Heuristics {
        let nb_of_stops = self.data.nb_of_stops();
        let mut durations = vec![UNREACHED; nb_of_stops];
        let mut costs = vec![UNREACHED; nb_of_stops];
        let mut transfers = vec![UNREACHED_TRANSFERS; nb_of_stops];
        let mut marked = FixedBitSet::with_capacity(nb_of_stops);

        for leg in targets {
            let cost = self.cost.cost_egress(leg);
            if leg.duration < durations[leg.stop] {
                durations[leg.stop] = leg.duration;
                marked.insert(leg.stop);
            }
            if cost < costs[leg.stop] {
                costs[leg.stop] = cost;
                marked.insert(leg.stop);
            }
            transfers[leg.stop] = transfers[leg.stop].min(leg.number_of_rides.saturating_sub(1));
        }

        let mut routes = FixedBitSet::with_capacity(self.data.nb_of_routes());
        let mut round = 0;
        while round < self.number_of_rounds && marked.count_ones(..) > 0 {
            round += 1;
            routes.clear();
            self.data.routes_touching_stops(&marked, &mut routes);
            let previous_durations = durations.clone();
            let previous_costs = costs.clone();
            marked.clear();

            for route in routes.ones() {
                self.relax_route(
                    route,
                    round,
                    &previous_durations,
                    &previous_costs,
                    &mut durations,
                    &mut costs,
                    &mut transfers,
                    &mut marked,
                );
            }

            let reached_by_transit: Vec<StopIdx> = marked.ones().collect();
            for stop in reached_by_transit {
                for transfer in C::transfers(self.data, stop) {
                    let duration = saturating_add(durations[stop], transfer.duration);
                    let cost = saturating_add(costs[stop], transfer.c1);
                    let mut improved = false;
                    if duration < durations[transfer.stop] {
                        durations[transfer.stop] = duration;
                        improved = true;
                    }
                    if cost < costs[transfer.stop] {
                        costs[transfer.stop] = cost;
                        improved = true;
                    }
                    if improved {
                        transfers[transfer.stop] = transfers[transfer.stop].min(round - 1);
                        marked.insert(transfer.stop);
                    }
                }
            }
            trace!("heuristic round {} : {} stops improved", round, marked.count_ones(..));
        }

        let min_transit_time = origins
            .iter()
            .map(|leg| saturating_add(durations[leg.stop], leg.duration))
            .min()
            .unwrap_or(UNREACHED);
        debug!(
            "heuristics computed in {} rounds, min transit time {}",
            round, min_transit_time
        );
        Heuristics {
            min_durations: durations,
            min_transfers: transfers,
            min_costs: costs,
            min_transit_time,
            min_wait_time: 0,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn relax_route(
        &self,
        route: usize,
        round: usize,
        previous_durations: &[Duration],
        previous_costs: &[i32],
        durations: &mut [Duration],
        costs: &mut [i32],
        transfers: &mut [usize],
        marked: &mut FixedBitSet,
    ) {
        let pattern = self.data.pattern(route);
        let trips = self.data.trips(route);
        let nb_of_positions = pattern.nb_of_positions();
        if trips.is_empty() || nb_of_positions < 2 {
            return;
        }
        let (hops, dwells) = min_segment_durations::<C, _>(trips, nb_of_positions);
        let board_cost = self.cost.min_boarding_cost(round == 1);

        let mut on_board_duration = UNREACHED;
        let mut on_board_cost = UNREACHED;
        for index in 0..nb_of_positions {
            let pos = C::stop_pos_in_search_order(nb_of_positions, index);
            let stop = pattern.stop_at(pos);
            if index > 0 {
                let hop = hops[index - 1];
                on_board_duration = saturating_add(on_board_duration, hop);
                on_board_cost = saturating_add(on_board_cost, self.cost.transit_cost(hop));
                if C::alight_allowed(pattern, pos) && on_board_duration != UNREACHED {
                    let mut improved = false;
                    if on_board_duration < durations[stop] {
                        durations[stop] = on_board_duration;
                        improved = true;
                    }
                    if on_board_cost < costs[stop] {
                        costs[stop] = on_board_cost;
                        improved = true;
                    }
                    if improved {
                        transfers[stop] = transfers[stop].min(round - 1);
                        marked.insert(stop);
                    }
                }
                on_board_duration = saturating_add(on_board_duration, dwells[index]);
                on_board_cost = saturating_add(on_board_cost, self.cost.transit_cost(dwells[index]));
            }
            if C::board_allowed(pattern, pos) && previous_durations[stop] != UNREACHED {
                let slack = self.slack.board_slack(pattern.slack_index);
                on_board_duration = on_board_duration.min(saturating_add(previous_durations[stop], slack));
                on_board_cost = on_board_cost.min(saturating_add(previous_costs[stop], board_cost));
            }
        }
    }

    /// Earliest arrival at the `targets`, in search direction, when leaving
    /// the `origins` at `start`. `None` if the targets are not reached.
    pub fn earliest_arrival(
        &self,
        origins: &[RaptorAccessEgress],
        targets: &[RaptorAccessEgress],
        start: Time,
    ) -> Option<Time> {
        let nb_of_stops = self.data.nb_of_stops();
        let unreached = C::unreached_time();
        let mut best = vec![unreached; nb_of_stops];
        let mut marked = FixedBitSet::with_capacity(nb_of_stops);
        for leg in origins.iter().filter(|leg| !leg.has_rides()) {
            let time = C::leg_arrival_time(leg, start);
            if C::is_before(time, best[leg.stop]) {
                best[leg.stop] = time;
                marked.insert(leg.stop);
            }
        }

        let mut routes = FixedBitSet::with_capacity(self.data.nb_of_routes());
        let mut round = 0;
        while round < self.number_of_rounds && marked.count_ones(..) > 0 {
            round += 1;
            routes.clear();
            self.data.routes_touching_stops(&marked, &mut routes);
            let previous = best.clone();
            marked.clear();
            for route in routes.ones() {
                let pattern = self.data.pattern(route);
                let trips = self.data.trips(route);
                let nb_of_positions = pattern.nb_of_positions();
                let mut current: Option<usize> = None;
                for index in 0..nb_of_positions {
                    let pos = C::stop_pos_in_search_order(nb_of_positions, index);
                    let stop = pattern.stop_at(pos);
                    if let Some(trip_index) = current {
                        if C::alight_allowed(pattern, pos) {
                            let time = C::plus_duration(
                                C::alight_time(&trips[trip_index], pos),
                                self.slack.alight_slack(pattern.slack_index),
                            );
                            if C::is_before(time, best[stop]) {
                                best[stop] = time;
                                marked.insert(stop);
                            }
                        }
                    }
                    if C::board_allowed(pattern, pos) && previous[stop] != unreached {
                        let mut slack = self.slack.board_slack(pattern.slack_index);
                        if round > 1 {
                            slack += self.slack.transfer_slack();
                        }
                        let earliest = C::plus_duration(previous[stop], slack);
                        if let Some(found) = C::find_trip(trips, pos, earliest) {
                            let better = match current {
                                None => true,
                                Some(trip_index) => C::is_before(
                                    C::board_time(&trips[found], pos),
                                    C::board_time(&trips[trip_index], pos),
                                ),
                            };
                            if better {
                                current = Some(found);
                            }
                        }
                    }
                }
            }
            let reached_by_transit: Vec<StopIdx> = marked.ones().collect();
            for stop in reached_by_transit {
                for transfer in C::transfers(self.data, stop) {
                    let time = C::plus_duration(best[stop], transfer.duration);
                    if C::is_before(time, best[transfer.stop]) {
                        best[transfer.stop] = time;
                        marked.insert(transfer.stop);
                    }
                }
            }
        }

        targets
            .iter()
            .filter(|leg| best[leg.stop] != unreached)
            .map(|leg| C::leg_arrival_time(leg, best[leg.stop]))
            .reduce(|first, second| if C::is_before(second, first) { second } else { first })
    }

    /// Smallest waiting time of a journey leaving the `origins` at `start`,
    /// given the time independent `heuristics` of the same journey.
    pub fn min_wait_time(
        &self,
        heuristics: &Heuristics,
        origins: &[RaptorAccessEgress],
        targets: &[RaptorAccessEgress],
        start: Time,
    ) -> Duration {
        if !heuristics.destination_reached() {
            return 0;
        }
        match self.earliest_arrival(origins, targets, start) {
            Some(arrival) => (C::duration(start, arrival) - heuristics.min_transit_time()).max(0),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CostParams, SearchDirection, SlackParams};
    use crate::engine::cost::DefaultCostCalculator;
    use crate::engine::slack::DefaultSlackProvider;
    use crate::engine::time_calculator::{ForwardCalculator, ReverseCalculator};
    use crate::transit_data::TransitData;

    // A -> B -> C by route R1 (08:00, 08:05, 08:10), B -> C by route R2
    // (08:20, 08:25)
    fn data() -> TransitData {
        let mut data = TransitData::new();
        let a = data.add_stop("A");
        let b = data.add_stop("B");
        let c = data.add_stop("C");
        let times = vec![28_800, 29_100, 29_400];
        data.add_trip("R1", &[a, b, c], &[true; 3], &[true; 3], 0, "r1", times.clone(), times)
            .unwrap();
        let times = vec![30_000, 30_300];
        data.add_trip("R2", &[b, c], &[true; 2], &[true; 2], 0, "r2", times.clone(), times)
            .unwrap();
        data
    }

    #[test]
    fn lower_bounds_towards_the_egress() {
        let data = data();
        let slack = DefaultSlackProvider::new(&SlackParams::default());
        let cost = DefaultCostCalculator::new(&CostParams::default(), SearchDirection::Reverse);
        let a = data.stop_idx("A").unwrap();
        let b = data.stop_idx("B").unwrap();
        let c = data.stop_idx("C").unwrap();
        let search = HeuristicSearch::<_, ReverseCalculator>::new(&data, &slack, &cost, 3);
        let egress = vec![RaptorAccessEgress::walk(c, 60, 60)];
        let access = vec![RaptorAccessEgress::walk(a, 120, 120)];
        let heuristics = search.run(&egress, &access);
        assert_eq!(heuristics.min_travel_duration(c), 60);
        assert_eq!(heuristics.min_travel_duration(b), 300 + 60);
        assert_eq!(heuristics.min_travel_duration(a), 600 + 60);
        assert_eq!(heuristics.min_number_of_transfers(a), 0);
        assert_eq!(heuristics.min_transit_time(), 600 + 60 + 120);
        assert!(heuristics.destination_reached());

        let pruning = heuristics.destination_pruning(Some(29_500));
        assert!(!pruning.is_pruned::<ForwardCalculator>(b, 29_100));
        assert!(pruning.is_pruned::<ForwardCalculator>(b, 29_200));

        // without a limit only the stops the destination cannot be reached
        // from are pruned
        let pruning = heuristics.destination_pruning(None);
        assert!(!pruning.is_pruned::<ForwardCalculator>(b, 80_000));
    }

    #[test]
    fn unreachable_stops_are_pruned() {
        let data = data();
        let slack = DefaultSlackProvider::new(&SlackParams::default());
        let cost = DefaultCostCalculator::new(&CostParams::default(), SearchDirection::Reverse);
        let a = data.stop_idx("A").unwrap();
        let search = HeuristicSearch::<_, ReverseCalculator>::new(&data, &slack, &cost, 3);
        let heuristics = search.run(&[RaptorAccessEgress::walk(a, 0, 0)], &[]);
        let b = data.stop_idx("B").unwrap();
        assert!(!heuristics.is_reached(b));
        assert_eq!(heuristics.min_number_of_transfers(b), UNREACHED_TRANSFERS);
        assert!(!heuristics.destination_reached());
        assert!(heuristics.destination_pruning(Some(40_000)).is_pruned::<ForwardCalculator>(b, 0));
    }

    #[test]
    fn earliest_arrival_gives_the_wait_time() {
        let data = data();
        let slack = DefaultSlackProvider::new(&SlackParams::default());
        let cost = DefaultCostCalculator::new(&CostParams::default(), SearchDirection::Forward);
        let a = data.stop_idx("A").unwrap();
        let c = data.stop_idx("C").unwrap();
        let access = vec![RaptorAccessEgress::walk(a, 0, 0)];
        let egress = vec![RaptorAccessEgress::walk(c, 0, 0)];

        let reverse = HeuristicSearch::<_, ReverseCalculator>::new(&data, &slack, &cost, 3);
        let heuristics = reverse.run(&egress, &access);
        assert_eq!(heuristics.min_transit_time(), 600);

        let forward = HeuristicSearch::<_, ForwardCalculator>::new(&data, &slack, &cost, 3);
        assert_eq!(forward.earliest_arrival(&access, &egress, 28_500), Some(29_400));
        assert_eq!(forward.min_wait_time(&heuristics, &access, &egress, 28_500), 300);
        assert_eq!(forward.earliest_arrival(&access, &egress, 29_000), None);
    }
}
