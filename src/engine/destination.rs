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

use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::access_egress::RaptorAccessEgress;
use crate::config::ParetoSetTime;
use crate::engine::cost::CostCalculator;
use crate::engine::debug::DebugHandler;
use crate::engine::pareto_set::{ParetoComparator, ParetoSet};
use crate::engine::pass_through::PassThroughPointsService;
use crate::engine::path::{map_to_path, RaptorPath};
use crate::engine::stop_arrival::{ArrivalRef, CostComparator};
use crate::engine::stop_arrival_pareto_set::StopArrivalEventListener;
use crate::engine::time_calculator::TransitCalculator;
use crate::time::Time;
use crate::traits::TripSchedule;

/// A stop arrival extended with an egress leg to the destination.
#[derive(Debug, Clone)]
pub struct DestinationArrival<T> {
    pub previous: ArrivalRef<T>,
    pub egress: RaptorAccessEgress,
    pub iteration_time: Time,
    /// start of the path, in search direction
    pub departure_time: Time,
    /// arrival at the destination, in search direction
    pub arrival_time: Time,
    /// number of rides, including those of the access and egress legs
    pub round: usize,
    pub c1: i32,
    pub c2: i32,
}

impl<T> DestinationArrival<T> {
    fn real_arrival_time(&self, forward: bool) -> Time {
        if forward {
            self.arrival_time
        } else {
            self.departure_time
        }
    }

    fn real_departure_time(&self, forward: bool) -> Time {
        if forward {
            self.departure_time
        } else {
            self.arrival_time
        }
    }
}

pub struct DestinationArrivalComparator<C> {
    time: ParetoSetTime,
    cost: CostComparator,
    _calculator: PhantomData<C>,
}

impl<C> DestinationArrivalComparator<C> {
    pub fn new(time: ParetoSetTime, cost: CostComparator) -> Self {
        Self {
            time,
            cost,
            _calculator: PhantomData,
        }
    }
}

impl<C: TransitCalculator, T> ParetoComparator<DestinationArrival<T>>
    for DestinationArrivalComparator<C>
{
    fn left_dominance_exist(&self, left: &DestinationArrival<T>, right: &DestinationArrival<T>) -> bool {
        let forward = C::search_forward();
        let time_dominance = match self.time {
            ParetoSetTime::UseTimetable => {
                C::is_after(left.iteration_time, right.iteration_time)
                    || C::is_before(left.arrival_time, right.arrival_time)
            }
            ParetoSetTime::UseArrivalTime => {
                left.real_arrival_time(forward) < right.real_arrival_time(forward)
            }
            ParetoSetTime::UseDepartureTime => {
                left.real_departure_time(forward) > right.real_departure_time(forward)
            }
        };
        time_dominance
            || left.round < right.round
            || self
                .cost
                .left_dominance_exist(left.c1, left.c2, right.c1, right.c2)
    }
}

/// The pareto set of the arrivals at the destination.
pub struct DestinationArrivalPaths<T, C> {
    arrivals: ParetoSet<DestinationArrival<T>, DestinationArrivalComparator<C>>,
    cost_calculator: Rc<dyn CostCalculator>,
    pass_through: Option<Rc<dyn PassThroughPointsService>>,
    debug: Option<Rc<dyn DebugHandler<T>>>,
    iteration_time: Time,
    time_limit: Option<Time>,
}

impl<T: TripSchedule, C: TransitCalculator> DestinationArrivalPaths<T, C> {
    pub fn new(
        comparator: DestinationArrivalComparator<C>,
        cost_calculator: Rc<dyn CostCalculator>,
        pass_through: Option<Rc<dyn PassThroughPointsService>>,
        debug: Option<Rc<dyn DebugHandler<T>>>,
        time_limit: Option<Time>,
    ) -> Self {
        Self {
            arrivals: ParetoSet::new(comparator),
            cost_calculator,
            pass_through,
            debug,
            iteration_time: C::unreached_time(),
            time_limit,
        }
    }

    pub fn set_iteration_time(&mut self, iteration_time: Time) {
        self.iteration_time = iteration_time;
    }

    /// Add the arrival at the destination using `egress` from `previous`.
    pub fn add(&mut self, previous: &ArrivalRef<T>, egress: &RaptorAccessEgress) -> bool {
        let arrival_time = C::leg_arrival_time(egress, previous.arrival_time);
        if let Some(limit) = self.time_limit {
            if C::exceeds_time_limit(arrival_time, limit) {
                self.reject(previous, "the destination is reached after the time limit");
                return false;
            }
        }
        if let Some(pass_through) = &self.pass_through {
            if !pass_through.accept_c2_at_destination(previous.c2) {
                self.reject(previous, "some pass-through points are not visited");
                return false;
            }
        }
        let egress_departure = C::minus_duration(arrival_time, egress.duration);
        let waiting_time = C::duration(previous.arrival_time, egress_departure);
        let c1 = previous.c1
            + self.cost_calculator.cost_egress(egress)
            + self.cost_calculator.waiting_time_cost(waiting_time);
        let arrival = DestinationArrival {
            previous: previous.clone(),
            egress: egress.clone(),
            iteration_time: self.iteration_time,
            departure_time: previous.departure_time(),
            arrival_time,
            round: previous.round + egress.number_of_rides,
            c1,
            c2: previous.c2,
        };
        self.arrivals.add(arrival)
    }

    fn reject(&self, arrival: &ArrivalRef<T>, reason: &str) {
        if let Some(debug) = &self.debug {
            debug.reject(arrival, reason);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DestinationArrival<T>> {
        self.arrivals.iter()
    }

    /// Best arrival time at the destination in search direction.
    pub fn best_arrival_time(&self) -> Option<Time> {
        self.arrivals
            .iter()
            .map(|arrival| arrival.arrival_time)
            .reduce(|best, time| if C::is_before(time, best) { time } else { best })
    }

    pub fn paths(&self) -> Vec<RaptorPath> {
        self.arrivals
            .iter()
            .map(|arrival| map_to_path::<T, C>(arrival))
            .collect()
    }
}

/// Forwards the arrivals at an egress stop to the destination.
pub struct EgressArrivalListener<T, C> {
    egress_legs: Vec<RaptorAccessEgress>,
    destination: Rc<RefCell<DestinationArrivalPaths<T, C>>>,
}

impl<T, C> EgressArrivalListener<T, C> {
    pub fn new(
        egress_legs: Vec<RaptorAccessEgress>,
        destination: Rc<RefCell<DestinationArrivalPaths<T, C>>>,
    ) -> Self {
        Self {
            egress_legs,
            destination,
        }
    }
}

impl<T: TripSchedule, C: TransitCalculator> StopArrivalEventListener<T>
    for EgressArrivalListener<T, C>
{
    fn new_element_added(&self, arrival: &ArrivalRef<T>) {
        let mut destination = self.destination.borrow_mut();
        for egress in &self.egress_legs {
            // walking twice in a row is not allowed
            if arrival.arrived_on_board() || egress.stop_reached_on_board {
                destination.add(arrival, egress);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CostParams, ParetoSetCost, SearchDirection};
    use crate::engine::cost::DefaultCostCalculator;
    use crate::engine::stop_arrival::tests::{access_arrival, transit_arrival};
    use crate::engine::time_calculator::{ForwardCalculator, ReverseCalculator};
    use crate::transit_data::TripTimes;
    use rstest::rstest;

    fn destination(time_limit: Option<Time>) -> DestinationArrivalPaths<TripTimes, ForwardCalculator> {
        let comparator = DestinationArrivalComparator::new(
            ParetoSetTime::UseTimetable,
            CostComparator::new(ParetoSetCost::UseC1),
        );
        let cost = DefaultCostCalculator::new(&CostParams::default(), SearchDirection::Forward);
        DestinationArrivalPaths::new(comparator, Rc::new(cost), None, None, time_limit)
    }

    #[test]
    fn egress_arrivals_are_pareto_filtered() {
        let mut paths = destination(Some(30_000));
        paths.set_iteration_time(28_800);
        let access = access_arrival(0, 28_800, 0);
        let slow = transit_arrival(&access, 1, 29_400, 600);
        let fast = transit_arrival(&access, 2, 29_100, 700);
        let egress_1 = RaptorAccessEgress::walk(1, 60, 60);
        let egress_2 = RaptorAccessEgress::walk(2, 60, 60);
        assert!(paths.add(&slow, &egress_1));
        assert!(paths.add(&fast, &egress_2));
        assert_eq!(paths.len(), 2);
        assert_eq!(paths.best_arrival_time(), Some(29_160));

        let too_late = transit_arrival(&access, 1, 29_990, 10);
        assert!(!paths.add(&too_late, &egress_1));

        let path = paths
            .paths()
            .into_iter()
            .find(|path| path.arrival_time == 29_460)
            .unwrap();
        assert_eq!(path.c1, 660);
        assert_eq!(path.legs.len(), 3);
        assert_eq!(path.departure_time, 28_800);
        assert!(path.is_valid());
    }

    #[test]
    fn walking_egress_needs_an_on_board_arrival() {
        let paths = Rc::new(RefCell::new(destination(None)));
        let listener =
            EgressArrivalListener::new(vec![RaptorAccessEgress::walk(0, 60, 60)], paths.clone());
        listener.new_element_added(&access_arrival(0, 28_800, 0));
        assert!(paths.borrow().is_empty());

        let flex = EgressArrivalListener::new(
            vec![RaptorAccessEgress::flex(0, 600, 600, 1)],
            paths.clone(),
        );
        flex.new_element_added(&access_arrival(0, 28_800, 0));
        assert_eq!(paths.borrow().len(), 1);
        assert_eq!(paths.borrow().paths()[0].number_of_transfers, 0);
    }

    // A path leaving at `departure` and arriving at `arrival`, in real world
    // times, seen from a search in the direction of `C`.
    fn arrival<C: TransitCalculator>(
        departure: Time,
        arrival: Time,
        c1: i32,
        c2: i32,
    ) -> DestinationArrival<TripTimes> {
        let (start, end) = if C::search_forward() {
            (departure, arrival)
        } else {
            (arrival, departure)
        };
        DestinationArrival {
            previous: access_arrival(0, start, 0),
            egress: RaptorAccessEgress::walk(0, 0, 0),
            iteration_time: start,
            departure_time: start,
            arrival_time: end,
            round: 1,
            c1,
            c2,
        }
    }

    fn kept<C: TransitCalculator>(
        time: ParetoSetTime,
        cost: ParetoSetCost,
        arrivals: Vec<DestinationArrival<TripTimes>>,
    ) -> Vec<(Time, Time, i32)> {
        let comparator = DestinationArrivalComparator::<C>::new(time, CostComparator::new(cost));
        let mut set = ParetoSet::new(comparator);
        for arrival in arrivals {
            set.add(arrival);
        }
        let forward = C::search_forward();
        set.iter()
            .map(|arrival| {
                (
                    arrival.real_departure_time(forward),
                    arrival.real_arrival_time(forward),
                    arrival.c1,
                )
            })
            .collect()
    }

    // leaving at 08:00 and arriving at 09:00, or leaving at 08:30 and
    // arriving at 09:10
    #[rstest]
    #[case(ParetoSetTime::UseTimetable, vec![(28_800, 32_400, 1000), (30_600, 33_000, 1000)])]
    #[case(ParetoSetTime::UseArrivalTime, vec![(28_800, 32_400, 1000)])]
    #[case(ParetoSetTime::UseDepartureTime, vec![(30_600, 33_000, 1000)])]
    fn time_criteria_at_the_destination(
        #[case] time: ParetoSetTime,
        #[case] expected: Vec<(Time, Time, i32)>,
    ) {
        let forward = kept::<ForwardCalculator>(
            time,
            ParetoSetCost::UseC1,
            vec![
                arrival::<ForwardCalculator>(28_800, 32_400, 1000, 0),
                arrival::<ForwardCalculator>(30_600, 33_000, 1000, 0),
            ],
        );
        assert_eq!(forward, expected);

        let reverse = kept::<ReverseCalculator>(
            time,
            ParetoSetCost::UseC1,
            vec![
                arrival::<ReverseCalculator>(28_800, 32_400, 1000, 0),
                arrival::<ReverseCalculator>(30_600, 33_000, 1000, 0),
            ],
        );
        assert_eq!(reverse, expected);
    }

    #[rstest]
    #[case(ParetoSetCost::UseC1, vec![1000])]
    #[case(ParetoSetCost::UseC1AndC2, vec![1000, 1200])]
    fn second_criterion_at_the_destination(
        #[case] cost: ParetoSetCost,
        #[case] expected: Vec<i32>,
    ) {
        let arrivals = vec![
            arrival::<ForwardCalculator>(28_800, 32_400, 1000, 2),
            // worse c1, better c2
            arrival::<ForwardCalculator>(28_800, 32_400, 1200, 1),
            // dominated by the first one
            arrival::<ForwardCalculator>(28_800, 32_400, 1300, 2),
        ];
        let c1: Vec<_> = kept::<ForwardCalculator>(ParetoSetTime::UseTimetable, cost, arrivals)
            .into_iter()
            .map(|(_, _, c1)| c1)
            .collect();
        assert_eq!(c1, expected);
    }
}
