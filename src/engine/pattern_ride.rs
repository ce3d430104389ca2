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

use std::marker::PhantomData;

use crate::engine::pareto_set::ParetoComparator;
use crate::engine::stop_arrival::{ArrivalRef, C2Dominance};
use crate::engine::time_calculator::TimeCalculator;
use crate::time::Time;
use crate::traits::{StopIdx, TransferConstraint, TripSchedule};

/// A passenger on board a trip of the pattern being routed.
#[derive(Debug, Clone)]
pub struct PatternRide<T> {
    pub previous: ArrivalRef<T>,
    pub trip: T,
    pub board_stop: StopIdx,
    pub board_pos: usize,
    pub board_time: Time,
    pub board_c1: i32,
    /// only meaningful between rides of the same pattern and round
    pub relative_c1: i32,
    pub c2: i32,
    pub constraint: Option<TransferConstraint>,
}

impl<T: Clone> PatternRide<T> {
    pub fn with_c2(&self, c2: i32) -> Self {
        Self {
            c2,
            ..self.clone()
        }
    }
}

/// Rides on an earlier trip dominate, then lower relative cost, then `c2`.
pub struct PatternRideComparator<C> {
    c2_dominance: Option<C2Dominance>,
    _calculator: PhantomData<C>,
}

impl<C> PatternRideComparator<C> {
    pub fn new(c2_dominance: Option<C2Dominance>) -> Self {
        Self {
            c2_dominance,
            _calculator: PhantomData,
        }
    }
}

impl<C> Clone for PatternRideComparator<C> {
    fn clone(&self) -> Self {
        Self::new(self.c2_dominance)
    }
}

impl<C: TimeCalculator, T: TripSchedule> ParetoComparator<PatternRide<T>>
    for PatternRideComparator<C>
{
    fn left_dominance_exist(&self, left: &PatternRide<T>, right: &PatternRide<T>) -> bool {
        let left_trip = left.trip.trip_sort_index();
        let right_trip = right.trip.trip_sort_index();
        let earlier_trip = if C::search_forward() {
            left_trip < right_trip
        } else {
            left_trip > right_trip
        };
        earlier_trip
            || left.relative_c1 < right.relative_c1
            || self
                .c2_dominance
                .map_or(false, |dominance| dominance(left.c2, right.c2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pareto_set::ParetoSet;
    use crate::engine::stop_arrival::tests::access_arrival;
    use crate::engine::time_calculator::{ForwardCalculator, ReverseCalculator};
    use crate::transit_data::TripTimes;

    fn ride(sort_index: usize, relative_c1: i32, c2: i32) -> PatternRide<TripTimes> {
        PatternRide {
            previous: access_arrival(0, 0, 0),
            trip: TripTimes::new("trip", 0, sort_index, vec![0, 10], vec![0, 10]),
            board_stop: 0,
            board_pos: 0,
            board_time: 0,
            board_c1: relative_c1,
            relative_c1,
            c2,
            constraint: None,
        }
    }

    #[test]
    fn later_trip_needs_a_better_relative_cost() {
        let mut rides = ParetoSet::new(PatternRideComparator::<ForwardCalculator>::new(None));
        assert!(rides.add(ride(0, 100, 0)));
        assert!(!rides.add(ride(1, 150, 0)));
        assert!(rides.add(ride(1, 50, 0)));
        assert_eq!(rides.len(), 2);

        let mut reverse = ParetoSet::new(PatternRideComparator::<ReverseCalculator>::new(None));
        assert!(reverse.add(ride(0, 100, 0)));
        assert!(reverse.add(ride(1, 50, 0)));
        assert_eq!(reverse.len(), 1);
    }

    #[test]
    fn c2_is_a_criteria_only_with_a_dominance_function() {
        let greater: C2Dominance = |left, right| left > right;
        let mut rides = ParetoSet::new(PatternRideComparator::<ForwardCalculator>::new(Some(greater)));
        assert!(rides.add(ride(0, 100, 0)));
        assert!(rides.add(ride(0, 120, 1)));
        assert_eq!(rides.len(), 2);
        assert_eq!(ride(0, 100, 0).with_c2(3).c2, 3);
    }
}
