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

use crate::engine::stop_arrival::C2Dominance;
use crate::traits::StopIdx;

/// Defines the secondary criterion `c2` as the progress along ordered
/// groups of pass-through stops.
pub trait PassThroughPointsService {
    /// `true` for the service used when the request has no pass-through
    /// point. Such a service must not be called otherwise.
    fn is_noop(&self) -> bool;

    fn is_pass_through_point(&self, stop: StopIdx) -> bool;

    /// The `c2` of a ride reaching `stop` with `c2`, or `None` if it does not
    /// change.
    fn update_c2(&self, c2: i32, stop: StopIdx) -> Option<i32>;

    /// `true` if a path with `c2` went through every group in order.
    fn accept_c2_at_destination(&self, c2: i32) -> bool;

    fn dominance_function(&self) -> C2Dominance;

    /// The `c2` of the paths before any pass-through point.
    fn initial_c2(&self) -> i32;
}

/// The service used when the request has no pass-through point.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPassThroughPointsService;

impl PassThroughPointsService for NoopPassThroughPointsService {
    fn is_noop(&self) -> bool {
        true
    }

    fn is_pass_through_point(&self, _stop: StopIdx) -> bool {
        panic!("No pass-through point is defined, `is_pass_through_point` must not be called")
    }

    fn update_c2(&self, _c2: i32, _stop: StopIdx) -> Option<i32> {
        panic!("No pass-through point is defined, `update_c2` must not be called")
    }

    fn accept_c2_at_destination(&self, _c2: i32) -> bool {
        panic!("No pass-through point is defined, `accept_c2_at_destination` must not be called")
    }

    fn dominance_function(&self) -> C2Dominance {
        panic!("No pass-through point is defined, `dominance_function` must not be called")
    }

    fn initial_c2(&self) -> i32 {
        panic!("No pass-through point is defined, `initial_c2` must not be called")
    }
}

/// `c2` counts the groups of stops visited in order, a greater `c2` is
/// better.
#[derive(Debug, Clone)]
pub struct BitSetPassThroughPointsService {
    groups: Vec<FixedBitSet>,
    all_points: FixedBitSet,
}

fn greater_c2_is_better(left: i32, right: i32) -> bool {
    left > right
}

impl BitSetPassThroughPointsService {
    /// Each group is a set of alternative stops, the groups must be visited
    /// in the given order.
    pub fn new(groups: &[Vec<StopIdx>], nb_of_stops: usize) -> Self {
        let mut all_points = FixedBitSet::with_capacity(nb_of_stops);
        let groups = groups
            .iter()
            .map(|stops| {
                let mut group = FixedBitSet::with_capacity(nb_of_stops);
                for stop in stops {
                    group.insert(*stop);
                    all_points.insert(*stop);
                }
                group
            })
            .collect();
        Self { groups, all_points }
    }

    pub fn nb_of_groups(&self) -> usize {
        self.groups.len()
    }

    /// The same groups, visited in reverse order.
    pub fn reversed(&self) -> Self {
        Self {
            groups: self.groups.iter().rev().cloned().collect(),
            all_points: self.all_points.clone(),
        }
    }
}

impl PassThroughPointsService for BitSetPassThroughPointsService {
    fn is_noop(&self) -> bool {
        false
    }

    fn is_pass_through_point(&self, stop: StopIdx) -> bool {
        self.all_points.contains(stop)
    }

    fn update_c2(&self, c2: i32, stop: StopIdx) -> Option<i32> {
        let mut next = c2;
        while let Some(group) = usize::try_from(next).ok().and_then(|idx| self.groups.get(idx)) {
            if !group.contains(stop) {
                break;
            }
            next += 1;
        }
        if next != c2 {
            Some(next)
        } else {
            None
        }
    }

    fn accept_c2_at_destination(&self, c2: i32) -> bool {
        usize::try_from(c2).map_or(false, |c2| c2 == self.groups.len())
    }

    fn dominance_function(&self) -> C2Dominance {
        greater_c2_is_better
    }

    fn initial_c2(&self) -> i32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c2_counts_groups_visited_in_order() {
        let service = BitSetPassThroughPointsService::new(&[vec![1, 2], vec![3], vec![3, 4]], 6);
        assert!(!service.is_noop());
        assert!(service.is_pass_through_point(2));
        assert!(!service.is_pass_through_point(5));

        assert_eq!(service.update_c2(0, 3), None);
        assert_eq!(service.update_c2(0, 2), Some(1));
        // stop 3 belongs to the two last groups
        assert_eq!(service.update_c2(1, 3), Some(3));
        assert_eq!(service.update_c2(3, 4), None);

        assert!(service.accept_c2_at_destination(3));
        assert!(!service.accept_c2_at_destination(2));
        assert!((service.dominance_function())(3, 2));

        let reversed = service.reversed();
        assert_eq!(reversed.update_c2(0, 4), Some(1));
    }

    #[test]
    #[should_panic]
    fn noop_service_fails_fast() {
        let service = NoopPassThroughPointsService;
        assert!(service.is_noop());
        service.update_c2(0, 0);
    }
}
