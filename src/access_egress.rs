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

use std::collections::BTreeMap;
use tracing::warn;

use crate::engine::pareto_set::ParetoSet;
use crate::time::{Duration, Time, SECONDS_PER_DAY};
use crate::traits::StopIdx;

/// Daily window during which an access or egress leg may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    /// seconds since the start of the day
    pub open: Time,
    /// seconds since the start of the day, inclusive
    pub close: Time,
}

impl OpeningHours {
    /// Returns `None` if `open` is after `close` or outside of a day.
    pub fn new(open: Time, close: Time) -> Option<Self> {
        if open < 0 || open > close || close >= SECONDS_PER_DAY {
            return None;
        }
        Some(Self { open, close })
    }

    fn earliest_opening_from(&self, time: Time) -> Time {
        let day_start = time.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
        let time_of_day = time - day_start;
        if time_of_day < self.open {
            day_start + self.open
        } else if time_of_day <= self.close {
            time
        } else {
            day_start + SECONDS_PER_DAY + self.open
        }
    }

    fn latest_opening_until(&self, time: Time) -> Time {
        let day_start = time.div_euclid(SECONDS_PER_DAY) * SECONDS_PER_DAY;
        let time_of_day = time - day_start;
        if time_of_day > self.close {
            day_start + self.close
        } else if time_of_day >= self.open {
            time
        } else {
            day_start - SECONDS_PER_DAY + self.close
        }
    }
}

/// A street leg between the origin (resp. destination) and a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaptorAccessEgress {
    pub stop: StopIdx,
    pub duration: Duration,
    pub c1: i32,
    /// number of transit rides included in the leg, for flex legs
    pub number_of_rides: usize,
    /// `true` when the leg ends at the stop on board a vehicle
    pub stop_reached_on_board: bool,
    pub opening_hours: Option<OpeningHours>,
}

impl RaptorAccessEgress {
    pub fn walk(stop: StopIdx, duration: Duration, c1: i32) -> Self {
        Self {
            stop,
            duration,
            c1,
            number_of_rides: 0,
            stop_reached_on_board: false,
            opening_hours: None,
        }
    }

    pub fn flex(stop: StopIdx, duration: Duration, c1: i32, number_of_rides: usize) -> Self {
        Self {
            stop,
            duration,
            c1,
            number_of_rides,
            stop_reached_on_board: true,
            opening_hours: None,
        }
    }

    pub fn with_opening_hours(mut self, opening_hours: OpeningHours) -> Self {
        self.opening_hours = Some(opening_hours);
        self
    }

    pub fn has_rides(&self) -> bool {
        self.number_of_rides > 0
    }

    pub fn stop_reached_on_foot(&self) -> bool {
        !self.stop_reached_on_board
    }

    /// The earliest time, at or after `requested_departure_time`, the leg
    /// can start.
    pub fn earliest_departure_time(&self, requested_departure_time: Time) -> Time {
        match &self.opening_hours {
            None => requested_departure_time,
            Some(opening_hours) => opening_hours.earliest_opening_from(requested_departure_time),
        }
    }

    /// The latest time, at or before `requested_arrival_time`, the leg can
    /// end given that it must start within its opening hours.
    pub fn latest_arrival_time(&self, requested_arrival_time: Time) -> Time {
        match &self.opening_hours {
            None => requested_arrival_time,
            Some(opening_hours) => {
                opening_hours.latest_opening_until(requested_arrival_time - self.duration)
                    + self.duration
            }
        }
    }
}

/// `true` if `left` is better than `right` on at least one of the criteria
/// used by a single criterion search.
fn standard_dominance(left: &RaptorAccessEgress, right: &RaptorAccessEgress) -> bool {
    (left.stop_reached_on_board && right.stop_reached_on_foot())
        || (left.opening_hours.is_none() && right.opening_hours.is_some())
        || left.number_of_rides < right.number_of_rides
        || left.duration < right.duration
}

fn mc_dominance(left: &RaptorAccessEgress, right: &RaptorAccessEgress) -> bool {
    standard_dominance(left, right) || left.c1 < right.c1
}

/// Keep, for every stop, the access/egress paths optimal on duration, number
/// of rides, on-board arrival and opening hours.
pub fn remove_non_optimal_paths_for_standard_raptor(
    paths: Vec<RaptorAccessEgress>,
) -> Vec<RaptorAccessEgress> {
    remove_non_optimal_paths(paths, standard_dominance)
}

/// Same as [`remove_non_optimal_paths_for_standard_raptor`] with the cost
/// `c1` as an additional criterion.
pub fn remove_non_optimal_paths_for_mc_raptor(
    paths: Vec<RaptorAccessEgress>,
) -> Vec<RaptorAccessEgress> {
    remove_non_optimal_paths(paths, mc_dominance)
}

fn remove_non_optimal_paths(
    paths: Vec<RaptorAccessEgress>,
    dominance: fn(&RaptorAccessEgress, &RaptorAccessEgress) -> bool,
) -> Vec<RaptorAccessEgress> {
    let nb_of_paths = paths.len();
    let mut by_stop: BTreeMap<StopIdx, ParetoSet<RaptorAccessEgress, _>> = BTreeMap::new();
    for path in paths {
        by_stop
            .entry(path.stop)
            .or_insert_with(|| ParetoSet::new(dominance))
            .add(path);
    }
    let result: Vec<RaptorAccessEgress> = by_stop
        .into_values()
        .flat_map(|set| set.into_vec())
        .collect();

    // Upstream street routing is expected to hand over optimal paths only.
    if result.len() < nb_of_paths {
        warn!(
            "{} access/egress paths out of {} were removed as duplicated or not optimal",
            nb_of_paths - result.len(),
            nb_of_paths
        );
    }
    result
}

/// Group the paths matching `filter` by number of rides : the paths with
/// `n` rides are at index `n` of the result.
pub fn group_by_round<F>(paths: &[RaptorAccessEgress], filter: F) -> Vec<Vec<RaptorAccessEgress>>
where
    F: Fn(&RaptorAccessEgress) -> bool,
{
    let mut groups: Vec<Vec<RaptorAccessEgress>> = Vec::new();
    for path in paths.iter().filter(|path| filter(path)) {
        if groups.len() <= path.number_of_rides {
            groups.resize_with(path.number_of_rides + 1, Vec::new);
        }
        groups[path.number_of_rides].push(path.clone());
    }
    groups
}
