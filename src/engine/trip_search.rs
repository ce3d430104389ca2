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

use crate::engine::time_calculator::TransitCalculator;
use crate::time::{Duration, Time};
use crate::traits::TripSchedule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripSearchResult {
    /// index of the trip in the timetable of its route
    pub trip_index: usize,
    /// board time of the trip, in search direction
    pub time: Time,
}

/// How boardable trips are looked up in a timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripSearch {
    /// the first trip leaving at or after the limit
    Regular,
    /// the first trip leaving at or after the limit, but only if it leaves
    /// before `limit + slack`
    ExactMatch { slack: Duration },
}

impl TripSearch {
    pub fn search<C: TransitCalculator, T: TripSchedule>(
        &self,
        trips: &[T],
        stop_pos: usize,
        earliest_board_time: Time,
    ) -> Option<TripSearchResult> {
        let result = board_search::<C, T>(trips, stop_pos, earliest_board_time)?;
        match self {
            TripSearch::Regular => Some(result),
            TripSearch::ExactMatch { slack } => {
                let latest = C::plus_duration(earliest_board_time, *slack);
                if C::is_before(result.time, latest) {
                    Some(result)
                } else {
                    None
                }
            }
        }
    }
}

pub fn board_search<C: TransitCalculator, T: TripSchedule>(
    trips: &[T],
    stop_pos: usize,
    earliest_board_time: Time,
) -> Option<TripSearchResult> {
    let trip_index = C::find_trip(trips, stop_pos, earliest_board_time)?;
    Some(TripSearchResult {
        trip_index,
        time: C::board_time(&trips[trip_index], stop_pos),
    })
}
