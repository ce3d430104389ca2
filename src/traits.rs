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
use std::fmt::Debug;

use crate::time::{Duration, Time};

/// Index of a stop in the transit data.
pub type StopIdx = usize;

/// Index of a route (a stop pattern with its timetable) in the transit data.
pub type RouteIdx = usize;

/// A vehicle journey as seen by the search.
///
/// Cloning must be cheap : rides and stop arrivals keep a copy of the trip
/// they were made with.
pub trait TripSchedule: Debug + Clone {
    /// The route this trip belongs to.
    fn route_index(&self) -> RouteIdx;

    /// Position of the trip in the timetable of its route.
    /// Trips of a route never overtake each other, so a smaller index means
    /// an earlier trip at every stop.
    fn trip_sort_index(&self) -> usize;

    /// Panics if `stop_pos` is not a position of the route of this trip.
    fn arrival(&self, stop_pos: usize) -> Time;

    /// Panics if `stop_pos` is not a position of the route of this trip.
    fn departure(&self, stop_pos: usize) -> Time;
}

/// The ordered sequence of stops served by the trips of a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    pub name: String,
    pub stops: Vec<StopIdx>,
    pub board_allowed: Vec<bool>,
    pub alight_allowed: Vec<bool>,
    /// index used by the slack provider to pick the board and alight slack
    pub slack_index: usize,
}

impl RoutePattern {
    pub fn nb_of_positions(&self) -> usize {
        self.stops.len()
    }

    pub fn stop_at(&self, stop_pos: usize) -> StopIdx {
        self.stops[stop_pos]
    }

    pub fn can_board(&self, stop_pos: usize) -> bool {
        self.board_allowed[stop_pos]
    }

    pub fn can_alight(&self, stop_pos: usize) -> bool {
        self.alight_allowed[stop_pos]
    }
}

/// A foot path between two stops.
///
/// Stored twice by the providers : once in the list of transfers leaving
/// the source stop, where `stop` is the target, and once in the list of
/// transfers reaching the target stop, where `stop` is the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaptorTransfer {
    pub stop: StopIdx,
    pub duration: Duration,
    pub c1: i32,
}

/// Rules applied when transferring between two given trips (or routes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferConstraint {
    /// the passenger stays in the vehicle
    pub stay_seated: bool,
    /// the outgoing trip waits for the incoming one
    pub guaranteed: bool,
    pub not_allowed: bool,
    /// overrides the regular slack between the two trips
    pub min_transfer_time: Option<Duration>,
}

impl TransferConstraint {
    pub fn not_allowed() -> Self {
        Self {
            not_allowed: true,
            ..Default::default()
        }
    }

    pub fn stay_seated() -> Self {
        Self {
            stay_seated: true,
            ..Default::default()
        }
    }

    pub fn guaranteed() -> Self {
        Self {
            guaranteed: true,
            ..Default::default()
        }
    }

    pub fn with_min_transfer_time(duration: Duration) -> Self {
        Self {
            min_transfer_time: Some(duration),
            ..Default::default()
        }
    }

    /// Stay-seated and guaranteed transfers skip the slack and the
    /// transfer cost.
    pub fn is_facilitated(&self) -> bool {
        self.stay_seated || self.guaranteed
    }
}

/// One end of a constrained transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPoint {
    pub route: RouteIdx,
    /// `None` matches every trip of the route
    pub trip: Option<usize>,
    pub stop_pos: usize,
    pub stop: StopIdx,
}

impl TransferPoint {
    pub fn matches<T: TripSchedule>(&self, trip: &T, stop: StopIdx) -> bool {
        self.route == trip.route_index()
            && self.stop == stop
            && self.trip.map_or(true, |idx| idx == trip.trip_sort_index())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstrainedTransfer {
    pub from: TransferPoint,
    pub to: TransferPoint,
    pub constraint: TransferConstraint,
}

/// The read-only transit network a search runs on.
///
/// A provider is shared between searches running on different threads,
/// the engine only ever borrows it.
pub trait TransitDataProvider {
    type Trip: TripSchedule;

    fn nb_of_stops(&self) -> usize;

    fn nb_of_routes(&self) -> usize;

    /// Panics if `route` does not exist.
    fn pattern(&self, route: RouteIdx) -> &RoutePattern;

    /// Trips of `route` sorted by departure time.
    ///
    /// Panics if `route` does not exist.
    fn trips(&self, route: RouteIdx) -> &[Self::Trip];

    /// Set in `routes` every route serving at least one stop of `stops`.
    fn routes_touching_stops(&self, stops: &FixedBitSet, routes: &mut FixedBitSet);

    fn transfers_from_stop(&self, stop: StopIdx) -> &[RaptorTransfer];

    fn transfers_to_stop(&self, stop: StopIdx) -> &[RaptorTransfer];

    /// Constrained transfers boarding `route` at `stop_pos`.
    fn constrained_transfers_to(&self, route: RouteIdx, stop_pos: usize) -> &[ConstrainedTransfer];

    /// Constrained transfers alighting from `route` at `stop_pos`.
    fn constrained_transfers_from(&self, route: RouteIdx, stop_pos: usize)
        -> &[ConstrainedTransfer];

    fn has_constrained_transfers(&self) -> bool;

    fn stop_name(&self, stop: StopIdx) -> &str;
}
