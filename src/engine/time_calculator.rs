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

use std::fmt::Debug;

use crate::access_egress::RaptorAccessEgress;
use crate::config::{ResolvedSearchParams, SearchDirection};
use crate::time::{Duration, Time};
use crate::traits::{
    ConstrainedTransfer, RaptorTransfer, RouteIdx, RoutePattern, StopIdx, TransferPoint,
    TransitDataProvider, TripSchedule,
};

/// Time arithmetic in the direction of the search.
///
/// The engine is written once against this trait : a forward search walks
/// the time line from the earliest departure time to the future, a
/// reverse search walks it from the latest arrival time to the past.
pub trait TimeCalculator: Copy + Debug + Default + 'static {
    const DIRECTION: SearchDirection;

    fn search_forward() -> bool {
        Self::DIRECTION.is_forward()
    }

    fn plus_duration(time: Time, duration: Duration) -> Time;

    fn minus_duration(time: Time, duration: Duration) -> Time;

    /// Duration from `from` to `to`, in search direction.
    fn duration(from: Time, to: Time) -> Duration;

    /// Returns `true` if `first` comes strictly before `second` in search
    /// direction.
    fn is_before(first: Time, second: Time) -> bool;

    fn is_after(first: Time, second: Time) -> bool {
        Self::is_before(second, first)
    }

    /// The time of a stop that is not reached, after every other time in
    /// search direction.
    fn unreached_time() -> Time;

    /// Returns `true` if `time` is after `limit` in search direction.
    fn exceeds_time_limit(time: Time, limit: Time) -> bool {
        Self::is_after(time, limit)
    }

    /// Departure times of the range raptor iterations, in the order they
    /// are run : the iterations starting the furthest from the search start
    /// come first so that their results can be reused.
    fn iteration_times(search: &ResolvedSearchParams, step: Duration) -> Vec<Time>;

    /// The time the search starts from.
    fn search_start(search: &ResolvedSearchParams) -> Time;

    /// `stop_pos` of the `index`th position visited on a route with
    /// `nb_of_positions` stops.
    fn stop_pos_in_search_order(nb_of_positions: usize, index: usize) -> usize;
}

/// Direction aware access to the trips, transfers and street legs.
pub trait TransitCalculator: TimeCalculator {
    /// The time the trip leaves `stop_pos` in search direction.
    fn board_time<T: TripSchedule>(trip: &T, stop_pos: usize) -> Time;

    /// The time the trip reaches `stop_pos` in search direction.
    fn alight_time<T: TripSchedule>(trip: &T, stop_pos: usize) -> Time;

    /// `true` if passengers can board at `stop_pos` in search direction.
    fn board_allowed(pattern: &RoutePattern, stop_pos: usize) -> bool;

    /// `true` if passengers can alight at `stop_pos` in search direction.
    fn alight_allowed(pattern: &RoutePattern, stop_pos: usize) -> bool;

    /// Index in `trips` of the first trip in search direction leaving
    /// `stop_pos` at or after `earliest_board_time`.
    fn find_trip<T: TripSchedule>(
        trips: &[T],
        stop_pos: usize,
        earliest_board_time: Time,
    ) -> Option<usize>;

    fn transfers<D: TransitDataProvider>(data: &D, stop: StopIdx) -> &[RaptorTransfer];

    /// Constrained transfers towards `route` at `stop_pos`, in search
    /// direction.
    fn constrained_transfers<D: TransitDataProvider>(
        data: &D,
        route: RouteIdx,
        stop_pos: usize,
    ) -> &[ConstrainedTransfer];

    /// The side of `transfer` the passenger comes from, in search direction.
    fn constraint_source(transfer: &ConstrainedTransfer) -> &TransferPoint;

    /// The side of `transfer` the passenger goes to, in search direction.
    fn constraint_target(transfer: &ConstrainedTransfer) -> &TransferPoint;

    /// Time at the end of `leg` when starting it at `time` or later.
    fn leg_arrival_time(leg: &RaptorAccessEgress, time: Time) -> Time;

    /// Time at the end of `leg` starting it as late as possible while
    /// still reaching its end no later than `limit`.
    fn latest_leg_arrival_time(leg: &RaptorAccessEgress, limit: Time) -> Time;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardCalculator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReverseCalculator;

fn nb_of_iterations(search_window: Duration, step: Duration) -> i32 {
    if search_window <= 0 {
        1
    } else {
        (search_window + step - 1) / step
    }
}

impl TimeCalculator for ForwardCalculator {
    const DIRECTION: SearchDirection = SearchDirection::Forward;

    fn plus_duration(time: Time, duration: Duration) -> Time {
        time + duration
    }

    fn minus_duration(time: Time, duration: Duration) -> Time {
        time - duration
    }

    fn duration(from: Time, to: Time) -> Duration {
        to - from
    }

    fn is_before(first: Time, second: Time) -> bool {
        first < second
    }

    fn unreached_time() -> Time {
        Time::MAX
    }

    fn iteration_times(search: &ResolvedSearchParams, step: Duration) -> Vec<Time> {
        let start = search.earliest_departure_time;
        (0..nb_of_iterations(search.search_window, step))
            .rev()
            .map(|idx| start + idx * step)
            .collect()
    }

    fn search_start(search: &ResolvedSearchParams) -> Time {
        search.earliest_departure_time
    }

    fn stop_pos_in_search_order(_nb_of_positions: usize, index: usize) -> usize {
        index
    }
}

impl TimeCalculator for ReverseCalculator {
    const DIRECTION: SearchDirection = SearchDirection::Reverse;

    fn plus_duration(time: Time, duration: Duration) -> Time {
        time - duration
    }

    fn minus_duration(time: Time, duration: Duration) -> Time {
        time + duration
    }

    fn duration(from: Time, to: Time) -> Duration {
        from - to
    }

    fn is_before(first: Time, second: Time) -> bool {
        first > second
    }

    fn unreached_time() -> Time {
        Time::MIN
    }

    fn iteration_times(search: &ResolvedSearchParams, step: Duration) -> Vec<Time> {
        let start = search.latest_arrival_time;
        (0..nb_of_iterations(search.search_window, step))
            .rev()
            .map(|idx| start - idx * step)
            .collect()
    }

    fn search_start(search: &ResolvedSearchParams) -> Time {
        search.latest_arrival_time
    }

    fn stop_pos_in_search_order(nb_of_positions: usize, index: usize) -> usize {
        nb_of_positions - 1 - index
    }
}

impl TransitCalculator for ForwardCalculator {
    fn board_allowed(pattern: &RoutePattern, stop_pos: usize) -> bool {
        pattern.can_board(stop_pos)
    }

    fn alight_allowed(pattern: &RoutePattern, stop_pos: usize) -> bool {
        pattern.can_alight(stop_pos)
    }

    fn board_time<T: TripSchedule>(trip: &T, stop_pos: usize) -> Time {
        trip.departure(stop_pos)
    }

    fn alight_time<T: TripSchedule>(trip: &T, stop_pos: usize) -> Time {
        trip.arrival(stop_pos)
    }

    fn find_trip<T: TripSchedule>(
        trips: &[T],
        stop_pos: usize,
        earliest_board_time: Time,
    ) -> Option<usize> {
        let idx = trips.partition_point(|trip| trip.departure(stop_pos) < earliest_board_time);
        if idx < trips.len() {
            Some(idx)
        } else {
            None
        }
    }

    fn transfers<D: TransitDataProvider>(data: &D, stop: StopIdx) -> &[RaptorTransfer] {
        data.transfers_from_stop(stop)
    }

    fn constrained_transfers<D: TransitDataProvider>(
        data: &D,
        route: RouteIdx,
        stop_pos: usize,
    ) -> &[ConstrainedTransfer] {
        data.constrained_transfers_to(route, stop_pos)
    }

    fn constraint_source(transfer: &ConstrainedTransfer) -> &TransferPoint {
        &transfer.from
    }

    fn constraint_target(transfer: &ConstrainedTransfer) -> &TransferPoint {
        &transfer.to
    }

    fn leg_arrival_time(leg: &RaptorAccessEgress, time: Time) -> Time {
        leg.earliest_departure_time(time) + leg.duration
    }

    fn latest_leg_arrival_time(leg: &RaptorAccessEgress, limit: Time) -> Time {
        leg.latest_arrival_time(limit)
    }
}

impl TransitCalculator for ReverseCalculator {
    fn board_allowed(pattern: &RoutePattern, stop_pos: usize) -> bool {
        pattern.can_alight(stop_pos)
    }

    fn alight_allowed(pattern: &RoutePattern, stop_pos: usize) -> bool {
        pattern.can_board(stop_pos)
    }

    fn board_time<T: TripSchedule>(trip: &T, stop_pos: usize) -> Time {
        trip.arrival(stop_pos)
    }

    fn alight_time<T: TripSchedule>(trip: &T, stop_pos: usize) -> Time {
        trip.departure(stop_pos)
    }

    fn find_trip<T: TripSchedule>(
        trips: &[T],
        stop_pos: usize,
        earliest_board_time: Time,
    ) -> Option<usize> {
        let idx = trips.partition_point(|trip| trip.arrival(stop_pos) <= earliest_board_time);
        idx.checked_sub(1)
    }

    fn transfers<D: TransitDataProvider>(data: &D, stop: StopIdx) -> &[RaptorTransfer] {
        data.transfers_to_stop(stop)
    }

    fn constrained_transfers<D: TransitDataProvider>(
        data: &D,
        route: RouteIdx,
        stop_pos: usize,
    ) -> &[ConstrainedTransfer] {
        data.constrained_transfers_from(route, stop_pos)
    }

    fn constraint_source(transfer: &ConstrainedTransfer) -> &TransferPoint {
        &transfer.to
    }

    fn constraint_target(transfer: &ConstrainedTransfer) -> &TransferPoint {
        &transfer.from
    }

    fn leg_arrival_time(leg: &RaptorAccessEgress, time: Time) -> Time {
        leg.latest_arrival_time(time) - leg.duration
    }

    fn latest_leg_arrival_time(leg: &RaptorAccessEgress, limit: Time) -> Time {
        leg.earliest_departure_time(limit)
    }
}
