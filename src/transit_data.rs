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
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::time::Time;
use crate::traits::{
    ConstrainedTransfer, RaptorTransfer, RouteIdx, RoutePattern, StopIdx, TransferPoint,
    TransitDataProvider, TripSchedule,
};

/// Arrival and departure times of a trip at each position of its route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripTimes {
    name: Arc<str>,
    route: RouteIdx,
    sort_index: usize,
    arrivals: Arc<[Time]>,
    departures: Arc<[Time]>,
}

impl TripTimes {
    pub fn new(
        name: &str,
        route: RouteIdx,
        sort_index: usize,
        arrivals: Vec<Time>,
        departures: Vec<Time>,
    ) -> Self {
        Self {
            name: Arc::from(name),
            route,
            sort_index,
            arrivals: Arc::from(arrivals),
            departures: Arc::from(departures),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nb_of_positions(&self) -> usize {
        self.arrivals.len()
    }

    //    - Some(Less)    if self is at or before other at every position
    //    - Some(Greater) if self is at or after other at every position
    //    - None if the two trips overtake each other
    fn partial_cmp_times(&self, other: &TripTimes) -> Option<Ordering> {
        let pairs = self
            .arrivals
            .iter()
            .zip(other.arrivals.iter())
            .chain(self.departures.iter().zip(other.departures.iter()));
        let mut ordering = Ordering::Equal;
        for (mine, theirs) in pairs {
            match (ordering, mine.cmp(theirs)) {
                (_, Ordering::Equal) => {}
                (Ordering::Equal, cmp) => ordering = cmp,
                (current, cmp) if current != cmp => return None,
                _ => {}
            }
        }
        Some(ordering)
    }
}

impl TripSchedule for TripTimes {
    fn route_index(&self) -> RouteIdx {
        self.route
    }

    fn trip_sort_index(&self) -> usize {
        self.sort_index
    }

    fn arrival(&self, stop_pos: usize) -> Time {
        self.arrivals[stop_pos]
    }

    fn departure(&self, stop_pos: usize) -> Time {
        self.departures[stop_pos]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TripTimesError {
    #[error("Trip {trip} has {nb_of_times} times for a route of {nb_of_stops} stops")]
    BadNumberOfTimes {
        trip: String,
        nb_of_times: usize,
        nb_of_stops: usize,
    },
    #[error("Trip {trip} departs before it arrives at position {pos}")]
    DepartureBeforeArrival { trip: String, pos: usize },
    #[error("Trip {trip} arrives at position {next} before leaving position {pos}")]
    NextArrivalBeforeDeparture { trip: String, pos: usize, next: usize },
    #[error("A route needs at least two stops, got {0}")]
    TooFewStops(usize),
    #[error("Unknown stop {0}")]
    UnknownStop(String),
}

// check that
//  - arrivals[i] <= departures[i] for all i
//  - departures[i] <= arrivals[i+1] for all i < len - 1
fn check_trip_times(name: &str, arrivals: &[Time], departures: &[Time]) -> Result<(), TripTimesError> {
    for (pos, (arrival, departure)) in arrivals.iter().zip(departures.iter()).enumerate() {
        if departure < arrival {
            return Err(TripTimesError::DepartureBeforeArrival {
                trip: name.to_string(),
                pos,
            });
        }
        if let Some(next_arrival) = arrivals.get(pos + 1) {
            if next_arrival < departure {
                return Err(TripTimesError::NextArrivalBeforeDeparture {
                    trip: name.to_string(),
                    pos,
                    next: pos + 1,
                });
            }
        }
    }
    Ok(())
}

/// Key of a family of routes sharing a name and a stop pattern.
/// A family is split into several routes when its trips overtake each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PatternKey {
    name: String,
    stops: Vec<StopIdx>,
    board_allowed: Vec<bool>,
    alight_allowed: Vec<bool>,
}

/// In memory transit network.
#[derive(Debug, Default)]
pub struct TransitData {
    stop_names: Vec<String>,
    stop_name_to_idx: HashMap<String, StopIdx>,

    patterns: Vec<RoutePattern>,
    // trips of each route, ordered so that no trip overtakes the next one
    timetables: Vec<Vec<TripTimes>>,
    pattern_families: HashMap<PatternKey, Vec<RouteIdx>>,
    routes_of_stop: Vec<Vec<RouteIdx>>,

    transfers_from: Vec<Vec<RaptorTransfer>>,
    transfers_to: Vec<Vec<RaptorTransfer>>,

    constrained_by_target: HashMap<(RouteIdx, usize), Vec<ConstrainedTransfer>>,
    constrained_by_source: HashMap<(RouteIdx, usize), Vec<ConstrainedTransfer>>,
}

impl TransitData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of the stop named `name`, creating it if needed.
    pub fn add_stop(&mut self, name: &str) -> StopIdx {
        if let Some(idx) = self.stop_name_to_idx.get(name) {
            return *idx;
        }
        let idx = self.stop_names.len();
        self.stop_names.push(name.to_string());
        self.stop_name_to_idx.insert(name.to_string(), idx);
        self.routes_of_stop.push(Vec::new());
        self.transfers_from.push(Vec::new());
        self.transfers_to.push(Vec::new());
        idx
    }

    pub fn stop_idx(&self, name: &str) -> Option<StopIdx> {
        self.stop_name_to_idx.get(name).copied()
    }

    /// Routes named `name`, one per family member.
    pub fn routes_named(&self, name: &str) -> Vec<RouteIdx> {
        (0..self.patterns.len())
            .filter(|route| self.patterns[*route].name == name)
            .collect()
    }

    /// Returns `(route, trip sort index)` of the trip named `name`.
    pub fn find_trip(&self, name: &str) -> Option<(RouteIdx, usize)> {
        self.timetables.iter().enumerate().find_map(|(route, trips)| {
            trips
                .iter()
                .position(|trip| trip.name() == name)
                .map(|trip_idx| (route, trip_idx))
        })
    }

    /// Insert a trip in the first route of the family `route_name` / `stops`
    /// it does not overtake any trip of. A new route is created if there is
    /// no such route.
    #[allow(clippy::too_many_arguments)]
    pub fn add_trip(
        &mut self,
        route_name: &str,
        stops: &[StopIdx],
        board_allowed: &[bool],
        alight_allowed: &[bool],
        slack_index: usize,
        trip_name: &str,
        arrivals: Vec<Time>,
        departures: Vec<Time>,
    ) -> Result<RouteIdx, TripTimesError> {
        if stops.len() < 2 {
            return Err(TripTimesError::TooFewStops(stops.len()));
        }
        if let Some(stop) = stops.iter().find(|stop| **stop >= self.stop_names.len()) {
            return Err(TripTimesError::UnknownStop(stop.to_string()));
        }
        if arrivals.len() != stops.len() || departures.len() != stops.len() {
            return Err(TripTimesError::BadNumberOfTimes {
                trip: trip_name.to_string(),
                nb_of_times: arrivals.len().min(departures.len()),
                nb_of_stops: stops.len(),
            });
        }
        check_trip_times(trip_name, &arrivals, &departures)?;

        let key = PatternKey {
            name: route_name.to_string(),
            stops: stops.to_vec(),
            board_allowed: board_allowed.to_vec(),
            alight_allowed: alight_allowed.to_vec(),
        };
        let candidate = TripTimes::new(trip_name, 0, 0, arrivals, departures);
        let family = self.pattern_families.get(&key).cloned().unwrap_or_default();
        let compatible_route = family.into_iter().find(|route| {
            self.timetables[*route]
                .iter()
                .all(|trip| trip.partial_cmp_times(&candidate).is_some())
        });
        let route = match compatible_route {
            Some(route) => route,
            None => {
                let route = self.new_route(&key, slack_index);
                if self.pattern_families.contains_key(&key) {
                    debug!(
                        "Trip {} overtakes trips of route {}, a new route variant is created",
                        trip_name, route_name
                    );
                }
                self.pattern_families.entry(key).or_default().push(route);
                route
            }
        };

        let timetable = &mut self.timetables[route];
        let insert_at = timetable.partition_point(|trip| {
            trip.partial_cmp_times(&candidate) != Some(Ordering::Greater)
        });
        let trip = TripTimes {
            route,
            sort_index: insert_at,
            ..candidate
        };
        timetable.insert(insert_at, trip);
        for (sort_index, trip) in timetable.iter_mut().enumerate().skip(insert_at + 1) {
            trip.sort_index = sort_index;
        }
        self.shift_constrained_trips(route, insert_at);
        Ok(route)
    }

    // Constrained transfers point at trips by sort index, the ones after a
    // newly inserted trip move one place.
    fn shift_constrained_trips(&mut self, route: RouteIdx, insert_at: usize) {
        let shift = |point: &mut TransferPoint| {
            if point.route == route {
                if let Some(trip) = point.trip.as_mut() {
                    if *trip >= insert_at {
                        *trip += 1;
                    }
                }
            }
        };
        for transfers in self
            .constrained_by_target
            .values_mut()
            .chain(self.constrained_by_source.values_mut())
        {
            for transfer in transfers.iter_mut() {
                shift(&mut transfer.from);
                shift(&mut transfer.to);
            }
        }
    }

    fn new_route(&mut self, key: &PatternKey, slack_index: usize) -> RouteIdx {
        let route = self.patterns.len();
        self.patterns.push(RoutePattern {
            name: key.name.clone(),
            stops: key.stops.clone(),
            board_allowed: key.board_allowed.clone(),
            alight_allowed: key.alight_allowed.clone(),
            slack_index,
        });
        self.timetables.push(Vec::new());
        for stop in &key.stops {
            let routes = &mut self.routes_of_stop[*stop];
            if !routes.contains(&route) {
                routes.push(route);
            }
        }
        route
    }

    pub fn add_transfer(&mut self, from: StopIdx, to: StopIdx, duration: Time, c1: i32) {
        self.transfers_from[from].push(RaptorTransfer {
            stop: to,
            duration,
            c1,
        });
        self.transfers_to[to].push(RaptorTransfer {
            stop: from,
            duration,
            c1,
        });
    }

    /// Trips of `transfer` are given by sort index, they keep pointing at the
    /// same trips when other trips are added afterwards.
    pub fn add_constrained_transfer(&mut self, transfer: ConstrainedTransfer) {
        self.constrained_by_target
            .entry((transfer.to.route, transfer.to.stop_pos))
            .or_default()
            .push(transfer);
        self.constrained_by_source
            .entry((transfer.from.route, transfer.from.stop_pos))
            .or_default()
            .push(transfer);
    }
}

impl TransitDataProvider for TransitData {
    type Trip = TripTimes;

    fn nb_of_stops(&self) -> usize {
        self.stop_names.len()
    }

    fn nb_of_routes(&self) -> usize {
        self.patterns.len()
    }

    fn pattern(&self, route: RouteIdx) -> &RoutePattern {
        &self.patterns[route]
    }

    fn trips(&self, route: RouteIdx) -> &[TripTimes] {
        &self.timetables[route]
    }

    fn routes_touching_stops(&self, stops: &FixedBitSet, routes: &mut FixedBitSet) {
        for stop in stops.ones() {
            for route in &self.routes_of_stop[stop] {
                routes.insert(*route);
            }
        }
    }

    fn transfers_from_stop(&self, stop: StopIdx) -> &[RaptorTransfer] {
        &self.transfers_from[stop]
    }

    fn transfers_to_stop(&self, stop: StopIdx) -> &[RaptorTransfer] {
        &self.transfers_to[stop]
    }

    fn constrained_transfers_to(&self, route: RouteIdx, stop_pos: usize) -> &[ConstrainedTransfer] {
        self.constrained_by_target
            .get(&(route, stop_pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn constrained_transfers_from(
        &self,
        route: RouteIdx,
        stop_pos: usize,
    ) -> &[ConstrainedTransfer] {
        self.constrained_by_source
            .get(&(route, stop_pos))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn has_constrained_transfers(&self) -> bool {
        !self.constrained_by_target.is_empty()
    }

    fn stop_name(&self, stop: StopIdx) -> &str {
        &self.stop_names[stop]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::TransferConstraint;

    fn data_with_stops() -> TransitData {
        let mut data = TransitData::new();
        for name in ["A", "B", "C"] {
            data.add_stop(name);
        }
        data
    }

    fn add(data: &mut TransitData, name: &str, times: [Time; 3]) -> Result<RouteIdx, TripTimesError> {
        data.add_trip(
            "R",
            &[0, 1, 2],
            &[true; 3],
            &[true; 3],
            0,
            name,
            times.to_vec(),
            times.to_vec(),
        )
    }

    #[test]
    fn trips_are_sorted_and_overtaking_trips_split_the_route() {
        let mut data = data_with_stops();
        let first = add(&mut data, "late", [200, 300, 400]).unwrap();
        assert_eq!(add(&mut data, "early", [100, 200, 300]).unwrap(), first);
        let trips = data.trips(first);
        assert_eq!(trips[0].name(), "early");
        assert_eq!(trips[0].trip_sort_index(), 0);
        assert_eq!(trips[1].trip_sort_index(), 1);

        // departs after "early" but arrives before it
        let express = add(&mut data, "express", [150, 160, 170]).unwrap();
        assert_ne!(express, first);
        assert_eq!(data.routes_named("R"), vec![first, express]);
        assert_eq!(data.find_trip("express"), Some((express, 0)));

        let mut stops = FixedBitSet::with_capacity(3);
        stops.insert(1);
        let mut routes = FixedBitSet::with_capacity(data.nb_of_routes());
        data.routes_touching_stops(&stops, &mut routes);
        assert_eq!(routes.ones().collect::<Vec<_>>(), vec![first, express]);
    }

    #[test]
    fn constrained_transfers_follow_their_trips() {
        let mut data = data_with_stops();
        let route = add(&mut data, "first", [100, 200, 300]).unwrap();
        add(&mut data, "second", [400, 500, 600]).unwrap();
        let point = |trip| TransferPoint {
            route,
            trip: Some(trip),
            stop_pos: 1,
            stop: 1,
        };
        data.add_constrained_transfer(ConstrainedTransfer {
            from: point(0),
            to: point(1),
            constraint: TransferConstraint::stay_seated(),
        });

        // inserted before both trips
        add(&mut data, "early", [0, 50, 90]).unwrap();
        assert_eq!(data.find_trip("first"), Some((route, 1)));
        assert_eq!(data.find_trip("second"), Some((route, 2)));
        let transfers = data.constrained_transfers_to(route, 1);
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].from.trip, Some(1));
        assert_eq!(transfers[0].to.trip, Some(2));
        let transfers = data.constrained_transfers_from(route, 1);
        assert_eq!(transfers[0].from.trip, Some(1));
        assert_eq!(transfers[0].to.trip, Some(2));

        // inserted between them
        add(&mut data, "middle", [350, 450, 550]).unwrap();
        let transfers = data.constrained_transfers_to(route, 1);
        assert_eq!(transfers[0].from.trip, Some(1));
        assert_eq!(transfers[0].to.trip, Some(3));
        assert_eq!(data.find_trip("second"), Some((route, 3)));
    }

    #[test]
    fn incoherent_times_are_rejected() {
        let mut data = data_with_stops();
        assert!(matches!(
            add(&mut data, "backward", [300, 200, 400]),
            Err(TripTimesError::NextArrivalBeforeDeparture { pos: 0, .. })
        ));
        assert!(matches!(
            data.add_trip("R", &[0], &[true], &[true], 0, "short", vec![0], vec![0]),
            Err(TripTimesError::TooFewStops(1))
        ));
    }
}
