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

use crate::engine::destination::DestinationArrival;
use crate::engine::stop_arrival::{ArrivalKind, McStopArrival};
use crate::engine::time_calculator::TimeCalculator;
use crate::time::{time_to_str, Time};
use crate::traits::{RouteIdx, StopIdx, TransferConstraint, TripSchedule};

/// A leg of a path, with times in the real world direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathLeg {
    Access {
        stop: StopIdx,
        departure_time: Time,
        arrival_time: Time,
        number_of_rides: usize,
    },
    Transit {
        route: RouteIdx,
        trip: usize,
        board_stop: StopIdx,
        board_time: Time,
        alight_stop: StopIdx,
        alight_time: Time,
        /// constraint of the transfer towards this leg
        constraint: Option<TransferConstraint>,
    },
    Transfer {
        from_stop: StopIdx,
        to_stop: StopIdx,
        departure_time: Time,
        arrival_time: Time,
    },
    Via {
        from_stop: StopIdx,
        to_stop: StopIdx,
        departure_time: Time,
        arrival_time: Time,
    },
    Egress {
        stop: StopIdx,
        departure_time: Time,
        arrival_time: Time,
        number_of_rides: usize,
    },
}

impl PathLeg {
    pub fn departure_time(&self) -> Time {
        match self {
            PathLeg::Access { departure_time, .. }
            | PathLeg::Transfer { departure_time, .. }
            | PathLeg::Via { departure_time, .. }
            | PathLeg::Egress { departure_time, .. } => *departure_time,
            PathLeg::Transit { board_time, .. } => *board_time,
        }
    }

    pub fn arrival_time(&self) -> Time {
        match self {
            PathLeg::Access { arrival_time, .. }
            | PathLeg::Transfer { arrival_time, .. }
            | PathLeg::Via { arrival_time, .. }
            | PathLeg::Egress { arrival_time, .. } => *arrival_time,
            PathLeg::Transit { alight_time, .. } => *alight_time,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, PathLeg::Transit { .. })
    }
}

/// A journey found by the search, from origin to destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaptorPath {
    /// the range raptor iteration that found the path
    pub iteration_departure_time: Time,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub number_of_transfers: usize,
    pub c1: i32,
    pub c2: i32,
    pub legs: Vec<PathLeg>,
}

impl RaptorPath {
    pub fn duration(&self) -> Time {
        self.arrival_time - self.departure_time
    }

    pub fn transit_legs(&self) -> impl Iterator<Item = &PathLeg> {
        self.legs.iter().filter(|leg| leg.is_transit())
    }

    pub fn is_valid(&self) -> bool {
        self.legs
            .windows(2)
            .all(|pair| pair[0].arrival_time() <= pair[1].departure_time())
            && self
                .legs
                .iter()
                .all(|leg| leg.departure_time() <= leg.arrival_time())
    }
}

impl std::fmt::Display for RaptorPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}, {} transfers, c1 {}",
            time_to_str(self.departure_time),
            time_to_str(self.arrival_time),
            self.number_of_transfers,
            self.c1
        )?;
        for leg in &self.legs {
            match leg {
                PathLeg::Transit {
                    route,
                    trip,
                    board_stop,
                    alight_stop,
                    ..
                } => write!(
                    f,
                    " | route {} trip {} {}->{}",
                    route, trip, board_stop, alight_stop
                )?,
                PathLeg::Transfer {
                    from_stop, to_stop, ..
                }
                | PathLeg::Via {
                    from_stop, to_stop, ..
                } => write!(f, " | walk {}->{}", from_stop, to_stop)?,
                PathLeg::Access { stop, .. } => write!(f, " | access {}", stop)?,
                PathLeg::Egress { stop, .. } => write!(f, " | egress {}", stop)?,
            }
        }
        Ok(())
    }
}

fn forward_leg<T: TripSchedule>(arrival: &McStopArrival<T>) -> PathLeg {
    match &arrival.kind {
        ArrivalKind::Access {
            leg,
            departure_time,
        } => PathLeg::Access {
            stop: arrival.stop,
            departure_time: *departure_time,
            arrival_time: arrival.arrival_time,
            number_of_rides: leg.number_of_rides,
        },
        ArrivalKind::Transit {
            trip,
            board_stop,
            board_time,
            alight_time,
            constraint,
            ..
        } => PathLeg::Transit {
            route: trip.route_index(),
            trip: trip.trip_sort_index(),
            board_stop: *board_stop,
            board_time: *board_time,
            alight_stop: arrival.stop,
            alight_time: *alight_time,
            constraint: *constraint,
        },
        ArrivalKind::Transfer {
            from_stop,
            duration,
        } => PathLeg::Transfer {
            from_stop: *from_stop,
            to_stop: arrival.stop,
            departure_time: arrival.arrival_time - duration,
            arrival_time: arrival.arrival_time,
        },
        ArrivalKind::Via {
            from_stop,
            duration,
            ..
        } => PathLeg::Via {
            from_stop: *from_stop,
            to_stop: arrival.stop,
            departure_time: arrival.arrival_time - duration,
            arrival_time: arrival.arrival_time,
        },
    }
}

// in a reverse search, an arrival at `stop` is a departure from `stop` in
// the real world.
fn reverse_leg<T: TripSchedule>(arrival: &McStopArrival<T>) -> PathLeg {
    match &arrival.kind {
        ArrivalKind::Access {
            leg,
            departure_time,
        } => PathLeg::Egress {
            stop: arrival.stop,
            departure_time: arrival.arrival_time,
            arrival_time: *departure_time,
            number_of_rides: leg.number_of_rides,
        },
        ArrivalKind::Transit {
            trip,
            board_stop,
            board_time,
            alight_time,
            constraint,
            ..
        } => PathLeg::Transit {
            route: trip.route_index(),
            trip: trip.trip_sort_index(),
            board_stop: arrival.stop,
            board_time: *alight_time,
            alight_stop: *board_stop,
            alight_time: *board_time,
            constraint: *constraint,
        },
        ArrivalKind::Transfer {
            from_stop,
            duration,
        } => PathLeg::Transfer {
            from_stop: arrival.stop,
            to_stop: *from_stop,
            departure_time: arrival.arrival_time,
            arrival_time: arrival.arrival_time + duration,
        },
        ArrivalKind::Via {
            from_stop,
            duration,
            ..
        } => PathLeg::Via {
            from_stop: arrival.stop,
            to_stop: *from_stop,
            departure_time: arrival.arrival_time,
            arrival_time: arrival.arrival_time + duration,
        },
    }
}

/// Build the path ending with `destination`, legs in real world order.
pub fn map_to_path<T: TripSchedule, C: TimeCalculator>(
    destination: &DestinationArrival<T>,
) -> RaptorPath {
    // arrivals from the last one to the first one, in search direction
    let mut chain: Vec<&McStopArrival<T>> = Vec::new();
    let mut current = Some(destination.previous.as_ref());
    while let Some(arrival) = current {
        chain.push(arrival);
        current = arrival.previous.as_deref();
    }

    let egress = &destination.egress;
    let legs: Vec<PathLeg> = if C::search_forward() {
        let mut legs: Vec<PathLeg> = chain.iter().rev().map(|arrival| forward_leg(*arrival)).collect();
        legs.push(PathLeg::Egress {
            stop: egress.stop,
            departure_time: destination.arrival_time - egress.duration,
            arrival_time: destination.arrival_time,
            number_of_rides: egress.number_of_rides,
        });
        legs
    } else {
        let mut legs = vec![PathLeg::Access {
            stop: egress.stop,
            departure_time: destination.arrival_time,
            arrival_time: destination.arrival_time + egress.duration,
            number_of_rides: egress.number_of_rides,
        }];
        legs.extend(chain.iter().map(|arrival| reverse_leg(*arrival)));
        legs
    };

    let departure_time = legs.first().map_or(destination.departure_time, PathLeg::departure_time);
    let arrival_time = legs.last().map_or(destination.arrival_time, PathLeg::arrival_time);
    RaptorPath {
        iteration_departure_time: destination.iteration_time,
        departure_time,
        arrival_time,
        number_of_transfers: destination.round.saturating_sub(1),
        c1: destination.c1,
        c2: destination.c2,
        legs,
    }
}
