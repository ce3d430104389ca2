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
use std::rc::Rc;

use crate::access_egress::RaptorAccessEgress;
use crate::config::{ParetoSetCost, RelaxFunction};
use crate::engine::pareto_set::ParetoComparator;
use crate::engine::time_calculator::TimeCalculator;
use crate::time::{Duration, Time};
use crate::traits::{StopIdx, TransferConstraint, TripSchedule};

/// Dominance function on the secondary criterion `c2`.
pub type C2Dominance = fn(i32, i32) -> bool;

/// Smaller `c2` is better, used when no pass-through service defines `c2`.
pub fn lower_c2_is_better(left: i32, right: i32) -> bool {
    left < right
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrivalKind<T> {
    Access {
        leg: RaptorAccessEgress,
        /// start of the leg, in search direction
        departure_time: Time,
    },
    Transit {
        trip: T,
        board_stop: StopIdx,
        board_pos: usize,
        alight_pos: usize,
        /// board time of the trip, in search direction
        board_time: Time,
        /// alight time of the trip, in search direction, without alight slack
        alight_time: Time,
        constraint: Option<TransferConstraint>,
    },
    Transfer {
        from_stop: StopIdx,
        duration: Duration,
    },
    /// a connection between two chained searches, other than a pass-through
    Via {
        from_stop: StopIdx,
        duration: Duration,
        on_board: bool,
    },
}

/// A labelled arrival at a stop. Arrivals are never modified once
/// created : a better arrival replaces a dominated one in the stop set.
#[derive(Debug, Clone, PartialEq)]
pub struct McStopArrival<T> {
    pub stop: StopIdx,
    /// in search direction
    pub arrival_time: Time,
    /// number of transit rides so far
    pub round: usize,
    pub c1: i32,
    pub c2: i32,
    pub kind: ArrivalKind<T>,
    pub previous: Option<Rc<McStopArrival<T>>>,
}

pub type ArrivalRef<T> = Rc<McStopArrival<T>>;

impl<T: TripSchedule> McStopArrival<T> {
    pub fn access(
        leg: &RaptorAccessEgress,
        departure_time: Time,
        arrival_time: Time,
        c2: i32,
    ) -> Self {
        Self {
            stop: leg.stop,
            arrival_time,
            round: leg.number_of_rides,
            c1: leg.c1,
            c2,
            kind: ArrivalKind::Access {
                leg: leg.clone(),
                departure_time,
            },
            previous: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn transit(
        previous: Rc<Self>,
        trip: T,
        board_stop: StopIdx,
        board_pos: usize,
        board_time: Time,
        alight_stop: StopIdx,
        alight_pos: usize,
        alight_time: Time,
        arrival_time: Time,
        c1: i32,
        c2: i32,
        constraint: Option<TransferConstraint>,
    ) -> Self {
        Self {
            stop: alight_stop,
            arrival_time,
            round: previous.round + 1,
            c1,
            c2,
            kind: ArrivalKind::Transit {
                trip,
                board_stop,
                board_pos,
                alight_pos,
                board_time,
                alight_time,
                constraint,
            },
            previous: Some(previous),
        }
    }

    pub fn transfer(
        previous: Rc<Self>,
        to_stop: StopIdx,
        duration: Duration,
        arrival_time: Time,
        c1: i32,
    ) -> Self {
        Self {
            stop: to_stop,
            arrival_time,
            round: previous.round,
            c1,
            c2: previous.c2,
            kind: ArrivalKind::Transfer {
                from_stop: previous.stop,
                duration,
            },
            previous: Some(previous),
        }
    }

    pub fn via(
        previous: Rc<Self>,
        to_stop: StopIdx,
        duration: Duration,
        arrival_time: Time,
        c1: i32,
    ) -> Self {
        let on_board = previous.stop == to_stop && previous.arrived_on_board();
        Self {
            stop: to_stop,
            arrival_time,
            round: previous.round,
            c1,
            c2: previous.c2,
            kind: ArrivalKind::Via {
                from_stop: previous.stop,
                duration,
                on_board,
            },
            previous: Some(previous),
        }
    }

    /// A copy of this access arrival, starting later and reaching the stop
    /// at `arrival_time`.
    ///
    /// Panics if this arrival is not an access.
    pub fn time_shifted_access(&self, arrival_time: Time, departure_time: Time) -> Self {
        match &self.kind {
            ArrivalKind::Access { leg, .. } => Self {
                arrival_time,
                kind: ArrivalKind::Access {
                    leg: leg.clone(),
                    departure_time,
                },
                ..self.clone()
            },
            _ => panic!("Only access arrivals can be time shifted"),
        }
    }

    pub fn arrived_on_board(&self) -> bool {
        match &self.kind {
            ArrivalKind::Access { leg, .. } => leg.stop_reached_on_board,
            ArrivalKind::Transit { .. } => true,
            ArrivalKind::Transfer { .. } => false,
            ArrivalKind::Via { on_board, .. } => *on_board,
        }
    }

    pub fn is_access(&self) -> bool {
        matches!(self.kind, ArrivalKind::Access { .. })
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, ArrivalKind::Transit { .. })
    }

    /// Two arrivals per round : on board before on foot.
    pub fn pareto_round(&self) -> usize {
        2 * self.round + usize::from(!self.arrived_on_board())
    }

    /// The last transit leg reached this arrival, skipping transfers.
    pub fn most_recent_transit(&self) -> Option<&McStopArrival<T>> {
        let mut current = self;
        loop {
            match &current.kind {
                ArrivalKind::Transit { .. } => return Some(current),
                ArrivalKind::Access { .. } => return None,
                ArrivalKind::Transfer { .. } | ArrivalKind::Via { .. } => {
                    current = current.previous.as_deref()?;
                }
            }
        }
    }

    /// The first arrival of the path, its access.
    pub fn access_arrival(&self) -> &McStopArrival<T> {
        let mut current = self;
        while let Some(previous) = current.previous.as_deref() {
            current = previous;
        }
        current
    }

    /// Start time of the path, in search direction.
    pub fn departure_time(&self) -> Time {
        match &self.access_arrival().kind {
            ArrivalKind::Access { departure_time, .. } => *departure_time,
            _ => self.access_arrival().arrival_time,
        }
    }
}

/// Dominance on `c1` and `c2`, according to a [`ParetoSetCost`].
#[derive(Debug, Clone, Copy)]
pub struct CostComparator {
    pub cost: ParetoSetCost,
    pub relax_c1: RelaxFunction,
    pub c2_dominance: C2Dominance,
}

impl CostComparator {
    pub fn new(cost: ParetoSetCost) -> Self {
        Self {
            cost,
            relax_c1: RelaxFunction::NORMAL,
            c2_dominance: lower_c2_is_better,
        }
    }

    pub fn left_dominance_exist(&self, left_c1: i32, left_c2: i32, right_c1: i32, right_c2: i32) -> bool {
        match self.cost {
            ParetoSetCost::None => false,
            ParetoSetCost::UseC1 => left_c1 < right_c1,
            ParetoSetCost::UseC1AndC2 => {
                left_c1 < right_c1 || (self.c2_dominance)(left_c2, right_c2)
            }
            ParetoSetCost::UseC1RelaxedIfC2IsOptimal => {
                if left_c2 != right_c2 && (self.c2_dominance)(left_c2, right_c2) {
                    left_c1 < self.relax_c1.relax(right_c1)
                } else {
                    left_c1 < right_c1
                }
            }
        }
    }
}

/// Compares the arrivals at a stop on arrival time, pareto round and cost.
pub struct StopArrivalComparator<C> {
    cost: CostComparator,
    _calculator: PhantomData<C>,
}

impl<C> StopArrivalComparator<C> {
    pub fn new(cost: CostComparator) -> Self {
        Self {
            cost,
            _calculator: PhantomData,
        }
    }
}

impl<C> Clone for StopArrivalComparator<C> {
    fn clone(&self) -> Self {
        Self::new(self.cost)
    }
}

impl<C: TimeCalculator, T: TripSchedule> ParetoComparator<ArrivalRef<T>> for StopArrivalComparator<C> {
    fn left_dominance_exist(&self, left: &ArrivalRef<T>, right: &ArrivalRef<T>) -> bool {
        C::is_before(left.arrival_time, right.arrival_time)
            || left.pareto_round() < right.pareto_round()
            || self
                .cost
                .left_dominance_exist(left.c1, left.c2, right.c1, right.c2)
    }
}
