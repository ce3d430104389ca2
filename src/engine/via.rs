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
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::engine::life_cycle::LifeCycle;
use crate::engine::mc_stop_arrivals::McStopArrivals;
use crate::engine::stop_arrival::{ArrivalRef, McStopArrival};
use crate::engine::stop_arrival_pareto_set::StopArrivalEventListener;
use crate::engine::time_calculator::TransitCalculator;
use crate::error::RaptorError;
use crate::time::Duration;
use crate::traits::{StopIdx, TransferConstraint, TripSchedule};

/// Links a stop reached in a search leg to a stop where the next leg
/// starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViaConnection {
    pub from_stop: StopIdx,
    pub to_stop: StopIdx,
    /// minimum wait at the stop, or duration of the transfer
    pub duration: Duration,
    pub c1: i32,
    pub constraint: Option<TransferConstraint>,
}

impl ViaConnection {
    /// Visit `stop`, staying there at least `min_wait_time`.
    pub fn stop(stop: StopIdx, min_wait_time: Duration) -> Self {
        Self {
            from_stop: stop,
            to_stop: stop,
            duration: min_wait_time,
            c1: 0,
            constraint: None,
        }
    }

    pub fn transfer(from_stop: StopIdx, to_stop: StopIdx, duration: Duration, c1: i32) -> Self {
        Self {
            from_stop,
            to_stop,
            duration,
            c1,
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, constraint: TransferConstraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    pub fn is_same_stop(&self) -> bool {
        self.from_stop == self.to_stop
    }

    pub fn reversed(&self) -> Self {
        Self {
            from_stop: self.to_stop,
            to_stop: self.from_stop,
            ..*self
        }
    }

    fn transfer_duration(&self) -> Duration {
        match self.constraint.and_then(|constraint| constraint.min_transfer_time) {
            Some(min_transfer_time) => self.duration.max(min_transfer_time),
            None => self.duration,
        }
    }

    fn is_allowed(&self) -> bool {
        !self.constraint.map_or(false, |constraint| constraint.not_allowed)
    }
}

/// The alternative connections of one via point : reaching any of them
/// is enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViaConnections {
    connections: Vec<ViaConnection>,
}

impl ViaConnections {
    /// `index` is the position of the via point in the request.
    pub fn new(index: usize, connections: Vec<ViaConnection>) -> Result<Self, RaptorError> {
        if connections.is_empty() {
            return Err(RaptorError::EmptyViaConnections(index));
        }
        Ok(Self { connections })
    }

    pub fn connections(&self) -> &[ViaConnection] {
        &self.connections
    }

    /// The same connections, for a search running backward in time.
    pub fn reversed(&self) -> Self {
        Self {
            connections: self.connections.iter().map(ViaConnection::reversed).collect(),
        }
    }

    fn by_from_stop(&self) -> BTreeMap<StopIdx, Vec<ViaConnection>> {
        let mut result: BTreeMap<StopIdx, Vec<ViaConnection>> = BTreeMap::new();
        for connection in &self.connections {
            result.entry(connection.from_stop).or_default().push(*connection);
        }
        result
    }
}

type Buffer<T> = Rc<RefCell<Vec<ArrivalRef<T>>>>;

/// Forwards the arrivals at a via stop of a search leg to the next leg.
///
/// Arrivals continuing at the same stop are forwarded at once, the others
/// are kept until the transfers of the round are done.
pub struct ViaConnectionStopArrivalEventListener<T, C> {
    connections: Vec<ViaConnection>,
    next_leg: Rc<RefCell<McStopArrivals<T, C>>>,
    buffer: Buffer<T>,
}

impl<T: TripSchedule + 'static, C: TransitCalculator> ViaConnectionStopArrivalEventListener<T, C> {
    /// One listener per from stop of `connections`, their transfers
    /// released into `next_leg` when `life_cycle` completes the transfers
    /// of a round.
    pub fn create_event_listeners(
        connections: &ViaConnections,
        next_leg: Rc<RefCell<McStopArrivals<T, C>>>,
        life_cycle: &mut LifeCycle,
    ) -> Vec<(StopIdx, Box<dyn StopArrivalEventListener<T>>)> {
        let buffer: Buffer<T> = Rc::default();
        {
            let buffer = buffer.clone();
            let next_leg = next_leg.clone();
            life_cycle.on_transfers_for_round_complete(move || {
                let arrivals: Vec<ArrivalRef<T>> = buffer.borrow_mut().drain(..).collect();
                let mut next_leg = next_leg.borrow_mut();
                for arrival in arrivals {
                    next_leg.add_stop_arrival(arrival);
                }
            });
        }
        connections
            .by_from_stop()
            .into_iter()
            .map(|(stop, connections)| {
                let listener = Self {
                    connections,
                    next_leg: next_leg.clone(),
                    buffer: buffer.clone(),
                };
                (stop, Box::new(listener) as Box<dyn StopArrivalEventListener<T>>)
            })
            .collect()
    }

    fn via_arrival(
        &self,
        arrival: &ArrivalRef<T>,
        connection: &ViaConnection,
        duration: Duration,
    ) -> ArrivalRef<T> {
        Rc::new(McStopArrival::via(
            arrival.clone(),
            connection.to_stop,
            duration,
            C::plus_duration(arrival.arrival_time, duration),
            arrival.c1 + connection.c1,
        ))
    }
}

impl<T: TripSchedule + 'static, C: TransitCalculator> StopArrivalEventListener<T>
    for ViaConnectionStopArrivalEventListener<T, C>
{
    fn new_element_added(&self, arrival: &ArrivalRef<T>) {
        for connection in &self.connections {
            if connection.is_same_stop() {
                let forwarded = if connection.duration == 0 {
                    arrival.clone()
                } else {
                    self.via_arrival(arrival, connection, connection.duration)
                };
                self.next_leg.borrow_mut().add_stop_arrival(forwarded);
            } else if arrival.arrived_on_board() && connection.is_allowed() {
                let forwarded = self.via_arrival(arrival, connection, connection.transfer_duration());
                self.buffer.borrow_mut().push(forwarded);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParetoSetCost;
    use crate::engine::stop_arrival::tests::{access_arrival, transit_arrival};
    use crate::engine::stop_arrival::{CostComparator, StopArrivalComparator};
    use crate::engine::time_calculator::ForwardCalculator;
    use crate::transit_data::TripTimes;

    type Leg = McStopArrivals<TripTimes, ForwardCalculator>;

    fn next_leg(nb_of_stops: usize) -> Rc<RefCell<Leg>> {
        let comparator = StopArrivalComparator::new(CostComparator::new(ParetoSetCost::UseC1));
        Rc::new(RefCell::new(
            Leg::new(nb_of_stops, comparator, Default::default()).unwrap(),
        ))
    }

    #[test]
    fn empty_via_is_an_error() {
        assert_eq!(
            ViaConnections::new(2, vec![]),
            Err(RaptorError::EmptyViaConnections(2))
        );
    }

    #[test]
    fn zero_duration_same_stop_forwards_the_arrival_itself() {
        let next = next_leg(3);
        let mut life_cycle = LifeCycle::new();
        let connections = ViaConnections::new(0, vec![ViaConnection::stop(1, 0)]).unwrap();
        let listeners =
            ViaConnectionStopArrivalEventListener::create_event_listeners(&connections, next.clone(), &mut life_cycle);
        assert_eq!(listeners.len(), 1);
        let arrival = access_arrival(1, 100, 10);
        listeners[0].1.new_element_added(&arrival);
        let next = next.borrow();
        let forwarded = &next.list_arrivals_after_marker(1)[0];
        assert!(Rc::ptr_eq(forwarded, &arrival));
    }

    #[test]
    fn same_stop_wait_is_immediate_transfers_are_buffered() {
        let next = next_leg(3);
        let mut life_cycle = LifeCycle::new();
        let connections = ViaConnections::new(
            0,
            vec![ViaConnection::stop(1, 60), ViaConnection::transfer(1, 2, 120, 30)],
        )
        .unwrap();
        let listeners =
            ViaConnectionStopArrivalEventListener::create_event_listeners(&connections, next.clone(), &mut life_cycle);
        let access = access_arrival(0, 100, 0);
        let transit = transit_arrival(&access, 1, 200, 50);
        listeners[0].1.new_element_added(&transit);

        assert_eq!(next.borrow().best_arrival_time(1), 260);
        assert!(next.borrow().list_arrivals_after_marker(1)[0].arrived_on_board());
        assert!(!next.borrow().reached(2));

        life_cycle.transfers_for_round_complete();
        let next = next.borrow();
        let walked = &next.list_arrivals_after_marker(2)[0];
        assert_eq!(walked.arrival_time, 320);
        assert_eq!(walked.c1, 80);
        assert!(!walked.arrived_on_board());
    }

    #[test]
    fn transfers_need_an_on_board_arrival() {
        let next = next_leg(3);
        let mut life_cycle = LifeCycle::new();
        let connections =
            ViaConnections::new(0, vec![ViaConnection::transfer(1, 2, 120, 0)]).unwrap();
        let listeners =
            ViaConnectionStopArrivalEventListener::create_event_listeners(&connections, next.clone(), &mut life_cycle);
        listeners[0].1.new_element_added(&access_arrival(1, 100, 0));
        life_cycle.transfers_for_round_complete();
        assert!(!next.borrow().reached(2));

        let reversed = connections.reversed();
        assert_eq!(reversed.connections()[0].from_stop, 2);
        assert_eq!(reversed.connections()[0].to_stop, 1);
    }
}
