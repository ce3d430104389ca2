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
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::access_egress::RaptorAccessEgress;
use crate::engine::debug::DebugHandler;
use crate::engine::destination::{DestinationArrivalPaths, EgressArrivalListener};
use crate::engine::heuristics::DestinationPruning;
use crate::engine::stop_arrival::{ArrivalRef, StopArrivalComparator};
use crate::engine::stop_arrival_pareto_set::{
    StopArrivalEventListener, StopArrivalParetoSet, StopArrivalParetoSetOptions,
};
use crate::engine::time_calculator::TransitCalculator;
use crate::error::RaptorError;
use crate::time::Time;
use crate::traits::{StopIdx, TripSchedule};

/// Returned by [`McStopArrivals::smallest_number_of_transfers`] for a stop
/// that is not reached.
pub const UNREACHED_TRANSFERS: usize = usize::MAX;

/// Forwarding of the arrivals at the egress stops to the destination.
pub struct EgressWiring<T, C> {
    pub egress_legs: Vec<RaptorAccessEgress>,
    pub destination: Rc<RefCell<DestinationArrivalPaths<T, C>>>,
}

pub struct McStopArrivalsOptions<T, C> {
    pub egress: Option<EgressWiring<T, C>>,
    /// one listener per via stop, forwarding to the next leg
    pub via_listeners: Vec<(StopIdx, Box<dyn StopArrivalEventListener<T>>)>,
    pub debug: Option<Rc<dyn DebugHandler<T>>>,
    /// rejects the arrivals from which the destination cannot be reached
    /// in time
    pub pruning: Option<DestinationPruning>,
    /// arrivals after this time, in search direction, are rejected
    pub time_limit: Option<Time>,
}

impl<T, C> Default for McStopArrivalsOptions<T, C> {
    fn default() -> Self {
        Self {
            egress: None,
            via_listeners: Vec::new(),
            debug: None,
            pruning: None,
            time_limit: None,
        }
    }
}

/// The arrivals of one search leg : a pareto set per reached stop and the
/// set of stops touched in the current round.
pub struct McStopArrivals<T, C> {
    arrivals: Vec<Option<StopArrivalParetoSet<T, C>>>,
    touched_stops: FixedBitSet,
    comparator: StopArrivalComparator<C>,
    debug: Option<Rc<dyn DebugHandler<T>>>,
    pruning: Option<DestinationPruning>,
    time_limit: Option<Time>,
}

impl<T: TripSchedule + 'static, C: TransitCalculator> McStopArrivals<T, C> {
    pub fn new(
        nb_of_stops: usize,
        comparator: StopArrivalComparator<C>,
        options: McStopArrivalsOptions<T, C>,
    ) -> Result<Self, RaptorError> {
        if options.egress.is_some() && !options.via_listeners.is_empty() {
            return Err(RaptorError::EgressAndViaListeners);
        }
        let mut result = Self {
            arrivals: (0..nb_of_stops).map(|_| None).collect(),
            touched_stops: FixedBitSet::with_capacity(nb_of_stops),
            comparator,
            debug: options.debug,
            pruning: options.pruning,
            time_limit: options.time_limit,
        };

        if let Some(wiring) = options.egress {
            let mut legs_by_stop: BTreeMap<StopIdx, Vec<RaptorAccessEgress>> = BTreeMap::new();
            for leg in wiring.egress_legs {
                legs_by_stop.entry(leg.stop).or_default().push(leg);
            }
            for (stop, legs) in legs_by_stop {
                let listener = EgressArrivalListener::new(legs, wiring.destination.clone());
                result.create_set(
                    stop,
                    StopArrivalParetoSetOptions {
                        debug: result.debug.clone(),
                        next_leg: None,
                        egress: Some(Box::new(listener)),
                    },
                )?;
            }
        }
        for (stop, listener) in options.via_listeners {
            result.create_set(
                stop,
                StopArrivalParetoSetOptions {
                    debug: result.debug.clone(),
                    next_leg: Some(listener),
                    egress: None,
                },
            )?;
        }
        Ok(result)
    }

    fn create_set(
        &mut self,
        stop: StopIdx,
        options: StopArrivalParetoSetOptions<T>,
    ) -> Result<(), RaptorError> {
        let nb_of_stops = self.arrivals.len();
        let slot = self
            .arrivals
            .get_mut(stop)
            .ok_or(RaptorError::UnknownStop { stop, nb_of_stops })?;
        if slot.is_some() {
            // a stop has a single listener, grouping all its legs
            return Err(RaptorError::EgressAndViaListeners);
        }
        *slot = Some(StopArrivalParetoSet::new(self.comparator.clone(), options)?);
        Ok(())
    }

    pub fn nb_of_stops(&self) -> usize {
        self.arrivals.len()
    }

    /// Returns `true` if `arrival` was inserted in the set of its stop.
    pub fn add_stop_arrival(&mut self, arrival: ArrivalRef<T>) -> bool {
        let stop = arrival.stop;
        if let Some(limit) = self.time_limit {
            if C::exceeds_time_limit(arrival.arrival_time, limit) {
                self.reject(&arrival, "the time limit is exceeded");
                return false;
            }
        }
        if let Some(pruning) = &self.pruning {
            if pruning.is_pruned::<C>(stop, arrival.arrival_time) {
                self.reject(&arrival, "the destination cannot be reached in time");
                return false;
            }
        }
        let comparator = &self.comparator;
        let debug = &self.debug;
        let set = self.arrivals[stop]
            .get_or_insert_with(|| StopArrivalParetoSet::without_listeners(comparator.clone(), debug.clone()));
        let added = set.add(arrival);
        if added {
            self.touched_stops.insert(stop);
        }
        added
    }

    fn reject(&self, arrival: &ArrivalRef<T>, reason: &str) {
        if let Some(debug) = &self.debug {
            debug.reject(arrival, reason);
        }
    }

    pub fn stops_touched_iter(&self) -> fixedbitset::Ones<'_> {
        self.touched_stops.ones()
    }

    pub fn touched_stops(&self) -> &FixedBitSet {
        &self.touched_stops
    }

    pub fn is_touched(&self, stop: StopIdx) -> bool {
        self.touched_stops.contains(stop)
    }

    pub fn any_stop_touched(&self) -> bool {
        self.touched_stops.count_ones(..) > 0
    }

    /// Arrivals at `stop` inserted since the stop markers were last set.
    pub fn list_arrivals_after_marker(&self, stop: StopIdx) -> &[ArrivalRef<T>] {
        match &self.arrivals[stop] {
            Some(set) => set.elements_after_marker(),
            None => &[],
        }
    }

    /// Must be called once per round, after every consumer of
    /// [`list_arrivals_after_marker`](Self::list_arrivals_after_marker) ran.
    pub fn clear_touched_stops_and_set_stop_markers(&mut self) {
        for stop in self.touched_stops.ones() {
            if let Some(set) = &mut self.arrivals[stop] {
                set.mark_at_end_of_set();
            }
        }
        self.touched_stops.clear();
    }

    fn arrivals_at(&self, stop: StopIdx) -> impl Iterator<Item = &ArrivalRef<T>> {
        self.arrivals[stop].iter().flat_map(|set| set.iter())
    }

    // The methods below scan every arrival of a stop, they are meant for
    // debugging and results, not for the search itself.

    pub fn reached(&self, stop: StopIdx) -> bool {
        self.arrivals_at(stop).next().is_some()
    }

    pub fn reached_by_transit(&self, stop: StopIdx) -> bool {
        self.arrivals_at(stop).any(|arrival| arrival.is_transit())
    }

    /// [`TimeCalculator::unreached_time`](crate::engine::time_calculator::TimeCalculator::unreached_time)
    /// if the stop is not reached.
    pub fn best_arrival_time(&self, stop: StopIdx) -> Time {
        best_time::<C, _>(self.arrivals_at(stop).map(|arrival| arrival.arrival_time))
    }

    pub fn best_transit_arrival_time(&self, stop: StopIdx) -> Time {
        best_time::<C, _>(
            self.arrivals_at(stop)
                .filter(|arrival| arrival.is_transit())
                .map(|arrival| arrival.arrival_time),
        )
    }

    /// [`UNREACHED_TRANSFERS`] if the stop is not reached.
    pub fn smallest_number_of_transfers(&self, stop: StopIdx) -> usize {
        self.arrivals_at(stop)
            .map(|arrival| arrival.round.saturating_sub(1))
            .min()
            .unwrap_or(UNREACHED_TRANSFERS)
    }
}

fn best_time<C: TransitCalculator, I: Iterator<Item = Time>>(times: I) -> Time {
    times.fold(C::unreached_time(), |best, time| {
        if C::is_before(time, best) {
            time
        } else {
            best
        }
    })
}
