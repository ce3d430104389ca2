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

use std::rc::Rc;

use crate::engine::debug::DebugHandler;
use crate::engine::pareto_set::ParetoSet;
use crate::engine::stop_arrival::{ArrivalRef, StopArrivalComparator};
use crate::engine::time_calculator::TimeCalculator;
use crate::error::RaptorError;
use crate::traits::TripSchedule;

/// Notified of every arrival inserted in a stop set.
pub trait StopArrivalEventListener<T> {
    fn new_element_added(&self, arrival: &ArrivalRef<T>);
}

pub struct StopArrivalParetoSetOptions<T> {
    pub debug: Option<Rc<dyn DebugHandler<T>>>,
    /// forwards arrivals to the next leg of a via search
    pub next_leg: Option<Box<dyn StopArrivalEventListener<T>>>,
    /// forwards arrivals to the destination
    pub egress: Option<Box<dyn StopArrivalEventListener<T>>>,
}

impl<T> Default for StopArrivalParetoSetOptions<T> {
    fn default() -> Self {
        Self {
            debug: None,
            next_leg: None,
            egress: None,
        }
    }
}

/// The pareto set of the arrivals at one stop.
///
/// Listeners are called in this order for every inserted arrival : debug
/// handler, next leg, egress.
pub struct StopArrivalParetoSet<T, C> {
    set: ParetoSet<ArrivalRef<T>, StopArrivalComparator<C>>,
    debug: Option<Rc<dyn DebugHandler<T>>>,
    next_leg: Option<Box<dyn StopArrivalEventListener<T>>>,
    egress: Option<Box<dyn StopArrivalEventListener<T>>>,
}

impl<T: TripSchedule, C: TimeCalculator> StopArrivalParetoSet<T, C> {
    pub fn new(
        comparator: StopArrivalComparator<C>,
        options: StopArrivalParetoSetOptions<T>,
    ) -> Result<Self, RaptorError> {
        if options.next_leg.is_some() && options.egress.is_some() {
            return Err(RaptorError::EgressAndViaListeners);
        }
        Ok(Self {
            set: ParetoSet::new(comparator),
            debug: options.debug,
            next_leg: options.next_leg,
            egress: options.egress,
        })
    }

    pub fn without_listeners(
        comparator: StopArrivalComparator<C>,
        debug: Option<Rc<dyn DebugHandler<T>>>,
    ) -> Self {
        Self {
            set: ParetoSet::new(comparator),
            debug,
            next_leg: None,
            egress: None,
        }
    }

    /// Returns `true` if `arrival` was inserted.
    pub fn add(&mut self, arrival: ArrivalRef<T>) -> bool {
        let debug = &self.debug;
        let accepted = self.set.add_and_notify(arrival.clone(), |dropped, dominated_by| {
            if let Some(debug) = debug {
                debug.dropped(dropped, dominated_by);
            }
        });
        if !accepted {
            if let Some(debug) = &self.debug {
                debug.reject(&arrival, "dominated by an arrival at the same stop");
            }
            return false;
        }
        if let Some(debug) = &self.debug {
            debug.accept(&arrival);
        }
        if let Some(next_leg) = &self.next_leg {
            next_leg.new_element_added(&arrival);
        }
        if let Some(egress) = &self.egress {
            egress.new_element_added(&arrival);
        }
        true
    }

    pub fn reject(&self, arrival: &ArrivalRef<T>, reason: &str) {
        if let Some(debug) = &self.debug {
            debug.reject(arrival, reason);
        }
    }

    pub fn mark_at_end_of_set(&mut self) {
        self.set.mark_at_end_of_set();
    }

    pub fn elements_after_marker(&self) -> &[ArrivalRef<T>] {
        self.set.elements_after_marker()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArrivalRef<T>> {
        self.set.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }
}
