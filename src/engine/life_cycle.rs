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

use crate::time::Time;

/// Events of a range raptor search, published by the worker.
///
/// Subscribers are called in subscription order.
#[derive(Default)]
pub struct LifeCycle {
    setup_iteration: Vec<Box<dyn Fn(Time)>>,
    prepare_for_next_round: Vec<Box<dyn Fn(usize)>>,
    transits_for_round_complete: Vec<Box<dyn Fn()>>,
    transfers_for_round_complete: Vec<Box<dyn Fn()>>,
    round_complete: Vec<Box<dyn Fn(bool)>>,
    iteration_complete: Vec<Box<dyn Fn()>>,
}

impl LifeCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_setup_iteration<F: Fn(Time) + 'static>(&mut self, subscriber: F) {
        self.setup_iteration.push(Box::new(subscriber));
    }

    pub fn on_prepare_for_next_round<F: Fn(usize) + 'static>(&mut self, subscriber: F) {
        self.prepare_for_next_round.push(Box::new(subscriber));
    }

    pub fn on_transits_for_round_complete<F: Fn() + 'static>(&mut self, subscriber: F) {
        self.transits_for_round_complete.push(Box::new(subscriber));
    }

    pub fn on_transfers_for_round_complete<F: Fn() + 'static>(&mut self, subscriber: F) {
        self.transfers_for_round_complete.push(Box::new(subscriber));
    }

    /// The subscriber receives `true` if the destination was reached in
    /// the round.
    pub fn on_round_complete<F: Fn(bool) + 'static>(&mut self, subscriber: F) {
        self.round_complete.push(Box::new(subscriber));
    }

    pub fn on_iteration_complete<F: Fn() + 'static>(&mut self, subscriber: F) {
        self.iteration_complete.push(Box::new(subscriber));
    }

    pub fn setup_iteration(&self, iteration_time: Time) {
        self.setup_iteration.iter().for_each(|f| f(iteration_time));
    }

    pub fn prepare_for_next_round(&self, round: usize) {
        self.prepare_for_next_round.iter().for_each(|f| f(round));
    }

    pub fn transits_for_round_complete(&self) {
        self.transits_for_round_complete.iter().for_each(|f| f());
    }

    pub fn transfers_for_round_complete(&self) {
        self.transfers_for_round_complete.iter().for_each(|f| f());
    }

    pub fn round_complete(&self, destination_reached: bool) {
        self.round_complete
            .iter()
            .for_each(|f| f(destination_reached));
    }

    pub fn iteration_complete(&self) {
        self.iteration_complete.iter().for_each(|f| f());
    }
}
