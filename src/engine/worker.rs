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
use std::rc::Rc;
use tracing::{debug, trace};

use crate::access_egress::{group_by_round, RaptorAccessEgress};
use crate::config::{ParetoSetCost, ParetoSetTime, RelaxFunction, ResolvedSearchParams};
use crate::engine::cost::CostCalculator;
use crate::engine::debug::{subscribe_to_life_cycle, DebugHandler};
use crate::engine::destination::{DestinationArrivalComparator, DestinationArrivalPaths};
use crate::engine::heuristics::DestinationPruning;
use crate::engine::life_cycle::LifeCycle;
use crate::engine::mc_stop_arrivals::{
    EgressWiring, McStopArrivals, McStopArrivalsOptions, UNREACHED_TRANSFERS,
};
use crate::engine::pass_through::PassThroughPointsService;
use crate::engine::path::RaptorPath;
use crate::engine::routing_strategy::MultiCriteriaRoutingStrategy;
use crate::engine::slack::SlackProvider;
use crate::engine::stop_arrival::{
    lower_c2_is_better, ArrivalRef, CostComparator, McStopArrival, StopArrivalComparator,
};
use crate::engine::time_calculator::{TimeCalculator, TransitCalculator};
use crate::engine::via::{ViaConnectionStopArrivalEventListener, ViaConnections};
use crate::error::RaptorError;
use crate::time::{Duration, Time};
use crate::traits::{StopIdx, TransitDataProvider};

/// Everything a worker needs, in search direction : `accesses` start the
/// search, `egresses` end it, `via` are passed in search order.
pub struct WorkerSetup<T> {
    pub accesses: Vec<RaptorAccessEgress>,
    pub egresses: Vec<RaptorAccessEgress>,
    pub via: Vec<ViaConnections>,
    pub search: ResolvedSearchParams,
    pub number_of_rounds: usize,
    pub iteration_step: Duration,
    pub pareto_set_cost: ParetoSetCost,
    pub pareto_set_time: ParetoSetTime,
    pub relax_c1: RelaxFunction,
    /// arrivals after this time, in search direction, are dropped
    pub time_limit: Option<Time>,
    pub slack: Rc<dyn SlackProvider>,
    pub cost: Rc<dyn CostCalculator>,
    pub pass_through: Option<Rc<dyn PassThroughPointsService>>,
    pub debug: Option<Rc<dyn DebugHandler<T>>>,
    pub pruning: Option<DestinationPruning>,
}

/// The outcome of a search.
#[derive(Debug, Clone)]
pub struct RaptorWorkerResult {
    /// pareto optimal paths, sorted by departure time then arrival time
    pub paths: Vec<RaptorPath>,
    /// per stop of the first search leg, in search direction, unreached
    /// stops have the unreached time of the search direction
    pub best_arrival_times: Vec<Time>,
    pub best_transit_arrival_times: Vec<Time>,
    /// per stop of the first search leg,
    /// [`UNREACHED_TRANSFERS`](crate::engine::mc_stop_arrivals::UNREACHED_TRANSFERS)
    /// for unreached stops
    pub min_transfers: Vec<usize>,
    pub nb_of_iterations: usize,
}

impl RaptorWorkerResult {
    /// The result of a search that reaches no stop.
    pub fn unreached<C: TimeCalculator>(nb_of_stops: usize) -> Self {
        Self {
            paths: Vec::new(),
            best_arrival_times: vec![C::unreached_time(); nb_of_stops],
            best_transit_arrival_times: vec![C::unreached_time(); nb_of_stops],
            min_transfers: vec![UNREACHED_TRANSFERS; nb_of_stops],
            nb_of_iterations: 0,
        }
    }
}

type Leg<T, C> = Rc<RefCell<McStopArrivals<T, C>>>;

/// Range raptor : runs a multi-criteria raptor search for every departure
/// minute of the search window, keeping the stop arrivals between the
/// iterations.
///
/// A search with via points chains one search leg per via point, legs are
/// run in lock-step within each round.
pub struct RaptorWorker<'data, D: TransitDataProvider, C> {
    data: &'data D,
    strategy: MultiCriteriaRoutingStrategy<'data, D, C>,
    legs: Vec<Leg<D::Trip, C>>,
    /// accesses reaching their stop on board, indexed by number of rides
    accesses_on_board: Vec<Vec<RaptorAccessEgress>>,
    /// accesses reaching their stop on foot, indexed by number of rides
    accesses_on_foot: Vec<Vec<RaptorAccessEgress>>,
    destination: Rc<RefCell<DestinationArrivalPaths<D::Trip, C>>>,
    life_cycle: LifeCycle,
    search: ResolvedSearchParams,
    number_of_rounds: usize,
    iteration_step: Duration,
    initial_c2: i32,
}

impl<'data, D, C> RaptorWorker<'data, D, C>
where
    D: TransitDataProvider,
    D::Trip: 'static,
    C: TransitCalculator,
{
    pub fn new(data: &'data D, mut setup: WorkerSetup<D::Trip>) -> Result<Self, RaptorError> {
        let nb_of_stops = data.nb_of_stops();
        setup.pass_through = setup.pass_through.filter(|service| !service.is_noop());
        if setup.accesses.is_empty() {
            return Err(RaptorError::NoAccess);
        }
        if setup.egresses.is_empty() {
            return Err(RaptorError::NoEgress);
        }
        if setup.iteration_step <= 0 {
            return Err(RaptorError::BadIterationStep(setup.iteration_step));
        }
        let stops = setup
            .accesses
            .iter()
            .chain(setup.egresses.iter())
            .map(|leg| leg.stop)
            .chain(setup.via.iter().flat_map(|connections| {
                connections
                    .connections()
                    .iter()
                    .flat_map(|connection| [connection.from_stop, connection.to_stop])
            }));
        for stop in stops {
            if stop >= nb_of_stops {
                return Err(RaptorError::UnknownStop { stop, nb_of_stops });
            }
        }
        if setup.pass_through.is_some() && !setup.pareto_set_cost.include_c2() {
            return Err(RaptorError::PassThroughWithoutC2(setup.pareto_set_cost));
        }

        let cost_comparator = CostComparator {
            cost: setup.pareto_set_cost,
            relax_c1: setup.relax_c1,
            c2_dominance: setup
                .pass_through
                .as_ref()
                .map_or(lower_c2_is_better, |service| service.dominance_function()),
        };
        let initial_c2 = setup
            .pass_through
            .as_ref()
            .map_or(0, |service| service.initial_c2());

        let destination = Rc::new(RefCell::new(DestinationArrivalPaths::new(
            DestinationArrivalComparator::new(setup.pareto_set_time, cost_comparator),
            setup.cost.clone(),
            setup.pass_through.clone(),
            setup.debug.clone(),
            setup.time_limit,
        )));

        let mut life_cycle = LifeCycle::new();
        if let Some(debug) = &setup.debug {
            subscribe_to_life_cycle(debug, &mut life_cycle);
        }
        let comparator = StopArrivalComparator::<C>::new(cost_comparator);
        let last_leg = McStopArrivals::new(
            nb_of_stops,
            comparator.clone(),
            McStopArrivalsOptions {
                egress: Some(EgressWiring {
                    egress_legs: setup.egresses,
                    destination: destination.clone(),
                }),
                via_listeners: Vec::new(),
                debug: setup.debug.clone(),
                pruning: setup.pruning.clone(),
                time_limit: setup.time_limit,
            },
        )?;
        let mut legs: Vec<Leg<D::Trip, C>> = vec![Rc::new(RefCell::new(last_leg))];
        for connections in setup.via.iter().rev() {
            let next_leg = legs[0].clone();
            let via_listeners = ViaConnectionStopArrivalEventListener::create_event_listeners(
                connections,
                next_leg,
                &mut life_cycle,
            );
            let leg = McStopArrivals::new(
                nb_of_stops,
                comparator.clone(),
                McStopArrivalsOptions {
                    egress: None,
                    via_listeners,
                    debug: setup.debug.clone(),
                    pruning: setup.pruning.clone(),
                    time_limit: setup.time_limit,
                },
            )?;
            legs.insert(0, Rc::new(RefCell::new(leg)));
        }

        let nb_of_iterations = C::iteration_times(&setup.search, setup.iteration_step).len();
        let exact_match_step = if nb_of_iterations > 1 {
            Some(setup.iteration_step)
        } else {
            None
        };
        let strategy = MultiCriteriaRoutingStrategy::new(
            data,
            setup.slack,
            setup.cost,
            setup.pass_through,
            exact_match_step,
        );

        Ok(Self {
            data,
            strategy,
            legs,
            accesses_on_board: group_by_round(&setup.accesses, |leg| leg.stop_reached_on_board),
            accesses_on_foot: group_by_round(&setup.accesses, |leg| leg.stop_reached_on_foot()),
            destination,
            life_cycle,
            search: setup.search,
            number_of_rounds: setup.number_of_rounds,
            iteration_step: setup.iteration_step,
            initial_c2,
        })
    }

    pub fn route(mut self) -> RaptorWorkerResult {
        let iterations = C::iteration_times(&self.search, self.iteration_step);
        debug!(
            "Range raptor {:?} with {} iterations, {}",
            C::DIRECTION,
            iterations.len(),
            self.search
        );
        for (idx, iteration_time) in iterations.iter().enumerate() {
            self.strategy.set_first_iteration(idx == 0);
            self.run_iteration(*iteration_time);
        }
        self.result(iterations.len())
    }

    fn run_iteration(&mut self, iteration_time: Time) {
        self.life_cycle.setup_iteration(iteration_time);
        self.destination
            .borrow_mut()
            .set_iteration_time(iteration_time);
        for leg in &self.legs {
            leg.borrow_mut().clear_touched_stops_and_set_stop_markers();
        }
        self.add_accesses(iteration_time, 0, true);
        self.add_accesses(iteration_time, 0, false);

        let mut routes = FixedBitSet::with_capacity(self.data.nb_of_routes());
        let mut round = 0;
        while round < self.number_of_rounds && self.any_stop_touched() {
            round += 1;
            self.life_cycle.prepare_for_next_round(round);

            let mut alighted: Vec<Vec<ArrivalRef<D::Trip>>> = Vec::with_capacity(self.legs.len());
            for leg in &self.legs {
                let leg = leg.borrow();
                let mut arrivals = Vec::new();
                routes.clear();
                self.data.routes_touching_stops(leg.touched_stops(), &mut routes);
                for route in routes.ones() {
                    self.strategy.route(round, route, &leg, &mut arrivals);
                }
                alighted.push(arrivals);
            }
            // every leg sets its markers before arrivals are forwarded to it
            for leg in &self.legs {
                leg.borrow_mut().clear_touched_stops_and_set_stop_markers();
            }
            for (leg, arrivals) in self.legs.iter().zip(alighted) {
                for arrival in arrivals {
                    leg.borrow_mut().add_stop_arrival(arrival);
                }
            }
            self.add_accesses(iteration_time, round, true);
            self.life_cycle.transits_for_round_complete();

            for leg in &self.legs {
                self.transfers(leg);
            }
            self.add_accesses(iteration_time, round, false);
            self.life_cycle.transfers_for_round_complete();

            let destination_reached = !self.destination.borrow().is_empty();
            self.life_cycle.round_complete(destination_reached);
            trace!("Round {} of iteration {} done", round, iteration_time);
        }
        self.life_cycle.iteration_complete();
    }

    fn any_stop_touched(&self) -> bool {
        self.legs.iter().any(|leg| leg.borrow().any_stop_touched())
    }

    /// The accesses with `nb_of_rides` rides, reaching their stop on board
    /// or on foot.
    fn add_accesses(&self, iteration_time: Time, nb_of_rides: usize, on_board: bool) {
        let groups = if on_board {
            &self.accesses_on_board
        } else {
            &self.accesses_on_foot
        };
        let legs = match groups.get(nb_of_rides) {
            Some(legs) => legs,
            None => return,
        };
        let mut first_leg = self.legs[0].borrow_mut();
        for leg in legs {
            let arrival_time = C::leg_arrival_time(leg, iteration_time);
            let departure_time = C::minus_duration(arrival_time, leg.duration);
            first_leg.add_stop_arrival(Rc::new(McStopArrival::access(
                leg,
                departure_time,
                arrival_time,
                self.initial_c2,
            )));
        }
    }

    fn transfers(&self, leg: &Leg<D::Trip, C>) {
        let on_board: Vec<ArrivalRef<D::Trip>> = {
            let leg = leg.borrow();
            let stops: Vec<StopIdx> = leg.stops_touched_iter().collect();
            stops
                .into_iter()
                .flat_map(|stop| leg.list_arrivals_after_marker(stop).to_vec())
                .filter(|arrival| arrival.arrived_on_board())
                .collect()
        };
        for arrival in on_board {
            for transfer in C::transfers(self.data, arrival.stop) {
                let arrival_time = C::plus_duration(arrival.arrival_time, transfer.duration);
                let c1 = arrival.c1 + transfer.c1;
                leg.borrow_mut().add_stop_arrival(Rc::new(McStopArrival::transfer(
                    arrival.clone(),
                    transfer.stop,
                    transfer.duration,
                    arrival_time,
                    c1,
                )));
            }
        }
    }

    fn result(self, nb_of_iterations: usize) -> RaptorWorkerResult {
        let mut paths = self.destination.borrow().paths();
        paths.sort_by_key(|path| (path.departure_time, path.arrival_time, path.c1));
        debug!("{} paths found in {} iterations", paths.len(), nb_of_iterations);

        let first_leg = self.legs[0].borrow();
        let stops = 0..first_leg.nb_of_stops();
        RaptorWorkerResult {
            paths,
            best_arrival_times: stops
                .clone()
                .map(|stop| first_leg.best_arrival_time(stop))
                .collect(),
            best_transit_arrival_times: stops
                .clone()
                .map(|stop| first_leg.best_transit_arrival_time(stop))
                .collect(),
            min_transfers: stops
                .map(|stop| first_leg.smallest_number_of_transfers(stop))
                .collect(),
            nb_of_iterations,
        }
    }
}
