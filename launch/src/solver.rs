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
use std::time::SystemTime;

use chrono::NaiveDateTime;
use mcraptor::access_egress::{
    remove_non_optimal_paths_for_mc_raptor, remove_non_optimal_paths_for_standard_raptor,
};
use mcraptor::engine::cost::{CostCalculator, DefaultCostCalculator};
use mcraptor::engine::debug::{DebugHandler, LoggingDebugHandler};
use mcraptor::engine::heuristics::HeuristicSearch;
use mcraptor::engine::pass_through::{BitSetPassThroughPointsService, PassThroughPointsService};
use mcraptor::engine::search_window::RaptorSearchWindowCalculator;
use mcraptor::engine::slack::{DefaultSlackProvider, ReverseSlackProvider, SlackProvider};
use mcraptor::engine::time_calculator::TransitCalculator;
use mcraptor::tracing::{debug, info, warn};
use mcraptor::{
    ForwardCalculator, PositiveDuration, RaptorAccessEgress, RaptorError, RaptorRequest,
    RaptorWorker, RaptorWorkerResult, ReverseCalculator, SearchDirection, SearchParams,
    TransitData, TransitDataProvider, ViaConnection, ViaConnections, WorkerSetup,
};

use crate::config::RequestParams;
use crate::datetime::{to_engine_time, DateTimeOutOfBound, DateTimeRepresent};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BadRequest {
    #[error("No valid departure stop among the provided ones")]
    NoValidDepartureStop,

    #[error("No valid arrival stop among the provided ones")]
    NoValidArrivalStop,

    #[error("No valid stop for the via point {0}")]
    NoValidViaStop(usize),

    #[error("Bad request datetime : {0}")]
    DateTime(#[from] DateTimeOutOfBound),

    #[error("{0}")]
    Raptor(#[from] RaptorError),
}

/// A request expressed with stop names, as received from a client.
#[derive(Debug, Clone)]
pub struct RequestInput {
    pub datetime: NaiveDateTime,
    pub datetime_represent: DateTimeRepresent,
    pub search_window: Option<PositiveDuration>,
    pub departures_stop_and_fallback_duration: Vec<(String, PositiveDuration)>,
    pub arrivals_stop_and_fallback_duration: Vec<(String, PositiveDuration)>,
    /// alternative stops of each via point, in the order of the journey
    pub via_stops: Vec<Vec<String>>,
    /// alternative stops of each pass-through point, in the order of the journey
    pub pass_through_stops: Vec<Vec<String>>,
}

impl RequestInput {
    pub fn new(datetime: NaiveDateTime, from: &str, to: &str) -> Self {
        Self {
            datetime,
            datetime_represent: DateTimeRepresent::Departure,
            search_window: None,
            departures_stop_and_fallback_duration: vec![(from.to_string(), PositiveDuration::zero())],
            arrivals_stop_and_fallback_duration: vec![(to.to_string(), PositiveDuration::zero())],
            via_stops: Vec::new(),
            pass_through_stops: Vec::new(),
        }
    }
}

pub struct Solver<'data> {
    data: &'data TransitData,
    params: RequestParams,
}

impl<'data> Solver<'data> {
    pub fn new(data: &'data TransitData, params: RequestParams) -> Self {
        Self { data, params }
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    pub fn solve_request(
        &self,
        request_input: &RequestInput,
    ) -> Result<RaptorWorkerResult, BadRequest> {
        let request = self.make_request(request_input)?;
        solve(self.data, &request, &self.params)
    }

    /// Resolve the stop names of `request_input`, unknown stops are ignored.
    pub fn make_request(&self, request_input: &RequestInput) -> Result<RaptorRequest, BadRequest> {
        let service_day = request_input.datetime.date();
        let time = to_engine_time(&request_input.datetime, &service_day)?;
        let mut request = match request_input.datetime_represent {
            DateTimeRepresent::Departure => RaptorRequest::depart_after(time),
            DateTimeRepresent::Arrival => RaptorRequest::arrive_before(time),
        };
        if let Some(search_window) = request_input.search_window {
            request.search = request
                .search
                .with_search_window(search_window.as_engine_duration());
        }

        request.accesses =
            self.street_legs(&request_input.departures_stop_and_fallback_duration, "departure");
        if request.accesses.is_empty() {
            return Err(BadRequest::NoValidDepartureStop);
        }
        request.egresses =
            self.street_legs(&request_input.arrivals_stop_and_fallback_duration, "arrival");
        if request.egresses.is_empty() {
            return Err(BadRequest::NoValidArrivalStop);
        }

        let min_wait_time = self.params.via_min_wait_time.as_engine_duration();
        for (idx, stops) in request_input.via_stops.iter().enumerate() {
            let connections: Vec<_> = self
                .known_stops(stops, "via")
                .into_iter()
                .map(|stop| ViaConnection::stop(stop, min_wait_time))
                .collect();
            if connections.is_empty() {
                return Err(BadRequest::NoValidViaStop(idx));
            }
            request.via.push(ViaConnections::new(idx, connections)?);
        }
        for stops in &request_input.pass_through_stops {
            request.pass_through.push(self.known_stops(stops, "pass-through"));
        }

        request.pareto_set_cost = self.params.pareto_set_cost;
        request.pareto_set_time = self.params.pareto_set_time;
        request.relax_c1 = self.params.relax_c1();
        request.use_heuristic_pruning = self.params.heuristic_pruning;
        Ok(request)
    }

    fn street_legs(&self, stops: &[(String, PositiveDuration)], kind: &str) -> Vec<RaptorAccessEgress> {
        stops
            .iter()
            .enumerate()
            .filter_map(|(idx, (stop_name, fallback_duration))| {
                let stop = self.data.stop_idx(stop_name).or_else(|| {
                    warn!(
                        "The {}th {} stop {} is not found in transit data. I ignore it.",
                        idx, kind, stop_name
                    );
                    None
                })?;
                let duration = fallback_duration.as_engine_duration();
                Some(RaptorAccessEgress::walk(stop, duration, duration))
            })
            .collect()
    }

    fn known_stops(&self, stops: &[String], kind: &str) -> Vec<usize> {
        stops
            .iter()
            .filter_map(|stop_name| {
                self.data.stop_idx(stop_name).or_else(|| {
                    warn!("The {} stop {} is not found in transit data. I ignore it.", kind, stop_name);
                    None
                })
            })
            .collect()
    }
}

/// Run `request` on `data`, in the direction of the request.
pub fn solve<D>(
    data: &D,
    request: &RaptorRequest,
    params: &RequestParams,
) -> Result<RaptorWorkerResult, BadRequest>
where
    D: TransitDataProvider,
    D::Trip: 'static,
{
    match request.direction {
        SearchDirection::Forward => {
            solve_with::<D, ForwardCalculator, ReverseCalculator>(data, request, params)
        }
        SearchDirection::Reverse => {
            solve_with::<D, ReverseCalculator, ForwardCalculator>(data, request, params)
        }
    }
}

// `C` is the direction of the search, `R` the opposite one, used by the
// heuristics.
fn solve_with<D, C, R>(
    data: &D,
    request: &RaptorRequest,
    params: &RequestParams,
) -> Result<RaptorWorkerResult, BadRequest>
where
    D: TransitDataProvider,
    D::Trip: 'static,
    C: TransitCalculator,
    R: TransitCalculator,
{
    let nb_of_stops = data.nb_of_stops();
    request.check_stops(nb_of_stops)?;
    let tuning = params.tuning_parameters();
    let number_of_rounds = tuning.number_of_rounds();
    let forward = C::search_forward();

    // the cost of the street legs only matters when c1 is a criterion
    let remove_non_optimal_paths: fn(Vec<RaptorAccessEgress>) -> Vec<RaptorAccessEgress> =
        if request.pareto_set_cost.include_c1() {
            remove_non_optimal_paths_for_mc_raptor
        } else {
            remove_non_optimal_paths_for_standard_raptor
        };
    let accesses = remove_non_optimal_paths(request.accesses.clone());
    let egresses = remove_non_optimal_paths(request.egresses.clone());
    let (accesses, egresses) = if forward {
        (accesses, egresses)
    } else {
        (egresses, accesses)
    };
    let via: Vec<ViaConnections> = if forward {
        request.via.clone()
    } else {
        request.via.iter().rev().map(ViaConnections::reversed).collect()
    };

    let slack_provider = DefaultSlackProvider::new(&params.slack_params());
    let (slack, heuristic_slack): (Rc<dyn SlackProvider>, Rc<dyn SlackProvider>) = if forward {
        (
            Rc::new(slack_provider.clone()),
            Rc::new(ReverseSlackProvider::new(slack_provider)),
        )
    } else {
        (
            Rc::new(ReverseSlackProvider::new(slack_provider.clone())),
            Rc::new(slack_provider),
        )
    };
    let cost_params = params.cost_params();
    let cost: Rc<dyn CostCalculator> = Rc::new(DefaultCostCalculator::new(&cost_params, C::DIRECTION));
    let heuristic_cost = DefaultCostCalculator::new(&cost_params, R::DIRECTION);

    let heuristics_timer = SystemTime::now();
    let mut heuristics =
        HeuristicSearch::<D, R>::new(data, heuristic_slack.as_ref(), &heuristic_cost, number_of_rounds)
            .run(&egresses, &accesses);
    if !heuristics.destination_reached() {
        info!("The destination cannot be reached from the origin");
        return Ok(RaptorWorkerResult::unreached::<C>(nb_of_stops));
    }
    let search_start = search_start::<C>(&request.search, heuristics.min_transit_time())?;
    let min_wait_time = HeuristicSearch::<D, C>::new(data, slack.as_ref(), cost.as_ref(), number_of_rounds)
        .min_wait_time(&heuristics, &accesses, &egresses, search_start);
    heuristics.set_min_wait_time(min_wait_time);
    debug!(
        "Heuristics computed in {} ms : min transit time {}s, min wait time {}s",
        elapsed_ms(&heuristics_timer),
        heuristics.min_transit_time(),
        heuristics.min_wait_time()
    );

    let search = RaptorSearchWindowCalculator::new(tuning.dynamic_search_window.clone()).calculate(
        &request.search,
        heuristics.min_transit_time(),
        heuristics.min_wait_time(),
    )?;

    // only a time given by the request bounds the search
    let time_limit = if forward {
        request.search.latest_arrival_time
    } else {
        request.search.earliest_departure_time
    };
    let pruning = if request.use_heuristic_pruning {
        Some(heuristics.destination_pruning(time_limit))
    } else {
        None
    };

    let pass_through: Option<Rc<dyn PassThroughPointsService>> = if request.pass_through.is_empty() {
        None
    } else {
        let service = BitSetPassThroughPointsService::new(&request.pass_through, nb_of_stops);
        if forward {
            Some(Rc::new(service))
        } else {
            Some(Rc::new(service.reversed()))
        }
    };
    let debug_handler: Option<Rc<dyn DebugHandler<D::Trip>>> =
        request.debug_stops.as_ref().map(|stops| {
            let handler = if stops.is_empty() {
                LoggingDebugHandler::all_stops()
            } else {
                LoggingDebugHandler::for_stops(stops, nb_of_stops)
            };
            Rc::new(handler) as Rc<dyn DebugHandler<D::Trip>>
        });

    let setup = WorkerSetup {
        accesses,
        egresses,
        via,
        search,
        number_of_rounds,
        iteration_step: tuning.iteration_departure_step.as_engine_duration(),
        pareto_set_cost: request.pareto_set_cost,
        pareto_set_time: request.pareto_set_time,
        relax_c1: request.relax_c1,
        time_limit,
        slack,
        cost,
        pass_through,
        debug: debug_handler,
        pruning,
    };
    let worker = RaptorWorker::<D, C>::new(data, setup)?;

    debug!("Start computing journeys");
    let request_timer = SystemTime::now();
    let result = worker.route();
    info!(
        "Journeys computed in {} ms with {} iterations",
        elapsed_ms(&request_timer),
        result.nb_of_iterations
    );
    info!("Nb of journeys found : {}", result.paths.len());
    Ok(result)
}

// The time the search starts from, in search direction. When the request
// only bounds the other end of the journey, the start is estimated from the
// smallest transit time.
fn search_start<C: TransitCalculator>(
    search: &SearchParams,
    min_transit_time: i32,
) -> Result<i32, RaptorError> {
    let start = match (
        C::search_forward(),
        search.earliest_departure_time,
        search.latest_arrival_time,
    ) {
        (true, Some(earliest_departure_time), _) => earliest_departure_time,
        (true, None, Some(latest_arrival_time)) => latest_arrival_time - min_transit_time,
        (false, _, Some(latest_arrival_time)) => latest_arrival_time,
        (false, Some(earliest_departure_time), None) => earliest_departure_time + min_transit_time,
        (_, None, None) => return Err(RaptorError::MissingSearchTime),
    };
    Ok(start)
}

fn elapsed_ms(timer: &SystemTime) -> u128 {
    match timer.elapsed() {
        Ok(duration) => duration.as_millis(),
        Err(err) => {
            warn!("Timer error : {}", err);
            0
        }
    }
}
