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

#![allow(dead_code)]
pub mod model_builder;

use anyhow::{format_err, Error};
use launch::config::RequestParams;
use launch::datetime::{parse_datetime, DateTimeRepresent};
use launch::solver::{RequestInput, Solver};
use mcraptor::time::time_to_str;
use mcraptor::tracing::debug;
use mcraptor::{PathLeg, PositiveDuration, RaptorPath, RaptorWorkerResult, TransitData};

pub struct Config {
    pub request_params: RequestParams,

    /// formatted as 20200101T080000
    pub datetime: String,

    pub datetime_represent: DateTimeRepresent,

    pub search_window: Option<PositiveDuration>,

    /// name of the start stop
    pub start: String,

    /// name of the end stop
    pub end: String,

    pub via: Vec<Vec<String>>,

    pub pass_through: Vec<Vec<String>>,
}

impl Config {
    pub fn new(datetime: &str, start: &str, end: &str) -> Self {
        Config {
            request_params: Default::default(),
            datetime: datetime.to_string(),
            datetime_represent: Default::default(),
            search_window: None,
            start: start.into(),
            end: end.into(),
            via: Vec::new(),
            pass_through: Vec::new(),
        }
    }
}

pub fn make_request_input(config: &Config) -> Result<RequestInput, Error> {
    let datetime = parse_datetime(&config.datetime)?;
    let mut request_input = RequestInput::new(datetime, &config.start, &config.end);
    request_input.datetime_represent = config.datetime_represent;
    request_input.search_window = config.search_window;
    request_input.via_stops = config.via.clone();
    request_input.pass_through_stops = config.pass_through.clone();
    Ok(request_input)
}

pub fn build_and_solve(data: &TransitData, config: &Config) -> Result<RaptorWorkerResult, Error> {
    let solver = Solver::new(data, config.request_params.clone());
    let request_input = make_request_input(config)?;
    let result = solver.solve_request(&request_input)?;
    for path in &result.paths {
        debug!("{}", path);
    }
    Ok(result)
}

/// Names of the boarding and alighting stops of each transit leg of `path`.
pub fn transit_stops(path: &RaptorPath, data: &TransitData) -> Vec<(String, String)> {
    use mcraptor::TransitDataProvider;
    path.transit_legs()
        .filter_map(|leg| match leg {
            PathLeg::Transit {
                board_stop,
                alight_stop,
                ..
            } => Some((
                data.stop_name(*board_stop).to_string(),
                data.stop_name(*alight_stop).to_string(),
            )),
            _ => None,
        })
        .collect()
}

pub fn find_path<'a>(
    result: &'a RaptorWorkerResult,
    arrival_time: &str,
) -> Result<&'a RaptorPath, Error> {
    result
        .paths
        .iter()
        .find(|path| time_to_str(path.arrival_time) == arrival_time)
        .ok_or_else(|| format_err!("No path arriving at {}", arrival_time))
}
