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

use tracing::debug;

use crate::config::{DynamicSearchWindowCoefficients, ResolvedSearchParams, SearchParams};
use crate::error::RaptorError;
use crate::time::{round_down_to_nearest_minute, Duration, SECONDS_PER_MINUTE};

/// Computes the values of [`SearchParams`] the request leaves open, from
/// the heuristics of the journey.
///
/// A calculator computes the window of a single search.
pub struct RaptorSearchWindowCalculator {
    coefficients: DynamicSearchWindowCoefficients,
    used: bool,
}

impl RaptorSearchWindowCalculator {
    pub fn new(coefficients: DynamicSearchWindowCoefficients) -> Self {
        Self {
            coefficients,
            used: false,
        }
    }

    fn step(&self) -> Duration {
        (self.coefficients.step_minutes.max(1) as Duration) * SECONDS_PER_MINUTE
    }

    /// Round `duration` to the nearest multiple of the step, halves away
    /// from zero.
    pub fn round_step(&self, duration: f64) -> Duration {
        let step = self.step() as f64;
        ((duration / step).round() * step) as Duration
    }

    pub fn calculate(
        &mut self,
        search: &SearchParams,
        min_transit_time: Duration,
        min_wait_time: Duration,
    ) -> Result<ResolvedSearchParams, RaptorError> {
        if self.used {
            return Err(RaptorError::SearchWindowCalculatorReused);
        }
        self.used = true;

        let travel_time = round_down_to_nearest_minute(min_transit_time.max(0));
        let search_window = match (
            search.search_window,
            search.earliest_departure_time,
            search.latest_arrival_time,
        ) {
            (Some(search_window), _, _) => search_window,
            (None, Some(earliest_departure_time), Some(latest_arrival_time)) => {
                let travel_window = latest_arrival_time - earliest_departure_time;
                self.round_step(f64::from(travel_window - min_transit_time)).max(0)
            }
            (None, _, _) => {
                let coefficients = &self.coefficients;
                let window = f64::from(coefficients.min_window.as_engine_duration())
                    + coefficients.min_transit_time_coefficient * f64::from(min_transit_time)
                    + coefficients.min_wait_time_coefficient * f64::from(min_wait_time.max(0));
                self.round_step(window)
                    .min(coefficients.max_window.as_engine_duration())
            }
        };

        let (earliest_departure_time, latest_arrival_time) =
            match (search.earliest_departure_time, search.latest_arrival_time) {
                (Some(edt), Some(lat)) => (edt, lat),
                (Some(edt), None) => (edt, edt + search_window + travel_time),
                (None, Some(lat)) => (lat - search_window - travel_time, lat),
                (None, None) => return Err(RaptorError::MissingSearchTime),
            };
        let result = ResolvedSearchParams {
            earliest_departure_time,
            latest_arrival_time,
            search_window,
        };
        debug!("Search window resolved : {}", result);
        Ok(result)
    }
}
