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

use mcraptor::time::parse_time;
use mcraptor::traits::{ConstrainedTransfer, TransferConstraint, TransferPoint};
use mcraptor::{Time, TransitData, TransitDataProvider};

const DEFAULT_ROUTE_ID: &str = "default_route";

/// Builds a small in memory network, stops are created on first use.
///
/// ```ignore
/// let data = ModelBuilder::default()
///        .vj("toto", |vj_builder| {
///            vj_builder
///                .route("R1")
///                .st("A", "10:00:00")
///                .st("B", "11:00:00");
///        })
///        .add_transfer("B", "C", "00:02:00")
///        .build();
/// ```
#[derive(Default)]
pub struct ModelBuilder {
    stops: Vec<String>,
    vehicle_journeys: Vec<VehicleJourney>,
    transfers: Vec<(String, String, Time)>,
    constrained_transfers: Vec<ConstrainedTransferSpec>,
}

pub struct VehicleJourney {
    pub name: String,
    pub route: String,
    pub slack_index: usize,
    pub stop_times: Vec<StopTime>,
}

#[derive(Debug, Clone)]
pub struct StopTime {
    pub stop: String,
    pub arrival: Time,
    pub departure: Time,
    pub pickup_allowed: bool,
    pub drop_off_allowed: bool,
}

struct ConstrainedTransferSpec {
    from_vj: String,
    from_stop: String,
    to_vj: String,
    to_stop: String,
    // the constraint holds for every trip of the route of `to_vj`
    whole_route: bool,
    constraint: TransferConstraint,
}

pub struct VehicleJourneyBuilder<'a> {
    model: &'a mut ModelBuilder,
    vj: VehicleJourney,
}

pub trait IntoTime {
    fn into_time(&self) -> Time;
}

impl IntoTime for Time {
    fn into_time(&self) -> Time {
        *self
    }
}

impl IntoTime for &str {
    // Note: if the string is not in the right format, this conversion will fail
    fn into_time(&self) -> Time {
        parse_time(self).expect("invalid time format")
    }
}

impl ModelBuilder {
    /// Add a new vehicle journey to the model.
    ///
    /// Vehicle journeys without a route are put on a default route.
    pub fn vj<F>(mut self, name: &str, mut vj_initer: F) -> Self
    where
        F: FnMut(VehicleJourneyBuilder),
    {
        assert!(
            self.vehicle_journeys.iter().all(|vj| vj.name != name),
            "vj {} already exists",
            name
        );
        let vj_builder = VehicleJourneyBuilder {
            model: &mut self,
            vj: VehicleJourney {
                name: name.to_string(),
                route: DEFAULT_ROUTE_ID.to_string(),
                slack_index: 0,
                stop_times: Vec::new(),
            },
        };
        vj_initer(vj_builder);
        self
    }

    pub fn add_transfer(
        mut self,
        from_stop: &str,
        to_stop: &str,
        transfer_duration: impl IntoTime,
    ) -> Self {
        self.find_or_create_stop(from_stop);
        self.find_or_create_stop(to_stop);
        self.transfers.push((
            from_stop.to_string(),
            to_stop.to_string(),
            transfer_duration.into_time(),
        ));
        self
    }

    /// A constraint on the transfer from the vehicle journey `from_vj` at
    /// `from_stop` to the vehicle journey `to_vj` at `to_stop`.
    pub fn constrained_transfer(
        mut self,
        from: (&str, &str),
        to: (&str, &str),
        constraint: TransferConstraint,
    ) -> Self {
        self.constrained_transfers.push(ConstrainedTransferSpec {
            from_vj: from.0.to_string(),
            from_stop: from.1.to_string(),
            to_vj: to.0.to_string(),
            to_stop: to.1.to_string(),
            whole_route: false,
            constraint,
        });
        self
    }

    /// Same as [`constrained_transfer`](Self::constrained_transfer), the
    /// constraint holding for every trip of the route of `to_vj`.
    pub fn constrained_route_transfer(
        mut self,
        from: (&str, &str),
        to: (&str, &str),
        constraint: TransferConstraint,
    ) -> Self {
        self.constrained_transfers.push(ConstrainedTransferSpec {
            from_vj: from.0.to_string(),
            from_stop: from.1.to_string(),
            to_vj: to.0.to_string(),
            to_stop: to.1.to_string(),
            whole_route: true,
            constraint,
        });
        self
    }

    fn find_or_create_stop(&mut self, name: &str) {
        if !self.stops.iter().any(|stop| stop == name) {
            self.stops.push(name.to_string());
        }
    }

    /// Consume the builder to create the transit data
    pub fn build(self) -> TransitData {
        let mut data = TransitData::new();
        for stop in &self.stops {
            data.add_stop(stop);
        }
        for vj in &self.vehicle_journeys {
            let stops: Vec<_> = vj
                .stop_times
                .iter()
                .map(|st| data.add_stop(&st.stop))
                .collect();
            let board_allowed: Vec<_> = vj.stop_times.iter().map(|st| st.pickup_allowed).collect();
            let alight_allowed: Vec<_> =
                vj.stop_times.iter().map(|st| st.drop_off_allowed).collect();
            data.add_trip(
                &vj.route,
                &stops,
                &board_allowed,
                &alight_allowed,
                vj.slack_index,
                &vj.name,
                vj.stop_times.iter().map(|st| st.arrival).collect(),
                vj.stop_times.iter().map(|st| st.departure).collect(),
            )
            .unwrap_or_else(|err| panic!("invalid vj {} : {}", vj.name, err));
        }
        for (from, to, duration) in &self.transfers {
            let from = data.stop_idx(from).expect("unknown transfer stop");
            let to = data.stop_idx(to).expect("unknown transfer stop");
            data.add_transfer(from, to, *duration, *duration);
        }
        // trips are sorted once they are all added
        let constrained: Vec<_> = self
            .constrained_transfers
            .iter()
            .map(|constrained| ConstrainedTransfer {
                from: transfer_point(&data, &constrained.from_vj, &constrained.from_stop, false),
                to: transfer_point(&data, &constrained.to_vj, &constrained.to_stop, constrained.whole_route),
                constraint: constrained.constraint,
            })
            .collect();
        for transfer in constrained {
            data.add_constrained_transfer(transfer);
        }
        data
    }
}

fn transfer_point(data: &TransitData, vj: &str, stop: &str, whole_route: bool) -> TransferPoint {
    let (route, trip) = data
        .find_trip(vj)
        .unwrap_or_else(|| panic!("unknown vj {}", vj));
    let stop = data
        .stop_idx(stop)
        .unwrap_or_else(|| panic!("unknown stop {}", stop));
    let stop_pos = data
        .pattern(route)
        .stops
        .iter()
        .position(|s| *s == stop)
        .unwrap_or_else(|| panic!("vj {} does not serve stop {}", vj, stop));
    TransferPoint {
        route,
        trip: if whole_route { None } else { Some(trip) },
        stop_pos,
        stop,
    }
}

impl<'a> VehicleJourneyBuilder<'a> {
    /// add a StopTime to the vehicle journey
    ///
    /// Note: if the arrival/departure are given in string
    /// not in the right format, this conversion will fail
    pub fn st(self, name: &str, arrival: impl IntoTime) -> Self {
        self.st_mut(name, arrival.into_time(), arrival.into_time(), |_st| {})
    }

    pub fn st_detailed(
        self,
        name: &str,
        arrival: impl IntoTime,
        departure: impl IntoTime,
    ) -> Self {
        self.st_mut(name, arrival, departure, |_st| {})
    }

    pub fn st_mut<F>(
        mut self,
        name: &str,
        arrival: impl IntoTime,
        departure: impl IntoTime,
        st_muter: F,
    ) -> Self
    where
        F: FnOnce(&mut StopTime),
    {
        self.model.find_or_create_stop(name);
        let mut stop_time = StopTime {
            stop: name.to_string(),
            arrival: arrival.into_time(),
            departure: departure.into_time(),
            pickup_allowed: true,
            drop_off_allowed: true,
        };
        st_muter(&mut stop_time);
        self.vj.stop_times.push(stop_time);
        self
    }

    /// Set the route of the vj
    pub fn route(mut self, id: &str) -> Self {
        self.vj.route = id.to_string();
        self
    }

    pub fn slack_index(mut self, slack_index: usize) -> Self {
        self.vj.slack_index = slack_index;
        self
    }
}

impl<'a> Drop for VehicleJourneyBuilder<'a> {
    fn drop(&mut self) {
        let vj = VehicleJourney {
            name: std::mem::take(&mut self.vj.name),
            route: std::mem::take(&mut self.vj.route),
            slack_index: self.vj.slack_index,
            stop_times: std::mem::take(&mut self.vj.stop_times),
        };
        self.model.vehicle_journeys.push(vj);
    }
}
