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

use crate::config::ParetoSetCost;
use crate::traits::StopIdx;

/// Errors raised while wiring a search together.
///
/// They all denote a programming error in the way the search is assembled,
/// not a data problem : a search never fails once it is running.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RaptorError {
    #[error("Stop arrivals cannot be wired to both the egress paths and the via connections of a next leg")]
    EgressAndViaListeners,

    #[error("The via connection group {0} has no connection")]
    EmptyViaConnections(usize),

    #[error("Pass-through points require a pareto set cost including c2, got {0}")]
    PassThroughWithoutC2(ParetoSetCost),

    #[error("The search window calculator has already been used")]
    SearchWindowCalculatorReused,

    #[error("Neither an earliest departure time nor a latest arrival time is given")]
    MissingSearchTime,

    #[error("No access path given")]
    NoAccess,

    #[error("No egress path given")]
    NoEgress,

    #[error("The stop {stop} does not exist, the transit data has {nb_of_stops} stops")]
    UnknownStop { stop: StopIdx, nb_of_stops: usize },

    #[error("Trip search needs at least one iteration step of one second, got {0}")]
    BadIterationStep(i32),
}
