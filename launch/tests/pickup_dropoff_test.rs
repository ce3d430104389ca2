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

mod utils;

use anyhow::Error;
use launch::datetime::DateTimeRepresent;
use rstest::rstest;
use utils::{build_and_solve, model_builder::ModelBuilder, Config};

fn config(datetime_represent: DateTimeRepresent, start: &str, end: &str) -> Config {
    let datetime = match datetime_represent {
        DateTimeRepresent::Departure => "20200101T095900",
        DateTimeRepresent::Arrival => "20200101T101500",
    };
    let mut config = Config::new(datetime, start, end);
    config.datetime_represent = datetime_represent;
    config
}

#[rstest]
#[case(DateTimeRepresent::Departure)]
#[case(DateTimeRepresent::Arrival)]
fn test_forbidden_pickup(#[case] datetime_represent: DateTimeRepresent) -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = ModelBuilder::default()
        .vj("toto", |vj_builder| {
            vj_builder
                .route("1")
                .st_mut("A", "10:00:00", "10:00:00", |st| st.pickup_allowed = false)
                .st("B", "10:05:00")
                .st("C", "10:10:00");
        })
        .build();

    let result = build_and_solve(&data, &config(datetime_represent, "A", "B"))?;
    assert!(result.paths.is_empty());

    Ok(())
}

#[rstest]
#[case(DateTimeRepresent::Departure)]
#[case(DateTimeRepresent::Arrival)]
fn test_forbidden_dropoff(#[case] datetime_represent: DateTimeRepresent) -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = ModelBuilder::default()
        .vj("toto", |vj_builder| {
            vj_builder
                .route("1")
                .st("A", "10:00:00")
                .st_mut("B", "10:05:00", "10:05:00", |st| st.drop_off_allowed = false)
                .st("C", "10:10:00");
        })
        .build();

    let result = build_and_solve(&data, &config(datetime_represent, "A", "B"))?;
    assert!(result.paths.is_empty());

    // the vehicle can still be ridden through B
    let result = build_and_solve(&data, &config(datetime_represent, "A", "C"))?;
    assert_eq!(result.paths.len(), 1);

    Ok(())
}

#[rstest]
#[case(DateTimeRepresent::Departure)]
#[case(DateTimeRepresent::Arrival)]
fn test_skipped_stop(#[case] datetime_represent: DateTimeRepresent) -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = ModelBuilder::default()
        .vj("toto", |vj_builder| {
            vj_builder
                .route("1")
                .st("A", "10:00:00")
                .st_mut("B", "10:05:00", "10:05:00", |st| {
                    st.pickup_allowed = false;
                    st.drop_off_allowed = false;
                })
                .st("C", "10:10:00");
        })
        .build();

    // we can go from A to C
    let result = build_and_solve(&data, &config(datetime_represent, "A", "C"))?;
    assert_eq!(result.paths.len(), 1);
    assert_eq!(result.paths[0].number_of_transfers, 0);

    // but neither from A to B
    let result = build_and_solve(&data, &config(datetime_represent, "A", "B"))?;
    assert!(result.paths.is_empty());

    // nor from B to C
    let result = build_and_solve(&data, &config(datetime_represent, "B", "C"))?;
    assert!(result.paths.is_empty());

    Ok(())
}
