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
use launch::solver::Solver;
use mcraptor::time::time_to_str;
use mcraptor::{ParetoSetCost, PositiveDuration, TransitData};
use rstest::rstest;
use utils::model_builder::ModelBuilder;
use utils::{build_and_solve, find_path, make_request_input, transit_stops, Config};

// A direct route from A to C, and a faster one with a transfer at B.
fn direct_or_transfer() -> TransitData {
    ModelBuilder::default()
        .vj("direct", |vj_builder| {
            vj_builder
                .route("R1")
                .st("A", "08:00:00")
                .st("C", "08:10:00");
        })
        .vj("first", |vj_builder| {
            vj_builder
                .route("R2")
                .st("A", "08:00:00")
                .st("B", "08:02:00");
        })
        .vj("second", |vj_builder| {
            vj_builder
                .route("R3")
                .st("B", "08:03:00")
                .st("C", "08:05:00");
        })
        .build()
}

#[test]
fn test_simple_routing() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = ModelBuilder::default()
        .vj("toto", |vj_builder| {
            vj_builder
                .route("R1")
                .st_detailed("A", "10:00:00", "10:00:01")
                .st_detailed("B", "10:05:00", "10:05:01")
                .st_detailed("C", "10:10:00", "10:10:01");
        })
        .build();

    let config = Config::new("20200101T095900", "A", "B");
    let result = build_and_solve(&data, &config)?;

    assert_eq!(result.paths.len(), 1);
    let path = &result.paths[0];
    assert!(path.is_valid());
    assert_eq!(path.number_of_transfers, 0);
    // the access is left as late as possible before boarding
    assert_eq!(time_to_str(path.iteration_departure_time), "10:00:00");
    assert_eq!(time_to_str(path.departure_time), "10:00:01");
    assert_eq!(time_to_str(path.arrival_time), "10:05:00");
    assert_eq!(path.duration(), 299);
    let board_times: Vec<_> = path
        .transit_legs()
        .map(|leg| time_to_str(leg.departure_time()))
        .collect();
    assert_eq!(board_times, vec!["10:00:01".to_string()]);
    assert_eq!(
        transit_stops(path, &data),
        vec![("A".to_string(), "B".to_string())]
    );
    Ok(())
}

#[test]
fn test_pareto_optimal_journeys() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = direct_or_transfer();
    let mut config = Config::new("20200101T080000", "A", "C");
    config.request_params.transfer_cost = 400;
    let result = build_and_solve(&data, &config)?;

    // the transfer saves five minutes but costs more
    assert_eq!(result.paths.len(), 2);

    let fast = &result.paths[0];
    assert_eq!(time_to_str(fast.arrival_time), "08:05:00");
    assert_eq!(fast.number_of_transfers, 1);
    assert_eq!(fast.c1, 700);
    assert_eq!(
        transit_stops(fast, &data),
        vec![
            ("A".to_string(), "B".to_string()),
            ("B".to_string(), "C".to_string())
        ]
    );

    let direct = &result.paths[1];
    assert_eq!(time_to_str(direct.arrival_time), "08:10:00");
    assert_eq!(direct.number_of_transfers, 0);
    assert_eq!(direct.c1, 600);

    for path in &result.paths {
        assert!(path.is_valid());
        assert_eq!(time_to_str(path.departure_time), "08:00:00");
        assert_eq!(time_to_str(path.iteration_departure_time), "08:00:00");
    }
    Ok(())
}

#[test]
fn test_arrive_before() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = direct_or_transfer();
    let mut config = Config::new("20200101T081000", "A", "C");
    config.datetime_represent = DateTimeRepresent::Arrival;
    config.request_params.transfer_cost = 400;
    let result = build_and_solve(&data, &config)?;

    assert_eq!(result.paths.len(), 2);
    let fast = find_path(&result, "08:05:00")?;
    assert_eq!(time_to_str(fast.departure_time), "08:00:00");
    assert_eq!(fast.number_of_transfers, 1);
    assert_eq!(fast.c1, 700);
    assert_eq!(transit_stops(fast, &data).len(), 2);

    let direct = find_path(&result, "08:10:00")?;
    assert_eq!(time_to_str(direct.departure_time), "08:00:00");
    assert_eq!(direct.number_of_transfers, 0);
    assert_eq!(direct.c1, 600);

    // legs are given in the order they are travelled
    for path in &result.paths {
        assert!(path.is_valid());
    }
    Ok(())
}

#[rstest]
#[case(DateTimeRepresent::Departure, "20200101T080000")]
#[case(DateTimeRepresent::Arrival, "20200101T080500")]
fn test_both_directions_find_the_fastest_journey(
    #[case] datetime_represent: DateTimeRepresent,
    #[case] datetime: &str,
) -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = direct_or_transfer();
    let mut config = Config::new(datetime, "A", "C");
    config.datetime_represent = datetime_represent;
    let result = build_and_solve(&data, &config)?;

    let min_duration = result.paths.iter().map(|path| path.duration()).min();
    assert_eq!(min_duration, Some(300));
    Ok(())
}

#[test]
fn test_routing_with_transfers() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = ModelBuilder::default()
        .vj("toto", |vj_builder| {
            vj_builder
                .route("R1")
                .st("A", "10:00:00")
                .st("B", "10:05:00")
                .st("C", "10:10:00");
        })
        .vj("tata", |vj_builder| {
            vj_builder
                .route("R2")
                .st("E", "10:05:00")
                .st("F", "10:20:00")
                .st("G", "10:30:00");
        })
        .add_transfer("B", "F", "00:02:00")
        .build();

    let config = Config::new("20200101T095900", "A", "G");
    let result = build_and_solve(&data, &config)?;
    assert_eq!(result.paths.len(), 1);
    let path = &result.paths[0];
    assert_eq!(time_to_str(path.arrival_time), "10:30:00");
    assert_eq!(
        transit_stops(path, &data),
        vec![
            ("A".to_string(), "B".to_string()),
            ("F".to_string(), "G".to_string())
        ]
    );

    let data = ModelBuilder::default()
        .vj("toto", |vj_builder| {
            vj_builder
                .route("R1")
                .st("A", "10:00:00")
                .st("B", "10:05:00");
        })
        .vj("tata", |vj_builder| {
            vj_builder
                .route("R2")
                .st("E", "10:05:00")
                .st("F", "10:10:00")
                .st("G", "10:30:00");
        })
        .add_transfer("B", "E", "00:02:00")
        .vj("titi", |vj_builder| {
            vj_builder
                .route("R2")
                .st("E", "10:15:00")
                .st("F", "10:20:00")
                .st("G", "10:40:00");
        })
        .build();

    let result = build_and_solve(&data, &config)?;
    assert_eq!(result.paths.len(), 1);
    let path = &result.paths[0];
    assert!(path.is_valid());
    assert_eq!(path.number_of_transfers, 1);
    assert_eq!(time_to_str(path.arrival_time), "10:40:00");
    assert_eq!(
        transit_stops(path, &data),
        vec![
            ("A".to_string(), "B".to_string()),
            ("E".to_string(), "G".to_string())
        ]
    );
    Ok(())
}

#[test]
fn test_unreachable_destination() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = ModelBuilder::default()
        .vj("toto", |vj_builder| {
            vj_builder
                .route("R1")
                .st("A", "10:00:00")
                .st("B", "10:05:00");
        })
        .vj("tata", |vj_builder| {
            vj_builder
                .route("R2")
                .st("C", "10:10:00")
                .st("D", "10:15:00");
        })
        .build();

    let config = Config::new("20200101T095900", "A", "D");
    let result = build_and_solve(&data, &config)?;
    assert!(result.paths.is_empty());
    assert_eq!(result.nb_of_iterations, 0);
    Ok(())
}

#[test]
fn test_explicit_search_window() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = direct_or_transfer();
    let mut config = Config::new("20200101T080000", "A", "C");
    config.search_window = Some(PositiveDuration::from_hms(0, 10, 0));
    let result = build_and_solve(&data, &config)?;

    assert_eq!(result.nb_of_iterations, 10);
    assert!(!result.paths.is_empty());
    Ok(())
}

#[test]
fn test_dynamic_search_window() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = ModelBuilder::default()
        .vj("toto", |vj_builder| {
            vj_builder
                .route("R1")
                .st("A", "08:05:00")
                .st("B", "08:25:00");
        })
        .build();

    let mut config = Config::new("20200101T080000", "A", "B");
    config.request_params.min_transit_time_coefficient = 2.0;
    config.request_params.min_wait_time_coefficient = 1.0;
    config.request_params.min_search_window = PositiveDuration::from_hms(0, 10, 0);
    config.request_params.max_search_window = PositiveDuration::from_hms(2, 0, 0);
    let result = build_and_solve(&data, &config)?;

    // 10 min + 2 * 20 min of transit + 5 min of wait, rounded to 60 min
    assert_eq!(result.nb_of_iterations, 60);
    assert_eq!(result.paths.len(), 1);

    config.request_params.max_search_window = PositiveDuration::from_hms(0, 30, 0);
    let result = build_and_solve(&data, &config)?;
    assert_eq!(result.nb_of_iterations, 30);
    Ok(())
}

#[test]
fn test_time_and_transfers_only() -> Result<(), Error> {
    let _log_guard = launch::logger::init_test_logger();

    let data = direct_or_transfer();
    let mut config = Config::new("20200101T080000", "A", "C");
    config.request_params.pareto_set_cost = ParetoSetCost::None;
    config.request_params.transfer_cost = 400;
    let mut request_input = make_request_input(&config)?;
    // a slower way to reach A, dropped before the search
    request_input
        .departures_stop_and_fallback_duration
        .push(("A".to_string(), PositiveDuration::from_hms(0, 5, 0)));
    let solver = Solver::new(&data, config.request_params.clone());
    let result = solver.solve_request(&request_input)?;

    // the cost is not compared, both journeys are kept on transfers
    assert_eq!(result.paths.len(), 2);
    assert_eq!(time_to_str(result.paths[0].arrival_time), "08:05:00");
    assert_eq!(result.paths[0].number_of_transfers, 1);
    assert_eq!(time_to_str(result.paths[1].arrival_time), "08:10:00");
    assert_eq!(result.paths[1].number_of_transfers, 0);
    for path in &result.paths {
        assert_eq!(time_to_str(path.departure_time), "08:00:00");
    }
    Ok(())
}
