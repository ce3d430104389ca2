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

#[cfg(test)]
mod test {
    use super::utils::model_builder::ModelBuilder;
    use mcraptor::traits::{TransferConstraint, TripSchedule};
    use mcraptor::TransitDataProvider;

    #[test]
    fn simple_model_creation() {
        let data = ModelBuilder::default()
            .vj("toto", |vj_builder| {
                vj_builder.st("A", "10:00:00").st("B", "11:00:00");
            })
            .vj("tata", |vj_builder| {
                vj_builder.st("C", "10:00:00").st("D", "11:00:00");
            })
            .build();

        assert_eq!(data.nb_of_stops(), 4);
        // both vjs are on the default route, but serve different stops
        assert_eq!(data.nb_of_routes(), 2);

        let (route, trip) = data.find_trip("toto").unwrap();
        let stops: Vec<_> = data
            .pattern(route)
            .stops
            .iter()
            .map(|stop| data.stop_name(*stop))
            .collect();
        assert_eq!(stops, ["A", "B"]);
        assert_eq!(data.trips(route)[trip].departure(0), 36_000);
        assert_eq!(data.trips(route)[trip].arrival(1), 39_600);
    }

    #[test]
    fn same_stop_model_creation() {
        let data = ModelBuilder::default()
            .vj("toto", |vj| {
                vj.st("A", "10:00:00").st("B", "11:00:00");
            })
            .vj("tata", |vj| {
                vj.st("A", "10:00:00").st("D", "11:00:00");
            })
            .build();

        assert_eq!(data.nb_of_stops(), 3);
        let a = data.stop_idx("A").unwrap();
        let (toto_route, _) = data.find_trip("toto").unwrap();
        let (tata_route, _) = data.find_trip("tata").unwrap();
        assert_eq!(data.pattern(toto_route).stop_at(0), a);
        assert_eq!(data.pattern(tata_route).stop_at(0), a);
    }

    #[test]
    fn trips_of_a_route_are_sorted() {
        let data = ModelBuilder::default()
            .vj("late", |vj| {
                vj.route("R1").st("A", "11:00:00").st("B", "11:30:00");
            })
            .vj("early", |vj| {
                vj.route("R1").st("A", "10:00:00").st("B", "10:30:00");
            })
            .build();

        assert_eq!(data.nb_of_routes(), 1);
        let (route, early) = data.find_trip("early").unwrap();
        let (_, late) = data.find_trip("late").unwrap();
        assert_eq!((early, late), (0, 1));
        assert_eq!(data.trips(route)[late].trip_sort_index(), 1);
    }

    #[test]
    fn overtaking_trips_get_their_own_route() {
        let data = ModelBuilder::default()
            .vj("slow", |vj| {
                vj.route("R1").st("A", "10:00:00").st("B", "11:00:00");
            })
            .vj("fast", |vj| {
                vj.route("R1").st("A", "10:10:00").st("B", "10:30:00");
            })
            .build();

        assert_eq!(data.nb_of_routes(), 2);
        assert_eq!(data.routes_named("R1").len(), 2);
    }

    #[test]
    fn pickup_and_drop_off() {
        let data = ModelBuilder::default()
            .vj("toto", |vj| {
                vj.st_mut("A", "10:00:00", "10:00:00", |st| st.drop_off_allowed = false)
                    .st_mut("B", "10:30:00", "10:31:00", |st| st.pickup_allowed = false);
            })
            .build();

        let (route, _) = data.find_trip("toto").unwrap();
        let pattern = data.pattern(route);
        assert!(pattern.can_board(0));
        assert!(!pattern.can_alight(0));
        assert!(!pattern.can_board(1));
        assert!(pattern.can_alight(1));
    }

    #[test]
    fn transfers_and_constraints() {
        let data = ModelBuilder::default()
            .vj("first", |vj| {
                vj.route("R1").st("A", "10:00:00").st("B", "10:05:00");
            })
            .vj("second", |vj| {
                vj.route("R2").st("C", "10:10:00").st("D", "10:15:00");
            })
            .add_transfer("B", "C", "00:02:00")
            .constrained_transfer(("first", "B"), ("second", "C"), TransferConstraint::guaranteed())
            .build();

        let b = data.stop_idx("B").unwrap();
        let c = data.stop_idx("C").unwrap();
        let transfers = data.transfers_from_stop(b);
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].stop, c);
        assert_eq!(transfers[0].duration, 120);
        assert_eq!(data.transfers_to_stop(c)[0].stop, b);

        assert!(data.has_constrained_transfers());
        let (route, trip) = data.find_trip("second").unwrap();
        let constrained = data.constrained_transfers_to(route, 0);
        assert_eq!(constrained.len(), 1);
        assert_eq!(constrained[0].to.trip, Some(trip));
        assert_eq!(constrained[0].from.stop, b);
        assert!(constrained[0].constraint.guaranteed);
    }
}
