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
use std::rc::Rc;
use tracing::debug;

use crate::engine::life_cycle::LifeCycle;
use crate::engine::stop_arrival::{ArrivalKind, ArrivalRef};
use crate::time::{time_to_str, Time};
use crate::traits::{StopIdx, TripSchedule};

/// Observer of the stop arrival events of a search.
pub trait DebugHandler<T> {
    /// `arrival` was inserted in the pareto set of its stop.
    fn accept(&self, arrival: &ArrivalRef<T>);

    /// `arrival` was not inserted.
    fn reject(&self, arrival: &ArrivalRef<T>, reason: &str);

    /// `arrival` was removed from its pareto set because `dominated_by` was
    /// inserted.
    fn dropped(&self, arrival: &ArrivalRef<T>, dominated_by: &ArrivalRef<T>);

    fn iteration_started(&self, _iteration_time: Time) {}

    fn round_started(&self, _round: usize) {}

    fn transits_complete(&self) {}

    fn transfers_complete(&self) {}

    fn round_complete(&self, _destination_reached: bool) {}

    fn iteration_complete(&self) {}
}

/// Forward the events of `life_cycle` to `handler`.
pub fn subscribe_to_life_cycle<T: 'static>(
    handler: &Rc<dyn DebugHandler<T>>,
    life_cycle: &mut LifeCycle,
) {
    let subscriber = handler.clone();
    life_cycle.on_setup_iteration(move |time| subscriber.iteration_started(time));
    let subscriber = handler.clone();
    life_cycle.on_prepare_for_next_round(move |round| subscriber.round_started(round));
    let subscriber = handler.clone();
    life_cycle.on_transits_for_round_complete(move || subscriber.transits_complete());
    let subscriber = handler.clone();
    life_cycle.on_transfers_for_round_complete(move || subscriber.transfers_complete());
    let subscriber = handler.clone();
    life_cycle.on_round_complete(move |reached| subscriber.round_complete(reached));
    let subscriber = handler.clone();
    life_cycle.on_iteration_complete(move || subscriber.iteration_complete());
}

/// Logs the events of the stops of interest, or of every stop.
pub struct LoggingDebugHandler {
    stops: Option<FixedBitSet>,
}

impl LoggingDebugHandler {
    pub fn all_stops() -> Self {
        Self { stops: None }
    }

    pub fn for_stops(stops: &[StopIdx], nb_of_stops: usize) -> Self {
        let mut set = FixedBitSet::with_capacity(nb_of_stops);
        for stop in stops {
            set.insert(*stop);
        }
        Self { stops: Some(set) }
    }

    fn is_debugged(&self, stop: StopIdx) -> bool {
        self.stops.as_ref().map_or(true, |stops| stops.contains(stop))
    }
}

fn describe<T: TripSchedule>(arrival: &ArrivalRef<T>) -> String {
    let kind = match &arrival.kind {
        ArrivalKind::Access { .. } => "access".to_string(),
        ArrivalKind::Transit { trip, board_stop, .. } => format!(
            "transit route {} trip {} from stop {}",
            trip.route_index(),
            trip.trip_sort_index(),
            board_stop
        ),
        ArrivalKind::Transfer { from_stop, .. } => format!("transfer from stop {}", from_stop),
        ArrivalKind::Via { from_stop, .. } => format!("via from stop {}", from_stop),
    };
    format!(
        "stop {} at {} round {} c1 {} c2 {} by {}",
        arrival.stop,
        time_to_str(arrival.arrival_time),
        arrival.round,
        arrival.c1,
        arrival.c2,
        kind
    )
}

impl<T: TripSchedule> DebugHandler<T> for LoggingDebugHandler {
    fn accept(&self, arrival: &ArrivalRef<T>) {
        if self.is_debugged(arrival.stop) {
            debug!("Accept {}", describe(arrival));
        }
    }

    fn reject(&self, arrival: &ArrivalRef<T>, reason: &str) {
        if self.is_debugged(arrival.stop) {
            debug!("Reject {} : {}", describe(arrival), reason);
        }
    }

    fn dropped(&self, arrival: &ArrivalRef<T>, dominated_by: &ArrivalRef<T>) {
        if self.is_debugged(arrival.stop) {
            debug!(
                "Drop {} dominated by {}",
                describe(arrival),
                describe(dominated_by)
            );
        }
    }

    fn iteration_started(&self, iteration_time: Time) {
        debug!("Start iteration {}", time_to_str(iteration_time));
    }

    fn round_started(&self, round: usize) {
        debug!("Start round {}", round);
    }

    fn round_complete(&self, destination_reached: bool) {
        if destination_reached {
            debug!("Round complete, the destination is reached");
        }
    }

    fn iteration_complete(&self) {
        debug!("Iteration complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transit_data::TripTimes;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingHandler {
        events: RefCell<Vec<String>>,
    }

    impl RecordingHandler {
        fn push(&self, event: String) {
            self.events.borrow_mut().push(event);
        }
    }

    impl DebugHandler<TripTimes> for RecordingHandler {
        fn accept(&self, _arrival: &ArrivalRef<TripTimes>) {}

        fn reject(&self, _arrival: &ArrivalRef<TripTimes>, _reason: &str) {}

        fn dropped(&self, _arrival: &ArrivalRef<TripTimes>, _dominated_by: &ArrivalRef<TripTimes>) {}

        fn iteration_started(&self, iteration_time: Time) {
            self.push(format!("iteration {}", iteration_time));
        }

        fn round_started(&self, round: usize) {
            self.push(format!("round {}", round));
        }

        fn transits_complete(&self) {
            self.push("transits".to_string());
        }

        fn transfers_complete(&self) {
            self.push("transfers".to_string());
        }

        fn round_complete(&self, destination_reached: bool) {
            self.push(format!("reached {}", destination_reached));
        }

        fn iteration_complete(&self) {
            self.push("done".to_string());
        }
    }

    #[test]
    fn life_cycle_events_reach_the_handler() {
        let recording = Rc::new(RecordingHandler::default());
        let handler: Rc<dyn DebugHandler<TripTimes>> = recording.clone();
        let mut life_cycle = LifeCycle::new();
        subscribe_to_life_cycle(&handler, &mut life_cycle);

        life_cycle.setup_iteration(28_800);
        life_cycle.prepare_for_next_round(1);
        life_cycle.transits_for_round_complete();
        life_cycle.transfers_for_round_complete();
        life_cycle.round_complete(true);
        life_cycle.iteration_complete();
        assert_eq!(
            *recording.events.borrow(),
            vec![
                "iteration 28800",
                "round 1",
                "transits",
                "transfers",
                "reached true",
                "done"
            ]
        );
    }
}
