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

use crate::config::SlackParams;
use crate::time::Duration;

/// Slack applied around boarding and alighting, in search direction.
pub trait SlackProvider {
    /// Time between the arrival at a stop and the boarding of a trip of a
    /// route with the given `slack_index`.
    fn board_slack(&self, slack_index: usize) -> Duration;

    /// Time between the arrival of a trip of a route with the given
    /// `slack_index` at a stop and the moment the passenger is at the stop.
    fn alight_slack(&self, slack_index: usize) -> Duration;

    /// Added to the board slack when the passenger changes vehicle.
    fn transfer_slack(&self) -> Duration;
}

/// Slack in real world direction, with optional values per slack index.
#[derive(Debug, Clone, Default)]
pub struct DefaultSlackProvider {
    board_slack: Duration,
    alight_slack: Duration,
    transfer_slack: Duration,
    board_slack_by_index: Vec<Option<Duration>>,
    alight_slack_by_index: Vec<Option<Duration>>,
}

impl DefaultSlackProvider {
    pub fn new(params: &SlackParams) -> Self {
        Self {
            board_slack: params.board_slack.as_engine_duration(),
            alight_slack: params.alight_slack.as_engine_duration(),
            transfer_slack: params.transfer_slack.as_engine_duration(),
            board_slack_by_index: Vec::new(),
            alight_slack_by_index: Vec::new(),
        }
    }

    pub fn with_slack_for_index(
        mut self,
        slack_index: usize,
        board_slack: Duration,
        alight_slack: Duration,
    ) -> Self {
        if self.board_slack_by_index.len() <= slack_index {
            self.board_slack_by_index.resize(slack_index + 1, None);
            self.alight_slack_by_index.resize(slack_index + 1, None);
        }
        self.board_slack_by_index[slack_index] = Some(board_slack);
        self.alight_slack_by_index[slack_index] = Some(alight_slack);
        self
    }
}

impl SlackProvider for DefaultSlackProvider {
    fn board_slack(&self, slack_index: usize) -> Duration {
        self.board_slack_by_index
            .get(slack_index)
            .copied()
            .flatten()
            .unwrap_or(self.board_slack)
    }

    fn alight_slack(&self, slack_index: usize) -> Duration {
        self.alight_slack_by_index
            .get(slack_index)
            .copied()
            .flatten()
            .unwrap_or(self.alight_slack)
    }

    fn transfer_slack(&self) -> Duration {
        self.transfer_slack
    }
}

/// In a reverse search the passenger "boards" where the trip is left in
/// the real world : board and alight slack are swapped.
#[derive(Debug, Clone)]
pub struct ReverseSlackProvider<S> {
    inner: S,
}

impl<S: SlackProvider> ReverseSlackProvider<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: SlackProvider> SlackProvider for ReverseSlackProvider<S> {
    fn board_slack(&self, slack_index: usize) -> Duration {
        self.inner.alight_slack(slack_index)
    }

    fn alight_slack(&self, slack_index: usize) -> Duration {
        self.inner.board_slack(slack_index)
    }

    fn transfer_slack(&self) -> Duration {
        self.inner.transfer_slack()
    }
}

impl<S: SlackProvider + ?Sized> SlackProvider for Box<S> {
    fn board_slack(&self, slack_index: usize) -> Duration {
        (**self).board_slack(slack_index)
    }

    fn alight_slack(&self, slack_index: usize) -> Duration {
        (**self).alight_slack(slack_index)
    }

    fn transfer_slack(&self) -> Duration {
        (**self).transfer_slack()
    }
}
