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

use std::slice::Iter as SliceIter;

/// Dominance relation used by a [`ParetoSet`].
pub trait ParetoComparator<T> {
    /// Returns `true` if `left` is strictly better than `right` on at least
    /// one criterion.
    fn left_dominance_exist(&self, left: &T, right: &T) -> bool;
}

impl<T, F> ParetoComparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn left_dominance_exist(&self, left: &T, right: &T) -> bool {
        self(left, right)
    }
}

/// A set of elements where no element dominates another one.
///
/// A marker splits the elements in two : those present when
/// [`mark_at_end_of_set`](ParetoSet::mark_at_end_of_set) was last called,
/// and those added since. Elements keep their insertion order.
pub struct ParetoSet<T, C> {
    elements: Vec<T>,
    marker: usize,
    comparator: C,
}

impl<T, C: ParetoComparator<T>> ParetoSet<T, C> {
    pub fn new(comparator: C) -> Self {
        Self {
            elements: Vec::new(),
            marker: 0,
            comparator,
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.marker = 0;
    }

    pub fn iter(&self) -> SliceIter<'_, T> {
        self.elements.iter()
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns `true` if `candidate` would be rejected by the set.
    pub fn dominates(&self, candidate: &T) -> bool {
        self.elements
            .iter()
            .any(|element| !self.comparator.left_dominance_exist(candidate, element))
    }

    /// Insert `value` if no element of the set is at least as good, and
    /// remove the elements `value` dominates.
    ///
    /// Returns `true` if `value` was inserted.
    pub fn add(&mut self, value: T) -> bool {
        self.add_and_notify(value, |_, _| {})
    }

    /// Same as [`add`](ParetoSet::add), calling `on_drop(dropped, value)` for
    /// every element removed because `value` dominates it.
    pub fn add_and_notify<F>(&mut self, value: T, mut on_drop: F) -> bool
    where
        F: FnMut(&T, &T),
    {
        if self.dominates(&value) {
            return false;
        }
        let mut idx = 0;
        while idx < self.elements.len() {
            if self
                .comparator
                .left_dominance_exist(&self.elements[idx], &value)
            {
                idx += 1;
                continue;
            }
            let dropped = self.elements.remove(idx);
            if idx < self.marker {
                self.marker -= 1;
            }
            on_drop(&dropped, &value);
        }
        self.elements.push(value);
        true
    }

    pub fn mark_at_end_of_set(&mut self) {
        self.marker = self.elements.len();
    }

    /// Elements added since the last call to
    /// [`mark_at_end_of_set`](ParetoSet::mark_at_end_of_set).
    pub fn elements_after_marker(&self) -> &[T] {
        &self.elements[self.marker..]
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }

    /// Replace the content of the set by `elements`, which must be
    /// pairwise non dominated.
    pub fn replace_with(&mut self, elements: Vec<T>) {
        self.elements = elements;
        self.marker = 0;
    }
}

impl<T: Clone, C: Clone> Clone for ParetoSet<T, C> {
    fn clone(&self) -> Self {
        Self {
            elements: self.elements.clone(),
            marker: self.marker,
            comparator: self.comparator.clone(),
        }
    }
}

impl<T: std::fmt::Debug, C> std::fmt::Debug for ParetoSet<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParetoSet")
            .field("elements", &self.elements)
            .field("marker", &self.marker)
            .finish()
    }
}
