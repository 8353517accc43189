/*
 * Copyright (c) 2003-2023. Trevor Campbell and others.
 *
 * This file is part of Kelpie FMC.
 *
 * Kelpie FMC is free software; you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation; either version 2 of the License, or
 * (at your option) any later version.
 *
 * Kelpie FMC is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Kelpie FMC; if not, write to the Free Software
 * Foundation, Inc., 59 Temple Place, Suite 330, Boston, MA  02111-1307  USA
 *
 * Contributors:
 *      Trevor Campbell
 *
 */

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::earth::projection::Projection;
use crate::navdata::Navdata;

use super::location::Location;
use super::waypoint::{Waypoint, WaypointFlag, WaypointKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteType {
    #[default]
    Route,
    Airway,
    Procedure,
    Sid,
    Star,
    Approach,
    Transition,
}

/// Which copy of a route a change belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RouteFlag {
    #[default]
    Normal,
    Alternate,
    Secondary,
    Temporary,
}

/// Geometry of the legs around one waypoint. Tracks are degrees true, distances NM.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegData {
    pub track_to_next: f64,
    pub dist_to_next: f64,
    pub track_from_prev: f64,
    pub dist_from_prev: f64,
    pub overflown_at: Option<DateTime<Utc>>,
}

/// Ordered waypoints with a leg cache kept index aligned with them.
#[derive(Debug, Clone, Default)]
pub struct Route {
    id: String,
    route_type: RouteType,
    flag: RouteFlag,
    flag_fixed: bool,
    waypoints: Vec<Waypoint>,
    legs: Vec<LegData>,
}

impl Route {
    pub fn new(id: &str, route_type: RouteType) -> Self {
        Self {
            id: id.to_string(),
            route_type,
            ..Default::default()
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    pub fn get_type(&self) -> RouteType {
        self.route_type
    }

    pub fn set_type(&mut self, route_type: RouteType) {
        self.route_type = route_type;
    }

    pub fn get_flag(&self) -> RouteFlag {
        self.flag
    }

    pub fn set_flag(&mut self, flag: RouteFlag) {
        self.flag = flag;
    }

    pub fn set_flag_fixed(&mut self, fixed: bool) {
        self.flag_fixed = fixed;
    }

    pub fn is_flag_fixed(&self) -> bool {
        self.flag_fixed
    }

    /// Take over the content of `other`. A fixed flag survives the copy.
    pub fn copy_from(&mut self, other: &Route) {
        self.id = other.id.clone();
        self.route_type = other.route_type;
        self.waypoints = other.waypoints.clone();
        self.legs = other.legs.clone();
        if !self.flag_fixed {
            self.flag = other.flag;
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get_waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn get_waypoint(&self, index: usize) -> Option<&Waypoint> {
        self.waypoints.get(index)
    }

    pub fn first(&self) -> Option<&Waypoint> {
        self.waypoints.first()
    }

    pub fn last(&self) -> Option<&Waypoint> {
        self.waypoints.last()
    }

    pub fn index_of(&self, wpt: &Waypoint) -> Option<usize> {
        self.waypoints.iter().position(|w| w == wpt)
    }

    pub fn index_of_flag(&self, flag: WaypointFlag) -> Option<usize> {
        self.waypoints.iter().position(|w| w.get_flag() == flag)
    }

    pub fn contains_flag(&self, flag: WaypointFlag) -> bool {
        self.index_of_flag(flag).is_some()
    }

    pub fn append(&mut self, wpt: Waypoint) {
        let index = self.waypoints.len();
        self.waypoints.push(wpt);
        self.legs.push(LegData::default());
        self.recalc_around(index);
    }

    /// Insert before `pos`; `pos == len()` appends. Out of range positions are refused.
    pub fn insert(&mut self, wpt: Waypoint, pos: usize) -> bool {
        if pos > self.waypoints.len() {
            return false;
        }
        self.waypoints.insert(pos, wpt);
        self.legs.insert(pos, LegData::default());
        self.recalc_around(pos);
        true
    }

    pub fn remove(&mut self, pos: usize) -> bool {
        self.take(pos).is_some()
    }

    pub fn take(&mut self, pos: usize) -> Option<Waypoint> {
        if pos >= self.waypoints.len() {
            return None;
        }
        let wpt = self.waypoints.remove(pos);
        self.legs.remove(pos);
        if pos > 0 {
            self.recalc_around(pos - 1);
        } else {
            self.recalc_around(0);
        }
        Some(wpt)
    }

    /// Remove `start..end`, clamped to the route.
    pub fn remove_range(&mut self, start: usize, end: usize) -> usize {
        let end = end.min(self.waypoints.len());
        if start >= end {
            return 0;
        }
        self.waypoints.drain(start..end);
        self.legs.drain(start..end);
        self.recalc_around(start.saturating_sub(1));
        self.recalc_around(start.min(self.waypoints.len().saturating_sub(1)));
        end - start
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.legs.clear();
    }

    /// Change a waypoint in place and refresh the leg cache around it.
    pub fn modify_waypoint<F>(&mut self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut Waypoint),
    {
        match self.waypoints.get_mut(index) {
            Some(wpt) => {
                f(wpt);
                self.recalc_around(index);
                true
            }
            None => false,
        }
    }

    /// Remove every waypoint carrying one of `flags`, returning the removed indices in ascending order.
    pub fn remove_flagged(&mut self, flags: &[WaypointFlag]) -> Vec<usize> {
        let removed: Vec<usize> = self
            .waypoints
            .iter()
            .enumerate()
            .filter(|(_, w)| flags.contains(&w.get_flag()))
            .map(|(i, _)| i)
            .collect();
        for i in removed.iter().rev() {
            self.take(*i);
        }
        removed
    }

    /// Drop one of every pair of adjacent equal waypoints, keeping the one that carries a flag.
    /// Returns `(removed, kept)` index pairs, each valid at the time of its removal.
    pub fn remove_double_waypoints(&mut self) -> Vec<(usize, usize)> {
        let mut removed = Vec::new();
        let mut i = 0;
        while i + 1 < self.waypoints.len() {
            if self.waypoints[i] != self.waypoints[i + 1] {
                i += 1;
                continue;
            }
            let first_flagged = self.waypoints[i].get_flag() != WaypointFlag::None;
            let second_flagged = self.waypoints[i + 1].get_flag() != WaypointFlag::None;
            let (remove, keep) = if second_flagged && !first_flagged {
                (i, i + 1)
            } else {
                (i + 1, i)
            };
            debug!(
                "Removing double waypoint {} at {}",
                self.waypoints[remove].get_id(),
                remove
            );
            self.take(remove);
            removed.push((remove, keep));
        }
        removed
    }

    /// Place dependent waypoints whose position is a placeholder.
    pub fn recompute_dependents(&mut self) {
        for i in 1..self.waypoints.len() {
            if self.waypoints[i].is_dependent() && !self.waypoints[i].is_position_valid() {
                let (before, after) = self.waypoints.split_at_mut(i);
                after[0].recompute_position(&before[i - 1]);
                self.recalc_around(i);
            }
        }
    }

    /// Mark dependent waypoints directly following `index` as placeholders.
    pub fn reset_dependents_after(&mut self, index: usize) {
        for wpt in self.waypoints.iter_mut().skip(index + 1) {
            if !wpt.is_dependent() {
                break;
            }
            wpt.reset_dependent();
        }
    }

    /// Attach navdata type information to waypoints that only carry an id and a position.
    pub fn scan_for_waypoint_information(&mut self, navdata: &Navdata) {
        for wpt in self.waypoints.iter_mut() {
            if wpt.is_dependent() {
                continue;
            }
            if let Some(airport) = wpt.as_airport() {
                if airport.get_runway_count() > 0 {
                    continue;
                }
                let runway = airport.get_active_runway_id().map(|r| r.to_string());
                if let Some(full) = navdata.get_airport(wpt.get_id()) {
                    let coordinate = *wpt.get_loc();
                    wpt.set_kind(WaypointKind::Airport(full.clone()));
                    if wpt.get_name().is_empty() {
                        wpt.set_name(full.get_name());
                    }
                    if let Err(e) = wpt.set_active_runway(runway.as_deref()) {
                        warn!("{}", e);
                        wpt.set_loc(coordinate);
                    }
                }
                continue;
            }
            if wpt.has_type_information() {
                continue;
            }
            if let Some(found) = navdata
                .get_waypoints(wpt.get_id(), Some(wpt.get_loc()))
                .into_iter()
                .find(|candidate| *candidate == *wpt)
            {
                debug!("Attaching {} information to {}", found.get_kind().type_code(), wpt.get_id());
                if wpt.get_name().is_empty() {
                    wpt.set_name(found.get_name());
                }
                wpt.set_kind(found.get_kind().clone());
            }
        }
    }

    /// Refresh the cached x/y of `start..end`.
    pub fn calc_projection(&mut self, projection: &dyn Projection, start: usize, end: usize) {
        let end = end.min(self.waypoints.len());
        for wpt in self.waypoints.iter_mut().take(end).skip(start) {
            let xy = projection.convert_lat_lon_to_xy(wpt.get_loc());
            wpt.set_xy(xy);
        }
    }

    pub fn get_leg(&self, index: usize) -> Option<&LegData> {
        self.legs.get(index)
    }

    pub fn get_true_track_to_next(&self, index: usize) -> Option<f64> {
        self.legs.get(index).map(|l| l.track_to_next)
    }

    pub fn get_distance_to_next(&self, index: usize) -> Option<f64> {
        self.legs.get(index).map(|l| l.dist_to_next)
    }

    pub fn get_true_track_from_prev(&self, index: usize) -> Option<f64> {
        self.legs.get(index).map(|l| l.track_from_prev)
    }

    pub fn get_distance_from_prev(&self, index: usize) -> Option<f64> {
        self.legs.get(index).map(|l| l.dist_from_prev)
    }

    pub fn get_overflown_at(&self, index: usize) -> Option<DateTime<Utc>> {
        self.legs.get(index).and_then(|l| l.overflown_at)
    }

    pub fn set_overflown_at(&mut self, index: usize, time: DateTime<Utc>) -> bool {
        match self.legs.get_mut(index) {
            Some(leg) => {
                leg.overflown_at = Some(time);
                true
            }
            None => false,
        }
    }

    /// Sum of leg distances from `from` to `to`.
    pub fn get_distance_between(&self, from: usize, to: usize) -> f64 {
        let to = to.min(self.legs.len());
        self.legs
            .iter()
            .take(to)
            .skip(from)
            .map(|l| l.dist_to_next)
            .sum()
    }

    fn recalc_around(&mut self, index: usize) {
        let start = index.saturating_sub(1);
        let end = (index + 1).min(self.waypoints.len().saturating_sub(1));
        for i in start..=end {
            self.recalc_leg(i);
        }
    }

    fn recalc_leg(&mut self, index: usize) {
        let Some(wpt) = self.waypoints.get(index) else {
            return;
        };
        let mut leg = LegData {
            overflown_at: self.legs.get(index).and_then(|l| l.overflown_at),
            ..Default::default()
        };
        if let Some(next) = self.waypoints.get(index + 1) {
            leg.track_to_next = wpt.get_loc().bearing_to_deg(next.get_loc());
            leg.dist_to_next = wpt.get_loc().distance_to(next.get_loc());
        }
        if index > 0 {
            if let Some(prev) = self.waypoints.get(index - 1) {
                leg.track_from_prev = prev.get_loc().bearing_to_deg(wpt.get_loc());
                leg.dist_from_prev = prev.get_loc().distance_to(wpt.get_loc());
            }
        }
        if let Some(slot) = self.legs.get_mut(index) {
            *slot = leg;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;
    use crate::earth::projection::SphericalProjector;
    use crate::model::test_utils::make_fix;
    use crate::model::waypoint::{Waypoint, WaypointFlag};

    use super::{Route, RouteFlag, RouteType};

    fn check_cache(route: &Route) {
        let wpts = route.get_waypoints();
        for i in 0..wpts.len() {
            let expected = if i + 1 < wpts.len() {
                wpts[i].get_loc().distance_to(wpts[i + 1].get_loc())
            } else {
                0.0
            };
            let cached = route.get_distance_to_next(i).unwrap();
            assert!((cached - expected).abs() < 1e-9, "leg {} {} != {}", i, cached, expected);
            if i > 0 {
                let expected = wpts[i - 1].get_loc().distance_to(wpts[i].get_loc());
                assert!((route.get_distance_from_prev(i).unwrap() - expected).abs() < 1e-9);
            }
        }
        assert_eq!(route.get_distance_to_next(wpts.len()), None);
    }

    fn make_route() -> Route {
        let mut route = Route::new("TEST", RouteType::Route);
        route.append(make_fix("A", 47.0, 15.0));
        route.append(make_fix("B", 47.5, 15.5));
        route.append(make_fix("C", 48.0, 15.0));
        route
    }

    #[test]
    fn test_cache_consistency() {
        let mut route = make_route();
        check_cache(&route);

        assert!(route.insert(make_fix("X", 47.2, 16.0), 1));
        check_cache(&route);
        assert!(route.insert(make_fix("Y", 46.0, 14.0), 0));
        check_cache(&route);
        assert!(route.insert(make_fix("Z", 49.0, 14.0), route.len()));
        check_cache(&route);
        assert!(!route.insert(make_fix("Q", 49.0, 14.0), 99));

        assert!(route.remove(2));
        check_cache(&route);
        assert!(route.remove(0));
        check_cache(&route);
        assert!(route.remove(route.len() - 1));
        check_cache(&route);
        assert!(!route.remove(10));
        assert_eq!(route.len(), 3);

        assert_eq!(route.remove_range(0, 2), 2);
        check_cache(&route);
        assert_eq!(route.len(), 1);
    }

    #[test]
    fn test_tracks() {
        let mut route = Route::new("", RouteType::Route);
        route.append(Waypoint::new("S", 0.0, 0.0));
        route.append(Waypoint::new("E", 0.0, 1.0));
        assert!((route.get_true_track_to_next(0).unwrap() - 90.0).abs() < 1e-6);
        assert!((route.get_true_track_from_prev(1).unwrap() - 90.0).abs() < 1e-6);
        assert!((route.get_distance_between(0, 2) - 60.07).abs() < 0.01);
    }

    #[test]
    fn test_remove_double_prefers_flagged() {
        let mut route = make_route();
        let mut sid_b = make_fix("B", 47.5, 15.5);
        sid_b.set_flag(WaypointFlag::Sid);
        route.insert(sid_b, 2);
        let mut star_c = make_fix("C", 48.0, 15.0);
        star_c.set_flag(WaypointFlag::Star);
        route.append(star_c);

        let removed = route.remove_double_waypoints();
        assert_eq!(removed, vec![(1, 2), (2, 3)]);
        let ids: Vec<&str> = route.get_waypoints().iter().map(|w| w.get_id()).collect();
        assert_eq!(ids, vec!["A", "B", "C"]);
        assert_eq!(route.get_waypoint(1).unwrap().get_flag(), WaypointFlag::Sid);
        assert_eq!(route.get_waypoint(2).unwrap().get_flag(), WaypointFlag::Star);
        check_cache(&route);
    }

    #[test]
    fn test_remove_flagged() {
        let mut route = make_route();
        route.modify_waypoint(1, |w| w.set_flag(WaypointFlag::Sid));
        route.modify_waypoint(2, |w| w.set_flag(WaypointFlag::SidTransition));
        let removed = route.remove_flagged(&[WaypointFlag::Sid, WaypointFlag::SidTransition]);
        assert_eq!(removed, vec![1, 2]);
        assert_eq!(route.len(), 1);
        check_cache(&route);
    }

    #[test]
    fn test_copy_respects_fixed_flag() {
        let mut source = make_route();
        source.set_flag(RouteFlag::Temporary);

        let mut copy = Route::default();
        copy.set_flag(RouteFlag::Secondary);
        copy.set_flag_fixed(true);
        copy.copy_from(&source);
        assert_eq!(copy.get_flag(), RouteFlag::Secondary);
        assert_eq!(copy.len(), 3);

        let mut other = Route::default();
        other.copy_from(&source);
        assert_eq!(other.get_flag(), RouteFlag::Temporary);
    }

    #[test]
    fn test_projection() {
        let mut route = make_route();
        assert!(route.get_waypoint(0).unwrap().get_xy().is_none());
        let projector = SphericalProjector::new(Coordinate::new(47.0, 15.0), 1.0);
        route.calc_projection(&projector, 0, 10);
        let (x, y) = route.get_waypoint(0).unwrap().get_xy().unwrap();
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
        let (_, y) = route.get_waypoint(2).unwrap().get_xy().unwrap();
        assert!(y > 59.0 && y < 61.0);
    }
}
