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

mod direct;
mod procedures;

use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};

use crate::earth::coordinate::Coordinate;
use crate::earth::projection::Projection;
use crate::error::{Result, RouteError};
use crate::event::{Event, EventManager, RouteChange};
use crate::navdata::Navdata;
use crate::util::{route_reader, route_writer};

use super::airport::Airport;
use super::restrictions::MetaData;
use super::route::{Route, RouteFlag, RouteType};
use super::waypoint::{Waypoint, WaypointFlag, WaypointKind};

pub use direct::REACTION_TIME_S;

pub const DEFAULT_CRUISE_LEVEL: i32 = -1;
pub const DEFAULT_CRUISE_TEMP: i32 = -1000;
pub const DEFAULT_COST_INDEX: i32 = -1;
pub const DEFAULT_TROPOPAUSE_FT: i32 = 36000;
pub const DEFAULT_THRUST_REDUCTION_FT: i32 = 1500;
pub const DEFAULT_ACCELERATION_FT: i32 = 3000;

/// Aircraft state supplied by the flight loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightStatus {
    pub position: Coordinate,
    pub true_heading: f64,
    pub ground_speed_kts: f64,
    pub altitude_ft: f64,
}

/// Cruise and performance values entered with a flight plan.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightPlanData {
    pub cruise_level: i32,
    pub cruise_temp: i32,
    pub company_route: String,
    pub flight_number: String,
    pub cost_index: i32,
    pub tropopause_ft: i32,
    pub thrust_reduction_alt_ft: i32,
    pub acceleration_alt_ft: i32,
}

impl Default for FlightPlanData {
    fn default() -> Self {
        Self {
            cruise_level: DEFAULT_CRUISE_LEVEL,
            cruise_temp: DEFAULT_CRUISE_TEMP,
            company_route: String::new(),
            flight_number: String::new(),
            cost_index: DEFAULT_COST_INDEX,
            tropopause_ft: DEFAULT_TROPOPAUSE_FT,
            thrust_reduction_alt_ft: DEFAULT_THRUST_REDUCTION_FT,
            acceleration_alt_ft: DEFAULT_ACCELERATION_FT,
        }
    }
}

/// Identifiers of the terminal procedures currently spliced into the route.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedProcedures {
    pub sid: Option<String>,
    pub sid_transition: Option<String>,
    pub star: Option<String>,
    pub approach_transition: Option<String>,
    pub approach: Option<String>,
}

/// The route being flown: a [`Route`] plus departure/destination tracking, spliced
/// procedures, the active waypoint cursor and flight plan data.
#[derive(Clone, Default)]
pub struct FlightRoute {
    route: Route,
    adep_index: Option<usize>,
    ades_index: Option<usize>,
    procedures: AppliedProcedures,
    active_index: usize,
    alt_reached: Option<Waypoint>,
    top_of_descent: Option<Waypoint>,
    plan: FlightPlanData,
    distance_to_destination: f64,
    events: Option<Arc<EventManager>>,
    projection: Option<Arc<dyn Projection + Send + Sync>>,
    notifications_suppressed: bool,
}

impl FlightRoute {
    pub fn new() -> Self {
        Self {
            route: Route::new("", RouteType::Route),
            ..Default::default()
        }
    }

    pub fn with_events(events: Arc<EventManager>) -> Self {
        let mut route = Self::new();
        route.events = Some(events);
        route
    }

    pub fn set_event_manager(&mut self, events: Option<Arc<EventManager>>) {
        self.events = events;
    }

    pub fn set_projection(&mut self, projection: Option<Arc<dyn Projection + Send + Sync>>) {
        self.projection = projection;
        self.project_all();
    }

    pub fn get_route(&self) -> &Route {
        &self.route
    }

    pub fn set_flag(&mut self, flag: RouteFlag) {
        self.route.set_flag(flag);
    }

    pub fn set_flag_fixed(&mut self, fixed: bool) {
        self.route.set_flag_fixed(fixed);
    }

    /// Replace the content with `other`, keeping this route's notification and projection hooks.
    pub fn copy_from(&mut self, other: &FlightRoute) {
        self.route.copy_from(&other.route);
        self.adep_index = other.adep_index;
        self.ades_index = other.ades_index;
        self.procedures = other.procedures.clone();
        self.active_index = other.active_index;
        self.alt_reached = other.alt_reached.clone();
        self.top_of_descent = other.top_of_descent.clone();
        self.plan = other.plan.clone();
        self.project_all();
        self.update_distance();
        self.notify_change(false, "copy_from");
    }

    /// Reset waypoints and flight plan data. The route id and flag stay.
    pub fn clear(&mut self) {
        self.route.clear();
        self.procedures = AppliedProcedures::default();
        self.active_index = 0;
        self.alt_reached = None;
        self.top_of_descent = None;
        self.plan = FlightPlanData::default();
        self.after_structure_change();
        self.notify_change(false, "clear");
    }

    pub fn append(&mut self, wpt: Waypoint) {
        let pos = self.route.len();
        self.route.append(wpt);
        self.after_structure_change();
        debug!("Appended waypoint at {}", pos);
        self.notify_change(false, "append");
    }

    pub fn insert(&mut self, wpt: Waypoint, pos: usize) -> Result<()> {
        if !self.route.insert(wpt, pos) {
            return Err(RouteError::invalid(format!(
                "insert position {} beyond route length {}",
                pos,
                self.route.len()
            )));
        }
        if pos < self.active_index {
            self.active_index += 1;
        }
        self.route.reset_dependents_after(pos);
        self.after_structure_change();
        self.notify_change(false, "insert");
        Ok(())
    }

    /// False when `pos` is out of range.
    pub fn remove(&mut self, pos: usize) -> bool {
        if !self.route.remove(pos) {
            return false;
        }
        if pos < self.active_index {
            self.active_index -= 1;
        }
        if pos > 0 {
            self.route.reset_dependents_after(pos - 1);
        }
        self.after_structure_change();
        self.notify_change(false, "remove");
        true
    }

    /// Change one waypoint in place, e.g. its restrictions or holding.
    pub fn modify_waypoint<F>(&mut self, index: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut Waypoint),
    {
        if !self.route.modify_waypoint(index, f) {
            return Err(RouteError::invalid(format!("no waypoint at {}", index)));
        }
        self.route.reset_dependents_after(index);
        self.after_structure_change();
        self.notify_change(false, "modify_waypoint");
        Ok(())
    }

    pub fn remove_double_waypoints(&mut self) -> usize {
        let removed = self.remove_doubles();
        if removed > 0 {
            self.after_structure_change();
            self.notify_change(false, "remove_double_waypoints");
        }
        removed
    }

    pub fn scan_for_waypoint_information(&mut self, navdata: &Navdata) {
        self.route.scan_for_waypoint_information(navdata);
        self.after_structure_change();
    }

    pub fn calc_projection(&mut self, projection: &dyn Projection, start: usize, end: usize) {
        self.route.calc_projection(projection, start, end);
    }

    pub fn get_departure_airport_index(&self) -> Option<usize> {
        self.adep_index
    }

    pub fn get_destination_airport_index(&self) -> Option<usize> {
        self.ades_index
    }

    pub fn get_departure_airport(&self) -> Option<&Waypoint> {
        self.adep_index.and_then(|i| self.route.get_waypoint(i))
    }

    pub fn get_destination_airport(&self) -> Option<&Waypoint> {
        self.ades_index.and_then(|i| self.route.get_waypoint(i))
    }

    /// Make `airport` the departure airport, replacing the current one.
    /// Spliced SID and SID transition waypoints are removed.
    pub fn set_departure_airport(&mut self, airport: Airport, runway: Option<&str>) -> Result<()> {
        let mut wpt = Self::airport_waypoint(airport, runway)?;
        wpt.set_flag(WaypointFlag::Adep);

        let index = match self.adep_index {
            Some(i) => {
                self.route.modify_waypoint(i, |w| *w = wpt);
                i
            }
            None => {
                self.route.insert(wpt, 0);
                if self.active_index > 0 {
                    self.active_index += 1;
                }
                0
            }
        };
        self.clear_flag_except(WaypointFlag::Adep, index);
        self.remove_flagged(&[WaypointFlag::Sid, WaypointFlag::SidTransition]);
        self.procedures.sid = None;
        self.procedures.sid_transition = None;
        if let Some(i) = self.route.index_of_flag(WaypointFlag::Adep) {
            self.route.reset_dependents_after(i);
        }
        self.after_structure_change();
        info!("Departure airport set to {}", self.get_departure_airport().map(|w| w.get_id()).unwrap_or(""));
        self.notify_change(false, "set_departure_airport");
        Ok(())
    }

    /// Make `airport` the destination airport, replacing the current one.
    /// Spliced STAR, approach transition and approach waypoints are removed.
    pub fn set_destination_airport(&mut self, airport: Airport, runway: Option<&str>) -> Result<()> {
        let mut wpt = Self::airport_waypoint(airport, runway)?;
        wpt.set_flag(WaypointFlag::Ades);

        let index = match self.ades_index {
            Some(i) => {
                self.route.modify_waypoint(i, |w| *w = wpt);
                i
            }
            None => {
                self.route.append(wpt);
                self.route.len() - 1
            }
        };
        self.clear_flag_except(WaypointFlag::Ades, index);
        self.remove_flagged(&[
            WaypointFlag::Star,
            WaypointFlag::ApproachTransition,
            WaypointFlag::Approach,
            WaypointFlag::MissedApproach,
        ]);
        self.procedures.star = None;
        self.procedures.approach_transition = None;
        self.procedures.approach = None;
        if let Some(i) = self.route.index_of_flag(WaypointFlag::Ades) {
            self.route.reset_dependents_after(i);
        }
        self.after_structure_change();
        info!("Destination airport set to {}", self.get_destination_airport().map(|w| w.get_id()).unwrap_or(""));
        self.notify_change(false, "set_destination_airport");
        Ok(())
    }

    fn airport_waypoint(airport: Airport, runway: Option<&str>) -> Result<Waypoint> {
        let mut wpt = Waypoint::from_airport(airport);
        wpt.set_active_runway(runway)?;
        Ok(wpt)
    }

    fn clear_flag_except(&mut self, flag: WaypointFlag, keep: usize) {
        for i in 0..self.route.len() {
            if i != keep && self.route.get_waypoint(i).map(|w| w.get_flag()) == Some(flag) {
                self.route.modify_waypoint(i, |w| w.set_flag(WaypointFlag::None));
            }
        }
    }

    fn remove_flagged(&mut self, flags: &[WaypointFlag]) {
        let removed = self.route.remove_flagged(flags);
        let before_active = removed.iter().filter(|i| **i < self.active_index).count();
        self.active_index -= before_active;
    }

    fn remove_doubles(&mut self) -> usize {
        let removed = self.route.remove_double_waypoints();
        for (r, k) in removed.iter() {
            if *r < self.active_index || (*r == self.active_index && *k < *r) {
                self.active_index = self.active_index.saturating_sub(1);
            }
        }
        removed.len()
    }

    pub fn get_procedures(&self) -> &AppliedProcedures {
        &self.procedures
    }

    pub fn get_sid_id(&self) -> Option<&str> {
        self.procedures.sid.as_deref()
    }

    pub fn get_sid_transition_id(&self) -> Option<&str> {
        self.procedures.sid_transition.as_deref()
    }

    pub fn get_star_id(&self) -> Option<&str> {
        self.procedures.star.as_deref()
    }

    pub fn get_approach_transition_id(&self) -> Option<&str> {
        self.procedures.approach_transition.as_deref()
    }

    pub fn get_approach_id(&self) -> Option<&str> {
        self.procedures.approach.as_deref()
    }

    pub(crate) fn set_procedures(&mut self, procedures: AppliedProcedures) {
        self.procedures = procedures;
    }

    pub fn get_active_index(&self) -> usize {
        self.active_index
    }

    /// `index` may be one past the last waypoint once everything is sequenced.
    pub fn set_active_index(&mut self, index: usize) -> Result<()> {
        if index > self.route.len() {
            return Err(RouteError::invalid(format!(
                "active waypoint {} beyond route length {}",
                index,
                self.route.len()
            )));
        }
        self.active_index = index;
        self.update_distance();
        self.notify(Event::ActiveWaypointChanged(index));
        Ok(())
    }

    pub fn get_active_waypoint(&self) -> Option<&Waypoint> {
        self.route.get_waypoint(self.active_index)
    }

    pub fn get_previous_waypoint_index(&self) -> Option<usize> {
        self.active_index.checked_sub(1)
    }

    pub fn get_previous_waypoint(&self) -> Option<&Waypoint> {
        self.get_previous_waypoint_index()
            .and_then(|i| self.route.get_waypoint(i))
    }

    pub fn get_next_waypoint(&self) -> Option<&Waypoint> {
        self.route.get_waypoint(self.active_index + 1)
    }

    /// Distance along the route from the active waypoint to the destination airport
    /// (or the last waypoint without one).
    pub fn get_distance_to_destination(&self) -> f64 {
        self.distance_to_destination
    }

    /// Sequence the active waypoint as overflown and make the next one active.
    /// Waypoints before the new previous waypoint are trimmed.
    pub fn switch_to_next_waypoint(&mut self, status: &FlightStatus) -> Result<()> {
        let left_index = self.active_index;
        let Some(left) = self.route.get_waypoint(left_index).cloned() else {
            return Err(RouteError::invalid("no active waypoint to sequence"));
        };

        let now = Utc::now();
        self.route.modify_waypoint(left_index, |w| {
            w.clear_holding();
            *w.get_overflown_mut() = MetaData {
                speed_kts: Some(status.ground_speed_kts),
                altitude_ft: Some(status.altitude_ft),
                time: Some(now),
            };
        });
        self.route.set_overflown_at(left_index, now);

        if matches!(left.get_kind(), WaypointKind::HdgToAlt { .. }) {
            self.route.modify_waypoint(left_index + 1, |w| {
                w.get_restrictions_mut().set_overfly(true)
            });
        }

        self.active_index += 1;

        let previous = self.active_index - 1;
        if previous > 0 {
            self.notifications_suppressed = true;
            for _ in 0..previous {
                self.remove(0);
            }
            self.notifications_suppressed = false;
        }

        while let Some(next) = self.route.get_waypoint(self.active_index) {
            if *next != left || next.get_flag() == WaypointFlag::Ades {
                break;
            }
            debug!("Skipping duplicate of {} after sequencing", left.get_id());
            self.route.remove(self.active_index);
        }

        let active = self.active_index;
        if let Some(wpt) = self.route.get_waypoint(active) {
            if matches!(wpt.get_kind(), WaypointKind::HdgToIntercept { .. }) {
                self.route.modify_waypoint(active, |w| w.reset_dependent());
            }
        }

        self.after_structure_change();
        debug!("Active waypoint now {}", self.active_index);
        self.notify(Event::ActiveWaypointChanged(self.active_index));
        Ok(())
    }

    pub fn get_alt_reached_waypoint(&self) -> Option<&Waypoint> {
        self.alt_reached.as_ref()
    }

    pub fn set_alt_reached_waypoint(&mut self, wpt: Option<Waypoint>) {
        self.alt_reached = wpt;
    }

    pub fn get_top_of_descent_waypoint(&self) -> Option<&Waypoint> {
        self.top_of_descent.as_ref()
    }

    pub fn set_top_of_descent_waypoint(&mut self, wpt: Option<Waypoint>) {
        self.top_of_descent = wpt;
    }

    pub fn get_plan_data(&self) -> &FlightPlanData {
        &self.plan
    }

    pub fn set_plan_data(&mut self, plan: FlightPlanData) {
        self.plan = plan;
    }

    pub fn get_cruise_level(&self) -> i32 {
        self.plan.cruise_level
    }

    pub fn set_cruise_level(&mut self, level: i32) {
        self.plan.cruise_level = level;
    }

    pub fn get_cruise_temp(&self) -> i32 {
        self.plan.cruise_temp
    }

    pub fn set_cruise_temp(&mut self, temp: i32) {
        self.plan.cruise_temp = temp;
    }

    pub fn get_company_route(&self) -> &str {
        &self.plan.company_route
    }

    pub fn set_company_route(&mut self, company_route: &str) {
        self.plan.company_route = company_route.to_string();
    }

    pub fn get_flight_number(&self) -> &str {
        &self.plan.flight_number
    }

    pub fn set_flight_number(&mut self, flight_number: &str) {
        self.plan.flight_number = flight_number.to_string();
    }

    pub fn get_cost_index(&self) -> i32 {
        self.plan.cost_index
    }

    pub fn set_cost_index(&mut self, cost_index: i32) {
        self.plan.cost_index = cost_index;
    }

    pub fn get_tropopause_ft(&self) -> i32 {
        self.plan.tropopause_ft
    }

    pub fn set_tropopause_ft(&mut self, tropopause: i32) {
        self.plan.tropopause_ft = tropopause;
    }

    pub fn get_thrust_reduction_alt_ft(&self) -> i32 {
        self.plan.thrust_reduction_alt_ft
    }

    pub fn set_thrust_reduction_alt_ft(&mut self, altitude: i32) {
        self.plan.thrust_reduction_alt_ft = altitude;
    }

    pub fn get_acceleration_alt_ft(&self) -> i32 {
        self.plan.acceleration_alt_ft
    }

    pub fn set_acceleration_alt_ft(&mut self, altitude: i32) {
        self.plan.acceleration_alt_ft = altitude;
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        route_writer::write_route_file(self, path)
    }

    /// Replace this route with the one stored at `path`. On failure the route is left untouched.
    pub fn load(&mut self, path: &Path, navdata: Option<&Navdata>) -> Result<()> {
        let mut loaded = route_reader::read_route_file(path)?;
        if let Some(navdata) = navdata {
            loaded.scan_for_waypoint_information(navdata);
        }
        self.copy_from(&loaded);
        info!("Loaded route {} with {} waypoints", path.display(), self.route.len());
        Ok(())
    }

    pub(crate) fn set_route(&mut self, route: Route) {
        self.route = route;
        self.after_structure_change();
    }

    /// Restore a persisted cursor without notifying listeners.
    pub(crate) fn set_active_index_unchecked(&mut self, index: usize) {
        self.active_index = index.min(self.route.len());
        self.update_distance();
    }

    /// Keep derived state in sync with the waypoint sequence.
    fn after_structure_change(&mut self) {
        self.adep_index = self.route.index_of_flag(WaypointFlag::Adep);
        self.ades_index = self.route.index_of_flag(WaypointFlag::Ades);
        self.route.recompute_dependents();
        if self.active_index > self.route.len() {
            self.active_index = self.route.len();
        }
        self.project_all();
        self.update_distance();
    }

    fn update_distance(&mut self) {
        let end = match self.ades_index {
            Some(i) if i >= self.active_index => i,
            _ => self.route.len(),
        };
        self.distance_to_destination = self.route.get_distance_between(self.active_index, end);
    }

    fn project_all(&mut self) {
        if let Some(projection) = self.projection.clone() {
            let len = self.route.len();
            self.route.calc_projection(projection.as_ref(), 0, len);
        }
    }

    fn notify_change(&self, direct_change: bool, origin: &str) {
        self.notify(Event::RouteChanged(RouteChange {
            flag: self.route.get_flag(),
            direct_change,
            origin: origin.to_string(),
        }));
    }

    fn notify(&self, event: Event) {
        if self.notifications_suppressed {
            return;
        }
        if let Some(events) = &self.events {
            events.notify_listeners(event);
        }
    }
}

impl Deref for FlightRoute {
    type Target = Route;

    fn deref(&self) -> &Route {
        &self.route
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_channel::TryRecvError;

    use crate::earth::coordinate::Coordinate;
    use crate::earth::projection::SphericalProjector;
    use crate::event::{Event, EventManager, EventType};
    use crate::model::test_utils::{
        ids, make_airport, make_destination, make_fix, make_flight_route, make_sid,
    };
    use crate::model::waypoint::{Waypoint, WaypointFlag};

    use super::{FlightRoute, FlightStatus};

    fn status() -> FlightStatus {
        FlightStatus {
            position: Coordinate::new(47.0, 15.0),
            true_heading: 270.0,
            ground_speed_kts: 280.0,
            altitude_ft: 11000.0,
        }
    }

    #[test]
    fn test_airport_indices() {
        let mut route = make_flight_route();
        assert_eq!(ids(&route), vec!["LOWG", "ETVIS", "KPT", "LOWI"]);
        assert_eq!(route.get_departure_airport_index(), Some(0));
        assert_eq!(route.get_destination_airport_index(), Some(3));
        assert_eq!(
            route.get_departure_airport().unwrap().get_active_runway_id(),
            Some("35C")
        );

        route.insert(make_fix("NIBAG", 47.50, 14.80), 2).unwrap();
        assert_eq!(route.get_destination_airport_index(), Some(4));
        assert!(route.remove(0));
        assert_eq!(route.get_departure_airport_index(), None);
        assert!(!route.remove(10));

        route
            .set_departure_airport(make_airport("LOWG"), None)
            .unwrap();
        assert_eq!(route.get_departure_airport_index(), Some(0));
        assert_eq!(route.get_destination_airport_index(), Some(4));
    }

    #[test]
    fn test_unknown_runway_leaves_route() {
        let mut route = make_flight_route();
        assert!(route
            .set_destination_airport(make_destination("LOWI"), Some("17"))
            .is_err());
        assert_eq!(ids(&route), vec!["LOWG", "ETVIS", "KPT", "LOWI"]);
        assert!(route.insert(make_fix("X", 1.0, 1.0), 9).is_err());
    }

    #[test]
    fn test_distance_to_destination() {
        let mut route = make_flight_route();
        let expected: f64 = (0..3).map(|i| route.get_distance_to_next(i).unwrap()).sum();
        assert!((route.get_distance_to_destination() - expected).abs() < 1e-9);

        route.set_active_index(2).unwrap();
        let expected = route.get_distance_to_next(2).unwrap();
        assert!((route.get_distance_to_destination() - expected).abs() < 1e-9);

        assert!(route.set_active_index(4).is_ok());
        assert!(route.set_active_index(5).is_err());
    }

    #[test]
    fn test_active_index_follows_edits() {
        let mut route = make_flight_route();
        route.set_active_index(2).unwrap();
        route.insert(make_fix("NIBAG", 47.50, 14.80), 1).unwrap();
        assert_eq!(route.get_active_waypoint().unwrap().get_id(), "KPT");
        route.remove(1);
        assert_eq!(route.get_active_waypoint().unwrap().get_id(), "KPT");
        route.remove(2);
        assert_eq!(route.get_active_waypoint().unwrap().get_id(), "LOWI");
    }

    #[test]
    fn test_sequencing_trims_history() {
        let mut route = make_flight_route();
        route.switch_to_next_waypoint(&status()).unwrap();
        assert_eq!(route.get_active_index(), 1);
        let lowg = route.get_waypoint(0).unwrap();
        assert_eq!(lowg.get_overflown().altitude_ft, Some(11000.0));
        assert!(route.get_overflown_at(0).is_some());

        route.switch_to_next_waypoint(&status()).unwrap();
        assert_eq!(ids(&route), vec!["ETVIS", "KPT", "LOWI"]);
        assert_eq!(route.get_active_index(), 1);
        assert_eq!(route.get_previous_waypoint_index(), Some(0));
        assert_eq!(route.get_departure_airport_index(), None);
        assert_eq!(route.get_destination_airport_index(), Some(2));

        route.switch_to_next_waypoint(&status()).unwrap();
        route.switch_to_next_waypoint(&status()).unwrap();
        assert_eq!(ids(&route), vec!["LOWI"]);
        assert_eq!(route.get_active_index(), 1);
        assert!(route.get_active_waypoint().is_none());
        assert!(route.switch_to_next_waypoint(&status()).is_err());
    }

    #[test]
    fn test_sequencing_skips_duplicates() {
        let mut route = FlightRoute::new();
        route.append(make_fix("A", 47.0, 10.0));
        route.append(make_fix("B", 47.0, 11.0));
        route.append(Waypoint::new("B", 47.0, 11.0));
        route.append(make_fix("C", 47.0, 12.0));
        route.set_active_index(1).unwrap();

        route.switch_to_next_waypoint(&status()).unwrap();
        assert_eq!(ids(&route), vec!["B", "C"]);
        assert_eq!(route.get_active_waypoint().unwrap().get_id(), "C");
    }

    #[test]
    fn test_sequencing_keeps_destination() {
        let mut route = FlightRoute::new();
        route.append(make_fix("A", 47.0, 10.0));
        route.append(Waypoint::new("LOWI", 47.2602, 11.3439));
        route
            .set_destination_airport(make_destination("LOWI"), None)
            .unwrap();
        route.set_active_index(1).unwrap();

        route.switch_to_next_waypoint(&status()).unwrap();
        assert_eq!(ids(&route), vec!["LOWI", "LOWI"]);
        assert_eq!(route.get_destination_airport_index(), Some(1));
        assert_eq!(
            route.get_active_waypoint().unwrap().get_flag(),
            WaypointFlag::Ades
        );
    }

    #[test]
    fn test_heading_to_altitude_sequencing() {
        let mut route = make_flight_route();
        route.set_sid(&make_sid(), "35C").unwrap();
        route.set_active_index(2).unwrap();
        assert!(!route.get_waypoint(3).unwrap().is_overfly());

        route.switch_to_next_waypoint(&status()).unwrap();
        let grz = route.get_active_waypoint().unwrap();
        assert_eq!(grz.get_id(), "GRZ1");
        assert!(grz.is_overfly());
    }

    #[test]
    fn test_notifications() {
        let events = Arc::new(EventManager::new());
        let changes = events.register_listener(&[EventType::RouteChanged]).unwrap();
        let actives = events
            .register_listener(&[EventType::ActiveWaypointChanged])
            .unwrap();

        let mut route = FlightRoute::with_events(events.clone());
        route.append(make_fix("A", 47.0, 10.0));
        route.append(make_fix("B", 47.0, 11.0));
        route.append(make_fix("C", 47.0, 12.0));
        while changes.try_recv().is_ok() {}

        route.switch_to_next_waypoint(&status()).unwrap();
        route.switch_to_next_waypoint(&status()).unwrap();
        assert_eq!(changes.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(actives.try_recv().unwrap(), Event::ActiveWaypointChanged(1));
        assert_eq!(actives.try_recv().unwrap(), Event::ActiveWaypointChanged(1));

        route.go_direct(1, 1.0, &status()).unwrap();
        match changes.try_recv() {
            Ok(Event::RouteChanged(change)) => {
                assert!(change.direct_change);
                assert_eq!(change.origin, "go_direct");
            }
            other => panic!("Unexpected {:?}", other),
        }
    }

    #[test]
    fn test_clear_and_defaults() {
        let mut route = make_flight_route();
        route.set_cruise_level(350);
        route.set_flight_number("KLP123");
        route.clear();
        assert!(route.is_empty());
        assert_eq!(route.get_cruise_level(), -1);
        assert_eq!(route.get_cruise_temp(), -1000);
        assert_eq!(route.get_cost_index(), -1);
        assert_eq!(route.get_tropopause_ft(), 36000);
        assert_eq!(route.get_thrust_reduction_alt_ft(), 1500);
        assert_eq!(route.get_acceleration_alt_ft(), 3000);
        assert_eq!(route.get_flight_number(), "");
        assert_eq!(route.get_active_index(), 0);
    }

    #[test]
    fn test_projection_follows_changes() {
        let mut route = make_flight_route();
        route.set_projection(Some(Arc::new(SphericalProjector::new(
            Coordinate::new(47.0, 13.0),
            1.0,
        ))));
        assert!(route.get_waypoints().iter().all(|w| w.get_xy().is_some()));
        route.insert(make_fix("NIBAG", 47.50, 14.80), 1).unwrap();
        assert!(route.get_waypoint(1).unwrap().get_xy().is_some());
    }

    #[test]
    fn test_departure_flag_unique() {
        let mut route = make_flight_route();
        let mut stray = make_fix("X", 47.0, 14.0);
        stray.set_flag(WaypointFlag::Adep);
        route.insert(stray, 2).unwrap();
        route
            .set_departure_airport(make_airport("LOWG"), None)
            .unwrap();
        let adeps = route
            .get_waypoints()
            .iter()
            .filter(|w| w.get_flag() == WaypointFlag::Adep)
            .count();
        assert_eq!(adeps, 1);
    }
}
