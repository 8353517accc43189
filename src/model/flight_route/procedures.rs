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

use log::{debug, info, warn};

use crate::error::{Result, RouteError};
use crate::model::location::Location;
use crate::model::procedure::{Procedure, ProcedureType};
use crate::model::route::Route;
use crate::model::waypoint::{Waypoint, WaypointFlag, WaypointKind};

use super::FlightRoute;

/// Threshold and first SID waypoint closer than this (NM) are treated as the same point.
const RUNWAY_MATCH_NM: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpliceKind {
    Sid,
    SidTransition,
    Star,
    ApproachTransition,
    Approach,
}

impl SpliceKind {
    /// Flags removed before the new procedure goes in.
    fn replaced_flags(&self) -> &'static [WaypointFlag] {
        match self {
            SpliceKind::Sid => &[WaypointFlag::Sid],
            SpliceKind::SidTransition => &[WaypointFlag::SidTransition],
            SpliceKind::Star => &[WaypointFlag::Star, WaypointFlag::ApproachTransition],
            SpliceKind::ApproachTransition => &[WaypointFlag::ApproachTransition],
            SpliceKind::Approach => &[WaypointFlag::Approach, WaypointFlag::MissedApproach],
        }
    }

    fn is_departure(&self) -> bool {
        matches!(self, SpliceKind::Sid | SpliceKind::SidTransition)
    }
}

impl FlightRoute {
    /// Splice `sid` flown from `runway` in after the departure airport.
    pub fn set_sid(&mut self, sid: &Procedure, runway: &str) -> Result<()> {
        Self::check_type(sid, ProcedureType::Sid)?;
        if !sid.serves_runway(runway) {
            return Err(RouteError::invalid(format!(
                "SID {} is not published for runway {}",
                sid.get_name(),
                runway
            )));
        }
        let waypoints = Self::prepare(sid, WaypointFlag::Sid);
        self.splice(SpliceKind::Sid, waypoints, Some(runway), "set_sid")?;
        self.procedures.sid = Some(sid.get_name().to_string());
        info!("SID {} set for runway {}", sid.get_name(), runway);
        Ok(())
    }

    pub fn set_sid_transition(&mut self, transition: &Procedure) -> Result<()> {
        Self::check_type(transition, ProcedureType::Transition)?;
        let waypoints = Self::prepare(transition, WaypointFlag::SidTransition);
        self.splice(SpliceKind::SidTransition, waypoints, None, "set_sid_transition")?;
        self.procedures.sid_transition = Some(transition.get_name().to_string());
        info!("SID transition {} set", transition.get_name());
        Ok(())
    }

    /// Splice `star` (optionally entered via one of its transitions) in before the destination.
    /// Any approach transition is removed with the old STAR.
    pub fn set_star(
        &mut self,
        star: &Procedure,
        runway: Option<&str>,
        transition: Option<&str>,
    ) -> Result<()> {
        Self::check_type(star, ProcedureType::Star)?;
        if let Some(rwy) = runway {
            if !star.serves_runway(rwy) {
                return Err(RouteError::invalid(format!(
                    "STAR {} is not published for runway {}",
                    star.get_name(),
                    rwy
                )));
            }
        }
        let mut waypoints = match transition {
            Some(name) => match star.get_transition(name) {
                Some(t) => Self::prepare(t, WaypointFlag::Star),
                None => {
                    return Err(RouteError::NotFound(format!(
                        "transition {} of STAR {}",
                        name,
                        star.get_name()
                    )));
                }
            },
            None => Vec::new(),
        };
        waypoints.extend(Self::prepare(star, WaypointFlag::Star));

        self.splice(SpliceKind::Star, waypoints, runway, "set_star")?;
        self.procedures.star = Some(star.get_name().to_string());
        self.procedures.approach_transition = None;
        info!("STAR {} set", star.get_name());
        Ok(())
    }

    /// Requires a STAR. A second approach transition needs the STAR to be applied again first.
    pub fn set_approach_transition(&mut self, transition: &Procedure) -> Result<()> {
        Self::check_type(transition, ProcedureType::Transition)?;
        let waypoints = Self::prepare(transition, WaypointFlag::ApproachTransition);
        self.splice(
            SpliceKind::ApproachTransition,
            waypoints,
            None,
            "set_approach_transition",
        )?;
        self.procedures.approach_transition = Some(transition.get_name().to_string());
        info!("Approach transition {} set", transition.get_name());
        Ok(())
    }

    pub fn set_approach(&mut self, approach: &Procedure) -> Result<()> {
        Self::check_type(approach, ProcedureType::Approach)?;
        let mut waypoints = Self::prepare(approach, WaypointFlag::Approach);
        let mut missed = false;
        for wpt in waypoints.iter_mut() {
            if missed {
                wpt.set_flag(WaypointFlag::MissedApproach);
            }
            if matches!(wpt.get_kind(), WaypointKind::Runway(_)) {
                missed = true;
            }
        }
        self.splice(
            SpliceKind::Approach,
            waypoints,
            approach.get_runway(),
            "set_approach",
        )?;
        self.procedures.approach = Some(approach.get_name().to_string());
        info!("Approach {} set", approach.get_name());
        Ok(())
    }

    fn check_type(procedure: &Procedure, expected: ProcedureType) -> Result<()> {
        if procedure.get_type() == expected {
            Ok(())
        } else {
            Err(RouteError::invalid(format!(
                "{} is a {:?}, expected a {:?}",
                procedure.get_name(),
                procedure.get_type(),
                expected
            )))
        }
    }

    /// Copies of the procedure waypoints tagged with `flag` and the procedure name.
    fn prepare(procedure: &Procedure, flag: WaypointFlag) -> Vec<Waypoint> {
        procedure
            .get_waypoints()
            .iter()
            .map(|w| {
                let mut wpt = w.clone();
                if wpt.get_flag() != WaypointFlag::MissedApproach {
                    wpt.set_flag(flag);
                }
                wpt.set_parent(procedure.get_name());
                wpt
            })
            .collect()
    }

    fn splice(
        &mut self,
        kind: SpliceKind,
        waypoints: Vec<Waypoint>,
        runway: Option<&str>,
        origin: &str,
    ) -> Result<()> {
        let airport_index = if kind.is_departure() {
            self.adep_index
                .ok_or_else(|| RouteError::invalid("no departure airport set"))?
        } else {
            self.ades_index
                .ok_or_else(|| RouteError::invalid("no destination airport set"))?
        };

        if kind == SpliceKind::ApproachTransition {
            if self.procedures.star.is_none() {
                return Err(RouteError::invalid("approach transition requires a STAR"));
            }
            if let Some(current) = &self.procedures.approach_transition {
                warn!("Approach transition {} already applied, set the STAR again first", current);
                return Err(RouteError::invalid(format!(
                    "approach transition {} already applied",
                    current
                )));
            }
        }

        let airport = self
            .route
            .get_waypoint(airport_index)
            .and_then(|w| w.as_airport())
            .ok_or_else(|| RouteError::invalid("airport waypoint carries no airport data"))?;
        let airport_id = airport.get_id().to_string();
        let threshold = match runway {
            Some(rwy) => {
                if !airport.has_runway(rwy) {
                    return Err(RouteError::UnknownRunway {
                        airport: airport_id,
                        runway: rwy.to_string(),
                    });
                }
                airport.get_runway(rwy).cloned()
            }
            None => None,
        };

        let active_wpt = self.route.get_waypoint(self.active_index).cloned();
        let mut route = self.route.clone();

        route.remove_flagged(kind.replaced_flags());
        let adep = route.index_of_flag(WaypointFlag::Adep);
        let ades = route.index_of_flag(WaypointFlag::Ades);
        let airport_index = (if kind.is_departure() { adep } else { ades })
            .ok_or_else(|| RouteError::invalid("airport removed while splicing"))?;

        let mut insert_at = Self::insertion_index(&route, kind, airport_index);

        // The junction search never crosses another procedure's waypoints
        if kind.is_departure() {
            if let Some(last) = waypoints.last() {
                let limit = ades.unwrap_or(route.len());
                if let Some(j) = (insert_at..limit)
                    .take_while(|j| Self::is_en_route(&route, *j))
                    .find(|j| Self::is_junction(&route, *j, last))
                {
                    route.remove_range(insert_at, j + 1);
                }
            }
        } else if let Some(first) = waypoints.first() {
            let lower = adep.map(|i| i + 1).unwrap_or(0);
            if let Some(j) = (lower..insert_at)
                .rev()
                .take_while(|j| Self::is_en_route(&route, *j))
                .find(|j| Self::is_junction(&route, *j, first))
            {
                route.remove_range(j, insert_at);
                insert_at = j;
            }
        }

        let mut to_insert: Vec<Waypoint> = waypoints
            .into_iter()
            .filter(|w| !w.is_airport() && w.get_id() != airport_id)
            .collect();

        if kind == SpliceKind::Sid {
            if let Some(rwy) = &threshold {
                let needs_runway = match to_insert.first() {
                    Some(first) => {
                        !matches!(first.get_kind(), WaypointKind::Runway(_))
                            && (first.is_dependent()
                                || first.get_loc().distance_to(rwy.get_threshold())
                                    > RUNWAY_MATCH_NM)
                    }
                    None => true,
                };
                if needs_runway {
                    let mut rwy_wpt = Waypoint::from_runway(rwy.clone());
                    rwy_wpt.set_flag(WaypointFlag::Sid);
                    if let Some(first) = to_insert.first() {
                        rwy_wpt.set_parent(first.get_parent());
                    }
                    to_insert.insert(0, rwy_wpt);
                }
            }
        }

        debug!("Splicing {} waypoints at {} for {:?}", to_insert.len(), insert_at, kind);
        for (k, wpt) in to_insert.into_iter().enumerate() {
            route.insert(wpt, insert_at + k);
        }

        let flag = if kind.is_departure() {
            WaypointFlag::Adep
        } else {
            WaypointFlag::Ades
        };
        let airport_index = route
            .index_of_flag(flag)
            .ok_or_else(|| RouteError::invalid("airport removed while splicing"))?;

        if runway.is_some() {
            let mut applied = Ok(());
            route.modify_waypoint(airport_index, |w| applied = w.set_active_runway(runway));
            applied?;
        }
        route.reset_dependents_after(airport_index);

        let old_active = self.active_index;
        self.route = route;
        self.active_index = Self::relocate(&self.route, active_wpt.as_ref(), old_active);
        self.remove_doubles();
        self.forget_removed_procedures();
        self.after_structure_change();
        self.notify_change(false, origin);
        Ok(())
    }

    /// Drop the ids of procedures that no longer have a waypoint in the route.
    fn forget_removed_procedures(&mut self) {
        let route = &self.route;
        let applied = &mut self.procedures;
        if !route.contains_flag(WaypointFlag::Sid) {
            applied.sid = None;
        }
        if !route.contains_flag(WaypointFlag::SidTransition) {
            applied.sid_transition = None;
        }
        if !route.contains_flag(WaypointFlag::Star) {
            applied.star = None;
        }
        if !route.contains_flag(WaypointFlag::ApproachTransition) {
            applied.approach_transition = None;
        }
        if !route.contains_flag(WaypointFlag::Approach)
            && !route.contains_flag(WaypointFlag::MissedApproach)
        {
            applied.approach = None;
        }
    }

    fn insertion_index(route: &Route, kind: SpliceKind, airport_index: usize) -> usize {
        let wpts = route.get_waypoints();
        let last_of = |flag: WaypointFlag| wpts.iter().rposition(|w| w.get_flag() == flag);
        let first_approach = wpts.iter().position(|w| {
            matches!(
                w.get_flag(),
                WaypointFlag::ApproachTransition
                    | WaypointFlag::Approach
                    | WaypointFlag::MissedApproach
            )
        });
        match kind {
            SpliceKind::Sid => airport_index + 1,
            SpliceKind::SidTransition => last_of(WaypointFlag::Sid)
                .map(|i| i + 1)
                .unwrap_or(airport_index + 1),
            SpliceKind::Star => first_approach.unwrap_or(airport_index),
            SpliceKind::ApproachTransition => last_of(WaypointFlag::Star)
                .map(|i| i + 1)
                .or(first_approach)
                .unwrap_or(airport_index),
            SpliceKind::Approach => airport_index,
        }
    }

    fn is_en_route(route: &Route, index: usize) -> bool {
        route
            .get_waypoint(index)
            .is_some_and(|w| w.get_flag() == WaypointFlag::None)
    }

    /// An en-route waypoint equal to the procedure end point.
    fn is_junction(route: &Route, index: usize, wpt: &Waypoint) -> bool {
        route
            .get_waypoint(index)
            .map(|w| w.get_flag() == WaypointFlag::None && w == wpt)
            .unwrap_or(false)
    }

    /// New index of the waypoint that was active at `old_index`.
    fn relocate(route: &Route, active: Option<&Waypoint>, old_index: usize) -> usize {
        let fallback = old_index.min(route.len());
        let Some(active) = active else {
            return fallback;
        };
        route
            .get_waypoints()
            .iter()
            .enumerate()
            .filter(|(_, w)| *w == active)
            .min_by_key(|(i, _)| i.abs_diff(old_index))
            .map(|(i, _)| i)
            .unwrap_or(fallback)
    }
}
