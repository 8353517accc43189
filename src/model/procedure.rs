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

use std::ops::{Deref, DerefMut};

use crate::error::{Result, RouteError};

use super::route::{Route, RouteType};
use super::runway::normalize_runway_id;
use super::waypoint::WaypointFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcedureType {
    Sid,
    Star,
    Approach,
    Transition,
}

impl ProcedureType {
    /// Flag given to the waypoints of this procedure when spliced into a flight route.
    /// STAR transitions are flown as part of the STAR.
    pub fn route_flag(&self, parent: Option<ProcedureType>) -> WaypointFlag {
        match (self, parent) {
            (ProcedureType::Sid, _) => WaypointFlag::Sid,
            (ProcedureType::Star, _) => WaypointFlag::Star,
            (ProcedureType::Approach, _) => WaypointFlag::Approach,
            (ProcedureType::Transition, Some(ProcedureType::Sid)) => WaypointFlag::SidTransition,
            (ProcedureType::Transition, Some(ProcedureType::Star)) => WaypointFlag::Star,
            (ProcedureType::Transition, _) => WaypointFlag::ApproachTransition,
        }
    }
}

/// A named terminal procedure of one airport. Its waypoints are a [`Route`].
#[derive(Debug, Clone)]
pub struct Procedure {
    route: Route,
    procedure_type: ProcedureType,
    airport: String,
    runways: Vec<String>,
    transitions: Vec<Procedure>,
}

impl Procedure {
    pub fn new(procedure_type: ProcedureType, name: &str, airport: &str) -> Self {
        let route_type = match procedure_type {
            ProcedureType::Sid => RouteType::Sid,
            ProcedureType::Star => RouteType::Star,
            ProcedureType::Approach => RouteType::Approach,
            ProcedureType::Transition => RouteType::Transition,
        };
        Self {
            route: Route::new(name, route_type),
            procedure_type,
            airport: airport.to_string(),
            runways: Vec::new(),
            transitions: Vec::new(),
        }
    }

    pub fn get_name(&self) -> &str {
        self.route.get_id()
    }

    pub fn get_type(&self) -> ProcedureType {
        self.procedure_type
    }

    pub fn get_airport(&self) -> &str {
        &self.airport
    }

    /// Runways served. Empty means every runway of the airport.
    pub fn get_runways(&self) -> &[String] {
        &self.runways
    }

    pub fn add_runway(&mut self, runway: &str) {
        let runway = normalize_runway_id(runway);
        if self.procedure_type == ProcedureType::Approach {
            self.runways.clear();
        }
        if !self.runways.contains(&runway) {
            self.runways.push(runway);
        }
    }

    /// The single runway of an approach.
    pub fn get_runway(&self) -> Option<&str> {
        self.runways.first().map(|r| r.as_str())
    }

    pub fn serves_runway(&self, runway: &str) -> bool {
        self.runways.is_empty() || self.runways.contains(&normalize_runway_id(runway))
    }

    pub fn add_transition(&mut self, transition: Procedure) -> Result<()> {
        if self.procedure_type == ProcedureType::Transition
            || transition.procedure_type != ProcedureType::Transition
        {
            return Err(RouteError::invalid(format!(
                "{} cannot own transition {}",
                self.get_name(),
                transition.get_name()
            )));
        }
        self.transitions.push(transition);
        Ok(())
    }

    pub fn get_transitions(&self) -> &[Procedure] {
        &self.transitions
    }

    pub fn get_transition(&self, name: &str) -> Option<&Procedure> {
        self.transitions.iter().find(|t| t.get_name() == name)
    }

    pub fn get_transitions_mut(&mut self) -> &mut Vec<Procedure> {
        &mut self.transitions
    }
}

impl Deref for Procedure {
    type Target = Route;

    fn deref(&self) -> &Route {
        &self.route
    }
}

impl DerefMut for Procedure {
    fn deref_mut(&mut self) -> &mut Route {
        &mut self.route
    }
}
