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

use super::airport::Airport;
use super::fix::Fix;
use super::flight_route::FlightRoute;
use super::procedure::{Procedure, ProcedureType};
use super::runway::Runway;
use super::waypoint::Waypoint;

/// An airport laid out like Graz, runway 17C/35C.
pub fn make_airport(id: &str) -> Airport {
    let mut airport = Airport::new(id.to_string(), 46.9911, 15.4396, 1360, "Graz".to_string());
    airport.add_runway(Runway::new("17C", 47.0044, 15.4366, 172.6, 9842, 148, 1360));
    airport.add_runway(Runway::new("35C", 46.9782, 15.4407, 352.6, 9842, 148, 1360));
    airport
}

pub fn make_fix(id: &str, latitude: f64, longitude: f64) -> Waypoint {
    Waypoint::from_fix(Fix::new(id.to_string(), latitude, longitude))
}

/// An airport laid out like Innsbruck, runway 08/26.
pub fn make_destination(id: &str) -> Airport {
    let mut airport = Airport::new(id.to_string(), 47.2602, 11.3439, 1906, "Innsbruck".to_string());
    airport.add_runway(Runway::new("08", 47.2590, 11.3240, 83.0, 6562, 148, 1906));
    airport.add_runway(Runway::new("26", 47.2615, 11.3640, 263.0, 6562, 148, 1906));
    airport
}

/// Runway 35C departure climbing straight ahead to 2360 ft, ending at ETVIS.
pub fn make_sid() -> Procedure {
    let mut sid = Procedure::new(ProcedureType::Sid, "ETVI1C", "LOWG");
    sid.add_runway("35C");
    sid.append(Waypoint::hdg_to_alt(353.0, 2360));
    sid.append(make_fix("GRZ1", 47.10, 15.45));
    sid.append(make_fix("ETVIS", 47.40, 15.30));

    let mut transition = Procedure::new(ProcedureType::Transition, "NIBAG", "LOWG");
    transition.append(make_fix("ETVIS", 47.40, 15.30));
    transition.append(make_fix("NIBAG", 47.50, 14.80));
    sid.add_transition(transition).unwrap();
    sid
}

/// Arrival from KPT ending at RTT, with a transition from SBG.
pub fn make_star() -> Procedure {
    let mut star = Procedure::new(ProcedureType::Star, "RTT1A", "LOWI");
    star.append(make_fix("KPT", 47.30, 12.50));
    star.append(make_fix("RTT", 47.40, 11.90));

    let mut transition = Procedure::new(ProcedureType::Transition, "SBG", "LOWI");
    transition.append(make_fix("SBG", 47.80, 13.00));
    transition.append(make_fix("KPT", 47.30, 12.50));
    star.add_transition(transition).unwrap();
    star
}

pub fn make_approach_transition() -> Procedure {
    let mut transition = Procedure::new(ProcedureType::Transition, "RTT", "LOWI");
    transition.append(make_fix("RTT", 47.40, 11.90));
    transition.append(make_fix("WI", 47.33, 11.00));
    transition
}

/// Localizer approach to runway 08 with a missed approach to MAP1.
pub fn make_approach(airport: &Airport) -> Procedure {
    let mut approach = Procedure::new(ProcedureType::Approach, "LOC08", "LOWI");
    approach.add_runway("08");
    approach.append(make_fix("WI", 47.33, 11.00));
    approach.append(make_fix("INN4", 47.27, 11.15));
    if let Some(rwy) = airport.get_runway("08") {
        approach.append(Waypoint::from_runway(rwy.clone()));
    }
    approach.append(make_fix("MAP1", 47.25, 11.50));
    approach
}

/// LOWG - ETVIS - KPT - LOWI
pub fn make_flight_route() -> FlightRoute {
    let mut route = FlightRoute::new();
    route.append(make_fix("ETVIS", 47.40, 15.30));
    route.append(make_fix("KPT", 47.30, 12.50));
    route
        .set_departure_airport(make_airport("LOWG"), Some("35C"))
        .unwrap();
    route
        .set_destination_airport(make_destination("LOWI"), None)
        .unwrap();
    route
}

pub fn ids(route: &FlightRoute) -> Vec<String> {
    route
        .get_waypoints()
        .iter()
        .map(|w| w.get_id().to_string())
        .collect()
}
