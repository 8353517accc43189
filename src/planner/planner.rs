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

use crate::earth::coordinate::Coordinate;
use crate::error::{Result, RouteError};
use crate::model::airport::Airport;
use crate::model::flight_route::FlightRoute;
use crate::model::location::Location;
use crate::model::waypoint::Waypoint;
use crate::navdata::Navdata;
use crate::util::lat_long_format::parse_icao_coordinate;
use crate::util::waypoint_codec::decode_id;

const DIRECT: &str = "DCT";

/// Builds flight routes from ICAO route strings, `LOWG ETVIS UL607 KPT LOWI`.
pub struct Planner<'a> {
    navdata: &'a Navdata,
}

impl<'a> Planner<'a> {
    pub fn new(navdata: &'a Navdata) -> Self {
        Self { navdata }
    }

    /// Departure and destination are the first and last token. In between, a token following a
    /// fix is tried as an airway to the token after it. Parse errors report the token position.
    pub fn extract_route(&self, icao_route: &str) -> Result<FlightRoute> {
        let mut tokens: Vec<String> = icao_route
            .split_whitespace()
            .filter_map(|t| t.split('/').next())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_ascii_uppercase())
            .collect();
        // Filed routes often repeat the airports, `LOWG LOWG ... LOWI LOWI`
        if tokens.len() > 2 && tokens[0] == tokens[1] {
            tokens.remove(0);
        }
        let n = tokens.len();
        if n > 2 && tokens[n - 1] == tokens[n - 2] {
            tokens.pop();
        }
        if tokens.len() < 2 {
            return Err(RouteError::parse(1, "a route needs a departure and a destination airport"));
        }

        let adep = self.airport(&tokens[0])?;
        let ades = self.airport(&tokens[tokens.len() - 1])?;
        let inner = &tokens[1..tokens.len() - 1];

        let mut waypoints: Vec<Waypoint> = Vec::new();
        let mut reference = *adep.get_loc();
        let mut last_fix: Option<Waypoint> = None;
        let mut i = 0;
        while i < inner.len() {
            let token = inner[i].as_str();
            let position = i + 2;
            let lookahead = inner.get(i + 1).map(|t| t.as_str());

            if token == DIRECT {
                last_fix = None;
                i += 1;
                continue;
            }

            if i == 0 && self.navdata.get_sid(adep.get_id(), token).is_ok() {
                info!("Skipping SID {} of {}", token, adep.get_id());
                i += 1;
                continue;
            }

            if let (Some(from), Some(to)) = (last_fix.as_ref(), lookahead) {
                if to != DIRECT {
                    match self.navdata.resolve_airway(from, token, to) {
                        Ok(legs) => {
                            debug!("{} {} {}: {} legs", from.get_id(), token, to, legs.len());
                            if let Some(last) = legs.last() {
                                reference = *last.get_loc();
                                last_fix = Some(last.clone());
                            }
                            waypoints.extend(legs);
                            i += 2;
                            continue;
                        }
                        Err(e) => debug!("{} is not an airway from {}: {}", token, from.get_id(), e),
                    }
                }
            }

            match self.find_waypoint(token, &reference) {
                Some(wpt) => {
                    reference = *wpt.get_loc();
                    last_fix = Some(wpt.clone());
                    waypoints.push(wpt);
                }
                // The last token may name an arrival procedure rather than a fix
                None if lookahead.is_none() => {
                    warn!("Ignoring {} at the end of the route", token);
                }
                None => {
                    let message = match last_fix.as_ref() {
                        Some(from) => format!("{} is neither a waypoint nor an airway from {}", token, from.get_id()),
                        None => format!("unknown waypoint {}", token),
                    };
                    return Err(RouteError::parse(position, message));
                }
            }
            i += 1;
        }

        let mut route = FlightRoute::new();
        for wpt in waypoints {
            route.append(wpt);
        }
        route.set_departure_airport(adep, None)?;
        route.set_destination_airport(ades, None)?;
        info!("Extracted route with {} waypoints", route.len());
        Ok(route)
    }

    fn airport(&self, id: &str) -> Result<Airport> {
        self.navdata
            .get_airport(id)
            .cloned()
            .ok_or_else(|| RouteError::NotFound(format!("airport {}", id)))
    }

    /// A navdata point called `token` closest to `reference`, or a coordinate token.
    fn find_waypoint(&self, token: &str, reference: &Coordinate) -> Option<Waypoint> {
        let (id, overfly) = decode_id(token);
        let mut wpt = match parse_icao_coordinate(&id) {
            Some((latitude, longitude)) => Waypoint::new(&id, latitude, longitude),
            None => self.navdata.get_waypoints(&id, Some(reference)).into_iter().next()?,
        };
        if overfly {
            wpt.get_restrictions_mut().set_overfly(true);
        }
        Some(wpt)
    }
}
