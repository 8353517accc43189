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

use std::fmt;

use crate::earth::coordinate::Coordinate;
use crate::error::{Result, RouteError};

use super::airport::Airport;
use super::fix::Fix;
use super::holding::Holding;
use super::location::Location;
use super::navaid::{Navaid, NavaidType};
use super::restrictions::{MetaData, Restrictions, TurnDirection};
use super::runway::Runway;

/// Two waypoints with the same id are the same point when both coordinates are within this many degrees.
pub const POSITION_EPSILON: f64 = 1e-4;

/// Feet climbed per nautical mile when placing a heading to altitude leg.
const CLIMB_GRADIENT_FT_PER_NM: f64 = 250.0;
/// Fallback length of a heading to intercept leg that never meets its radial.
const INTERCEPT_FALLBACK_NM: f64 = 10.0;

/// Role of a waypoint within a route. The numeric codes are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum WaypointFlag {
    #[default]
    None,
    Adep,
    Sid,
    SidTransition,
    TopOfClimb,
    TopOfDescent,
    Star,
    ApproachTransition,
    Approach,
    Ades,
    MissedApproach,
    Discontinuity,
    DirectTo,
}

const ALL_FLAGS: [WaypointFlag; 13] = [
    WaypointFlag::None,
    WaypointFlag::Adep,
    WaypointFlag::Sid,
    WaypointFlag::SidTransition,
    WaypointFlag::TopOfClimb,
    WaypointFlag::TopOfDescent,
    WaypointFlag::Star,
    WaypointFlag::ApproachTransition,
    WaypointFlag::Approach,
    WaypointFlag::Ades,
    WaypointFlag::MissedApproach,
    WaypointFlag::Discontinuity,
    WaypointFlag::DirectTo,
];

impl WaypointFlag {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: u8) -> Option<WaypointFlag> {
        ALL_FLAGS.get(code as usize).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            WaypointFlag::None => "",
            WaypointFlag::Adep => "ADEP",
            WaypointFlag::Sid => "SID",
            WaypointFlag::SidTransition => "SID_TRANS",
            WaypointFlag::TopOfClimb => "TOC",
            WaypointFlag::TopOfDescent => "TOD",
            WaypointFlag::Star => "STAR",
            WaypointFlag::ApproachTransition => "APP_TRANS",
            WaypointFlag::Approach => "APP",
            WaypointFlag::Ades => "ADES",
            WaypointFlag::MissedApproach => "MISSED",
            WaypointFlag::Discontinuity => "DISC",
            WaypointFlag::DirectTo => "DCT",
        }
    }

    /// Accepts the numeric code or the name. An empty field is `None`.
    pub fn parse(text: &str) -> Option<WaypointFlag> {
        let text = text.trim();
        if text.is_empty() {
            return Some(WaypointFlag::None);
        }
        if let Ok(code) = text.parse::<u8>() {
            return Self::from_code(code);
        }
        ALL_FLAGS
            .iter()
            .find(|f| f.name().eq_ignore_ascii_case(text))
            .copied()
    }

    /// Flags belonging to spliced terminal procedures.
    pub fn is_procedure(&self) -> bool {
        matches!(
            self,
            WaypointFlag::Sid
                | WaypointFlag::SidTransition
                | WaypointFlag::Star
                | WaypointFlag::ApproachTransition
                | WaypointFlag::Approach
                | WaypointFlag::MissedApproach
        )
    }
}

impl fmt::Display for WaypointFlag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WaypointKind {
    Plain,
    Airport(Airport),
    Runway(Runway),
    Intersection(Fix),
    Vor(Navaid),
    Ndb(Navaid),
    Ils(Navaid),
    /// Fly `heading` until reaching `altitude_ft`.
    HdgToAlt { heading: f64, altitude_ft: i32 },
    /// Fly `heading` until intercepting `radial` of the point `fix`.
    HdgToIntercept {
        heading: f64,
        fix: Coordinate,
        radial: f64,
        turn: TurnDirection,
    },
}

impl WaypointKind {
    pub fn type_code(&self) -> &'static str {
        match self {
            WaypointKind::Plain => "",
            WaypointKind::Airport(_) => "APT",
            WaypointKind::Runway(_) => "RWY",
            WaypointKind::Intersection(_) => "INT",
            WaypointKind::Vor(_) => "VOR",
            WaypointKind::Ndb(_) => "NDB",
            WaypointKind::Ils(_) => "ILS",
            WaypointKind::HdgToAlt { .. } => "HDG_ALT",
            WaypointKind::HdgToIntercept { .. } => "HDG_INTC",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Waypoint {
    id: String,
    name: String,
    kind: WaypointKind,
    flag: WaypointFlag,
    parent: String,
    coordinate: Coordinate,
    xy: Option<(f64, f64)>,
    position_valid: bool,
    restrictions: Restrictions,
    estimated: MetaData,
    overflown: MetaData,
    holding: Option<Holding>,
}

impl Waypoint {
    pub fn new(id: &str, latitude: f64, longitude: f64) -> Self {
        Self::with_kind(id, "", Coordinate::new(latitude, longitude), WaypointKind::Plain)
    }

    fn with_kind(id: &str, name: &str, coordinate: Coordinate, kind: WaypointKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            flag: WaypointFlag::None,
            parent: String::new(),
            coordinate,
            xy: None,
            position_valid: true,
            restrictions: Restrictions::default(),
            estimated: MetaData::default(),
            overflown: MetaData::default(),
            holding: None,
        }
    }

    pub fn from_airport(airport: Airport) -> Self {
        let id = airport.get_id().to_string();
        let name = airport.get_name().to_string();
        let coordinate = *airport.get_loc();
        Self::with_kind(&id, &name, coordinate, WaypointKind::Airport(airport))
    }

    pub fn from_runway(runway: Runway) -> Self {
        let id = format!("RW{}", runway.get_number());
        let coordinate = *runway.get_threshold();
        Self::with_kind(&id, "", coordinate, WaypointKind::Runway(runway))
    }

    pub fn from_fix(fix: Fix) -> Self {
        let id = fix.get_id().to_string();
        let coordinate = *fix.get_loc();
        Self::with_kind(&id, "", coordinate, WaypointKind::Intersection(fix))
    }

    pub fn from_navaid(navaid: Navaid) -> Self {
        let id = navaid.get_id().to_string();
        let name = navaid.get_name().to_string();
        let coordinate = *navaid.get_loc();
        let kind = match navaid.get_type() {
            NavaidType::Ndb => WaypointKind::Ndb(navaid),
            NavaidType::Ils => WaypointKind::Ils(navaid),
            NavaidType::Vor | NavaidType::Dme => WaypointKind::Vor(navaid),
        };
        Self::with_kind(&id, &name, coordinate, kind)
    }

    /// Placeholder position until placed relative to its predecessor.
    pub fn hdg_to_alt(heading: f64, altitude_ft: i32) -> Self {
        let mut wpt = Self::with_kind(
            &format!("({})", altitude_ft),
            "",
            Coordinate::new(0.0, 0.0),
            WaypointKind::HdgToAlt {
                heading,
                altitude_ft,
            },
        );
        wpt.position_valid = false;
        wpt
    }

    /// Placeholder position until placed relative to its predecessor.
    pub fn hdg_to_intercept(heading: f64, fix: Coordinate, radial: f64, turn: TurnDirection) -> Self {
        let mut wpt = Self::with_kind(
            "(INTC)",
            "",
            Coordinate::new(0.0, 0.0),
            WaypointKind::HdgToIntercept {
                heading,
                fix,
                radial,
                turn,
            },
        );
        wpt.position_valid = false;
        wpt
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn get_kind(&self) -> &WaypointKind {
        &self.kind
    }

    /// Attach full navdata information without touching identity or position.
    pub fn set_kind(&mut self, kind: WaypointKind) {
        self.kind = kind;
    }

    pub fn get_flag(&self) -> WaypointFlag {
        self.flag
    }

    pub fn set_flag(&mut self, flag: WaypointFlag) {
        self.flag = flag;
    }

    pub fn get_parent(&self) -> &str {
        &self.parent
    }

    pub fn set_parent(&mut self, parent: &str) {
        self.parent = parent.to_string();
    }

    pub fn get_loc(&self) -> &Coordinate {
        &self.coordinate
    }

    pub fn get_lat(&self) -> f64 {
        self.coordinate.get_latitude()
    }

    pub fn get_long(&self) -> f64 {
        self.coordinate.get_longitude()
    }

    pub fn set_loc(&mut self, coordinate: Coordinate) {
        self.coordinate = coordinate;
        self.xy = None;
        self.position_valid = true;
    }

    pub fn get_xy(&self) -> Option<(f64, f64)> {
        self.xy
    }

    pub fn set_xy(&mut self, xy: (f64, f64)) {
        self.xy = Some(xy);
    }

    pub fn get_restrictions(&self) -> &Restrictions {
        &self.restrictions
    }

    pub fn get_restrictions_mut(&mut self) -> &mut Restrictions {
        &mut self.restrictions
    }

    pub fn set_restrictions(&mut self, restrictions: Restrictions) {
        self.restrictions = restrictions;
    }

    pub fn is_overfly(&self) -> bool {
        self.restrictions.is_overfly()
    }

    pub fn get_estimated(&self) -> &MetaData {
        &self.estimated
    }

    pub fn get_estimated_mut(&mut self) -> &mut MetaData {
        &mut self.estimated
    }

    pub fn get_overflown(&self) -> &MetaData {
        &self.overflown
    }

    pub fn get_overflown_mut(&mut self) -> &mut MetaData {
        &mut self.overflown
    }

    pub fn get_holding(&self) -> Option<&Holding> {
        self.holding.as_ref()
    }

    pub fn get_holding_mut(&mut self) -> Option<&mut Holding> {
        self.holding.as_mut()
    }

    pub fn set_holding(&mut self, holding: Holding) {
        self.holding = Some(holding);
    }

    pub fn clear_holding(&mut self) {
        self.holding = None;
    }

    pub fn as_airport(&self) -> Option<&Airport> {
        match &self.kind {
            WaypointKind::Airport(airport) => Some(airport),
            _ => None,
        }
    }

    pub fn as_runway(&self) -> Option<&Runway> {
        match &self.kind {
            WaypointKind::Runway(runway) => Some(runway),
            _ => None,
        }
    }

    pub fn as_fix(&self) -> Option<&Fix> {
        match &self.kind {
            WaypointKind::Intersection(fix) => Some(fix),
            _ => None,
        }
    }

    pub fn as_navaid(&self) -> Option<&Navaid> {
        match &self.kind {
            WaypointKind::Vor(navaid) | WaypointKind::Ndb(navaid) | WaypointKind::Ils(navaid) => {
                Some(navaid)
            }
            _ => None,
        }
    }

    pub fn is_airport(&self) -> bool {
        matches!(self.kind, WaypointKind::Airport(_))
    }

    pub fn has_type_information(&self) -> bool {
        !matches!(self.kind, WaypointKind::Plain)
    }

    pub fn get_active_runway_id(&self) -> Option<&str> {
        self.as_airport().and_then(|a| a.get_active_runway_id())
    }

    /// Runway read back from a route file, see [`Airport::restore_active_runway`].
    pub fn restore_active_runway(&mut self, runway: &str) -> Result<()> {
        match &mut self.kind {
            WaypointKind::Airport(airport) => {
                airport.restore_active_runway(runway)?;
                self.coordinate = *airport.get_loc();
                self.xy = None;
                Ok(())
            }
            _ => Err(RouteError::invalid(format!(
                "{} is not an airport",
                self.id
            ))),
        }
    }

    /// Select the active runway of an airport waypoint and move it to the threshold.
    pub fn set_active_runway(&mut self, runway: Option<&str>) -> Result<()> {
        match &mut self.kind {
            WaypointKind::Airport(airport) => {
                airport.set_active_runway(runway)?;
                self.coordinate = *airport.get_loc();
                self.xy = None;
                Ok(())
            }
            _ => Err(RouteError::invalid(format!(
                "{} is not an airport",
                self.id
            ))),
        }
    }

    /// Heading-to-altitude and heading-to-intercept legs are placed relative to their predecessor.
    pub fn is_dependent(&self) -> bool {
        matches!(
            self.kind,
            WaypointKind::HdgToAlt { .. } | WaypointKind::HdgToIntercept { .. }
        )
    }

    pub fn is_position_valid(&self) -> bool {
        self.position_valid
    }

    /// Mark a dependent position as a placeholder again.
    pub fn reset_dependent(&mut self) {
        if self.is_dependent() {
            self.position_valid = false;
            self.xy = None;
        }
    }

    /// Place a dependent waypoint from the predecessor it hangs off.
    pub fn recompute_position(&mut self, previous: &Waypoint) {
        let start = *previous.get_loc();
        let coordinate = match &self.kind {
            WaypointKind::HdgToAlt {
                heading,
                altitude_ft,
            } => {
                let start_alt = previous.reference_altitude();
                let distance =
                    (f64::from(*altitude_ft - start_alt) / CLIMB_GRADIENT_FT_PER_NM).max(1.0);
                start.coordinate_at(distance, *heading)
            }
            WaypointKind::HdgToIntercept {
                heading,
                fix,
                radial,
                ..
            } => Coordinate::intersection(&start, *heading, fix, *radial)
                .unwrap_or_else(|| start.coordinate_at(INTERCEPT_FALLBACK_NM, *heading)),
            _ => return,
        };
        self.set_loc(coordinate);
    }

    /// Altitude the aircraft is expected at when passing this waypoint.
    fn reference_altitude(&self) -> i32 {
        match &self.kind {
            WaypointKind::Airport(airport) => airport.get_elevation(),
            WaypointKind::Runway(runway) => runway.get_elevation(),
            WaypointKind::HdgToAlt { altitude_ft, .. } => *altitude_ft,
            _ => self
                .restrictions
                .get_altitude()
                .map(|a| a.altitude_ft)
                .unwrap_or(0),
        }
    }
}

impl PartialEq for Waypoint {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && (self.get_lat() - other.get_lat()).abs() < POSITION_EPSILON
            && (self.get_long() - other.get_long()).abs() < POSITION_EPSILON
    }
}

impl Location for Waypoint {
    fn get_id(&self) -> &str {
        &self.id
    }

    fn get_name(&self) -> &str {
        &self.name
    }

    fn get_loc(&self) -> &Coordinate {
        &self.coordinate
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.id, self.coordinate)
    }
}

#[cfg(test)]
mod tests {
    use crate::earth::coordinate::Coordinate;
    use crate::model::fix::Fix;
    use crate::model::restrictions::TurnDirection;
    use crate::model::test_utils::make_airport;

    use super::{Waypoint, WaypointFlag};

    #[test]
    fn test_equality_ignores_type_and_flag() {
        let plain = Waypoint::new("ETVIS", 47.3, 15.9);
        let mut fix = Waypoint::from_fix(Fix::new("ETVIS".to_string(), 47.30005, 15.89995));
        fix.set_flag(WaypointFlag::Sid);
        assert_eq!(plain, fix);

        assert_ne!(plain, Waypoint::new("ETVIS", 47.301, 15.9));
        assert_ne!(plain, Waypoint::new("ETVIZ", 47.3, 15.9));
    }

    #[test]
    fn test_flag_codes() {
        assert_eq!(WaypointFlag::Adep.code(), 1);
        assert_eq!(WaypointFlag::DirectTo.code(), 12);
        assert_eq!(WaypointFlag::parse("9"), Some(WaypointFlag::Ades));
        assert_eq!(WaypointFlag::parse("SID"), Some(WaypointFlag::Sid));
        assert_eq!(WaypointFlag::parse("app_trans"), Some(WaypointFlag::ApproachTransition));
        assert_eq!(WaypointFlag::parse(""), Some(WaypointFlag::None));
        assert_eq!(WaypointFlag::parse("13"), None);
        assert_eq!(WaypointFlag::parse("FOO"), None);
    }

    #[test]
    fn test_airport_active_runway() {
        let mut wpt = Waypoint::from_airport(make_airport("LOWG"));
        wpt.set_active_runway(Some("35C")).unwrap();
        assert_eq!(wpt.get_active_runway_id(), Some("35C"));
        let threshold = *wpt.as_airport().unwrap().get_runway("35C").unwrap().get_threshold();
        assert_eq!(*wpt.get_loc(), threshold);

        assert!(wpt.set_active_runway(Some("22")).is_err());
        assert!(Waypoint::new("X", 1.0, 1.0).set_active_runway(Some("22")).is_err());
    }

    #[test]
    fn test_hdg_to_alt_placement() {
        let mut airport = make_airport("LOWG");
        airport.set_active_runway(Some("35C")).unwrap();
        let departure = Waypoint::from_airport(airport);

        let mut climb = Waypoint::hdg_to_alt(350.0, 1860);
        assert!(climb.is_dependent());
        assert!(!climb.is_position_valid());
        climb.recompute_position(&departure);
        assert!(climb.is_position_valid());
        let distance = departure.get_loc().distance_to(climb.get_loc());
        assert!((distance - 2.0).abs() < 0.01, "distance {}", distance);

        climb.reset_dependent();
        assert!(!climb.is_position_valid());
    }

    #[test]
    fn test_hdg_to_intercept_placement() {
        let start = Waypoint::new("A", 0.0, 10.0);
        let mut intc =
            Waypoint::hdg_to_intercept(90.0, Coordinate::new(-2.0, 12.0), 0.0, TurnDirection::Left);
        intc.recompute_position(&start);
        assert!((intc.get_lat()).abs() < 0.01);
        assert!((intc.get_long() - 12.0).abs() < 0.01);
    }
}
