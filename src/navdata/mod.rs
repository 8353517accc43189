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

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Instant;

use flate2::read::GzDecoder;
use log::{debug, info, warn};

use crate::earth::coordinate::Coordinate;
use crate::error::{Result, RouteError};
use crate::model::airport::Airport;
use crate::model::fix::Fix;
use crate::model::location::Location;
use crate::model::navaid::{Navaid, NavaidType};
use crate::model::procedure::{Procedure, ProcedureType};
use crate::model::waypoint::{Waypoint, WaypointKind};
use crate::preference;
use crate::util::airport_parser::AirportParserFG;
use crate::util::airway_parser::AirwayParserFG;
use crate::util::fix_parser::FixParserFG;
use crate::util::location_filter::{Filter, RangeFilter, RegionFilter};
use crate::util::navaid_parser::{IlsEntry, NavaidParserFG};
use crate::util::open_data_file;
use crate::util::procedure_parser::ProcedureParser;
use crate::util::procedure_parser_xml::ProcedureParserXml;
use crate::util::waypoint_codec::decode_id;

use self::airway::{Airway, AirwayLeg, AirwayNode, AirwayNodeType};
use self::index::{ProcedureIndex, data_error};

pub mod airway;
pub mod index;

/// A resolved airway point further than this from the navdata entity of the same id is a different point.
const AIRWAY_MATCH_NM: f64 = 1.0;

/// Where the navigation data is read from. Every source is optional.
#[derive(Debug, Clone, Default)]
pub struct NavdataPaths {
    pub airports: Option<PathBuf>,
    pub navaids: Option<PathBuf>,
    pub fixes: Option<PathBuf>,
    pub airways: Option<PathBuf>,
    pub procedures: Option<PathBuf>,
    pub procedures_xml_dir: Option<PathBuf>,
    pub index: Option<PathBuf>,
}

impl NavdataPaths {
    pub fn from_preferences() -> Self {
        let pref = preference::manager();
        let path = |key: &str| pref.get::<String>(key).map(PathBuf::from);
        Self {
            airports: path(preference::AIRPORTS_PATH),
            navaids: path(preference::NAVAIDS_PATH),
            fixes: path(preference::FIXES_PATH),
            airways: path(preference::AIRWAYS_PATH),
            procedures: path(preference::PROCEDURES_PATH),
            procedures_xml_dir: path(preference::PROCEDURES_XML_DIR),
            index: path(preference::INDEX_PATH),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BucketKind {
    Airport,
    Navaid(usize),
}

/// Entities indexed by the whole degree square they lie in.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BucketEntry {
    id: String,
    kind: BucketKind,
}

#[derive(Default)]
struct ProcedureSource {
    xml_dir: Option<PathBuf>,
    file: Option<PathBuf>,
    index: ProcedureIndex,
    added: HashMap<String, Vec<Procedure>>,
}

/// The navigation database. Built once, then only queried.
#[derive(Default)]
pub struct Navdata {
    airports: HashMap<String, Airport>,
    navaids: HashMap<String, Vec<Navaid>>,
    fixes: HashMap<String, Vec<Fix>>,
    airways: HashMap<String, Airway>,
    buckets: HashMap<(i32, i32), Vec<BucketEntry>>,
    procedures: ProcedureSource,
}

impl Navdata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(paths: &NavdataPaths) -> Result<Self> {
        let timer = Instant::now();
        let mut navdata = Navdata::new();

        if let Some(path) = &paths.airports {
            let mut airports = Vec::new();
            let mut reader = open_data_file(path).map_err(data_error)?;
            let mut parser = AirportParserFG::new();
            parser.load_airports(&mut airports, &mut reader).map_err(data_error)?;
            for airport in airports {
                navdata.add_airport(airport);
            }
            info!("Airports loaded in {:?}", timer.elapsed());
        }

        if let Some(path) = &paths.navaids {
            let mut navaids = Vec::new();
            let mut localizers = Vec::new();
            let mut reader = open_data_file(path).map_err(data_error)?;
            let mut parser = NavaidParserFG::new();
            parser
                .load_navaids(&mut navaids, &mut localizers, &mut reader)
                .map_err(data_error)?;
            for navaid in navaids {
                navdata.add_navaid(navaid);
            }
            for entry in localizers {
                navdata.attach_localizer(entry);
            }
            info!("Navaids loaded in {:?}", timer.elapsed());
        }

        if let Some(path) = &paths.fixes {
            let mut fixes = Vec::new();
            let mut reader = open_data_file(path).map_err(data_error)?;
            let mut parser = FixParserFG::new();
            parser.load_fixes(&mut fixes, &mut reader).map_err(data_error)?;
            for fix in fixes {
                navdata.add_fix(fix);
            }
            info!("Fixes loaded in {:?}", timer.elapsed());
        }

        if let Some(path) = &paths.airways {
            let mut airways = HashMap::new();
            let mut reader = open_data_file(path).map_err(data_error)?;
            let mut parser = AirwayParserFG::new();
            parser.load_airways(&mut airways, &mut reader).map_err(data_error)?;
            for (_, airway) in airways {
                navdata.add_airway(airway);
            }
            info!("Airways loaded in {:?}", timer.elapsed());
        }

        if let Some(path) = &paths.procedures {
            navdata.procedures.index = ProcedureIndex::load_or_build(paths.index.as_deref(), path)?;
            navdata.procedures.file = Some(path.clone());
            info!(
                "Procedures of {} airports indexed in {:?}",
                navdata.procedures.index.len(),
                timer.elapsed()
            );
        }
        navdata.procedures.xml_dir = paths.procedures_xml_dir.clone();

        Ok(navdata)
    }

    pub fn add_airport(&mut self, airport: Airport) {
        let id = airport.get_id().to_string();
        if let Some(old) = self.airports.get(&id) {
            let key = bucket_key(old.get_loc());
            if let Some(bucket) = self.buckets.get_mut(&key) {
                bucket.retain(|e| !(e.kind == BucketKind::Airport && e.id == id));
            }
        }
        self.buckets
            .entry(bucket_key(airport.get_loc()))
            .or_default()
            .push(BucketEntry {
                id: id.clone(),
                kind: BucketKind::Airport,
            });
        self.airports.insert(id, airport);
    }

    /// VORs and NDBs are range searchable, localizers belong to runways.
    pub fn add_navaid(&mut self, navaid: Navaid) {
        let id = navaid.get_id().to_string();
        let list = self.navaids.entry(id.clone()).or_default();
        if matches!(navaid.get_type(), NavaidType::Vor | NavaidType::Ndb) {
            self.buckets
                .entry(bucket_key(navaid.get_loc()))
                .or_default()
                .push(BucketEntry {
                    id,
                    kind: BucketKind::Navaid(list.len()),
                });
        }
        list.push(navaid);
    }

    pub fn add_fix(&mut self, fix: Fix) {
        self.fixes.entry(fix.get_id().to_string()).or_default().push(fix);
    }

    /// Points named without a position are placed using the fixes and navaids already loaded.
    pub fn add_airway(&mut self, mut airway: Airway) {
        let mut unresolved = 0;
        for segment in airway.get_segments_mut() {
            unresolved += self.place_airway_node(segment.get_from_mut());
            unresolved += self.place_airway_node(segment.get_to_mut());
        }
        if unresolved > 0 {
            warn!("Airway {} has {} points not found in navdata", airway.get_id(), unresolved);
        }
        self.airways.insert(airway.get_id().to_string(), airway);
    }

    /// Procedures held in memory take precedence over the procedure files.
    pub fn add_procedure(&mut self, procedure: Procedure) {
        self.procedures
            .added
            .entry(procedure.get_airport().to_string())
            .or_default()
            .push(procedure);
    }

    fn attach_localizer(&mut self, entry: IlsEntry) {
        let runway = self
            .airports
            .get_mut(&entry.airport)
            .and_then(|a| a.get_runway_mut(&entry.runway));
        match runway {
            Some(runway) => runway.set_ils(entry.localizer),
            None => debug!("No runway {} at {} for ILS {}", entry.runway, entry.airport, entry.localizer.get_id()),
        }
    }

    /// Returns the number of points left without a position.
    fn place_airway_node(&self, node: &mut AirwayNode) -> usize {
        if node.get_loc().is_some() {
            return 0;
        }
        let region = Some(node.get_region()).filter(|r| !r.is_empty());
        // Older navaid files carry no region
        let found = self
            .locate_airway_node(node, region)
            .or_else(|| self.locate_airway_node(node, None));
        match found {
            Some(coordinate) => {
                node.set_loc(coordinate);
                0
            }
            None => 1,
        }
    }

    fn locate_airway_node(&self, node: &AirwayNode, region: Option<&str>) -> Option<Coordinate> {
        let navaid_type = match node.get_type()? {
            AirwayNodeType::Fix => {
                return self.get_fixes(node.get_id(), region).first().map(|f| *f.get_loc());
            }
            AirwayNodeType::Vor => NavaidType::Vor,
            AirwayNodeType::Ndb => NavaidType::Ndb,
        };
        self.get_navaids(node.get_id(), region, Some(navaid_type))
            .first()
            .map(|n| *n.get_loc())
    }

    pub fn get_airport(&self, id: &str) -> Option<&Airport> {
        self.airports.get(id)
    }

    pub fn get_airport_count(&self) -> usize {
        self.airports.len()
    }

    pub fn get_navaids(&self, id: &str, region: Option<&str>, navaid_type: Option<NavaidType>) -> Vec<&Navaid> {
        let region = RegionFilter::new(region.unwrap_or(""));
        self.navaids
            .get(id)
            .map(|list| {
                list.iter()
                    .filter(|n| navaid_type.is_none_or(|t| n.get_type() == t))
                    .filter(|n| region.matches(n.get_region()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_fixes(&self, id: &str, region: Option<&str>) -> Vec<&Fix> {
        let region = RegionFilter::new(region.unwrap_or(""));
        self.fixes
            .get(id)
            .map(|list| list.iter().filter(|f| region.matches(f.get_region())).collect())
            .unwrap_or_default()
    }

    pub fn get_airway(&self, id: &str) -> Option<&Airway> {
        self.airways.get(id)
    }

    /// Every airport, VOR, NDB and fix called `id`, closest to `near` first.
    pub fn get_waypoints(&self, id: &str, near: Option<&Coordinate>) -> Vec<Waypoint> {
        let mut found: Vec<Waypoint> = Vec::new();
        if let Some(airport) = self.airports.get(id) {
            found.push(Waypoint::from_airport(airport.clone()));
        }
        found.extend(
            self.get_navaids(id, None, None)
                .into_iter()
                .filter(|n| matches!(n.get_type(), NavaidType::Vor | NavaidType::Ndb))
                .map(|n| Waypoint::from_navaid(n.clone())),
        );
        found.extend(
            self.get_fixes(id, None)
                .into_iter()
                .map(|f| Waypoint::from_fix(f.clone())),
        );
        if let Some(near) = near {
            found.sort_by(|a, b| a.get_loc().distance_to(near).total_cmp(&b.get_loc().distance_to(near)));
        }
        found
    }

    pub fn airports_in_range(&self, centre: &Coordinate, range_nm: f64) -> Vec<&Airport> {
        let mut found: Vec<&Airport> = self
            .bucket_entries(centre, range_nm)
            .filter(|e| e.kind == BucketKind::Airport)
            .filter_map(|e| self.airports.get(&e.id))
            .collect();
        filter_range(&mut found, centre, range_nm);
        found
    }

    /// VORs and NDBs within `range_nm`, optionally of one type, closest first.
    pub fn navaids_in_range(
        &self,
        centre: &Coordinate,
        range_nm: f64,
        navaid_type: Option<NavaidType>,
    ) -> Vec<&Navaid> {
        let mut found: Vec<&Navaid> = self
            .bucket_entries(centre, range_nm)
            .filter_map(|e| match e.kind {
                BucketKind::Navaid(i) => self.navaids.get(&e.id).and_then(|list| list.get(i)),
                BucketKind::Airport => None,
            })
            .filter(|n| navaid_type.is_none_or(|t| n.get_type() == t))
            .collect();
        filter_range(&mut found, centre, range_nm);
        found
    }

    fn bucket_entries(&self, centre: &Coordinate, range_nm: f64) -> impl Iterator<Item = &BucketEntry> {
        let lat_span = range_nm / 60.0;
        let cos_lat = centre.get_latitude().to_radians().cos();
        let lon_span = if cos_lat < 0.01 { 360.0 } else { range_nm / (60.0 * cos_lat) };

        let lat_from = (centre.get_latitude() - lat_span).floor().max(-90.0) as i32;
        let lat_to = (centre.get_latitude() + lat_span).floor().min(90.0) as i32;
        let lon_keys: Vec<i32> = if lon_span >= 180.0 {
            (-180..180).collect()
        } else {
            let from = (centre.get_longitude() - lon_span).floor() as i32;
            let to = (centre.get_longitude() + lon_span).floor() as i32;
            (from..=to).map(|lon| (lon + 180).rem_euclid(360) - 180).collect()
        };

        (lat_from..=lat_to)
            .flat_map(move |lat| lon_keys.clone().into_iter().map(move |lon| (lat, lon)))
            .filter_map(|key| self.buckets.get(&key))
            .flatten()
    }

    /// Expand `from` `airway` `to` into the airway points after `from`, ending with `to`.
    pub fn resolve_airway_legs(&self, from: &Waypoint, airway: &str, to: &str) -> Result<Vec<AirwayLeg>> {
        let found = self
            .airways
            .get(airway)
            .ok_or_else(|| RouteError::NotFound(format!("airway {}", airway)))?;
        found
            .find_path(from.get_id(), Some(from.get_loc()), to)
            .ok_or_else(|| RouteError::AirwayNotConnected {
                airway: airway.to_string(),
                from: from.get_id().to_string(),
                to: to.to_string(),
            })
    }

    /// Waypoints flying `airway` from `from` to `to`. An overfly mark on `to` is carried to the last waypoint.
    pub fn resolve_airway(&self, from: &Waypoint, airway: &str, to: &str) -> Result<Vec<Waypoint>> {
        let (target, overfly) = decode_id(to);
        let legs = self.resolve_airway_legs(from, airway, &target)?;
        let mut waypoints: Vec<Waypoint> = legs
            .iter()
            .map(|leg| {
                let mut wpt = self
                    .get_waypoints(&leg.id, Some(&leg.coordinate))
                    .into_iter()
                    .find(|w| w.get_loc().distance_to(&leg.coordinate) < AIRWAY_MATCH_NM)
                    .unwrap_or_else(|| {
                        Waypoint::new(&leg.id, leg.coordinate.get_latitude(), leg.coordinate.get_longitude())
                    });
                wpt.set_parent(airway);
                wpt
            })
            .collect();
        if overfly {
            if let Some(last) = waypoints.last_mut() {
                last.get_restrictions_mut().set_overfly(true);
            }
        }
        debug!("Airway {} from {} to {}: {} waypoints", airway, from.get_id(), target, waypoints.len());
        Ok(waypoints)
    }

    /// All procedures published for `airport`, runway legs carrying the airport's runway data.
    pub fn get_procedures(&self, airport: &str) -> Result<Vec<Procedure>> {
        let mut procedures = self.read_procedures(airport)?;
        for procedure in procedures.iter_mut() {
            self.complete_procedure(procedure);
            for transition in procedure.get_transitions_mut().iter_mut() {
                self.complete_procedure(transition);
            }
        }
        Ok(procedures)
    }

    pub fn get_sids(&self, airport: &str, runway: Option<&str>) -> Result<Vec<Procedure>> {
        self.procedures_of_type(airport, ProcedureType::Sid, runway)
    }

    pub fn get_stars(&self, airport: &str, runway: Option<&str>) -> Result<Vec<Procedure>> {
        self.procedures_of_type(airport, ProcedureType::Star, runway)
    }

    pub fn get_approaches(&self, airport: &str, runway: Option<&str>) -> Result<Vec<Procedure>> {
        self.procedures_of_type(airport, ProcedureType::Approach, runway)
    }

    pub fn get_sid(&self, airport: &str, name: &str) -> Result<Procedure> {
        self.named_procedure(airport, ProcedureType::Sid, name)
    }

    pub fn get_star(&self, airport: &str, name: &str) -> Result<Procedure> {
        self.named_procedure(airport, ProcedureType::Star, name)
    }

    pub fn get_approach(&self, airport: &str, name: &str) -> Result<Procedure> {
        self.named_procedure(airport, ProcedureType::Approach, name)
    }

    fn procedures_of_type(
        &self,
        airport: &str,
        procedure_type: ProcedureType,
        runway: Option<&str>,
    ) -> Result<Vec<Procedure>> {
        Ok(self
            .get_procedures(airport)?
            .into_iter()
            .filter(|p| p.get_type() == procedure_type)
            .filter(|p| runway.is_none_or(|r| p.serves_runway(r)))
            .collect())
    }

    fn named_procedure(&self, airport: &str, procedure_type: ProcedureType, name: &str) -> Result<Procedure> {
        self.get_procedures(airport)?
            .into_iter()
            .find(|p| p.get_type() == procedure_type && p.get_name() == name)
            .ok_or_else(|| RouteError::NotFound(format!("{:?} {} at {}", procedure_type, name, airport)))
    }

    fn read_procedures(&self, airport: &str) -> Result<Vec<Procedure>> {
        if let Some(added) = self.procedures.added.get(airport) {
            return Ok(added.clone());
        }

        if let Some(dir) = &self.procedures.xml_dir {
            let path = dir.join(format!("{}.xml", airport));
            if path.is_file() {
                let file = File::open(&path)?;
                let mut parser = ProcedureParserXml::new();
                return parser
                    .load_procedures(airport, BufReader::new(file))
                    .map_err(|e| RouteError::Xml(format!("{}: {}", path.display(), e)));
            }
        }

        if let (Some(path), Some(offset)) = (&self.procedures.file, self.procedures.index.get_offset(airport)) {
            let mut reader = open_at(path, offset)?;
            let mut parser = ProcedureParser::new();
            return parser.load_procedures(airport, &mut reader).map_err(data_error);
        }

        debug!("No procedures for {}", airport);
        Ok(Vec::new())
    }

    /// Runway legs are read without runway data and plain points without navdata type.
    fn complete_procedure(&self, procedure: &mut Procedure) {
        if let Some(airport) = self.airports.get(procedure.get_airport()) {
            for i in 0..procedure.len() {
                let runway = procedure
                    .get_waypoint(i)
                    .and_then(|w| w.as_runway())
                    .and_then(|r| airport.get_runway(r.get_number()))
                    .cloned();
                if let Some(runway) = runway {
                    procedure.modify_waypoint(i, |w| {
                        if !w.is_position_valid() || (w.get_lat() == 0.0 && w.get_long() == 0.0) {
                            w.set_loc(*runway.get_threshold());
                        }
                        w.set_kind(WaypointKind::Runway(runway));
                    });
                }
            }
        }
        procedure.scan_for_waypoint_information(self);
    }
}

fn bucket_key(coordinate: &Coordinate) -> (i32, i32) {
    (
        coordinate.get_latitude().floor() as i32,
        coordinate.get_longitude().floor() as i32,
    )
}

/// Keep what lies within `range_nm` of `centre`, closest first.
fn filter_range<L: Location>(found: &mut Vec<&L>, centre: &Coordinate, range_nm: f64) {
    match RangeFilter::new(centre.get_latitude(), centre.get_longitude(), range_nm) {
        Some(filter) => found.retain(|l| filter.filter(*l)),
        None => found.clear(),
    }
    found.sort_by(|a, b| a.get_loc().distance_to(centre).total_cmp(&b.get_loc().distance_to(centre)));
}

/// Open `path` positioned at the decompressed byte `offset`.
fn open_at(path: &Path, offset: u64) -> Result<Box<dyn BufRead>> {
    let mut file = File::open(path)?;
    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        let mut reader = BufReader::new(GzDecoder::new(file));
        io::copy(&mut (&mut reader).take(offset), &mut io::sink())?;
        Ok(Box::new(reader))
    } else {
        file.seek(SeekFrom::Start(offset))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::earth::coordinate::Coordinate;
    use crate::error::RouteError;
    use crate::model::location::Location;
    use crate::model::navaid::NavaidType;
    use crate::model::procedure::ProcedureType;
    use crate::model::test_utils::make_fix;
    use crate::model::waypoint::WaypointKind;

    use super::{Navdata, NavdataPaths};

    fn resource(name: &str) -> Option<PathBuf> {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("resources/test");
        path.push(name);
        Some(path)
    }

    fn load() -> Navdata {
        let paths = NavdataPaths {
            airports: resource("airports.dat"),
            navaids: resource("navaids.dat"),
            fixes: resource("fixes.dat"),
            airways: resource("airways.dat"),
            procedures: resource("procedures.txt"),
            procedures_xml_dir: resource("procedures"),
            index: None,
        };
        match Navdata::load(&paths) {
            Ok(navdata) => navdata,
            Err(e) => panic!("{}", e),
        }
    }

    #[test]
    fn test_load() {
        let navdata = load();
        assert_eq!(navdata.get_airport_count(), 3);
        let lowi = navdata.get_airport("LOWI").unwrap();
        let ils = lowi.get_runway("26").unwrap().get_ils().unwrap();
        assert_eq!(ils.get_id(), "OEJ");
        assert!(lowi.get_runway("08").unwrap().get_ils().is_none());
        assert!(navdata.get_airport("LOSB").is_none());
    }

    #[test]
    fn test_point_queries() {
        let navdata = load();
        assert_eq!(navdata.get_navaids("GRZ", None, Some(NavaidType::Vor)).len(), 1);
        assert!(navdata.get_navaids("GRZ", None, Some(NavaidType::Ndb)).is_empty());
        assert_eq!(navdata.get_fixes("TOP", None).len(), 2);
        let top = navdata.get_fixes("TOP", Some("YM"));
        assert_eq!(top.len(), 1);
        assert!(top[0].get_lat() < 0.0);

        let near_graz = Coordinate::new(46.99, 15.44);
        let found = navdata.get_waypoints("TOP", Some(&near_graz));
        assert_eq!(found.len(), 2);
        assert!(found[0].get_lat() > 0.0);

        let found = navdata.get_waypoints("LOWG", None);
        assert_eq!(found.len(), 1);
        assert!(found[0].is_airport());
        assert!(navdata.get_waypoints("NOWHERE", None).is_empty());
    }

    #[test]
    fn test_range_queries() {
        let navdata = load();
        let graz = Coordinate::new(46.99, 15.44);
        let airports = navdata.airports_in_range(&graz, 50.0);
        assert_eq!(airports.len(), 1);
        assert_eq!(airports[0].get_id(), "LOWG");
        assert_eq!(navdata.airports_in_range(&graz, 200.0).len(), 3);

        let innsbruck = Coordinate::new(47.26, 11.34);
        let vors = navdata.navaids_in_range(&innsbruck, 40.0, Some(NavaidType::Vor));
        assert_eq!(vors.len(), 1);
        assert_eq!(vors[0].get_id(), "RTT");
        let all = navdata.navaids_in_range(&innsbruck, 40.0, None);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].get_id(), "INN");
        assert!(navdata.navaids_in_range(&innsbruck, -1.0, None).is_empty());
    }

    #[test]
    fn test_resolve_airway() {
        let navdata = load();
        let from = make_fix("ETVIS", 47.40, 15.30);
        let waypoints = navdata.resolve_airway(&from, "UL607", "KPT*").unwrap();
        let ids: Vec<&str> = waypoints.iter().map(|w| w.get_id()).collect();
        assert_eq!(ids, vec!["LANUX", "NORIN", "KPT"]);
        assert!(waypoints.iter().all(|w| w.get_parent() == "UL607"));
        assert!(matches!(waypoints[0].get_kind(), WaypointKind::Intersection(_)));
        assert!(!waypoints[1].is_overfly());
        assert!(waypoints[2].is_overfly());

        let legs = navdata.resolve_airway_legs(&from, "UL607", "KPT").unwrap();
        assert_eq!(legs.len(), 3);
        assert!(legs.iter().all(|l| l.distance_nm > 0.0));

        let reverse = navdata.resolve_airway(&make_fix("KPT", 47.30, 12.50), "UL607", "ETVIS").unwrap();
        assert_eq!(reverse.last().unwrap().get_id(), "ETVIS");
    }

    #[test]
    fn test_resolve_airway_direction() {
        let navdata = load();
        let kpt = make_fix("KPT", 47.30, 12.50);
        let waypoints = navdata.resolve_airway(&kpt, "UN871", "RTT").unwrap();
        assert_eq!(waypoints.len(), 1);
        assert!(matches!(waypoints[0].get_kind(), WaypointKind::Vor(_)));

        let rtt = waypoints[0].clone();
        match navdata.resolve_airway(&rtt, "UN871", "KPT") {
            Err(RouteError::AirwayNotConnected { airway, .. }) => assert_eq!(airway, "UN871"),
            other => panic!("expected a connection failure, got {:?}", other.map(|w| w.len())),
        }
        assert!(matches!(
            navdata.resolve_airway(&kpt, "UZ999", "RTT"),
            Err(RouteError::NotFound(_))
        ));
        assert!(matches!(
            navdata.resolve_airway(&kpt, "UL607", "RTT"),
            Err(RouteError::AirwayNotConnected { .. })
        ));
    }

    #[test]
    fn test_simple_procedures() {
        let navdata = load();
        let stars = navdata.get_stars("LOWI", None).unwrap();
        assert_eq!(stars.len(), 1);
        assert_eq!(stars[0].get_name(), "RTT1A");

        let approaches = navdata.get_approaches("LOWI", Some("08")).unwrap();
        assert_eq!(approaches.len(), 1);
        let runway = approaches[0].get_waypoint(2).unwrap().as_runway().unwrap();
        assert!(runway.get_length() > 0);
        assert!(navdata.get_approaches("LOWI", Some("26")).unwrap().is_empty());

        let star = navdata.get_star("LOWI", "RTT1A").unwrap();
        assert_eq!(star.get_transition("SBG").unwrap().len(), 2);
        assert!(matches!(navdata.get_sid("LOWI", "RTT1A"), Err(RouteError::NotFound(_))));
        assert!(navdata.get_procedures("LOWW").unwrap().is_empty());
    }

    #[test]
    fn test_xml_procedures() {
        let navdata = load();
        // The Level-D file takes precedence over the simple file for Graz
        let sids = navdata.get_sids("LOWG", None).unwrap();
        assert_eq!(sids.len(), 1);
        assert_eq!(navdata.get_sids("LOWG", Some("35C")).unwrap().len(), 1);
        assert!(navdata.get_sids("LOWG", Some("17C")).unwrap().is_empty());

        let sid = navdata.get_sid("LOWG", "ETVI1C").unwrap();
        assert!(matches!(sid.get_waypoint(2).unwrap().get_kind(), WaypointKind::Intersection(_)));

        let approach = navdata.get_approach("LOWG", "ILS35C").unwrap();
        assert_eq!(approach.get_type(), ProcedureType::Approach);
        let runway = approach.get_waypoint(2).unwrap().as_runway().unwrap();
        assert_eq!(runway.get_number(), "35C");
        assert!(runway.get_length() > 9000);
    }

    #[test]
    fn test_added_procedures() {
        let mut navdata = Navdata::new();
        navdata.add_airport(crate::model::test_utils::make_airport("LOWG"));
        navdata.add_procedure(crate::model::test_utils::make_sid());
        assert_eq!(navdata.get_sids("LOWG", Some("35C")).unwrap().len(), 1);
        assert!(navdata.get_stars("LOWG", None).unwrap().is_empty());
    }
}
