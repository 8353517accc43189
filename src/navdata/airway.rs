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

use std::collections::{HashMap, VecDeque};

use crate::earth::coordinate::Coordinate;
use crate::model::waypoint::POSITION_EPSILON;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirwayDirection {
    Both,
    /// Only from the first to the second point of the segment.
    Forward,
    /// Only from the second to the first point of the segment.
    Backward,
}

impl AirwayDirection {
    pub fn from_code(code: &str) -> Option<AirwayDirection> {
        match code {
            "N" => Some(AirwayDirection::Both),
            "F" => Some(AirwayDirection::Forward),
            "B" => Some(AirwayDirection::Backward),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirwayNodeType {
    Fix,
    Ndb,
    Vor,
}

impl AirwayNodeType {
    /// awy.dat 11xx point type codes.
    pub fn from_code(code: &str) -> Option<AirwayNodeType> {
        match code {
            "11" => Some(AirwayNodeType::Fix),
            "2" => Some(AirwayNodeType::Ndb),
            "3" => Some(AirwayNodeType::Vor),
            _ => None,
        }
    }
}

/// A named point of an airway. 11xx files only name the point, its position is
/// looked up once fixes and navaids are loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AirwayNode {
    id: String,
    region: String,
    node_type: Option<AirwayNodeType>,
    coordinate: Option<Coordinate>,
}

impl AirwayNode {
    pub fn new(id: &str, region: &str, node_type: Option<AirwayNodeType>, coordinate: Option<Coordinate>) -> Self {
        Self {
            id: id.to_string(),
            region: region.to_string(),
            node_type,
            coordinate,
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_region(&self) -> &str {
        &self.region
    }

    pub fn get_type(&self) -> Option<AirwayNodeType> {
        self.node_type
    }

    pub fn get_loc(&self) -> Option<&Coordinate> {
        self.coordinate.as_ref()
    }

    pub fn set_loc(&mut self, coordinate: Coordinate) {
        self.coordinate = Some(coordinate);
    }

    fn same_point(&self, other: &AirwayNode) -> bool {
        match (&self.coordinate, &other.coordinate) {
            (Some(a), Some(b)) => {
                self.id == other.id
                    && (a.get_latitude() - b.get_latitude()).abs() < POSITION_EPSILON
                    && (a.get_longitude() - b.get_longitude()).abs() < POSITION_EPSILON
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirwaySegment {
    from: AirwayNode,
    to: AirwayNode,
    direction: AirwayDirection,
    high: bool,
    base_fl: i32,
    top_fl: i32,
}

impl AirwaySegment {
    pub fn new(from: AirwayNode, to: AirwayNode, direction: AirwayDirection, high: bool, base_fl: i32, top_fl: i32) -> Self {
        Self {
            from,
            to,
            direction,
            high,
            base_fl,
            top_fl,
        }
    }

    pub fn get_from(&self) -> &AirwayNode {
        &self.from
    }

    pub fn get_to(&self) -> &AirwayNode {
        &self.to
    }

    pub fn get_from_mut(&mut self) -> &mut AirwayNode {
        &mut self.from
    }

    pub fn get_to_mut(&mut self) -> &mut AirwayNode {
        &mut self.to
    }

    pub fn get_direction(&self) -> AirwayDirection {
        self.direction
    }

    pub fn is_high(&self) -> bool {
        self.high
    }

    pub fn get_base_fl(&self) -> i32 {
        self.base_fl
    }

    pub fn get_top_fl(&self) -> i32 {
        self.top_fl
    }
}

/// One point of an expanded airway with the geometry of the segment leading to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AirwayLeg {
    pub id: String,
    pub node_type: Option<AirwayNodeType>,
    pub coordinate: Coordinate,
    pub inbound_course: f64,
    pub outbound_course: Option<f64>,
    pub distance_nm: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Airway {
    id: String,
    segments: Vec<AirwaySegment>,
}

impl Airway {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            segments: Vec::new(),
        }
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn add_segment(&mut self, segment: AirwaySegment) {
        self.segments.push(segment);
    }

    pub fn get_segments(&self) -> &[AirwaySegment] {
        &self.segments
    }

    pub fn get_segments_mut(&mut self) -> &mut Vec<AirwaySegment> {
        &mut self.segments
    }

    pub fn contains(&self, id: &str) -> bool {
        self.segments
            .iter()
            .any(|s| s.from.id == id || s.to.id == id)
    }

    /// Walk the airway from `from` to `to` along the permitted segment directions.
    /// When the airway passes several points called `from`, the one closest to `near` is tried first.
    /// The result excludes `from` and ends with `to`; None when the airway does not connect them.
    pub fn find_path(&self, from: &str, near: Option<&Coordinate>, to: &str) -> Option<Vec<AirwayLeg>> {
        let graph = AirwayGraph::build(&self.segments);

        let mut starts: Vec<usize> = (0..graph.nodes.len())
            .filter(|&i| graph.nodes[i].id == from)
            .collect();
        if let Some(near) = near {
            starts.sort_by(|&a, &b| {
                let da = graph.distance_from(a, near);
                let db = graph.distance_from(b, near);
                da.total_cmp(&db)
            });
        }

        starts
            .into_iter()
            .find_map(|start| graph.shortest_path(start, to))
            .map(|path| graph.legs(&path))
    }
}

/// Points deduplicated by id and position, with directed edges.
struct AirwayGraph<'a> {
    nodes: Vec<&'a AirwayNode>,
    edges: HashMap<usize, Vec<usize>>,
}

impl<'a> AirwayGraph<'a> {
    fn build(segments: &'a [AirwaySegment]) -> Self {
        let mut graph = AirwayGraph {
            nodes: Vec::new(),
            edges: HashMap::new(),
        };
        for segment in segments {
            // Unresolved points can not be flown
            if segment.from.coordinate.is_none() || segment.to.coordinate.is_none() {
                continue;
            }
            let a = graph.node_index(&segment.from);
            let b = graph.node_index(&segment.to);
            if matches!(segment.direction, AirwayDirection::Both | AirwayDirection::Forward) {
                graph.edges.entry(a).or_default().push(b);
            }
            if matches!(segment.direction, AirwayDirection::Both | AirwayDirection::Backward) {
                graph.edges.entry(b).or_default().push(a);
            }
        }
        graph
    }

    fn node_index(&mut self, node: &'a AirwayNode) -> usize {
        match self.nodes.iter().position(|n| n.same_point(node)) {
            Some(i) => i,
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn coordinate(&self, index: usize) -> Coordinate {
        self.nodes[index]
            .coordinate
            .unwrap_or_else(|| Coordinate::new(0.0, 0.0))
    }

    fn distance_from(&self, index: usize, near: &Coordinate) -> f64 {
        self.coordinate(index).distance_to(near)
    }

    /// Breadth first, so the path with the fewest segments wins.
    fn shortest_path(&self, start: usize, to: &str) -> Option<Vec<usize>> {
        let mut previous: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        previous.insert(start, start);

        while let Some(current) = queue.pop_front() {
            if current != start && self.nodes[current].id == to {
                let mut path = vec![current];
                let mut node = current;
                while node != start {
                    node = previous[&node];
                    path.push(node);
                }
                path.reverse();
                return Some(path);
            }
            for &next in self.edges.get(&current).map(|e| e.as_slice()).unwrap_or(&[]) {
                if let std::collections::hash_map::Entry::Vacant(e) = previous.entry(next) {
                    e.insert(current);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn legs(&self, path: &[usize]) -> Vec<AirwayLeg> {
        path.windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let prev = self.coordinate(pair[0]);
                let here = self.coordinate(pair[1]);
                let outbound_course = path
                    .get(i + 2)
                    .map(|&next| here.bearing_to_deg(&self.coordinate(next)));
                AirwayLeg {
                    id: self.nodes[pair[1]].id.clone(),
                    node_type: self.nodes[pair[1]].node_type,
                    coordinate: here,
                    inbound_course: prev.bearing_to_deg(&here),
                    outbound_course,
                    distance_nm: prev.distance_to(&here),
                }
            })
            .collect()
    }
}
