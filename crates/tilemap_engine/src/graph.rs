use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::{OpeningCode, TileMap, limits};

/// One side of a connection: a map (by manifest index) and one of its 7
/// ports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub map: usize,
    pub port: usize,
}

impl Endpoint {
    pub fn new(map: usize, port: usize) -> Self {
        Endpoint { map, port }
    }
}

/// An unordered pair of endpoints, stored normalized so the connection
/// set is canonical: `connect(A,B)` and `connect(B,A)` denote the same
/// connection.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Connection {
    a: Endpoint,
    b: Endpoint,
}

impl Connection {
    pub fn new(first: Endpoint, second: Endpoint) -> Self {
        if second < first {
            Connection { a: second, b: first }
        } else {
            Connection { a: first, b: second }
        }
    }

    pub fn first(&self) -> Endpoint {
        self.a
    }

    pub fn second(&self) -> Endpoint {
        self.b
    }

    pub fn touches(&self, endpoint: Endpoint) -> bool {
        self.a == endpoint || self.b == endpoint
    }

    /// The endpoint opposite to `map`, if this connection involves it.
    pub fn opposite_of(&self, map: usize) -> Option<Endpoint> {
        if self.a.map == map {
            Some(self.b)
        } else if self.b.map == map {
            Some(self.a)
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Which port kinds may legally join which others. Cardinal edges join
/// their opposite edge (and doors join laterally); interior waypoints
/// (4-6) join anything.
const ALLOWED_ENTER: [&[usize]; limits::PORT_COUNT] = [
    &[2, 4, 5, 6],
    &[3, 4, 5, 6],
    &[0, 3, 4, 5, 6],
    &[1, 3, 4, 5, 6],
    &[0, 1, 2, 3, 4, 5, 6],
    &[0, 1, 2, 3, 4, 5, 6],
    &[0, 1, 2, 3, 4, 5, 6],
];

/// False if either endpoint's slot is closed; otherwise true iff one
/// port appears in the other's allow-list. Symmetric by construction.
pub fn is_compatible(map_a: &TileMap, port_a: usize, map_b: &TileMap, port_b: usize) -> bool {
    if port_a >= limits::PORT_COUNT || port_b >= limits::PORT_COUNT {
        return false;
    }
    if map_a.openings.port(port_a) == OpeningCode::None || map_b.openings.port(port_b) == OpeningCode::None {
        return false;
    }
    ALLOWED_ENTER[port_a].contains(&port_b) || ALLOWED_ENTER[port_b].contains(&port_a)
}

/// Presentation color for a connection line, keyed by the unordered pair
/// of 1-based port indices. Does not affect compatibility.
pub fn connection_color(port_a: usize, port_b: usize) -> &'static str {
    let lo = port_a.min(port_b) + 1;
    let hi = port_a.max(port_b) + 1;
    match (lo, hi) {
        (2, 2) | (1, 2) => "gold",
        (3, 3) | (1, 3) => "green",
        (1, 4) | (2, 4) | (3, 4) | (4, 5) => "red",
        (5, 5) => "blue",
        _ => "black",
    }
}

/// Placement of one map computed by [`ConnectionGraph::layout`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// The inter-map connectivity graph, stored as a canonical set of
/// unordered endpoint pairs. The per-map "slot view" of the dictionary
/// artifact is projected from this set at encode time only.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct ConnectionGraph {
    connections: BTreeSet<Connection>,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        ConnectionGraph::default()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn contains(&self, first: Endpoint, second: Endpoint) -> bool {
        self.connections.contains(&Connection::new(first, second))
    }

    /// Inserts an already-coalesced connection without compatibility
    /// checks; used by the dictionary decoder, which re-derives the set
    /// from whatever the artifact says.
    pub fn insert_raw(&mut self, first: Endpoint, second: Endpoint) {
        if first.map == second.map {
            log::warn!("dropping self-connection on map {}", first.map);
            return;
        }
        self.connections.insert(Connection::new(first, second));
    }

    /// Toggle-connect: a rejected pair (closed or incompatible ports, or
    /// both endpoints on the same map) returns `false`; connecting an
    /// existing pair removes it instead of duplicating.
    ///
    /// A port may hold several simultaneous connections.
    pub fn connect(&mut self, maps: &[TileMap], first: Endpoint, second: Endpoint) -> bool {
        if first.map == second.map {
            return false;
        }
        let (Some(map_a), Some(map_b)) = (maps.get(first.map), maps.get(second.map)) else {
            return false;
        };
        let connection = Connection::new(first, second);
        if self.connections.remove(&connection) {
            return true;
        }
        if !is_compatible(map_a, first.port, map_b, second.port) {
            return false;
        }
        self.connections.insert(connection);
        true
    }

    /// Removes every connection touching the given port.
    pub fn disconnect_port(&mut self, map: usize, port: usize) {
        let endpoint = Endpoint::new(map, port);
        self.connections.retain(|c| !c.touches(endpoint));
    }

    pub fn is_port_connected(&self, map: usize, port: usize) -> bool {
        let endpoint = Endpoint::new(map, port);
        self.connections.iter().any(|c| c.touches(endpoint))
    }

    /// Vertical iff either endpoint's opening is the rope/hole/ladder
    /// code, else horizontal.
    pub fn orientation(maps: &[TileMap], connection: &Connection) -> Orientation {
        let is_ladder = |endpoint: Endpoint| {
            maps.get(endpoint.map)
                .map(|m| m.openings.port(endpoint.port) == OpeningCode::RopeHoleLadder)
                .unwrap_or(false)
        };
        if is_ladder(connection.first()) || is_ladder(connection.second()) {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    /// Breadth-first placement of every map.
    ///
    /// Map 0 anchors its component at (0,0,0); each newly visited
    /// neighbor is offset from the current node by the node's width or
    /// height in the connection's orientation, with the z level stepping
    /// up on ascending vertical edges and down otherwise. Maps in other
    /// components anchor themselves in index order. Afterwards all
    /// placements are translated so the minimum x/y is zero.
    pub fn layout(&self, maps: &[TileMap]) -> Vec<Placement> {
        let mut adjacency: HashMap<usize, Vec<&Connection>> = HashMap::new();
        for connection in &self.connections {
            adjacency.entry(connection.first().map).or_default().push(connection);
            adjacency.entry(connection.second().map).or_default().push(connection);
        }

        let mut placements = vec![Placement::default(); maps.len()];
        let mut visited = vec![false; maps.len()];
        let mut queue = VecDeque::new();

        for anchor in 0..maps.len() {
            if visited[anchor] {
                continue;
            }
            visited[anchor] = true;
            queue.push_back(anchor);
            while let Some(current) = queue.pop_front() {
                let at = placements[current];
                for connection in adjacency.get(&current).into_iter().flatten() {
                    let Some(neighbor) = connection.opposite_of(current) else {
                        continue;
                    };
                    let neighbor = neighbor.map;
                    if neighbor >= maps.len() || visited[neighbor] {
                        continue;
                    }
                    visited[neighbor] = true;
                    placements[neighbor] = match Self::orientation(maps, connection) {
                        Orientation::Horizontal => Placement {
                            x: at.x + maps[current].width(),
                            y: at.y,
                            z: at.z,
                        },
                        Orientation::Vertical => {
                            let first = connection.first();
                            let ascending = maps[first.map].openings.port(first.port) == OpeningCode::RopeHoleLadder;
                            Placement {
                                x: at.x,
                                y: at.y + maps[current].height(),
                                z: at.z + if ascending { 1 } else { -1 },
                            }
                        }
                    };
                    queue.push_back(neighbor);
                }
            }
        }

        if let (Some(min_x), Some(min_y)) = (
            placements.iter().map(|p| p.x).min(),
            placements.iter().map(|p| p.y).min(),
        ) {
            for placement in &mut placements {
                placement.x -= min_x;
                placement.y -= min_y;
            }
        }
        placements
    }
}
