//! Codec for the `;connections::` clause of a dictionary artifact.
//!
//! The artifact stores a per-map slot view: every map emits a block with
//! one entry per port, so each connection is written twice (once from
//! each side). Decode re-derives the canonical unordered-pair set from
//! the raw slot tuples instead of trusting the slot count.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{ConnectionGraph, Endpoint, TileMap, limits};

use super::CONNECTIONS_SENTINEL;

const EMPTY_SLOT: &str = "--";

lazy_static! {
    static ref BLOCK_RE: Regex = Regex::new(r#""([^"]*)" \((\d+)\[\d+\]\)\{([^}]*)\}"#).unwrap();
    static ref SLOT_RE: Regex = Regex::new(r#""([^"]*)" \((\d+)\[(\d+)\]\)"#).unwrap();
}

/// Projects the graph into the per-map slot view, in manifest order.
///
/// A port holding several connections only has one slot; the block keeps
/// the last one in canonical order. The full set still round-trips as
/// long as each connection survives in at least one of its two slots.
pub fn encode_connections(maps: &[TileMap], graph: &ConnectionGraph) -> String {
    let mut blocks = Vec::with_capacity(maps.len());
    for (index, map) in maps.iter().enumerate() {
        let mut slots = vec![EMPTY_SLOT.to_string(); limits::PORT_COUNT];
        for connection in graph.iter() {
            for port in 0..limits::PORT_COUNT {
                if let Some(other) = connection.opposite_of(index) {
                    if connection.touches(Endpoint::new(index, port)) {
                        if let Some(other_map) = maps.get(other.map) {
                            slots[port] = format!("\"{}\" ({}[{}])", other_map.name, other.map, other.port);
                        }
                    }
                }
            }
        }
        blocks.push(format!("\"{}\" ({index}[{index}]){{{}}}", map.name, slots.join(";")));
    }
    format!("{}{}", CONNECTIONS_SENTINEL, blocks.join(";"))
}

/// Parses the clause body (the text after the sentinel) against the
/// decoded maps. Blocks naming unknown maps, slots naming unknown maps
/// and out-of-range ports are dropped with a warning; the double-written
/// slots coalesce into single connections.
pub fn decode_connections(section: &str, maps: &[TileMap]) -> ConnectionGraph {
    let index_of = |name: &str| maps.iter().position(|m| m.name == name);
    let mut graph = ConnectionGraph::new();
    for block in BLOCK_RE.captures_iter(section) {
        let name = block.get(1).map_or("", |m| m.as_str());
        let Some(map_index) = index_of(name) else {
            log::warn!("connections block names unknown map '{name}'");
            continue;
        };
        let slots = block.get(3).map_or("", |m| m.as_str());
        for (port, slot) in slots.split(';').enumerate() {
            let slot = slot.trim();
            if slot.is_empty() || slot == EMPTY_SLOT {
                continue;
            }
            let Some(caps) = SLOT_RE.captures(slot) else {
                log::warn!("skipping malformed connection slot '{slot}'");
                continue;
            };
            let other_name = caps.get(1).map_or("", |m| m.as_str());
            let Some(other_index) = index_of(other_name) else {
                log::warn!("connection slot names unknown map '{other_name}'");
                continue;
            };
            let other_port: usize = match caps.get(3).and_then(|m| m.as_str().parse().ok()) {
                Some(p) => p,
                None => continue,
            };
            if port >= limits::PORT_COUNT || other_port >= limits::PORT_COUNT {
                log::warn!("connection slot references out-of-range port {port}/{other_port}");
                continue;
            }
            graph.insert_raw(Endpoint::new(map_index, port), Endpoint::new(other_index, other_port));
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Openings;
    use pretty_assertions::assert_eq;

    fn named_map(name: &str, openings: &str) -> TileMap {
        let mut map = TileMap::new(name);
        map.openings = Openings::parse(openings);
        map
    }

    fn linked_pair() -> (Vec<TileMap>, ConnectionGraph) {
        let maps = vec![named_map("Alpha", "0100000"), named_map("Beta", "0001000")];
        let mut graph = ConnectionGraph::new();
        assert!(graph.connect(&maps, Endpoint::new(0, 1), Endpoint::new(1, 3)));
        (maps, graph)
    }

    #[test]
    fn test_encode_writes_both_slot_views() {
        let (maps, graph) = linked_pair();
        let clause = encode_connections(&maps, &graph);
        assert_eq!(
            ";connections::\
             \"Alpha\" (0[0]){--;\"Beta\" (1[3]);--;--;--;--;--};\
             \"Beta\" (1[1]){--;--;--;\"Alpha\" (0[1]);--;--;--}",
            clause
        );
    }

    #[test]
    fn test_decode_coalesces_double_written_slots() {
        let (maps, graph) = linked_pair();
        let clause = encode_connections(&maps, &graph);
        let decoded = decode_connections(clause.trim_start_matches(CONNECTIONS_SENTINEL), &maps);
        assert_eq!(graph, decoded);
        assert_eq!(1, decoded.len());
    }

    #[test]
    fn test_decode_tolerates_doubled_closing_brace() {
        // older artifacts close each block with '}}'
        let maps = vec![named_map("Alpha", "0100000"), named_map("Beta", "0001000")];
        let section = "\"Alpha\" (0[0]){--;\"Beta\" (1[3]);--;--;--;--;--}};\
                       \"Beta\" (1[1]){--;--;--;\"Alpha\" (0[1]);--;--;--}}";
        let decoded = decode_connections(section, &maps);
        assert_eq!(1, decoded.len());
        assert!(decoded.contains(Endpoint::new(0, 1), Endpoint::new(1, 3)));
    }

    #[test]
    fn test_unknown_names_and_bad_ports_are_dropped() {
        let maps = vec![named_map("Alpha", "1111111"), named_map("Beta", "1111111")];
        let section = "\"Ghost\" (9[9]){\"Alpha\" (0[0]);--;--;--;--;--;--};\
                       \"Alpha\" (0[0]){\"Ghost\" (9[9]);--;\"Beta\" (1[99]);--;--;\"Beta\" (1[0]);--}";
        let decoded = decode_connections(section, &maps);
        assert_eq!(1, decoded.len());
        assert!(decoded.contains(Endpoint::new(0, 5), Endpoint::new(1, 0)));
    }

    #[test]
    fn test_self_connections_are_dropped_on_decode() {
        let maps = vec![named_map("Alpha", "1111111")];
        let section = "\"Alpha\" (0[0]){\"Alpha\" (0[2]);--;--;--;--;--;--}";
        let decoded = decode_connections(section, &maps);
        assert!(decoded.is_empty());
    }
}
