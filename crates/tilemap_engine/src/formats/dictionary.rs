//! Codec for the multi-map `.mapd` dictionary artifact.
//!
//! A dictionary bundles an import manifest of map names, a global arc
//! list and the connection graph. The maps themselves live in sibling
//! single-map artifacts; resolving a name to artifact text is delegated
//! to a [`MapSource`] so the codec stays free of file I/O.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{ArcEvent, ArcList, ConnectionGraph, EngineError, Result, TileMap};

use super::{CONNECTIONS_SENTINEL, decode_map, encode_connections, encode_map};

lazy_static! {
    static ref MANIFEST_NAME_RE: Regex = Regex::new(r#""([^"]*)""#).unwrap();
}

const MANIFEST_PREFIX: &str = "import {";

/// Resolves a manifest name to the text of its single-map artifact.
///
/// Callers working against a filesystem should search the bundle's own
/// directory first, then the conventional `map/` subdirectory, then the
/// working directory, and take the first hit.
pub trait MapSource {
    fn read_map(&self, name: &str) -> Option<String>;
}

/// In-memory source, mainly for tests and for re-encoding documents that
/// were never on disk.
#[derive(Default, Clone, Debug)]
pub struct MemoryMapSource {
    maps: HashMap<String, String>,
}

impl MemoryMapSource {
    pub fn new() -> Self {
        MemoryMapSource::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.maps.insert(name.into(), text.into());
    }

    pub fn insert_map(&mut self, map: &TileMap) {
        self.maps.insert(map.name.clone(), encode_map(map));
    }
}

impl MapSource for MemoryMapSource {
    fn read_map(&self, name: &str) -> Option<String> {
        self.maps.get(name).cloned()
    }
}

/// A decoded dictionary. `maps` holds the members that resolved and
/// decoded, in manifest order; entries that did not make it are listed in
/// `skipped` with the reason, so one corrupt member never takes the
/// bundle down.
#[derive(Default, Debug)]
pub struct DictionaryDocument {
    pub maps: Vec<TileMap>,
    pub arcs: ArcList,
    pub connections: ConnectionGraph,
    pub skipped: Vec<(String, EngineError)>,
}

/// Encodes the bundle text: manifest line, one line per arc, then the
/// connections clause. The member maps are written separately via
/// [`encode_map`].
pub fn encode_dictionary(maps: &[TileMap], arcs: &ArcList, graph: &ConnectionGraph) -> String {
    let names: Vec<String> = maps.iter().map(|m| format!("\"{}\"", m.name)).collect();
    let mut out = format!("{}{}}}\n", MANIFEST_PREFIX, names.join(", "));
    for arc in arcs.iter() {
        out.push_str(&arc.encode_line());
        out.push('\n');
    }
    out.push_str(&encode_connections(maps, graph));
    out
}

/// Decodes a bundle. Member maps resolve through `source`; their attached
/// arcs merge into the global list ahead of the bundle's own arc lines,
/// first occurrence of a name winning in both cases.
pub fn decode_dictionary(text: &str, source: &dyn MapSource) -> Result<DictionaryDocument> {
    let mut lines = text.lines();
    let Some(manifest) = lines.next() else {
        return Err(EngineError::EmptyArtifact);
    };
    if !manifest.trim_start().starts_with(MANIFEST_PREFIX) {
        return Err(EngineError::MissingManifest);
    }

    let mut document = DictionaryDocument::default();
    for caps in MANIFEST_NAME_RE.captures_iter(manifest) {
        let name = caps.get(1).map_or("", |m| m.as_str());
        let Some(map_text) = source.read_map(name) else {
            log::warn!("dictionary member '{name}' not found");
            document
                .skipped
                .push((name.to_string(), EngineError::generic("map artifact not found")));
            continue;
        };
        match decode_map(&map_text) {
            Ok(map) => {
                for arc in &map.attached_arcs {
                    document.arcs.push(arc.clone());
                }
                document.maps.push(map);
            }
            Err(err) => {
                log::warn!("dictionary member '{name}' failed to decode: {err}");
                document.skipped.push((name.to_string(), err));
            }
        }
    }

    let mut connections_section = None;
    for line in lines {
        let line = line.trim();
        // tolerate the clause glued to the end of an arc line
        let (arc_part, connections) = match line.find(CONNECTIONS_SENTINEL) {
            Some(idx) => (&line[..idx], Some(&line[idx + CONNECTIONS_SENTINEL.len()..])),
            None => (line, None),
        };
        if !arc_part.is_empty() {
            if let Some(arc) = ArcEvent::parse_line(arc_part) {
                document.arcs.push(arc);
            }
        }
        if connections.is_some() {
            connections_section = connections;
        }
    }
    if let Some(section) = connections_section {
        document.connections = super::decode_connections(section, &document.maps);
    }
    Ok(document)
}
