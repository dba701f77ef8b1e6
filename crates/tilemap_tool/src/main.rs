#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

use std::{fs, path::PathBuf, process::exit};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use flexi_logger::Logger;
use serde::Serialize;
use tilemap_engine::{
    ConnectionGraph, DictionaryDocument, MAPD_EXTENSION, TMAP_EXTENSION, TileMap, connection_color, decode_dictionary,
    decode_map, is_compatible,
};

use crate::source::FsMapSource;

mod source;

#[derive(Parser)]
#[command(version, about = "Inspects, checks and lays out tmap/mapd map artifacts.")]
pub struct Cli {
    #[arg(help = "Emit machine-readable JSON instead of text.", long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Print a summary of a map or dictionary artifact")]
    Show { path: PathBuf },

    #[command(about = "Validate an artifact and report its problems")]
    Check { path: PathBuf },

    #[command(about = "Compute the placement of a dictionary's member maps")]
    Layout { path: PathBuf },
}

#[derive(Serialize)]
struct MapSummary {
    name: String,
    maker: String,
    system: String,
    size: String,
    openings: String,
    zone: &'static str,
    view: &'static str,
    non_default_cells: usize,
    attached_arcs: usize,
}

impl MapSummary {
    fn of(map: &TileMap) -> Self {
        MapSummary {
            name: map.name.clone(),
            maker: map.maker.clone(),
            system: map.system.clone(),
            size: map.size().to_string(),
            openings: map.openings.to_string(),
            zone: map.zone.label(),
            view: map.view.tag(),
            non_default_cells: map.grid.non_default_positions().count(),
            attached_arcs: map.attached_arcs.len(),
        }
    }
}

#[derive(Serialize)]
struct ConnectionSummary {
    from_map: String,
    from_port: usize,
    to_map: String,
    to_port: usize,
    orientation: &'static str,
    color: &'static str,
}

#[derive(Serialize)]
struct DictionarySummary {
    maps: Vec<MapSummary>,
    skipped: Vec<String>,
    arcs: Vec<String>,
    connections: Vec<ConnectionSummary>,
}

#[derive(Serialize)]
struct PlacementSummary {
    name: String,
    x: i32,
    y: i32,
    z: i32,
}

#[derive(Serialize)]
struct CheckReport {
    ok: bool,
    problems: Vec<String>,
}

enum Artifact {
    Map(TileMap),
    Dictionary(DictionaryDocument),
}

fn load_artifact(path: &PathBuf) -> Result<Artifact> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    match ext.as_str() {
        TMAP_EXTENSION => Ok(Artifact::Map(decode_map(&text)?)),
        MAPD_EXTENSION => {
            let bundle_dir = path.parent().map(PathBuf::from).unwrap_or_default();
            let source = FsMapSource::new(bundle_dir);
            Ok(Artifact::Dictionary(decode_dictionary(&text, &source)?))
        }
        _ => bail!("unsupported artifact extension '{ext}' (expected .tmap or .mapd)"),
    }
}

fn connection_summaries(maps: &[TileMap], graph: &ConnectionGraph) -> Vec<ConnectionSummary> {
    let name_of = |index: usize| maps.get(index).map_or_else(|| format!("#{index}"), |m| m.name.clone());
    graph
        .iter()
        .map(|connection| {
            let (first, second) = (connection.first(), connection.second());
            ConnectionSummary {
                from_map: name_of(first.map),
                from_port: first.port,
                to_map: name_of(second.map),
                to_port: second.port,
                orientation: match ConnectionGraph::orientation(maps, connection) {
                    tilemap_engine::Orientation::Horizontal => "horizontal",
                    tilemap_engine::Orientation::Vertical => "vertical",
                },
                color: connection_color(first.port, second.port),
            }
        })
        .collect()
}

fn print_map_summary(summary: &MapSummary) {
    println!("map \"{}\" {}", summary.name, summary.size);
    println!("  maker:             {}", summary.maker);
    println!("  system:            {}", summary.system);
    println!("  zone:              {}", summary.zone);
    println!("  openings:          {}", summary.openings);
    println!("  view:              {}", summary.view);
    println!("  non-default cells: {}", summary.non_default_cells);
    println!("  attached arcs:     {}", summary.attached_arcs);
}

fn show(artifact: &Artifact, json: bool) -> Result<()> {
    match artifact {
        Artifact::Map(map) => {
            let summary = MapSummary::of(map);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_map_summary(&summary);
            }
        }
        Artifact::Dictionary(document) => {
            let summary = DictionarySummary {
                maps: document.maps.iter().map(MapSummary::of).collect(),
                skipped: document.skipped.iter().map(|(name, err)| format!("{name}: {err}")).collect(),
                arcs: document.arcs.iter().map(|a| a.name.clone()).collect(),
                connections: connection_summaries(&document.maps, &document.connections),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
                return Ok(());
            }
            for map in &summary.maps {
                print_map_summary(map);
            }
            for skipped in &summary.skipped {
                println!("skipped: {skipped}");
            }
            if !summary.arcs.is_empty() {
                println!("arcs: {}", summary.arcs.join(", "));
            }
            for c in &summary.connections {
                println!(
                    "connection \"{}\"[{}] <-> \"{}\"[{}] ({}, {})",
                    c.from_map, c.from_port, c.to_map, c.to_port, c.orientation, c.color
                );
            }
        }
    }
    Ok(())
}

fn map_problems(map: &TileMap, problems: &mut Vec<String>) {
    for arc in &map.attached_arcs {
        if !arc.validate() {
            problems.push(format!("map \"{}\": arc \"{}\" exceeds name/message limits", map.name, arc.name));
        }
    }
    for (label, pos) in [
        ("sunrise", map.sunrise),
        ("sunset", map.sunset),
        ("pin-at", map.pin_at),
        ("pin-to", map.pin_to),
    ] {
        if let Some(pos) = pos {
            if !map.grid.is_inside(pos) {
                problems.push(format!("map \"{}\": {label} coordinate {pos} is outside the grid", map.name));
            }
        }
    }
}

fn check(artifact: &Artifact, json: bool) -> Result<()> {
    let mut problems = Vec::new();
    match artifact {
        Artifact::Map(map) => map_problems(map, &mut problems),
        Artifact::Dictionary(document) => {
            for map in &document.maps {
                map_problems(map, &mut problems);
            }
            for (name, err) in &document.skipped {
                problems.push(format!("member \"{name}\" did not load: {err}"));
            }
            for arc in document.arcs.iter() {
                if !arc.validate() {
                    problems.push(format!("arc \"{}\" exceeds name/message limits", arc.name));
                }
            }
            for connection in document.connections.iter() {
                let (first, second) = (connection.first(), connection.second());
                let (Some(map_a), Some(map_b)) = (document.maps.get(first.map), document.maps.get(second.map)) else {
                    problems.push(format!("connection references missing map {}/{}", first.map, second.map));
                    continue;
                };
                if !is_compatible(map_a, first.port, map_b, second.port) {
                    problems.push(format!(
                        "incompatible connection \"{}\"[{}] <-> \"{}\"[{}]",
                        map_a.name, first.port, map_b.name, second.port
                    ));
                }
            }
        }
    }

    let report = CheckReport {
        ok: problems.is_empty(),
        problems,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.ok {
        println!("ok");
    } else {
        for problem in &report.problems {
            println!("{problem}");
        }
    }
    if !report.ok {
        exit(1);
    }
    Ok(())
}

fn layout(artifact: &Artifact, json: bool) -> Result<()> {
    let Artifact::Dictionary(document) = artifact else {
        bail!("layout needs a .{MAPD_EXTENSION} dictionary artifact");
    };
    let placements: Vec<PlacementSummary> = document
        .connections
        .layout(&document.maps)
        .into_iter()
        .zip(&document.maps)
        .map(|(placement, map)| PlacementSummary {
            name: map.name.clone(),
            x: placement.x,
            y: placement.y,
            z: placement.z,
        })
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&placements)?);
    } else {
        for p in &placements {
            println!("{:<24} ({}, {}, z={})", p.name, p.x, p.y, p.z);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("warn")?.log_to_stderr().start()?;
    let args = Cli::parse();

    match &args.command {
        Commands::Show { path } => show(&load_artifact(path)?, args.json),
        Commands::Check { path } => check(&load_artifact(path)?, args.json),
        Commands::Layout { path } => layout(&load_artifact(path)?, args.json),
    }
}
