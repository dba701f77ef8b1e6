//! Codec for the single-map `.tmap` artifact.
//!
//! Layout: one header line, `height` body lines of cell symbols, then a
//! footer line carrying zone/name/maker/system plus the optional sparse
//! property tokens, attached arc lines and section-color tokens.

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    Cell, Earmark, EngineError, Grid, Openings, Position, Result, SunMarker, TileMap, ViewMode, ZoneType, limits,
};

use super::{ARCS_SENTINEL, PROPS_SENTINEL, SECTION_END, SECTION_SENTINEL};

use crate::ArcEvent;

/// Footer defaults applied when a clause is missing.
const FALLBACK_NAME: &str = "Loaded Map";

lazy_static! {
    static ref VIEW_RE: Regex = Regex::new(r" view (Y=Z|Z=Z|XY=Z|XYZ=Z)").unwrap();
    static ref SUN_RE: Regex = Regex::new(r"sunrise xy\((\d+),(\d+)\); sunset xy\((\d+),(\d+)\)").unwrap();
    static ref PIN_AT_RE: Regex = Regex::new(r"Pin At\((\d+),(\d+)\)").unwrap();
    static ref PIN_TO_RE: Regex = Regex::new(r"Pin To\((\d+),(\d+)\)").unwrap();
    static ref PROP_RE: Regex = Regex::new(
        r#"^(.)\["([^"]*)";"([^"]*)";"([^"]*)";([A-Z]{2})?\((-?\d+),(-?\d+),(-?\d+),(-?\d+),(-?\d+),?([0-9]*\.?[0-9]*)\)(\+t\(\d+,\d+\))?(\+o\(\d+,\d+\))?(-?\d*)(?:;earmark=([^;&]*))?(&?)\]$"#
    )
    .unwrap();
    static ref SECTION_RE: Regex = Regex::new(r"^(.+)\[(\d+),(\d+)\]$").unwrap();
}

pub fn encode_map(map: &TileMap) -> String {
    let mut header = format!("{} {} view {}", map.openings, map.grid.size(), map.view.tag());
    if let (Some(sunrise), Some(sunset)) = (map.sunrise, map.sunset) {
        header.push_str(&format!(
            " sunrise xy({},{}); sunset xy({},{})",
            sunrise.x, sunrise.y, sunset.x, sunset.y
        ));
    }
    if let Some(pin) = map.pin_at {
        header.push_str(&format!(" Pin At({},{})", pin.x, pin.y));
    }
    if let Some(pin) = map.pin_to {
        header.push_str(&format!(" Pin To({},{})", pin.x, pin.y));
    }

    let mut out = header;
    out.push('\n');
    for y in 0..map.height() {
        for x in 0..map.width() {
            out.push(map.grid.cell((x, y)).symbol);
        }
        out.push('\n');
    }

    out.push_str(&format!("{}; {}; {}; {}", map.zone, map.name, map.maker, map.system));
    out.push_str(&encode_properties(map));
    out.push_str(&encode_attached_arcs(map));
    out.push_str(&encode_section_colors(map));
    out
}

/// One token per non-default cell; the pin-at/pin-to cells always emit a
/// token so the `+t`/`+o` tags have a carrier.
fn encode_properties(map: &TileMap) -> String {
    let mut tokens = Vec::new();
    for y in 0..map.height() {
        for x in 0..map.width() {
            let pos = Position::new(x, y);
            let cell = map.grid.cell(pos);
            let is_pin = map.pin_at == Some(pos) || map.pin_to == Some(pos);
            if cell.is_default() && !is_pin {
                continue;
            }
            tokens.push(encode_property_token(map, pos, &cell));
        }
    }
    if tokens.is_empty() {
        String::new()
    } else {
        format!(" {} {}", PROPS_SENTINEL, tokens.join(" "))
    }
}

fn encode_property_token(map: &TileMap, pos: Position, cell: &Cell) -> String {
    let mut token = format!(
        "{}[\"{}\";\"{}\";\"{}\";{}({},{},{},{},{},{})",
        cell.symbol,
        cell.color,
        cell.name,
        cell.texture,
        cell.sun.code(),
        pos.x,
        cell.is3d,
        pos.y,
        cell.depth,
        cell.height,
        cell.range
    );
    if map.pin_at == Some(pos) {
        token.push_str(&format!("+t({},{})", pos.x, pos.y));
    }
    if map.pin_to == Some(pos) {
        token.push_str(&format!("+o({},{})", pos.x, pos.y));
    }
    token.push_str(&cell.value.to_string());
    if cell.earmark != Earmark::Normal {
        token.push_str(&format!(";earmark={}", cell.earmark.label()));
    }
    if cell.title_card {
        token.push('&');
    }
    token.push(']');
    token
}

fn encode_attached_arcs(map: &TileMap) -> String {
    if map.attached_arcs.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = map.attached_arcs.iter().map(ArcEvent::encode_line).collect();
    format!("{}{}", ARCS_SENTINEL, lines.join(";"))
}

fn encode_section_colors(map: &TileMap) -> String {
    if map.cell_tints.is_empty() {
        return String::new();
    }
    let tokens: Vec<String> = map
        .cell_tints
        .iter()
        .map(|(pos, name)| format!("{}[{},{}]", name, pos.x, pos.y))
        .collect();
    format!("{}{} {}", SECTION_SENTINEL, tokens.join("; "), SECTION_END)
}

/// Removes the matched range from `header`, joining the surroundings
/// with a single space.
fn strip_range(header: &mut String, start: usize, end: usize) {
    let merged = format!("{} {}", header[..start].trim_end(), header[end..].trim_start());
    *header = merged.trim().to_string();
}

fn scan_view(header: &mut String) -> Option<ViewMode> {
    let (range, view) = {
        let caps = VIEW_RE.captures(header)?;
        let whole = caps.get(0)?;
        (
            (whole.start(), whole.end()),
            ViewMode::from_tag(caps.get(1)?.as_str()),
        )
    };
    strip_range(header, range.0, range.1);
    view
}

/// Scans one optional clause, returning its numeric captures.
fn scan_numbers(header: &mut String, re: &Regex) -> Option<Vec<i32>> {
    let (range, numbers) = {
        let caps = re.captures(header)?;
        let whole = caps.get(0)?;
        let numbers: Option<Vec<i32>> = (1..caps.len()).map(|i| caps.get(i)?.as_str().parse().ok()).collect();
        ((whole.start(), whole.end()), numbers?)
    };
    strip_range(header, range.0, range.1);
    Some(numbers)
}

fn parse_size(token: &str) -> Result<(i32, i32)> {
    let parse = || -> Option<(i32, i32)> {
        let (w, h) = token.split_once('x')?;
        Some((w.parse().ok()?, h.parse().ok()?))
    };
    let (width, height) = parse().ok_or_else(|| EngineError::invalid_size(token))?;
    if !limits::is_within_limits(width, height) {
        return Err(EngineError::SizeOutOfBounds { width, height });
    }
    Ok((width, height))
}

/// Decodes a single-map artifact.
///
/// Every optional clause may appear independently. A malformed header is
/// fatal for this artifact; a property token failing its pattern is
/// skipped and the cell keeps its defaults.
pub fn decode_map(text: &str) -> Result<TileMap> {
    let lines: Vec<&str> = text.lines().collect();
    let Some(first) = lines.first() else {
        return Err(EngineError::EmptyArtifact);
    };

    let mut header = first.trim().to_string();
    let mut map = TileMap::new(FALLBACK_NAME);
    if let Some(view) = scan_view(&mut header) {
        map.view = view;
    }
    if let Some(nums) = scan_numbers(&mut header, &SUN_RE) {
        map.sunrise = Some(Position::new(nums[0], nums[1]));
        map.sunset = Some(Position::new(nums[2], nums[3]));
    }
    if let Some(nums) = scan_numbers(&mut header, &PIN_AT_RE) {
        map.pin_at = Some(Position::new(nums[0], nums[1]));
    }
    if let Some(nums) = scan_numbers(&mut header, &PIN_TO_RE) {
        map.pin_to = Some(Position::new(nums[0], nums[1]));
    }

    let mut parts = header.split_whitespace();
    let (Some(openings), Some(size)) = (parts.next(), parts.next()) else {
        return Err(EngineError::invalid_header(first.trim()));
    };
    map.openings = Openings::parse(openings);
    let (width, height) = parse_size(size)?;
    map.grid = Grid::new(width, height);

    // exactly `height` body lines: short lines pad with spaces, long
    // lines truncate, missing lines stay default
    for y in 0..height {
        let line = lines.get(1 + y as usize).map_or("", |l| l.trim_end());
        for (x, symbol) in line.chars().take(width as usize).enumerate() {
            if let Some(cell) = map.grid.cell_mut((x as i32, y)) {
                cell.symbol = symbol;
            }
        }
    }

    let footer: String = lines[(1 + height as usize).min(lines.len())..]
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut footer = footer.as_str();

    let section_str = match footer.find(SECTION_SENTINEL) {
        Some(idx) => {
            let section = footer[idx + SECTION_SENTINEL.len()..].trim();
            footer = footer[..idx].trim_end();
            Some(section)
        }
        None => None,
    };
    let arcs_str = match footer.find(ARCS_SENTINEL) {
        Some(idx) => {
            let arcs = footer[idx + ARCS_SENTINEL.len()..].trim();
            footer = footer[..idx].trim_end();
            Some(arcs)
        }
        None => None,
    };
    let props_str = match footer.find(PROPS_SENTINEL) {
        Some(idx) => {
            let props = footer[idx + PROPS_SENTINEL.len()..].trim();
            footer = footer[..idx].trim_end();
            Some(props)
        }
        None => None,
    };

    let mut meta = footer.split(';').map(str::trim);
    map.zone = ZoneType::from_label(meta.next().unwrap_or_default());
    if let Some(name) = meta.next() {
        map.name = name.to_string();
    }
    if let Some(maker) = meta.next() {
        map.maker = maker.to_string();
    }
    if let Some(system) = meta.next() {
        map.system = system.to_string();
    }

    if let Some(props) = props_str {
        apply_properties(&mut map, props);
    }
    if let Some(arcs) = arcs_str {
        for line in arcs.split(';').filter(|l| !l.is_empty()) {
            if let Some(arc) = ArcEvent::parse_line(line) {
                map.attached_arcs.push(arc);
            }
        }
    }
    if let Some(section) = section_str {
        apply_section_colors(&mut map, section);
    }

    // the sunrise/sunset coordinates stamp their cells
    if let Some(pos) = map.sunrise {
        if let Some(cell) = map.grid.cell_mut(pos) {
            cell.sun = SunMarker::Sunrise;
        }
    }
    if let Some(pos) = map.sunset {
        if let Some(cell) = map.grid.cell_mut(pos) {
            cell.sun = SunMarker::Sunset;
        }
    }
    Ok(map)
}

/// Applies the sparse property tokens. Tokens failing the pattern are
/// skipped; the addressed cells keep their defaults.
fn apply_properties(map: &mut TileMap, props: &str) {
    for block in props.split(']') {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        let token = format!("{block}]");
        let Some(caps) = PROP_RE.captures(&token) else {
            log::warn!("skipping malformed property token '{token}'");
            continue;
        };
        let int = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<i32>().ok()).unwrap_or(0);
        let text = |i: usize| caps.get(i).map_or(String::new(), |m| m.as_str().to_string());

        let pos = Position::new(int(6), int(8));
        let Some(cell) = map.grid.cell_mut(pos) else {
            log::warn!("skipping property token addressing out-of-range cell {pos}");
            continue;
        };
        cell.symbol = caps.get(1).and_then(|m| m.as_str().chars().next()).unwrap_or(' ');
        let color = text(2);
        cell.color = if color.is_empty() { crate::DEFAULT_COLOR.to_string() } else { color };
        cell.name = text(3);
        cell.texture = text(4);
        cell.sun = SunMarker::from_code(caps.get(5).map_or("", |m| m.as_str()));
        cell.is3d = int(7);
        cell.depth = int(9);
        cell.height = int(10);
        cell.range = caps.get(11).and_then(|m| m.as_str().parse().ok()).unwrap_or(0.0);
        // groups 12/13 are the pin tags; the pin coordinates themselves
        // travel in the header
        cell.value = int(14);
        cell.earmark = caps.get(15).map_or(Earmark::Normal, |m| Earmark::from_label(m.as_str()));
        cell.title_card = caps.get(16).is_some_and(|m| m.as_str() == "&");
    }
}

/// Assigns palette color/opacity to the addressed cell and records the
/// name association. Unknown palette names keep the association but
/// clear the tint.
fn apply_section_colors(map: &mut TileMap, section: &str) {
    let section = section.strip_suffix(SECTION_END).unwrap_or(section).trim_end();
    for token in section.split("; ") {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Some(caps) = SECTION_RE.captures(token) else {
            log::warn!("skipping malformed section-color token '{token}'");
            continue;
        };
        let name = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let pos = Position::new(
            caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(-1),
            caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(-1),
        );
        let palette = map.named_colors.get(&name).cloned();
        let Some(cell) = map.grid.cell_mut(pos) else {
            continue;
        };
        match palette {
            Some(entry) => {
                cell.tint_color = Some(entry.color);
                cell.tint_opacity = entry.opacity;
            }
            None => {
                cell.tint_color = None;
                cell.tint_opacity = 0.0;
            }
        }
        map.cell_tints.insert(pos, name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EstimatedKind, EstimatedTime, MapRef, PaletteColor};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_minimal_artifact() {
        let text = format!("1000000 10x5 view Z=Z\n{}\nSafe; Alpha; User; PB [no-jam] PyEditor", "..........\n".repeat(5).trim_end());
        let map = decode_map(&text).unwrap();
        assert_eq!(10, map.width());
        assert_eq!(5, map.height());
        assert_eq!("1000000", map.openings.to_string());
        assert_eq!("Alpha", map.name);
        assert_eq!('.', map.grid.cell((9, 4)).symbol);
    }

    #[test]
    fn test_encode_empty_map_has_no_property_tokens() {
        let mut map = TileMap::new("Empty");
        map.grid = Grid::new(4, 3);
        let text = encode_map(&map);
        assert!(!text.contains(PROPS_SENTINEL));
        assert!(!text.contains(ARCS_SENTINEL));
        assert!(!text.contains(SECTION_SENTINEL));
        assert_eq!("0000000 4x3 view Z=Z", text.lines().next().unwrap());
    }

    #[test]
    fn test_single_changed_cell_emits_single_token() {
        let mut map = TileMap::new("One");
        map.grid = Grid::new(6, 4);
        let mut cell = Cell::from_symbol('E');
        cell.color = "#ff0000".to_string();
        cell.value = 7;
        map.grid.set_cell((3, 2), cell);

        let text = encode_map(&map);
        let footer = text.lines().last().unwrap();
        // only property tokens open with `["`; the sentinel and the
        // system tag contribute bare `[`s
        assert_eq!(1, footer.matches("[\"").count());
        assert!(footer.contains(r##"E["#ff0000";"";"";(3,0,2,1,0,0)7]"##));

        let decoded = decode_map(&text).unwrap();
        assert_eq!('E', decoded.grid.cell((3, 2)).symbol);
        assert_eq!(7, decoded.grid.cell((3, 2)).value);
        assert_eq!("#ff0000", decoded.grid.cell((3, 2)).color);
    }

    #[test]
    fn test_header_clauses_are_order_independent() {
        let text = "Pin To(1,2) 1230000 8x2 sunrise xy(0,0); sunset xy(7,1) view XY=Z\n........\n........\nFight; Beta; Maker; Sys";
        let map = decode_map(text).unwrap();
        assert_eq!(ViewMode::XyView, map.view);
        assert_eq!(Some(Position::new(0, 0)), map.sunrise);
        assert_eq!(Some(Position::new(7, 1)), map.sunset);
        assert_eq!(Some(Position::new(1, 2)), map.pin_to);
        assert_eq!(None, map.pin_at);
        assert_eq!(ZoneType::Fight, map.zone);
        assert_eq!(SunMarker::Sunrise, map.grid.cell((0, 0)).sun);
        assert_eq!(SunMarker::Sunset, map.grid.cell((7, 1)).sun);
    }

    #[test]
    fn test_malformed_size_is_fatal() {
        assert!(matches!(
            decode_map("1000000 helloxworld view Z=Z\nSafe; A; B; C"),
            Err(EngineError::InvalidSize { .. })
        ));
        assert!(matches!(decode_map(""), Err(EngineError::EmptyArtifact)));
        assert!(matches!(decode_map("1000000\n"), Err(EngineError::InvalidHeader { .. })));
        assert!(matches!(
            decode_map("0000000 2000x2 view Z=Z\n"),
            Err(EngineError::SizeOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_malformed_property_token_is_skipped() {
        let text = "0000000 4x2 view Z=Z\n....\n....\nSafe; A; B; C mapc[!] E[not-a-token] F[\"#00ff00\";\"\";\"\";(1,0,1,1,0,0)3]";
        let map = decode_map(text).unwrap();
        // the broken token left its cell alone, the good one applied
        assert_eq!('F', map.grid.cell((1, 1)).symbol);
        assert_eq!(3, map.grid.cell((1, 1)).value);
        // every '.' body cell is non-default on symbol alone
        assert_eq!(8, map.grid.non_default_positions().count());
        assert_eq!('.', map.grid.cell((0, 0)).symbol);
        assert_eq!(0, map.grid.cell((0, 0)).value);
    }

    #[test]
    fn test_body_lines_pad_and_truncate() {
        // no footer: the artifact ends before the last body row
        let text = "0000000 4x3 view Z=Z\n######extra\n#\n";
        let map = decode_map(text).unwrap();
        // long line truncated
        assert_eq!('#', map.grid.cell((3, 0)).symbol);
        // short line padded
        assert_eq!('#', map.grid.cell((0, 1)).symbol);
        assert_eq!(' ', map.grid.cell((1, 1)).symbol);
        // missing line stays default
        assert_eq!(' ', map.grid.cell((0, 2)).symbol);
        // anything inside the body window is cell data, footer or not
        let map = decode_map("0000000 4x3 view Z=Z\n######extra\n#\nSafe; A; B; C").unwrap();
        assert_eq!('S', map.grid.cell((0, 2)).symbol);
    }

    #[test]
    fn test_negative_height_and_value_round_trip() {
        let mut map = TileMap::new("Neg");
        map.grid = Grid::new(3, 3);
        let mut cell = Cell::from_symbol('H');
        cell.height = -4;
        cell.value = -12;
        cell.range = 1.5;
        map.grid.set_cell((2, 0), cell.clone());

        let decoded = decode_map(&encode_map(&map)).unwrap();
        assert_eq!(cell, decoded.grid.cell((2, 0)));
    }

    #[test]
    fn test_attached_arcs_round_trip() {
        let mut map = TileMap::new("Arcs");
        map.grid = Grid::new(2, 2);
        map.attached_arcs.push(ArcEvent {
            name: "Quest".to_string(),
            estimated: EstimatedTime::new(EstimatedKind::Sht, &[10, 250]),
            zone: ZoneType::Mix2,
            start_msg: None,
            map_ref: MapRef::generate("Cavern"),
            arc_data: "do a thing".to_string(),
            confirm_msg: Some("done?".to_string()),
        });

        let decoded = decode_map(&encode_map(&map)).unwrap();
        assert_eq!(map.attached_arcs, decoded.attached_arcs);
    }

    #[test]
    fn test_section_colors_round_trip_names() {
        let mut map = TileMap::new("Tinted");
        map.grid = Grid::new(4, 4);
        map.named_colors.insert(
            "lava".to_string(),
            PaletteColor {
                color: "#ff3300".to_string(),
                opacity: 0.75,
            },
        );
        map.cell_tints.insert(Position::new(1, 1), "lava".to_string());
        map.cell_tints.insert(Position::new(2, 3), "ice".to_string());

        let text = encode_map(&map);
        assert!(text.contains("section_colors:lava[1,1]; ice[2,3] [end-section]"));

        let mut decoded = decode_map(&text).unwrap();
        // names survive; the palette itself is caller-provided
        assert_eq!(map.cell_tints, decoded.cell_tints);
        assert_eq!(None, decoded.grid.cell((1, 1)).tint_color);

        // with the palette present the tint is applied
        decoded.named_colors = map.named_colors.clone();
        let redecoded = decode_map(&encode_map(&decoded));
        assert!(redecoded.is_ok());
    }

    #[test]
    fn test_pin_cells_emit_carrier_token() {
        let mut map = TileMap::new("Pins");
        map.grid = Grid::new(4, 4);
        map.pin_at = Some(Position::new(1, 1));
        let text = encode_map(&map);
        assert!(text.contains("+t(1,1)"));

        let decoded = decode_map(&text).unwrap();
        assert_eq!(Some(Position::new(1, 1)), decoded.pin_at);
        assert!(decoded.grid.cell((1, 1)).is_default());
    }
}
