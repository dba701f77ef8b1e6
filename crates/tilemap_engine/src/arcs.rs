use serde::{Deserialize, Serialize};

use crate::ZoneType;

/// Marker wrapped around non-placeholder arc messages in artifacts.
pub const MESSAGE_MARKER: &str = "***";

/// UI contract limits; checked by [`ArcEvent::validate`], not enforced by
/// the codec.
pub const ARC_NAME_LIMIT: usize = 18;
pub const ARC_MESSAGE_LIMIT: usize = 150;

/// The four estimated-time shapes. Each one fixes the arity and the
/// zero-padded width of its numeric parts; artifacts store only the
/// `':'`-joined parts, so the kind is re-derived from the shape on parse.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EstimatedKind {
    /// `MMM:SS:mmm` - estimated to finish
    #[default]
    E2F,
    /// `MM:SS:mmm` - estimated to start
    E2S,
    /// `SS:mmm` - short hold time
    Sht,
    /// `MM:SS` - long hold time
    Lht,
}

impl EstimatedKind {
    pub fn part_lengths(self) -> &'static [usize] {
        match self {
            EstimatedKind::E2F => &[3, 2, 3],
            EstimatedKind::E2S => &[2, 2, 3],
            EstimatedKind::Sht => &[2, 3],
            EstimatedKind::Lht => &[2, 2],
        }
    }

    pub fn pattern(self) -> &'static str {
        match self {
            EstimatedKind::E2F => "MMM:SS:mmm",
            EstimatedKind::E2S => "MM:SS:mmm",
            EstimatedKind::Sht => "SS:mmm",
            EstimatedKind::Lht => "MM:SS",
        }
    }

    /// Single-letter code used in arc file stems.
    pub fn stem_char(self) -> char {
        match self {
            EstimatedKind::E2F => 'F',
            EstimatedKind::E2S => 'S',
            EstimatedKind::Sht => 'H',
            EstimatedKind::Lht => 'L',
        }
    }
}

/// An estimated-time spec: a kind plus its zero-padded numeric parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EstimatedTime {
    pub kind: EstimatedKind,
    parts: Vec<String>,
}

impl Default for EstimatedTime {
    fn default() -> Self {
        EstimatedTime::new(EstimatedKind::default(), &[])
    }
}

impl EstimatedTime {
    /// Builds a spec of `kind` from `values`, zero-padding each part to
    /// its fixed width. Missing values are zero.
    pub fn new(kind: EstimatedKind, values: &[u32]) -> Self {
        let parts = kind
            .part_lengths()
            .iter()
            .enumerate()
            .map(|(i, &len)| format!("{:0len$}", values.get(i).copied().unwrap_or(0)))
            .collect();
        EstimatedTime { kind, parts }
    }

    /// Re-derives the kind from the part shape: three parts are E2F when
    /// the first is three digits wide (else E2S); two parts are SHT when
    /// the second is three digits wide (else LHT).
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if !parts.iter().all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit())) {
            return None;
        }
        let kind = match parts.len() {
            3 => {
                if parts[0].len() == 3 {
                    EstimatedKind::E2F
                } else {
                    EstimatedKind::E2S
                }
            }
            2 => {
                if parts[1].len() == 3 {
                    EstimatedKind::Sht
                } else {
                    EstimatedKind::Lht
                }
            }
            _ => return None,
        };
        Some(EstimatedTime {
            kind,
            parts: parts.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

impl std::fmt::Display for EstimatedTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parts.join(":"))
    }
}

/// Whether an arc's map comes from a saved artifact or is generated on
/// the fly.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapRefMode {
    #[default]
    Import,
    Generate,
}

/// Map reference of an arc: `$<name>!` imports, `#<name>!` generates.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct MapRef {
    pub mode: MapRefMode,
    pub name: String,
}

impl MapRef {
    pub fn import(name: impl Into<String>) -> Self {
        MapRef {
            mode: MapRefMode::Import,
            name: name.into(),
        }
    }

    pub fn generate(name: impl Into<String>) -> Self {
        MapRef {
            mode: MapRefMode::Generate,
            name: name.into(),
        }
    }

    /// Lenient: a field without the prefix/suffix decoration is kept as
    /// an import by name.
    pub fn parse(s: &str) -> Self {
        let (mode, rest) = match s.strip_prefix('$') {
            Some(rest) => (MapRefMode::Import, rest),
            None => match s.strip_prefix('#') {
                Some(rest) => (MapRefMode::Generate, rest),
                None => (MapRefMode::Import, s),
            },
        };
        let name = rest.strip_suffix('!').unwrap_or(rest);
        MapRef {
            mode,
            name: name.to_string(),
        }
    }
}

impl std::fmt::Display for MapRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.mode {
            MapRefMode::Import => '$',
            MapRefMode::Generate => '#',
        };
        write!(f, "{}{}!", prefix, self.name)
    }
}

/// A scripted event/quest unit, attachable to a map.
///
/// `start_msg`/`confirm_msg` are `None` for the UI placeholder text;
/// `arc_data` is free-form script text passed through unvalidated.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ArcEvent {
    pub name: String,
    pub estimated: EstimatedTime,
    pub zone: ZoneType,
    pub start_msg: Option<String>,
    pub map_ref: MapRef,
    pub arc_data: String,
    pub confirm_msg: Option<String>,
}

fn encode_message(msg: Option<&str>) -> String {
    match msg {
        Some(m) => format!("{MESSAGE_MARKER}{m}{MESSAGE_MARKER}"),
        None => String::new(),
    }
}

fn decode_message(field: &str) -> Option<String> {
    if field.is_empty() {
        return None;
    }
    let unwrapped = field
        .strip_prefix(MESSAGE_MARKER)
        .and_then(|s| s.strip_suffix(MESSAGE_MARKER))
        .unwrap_or(field);
    Some(unwrapped.to_string())
}

impl ArcEvent {
    /// Encodes the 7 `||`-joined fields:
    /// `name||estimated||zone||start||map||data||confirm`.
    pub fn encode_line(&self) -> String {
        [
            self.name.clone(),
            self.estimated.to_string(),
            self.zone.label().to_string(),
            encode_message(self.start_msg.as_deref()),
            self.map_ref.to_string(),
            self.arc_data.clone(),
            encode_message(self.confirm_msg.as_deref()),
        ]
        .join("||")
    }

    /// Parses one arc line. Anything that does not split into exactly 7
    /// fields is rejected; an unparseable estimated spec keeps the
    /// default one.
    pub fn parse_line(line: &str) -> Option<ArcEvent> {
        let parts: Vec<&str> = line.split("||").collect();
        if parts.len() != 7 {
            log::warn!("skipping arc line with {} fields instead of 7", parts.len());
            return None;
        }
        let estimated = EstimatedTime::parse(parts[1]).unwrap_or_else(|| {
            log::warn!("arc '{}': unrecognized estimated spec '{}'", parts[0], parts[1]);
            EstimatedTime::default()
        });
        Some(ArcEvent {
            name: parts[0].to_string(),
            estimated,
            zone: ZoneType::from_label(parts[2]),
            start_msg: decode_message(parts[3]),
            map_ref: MapRef::parse(parts[4]),
            arc_data: parts[5].to_string(),
            confirm_msg: decode_message(parts[6]),
        })
    }

    /// Checks the UI contract limits (name <= 18 chars, messages <= 150).
    pub fn validate(&self) -> bool {
        let msg_ok = |m: &Option<String>| m.as_ref().map_or(0, |m| m.chars().count()) <= ARC_MESSAGE_LIMIT;
        self.name.chars().count() <= ARC_NAME_LIMIT && msg_ok(&self.start_msg) && msg_ok(&self.confirm_msg)
    }

    /// Suggested file-name stem for a standalone `.arcs` artifact:
    /// name initial + estimated kind + zone + map-ref initial. Callers
    /// append their own uniquifying suffix.
    pub fn file_stem(&self) -> String {
        let name_char = self.name.chars().next().map_or('A', |c| c.to_ascii_uppercase());
        let map_char = self.map_ref.name.chars().next().map_or('M', |c| c.to_ascii_uppercase());
        format!(
            "{}{}{}{}",
            name_char,
            self.estimated.kind.stem_char(),
            self.zone.stem_char(),
            map_char
        )
    }
}

/// The global arc list: at most one entry per case-insensitive name,
/// first occurrence wins.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ArcList {
    arcs: Vec<ArcEvent>,
}

impl ArcList {
    pub fn new() -> Self {
        ArcList::default()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.arcs.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Returns whether the arc was inserted.
    pub fn push(&mut self, arc: ArcEvent) -> bool {
        if self.contains_name(&arc.name) {
            return false;
        }
        self.arcs.push(arc);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &ArcEvent> {
        self.arcs.iter()
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }
}

impl From<Vec<ArcEvent>> for ArcList {
    fn from(arcs: Vec<ArcEvent>) -> Self {
        let mut list = ArcList::new();
        for arc in arcs {
            list.push(arc);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_arc() -> ArcEvent {
        ArcEvent {
            name: "First Steps".to_string(),
            estimated: EstimatedTime::new(EstimatedKind::E2F, &[12, 30, 500]),
            zone: ZoneType::Crawl,
            start_msg: Some("Go now".to_string()),
            map_ref: MapRef::import("Alpha"),
            arc_data: "when enter then spawn E".to_string(),
            confirm_msg: None,
        }
    }

    #[test]
    fn test_estimated_zero_padding() {
        let est = EstimatedTime::new(EstimatedKind::E2F, &[12, 30, 500]);
        assert_eq!("012:30:500", est.to_string());
        let est = EstimatedTime::new(EstimatedKind::Lht, &[5]);
        assert_eq!("05:00", est.to_string());
    }

    #[test]
    fn test_estimated_kind_derived_from_shape() {
        assert_eq!(EstimatedKind::E2F, EstimatedTime::parse("012:30:500").unwrap().kind);
        assert_eq!(EstimatedKind::E2S, EstimatedTime::parse("12:30:500").unwrap().kind);
        assert_eq!(EstimatedKind::Sht, EstimatedTime::parse("30:500").unwrap().kind);
        assert_eq!(EstimatedKind::Lht, EstimatedTime::parse("12:30").unwrap().kind);
        assert!(EstimatedTime::parse("12").is_none());
        assert!(EstimatedTime::parse("a2:30").is_none());
        assert!(EstimatedTime::parse("").is_none());
    }

    #[test]
    fn test_map_ref_round_trip() {
        assert_eq!("$Alpha!", MapRef::import("Alpha").to_string());
        assert_eq!("#Cave!", MapRef::generate("Cave").to_string());
        assert_eq!(MapRef::import("Alpha"), MapRef::parse("$Alpha!"));
        assert_eq!(MapRef::generate("Cave"), MapRef::parse("#Cave!"));
        // undecorated fields stay usable as import names
        assert_eq!(MapRef::import("Plain"), MapRef::parse("Plain"));
    }

    #[test]
    fn test_arc_line_round_trip() {
        let arc = sample_arc();
        let line = arc.encode_line();
        assert_eq!(
            "First Steps||012:30:500||Crawl||***Go now***||$Alpha!||when enter then spawn E||",
            line
        );
        assert_eq!(arc, ArcEvent::parse_line(&line).unwrap());
    }

    #[test]
    fn test_placeholder_messages_stay_empty() {
        let mut arc = sample_arc();
        arc.start_msg = None;
        let line = arc.encode_line();
        assert!(!line.contains(MESSAGE_MARKER));
        assert_eq!(None, ArcEvent::parse_line(&line).unwrap().start_msg);
    }

    #[test]
    fn test_wrong_field_count_is_skipped() {
        assert!(ArcEvent::parse_line("only||three||fields").is_none());
        assert!(ArcEvent::parse_line("").is_none());
    }

    #[test]
    fn test_arc_list_dedup_is_case_insensitive_first_wins() {
        let mut list = ArcList::new();
        let first = sample_arc();
        let mut second = sample_arc();
        second.name = "FIRST STEPS".to_string();
        second.arc_data = "different".to_string();

        assert!(list.push(first.clone()));
        assert!(!list.push(second));
        assert_eq!(1, list.len());
        assert_eq!(&first, list.iter().next().unwrap());
    }

    #[test]
    fn test_validate_limits() {
        let mut arc = sample_arc();
        assert!(arc.validate());
        arc.name = "x".repeat(ARC_NAME_LIMIT + 1);
        assert!(!arc.validate());
        arc.name = "ok".to_string();
        arc.confirm_msg = Some("y".repeat(ARC_MESSAGE_LIMIT + 1));
        assert!(!arc.validate());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!("FFCA", sample_arc().file_stem());
    }
}
