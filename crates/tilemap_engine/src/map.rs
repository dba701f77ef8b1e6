use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{ArcEvent, Grid, Position, Size, limits};

/// What kind of passage exists at a port slot.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpeningCode {
    #[default]
    None,
    Walk,
    Door,
    RopeHoleLadder,
    StaticDoor,
    Waypoint,
}

impl OpeningCode {
    pub fn digit(self) -> char {
        match self {
            OpeningCode::None => '0',
            OpeningCode::Walk => '1',
            OpeningCode::Door => '2',
            OpeningCode::RopeHoleLadder => '3',
            OpeningCode::StaticDoor => '4',
            OpeningCode::Waypoint => '5',
        }
    }

    /// Any character outside `0..=5` is treated as a closed slot.
    pub fn from_digit(ch: char) -> Self {
        match ch {
            '1' => OpeningCode::Walk,
            '2' => OpeningCode::Door,
            '3' => OpeningCode::RopeHoleLadder,
            '4' => OpeningCode::StaticDoor,
            '5' => OpeningCode::Waypoint,
            _ => OpeningCode::None,
        }
    }
}

/// The fixed 7 port slots of a map: top, right, bottom, left edges plus
/// three interior waypoints. Always exactly 7 codes; string forms are
/// right-padded with `'0'`.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Openings([OpeningCode; limits::PORT_COUNT]);

impl Openings {
    pub fn parse(s: &str) -> Self {
        let mut codes = [OpeningCode::None; limits::PORT_COUNT];
        for (i, ch) in s.chars().take(limits::PORT_COUNT).enumerate() {
            codes[i] = OpeningCode::from_digit(ch);
        }
        Openings(codes)
    }

    pub fn port(&self, port: usize) -> OpeningCode {
        self.0.get(port).copied().unwrap_or_default()
    }

    pub fn set_port(&mut self, port: usize, code: OpeningCode) {
        if port < limits::PORT_COUNT {
            self.0[port] = code;
        }
    }
}

impl std::fmt::Display for Openings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for code in self.0 {
            write!(f, "{}", code.digit())?;
        }
        Ok(())
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneType {
    #[default]
    Safe,
    Crawl,
    Fight,
    Mix0,
    Mix1,
    Mix2,
    Mix3,
    Mixed,
}

impl ZoneType {
    pub const ALL: [ZoneType; 8] = [
        ZoneType::Safe,
        ZoneType::Crawl,
        ZoneType::Fight,
        ZoneType::Mix0,
        ZoneType::Mix1,
        ZoneType::Mix2,
        ZoneType::Mix3,
        ZoneType::Mixed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ZoneType::Safe => "Safe",
            ZoneType::Crawl => "Crawl",
            ZoneType::Fight => "Fight",
            ZoneType::Mix0 => "Mix0",
            ZoneType::Mix1 => "Mix1",
            ZoneType::Mix2 => "Mix2",
            ZoneType::Mix3 => "Mix3",
            ZoneType::Mixed => "Mixed",
        }
    }

    /// Single-letter code used in arc file stems.
    pub fn stem_char(self) -> char {
        match self {
            ZoneType::Safe => 'S',
            ZoneType::Crawl => 'C',
            ZoneType::Fight => 'G',
            ZoneType::Mix0 => '0',
            ZoneType::Mix1 => '1',
            ZoneType::Mix2 => '2',
            ZoneType::Mix3 => '3',
            ZoneType::Mixed => 'M',
        }
    }

    /// Accepts both the plain label and the decorated UI label
    /// (`"Mix1 (C+F)"`). Unknown values fall back to `Safe`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        let label = label.split_once(" (").map_or(label, |(head, _)| head);
        Self::ALL
            .into_iter()
            .find(|z| z.label() == label)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for ZoneType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Projection tag carried in the map header's `view` clause.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    YzView,
    #[default]
    ZzView,
    XyView,
    XyzView,
}

impl ViewMode {
    pub const ALL: [ViewMode; 4] = [ViewMode::YzView, ViewMode::ZzView, ViewMode::XyView, ViewMode::XyzView];

    pub fn tag(self) -> &'static str {
        match self {
            ViewMode::YzView => "Y=Z",
            ViewMode::ZzView => "Z=Z",
            ViewMode::XyView => "XY=Z",
            ViewMode::XyzView => "XYZ=Z",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.tag() == tag)
    }
}

/// A named palette entry: hex color plus blend opacity.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteColor {
    pub color: String,
    pub opacity: f32,
}

pub const DEFAULT_MAP_WIDTH: i32 = 48;
pub const DEFAULT_MAP_HEIGHT: i32 = 24;
pub const DEFAULT_MAKER: &str = "User";
pub const DEFAULT_SYSTEM_TAG: &str = "PB [no-jam] PyEditor";

/// One editable map: a grid plus its header/footer metadata, attached arc
/// snapshots and the section-color palette.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMap {
    pub name: String,
    pub maker: String,
    pub system: String,
    pub grid: Grid,
    pub openings: Openings,
    pub zone: ZoneType,
    pub view: ViewMode,
    pub sunrise: Option<Position>,
    pub sunset: Option<Position>,
    /// Alignment anchor on this map when another map is blended onto it.
    pub pin_at: Option<Position>,
    /// Alignment target on the other map.
    pub pin_to: Option<Position>,
    /// Owned snapshots; keeping these in sync with a global arc list is a
    /// caller responsibility.
    pub attached_arcs: Vec<ArcEvent>,
    /// Palette of named colors available for section tinting.
    pub named_colors: HashMap<String, PaletteColor>,
    /// Which palette name tints which cell. Ordered for stable encoding.
    pub cell_tints: BTreeMap<Position, String>,
}

impl Default for TileMap {
    fn default() -> Self {
        TileMap::new("Unnamed")
    }
}

impl TileMap {
    pub fn new(name: impl Into<String>) -> Self {
        TileMap {
            name: name.into(),
            maker: DEFAULT_MAKER.to_string(),
            system: DEFAULT_SYSTEM_TAG.to_string(),
            grid: Grid::new(DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT),
            openings: Openings::default(),
            zone: ZoneType::default(),
            view: ViewMode::default(),
            sunrise: None,
            sunset: None,
            pin_at: None,
            pin_to: None,
            attached_arcs: Vec::new(),
            named_colors: HashMap::new(),
            cell_tints: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> Size {
        self.grid.size()
    }

    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    pub fn height(&self) -> i32 {
        self.grid.height()
    }
}
