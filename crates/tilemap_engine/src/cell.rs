use serde::{Deserialize, Serialize};

/// Marker stamped on the cells addressed by a map's sunrise/sunset
/// coordinates.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SunMarker {
    #[default]
    None,
    Sunrise,
    Sunset,
}

impl SunMarker {
    /// Two-letter code used inside property tokens. `None` emits nothing.
    pub fn code(self) -> &'static str {
        match self {
            SunMarker::None => "",
            SunMarker::Sunrise => "SR",
            SunMarker::Sunset => "SS",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "SR" => SunMarker::Sunrise,
            "SS" => SunMarker::Sunset,
            _ => SunMarker::None,
        }
    }
}

/// Coarse categorical tag on a cell for downstream gameplay classification.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Earmark {
    #[default]
    Normal,
    Safe,
    Camp,
    Hole,
    BossSmall,
    BossMid,
    BossBig,
    LastBoss,
}

impl Earmark {
    pub const ALL: [Earmark; 8] = [
        Earmark::Normal,
        Earmark::Safe,
        Earmark::Camp,
        Earmark::Hole,
        Earmark::BossSmall,
        Earmark::BossMid,
        Earmark::BossBig,
        Earmark::LastBoss,
    ];

    /// Label written to the artifact (`;earmark=<label>`).
    pub fn label(self) -> &'static str {
        match self {
            Earmark::Normal => "Normal",
            Earmark::Safe => "Safe",
            Earmark::Camp => "Camp",
            Earmark::Hole => "Hole",
            Earmark::BossSmall => "Boss Small",
            Earmark::BossMid => "Boss Mid",
            Earmark::BossBig => "Boss Big",
            Earmark::LastBoss => "Last Boss",
        }
    }

    /// Unknown labels keep the default tag.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|e| e.label() == label.trim())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Earmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One cell of a map grid.
///
/// Every field has an allocation-time default; a cell where all of them
/// still hold those defaults is skipped by the sparse property encoder.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// One character from the fixed symbol alphabet.
    pub symbol: char,
    /// Hex color string, e.g. `#ff0000`.
    pub color: String,
    /// Texture filename reference.
    pub texture: String,
    /// Free-form label.
    pub name: String,
    pub value: i32,
    pub depth: i32,
    /// Elevation, may be negative.
    pub height: i32,
    /// 3d flag/magnitude.
    pub is3d: i32,
    /// 0..999999
    pub range: f32,
    pub sun: SunMarker,
    pub earmark: Earmark,
    pub title_card: bool,
    pub tint_color: Option<String>,
    pub tint_opacity: f32,
}

pub const DEFAULT_SYMBOL: char = ' ';
pub const DEFAULT_COLOR: &str = "#000000";
pub const DEFAULT_DEPTH: i32 = 1;

impl Default for Cell {
    fn default() -> Self {
        Cell {
            symbol: DEFAULT_SYMBOL,
            color: DEFAULT_COLOR.to_string(),
            texture: String::new(),
            name: String::new(),
            value: 0,
            depth: DEFAULT_DEPTH,
            height: 0,
            is3d: 0,
            range: 0.0,
            sun: SunMarker::None,
            earmark: Earmark::Normal,
            title_card: false,
            tint_color: None,
            tint_opacity: 0.0,
        }
    }
}

impl Cell {
    pub fn from_symbol(symbol: char) -> Self {
        Cell {
            symbol,
            ..Cell::default()
        }
    }

    /// True when every field equals its allocation-time default.
    ///
    /// Tint state is deliberately ignored: tints travel in the
    /// `section_colors` clause, not in property tokens.
    pub fn is_default(&self) -> bool {
        self.symbol == DEFAULT_SYMBOL
            && self.color == DEFAULT_COLOR
            && self.texture.is_empty()
            && self.name.is_empty()
            && self.value == 0
            && self.depth == DEFAULT_DEPTH
            && self.height == 0
            && self.is3d == 0
            && self.range == 0.0
            && self.sun == SunMarker::None
            && self.earmark == Earmark::Normal
            && !self.title_card
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cell_is_default() {
        assert!(Cell::default().is_default());
    }

    #[test]
    fn test_any_field_change_leaves_default() {
        let mut cell = Cell::default();
        cell.symbol = 'E';
        assert!(!cell.is_default());

        let mut cell = Cell::default();
        cell.height = -3;
        assert!(!cell.is_default());

        let mut cell = Cell::default();
        cell.earmark = Earmark::LastBoss;
        assert!(!cell.is_default());
    }

    #[test]
    fn test_tint_does_not_affect_default() {
        let mut cell = Cell::default();
        cell.tint_color = Some("#aabbcc".to_string());
        cell.tint_opacity = 0.5;
        assert!(cell.is_default());
    }

    #[test]
    fn test_earmark_labels_round_trip() {
        for e in Earmark::ALL {
            assert_eq!(e, Earmark::from_label(e.label()));
        }
        assert_eq!(Earmark::Normal, Earmark::from_label("Something Else"));
    }
}
