//! Text codecs for the two artifact kinds: single-map `.tmap` files and
//! multi-map `.mapd` dictionary bundles. Both are newline-delimited
//! human-readable text.

mod tile_map;
pub use tile_map::*;

mod connections;
pub use connections::*;

mod dictionary;
pub use dictionary::*;

/// File extension of a single-map artifact.
pub const TMAP_EXTENSION: &str = "tmap";
/// File extension of a dictionary bundle.
pub const MAPD_EXTENSION: &str = "mapd";
/// File extension of a standalone arc-line artifact.
pub const ARCS_EXTENSION: &str = "arcs";

/// Sentinel introducing the sparse property tokens on the footer line.
pub(crate) const PROPS_SENTINEL: &str = "mapc[!]";
/// Sentinel introducing the `;`-joined attached arc lines.
pub(crate) const ARCS_SENTINEL: &str = ";arcs::";
/// Sentinel introducing the section-color tokens.
pub(crate) const SECTION_SENTINEL: &str = "section_colors:";
/// Terminator of the section-color clause.
pub(crate) const SECTION_END: &str = "[end-section]";
/// Sentinel introducing the dictionary connections line.
pub(crate) const CONNECTIONS_SENTINEL: &str = ";connections::";
