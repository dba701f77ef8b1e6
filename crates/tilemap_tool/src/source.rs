use std::fs;
use std::path::{Path, PathBuf};

use tilemap_engine::{MapSource, TMAP_EXTENSION};

/// Resolves manifest names against the filesystem: the bundle's own
/// directory first, then the `map/` subdirectory of the working
/// directory, then the working directory itself. First hit wins.
pub struct FsMapSource {
    bundle_dir: PathBuf,
}

impl FsMapSource {
    pub fn new(bundle_dir: impl Into<PathBuf>) -> Self {
        FsMapSource {
            bundle_dir: bundle_dir.into(),
        }
    }
}

impl MapSource for FsMapSource {
    fn read_map(&self, name: &str) -> Option<String> {
        let file = format!("{name}.{TMAP_EXTENSION}");
        let candidates = [
            self.bundle_dir.join(&file),
            Path::new("map").join(&file),
            PathBuf::from(&file),
        ];
        for candidate in candidates {
            if !candidate.is_file() {
                continue;
            }
            match fs::read_to_string(&candidate) {
                Ok(text) => return Some(text),
                Err(err) => {
                    log::warn!("cannot read {}: {err}", candidate.display());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_dir_is_searched_first() {
        let dir = std::env::temp_dir().join(format!("tilemap_tool_src_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Alpha.tmap"), "0000000 2x1 view Z=Z\n..\nSafe; Alpha; U; S").unwrap();

        let source = FsMapSource::new(&dir);
        assert!(source.read_map("Alpha").unwrap().starts_with("0000000 2x1"));
        assert!(source.read_map("Missing").is_none());

        fs::remove_dir_all(&dir).unwrap();
    }
}
