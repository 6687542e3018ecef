use crate::config::LogoSource;
use crate::error::{FetchError, Result};
use crate::registry::Registry;
use include_dir::{Dir, include_dir};
use log::debug;
use std::path::Path;

static LOGOS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/logos");

const FALLBACK_LOGO: &str = "linux";

/// Embedded logo for an os-release `ID`, or the generic Linux one.
pub fn embedded_logo(os_id: &str) -> Option<&'static str> {
    let id = os_id.trim().to_lowercase();
    LOGOS_DIR
        .get_file(format!("{id}.txt"))
        .or_else(|| LOGOS_DIR.get_file(format!("{FALLBACK_LOGO}.txt")))
        .and_then(|file| file.contents_utf8())
}

/// Reads a logo file. The whole file is read at once; the handle does not
/// outlive this call.
pub fn read_logo(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| FetchError::BinaryLogo(path.to_path_buf()))
}

pub fn load_logo(source: &LogoSource, registry: &mut Registry) -> Result<Option<String>> {
    match source {
        LogoSource::Off => Ok(None),
        LogoSource::Os => {
            let id = registry
                .get("os", "id")
                .map(ToString::to_string)
                .unwrap_or_default();
            debug!("using embedded logo for '{id}'");
            Ok(embedded_logo(&id).map(str::to_string))
        }
        LogoSource::Path(path) => {
            debug!("path = {}", path.display());
            read_logo(path).map(Some)
        }
    }
}
