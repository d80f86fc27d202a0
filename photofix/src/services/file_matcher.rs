//! Sidecar → asset path matching
//!
//! The export tool truncates long names and, for duplicates, inserts the
//! `(n)` counter *before* re-appending `.json`, so the sidecar for
//! `IMG_1234(1).HEIC` is named `IMG_1234.HEIC(1).json`.
//!
//! Name derivation is pure; only [`resolve_asset`] touches the filesystem.

use regex::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Matching errors
#[derive(Debug, Error)]
pub enum MatchError {
    /// Neither the expected path nor its `.jpg` variant exists
    #[error("No asset found for sidecar (tried {expected})")]
    NotFound { expected: PathBuf },

    /// Existence check failed for a reason other than absence
    #[error("Cannot access {0}: {1}")]
    Access(PathBuf, #[source] std::io::Error),
}

/// Sidecar file suffix
pub const SIDECAR_SUFFIX: &str = ".json";

/// Suffix appended by the extension correction
pub const JPG_SUFFIX: &str = ".jpg";

/// `.<ext>(<n>)` at the end of a name; ext is the last dot segment
fn duplicate_counter_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\.([^.()]+)(\(\d+\))$").expect("duplicate counter pattern is valid")
    })
}

/// Derive the asset file name from a sidecar file name
///
/// ```
/// use photofix::services::file_matcher::asset_name_for;
///
/// assert_eq!(asset_name_for("IMG_1234.HEIC(1).json"), "IMG_1234(1).HEIC");
/// assert_eq!(asset_name_for("photo.jpg.json"), "photo.jpg");
/// ```
pub fn asset_name_for(sidecar_name: &str) -> String {
    let name = strip_sidecar_suffix(sidecar_name);

    match duplicate_counter_pattern().captures(name) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.start());
            let ext = &caps[1];
            let counter = &caps[2];
            format!("{}{}.{}", &name[..whole], counter, ext)
        }
        None => name.to_string(),
    }
}

/// Remove a trailing `.json`, ignoring case
fn strip_sidecar_suffix(name: &str) -> &str {
    match name.len().checked_sub(SIDECAR_SUFFIX.len()) {
        Some(cut)
            if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(SIDECAR_SUFFIX) =>
        {
            &name[..cut]
        }
        _ => name,
    }
}

/// Whether `path` names a sidecar (`.json`, any case)
pub fn is_sidecar(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(&SIDECAR_SUFFIX[1..]))
}

/// Expected asset path for a sidecar (same directory)
pub fn expected_asset_path(sidecar_path: &Path) -> PathBuf {
    let file_name = sidecar_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let asset_name = asset_name_for(&file_name);
    match sidecar_path.parent() {
        Some(dir) => dir.join(asset_name),
        None => PathBuf::from(asset_name),
    }
}

/// `path` with `.jpg` appended (not replacing the extension)
///
/// Used to find assets already renamed by the extension correction.
pub fn jpg_fallback(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(JPG_SUFFIX);
    PathBuf::from(name)
}

/// Locate the asset for a sidecar on disk
///
/// Tries the expected path, then the `.jpg` variant left by an earlier run's
/// extension correction.
pub async fn resolve_asset(sidecar_path: &Path) -> Result<PathBuf, MatchError> {
    let expected = expected_asset_path(sidecar_path);

    for candidate in [expected.clone(), jpg_fallback(&expected)] {
        match tokio::fs::metadata(&candidate).await {
            Ok(meta) if meta.is_file() => return Ok(candidate),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(MatchError::Access(candidate, e)),
        }
    }

    Err(MatchError::NotFound { expected })
}
