//! Reconciliation planning
//!
//! Diffs the sidecar against the asset's embedded metadata and emits the
//! minimal ordered list of tag writes. Rules run in a fixed order:
//!
//! 1. Extension correction (JPEG content behind a non-JPEG name)
//! 2. Primary capture date
//! 3. Secondary `CreateDate`
//! 4. GPS block
//! 5. People keywords
//!
//! Assignments only target tags the asset does not have. Keywords use a
//! remove-then-add pair, and only for names not already present, so repeated
//! runs converge to zero updates.

use crate::models::{
    tags, FieldUpdate, MediaAsset, ReconciliationPlan, Rename, SidecarRecord, SidecarTime,
};
use crate::services::file_matcher::jpg_fallback;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use thiserror::Error;

/// Planning errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// Neither the formatted string nor the epoch value could be parsed
    #[error("Cannot parse sidecar {field} timestamp {value:?}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Planner switches taken from the run configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerOptions {
    /// Emit people keywords
    pub people: bool,
    /// Also target `FileCreateDate` (filesystems with a birth time)
    pub file_create_date: bool,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            people: false,
            file_create_date: !cfg!(target_os = "linux"),
        }
    }
}

/// Format an instant for exiftool date tags
pub fn format_exif_date(dt: &DateTime<Utc>) -> String {
    dt.format("%Y:%m:%d %H:%M:%S+00:00").to_string()
}

fn resolve_time(time: &SidecarTime, field: &'static str) -> Result<DateTime<Utc>, PlanError> {
    time.to_utc().ok_or_else(|| PlanError::InvalidTimestamp {
        field,
        value: time.formatted.clone(),
    })
}

/// Compute the plan for one asset
///
/// A sidecar timestamp is only parsed by the rule that needs it, so a bad
/// value never blocks the other rules.
pub fn plan(
    sidecar: &SidecarRecord,
    asset: &MediaAsset,
    options: &PlannerOptions,
) -> Result<ReconciliationPlan, PlanError> {
    let embedded = &asset.embedded;
    let mut updates = Vec::new();

    // None skips the mtime sync
    let captured_at = sidecar.captured_at.to_utc();

    // 1. Extension correction
    let rename = asset.is_misnamed_jpeg().then(|| Rename {
        from: asset.path.clone(),
        to: jpg_fallback(&asset.path),
    });

    // 2. Primary capture date
    let mut wrote_quicktime_create_date = false;
    if !embedded.has_capture_date() {
        let date = format_exif_date(&resolve_time(&sidecar.captured_at, "photoTakenTime")?);
        if asset.is_movie() {
            updates.push(FieldUpdate::assign(tags::KEYS_CREATION_DATE, date.clone()));
            updates.push(FieldUpdate::assign(tags::QUICKTIME_CREATE_DATE, date.clone()));
            wrote_quicktime_create_date = true;
        } else {
            updates.push(FieldUpdate::assign(tags::DATE_TIME_ORIGINAL, date.clone()));
        }

        if options.file_create_date {
            updates.push(FieldUpdate::assign(tags::FILE_CREATE_DATE, date));
        }
    }

    // 3. Secondary CreateDate (movies: already covered by QuickTime:CreateDate)
    if embedded.create_date.is_none() && !wrote_quicktime_create_date {
        let created_at = resolve_time(&sidecar.created_at, "creationTime")?;
        updates.push(FieldUpdate::assign(
            tags::CREATE_DATE,
            format_exif_date(&created_at),
        ));
    }

    // 4. GPS, all or nothing
    if !embedded.has_gps() {
        if let Some(geo) = sidecar.geo.filter(|g| g.is_known()) {
            let lat_ref = if geo.latitude < 0.0 { "S" } else { "N" };
            let lon_ref = if geo.longitude < 0.0 { "W" } else { "E" };
            let alt_ref = if geo.altitude < 0.0 {
                "Below Sea Level"
            } else {
                "Above Sea Level"
            };

            updates.push(FieldUpdate::assign(tags::GPS_LATITUDE, geo.latitude.abs().to_string()));
            updates.push(FieldUpdate::assign(tags::GPS_LATITUDE_REF, lat_ref));
            updates.push(FieldUpdate::assign(tags::GPS_LONGITUDE, geo.longitude.abs().to_string()));
            updates.push(FieldUpdate::assign(tags::GPS_LONGITUDE_REF, lon_ref));
            updates.push(FieldUpdate::assign(tags::GPS_ALTITUDE, geo.altitude.abs().to_string()));
            updates.push(FieldUpdate::assign(tags::GPS_ALTITUDE_REF, alt_ref));
        }
    }

    // 5. People keywords
    if options.people {
        let mut seen = HashSet::new();
        for name in &sidecar.people {
            if embedded.has_keyword(name) || !seen.insert(name.as_str()) {
                continue;
            }
            updates.push(FieldUpdate::remove(tags::KEYWORDS, name.clone()));
            updates.push(FieldUpdate::append(tags::KEYWORDS, name.clone()));
        }
    }

    tracing::debug!(
        file = %asset.path.display(),
        rename = rename.is_some(),
        updates = updates.len(),
        "Planned reconciliation"
    );

    Ok(ReconciliationPlan {
        rename,
        updates,
        captured_at,
    })
}
