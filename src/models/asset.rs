//! Represents one carousel image registration and the naming scheme
//! that identifies it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix shared by every backend key the registry writes.
pub const STORED_NAME_PREFIX: &str = "carousel_";

/// Well-known backend key of the serialized index document.
pub const INDEX_KEY: &str = "carousel_index.json";

/// Extensions accepted for carousel uploads. Image formats only.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// One carousel image registration as persisted in the index document.
///
/// Field names are the wire format of the index: `filename` is the stored
/// name (the backend key actually holding the bytes), `expires` the last
/// day (inclusive) the image is shown, and `url` the backend-provided
/// location when the image lives in the object store. Local-backend
/// entries carry no `url`; their display path is derived from `filename`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AssetEntry {
    /// Backend key holding the image bytes, generated at upload time as
    /// `carousel_<token>_<sanitized original name>`.
    pub filename: String,

    /// Last day (inclusive) on which the image counts as active.
    pub expires: NaiveDate,

    /// Backend-provided URL; present only for the object-store backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Derived display state of an entry relative to a given day.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AssetStatus {
    Expired,
    Active { days_remaining: i64 },
}

impl AssetEntry {
    /// An entry is active while `today <= expires`.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        today <= self.expires
    }

    pub fn status(&self, today: NaiveDate) -> AssetStatus {
        if self.expires < today {
            AssetStatus::Expired
        } else {
            AssetStatus::Active {
                days_remaining: (self.expires - today).num_days(),
            }
        }
    }

    /// Dedup identity of this entry. See [`original_name`].
    pub fn original_name(&self) -> &str {
        original_name(&self.filename)
    }
}

/// Derive the dedup key of a stored name: the segment after the *last*
/// underscore.
///
/// Generated names have the shape `carousel_<token>_<original>`, so the
/// trailing segment recovers the sanitized original filename. The
/// tokenization is lossy when the original name itself contained
/// underscores: only its trailing segment participates in dedup, so
/// `banner_v1.jpg` and `banner_v2.jpg` never collide but `a_photo.jpg`
/// and `b_photo.jpg` collapse to `photo.jpg`. Kept for compatibility
/// with the existing index contents.
pub fn original_name(stored_name: &str) -> &str {
    match stored_name.rsplit_once('_') {
        Some((_, tail)) => tail,
        None => stored_name,
    }
}

/// Strip characters outside the safe filename alphabet.
///
/// Keeps ASCII alphanumerics plus `.`, `-` and `_`; everything else
/// (path separators, whitespace, control characters) is dropped rather
/// than replaced so stored names stay short and key-safe. Runs of dots
/// collapse to a single dot so a generated key never contains `..`,
/// which the backend key guard rejects.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_')) {
            continue;
        }
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Generate a globally unique stored name for an uploaded file.
pub fn generate_stored_name(original: &str) -> String {
    format!(
        "{}{}_{}",
        STORED_NAME_PREFIX,
        Uuid::new_v4().simple(),
        sanitize_filename(original)
    )
}

/// Check a filename's extension against the image allow-list.
pub fn extension_allowed(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// MIME type for a stored name, from its extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Expiry assigned by index regeneration, when the real expiry is lost.
pub fn sentinel_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).expect("static date")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn original_name_takes_trailing_segment() {
        assert_eq!(original_name("carousel_abc123_photo.jpg"), "photo.jpg");
        assert_eq!(original_name("no-underscore.png"), "no-underscore.png");
    }

    #[test]
    fn original_name_is_lossy_for_underscored_originals() {
        // Two distinct originals that collapse to the same dedup key.
        assert_eq!(original_name("carousel_t1_summer_sale.jpg"), "sale.jpg");
        assert_eq!(original_name("carousel_t2_winter_sale.jpg"), "sale.jpg");
    }

    #[test]
    fn sanitize_strips_unsafe_characters() {
        assert_eq!(sanitize_filename("my photo (1).jpg"), "myphoto1.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".etcpasswd");
        assert_eq!(sanitize_filename("keep_under-score.png"), "keep_under-score.png");
    }

    #[test]
    fn sanitize_collapses_dot_runs() {
        assert_eq!(sanitize_filename("a..jpg"), "a.jpg");
        assert_eq!(sanitize_filename("weird..name...jpg"), "weird.name.jpg");
        let stored = generate_stored_name("a..jpg");
        assert!(!stored.contains(".."));
        assert!(crate::backend::ensure_key_safe(&stored).is_ok());
    }

    #[test]
    fn generated_names_carry_prefix_and_original() {
        let name = generate_stored_name("hero banner.jpg");
        assert!(name.starts_with(STORED_NAME_PREFIX));
        assert_eq!(original_name(&name), "herobanner.jpg");
    }

    #[test]
    fn extension_allow_list_is_case_insensitive() {
        assert!(extension_allowed("a.jpg"));
        assert!(extension_allowed("a.JPEG"));
        assert!(extension_allowed("a.WebP"));
        assert!(!extension_allowed("a.txt"));
        assert!(!extension_allowed("noextension"));
        assert!(!extension_allowed("carousel_index.json"));
    }

    #[test]
    fn status_relative_to_today() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
        let entry = AssetEntry {
            filename: "carousel_t_a.jpg".into(),
            expires: today,
            url: None,
        };
        assert_eq!(entry.status(today), AssetStatus::Active { days_remaining: 0 });
        assert!(entry.is_active(today));

        let past = AssetEntry {
            expires: today.pred_opt().unwrap(),
            ..entry.clone()
        };
        assert_eq!(past.status(today), AssetStatus::Expired);
        assert!(!past.is_active(today));
    }

    #[test]
    fn index_wire_format_round_trips() {
        let entry = AssetEntry {
            filename: "carousel_t_a.jpg".into(),
            expires: NaiveDate::from_ymd_opt(2027, 1, 2).unwrap(),
            url: Some("https://cdn.example.com/carousel_t_a.jpg".into()),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"expires\":\"2027-01-02\""));
        let back: AssetEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);

        // Local-backend entries omit `url` entirely.
        let local = AssetEntry { url: None, ..entry };
        assert!(!serde_json::to_string(&local).unwrap().contains("url"));
    }
}
