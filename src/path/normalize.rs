//! [`PathNormalization`]: the flag set applied to a raw path component
//! before it becomes a canonical or display [`Name`] (spec §3).

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use unicode_normalization::UnicodeNormalization;

bitflags! {
    /// Normalization flags. Invariants (checked by [`PathNormalization::new`]):
    /// at most one of `NFC`/`NFD`; at most one of the three case-fold variants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PathNormalization: u8 {
        const NFC                 = 0b0000_0001;
        const NFD                 = 0b0000_0010;
        const CASE_FOLD_ASCII     = 0b0000_0100;
        const CASE_FOLD_UNICODE   = 0b0000_1000;
        const CASE_FOLD_TURKISH   = 0b0001_0000;
    }
}

impl PathNormalization {
    /// Builds a normalization set, panicking if the exclusivity invariants
    /// from spec §3 are violated. Library-internal constructors (below) are
    /// always valid; this guards configuration-supplied sets.
    pub fn new(flags: PathNormalization) -> Result<Self, &'static str> {
        let nfc_nfd = flags & (Self::NFC | Self::NFD);
        if nfc_nfd.bits().count_ones() > 1 {
            return Err("at most one of NFC/NFD may be set");
        }
        let fold = flags & (Self::CASE_FOLD_ASCII | Self::CASE_FOLD_UNICODE | Self::CASE_FOLD_TURKISH);
        if fold.bits().count_ones() > 1 {
            return Err("at most one case-fold variant may be set");
        }
        Ok(flags)
    }

    pub fn none() -> Self {
        PathNormalization::empty()
    }

    pub fn nfc() -> Self {
        PathNormalization::NFC
    }

    pub fn nfd() -> Self {
        PathNormalization::NFD
    }

    pub fn case_fold_ascii() -> Self {
        PathNormalization::CASE_FOLD_ASCII
    }

    pub fn case_fold_unicode() -> Self {
        PathNormalization::CASE_FOLD_UNICODE
    }

    pub fn case_fold_turkish() -> Self {
        PathNormalization::CASE_FOLD_TURKISH
    }

    /// Applies Unicode normalization first, then case folding, per spec §4.1.
    pub fn normalize(self, raw: &str) -> String {
        let normalized = if self.contains(PathNormalization::NFC) {
            raw.nfc().collect::<String>()
        } else if self.contains(PathNormalization::NFD) {
            raw.nfd().collect::<String>()
        } else {
            raw.to_owned()
        };

        if self.contains(PathNormalization::CASE_FOLD_ASCII) {
            normalized.chars().map(|c| c.to_ascii_lowercase()).collect()
        } else if self.contains(PathNormalization::CASE_FOLD_UNICODE) {
            normalized.to_lowercase()
        } else if self.contains(PathNormalization::CASE_FOLD_TURKISH) {
            turkish_fold(&normalized)
        } else {
            normalized
        }
    }
}

/// Serialized as its raw bitmask; config files spell it out as a list of
/// flag names instead (see [`crate::config`]), so this impl only needs to
/// round-trip, not be human-friendly.
impl Serialize for PathNormalization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for PathNormalization {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        PathNormalization::new(PathNormalization::from_bits_truncate(bits)).map_err(serde::de::Error::custom)
    }
}

/// Turkish dotted/dotless-I case folding: `I` -> `ı` (not `i`), `İ` -> `i`,
/// everything else follows the default Unicode lowercase mapping.
///
/// Uses the Unicode tables vendored by the active Rust toolchain's `char`
/// methods at build time (see DESIGN.md Open Questions).
fn turkish_fold(input: &str) -> String {
    input
        .chars()
        .flat_map(|c| -> Box<dyn Iterator<Item = char>> {
            match c {
                'I' => Box::new(std::iter::once('\u{0131}')),
                '\u{0130}' => Box::new(std::iter::once('i')),
                other => Box::new(other.to_lowercase()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_conflicting_normalization_forms() {
        assert!(PathNormalization::new(PathNormalization::NFC | PathNormalization::NFD).is_err());
    }

    #[test]
    fn rejects_conflicting_case_fold_variants() {
        let both = PathNormalization::CASE_FOLD_ASCII | PathNormalization::CASE_FOLD_UNICODE;
        assert!(PathNormalization::new(both).is_err());
    }

    #[test]
    fn ascii_case_fold_ignores_unicode() {
        let norm = PathNormalization::case_fold_ascii();
        assert_eq!(norm.normalize("FOO"), "foo");
        assert_eq!(norm.normalize("İstanbul"), "i̇stanbul".to_ascii_lowercase());
    }

    #[test]
    fn turkish_fold_uses_dotless_i() {
        let norm = PathNormalization::case_fold_turkish();
        assert_eq!(norm.normalize("IRMAK"), "ırmak");
        assert_eq!(norm.normalize("İZMİR"), "izmir");
    }

    #[test]
    fn nfc_then_fold_order() {
        let decomposed = "e\u{0301}"; // e + combining acute = NFD "é"
        let norm = PathNormalization::nfc() | PathNormalization::case_fold_ascii();
        assert_eq!(norm.normalize(decomposed), "é");
    }
}
