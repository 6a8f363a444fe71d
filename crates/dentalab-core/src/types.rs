//! # Domain Types
//!
//! Core domain types used by the tooth chart.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────────────────┐  │
//! │  │     Tooth       │   │      Arch       │   │   ExtractionType     │  │
//! │  │  ─────────────  │   │  ─────────────  │   │  ──────────────────  │  │
//! │  │  i32 newtype    │   │  Maxillary      │   │  TeethInMouth    (0) │  │
//! │  │  any integer    │   │  Mandibular     │   │  MissingTeeth    (1) │  │
//! │  └─────────────────┘   └─────────────────┘   │  WillExtract...  (2) │  │
//! │                                              │  HasBeenExtr...  (3) │  │
//! │  ┌─────────────────┐   ┌─────────────────┐   │  Prepped         (4) │  │
//! │  │  ArchPair<T>    │   │ProductExtractions│  │  Implant         (5) │  │
//! │  │  ─────────────  │   │  ─────────────  │   └──────────────────────┘  │
//! │  │  maxillary: T   │   │  extractions    │     (n) = priority, lower   │
//! │  │  mandibular: T  │   │  has_extraction │         wins conflicts      │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Arches and extraction types are closed enums. A caller cannot address an
//! arch or category the chart does not know about, so there are no silent
//! "unknown key" buckets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Tooth
// =============================================================================

/// A tooth number in the arch's numbering scheme.
///
/// The selection store accepts any integer; range checks live in
/// [`crate::validation::validate_tooth`] and are opt-in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Tooth(i32);

impl Tooth {
    #[inline]
    pub const fn new(number: i32) -> Self {
        Tooth(number)
    }

    /// Returns the raw tooth number.
    #[inline]
    pub const fn number(&self) -> i32 {
        self.0
    }
}

impl From<i32> for Tooth {
    fn from(number: i32) -> Self {
        Tooth(number)
    }
}

impl From<Tooth> for i32 {
    fn from(tooth: Tooth) -> Self {
        tooth.0
    }
}

impl fmt::Display for Tooth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Arch
// =============================================================================

/// One of the two dental arches.
///
/// A tooth number on the maxillary arch and the same number on the
/// mandibular arch are unrelated entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// Upper arch.
    Maxillary,
    /// Lower arch.
    Mandibular,
}

impl Arch {
    /// Both arches, maxillary first.
    pub const ALL: [Arch; 2] = [Arch::Maxillary, Arch::Mandibular];

    /// Wire name used in snapshots and command payloads.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Arch::Maxillary => "maxillary",
            Arch::Mandibular => "mandibular",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "maxillary" | "upper" => Ok(Arch::Maxillary),
            "mandibular" | "lower" => Ok(Arch::Mandibular),
            _ => Err(ValidationError::NotAllowed {
                field: "arch".to_string(),
                allowed: Arch::ALL.iter().map(|a| a.as_str().to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Arch Pair
// =============================================================================

/// One value per arch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ArchPair<T> {
    #[serde(default)]
    pub maxillary: T,
    #[serde(default)]
    pub mandibular: T,
}

impl<T> ArchPair<T> {
    pub fn new(maxillary: T, mandibular: T) -> Self {
        ArchPair {
            maxillary,
            mandibular,
        }
    }

    #[inline]
    pub fn get(&self, arch: Arch) -> &T {
        match arch {
            Arch::Maxillary => &self.maxillary,
            Arch::Mandibular => &self.mandibular,
        }
    }

    #[inline]
    pub fn get_mut(&mut self, arch: Arch) -> &mut T {
        match arch {
            Arch::Maxillary => &mut self.maxillary,
            Arch::Mandibular => &mut self.mandibular,
        }
    }

    /// Iterates `(arch, value)` pairs, maxillary first.
    pub fn iter(&self) -> impl Iterator<Item = (Arch, &T)> {
        Arch::ALL.into_iter().map(move |arch| (arch, self.get(arch)))
    }
}

/// Tooth set for one category or the general selection, split by arch.
pub type ArchTeeth = ArchPair<BTreeSet<Tooth>>;

impl ArchTeeth {
    /// True when neither arch holds a tooth.
    pub fn is_empty(&self) -> bool {
        self.maxillary.is_empty() && self.mandibular.is_empty()
    }
}

// =============================================================================
// Extraction Type
// =============================================================================

/// A tooth-chart category.
///
/// ## Priority
/// Variants are declared in conflict-resolution priority order and the
/// derived `Ord` follows it, so `a < b` means `a` wins when both claim the
/// same tooth on the same arch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ExtractionType {
    #[serde(rename = "Teeth in mouth")]
    TeethInMouth,
    #[serde(rename = "Missing teeth")]
    MissingTeeth,
    #[serde(rename = "Will extract on delivery")]
    WillExtractOnDelivery,
    #[serde(rename = "Has been extracted")]
    HasBeenExtracted,
    #[serde(rename = "Prepped")]
    Prepped,
    #[serde(rename = "Implant")]
    Implant,
}

impl ExtractionType {
    /// All categories, highest priority first.
    pub const ALL: [ExtractionType; 6] = [
        ExtractionType::TeethInMouth,
        ExtractionType::MissingTeeth,
        ExtractionType::WillExtractOnDelivery,
        ExtractionType::HasBeenExtracted,
        ExtractionType::Prepped,
        ExtractionType::Implant,
    ];

    /// Priority index, 0 is highest.
    #[inline]
    pub const fn priority(&self) -> usize {
        *self as usize
    }

    /// Display name, also the key used in persisted snapshots.
    pub const fn label(&self) -> &'static str {
        match self {
            ExtractionType::TeethInMouth => "Teeth in mouth",
            ExtractionType::MissingTeeth => "Missing teeth",
            ExtractionType::WillExtractOnDelivery => "Will extract on delivery",
            ExtractionType::HasBeenExtracted => "Has been extracted",
            ExtractionType::Prepped => "Prepped",
            ExtractionType::Implant => "Implant",
        }
    }

    /// snake_case key accepted from API payloads.
    pub const fn key(&self) -> &'static str {
        match self {
            ExtractionType::TeethInMouth => "teeth_in_mouth",
            ExtractionType::MissingTeeth => "missing_teeth",
            ExtractionType::WillExtractOnDelivery => "will_extract_on_delivery",
            ExtractionType::HasBeenExtracted => "has_been_extracted",
            ExtractionType::Prepped => "prepped",
            ExtractionType::Implant => "implant",
        }
    }
}

impl fmt::Display for ExtractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExtractionType {
    type Err = ValidationError;

    /// Accepts the display name (any case) or the snake_case key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        ExtractionType::ALL
            .into_iter()
            .find(|ty| ty.label().eq_ignore_ascii_case(needle) || ty.key() == needle)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "extraction_type".to_string(),
                allowed: ExtractionType::ALL
                    .iter()
                    .map(|ty| ty.label().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Product Extraction Data
// =============================================================================

/// Product identifier as issued by the product-extraction endpoint.
pub type ProductId = String;

/// Extraction payload cached per product.
///
/// Opaque to the chart: it is stored and returned as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductExtractions {
    #[serde(default)]
    #[ts(type = "Array<Record<string, unknown>>")]
    pub extractions: Vec<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub has_extraction: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(type = "unknown")]
    pub extraction_options: Option<serde_json::Value>,
}

// =============================================================================
// Unit Tests
// =============================================================================
