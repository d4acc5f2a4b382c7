//! Signature document normalization.
//!
//! Turns a parsed document (JSON or YAML, both read into `serde_json::Value`)
//! into a `SignatureCatalog`. Two layouts are accepted:
//! - flat: top-level keys are categories, each holding a list of vendors
//! - explicit: a single `vendors` list whose entries carry their own `category`
//!
//! Structural problems fail the load. Problems confined to a single matcher
//! (unknown kind, bad regex, wrong field types) are logged and the matcher is
//! dropped or marked unusable, so one bad entry cannot blind the catalog.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::time::SystemTime;

use crate::config::{
    DEFAULT_THRESHOLD, KEY_DEFAULT_THRESHOLD, KEY_SCHEMA_VERSION, KEY_SCORING, KEY_SCORING_MODE,
    KEY_VENDORS, RESERVED_DOCUMENT_KEYS, UNCATEGORIZED,
};
use crate::error_handling::CatalogLoadError;
use crate::fingerprint::models::{
    CatalogMetadata, MatcherDefinition, MatcherKind, ScoringMode, SignatureCatalog,
    VendorDefinition,
};

/// Matcher entry as written in a document.
///
/// The kind may be spelled `type` or `kind`; `type` wins when both are present.
#[derive(Debug, Deserialize)]
struct RawMatcher {
    #[serde(rename = "type", default)]
    type_name: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_weight")]
    weight: Option<f64>,
}

/// Deserializes a weight written as a number or a numeric string (`"2"`, `" 0.5 "`).
fn deserialize_weight<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct WeightVisitor;

    impl<'de> Visitor<'de> for WeightVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number or a numeric string")
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value))
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value as f64))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("weight {:?} is not a number", value)))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
        where
            D: serde::Deserializer<'de>,
        {
            deserializer.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(WeightVisitor)
}

/// Builds a catalog from a parsed signature document.
pub fn from_value(document: Value, source: &str) -> Result<SignatureCatalog, CatalogLoadError> {
    let Value::Object(root) = document else {
        return Err(CatalogLoadError::InvalidStructure(format!(
            "{}: document root must be a mapping",
            source
        )));
    };

    let scoring = match root.get(KEY_SCORING) {
        None | Some(Value::Null) => None,
        Some(Value::Object(table)) => Some(table),
        Some(_) => {
            return Err(CatalogLoadError::InvalidStructure(format!(
                "{}: '{}' must be a mapping",
                source, KEY_SCORING
            )))
        }
    };

    let default_threshold = resolve_default_threshold(&root, scoring)?;
    let scoring_mode = resolve_scoring_mode(scoring)?;
    let type_weights = scoring.map(type_weights_from).unwrap_or_default();

    let raw_vendors = collect_vendor_entries(&root, source)?;

    let mut seen = HashSet::new();
    let mut vendors = Vec::with_capacity(raw_vendors.len());
    for (category, entry) in raw_vendors {
        let Some(vendor) = vendor_from_entry(entry, category)? else {
            continue;
        };
        if !seen.insert(vendor.name.clone()) {
            return Err(CatalogLoadError::DuplicateVendor(vendor.name));
        }
        vendors.push(vendor);
    }

    let schema_version = root.get(KEY_SCHEMA_VERSION).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    });

    let catalog = SignatureCatalog {
        default_threshold,
        type_weights,
        scoring_mode,
        vendors,
        metadata: CatalogMetadata {
            source: source.to_string(),
            schema_version,
            loaded_at: SystemTime::now(),
        },
    };

    let matcher_count: usize = catalog.vendors.iter().map(|v| v.matchers.len()).sum();
    log::info!(
        "Loaded {} vendor signature(s) with {} matcher(s) from {} ({} unusable, default threshold {}, {} scoring)",
        catalog.vendors.len(),
        matcher_count,
        source,
        catalog.defective_matcher_count(),
        catalog.default_threshold,
        catalog.scoring_mode
    );

    Ok(catalog)
}

/// Top-level `default_threshold`, then `scoring.default_threshold`, then 1.0.
fn resolve_default_threshold(
    root: &Map<String, Value>,
    scoring: Option<&Map<String, Value>>,
) -> Result<f64, CatalogLoadError> {
    let declared = root
        .get(KEY_DEFAULT_THRESHOLD)
        .or_else(|| scoring.and_then(|s| s.get(KEY_DEFAULT_THRESHOLD)));

    match declared {
        None | Some(Value::Null) => Ok(DEFAULT_THRESHOLD),
        Some(value) => validate_threshold(value, "default"),
    }
}

fn resolve_scoring_mode(
    scoring: Option<&Map<String, Value>>,
) -> Result<ScoringMode, CatalogLoadError> {
    match scoring.and_then(|s| s.get(KEY_SCORING_MODE)) {
        None | Some(Value::Null) => Ok(ScoringMode::default()),
        Some(Value::String(mode)) => ScoringMode::from_str(mode).map_err(|_| {
            CatalogLoadError::InvalidStructure(format!("unknown scoring mode '{}'", mode))
        }),
        Some(other) => Err(CatalogLoadError::InvalidStructure(format!(
            "scoring mode must be a string, got {}",
            other
        ))),
    }
}

/// Numeric `scoring` entries keyed by a known matcher kind.
fn type_weights_from(scoring: &Map<String, Value>) -> HashMap<MatcherKind, f64> {
    let mut weights = HashMap::new();
    for (key, value) in scoring {
        if key == KEY_DEFAULT_THRESHOLD || key == KEY_SCORING_MODE {
            continue;
        }
        match (MatcherKind::from_str(key), value.as_f64()) {
            (Ok(kind), Some(weight)) if weight.is_finite() => {
                weights.insert(kind, weight);
            }
            (Ok(kind), _) => {
                log::warn!("Ignoring non-numeric scoring weight for '{}': {}", kind, value);
            }
            (Err(_), _) => {
                log::debug!("Ignoring unknown scoring key '{}'", key);
            }
        }
    }
    weights
}

/// Pairs every vendor entry with the category implied by its position.
fn collect_vendor_entries<'a>(
    root: &'a Map<String, Value>,
    source: &str,
) -> Result<Vec<(Option<&'a str>, &'a Value)>, CatalogLoadError> {
    if let Some(vendors) = root.get(KEY_VENDORS) {
        let Value::Array(entries) = vendors else {
            return Err(CatalogLoadError::InvalidStructure(format!(
                "{}: '{}' must be a list",
                source, KEY_VENDORS
            )));
        };
        return entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                if entry.is_object() {
                    Ok((None, entry))
                } else {
                    Err(CatalogLoadError::InvalidStructure(format!(
                        "{}: vendors[{}] must be a mapping",
                        source, index
                    )))
                }
            })
            .collect();
    }

    let mut entries = Vec::new();
    for (category, value) in root {
        if RESERVED_DOCUMENT_KEYS.contains(&category.as_str()) {
            continue;
        }
        let Value::Array(list) = value else {
            log::debug!("Skipping non-list top-level key '{}' in {}", category, source);
            continue;
        };
        for entry in list {
            if entry.is_object() {
                entries.push((Some(category.as_str()), entry));
            } else {
                log::warn!(
                    "Skipping non-mapping vendor entry under '{}' in {}",
                    category,
                    source
                );
            }
        }
    }
    Ok(entries)
}

/// Normalizes one vendor entry. Entries without a name are skipped.
fn vendor_from_entry(
    entry: &Value,
    layout_category: Option<&str>,
) -> Result<Option<VendorDefinition>, CatalogLoadError> {
    let Some(name) = entry.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()) else {
        log::warn!("Skipping vendor entry without a name: {}", entry);
        return Ok(None);
    };

    let category = entry
        .get("category")
        .and_then(Value::as_str)
        .or(layout_category)
        .unwrap_or(UNCATEGORIZED)
        .to_string();

    let threshold = match entry.get("threshold") {
        None | Some(Value::Null) => None,
        Some(value) => Some(validate_threshold(value, name)?),
    };

    let matchers = match entry.get("matchers") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| matcher_from_value(name, index, raw))
            .collect(),
        Some(_) => {
            return Err(CatalogLoadError::InvalidStructure(format!(
                "vendor '{}': matchers must be a list",
                name
            )))
        }
    };

    if matchers.is_empty() {
        log::warn!("Vendor '{}' has no matchers and can never be detected", name);
    }

    Ok(Some(VendorDefinition {
        name: name.to_string(),
        category,
        threshold,
        matchers,
    }))
}

/// Parses one matcher; returns `None` (after logging) if it cannot be used at all.
fn matcher_from_value(vendor: &str, index: usize, raw: &Value) -> Option<MatcherDefinition> {
    let parsed: RawMatcher = match RawMatcher::deserialize(raw) {
        Ok(m) => m,
        Err(e) => {
            log::warn!("{}: skipping malformed matcher #{}: {}", vendor, index, e);
            return None;
        }
    };

    let Some(kind_name) = parsed.type_name.or(parsed.kind) else {
        log::warn!("{}: skipping matcher #{} without a type", vendor, index);
        return None;
    };

    let kind = match MatcherKind::from_str(kind_name.trim()) {
        Ok(kind) => kind,
        Err(_) => {
            log::warn!(
                "{}: ignoring matcher #{} of unknown type '{}'",
                vendor,
                index,
                kind_name
            );
            return None;
        }
    };

    let matcher = MatcherDefinition::new(kind, parsed.pattern, parsed.name, parsed.weight);
    if let Some(defect) = matcher.defect() {
        log::warn!(
            "{}: {} matcher #{} will never match ({})",
            vendor,
            kind,
            index,
            defect
        );
    }
    Some(matcher)
}

fn validate_threshold(value: &Value, scope: &str) -> Result<f64, CatalogLoadError> {
    match value.as_f64() {
        Some(t) if t.is_finite() && t > 0.0 => Ok(t),
        _ => Err(CatalogLoadError::InvalidThreshold {
            scope: scope.to_string(),
            value: value.to_string(),
        }),
    }
}
