use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Target building density, as a fraction of road-adjacent candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingDensity {
    Sparse,
    #[default]
    Medium,
    Dense,
}

/// How building placements relate to each other spatially.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Clustering {
    Clustered,
    Distributed,
    #[default]
    Random,
}

/// Building footprint hint, carried through to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Layout constraints, parsed from free text or a defaults preset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConstraints {
    pub building_density: BuildingDensity,
    pub clustering: Clustering,
    pub grass_ratio: f64,
    pub building_size_hint: BuildingSize,
}

impl Default for LayoutConstraints {
    fn default() -> Self {
        Self {
            building_density: BuildingDensity::Medium,
            clustering: Clustering::Random,
            grass_ratio: 0.3,
            building_size_hint: BuildingSize::Medium,
        }
    }
}

/// Loosely-shaped JSON fragment a language model might emit.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConstraints {
    #[serde(alias = "buildingDensity", alias = "density")]
    building_density: Option<String>,
    clustering: Option<String>,
    #[serde(alias = "grassRatio")]
    grass_ratio: Option<f64>,
    #[serde(alias = "buildingSizeHint", alias = "building_size", alias = "buildingSize")]
    building_size_hint: Option<String>,
}

impl LayoutConstraints {
    /// Parse a free-text prompt into constraints.
    ///
    /// Strategy: structured extraction of a JSON fragment first, then
    /// per-field keyword extraction, then per-field defaults. `grass_ratio`
    /// is clamped to `[0, 1]`. Never fails; no model or network calls happen
    /// here.
    pub fn parse(prompt: &str) -> Self {
        let raw = extract_json(prompt).unwrap_or_default();
        let defaults = Self::default();

        let building_density = raw
            .building_density
            .as_deref()
            .and_then(density_from_word)
            .or_else(|| density_regex().find(prompt).and_then(|m| density_from_word(m.as_str())))
            .unwrap_or(defaults.building_density);

        let clustering = raw
            .clustering
            .as_deref()
            .and_then(clustering_from_word)
            .or_else(|| {
                clustering_regex()
                    .find(prompt)
                    .and_then(|m| clustering_from_word(m.as_str()))
            })
            .unwrap_or(defaults.clustering);

        let grass_ratio = raw
            .grass_ratio
            .or_else(|| {
                grass_regex()
                    .captures(prompt)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<f64>().ok())
            })
            .unwrap_or(defaults.grass_ratio)
            .clamp(0.0, 1.0);

        let building_size_hint = raw
            .building_size_hint
            .as_deref()
            .and_then(size_from_word)
            .or_else(|| {
                size_regex()
                    .captures(prompt)
                    .and_then(|c| c.get(1).or_else(|| c.get(2)))
                    .and_then(|m| size_from_word(m.as_str()))
            })
            .unwrap_or(defaults.building_size_hint);

        Self {
            building_density,
            clustering,
            grass_ratio,
            building_size_hint,
        }
    }
}

/// Try the whole prompt as JSON, then every balanced `{...}` fragment.
fn extract_json(prompt: &str) -> Option<RawConstraints> {
    let trimmed = prompt.trim();
    if let Ok(raw) = serde_json::from_str::<RawConstraints>(trimmed) {
        return Some(raw);
    }
    let bytes = trimmed.as_bytes();
    let mut start = None;
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    if let Some(s) = start {
                        if let Ok(raw) = serde_json::from_str::<RawConstraints>(&trimmed[s..=i]) {
                            return Some(raw);
                        }
                    }
                    start = None;
                }
            }
            _ => {}
        }
    }
    None
}

fn density_from_word(word: &str) -> Option<BuildingDensity> {
    match word.to_ascii_lowercase().as_str() {
        "sparse" => Some(BuildingDensity::Sparse),
        "medium" => Some(BuildingDensity::Medium),
        "dense" => Some(BuildingDensity::Dense),
        _ => None,
    }
}

fn clustering_from_word(word: &str) -> Option<Clustering> {
    match word.to_ascii_lowercase().as_str() {
        "clustered" => Some(Clustering::Clustered),
        "distributed" | "spread" => Some(Clustering::Distributed),
        "random" => Some(Clustering::Random),
        _ => None,
    }
}

fn size_from_word(word: &str) -> Option<BuildingSize> {
    match word.to_ascii_lowercase().as_str() {
        "small" => Some(BuildingSize::Small),
        "medium" => Some(BuildingSize::Medium),
        "large" | "big" => Some(BuildingSize::Large),
        _ => None,
    }
}

fn density_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(sparse|dense)\b").expect("static regex"))
}

fn clustering_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\b(clustered|distributed|spread|random)\b").expect("static regex"))
}

fn grass_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)grass[\s_-]*(?:ratio)?\D*?([0-9]*\.?[0-9]+)").expect("static regex")
    })
}

fn size_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(small|big|large)\b\s+buildings?|buildings?[\s_-]*size\D*?\b(small|medium|large)\b")
            .expect("static regex")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_yields_defaults() {
        let c = LayoutConstraints::parse("");
        assert_eq!(c, LayoutConstraints::default());
        assert_eq!(c.building_density, BuildingDensity::Medium);
        assert_eq!(c.clustering, Clustering::Random);
        assert!((c.grass_ratio - 0.3).abs() < 1e-12);
        assert_eq!(c.building_size_hint, BuildingSize::Medium);
    }

    #[test]
    fn json_fragment_wins() {
        let prompt = r#"Sure! Here you go:
            {"building_density": "dense", "clustering": "clustered",
             "grass_ratio": 0.7, "building_size_hint": "large"}"#;
        let c = LayoutConstraints::parse(prompt);
        assert_eq!(c.building_density, BuildingDensity::Dense);
        assert_eq!(c.clustering, Clustering::Clustered);
        assert!((c.grass_ratio - 0.7).abs() < 1e-12);
        assert_eq!(c.building_size_hint, BuildingSize::Large);
    }

    #[test]
    fn camel_case_json_is_accepted() {
        let prompt = r#"{"buildingDensity": "sparse", "grassRatio": 0.1}"#;
        let c = LayoutConstraints::parse(prompt);
        assert_eq!(c.building_density, BuildingDensity::Sparse);
        assert!((c.grass_ratio - 0.1).abs() < 1e-12);
        assert_eq!(c.clustering, Clustering::Random);
    }

    #[test]
    fn keyword_fallback_extracts_fields() {
        let c = LayoutConstraints::parse(
            "a dense little town, buildings clustered around the roads, \
             grass ratio 0.8, with large buildings",
        );
        assert_eq!(c.building_density, BuildingDensity::Dense);
        assert_eq!(c.clustering, Clustering::Clustered);
        assert!((c.grass_ratio - 0.8).abs() < 1e-12);
        assert_eq!(c.building_size_hint, BuildingSize::Large);
    }

    #[test]
    fn grass_ratio_is_clamped() {
        let c = LayoutConstraints::parse("grass ratio 7");
        assert!((c.grass_ratio - 1.0).abs() < 1e-12);
        let c = LayoutConstraints::parse(r#"{"grass_ratio": -0.5}"#);
        assert!(c.grass_ratio.abs() < 1e-12);
    }

    #[test]
    fn partial_json_falls_back_per_field() {
        let c = LayoutConstraints::parse(r#"{"clustering": "distributed"} make it sparse"#);
        assert_eq!(c.clustering, Clustering::Distributed);
        assert_eq!(c.building_density, BuildingDensity::Sparse);
        assert_eq!(c.building_size_hint, BuildingSize::Medium);
    }
}
