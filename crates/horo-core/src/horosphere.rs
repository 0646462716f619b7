//! The façade: one [`HorosphereGenerator`] per group and basepoint ray,
//! answering [`HorosphereRequest`]s with [`HorosphereGraph`]s.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::automaton::Automaton;
use crate::constants::MIN_SUFFIX_LEVEL;
use crate::divergence::DivergenceRule;
use crate::enumerate::{Window, busemann_buckets, suffix_window};
use crate::error::{ConfigurationError, HoroError, Result};
use crate::graph::HorosphereGraph;
use crate::normal_form::NormalForm;
use crate::presentation::{Letter, Presentation};
use crate::ray::Ray;
use crate::rips::rips_edges;
use crate::word::Word;

/// How horosphere points are joined.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRule {
    /// Word distance exactly 2.
    #[default]
    Rips,
    /// Geodesic rays leaving both points stay a bounded distance apart.
    Divergence,
}

impl EdgeRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rips => "rips",
            Self::Divergence => "divergence",
        }
    }
}

/// One horosphere request.
///
/// `length` is signed so that a negative bound coming from a caller is
/// reported as an error rather than wrapped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HorosphereRequest {
    pub length: i64,
    pub busemann_value: i64,
    #[serde(default)]
    pub rule: EdgeRule,
    #[serde(default)]
    pub window: Window,
}

impl HorosphereRequest {
    pub fn new(length: i64, busemann_value: i64, rule: EdgeRule) -> Self {
        Self {
            length,
            busemann_value,
            rule,
            window: Window::default(),
        }
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }
}

/// Builds horosphere graphs for one group and one basepoint ray.
///
/// The defining graph must have no induced square and no separating clique
/// and must not be a clique; the two ray letters must be distinct and must
/// not commute. None of this is checked here, and results for violating
/// input are unspecified. [`Presentation::check_preconditions`] performs
/// the check on demand.
///
/// The generator is immutable after construction. Requests share nothing
/// mutable and may run concurrently.
#[derive(Clone, Debug)]
pub struct HorosphereGenerator {
    normal_form: NormalForm,
    ray: Ray,
    suffix_automaton: Automaton,
    geodesic_suffix: Automaton,
}

impl HorosphereGenerator {
    /// Build from a commutation map, a rank map and the two ray labels.
    pub fn new(
        commutation: &BTreeMap<String, BTreeSet<String>>,
        order: &BTreeMap<String, i64>,
        ray: [&str; 2],
    ) -> Result<Self> {
        let presentation = Presentation::new(commutation, order)?;
        let ray = Ray::from_labels(&presentation, ray)?;
        Self::from_presentation(presentation, ray.letters())
    }

    /// Build from a presentation and two of its letters. Letters taken from
    /// a larger presentation are rejected.
    pub fn from_presentation(presentation: Presentation, ray: [Letter; 2]) -> Result<Self> {
        if let Some(stray) = ray.iter().find(|l| l.index() >= presentation.len()) {
            return Err(ConfigurationError::UnknownGenerator(format!(
                "ray letter #{} of a {}-letter presentation",
                stray.index(),
                presentation.len()
            ))
            .into());
        }
        let ray = Ray::new(ray);
        let suffix_automaton = Automaton::shortlex_suffix(&presentation, ray.letters());
        let geodesic_suffix = Automaton::geodesic_suffix(&presentation, ray.letters());
        Ok(Self {
            normal_form: NormalForm::new(presentation),
            ray,
            suffix_automaton,
            geodesic_suffix,
        })
    }

    pub fn presentation(&self) -> &Presentation {
        self.normal_form.presentation()
    }

    pub fn normal_form(&self) -> &NormalForm {
        &self.normal_form
    }

    pub fn ray(&self) -> &Ray {
        &self.ray
    }

    pub fn suffix_automaton(&self) -> &Automaton {
        &self.suffix_automaton
    }

    pub fn geodesic_suffix(&self) -> &Automaton {
        &self.geodesic_suffix
    }

    /// Parse a word in this group's labels into its normal form.
    pub fn word(&self, text: &str) -> Result<Word> {
        self.normal_form.parse(text)
    }

    pub fn busemann(&self, word: &Word) -> i64 {
        self.ray.busemann(&self.normal_form, word)
    }

    /// Every normal form of length at most `length`, grouped by Busemann
    /// value. Levels with no elements are absent.
    pub fn busemann_buckets(&self, length: i64) -> Result<BTreeMap<i64, BTreeSet<Word>>> {
        let length = checked_length(length)?;
        Ok(busemann_buckets(&self.normal_form, &self.ray, length))
    }

    /// The vertex set a request selects.
    pub fn level(&self, request: &HorosphereRequest) -> Result<BTreeSet<Word>> {
        let length = checked_length(request.length)?;
        let words = match request.window {
            Window::Ball => busemann_buckets(&self.normal_form, &self.ray, length)
                .remove(&request.busemann_value)
                .unwrap_or_default(),
            Window::Suffix if request.busemann_value < MIN_SUFFIX_LEVEL => {
                return Err(HoroError::InvalidParameter {
                    name: "busemann_value",
                    reason: format!(
                        "suffix windows reach down to level {MIN_SUFFIX_LEVEL}, got {}",
                        request.busemann_value
                    ),
                });
            }
            Window::Suffix => suffix_window(
                &self.normal_form,
                &self.ray,
                &self.suffix_automaton,
                length,
                request.busemann_value,
            ),
        };
        Ok(words)
    }

    /// Horosphere at `busemann_value` inside the ball of radius `length`.
    pub fn horosphere(&self, length: i64, busemann_value: i64, rule: EdgeRule) -> Result<HorosphereGraph> {
        self.generate(&HorosphereRequest::new(length, busemann_value, rule))
    }

    pub fn generate(&self, request: &HorosphereRequest) -> Result<HorosphereGraph> {
        let vertices = self.level(request)?;
        if vertices.is_empty() {
            tracing::warn!(
                "no elements at level {} within length {}",
                request.busemann_value,
                request.length
            );
            return Ok(HorosphereGraph::empty());
        }

        let edges = match request.rule {
            EdgeRule::Rips => rips_edges(&self.normal_form, &vertices),
            EdgeRule::Divergence => DivergenceRule::new(&self.normal_form, self.ray, &self.geodesic_suffix)
                .edges(&vertices, request.busemann_value),
        };
        let graph = HorosphereGraph::new(vertices, edges);
        tracing::info!(
            "{} horosphere at level {} (length {}, {:?} window): {} vertices, {} edges",
            request.rule.as_str(),
            request.busemann_value,
            request.length,
            request.window,
            graph.vertex_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

fn checked_length(length: i64) -> Result<usize> {
    usize::try_from(length).map_err(|_| HoroError::InvalidParameter {
        name: "length",
        reason: format!("must be non-negative, got {length}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dihedral() -> HorosphereGenerator {
        let order: BTreeMap<String, i64> = [("a".to_string(), 0), ("b".to_string(), 1)].into();
        HorosphereGenerator::new(&BTreeMap::new(), &order, ["a", "b"]).unwrap()
    }

    #[test]
    fn test_negative_length_rejected() {
        let generator = dihedral();
        let err = generator.horosphere(-1, 0, EdgeRule::Rips).unwrap_err();
        assert!(matches!(err, HoroError::InvalidParameter { name: "length", .. }));
        assert!(generator.busemann_buckets(-3).is_err());
    }

    #[test]
    fn test_unknown_ray_label_rejected() {
        let order: BTreeMap<String, i64> = [("a".to_string(), 0), ("b".to_string(), 1)].into();
        let err = HorosphereGenerator::new(&BTreeMap::new(), &order, ["a", "z"]).unwrap_err();
        assert!(matches!(err, HoroError::Configuration(_)));
    }

    #[test]
    fn test_empty_bucket_gives_empty_graph() {
        let generator = dihedral();
        let graph = generator.horosphere(2, 7, EdgeRule::Rips).unwrap();
        assert!(graph.is_empty());
        let graph = generator.horosphere(2, 7, EdgeRule::Divergence).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_dihedral_levels_are_single_points() {
        let generator = dihedral();
        let buckets = generator.busemann_buckets(4).unwrap();
        // 1 + 2n elements, one per level from -n to n
        assert_eq!(buckets.len(), 9);
        assert!(buckets.values().all(|b| b.len() == 1));
        let graph = generator.horosphere(4, 0, EdgeRule::Rips).unwrap();
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: HorosphereRequest =
            serde_json::from_str(r#"{"length": 3, "busemann_value": -1}"#).unwrap();
        assert_eq!(request, HorosphereRequest::new(3, -1, EdgeRule::Rips));
        assert_eq!(request.window, Window::Ball);

        let request: HorosphereRequest = serde_json::from_str(
            r#"{"length": 2, "busemann_value": 0, "rule": "divergence", "window": "suffix"}"#,
        )
        .unwrap();
        assert_eq!(request.rule, EdgeRule::Divergence);
        assert_eq!(request.window, Window::Suffix);

        let bad = serde_json::from_str::<HorosphereRequest>(
            r#"{"length": 2, "busemann_value": 0, "radius": 1}"#,
        );
        assert!(bad.is_err());
        let bad = serde_json::from_str::<HorosphereRequest>(
            r#"{"length": 2, "busemann_value": 0, "max_degree": 2}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_extreme_suffix_levels() {
        let generator = dihedral();
        let request = HorosphereRequest::new(1, i64::MIN, EdgeRule::Rips).with_window(Window::Suffix);
        let err = generator.generate(&request).unwrap_err();
        assert!(matches!(err, HoroError::InvalidParameter { name: "busemann_value", .. }));

        let request = HorosphereRequest::new(1, i64::MIN, EdgeRule::Divergence);
        assert!(generator.generate(&request).unwrap().is_empty());
        let request = HorosphereRequest::new(1, i64::MAX, EdgeRule::Divergence).with_window(Window::Suffix);
        assert!(generator.generate(&request).unwrap().is_empty());
        let request = HorosphereRequest::new(1, -3, EdgeRule::Rips).with_window(Window::Suffix);
        assert_eq!(generator.generate(&request).unwrap().vertex_count(), 1);
    }

    #[test]
    fn test_foreign_ray_letters_rejected() {
        let big = Presentation::from_edges(&["a", "b", "c", "d"], &[]).unwrap();
        let small = Presentation::from_edges(&["a", "b"], &[]).unwrap();
        let ray = [big.generator("a").unwrap(), big.generator("d").unwrap()];
        let err = HorosphereGenerator::from_presentation(small.clone(), ray).unwrap_err();
        assert!(matches!(err, HoroError::Configuration(ConfigurationError::UnknownGenerator(_))));

        let ray = [big.generator("a").unwrap(), big.generator("b").unwrap()];
        assert!(HorosphereGenerator::from_presentation(small, ray).is_ok());
    }
}
