//! Classification adapter: filters raw observations into categories and
//! search terms using two independent precision/recall policies.

use std::path::Path;

use imagedex_core::config::{CategoryThresholds, ClassifySettings, SearchTermThresholds};
use imagedex_core::error::Result;
use imagedex_core::traits::{Classifier, ObservationSource};
use imagedex_core::types::{Classification, LabelMap, Observation, PrPoint};

/// Acceptance rule for a single observation.
///
/// With a precision/recall curve the policy picks one operating point and
/// requires the other metric to reach its minimum there, with the
/// observation's confidence at or above that point's threshold. Without a
/// curve only `fallback_min_confidence` applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdPolicy {
    /// Lowest threshold reaching `precision` must still have `min_recall`.
    MinRecallAtPrecision { precision: f32, min_recall: f32, fallback_min_confidence: f32 },
    /// Highest threshold reaching `recall` must still have `min_precision`.
    MinPrecisionAtRecall { recall: f32, min_precision: f32, fallback_min_confidence: f32 },
}

impl ThresholdPolicy {
    pub fn accepts(&self, observation: &Observation) -> bool {
        let curve = match observation.curve.as_deref() {
            Some(points) if !points.is_empty() => points,
            _ => return observation.confidence >= self.fallback_min_confidence(),
        };
        match self.operating_point(curve) {
            Some(point) => observation.confidence >= point.threshold && self.meets_minimum(point),
            None => false,
        }
    }

    fn fallback_min_confidence(&self) -> f32 {
        match *self {
            Self::MinRecallAtPrecision { fallback_min_confidence, .. }
            | Self::MinPrecisionAtRecall { fallback_min_confidence, .. } => fallback_min_confidence,
        }
    }

    fn operating_point<'a>(&self, curve: &'a [PrPoint]) -> Option<&'a PrPoint> {
        match *self {
            Self::MinRecallAtPrecision { precision, .. } => curve
                .iter()
                .filter(|p| p.precision >= precision)
                .min_by(|a, b| a.threshold.total_cmp(&b.threshold)),
            Self::MinPrecisionAtRecall { recall, .. } => curve
                .iter()
                .filter(|p| p.recall >= recall)
                .max_by(|a, b| a.threshold.total_cmp(&b.threshold)),
        }
    }

    fn meets_minimum(&self, point: &PrPoint) -> bool {
        match *self {
            Self::MinRecallAtPrecision { min_recall, .. } => point.recall >= min_recall,
            Self::MinPrecisionAtRecall { min_precision, .. } => point.precision >= min_precision,
        }
    }
}

impl From<&CategoryThresholds> for ThresholdPolicy {
    fn from(t: &CategoryThresholds) -> Self {
        Self::MinRecallAtPrecision {
            precision: t.precision,
            min_recall: t.min_recall,
            fallback_min_confidence: t.fallback_min_confidence,
        }
    }
}

impl From<&SearchTermThresholds> for ThresholdPolicy {
    fn from(t: &SearchTermThresholds) -> Self {
        Self::MinPrecisionAtRecall {
            recall: t.recall,
            min_precision: t.min_precision,
            fallback_min_confidence: t.fallback_min_confidence,
        }
    }
}

pub struct ObservationClassifier<S> {
    source: S,
    categories: ThresholdPolicy,
    search_terms: ThresholdPolicy,
}

impl<S: ObservationSource> ObservationClassifier<S> {
    pub fn new(source: S, categories: ThresholdPolicy, search_terms: ThresholdPolicy) -> Self {
        Self { source, categories, search_terms }
    }

    pub fn from_settings(source: S, settings: &ClassifySettings) -> Self {
        Self::new(source, (&settings.categories).into(), (&settings.search_terms).into())
    }

    /// Apply both policies. Repeated identifiers keep their highest confidence.
    pub fn filter(&self, observations: &[Observation]) -> Classification {
        let mut categories = LabelMap::new();
        let mut search_terms = LabelMap::new();
        for obs in observations {
            if self.categories.accepts(obs) {
                insert_max(&mut categories, obs);
            }
            if self.search_terms.accepts(obs) {
                insert_max(&mut search_terms, obs);
            }
        }
        Classification { categories, search_terms }
    }
}

fn insert_max(map: &mut LabelMap, obs: &Observation) {
    let entry = map.entry(obs.identifier.clone()).or_insert(obs.confidence);
    if obs.confidence > *entry {
        *entry = obs.confidence;
    }
}

impl<S: ObservationSource> Classifier for ObservationClassifier<S> {
    fn classify(&self, path: &Path) -> Result<Classification> {
        let observations = self.source.observe(path)?;
        Ok(self.filter(&observations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(threshold: f32, precision: f32, recall: f32) -> PrPoint {
        PrPoint { threshold, precision, recall }
    }

    fn category_policy() -> ThresholdPolicy {
        (&CategoryThresholds::default()).into()
    }

    fn search_policy() -> ThresholdPolicy {
        (&SearchTermThresholds::default()).into()
    }

    fn curve() -> Vec<PrPoint> {
        vec![pt(0.1, 0.5, 0.95), pt(0.3, 0.8, 0.75), pt(0.6, 0.92, 0.4), pt(0.9, 0.99, 0.005)]
    }

    #[test]
    fn recall_at_precision_uses_lowest_qualifying_threshold() {
        let policy = category_policy();
        assert!(policy.accepts(&Observation::new("dog", 0.65).with_curve(curve())));
        assert!(!policy.accepts(&Observation::new("dog", 0.55).with_curve(curve())));
    }

    #[test]
    fn recall_at_precision_fails_when_precision_never_reached() {
        let policy = category_policy();
        let weak = vec![pt(0.2, 0.4, 0.9), pt(0.8, 0.85, 0.3)];
        assert!(!policy.accepts(&Observation::new("dog", 0.99).with_curve(weak)));
    }

    #[test]
    fn recall_at_precision_requires_min_recall() {
        let policy = category_policy();
        let rare = vec![pt(0.9, 0.95, 0.001)];
        assert!(!policy.accepts(&Observation::new("okapi", 0.95).with_curve(rare)));
    }

    #[test]
    fn precision_at_recall_uses_highest_qualifying_threshold() {
        let policy = search_policy();
        assert!(policy.accepts(&Observation::new("dog", 0.3).with_curve(curve())));
        assert!(!policy.accepts(&Observation::new("dog", 0.2).with_curve(curve())));
    }

    #[test]
    fn missing_or_empty_curve_falls_back_to_confidence() {
        let policy = category_policy();
        assert!(policy.accepts(&Observation::new("cat", 0.5)));
        assert!(!policy.accepts(&Observation::new("cat", 0.49)));
        assert!(!policy.accepts(&Observation::new("cat", 0.3).with_curve(Vec::new())));
    }

    #[test]
    fn search_terms_are_broader_than_categories() {
        struct Fixed;
        impl ObservationSource for Fixed {
            fn observe(&self, _path: &Path) -> Result<Vec<Observation>> {
                Ok(vec![Observation::new("animal", 0.9), Observation::new("mammal", 0.2), Observation::new("rock", 0.05)])
            }
        }
        let classifier = ObservationClassifier::from_settings(Fixed, &ClassifySettings::default());
        let result = classifier.classify(Path::new("any.png")).expect("classify");
        assert_eq!(result.categories.keys().collect::<Vec<_>>(), vec!["animal"]);
        assert_eq!(result.search_terms.keys().collect::<Vec<_>>(), vec!["animal", "mammal"]);
    }

    #[test]
    fn repeated_identifier_keeps_max_confidence() {
        let classifier = ObservationClassifier::new(NoSource, search_policy(), search_policy());
        let result = classifier.filter(&[Observation::new("sky", 0.4), Observation::new("sky", 0.7), Observation::new("sky", 0.5)]);
        assert_eq!(result.categories.get("sky"), Some(&0.7));
    }

    struct NoSource;
    impl ObservationSource for NoSource {
        fn observe(&self, _path: &Path) -> Result<Vec<Observation>> { Ok(Vec::new()) }
    }
}
