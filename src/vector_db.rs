use std::collections::HashMap;

use crate::feature::ProductVector;

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a > f32::EPSILON && norm_b > f32::EPSILON {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}

/// A ranked entry, borrowing the vector it was scored from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProduct<'a> {
    pub product: &'a ProductVector,
    pub score: f32,
}

impl ScoredProduct<'_> {
    pub fn name(&self) -> &str {
        self.product.name()
    }
}

/// Brute-force nearest-neighbour lookup over the encoded catalog.
pub struct VectorDatabase<'a> {
    features: &'a [ProductVector],
    positions: HashMap<&'a str, usize>,
}

impl<'a> VectorDatabase<'a> {
    pub fn from_features(features: &'a [ProductVector]) -> Self {
        let positions = features
            .iter()
            .enumerate()
            .map(|(i, feature)| (feature.name(), i))
            .collect();
        Self {
            features,
            positions,
        }
    }

    /// Ranks every product accepted by `filter` by similarity to `query`.
    /// Ties keep catalog order.
    pub fn nearest(
        &self,
        query: &[f32],
        num_results: usize,
        filter: impl Fn(&ProductVector) -> bool,
    ) -> Vec<ScoredProduct<'a>> {
        let mut scored: Vec<ScoredProduct<'a>> = self
            .features
            .iter()
            .filter(|feature| filter(feature))
            .map(|feature| ScoredProduct {
                product: feature,
                score: cosine_similarity(query, feature.feature_vector()),
            })
            .collect();
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(num_results);
        scored
    }

    /// Returns the top k products most similar to `name`, excluding itself.
    pub fn find_similar(&self, name: &str, num_results: usize) -> Option<Vec<ScoredProduct<'a>>> {
        let source = &self.features[*self.positions.get(name)?];
        Some(self.nearest(source.feature_vector(), num_results, |f| f.name() != name))
    }
}
