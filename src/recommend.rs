//! Content-based recommendations against a trained [`FeatureContext`].
//!
//! A user is projected into the product feature space: the price and
//! categorical blocks are the mean of the vectors of the products the user
//! bought, and the age slot carries the user's own normalized age. Candidates
//! are ranked by cosine similarity, excluding products already purchased.

use serde::{Deserialize, Serialize};

use crate::catalog::{Product, User};
use crate::error::{Error, Result};
use crate::feature_context::{FeatureContext, AGE_OFFSET};
use crate::vector_db::VectorDatabase;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product: Product,
    pub score: f32,
}

/// Feature vector for `user`, comparable with the context's product vectors.
///
/// Purchases of products unknown to the context are skipped; a user with no
/// known purchases only carries the age term.
pub fn user_vector(user: &User, context: &FeatureContext) -> Vec<f32> {
    let mut vector = vec![0.0; context.dimensions()];
    let purchased: Vec<&[f32]> = user
        .purchases
        .iter()
        .filter_map(|p| context.product_vector(&p.name))
        .map(|v| v.feature_vector())
        .collect();

    if !purchased.is_empty() {
        let scale = 1.0 / purchased.len() as f32;
        for product_vector in purchased.iter() {
            for (slot, value) in vector.iter_mut().zip(product_vector.iter()) {
                *slot += value * scale;
            }
        }
    }
    vector[AGE_OFFSET] = context.age_bounds().normalize(user.age) * context.weights().age;
    vector
}

/// Top `limit` products for `user`, best first.
///
/// A non-finite age is rejected, since it would turn every score into NaN.
pub fn recommend(
    user: &User,
    context: &FeatureContext,
    limit: usize,
) -> Result<Vec<Recommendation>> {
    if !user.age.is_finite() {
        return Err(Error::InvalidValue {
            field: "age",
            value: user.age,
        });
    }
    let query = user_vector(user, context);
    let db = VectorDatabase::from_features(context.product_vectors());
    Ok(db
        .nearest(&query, limit, |candidate| !user.has_purchased(candidate.name()))
        .into_iter()
        .map(|scored| Recommendation {
            product: scored.product.product().clone(),
            score: scored.score,
        })
        .collect())
}
