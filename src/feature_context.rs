//! Immutable snapshot of the statistics every product vector is encoded against.

use std::collections::{HashMap, HashSet};

use crate::catalog::{Product, User};
use crate::category_index::CategoryIndex;
use crate::config::{FeatureWeights, DEFAULT_FEATURE_WEIGHTS};
use crate::error::{Error, Result};
use crate::feature::ProductVector;
use crate::purchase_aggregator::PurchaseAggregator;
use crate::scaler::Bounds;

/// Slot of the price term in every vector.
pub const PRICE_OFFSET: usize = 0;
/// Slot of the age term in every vector.
pub const AGE_OFFSET: usize = 1;
/// First slot of the one-hot category block.
pub const CATEGORY_OFFSET: usize = 2;

#[derive(Debug, Clone)]
pub struct FeatureContext {
    age_bounds: Bounds,
    price_bounds: Bounds,
    category_index: CategoryIndex,
    color_index: CategoryIndex,
    product_average_age_normalized: HashMap<String, f32>,
    weights: FeatureWeights,
    product_vectors: Option<Vec<ProductVector>>,
}

impl FeatureContext {
    pub fn build(catalog: &[Product], users: &[User]) -> Result<Self> {
        Self::build_with_weights(catalog, users, DEFAULT_FEATURE_WEIGHTS)
    }

    /// Computes bounds, index tables and per-product average ages.
    ///
    /// Empty or non-finite inputs, duplicate product names and invalid weights
    /// are rejected before any normalization happens.
    pub fn build_with_weights(
        catalog: &[Product],
        users: &[User],
        weights: FeatureWeights,
    ) -> Result<Self> {
        weights.validate()?;
        let mut names = HashSet::with_capacity(catalog.len());
        if let Some(duplicate) = catalog.iter().find(|p| !names.insert(p.name.as_str())) {
            return Err(Error::DuplicateProduct(duplicate.name.clone()));
        }
        if let Some(product) = catalog.iter().find(|p| !p.price.is_finite()) {
            return Err(Error::InvalidValue {
                field: "price",
                value: product.price,
            });
        }
        if let Some(user) = users.iter().find(|u| !u.age.is_finite()) {
            return Err(Error::InvalidValue {
                field: "age",
                value: user.age,
            });
        }

        let price_bounds = Bounds::from_values(catalog.iter().map(|p| p.price))
            .ok_or(Error::EmptyInput("catalog"))?;
        let age_bounds = Bounds::from_values(users.iter().map(|u| u.age))
            .ok_or(Error::EmptyInput("user set"))?;

        let category_index =
            CategoryIndex::from_values(catalog.iter().map(|p| p.category.as_str()));
        let color_index = CategoryIndex::from_values(catalog.iter().map(|p| p.color.as_str()));

        let aggregator = PurchaseAggregator::from_users(users);
        let unreferenced = aggregator.unreferenced_products(catalog);
        if !unreferenced.is_empty() {
            log::warn!(
                "Ignoring purchases of {} product(s) missing from the catalog: {:?}",
                unreferenced.len(),
                unreferenced
            );
        }
        let product_average_age_normalized =
            aggregator.normalized_average_ages(catalog, &age_bounds);

        let context = FeatureContext {
            age_bounds,
            price_bounds,
            category_index,
            color_index,
            product_average_age_normalized,
            weights,
            product_vectors: None,
        };
        log::debug!(
            "Built context: {} categories, {} colors, {} dimensions, ages {:?}, prices {:?}",
            context.num_categories(),
            context.num_colors(),
            context.dimensions(),
            context.age_bounds,
            context.price_bounds
        );
        Ok(context)
    }

    /// One-time attachment of the encoded catalog.
    pub fn attach_product_vectors(&mut self, vectors: Vec<ProductVector>) -> Result<()> {
        if self.product_vectors.is_some() {
            return Err(Error::VectorsAlreadyAttached);
        }
        let expected = self.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.feature_vector().len() != expected) {
            return Err(Error::DimensionMismatch {
                name: bad.name().to_string(),
                expected,
                actual: bad.feature_vector().len(),
            });
        }
        self.product_vectors = Some(vectors);
        Ok(())
    }

    pub fn age_bounds(&self) -> &Bounds {
        &self.age_bounds
    }

    pub fn price_bounds(&self) -> &Bounds {
        &self.price_bounds
    }

    pub fn min_age(&self) -> f32 {
        self.age_bounds.min
    }

    pub fn max_age(&self) -> f32 {
        self.age_bounds.max
    }

    pub fn min_price(&self) -> f32 {
        self.price_bounds.min
    }

    pub fn max_price(&self) -> f32 {
        self.price_bounds.max
    }

    pub fn category_index(&self) -> &CategoryIndex {
        &self.category_index
    }

    pub fn color_index(&self) -> &CategoryIndex {
        &self.color_index
    }

    /// Normalized average purchaser age, `None` for products outside the catalog.
    pub fn product_average_age_normalized(&self, product_name: &str) -> Option<f32> {
        self.product_average_age_normalized.get(product_name).copied()
    }

    pub fn weights(&self) -> &FeatureWeights {
        &self.weights
    }

    pub fn num_categories(&self) -> usize {
        self.category_index.len()
    }

    pub fn num_colors(&self) -> usize {
        self.color_index.len()
    }

    /// price + age + one-hot categories + one-hot colors
    pub fn dimensions(&self) -> usize {
        2 + self.num_categories() + self.num_colors()
    }

    pub fn color_offset(&self) -> usize {
        CATEGORY_OFFSET + self.num_categories()
    }

    /// Empty until vectors are attached.
    pub fn product_vectors(&self) -> &[ProductVector] {
        self.product_vectors.as_deref().unwrap_or(&[])
    }

    pub fn product_vector(&self, product_name: &str) -> Option<&ProductVector> {
        self.product_vectors()
            .iter()
            .find(|v| v.name() == product_name)
    }
}
