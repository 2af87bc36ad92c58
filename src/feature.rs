use crate::catalog::Product;

/// Encoded vector for one catalog product, with a snapshot of its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductVector {
    feature_vector: Vec<f32>,
    product: Product,
}

impl ProductVector {
    pub fn new(feature_vector: Vec<f32>, product: Product) -> Self {
        Self {
            feature_vector,
            product,
        }
    }

    pub fn feature_vector(&self) -> &[f32] {
        &self.feature_vector
    }

    pub fn name(&self) -> &str {
        &self.product.name
    }

    pub fn product(&self) -> &Product {
        &self.product
    }
}
