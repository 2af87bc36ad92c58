use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::sync::Arc;
use threadpool::ThreadPool;

use crate::catalog::Product;
use crate::error::{Error, Result};
use crate::feature::ProductVector;
use crate::feature_context::{FeatureContext, AGE_OFFSET, CATEGORY_OFFSET, PRICE_OFFSET};

/// Age term used for products the context has never seen.
pub const UNKNOWN_PRODUCT_AGE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    SingleThreaded,
    Parallel,
}

/// Encodes `product` as `[price, age, one-hot category, one-hot color]`, each
/// group scaled by its weight.
///
/// A category or color missing from the context index is an error; only the
/// age term has a fallback.
pub fn encode(product: &Product, context: &FeatureContext) -> Result<Vec<f32>> {
    let weights = context.weights();
    let unknown = |field: &'static str, value: &str| Error::UnknownCategoricalValue {
        field,
        value: value.to_string(),
        product: product.name.clone(),
    };
    let category = context
        .category_index()
        .index_of(&product.category)
        .ok_or_else(|| unknown("category", &product.category))?;
    let color = context
        .color_index()
        .index_of(&product.color)
        .ok_or_else(|| unknown("color", &product.color))?;

    let mut vector = vec![0.0; context.dimensions()];
    vector[PRICE_OFFSET] = context.price_bounds().normalize(product.price) * weights.price;
    vector[AGE_OFFSET] = context
        .product_average_age_normalized(&product.name)
        .unwrap_or(UNKNOWN_PRODUCT_AGE)
        * weights.age;
    vector[CATEGORY_OFFSET + category] = weights.category;
    vector[context.color_offset() + color] = weights.color;
    Ok(vector)
}

/// Encodes every catalog product, returning vectors in catalog order.
///
/// `progress_callback` receives the completed fraction after each product.
/// The first encoding error aborts the whole extraction.
pub fn extract_features(
    run_mode: RunMode,
    context: Arc<FeatureContext>,
    catalog: Arc<[Product]>,
    progress_callback: impl Fn(f32),
) -> Result<Vec<ProductVector>> {
    let num_products = catalog.len();
    let mut features: Vec<ProductVector> = Vec::with_capacity(num_products);
    if num_products == 0 {
        return Ok(features);
    }
    let progress_increment = 1.0 / num_products as f32;

    match run_mode {
        RunMode::SingleThreaded => {
            for (i, product) in catalog.iter().enumerate() {
                let vector = encode(product, &context)?;
                features.push(ProductVector::new(vector, product.clone()));
                progress_callback((i + 1) as f32 * progress_increment);
            }
        }
        RunMode::Parallel => {
            let num_threads = num_cpus::get().clamp(1, num_products);
            log::debug!("Encoding {num_products} products with {num_threads} threads");
            let thread_pool = ThreadPool::new(num_threads);

            let (sender, receiver) = mpsc::channel::<(usize, Result<Vec<f32>>)>();
            for index in 0..num_products {
                let sender = sender.clone();
                let context = Arc::clone(&context);
                let catalog = Arc::clone(&catalog);
                thread_pool.execute(move || {
                    let result = encode(&catalog[index], &context);
                    // The receiver is gone once another product has failed.
                    let _ = sender.send((index, result));
                });
            }
            drop(sender);

            let mut slots: Vec<Option<Vec<f32>>> = vec![None; num_products];
            for completed in 1..=num_products {
                let (index, result) = receiver.recv().map_err(|_| Error::WorkerDisconnected)?;
                slots[index] = Some(result?);
                progress_callback(completed as f32 * progress_increment);
            }

            for (slot, product) in slots.into_iter().zip(catalog.iter()) {
                let vector = slot.ok_or(Error::WorkerDisconnected)?;
                features.push(ProductVector::new(vector, product.clone()));
            }
        }
    }
    Ok(features)
}
