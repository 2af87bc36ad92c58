use std::collections::{HashMap, HashSet};

use crate::catalog::{Product, User};
use crate::scaler::Bounds;

#[derive(Debug, Clone, Copy, Default)]
struct AgeTally {
    sum: f64,
    count: u32,
}

/// Running purchaser-age totals keyed by product name.
#[derive(Debug, Clone, Default)]
pub struct PurchaseAggregator {
    tallies: HashMap<String, AgeTally>,
}

impl PurchaseAggregator {
    pub fn from_users(users: &[User]) -> Self {
        let mut aggregator = PurchaseAggregator::default();
        for user in users {
            for purchase in user.purchases.iter() {
                let tally = aggregator.tallies.entry(purchase.name.clone()).or_default();
                tally.sum += user.age as f64;
                tally.count += 1;
            }
        }
        aggregator
    }

    pub fn purchase_count(&self, product_name: &str) -> u32 {
        self.tallies.get(product_name).map_or(0, |t| t.count)
    }

    /// `None` when nobody purchased the product.
    pub fn average_age(&self, product_name: &str) -> Option<f32> {
        self.tallies
            .get(product_name)
            .filter(|t| t.count > 0)
            .map(|t| (t.sum / t.count as f64) as f32)
    }

    /// Purchase keys that reference no product in `catalog`, sorted.
    pub fn unreferenced_products(&self, catalog: &[Product]) -> Vec<&str> {
        let known: HashSet<&str> = catalog.iter().map(|p| p.name.as_str()).collect();
        let mut missing: Vec<&str> = self
            .tallies
            .keys()
            .map(String::as_str)
            .filter(|name| !known.contains(name))
            .collect();
        missing.sort_unstable();
        missing
    }

    /// Normalized average purchaser age for every catalog product, substituting
    /// the age midpoint for products with no purchases.
    pub fn normalized_average_ages(
        &self,
        catalog: &[Product],
        age_bounds: &Bounds,
    ) -> HashMap<String, f32> {
        let mid_age = age_bounds.midpoint();
        catalog
            .iter()
            .map(|product| {
                let avg = self.average_age(&product.name).unwrap_or(mid_age);
                (product.name.clone(), age_bounds.normalize(avg))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product::new("A", 40.0, "shoes", "red"),
            Product::new("B", 200.0, "shirts", "blue"),
        ]
    }

    #[test]
    fn test_average_age() {
        let users = vec![
            User::new(20.0, &["A"]),
            User::new(30.0, &["A", "B"]),
            User::new(40.0, &[]),
        ];
        let aggregator = PurchaseAggregator::from_users(&users);
        assert_eq!(aggregator.average_age("A"), Some(25.0));
        assert_eq!(aggregator.average_age("B"), Some(30.0));
        assert_eq!(aggregator.average_age("C"), None);
        assert_eq!(aggregator.purchase_count("A"), 2);
    }

    #[test]
    fn test_midpoint_fallback() {
        let users = vec![User::new(20.0, &["A"]), User::new(40.0, &[])];
        let aggregator = PurchaseAggregator::from_users(&users);
        let ages = aggregator.normalized_average_ages(&catalog(), &Bounds::new(20.0, 40.0));

        assert_eq!(ages["A"], 0.0);
        assert_eq!(ages["B"], 0.5);
    }

    #[test]
    fn test_repeat_purchases_count_twice() {
        let users = vec![User::new(20.0, &["A", "A"]), User::new(50.0, &["A"])];
        let aggregator = PurchaseAggregator::from_users(&users);
        assert_eq!(aggregator.average_age("A"), Some(30.0));
    }

    #[test]
    fn test_unreferenced_products() {
        let users = vec![User::new(20.0, &["A", "Ghost", "Another"])];
        let aggregator = PurchaseAggregator::from_users(&users);
        assert_eq!(
            aggregator.unreferenced_products(&catalog()),
            vec!["Another", "Ghost"]
        );
    }
}
