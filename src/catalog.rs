use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: f32,
    pub category: String,
    pub color: String,
}

impl Product {
    pub fn new(name: &str, price: f32, category: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            price,
            category: category.to_string(),
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Only used for logging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub age: f32,
    #[serde(default)]
    pub purchases: Vec<Purchase>,
}

impl User {
    pub fn new(age: f32, purchased: &[&str]) -> Self {
        Self {
            name: None,
            age,
            purchases: purchased
                .iter()
                .map(|name| Purchase {
                    name: name.to_string(),
                })
                .collect(),
        }
    }

    pub fn has_purchased(&self, product_name: &str) -> bool {
        self.purchases.iter().any(|p| p.name == product_name)
    }
}

/// Source of the product catalog, fetched once per training run.
pub trait CatalogProvider: Send + Sync {
    fn fetch_catalog(&self) -> Result<Vec<Product>>;
}

impl<F> CatalogProvider for F
where
    F: Fn() -> Result<Vec<Product>> + Send + Sync,
{
    fn fetch_catalog(&self) -> Result<Vec<Product>> {
        self()
    }
}

/// Catalog held in memory.
pub struct StaticCatalog(pub Vec<Product>);

impl CatalogProvider for StaticCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Product>> {
        Ok(self.0.clone())
    }
}

/// Catalog read from a JSON array of products on every fetch.
pub struct JsonFileCatalog {
    path: PathBuf,
}

impl JsonFileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for JsonFileCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Product>> {
        log::debug!("Loading catalog from {}", self.path.display());
        read_json(&self.path)
    }
}

pub fn load_users(path: &Path) -> Result<Vec<User>> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_product_ignores_extra_fields() {
        let json = r#"{"id": 3, "name": "Sneakers", "price": 129.99,
            "category": "shoes", "color": "red", "description": "fast"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product, Product::new("Sneakers", 129.99, "shoes", "red"));
    }

    #[test]
    fn test_user_accepts_integer_age() {
        let json = r#"{"name": "Ana", "age": 25, "purchases": [{"name": "A"}]}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.age, 25.0);
        assert!(user.has_purchased("A"));
        assert!(!user.has_purchased("B"));
    }

    #[test]
    fn test_json_file_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "A", "price": 40, "category": "shoes", "color": "red"}}]"#
        )
        .unwrap();

        let catalog = JsonFileCatalog::new(file.path()).fetch_catalog().unwrap();
        assert_eq!(catalog, vec![Product::new("A", 40.0, "shoes", "red")]);
    }

    #[test]
    fn test_closure_provider() {
        let provider = || -> Result<Vec<Product>> { Ok(vec![Product::new("A", 1.0, "c", "x")]) };
        assert_eq!(provider.fetch_catalog().unwrap().len(), 1);
    }
}
