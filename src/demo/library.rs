//! In-memory library of product configurations
//!
//! Holds every product the pilot can demo in this run, keyed by slug.
//! The built-in sample is always present so the pilot works out of the
//! box; more products come from JSON files.

use crate::core::error::Result;
use crate::demo::script::{load_config, sample_product, save_config, ProductConfig};
use std::collections::HashMap;
use std::path::Path;

pub struct ConfigLibrary {
    configs: HashMap<String, ProductConfig>,
}

impl ConfigLibrary {
    /// A library seeded with the built-in sample product
    pub fn new() -> Self {
        let mut library = Self {
            configs: HashMap::new(),
        };
        library.insert(sample_product());
        library
    }

    /// Add a product, returning the id it is stored under
    pub fn insert(&mut self, config: ProductConfig) -> String {
        let id = config.slug();
        self.configs.insert(id.clone(), config);
        id
    }

    pub fn get(&self, id: &str) -> Option<&ProductConfig> {
        self.configs.get(id)
    }

    /// All products as (id, display name), sorted by id
    pub fn list(&self) -> Vec<(String, String)> {
        let mut entries: Vec<_> = self
            .configs
            .iter()
            .map(|(id, config)| (id.clone(), config.product_name.clone()))
            .collect();
        entries.sort();
        entries
    }

    /// Write one product's configuration to a JSON file
    pub fn save_to_file(&self, id: &str, path: &Path) -> Result<()> {
        let Some(config) = self.configs.get(id) else {
            return Err(crate::core::error::DocentError::ConfigError(format!(
                "no product '{}' in the library",
                id
            )));
        };
        save_config(config, path)
    }

    /// Load a product configuration file, returning the id it got
    pub fn load_from_file(&mut self, path: &Path) -> Result<String> {
        let config = load_config(path)?;
        Ok(self.insert(config))
    }
}

impl Default for ConfigLibrary {
    fn default() -> Self {
        Self::new()
    }
}
