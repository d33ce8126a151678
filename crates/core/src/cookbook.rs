// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Already-parsed cookbook content: environment, pages, recipes and wikis.

use std::collections::BTreeMap;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::recipe::Recipe;

/// Cookbook-level variables, injected into every step of every recipe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub public: Vec<String>,
    #[serde(default)]
    pub private: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cookbook {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub pages: Vec<Page>,
    /// Page id → base64-encoded HTML
    #[serde(default)]
    pub wikis: BTreeMap<u32, String>,
}

impl Cookbook {
    pub fn find_recipe(&self, page: u32, name: &str) -> Option<&Recipe> {
        self.pages
            .iter()
            .filter(|p| p.page == page)
            .flat_map(|p| p.recipes.iter())
            .find(|r| r.name == name)
    }

    /// Decoded wiki for `page`: `None` when absent, `Some(Err)` when the stored
    /// text is not valid base64.
    pub fn wiki(&self, page: u32) -> Option<Result<String, base64::DecodeError>> {
        self.wikis.get(&page).map(|encoded| {
            base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        })
    }
}

#[cfg(test)]
#[path = "cookbook_tests.rs"]
mod tests;
