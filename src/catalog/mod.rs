pub mod ingredient;
pub mod recipe;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

pub use ingredient::{Basis, Ingredient, IngredientDraft};
pub use recipe::{Recipe, RecipeDraft, RecipeLine};

/// Anything stored in a [`Catalog`]: identified by id, listed by name.
pub trait CatalogItem {
    type Id: PartialEq + fmt::Display;

    fn id(&self) -> &Self::Id;
    fn name(&self) -> &str;
}

/// An insertion-ordered collection of entities with unique ids.
///
/// [`Catalog::resolve`] is the one place a reference is turned into an entity;
/// a `None` there means the reference is stale and the caller treats it as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog<T> {
    items: Vec<T>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: CatalogItem> Catalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn resolve(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.resolve(id).is_some()
    }

    pub fn insert(&mut self, item: T) {
        self.items.push(item);
    }

    /// Replaces the item carrying the same id, returning the previous version.
    pub fn replace(&mut self, item: T) -> Option<T> {
        let slot = self.items.iter_mut().find(|existing| existing.id() == item.id())?;
        Some(std::mem::replace(slot, item))
    }

    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let position = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(position))
    }

    /// Items ordered by name; equal names keep insertion order.
    pub fn sorted_by_name(&self) -> Vec<&T> {
        let mut sorted: Vec<&T> = self.items.iter().collect();
        sorted.sort_by(|a, b| compare_names(a.name(), b.name()));
        sorted
    }

    /// First id that occurs more than once, if any.
    pub fn duplicate_id(&self) -> Option<&T::Id> {
        self.items.iter().enumerate().find_map(|(index, item)| {
            self.items[..index]
                .iter()
                .any(|earlier| earlier.id() == item.id())
                .then(|| item.id())
        })
    }
}

/// Accent- and case-insensitive sort key: NFD decomposition with combining marks
/// dropped, then lowercased. "Äpfel" keys as "apfel".
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Compares on the accent-folded key first so "Äpfel" sorts next to "apfel",
/// then case-folded, then raw so the order is total.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| a.cmp(b))
}

/// Borrowed view over both catalogs, handed to ledger and projection code.
#[derive(Debug, Clone, Copy)]
pub struct Catalogs<'a> {
    pub ingredients: &'a Catalog<Ingredient>,
    pub recipes: &'a Catalog<Recipe>,
}
