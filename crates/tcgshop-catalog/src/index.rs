//! ID → value lookup maps built once per API response from its
//! `related_objects` list.

use std::collections::HashMap;

use crate::types::CatalogObject;

/// A resolved tax definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxEntry {
    pub name: String,
    pub percentage: Option<String>,
}

/// Images, categories and taxes from one response, keyed by object ID.
///
/// Objects of other types, and objects missing the field that makes them
/// useful (an image without a URL, a category or tax without a name), are
/// skipped. When an ID repeats, the later object wins.
#[derive(Debug, Default)]
pub struct RelatedObjectIndex {
    image_urls: HashMap<String, String>,
    categories: HashMap<String, String>,
    taxes: HashMap<String, TaxEntry>,
}

impl RelatedObjectIndex {
    #[must_use]
    pub fn build<'a, I>(objects: I) -> Self
    where
        I: IntoIterator<Item = &'a CatalogObject>,
    {
        let mut index = Self::default();

        for object in objects {
            match object {
                CatalogObject::Image(image) => {
                    match image.image_data.as_ref().and_then(|d| d.url.clone()) {
                        Some(url) => {
                            index.image_urls.insert(image.id.clone(), url);
                        }
                        None => tracing::debug!(id = %image.id, "skipping image without url"),
                    }
                }
                CatalogObject::Category(category) => {
                    match category.category_data.as_ref().and_then(|d| d.name.clone()) {
                        Some(name) => {
                            index.categories.insert(category.id.clone(), name);
                        }
                        None => {
                            tracing::debug!(id = %category.id, "skipping category without name");
                        }
                    }
                }
                CatalogObject::Tax(tax) => {
                    let entry = tax.tax_data.as_ref().and_then(|d| {
                        d.name.clone().map(|name| TaxEntry {
                            name,
                            percentage: d.percentage.clone(),
                        })
                    });
                    match entry {
                        Some(entry) => {
                            index.taxes.insert(tax.id.clone(), entry);
                        }
                        None => tracing::debug!(id = %tax.id, "skipping tax without name"),
                    }
                }
                CatalogObject::Item(_)
                | CatalogObject::ItemVariation(_)
                | CatalogObject::Other => {}
            }
        }

        index
    }

    #[must_use]
    pub fn image_url(&self, id: &str) -> Option<&str> {
        self.image_urls.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn category_name(&self, id: &str) -> Option<&str> {
        self.categories.get(id).map(String::as_str)
    }

    #[must_use]
    pub fn tax(&self, id: &str) -> Option<&TaxEntry> {
        self.taxes.get(id)
    }
}
