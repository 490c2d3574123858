//! Session lookup cache for suppliers, customers, products and categories
//!
//! Loaded once when a reporting session starts and replaced wholesale on
//! reload. There is no partial invalidation.

use std::collections::BTreeSet;

use crate::api::ApiClient;
use crate::error::FetchError;
use crate::models::{CategoryRecord, CustomerRecord, ProductRecord, RecordId, SupplierRecord};

/// Read-only lookup lists used to populate filter choices and join purchases
#[derive(Debug, Clone, Default)]
pub struct LookupCache {
    suppliers: Vec<SupplierRecord>,
    customers: Vec<CustomerRecord>,
    products: Vec<ProductRecord>,
    categories: Vec<CategoryRecord>,
}

impl LookupCache {
    /// Fetch suppliers, customers and products from the backend.
    ///
    /// Suppliers and customers are required. Products are optional: if that
    /// call fails the cache is built with an empty product list.
    pub async fn load(client: &ApiClient) -> Result<Self, FetchError> {
        let suppliers = client.fetch_suppliers().await?;
        let customers = client.fetch_customers().await?;
        let products = match client.fetch_products().await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!("product list unavailable, continuing without it: {}", e);
                Vec::new()
            }
        };

        let cache = Self::from_parts(suppliers, customers, products);
        tracing::info!(
            suppliers = cache.suppliers.len(),
            customers = cache.customers.len(),
            products = cache.products.len(),
            categories = cache.categories.len(),
            "lookup cache loaded"
        );
        Ok(cache)
    }

    /// Build a cache from already-fetched lists
    pub fn from_parts(
        suppliers: Vec<SupplierRecord>,
        customers: Vec<CustomerRecord>,
        products: Vec<ProductRecord>,
    ) -> Self {
        let categories = derive_categories(&suppliers);
        Self {
            suppliers,
            customers,
            products,
            categories,
        }
    }

    pub fn suppliers(&self) -> &[SupplierRecord] {
        &self.suppliers
    }

    pub fn customers(&self) -> &[CustomerRecord] {
        &self.customers
    }

    pub fn products(&self) -> &[ProductRecord] {
        &self.products
    }

    pub fn categories(&self) -> &[CategoryRecord] {
        &self.categories
    }

    /// Suppliers in a category; every supplier when the category is blank
    pub fn suppliers_by_category(&self, category_id: Option<&str>) -> Vec<&SupplierRecord> {
        match category_id.map(str::trim).filter(|c| !c.is_empty()) {
            Some(category) => self
                .suppliers
                .iter()
                .filter(|s| s.category.trim() == category)
                .collect(),
            None => self.suppliers.iter().collect(),
        }
    }

    /// Products sold by a supplier; every product when no supplier is given
    pub fn products_by_supplier(&self, supplier_id: Option<&RecordId>) -> Vec<&ProductRecord> {
        match supplier_id {
            Some(id) => self
                .products
                .iter()
                .filter(|p| p.supplier_id.as_ref() == Some(id))
                .collect(),
            None => self.products.iter().collect(),
        }
    }

    pub fn supplier(&self, id: &RecordId) -> Option<&SupplierRecord> {
        self.suppliers.iter().find(|s| &s.id == id)
    }

    /// Resolve a purchase's supplier: by id first, then by denormalized name
    pub fn resolve_supplier(
        &self,
        id: Option<&RecordId>,
        name: Option<&str>,
    ) -> Option<&SupplierRecord> {
        id.and_then(|id| self.supplier(id)).or_else(|| {
            let name = name.map(str::trim).filter(|n| !n.is_empty())?;
            self.suppliers.iter().find(|s| s.name.trim() == name)
        })
    }
}

/// Distinct non-empty supplier categories, sorted ascending
fn derive_categories(suppliers: &[SupplierRecord]) -> Vec<CategoryRecord> {
    suppliers
        .iter()
        .map(|s| s.category.trim())
        .filter(|c| !c.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|c| CategoryRecord {
            id: c.to_string(),
            name: c.to_string(),
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn supplier(id: &str, name: &str, category: &str) -> SupplierRecord {
        SupplierRecord {
            id: RecordId::from(id),
            name: name.to_string(),
            category: category.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn product(id: &str, name: &str, supplier_id: &str) -> ProductRecord {
        ProductRecord {
            id: RecordId::from(id),
            name: name.to_string(),
            supplier_id: RecordId::parse_optional(supplier_id),
        }
    }

    pub(crate) fn sample_cache() -> LookupCache {
        LookupCache::from_parts(
            vec![
                supplier("S1", "Acme Grains", "Grocery"),
                supplier("S2", "Bolt Hardware", "Hardware"),
                supplier("S3", "Corner Mills", "Grocery"),
                supplier("S4", "Loose Ends", ""),
            ],
            Vec::new(),
            vec![
                product("P1", "Rice", "S1"),
                product("P2", "Wheat", "S3"),
                product("P3", "Nails", "S2"),
                product("P4", "Flour", "S1"),
            ],
        )
    }

    #[test]
    fn test_categories_are_distinct_sorted_and_non_empty() {
        let cache = sample_cache();
        let names: Vec<_> = cache.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Grocery", "Hardware"]);
        assert!(cache.categories().iter().all(|c| c.id == c.name));
    }

    #[test]
    fn test_suppliers_by_category() {
        let cache = sample_cache();

        let grocery: Vec<_> = cache
            .suppliers_by_category(Some("Grocery"))
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(grocery, vec!["S1", "S3"]);

        assert_eq!(cache.suppliers_by_category(None).len(), 4);
        assert_eq!(cache.suppliers_by_category(Some("")).len(), 4);
        assert!(cache.suppliers_by_category(Some("Toys")).is_empty());
    }

    #[test]
    fn test_products_by_supplier() {
        let cache = sample_cache();
        let s1 = RecordId::from("S1");

        let names: Vec<_> = cache
            .products_by_supplier(Some(&s1))
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Rice", "Flour"]);
        assert_eq!(cache.products_by_supplier(None).len(), 4);
    }

    #[test]
    fn test_resolve_supplier_prefers_id() {
        let cache = sample_cache();
        let s2 = RecordId::from("S2");

        let by_id = cache.resolve_supplier(Some(&s2), Some("Acme Grains")).unwrap();
        assert_eq!(by_id.name, "Bolt Hardware");

        let unknown = RecordId::from("S99");
        let by_name = cache.resolve_supplier(Some(&unknown), Some("Acme Grains")).unwrap();
        assert_eq!(by_name.id.as_str(), "S1");

        assert!(cache.resolve_supplier(None, None).is_none());
        assert!(cache.resolve_supplier(None, Some("  ")).is_none());
    }

    #[test]
    fn test_resolve_supplier_ignores_padding_on_both_sides() {
        let cache = LookupCache::from_parts(
            vec![supplier("S1", " Acme Grains ", "Grocery")],
            Vec::new(),
            Vec::new(),
        );

        let found = cache.resolve_supplier(None, Some("Acme Grains")).unwrap();
        assert_eq!(found.id.as_str(), "S1");
        assert!(cache.resolve_supplier(None, Some("  Acme Grains\t")).is_some());
    }
}
