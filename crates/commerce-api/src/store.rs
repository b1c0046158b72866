//! Tenant-partitioned product store
//!
//! Every read and write is keyed by tenant id; there is no cross-tenant
//! query path.

use crate::models::{Product, ProductCreate};
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct ProductStore {
    partitions: DashMap<String, Vec<Product>>,
}

impl ProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, tenant_id: &str, input: ProductCreate) -> Product {
        let product = Product {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.to_string(),
            name: input.name,
            description: input.description,
            price_cents: input.price_cents,
            tags: input.tags,
            created_at: Utc::now(),
        };
        self.partitions
            .entry(tenant_id.to_string())
            .or_default()
            .push(product.clone());
        product
    }

    pub fn list(&self, tenant_id: &str) -> Vec<Product> {
        self.partitions
            .get(tenant_id)
            .map(|items| items.value().clone())
            .unwrap_or_default()
    }

    /// (count, summed price) for one tenant
    pub fn totals(&self, tenant_id: &str) -> (u64, i64) {
        self.partitions.get(tenant_id).map_or((0, 0), |items| {
            (
                items.len() as u64,
                items.iter().map(|p| p.price_cents).sum(),
            )
        })
    }
}
