//! API Models

use chrono::{DateTime, Utc};
use commerce_guard::{HealthSnapshot, Plan};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Standard API response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorResponse>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorResponse {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

// ============ Products ============

/// Product owned by a single tenant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Product creation request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price_cents: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Product listing
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
    pub total: u64,
}

// ============ Analytics / Reports ============

/// Analytics overview for a tenant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsSummary {
    pub tenant_id: Option<String>,
    pub product_count: u64,
    pub catalog_value_cents: i64,
    pub generated_at: DateTime<Utc>,
}

/// Sales report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesReport {
    pub tenant_id: Option<String>,
    pub plan: Option<PlanName>,
    pub period: String,
    pub products_listed: u64,
    pub catalog_value_cents: i64,
}

/// Bulk export descriptor
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExportReport {
    pub tenant_id: Option<String>,
    pub plan: Option<PlanName>,
    pub format: String,
    pub rows: u64,
}

/// Plan a gated request was admitted under
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanName {
    Free,
    Pro,
    Enterprise,
}

impl From<Plan> for PlanName {
    fn from(plan: Plan) -> Self {
        match plan {
            Plan::Free => Self::Free,
            Plan::Pro => Self::Pro,
            Plan::Enterprise => Self::Enterprise,
        }
    }
}

// ============ System ============

/// Overload signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct OverloadStatus {
    pub overloaded: bool,
}

/// Super-admin system view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub health: HealthSnapshot,
    pub overloaded: bool,
}
