use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::database::record_id::RecordId;

/// Field-level validation failures for product payloads
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("{0} must be greater than or equal to 0")]
    Negative(&'static str),

    #[error("{0} must be a whole number")]
    NotAnInteger(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(fields: ProductFields) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::new(),
            name: fields.name,
            price: fields.price,
            quantity: fields.quantity,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the mutable fields and bump `updated_at`
    pub fn apply(&mut self, fields: ProductFields) {
        self.name = fields.name;
        self.price = fields.price;
        self.quantity = fields.quantity;
        self.updated_at = Utc::now();
    }
}

/// Row layout of the `products` table
#[derive(Debug, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: RecordId::from(row.id),
            name: row.name,
            price: row.price,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A numeric field as clients send it: a JSON number or a numeric string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    fn to_f64(&self, field: &'static str) -> Result<f64, FieldError> {
        let value = match self {
            NumberInput::Number(n) => *n,
            NumberInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| FieldError::NotANumber(field))?,
        };
        if !value.is_finite() {
            return Err(FieldError::NotANumber(field));
        }
        Ok(value)
    }
}

/// Request body for POST and PUT. Every field is optional at the wire level;
/// which ones are required depends on the operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    pub name: Option<String>,
    pub price: Option<NumberInput>,
    pub quantity: Option<NumberInput>,
}

impl ProductInput {
    /// Validate a complete payload for a new product
    pub fn into_fields(self) -> Result<ProductFields, FieldError> {
        let name = self.name.ok_or(FieldError::Required("name"))?;
        let price = self
            .price
            .ok_or(FieldError::Required("price"))?
            .to_f64("price")?;
        let quantity = self
            .quantity
            .ok_or(FieldError::Required("quantity"))?
            .to_f64("quantity")?;
        ProductFields::validate(&name, price, quantity)
    }

    /// Overlay the supplied fields on an existing product and validate the result
    pub fn merge_into(self, existing: &Product) -> Result<ProductFields, FieldError> {
        let name = self.name.unwrap_or_else(|| existing.name.clone());
        let price = match self.price {
            Some(p) => p.to_f64("price")?,
            None => existing.price,
        };
        let quantity = match self.quantity {
            Some(q) => q.to_f64("quantity")?,
            None => existing.quantity as f64,
        };
        ProductFields::validate(&name, price, quantity)
    }
}

/// Validated product attributes
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl ProductFields {
    pub fn validate(name: &str, price: f64, quantity: f64) -> Result<Self, FieldError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(FieldError::Required("name"));
        }

        if !price.is_finite() {
            return Err(FieldError::NotANumber("price"));
        }
        if price < 0.0 {
            return Err(FieldError::Negative("price"));
        }

        if !quantity.is_finite() {
            return Err(FieldError::NotANumber("quantity"));
        }
        if quantity < 0.0 {
            return Err(FieldError::Negative("quantity"));
        }
        // `i64::MAX as f64` rounds up to 2^63, the first value that doesn't fit
        if quantity.fract() != 0.0 || quantity >= i64::MAX as f64 {
            return Err(FieldError::NotAnInteger("quantity"));
        }

        Ok(Self {
            name: name.to_string(),
            price,
            quantity: quantity as i64,
        })
    }
}
