//! Form input parsing.
//!
//! Product forms arrive untyped: a bag of string fields. [`ProductInput::parse`]
//! is the only place that looks at raw form fields; everything past it works
//! with a validated [`ProductInput`].

use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Accepted names for the product name field.
pub const NAME_FIELDS: &[&str] = &["name", "nama_produk"];
/// Accepted names for the price field.
pub const PRICE_FIELDS: &[&str] = &["price", "harga"];
/// Name of the optional image field.
pub const IMAGE_FIELD: &str = "image_url";

/// Untyped form submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    fields: HashMap<String, String>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// First non-blank field among `names`, trimmed.
    fn get_any(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.get(name))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }

    /// Build from a JSON object body.
    ///
    /// Strings are taken as-is, numbers and booleans are stringified, nulls are
    /// skipped. Anything other than an object is rejected.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::DeserializationError("form body must be a JSON object".into()))?;

        let mut form = FormData::new();
        for (field, value) in object {
            match value {
                Value::Null => {}
                Value::String(s) => form.insert(field.as_str(), s.as_str()),
                Value::Number(n) => form.insert(field.as_str(), n.to_string()),
                Value::Bool(b) => form.insert(field.as_str(), b.to_string()),
                _ => {
                    return Err(Error::DeserializationError(format!(
                        "form field {} must be a scalar",
                        field
                    )))
                }
            }
        }
        Ok(form)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormData::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

/// Why a product form was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name absent or blank.
    MissingName,
    /// Price absent or blank.
    MissingPrice,
    /// Price is not a number.
    InvalidPrice(String),
    /// Price parsed to infinity or NaN.
    NonFinitePrice(String),
    /// Price below zero.
    NegativePrice(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingName => write!(f, "product name is required"),
            ValidationError::MissingPrice => write!(f, "price is required"),
            ValidationError::InvalidPrice(raw) => write!(f, "price {:?} is not a number", raw),
            ValidationError::NonFinitePrice(raw) => write!(f, "price {:?} is not finite", raw),
            ValidationError::NegativePrice(raw) => write!(f, "price {:?} is negative", raw),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A validated product form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
    /// Empty string when the form carried no image.
    pub image_url: String,
}

impl ProductInput {
    /// Validate a raw form.
    ///
    /// # Errors
    ///
    /// Returns the first problem found, name before price.
    pub fn parse(form: &FormData) -> std::result::Result<Self, ValidationError> {
        let name = form
            .get_any(NAME_FIELDS)
            .ok_or(ValidationError::MissingName)?;

        let price = parse_price(form.get_any(PRICE_FIELDS))?;

        let image_url = form
            .get(IMAGE_FIELD)
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        Ok(ProductInput {
            name: name.to_string(),
            price,
            image_url,
        })
    }
}

fn parse_price(raw: Option<&str>) -> std::result::Result<f64, ValidationError> {
    let raw = raw
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(ValidationError::MissingPrice)?;

    let price: f64 = raw
        .parse()
        .map_err(|_| ValidationError::InvalidPrice(raw.to_string()))?;

    if !price.is_finite() {
        return Err(ValidationError::NonFinitePrice(raw.to_string()));
    }
    if price < 0.0 {
        return Err(ValidationError::NegativePrice(raw.to_string()));
    }

    // Folds -0 into 0
    Ok(price + 0.0)
}
