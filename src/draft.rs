//! Editor drafts - raw form input turned into a field map
//!
//! The stricter editor variant insists on an image before saving; the core
//! gateway never does. `ImagePolicy` picks which rules apply.

use serde::{Deserialize, Serialize};

use crate::record::StockFields;
use crate::schema::StockType;

/// Whether a draft must carry an image reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePolicy {
    #[default]
    Optional,
    Required,
}

impl ImagePolicy {
    pub fn from_required(required: bool) -> Self {
        if required {
            ImagePolicy::Required
        } else {
            ImagePolicy::Optional
        }
    }
}

/// Why a draft cannot be saved
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("Nothing to save, all fields are blank")]
    Blank,

    #[error("Stock requires an image")]
    MissingImage,

    #[error("Stock requires a name")]
    MissingName,

    #[error("{field} must be a whole number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// Unvalidated editor input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockDraft {
    pub name: String,
    pub supplier: String,
    pub quantity: String,
    pub price: String,
    pub stock_type: Option<StockType>,
    pub image: Option<String>,
}

impl StockDraft {
    /// True for an untouched form: no text, unknown type, no image
    pub fn is_blank(&self) -> bool {
        [&self.name, &self.supplier, &self.quantity, &self.price]
            .iter()
            .all(|s| s.trim().is_empty())
            && matches!(self.stock_type, None | Some(StockType::Unknown))
            && self.image.as_deref().is_none_or(|i| i.trim().is_empty())
    }

    /// Convert to a field map.
    ///
    /// Blank quantity and price become 0. Supplier is stored as typed,
    /// including empty.
    pub fn into_fields(self, policy: ImagePolicy) -> Result<StockFields, DraftError> {
        if self.is_blank() {
            return Err(DraftError::Blank);
        }

        let image = self
            .image
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());
        if policy == ImagePolicy::Required && image.is_none() {
            return Err(DraftError::MissingImage);
        }

        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::MissingName);
        }

        let quantity = parse_number("quantity", &self.quantity)?;
        let price = parse_number("price", &self.price)?;

        let mut fields = StockFields::new()
            .name(name)
            .supplier(self.supplier.trim())
            .stock_type(self.stock_type.unwrap_or(StockType::Unknown))
            .quantity(quantity)
            .price(price);
        if let Some(image) = image {
            fields = fields.image(image);
        }
        Ok(fields)
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<i64, DraftError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse().map_err(|_| DraftError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Column;
    use rusqlite::types::Value;

    fn draft() -> StockDraft {
        StockDraft {
            name: " Mascara ".into(),
            supplier: "Maybelline".into(),
            quantity: "4".into(),
            price: "".into(),
            stock_type: Some(StockType::TypeOne),
            image: Some("file:///pics/mascara.png".into()),
        }
    }

    #[test]
    fn test_blank_draft() {
        assert!(StockDraft::default().is_blank());
        assert_eq!(StockDraft::default().into_fields(ImagePolicy::Optional), Err(DraftError::Blank));
    }

    #[test]
    fn test_into_fields() {
        let fields = draft().into_fields(ImagePolicy::Required).unwrap();
        assert_eq!(fields.get(Column::Name), Some(&Value::Text("Mascara".into())));
        assert_eq!(fields.get(Column::Quantity), Some(&Value::Integer(4)));
        assert_eq!(fields.get(Column::Price), Some(&Value::Integer(0)));
        assert_eq!(fields.get(Column::Type), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_image_policy() {
        let no_image = StockDraft { image: None, ..draft() };
        assert_eq!(no_image.clone().into_fields(ImagePolicy::Required), Err(DraftError::MissingImage));
        let fields = no_image.into_fields(ImagePolicy::Optional).unwrap();
        assert!(!fields.contains(Column::Image));
    }

    #[test]
    fn test_name_and_numbers() {
        let unnamed = StockDraft { name: "   ".into(), ..draft() };
        assert_eq!(unnamed.into_fields(ImagePolicy::Optional), Err(DraftError::MissingName));

        let bad_price = StockDraft { price: "4.99".into(), ..draft() };
        assert!(matches!(
            bad_price.into_fields(ImagePolicy::Optional),
            Err(DraftError::InvalidNumber { field: "price", .. })
        ));
    }
}
