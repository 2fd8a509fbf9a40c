//! Selectable wheel items
//!
//! The engine only needs a label per item. Restaurants arrive from the host
//! page as JSON after it has already fetched and filtered candidates.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::consts::LABEL_MAX_CHARS;
use crate::error::WheelError;

/// Anything that can sit on a wheel segment
pub trait WheelItem {
    fn label(&self) -> &str;

    /// Label truncated for segment text
    fn short_label(&self) -> Cow<'_, str> {
        let label = self.label();
        match label.char_indices().nth(LABEL_MAX_CHARS) {
            Some((cut, _)) => Cow::Owned(format!("{}…", &label[..cut])),
            None => Cow::Borrowed(label),
        }
    }
}

impl WheelItem for String {
    fn label(&self) -> &str {
        self
    }
}

impl WheelItem for &str {
    fn label(&self) -> &str {
        self
    }
}

/// Places API price tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PriceLevel {
    #[default]
    #[serde(rename = "PRICE_LEVEL_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "PRICE_LEVEL_FREE")]
    Free,
    #[serde(rename = "PRICE_LEVEL_INEXPENSIVE")]
    Inexpensive,
    #[serde(rename = "PRICE_LEVEL_MODERATE")]
    Moderate,
    #[serde(rename = "PRICE_LEVEL_EXPENSIVE")]
    Expensive,
    #[serde(rename = "PRICE_LEVEL_VERY_EXPENSIVE")]
    VeryExpensive,
}

impl PriceLevel {
    /// Numeric tier 0-4 (None when unspecified)
    pub fn as_number(&self) -> Option<u8> {
        match self {
            PriceLevel::Unspecified => None,
            PriceLevel::Free => Some(0),
            PriceLevel::Inexpensive => Some(1),
            PriceLevel::Moderate => Some(2),
            PriceLevel::Expensive => Some(3),
            PriceLevel::VeryExpensive => Some(4),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A candidate restaurant as supplied by the host page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub price_level: PriceLevel,
    #[serde(default)]
    pub google_maps_uri: String,
    #[serde(default)]
    pub location: Coordinate,
    /// Meters from the user
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl WheelItem for Restaurant {
    fn label(&self) -> &str {
        &self.name
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RestaurantPayload {
    Envelope { restaurants: Vec<Restaurant> },
    List(Vec<Restaurant>),
}

/// Parse restaurants from either a bare array or `{ "restaurants": [...] }`
pub fn restaurants_from_json(json: &str) -> Result<Vec<Restaurant>, WheelError> {
    let restaurants = match serde_json::from_str::<RestaurantPayload>(json)? {
        RestaurantPayload::Envelope { restaurants } => restaurants,
        RestaurantPayload::List(list) => list,
    };
    log::debug!("Parsed {} restaurants", restaurants.len());
    Ok(restaurants)
}
