//! Nearby-item search read path.
//!
//! Two-phase query against the search index: text-match items by name and
//! description, collect the distinct shops carrying a hit, then geo-filter
//! and distance-sort those shops around the caller.

use serde::Deserialize;

use localmart_core::GeoPoint;

use crate::error::AppError;
use crate::search::ShopDocument;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub q: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

const fn default_radius_km() -> f64 {
    5.0
}

/// Result of a nearby search.
#[derive(Debug)]
pub enum NearbyOutcome {
    /// Shops carrying a matching item, nearest first.
    Shops(Vec<ShopDocument>),
    /// The text query matched no items at all.
    NoMatchingItems,
}

/// Find shops near the caller that carry an item matching the query.
///
/// # Errors
///
/// Validation failure for an empty query or out-of-range coordinates or
/// radius; `Search` if the backend is unreachable.
pub async fn nearby_items(state: &AppState, query: NearbyQuery) -> Result<NearbyOutcome, AppError> {
    if query.q.trim().is_empty() {
        return Err(AppError::Validation("Search query is required.".to_owned()));
    }
    GeoPoint::new(query.lat, query.lon).map_err(|e| AppError::Validation(e.to_string()))?;
    if !query.radius_km.is_finite() || query.radius_km <= 0.0 {
        return Err(AppError::Validation(
            "radius_km must be a positive number".to_owned(),
        ));
    }

    let items = state.search().search_items(query.q.trim()).await?;
    if items.is_empty() {
        return Ok(NearbyOutcome::NoMatchingItems);
    }

    let mut shop_ids: Vec<String> = items.into_iter().map(|item| item.shop_id).collect();
    shop_ids.sort_unstable();
    shop_ids.dedup();

    let shops = state
        .search()
        .shops_near(&shop_ids, query.lat, query.lon, query.radius_km)
        .await?;

    Ok(NearbyOutcome::Shops(shops))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_radius() {
        let query: NearbyQuery =
            serde_json::from_str(r#"{"q": "scarf", "lat": 28.6, "lon": 77.2}"#).expect("parse");
        assert!((query.radius_km - 5.0).abs() < f64::EPSILON);
    }
}
