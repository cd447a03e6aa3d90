use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

pub type DynGeocoder = Arc<dyn ReverseGeocoder + Send + Sync>;

/// Best-effort translation of a coordinate pair into a short place label.
/// Failures are absorbed here; callers only ever see `None`.
#[async_trait]
pub trait ReverseGeocoder {
    async fn resolve(&self, lat: f64, lon: f64) -> Option<String>;
}

/// Reverse geocoding against a Nominatim instance. One bounded attempt per
/// lookup, no retries.
pub struct Nominatim {
    http: reqwest::Client,
    base_url: String,
}

impl Nominatim {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    async fn lookup(&self, lat: f64, lon: f64) -> Result<Option<String>, reqwest::Error> {
        let response = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("format", "json".to_string()),
            ])
            .timeout(Duration::from_secs(5))
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let body: ReverseResponse = response.json().await?;
        Ok(place_label(&body))
    }
}

#[async_trait]
impl ReverseGeocoder for Nominatim {
    async fn resolve(&self, lat: f64, lon: f64) -> Option<String> {
        match self.lookup(lat, lon).await {
            Ok(label) => label,
            Err(err) => {
                debug!("reverse geocode failed: {}", err);
                None
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: AddressParts,
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AddressParts {
    neighbourhood: Option<String>,
    suburb: Option<String>,
    hamlet: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

/// Prefers neighbourhood-level + city-level names; falls back to the first
/// two segments of the free-text display name.
fn place_label(response: &ReverseResponse) -> Option<String> {
    let addr = &response.address;
    let parts: Vec<&str> = [
        addr.neighbourhood
            .as_deref()
            .or(addr.suburb.as_deref())
            .or(addr.hamlet.as_deref()),
        addr.city
            .as_deref()
            .or(addr.town.as_deref())
            .or(addr.village.as_deref()),
    ]
    .into_iter()
    .flatten()
    .collect();

    if !parts.is_empty() {
        return Some(parts.join(", "));
    }
    response
        .display_name
        .as_ref()
        .map(|name| name.split(',').take(2).collect::<Vec<_>>().join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ReverseResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn prefers_neighbourhood_and_city() {
        let label = place_label(&response(
            r#"{"address": {"suburb": "Leopoldstadt", "city": "Vienna"}, "display_name": "x,y,z"}"#,
        ));
        assert_eq!(label.as_deref(), Some("Leopoldstadt, Vienna"));
    }

    #[test]
    fn city_alone_is_enough() {
        let label = place_label(&response(r#"{"address": {"town": "Hallstatt"}}"#));
        assert_eq!(label.as_deref(), Some("Hallstatt"));
    }

    #[test]
    fn falls_back_to_display_name_segments() {
        let label = place_label(&response(
            r#"{"address": {}, "display_name": "12, Some Street, Some District, Austria"}"#,
        ));
        assert_eq!(label.as_deref(), Some("12, Some Street"));
    }

    #[test]
    fn empty_response_has_no_label() {
        assert_eq!(place_label(&response(r#"{}"#)), None);
    }
}
