use serde::Deserialize;
use thiserror::Error;

pub const YANDEX_GEOCODER_URL: &str = "https://geocode-maps.yandex.ru/1.x";

/// A resolved location, latitude-first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Geocoder request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed geocoder response: {0}")]
    MalformedResponse(String),
}

/// Address resolution capability. Production uses [`YandexGeocoder`];
/// tests substitute a deterministic fake.
pub trait Geocode {
    /// Resolves a free-text address to coordinates. `Ok(None)` means the
    /// provider found nothing for this address; transport and HTTP-status
    /// failures propagate as errors.
    fn resolve(&self, address: &str) -> Result<Option<Point>, GeocodeError>;
}

pub struct YandexGeocoder {
    client: reqwest::blocking::Client,
    api_key: String,
    endpoint: String,
}

impl YandexGeocoder {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            endpoint: YANDEX_GEOCODER_URL.to_string(),
        }
    }

    pub fn with_endpoint(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }
}

impl Geocode for YandexGeocoder {
    fn resolve(&self, address: &str) -> Result<Option<Point>, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("geocode", address),
                ("apikey", &self.api_key),
                ("format", "json"),
            ])
            .send()?
            .error_for_status()?;

        let body: GeocoderResponse = response.json()?;
        extract_point(body)
    }
}

#[derive(Debug, Deserialize)]
struct GeocoderResponse {
    response: GeocoderResults,
}

#[derive(Debug, Deserialize)]
struct GeocoderResults {
    #[serde(rename = "GeoObjectCollection")]
    collection: GeoObjectCollection,
}

#[derive(Debug, Deserialize)]
struct GeoObjectCollection {
    #[serde(rename = "featureMember")]
    feature_member: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    #[serde(rename = "Point")]
    point: GeoPoint,
}

#[derive(Debug, Deserialize)]
struct GeoPoint {
    pos: String,
}

/// Takes the first (most relevant) result. The provider returns positions
/// as `"<lon> <lat>"`; internal representation is latitude-first.
fn extract_point(body: GeocoderResponse) -> Result<Option<Point>, GeocodeError> {
    let Some(most_relevant) = body.response.collection.feature_member.into_iter().next() else {
        return Ok(None);
    };
    parse_pos(&most_relevant.geo_object.point.pos).map(Some)
}

fn parse_pos(pos: &str) -> Result<Point, GeocodeError> {
    let mut parts = pos.split_whitespace();
    let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(GeocodeError::MalformedResponse(format!(
            "expected \"<lon> <lat>\" position, got {pos:?}"
        )));
    };
    let longitude = lon
        .parse::<f64>()
        .map_err(|_| GeocodeError::MalformedResponse(format!("invalid longitude {lon:?}")))?;
    let latitude = lat
        .parse::<f64>()
        .map_err(|_| GeocodeError::MalformedResponse(format!("invalid latitude {lat:?}")))?;
    Ok(Point {
        latitude,
        longitude,
    })
}
