use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    core::geo::LatLng,
    location::{LocationError, LocationProvider},
};

const IP_API_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// Approximate position of the caller's public IP address.
///
/// One request per call, no retry. Any transport or service failure maps to
/// [`LocationError::Unavailable`].
pub struct IpLocation {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpLocation {
    pub fn new(timeout: Duration) -> Result<Self, LocationError> {
        Self::with_url(IP_API_URL, timeout)
    }

    /// Same lookup against another ip-api compatible endpoint.
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

fn parse_response(response: IpApiResponse) -> Result<LatLng, LocationError> {
    if response.status != "success" {
        return Err(LocationError::Unavailable(
            response
                .message
                .unwrap_or_else(|| format!("lookup status {}", response.status)),
        ));
    }

    match (response.lat, response.lon) {
        (Some(lat), Some(lng)) if LatLng::new(lat, lng).is_valid() => Ok(LatLng::new(lat, lng)),
        (lat, lng) => Err(LocationError::Unavailable(format!(
            "lookup returned no usable coordinates ({:?}, {:?})",
            lat, lng
        ))),
    }
}

#[async_trait]
impl LocationProvider for IpLocation {
    fn name(&self) -> &str {
        "ip-api"
    }

    async fn resolve_once(&self) -> Result<LatLng, LocationError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?
            .error_for_status()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let position = parse_response(body)?;
        log::debug!("IP location resolved to {}", position);
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<LatLng, LocationError> {
        parse_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn test_successful_lookup() {
        let position = parse(r#"{"status":"success","lat":20.2961,"lon":85.8245}"#);
        assert_eq!(position, Ok(LatLng::new(20.2961, 85.8245)));
    }

    #[test]
    fn test_failed_lookup_carries_message() {
        let result = parse(r#"{"status":"fail","message":"private range"}"#);
        assert_eq!(
            result,
            Err(LocationError::Unavailable("private range".to_string()))
        );
    }

    #[test]
    fn test_missing_or_invalid_coordinates() {
        assert!(parse(r#"{"status":"success"}"#).is_err());
        assert!(parse(r#"{"status":"success","lat":120.0,"lon":10.0}"#).is_err());
    }
}
