//! Reqwest-backed event providers.
//!
//! Each provider is optional: a transport failure, non-success status or bad
//! payload is logged and replaced by the matching sample data. Callers never
//! see the error.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::sample;
use crate::core::locations::Location;
use crate::core::model::{AstroEvent, EventCategory, EventDetails};

pub const DEFAULT_ISS_PASS_URL: &str = "http://api.open-notify.org/iss-pass.json";
pub const DEFAULT_AURORA_URL: &str =
    "https://services.swpc.noaa.gov/products/ovation_aurora_latest.json";
pub const DEFAULT_LAUNCH_URL: &str = "https://lldev.thespacedevs.com/2.2.0/launch/upcoming/";

const ISS_SOURCE: &str = "NASA Open API";
const AURORA_SOURCE: &str = "NOAA Space Weather";
const LAUNCH_SOURCE: &str = "The Space Devs API";
const PASS_COUNT: &str = "5";
const LAUNCH_LIMIT: &str = "5";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("invalid payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Endpoint URLs for the live providers.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub iss_pass_url: String,
    pub aurora_url: String,
    pub launch_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            iss_pass_url: DEFAULT_ISS_PASS_URL.to_string(),
            aurora_url: DEFAULT_AURORA_URL.to_string(),
            launch_url: DEFAULT_LAUNCH_URL.to_string(),
        }
    }
}

pub struct HttpProviders {
    client: Client,
    endpoints: ProviderEndpoints,
}

impl HttpProviders {
    /// Build providers sharing one client with a per-request timeout.
    pub fn new(endpoints: ProviderEndpoints, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoints })
    }

    pub async fn iss_passes(&self, location: &Location, now: DateTime<Utc>) -> Vec<AstroEvent> {
        match self.fetch_iss_passes(location, now).await {
            Ok(passes) => passes,
            Err(e) => {
                log::warn!("Error getting ISS pass data: {}", e);
                sample::iss_passes(now)
            }
        }
    }

    pub async fn aurora_forecast(&self, location: &Location, now: DateTime<Utc>) -> AstroEvent {
        match self.get(&self.endpoints.aurora_url, &[]).await {
            // The feed is only a liveness check; the estimate is computed locally
            Ok(_) => sample::aurora_forecast(location, now, AURORA_SOURCE),
            Err(e) => {
                log::warn!("Error getting aurora data: {}", e);
                sample::aurora_forecast(location, now, sample::SAMPLE_SOURCE)
            }
        }
    }

    pub async fn rocket_launches(&self, now: DateTime<Utc>) -> Vec<AstroEvent> {
        let result = match self
            .get(&self.endpoints.launch_url, &[("limit", LAUNCH_LIMIT.to_string())])
            .await
        {
            Ok(body) => parse_launches(&body),
            Err(e) => Err(e),
        };
        match result {
            Ok(launches) => launches,
            Err(e) => {
                log::warn!("Error getting launch data: {}", e);
                sample::rocket_launches(now)
            }
        }
    }

    /// Meteor data needs an IMO membership, so the calendar is always used.
    pub fn meteor_showers(&self, now: DateTime<Utc>) -> Vec<AstroEvent> {
        sample::meteor_showers(now)
    }

    async fn fetch_iss_passes(
        &self,
        location: &Location,
        now: DateTime<Utc>,
    ) -> Result<Vec<AstroEvent>, ProviderError> {
        let query = [
            ("lat", location.lat.to_string()),
            ("lon", location.lon.to_string()),
            ("n", PASS_COUNT.to_string()),
        ];
        let body = self.get(&self.endpoints.iss_pass_url, &query).await?;
        parse_iss_passes(&body, now)
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Vec<u8>, ProviderError> {
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[derive(Deserialize)]
struct IssPassResponse {
    response: Vec<IssPassDto>,
}

#[derive(Deserialize)]
struct IssPassDto {
    risetime: i64,
    /// Seconds
    duration: i64,
}

fn parse_iss_passes(body: &[u8], now: DateTime<Utc>) -> Result<Vec<AstroEvent>, ProviderError> {
    let decoded: IssPassResponse = serde_json::from_slice(body)?;
    Ok(decoded
        .response
        .into_iter()
        .filter_map(|pass| {
            let time = Utc.timestamp_opt(pass.risetime, 0).single()?;
            (time > now).then(|| AstroEvent {
                name: "International Space Station Transit".to_string(),
                category: EventCategory::SatellitePass,
                time: Some(time),
                source: ISS_SOURCE.to_string(),
                details: EventDetails::SatellitePass {
                    duration: format!("{} minutes", pass.duration / 60),
                    max_altitude: None,
                    brightness: "Magnitude -3.9 (Very Bright)".to_string(),
                    direction: "West to East".to_string(),
                },
            })
        })
        .collect())
}

#[derive(Deserialize)]
struct LaunchListDto {
    results: Vec<LaunchDto>,
}

#[derive(Deserialize)]
struct LaunchDto {
    name: String,
    net: DateTime<Utc>,
    mission: Option<MissionDto>,
    pad: PadDto,
}

#[derive(Deserialize)]
struct MissionDto {
    name: String,
}

#[derive(Deserialize)]
struct PadDto {
    location: PadLocationDto,
}

#[derive(Deserialize)]
struct PadLocationDto {
    name: String,
}

fn parse_launches(body: &[u8]) -> Result<Vec<AstroEvent>, ProviderError> {
    let decoded: LaunchListDto = serde_json::from_slice(body)?;
    Ok(decoded
        .results
        .into_iter()
        .map(|launch| AstroEvent {
            name: launch.name,
            category: EventCategory::Launch,
            time: Some(launch.net),
            source: LAUNCH_SOURCE.to_string(),
            details: EventDetails::Launch {
                mission: launch
                    .mission
                    .map(|m| m.name)
                    .unwrap_or_else(|| "Unknown Mission".to_string()),
                site: launch.pad.location.name,
                visibility: "Check local visibility".to_string(),
            },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::locations;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_parse_iss_passes_drops_past() {
        let body = br#"{"message":"success","response":[
            {"risetime":1699990000,"duration":300},
            {"risetime":1700003600,"duration":420}
        ]}"#;
        let passes = parse_iss_passes(body, now()).unwrap();
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].time, Some(now() + chrono::Duration::hours(1)));
        assert_eq!(passes[0].source, ISS_SOURCE);
        match &passes[0].details {
            EventDetails::SatellitePass { duration, max_altitude, .. } => {
                assert_eq!(duration, "7 minutes");
                assert!(max_altitude.is_none());
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn test_parse_launches() {
        let body = br#"{"count":2,"results":[
            {"name":"Falcon 9 Block 5 | Starlink Group 10-3","net":"2023-11-15T12:00:00Z",
             "mission":{"name":"Starlink Group 10-3"},
             "pad":{"location":{"name":"Cape Canaveral SFS, FL, USA"}}},
            {"name":"Electron | Unknown Payload","net":"2023-11-16T08:30:00Z",
             "mission":null,
             "pad":{"location":{"name":"Rocket Lab Launch Complex 1, Mahia Peninsula, New Zealand"}}}
        ]}"#;
        let launches = parse_launches(body).unwrap();
        assert_eq!(launches.len(), 2);
        assert_eq!(launches[0].category, EventCategory::Launch);
        match &launches[1].details {
            EventDetails::Launch { mission, site, .. } => {
                assert_eq!(mission, "Unknown Mission");
                assert!(site.starts_with("Rocket Lab"));
            }
            other => panic!("unexpected details {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            parse_launches(b"<html>busy</html>"),
            Err(ProviderError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_providers_fall_back() {
        let endpoints = ProviderEndpoints {
            iss_pass_url: "http://127.0.0.1:9/iss".to_string(),
            aurora_url: "http://127.0.0.1:9/aurora".to_string(),
            launch_url: "http://127.0.0.1:9/launches".to_string(),
        };
        let providers = HttpProviders::new(endpoints, Duration::from_secs(2)).unwrap();
        let london = locations::lookup("london").unwrap();

        let passes = providers.iss_passes(london, now()).await;
        assert_eq!(passes, sample::iss_passes(now()));

        let aurora = providers.aurora_forecast(london, now()).await;
        assert_eq!(aurora.source, sample::SAMPLE_SOURCE);

        let launches = providers.rocket_launches(now()).await;
        assert_eq!(launches, sample::rocket_launches(now()));
    }
}
