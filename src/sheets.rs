use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use crate::domain::{RawRecord, UserId};
use crate::error::GymError;
use crate::store::WorkoutStore;

/// `GET {base}/worksheets/{user}` and `GET {base}/profiles`. No retries.
#[derive(Clone)]
pub struct SheetHttpClient {
    client: Client,
    base_url: Url,
}

impl SheetHttpClient {
    pub fn new(base_url: &str) -> Result<Self, GymError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| GymError::InvalidConfig(format!("invalid sheet url {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GymError::InvalidConfig(format!(
                "sheet url cannot be a base: {base_url}"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("gymbot/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| GymError::SheetHttp(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| GymError::SheetHttp(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn worksheet_url(&self, user: &UserId) -> Url {
        self.endpoint(&["worksheets", user.as_str()])
    }

    pub fn profiles_url(&self) -> Url {
        self.endpoint(&["profiles"])
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>, GymError> {
        tracing::debug!(%url, "sheet request");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    GymError::SourceUnavailable(err.to_string())
                } else {
                    GymError::SheetHttp(err.to_string())
                }
            })?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "sheet request failed".to_string());
            return Err(GymError::SheetStatus { status, message });
        }
        response
            .json::<T>()
            .map(Some)
            .map_err(|err| GymError::StoreParse(err.to_string()))
    }
}

impl WorkoutStore for SheetHttpClient {
    fn fetch_records(&self, user: &UserId) -> Result<Vec<RawRecord>, GymError> {
        self.get_json(self.worksheet_url(user))?
            .ok_or_else(|| GymError::ProfileNotFound(user.to_string()))
    }

    fn display_name(&self, user: &UserId) -> Result<Option<String>, GymError> {
        let profiles: Option<BTreeMap<String, String>> = self.get_json(self.profiles_url())?;
        Ok(profiles
            .and_then(|mut profiles| profiles.remove(user.as_str()))
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()))
    }
}
