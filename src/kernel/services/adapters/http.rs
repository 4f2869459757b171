//! `reqwest` client for the map data service.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::kernel::services::ports::{
    ApiError, ApiFuture, ApiOp, DataSource, HealthStatus,
};
use crate::models::{
    ClinicProperties, ColorMatrix, CountyProperties, FeatureCollection, PopulationPoint,
    SalaryPoint, Specialty, VillageProperties, VillageTarget, WeightPair,
};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Error)]
pub enum ClientInitError {
    #[error("invalid api base url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct ColorMatrixBody {
    color_matrix: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct SpecialtiesBody {
    #[serde(default)]
    specialties: Vec<Specialty>,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

#[derive(Clone)]
pub struct HttpDataSource {
    client: Client,
    base_url: Url,
}

impl HttpDataSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientInitError> {
        let invalid = |message: String| ClientInitError::InvalidBaseUrl {
            url: base_url.to_string(),
            message,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("not a hierarchical url".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(CONNECT_TIMEOUT))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/{segments}?{query}`. Segments and query values are
    /// percent-encoded.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    fn get<T>(&self, op: ApiOp, url: Url) -> ApiFuture<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.client.clone();
        Box::pin(async move {
            tracing::debug!(%op, %url, "request");
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|e| transport_error(op, &e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Status {
                    op,
                    status: status.as_u16(),
                    message: error_message(status, &body),
                });
            }

            response.json::<T>().await.map_err(|e| ApiError::Decode {
                op,
                message: e.to_string(),
            })
        })
    }
}

fn transport_error(op: ApiOp, e: &reqwest::Error) -> ApiError {
    let message = if e.is_timeout() {
        "timed out".to_string()
    } else if e.is_connect() {
        match e.url() {
            Some(url) => format!("cannot connect to {}", url.origin().ascii_serialization()),
            None => "cannot connect".to_string(),
        }
    } else {
        e.to_string()
    };
    ApiError::Transport { op, message }
}

/// Human-readable reason for a non-2xx response: the server's `detail` field
/// when present, otherwise the (truncated) body, otherwise the status reason.
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(ErrorBody { detail }) = serde_json::from_str::<ErrorBody>(body) {
        return match detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.chars().take(MAX_ERROR_BODY).collect();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

fn weight_query(weights: WeightPair) -> [(&'static str, String); 2] {
    [
        ("income_weight", weights.income().to_string()),
        ("density_weight", weights.density().to_string()),
    ]
}

impl HttpDataSource {
    fn village_series_url(&self, series: &str, target: &VillageTarget) -> Url {
        self.endpoint(
            &[series, target.name.as_str()],
            &[
                ("county_name", target.county.as_str()),
                ("district_name", target.district.as_str()),
            ],
        )
    }

    fn weighted_url(&self, segments: &[&str], weights: WeightPair) -> Url {
        let [income, density] = weight_query(weights);
        self.endpoint(
            segments,
            &[(income.0, income.1.as_str()), (density.0, density.1.as_str())],
        )
    }
}

impl DataSource for HttpDataSource {
    fn health(&self) -> ApiFuture<HealthStatus> {
        self.get(ApiOp::Health, self.endpoint(&["health"], &[]))
    }

    fn counties(&self) -> ApiFuture<FeatureCollection<CountyProperties>> {
        self.get(ApiOp::Counties, self.endpoint(&["counties"], &[]))
    }

    fn villages(
        &self,
        county: &str,
        weights: WeightPair,
    ) -> ApiFuture<FeatureCollection<VillageProperties>> {
        self.get(
            ApiOp::Villages,
            self.weighted_url(&["villages", county], weights),
        )
    }

    fn village_salary(&self, target: &VillageTarget) -> ApiFuture<Vec<SalaryPoint>> {
        self.get(
            ApiOp::VillageSalary,
            self.village_series_url("village_salary", target),
        )
    }

    fn village_population(&self, target: &VillageTarget) -> ApiFuture<Vec<PopulationPoint>> {
        self.get(
            ApiOp::VillagePopulation,
            self.village_series_url("village_population", target),
        )
    }

    fn bivariate_colors(&self, weights: WeightPair) -> ApiFuture<ColorMatrix> {
        let op = ApiOp::BivariateColors;
        let body =
            self.get::<ColorMatrixBody>(op, self.weighted_url(&["bivariate_colors"], weights));
        Box::pin(async move {
            let body = body.await?;
            ColorMatrix::new(body.color_matrix).map_err(|e| ApiError::Decode {
                op,
                message: e.to_string(),
            })
        })
    }

    fn clinic_specialties(&self) -> ApiFuture<Vec<Specialty>> {
        let body = self.get::<SpecialtiesBody>(
            ApiOp::ClinicSpecialties,
            self.endpoint(&["clinic_specialties"], &[]),
        );
        Box::pin(async move { Ok(body.await?.specialties) })
    }

    fn clinics(
        &self,
        county: &str,
        specialties: &[String],
    ) -> ApiFuture<FeatureCollection<ClinicProperties>> {
        let joined = specialties.join(",");
        self.get(
            ApiOp::Clinics,
            self.endpoint(&["clinics", county], &[("specialties", joined.as_str())]),
        )
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/http.rs"]
mod tests;
