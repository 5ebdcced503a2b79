use std::time::Duration;

use serde::Deserialize;

use crate::{
    config::Config,
    error::{AppError, Result},
};

pub const PLACEHOLDER_COMPARABLE: &str = "Comparable apps search coming soon";

const MAX_COMPARABLES: usize = 5;

/// Looks up similar existing products for a new idea.
#[derive(Debug, Clone)]
pub enum ComparablesService {
    /// Static placeholder used when no search backend is configured.
    Placeholder,
    Http { client: reqwest::Client, url: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ComparablesPayload {
    List(Vec<String>),
    Wrapped { comparables: Vec<String> },
}

impl ComparablesService {
    pub fn from_config(config: &Config) -> Result<Self> {
        let Some(url) = config.comparables_url.clone() else {
            return Ok(Self::Placeholder);
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.comparables_timeout_ms))
            .build()?;

        Ok(Self::Http { client, url })
    }

    pub async fn lookup(&self, text: &str) -> Result<Vec<String>> {
        match self {
            Self::Placeholder => Ok(vec![PLACEHOLDER_COMPARABLE.to_string()]),
            Self::Http { client, url } => {
                let response = client.get(url).query(&[("q", text)]).send().await?;

                if !response.status().is_success() {
                    return Err(AppError::Internal(format!(
                        "Comparables service returned {}",
                        response.status()
                    )));
                }

                let payload: ComparablesPayload = response.json().await?;
                let comparables = match payload {
                    ComparablesPayload::List(list) => list,
                    ComparablesPayload::Wrapped { comparables } => comparables,
                };

                Ok(comparables
                    .into_iter()
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .take(MAX_COMPARABLES)
                    .collect())
            }
        }
    }

    /// Like `lookup`, but a failed lookup yields an empty list so that
    /// posting an idea never depends on the search backend.
    pub async fn lookup_or_empty(&self, text: &str) -> Vec<String> {
        match self.lookup(text).await {
            Ok(comparables) => comparables,
            Err(e) => {
                tracing::warn!("Comparables lookup failed: {}", e);
                Vec::new()
            }
        }
    }
}
