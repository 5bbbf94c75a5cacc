use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use super::EndpointCore;
use crate::client::resources::{STATS_DAY, STATS_MONTH, STATS_YEAR};
use crate::client::{Method, RequestExecutor, Transport, generate_url};
use crate::error::ConvertError;

/// Usage statistics of the account behind the API key.
#[derive(Debug, Clone)]
pub struct StatisticsEndpoint<T> {
    core: EndpointCore<T>,
}

impl<T: Transport> StatisticsEndpoint<T> {
    pub fn new(executor: Arc<RequestExecutor<T>>) -> Self {
        Self {
            core: EndpointCore::new(executor),
        }
    }

    pub async fn stats_by_day(&self, day: NaiveDate) -> Result<Value, ConvertError> {
        let day = day.format("%Y-%m-%d").to_string();
        self.get(&generate_url(STATS_DAY, &[("day", &day)], &[])).await
    }

    pub async fn stats_by_month(&self, year: i32, month: u32) -> Result<Value, ConvertError> {
        if !(1..=12).contains(&month) {
            return Err(ConvertError::InvalidArgument(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        let month = format!("{year:04}-{month:02}");
        self.get(&generate_url(STATS_MONTH, &[("month", &month)], &[])).await
    }

    pub async fn stats_by_year(&self, year: i32) -> Result<Value, ConvertError> {
        let year = format!("{year:04}");
        self.get(&generate_url(STATS_YEAR, &[("year", &year)], &[])).await
    }

    async fn get(&self, url: &str) -> Result<Value, ConvertError> {
        self.core.call(Method::Get, url, None, None).await
    }
}
