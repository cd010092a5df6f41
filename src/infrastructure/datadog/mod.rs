use std::sync::Arc;

use anyhow::Result;
use dogstatsd::{Client, OptionsBuilder};

use crate::{config::DatadogConfig, constants::Gamemode};

/// Statsd client with the mode tag baked in. Emission failures are ignored;
/// metrics are best-effort.
#[derive(Clone)]
pub struct Metrics {
    client: Arc<Client>,
    mode_tag: String,
}

impl Metrics {
    pub fn new(config: &DatadogConfig, mode: Gamemode) -> Result<Self> {
        let datadog_url = format!("{}:{}", config.host, config.port);

        let options = OptionsBuilder::new()
            .to_addr(datadog_url)
            .namespace(config.namespace.clone())
            .build();

        Ok(Self {
            client: Arc::new(Client::new(options)?),
            mode_tag: format!("mode:{}", mode.tag()),
        })
    }

    pub fn increment(&self, stat: &str) {
        let _ = self.client.incr(stat, [self.mode_tag.as_str()]);
    }

    pub fn count(&self, stat: &str, count: i64) {
        let _ = self.client.count(stat, count, [self.mode_tag.as_str()]);
    }

    pub fn gauge(&self, stat: &str, value: f64) {
        let _ = self
            .client
            .gauge(stat, value.to_string(), [self.mode_tag.as_str()]);
    }

    pub fn gauge_tagged(&self, stat: &str, value: f64, extra_tag: &str) {
        let _ = self.client.gauge(
            stat,
            value.to_string(),
            [self.mode_tag.as_str(), extra_tag],
        );
    }
}
