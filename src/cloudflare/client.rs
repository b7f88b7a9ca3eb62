use std::time::Duration;

use serde::de::DeserializeOwned;
use snafu::{OptionExt, ResultExt};

use crate::common::{
    ApiSnafu, ConfigSnafu, DecodeSnafu, DnsProvider, DnsRecord, Error, RecordUpdate,
    RequestSnafu, ResponseSnafu, Result, UpdateOutcome, ZoneNotFoundSnafu,
};
use crate::Config;

use super::models::{process_errors, select_zone, ListResponse, WriteResponse, Zone};

pub const PROVIDER_NAME: &str = "Cloudflare";

pub const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Cloudflare {
    agent: ureq::Agent,
    api_url: url::Url,
    headers: [(&'static str, String); 2],
    dry_run: bool,
}

impl Cloudflare {
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_url.cannot_be_a_base() {
            return ConfigSnafu {
                message: format!("{} is not a HTTP URL", config.api_url),
                prefix: "api_url",
            }
            .fail();
        }

        Ok(Self {
            agent: ureq::AgentBuilder::new()
                .timeout(API_REQUEST_TIMEOUT)
                .build(),
            api_url: config.api_url.clone(),
            headers: config.auth_headers(),
            dry_run: config.dry_run,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> url::Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn with_headers(&self, mut req: ureq::Request) -> ureq::Request {
        for (name, value) in &self.headers {
            req = req.set(name, value);
        }
        req
    }

    /// Send a request, turning non-2xx answers into [`Error::ApiError`]
    /// with whatever body the API returned.
    fn call(&self, method: &str, url: &url::Url, body: Option<&RecordUpdate>) -> Result<ureq::Response> {
        tracing::debug!(
            url = url.as_str(),
            method,
            provider = PROVIDER_NAME,
            "Sending request"
        );

        let req = self.with_headers(self.agent.request_url(method, url));
        let result = match body {
            Some(body) => req.send_json(body),
            None => req.call(),
        };

        match result {
            Ok(resp) => Ok(resp),
            Err(ureq::Error::Status(status, resp)) => ApiSnafu {
                method,
                url: url.as_str(),
                status,
                body: resp.into_string().unwrap_or_default(),
            }
            .fail(),
            Err(err) => Err(err).context(RequestSnafu {
                url: url.as_str(),
                method,
            }),
        }
    }

    fn api_get<T: DeserializeOwned>(&self, url: &url::Url) -> Result<T> {
        decode(url, self.call("GET", url, None)?)
    }
}

fn decode<T: DeserializeOwned>(url: &url::Url, resp: ureq::Response) -> Result<T> {
    resp.into_json().context(DecodeSnafu { url: url.as_str() })
}

impl DnsProvider for Cloudflare {
    fn resolve_zone(&self, name: &str) -> Result<String> {
        let mut url = self.endpoint(&["zones"]);
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("status", "active");

        let zones: Vec<Zone> = self.api_get::<ListResponse<Zone>>(&url)?.into_result("Zone")?;

        let zone = select_zone(&zones, name).context(ZoneNotFoundSnafu { zone: name })?;
        tracing::debug!(provider = PROVIDER_NAME, zone = name, zone_id = zone.id, "Resolved zone");
        Ok(zone.id.clone())
    }

    fn find_records(&self, zone_id: &str, name: &str, kind: &str) -> Result<Vec<DnsRecord>> {
        let mut url = self.endpoint(&["zones", zone_id, "dns_records"]);
        url.query_pairs_mut()
            .append_pair("name", name)
            .append_pair("type", kind);

        let records = self
            .api_get::<ListResponse<DnsRecord>>(&url)?
            .into_result("DNS record")?;

        tracing::debug!(
            provider = PROVIDER_NAME,
            name,
            kind,
            records = records.len(),
            "Read completed"
        );
        Ok(records)
    }

    fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> Result<UpdateOutcome> {
        let url = self.endpoint(&["zones", zone_id, "dns_records", record_id]);

        if self.dry_run {
            tracing::info!(
                provider = PROVIDER_NAME,
                name = update.name,
                kind = update.kind,
                content = update.content,
                record_id,
                "Dry run, not updating record"
            );
            return Ok(UpdateOutcome::DryRun);
        }

        tracing::info!(
            provider = PROVIDER_NAME,
            name = update.name,
            kind = update.kind,
            content = update.content,
            record_id,
            "Updating record"
        );

        let resp = match self.call("PUT", &url, Some(update)) {
            Ok(resp) => resp,
            Err(err) => {
                if let Error::ApiError { body, .. } = &err {
                    tracing::error!(
                        provider = PROVIDER_NAME,
                        request_body = %serde_json::to_string(update).unwrap_or_default(),
                        response_body = %body,
                        "Update rejected"
                    );
                }
                return Err(err);
            }
        };

        let resp: WriteResponse<DnsRecord> = decode(&url, resp)?;
        process_errors(resp.success, resp.errors)?;
        let record = resp.result.context(ResponseSnafu {
            message: "Update response has no result field",
        })?;

        tracing::debug!(
            provider = PROVIDER_NAME,
            name = record.name,
            kind = record.kind,
            record_id = record.id,
            "Updated record"
        );
        Ok(UpdateOutcome::Updated(record))
    }
}
