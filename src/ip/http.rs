use std::net::Ipv4Addr;
use std::time::Duration;

use snafu::ResultExt;

use crate::common::{
    DecodeSnafu, Error, InvalidIpSnafu, IpResolutionSnafu, IpSource, IpStatusSnafu, RequestSnafu,
    Result,
};

use super::retry::{Attempt, RetryError, RetryPolicy};

pub const IP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Asks an IP echo service which address our requests come from.
pub struct HttpIpSource {
    agent: ureq::Agent,
    url: url::Url,
    policy: RetryPolicy,
}

impl HttpIpSource {
    pub fn new(url: url::Url) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(IP_REQUEST_TIMEOUT)
                .build(),
            url,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn fetch_once(&self, attempt: u32) -> std::result::Result<Ipv4Addr, Attempt<Error>> {
        tracing::debug!(
            url = self.url.as_str(),
            method = "GET",
            attempt,
            "Querying public IP"
        );
        classify(self.url.as_str(), self.agent.get(self.url.as_str()).call())
    }
}

impl IpSource for HttpIpSource {
    fn current_ip(&self) -> Result<Ipv4Addr> {
        match self.policy.run(|attempt| self.fetch_once(attempt)) {
            Ok(ip) => {
                tracing::debug!(ip = %ip, "Resolved public IP");
                Ok(ip)
            }
            Err(RetryError::Aborted(err)) => Err(err),
            Err(RetryError::Exhausted { attempts, last }) => {
                Err(last).context(IpResolutionSnafu { attempts })
            }
        }
    }
}

/// Decide whether a response is usable, fatal or worth another try.
///
/// HTTP errors mean the service is refusing us and a garbage body means it
/// answered with something we can't use; neither improves on retry.
fn classify(
    url: &str,
    response: std::result::Result<ureq::Response, ureq::Error>,
) -> std::result::Result<Ipv4Addr, Attempt<Error>> {
    let body = match response {
        Ok(resp) => resp
            .into_string()
            .context(DecodeSnafu { url })
            .map_err(Attempt::Retry)?,
        Err(ureq::Error::Status(status, _)) => {
            return Err(Attempt::Abort(IpStatusSnafu { url, status }.build()))
        }
        Err(err) => {
            return Err(err)
                .context(RequestSnafu { url, method: "GET" })
                .map_err(Attempt::Retry)
        }
    };

    parse_ip(&body).map_err(Attempt::Abort)
}

/// Parse a strict IPv4 dotted quad, ignoring surrounding whitespace.
pub fn parse_ip(body: &str) -> Result<Ipv4Addr> {
    let body = body.trim();
    body.parse::<Ipv4Addr>().context(InvalidIpSnafu { body })
}

/// An address given up front, e.g. on the command line.
pub struct StaticIpSource(pub Ipv4Addr);

impl IpSource for StaticIpSource {
    fn current_ip(&self) -> Result<Ipv4Addr> {
        Ok(self.0)
    }
}
