use snafu::{OptionExt, ResultExt};

use crate::common::{
    AmbiguousRecordSnafu, DnsProvider, IpSource, RecordNotFoundSnafu, RecordUpdate, Result,
    UpdateFailedSnafu, UpdateOutcome, RECORD_KIND_A,
};
use crate::Config;

use super::Outcome;

/// One pass of: look up the record, observe our address, fix the record if
/// the two disagree. Holds no state between runs.
pub struct Reconciler<'a> {
    config: &'a Config,
    provider: &'a dyn DnsProvider,
    ip_source: &'a dyn IpSource,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        config: &'a Config,
        provider: &'a dyn DnsProvider,
        ip_source: &'a dyn IpSource,
    ) -> Self {
        Self {
            config,
            provider,
            ip_source,
        }
    }

    pub fn run(&self) -> Result<Outcome> {
        let hostname = self.config.hostname.as_str();

        tracing::debug!(zone = self.config.zone, "Getting zone ID");
        let zone_id = self.provider.resolve_zone(&self.config.zone)?;

        tracing::debug!(hostname, "Getting DNS record data");
        let records = self
            .provider
            .find_records(&zone_id, hostname, RECORD_KIND_A)?;

        // Never guess between records and never create one.
        let current = match records.as_slice() {
            [] => return RecordNotFoundSnafu { name: hostname }.fail(),
            [record] => record,
            _ => {
                return AmbiguousRecordSnafu {
                    name: hostname,
                    count: records.len(),
                }
                .fail()
            }
        };
        tracing::debug!(current_ip = current.content, "Current IP");

        let ip = self.ip_source.current_ip()?.to_string();

        let record_id = self.record_id(&zone_id)?;

        if current.content == ip {
            tracing::info!(hostname, ip, "No change required");
            return Ok(Outcome::Unchanged { ip });
        }

        let old = current.content.clone();
        tracing::debug!(hostname, old, new = ip, "Updating record");

        let update = RecordUpdate::a(hostname, ip.as_str());
        match self
            .provider
            .update_record(&zone_id, &record_id, &update)
            .context(UpdateFailedSnafu {
                name: hostname,
                old: old.as_str(),
                new: ip.as_str(),
            })? {
            UpdateOutcome::Updated(record) => {
                tracing::info!(hostname, old, new = record.content, "Successful");
                Ok(Outcome::Updated { old, new: ip })
            }
            UpdateOutcome::DryRun => {
                tracing::info!(hostname, old, new = ip, "Dry run completed");
                Ok(Outcome::DryRun { old, new: ip })
            }
        }
    }

    /// Look the record up again for its identifier; the set may have
    /// changed since the first read.
    fn record_id(&self, zone_id: &str) -> Result<String> {
        let hostname = self.config.hostname.as_str();
        self.provider
            .find_records(zone_id, hostname, RECORD_KIND_A)?
            .into_iter()
            .find(|record| record.matches(hostname, RECORD_KIND_A))
            .map(|record| record.id)
            .context(RecordNotFoundSnafu { name: hostname })
    }
}
