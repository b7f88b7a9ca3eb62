use std::net::Ipv4Addr;

pub const RECORD_KIND_A: &str = "A";

/// A DNS record as stored by the provider.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DnsRecord {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    #[serde(default)]
    pub ttl: u32,
    #[serde(default)]
    pub proxied: bool,
}

impl DnsRecord {
    pub fn matches(&self, name: &str, kind: &str) -> bool {
        self.name == name && self.kind == kind
    }
}

/// New field values written to an existing record.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecordUpdate {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub ttl: u32,
    pub proxied: bool,
}

impl RecordUpdate {
    /// An unproxied A record with automatic TTL.
    pub fn a(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: RECORD_KIND_A.to_string(),
            content: content.into(),
            ttl: 1,
            proxied: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Updated(DnsRecord),
    /// Nothing was sent; the change was only logged.
    DryRun,
}

pub trait DnsProvider {
    fn resolve_zone(&self, name: &str) -> super::Result<String>;
    fn find_records(&self, zone_id: &str, name: &str, kind: &str)
        -> super::Result<Vec<DnsRecord>>;
    fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        update: &RecordUpdate,
    ) -> super::Result<UpdateOutcome>;
}

pub trait IpSource {
    fn current_ip(&self) -> super::Result<Ipv4Addr>;
}
