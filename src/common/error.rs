use std::path::PathBuf;

use snafu::prelude::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Couldn't find a configuration file, looked in: {searched}"))]
    ConfigNotFound { searched: String },
    #[snafu(display("Failed to parse configuration file {}: {source}", path.display()))]
    ConfigParse {
        path: PathBuf,
        source: config::ConfigError,
    },
    #[snafu(display("{prefix}: {message}"))]
    ConfigError { message: String, prefix: String },
    #[snafu(display("{method} {url} failed: {source}"))]
    RequestError {
        url: String,
        method: String,
        source: ureq::Error,
    },
    #[snafu(display("{method} {url} returned HTTP {status}: {body}"))]
    ApiError {
        method: String,
        url: String,
        status: u16,
        body: String,
    },
    #[snafu(display("{message}"))]
    ResponseError { message: String },
    #[snafu(display("Failed to decode response from {url}: {source}"))]
    DecodeError {
        url: String,
        source: std::io::Error,
    },
    #[snafu(display("Zone ID not found for zone {zone}"))]
    ZoneNotFound { zone: String },
    #[snafu(display("No existing A record found for {name}"))]
    RecordNotFound { name: String },
    #[snafu(display("{count} A records match {name}, refusing to pick one"))]
    AmbiguousRecord { name: String, count: usize },
    #[snafu(display("IP service {url} returned HTTP {status}"))]
    IpStatus { url: String, status: u16 },
    #[snafu(display("Failed to parse this as an IPv4 address: '{body}'"))]
    InvalidIp {
        body: String,
        source: std::net::AddrParseError,
    },
    #[snafu(display("Gave up resolving the public IP after {attempts} attempts: {source}"))]
    IpResolution {
        attempts: u32,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },
    #[snafu(display("Failed to update {name}: old: {old} new: {new} - {source}"))]
    UpdateFailed {
        name: String,
        old: String,
        new: String,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },
}

impl Error {
    /// Process exit code for this failure. Configuration problems are
    /// reported separately from failed reconciliation runs.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigNotFound { .. } | Error::ConfigParse { .. } | Error::ConfigError { .. } => {
                2
            }
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
