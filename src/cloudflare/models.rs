use crate::common::{ResponseSnafu, Result};
use snafu::OptionExt;

#[derive(serde::Deserialize)]
pub(super) struct APIError {
    pub code: usize,
    pub message: String,
}

/// Envelope for collection endpoints. `result` is optional so that a body
/// without it is reported as such rather than as a decode failure.
#[derive(serde::Deserialize)]
pub(super) struct ListResponse<T> {
    pub success: bool,
    pub result: Option<Vec<T>>,
    #[serde(default)]
    pub errors: Vec<APIError>,
}

impl<T> ListResponse<T> {
    pub fn into_result(self, what: &str) -> Result<Vec<T>> {
        process_errors(self.success, self.errors)?;
        self.result.context(ResponseSnafu {
            message: format!("{what} response has no result field"),
        })
    }
}

#[derive(serde::Deserialize)]
pub(super) struct WriteResponse<T> {
    pub success: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<APIError>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub(super) struct Zone {
    pub name: String,
    pub id: String,
}

pub(super) fn process_errors(success: bool, errors: Vec<APIError>) -> Result<()> {
    if !success || !errors.is_empty() {
        let mut err_msg: String = String::new();
        for err in errors {
            err_msg.push_str(&format!("{} {}; ", err.code, err.message));
        }
        return ResponseSnafu {
            message: format!("Request unsuccessful: {err_msg}"),
        }
        .fail();
    }
    Ok(())
}

/// Exact, case-sensitive match on the zone name.
pub(super) fn select_zone<'a>(zones: &'a [Zone], name: &str) -> Option<&'a Zone> {
    zones.iter().find(|zone| zone.name == name)
}
