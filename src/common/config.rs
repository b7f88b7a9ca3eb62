use super::{ConfigSnafu, Result};

/// If the value begins with an '@', read the token from the file path
/// that follows it, otherwise returns the value.
///
/// prefix is used to provide context in case of an error.
pub(crate) fn key_file_or_string(value: String, prefix: &str) -> Result<String> {
    let key: String = match value.strip_prefix('@') {
        Some(key_file) => std::fs::read_to_string(key_file)
            .map_err(|err| {
                ConfigSnafu {
                    message: format!("Failed to read key from {key_file}: {err}"),
                    prefix,
                }
                .build()
            })?
            .trim()
            .into(),
        None => value.trim().into(),
    };

    if key.is_empty() {
        return ConfigSnafu {
            message: "must not be empty",
            prefix,
        }
        .fail();
    }

    Ok(key)
}
