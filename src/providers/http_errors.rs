use anyhow::anyhow;
use std::error::Error as StdError;
use std::io::ErrorKind;

fn error_chain_matches(err: &(dyn StdError + 'static), kind: ErrorKind, needle: &str) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == kind
        {
            return true;
        }

        if source.to_string().to_ascii_lowercase().contains(needle) {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::ConnectionRefused, "connection refused")
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    error_chain_matches(err, ErrorKind::TimedOut, "timed out")
}

/// Turns a transport failure into a message naming the endpoint and the
/// setting most likely to fix it.
pub(crate) fn api_request_error(
    err: reqwest::Error,
    api_url: &str,
    timeout_secs: Option<u64>,
) -> anyhow::Error {
    if err.is_timeout() || error_chain_has_timeout(&err) {
        return match timeout_secs {
            Some(secs) => anyhow!(
                "Request timed out after {}s while calling '{}'. \
                 Increase OPENAI_TIMEOUT_SECS or try again later.",
                secs,
                api_url
            ),
            None => anyhow!("Request timed out while calling '{}'.", api_url),
        };
    }

    if err.is_connect() {
        if error_chain_has_connection_refused(&err) {
            return anyhow!(
                "Connection refused by API at '{}'. Check that OPENAI_BASE_URL is correct.",
                api_url
            );
        }

        return anyhow!(
            "Failed to connect to API at '{}'. Check OPENAI_BASE_URL and network connectivity.",
            api_url
        );
    }

    anyhow!("Failed to call API at '{}': {}", api_url, err)
}
