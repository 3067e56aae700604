//! Parse HTTP response header lines collected by the curl header callback.

use super::transport::HeadResult;

/// Parse header lines into a HeadResult.
///
/// Lines from every response in a redirect chain arrive in order; a status
/// line (`HTTP/...`) starts a new response, so only the final one is kept.
/// `remote_mtime` is left empty; the client fills it from libcurl.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut result = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(status) = parse_status_line(line) {
            result = HeadResult {
                status,
                ..HeadResult::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("content-length") {
                if let Ok(n) = value.trim().parse::<u64>() {
                    result.content_length = Some(n);
                }
            }
        }
    }

    result
}

/// `HTTP/1.1 200 OK` -> 200.
pub(crate) fn parse_status_line(line: &str) -> Option<u32> {
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
