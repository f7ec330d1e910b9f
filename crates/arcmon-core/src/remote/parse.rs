//! Parse the checksum body and HTTP dates.

use chrono::{DateTime, Utc};

use super::CheckError;

/// First token of a `<checksum> <filename>` body. Fewer than two
/// whitespace-separated tokens is malformed.
pub fn parse_checksum(body: &str) -> Result<String, CheckError> {
    let mut tokens = body.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(checksum), Some(_filename)) => Ok(checksum.to_string()),
        _ => Err(CheckError::MalformedChecksum {
            body: body.trim().to_string(),
        }),
    }
}

/// Parse an HTTP date (`Wed, 21 Oct 2015 07:28:00 GMT`).
///
/// Lenient: anything RFC 2822 allows is accepted, so a missing weekday,
/// numeric offsets (`+0200`) and obsolete zone names (`EST`) parse too and
/// are normalized to UTC.
pub fn parse_last_modified(value: &str) -> Result<DateTime<Utc>, CheckError> {
    DateTime::parse_from_rfc2822(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| CheckError::InvalidLastModified {
            value: value.to_string(),
            source,
        })
}

/// Format a timestamp the way HTTP dates are written.
pub fn format_http_date(ts: &DateTime<Utc>) -> String {
    ts.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn checksum_first_token() {
        let body = "5d41402abc4b2a76b9719d911017c592  d3d9.dll\n";
        assert_eq!(
            parse_checksum(body).unwrap(),
            "5d41402abc4b2a76b9719d911017c592"
        );
    }

    #[test]
    fn checksum_single_space_and_trailing_tokens() {
        assert_eq!(parse_checksum("abc123 d3d9.dll extra").unwrap(), "abc123");
    }

    #[test]
    fn checksum_single_token_is_malformed() {
        let err = parse_checksum("abc123\n").unwrap_err();
        match err {
            CheckError::MalformedChecksum { body } => assert_eq!(body, "abc123"),
            other => panic!("expected MalformedChecksum, got {:?}", other),
        }
    }

    #[test]
    fn checksum_empty_is_malformed() {
        assert!(matches!(
            parse_checksum("   \n"),
            Err(CheckError::MalformedChecksum { .. })
        ));
    }

    #[test]
    fn last_modified_rfc1123() {
        let ts = parse_last_modified("Wed, 21 Oct 2015 07:28:00 GMT").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap());
    }

    #[test]
    fn last_modified_accepts_rfc2822_variants() {
        let expected = Utc.with_ymd_and_hms(2015, 10, 21, 7, 28, 0).unwrap();
        assert_eq!(parse_last_modified("21 Oct 2015 07:28:00 GMT").unwrap(), expected);
        assert_eq!(parse_last_modified("Wed, 21 Oct 2015 09:28:00 +0200").unwrap(), expected);
        assert_eq!(parse_last_modified("  Wed, 21 Oct 2015 07:28:00 GMT\r\n").unwrap(), expected);
    }

    #[test]
    fn last_modified_garbage_is_rejected() {
        match parse_last_modified("yesterday") {
            Err(CheckError::InvalidLastModified { value, .. }) => assert_eq!(value, "yesterday"),
            other => panic!("expected InvalidLastModified, got {:?}", other),
        }
    }

    #[test]
    fn http_date_format_matches_parse() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 18, 4, 9).unwrap();
        let s = format_http_date(&ts);
        assert_eq!(s, "Tue, 05 Mar 2024 18:04:09 GMT");
        assert_eq!(parse_last_modified(&s).unwrap(), ts);
    }
}
