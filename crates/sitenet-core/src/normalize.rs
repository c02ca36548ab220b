//! Field normalizers for free-form gateway input.
//!
//! Every normalizer fails soft: it returns a [`FieldError`] instead of
//! panicking, so the caller can reject the single field (or device entry)
//! and carry on with the rest of the batch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::FieldError;
use crate::model::{DeviceStatus, DeviceType, MacAddress};

/// Canonicalize a MAC address to `aa:bb:cc:dd:ee:ff`.
///
/// All non-hex characters are discarded; exactly twelve hex digits must
/// remain.
pub fn normalize_mac(raw: &str) -> Result<MacAddress, FieldError> {
    MacAddress::parse(raw)
}

/// Validate a dotted-quad IPv4 address.
///
/// Returns the trimmed input unchanged on success. Each of the four
/// segments must be one to three ASCII digits with a value of at most 255.
pub fn normalize_ip(raw: &str) -> Result<String, FieldError> {
    let trimmed = raw.trim();
    let segments: Vec<&str> = trimmed.split('.').collect();
    if segments.len() != 4 {
        return Err(FieldError::Ip);
    }

    for segment in segments {
        if segment.is_empty() || segment.len() > 3 || !segment.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(FieldError::Ip);
        }
        match segment.parse::<u16>() {
            Ok(value) if value <= 255 => {}
            _ => return Err(FieldError::Ip),
        }
    }

    Ok(trimmed.to_owned())
}

/// Map a free-text device type onto one of the four gateway-reportable
/// kinds. Unknown tokens are rejected rather than guessed.
pub fn normalize_type(raw: &str) -> Result<DeviceType, FieldError> {
    let key: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect();

    match key.as_str() {
        "camera" | "cam" | "ipc" | "ipcam" | "ipcamera" | "dome" | "bullet" | "ptz"
        | "摄像机" | "摄像头" => Ok(DeviceType::Camera),
        "nvr" | "dvr" | "recorder" | "networkvideorecorder" | "录像机" | "硬盘录像机" => {
            Ok(DeviceType::Nvr)
        }
        "bridge" | "wirelessbridge" | "wifibridge" | "cpe" | "网桥" | "无线网桥" => {
            Ok(DeviceType::Bridge)
        }
        "switch" | "sw" | "poeswitch" | "networkswitch" | "交换机" => Ok(DeviceType::Switch),
        _ => Err(FieldError::DeviceType),
    }
}

/// Parse an ISO-8601-ish timestamp.
///
/// Accepts RFC 3339 with an offset, naive date-times (with `T` or a space
/// separator, assumed UTC), and bare dates (midnight UTC).
pub fn normalize_timestamp(raw: &str) -> Result<DateTime<Utc>, FieldError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Timestamp);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or(FieldError::Timestamp)
}

/// Trim optional free text, mapping blank values to `None`.
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Split a gateway status list into the primary status and the remaining
/// diagnostic tags.
///
/// The first entry is matched case-insensitively against the canonical
/// statuses (anything else, or no entry at all, is `Unknown`). The rest are
/// lower-cased and kept in order; blank tags are dropped.
pub fn split_statuses(statuses: &[String]) -> (DeviceStatus, Vec<String>) {
    let Some((first, rest)) = statuses.split_first() else {
        return (DeviceStatus::Unknown, Vec::new());
    };

    let primary = first.trim().parse().unwrap_or(DeviceStatus::Unknown);
    let extra = rest
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    (primary, extra)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn mac_delimiters_and_case_collapse_to_one_form() {
        let expected = "00:1a:2b:3c:4d:5e";
        for raw in [
            "00:1A:2B:3C:4D:5E",
            "00-1a-2b-3c-4d-5e",
            "001A.2B3C.4D5E",
            "001a2b3c4d5e",
            " 00 1A 2B 3C 4D 5E ",
        ] {
            assert_eq!(normalize_mac(raw).unwrap().as_str(), expected, "input {raw:?}");
        }
    }

    #[test]
    fn mac_with_wrong_digit_count_is_rejected() {
        for raw in ["00:1A:2B:3C:4D", "00:1A:2B:3C:4D:5E:6F", "", "gateway"] {
            assert_eq!(normalize_mac(raw), Err(FieldError::Mac), "input {raw:?}");
        }
    }

    #[test]
    fn ip_returns_trimmed_original() {
        assert_eq!(normalize_ip(" 192.168.1.20 ").unwrap(), "192.168.1.20");
        assert_eq!(normalize_ip("010.0.0.1").unwrap(), "010.0.0.1");
        assert_eq!(normalize_ip("255.255.255.255").unwrap(), "255.255.255.255");
    }

    #[test]
    fn ip_out_of_range_or_malformed_is_rejected() {
        for raw in [
            "256.1.1.1",
            "1.2.3",
            "1.2.3.4.5",
            "1..3.4",
            "1.2.3.0004",
            "a.b.c.d",
            "+1.2.3.4",
            "",
        ] {
            assert_eq!(normalize_ip(raw), Err(FieldError::Ip), "input {raw:?}");
        }
    }

    #[test]
    fn type_synonyms_resolve() {
        assert_eq!(normalize_type("camera").unwrap(), DeviceType::Camera);
        assert_eq!(normalize_type("IP-Camera").unwrap(), DeviceType::Camera);
        assert_eq!(normalize_type("NVR").unwrap(), DeviceType::Nvr);
        assert_eq!(normalize_type("Wireless Bridge").unwrap(), DeviceType::Bridge);
        assert_eq!(normalize_type("POE_SWITCH").unwrap(), DeviceType::Switch);
        assert_eq!(normalize_type("交换机").unwrap(), DeviceType::Switch);
    }

    #[test]
    fn unknown_type_fails_closed() {
        assert_eq!(normalize_type("printer"), Err(FieldError::DeviceType));
        assert_eq!(normalize_type(""), Err(FieldError::DeviceType));
    }

    #[test]
    fn timestamps_in_common_shapes_parse() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap();
        assert_eq!(normalize_timestamp("2026-03-01T08:30:00Z").unwrap(), expected);
        assert_eq!(
            normalize_timestamp("2026-03-01T16:30:00+08:00").unwrap(),
            expected
        );
        assert_eq!(normalize_timestamp("2026-03-01 08:30:00").unwrap(), expected);
        assert_eq!(normalize_timestamp("2026-03-01T08:30").unwrap(), expected);
        assert_eq!(
            normalize_timestamp("2026-03-01").unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn garbage_timestamp_is_rejected() {
        assert_eq!(normalize_timestamp("yesterday"), Err(FieldError::Timestamp));
        assert_eq!(normalize_timestamp("  "), Err(FieldError::Timestamp));
    }

    #[test]
    fn blank_text_becomes_none() {
        assert_eq!(normalize_text(Some("  ")), None);
        assert_eq!(normalize_text(Some(" Gate A ")), Some("Gate A".into()));
        assert_eq!(normalize_text(None), None);
    }

    #[test]
    fn statuses_split_into_primary_and_extras() {
        let (primary, extra) =
            split_statuses(&["Online".into(), "Signal-Weak".into(), " ".into()]);
        assert_eq!(primary, DeviceStatus::Online);
        assert_eq!(extra, vec!["signal-weak".to_owned()]);

        let (primary, extra) = split_statuses(&["rebooting".into(), "fw-update".into()]);
        assert_eq!(primary, DeviceStatus::Unknown);
        assert_eq!(extra, vec!["fw-update".to_owned()]);

        assert_eq!(split_statuses(&[]), (DeviceStatus::Unknown, Vec::new()));
    }
}
