use serde::{Deserialize, Deserializer, Serializer};
use std::time::{SystemTime, UNIX_EPOCH};

pub fn deserialize_timestamp_millis<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    let duration = std::time::Duration::from_millis(millis);
    Ok(UNIX_EPOCH + duration)
}

pub fn serialize_timestamp_millis<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let millis = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    serializer.serialize_u64(millis)
}

/// Error codes arrive as either `404` or `"404"`; anything else is treated as missing.
pub fn deserialize_lenient_code<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(serde_json::Number),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let code = Option::<Code>::deserialize(deserializer)?;
    Ok(match code {
        Some(Code::Number(n)) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Some(Code::Text(s)) => s.trim().parse().ok(),
        Some(Code::Other(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, serde::Serialize)]
    struct TestStruct {
        #[serde(
            deserialize_with = "deserialize_timestamp_millis",
            serialize_with = "serialize_timestamp_millis"
        )]
        timestamp: SystemTime,
    }

    #[derive(Deserialize)]
    struct CodeStruct {
        #[serde(default, deserialize_with = "deserialize_lenient_code")]
        code: Option<u16>,
    }

    #[test]
    fn test_deserialize_timestamp_millis() {
        let json = r#"{"timestamp": 1640995200000}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();

        let expected_duration = std::time::Duration::from_millis(1640995200000);
        let expected_time = UNIX_EPOCH + expected_duration;

        assert_eq!(result.timestamp, expected_time);
    }

    #[test]
    fn test_timestamp_millis_round_trip_shape() {
        let json = r#"{"timestamp":1640995200123}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(serde_json::to_string(&result).unwrap(), json);
    }

    #[test]
    fn test_lenient_code() {
        let parse = |json: &str| serde_json::from_str::<CodeStruct>(json).unwrap().code;

        assert_eq!(parse(r#"{"code": 404}"#), Some(404));
        assert_eq!(parse(r#"{"code": "409"}"#), Some(409));
        assert_eq!(parse(r#"{"code": "conflict"}"#), None);
        assert_eq!(parse(r#"{"code": 99999}"#), None);
        assert_eq!(parse(r#"{"code": null}"#), None);
        assert_eq!(parse(r#"{}"#), None);
    }
}
