use anyhow::Context;
use itemgate_core::RawBody;

/// JSON when the content type says so, or when there is none and the body looks like JSON.
/// Everything else is read as URL-encoded form pairs.
pub fn parse_body(content_type: Option<&str>, bytes: &[u8]) -> anyhow::Result<RawBody> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RawBody::Empty);
    }

    let is_json = match content_type.map(media_type) {
        Some(media_type) => media_type == "application/json" || media_type.ends_with("+json"),
        None => matches!(
            bytes.iter().copied().find(|byte| !byte.is_ascii_whitespace()),
            Some(b'{') | Some(b'[')
        ),
    };

    if is_json {
        let value = serde_json::from_slice(bytes).context("request body is not valid JSON")?;
        return Ok(RawBody::Json(value));
    }

    Ok(RawBody::Form(
        url::form_urlencoded::parse(bytes).into_owned().collect(),
    ))
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_blank_bodies_are_empty() {
        assert_eq!(parse_body(None, b"").unwrap(), RawBody::Empty);
        assert_eq!(
            parse_body(Some("application/json"), b" \n").unwrap(),
            RawBody::Empty
        );
    }

    #[test]
    fn test_json_by_content_type() {
        let body = parse_body(
            Some("application/json; charset=utf-8"),
            br#"{"id":"t-1","done":true}"#,
        )
        .unwrap();

        assert_eq!(body, RawBody::Json(json!({ "id": "t-1", "done": true })));
    }

    #[test]
    fn test_json_is_sniffed_without_content_type() {
        let body = parse_body(None, br#"  [{"id":"t-1"}]"#).unwrap();

        assert_eq!(body, RawBody::Json(json!([{ "id": "t-1" }])));
    }

    #[test]
    fn test_form_keeps_repeated_keys_in_order() {
        let body = parse_body(
            Some("application/x-www-form-urlencoded"),
            b"isBulk=true&name=first+ticket&name=second%21",
        )
        .unwrap();

        assert_eq!(
            body,
            RawBody::Form(vec![
                ("isBulk".to_owned(), "true".to_owned()),
                ("name".to_owned(), "first ticket".to_owned()),
                ("name".to_owned(), "second!".to_owned()),
            ])
        );
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = parse_body(Some("application/json"), b"{\"id\":").unwrap_err();

        assert!(format!("{:#}", err).starts_with("request body is not valid JSON"));
    }
}
