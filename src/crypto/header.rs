//! Parameterized signature header parsing.
//!
//! Format: `keyid="...", algorithm="ed25519", signature="<base64>", headers="..."`

use std::collections::HashMap;

/// Parse a `key1="value1", key2="value2"` header into a name → value map.
///
/// Returns `None` for an absent header. Parameters are separated by commas
/// outside quoted values; each parameter is split on its first `=`, names
/// are lowercased and surrounding quotes are stripped from values.
/// Parameters without an `=` are skipped.
pub fn parse_header_params(header: Option<&str>) -> Option<HashMap<String, String>> {
    let header = header?;
    let mut params = HashMap::new();

    for part in split_unquoted_commas(header) {
        let part = part.trim();
        let Some((name, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(value);
        params.insert(name.trim().to_lowercase(), value.to_string());
    }

    Some(params)
}

fn split_unquoted_commas(header: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in header.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&header[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&header[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_pairs() {
        let params = parse_header_params(Some(r#"key1="a", key2="b,c""#)).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params["key1"], "a");
        assert_eq!(params["key2"], "b,c");
    }

    #[test]
    fn test_parse_absent_header() {
        assert!(parse_header_params(None).is_none());
    }

    #[test]
    fn test_parse_keygen_header() {
        let header = r#"keyid="test-id", algorithm="ed25519", signature="dGVzdA==", headers="(request-target) host date digest""#;
        let params = parse_header_params(Some(header)).unwrap();

        assert_eq!(params["keyid"], "test-id");
        assert_eq!(params["algorithm"], "ed25519");
        // Only the first '=' splits, so base64 padding survives.
        assert_eq!(params["signature"], "dGVzdA==");
        assert_eq!(params["headers"], "(request-target) host date digest");
    }

    #[test]
    fn test_parse_no_whitespace_and_unquoted() {
        let params = parse_header_params(Some(r#"a=1,b="two""#)).unwrap();
        assert_eq!(params["a"], "1");
        assert_eq!(params["b"], "two");
    }

    #[test]
    fn test_parse_lowercases_names() {
        let params = parse_header_params(Some(r#"Signature="abc""#)).unwrap();
        assert_eq!(params["signature"], "abc");
    }

    #[test]
    fn test_parse_skips_bare_tokens() {
        let params = parse_header_params(Some(r#"garbage, signature="abc""#)).unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params["signature"], "abc");
    }

    #[test]
    fn test_parse_empty_header() {
        let params = parse_header_params(Some("")).unwrap();
        assert!(params.is_empty());
    }
}
