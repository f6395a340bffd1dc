//! Ordered request parameters, path templating and query flattening.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::input_file::InputFile;

/// A single request parameter.
#[derive(Debug, Clone)]
pub enum Param {
    Value(Value),
    File(InputFile),
}

/// Insertion-ordered parameter mapping.
///
/// `Null` values are dropped on insert, so an unset optional argument is
/// never sent, not even as an empty string.
#[derive(Debug, Clone, Default)]
pub struct Params {
    entries: Vec<(String, Param)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, Param::Value(value.into()));
        self
    }

    pub fn with_file(mut self, key: impl Into<String>, file: InputFile) -> Self {
        self.insert(key, Param::File(file));
        self
    }

    /// Inserts or replaces `key`, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, param: Param) {
        let key = key.into();
        if matches!(param, Param::Value(Value::Null)) {
            self.entries.retain(|(k, _)| *k != key);
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = param,
            None => self.entries.push((key, param)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Param> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Param)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first file-valued parameter, if any.
    pub fn file(&self) -> Option<(&str, &InputFile)> {
        self.entries.iter().find_map(|(k, p)| match p {
            Param::File(f) => Some((k.as_str(), f)),
            Param::Value(_) => None,
        })
    }

    /// JSON object body. Files cannot be JSON-encoded.
    pub fn to_json(&self) -> Result<Map<String, Value>> {
        let mut map = Map::with_capacity(self.entries.len());
        for (key, param) in &self.entries {
            match param {
                Param::Value(v) => {
                    map.insert(key.clone(), v.clone());
                }
                Param::File(_) => {
                    return Err(Error::Programming(format!(
                        "file parameter `{key}` requires a multipart/form-data request"
                    )));
                }
            }
        }
        Ok(map)
    }

    /// Flattened `(key, value)` pairs for a query string or form fields.
    pub fn to_pairs(&self) -> Result<Vec<(String, String)>> {
        let mut out = Vec::new();
        for (key, param) in &self.entries {
            match param {
                Param::Value(v) => flatten_into(key, v, &mut out),
                Param::File(_) => {
                    return Err(Error::Programming(format!(
                        "file parameter `{key}` cannot be sent as a query string"
                    )));
                }
            }
        }
        Ok(out)
    }
}

/// Arrays become repeated `key[]` entries, objects `key[field]`.
pub fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((prefix.to_string(), b.to_string())),
        Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        Value::Array(items) => {
            let key = format!("{prefix}[]");
            for item in items {
                flatten_into(&key, item, out);
            }
        }
        Value::Object(map) => {
            for (field, v) in map {
                flatten_into(&format!("{prefix}[{field}]"), v, out);
            }
        }
    }
}

/// Substitutes every `{name}` in `template` with its percent-encoded value.
pub fn render_path(template: &str, path_params: &[(String, String)]) -> Result<String> {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            Error::Programming(format!("unterminated placeholder in path `{template}`"))
        })?;
        let name = &after[..close];
        let value = path_params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .ok_or_else(|| {
                Error::Programming(format!("missing path parameter `{name}` for `{template}`"))
            })?;
        rendered.push_str(&urlencoding::encode(value));
        rest = &after[close + 1..];
    }
    rendered.push_str(rest);

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pp(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_path_substitutes_and_encodes() {
        let path = render_path(
            "/storage/buckets/{bucketId}/files/{fileId}",
            &pp(&[("bucketId", "photos"), ("fileId", "a b/c?d")]),
        )
        .unwrap();
        assert_eq!(path, "/storage/buckets/photos/files/a%20b%2Fc%3Fd");
        assert!(!path.contains('{'));
    }

    #[test]
    fn render_path_rejects_missing_parameter() {
        let err = render_path("/avatars/flags/{code}", &[]).unwrap_err();
        assert!(matches!(err, Error::Programming(msg) if msg.contains("code")));
    }

    #[test]
    fn render_path_rejects_unterminated_placeholder() {
        let err = render_path("/avatars/flags/{code", &pp(&[("code", "fr")])).unwrap_err();
        assert!(matches!(err, Error::Programming(_)));
    }

    #[test]
    fn render_path_without_placeholders_is_unchanged() {
        assert_eq!(render_path("/health/db", &[]).unwrap(), "/health/db");
    }

    #[test]
    fn arrays_become_repeated_bracket_keys_in_order() {
        let params = Params::new()
            .with("queries", vec!["b", "a", "c"])
            .with("limit", 5);
        assert_eq!(
            params.to_pairs().unwrap(),
            pp(&[
                ("queries[]", "b"),
                ("queries[]", "a"),
                ("queries[]", "c"),
                ("limit", "5"),
            ])
        );
    }

    #[test]
    fn nested_objects_use_bracket_notation() {
        let params = Params::new().with("filter", json!({"size": {"max": 10}, "tags": ["x"]}));
        assert_eq!(
            params.to_pairs().unwrap(),
            pp(&[("filter[size][max]", "10"), ("filter[tags][]", "x")])
        );
    }

    #[test]
    fn null_values_are_never_sent() {
        let params = Params::new()
            .with("name", Option::<String>::None)
            .with("width", Some(100));
        assert_eq!(params.len(), 1);
        assert_eq!(params.to_pairs().unwrap(), pp(&[("width", "100")]));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut params = Params::new().with("a", 1).with("b", 2);
        params.insert("a", Param::Value(json!(3)));
        let keys: Vec<_> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(params.to_json().unwrap()["a"], 3);
    }

    #[test]
    fn json_body_round_trips() {
        let params = Params::new()
            .with("name", "photos")
            .with("enabled", true)
            .with("permissions", vec!["read(\"any\")"]);
        let body = serde_json::to_string(&params.to_json().unwrap()).unwrap();
        let decoded: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            decoded,
            json!({"name": "photos", "enabled": true, "permissions": ["read(\"any\")"]})
        );
    }

    #[test]
    fn files_are_rejected_outside_multipart() {
        let params = Params::new().with_file("file", InputFile::from_bytes("a.txt", b"hi".to_vec()));
        assert!(params.to_json().is_err());
        assert!(params.to_pairs().is_err());
        assert_eq!(params.file().map(|(k, _)| k), Some("file"));
    }
}
