//! Builders for ids, permission strings and query strings.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::upload::UNIQUE_ID;

pub struct Id;

impl Id {
    /// A client-generated id: hex timestamp followed by random hex padding.
    pub fn unique() -> String {
        Self::unique_with_padding(7)
    }

    pub fn unique_with_padding(padding: usize) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let mut id = format!("{:x}{:05x}", now.as_secs(), now.subsec_millis());
        let mut remaining = padding;
        while remaining > 0 {
            let random = Uuid::new_v4().simple().to_string();
            let take = remaining.min(random.len());
            id.push_str(&random[..take]);
            remaining -= take;
        }
        id
    }

    /// Ask the server to generate the id.
    pub fn server() -> String {
        UNIQUE_ID.to_string()
    }

    pub fn custom(id: impl Into<String>) -> String {
        id.into()
    }
}

pub struct Permission;

impl Permission {
    pub fn read(role: impl AsRef<str>) -> String {
        format!("read(\"{}\")", role.as_ref())
    }

    pub fn write(role: impl AsRef<str>) -> String {
        format!("write(\"{}\")", role.as_ref())
    }

    pub fn create(role: impl AsRef<str>) -> String {
        format!("create(\"{}\")", role.as_ref())
    }

    pub fn update(role: impl AsRef<str>) -> String {
        format!("update(\"{}\")", role.as_ref())
    }

    pub fn delete(role: impl AsRef<str>) -> String {
        format!("delete(\"{}\")", role.as_ref())
    }
}

pub struct Role;

impl Role {
    pub fn any() -> String {
        "any".to_string()
    }

    pub fn user(id: &str, status: Option<&str>) -> String {
        match status {
            Some(status) => format!("user:{id}/{status}"),
            None => format!("user:{id}"),
        }
    }

    pub fn users(status: Option<&str>) -> String {
        match status {
            Some(status) => format!("users/{status}"),
            None => "users".to_string(),
        }
    }

    pub fn guests() -> String {
        "guests".to_string()
    }

    pub fn team(id: &str, role: Option<&str>) -> String {
        match role {
            Some(role) => format!("team:{id}/{role}"),
            None => format!("team:{id}"),
        }
    }

    pub fn member(id: &str) -> String {
        format!("member:{id}")
    }

    pub fn label(name: &str) -> String {
        format!("label:{name}")
    }
}

#[derive(Serialize)]
struct QueryBody<'a> {
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attribute: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<Vec<Value>>,
}

/// Query strings accepted by list endpoints, serialized as JSON.
pub struct Query;

impl Query {
    fn build(method: &str, attribute: Option<&str>, values: Option<Vec<Value>>) -> String {
        let body = QueryBody {
            method,
            attribute,
            values,
        };
        serde_json::to_string(&body).unwrap_or_default()
    }

    fn values(value: impl Into<Value>) -> Vec<Value> {
        match value.into() {
            Value::Array(items) => items,
            other => vec![other],
        }
    }

    pub fn equal(attribute: &str, value: impl Into<Value>) -> String {
        Self::build("equal", Some(attribute), Some(Self::values(value)))
    }

    pub fn not_equal(attribute: &str, value: impl Into<Value>) -> String {
        Self::build("notEqual", Some(attribute), Some(Self::values(value)))
    }

    pub fn less_than(attribute: &str, value: impl Into<Value>) -> String {
        Self::build("lessThan", Some(attribute), Some(Self::values(value)))
    }

    pub fn less_than_equal(attribute: &str, value: impl Into<Value>) -> String {
        Self::build("lessThanEqual", Some(attribute), Some(Self::values(value)))
    }

    pub fn greater_than(attribute: &str, value: impl Into<Value>) -> String {
        Self::build("greaterThan", Some(attribute), Some(Self::values(value)))
    }

    pub fn greater_than_equal(attribute: &str, value: impl Into<Value>) -> String {
        Self::build("greaterThanEqual", Some(attribute), Some(Self::values(value)))
    }

    pub fn search(attribute: &str, value: &str) -> String {
        Self::build("search", Some(attribute), Some(vec![Value::from(value)]))
    }

    pub fn is_null(attribute: &str) -> String {
        Self::build("isNull", Some(attribute), None)
    }

    pub fn is_not_null(attribute: &str) -> String {
        Self::build("isNotNull", Some(attribute), None)
    }

    pub fn between(attribute: &str, start: impl Into<Value>, end: impl Into<Value>) -> String {
        Self::build("between", Some(attribute), Some(vec![start.into(), end.into()]))
    }

    pub fn starts_with(attribute: &str, value: &str) -> String {
        Self::build("startsWith", Some(attribute), Some(vec![Value::from(value)]))
    }

    pub fn ends_with(attribute: &str, value: &str) -> String {
        Self::build("endsWith", Some(attribute), Some(vec![Value::from(value)]))
    }

    pub fn select(attributes: &[&str]) -> String {
        let values = attributes.iter().map(|a| Value::from(*a)).collect();
        Self::build("select", None, Some(values))
    }

    pub fn order_asc(attribute: &str) -> String {
        Self::build("orderAsc", Some(attribute), None)
    }

    pub fn order_desc(attribute: &str) -> String {
        Self::build("orderDesc", Some(attribute), None)
    }

    pub fn cursor_after(document_id: &str) -> String {
        Self::build("cursorAfter", None, Some(vec![Value::from(document_id)]))
    }

    pub fn cursor_before(document_id: &str) -> String {
        Self::build("cursorBefore", None, Some(vec![Value::from(document_id)]))
    }

    pub fn limit(limit: u32) -> String {
        Self::build("limit", None, Some(vec![Value::from(limit)]))
    }

    pub fn offset(offset: u32) -> String {
        Self::build("offset", None, Some(vec![Value::from(offset)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_ids_are_hex_and_distinct() {
        let a = Id::unique();
        let b = Id::unique();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(a.len() <= 36);
    }

    #[test]
    fn permissions_wrap_roles() {
        assert_eq!(Permission::read(Role::any()), "read(\"any\")");
        assert_eq!(
            Permission::update(Role::team("core", Some("owner"))),
            "update(\"team:core/owner\")"
        );
        assert_eq!(Role::users(Some("verified")), "users/verified");
    }

    #[test]
    fn queries_serialize_as_json() {
        assert_eq!(
            Query::equal("name", "Pink.png"),
            r#"{"method":"equal","attribute":"name","values":["Pink.png"]}"#
        );
        assert_eq!(
            Query::equal("size", vec![1, 2]),
            r#"{"method":"equal","attribute":"size","values":[1,2]}"#
        );
        assert_eq!(Query::limit(25), r#"{"method":"limit","values":[25]}"#);
        assert_eq!(Query::order_desc("$createdAt"), r#"{"method":"orderDesc","attribute":"$createdAt"}"#);
    }
}
