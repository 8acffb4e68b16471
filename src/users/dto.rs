use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User record. `id` is never selected back and `password` is write-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(default)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[sqlx(default)]
    pub id: Option<String>,
    pub login: String,
    #[serde(skip_serializing)]
    #[sqlx(default)]
    pub password: String,
    pub name: String,
    pub email: String,
}

/// Request body for `PATCH /api/v1/users/update/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateUser {
    pub id: i64,
    pub login: String,
    pub name: String,
    pub email: String,
}

/// `id` from the query string; when repeated, the first value wins.
#[derive(Debug)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl From<Vec<(String, String)>> for IdQuery {
    fn from(pairs: Vec<(String, String)>) -> Self {
        let id = pairs.into_iter().find(|(k, _)| k == "id").map(|(_, v)| v);
        Self { id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serialization_hides_password_and_missing_id() {
        let user = User {
            id: None,
            login: "bob".into(),
            password: "x".into(),
            name: "Bob".into(),
            email: "b@x.com".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"login": "bob", "name": "Bob", "email": "b@x.com"})
        );
    }

    #[test]
    fn user_deserialization_accepts_password_and_defaults_missing_fields() {
        let user: User = serde_json::from_str(r#"{"login":"bob","password":"x"}"#).unwrap();
        assert_eq!(user.login, "bob");
        assert_eq!(user.password, "x");
        assert_eq!(user.name, "");
        assert_eq!(user.email, "");
        assert!(user.id.is_none());
    }

    #[test]
    fn id_query_takes_first_id() {
        let pairs = vec![
            ("x".to_string(), "9".to_string()),
            ("id".to_string(), "1".to_string()),
            ("id".to_string(), "2".to_string()),
        ];
        assert_eq!(IdQuery::from(pairs).id.as_deref(), Some("1"));
        assert!(IdQuery::from(Vec::new()).id.is_none());
    }

    #[test]
    fn update_user_requires_numeric_id() {
        let ok: UpdateUser =
            serde_json::from_str(r#"{"id":7,"login":"a","name":"b","email":"c"}"#).unwrap();
        assert_eq!(ok.id, 7);
        assert!(serde_json::from_str::<UpdateUser>(r#"{"id":"7"}"#).is_err());
    }
}
