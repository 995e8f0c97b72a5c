//! Clan response model.
//!
//! Typed fields are decoded leniently: a field that is absent, null or of an
//! unexpected shape takes its default. Decoding only fails when the body is
//! not a JSON object, so the raw payload is available for any clan the API
//! returns.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Access to the untransformed response body a model was decoded from.
///
/// Only available when the client was built with `raw_attribute(true)`;
/// callers must treat `None` as "capability not provided", not as an empty
/// payload.
pub trait RawPayload {
    fn raw_payload(&self) -> Option<&Value>;
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, deserialize_with = "lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub is_country: bool,
    #[serde(default, deserialize_with = "lenient")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default, deserialize_with = "lenient")]
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClanMember {
    #[serde(default, deserialize_with = "lenient")]
    pub tag: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub exp_level: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub trophies: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub donations: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub donations_received: Option<u32>,
}

/// A clan as returned by `GET /clans/{tag}`
///
/// Only the fields the tooling reads are typed; everything else lives in the
/// raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clan {
    #[serde(default, deserialize_with = "lenient")]
    pub tag: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub clan_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "lenient")]
    pub clan_level: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub clan_points: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub members: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub war_frequency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_war_log_public: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub labels: Vec<Label>,
    #[serde(default, deserialize_with = "lenient")]
    pub member_list: Vec<ClanMember>,
    #[serde(skip)]
    raw: Option<Value>,
}

impl Clan {
    /// Decode a clan, keeping the raw body when `keep_raw` is set
    ///
    /// Fails only when `value` is not an object.
    pub(crate) fn from_value(value: Value, keep_raw: bool) -> serde_json::Result<Self> {
        if !value.is_object() {
            return Err(serde::de::Error::custom("expected a clan object"));
        }
        let mut clan: Clan = serde_json::from_value(value.clone())?;
        if keep_raw {
            clan.raw = Some(value);
        }
        Ok(clan)
    }

    /// Take ownership of the raw payload, if it was kept
    pub fn into_raw(self) -> Option<Value> {
        self.raw
    }
}

impl RawPayload for Clan {
    fn raw_payload(&self) -> Option<&Value> {
        self.raw.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "tag": "#2PP",
            "name": "Example",
            "type": "open",
            "clanLevel": 12,
            "members": 1,
            "location": {"id": 32000006, "name": "International", "isCountry": false},
            "labels": [{"id": 56000000, "name": "Clan Wars", "iconUrls": {}}],
            "memberList": [{"tag": "#P1", "name": "alpha", "role": "leader", "league": {}}],
            "chatLanguage": {"id": 75000000, "name": "English"}
        })
    }

    #[test]
    fn test_decode_typed_fields() {
        let clan = Clan::from_value(sample(), false).unwrap();
        assert_eq!(clan.tag, "#2PP");
        assert_eq!(clan.clan_type.as_deref(), Some("open"));
        assert_eq!(clan.clan_level, Some(12));
        assert_eq!(clan.member_list[0].role.as_deref(), Some("leader"));
        assert_eq!(clan.labels.len(), 1);
    }

    #[test]
    fn test_raw_payload_only_when_requested() {
        let without = Clan::from_value(sample(), false).unwrap();
        assert!(without.raw_payload().is_none());

        let with = Clan::from_value(sample(), true).unwrap();
        // Untyped fields survive in the raw payload.
        assert_eq!(
            with.raw_payload().unwrap()["chatLanguage"]["name"],
            json!("English")
        );
        assert_eq!(with.into_raw().unwrap(), sample());
    }

    #[test]
    fn test_odd_typed_fields_keep_raw_payload() {
        let body = json!({
            "tag": "#2PP",
            "location": {"id": 32000006},
            "labels": null,
            "clanPoints": 41000.5,
            "memberList": [{"tag": "#P1", "expLevel": "high"}]
        });

        let clan = Clan::from_value(body.clone(), true).unwrap();

        assert_eq!(clan.tag, "#2PP");
        assert_eq!(clan.name, "");
        assert_eq!(clan.location.as_ref().map(|l| l.id), Some(32000006));
        assert!(clan.labels.is_empty());
        assert_eq!(clan.clan_points, None);
        assert_eq!(clan.member_list[0].exp_level, None);
        assert_eq!(clan.raw_payload(), Some(&body));
    }

    #[test]
    fn test_non_object_body_fails() {
        assert!(Clan::from_value(json!(["#2PP"]), true).is_err());
        assert!(Clan::from_value(json!("clan"), true).is_err());
    }
}
