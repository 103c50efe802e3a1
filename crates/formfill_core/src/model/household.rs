//! Household document and member records.
//!
//! # Responsibility
//! - Define the persisted document shape (`members` plus passthrough keys).
//! - Provide id-based member lookup over the ordered member list.
//!
//! # Invariants
//! - Member order is insertion order and is preserved across load/save.
//! - Member ids are unique after every mutation made through this crate.
//! - Unknown root-level keys survive a load/save cycle unchanged.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Root key holding the member list.
pub const MEMBERS_FIELD: &str = "members";
/// Key holding a member's unique identifier.
pub const ID_FIELD: &str = "id";
/// Key holding a member's role (`parent`, `child`, `other`, not enforced).
pub const ROLE_FIELD: &str = "role";

/// One person's free-form field record.
///
/// Field values are arbitrary JSON; nested mappings are addressed with
/// dotted paths via [`crate::path`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Member {
    fields: Map<String, Value>,
}

impl Member {
    /// Creates the smallest valid member: only `id` and `role`.
    pub fn minimal(id: impl Into<String>, role: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(ID_FIELD.to_string(), Value::String(id.into()));
        fields.insert(ROLE_FIELD.to_string(), Value::String(role.into()));
        Self { fields }
    }

    /// Returns the member id when it is stored as a string.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    /// Returns the member role when it is stored as a string.
    pub fn role(&self) -> Option<&str> {
        self.fields.get(ROLE_FIELD).and_then(Value::as_str)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.fields
            .insert(ID_FIELD.to_string(), Value::String(id.into()));
    }

    pub fn set_role(&mut self, role: impl Into<String>) {
        self.fields
            .insert(ROLE_FIELD.to_string(), Value::String(role.into()));
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }
}

impl From<Map<String, Value>> for Member {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Root persisted record.
///
/// Serialization writes root keys back in the order they were loaded, with
/// `members` at its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub members: Vec<Member>,
    /// Root keys other than `members`, such as `_comment`.
    pub extra: Map<String, Value>,
    /// Number of `extra` keys that precede `members`.
    members_at: usize,
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let members_at = self.members_at.min(self.extra.len());
        let mut map = serializer.serialize_map(Some(self.extra.len() + 1))?;
        for (key, value) in self.extra.iter().take(members_at) {
            map.serialize_entry(key, value)?;
        }
        map.serialize_entry(MEMBERS_FIELD, &self.members)?;
        for (key, value) in self.extra.iter().skip(members_at) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let root = Map::<String, Value>::deserialize(deserializer)?;
        let mut extra = Map::new();
        let mut members = None;
        let mut members_at = 0;
        for (key, value) in root {
            if key == MEMBERS_FIELD {
                members_at = extra.len();
                members = Some(value);
            } else {
                extra.insert(key, value);
            }
        }

        let members = match members {
            Some(value) => serde_json::from_value(value).map_err(D::Error::custom)?,
            None => {
                members_at = extra.len();
                Vec::new()
            }
        };

        Ok(Self {
            members,
            extra,
            members_at,
        })
    }
}

impl Document {
    /// Returns the first member whose id equals `id` exactly.
    pub fn find_member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id() == Some(id))
    }

    /// Mutable variant of [`Document::find_member`].
    pub fn find_member_mut(&mut self, id: &str) -> Option<&mut Member> {
        self.members
            .iter_mut()
            .find(|member| member.id() == Some(id))
    }

    pub fn contains_member(&self, id: &str) -> bool {
        self.find_member(id).is_some()
    }

    /// Returns member ids in document order; members without a string id are skipped.
    pub fn member_ids(&self) -> Vec<String> {
        self.members
            .iter()
            .filter_map(Member::id)
            .map(str::to_string)
            .collect()
    }

    /// Returns the first member whose role equals `role`.
    pub fn find_by_role(&self, role: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.role() == Some(role))
    }
}
