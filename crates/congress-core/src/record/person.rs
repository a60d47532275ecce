//! Person records and their session memberships.
//!
//! Two declaration schemas coexist in the source data: a structured
//! `memberships` array and a legacy flat `session_numbers` list. Both are
//! normalized into [`Membership`] values at decode time.

use serde::Deserialize;

use super::{finish_document, Entity, NodeLabel, NodeRecord, PropertyMap};

/// One term served in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub session_number: i64,
    pub position: String,
    pub kind: String,
}

impl Membership {
    /// A membership with no position or type, as declared by the legacy list.
    pub fn bare(session_number: i64) -> Self {
        Self {
            session_number,
            position: String::new(),
            kind: String::new(),
        }
    }
}

/// A legislator or other person.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "PersonDocument")]
pub struct Person {
    pub id: String,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub aliases: Option<Vec<String>>,
    pub senate_website_keys: Option<Vec<String>>,
    pub memberships: Vec<Membership>,
    pub extra: PropertyMap,
}

#[derive(Deserialize)]
struct MembershipDocument {
    #[serde(default, alias = "congress")]
    session_number: Option<i64>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct PersonDocument {
    id: String,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    middle_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    aliases: Option<Vec<String>>,
    #[serde(default)]
    senate_website_keys: Option<Vec<String>>,
    #[serde(default)]
    memberships: Option<Vec<MembershipDocument>>,
    #[serde(default, alias = "congresses")]
    session_numbers: Option<Vec<i64>>,
    #[serde(default)]
    schema_version: Option<u32>,
    #[serde(flatten)]
    extra: toml::Table,
}

/// Non-empty `memberships` wins; otherwise the legacy list applies.
fn normalize_memberships(
    memberships: Option<Vec<MembershipDocument>>,
    legacy: Option<Vec<i64>>,
) -> Vec<Membership> {
    match memberships {
        Some(entries) if !entries.is_empty() => entries
            .into_iter()
            .filter_map(|entry| {
                entry.session_number.map(|session_number| Membership {
                    session_number,
                    position: entry.position.unwrap_or_default(),
                    kind: entry.kind.unwrap_or_default(),
                })
            })
            .collect(),
        _ => legacy
            .unwrap_or_default()
            .into_iter()
            .map(Membership::bare)
            .collect(),
    }
}

impl TryFrom<PersonDocument> for Person {
    type Error = String;

    fn try_from(doc: PersonDocument) -> Result<Self, Self::Error> {
        let extra = finish_document(&doc.id, doc.schema_version, doc.extra)?;
        Ok(Self {
            id: doc.id,
            first_name: doc.first_name,
            middle_name: doc.middle_name,
            last_name: doc.last_name,
            full_name: doc.full_name,
            aliases: doc.aliases,
            senate_website_keys: doc.senate_website_keys,
            memberships: normalize_memberships(doc.memberships, doc.session_numbers),
            extra,
        })
    }
}

impl Entity for Person {
    const LABEL: NodeLabel = NodeLabel::Person;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_node(&self) -> NodeRecord {
        NodeRecord::new(&self.id)
            .with_opt("first_name", self.first_name.clone())
            .with_opt("middle_name", self.middle_name.clone())
            .with_opt("last_name", self.last_name.clone())
            .with_opt("full_name", self.full_name.clone())
            .with_opt("aliases", self.aliases.clone())
            .with_opt("senate_website_keys", self.senate_website_keys.clone())
            .with_extra(&self.extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_memberships() {
        let person: Person = toml::from_str(
            r#"
            id = "p1"
            full_name = "Juan dela Cruz"

            [[memberships]]
            session_number = 19
            position = "senator"
            type = "congress"

            [[memberships]]
            congress = 18
            "#,
        )
        .unwrap();

        assert_eq!(
            person.memberships,
            vec![
                Membership {
                    session_number: 19,
                    position: "senator".into(),
                    kind: "congress".into(),
                },
                Membership::bare(18),
            ]
        );
    }

    #[test]
    fn test_memberships_take_precedence_over_legacy() {
        let person: Person = toml::from_str(
            r#"
            id = "p1"
            congresses = [17, 18]

            [[memberships]]
            congress = 19
            position = "representative"
            "#,
        )
        .unwrap();

        assert_eq!(person.memberships.len(), 1);
        assert_eq!(person.memberships[0].session_number, 19);
    }

    #[test]
    fn test_legacy_list_fallback() {
        let person: Person = toml::from_str("id = \"p2\"\nsession_numbers = [8, 9]").unwrap();
        assert_eq!(person.memberships, vec![Membership::bare(8), Membership::bare(9)]);
    }

    #[test]
    fn test_empty_memberships_fall_back_to_legacy() {
        let person: Person =
            toml::from_str("id = \"p3\"\nmemberships = []\ncongresses = [12]").unwrap();
        assert_eq!(person.memberships, vec![Membership::bare(12)]);
    }

    #[test]
    fn test_membership_without_session_is_dropped() {
        let person: Person = toml::from_str(
            r#"
            id = "p4"
            [[memberships]]
            position = "senator"
            "#,
        )
        .unwrap();
        assert!(person.memberships.is_empty());
    }

    #[test]
    fn test_relationship_fields_not_persisted() {
        let person: Person = toml::from_str(
            r#"
            id = "p1"
            last_name = "Cruz"
            birth_date = 1961-04-02
            congresses = [19]
            "#,
        )
        .unwrap();

        let node = person.to_node();
        assert!(!node.properties.contains_key("memberships"));
        assert!(!node.properties.contains_key("congresses"));
        assert!(!node.properties.contains_key("session_numbers"));
        assert_eq!(node.properties["birth_date"].as_str(), Some("1961-04-02"));
        assert_eq!(node.properties.len(), 3);
    }
}
