use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::{
    AttributeKind, Fields, MappingError, Record, RecordMapping, RecordMappingBuilder,
};

/// Default table holding [`Person`] records.
pub const PERSON_TABLE: &str = "Person";

/// A person stored under a numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Hash key. Never changes once the person is stored.
    pub id: i64,
    pub name: String,
    pub age: i64,
}

impl Person {
    pub fn new(id: i64, name: impl Into<String>, age: i64) -> Self {
        Self {
            id,
            name: name.into(),
            age,
        }
    }

    /// Returns a copy with a different name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Person(id={}, name={}, age={})",
            self.id, self.name, self.age
        )
    }
}

impl Record for Person {
    fn mapping() -> RecordMappingBuilder {
        RecordMapping::builder(PERSON_TABLE)
            .hash_key("id", "id", AttributeKind::Number)
            .attribute("name", "name", AttributeKind::String)
            .attribute("age", "age", AttributeKind::Number)
    }

    fn to_fields(&self) -> Fields {
        Fields::new()
            .with("id", self.id)
            .with("name", self.name.as_str())
            .with("age", self.age)
    }

    fn from_fields(fields: &Fields) -> Result<Self, MappingError> {
        Ok(Self {
            id: fields.number("id")?,
            name: fields.string("name")?,
            age: fields.number("age")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    #[test]
    fn test_person_mapping_is_valid() {
        let mapping = RecordMapping::of::<Person>().unwrap();
        assert_eq!(mapping.table_name(), "Person");
        assert_eq!(mapping.hash_key().field, "id");
        assert_eq!(mapping.hash_key().kind, AttributeKind::Number);
        assert_eq!(mapping.fields().count(), 3);
    }

    #[test]
    fn test_person_item_conversion() {
        let mapping = RecordMapping::of::<Person>().unwrap();
        let person = Person::new(1, "Derek Smith", 42);

        let item = mapping.to_item(&person.to_fields()).unwrap();
        assert_eq!(item.get("id"), Some(&FieldValue::Number(1)));
        assert_eq!(item.get("name"), Some(&FieldValue::from("Derek Smith")));
        assert_eq!(item.get("age"), Some(&FieldValue::Number(42)));

        let restored = Person::from_fields(&mapping.from_item(&item).unwrap()).unwrap();
        assert_eq!(restored, person);
    }

    #[test]
    fn test_person_with_name_keeps_id_and_age() {
        let person = Person::new(1, "Derek Smith", 42).with_name("Kyle Smith");
        assert_eq!(person, Person::new(1, "Kyle Smith", 42));
    }

    #[test]
    fn test_person_display() {
        assert_eq!(
            Person::new(1, "Derek Smith", 42).to_string(),
            "Person(id=1, name=Derek Smith, age=42)"
        );
    }

    #[test]
    fn test_person_serializes_to_json() {
        let person = Person::new(1, "Derek Smith", 42);
        let json = serde_json::to_string(&person).unwrap();
        assert_eq!(json, r#"{"id":1,"name":"Derek Smith","age":42}"#);
    }
}
