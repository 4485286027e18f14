//! JSON rendering of records.
//!
//! Walks the same field tables as the binary encoder. Per-format differences
//! (currently only field renames) live in [`JsonRules`] instead of in the
//! records themselves.

use super::{FieldRef, Message};
use crate::error::Result;
use crate::schema::{fields_of, person, FieldDescriptor, FieldKind, RecordType};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Rendering rules for the JSON encoder.
#[derive(Clone, Debug, Default)]
pub struct JsonRules {
    renames: HashMap<(RecordType, u32), String>,
}

impl JsonRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules used by `list-people --json`: a person's `name` is shown as
    /// `fullName`.
    pub fn listing() -> Self {
        Self::new().rename(RecordType::Person, person::NAME, "fullName")
    }

    /// Render field `tag` of `record` under `name` instead of its schema name.
    pub fn rename(mut self, record: RecordType, tag: u32, name: impl Into<String>) -> Self {
        self.renames.insert((record, tag), name.into());
        self
    }

    fn name_for<'a>(&'a self, record: RecordType, field: &'a FieldDescriptor) -> &'a str {
        self.renames
            .get(&(record, field.tag))
            .map_or(field.name, String::as_str)
    }
}

/// Render `msg` as a JSON object, fields in tag order.
///
/// Absent optional fields are left out. Repeated fields always appear as an
/// array, which may be empty.
pub fn to_json(msg: &dyn Message, rules: &JsonRules) -> Value {
    let record = msg.record_type();
    let mut object = Map::new();
    for field in fields_of(record) {
        let values = msg.values(field);
        let name = rules.name_for(record, field).to_owned();
        if field.kind.is_repeated() {
            let items = values.iter().map(|v| render(field, v, rules)).collect();
            object.insert(name, Value::Array(items));
        } else if let Some(value) = values.first() {
            object.insert(name, render(field, value, rules));
        }
    }
    Value::Object(object)
}

pub fn to_string_pretty(msg: &dyn Message, rules: &JsonRules) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json(msg, rules))?)
}

fn render(field: &FieldDescriptor, value: &FieldRef<'_>, rules: &JsonRules) -> Value {
    match (field.kind.element(), value) {
        (FieldKind::Enum(desc), FieldRef::Enum(n)) => match desc.name_of(*n) {
            Some(name) => Value::from(name),
            None => Value::from(*n),
        },
        (_, FieldRef::Int(v)) => Value::from(*v),
        (_, FieldRef::Enum(v)) => Value::from(*v),
        (_, FieldRef::Str(s)) => Value::from(*s),
        (_, FieldRef::Message(m)) => to_json(*m, rules),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AddressBook, Person, PhoneNumber, PhoneType};
    use serde_json::json;

    fn ada() -> Person {
        Person::builder()
            .id(1)
            .name("Ada")
            .phone(PhoneNumber::new("555").with_type(PhoneType::Work))
            .phone(PhoneNumber::new("556"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_person_json() {
        let value = to_json(&ada(), &JsonRules::new());
        assert_eq!(
            value,
            json!({
                "name": "Ada",
                "id": 1,
                "phones": [
                    {"number": "555", "type": "WORK"},
                    {"number": "556"}
                ]
            })
        );
    }

    #[test]
    fn test_field_order_follows_tags() {
        let value = to_json(&ada(), &JsonRules::new());
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["name", "id", "phones"]);
    }

    #[test]
    fn test_rename() {
        let rules = JsonRules::new().rename(RecordType::Person, person::NAME, "fullName");
        let book = AddressBook::new().append(ada());

        let value = to_json(&book, &rules);
        assert_eq!(value["people"][0]["fullName"], "Ada");
        assert!(value["people"][0].get("name").is_none());
    }

    #[test]
    fn test_listing_rules() {
        let book = AddressBook::new().append(ada());
        let value = to_json(&book, &JsonRules::listing());

        let keys: Vec<_> = value["people"][0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["fullName", "id", "phones"]);
        assert_eq!(value["people"][0]["phones"][0]["type"], "WORK");
    }

    #[test]
    fn test_empty_book() {
        let value = to_json(&AddressBook::new(), &JsonRules::new());
        assert_eq!(value, json!({ "people": [] }));
    }

    #[test]
    fn test_pretty_string() {
        let text = to_string_pretty(&AddressBook::new(), &JsonRules::new()).unwrap();
        assert!(text.contains("\"people\""));
    }
}
