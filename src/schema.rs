//! Static field tables for every record type.
//!
//! The binary encoder, the decoder and the JSON renderer all walk these
//! tables, so field order, tags and naming live in exactly one place.
//! Tags are never reused or renumbered once assigned.

use std::fmt;

/// The record types known to the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordType {
    Person,
    PhoneNumber,
    AddressBook,
}

impl RecordType {
    pub fn name(self) -> &'static str {
        match self {
            RecordType::Person => "Person",
            RecordType::PhoneNumber => "PhoneNumber",
            RecordType::AddressBook => "AddressBook",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encoding discriminator carried in every key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WireKind {
    Varint,
    Fixed64,
    LengthDelimited,
    Fixed32,
}

impl WireKind {
    pub fn to_bits(self) -> u8 {
        match self {
            WireKind::Varint => 0,
            WireKind::Fixed64 => 1,
            WireKind::LengthDelimited => 2,
            WireKind::Fixed32 => 5,
        }
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(WireKind::Varint),
            1 => Some(WireKind::Fixed64),
            2 => Some(WireKind::LengthDelimited),
            5 => Some(WireKind::Fixed32),
            _ => None,
        }
    }
}

/// Symbolic names and numbers of an enum type.
#[derive(Debug)]
pub struct EnumDescriptor {
    pub name: &'static str,
    pub values: &'static [(&'static str, i32)],
    /// Number used when the field is absent or carries an unknown number.
    pub default: i32,
}

impl EnumDescriptor {
    pub fn name_of(&self, number: i32) -> Option<&'static str> {
        self.values
            .iter()
            .find(|(_, n)| *n == number)
            .map(|(name, _)| *name)
    }

    pub fn contains(&self, number: i32) -> bool {
        self.name_of(number).is_some()
    }
}

/// The type of a field's value.
#[derive(Debug)]
pub enum FieldKind {
    Int,
    String,
    Enum(&'static EnumDescriptor),
    Message(RecordType),
    Repeated(&'static FieldKind),
}

impl FieldKind {
    /// Wire kind of a single occurrence.
    pub fn wire_kind(&self) -> WireKind {
        match self {
            FieldKind::Int | FieldKind::Enum(_) => WireKind::Varint,
            FieldKind::String | FieldKind::Message(_) => WireKind::LengthDelimited,
            FieldKind::Repeated(inner) => inner.wire_kind(),
        }
    }

    /// Kind of a single occurrence, looking through `Repeated`.
    pub fn element(&self) -> &FieldKind {
        match self {
            FieldKind::Repeated(inner) => inner.element(),
            kind => kind,
        }
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self, FieldKind::Repeated(_))
    }
}

/// Description of one field of a record type.
#[derive(Debug)]
pub struct FieldDescriptor {
    pub tag: u32,
    pub name: &'static str,
    pub kind: FieldKind,
    pub optional: bool,
}

impl FieldDescriptor {
    /// Whether the field must be present for the record to be complete.
    ///
    /// Repeated fields are never required; zero occurrences is a valid value.
    pub fn is_required(&self) -> bool {
        !self.optional && !self.kind.is_repeated()
    }
}

pub mod person {
    pub const NAME: u32 = 1;
    pub const ID: u32 = 2;
    pub const EMAIL: u32 = 3;
    pub const PHONES: u32 = 4;
}

pub mod phone_number {
    pub const NUMBER: u32 = 1;
    pub const TYPE: u32 = 2;
}

pub mod address_book {
    pub const PEOPLE: u32 = 1;
}

pub static PHONE_TYPE: EnumDescriptor = EnumDescriptor {
    name: "PhoneType",
    values: &[("MOBILE", 0), ("HOME", 1), ("WORK", 2)],
    default: 1,
};

static PERSON_FIELDS: [FieldDescriptor; 4] = [
    FieldDescriptor {
        tag: person::NAME,
        name: "name",
        kind: FieldKind::String,
        optional: false,
    },
    FieldDescriptor {
        tag: person::ID,
        name: "id",
        kind: FieldKind::Int,
        optional: false,
    },
    FieldDescriptor {
        tag: person::EMAIL,
        name: "email",
        kind: FieldKind::String,
        optional: true,
    },
    FieldDescriptor {
        tag: person::PHONES,
        name: "phones",
        kind: FieldKind::Repeated(&FieldKind::Message(RecordType::PhoneNumber)),
        optional: true,
    },
];

static PHONE_NUMBER_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor {
        tag: phone_number::NUMBER,
        name: "number",
        kind: FieldKind::String,
        optional: false,
    },
    FieldDescriptor {
        tag: phone_number::TYPE,
        name: "type",
        kind: FieldKind::Enum(&PHONE_TYPE),
        optional: true,
    },
];

static ADDRESS_BOOK_FIELDS: [FieldDescriptor; 1] = [FieldDescriptor {
    tag: address_book::PEOPLE,
    name: "people",
    kind: FieldKind::Repeated(&FieldKind::Message(RecordType::Person)),
    optional: true,
}];

/// Fields of `record`, in ascending tag order.
pub fn fields_of(record: RecordType) -> &'static [FieldDescriptor] {
    match record {
        RecordType::Person => &PERSON_FIELDS,
        RecordType::PhoneNumber => &PHONE_NUMBER_FIELDS,
        RecordType::AddressBook => &ADDRESS_BOOK_FIELDS,
    }
}

/// Look up a field by tag.
pub fn field(record: RecordType, tag: u32) -> Option<&'static FieldDescriptor> {
    fields_of(record).iter().find(|f| f.tag == tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [RecordType; 3] = [
        RecordType::Person,
        RecordType::PhoneNumber,
        RecordType::AddressBook,
    ];

    #[test]
    fn test_fields_sorted_and_unique() {
        for record in ALL {
            let tags: Vec<u32> = fields_of(record).iter().map(|f| f.tag).collect();
            let mut sorted = tags.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(tags, sorted, "{record} tags must be ascending and unique");
            assert!(tags.iter().all(|&t| t > 0));
        }
    }

    #[test]
    fn test_required_fields() {
        let required: Vec<_> = fields_of(RecordType::Person)
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name)
            .collect();
        assert_eq!(required, vec!["name", "id"]);

        assert!(fields_of(RecordType::AddressBook)
            .iter()
            .all(|f| !f.is_required()));
    }

    #[test]
    fn test_wire_kinds() {
        let phones = field(RecordType::Person, person::PHONES).unwrap();
        assert_eq!(phones.kind.wire_kind(), WireKind::LengthDelimited);
        assert!(matches!(
            phones.kind.element(),
            FieldKind::Message(RecordType::PhoneNumber)
        ));

        let kind = field(RecordType::PhoneNumber, phone_number::TYPE).unwrap();
        assert_eq!(kind.kind.wire_kind(), WireKind::Varint);

        for bits in 0..8 {
            if let Some(kind) = WireKind::from_bits(bits) {
                assert_eq!(kind.to_bits(), bits);
            }
        }
        assert!(WireKind::from_bits(3).is_none());
    }

    #[test]
    fn test_enum_descriptor() {
        assert_eq!(PHONE_TYPE.name_of(0), Some("MOBILE"));
        assert_eq!(PHONE_TYPE.name_of(PHONE_TYPE.default), Some("HOME"));
        assert!(!PHONE_TYPE.contains(7));
        assert!(field(RecordType::Person, 99).is_none());
    }
}
