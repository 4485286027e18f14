//! Core record types.
//!
//! Records are immutable once built. A builder accumulates fields and a single
//! `build()` step checks that every required field is present.

use crate::error::{Error, Result};
use crate::schema::{person, phone_number, RecordType, PHONE_TYPE};
use std::fmt;
use std::str::FromStr;

/// Kind of phone number.
///
/// There is no "unknown" variant: numbers outside this set decode to the
/// default, so every decoded phone lists under one of these labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PhoneType {
    Mobile,
    Home,
    Work,
}

impl PhoneType {
    pub fn number(self) -> i32 {
        match self {
            PhoneType::Mobile => 0,
            PhoneType::Home => 1,
            PhoneType::Work => 2,
        }
    }

    pub fn from_number(number: i32) -> Option<Self> {
        match number {
            0 => Some(PhoneType::Mobile),
            1 => Some(PhoneType::Home),
            2 => Some(PhoneType::Work),
            _ => None,
        }
    }

    /// Label used when listing people.
    pub fn label(self) -> &'static str {
        match self {
            PhoneType::Mobile => "Mobile",
            PhoneType::Home => "Home",
            PhoneType::Work => "Work",
        }
    }
}

impl Default for PhoneType {
    fn default() -> Self {
        PhoneType::from_number(PHONE_TYPE.default).unwrap_or(PhoneType::Home)
    }
}

impl fmt::Display for PhoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unrecognized phone type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPhoneType(pub String);

impl fmt::Display for UnknownPhoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown phone type: {:?}", self.0)
    }
}

impl std::error::Error for UnknownPhoneType {}

impl FromStr for PhoneType {
    type Err = UnknownPhoneType;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mobile" => Ok(PhoneType::Mobile),
            "home" => Ok(PhoneType::Home),
            "work" => Ok(PhoneType::Work),
            _ => Err(UnknownPhoneType(s.to_string())),
        }
    }
}

/// A phone number attached to a person.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhoneNumber {
    number: String,
    phone_type: Option<PhoneType>,
}

impl PhoneNumber {
    pub fn builder() -> PhoneNumberBuilder {
        PhoneNumberBuilder::default()
    }

    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            phone_type: None,
        }
    }

    pub fn with_type(mut self, phone_type: PhoneType) -> Self {
        self.phone_type = Some(phone_type);
        self
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    /// The phone type, falling back to the default when none was set.
    pub fn phone_type(&self) -> PhoneType {
        self.phone_type.unwrap_or_default()
    }

    /// The phone type exactly as set, `None` when absent.
    pub fn declared_type(&self) -> Option<PhoneType> {
        self.phone_type
    }
}

/// Builder for [`PhoneNumber`], also used to accumulate decoded fields.
#[derive(Clone, Debug, Default)]
pub struct PhoneNumberBuilder {
    pub(crate) number: Option<String>,
    pub(crate) phone_type: Option<PhoneType>,
}

impl PhoneNumberBuilder {
    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    pub fn phone_type(mut self, phone_type: PhoneType) -> Self {
        self.phone_type = Some(phone_type);
        self
    }

    pub fn build(self) -> Result<PhoneNumber> {
        let number = self.number.ok_or(Error::SchemaViolation {
            record: RecordType::PhoneNumber,
            field: field_name(RecordType::PhoneNumber, phone_number::NUMBER),
        })?;
        Ok(PhoneNumber {
            number,
            phone_type: self.phone_type,
        })
    }
}

/// A person record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    id: i32,
    name: String,
    email: Option<String>,
    phones: Vec<PhoneNumber>,
}

impl Person {
    pub fn builder() -> PersonBuilder {
        PersonBuilder::default()
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn phones(&self) -> &[PhoneNumber] {
        &self.phones
    }
}

/// Builder for [`Person`].
///
/// Phone numbers are appended as finished values; nothing is shared between
/// successive entries.
#[derive(Clone, Debug, Default)]
pub struct PersonBuilder {
    pub(crate) id: Option<i32>,
    pub(crate) name: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) phones: Vec<PhoneNumber>,
}

impl PersonBuilder {
    pub fn id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the email address. An empty string means "no email".
    pub fn email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        self.email = if email.is_empty() { None } else { Some(email) };
        self
    }

    pub fn phone(mut self, phone: PhoneNumber) -> Self {
        self.phones.push(phone);
        self
    }

    pub fn phones(mut self, phones: impl IntoIterator<Item = PhoneNumber>) -> Self {
        self.phones.extend(phones);
        self
    }

    /// Checks required fields and produces the record.
    pub fn build(self) -> Result<Person> {
        let missing = |tag| Error::SchemaViolation {
            record: RecordType::Person,
            field: field_name(RecordType::Person, tag),
        };
        let name = self.name.ok_or_else(|| missing(person::NAME))?;
        let id = self.id.ok_or_else(|| missing(person::ID))?;
        Ok(Person {
            id,
            name,
            email: self.email,
            phones: self.phones,
        })
    }
}

/// An ordered collection of people. Duplicate ids are allowed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressBook {
    pub(crate) people: Vec<Person>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// Returns a new book with `person` appended; `self` is left untouched.
    pub fn append(&self, person: Person) -> AddressBook {
        let mut people = Vec::with_capacity(self.people.len() + 1);
        people.extend(self.people.iter().cloned());
        people.push(person);
        AddressBook { people }
    }
}

impl FromIterator<Person> for AddressBook {
    fn from_iter<I: IntoIterator<Item = Person>>(iter: I) -> Self {
        AddressBook {
            people: iter.into_iter().collect(),
        }
    }
}

fn field_name(record: RecordType, tag: u32) -> &'static str {
    crate::schema::field(record, tag).map_or("?", |f| f.name)
}
