//! `Message`/`Decode` implementations for the address book records.

use super::{decode, Decode, FieldRef, FieldValue, Message};
use crate::error::{Error, Result};
use crate::schema::{address_book, person, phone_number, FieldDescriptor, RecordType};
use crate::types::{
    AddressBook, Person, PersonBuilder, PhoneNumber, PhoneNumberBuilder, PhoneType,
};

fn unexpected(record: RecordType, field: &FieldDescriptor, value: &FieldValue<'_>) -> Error {
    Error::InvalidOperation(format!(
        "{record} cannot accept {value:?} for field `{}`",
        field.name
    ))
}

fn person_values<'a>(
    field: &FieldDescriptor,
    id: Option<i32>,
    name: Option<&'a str>,
    email: Option<&'a str>,
    phones: &'a [PhoneNumber],
) -> Vec<FieldRef<'a>> {
    match field.tag {
        person::NAME => name.map(FieldRef::Str).into_iter().collect(),
        person::ID => id.map(|id| FieldRef::Int(i64::from(id))).into_iter().collect(),
        person::EMAIL => email.map(FieldRef::Str).into_iter().collect(),
        person::PHONES => phones
            .iter()
            .map(|p| FieldRef::Message(p as &dyn Message))
            .collect(),
        _ => Vec::new(),
    }
}

impl Message for Person {
    fn record_type(&self) -> RecordType {
        RecordType::Person
    }

    fn values(&self, field: &FieldDescriptor) -> Vec<FieldRef<'_>> {
        person_values(
            field,
            Some(self.id()),
            Some(self.name()),
            self.email(),
            self.phones(),
        )
    }
}

/// A partially filled builder encodes whatever it holds, so an incomplete
/// person is rejected by the encoder rather than silently dropped.
impl Message for PersonBuilder {
    fn record_type(&self) -> RecordType {
        RecordType::Person
    }

    fn values(&self, field: &FieldDescriptor) -> Vec<FieldRef<'_>> {
        person_values(
            field,
            self.id,
            self.name.as_deref(),
            self.email.as_deref(),
            &self.phones,
        )
    }
}

impl Decode for Person {
    const RECORD: RecordType = RecordType::Person;

    type Builder = PersonBuilder;

    fn merge(
        builder: &mut PersonBuilder,
        field: &FieldDescriptor,
        value: FieldValue<'_>,
    ) -> Result<()> {
        match (field.tag, value) {
            (person::NAME, FieldValue::Str(name)) => builder.name = Some(name),
            (person::ID, FieldValue::Int(id)) => {
                let id = i32::try_from(id)
                    .map_err(|_| Error::malformed(format!("person id {id} out of range")))?;
                builder.id = Some(id);
            }
            (person::EMAIL, FieldValue::Str(email)) => {
                builder.email = Some(email).filter(|e| !e.is_empty());
            }
            (person::PHONES, FieldValue::Message(bytes)) => {
                builder.phones.push(decode::<PhoneNumber>(bytes)?);
            }
            (_, value) => return Err(unexpected(Self::RECORD, field, &value)),
        }
        Ok(())
    }

    fn build(builder: PersonBuilder) -> Result<Self> {
        builder.build()
    }
}

impl Message for PhoneNumber {
    fn record_type(&self) -> RecordType {
        RecordType::PhoneNumber
    }

    fn values(&self, field: &FieldDescriptor) -> Vec<FieldRef<'_>> {
        match field.tag {
            phone_number::NUMBER => vec![FieldRef::Str(self.number())],
            phone_number::TYPE => self
                .declared_type()
                .map(|t| FieldRef::Enum(t.number()))
                .into_iter()
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Decode for PhoneNumber {
    const RECORD: RecordType = RecordType::PhoneNumber;

    type Builder = PhoneNumberBuilder;

    fn merge(
        builder: &mut PhoneNumberBuilder,
        field: &FieldDescriptor,
        value: FieldValue<'_>,
    ) -> Result<()> {
        match (field.tag, value) {
            (phone_number::NUMBER, FieldValue::Str(number)) => builder.number = Some(number),
            (phone_number::TYPE, FieldValue::Enum(n)) => {
                builder.phone_type = Some(PhoneType::from_number(n).unwrap_or_default());
            }
            (_, value) => return Err(unexpected(Self::RECORD, field, &value)),
        }
        Ok(())
    }

    fn build(builder: PhoneNumberBuilder) -> Result<Self> {
        builder.build()
    }
}

impl Message for AddressBook {
    fn record_type(&self) -> RecordType {
        RecordType::AddressBook
    }

    fn values(&self, field: &FieldDescriptor) -> Vec<FieldRef<'_>> {
        match field.tag {
            address_book::PEOPLE => self
                .people()
                .iter()
                .map(|p| FieldRef::Message(p as &dyn Message))
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl Decode for AddressBook {
    const RECORD: RecordType = RecordType::AddressBook;

    type Builder = AddressBook;

    fn merge(
        book: &mut AddressBook,
        field: &FieldDescriptor,
        value: FieldValue<'_>,
    ) -> Result<()> {
        match (field.tag, value) {
            (address_book::PEOPLE, FieldValue::Message(bytes)) => {
                book.people.push(decode::<Person>(bytes)?);
                Ok(())
            }
            (_, value) => Err(unexpected(Self::RECORD, field, &value)),
        }
    }

    fn build(book: AddressBook) -> Result<Self> {
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, encoded_len};

    fn sample_book() -> AddressBook {
        let ada = Person::builder()
            .id(1)
            .name("Ada")
            .email("ada@example.com")
            .phone(PhoneNumber::new("555-0001").with_type(PhoneType::Mobile))
            .phone(PhoneNumber::new("555-0002"))
            .build()
            .unwrap();
        let bob = Person::builder().id(-20).name("Bob").build().unwrap();
        AddressBook::new().append(ada).append(bob)
    }

    #[test]
    fn test_book_round_trip() {
        let book = sample_book();
        let bytes = encode(&book).unwrap();
        assert_eq!(bytes.len(), encoded_len(&book));

        let decoded: AddressBook = decode(&bytes).unwrap();
        assert_eq!(decoded, book);
        assert_eq!(decoded.people()[0].phones()[1].declared_type(), None);
    }

    #[test]
    fn test_empty_book_is_empty_bytes() {
        let bytes = encode(&AddressBook::new()).unwrap();
        assert!(bytes.is_empty());
        let decoded: AddressBook = decode(&bytes).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_book_is_length_prefixed_people() {
        let book = sample_book();
        let bytes = encode(&book).unwrap();

        let first = encode(&book.people()[0]).unwrap();
        assert_eq!(bytes[0], 0x0A);
        assert_eq!(usize::from(bytes[1]), first.len());
        assert_eq!(&bytes[2..2 + first.len()], first.as_slice());
    }

    #[test]
    fn test_builder_encodes_like_person() {
        let builder = Person::builder().id(9).name("Zed").email("z@z");
        let person = builder.clone().build().unwrap();
        assert_eq!(encode(&builder).unwrap(), encode(&person).unwrap());
    }

    #[test]
    fn test_empty_email_on_wire_is_absent() {
        let bytes = [0x0A, 7, 0x0A, 1, b'A', 0x10, 2, 0x1A, 0];
        let book: AddressBook = decode(&bytes).unwrap();

        let person = &book.people()[0];
        assert_eq!(person.email(), None);
        assert_eq!(person, &Person::builder().id(1).name("A").build().unwrap());

        let mut listing = Vec::new();
        crate::print::write_book(&mut listing, &book).unwrap();
        assert_eq!(String::from_utf8(listing).unwrap(), "Person ID: 1\n  Name: A\n");
    }

    #[test]
    fn test_id_out_of_range() {
        // zig-zag of 2^40
        let mut bytes = vec![0x0A, 1, b'A', 0x10];
        crate::codec::varint::write(&mut bytes, crate::codec::varint::zigzag(1 << 40));
        assert!(matches!(decode::<Person>(&bytes), Err(Error::Malformed(_))));
    }
}
