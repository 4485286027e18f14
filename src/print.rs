//! Human-readable listing of an address book.

use crate::types::{AddressBook, Person};
use std::io::{self, Write};

/// Write every person in `book` to `out`, one field per line.
pub fn write_book(out: &mut impl Write, book: &AddressBook) -> io::Result<()> {
    for person in book.people() {
        write_person(out, person)?;
    }
    Ok(())
}

pub fn write_person(out: &mut impl Write, person: &Person) -> io::Result<()> {
    writeln!(out, "Person ID: {}", person.id())?;
    writeln!(out, "  Name: {}", person.name())?;
    if let Some(email) = person.email() {
        writeln!(out, "  E-mail address: {email}")?;
    }
    for phone in person.phones() {
        writeln!(out, "  {} phone #: {}", phone.phone_type().label(), phone.number())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PhoneNumber, PhoneType};

    fn render(book: &AddressBook) -> String {
        let mut out = Vec::new();
        write_book(&mut out, book).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_listing() {
        let person = Person::builder()
            .id(1)
            .name("Ada")
            .email("ada@example.com")
            .phone(PhoneNumber::new("555-1").with_type(PhoneType::Mobile))
            .phone(PhoneNumber::new("555-2"))
            .phone(PhoneNumber::new("555-3").with_type(PhoneType::Work))
            .build()
            .unwrap();

        assert_eq!(
            render(&AddressBook::new().append(person)),
            "Person ID: 1\n\
             \x20 Name: Ada\n\
             \x20 E-mail address: ada@example.com\n\
             \x20 Mobile phone #: 555-1\n\
             \x20 Home phone #: 555-2\n\
             \x20 Work phone #: 555-3\n"
        );
    }

    #[test]
    fn test_absent_email_not_printed() {
        let person = Person::builder().id(1).name("Ada").email("").build().unwrap();
        let text = render(&AddressBook::new().append(person));
        assert!(!text.contains("E-mail"));
    }
}
