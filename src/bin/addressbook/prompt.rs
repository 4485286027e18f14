//! Interactive entry of a person.

use std::io::{self, BufRead, Write};

use addressbook::{Person, PhoneNumber, PhoneType};
use anyhow::Context as _;

/// Read one person from `input`, writing prompts to `out`.
///
/// A blank phone number (or end of input) ends the phone list.
pub fn prompt_for_person(input: &mut impl BufRead, out: &mut impl Write) -> anyhow::Result<Person> {
    let id = ask(input, out, "Enter person ID: ")?.context("no person ID entered")?;
    let id: i32 = id
        .trim()
        .parse()
        .with_context(|| format!("invalid person ID: {id:?}"))?;
    let mut person = Person::builder().id(id);

    if let Some(name) = ask(input, out, "Enter name: ")? {
        person = person.name(name);
    }

    if let Some(email) = ask(input, out, "Enter email address (blank for none): ")? {
        person = person.email(email);
    }

    loop {
        let number = ask(input, out, "Enter a phone number (or leave blank to finish): ")?;
        let Some(number) = number.filter(|n| !n.is_empty()) else {
            break;
        };

        let phone = PhoneNumber::builder().number(number);
        let kind = ask(input, out, "Is this a mobile, home, or work phone? ")?.unwrap_or_default();
        let phone = if kind.trim().is_empty() {
            phone
        } else {
            match kind.parse::<PhoneType>() {
                Ok(phone_type) => phone.phone_type(phone_type),
                Err(e) => {
                    tracing::warn!("{e}, using {}", PhoneType::default());
                    writeln!(out, "Unknown phone type. Using default.")?;
                    phone.phone_type(PhoneType::default())
                }
            }
        };
        person = person.phone(phone.build()?);
    }

    Ok(person.build()?)
}

/// Print `prompt` and read one line without its line ending. `None` at end of
/// input.
fn ask(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> io::Result<Option<String>> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_owned()))
}
