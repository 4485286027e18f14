//! # Address Book
//!
//! A self-describing binary record codec and the file-backed address book
//! built on it.
//!
//! ## Core Concepts
//!
//! - **Schema**: static field tables (tag, name, kind, optionality) per record type
//! - **Codec**: tag/wire-kind/payload encoding driven by the schema; unknown
//!   tags are skipped on decode
//! - **Records**: immutable `Person`/`PhoneNumber` values built through a
//!   validating builder
//! - **Store**: load-or-create, append, and atomic rewrite of the store file
//!
//! ## Example
//!
//! ```no_run
//! use addressbook::{store, Person, PhoneNumber, PhoneType};
//!
//! let book = store::load("addressBook.data")?;
//! let ada = Person::builder()
//!     .id(1)
//!     .name("Ada")
//!     .phone(PhoneNumber::new("555-0100").with_type(PhoneType::Mobile))
//!     .build()?;
//! store::save("addressBook.data", &book.append(ada))?;
//! # Ok::<(), addressbook::Error>(())
//! ```

pub mod codec;
pub mod error;
pub mod print;
pub mod schema;
pub mod store;
pub mod types;

// Re-exports
pub use codec::json::JsonRules;
pub use codec::{decode, encode, Decode, Message};
pub use error::{Error, Result};
pub use schema::{fields_of, FieldDescriptor, FieldKind, RecordType, WireKind};
pub use store::{RecordStore, StagedSave, StoreConfig, StoreState};
pub use types::*;
