//! Domain models for the address book.

pub mod address;
pub mod user;

pub use address::Address;
pub use user::User;
