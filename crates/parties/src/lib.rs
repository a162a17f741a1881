//! `kidloop-parties` — user accounts and addresses.

pub mod address;
pub mod user;

pub use address::{Address, AddressPatch, NewAddress};
pub use user::UserAccount;
