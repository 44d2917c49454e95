//! 64-bit Steam entity identifiers.
//!
//! A [`SteamId`] packs four fields into one `u64`:
//!
//! | Bits    | Width | Field                       |
//! |---------|-------|-----------------------------|
//! | 0–31    | 32    | account number              |
//! | 32–51   | 20    | instance                    |
//! | 52–55   | 4     | [`AccountType`]             |
//! | 56–63   | 8     | [`Universe`]                |
//!
//! Packing and unpacking are pure bit operations. Unknown account types and
//! universes decode to their raw numeric value; only the label lookups
//! ([`AccountType::name`], [`Universe::name`]) can come back empty.
//!
//! ```rust
//! use geyser_ids::{AccountType, SteamId, Universe};
//!
//! let id = SteamId::user(22202);
//! assert_eq!(id.as_u64(), 76561197960287930);
//! assert_eq!(id.account_type(), AccountType::INDIVIDUAL);
//! assert_eq!(id.universe(), Universe::PUBLIC);
//! ```

#![deny(unsafe_code)]

mod errors;
mod kinds;
mod steam_id;

pub use errors::IdError;
pub use kinds::{AccountType, Universe};
pub use steam_id::{Parts, SteamId};
