use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{AccountType, IdError, Universe};

const ACCOUNT_MASK:  u64 = 0xffff_ffff;
const INSTANCE_MASK: u64 = 0xf_ffff;
const TYPE_MASK:     u64 = 0xf;
const UNIVERSE_MASK: u64 = 0xff;

const INSTANCE_SHIFT: u32 = 32;
const TYPE_SHIFT:     u32 = 52;
const UNIVERSE_SHIFT: u32 = 56;

/// The four fields of a [`SteamId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Parts {
    pub account:      u32,
    /// 20-bit instance.
    pub instance:     u32,
    pub account_type: AccountType,
    pub universe:     Universe,
}

/// A 64-bit identifier for any entity on the platform.
///
/// Serialises as a decimal string, which is how the web endpoints transmit it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SteamId(u64);

impl SteamId {
    /// Pack the four fields, rejecting values wider than their bit field.
    pub fn new(
        account:      u32,
        instance:     u32,
        account_type: AccountType,
        universe:     Universe,
    ) -> Result<Self, IdError> {
        if u64::from(instance) > INSTANCE_MASK {
            return Err(IdError::InstanceOutOfRange(instance));
        }
        if u64::from(account_type.0) > TYPE_MASK {
            return Err(IdError::AccountTypeOutOfRange(account_type.0));
        }
        Ok(Self::pack(account, instance, account_type, universe))
    }

    const fn pack(account: u32, instance: u32, account_type: AccountType, universe: Universe) -> Self {
        Self(
            account as u64
                | ((instance as u64 & INSTANCE_MASK) << INSTANCE_SHIFT)
                | ((account_type.0 as u64 & TYPE_MASK) << TYPE_SHIFT)
                | ((universe.0 as u64) << UNIVERSE_SHIFT),
        )
    }

    /// An individual user account: instance 1, public universe.
    pub const fn user(account: u32) -> Self {
        Self::pack(account, 1, AccountType::INDIVIDUAL, Universe::PUBLIC)
    }

    /// A clan / group: instance 0, public universe.
    pub const fn group(account: u32) -> Self {
        Self::pack(account, 0, AccountType::CLAN, Universe::PUBLIC)
    }

    pub const fn from_u64(raw: u64) -> Self { Self(raw) }

    pub const fn as_u64(self) -> u64 { self.0 }

    pub const fn account(self) -> u32 { (self.0 & ACCOUNT_MASK) as u32 }

    pub const fn instance(self) -> u32 { ((self.0 >> INSTANCE_SHIFT) & INSTANCE_MASK) as u32 }

    pub const fn account_type(self) -> AccountType {
        AccountType(((self.0 >> TYPE_SHIFT) & TYPE_MASK) as u8)
    }

    pub const fn universe(self) -> Universe {
        Universe(((self.0 >> UNIVERSE_SHIFT) & UNIVERSE_MASK) as u8)
    }

    /// Split into the four fields. Inverse of [`SteamId::new`].
    pub const fn parts(self) -> Parts {
        Parts {
            account:      self.account(),
            instance:     self.instance(),
            account_type: self.account_type(),
            universe:     self.universe(),
        }
    }

    /// Bracketed rendering such as `[U:1:22202]`.
    ///
    /// The instance is appended only when it differs from the type's usual
    /// value (1 for individuals, 0 otherwise). Returns `None` for account
    /// types that have no letter.
    pub fn steam3(self) -> Option<String> {
        let ty     = self.account_type();
        let letter = ty.letter()?;
        let usual  = if ty == AccountType::INDIVIDUAL { 1 } else { 0 };
        Some(if self.instance() == usual {
            format!("[{letter}:{}:{}]", self.universe().0, self.account())
        } else {
            format!("[{letter}:{}:{}:{}]", self.universe().0, self.account(), self.instance())
        })
    }
}

impl From<u64> for SteamId {
    fn from(raw: u64) -> Self { Self(raw) }
}

impl From<SteamId> for u64 {
    fn from(id: SteamId) -> Self { id.0 }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SteamId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| IdError::Parse(s.to_string()))
    }
}

impl Serialize for SteamId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SteamId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(u64),
        }
        match Repr::deserialize(d)? {
            Repr::Text(s)   => s.parse().map_err(serde::de::Error::custom),
            Repr::Number(n) => Ok(Self(n)),
        }
    }
}
