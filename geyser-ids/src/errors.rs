use std::fmt;

/// Errors produced when building or parsing a [`crate::SteamId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdError {
    /// The instance does not fit in the 20-bit instance field.
    InstanceOutOfRange(u32),
    /// The account type does not fit in the 4-bit type field.
    AccountTypeOutOfRange(u8),
    /// The input was not a decimal 64-bit integer.
    Parse(String),
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstanceOutOfRange(i)    => write!(f, "instance {i} does not fit in 20 bits"),
            Self::AccountTypeOutOfRange(t) => write!(f, "account type {t} does not fit in 4 bits"),
            Self::Parse(s)                 => write!(f, "not a 64-bit steam id: {s:?}"),
        }
    }
}

impl std::error::Error for IdError {}
