//! Account types and universes.
//!
//! Both are open newtypes over `u8`: every raw value round-trips through a
//! [`crate::SteamId`], and the named constants cover the values the platform
//! currently assigns.

use std::fmt;

// ─── AccountType ──────────────────────────────────────────────────────────────

/// The category of entity an identifier refers to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountType(pub u8);

impl AccountType {
    pub const INVALID:          Self = Self(0);
    pub const INDIVIDUAL:       Self = Self(1);
    pub const MULTISEAT:        Self = Self(2);
    pub const GAME_SERVER:      Self = Self(3);
    pub const ANON_GAME_SERVER: Self = Self(4);
    pub const PENDING:          Self = Self(5);
    pub const CONTENT_SERVER:   Self = Self(6);
    pub const CLAN:             Self = Self(7);
    pub const CHAT:             Self = Self(8);
    /// P2P super seeder.
    pub const SUPER_SEEDER:     Self = Self(9);
    pub const ANON_USER:        Self = Self(10);

    /// Human-readable label, or `None` for a value with no known meaning.
    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::INVALID          => "Invalid",
            Self::INDIVIDUAL       => "Individual",
            Self::MULTISEAT        => "Multiseat",
            Self::GAME_SERVER      => "GameServer",
            Self::ANON_GAME_SERVER => "AnonGameServer",
            Self::PENDING          => "Pending",
            Self::CONTENT_SERVER   => "ContentServer",
            Self::CLAN             => "Clan",
            Self::CHAT             => "Chat",
            Self::SUPER_SEEDER     => "SuperSeeder",
            Self::ANON_USER        => "AnonUser",
            _ => return None,
        })
    }

    /// The letter used in the bracketed `[U:1:22202]` rendering.
    ///
    /// Super seeders and anonymous users have no letter.
    pub fn letter(self) -> Option<char> {
        Some(match self {
            Self::INVALID          => 'I',
            Self::INDIVIDUAL       => 'U',
            Self::MULTISEAT        => 'M',
            Self::GAME_SERVER      => 'G',
            Self::ANON_GAME_SERVER => 'A',
            Self::PENDING          => 'P',
            Self::CONTENT_SERVER   => 'C',
            Self::CLAN             => 'g',
            Self::CHAT             => 'c',
            _ => return None,
        })
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(n) => f.write_str(n),
            None    => write!(f, "AccountType({})", self.0),
        }
    }
}

// ─── Universe ─────────────────────────────────────────────────────────────────

/// The deployment partition an identifier belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Universe(pub u8);

impl Universe {
    pub const UNSPECIFIED: Self = Self(0);
    pub const PUBLIC:      Self = Self(1);
    pub const BETA:        Self = Self(2);
    pub const INTERNAL:    Self = Self(3);
    pub const DEV:         Self = Self(4);
    pub const RC:          Self = Self(5);

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::UNSPECIFIED => "Unspecified",
            Self::PUBLIC      => "Public",
            Self::BETA        => "Beta",
            Self::INTERNAL    => "Internal",
            Self::DEV         => "Dev",
            Self::RC          => "RC",
            _ => return None,
        })
    }
}

impl fmt::Display for Universe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(n) => f.write_str(n),
            None    => write!(f, "Universe({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_for_known_values() {
        assert_eq!(AccountType::CLAN.name(), Some("Clan"));
        assert_eq!(AccountType::CLAN.letter(), Some('g'));
        assert_eq!(Universe::BETA.to_string(), "Beta");
    }

    #[test]
    fn unknown_values_have_no_label() {
        assert_eq!(AccountType(14).name(), None);
        assert_eq!(AccountType(14).letter(), None);
        assert_eq!(AccountType::ANON_USER.letter(), None);
        assert_eq!(Universe(200).name(), None);
        assert_eq!(Universe(200).to_string(), "Universe(200)");
    }
}
