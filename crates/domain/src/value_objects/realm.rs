//! Regions, factions and social classes of Solterra.
//!
//! These are closed sets. Consequence targets arrive as free text, so each
//! type parses leniently (case-insensitive, `_` and ` ` interchangeable) and
//! an unparseable name is simply "not a known target".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

fn fold(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', '-'], " ")
}

/// A region of the world. Reputation is tracked per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Valoria,
    Koro,
    Midmarah,
    Ossara,
    Taaltez,
}

impl Region {
    pub fn all() -> &'static [Region] {
        &[
            Region::Valoria,
            Region::Koro,
            Region::Midmarah,
            Region::Ossara,
            Region::Taaltez,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Region::Valoria => "Valoria",
            Region::Koro => "Koro",
            Region::Midmarah => "Midmarah",
            Region::Ossara => "Ossara",
            Region::Taaltez => "Taaltez",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Region {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold(s);
        Region::all()
            .iter()
            .copied()
            .find(|r| fold(r.display_name()) == folded)
            .ok_or_else(|| DomainError::parse(format!("Unknown region: {}", s)))
    }
}

/// A faction. Relationships are tracked per faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    #[serde(rename = "Echo Traders")]
    EchoTraders,
    #[serde(rename = "Cartographers")]
    Cartographers,
    #[serde(rename = "Nullbound Coalition")]
    NullboundCoalition,
    #[serde(rename = "Shadow Syndicate")]
    ShadowSyndicate,
    #[serde(rename = "Forgotten Settlements")]
    ForgottenSettlements,
}

impl Faction {
    pub fn all() -> &'static [Faction] {
        &[
            Faction::EchoTraders,
            Faction::Cartographers,
            Faction::NullboundCoalition,
            Faction::ShadowSyndicate,
            Faction::ForgottenSettlements,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Faction::EchoTraders => "Echo Traders",
            Faction::Cartographers => "Cartographers",
            Faction::NullboundCoalition => "Nullbound Coalition",
            Faction::ShadowSyndicate => "Shadow Syndicate",
            Faction::ForgottenSettlements => "Forgotten Settlements",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Faction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold(s);
        Faction::all()
            .iter()
            .copied()
            .find(|f| fold(f.display_name()) == folded)
            .ok_or_else(|| DomainError::parse(format!("Unknown faction: {}", s)))
    }
}

/// Social class of a protagonist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SocialClass {
    Grand,
    Principal,
    Minor,
    #[default]
    Qadir,
    Bara,
    Rafi,
    Farid,
}

impl SocialClass {
    pub fn is_nobility(&self) -> bool {
        matches!(self, SocialClass::Grand | SocialClass::Principal | SocialClass::Minor)
    }
}

impl fmt::Display for SocialClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SocialClass::Grand => "Grand",
            SocialClass::Principal => "Principal",
            SocialClass::Minor => "Minor",
            SocialClass::Qadir => "Qadir",
            SocialClass::Bara => "Bara",
            SocialClass::Rafi => "Rafi",
            SocialClass::Farid => "Farid",
        };
        f.write_str(name)
    }
}
