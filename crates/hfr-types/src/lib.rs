//! Foundational validated types shared across the HFR workspace.
//!
//! These are deliberately small: a closed key set for the three follow-up
//! visit slots, the patient sex field, and a non-empty text wrapper used
//! where a blank value would be meaningless (attachment filenames).

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input did not name one of the three follow-up slots
    #[error("Unknown follow-up slot: '{0}' (expected fu1, fu2 or fu3)")]
    UnknownFollowUpKey(String),
}

/// Identifies one of the exactly three follow-up visit slots.
///
/// The slot set is closed: a patient record always has `fu1`, `fu2` and
/// `fu3`, never more, never fewer. Representing the keys as an enum rather
/// than free strings means a slot lookup can never miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowUpKey {
    /// First scheduled follow-up visit (`fu1`).
    First,
    /// Second scheduled follow-up visit (`fu2`).
    Second,
    /// Third scheduled follow-up visit (`fu3`).
    Third,
}

impl FollowUpKey {
    /// All three slots, in visit order.
    pub const ALL: [FollowUpKey; 3] = [FollowUpKey::First, FollowUpKey::Second, FollowUpKey::Third];

    /// The wire/storage name of the slot.
    pub fn as_str(self) -> &'static str {
        match self {
            FollowUpKey::First => "fu1",
            FollowUpKey::Second => "fu2",
            FollowUpKey::Third => "fu3",
        }
    }
}

impl fmt::Display for FollowUpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowUpKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fu1" => Ok(FollowUpKey::First),
            "fu2" => Ok(FollowUpKey::Second),
            "fu3" => Ok(FollowUpKey::Third),
            other => Err(TypeError::UnknownFollowUpKey(other.to_owned())),
        }
    }
}

impl serde::Serialize for FollowUpKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for FollowUpKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Patient sex as captured on the baseline form.
///
/// The form offers Male, Female, and an unselected blank option; records
/// created before the field is filled in carry `Unset`. Serialises to the
/// exact strings the form submits (`"Male"`, `"Female"`, `""`), and
/// deserialisation is lenient: anything unrecognised reads as `Unset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    #[default]
    Unset,
}

impl Sex {
    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::Unset => "",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Sex {
    fn from(value: &str) -> Self {
        match value {
            "Male" => Sex::Male,
            "Female" => Sex::Female,
            _ => Sex::Unset,
        }
    }
}

impl serde::Serialize for Sex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Sex {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Sex::from(s.as_str()))
    }
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character; input is trimmed during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the
    /// trimmed result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}
