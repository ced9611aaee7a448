use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($name)
            }
        }
    };
}

id_newtype!(NoteId);
id_newtype!(UserId);

/// Error returned when user input names no known color or status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'; expected one of: {expected}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

/// Theme token attached to a note card.
///
/// The wire form is the `custom*` token. Anything the server sends that is not
/// one of the five tokens decodes to [`NoteColor::default`] so a single odd row
/// cannot fail a whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteColor {
    #[default]
    Yellow,
    Red,
    Green,
    Blue,
    Purple,
}

impl NoteColor {
    pub const ALL: [NoteColor; 5] = [
        NoteColor::Yellow,
        NoteColor::Red,
        NoteColor::Green,
        NoteColor::Blue,
        NoteColor::Purple,
    ];

    pub fn token(self) -> &'static str {
        match self {
            NoteColor::Yellow => "customyellow",
            NoteColor::Red => "customred",
            NoteColor::Green => "customgreen",
            NoteColor::Blue => "customblue",
            NoteColor::Purple => "custompurple",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NoteColor::Yellow => "Cream",
            NoteColor::Red => "Rose",
            NoteColor::Green => "Sage",
            NoteColor::Blue => "Sky",
            NoteColor::Purple => "Lavender",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            NoteColor::Yellow => "yellow",
            NoteColor::Red => "red",
            NoteColor::Green => "green",
            NoteColor::Blue => "blue",
            NoteColor::Purple => "purple",
        }
    }

    /// Swatch color as RGB.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            NoteColor::Yellow => [0xE8, 0xD4, 0xA2],
            NoteColor::Red => [0xD4, 0xA5, 0xA5],
            NoteColor::Green => [0xB8, 0xD4, 0xC8],
            NoteColor::Blue => [0xA8, 0xC5, 0xDA],
            NoteColor::Purple => [0xC8, 0xB8, 0xD4],
        }
    }

    /// Whether card text on this swatch should be dark.
    pub fn prefers_dark_text(self) -> bool {
        matches!(self, NoteColor::Yellow | NoteColor::Green)
    }

    fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == value)
    }
}

impl From<String> for NoteColor {
    fn from(value: String) -> Self {
        Self::from_wire(value.trim()).unwrap_or_default()
    }
}

impl From<NoteColor> for String {
    fn from(value: NoteColor) -> Self {
        value.token().to_string()
    }
}

impl FromStr for NoteColor {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.token() == wanted
                    || c.short_name() == wanted
                    || c.label().eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| UnknownVariant {
                kind: "color",
                value: s.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|c| c.short_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Status tag shown as a badge on each card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NoteStatus {
    #[default]
    Note,
    TodoInProgress,
    TodoDone,
    TodoNoStatus,
}

impl NoteStatus {
    pub const ALL: [NoteStatus; 4] = [
        NoteStatus::Note,
        NoteStatus::TodoInProgress,
        NoteStatus::TodoDone,
        NoteStatus::TodoNoStatus,
    ];

    pub fn token(self) -> &'static str {
        match self {
            NoteStatus::Note => "note",
            NoteStatus::TodoInProgress => "todo:inprogress",
            NoteStatus::TodoDone => "todo:done",
            NoteStatus::TodoNoStatus => "todo:nostatus",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NoteStatus::Note => "Note",
            NoteStatus::TodoInProgress => "In Progress",
            NoteStatus::TodoDone => "Done",
            NoteStatus::TodoNoStatus => "No Status",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            NoteStatus::Note => "note",
            NoteStatus::TodoInProgress => "inprogress",
            NoteStatus::TodoDone => "done",
            NoteStatus::TodoNoStatus => "nostatus",
        }
    }

    pub fn is_todo(self) -> bool {
        !matches!(self, NoteStatus::Note)
    }

    fn from_wire(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.token() == value)
    }
}

impl From<String> for NoteStatus {
    fn from(value: String) -> Self {
        Self::from_wire(value.trim()).unwrap_or_default()
    }
}

impl From<NoteStatus> for String {
    fn from(value: NoteStatus) -> Self {
        value.token().to_string()
    }
}

impl FromStr for NoteStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        Self::ALL
            .into_iter()
            .find(|st| {
                st.token() == wanted
                    || st.short_name() == wanted
                    || st.label().replace(' ', "").eq_ignore_ascii_case(&wanted)
            })
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|st| st.short_name())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub color: NoteColor,
    #[serde(default)]
    pub status: NoteStatus,
    #[serde(default)]
    pub starred: bool,
    #[serde(default, alias = "date", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Card date, e.g. `May 21, 2020`.
    pub fn display_date(&self) -> String {
        match self.created_at {
            Some(at) => at.format("%b %-d, %Y").to_string(),
            None => "No date".to_string(),
        }
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
