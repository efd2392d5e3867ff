//! Genre types

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of catalog genres
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    #[serde(rename = "Pop")]
    Pop,
    #[serde(rename = "Hip-Hop")]
    HipHop,
    #[serde(rename = "Ambient")]
    Ambient,
    #[serde(rename = "Indie")]
    Indie,
    #[serde(rename = "Lo-Fi")]
    LoFi,
}

impl Genre {
    pub const ALL: [Genre; 5] = [
        Genre::Pop,
        Genre::HipHop,
        Genre::Ambient,
        Genre::Indie,
        Genre::LoFi,
    ];

    /// Display and storage form
    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Pop => "Pop",
            Genre::HipHop => "Hip-Hop",
            Genre::Ambient => "Ambient",
            Genre::Indie => "Indie",
            Genre::LoFi => "Lo-Fi",
        }
    }

    /// Resolve free-form input to a genre.
    ///
    /// Tries an exact match, then a case-insensitive match, then a substring
    /// match in either direction ("lo-fi beats" and "hop" both resolve).
    pub fn normalize(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        if let Some(genre) = Self::ALL.into_iter().find(|g| g.as_str() == input) {
            return Some(genre);
        }

        let lower = input.to_lowercase();
        if let Some(genre) = Self::ALL
            .into_iter()
            .find(|g| g.as_str().to_lowercase() == lower)
        {
            return Some(genre);
        }

        Self::ALL.into_iter().find(|g| {
            let name = g.as_str().to_lowercase();
            name.contains(&lower) || lower.contains(&name)
        })
    }

    /// Comma separated list of valid values, for error messages
    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
