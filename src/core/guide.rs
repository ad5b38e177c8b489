//! Guide data model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category a guide is filed under.
///
/// The payload may carry categories this build does not know about. They are
/// kept verbatim in [`Category::Other`] and never match a filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Kitchen,
    Bathroom,
    Bedroom,
    LivingRoom,
    Office,
    Outdoor,
    Emergency,
    Seasonal,
    Other(String),
}

impl Category {
    /// Categories that can be selected as a filter, in display order.
    pub const KNOWN: [Self; 8] = [
        Self::Kitchen,
        Self::Bathroom,
        Self::Bedroom,
        Self::LivingRoom,
        Self::Office,
        Self::Outdoor,
        Self::Emergency,
        Self::Seasonal,
    ];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Kitchen => "kitchen",
            Self::Bathroom => "bathroom",
            Self::Bedroom => "bedroom",
            Self::LivingRoom => "living-room",
            Self::Office => "office",
            Self::Outdoor => "outdoor",
            Self::Emergency => "emergency",
            Self::Seasonal => "seasonal",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Kitchen => "Kitchen",
            Self::Bathroom => "Bathroom",
            Self::Bedroom => "Bedroom",
            Self::LivingRoom => "Living Room",
            Self::Office => "Home Office",
            Self::Outdoor => "Outdoor",
            Self::Emergency => "Emergency",
            Self::Seasonal => "Seasonal",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Parse a category name. Unknown names become [`Category::Other`].
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "kitchen" => Self::Kitchen,
            "bathroom" => Self::Bathroom,
            "bedroom" => Self::Bedroom,
            "living-room" | "living_room" | "livingroom" => Self::LivingRoom,
            "office" => Self::Office,
            "outdoor" => Self::Outdoor,
            "emergency" => Self::Emergency,
            "seasonal" => Self::Seasonal,
            _ => Self::Other(raw.to_string()),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Unspecified,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Unspecified => "",
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Unspecified,
        }
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One maintenance guide. Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "room")]
    pub category: Category,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub time_estimate: String,
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Guide {
    /// Lowercased text the index tokenizes: title, description, content,
    /// category, difficulty, keywords and tools.
    #[must_use]
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<&str> = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.content.as_str(),
            self.category.as_str(),
            self.difficulty.as_str(),
        ];
        parts.extend(self.keywords.iter().map(String::as_str));
        parts.extend(self.tools.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(keyword))
    }
}
