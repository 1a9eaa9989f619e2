//! Self-reported user categories shown on profiles.

use crate::locale::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tally_common::TallyError;

/// Self-reported user category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// No category chosen
    #[default]
    Unspecified,
    /// Student
    Student,
    /// Working professional
    Professional,
    /// Content creator
    Creator,
    /// Gamer
    Gamer,
    /// Anything else
    Other,
}

impl Category {
    /// Every category, in menu order
    pub const ALL: [Self; 6] = [
        Self::Unspecified,
        Self::Student,
        Self::Professional,
        Self::Creator,
        Self::Gamer,
        Self::Other,
    ];

    /// Stable storage code
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Student => "student",
            Self::Professional => "professional",
            Self::Creator => "creator",
            Self::Gamer => "gamer",
            Self::Other => "other",
        }
    }

    /// Parse a category from its storage code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.code().eq_ignore_ascii_case(code))
    }

    /// Localized label
    pub const fn label(self, language: Language) -> &'static str {
        match (self, language) {
            (Self::Unspecified, Language::English) => "Not set",
            (Self::Unspecified, Language::Spanish) => "Sin definir",
            (Self::Unspecified, Language::French) => "Non défini",
            (Self::Unspecified, Language::German) => "Nicht gesetzt",

            (Self::Student, Language::English) => "Student",
            (Self::Student, Language::Spanish) => "Estudiante",
            (Self::Student, Language::French) => "Étudiant",
            (Self::Student, Language::German) => "Student",

            (Self::Professional, Language::English) => "Professional",
            (Self::Professional, Language::Spanish) => "Profesional",
            (Self::Professional, Language::French) => "Professionnel",
            (Self::Professional, Language::German) => "Berufstätig",

            (Self::Creator, Language::English) => "Creator",
            (Self::Creator, Language::Spanish) => "Creador",
            (Self::Creator, Language::French) => "Créateur",
            (Self::Creator, Language::German) => "Kreativ",

            (Self::Gamer, Language::English) => "Gamer",
            (Self::Gamer, Language::Spanish) => "Jugador",
            (Self::Gamer, Language::French) => "Joueur",
            (Self::Gamer, Language::German) => "Spieler",

            (Self::Other, Language::English) => "Other",
            (Self::Other, Language::Spanish) => "Otro",
            (Self::Other, Language::French) => "Autre",
            (Self::Other, Language::German) => "Sonstiges",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Category {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim()).ok_or_else(|| {
            TallyError::validation_field(format!("Unsupported category '{s}'"), "category")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unspecified() {
        assert_eq!(Category::default(), Category::Unspecified);
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Category::Gamer).unwrap(), "\"gamer\"");
        let parsed: Category = serde_json::from_str("\"professional\"").unwrap();
        assert_eq!(parsed, Category::Professional);
    }

    #[test]
    fn test_every_category_has_labels() {
        for category in Category::ALL {
            for language in Language::ALL {
                assert!(!category.label(language).is_empty());
            }
            assert_eq!(category.code().parse::<Category>().unwrap(), category);
        }
    }
}
