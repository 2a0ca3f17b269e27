use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DepartmentId, Locale, PersonId};

/// An author or researcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub first_name: Option<String>,
    pub last_name: String,
    pub year_of_birth: Option<i32>,
    /// Set once the person is linked to a department for the first time
    pub affiliated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Person {
    /// Display string such as `Anna Svensson, 1971 (Dept. of Physics, Dept. of Chemistry)`.
    pub fn presentation_string<S: AsRef<str>>(&self, department_names: &[S]) -> String {
        let mut result = match &self.first_name {
            Some(first_name) if !first_name.trim().is_empty() => {
                format!("{} {}", first_name.trim(), self.last_name.trim())
            }
            _ => self.last_name.trim().to_string(),
        };
        if let Some(year) = self.year_of_birth {
            result.push_str(&format!(", {}", year));
        }
        if !department_names.is_empty() {
            let names = department_names
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", ");
            result.push_str(&format!(" ({})", names));
        }
        result
    }
}

/// An organizational unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name_sv: String,
    pub name_en: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
}

impl Department {
    pub fn name(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.name_en,
            Locale::Sv => &self.name_sv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(first_name: Option<&str>, year_of_birth: Option<i32>) -> Person {
        Person {
            id: PersonId(1),
            first_name: first_name.map(str::to_string),
            last_name: "Svensson".to_string(),
            year_of_birth,
            affiliated: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn presentation_string_with_departments() {
        let person = person(Some("Anna"), Some(1971));
        assert_eq!(
            person.presentation_string(&["Physics", "Chemistry"]),
            "Anna Svensson, 1971 (Physics, Chemistry)"
        );
    }

    #[test]
    fn presentation_string_without_optional_parts() {
        let person = person(None, None);
        assert_eq!(person.presentation_string::<&str>(&[]), "Svensson");
    }
}
