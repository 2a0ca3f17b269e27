use bibrec_common::Locale;

/// User facing error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    PublicationNotFound,
    CannotDeletePublished,
    DeleteError,
    NoDataInFile,
    InvalidFile,
    UnsupportedVersion,
    UpdateError,
    IdentifierError,
    PersonNotFound,
    DepartmentNotFound,
    AuthorshipNotFound,
}

impl Message {
    pub fn text(self, locale: Locale) -> &'static str {
        use Message::*;

        match (self, locale) {
            (PublicationNotFound, Locale::En) => "Publication not found",
            (PublicationNotFound, Locale::Sv) => "Publikationen hittades inte",
            (CannotDeletePublished, Locale::En) => "Published publications cannot be deleted",
            (CannotDeletePublished, Locale::Sv) => "Publicerade publikationer kan inte tas bort",
            (DeleteError, Locale::En) => "Could not delete publication",
            (DeleteError, Locale::Sv) => "Publikationen kunde inte tas bort",
            (NoDataInFile, Locale::En) => "No data in file",
            (NoDataInFile, Locale::Sv) => "Filen innehåller ingen data",
            (InvalidFile, Locale::En) => "Invalid file",
            (InvalidFile, Locale::Sv) => "Ogiltig fil",
            (UnsupportedVersion, Locale::En) => "Unsupported EndNote version, version 8 or later is required",
            (UnsupportedVersion, Locale::Sv) => "EndNote-versionen stöds inte, version 8 eller senare krävs",
            (UpdateError, Locale::En) => "Could not save publication",
            (UpdateError, Locale::Sv) => "Publikationen kunde inte sparas",
            (IdentifierError, Locale::En) => "Could not save publication identifiers",
            (IdentifierError, Locale::Sv) => "Publikationens identifierare kunde inte sparas",
            (PersonNotFound, Locale::En) => "Person not found",
            (PersonNotFound, Locale::Sv) => "Personen hittades inte",
            (DepartmentNotFound, Locale::En) => "Department not found",
            (DepartmentNotFound, Locale::Sv) => "Institutionen hittades inte",
            (AuthorshipNotFound, Locale::En) => "Person is not an author of the publication",
            (AuthorshipNotFound, Locale::Sv) => "Personen är inte författare till publikationen",
        }
    }

    /// Message text followed by `: subject` when a subject is given
    pub fn render(self, locale: Locale, subject: Option<&str>) -> String {
        match subject {
            Some(subject) => format!("{}: {}", self.text(locale), subject),
            None => self.text(locale).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_subject() {
        assert_eq!(
            Message::PublicationNotFound.render(Locale::En, Some("42")),
            "Publication not found: 42"
        );
        assert_eq!(
            Message::PublicationNotFound.render(Locale::Sv, None),
            "Publikationen hittades inte"
        );
    }
}
