use std::collections::HashSet;

/// Right needed to delete publications that are already published
pub const DELETE_PUBLISHED_RIGHT: &str = "delete_published";

/// The authenticated user a request is made on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    pub rights: HashSet<String>,
}

impl CurrentUser {
    pub fn new<I, T>(username: impl Into<String>, rights: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            username: username.into(),
            rights: rights.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_right(&self, right: &str) -> bool {
        self.rights.contains(right)
    }
}
