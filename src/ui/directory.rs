use crate::common::User;

/// The users known at startup plus the current search filter.
pub struct UserDirectory {
    users: Vec<User>,
    pub query: String,
}

impl UserDirectory {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users,
            query: String::new(),
        }
    }

    pub fn all(&self) -> &[User] {
        &self.users
    }

    /// Case-insensitive substring match on usernames, recomputed from the
    /// full list on every call.
    pub fn search(&self, query: &str) -> Vec<&User> {
        let needle = query.to_lowercase();
        self.users
            .iter()
            .filter(|user| user.username.to_lowercase().contains(&needle))
            .collect()
    }

    /// Entries for the current query.
    pub fn visible(&self) -> Vec<&User> {
        self.search(&self.query)
    }
}
