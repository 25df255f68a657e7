use std::collections::HashSet;

use rollcall_types::ids::UserId;

/// Users who may never appear in a roster. Loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct DenyList {
    users: HashSet<UserId>,
}

impl DenyList {
    /// Parses a comma-separated id list. Blank entries are skipped.
    pub fn from_csv(raw: &str) -> Self {
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(UserId::new)
            .collect()
    }

    pub fn contains(&self, user: &UserId) -> bool {
        self.users.contains(user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl FromIterator<UserId> for DenyList {
    fn from_iter<I: IntoIterator<Item = UserId>>(iter: I) -> Self {
        Self {
            users: iter.into_iter().collect(),
        }
    }
}
