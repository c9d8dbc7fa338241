/// Check encoded in a method-style name such as `isAdmin` or `canEditProduct`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamedCheck {
    /// `is<RoleKey>`
    Role(String),
    /// `can<PermissionKey>`
    Permission(String),
}

impl NamedCheck {
    /// Parses a check name; returns `None` for names of any other shape.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(key) = name.strip_prefix("is")
            && starts_uppercase(key)
        {
            return Some(Self::Role(key.to_owned()));
        }

        if let Some(key) = name.strip_prefix("can")
            && starts_uppercase(key)
        {
            return Some(Self::Permission(key.to_owned()));
        }

        None
    }

    /// Returns the role or permission key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Role(key) | Self::Permission(key) => key.as_str(),
        }
    }
}

fn starts_uppercase(key: &str) -> bool {
    key.chars().next().is_some_and(char::is_uppercase)
}
