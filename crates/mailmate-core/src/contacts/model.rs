//! Contact model.

/// A named recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    /// Display name (unique key in the directory).
    pub name: String,
    /// Mail address.
    pub address: String,
}

impl Contact {
    /// Creates a new contact.
    #[must_use]
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }

    /// Returns "Name <address>".
    #[must_use]
    pub fn display(&self) -> String {
        format!("{} <{}>", self.name, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let contact = Contact::new("王小明", "ming@example.com");
        assert_eq!(contact.display(), "王小明 <ming@example.com>");
    }
}
