use serde::{Deserialize, Serialize};

/// The signed-in user as supplied by the identity provider. Only `id` matters to the ledger; it
/// selects which collection is read and written.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub photo: String,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, photo: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            photo: photo.into(),
        }
    }
}
