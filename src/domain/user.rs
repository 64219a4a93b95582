use serde::{Deserialize, Serialize};

/// A recipient known to the user directory. Ids are opaque strings owned
/// by the upstream account system, not something we mint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}
