use serde::{Deserialize, Serialize};

/// General-interest search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// District, neighbourhood or free-text location
    pub location: String,
    /// Property type such as "apartment" or "house"
    pub property_type: String,
}

impl SearchQuery {
    /// Free-text form sent to site search boxes
    pub fn terms(&self) -> String {
        format!("{} {}", self.property_type.trim(), self.location.trim())
            .trim()
            .to_string()
    }
}
