use serde::{Deserialize, Serialize};

/// Customer details captured during the booking flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl CustomerInfo {
    /// Names the first required field that is missing, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.first_name.trim().is_empty() {
            Some("first_name")
        } else if self.last_name.trim().is_empty() {
            Some("last_name")
        } else if self.email.trim().is_empty() {
            Some("email")
        } else {
            None
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ana() -> CustomerInfo {
        CustomerInfo {
            first_name: "Ana".into(),
            last_name: "Ivanova".into(),
            email: "ana@example.com".into(),
            phone: None,
        }
    }

    #[test]
    fn test_complete_customer() {
        assert_eq!(ana().missing_field(), None);
        assert_eq!(ana().full_name(), "Ana Ivanova");
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let mut c = ana();
        c.email = "  ".into();
        assert_eq!(c.missing_field(), Some("email"));
        c.first_name = String::new();
        assert_eq!(c.missing_field(), Some("first_name"));
    }
}
