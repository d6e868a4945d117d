use serde::{Deserialize, Serialize};

/// Customer lifecycle status as reported by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum CustomerStatus {
    Active,
    Pending,
    Inactive,
    Suspended,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub language: Option<String>,
    pub start_date: Option<String>,
    pub status: CustomerStatus,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub language: String,
    /// ISO date, e.g. `2024-01-31`
    pub start_date: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct QuoteRequest {
    pub base_premium: f64,
    pub coverage: f64,
}

impl Default for QuoteRequest {
    fn default() -> Self {
        Self {
            base_premium: 1000.0,
            coverage: 100_000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct QuoteResult {
    pub customer_id: i64,
    pub base_premium: f64,
    pub risk_factor: f64,
    pub loyalty_discount: f64,
    pub final_premium: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_customer() {
        let json = r#"{"id": 42, "name": "Ada Lovelace", "email": "ada@example.com", "phone": null, "identity": {"email": "ada@example.com", "phone": null, "dob": "1815-12-10"}, "gender": "F", "language": "English", "start_date": "2020-01-01", "status": "Active"}"#;
        let customer: Customer = serde_json::from_str(json).expect("Failed to parse customer");
        assert_eq!(customer.id, 42);
        assert_eq!(customer.name, "Ada Lovelace");
        assert!(customer.phone.is_none());
        assert_eq!(customer.status, CustomerStatus::Active);
    }

    #[test]
    fn test_unknown_status_falls_back() {
        let json = r#"{"id": 1, "name": "A B", "email": null, "phone": null, "gender": null, "language": null, "start_date": null, "status": "Archived"}"#;
        let customer: Customer = serde_json::from_str(json).expect("Failed to parse customer");
        assert_eq!(customer.status, CustomerStatus::Unknown);
    }
}
