//! Docker Store billing subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    #[serde(default)]
    pub name: String,
    pub subscription_id: String,
    #[serde(default)]
    pub docker_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub created_by_docker_id: String,
    #[serde(default)]
    pub product_rate_plan: String,
    #[serde(default)]
    pub product_rate_plan_id: String,
    #[serde(default)]
    pub initial_period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub eusa: Option<Eusa>,
    #[serde(default)]
    pub pricing_components: Vec<PricingComponent>,
    #[serde(default)]
    pub marketing_opt_in: bool,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.state == "active"
    }
}

/// End-user subscription agreement acceptance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eusa {
    #[serde(default)]
    pub accepted: bool,
    #[serde(default)]
    pub accepted_by: String,
    #[serde(default)]
    pub accepted_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingComponent {
    pub name: String,
    #[serde(default)]
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_store_payload() {
        let sub: Subscription = serde_json::from_str(
            r#"{
                "name": "Docker Enterprise",
                "subscription_id": "sub-123",
                "docker_id": "d1",
                "product_id": "p1",
                "current_period_end": "2019-06-01T00:00:00Z",
                "state": "active",
                "eusa": {"accepted": true, "accepted_by": "alice", "accepted_on": "2018-06-01T10:00:00Z"},
                "pricing_components": [{"name": "Nodes", "value": 10}]
            }"#,
        )
        .unwrap();

        assert!(sub.is_active());
        assert_eq!(sub.pricing_components[0].value, 10);
        assert!(sub.eusa.unwrap().accepted);
        assert!(sub.initial_period_start.is_none());
    }
}
