use serde::{Deserialize, Serialize};

/// Token usage reported by the upstream API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
    /// Cost of the request in USD, when the backend reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

impl Usage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: Some(prompt_tokens + completion_tokens),
            cost: None,
        }
    }

    pub fn cost_only(cost: f64) -> Self {
        Self {
            cost: Some(cost),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_deserializes_openrouter_block() {
        let usage: Usage = serde_json::from_str(
            r#"{"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13, "cost": 0.00002}"#,
        )
        .unwrap();
        assert_eq!(usage.prompt_tokens, 12);
        assert_eq!(usage.completion_tokens, 1);
        assert_eq!(usage.total_tokens, Some(13));
        assert_eq!(usage.cost, Some(0.00002));
    }

    #[test]
    fn test_usage_tolerates_missing_fields() {
        let usage: Usage = serde_json::from_str("{}").unwrap();
        assert_eq!(usage, Usage::default());
    }
}
