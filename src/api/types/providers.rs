//! Provider catalog and key validation types

use serde::{Deserialize, Serialize};

use crate::domain::{ProviderId, ProviderInfo};

#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderModelsResponse {
    pub provider: ProviderId,
    pub models: &'static [&'static str],
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateKeyRequest {
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateKeyResponse {
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::available_models;

    #[test]
    fn test_models_response_shape() {
        let response = ProviderModelsResponse {
            provider: ProviderId::Google,
            models: available_models(ProviderId::Google),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["provider"], "google");
        assert!(json["models"].as_array().unwrap().len() >= 1);
    }

    #[test]
    fn test_validate_key_request_camel_case() {
        let request: ValidateKeyRequest = serde_json::from_str(r#"{"apiKey": "sk-1"}"#).unwrap();
        assert_eq!(request.api_key, "sk-1");
    }
}
