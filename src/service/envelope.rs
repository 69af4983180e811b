use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// The `{success, data, message}` shape every store call is reported in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn into_result(self) -> Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (_, _) => Err(anyhow!(
                self.message.unwrap_or_else(|| "Request failed".to_string())
            )),
        }
    }
}

/// Runs a store call and wraps its outcome. Failures are logged here
/// since callers only look at the envelope.
pub fn call<T>(action: &str, f: impl FnOnce() -> Result<T>) -> Envelope<T> {
    log::debug!("service call: {}", action);
    match f() {
        Ok(data) => Envelope::ok(data),
        Err(err) => {
            log::error!("{} failed: {:#}", action, err);
            Envelope::fail(format!("Failed to {}: {}", action, err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_call_carries_message() {
        let env: Envelope<Vec<i32>> = call("load members", || Err(anyhow!("disk gone")));
        assert!(!env.success);
        assert_eq!(env.data, None);
        assert_eq!(env.message.as_deref(), Some("Failed to load members: disk gone"));
        assert!(env.into_result().is_err());
    }

    #[test]
    fn json_shape_omits_empty_fields() {
        let env = Envelope::ok(vec![1, 2]);
        let json = serde_json::to_string(&env).unwrap();
        assert_eq!(json, r#"{"success":true,"data":[1,2]}"#);

        let back: Envelope<Vec<i32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.into_result().unwrap(), vec![1, 2]);
    }
}
