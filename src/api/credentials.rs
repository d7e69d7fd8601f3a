use serde::Deserialize;

const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// The token the client currently authenticates with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token_type: String,
    pub access_token: String,
}

impl Credentials {
    /// Wraps a bare token, e.g. one read back from the secret store.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Credentials {
            token_type: DEFAULT_TOKEN_TYPE.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl LoginResponse {
    pub fn into_credentials(self) -> Option<Credentials> {
        let access_token = self.access_token.filter(|t| !t.is_empty())?;
        let token_type = self
            .token_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());
        Some(Credentials {
            token_type,
            access_token,
        })
    }
}
