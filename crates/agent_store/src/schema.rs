use serde::{Deserialize, Serialize};

/// On-disk shape of `credentials.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
}

impl Credentials {
    #[must_use]
    pub fn new(api_key: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            agent_name: agent_name.into(),
            claim_url: None,
            verification_code: None,
        }
    }

    #[must_use]
    pub fn with_claim(mut self, claim: ClaimInfo) -> Self {
        self.claim_url = claim.claim_url;
        self.verification_code = claim.verification_code;
        self
    }

    #[must_use]
    pub fn claim_info(&self) -> ClaimInfo {
        ClaimInfo {
            claim_url: self.claim_url.clone(),
            verification_code: self.verification_code.clone(),
        }
    }
}

/// Claim descriptor handed out at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimInfo {
    pub claim_url: Option<String>,
    pub verification_code: Option<String>,
}

impl ClaimInfo {
    #[must_use]
    pub fn new(claim_url: impl Into<String>, verification_code: impl Into<String>) -> Self {
        Self {
            claim_url: Some(claim_url.into()),
            verification_code: Some(verification_code.into()),
        }
    }

    #[must_use]
    pub fn has_any(&self) -> bool {
        self.claim_url.is_some() || self.verification_code.is_some()
    }

    /// Both the url and the code are present.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.claim_url.is_some() && self.verification_code.is_some()
    }
}

/// Legacy `registration.json`, written with camelCase keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
}

impl From<RegistrationRecord> for ClaimInfo {
    fn from(record: RegistrationRecord) -> Self {
        Self {
            claim_url: record.claim_url,
            verification_code: record.verification_code,
        }
    }
}
