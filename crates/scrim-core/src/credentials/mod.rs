//! Credential store access and provider status

mod status;
mod store;

pub use status::{
    ConfigStatus, CredentialEntry, CredentialReport, CredentialStatus, ProviderStatus,
    is_configured,
};
pub use store::{CredentialStore, DEFAULT_CREDENTIALS_PATH};
