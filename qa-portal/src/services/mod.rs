pub mod auth;
pub mod dispatcher;
pub mod metrics;
pub mod offline;
pub mod prompt;
pub mod providers;

pub use auth::{AuthError, Authenticator, Credentials, StaticCredentialAuthenticator};
pub use dispatcher::{DispatchError, ProviderDispatcher};
pub use offline::OfflineResponder;
