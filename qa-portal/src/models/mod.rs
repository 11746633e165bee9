pub mod generate;
pub mod session;

pub use generate::{GenerateRequest, GenerateResult, ModelChoice, ModelKind, Source};
pub use session::{SessionState, SessionUser};
