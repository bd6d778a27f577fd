mod retry;
mod signature;

pub use retry::RetryPolicy;
pub use signature::{sign, verify, SignatureError, SignatureVerifier};
