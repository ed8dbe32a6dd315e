mod password;
pub use password::{hash_password, verify_password};
mod bearer;
pub use bearer::{BEARER_PREFIX, check_bearer};
mod error;
pub use error::{BearerError, CryptError, CryptResult};
