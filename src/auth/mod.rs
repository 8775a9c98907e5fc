//! Session authentication and the authorization seam.
//!
//! - `key`: the process-wide secret key
//! - `token`: issue/validate sealed session tokens
//! - `session`: cookie handling and the identity middleware
//! - `policy`: the `Authorizer` collaborator and its allow-list implementation

pub mod key;
pub mod policy;
pub mod session;
pub mod token;

pub use key::SecretKey;
pub use policy::{Action, Authorizer, PolicyAuthorizer, PolicyRule};
pub use session::Identity;
pub use token::TokenCodec;
