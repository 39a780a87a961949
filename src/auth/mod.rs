pub mod access;
pub mod authentication;
pub mod password;
pub mod permissions;
pub mod user;

pub use access::*;
pub use authentication::*;
pub use password::*;
pub use permissions::*;
pub use user::*;
