pub mod credentials;
pub mod role;

pub use credentials::*;
pub use role::*;
