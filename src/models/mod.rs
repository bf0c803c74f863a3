pub mod error;
pub mod health;
pub mod issue;
pub mod requests;

pub use error::*;
pub use health::*;
pub use issue::*;
pub use requests::*;
