pub mod health;
pub mod issues;
pub mod mutations;
pub mod pages;
pub mod statics;

pub use health::*;
pub use issues::*;
pub use mutations::*;
pub use pages::*;
pub use statics::*;
