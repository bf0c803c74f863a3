pub mod store;

pub use store::{FileTemplateSet, ParsedTemplate, TemplateError, TemplateSet, TemplateStore};
