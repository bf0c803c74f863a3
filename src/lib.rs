pub mod config;
pub mod handlers;
pub mod livereload;
pub mod models;
pub mod routes;
pub mod services;
pub mod tmpl;
