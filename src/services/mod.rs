pub mod bd;
pub mod whoami;
