pub mod config;
pub mod convert;
pub mod diag;
pub mod expr;
pub mod split;
