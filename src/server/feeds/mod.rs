//! Release feed implementations

pub mod github;
