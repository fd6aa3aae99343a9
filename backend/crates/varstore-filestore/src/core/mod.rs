pub mod factory;
pub mod paths;
pub mod runtime;
