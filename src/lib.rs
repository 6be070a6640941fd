// Session controller and its gateways
pub mod domain;
pub mod shared;
pub mod config;

// HTTP backend and terminal front-end
pub mod infrastructure;
pub mod cli;
