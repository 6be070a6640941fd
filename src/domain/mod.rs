// Domain layer: session entities, the quota rule and the gateway contracts
pub mod models;
pub mod services;
