// Domain layer: backend record shapes and the ports the core talks through.

pub mod model;
pub mod ports;
