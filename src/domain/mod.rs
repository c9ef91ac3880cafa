// Domain layer: catalog records and the ports (interfaces) the resolver depends on.

pub mod model;
pub mod ports;
