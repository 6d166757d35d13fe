// Domain layer: core models, ports and the day-resolution services.
// No I/O here; storage and geocoding come in through the ports.

pub mod model;
pub mod ports;

pub mod services;
