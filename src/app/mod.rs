// Application layer: concrete pipelines wiring adapters and domain services together.

pub mod pipelines;
