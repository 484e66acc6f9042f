//! Observability for the leadbay services: tracing subscriber setup and
//! optional OpenTelemetry span export.

pub mod tracing_setup;
