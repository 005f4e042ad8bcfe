/*!
 * Monitoring
 * Logging setup shared by the binary and embedding tools
 */

mod tracer;

pub use tracer::{init_tracing, json_requested, TRACE_JSON_ENV};
