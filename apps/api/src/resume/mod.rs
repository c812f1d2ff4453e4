// Resume generation: template selection, the merge call, scratch files and
// the HTTP handler that ties them together.

pub mod handlers;
pub mod scratch;
pub mod service;
pub mod templates;
