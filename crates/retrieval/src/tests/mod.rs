//! End-to-end tests of the answering pipeline.

mod pipeline;
mod support;
