pub mod guardrail;

pub use guardrail::{content_length_guard, MAX_BODY_BYTES};
