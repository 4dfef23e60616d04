// Resume input: PDF upload to plain text. Runs before, and independently of, the AI layer.

pub mod handlers;
pub mod pdf;
