//! Integration tests exercising the engine and client together.

mod helpers;

mod client_test;
mod engine_test;
