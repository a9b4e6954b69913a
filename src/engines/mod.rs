//! Search engine implementations.

mod bing;

pub use bing::Bing;
