//! Language front ends: the in-process C++ driver and its tokenizer.

pub mod cpp;
pub mod tokenizer;

pub use cpp::CppFrontEnd;
