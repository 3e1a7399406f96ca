pub mod bss;
pub mod driver;
pub mod error;
pub mod line;
pub mod predicates;
pub mod rewriter;
