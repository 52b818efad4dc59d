pub mod ast;
pub mod xml;
