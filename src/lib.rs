pub mod adverbs;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod ops;
pub mod parser;
pub mod printer;
pub mod repl;
pub mod value;
pub mod verbs;
