//! Sandboxed app-logic language: lexer, parser and a budgeted tree-walking interpreter.
//!
//! App logic never touches the host directly; every effect goes through [`HostApi`].

pub(crate) mod ast;
pub(crate) mod error;
pub(crate) mod interp;
pub(crate) mod lexer;
pub(crate) mod parser;
pub(crate) mod value;

pub(crate) use ast::Program;
pub(crate) use error::ExecError;
pub(crate) use interp::{HostApi, Sandbox};
pub use interp::SandboxLimits;
pub(crate) use parser::{Page, link_pages, parse_page};
pub use value::Value;
