//! # oslorego compiler
//!
//! Translates OpenStack `oslo.policy` rule documents into Rego modules.
//!
//! This crate provides:
//!
//! - A tokenizer and state-machine parser for oslo.policy rule expressions
//! - Classification and rendering of `left:right` assertions
//! - Deterministic naming of the rules generated for parenthesized groups
//! - Assembly of the final Rego module
//!
//! ## Example
//!
//! ```rust
//! use oslorego_compiler::{Compiler, CompilerConfig};
//!
//! let source = r#"
//! admin_required: role:admin
//! "identity:get_user": rule:admin_required or user_id:%(target.user.id)s
//! "#;
//!
//! let compiler = Compiler::with_config(CompilerConfig::new().with_package_name("keystone.policy"));
//! let rego = compiler.compile_str(source).unwrap();
//!
//! assert!(rego.starts_with("package keystone.policy\n"));
//! assert!(rego.contains("credentials.user_id = target.target.user.id"));
//! ```

pub mod assembler;
pub mod classifier;
pub mod comparison;
pub mod compiler;
pub mod config;
pub mod document;
pub mod error;
pub mod naming;
pub mod package;
pub mod parser;
pub mod rule;
pub mod tokenizer;


pub use assembler::PolicyAssembler;
pub use compiler::{oslo_policy_to_rego, CompilationSummary, CompiledPolicy, Compiler};
pub use config::CompilerConfig;
pub use document::PolicyDocument;
pub use error::{CompilerError, ExpressionError, Result};
pub use naming::{AliasAllocator, SequentialAliases};
pub use package::PackageName;
pub use parser::ExpressionParser;
pub use rule::{RuleKind, RuleRecord};
