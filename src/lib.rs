//! # tlvschema — TLV Schema Language and Validator
//!
//! A schema language for describing binary Tag-Length-Value (TLV) encoded
//! data structures, with a PEST grammar and a deep semantic validator that
//! resolves cross-references, enforces per-construct qualifier rules, and
//! reports positioned diagnostics.
//!
//! ## Schema language
//!
//! - **Definitions**: `name => TYPE`, repeatable (forward/partial
//!   declarations of one name merge into a single symbol)
//! - **Types**: `STRUCTURE`, `FIELD GROUP`, `ARRAY`/`ARRAY ... OF`,
//!   `LIST`/`LIST ... OF`, `CHOICE OF`, `INTEGER`, `UNSIGNED INTEGER`,
//!   `FLOAT`, `BOOLEAN`, `STRING`, `BYTE STRING`, `ANY`, `NULL`,
//!   `PROTOCOL`, `VENDOR`, plus references to named types
//! - **Qualifiers**: bracketed modifiers (`nullable`, `range 8bit`,
//!   `length 0..16`, `id 0x235A:1`, ...) with per-kind legality rules
//! - **Namespaces**: `namespace a.b { ... }`, nesting arbitrarily; names
//!   resolve outward through enclosing scopes
//!
//! ## Example schema
//!
//! ```text
//! CoreProfile => PROTOCOL [ id Acme:1 ]
//! {
//!     Reading => STRUCTURE [ extensible ]
//!     {
//!         sensor [ tag 1 ] : UNSIGNED INTEGER [ range 16bit ],
//!         value [ tag 2 ] : FLOAT [ range 32bit ],
//!         label [ tag 3, optional ] : STRING [ length 0..64 ],
//!     }
//! }
//! Acme => VENDOR [ id 0x235A ]
//! ```
//!
//! ## Usage
//!
//! ```
//! use tlvschema::{parse, validate};
//!
//! let schema = parse("test => INTEGER [ range 1..0 ]").unwrap();
//! let errs = validate(&schema);
//! assert_eq!(errs.len(), 1);
//! assert!(errs[0].message.contains("must be >="));
//! ```
//!
//! Validation is a pure pass over the parsed tree: every check runs to
//! completion and every violation is reported, in source order. The
//! `check_schema` binary wraps it with `file:line:col: error:` output.

pub mod ast;
pub mod diag;
pub mod dump;
pub mod numeric;
pub mod parser;
pub mod symbols;
pub mod validate;

pub use ast::{Schema, SourcePos};
pub use diag::{Diagnostic, Severity};
pub use dump::dump_schema;
pub use numeric::Number;
pub use parser::{parse, SchemaError};
pub use validate::{validate, validate_with, ValidateOptions};
