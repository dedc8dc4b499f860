//! Explainable rewriting of mathematical expressions.
//!
//! The engine rewrites an [`Expression`](expr::Expression) one small step at a time and records
//! every step as a [`Transformation`](transformation::Transformation): what was rewritten, what it
//! became, why, and how every part of the result relates to the input (its provenance).
//!
//! # Building blocks
//!
//! - [`pattern`]: composable patterns that search an expression for bindings, first match first.
//! - [`mapping`]: expressions tagged with provenance edges back to the paths they came from.
//! - [`rule`]: a pattern plus a result builder, the atomic unit of rewriting.
//! - [`strategy`]: combinators assembling rules into multi-step strategies, plans and task sets.
//! - [`context`]: the per-request configuration, and selection among context-specific
//!   alternatives.
//! - [`registry`]: a read-only lookup table of named strategies.
//!
//! ```
//! use stepwise_engine::{
//!     context::Context,
//!     expr::{Expression, Subexpression},
//!     pattern::integer,
//!     rule::Rule,
//!     transformation::MetadataKey,
//! };
//!
//! const DOUBLE: MetadataKey = MetadataKey::new("Example", "Double");
//!
//! let n = integer();
//! let double = Rule::new("Double", n.clone(), move |r| {
//!     let doubled = Expression::integer(r.integer(&n)? * 2);
//!     Ok(Some(r.result(r.transform(&n, doubled)?, r.metadata(DOUBLE, &[&n])?)))
//! });
//!
//! let step = double
//!     .apply(&Context::new(), &Subexpression::root(Expression::integer(21)))
//!     .unwrap()
//!     .unwrap();
//! assert_eq!(step.to.expr.to_string(), "42");
//! ```
//!
//! # Features
//!
//! - `serde`: Derives [`serde`] traits for configuration and provenance types.

pub mod cancel;
pub mod context;
pub mod error;
pub mod expr;
pub mod mapping;
pub mod pattern;
pub mod primitive;
pub mod registry;
pub mod rule;
pub mod strategy;
pub mod transformation;
