//! A catalogue of step-by-step strategies for integer, fraction and mixed number arithmetic,
//! built on [`stepwise_engine`].
//!
//! Rules and plans are lazily built statics, shared through [`Arc`](std::sync::Arc)s so they
//! can be composed into larger strategies and registered at the same time. Every strategy is
//! also available by name through [`registry::REGISTRY`].
//!
//! ```
//! use stepwise_engine::{
//!     context::{Context, Preset},
//!     expr::{Expression, Subexpression},
//!     primitive::int,
//! };
//! use stepwise_methods::registry::REGISTRY;
//!
//! let sum = Expression::sum(vec![
//!     Expression::mixed_number(int(5), int(1), int(4)).unwrap(),
//!     Expression::mixed_number(int(2), int(2), int(3)).unwrap(),
//! ]).unwrap();
//!
//! let ctx = Context::new().with_preset(Preset::EuCurriculum);
//! let add = REGISTRY.get("AddMixedNumbers").unwrap();
//! let result = add.try_execute(&ctx, &Subexpression::root(sum)).unwrap().unwrap();
//! assert_eq!(result.to.expr.to_string(), "[7 11/12]");
//! ```

pub mod explanation;
pub mod fractions;
pub mod general;
pub mod integers;
pub mod mixed_numbers;
pub mod registry;
