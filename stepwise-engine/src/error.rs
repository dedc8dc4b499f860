//! Fatal errors raised while building or rewriting expressions.
//!
//! A rule or strategy that simply does not apply is **not** an error; that outcome is `Ok(None)`
//! everywhere in this crate. The kinds below abort the whole computation and propagate through
//! every combinator unchanged.

use ariadne::Fmt;
use stepwise_attrs::ErrorKind;
use stepwise_error::{ErrorKind, EXPR};
use std::{fmt, ops::Range};

/// The broad class of an [`Error`], used by callers to decide how to report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A bug in the way a rule or expression was authored: invalid trees, paths or settings.
    Structural,

    /// A fixed-point loop hit its iteration ceiling, which usually means two rules undo each
    /// other.
    IterationLimit,

    /// The computation observed an external cancellation or deadline.
    Cancelled,
}

/// An operator was given a child that is not allowed at that position.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` cannot be child #{} of a `{}` expression", child, index, operator),
    labels = ["in this expression"],
    help = "wrap the child in brackets, or build the expression with a bracketing helper",
)]
pub struct InvalidChild {
    /// The name of the parent operator.
    pub operator: String,

    /// The position of the offending child.
    pub index: usize,

    /// The rendered child.
    pub child: String,
}

/// An operator was given the wrong number of children.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("a `{}` expression cannot have {} children", operator, found),
    labels = ["in this expression"],
    help = if min == max {
        format!("`{}` takes exactly {} children", operator, min)
    } else {
        format!("`{}` takes between {} and {} children", operator, min, max)
    },
)]
pub struct ChildCount {
    /// The name of the operator.
    pub operator: String,

    /// The minimum number of children.
    pub min: usize,

    /// The maximum number of children.
    pub max: usize,

    /// The number of children given.
    pub found: usize,
}

/// A substitution or lookup was given a path that does not lie inside the subexpression.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("path `{}` does not address a node inside `{}`", path, root),
    labels = ["this expression"],
)]
pub struct InvalidPath {
    /// The offending path.
    pub path: String,

    /// The path of the subexpression it was applied to.
    pub root: String,
}

/// A path string could not be parsed.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not a valid path", input),
    help = format!(
        "paths start at {} or {} and continue with {} segments",
        ".".fg(EXPR),
        "#<task id>".fg(EXPR),
        "/<index>".fg(EXPR),
    ),
)]
pub struct MalformedPath {
    /// The string that failed to parse.
    pub input: String,
}

/// A result builder asked for the value of a pattern that the match never bound.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("pattern #{} is not bound in this match", pattern),
    labels = ["while rewriting this expression"],
    help = "only read patterns that are part of the rule's pattern",
)]
pub struct UnboundPattern {
    /// The identifier of the pattern.
    pub pattern: usize,
}

/// A result builder read a pattern as an integer, but the pattern matched something else.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("pattern #{} matched `{}`, which is not an integer", pattern, expr),
    labels = ["while rewriting this expression"],
    help = "restrict the pattern to integers before reading its value",
)]
pub struct NotAnInteger {
    /// The identifier of the pattern.
    pub pattern: usize,

    /// The rendered expression the pattern matched.
    pub expr: String,
}

/// A setting was assigned a value outside its kind.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("`{}` is not a valid value for the `{}` setting", value, setting),
    help = format!("valid values are: {}", allowed.join(", ")),
)]
pub struct InvalidSettingValue {
    /// The setting being assigned.
    pub setting: String,

    /// The rejected value.
    pub value: String,

    /// The values the setting accepts.
    pub allowed: Vec<String>,
}

/// No strategy with the given name was registered.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("no strategy named `{}` is registered", name),
    help = if suggestions.is_empty() {
        "see the registry for the list of available strategies".to_string()
    } else if suggestions.len() == 1 {
        format!("did you mean the `{}` strategy?", (&*suggestions[0]).fg(EXPR))
    } else {
        format!(
            "did you mean one of these strategies? {}",
            suggestions
                .iter()
                .map(|s| format!("`{}`", s.fg(EXPR)))
                .collect::<Vec<_>>()
                .join(", ")
        )
    },
)]
pub struct UnknownStrategy {
    /// The name that was looked up.
    pub name: String,

    /// Registered names similar to the requested one.
    pub suggestions: Vec<String>,
}

/// A fixed-point loop kept applying without reaching a fixed point.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = format!("rewriting did not settle after {} iterations", limit),
    labels = ["while rewriting this expression"],
    help = "two rules in this loop probably undo each other",
)]
pub struct TooManyIterations {
    /// The iteration ceiling that was reached.
    pub limit: usize,
}

/// The computation was cancelled from outside, or ran past its deadline.
#[derive(Debug, Clone, ErrorKind, PartialEq)]
#[error(
    message = if *deadline_passed {
        "the rewrite ran past its deadline"
    } else {
        "the rewrite was cancelled"
    },
    labels = ["while rewriting this expression"],
)]
pub struct Cancelled {
    /// Whether the deadline elapsed, as opposed to an explicit cancellation.
    pub deadline_passed: bool,
}

macro_rules! error_kinds {
    ($($kind:ident => $category:ident),* $(,)?) => {
        /// Any fatal error the engine can raise.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Error {
            $(
                #[allow(missing_docs)]
                $kind($kind),
            )*
        }

        impl Error {
            /// The category of this error.
            pub fn category(&self) -> ErrorCategory {
                match self {
                    $(Self::$kind(_) => ErrorCategory::$category,)*
                }
            }

            /// The error kind, for building reports.
            pub fn kind(&self) -> &dyn ErrorKind {
                match self {
                    $(Self::$kind(kind) => kind,)*
                }
            }

            /// Converts this error into a span-carrying [`stepwise_error::Error`], with the spans
            /// pointing into the rendered expression the error was raised on.
            pub fn into_report(self, spans: Vec<Range<usize>>) -> stepwise_error::Error {
                match self {
                    $(Self::$kind(kind) => stepwise_error::Error::new(spans, kind),)*
                }
            }
        }

        $(
            impl From<$kind> for Error {
                fn from(kind: $kind) -> Self {
                    Self::$kind(kind)
                }
            }
        )*
    };
}

error_kinds! {
    InvalidChild => Structural,
    ChildCount => Structural,
    InvalidPath => Structural,
    MalformedPath => Structural,
    UnboundPattern => Structural,
    NotAnInteger => Structural,
    InvalidSettingValue => Structural,
    UnknownStrategy => Structural,
    TooManyIterations => IterationLimit,
    Cancelled => Cancelled,
}

impl Error {
    /// Returns true if this error came from a cancellation checkpoint.
    pub fn is_cancelled(&self) -> bool {
        self.category() == ErrorCategory::Cancelled
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind().message())
    }
}

impl std::error::Error for Error {}
