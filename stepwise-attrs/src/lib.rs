mod error_kind;

use error_kind::ErrorKindTarget;
use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;

/// Derives the [`ErrorKind`] trait for the given struct.
///
/// This trait can be derived for unit structs and structs with named fields.
///
/// The information of the error can be customized using the `error` attribute by adding the
/// corresponding tags to it:
/// ```
/// use stepwise_attrs::ErrorKind;
/// use stepwise_error::ErrorKind;
///
/// #[derive(Debug, ErrorKind)]
/// #[error(
///     message = format!("rule `{}` cannot be found", name),
///     labels = ["while rewriting this expression"],
///     help = "check the spelling of the rule name",
/// )]
/// pub struct MissingRule {
///     name: String,
/// }
///
/// let kind = MissingRule { name: "AddFractions".to_string() };
/// assert_eq!(kind.message(), "rule `AddFractions` cannot be found");
/// ```
///
/// The following tags are available:
///
/// | Tag         | Description                                                                  |
/// | ----------- | ---------------------------------------------------------------------------- |
/// | `message`   | The message displayed at the top of the error when it is displayed.          |
/// | `labels`    | The texts of the labels that point to each span of the error, in order.      |
/// | `help`      | Optional help text for the error, describing what the user can do to fix it. |
///
/// `message` is required. Each tag accepts an expression; `message` and `help` should evaluate to
/// something implementing [`ToString`], and `labels` to an iterable of such values. For structs
/// with named fields, the expression is evaluated with the members of the struct in scope, so
/// they can be used in the expression (tuple structs are not supported).
///
/// Labels without a matching span are dropped, and an empty label string produces a label with
/// no message.
#[proc_macro_derive(ErrorKind, attributes(error))]
pub fn error_kind(item: TokenStream) -> TokenStream {
    let target = parse_macro_input!(item as ErrorKindTarget);
    let name = &target.name;
    quote! {
        impl ErrorKind for #name {
            #target
        }
    }.into()
}
