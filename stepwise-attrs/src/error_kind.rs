use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
    Attribute,
    Expr,
    Fields,
    Ident,
    ItemStruct,
    MetaNameValue,
    Result,
    Token,
};

/// The tags of the `#[error(...)]` attribute, each an expression evaluated with the fields of
/// the struct in scope.
#[derive(Debug)]
pub struct ErrorTags {
    pub message: Expr,
    pub labels: Option<Expr>,
    pub help: Option<Expr>,
}

impl ErrorTags {
    /// Reads the `name = expr` pairs of the attribute. `message` is required, and no tag may
    /// appear twice.
    fn from_attribute(attr: &Attribute) -> Result<Self> {
        let pairs = attr.parse_args_with(Punctuated::<MetaNameValue, Token![,]>::parse_terminated)?;
        let (mut message, mut labels, mut help) = (None, None, None);

        for pair in pairs {
            let slot = if pair.path.is_ident("message") {
                &mut message
            } else if pair.path.is_ident("labels") {
                &mut labels
            } else if pair.path.is_ident("help") {
                &mut help
            } else {
                return Err(syn::Error::new_spanned(&pair.path, "unknown `error` tag"));
            };
            if slot.replace(pair.value).is_some() {
                return Err(syn::Error::new_spanned(&pair.path, "tag given more than once"));
            }
        }

        let message = message
            .ok_or_else(|| syn::Error::new_spanned(attr, "the `error` attribute requires a `message` tag"))?;
        Ok(Self { message, labels, help })
    }
}

/// A struct deriving `ErrorKind`: a unit struct or a struct with named fields, carrying an
/// `#[error(...)]` attribute.
#[derive(Debug)]
pub struct ErrorKindTarget {
    pub name: Ident,
    pub fields: Fields,
    pub tags: ErrorTags,
}

impl ErrorKindTarget {
    /// Brings the fields of `self` into scope as local bindings.
    fn bind_fields(&self) -> TokenStream2 {
        let Fields::Named(named) = &self.fields else {
            return TokenStream2::new();
        };
        let names = named.named.iter().filter_map(|field| field.ident.as_ref());
        quote! {
            #[allow(unused_variables)]
            let Self { #(#names),* } = self;
        }
    }
}

impl Parse for ErrorKindTarget {
    fn parse(input: ParseStream) -> Result<Self> {
        let item = input.parse::<ItemStruct>()?;
        if let Fields::Unnamed(fields) = &item.fields {
            return Err(syn::Error::new_spanned(fields, "`ErrorKind` cannot be derived for tuple structs"));
        }

        let attr = item
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("error"))
            .ok_or_else(|| syn::Error::new_spanned(&item.ident, "missing `#[error(...)]` attribute"))?;
        let tags = ErrorTags::from_attribute(attr)?;

        Ok(Self { name: item.ident, fields: item.fields, tags })
    }
}

impl ToTokens for ErrorKindTarget {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        let bindings = self.bind_fields();
        let message = &self.tags.message;
        let labels = match &self.tags.labels {
            Some(labels) => quote! { #labels },
            None => quote! { ::std::iter::empty::<::std::string::String>() },
        };
        let help = self.tags.help.as_ref().map(|help| quote! { report.set_help(#help); });

        tokens.extend(quote! {
            fn message(&self) -> ::std::string::String {
                #bindings
                (#message).to_string()
            }

            fn build_report<'a>(
                &self,
                src_id: &'a str,
                spans: &[::std::ops::Range<usize>],
            ) -> ariadne::Report<(&'a str, ::std::ops::Range<usize>)> {
                #bindings
                let labels = spans.iter().zip(#labels).map(|(span, text)| {
                    let text = text.to_string();
                    let label = ariadne::Label::new((src_id, span.clone())).with_color(stepwise_error::EXPR);
                    if text.is_empty() { label } else { label.with_message(text) }
                });

                let offset = spans.first().map_or(0, |span| span.start);
                #[allow(unused_mut)]
                let mut report = ariadne::Report::build(ariadne::ReportKind::Error, src_id, offset)
                    .with_message(self.message())
                    .with_labels(labels);
                #help
                report.finish()
            }
        });
    }
}
