extern crate proc_macro;

use proc_macro::TokenStream;

/// Implements `actix_web::ResponseError` for an endpoint error enum.
///
/// Variants default to `500 Internal Server Error`; a `#[status_code(NAME)]`
/// attribute on a variant selects any `actix_web::http::StatusCode` constant
/// instead, and `#[status_code(inherit)]` on a single field variant reuses the
/// wrapped error's own status. The body is the error's `source()` chain as a
/// JSON `ErrorDesc`.
#[proc_macro_derive(ApiError, attributes(status_code))]
pub fn derive_response_error(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let name = input.ident;

    let arms = match variant_status_codes(&input.data) {
        Ok(arms) => arms,
        Err(err) => return TokenStream::from(err.to_compile_error()),
    };

    TokenStream::from(quote::quote! {
        impl ::actix_web::ResponseError for #name {
            fn status_code(&self) -> ::actix_web::http::StatusCode {
                #[allow(unreachable_patterns)]
                match self {
                    #(#arms)*
                    _ => ::actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                }
            }

            fn error_response(&self) -> ::actix_web::HttpResponse<::actix_web::body::BoxBody> {
                ::actix_web::HttpResponse::build(self.status_code())
                    .json(::facegate_web_core::ErrorDesc::from(self as &dyn std::error::Error))
            }
        }
    })
}

fn variant_status_codes(data: &syn::Data) -> syn::Result<Vec<proc_macro2::TokenStream>> {
    let variants = match data {
        syn::Data::Enum(data) => &data.variants,
        _ => return Ok(Vec::new()),
    };

    let mut arms = Vec::new();
    for variant in variants.iter() {
        for attr in variant.attrs.iter() {
            if !attr.path.is_ident("status_code") {
                continue;
            }

            let status_code = attr.parse_args::<syn::Ident>()?;
            let variant_name = &variant.ident;

            if status_code == "inherit" {
                match &variant.fields {
                    syn::Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {}
                    _ => {
                        return Err(syn::Error::new_spanned(
                            variant,
                            "status_code(inherit) needs a variant with exactly one unnamed field",
                        ))
                    }
                }

                arms.push(quote::quote! {
                    Self::#variant_name(inner) => ::actix_web::ResponseError::status_code(inner),
                });
            } else {
                arms.push(quote::quote! {
                    Self::#variant_name { .. } => ::actix_web::http::StatusCode::#status_code,
                });
            }
        }
    }

    Ok(arms)
}
