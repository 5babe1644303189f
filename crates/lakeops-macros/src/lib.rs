use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, Meta};

/// Derive macro that generates a companion `*Series` struct holding one
/// column per field of a daily row record.
///
/// The generated struct has the same field names, each as `Vec<T>` of the
/// field's type, along with `with_capacity`, `push`, `len`, and `is_empty`
/// methods. Field types must implement `Clone`. A `column_names()`
/// associated function is also added to the original struct.
///
/// Use `#[record(series_name = "CustomName")]` to override the default
/// series struct name (`{StructName}Series`).
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let vis = &input.vis;

    let series_name = match extract_series_name(&input) {
        Ok(Some(ident)) => ident,
        Ok(None) => format_ident!("{}Series", name),
        Err(err) => return err.to_compile_error().into(),
    };

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(
                    name,
                    "Record can only be derived for structs with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "Record can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    if fields.is_empty() {
        return syn::Error::new_spanned(name, "Record struct must have at least one field")
            .to_compile_error()
            .into();
    }

    let mut column_names = Vec::new();
    let mut field_idents = Vec::new();
    let mut field_types = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        column_names.push(ident.to_string());
        field_idents.push(ident);
        field_types.push(&field.ty);
    }

    let first_field = &field_idents[0];

    let column_name_strs: Vec<&str> = column_names.iter().map(|s| s.as_str()).collect();

    let series_fields = field_idents
        .iter()
        .zip(&field_types)
        .map(|(f, ty)| quote! { pub #f: Vec<#ty> });

    let with_cap_fields = field_idents.iter().map(|f| {
        quote! { #f: Vec::with_capacity(n) }
    });

    let push_fields = field_idents.iter().map(|f| {
        quote! { self.#f.push(::core::clone::Clone::clone(&row.#f)); }
    });

    let expanded = quote! {
        /// Column-oriented series of daily records.
        #[derive(Debug, Clone, Default)]
        #vis struct #series_name {
            #(#series_fields,)*
        }

        impl #series_name {
            /// Pre-allocate all columns for `n` rows.
            pub fn with_capacity(n: usize) -> Self {
                Self {
                    #(#with_cap_fields,)*
                }
            }

            /// Append a single row.
            pub fn push(&mut self, row: &#name) {
                #(#push_fields)*
            }

            /// Number of rows stored.
            pub fn len(&self) -> usize {
                self.#first_field.len()
            }

            /// Returns `true` if no rows have been stored.
            pub fn is_empty(&self) -> bool {
                self.#first_field.is_empty()
            }
        }

        impl #name {
            /// Returns the column names of this record, in declaration order.
            pub fn column_names() -> &'static [&'static str] {
                &[#(#column_name_strs),*]
            }
        }
    };

    expanded.into()
}

fn extract_series_name(input: &DeriveInput) -> syn::Result<Option<proc_macro2::Ident>> {
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }
        let nested = attr.parse_args_with(
            syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated,
        )?;
        for meta in nested {
            if let Meta::NameValue(nv) = meta {
                if nv.path.is_ident("series_name") {
                    if let syn::Expr::Lit(expr_lit) = &nv.value {
                        if let Lit::Str(lit_str) = &expr_lit.lit {
                            return Ok(Some(format_ident!("{}", lit_str.value())));
                        }
                    }
                    return Err(syn::Error::new_spanned(
                        &nv.value,
                        "series_name must be a string literal",
                    ));
                }
            }
        }
    }
    Ok(None)
}
