//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "FromRow can only be derived for structs",
            ));
        }
    };

    let mut arity = 0usize;
    let mut extracts = Vec::with_capacity(fields.len());
    for field in fields {
        if is_skipped(field)? {
            extracts.push(quote! { ::core::default::Default::default() });
        } else {
            arity += 1;
            extracts.push(quote! { reader.next()? });
        }
    }

    let construct = match fields {
        Fields::Named(named) => {
            let idents = named.named.iter().map(|f| &f.ident);
            quote! { Self { #(#idents: #extracts),* } }
        }
        Fields::Unnamed(_) => quote! { Self ( #(#extracts),* ) },
        Fields::Unit => quote! { Self },
    };

    let reader_binding = if arity == 0 {
        quote! { let _ = ::sqlsplice::RowReader::new(row, 0)?; }
    } else {
        quote! { let mut reader = ::sqlsplice::RowReader::new(row, #arity)?; }
    };

    Ok(quote! {
        impl #impl_generics ::sqlsplice::FromRow for #name #ty_generics #where_clause {
            fn from_row(
                row: ::sqlsplice::Row,
            ) -> ::core::result::Result<Self, ::sqlsplice::ConversionError> {
                #reader_binding
                ::core::result::Result::Ok(#construct)
            }
        }
    })
}

fn is_skipped(field: &syn::Field) -> Result<bool> {
    let mut skip = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("sqlsplice") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown sqlsplice attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}
