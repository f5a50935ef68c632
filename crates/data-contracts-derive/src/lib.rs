use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, PathArguments,
    Type,
};

#[proc_macro_derive(Payload, attributes(payload))]
pub fn derive_payload(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

struct VersionedAttr {
    children: Ident,
    key: Ident,
}

#[derive(Default)]
struct PayloadAttrs {
    name: Option<LitStr>,
    from_wire: Option<syn::Path>,
    versioned: Option<VersionedAttr>,
}

fn parse_attrs(input: &DeriveInput) -> syn::Result<PayloadAttrs> {
    let mut attrs = PayloadAttrs::default();

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("payload")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                attrs.name = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("from_wire") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.from_wire = Some(lit.parse()?);
                Ok(())
            } else if meta.path.is_ident("versioned") {
                let mut children = None;
                let mut key = None;
                meta.parse_nested_meta(|inner| {
                    let lit: LitStr = inner.value()?.parse()?;
                    if inner.path.is_ident("children") {
                        children = Some(lit.parse::<Ident>()?);
                    } else if inner.path.is_ident("key") {
                        key = Some(lit.parse::<Ident>()?);
                    } else {
                        return Err(inner.error("expected `children` or `key`"));
                    }
                    Ok(())
                })?;
                attrs.versioned = Some(VersionedAttr {
                    children: children.ok_or_else(|| meta.error("missing `children`"))?,
                    key: key.ok_or_else(|| meta.error("missing `key`"))?,
                });
                Ok(())
            } else {
                Err(meta.error("expected `name`, `from_wire` or `versioned(...)`"))
            }
        })?;
    }

    Ok(attrs)
}

/// Element type of a `Vec<T>` field named `field`.
fn child_type<'a>(input: &'a DeriveInput, field: &Ident) -> syn::Result<&'a Type> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "versioned payloads must be structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "versioned payloads need named fields",
        ));
    };
    let target = named
        .named
        .iter()
        .find(|f| f.ident.as_ref() == Some(field))
        .ok_or_else(|| syn::Error::new_spanned(field, "no such field"))?;

    if let Type::Path(path) = &target.ty {
        if let Some(segment) = path.path.segments.last() {
            if segment.ident == "Vec" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(inner)) = args.args.first() {
                        return Ok(inner);
                    }
                }
            }
        }
    }
    Err(syn::Error::new_spanned(
        &target.ty,
        "children field must be a Vec<T>",
    ))
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = parse_attrs(input)?;
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let contract = attrs
        .name
        .clone()
        .unwrap_or_else(|| LitStr::new(&name.to_string(), name.span()));

    let map_ty = quote! {
        ::data_contracts::__private::serde_json::Map<
            ::std::string::String,
            ::data_contracts::__private::serde_json::Value,
        >
    };

    let from_wire = attrs.from_wire.as_ref().map(|path| {
        quote! {
            fn from_wire(
                map: #map_ty,
                timestamp: ::data_contracts::__private::chrono::DateTime<
                    ::data_contracts::__private::chrono::Utc,
                >,
            ) -> ::std::result::Result<Self, ::data_contracts::ContractError> {
                #path(map, timestamp)
            }
        }
    });

    let Some(versioned) = &attrs.versioned else {
        return Ok(quote! {
            impl #impl_generics ::data_contracts::Payload for #name #ty_generics #where_clause {
                const CONTRACT: &'static str = #contract;

                #from_wire
            }
        });
    };

    let children = &versioned.children;
    let key = &versioned.key;
    let children_name = LitStr::new(&children.to_string(), children.span());
    let child = child_type(input, children)?;

    Ok(quote! {
        impl #impl_generics ::data_contracts::Payload for #name #ty_generics #where_clause {
            const CONTRACT: &'static str = #contract;
            const DERIVED_FIELDS: &'static [&'static str] = &["version"];

            fn to_canonical(&self) -> ::std::result::Result<#map_ty, ::data_contracts::ContractError> {
                ::data_contracts::Versioned::canonical_with_version(self)
            }

            fn check_stripped(&self, stripped: &#map_ty) {
                ::data_contracts::Versioned::warn_on_stale_version(self, stripped)
            }

            #from_wire
        }

        impl #impl_generics ::data_contracts::Versioned for #name #ty_generics #where_clause {
            const CHILDREN_FIELD: &'static str = #children_name;

            type Child = #child;

            fn children(&self) -> &[Self::Child] {
                &self.#children
            }

            fn sort_key(child: &Self::Child) -> &str {
                &child.#key
            }
        }
    })
}
