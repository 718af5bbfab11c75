use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, FieldsNamed, LitStr, Type};

/// Derive macro for implementing the FieldRecord trait
/// 
/// Every named field becomes a field value under its own name. `Option`
/// fields are only written when they hold a value.
/// 
/// # Examples
/// 
/// ```ignore
/// use content_model::FieldRecord;
/// 
/// #[derive(FieldRecord)]
/// struct Book {
///     title: String,
///     pages: u32,
///     #[field(rename = "post_content")]
///     body: String,
///     #[field(skip)]
///     cached_html: String,
/// }
/// ```
#[proc_macro_derive(FieldRecord, attributes(field))]
pub fn derive_field_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    
    match generate_field_record_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_field_record_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    
    let data = match &input.data {
        Data::Struct(data) => data,
        _ => return Err(syn::Error::new_spanned(input, "FieldRecord can only be derived for structs")),
    };
    
    let fields = match &data.fields {
        Fields::Named(fields) => fields,
        Fields::Unnamed(_) => return Err(syn::Error::new_spanned(input, "FieldRecord requires named fields")),
        Fields::Unit => return Err(syn::Error::new_spanned(input, "FieldRecord cannot be derived for unit structs")),
    };
    
    let inserts = generate_field_inserts(fields)?;
    
    Ok(quote! {
        impl #impl_generics ::content_model::FieldRecord for #name #ty_generics #where_clause {
            fn to_field_values(&self) -> ::content_model::FieldValues {
                let mut values = ::content_model::FieldValues::new();
                
                #inserts
                
                values
            }
        }
    })
}

fn generate_field_inserts(fields: &FieldsNamed) -> syn::Result<TokenStream2> {
    let mut inserts = Vec::new();
    
    for field in &fields.named {
        let Some(field_name) = field.ident.as_ref() else {
            continue;
        };
        
        let attrs = parse_field_attributes(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        
        let key = attrs.rename.unwrap_or_else(|| field_name.to_string());
        
        if is_option_type(&field.ty) {
            inserts.push(quote! {
                if let Some(value) = &self.#field_name {
                    values.insert(#key, ::content_model::__serde_json::Value::from(value.clone()));
                }
            });
        } else {
            inserts.push(quote! {
                values.insert(#key, ::content_model::__serde_json::Value::from(self.#field_name.clone()));
            });
        }
    }
    
    Ok(quote! {
        #(#inserts)*
    })
}

#[derive(Default)]
struct FieldAttributes {
    skip: bool,
    rename: Option<String>,
}

fn parse_field_attributes(attrs: &[Attribute]) -> syn::Result<FieldAttributes> {
    let mut result = FieldAttributes::default();
    
    for attr in attrs {
        if !attr.path().is_ident("field") {
            continue;
        }
        
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                result.skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                result.rename = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("Invalid field attribute, expected `skip` or `rename = \"...\"`"))
            }
        })?;
    }
    
    Ok(result)
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
