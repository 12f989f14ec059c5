use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type, parse_macro_input, spanned::Spanned};

/// Derives the `rowmap::Entity` trait (plus `FromColumn` and `ListItem` so
/// the type works as a nested entity and as a struct-array element).
///
/// Field attributes:
/// - `#[column(name = "...")]` overrides the logical column name.
/// - `#[column(id)]` marks the entity identifier field.
/// - `#[column(construct)]` makes the field a constructor parameter.
/// - `#[column(skip)]` leaves the field unmapped (kept at its `Default`).
///
/// Struct attribute `#[entity(name = "...")]` overrides the entity name used
/// in diagnostics.
#[proc_macro_derive(Entity, attributes(entity, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_entity(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct EntityField {
    ident: Ident,
    ty: Type,
    column: String,
    id: bool,
    construct: bool,
    skip: bool,
}

fn expand_entity(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Entity does not support generic structs",
        ));
    }

    let entity_name = parse_entity_name(&input.attrs)?.unwrap_or_else(|| struct_name.to_string());

    let data_struct = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Entity can only be derived for structs",
            ));
        }
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Entity requires named fields",
            ));
        }
    };

    let mut fields = Vec::<EntityField>::new();
    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "Entity requires named fields"))?;
        let options = parse_column_options(&field)?;

        if options.skip && (options.id || options.construct || options.name.is_some()) {
            return Err(syn::Error::new(
                field.span(),
                "#[column(skip)] cannot be combined with other column options",
            ));
        }

        let column = options.name.unwrap_or_else(|| ident.to_string());
        if !options.skip {
            if let Some(previous) = fields.iter().find(|f| !f.skip && f.column == column) {
                return Err(syn::Error::new(
                    field.span(),
                    format!(
                        "column name '{}' is already mapped by field '{}'",
                        column, previous.ident
                    ),
                ));
            }
        }

        fields.push(EntityField {
            ident,
            ty: field.ty,
            column,
            id: options.id,
            construct: options.construct,
            skip: options.skip,
        });
    }

    if fields.iter().all(|f| f.skip) {
        return Err(syn::Error::new(
            struct_name.span(),
            "Entity requires at least one mapped field",
        ));
    }

    let id_fields: Vec<&EntityField> = fields.iter().filter(|f| f.id).collect();
    if id_fields.len() > 1 {
        return Err(syn::Error::new(
            id_fields[1].ident.span(),
            "only one field may carry #[column(id)]",
        ));
    }

    let descriptor_fields = fields.iter().filter(|f| !f.skip).map(|f| {
        let name = f.ident.to_string();
        let column = &f.column;
        let ty = &f.ty;
        let construct = f.construct;
        let id = f.id;
        quote! {
            ::rowmap::FieldDescriptor {
                name: #name,
                column: #column,
                field_type: <#ty as ::rowmap::FromColumn>::field_type(),
                constructor_param: #construct,
                id: #id,
            }
        }
    });

    let construct_inits = fields.iter().map(|f| {
        let ident = &f.ident;
        if f.construct {
            let column = &f.column;
            let ty = &f.ty;
            quote! { #ident: args.take::<#ty>(#column, ctx)?, }
        } else {
            quote! { #ident: ::std::default::Default::default(), }
        }
    });

    let set_arms = fields.iter().filter(|f| !f.skip).map(|f| {
        let ident = &f.ident;
        let column = &f.column;
        let ty = &f.ty;
        quote! {
            #column => {
                self.#ident = <#ty as ::rowmap::FromColumn>::from_value(value, ctx)?;
                Ok(())
            }
        }
    });

    let id_value_body = match id_fields.first() {
        Some(field) => {
            let ident = &field.ident;
            quote! { ::std::option::Option::Some(::rowmap::Value::from(self.#ident.clone())) }
        }
        None => quote! { ::std::option::Option::None },
    };

    Ok(quote! {
        impl ::rowmap::Entity for #struct_name {
            fn descriptor() -> &'static ::rowmap::EntityDescriptor {
                static DESCRIPTOR: ::std::sync::OnceLock<::rowmap::EntityDescriptor> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::rowmap::EntityDescriptor::builder(#entity_name)
                        #( .field(#descriptor_fields) )*
                        .build()
                        .expect("entity descriptor validated at derive time")
                })
            }

            #[allow(unused_variables)]
            fn construct(
                args: &mut ::rowmap::ConstructorArgs,
                ctx: &::rowmap::HydrateContext<'_>,
            ) -> ::rowmap::Result<Self> {
                Ok(Self {
                    #( #construct_inits )*
                })
            }

            #[allow(unused_variables)]
            fn set_column(
                &mut self,
                column: &str,
                value: ::rowmap::Value,
                ctx: &::rowmap::HydrateContext<'_>,
            ) -> ::rowmap::Result<()> {
                match column {
                    #( #set_arms )*
                    other => Err(::rowmap::MapError::UnknownColumn {
                        column: other.to_string(),
                        entity: #entity_name.to_string(),
                    }),
                }
            }

            fn id_value(&self) -> ::std::option::Option<::rowmap::Value> {
                #id_value_body
            }
        }

        impl ::rowmap::FromColumn for #struct_name {
            fn field_type() -> ::rowmap::FieldType {
                ::rowmap::FieldType::Entity(#entity_name)
            }

            fn from_value(
                value: ::rowmap::Value,
                ctx: &::rowmap::HydrateContext<'_>,
            ) -> ::rowmap::Result<Self> {
                match value {
                    ::rowmap::Value::Struct(row) => ctx.hydrate::<Self>(&row),
                    other => Err(::rowmap::MapError::TypeMismatch {
                        expected: "STRUCT".to_string(),
                        actual: other.type_name().to_string(),
                    }),
                }
            }
        }

        impl ::rowmap::ListItem for #struct_name {
            fn element_type() -> ::rowmap::ListElement {
                ::rowmap::ListElement::Entity(#entity_name)
            }
        }
    })
}

fn parse_entity_name(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut name = None;
    for attr in attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                name = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported #[entity(...)] option"))
            }
        })?;
    }
    Ok(name)
}

#[derive(Default)]
struct ColumnOptions {
    name: Option<String>,
    id: bool,
    construct: bool,
    skip: bool,
}

fn parse_column_options(field: &syn::Field) -> syn::Result<ColumnOptions> {
    let mut options = ColumnOptions::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("column") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                options.name = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("id") {
                options.id = true;
                Ok(())
            } else if meta.path.is_ident("construct") {
                options.construct = true;
                Ok(())
            } else if meta.path.is_ident("skip") {
                options.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported #[column(...)] option"))
            }
        })?;
    }
    Ok(options)
}
