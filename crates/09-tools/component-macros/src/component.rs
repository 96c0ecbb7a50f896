//! `#[derive(Component)]` 实现

use crate::utils::{field_has_attribute, inject_shape, InjectShape};
use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Path, Result, Type};

/// 结构体级 `#[component(...)]` 参数
#[derive(Default)]
pub struct ComponentArgs {
    /// 无参构造函数来源
    pub constructor: Option<ConstructorSource>,
    /// 实现的接口及其方法名
    pub implements: Vec<(Path, Vec<String>)>,
    /// 无参方法
    pub methods: Vec<Ident>,
    /// 返回 `Result` 的无参方法
    pub try_methods: Vec<Ident>,
    /// 追加描述的函数
    pub customize: Option<Path>,
}

/// 无参构造函数来源
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ConstructorSource {
    /// `Default::default`
    Default,
    /// `Self::new`
    New,
}

impl ComponentArgs {
    /// 从结构体属性中解析参数
    pub fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut args = Self::default();
        for attr in &input.attrs {
            if !attr.path().is_ident("component") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    args.set_constructor(ConstructorSource::Default, &meta.path)
                } else if meta.path.is_ident("new") {
                    args.set_constructor(ConstructorSource::New, &meta.path)
                } else if meta.path.is_ident("implements") {
                    meta.parse_nested_meta(|interface| {
                        let mut methods = Vec::new();
                        if !interface.input.is_empty() && !interface.input.peek(syn::Token![,]) {
                            interface.parse_nested_meta(|method| {
                                methods.push(single_ident(&method.path)?.to_string());
                                Ok(())
                            })?;
                        }
                        args.implements.push((interface.path.clone(), methods));
                        Ok(())
                    })
                } else if meta.path.is_ident("methods") {
                    meta.parse_nested_meta(|method| {
                        args.methods.push(single_ident(&method.path)?.clone());
                        Ok(())
                    })
                } else if meta.path.is_ident("try_methods") {
                    meta.parse_nested_meta(|method| {
                        args.try_methods.push(single_ident(&method.path)?.clone());
                        Ok(())
                    })
                } else if meta.path.is_ident("customize") {
                    args.customize = Some(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("未知的 component 参数"))
                }
            })?;
        }
        Ok(args)
    }

    fn set_constructor(&mut self, source: ConstructorSource, path: &Path) -> Result<()> {
        if self.constructor.is_some() {
            return Err(Error::new(path.span(), "只能声明一个无参构造函数"));
        }
        self.constructor = Some(source);
        Ok(())
    }
}

fn single_ident(path: &Path) -> Result<&Ident> {
    path.get_ident()
        .ok_or_else(|| Error::new(path.span(), "方法名必须是单个标识符"))
}

/// 字段级注入
enum FieldBinding<'a> {
    Component {
        field: &'a Ident,
        name: String,
        shape: InjectShape<'a>,
    },
    Value {
        field: &'a Ident,
        name: String,
        ty: &'a Type,
    },
}

/// 读取 `#[inject(name = "...")]` / `#[value(name = "...")]` 中的属性名
fn property_name(field: &Field, ident: &Ident, attr_name: &str) -> Result<String> {
    let mut name = ident.to_string();
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident(attr_name)) {
        if matches!(attr.meta, syn::Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                name = value.value();
                Ok(())
            } else {
                Err(meta.error("未知的字段参数，只支持 name"))
            }
        })?;
    }
    Ok(name)
}

fn field_bindings(fields: &Fields) -> Result<Vec<FieldBinding<'_>>> {
    let mut bindings = Vec::new();
    for field in fields {
        let inject = field_has_attribute(field, "inject");
        let value = field_has_attribute(field, "value");
        if !inject && !value {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            return Err(Error::new(field.span(), "注入字段必须是具名字段"));
        };
        if inject && value {
            return Err(Error::new(
                field.span(),
                "#[inject] 和 #[value] 不能用于同一字段",
            ));
        }

        if inject {
            let shape = inject_shape(&field.ty).ok_or_else(|| {
                Error::new(
                    field.ty.span(),
                    "#[inject] 字段类型必须是 Option<Arc<K>> 或 Arc<K>",
                )
            })?;
            bindings.push(FieldBinding::Component {
                field: ident,
                name: property_name(field, ident, "inject")?,
                shape,
            });
        } else {
            bindings.push(FieldBinding::Value {
                field: ident,
                name: property_name(field, ident, "value")?,
                ty: &field.ty,
            });
        }
    }
    Ok(bindings)
}

/// 展开 `#[derive(Component)]`
pub fn expand(input: &DeriveInput) -> Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "#[derive(Component)] 不支持泛型类型",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(Error::new(
            input.ident.span(),
            "#[derive(Component)] 只能用于结构体",
        ));
    };

    let args = ComponentArgs::from_input(input)?;
    let bindings = field_bindings(&data.fields)?;
    let ident = &input.ident;

    let constructor = match args.constructor {
        Some(ConstructorSource::Default) => {
            quote! { .constructor0(<Self as ::std::default::Default>::default) }
        }
        Some(ConstructorSource::New) => quote! { .constructor0(Self::new) },
        None => TokenStream::new(),
    };

    let interfaces = args.implements.iter().map(|(path, methods)| {
        quote! {
            .implements::<dyn #path>(
                |component: ::std::sync::Arc<Self>| -> ::std::sync::Arc<dyn #path> { component },
                &[#(#methods),*],
            )
        }
    });

    let properties = bindings.iter().map(|binding| match binding {
        FieldBinding::Component {
            field,
            name,
            shape: InjectShape::Optional(component),
        } => quote! {
            .property::<#component>(#name, |this: &mut Self, value: ::std::sync::Arc<#component>| {
                this.#field = ::std::option::Option::Some(value);
            })
        },
        FieldBinding::Component {
            field,
            name,
            shape: InjectShape::Required(component),
        } => quote! {
            .property::<#component>(#name, |this: &mut Self, value: ::std::sync::Arc<#component>| {
                this.#field = value;
            })
        },
        FieldBinding::Value { field, name, ty } => quote! {
            .value_property::<#ty>(#name, |this: &mut Self, value: #ty| {
                this.#field = value;
            })
        },
    });

    let methods = args.methods.iter().map(|method| {
        let name = method.to_string();
        quote! { .method0(#name, |this: &Self| this.#method()) }
    });
    let try_methods = args.try_methods.iter().map(|method| {
        let name = method.to_string();
        quote! { .try_method0(#name, |this: &Self| this.#method()) }
    });

    let customize = args.customize.as_ref().map(|path| {
        quote! { let builder = #path(builder); }
    });

    Ok(quote! {
        impl ::infrastructure_common::Describe for #ident {
            fn describe() -> ::infrastructure_common::TypeDescriptor {
                let builder = ::infrastructure_common::TypeDescriptor::builder::<Self>()
                    #constructor
                    #(#interfaces)*
                    #(#properties)*
                    #(#methods)*
                    #(#try_methods)*;
                #customize
                builder.build()
            }
        }
    })
}
