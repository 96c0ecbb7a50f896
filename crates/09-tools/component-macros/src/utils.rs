//! 宏工具函数

use syn::{Field, GenericArgument, PathArguments, Type};

/// 取类型最后一段路径的第一个泛型参数，例如 `Option<T>` 中的 `T`
pub fn extract_generic_type(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(inner) => Some(inner),
            _ => None,
        }),
        _ => None,
    }
}

/// 类型最后一段路径是否为指定名称
pub fn is_path_type(ty: &Type, name: &str) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == name),
        _ => false,
    }
}

/// 检查类型是否为 `Option<T>`
pub fn is_option_type(ty: &Type) -> bool {
    is_path_type(ty, "Option")
}

/// 检查类型是否为 `Arc<T>`
pub fn is_arc_type(ty: &Type) -> bool {
    is_path_type(ty, "Arc")
}

/// 注入字段的形态
#[derive(Clone, Copy)]
pub enum InjectShape<'a> {
    /// `Option<Arc<K>>`
    Optional(&'a Type),
    /// `Arc<K>`
    Required(&'a Type),
}

/// 识别 `Option<Arc<K>>` 或 `Arc<K>` 并返回 `K`
pub fn inject_shape(ty: &Type) -> Option<InjectShape<'_>> {
    if is_option_type(ty) {
        let inner = extract_generic_type(ty)?;
        if is_arc_type(inner) {
            return extract_generic_type(inner).map(InjectShape::Optional);
        }
        return None;
    }
    if is_arc_type(ty) {
        return extract_generic_type(ty).map(InjectShape::Required);
    }
    None
}

/// 检查字段是否带有指定属性
pub fn field_has_attribute(field: &Field, attr_name: &str) -> bool {
    field.attrs.iter().any(|attr| attr.path().is_ident(attr_name))
}
