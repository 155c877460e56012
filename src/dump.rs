//! Format a parsed schema for display (indented tree dump).

use crate::ast::*;

/// Render a schema as an indented textual tree, one construct per line.
pub fn dump_schema(schema: &Schema) -> String {
    let mut out = String::new();
    for item in &schema.items {
        dump_item(item, 0, &mut out);
    }
    out
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn dump_item(item: &Item, depth: usize, out: &mut String) {
    match item {
        Item::Namespace(ns) => {
            indent(out, depth);
            out.push_str("namespace ");
            out.push_str(&ns.segments.join("."));
            out.push('\n');
            for inner in &ns.items {
                dump_item(inner, depth + 1, out);
            }
        }
        Item::TypeDef(def) => dump_def(def, depth, out),
    }
}

fn dump_def(def: &TypeDef, depth: usize, out: &mut String) {
    indent(out, depth);
    out.push_str(&def.name);
    out.push_str(" => ");
    out.push_str(&type_label(&def.ty));
    out.push('\n');
    dump_children(&def.ty, depth + 1, out);
}

fn type_label(ty: &Type) -> String {
    let mut label = match &ty.kind {
        TypeKind::Ref(name) => name.clone(),
        other => other.keyword().to_string(),
    };
    if !ty.qualifiers.is_empty() {
        let quals: Vec<String> = ty.qualifiers.iter().map(qualifier_text).collect();
        label.push_str(" [ ");
        label.push_str(&quals.join(", "));
        label.push_str(" ]");
    }
    label
}

fn dump_children(ty: &Type, depth: usize, out: &mut String) {
    match &ty.kind {
        TypeKind::Structure(members)
        | TypeKind::FieldGroup(members)
        | TypeKind::Array(members)
        | TypeKind::List(members)
        | TypeKind::ChoiceOf(members) => {
            for member in members {
                dump_member(member, depth, out);
            }
        }
        TypeKind::ArrayOf(elem) | TypeKind::ListOf(elem) => {
            indent(out, depth);
            out.push_str("of ");
            out.push_str(&type_label(elem));
            out.push('\n');
            dump_children(elem, depth + 1, out);
        }
        TypeKind::Protocol(defs) => {
            for def in defs {
                dump_def(def, depth, out);
            }
        }
        _ => {}
    }
}

fn dump_member(member: &Member, depth: usize, out: &mut String) {
    indent(out, depth);
    if let Some(name) = &member.name {
        out.push_str(name);
        if !member.qualifiers.is_empty() {
            let quals: Vec<String> = member.qualifiers.iter().map(qualifier_text).collect();
            out.push_str(" [ ");
            out.push_str(&quals.join(", "));
            out.push_str(" ]");
        }
        out.push_str(" : ");
    }
    out.push_str(&type_label(&member.ty));
    if member.repeated {
        out.push_str(" *");
    }
    out.push('\n');
    dump_children(&member.ty, depth + 1, out);
}

fn qualifier_text(qual: &Qualifier) -> String {
    match &qual.kind {
        QualifierKind::Range(arg) => match arg {
            RangeArg::Width(w) => format!("range {}", w.keyword()),
            RangeArg::Bounds { lower, upper } => format!("range {}..{}", lower, upper),
        },
        QualifierKind::Length(arg) => match arg {
            LengthArg::Exact(n) => format!("length {}", n),
            LengthArg::Range {
                lower,
                upper: Some(upper),
            } => format!("length {}..{}", lower, upper),
            LengthArg::Range { lower, upper: None } => format!("length {}..", lower),
        },
        QualifierKind::Id(arg) => match arg {
            IdArg::Value(n) => format!("id {}", n),
            IdArg::Composite { vendor, number } => match vendor {
                VendorRef::Literal(n) => format!("id {}:{}", n, number),
                VendorRef::Name(name) => format!("id {}:{}", name, number),
            },
        },
        QualifierKind::Tag(TagArg(n)) => format!("tag {}", n),
        plain => plain.keyword().to_string(),
    }
}
