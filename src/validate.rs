//! Semantic validation of a parsed schema.
//!
//! Three passes over run-scoped state: build the symbol table, check every
//! definition in source order (duplicate qualifiers, per-kind legality,
//! argument semantics, id resolution), then cross-declaration consistency
//! over the completed table. Every check runs to completion; malformed input
//! always degrades to a diagnostic, never aborts the run.

use crate::ast::*;
use crate::diag::{Diagnostic, Diagnostics};
use crate::numeric::Number;
use crate::symbols::{Occurrence, ScopeId, SymbolTable};
use std::collections::HashSet;

/// Knobs for checks the schema dialect leaves open.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Also require vendor ids to be globally unique, by analogy with
    /// protocol ids.
    pub require_unique_vendor_ids: bool,
}

/// Validate a schema with default options.
pub fn validate(schema: &Schema) -> Vec<Diagnostic> {
    validate_with(schema, &ValidateOptions::default())
}

/// Validate a schema. Total and deterministic; all state is scoped to this
/// call, so independent schemas can be validated concurrently.
pub fn validate_with(schema: &Schema, options: &ValidateOptions) -> Vec<Diagnostic> {
    let table = SymbolTable::build(schema);
    let mut diags = Diagnostics::new();
    let mut resolved = Vec::with_capacity(table.occurrences().len());
    for occ in table.occurrences() {
        resolved.push(check_type(&occ.def.ty, &table, occ.scope, &mut diags));
    }
    check_consistency(&table, &resolved, options, &mut diags);
    diags.into_vec()
}

/// Qualifiers each construct kind accepts.
fn allowed_qualifiers(kind: &TypeKind) -> &'static [&'static str] {
    match kind {
        TypeKind::Structure(_) => &[
            "extensible",
            "private",
            "nullable",
            "invariant",
            "tag-order",
            "schema-order",
            "any-order",
        ],
        TypeKind::FieldGroup(_) => &[],
        TypeKind::Array(_) | TypeKind::ArrayOf(_) | TypeKind::List(_) | TypeKind::ListOf(_) => {
            &["nullable", "length"]
        }
        TypeKind::ChoiceOf(_) => &["nullable"],
        TypeKind::Integer | TypeKind::UnsignedInteger | TypeKind::Float => &["nullable", "range"],
        TypeKind::Boolean => &["nullable"],
        TypeKind::Utf8String | TypeKind::ByteString => &["nullable", "length"],
        TypeKind::Any | TypeKind::Null => &[],
        TypeKind::Protocol(_) | TypeKind::Vendor => &["id"],
        TypeKind::Ref(_) => &[],
    }
}

#[derive(Clone, Copy)]
enum MemberContext {
    Field,
    Alternate,
    Element,
}

/// Qualifiers accepted on the member itself, ahead of its type's own list.
fn member_qualifiers(context: MemberContext) -> &'static [&'static str] {
    match context {
        MemberContext::Field => &["tag", "optional"],
        MemberContext::Alternate => &["tag"],
        MemberContext::Element => &[],
    }
}

/// Check one type expression: its qualifier list, then its children. Nested
/// PROTOCOL definitions are separate occurrences and are not descended into
/// here. Returns the resolved id for PROTOCOL/VENDOR kinds.
fn check_type(
    ty: &Type,
    table: &SymbolTable,
    scope: ScopeId,
    diags: &mut Diagnostics,
) -> Option<u32> {
    let allowed = allowed_qualifiers(&ty.kind);
    let mut seen: Vec<&'static str> = Vec::new();
    let mut resolved_id = None;
    for qual in &ty.qualifiers {
        let keyword = qual.kind.keyword();
        if seen.contains(&keyword) {
            diags.error(qual.pos, "duplicate qualifier");
            continue;
        }
        seen.push(keyword);
        if !allowed.contains(&keyword) {
            diags.error(qual.pos, format!("{} qualifier not allowed", keyword));
            continue;
        }
        // argument semantics, only for qualifiers legal on this kind
        match &qual.kind {
            QualifierKind::Range(arg) => check_range(arg, &ty.kind, qual.pos, diags),
            QualifierKind::Length(arg) => check_length(arg, qual.pos, diags),
            QualifierKind::Id(arg) => {
                resolved_id = check_id(arg, &ty.kind, table, scope, qual.pos, diags);
            }
            _ => {}
        }
    }
    if matches!(ty.kind, TypeKind::Protocol(_) | TypeKind::Vendor) && !seen.contains(&"id") {
        diags.error(ty.pos, "id qualifier missing");
    }

    match &ty.kind {
        TypeKind::Structure(members) | TypeKind::FieldGroup(members) => {
            for member in members {
                check_member(member, MemberContext::Field, table, scope, diags);
            }
        }
        TypeKind::Array(members) | TypeKind::List(members) => {
            for member in members {
                check_member(member, MemberContext::Element, table, scope, diags);
            }
        }
        TypeKind::ChoiceOf(members) => {
            for member in members {
                check_member(member, MemberContext::Alternate, table, scope, diags);
            }
        }
        TypeKind::ArrayOf(elem) | TypeKind::ListOf(elem) => {
            check_type(elem, table, scope, diags);
        }
        TypeKind::Ref(name) => {
            if table.lookup(scope, name).is_none() {
                diags.error(ty.pos, "invalid type reference");
            }
        }
        TypeKind::Integer
        | TypeKind::UnsignedInteger
        | TypeKind::Float
        | TypeKind::Boolean
        | TypeKind::Utf8String
        | TypeKind::ByteString
        | TypeKind::Any
        | TypeKind::Null
        | TypeKind::Protocol(_)
        | TypeKind::Vendor => {}
    }
    resolved_id
}

fn check_member(
    member: &Member,
    context: MemberContext,
    table: &SymbolTable,
    scope: ScopeId,
    diags: &mut Diagnostics,
) {
    let allowed = member_qualifiers(context);
    let mut seen: Vec<&'static str> = Vec::new();
    for qual in &member.qualifiers {
        let keyword = qual.kind.keyword();
        if seen.contains(&keyword) {
            diags.error(qual.pos, "duplicate qualifier");
            continue;
        }
        seen.push(keyword);
        if !allowed.contains(&keyword) {
            diags.error(qual.pos, format!("{} qualifier not allowed", keyword));
        }
    }
    check_type(&member.ty, table, scope, diags);
}

fn check_range(arg: &RangeArg, kind: &TypeKind, pos: SourcePos, diags: &mut Diagnostics) {
    match arg {
        RangeArg::Width(width) => {
            if matches!(kind, TypeKind::Float) && !matches!(width, BitWidth::W32 | BitWidth::W64) {
                diags.error(pos, "only 32bit and 64bit range arguments are allowed");
            }
        }
        RangeArg::Bounds { lower, upper } => {
            if upper < lower {
                diags.error(pos, format!("range upper bound must be >= {}", lower));
            }
            if matches!(kind, TypeKind::Integer | TypeKind::UnsignedInteger)
                && (!lower.is_integral() || !upper.is_integral())
            {
                diags.error(pos, "range bounds must be integers");
            }
        }
    }
}

fn check_length(arg: &LengthArg, pos: SourcePos, diags: &mut Diagnostics) {
    let (lower, upper) = match arg {
        LengthArg::Exact(n) => (n, None),
        LengthArg::Range { lower, upper } => (lower, upper.as_ref()),
    };
    // independent checks; more than one can fire for one argument
    if *lower < Number::Int(0) {
        diags.error(pos, "length lower bound must be >= 0");
    }
    if let Some(upper) = upper {
        if *upper < Number::Int(0) {
            diags.error(pos, "length upper bound must be >= 0");
        }
        if upper < lower {
            diags.error(pos, "length upper bound must be >= lower bound");
        }
    }
}

fn check_id(
    arg: &IdArg,
    kind: &TypeKind,
    table: &SymbolTable,
    scope: ScopeId,
    pos: SourcePos,
    diags: &mut Diagnostics,
) -> Option<u32> {
    match kind {
        TypeKind::Protocol(_) => match arg {
            IdArg::Value(n) => match n.in_range(0, 0xFFFF_FFFF) {
                Some(v) => Some(v as u32),
                None => {
                    diags.error(pos, "invalid id value");
                    None
                }
            },
            IdArg::Composite { vendor, number } => {
                let vendor_id = match vendor {
                    VendorRef::Literal(n) => match n.in_range(0, 0xFFFF) {
                        Some(v) => Some(v as u16),
                        None => {
                            diags.error(pos, "invalid vendor id value");
                            None
                        }
                    },
                    VendorRef::Name(name) => match resolve_vendor(table, scope, name) {
                        VendorLookup::Found(v) => Some(v),
                        // the vendor's own declaration carries the error
                        VendorLookup::Broken => None,
                        VendorLookup::Missing => {
                            diags.error(pos, "invalid vendor reference");
                            None
                        }
                    },
                };
                let number = match number.in_range(0, 0xFFFF) {
                    Some(v) => Some(v as u16),
                    None => {
                        diags.error(pos, "invalid protocol number value");
                        None
                    }
                };
                match (vendor_id, number) {
                    (Some(v), Some(n)) => Some(((v as u32) << 16) | n as u32),
                    _ => None,
                }
            }
        },
        TypeKind::Vendor => match arg {
            IdArg::Value(n) => match n.in_range(0, 0xFFFF) {
                Some(v) => Some(v as u32),
                None => {
                    diags.error(pos, "invalid id value");
                    None
                }
            },
            IdArg::Composite { .. } => {
                diags.error(pos, "invalid id value");
                None
            }
        },
        other => unreachable!("id qualifier accepted on {}", other.keyword()),
    }
}

enum VendorLookup {
    Found(u16),
    /// Name resolves to a VENDOR whose own id is missing or invalid.
    Broken,
    Missing,
}

fn resolve_vendor(table: &SymbolTable, scope: ScopeId, name: &str) -> VendorLookup {
    let Some(symbol) = table.lookup(scope, name) else {
        return VendorLookup::Missing;
    };
    let mut saw_vendor = false;
    for &occ_id in &symbol.occurrences {
        let occ = table.occurrence(occ_id);
        if !matches!(occ.def.ty.kind, TypeKind::Vendor) {
            continue;
        }
        saw_vendor = true;
        if let Some(v) = vendor_id_of(occ) {
            return VendorLookup::Found(v);
        }
    }
    if saw_vendor {
        VendorLookup::Broken
    } else {
        VendorLookup::Missing
    }
}

fn vendor_id_of(occ: &Occurrence) -> Option<u16> {
    for qual in &occ.def.ty.qualifiers {
        if let QualifierKind::Id(IdArg::Value(n)) = &qual.kind {
            if let Some(v) = n.in_range(0, 0xFFFF) {
                return Some(v as u16);
            }
        }
    }
    None
}

#[derive(Clone, Copy)]
enum IdSpace {
    Protocol,
    Vendor,
}

impl IdSpace {
    fn matches(&self, kind: &TypeKind) -> bool {
        match self {
            IdSpace::Protocol => matches!(kind, TypeKind::Protocol(_)),
            IdSpace::Vendor => matches!(kind, TypeKind::Vendor),
        }
    }

    fn inconsistent_message(&self, value: u32) -> String {
        match self {
            IdSpace::Protocol => format!("inconsistent protocol id: 0x{value:08X} ({value})"),
            IdSpace::Vendor => format!("inconsistent vendor id: 0x{value:04X} ({value})"),
        }
    }

    fn non_unique_message(&self, value: u32) -> String {
        match self {
            IdSpace::Protocol => format!("non-unique protocol id: 0x{value:08X} ({value})"),
            IdSpace::Vendor => format!("non-unique vendor id: 0x{value:04X} ({value})"),
        }
    }
}

fn check_consistency(
    table: &SymbolTable,
    resolved: &[Option<u32>],
    options: &ValidateOptions,
    diags: &mut Diagnostics,
) {
    // all occurrences of one symbol must agree on their resolved id; the
    // error names the disagreeing occurrence's value, not the first-seen one
    for symbol in table.symbols() {
        if symbol.occurrences.len() < 2 {
            continue;
        }
        for space in [IdSpace::Protocol, IdSpace::Vendor] {
            let mut canonical: Option<u32> = None;
            for &occ_id in &symbol.occurrences {
                let occ = table.occurrence(occ_id);
                if !space.matches(&occ.def.ty.kind) {
                    continue;
                }
                let Some(value) = resolved[occ_id] else { continue };
                match canonical {
                    None => canonical = Some(value),
                    Some(first) if value != first => {
                        diags.error(occ.def.pos, space.inconsistent_message(value));
                    }
                    Some(_) => {}
                }
            }
        }
    }

    // distinct symbols must not share a protocol id, regardless of namespace
    check_global_uniqueness(table, resolved, IdSpace::Protocol, diags);
    if options.require_unique_vendor_ids {
        check_global_uniqueness(table, resolved, IdSpace::Vendor, diags);
    }
}

fn check_global_uniqueness(
    table: &SymbolTable,
    resolved: &[Option<u32>],
    space: IdSpace,
    diags: &mut Diagnostics,
) {
    let mut claimed: HashSet<u32> = HashSet::new();
    for symbol in table.symbols() {
        // the symbol's id is its first resolved occurrence in this space
        let mut first = None;
        for &occ_id in &symbol.occurrences {
            let occ = table.occurrence(occ_id);
            if !space.matches(&occ.def.ty.kind) {
                continue;
            }
            if let Some(value) = resolved[occ_id] {
                first = Some((occ, value));
                break;
            }
        }
        let Some((occ, value)) = first else { continue };
        if !claimed.insert(value) {
            diags.error(occ.def.pos, space.non_unique_message(value));
        }
    }
}
