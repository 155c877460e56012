//! Parse schema source into AST using PEST.
//!
//! The builders walk the pest parse tree and attach source positions to
//! every AST node. A parse tree that does not match the grammar's shape is a
//! bug in the grammar stage, not schema-author input, and panics.

use crate::ast::*;
use crate::numeric::{parse_decimal, parse_integer};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "grammar.pest"]
struct TlvSchemaParser;

/// Syntax error from the schema parser.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SchemaError {
    message: String,
    /// Position of the failure, when the parser can localize it.
    pub pos: Option<SourcePos>,
}

impl SchemaError {
    fn from_pest(err: pest::error::Error<Rule>) -> Self {
        let (line, col) = match err.line_col {
            pest::error::LineColLocation::Pos((l, c)) => (l, c),
            pest::error::LineColLocation::Span((l, c), _) => (l, c),
        };
        SchemaError {
            message: err.variant.message().into_owned(),
            pos: Some(SourcePos { line, col }),
        }
    }
}

/// Parse schema source into an AST.
pub fn parse(source: &str) -> Result<Schema, SchemaError> {
    let mut pairs = TlvSchemaParser::parse(Rule::schema, source).map_err(SchemaError::from_pest)?;
    let root = pairs.next().ok_or_else(|| SchemaError {
        message: "empty parse".to_string(),
        pos: None,
    })?;
    Ok(build_schema(root))
}

fn pos_of(pair: &Pair<Rule>) -> SourcePos {
    let (line, col) = pair.as_span().start_pos().line_col();
    SourcePos { line, col }
}

fn build_schema(pair: Pair<Rule>) -> Schema {
    let mut items = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::namespace_def => items.push(Item::Namespace(build_namespace(inner))),
            Rule::type_def => items.push(Item::TypeDef(build_type_def(inner))),
            Rule::EOI => {}
            other => unreachable!("unexpected rule in schema: {:?}", other),
        }
    }
    Schema { items }
}

fn build_namespace(pair: Pair<Rule>) -> NamespaceDef {
    let pos = pos_of(&pair);
    let mut segments = Vec::new();
    let mut items = Vec::new();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::dotted_name => {
                segments = inner.as_str().split('.').map(str::to_string).collect();
            }
            Rule::namespace_def => items.push(Item::Namespace(build_namespace(inner))),
            Rule::type_def => items.push(Item::TypeDef(build_type_def(inner))),
            other => unreachable!("unexpected rule in namespace: {:?}", other),
        }
    }
    NamespaceDef { segments, items, pos }
}

fn build_type_def(pair: Pair<Rule>) -> TypeDef {
    let pos = pos_of(&pair);
    let mut name = String::new();
    let mut ty = None;
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::ident => name = inner.as_str().to_string(),
            Rule::type_expr => ty = Some(build_type(inner)),
            Rule::protocol_type | Rule::vendor_type => ty = Some(build_concrete_type(inner)),
            other => unreachable!("unexpected rule in type_def: {:?}", other),
        }
    }
    let Some(ty) = ty else { unreachable!("type_def without a type") };
    TypeDef { name, ty, pos }
}

/// Parts shared by all type productions: qualifier list plus whichever body
/// form the construct takes (member block, OF element, definition block).
#[derive(Default)]
struct TypeParts {
    qualifiers: Vec<Qualifier>,
    members: Vec<Member>,
    of_elem: Option<Type>,
    defs: Vec<TypeDef>,
}

fn collect_parts(pair: Pair<Rule>) -> TypeParts {
    let mut parts = TypeParts::default();
    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::qual_list => parts.qualifiers = build_qual_list(inner),
            Rule::member_block => parts.members = inner.into_inner().map(build_member).collect(),
            Rule::of_clause => {
                let Some(elem) = inner.into_inner().find(|p| p.as_rule() == Rule::type_expr)
                else {
                    unreachable!("OF clause without element type")
                };
                parts.of_elem = Some(build_type(elem));
            }
            Rule::def_block => parts.defs = inner.into_inner().map(build_type_def).collect(),
            // keyword tokens carry no payload
            Rule::kw_unsigned
            | Rule::kw_integer
            | Rule::kw_float
            | Rule::kw_boolean
            | Rule::kw_byte
            | Rule::kw_string
            | Rule::kw_any
            | Rule::kw_null
            | Rule::kw_protocol
            | Rule::kw_vendor
            | Rule::kw_of => {}
            other => unreachable!("unexpected rule in type body: {:?}", other),
        }
    }
    parts
}

fn build_type(pair: Pair<Rule>) -> Type {
    let Some(inner) = pair.into_inner().next() else { unreachable!("empty type_expr") };
    build_concrete_type(inner)
}

fn build_concrete_type(pair: Pair<Rule>) -> Type {
    let pos = pos_of(&pair);
    let rule = pair.as_rule();
    if rule == Rule::ref_type {
        let Some(name) = pair.into_inner().next() else { unreachable!("reference without name") };
        return Type {
            kind: TypeKind::Ref(name.as_str().to_string()),
            qualifiers: Vec::new(),
            pos,
        };
    }
    let parts = collect_parts(pair);
    let kind = match rule {
        Rule::structure_type => TypeKind::Structure(parts.members),
        Rule::field_group_type => TypeKind::FieldGroup(parts.members),
        Rule::array_type => match parts.of_elem {
            Some(elem) => TypeKind::ArrayOf(Box::new(elem)),
            None => TypeKind::Array(parts.members),
        },
        Rule::list_type => match parts.of_elem {
            Some(elem) => TypeKind::ListOf(Box::new(elem)),
            None => TypeKind::List(parts.members),
        },
        Rule::choice_type => TypeKind::ChoiceOf(parts.members),
        Rule::unsigned_integer_type => TypeKind::UnsignedInteger,
        Rule::integer_type => TypeKind::Integer,
        Rule::float_type => TypeKind::Float,
        Rule::boolean_type => TypeKind::Boolean,
        Rule::byte_string_type => TypeKind::ByteString,
        Rule::string_type => TypeKind::Utf8String,
        Rule::any_type => TypeKind::Any,
        Rule::null_type => TypeKind::Null,
        Rule::protocol_type => TypeKind::Protocol(parts.defs),
        Rule::vendor_type => TypeKind::Vendor,
        other => unreachable!("unexpected type rule: {:?}", other),
    };
    Type {
        kind,
        qualifiers: parts.qualifiers,
        pos,
    }
}

fn build_member(pair: Pair<Rule>) -> Member {
    let pos = pos_of(&pair);
    let Some(inner) = pair.into_inner().next() else { unreachable!("empty member") };
    let mut name = None;
    let mut qualifiers = Vec::new();
    let mut ty = None;
    let mut repeated = false;
    for part in inner.into_inner() {
        match part.as_rule() {
            Rule::ident => name = Some(part.as_str().to_string()),
            Rule::qual_list => qualifiers = build_qual_list(part),
            Rule::type_expr => ty = Some(build_type(part)),
            Rule::repeat_mark => repeated = true,
            other => unreachable!("unexpected rule in member: {:?}", other),
        }
    }
    let Some(ty) = ty else { unreachable!("member without a type") };
    Member {
        name,
        qualifiers,
        ty,
        repeated,
        pos,
    }
}

fn build_qual_list(pair: Pair<Rule>) -> Vec<Qualifier> {
    pair.into_inner().map(build_qualifier).collect()
}

fn build_qualifier(pair: Pair<Rule>) -> Qualifier {
    let pos = pos_of(&pair);
    let Some(inner) = pair.into_inner().next() else { unreachable!("empty qualifier") };
    let kind = match inner.as_rule() {
        Rule::plain_qual => match inner.as_str() {
            "extensible" => QualifierKind::Extensible,
            "optional" => QualifierKind::Optional,
            "private" => QualifierKind::Private,
            "invariant" => QualifierKind::Invariant,
            "nullable" => QualifierKind::Nullable,
            "tag-order" => QualifierKind::TagOrder,
            "schema-order" => QualifierKind::SchemaOrder,
            "any-order" => QualifierKind::AnyOrder,
            other => unreachable!("unknown qualifier keyword: {}", other),
        },
        Rule::range_qual => QualifierKind::Range(build_range_arg(inner)),
        Rule::length_qual => QualifierKind::Length(build_length_arg(inner)),
        Rule::id_qual => QualifierKind::Id(build_id_arg(inner)),
        Rule::tag_qual => QualifierKind::Tag(build_tag_arg(inner)),
        other => unreachable!("unexpected qualifier rule: {:?}", other),
    };
    Qualifier { kind, pos }
}

fn build_range_arg(pair: Pair<Rule>) -> RangeArg {
    let Some(inner) = pair.into_inner().next() else { unreachable!("range without argument") };
    match inner.as_rule() {
        Rule::bit_width => RangeArg::Width(match inner.as_str() {
            "8bit" => BitWidth::W8,
            "16bit" => BitWidth::W16,
            "32bit" => BitWidth::W32,
            "64bit" => BitWidth::W64,
            other => unreachable!("unknown bit width: {}", other),
        }),
        Rule::range_bounds => {
            let mut nums = inner.into_inner();
            let (Some(lo), Some(hi)) = (nums.next(), nums.next()) else {
                unreachable!("range bounds need two values")
            };
            RangeArg::Bounds {
                lower: parse_decimal(lo.as_str()),
                upper: parse_decimal(hi.as_str()),
            }
        }
        other => unreachable!("unexpected range argument rule: {:?}", other),
    }
}

fn build_length_arg(pair: Pair<Rule>) -> LengthArg {
    let mut lower = None;
    let mut rest = None;
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::int_number => lower = Some(parse_integer(part.as_str())),
            Rule::length_rest => rest = Some(part),
            other => unreachable!("unexpected rule in length argument: {:?}", other),
        }
    }
    let Some(lower) = lower else { unreachable!("length without a value") };
    match rest {
        None => LengthArg::Exact(lower),
        Some(rest) => LengthArg::Range {
            lower,
            upper: rest.into_inner().next().map(|p| parse_integer(p.as_str())),
        },
    }
}

fn build_id_arg(pair: Pair<Rule>) -> IdArg {
    let Some(arg) = pair.into_inner().next() else { unreachable!("id without argument") };
    match arg.as_rule() {
        Rule::int_number => IdArg::Value(parse_integer(arg.as_str())),
        Rule::id_composite => {
            let mut vendor = None;
            let mut number = None;
            for part in arg.into_inner() {
                match part.as_rule() {
                    Rule::id_vendor => {
                        let Some(v) = part.into_inner().next() else {
                            unreachable!("empty vendor part")
                        };
                        vendor = Some(match v.as_rule() {
                            Rule::int_number => VendorRef::Literal(parse_integer(v.as_str())),
                            Rule::ident => VendorRef::Name(v.as_str().to_string()),
                            other => unreachable!("unexpected vendor part rule: {:?}", other),
                        });
                    }
                    Rule::int_number => number = Some(parse_integer(part.as_str())),
                    other => unreachable!("unexpected rule in composite id: {:?}", other),
                }
            }
            let (Some(vendor), Some(number)) = (vendor, number) else {
                unreachable!("composite id needs vendor and number")
            };
            IdArg::Composite { vendor, number }
        }
        other => unreachable!("unexpected id argument rule: {:?}", other),
    }
}

fn build_tag_arg(pair: Pair<Rule>) -> TagArg {
    let Some(num) = pair.into_inner().next() else { unreachable!("tag without a value") };
    TagArg(parse_integer(num.as_str()))
}
