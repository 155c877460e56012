//! Schema surface tests: grammar coverage, namespaces and references,
//! dump output, diagnostic ordering/positions, and the check_schema binary.

use tlvschema::ast::{Item, TypeKind};
use tlvschema::{dump_schema, parse, validate, validate_with, Severity, ValidateOptions};

// ==================== Syntax ====================

#[test]
fn parse_empty_schema() {
    let schema = parse("").expect("empty schema can parse");
    assert!(schema.items.is_empty());
}

#[test]
fn parse_minimal_definition() {
    let schema = parse("test => INTEGER").expect("parse");
    assert_eq!(schema.items.len(), 1);
    let Item::TypeDef(def) = &schema.items[0] else {
        panic!("expected a type definition")
    };
    assert_eq!(def.name, "test");
    assert!(matches!(def.ty.kind, TypeKind::Integer));
}

#[test]
fn parse_with_comments() {
    let source = "
        // line comment
        test => STRUCTURE
        {
            a : INTEGER, /* block */
            b : STRING,
        }
        ";
    let schema = parse(source).expect("parse");
    let Item::TypeDef(def) = &schema.items[0] else {
        panic!("expected a type definition")
    };
    let TypeKind::Structure(members) = &def.ty.kind else {
        panic!("expected STRUCTURE")
    };
    assert_eq!(members.len(), 2);
}

#[test]
fn parse_all_scalar_kinds() {
    let source = "
        a => INTEGER
        b => UNSIGNED INTEGER
        c => FLOAT
        d => BOOLEAN
        e => STRING
        f => BYTE STRING
        g => ANY
        h => NULL
        ";
    let schema = parse(source).expect("parse");
    assert_eq!(schema.items.len(), 8);
}

#[test]
fn parse_of_forms_nest() {
    let schema = parse("m => ARRAY [ length 0.. ] OF LIST OF ANY").expect("parse");
    let Item::TypeDef(def) = &schema.items[0] else {
        panic!("expected a type definition")
    };
    let TypeKind::ArrayOf(elem) = &def.ty.kind else {
        panic!("expected ARRAY OF")
    };
    assert!(matches!(elem.kind, TypeKind::ListOf(_)));
}

#[test]
fn parse_repeat_mark() {
    let schema = parse("m => ARRAY { ANY * }").expect("parse");
    let Item::TypeDef(def) = &schema.items[0] else {
        panic!("expected a type definition")
    };
    let TypeKind::Array(members) = &def.ty.kind else {
        panic!("expected ARRAY")
    };
    assert_eq!(members.len(), 1);
    assert!(members[0].repeated);
    assert!(members[0].name.is_none());
}

#[test]
fn parse_dotted_namespace() {
    let schema = parse("namespace a.b.c { x => INTEGER }").expect("parse");
    let Item::Namespace(ns) = &schema.items[0] else {
        panic!("expected a namespace")
    };
    assert_eq!(ns.segments, vec!["a", "b", "c"]);
    assert_eq!(ns.items.len(), 1);
}

#[test]
fn parse_errors_carry_position() {
    let err = parse("test =>").expect_err("incomplete definition");
    assert!(err.pos.is_some());

    let err = parse("test => INTEGER [ range ]").expect_err("range needs an argument");
    assert!(err.pos.is_some());
}

// ==================== References and namespaces ====================

#[test]
fn references_resolve_across_scopes() {
    let source = "
        Point => STRUCTURE { x : INTEGER, y : INTEGER }
        namespace geo
        {
            Path => LIST OF Point
        }
        ";
    assert!(validate(&parse(source).expect("parse")).is_empty());
}

#[test]
fn reference_is_scope_sensitive() {
    let source = "
        Path => LIST OF Point
        namespace geo
        {
            Point => STRUCTURE { }
        }
        ";
    let errs = validate(&parse(source).expect("parse"));
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("invalid type reference"));
}

#[test]
fn protocol_body_opens_a_scope() {
    let source = "
        core => PROTOCOL [ id 1 ]
        {
            Msg => STRUCTURE { body : Payload }
            Payload => BYTE STRING [ length 0..1024 ]
        }
        ";
    assert!(validate(&parse(source).expect("parse")).is_empty());
}

// ==================== Diagnostics ====================

#[test]
fn diagnostics_are_errors_with_positions() {
    let errs = validate(&parse("test => INTEGER [ range 1..0 ]").expect("parse"));
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].severity, Severity::Error);
    assert_eq!(errs[0].pos.line, 1);
    assert_eq!(errs[0].pos.col, 19);
    let rendered = errs[0].to_string();
    assert!(rendered.starts_with("1:19: error: "), "got: {}", rendered);
}

#[test]
fn declaration_checks_precede_consistency_checks() {
    let source = "\
        a => INTEGER [ length 1 ]\n\
        p => PROTOCOL [ id 1 ]\n\
        p => PROTOCOL [ id 2 ]\n";
    let errs = validate(&parse(source).expect("parse"));
    assert_eq!(errs.len(), 2);
    assert!(errs[0].message.contains("length qualifier not allowed"));
    assert!(errs[1].message.contains("inconsistent protocol id: 0x00000002 (2)"));
    assert_eq!(errs[1].pos.line, 3);
}

#[test]
fn validation_is_deterministic() {
    let source = "
        p1 => PROTOCOL [ id 7 ]
        p2 => PROTOCOL [ id 7 ]
        bad => STRING [ length 0..-1 ]
        ";
    let schema = parse(source).expect("parse");
    let first = validate(&schema);
    let second = validate(&schema);
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.message, b.message);
        assert_eq!(a.pos, b.pos);
    }
}

#[test]
fn vendor_uniqueness_option() {
    let source = "
        v1 => VENDOR [ id 7 ]
        namespace other { v2 => VENDOR [ id 7 ] }
        ";
    let schema = parse(source).expect("parse");
    assert!(validate(&schema).is_empty());
    let errs = validate_with(
        &schema,
        &ValidateOptions {
            require_unique_vendor_ids: true,
        },
    );
    assert_eq!(errs.len(), 1);
    assert!(errs[0].message.contains("non-unique vendor id: 0x0007 (7)"));
}

// ==================== Dump ====================

#[test]
fn dump_renders_the_tree() {
    let source = "
        namespace acme
        {
            Reading => STRUCTURE [ extensible ]
            {
                sensor [ tag 1 ] : UNSIGNED INTEGER [ range 16bit ],
                label [ tag 2, optional ] : STRING [ length 0..64 ],
            }
            core => PROTOCOL [ id Acme:1 ]
        }
        Acme => VENDOR [ id 0x235A ]
        ";
    let schema = parse(source).expect("parse");
    let text = dump_schema(&schema);
    assert!(text.contains("namespace acme"));
    assert!(text.contains("  Reading => STRUCTURE [ extensible ]"));
    assert!(text.contains("    sensor [ tag 1 ] : UNSIGNED INTEGER [ range 16bit ]"));
    assert!(text.contains("    label [ tag 2, optional ] : STRING [ length 0..64 ]"));
    assert!(text.contains("  core => PROTOCOL [ id Acme:1 ]"));
    assert!(text.contains("Acme => VENDOR [ id 9050 ]"));
}

// ==================== check_schema binary ====================

#[test]
fn check_schema_reports_file_line_col() {
    use std::io::Write;
    use std::process::Command;

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "test => INTEGER [ range 1..0 ]").expect("write");

    let output = Command::new(env!("CARGO_BIN_EXE_check_schema"))
        .arg(file.path())
        .output()
        .expect("run check_schema");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(":1:19: error: range upper bound must be >= 1"),
        "got: {}",
        stdout
    );
}

#[test]
fn check_schema_passes_clean_input() {
    use std::io::Write;
    use std::process::Command;

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "test => STRUCTURE [ extensible ] {{ a : INTEGER }}").expect("write");

    let output = Command::new(env!("CARGO_BIN_EXE_check_schema"))
        .arg("--dump")
        .arg(file.path())
        .output()
        .expect("run check_schema");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("test => STRUCTURE [ extensible ]"), "got: {}", stdout);
}
