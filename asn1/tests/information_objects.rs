use std::collections::HashSet;

use asn1::{
    AnalysisError, AsnCompiler, CompiledType, Diagnostic, ErrorCategory, FieldKind, FieldValue,
    Model, ResolvedValue, SyntaxElement,
};

const TYPE_IDENTIFIER: &str = "
    TYPE-IDENTIFIER ::= CLASS {
        &id OBJECT IDENTIFIER UNIQUE,
        &Type
    } WITH SYNTAX { &Type IDENTIFIED BY &id }
";

const ERROR_CLASS: &str = "
    ERROR-CLASS ::= CLASS {
        &code INTEGER UNIQUE,
        &Parameter OPTIONAL,
        &retry BOOLEAN DEFAULT FALSE
    } WITH SYNTAX { CODE &code [PARAMETER &Parameter] [RETRY &retry] }
";

fn compile(body: &str) -> Result<Model, AnalysisError> {
    let mut compiler = AsnCompiler::new();
    compiler
        .add_file(
            "test.asn1".to_string(),
            format!("M DEFINITIONS ::= BEGIN {body} END"),
        )
        .unwrap();
    compiler.analysis()
}

fn field(model: &Model, object: &str, field: &str) -> Option<FieldValue> {
    let table = model.module("M").unwrap().table();
    table.object(object).unwrap().field(field).cloned()
}

#[test]
fn type_identifier_class() {
    let model = compile(TYPE_IDENTIFIER).unwrap();
    let class = model
        .module("M")
        .unwrap()
        .table()
        .class("TYPE-IDENTIFIER")
        .unwrap();

    assert_eq!(class.fields().len(), 2);
    assert!(class.fields().iter().all(|f| f.is_mandatory()));

    let syntax = class.syntax().unwrap();
    let fields = syntax
        .elements()
        .iter()
        .filter(|e| matches!(e, SyntaxElement::Field(_)))
        .count();
    assert_eq!(fields, 2);
    assert_eq!(syntax.literals(), HashSet::from(["IDENTIFIED", "BY"]));
}

#[test]
fn defined_syntax_object() {
    let model = compile(&format!(
        "{TYPE_IDENTIFIER} int-id TYPE-IDENTIFIER ::= {{ INTEGER IDENTIFIED BY {{ 1 2 3 }} }}"
    ))
    .unwrap();

    let Some(FieldValue::Type(ty)) = field(&model, "int-id", "Type") else {
        panic!("expected &Type to be bound to a type");
    };
    assert!(matches!(ty.base(), CompiledType::Integer(_)));

    let Some(FieldValue::Value(id)) = field(&model, "int-id", "id") else {
        panic!("expected &id to be bound to a value");
    };
    assert_eq!(id.value, ResolvedValue::ObjectIdentifier(vec![1, 2, 3]));
}

#[test]
fn default_syntax_missing_mandatory_field() {
    let err = compile(&format!(
        "{TYPE_IDENTIFIER} int-id TYPE-IDENTIFIER ::= {{ &Type INTEGER }}"
    ))
    .unwrap_err();

    assert!(matches!(&err, AnalysisError::MandatoryField { field, .. } if field == "id"));
    assert!(err.to_string().contains("field is mandatory"));
    assert_eq!(err.category(), ErrorCategory::ObjectDefinition);
}

#[test]
fn variable_type_default_mismatch() {
    let err = compile("C ::= CLASS { &Type DEFAULT INTEGER, &value &Type DEFAULT TRUE }").unwrap_err();

    assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
    let message = err.to_string();
    assert!(message.contains("INTEGER"), "{message}");
    assert!(message.contains("BOOLEAN"), "{message}");
}

#[test]
fn object_reference_class_mismatch() {
    let err = compile(&format!(
        "{TYPE_IDENTIFIER} {ERROR_CLASS}
        not-found ERROR-CLASS ::= {{ CODE 404 }}
        wrong TYPE-IDENTIFIER ::= not-found"
    ))
    .unwrap_err();

    let message = err.to_string();
    assert!(matches!(err, AnalysisError::ClassMismatch { .. }));
    assert!(message.contains("TYPE-IDENTIFIER"), "{message}");
    assert!(message.contains("ERROR-CLASS"), "{message}");
}

#[test]
fn defaults_are_filled() {
    let model = compile(&format!(
        "{ERROR_CLASS}
        not-found ERROR-CLASS ::= {{ CODE 404 }}
        busy ERROR-CLASS ::= {{ CODE 503 PARAMETER INTEGER RETRY TRUE }}"
    ))
    .unwrap();

    let retry = |object| match field(&model, object, "retry") {
        Some(FieldValue::Value(value)) => value.value.clone(),
        other => panic!("unexpected &retry {other:?}"),
    };
    assert_eq!(retry("not-found"), ResolvedValue::Boolean(false));
    assert_eq!(retry("busy"), ResolvedValue::Boolean(true));

    assert!(field(&model, "not-found", "Parameter").is_none());
    assert!(field(&model, "busy", "Parameter").is_some());
}

#[test]
fn object_default_checked_against_bound_type() {
    let source = "
        C ::= CLASS { &Type DEFAULT INTEGER, &value &Type DEFAULT 5 }
        ok C ::= { &Type INTEGER }
        bad C ::= { &Type BOOLEAN }
    ";
    let err = compile(source).unwrap_err();
    assert!(matches!(&err, AnalysisError::TypeMismatch { expected, .. } if expected == "BOOLEAN"));
}

#[test]
fn variable_type_value_follows_governor() {
    let source = "
        C ::= CLASS { &Type, &value &Type }
        number C ::= { &value 5, &Type INTEGER }
    ";
    let model = compile(source).unwrap();
    let Some(FieldValue::Value(value)) = field(&model, "number", "value") else {
        panic!("expected a value");
    };
    assert_eq!(value.value, ResolvedValue::Integer(5));

    let err = compile(
        "C ::= CLASS { &Type, &value &Type }
        bad C ::= { &Type BOOLEAN, &value 5 }",
    )
    .unwrap_err();
    assert!(matches!(err, AnalysisError::TypeMismatch { .. }));
}

#[test]
fn unbound_governing_field() {
    let err = compile(
        "C ::= CLASS { &Type OPTIONAL, &value &Type OPTIONAL }
        obj C ::= { &value 5 }",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::UnboundGoverningField { field, governor, .. }
            if field == "value" && governor == "Type"
    ));
}

#[test]
fn class_definition_errors() {
    let err = compile("C ::= CLASS { &id INTEGER, &id BOOLEAN }").unwrap_err();
    assert!(matches!(&err, AnalysisError::DuplicateField { field, .. } if field == "id"));

    let err = compile("C ::= CLASS { &id INTEGER UNIQUE DEFAULT 1 }").unwrap_err();
    assert!(matches!(err, AnalysisError::UniqueWithDefault { .. }));

    let err = compile("C ::= CLASS { &id INTEGER, &next C }").unwrap_err();
    assert!(matches!(&err, AnalysisError::SelfReferenceNotOptional { field, .. } if field == "next"));

    let err = compile("C ::= CLASS { &id INTEGER, &Nexts C }").unwrap_err();
    assert!(matches!(&err, AnalysisError::SelfReferenceNotOptional { field, .. } if field == "Nexts"));

    let err = compile("C ::= CLASS { &Type, &value &Type.&id }").unwrap_err();
    assert!(matches!(err, AnalysisError::NestedFieldReferenceUnsupported { .. }));

    let err = compile("C ::= CLASS { &value &Missing }").unwrap_err();
    assert!(matches!(err, AnalysisError::UndefinedGoverningField { .. }));

    let err = compile("C ::= CLASS { &id INTEGER, &value &id }").unwrap_err();
    assert!(matches!(err, AnalysisError::GoverningFieldNotTypeField { .. }));

    let err = compile("C ::= CLASS { &Type, &value &Type DEFAULT 1 }").unwrap_err();
    assert!(matches!(err, AnalysisError::GoverningFieldWithoutDefault { .. }));
    assert_eq!(err.category(), ErrorCategory::Definition);
}

#[test]
fn syntax_definition_errors() {
    let err = compile("C ::= CLASS { &id INTEGER } WITH SYNTAX { TRUE &id }").unwrap_err();
    assert!(matches!(err, AnalysisError::ReservedWordLiteral { .. }));

    let err = compile(
        "C ::= CLASS { &a INTEGER OPTIONAL, &b INTEGER OPTIONAL }
        WITH SYNTAX { [NAME &a] [NAME &b] }",
    )
    .unwrap_err();
    assert!(err.to_string().contains("illegal at this position"));

    let err = compile("C ::= CLASS { &a INTEGER, &b INTEGER } WITH SYNTAX { A &a }").unwrap_err();
    assert!(matches!(err, AnalysisError::MandatoryFieldsNotInSyntax { .. }));

    let err = compile(
        "C ::= CLASS { &a INTEGER OPTIONAL } WITH SYNTAX { [[A &a] B] }
        obj C ::= { B }",
    )
    .unwrap_err();
    assert!(matches!(err, AnalysisError::GroupLiteralWithoutField { .. }));
    assert_eq!(err.category(), ErrorCategory::Definition);
}

#[test]
fn self_referential_object_field() {
    let model = compile(
        "C ::= CLASS { &id INTEGER, &next C OPTIONAL }
        first C ::= { &id 1 }
        second C ::= { &id 2, &next first }",
    )
    .unwrap();

    let Some(FieldValue::Object(next)) = field(&model, "second", "next") else {
        panic!("expected an object");
    };
    assert_eq!(next.name(), Some("first"));
    assert!(matches!(
        next.class().field("next").map(|(_, f)| f.kind()),
        Some(FieldKind::Object { .. })
    ));
}

#[test]
fn object_definition_errors() {
    let err = compile(&format!("{ERROR_CLASS} obj ERROR-CLASS ::= {{ &code 1, &missing 2 }}"))
        .unwrap_err();
    assert!(matches!(&err, AnalysisError::UndefinedField { field, .. } if field == "missing"));

    let err = compile(&format!("{ERROR_CLASS} obj ERROR-CLASS ::= {{ &code 1, &code 2 }}"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::DuplicateFieldSetting { .. }));

    let err = compile(&format!("{ERROR_CLASS} obj ERROR-CLASS ::= {{ CODE 1 EXTRA }}"))
        .unwrap_err();
    assert!(matches!(err, AnalysisError::UnexpectedData { .. }));

    let err = compile(&format!("{ERROR_CLASS} obj ERROR-CLASS ::= {{ ID 1 }}")).unwrap_err();
    assert!(matches!(err, AnalysisError::SyntaxMismatch { .. }));

    let err = compile("C ::= CLASS { &id INTEGER } obj C ::= { ID 1 }").unwrap_err();
    assert!(matches!(err, AnalysisError::NoDefinedSyntax { .. }));
}

#[test]
fn object_sets() {
    let model = compile(&format!(
        "{ERROR_CLASS}
        not-found ERROR-CLASS ::= {{ CODE 404 }}
        busy ERROR-CLASS ::= {{ CODE 503 }}
        Client-Errors ERROR-CLASS ::= {{ not-found }}
        All-Errors ERROR-CLASS ::= {{ Client-Errors | busy UNION {{ CODE 500 }}, ... }}"
    ))
    .unwrap();

    let table = model.module("M").unwrap().table();
    let all = table.object_set("All-Errors").unwrap();
    assert!(all.extensible);
    assert_eq!(all.objects.len(), 3);

    let names: Vec<_> = all.objects.iter().map(|o| o.name()).collect();
    assert_eq!(names, [Some("not-found"), Some("busy"), None]);

    let client = table.object_set("Client-Errors").unwrap();
    assert!(!client.extensible);
}

#[test]
fn object_set_class_mismatch() {
    let err = compile(&format!(
        "{ERROR_CLASS} {TYPE_IDENTIFIER}
        not-found ERROR-CLASS ::= {{ CODE 404 }}
        Types TYPE-IDENTIFIER ::= {{ not-found }}"
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::ClassMismatch { expected, found, .. }
            if expected == "TYPE-IDENTIFIER" && found == "ERROR-CLASS"
    ));
}

#[test]
fn object_set_field() {
    let model = compile(&format!(
        "{ERROR_CLASS}
        OPERATION ::= CLASS {{ &code INTEGER UNIQUE, &Errors ERROR-CLASS OPTIONAL }}
            WITH SYNTAX {{ CODE &code [ERRORS &Errors] }}
        not-found ERROR-CLASS ::= {{ CODE 404 }}
        get OPERATION ::= {{ CODE 1 ERRORS {{ not-found }} }}"
    ))
    .unwrap();

    let Some(FieldValue::ObjectSet(errors)) = field(&model, "get", "Errors") else {
        panic!("expected an object set");
    };
    assert_eq!(errors.objects.len(), 1);
    assert_eq!(errors.class.name(), "ERROR-CLASS");
}

#[test]
fn parameterized_object() {
    let source = format!(
        "{ERROR_CLASS}
        error{{INTEGER:code, Parameter}} ERROR-CLASS ::= {{ CODE code PARAMETER Parameter }}
        not-found ERROR-CLASS ::= error{{404, IA5String}}"
    );
    let model = compile(&source).unwrap();

    let Some(FieldValue::Value(code)) = field(&model, "not-found", "code") else {
        panic!("expected a value");
    };
    assert_eq!(code.value, ResolvedValue::Integer(404));
    assert!(matches!(
        field(&model, "not-found", "Parameter"),
        Some(FieldValue::Type(_))
    ));

    // parameterized assignments are only compiled when used
    assert!(model.module("M").unwrap().table().get("error").is_none());
}

#[test]
fn parameterized_object_set() {
    let model = compile(&format!(
        "{ERROR_CLASS}
        With-Busy{{ERROR-CLASS:error}} ERROR-CLASS ::= {{ error | {{ CODE 503 }} }}
        not-found ERROR-CLASS ::= {{ CODE 404 }}
        Errors ERROR-CLASS ::= {{ With-Busy{{not-found}} }}"
    ))
    .unwrap();

    let errors = model.module("M").unwrap().table().object_set("Errors").unwrap();
    assert_eq!(errors.objects.len(), 2);
}

#[test]
fn parameter_errors() {
    let err = compile(&format!(
        "{ERROR_CLASS}
        error{{INTEGER:code, Parameter}} ERROR-CLASS ::= {{ CODE code }}
        not-found ERROR-CLASS ::= error{{404, IA5String}}"
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::UnusedParameter { parameter, .. } if parameter == "Parameter"
    ));

    let err = compile(&format!(
        "{ERROR_CLASS}
        error{{INTEGER:code}} ERROR-CLASS ::= {{ CODE code }}
        not-found ERROR-CLASS ::= error{{404, IA5String}}"
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::ParameterCountMismatch { expected: 1, found: 2, .. }
    ));
}

#[test]
fn forward_references() {
    let model = compile(&format!(
        "Errors ERROR-CLASS ::= {{ not-found }}
        not-found ERROR-CLASS ::= {{ CODE 404 }}
        {ERROR_CLASS}"
    ))
    .unwrap();
    let table = model.module("M").unwrap().table();
    assert_eq!(table.object_set("Errors").unwrap().objects.len(), 1);
    assert_eq!(table.len(), 3);
}

#[test]
fn cyclic_references() {
    let err = compile(&format!(
        "{ERROR_CLASS}
        a ERROR-CLASS ::= b
        b ERROR-CLASS ::= a"
    ))
    .unwrap_err();
    assert!(matches!(err, AnalysisError::CyclicReference { .. }));
}

#[test]
fn undefined_references() {
    let err = compile("obj MISSING ::= { &id 1 }").unwrap_err();
    assert!(matches!(&err, AnalysisError::UndefinedReference { name, .. } if name == "MISSING"));
    assert_eq!(err.category(), ErrorCategory::Resolution);
}

#[test]
fn imports_across_modules() {
    let mut compiler = AsnCompiler::new();
    compiler
        .add_file(
            "classes.asn1".to_string(),
            format!("Classes DEFINITIONS ::= BEGIN {ERROR_CLASS} END"),
        )
        .unwrap();
    compiler
        .add_file(
            "objects.asn1".to_string(),
            "Objects DEFINITIONS ::= BEGIN
                IMPORTS ERROR-CLASS FROM Classes;
                not-found ERROR-CLASS ::= { CODE 404 }
                busy Classes.ERROR-CLASS ::= { CODE 503 }
            END"
            .to_string(),
        )
        .unwrap();

    let model = compiler.analysis().unwrap();
    let table = model.module("Objects").unwrap().table();
    let not_found = table.object("not-found").unwrap();
    let busy = table.object("busy").unwrap();
    assert_eq!(not_found.class().module(), "Classes");
    assert_eq!(not_found.class().class_ref(), busy.class().class_ref());
}

#[test]
fn unknown_module() {
    let err = compile("IMPORTS C FROM Missing; obj C ::= { &id 1 }");
    assert!(matches!(err, Err(AnalysisError::UnknownModule { name, .. }) if name == "Missing"));
}

#[test]
fn compilation_is_idempotent() {
    let source = format!(
        "{TYPE_IDENTIFIER} int-id TYPE-IDENTIFIER ::= {{ INTEGER IDENTIFIED BY {{ 1 2 3 }} }}"
    );
    let first = compile(&source).unwrap();
    let second = compile(&source).unwrap();

    let object = |model: &Model| {
        model
            .module("M")
            .unwrap()
            .table()
            .object("int-id")
            .unwrap()
            .clone()
    };
    assert_eq!(object(&first), object(&second));
}

#[test]
fn errors_convert_to_diagnostics() {
    let err = compile(&format!(
        "{TYPE_IDENTIFIER} int-id TYPE-IDENTIFIER ::= {{ &Type INTEGER }}"
    ))
    .unwrap_err();

    let diag = Diagnostic::from(err);
    assert_eq!(diag.error_code, "A104");
    assert_eq!(diag.labels.len(), 1);
    assert!(diag.labels[0].span.is_some());
    assert_eq!(diag.primary_span(), diag.labels[0].span);
    assert!(diag.to_string().starts_with("error[A104]: Invalid object definition"));
    assert!(diag.labels[0].message.contains("field is mandatory"));
}

#[test]
fn rust_listing() {
    let model = compile(&format!(
        "{ERROR_CLASS} not-found ERROR-CLASS ::= {{ CODE 404 }}"
    ))
    .unwrap();
    let listing = model.rust_codegen().unwrap();
    assert!(listing.contains("pub const NOT_FOUND: ErrorClass"));
}

#[test]
fn value_set_field() {
    let model = compile(
        "C ::= CLASS { &Codes INTEGER, &Type DEFAULT BOOLEAN, &Flags &Type OPTIONAL }
        Known INTEGER ::= { 1 | 2, ... }
        obj C ::= { &Codes Known, &Flags { TRUE } }",
    )
    .unwrap();

    let table = model.module("M").unwrap().table();
    let known = table.value_set("Known").unwrap();
    assert!(known.extensible);
    assert_eq!(
        known.values,
        [ResolvedValue::Integer(1), ResolvedValue::Integer(2)]
    );

    let Some(FieldValue::ValueSet(flags)) = field(&model, "obj", "Flags") else {
        panic!("expected a value set");
    };
    assert_eq!(flags.values, [ResolvedValue::Boolean(true)]);
}
