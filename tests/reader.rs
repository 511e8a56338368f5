use std::fs;

use cgrovel::error::GenerateError;
use cgrovel::model::{Form, Symbol};
use cgrovel::parser::load;
use cgrovel::processor::probe;

#[test]
fn reads_the_socket_fixture() {
    let text = fs::read_to_string("tests/fixtures/socket.grovel").unwrap();
    let directives = load(&text).expect("valid spec");

    let tags: Vec<_> = directives.iter().map(|d| d.tag.as_str()).collect();
    assert_eq!(
        tags,
        [
            "include",
            "in-namespace",
            "constant",
            "constant",
            "constant",
            "ctype",
            "cstruct",
            "constantenum",
            "in-namespace",
            "cstruct",
        ]
    );

    // bare symbols after (in-namespace sock) belong to it
    let ctype = &directives[5];
    assert_eq!(
        ctype.args[0],
        Form::Symbol(Symbol::new(Some("sock".into()), "sa-family-t"))
    );
    assert_eq!(ctype.line, 12);
}

#[test]
fn socket_fixture_generates_c_source() {
    let text = fs::read_to_string("tests/fixtures/socket.grovel").unwrap();
    let (source, ctx) = probe::generate(&load(&text).unwrap()).expect("generated source");
    assert!(ctx.flags().is_empty());

    // slot types are spelled relative to the module they are emitted in
    assert!(source.contains("sun_family, \"FAMILY\", \"sa_family_t\", 1);"));
    assert!(source.contains("sin_family, \"FAMILY\", \"super::sock::sa_family_t\", 1);"));
    assert!(source.contains("cgrovel_namespace_begin(output, \"ip\");"));
    assert!(source.contains("#if defined(AF_UNIX)\n"));
    assert!(source.contains("#elif defined(AF_LOCAL)\n"));
}

#[test]
fn unknown_directive_aborts_before_any_build() {
    let directives = load("(include \"stdio.h\")\n(cfrobnicate x)").unwrap();
    let err = probe::generate(&directives).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::UnknownDirective { ref tag, line: 2 } if tag == "cfrobnicate"
    ));
    assert_eq!(err.to_string(), "line 2: unknown directive `cfrobnicate`");
}
