//! Shape checks: one lowering function per directive kind.
//!
//! Every function either returns the typed rule or a `SpecError` naming the
//! line and the directive. Nothing here touches the filesystem.

use std::collections::HashSet;

use super::ast::*;
use super::types::{TypeRef, const_ident, is_rust_ident, is_rust_keyword, type_ident};
use crate::error::SpecError;
use crate::model::{Directive, Form};

pub type LowerFn = fn(&Directive) -> Result<Rule, SpecError>;

fn fail(d: &Directive, message: impl Into<String>) -> SpecError {
    SpecError::new(d.line, d.tag.clone(), message)
}

fn strings(d: &Directive, forms: &[Form], what: &str) -> Result<Vec<String>, SpecError> {
    forms
        .iter()
        .map(|f| {
            f.as_str()
                .map(str::to_string)
                .ok_or_else(|| fail(d, format!("{what} must be strings, found {}", f.describe())))
        })
        .collect()
}

/// Macro and enumerator names end up inside `#if defined(...)`.
fn c_identifiers(d: &Directive, forms: &[Form], what: &str) -> Result<Vec<String>, SpecError> {
    let names = strings(d, forms, what)?;
    if let Some(bad) = names.iter().find(|n| !is_rust_ident(n)) {
        return Err(fail(d, format!("`{bad}` is not a C identifier")));
    }
    Ok(names)
}

fn non_empty_strings(d: &Directive, what: &str) -> Result<Vec<String>, SpecError> {
    if d.args.is_empty() {
        return Err(fail(d, format!("expected at least one {what}")));
    }
    strings(d, &d.args, what)
}

/// Text of a symbol, string or integer used where C wants a bare token.
fn c_token(form: &Form) -> Option<String> {
    match form {
        Form::Symbol(s) => Some(s.name.clone()),
        Form::Str(s) => Some(s.clone()),
        Form::Int(n) => Some(n.text.clone()),
        _ => None,
    }
}

/// `written` is how the name appeared in the file, for the message.
fn checked_rust_name(d: &Directive, name: String, written: &str) -> Result<String, SpecError> {
    if !is_rust_ident(&name) {
        return Err(fail(d, format!("`{written}` is not usable as a Rust name")));
    }
    if is_rust_keyword(&name) {
        return Err(fail(
            d,
            format!("`{written}` is a Rust keyword; give the binding another name"),
        ));
    }
    Ok(name)
}

fn rust_name(
    d: &Directive,
    form: &Form,
    convert: fn(&str) -> String,
) -> Result<String, SpecError> {
    let sym = form
        .as_symbol()
        .ok_or_else(|| fail(d, format!("expected a name, found {}", form.describe())))?;
    checked_rust_name(d, convert(&sym.name), &sym.name)
}

fn type_ref(d: &Directive, form: &Form) -> Result<TypeRef, SpecError> {
    TypeRef::parse(form).map_err(|m| fail(d, m))
}

/// Trailing `:key value` pairs.
struct Options<'a> {
    pairs: Vec<(&'a str, &'a Form)>,
}

impl<'a> Options<'a> {
    fn parse(d: &Directive, forms: &'a [Form], allowed: &[&str]) -> Result<Self, SpecError> {
        let mut pairs = Vec::new();
        let mut seen = HashSet::new();
        let mut iter = forms.iter();
        while let Some(key) = iter.next() {
            let key = key.as_keyword().ok_or_else(|| {
                fail(d, format!("expected an option keyword, found {}", key.describe()))
            })?;
            if !allowed.contains(&key) {
                return Err(fail(d, format!("unknown option `:{key}`")));
            }
            if !seen.insert(key) {
                return Err(fail(d, format!("option `:{key}` given twice")));
            }
            let value = iter
                .next()
                .ok_or_else(|| fail(d, format!("option `:{key}` has no value")))?;
            pairs.push((key, value));
        }
        Ok(Self { pairs })
    }

    fn get(&self, key: &str) -> Option<&'a Form> {
        self.pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    fn string(&self, d: &Directive, key: &str) -> Result<Option<String>, SpecError> {
        match self.get(key) {
            None => Ok(None),
            Some(Form::Str(s)) => Ok(Some(s.clone())),
            Some(other) => Err(fail(
                d,
                format!("`:{key}` wants a string, found {}", other.describe()),
            )),
        }
    }

    fn flag(&self, d: &Directive, key: &str) -> Result<bool, SpecError> {
        match self.get(key) {
            None => Ok(false),
            Some(Form::Symbol(s)) if s.name == "true" => Ok(true),
            Some(Form::Symbol(s)) if s.name == "false" => Ok(false),
            Some(other) => Err(fail(
                d,
                format!("`:{key}` wants true or false, found {}", other.describe()),
            )),
        }
    }

    /// Value given as a bare word, either `name` or `:name`.
    fn word(&self, d: &Directive, key: &str) -> Result<Option<&'a str>, SpecError> {
        match self.get(key) {
            None => Ok(None),
            Some(Form::Symbol(s)) => Ok(Some(&s.name)),
            Some(Form::Keyword(k)) => Ok(Some(k)),
            Some(other) => Err(fail(
                d,
                format!("`:{key}` wants a name, found {}", other.describe()),
            )),
        }
    }
}

/// Split `forms` at the first keyword: positional part, option part.
fn split_options(forms: &[Form]) -> (&[Form], &[Form]) {
    let at = forms
        .iter()
        .position(|f| matches!(f, Form::Keyword(_)))
        .unwrap_or(forms.len());
    forms.split_at(at)
}

pub fn raw_c(d: &Directive) -> Result<Rule, SpecError> {
    non_empty_strings(d, "C text").map(Rule::RawC)
}

pub fn include(d: &Directive) -> Result<Rule, SpecError> {
    non_empty_strings(d, "header names").map(Rule::Include)
}

pub fn define(d: &Directive) -> Result<Rule, SpecError> {
    let (name, value) = match d.args.as_slice() {
        [name] => (name, None),
        [name, value] => (name, Some(value)),
        _ => return Err(fail(d, "expected a macro name and an optional value")),
    };
    let name = c_token(name).ok_or_else(|| fail(d, "macro name must be a symbol or string"))?;
    let value = match value {
        None => None,
        Some(v) => Some(c_token(v).ok_or_else(|| fail(d, "macro value must be an atom"))?),
    };
    Ok(Rule::Define { name, value })
}

pub fn typedef(d: &Directive) -> Result<Rule, SpecError> {
    match d.args.as_slice() {
        [Form::Str(base), Form::Str(alias)] => Ok(Rule::Typedef {
            base: base.clone(),
            alias: alias.clone(),
        }),
        _ => Err(fail(d, "expected a base type string and an alias string")),
    }
}

pub fn flags(d: &Directive) -> Result<Rule, SpecError> {
    non_empty_strings(d, "compiler flags").map(Rule::Flags)
}

pub fn pkg_config(d: &Directive) -> Result<Rule, SpecError> {
    let (packages, opts) = split_options(&d.args);
    if packages.is_empty() {
        return Err(fail(d, "expected at least one package name"));
    }
    let packages = strings(d, packages, "package names")?;
    let opts = Options::parse(d, opts, &["optional"])?;
    Ok(Rule::PkgConfig {
        packages,
        optional: opts.flag(d, "optional")?,
    })
}

pub fn namespace(d: &Directive) -> Result<Rule, SpecError> {
    match d.args.as_slice() {
        [name] => rust_name(d, name, type_ident).map(Rule::Namespace),
        _ => Err(fail(d, "expected exactly one namespace name")),
    }
}

pub fn constant(d: &Directive) -> Result<Rule, SpecError> {
    let Some((head, rest)) = d.args.split_first() else {
        return Err(fail(d, "expected (NAME \"MACRO\"...)"));
    };
    let head = head
        .as_list()
        .ok_or_else(|| fail(d, "first argument must be a list (NAME \"MACRO\"...)"))?;
    let Some((name, candidates)) = head.split_first() else {
        return Err(fail(d, "empty name list"));
    };
    let name = rust_name(d, name, const_ident)?;
    if candidates.is_empty() {
        return Err(fail(d, "at least one candidate macro is required"));
    }
    let candidates = c_identifiers(d, candidates, "candidate macros")?;

    let opts = Options::parse(d, rest, &["documentation", "optional", "type"])?;
    let ty = match opts.word(d, "type")? {
        None | Some("integer") => ConstantType::Integer,
        Some("double") => ConstantType::Double,
        Some(other) => return Err(fail(d, format!("unknown constant type `{other}`"))),
    };

    Ok(Rule::Constant(ConstantSpec {
        name,
        candidates,
        documentation: opts.string(d, "documentation")?,
        optional: opts.flag(d, "optional")?,
        ty,
    }))
}

pub fn ctype(d: &Directive) -> Result<Rule, SpecError> {
    let [name, native, rest @ ..] = d.args.as_slice() else {
        return Err(fail(d, "expected NAME \"native type\""));
    };
    let native = native
        .as_str()
        .ok_or_else(|| fail(d, "native type must be a string"))?;
    let opts = Options::parse(d, rest, &["documentation"])?;
    Ok(Rule::CType {
        name: rust_name(d, name, type_ident)?,
        native: native.to_string(),
        documentation: opts.string(d, "documentation")?,
    })
}

pub fn cstruct(d: &Directive) -> Result<Rule, SpecError> {
    record(d, RecordKind::Struct)
}

pub fn cunion(d: &Directive) -> Result<Rule, SpecError> {
    record(d, RecordKind::Union)
}

fn record(d: &Directive, kind: RecordKind) -> Result<Rule, SpecError> {
    let [name, native, rest @ ..] = d.args.as_slice() else {
        return Err(fail(d, "expected NAME \"native type\" SLOT..."));
    };
    let name = rust_name(d, name, type_ident)?;
    let native = native
        .as_str()
        .ok_or_else(|| fail(d, "native type must be a string"))?
        .to_string();

    let (documentation, slot_forms) = match rest {
        [Form::Str(doc), slots @ ..] => (Some(doc.clone()), slots),
        slots => (None, slots),
    };

    let mut seen = HashSet::new();
    let mut slots = Vec::with_capacity(slot_forms.len());
    for form in slot_forms {
        let slot = slot(d, form)?;
        if !seen.insert(slot.name.clone()) {
            return Err(fail(d, format!("slot `{}` declared twice", slot.name)));
        }
        slots.push(slot);
    }

    Ok(Rule::Record(RecordSpec {
        kind,
        name,
        native,
        documentation,
        slots,
    }))
}

fn slot(d: &Directive, form: &Form) -> Result<SlotSpec, SpecError> {
    let Some([name, native, rest @ ..]) = form.as_list() else {
        return Err(fail(d, "slot must look like (NAME \"c_name\" :type TYPE [:count N])"));
    };
    let native = native
        .as_str()
        .ok_or_else(|| fail(d, "slot native name must be a string"))?;
    let opts = Options::parse(d, rest, &["type", "count"])?;
    let ty = opts
        .get("type")
        .ok_or_else(|| fail(d, format!("slot `{native}` needs a :type")))?;

    let count = match opts.get("count") {
        None => SlotCount::Fixed(1),
        Some(Form::Int(n)) if n.value > 0 => {
            let count = u64::try_from(n.value)
                .map_err(|_| fail(d, format!("slot `{native}` count {} is too large", n.text)))?;
            SlotCount::Fixed(count)
        }
        Some(Form::Keyword(k)) if k == "auto" => SlotCount::Auto,
        Some(Form::Str(expr)) => SlotCount::Named(expr.clone()),
        Some(Form::Symbol(sym)) => SlotCount::Named(sym.name.clone()),
        Some(other) => {
            return Err(fail(
                d,
                format!("slot `{native}` has an invalid :count ({})", other.describe()),
            ));
        }
    };

    Ok(SlotSpec {
        name: rust_name(d, name, const_ident)?,
        native: native.to_string(),
        ty: type_ref(d, ty)?,
        count,
    })
}

pub fn cenum(d: &Directive) -> Result<Rule, SpecError> {
    enumeration(d, false)
}

pub fn constantenum(d: &Directive) -> Result<Rule, SpecError> {
    enumeration(d, true)
}

fn enumeration(d: &Directive, constant_members: bool) -> Result<Rule, SpecError> {
    let Some((head, rest)) = d.args.split_first() else {
        return Err(fail(d, "expected NAME or (NAME :base-type TYPE ...)"));
    };

    let (name, opts) = match head {
        Form::List(items) => match items.split_first() {
            Some((name, opts)) => (name, opts),
            None => return Err(fail(d, "empty enum name list")),
        },
        name => (name, &[][..]),
    };
    let allowed: &[&str] = if constant_members {
        &["base-type", "define-constants"]
    } else {
        &["base-type"]
    };
    let opts = Options::parse(d, opts, allowed)?;
    let base = match opts.get("base-type") {
        Some(ty) => type_ref(d, ty)?,
        None => TypeRef::Primitive(super::types::Primitive::Int),
    };

    let (documentation, member_forms) = match rest {
        [Form::Str(doc), members @ ..] => (Some(doc.clone()), members),
        members => (None, members),
    };
    if member_forms.is_empty() {
        return Err(fail(d, "an enum needs at least one member"));
    }

    let mut seen = HashSet::new();
    let mut members = Vec::with_capacity(member_forms.len());
    for form in member_forms {
        let member = enum_member(d, form, constant_members)?;
        if !seen.insert(member.name.clone()) {
            return Err(fail(d, format!("member `{}` declared twice", member.name)));
        }
        members.push(member);
    }

    Ok(Rule::Enum(EnumSpec {
        name: rust_name(d, name, type_ident)?,
        base,
        documentation,
        macro_members: constant_members,
        define_constants: opts.flag(d, "define-constants")?,
        members,
    }))
}

fn enum_member(d: &Directive, form: &Form, many: bool) -> Result<EnumMember, SpecError> {
    let Some((name, rest)) = form.as_list().and_then(<[Form]>::split_first) else {
        return Err(fail(d, "member must look like (NAME \"C_NAME\" [:optional true])"));
    };
    let (candidates, opts) = split_options(rest);
    match (candidates.len(), many) {
        (0, _) => return Err(fail(d, "member needs a native name")),
        (1, _) | (_, true) => {}
        (_, false) => return Err(fail(d, "cenum members take exactly one native name")),
    }
    let opts = Options::parse(d, opts, &["documentation", "optional"])?;
    Ok(EnumMember {
        name: rust_name(d, name, const_ident)?,
        candidates: c_identifiers(d, candidates, "native member names")?,
        documentation: opts.string(d, "documentation")?,
        optional: opts.flag(d, "optional")?,
    })
}

struct WrapperHead {
    name: String,
    native: String,
    convention: Convention,
    documentation: Option<String>,
}

fn wrapper_head(d: &Directive, form: &Form) -> Result<WrapperHead, SpecError> {
    let (native, name, opts) = match form {
        Form::Str(native) => (native.as_str(), None, &[][..]),
        Form::List(items) => match items.as_slice() {
            [Form::Str(native), name @ Form::Symbol(_), opts @ ..] => {
                (native.as_str(), Some(name), opts)
            }
            [Form::Str(native), opts @ ..] => (native.as_str(), None, opts),
            _ => return Err(fail(d, "expected (\"native\" [name] [:convention c|system])")),
        },
        other => return Err(fail(d, format!("expected a native name, found {}", other.describe()))),
    };
    if !is_rust_ident(native) {
        return Err(fail(d, format!("`{native}` is not a valid C function name")));
    }
    let name = match name {
        Some(n) => rust_name(d, n, type_ident)?,
        None => checked_rust_name(d, native.to_string(), native)?,
    };
    let opts = Options::parse(d, opts, &["convention", "documentation"])?;
    let convention = match opts.word(d, "convention")? {
        None | Some("c") => Convention::C,
        Some("system") => Convention::System,
        Some(other) => return Err(fail(d, format!("unknown calling convention `{other}`"))),
    };
    Ok(WrapperHead {
        name,
        native: native.to_string(),
        convention,
        documentation: opts.string(d, "documentation")?,
    })
}

fn params(d: &Directive, forms: &[Form]) -> Result<Vec<(String, TypeRef)>, SpecError> {
    let mut seen = HashSet::new();
    forms
        .iter()
        .map(|f| match f.as_list() {
            Some([name, ty]) => {
                let name = rust_name(d, name, type_ident)?;
                if !seen.insert(name.clone()) {
                    return Err(fail(d, format!("parameter `{name}` declared twice")));
                }
                let ty = type_ref(d, ty)?;
                if ty.is_void() {
                    return Err(fail(d, format!("parameter `{name}` cannot be :void")));
                }
                Ok((name, ty))
            }
            _ => Err(fail(d, format!("parameter must be (NAME TYPE), found {}", f.describe()))),
        })
        .collect()
}

pub fn defwrapper(d: &Directive) -> Result<Rule, SpecError> {
    let [head, ret, rest @ ..] = d.args.as_slice() else {
        return Err(fail(d, "expected NAME RETURN-TYPE (PARAM TYPE)..."));
    };
    let head = wrapper_head(d, head)?;
    Ok(Rule::Wrapper(WrapperSpec {
        name: head.name,
        native: head.native,
        convention: head.convention,
        documentation: head.documentation,
        ret: type_ref(d, ret)?,
        params: params(d, rest)?,
        body: WrapperBody::Forward,
    }))
}

pub fn defwrapper_star(d: &Directive) -> Result<Rule, SpecError> {
    let [head, ret, Form::List(param_forms), body @ ..] = d.args.as_slice() else {
        return Err(fail(d, "expected NAME RETURN-TYPE ((PARAM TYPE)...) \"statement\"..."));
    };
    if body.is_empty() {
        return Err(fail(d, "expected at least one C statement"));
    }
    let head = wrapper_head(d, head)?;
    Ok(Rule::Wrapper(WrapperSpec {
        name: head.name,
        native: head.native,
        convention: head.convention,
        documentation: head.documentation,
        ret: type_ref(d, ret)?,
        params: params(d, param_forms)?,
        body: WrapperBody::Raw(strings(d, body, "C statements")?),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use crate::processor::types::Primitive;

    fn one(src: &str) -> Directive {
        parser::load(src).unwrap().remove(0)
    }

    #[test]
    fn constant_with_options() {
        let d = one(
            r#"(constant (+eagain+ "EAGAIN" "EWOULDBLOCK")
                 :documentation "try again" :optional true)"#,
        );
        let Rule::Constant(c) = constant(&d).unwrap() else {
            panic!("not a constant");
        };
        assert_eq!(c.name, "EAGAIN");
        assert_eq!(c.candidates, ["EAGAIN", "EWOULDBLOCK"]);
        assert_eq!(c.documentation.as_deref(), Some("try again"));
        assert!(c.optional);
        assert_eq!(c.ty, ConstantType::Integer);
    }

    #[test]
    fn constant_shape_errors() {
        for src in [
            "(constant)",
            "(constant eagain)",
            "(constant (eagain))",
            "(constant (eagain EAGAIN))",
            "(constant (eagain \"EAGAIN\") :optional maybe)",
            "(constant (eagain \"EAGAIN\") :colour \"red\")",
            "(constant (eagain \"EAGAIN\") :optional)",
            "(constant (eagain \"EAGAIN\") :type quad)",
        ] {
            let err = constant(&one(src)).unwrap_err();
            assert_eq!(err.directive, "constant", "{src}");
            assert_eq!(err.line, 1);
        }
    }

    #[test]
    fn struct_slots_and_counts() {
        let d = one(
            r#"(cstruct sockaddr-un "struct sockaddr_un" "Unix socket address."
                 (family "sun_family" :type :ushort)
                 (path "sun_path" :type :char :count :auto)
                 (pad "pad" :type :uint8 :count 4)
                 (name "name" :type :char :count "NAME_MAX"))"#,
        );
        let Rule::Record(r) = cstruct(&d).unwrap() else {
            panic!("not a record");
        };
        assert_eq!(r.kind, RecordKind::Struct);
        assert_eq!(r.name, "sockaddr_un");
        assert_eq!(r.documentation.as_deref(), Some("Unix socket address."));
        let counts: Vec<_> = r.slots.iter().map(|s| s.count.clone()).collect();
        assert_eq!(
            counts,
            [
                SlotCount::Fixed(1),
                SlotCount::Auto,
                SlotCount::Fixed(4),
                SlotCount::Named("NAME_MAX".into())
            ]
        );
        assert_eq!(r.slots[0].ty, TypeRef::Primitive(Primitive::UShort));
        assert_eq!(r.slots[1].name, "PATH");
    }

    #[test]
    fn union_slots() {
        let d = one(
            r#"(cunion sigval "union sigval"
                 (int "sival_int" :type :int)
                 (ptr "sival_ptr" :type :pointer)
                 (bytes "raw" :type :uint8 :count 010))"#,
        );
        let Rule::Record(r) = cunion(&d).unwrap() else {
            panic!("not a record");
        };
        assert_eq!(r.kind, RecordKind::Union);
        assert_eq!(r.native, "union sigval");
        let names: Vec<_> = r.slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["INT", "PTR", "BYTES"]);
        // octal, as C would read it
        assert_eq!(r.slots[2].count, SlotCount::Fixed(8));
        assert!(cunion(&one("(cunion u \"union u\" (a \"a\" :type :int :count -1))")).is_err());
    }

    #[test]
    fn rust_keywords_are_rejected_as_names() {
        for src in [
            "(defwrapper \"socket\" :int (domain :int) (type :int) (protocol :int))",
            "(defwrapper \"match\" :int)",
        ] {
            let err = defwrapper(&one(src)).unwrap_err();
            assert!(err.message.contains("Rust keyword"), "{src}: {err}");
        }
        assert!(cstruct(&one("(cstruct type \"struct t\" (a \"a\" :type :int))")).is_err());
        assert!(ctype(&one("(ctype fn \"int\")")).is_err());
        assert!(namespace(&one("(in-namespace mod)")).is_err());

        let d = one("(defwrapper (\"match\" matches) :int (domain :int) (sock-type :int))");
        let Rule::Wrapper(w) = defwrapper(&d).unwrap() else {
            panic!("not a wrapper");
        };
        assert_eq!(w.name, "matches");
        assert_eq!(w.params[1].0, "sock_type");
    }

    #[test]
    fn struct_shape_errors() {
        for src in [
            "(cstruct s)",
            "(cstruct s \"struct s\" (a \"a\"))",
            "(cstruct s \"struct s\" (a \"a\" :type :int :count 0))",
            "(cstruct s \"struct s\" (a \"a\" :type :int) (a \"b\" :type :int))",
            "(cstruct s \"struct s\" (a a :type :int))",
        ] {
            assert!(cstruct(&one(src)).is_err(), "{src}");
        }
    }

    #[test]
    fn define_constants_only_for_constantenum() {
        let src = "(cenum (e :define-constants true) (a \"A\"))";
        assert!(cenum(&one(src)).is_err());
        let src = "(constantenum (e :define-constants true :base-type :uint)\n\
                   (a \"A\" \"A2\") (b \"B\" :optional true))";
        let Rule::Enum(e) = constantenum(&one(src)).unwrap() else {
            panic!("not an enum");
        };
        assert!(e.define_constants);
        assert_eq!(e.base, TypeRef::Primitive(Primitive::UInt));
        assert_eq!(e.members[0].candidates, ["A", "A2"]);
        assert!(e.members[1].optional);
    }

    #[test]
    fn cenum_members_take_one_native_name() {
        assert!(cenum(&one("(cenum e (a \"A\" \"B\"))")).is_err());
        assert!(cenum(&one("(cenum e)")).is_err());
    }

    #[test]
    fn wrapper_forms() {
        let d = one(r#"(defwrapper ("major" dev-major :convention system) :uint (dev :ulong))"#);
        let Rule::Wrapper(w) = defwrapper(&d).unwrap() else {
            panic!("not a wrapper");
        };
        assert_eq!(w.name, "dev_major");
        assert_eq!(w.symbol(), "major_wrap");
        assert_eq!(w.convention, Convention::System);
        assert_eq!(w.body, WrapperBody::Forward);

        let d = one(
            r#"(defwrapper* "get_pair" :void ((out (:pointer :int)))
                 "out[0] = 1;" "out[1] = 2;")"#,
        );
        let Rule::Wrapper(w) = defwrapper_star(&d).unwrap() else {
            panic!("not a wrapper");
        };
        assert_eq!(w.name, "get_pair");
        assert_eq!(w.body, WrapperBody::Raw(vec!["out[0] = 1;".into(), "out[1] = 2;".into()]));
    }

    #[test]
    fn wrapper_shape_errors() {
        for (src, lower) in [
            ("(defwrapper \"f\")", defwrapper as LowerFn),
            ("(defwrapper \"f\" :int (x :void))", defwrapper),
            ("(defwrapper \"f\" :int x)", defwrapper),
            ("(defwrapper \"f\" :int (x :int) (x :int))", defwrapper),
            ("(defwrapper (\"f\" :convention pascal) :int)", defwrapper),
            ("(defwrapper* \"f\" :int ())", defwrapper_star),
            ("(defwrapper* \"f\" :int (x :int) \"return 0;\")", defwrapper_star),
        ] {
            assert!(lower(&one(src)).is_err(), "{src}");
        }
    }

    #[test]
    fn text_directives() {
        assert_eq!(
            define(&one("(define _GNU_SOURCE)")).unwrap(),
            Rule::Define {
                name: "_GNU_SOURCE".into(),
                value: None
            }
        );
        assert_eq!(
            define(&one("(define LEVEL 2)")).unwrap(),
            Rule::Define {
                name: "LEVEL".into(),
                value: Some("2".into())
            }
        );
        assert!(include(&one("(include)")).is_err());
        assert_eq!(
            define(&one("(define MODE 0644)")).unwrap(),
            Rule::Define {
                name: "MODE".into(),
                value: Some("0644".into())
            }
        );
        for literal in ["0xFF", "0xFFFFFFFFFFFFFFFF", "-9223372036854775808"] {
            let src = format!("(define V {literal})");
            assert_eq!(
                define(&one(&src)).unwrap(),
                Rule::Define {
                    name: "V".into(),
                    value: Some(literal.into())
                }
            );
        }
        assert!(typedef(&one("(typedef \"int\")")).is_err());
        assert_eq!(
            pkg_config(&one("(pkg-config-cflags \"libffi\" :optional true)")).unwrap(),
            Rule::PkgConfig {
                packages: vec!["libffi".into()],
                optional: true
            }
        );
    }
}
