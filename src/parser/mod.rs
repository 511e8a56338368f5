pub mod lexer;
pub mod reader;

use log::debug;

use crate::error::{ReadError, SpecError};
use crate::model::{Directive, DirectiveKind, Form, Symbol};
use reader::Sexp;

/// Tag of the grouping directive whose children are spliced into its parent.
pub const GROUP_TAG: &str = "group";

/// Parse a whole specification file into its ordered directive sequence.
///
/// `group` forms are flattened in place (recursively, order preserved) and
/// `in-namespace` switches the namespace bare symbols resolve into from that
/// point on. The `in-namespace` directive itself is kept in the output.
pub fn load(src: &str) -> Result<Vec<Directive>, ReadError> {
    let forms = reader::read_all(src)?;
    debug!("read {} top-level forms", forms.len());

    let mut loader = Loader::default();
    for form in forms {
        loader.directive(form, 1)?;
    }

    debug!("flattened into {} directives", loader.out.len());
    Ok(loader.out)
}

#[derive(Default)]
struct Loader {
    namespace: Option<String>,
    out: Vec<Directive>,
}

impl Loader {
    /// `outer` is the line of the enclosing `group`; atoms have no line of
    /// their own and the reader already rejects them at top level.
    fn directive(&mut self, sexp: Sexp, outer: usize) -> Result<(), ReadError> {
        let (items, line) = match sexp {
            Sexp::List(items, line) => (items, line),
            Sexp::Word(_) | Sexp::Str(_) | Sexp::Int(_) => {
                return Err(ReadError::NotADirective { line: outer });
            }
        };

        let mut items = items.into_iter();
        let tag = match items.next() {
            Some(Sexp::Word(w)) if !w.starts_with(':') => w,
            _ => return Err(ReadError::NotADirective { line }),
        };

        if tag == GROUP_TAG {
            for child in items {
                self.directive(child, line)?;
            }
            return Ok(());
        }

        if tag == DirectiveKind::InNamespace.tag() {
            let name = match (items.next(), items.next()) {
                (Some(Sexp::Word(w)), None) if !w.starts_with(':') && !w.contains("::") => w,
                _ => {
                    return Err(SpecError::new(
                        line,
                        tag,
                        "expected exactly one bare namespace name",
                    )
                    .into());
                }
            };
            self.namespace = Some(name.clone());
            self.out.push(Directive {
                tag,
                args: vec![Form::Symbol(Symbol::new(None, name))],
                line,
            });
            return Ok(());
        }

        let args = items.map(|s| self.form(s)).collect();
        self.out.push(Directive { tag, args, line });
        Ok(())
    }

    fn form(&self, sexp: Sexp) -> Form {
        match sexp {
            Sexp::Str(s) => Form::Str(s),
            Sexp::Int(n) => Form::Int(n),
            Sexp::List(items, _) => Form::List(items.into_iter().map(|s| self.form(s)).collect()),
            Sexp::Word(w) => self.word(w),
        }
    }

    fn word(&self, word: String) -> Form {
        if let Some(kw) = word.strip_prefix(':').filter(|k| !k.is_empty()) {
            return Form::Keyword(kw.to_string());
        }
        match word.split_once("::") {
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() => {
                Form::Symbol(Symbol::new(Some(ns.to_string()), name))
            }
            _ => Form::Symbol(Symbol::new(self.namespace.clone(), word)),
        }
    }
}
