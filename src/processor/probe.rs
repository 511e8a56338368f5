//! Probe generator: a C program that writes the bindings when run.

use std::fmt::Write;

use log::debug;

use super::emit::{self, close_namespace};
use super::registry::{Mode, Registry};
use super::Session;
use crate::error::GenerateError;
use crate::model::{BuildContext, Directive};

/// First lines of every generated C file.
pub const SOURCE_BANNER: &str = "\
/* This file has been automatically generated by cgrovel.
 * Do not edit it by hand. */

";

const PROLOGUE: &str = "\
#include <cgrovel.h>

int main(int argc, char **argv)
{
  FILE *output = argc > 1 ? fopen(argv[1], \"w\") : stdout;
  if (output == NULL) {
    perror(argv[1]);
    return 1;
  }
  cgrovel_banner(output);
";

const EPILOGUE: &str = "\
  if (output != stdout)
    fclose(output);
  return 0;
}
";

/// Render the probe for `directives`.
///
/// Header directives keep their relative order ahead of `main`; everything
/// else lands inside it, also in order.
pub fn generate(directives: &[Directive]) -> Result<(String, BuildContext), GenerateError> {
    let registry = Registry::for_mode(Mode::Grovel)?;
    let lowered = registry.lower_all(directives)?;
    let (header, body): (Vec<_>, Vec<_>) = lowered.iter().partition(|l| l.kind.is_header());
    debug!(
        "probe: {} header and {} body directives",
        header.len(),
        body.len()
    );

    let mut session = Session::new(Mode::Grovel);
    let mut out = String::from(SOURCE_BANNER);
    for rule in header {
        emit::emit(rule, &mut session, &mut out)?;
    }
    writeln!(out)?;
    out.push_str(PROLOGUE);
    for rule in body {
        emit::emit(rule, &mut session, &mut out)?;
    }
    close_namespace(&session, &mut out)?;
    out.push_str(EPILOGUE);

    Ok((out, session.into_context()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;

    fn probe(src: &str) -> String {
        generate(&parser::load(src).unwrap()).unwrap().0
    }

    #[test]
    fn header_text_precedes_main_and_body_follows() {
        let src = r#"
            (include "errno.h")
            (constant (eagain "EAGAIN"))
            (define "_GNU_SOURCE")
            (c "static int probe_local = 1;")
            (constant (eintr "EINTR"))
        "#;
        let out = probe(src);
        let pos = |needle: &str| out.find(needle).unwrap_or_else(|| panic!("{needle} missing"));

        assert!(out.starts_with(SOURCE_BANNER));
        assert!(pos("#include <errno.h>") < pos("#define _GNU_SOURCE"));
        assert!(pos("#define _GNU_SOURCE") < pos("static int probe_local"));
        assert!(pos("static int probe_local") < pos("#include <cgrovel.h>"));
        assert!(pos("int main(") < pos("defined(EAGAIN)"));
        assert!(pos("defined(EAGAIN)") < pos("defined(EINTR)"));
        assert!(pos("defined(EINTR)") < pos("return 0;"));
    }

    #[test]
    fn open_namespace_is_closed_before_the_epilogue() {
        let out = probe("(in-namespace errno)\n(constant (eagain \"EAGAIN\"))");
        let begin = out.find("cgrovel_namespace_begin(output, \"errno\");").unwrap();
        let end = out.find("cgrovel_namespace_end(output);").unwrap();
        assert!(begin < end);
        assert!(end < out.find("fclose(output)").unwrap());
    }

    #[test]
    fn switching_namespace_closes_the_previous_module() {
        let out = probe("(in-namespace a)\n(in-namespace b)");
        assert_eq!(out.matches("cgrovel_namespace_end(output);").count(), 2);
    }

    #[test]
    fn flags_reach_the_context_without_text() {
        let directives = parser::load("(cc-flags \"-DX=1\" \"-Ifoo\")").unwrap();
        let (out, ctx) = generate(&directives).unwrap();
        assert_eq!(ctx.flags(), ["-DX=1", "-Ifoo"]);
        assert!(!out.contains("-DX=1"));
    }

    #[test]
    fn shape_errors_stop_generation() {
        let directives = parser::load("(include \"a.h\")\n(constant)").unwrap();
        assert!(matches!(generate(&directives), Err(GenerateError::Spec(_))));
    }
}
