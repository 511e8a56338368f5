//! Wrapper generator: forwarding shims compiled into a shared library.

use log::debug;

use super::emit;
use super::probe::SOURCE_BANNER;
use super::registry::{Mode, Registry};
use super::Session;
use crate::error::GenerateError;
use crate::model::{BuildContext, Directive};

/// Render the shim library source in file order.
///
/// The returned context carries the compiler flags and one declaration per
/// namespace switch and wrapper, for the bindings writer.
pub fn generate(directives: &[Directive]) -> Result<(String, BuildContext), GenerateError> {
    let registry = Registry::for_mode(Mode::Wrapper)?;
    let lowered = registry.lower_all(directives)?;

    let mut session = Session::new(Mode::Wrapper);
    let mut out = String::from(SOURCE_BANNER);
    for rule in &lowered {
        emit::emit(rule, &mut session, &mut out)?;
    }
    debug!(
        "wrapper: {} directives, {} declarations",
        lowered.len(),
        session.context.declarations().len()
    );
    Ok((out, session.into_context()))
}
