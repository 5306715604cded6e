/*!
Top-level interpretation of a command line: decides between running,
printing help, listing commands, and printing the version, before (or
instead of) reporting a resolution failure.
 */

use crate::{
    arguments::{ArgumentMap, tokenize_lenient},
    catalog::{Catalog, CommandSummary, SelectorKind},
    errors::Failure,
    help::{HelpRequest, Projection},
    registry::{OptionRegistry, names},
    resolver::{Resolved, Resolver},
};

/// What the command line asked for
#[derive(Debug, Clone)]
pub enum Invocation {
    /// Every option resolved; run the search
    Run(Box<Resolved>),

    /// Print help for the projected options
    Help {
        request: HelpRequest,
        projection: Projection,
    },

    /// List the algorithms, tests or scores
    Describe {
        kind: SelectorKind,
        commands: Vec<CommandSummary>,
    },

    Version,
}

/**
Interpret a command line (excluding the program name).

Version takes priority over help, and any form of help takes priority over a
resolution failure: `--help` on a broken invocation shows help scoped to the
point where resolution stopped, including the option that broke it.
 */
pub fn interpret<T, C>(
    tokens: &[T],
    registry: &OptionRegistry,
    catalog: &C,
) -> Result<Invocation, Failure>
where
    T: AsRef<[u8]>,
    C: Catalog,
{
    let requested = tokenize_lenient(tokens, &registry.to_schema());
    let experimental = requested.contains(names::EXPERIMENTAL);

    if requested.contains(names::VERSION) {
        return Ok(Invocation::Version);
    }

    if requested.contains(names::HELP_ALL) {
        return Ok(Invocation::Help {
            request: HelpRequest::Full,
            projection: Projection::from_arguments(
                &ArgumentMap::default(),
                &registry.to_schema(),
                &[],
            ),
        });
    }

    let describe = [
        (names::HELP_ALGORITHMS, SelectorKind::Algorithm),
        (names::HELP_TESTS, SelectorKind::Test),
        (names::HELP_SCORES, SelectorKind::Score),
    ]
    .into_iter()
    .find(|&(name, _)| requested.contains(name));

    if let Some((_, kind)) = describe {
        return Ok(Invocation::Describe {
            kind,
            commands: catalog.commands(kind, experimental),
        });
    }

    let help = requested.contains(names::HELP);

    match Resolver::new(registry, catalog).resolve(tokens) {
        Ok(resolved) if help => Ok(Invocation::Help {
            request: HelpRequest::Succinct,
            projection: resolved.projection(),
        }),
        Ok(resolved) => Ok(Invocation::Run(Box::new(resolved))),
        Err(failure) if help => {
            tracing::debug!(error = %failure.error, "showing help instead of the failure");

            Ok(Invocation::Help {
                request: HelpRequest::Succinct,
                projection: failure.projection(),
            })
        }
        Err(failure) => Err(failure),
    }
}
