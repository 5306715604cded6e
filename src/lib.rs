/*!
Dynamic option resolution for `causal-cmd`, a causal search command line
tool.

The set of options that `causal-cmd` accepts isn't fixed: which options are
valid (and which are required) depends on the data type, the algorithm, and
the independence test and score chosen earlier on the same command line.
[`Resolver`] discovers that set in several passes, validating each value as
soon as the option it belongs to is known, and produces either a
[`ResolvedConfiguration`] or a [`Failure`] naming the responsible option.

The main entry point is [`interpret`], which also handles the help and
version flags. The algorithms, tests, scores and their parameters are
supplied through the traits in [`catalog`]; [`BuiltinCatalog`] is the catalog
that ships with the binary.
*/

pub mod arguments;
pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod errors;
pub mod help;
pub mod invocation;
pub mod parameter;
pub mod printers;
pub mod registry;
pub mod resolver;

pub use arguments::{ArgumentMap, tokenize, tokenize_lenient};
pub use catalog::{BuiltinCatalog, Catalog};
pub use config::ResolvedConfiguration;
pub use descriptor::{OptionDescriptor, Requirement, Schema};
pub use errors::{Failure, ResolveError};
pub use help::{HelpRequest, Projection};
pub use invocation::{Invocation, interpret};
pub use parameter::ParamValue;
pub use registry::OptionRegistry;
pub use resolver::{Resolved, Resolver, Stage};
