/*!
The option registry: every option `causal-cmd` knows about, whether or not it
is valid for a given invocation. The resolver builds its working schema out
of descriptors pulled from here.
 */

use std::sync::Arc;

use crate::{
    catalog::{ParamKind, ParameterRegistry},
    descriptor::{OptionDescriptor, Schema, ValueType},
};

/// Canonical names of the built-in options
pub mod names {
    pub const ALGORITHM: &str = "algorithm";
    pub const DATASET: &str = "dataset";
    pub const DELIMITER: &str = "delimiter";
    pub const DATA_TYPE: &str = "data-type";

    pub const TEST: &str = "test";
    pub const SCORE: &str = "score";
    pub const NUM_CATEGORIES: &str = "numCategories";

    pub const KNOWLEDGE: &str = "knowledge";
    pub const EXCLUDE_VARIABLES: &str = "exclude-var";
    pub const METADATA: &str = "metadata";
    pub const MISSING_MARKER: &str = "missing-marker";
    pub const NO_HEADER: &str = "no-header";
    pub const COMMENT_MARKER: &str = "comment-marker";
    pub const QUOTE_CHAR: &str = "quote-char";

    pub const THREAD: &str = "thread";
    pub const PREFIX: &str = "prefix";
    pub const OUT: &str = "out";
    pub const JSON_GRAPH: &str = "json-graph";
    pub const SKIP_VALIDATION: &str = "skip-validation";
    pub const EXPERIMENTAL: &str = "experimental";
    pub const DEFAULT: &str = "default";

    pub const HELP: &str = "help";
    pub const HELP_ALL: &str = "help-all";
    pub const HELP_ALGORITHMS: &str = "help-algo-desc";
    pub const HELP_TESTS: &str = "help-test-desc";
    pub const HELP_SCORES: &str = "help-score-desc";
    pub const VERSION: &str = "version";

    /// Options that are valid for every invocation
    pub const UNIVERSAL: &[&str] = &[
        COMMENT_MARKER,
        QUOTE_CHAR,
        THREAD,
        PREFIX,
        OUT,
        JSON_GRAPH,
        SKIP_VALIDATION,
        EXPERIMENTAL,
        DEFAULT,
        HELP,
        HELP_ALL,
        HELP_ALGORITHMS,
        HELP_TESTS,
        HELP_SCORES,
        VERSION,
    ];

    /// Options that only apply to data read from a delimited file
    pub const TABULAR: &[&str] = &[EXCLUDE_VARIABLES, MISSING_MARKER, NO_HEADER, METADATA];
}

const MAX_INT: i64 = i32::MAX as i64;

fn builtin_options() -> Vec<OptionDescriptor> {
    use self::names::*;

    let string = |name: &'static str, placeholder: &'static str, description: &'static str| {
        OptionDescriptor::value(name, ValueType::String, description).with_placeholder(placeholder)
    };

    vec![
        string(ALGORITHM, "ALGORITHM", "Algorithm to run").required(),
        string(
            DATASET,
            "FILES",
            "Dataset file(s); separate multiple files with commas",
        )
        .required(),
        string(
            DELIMITER,
            "DELIMITER",
            "Data delimiter: comma, colon, space, tab, whitespace, semicolon or pipe",
        )
        .required(),
        string(
            DATA_TYPE,
            "TYPE",
            "Data type: continuous, discrete, mixed or covariance",
        )
        .required(),
        string(TEST, "TEST", "Independence test"),
        string(SCORE, "SCORE", "Score"),
        OptionDescriptor::value(
            NUM_CATEGORIES,
            ValueType::Integer {
                min: 2,
                max: MAX_INT,
            },
            "Maximum number of categories a variable may have to be treated as discrete",
        ),
        string(KNOWLEDGE, "FILE", "Prior knowledge file"),
        string(
            EXCLUDE_VARIABLES,
            "FILE",
            "File listing the variables to leave out of the search",
        ),
        string(METADATA, "FILE", "Metadata file describing interventional variables"),
        string(MISSING_MARKER, "MARKER", "Marker for missing values"),
        OptionDescriptor::flag(NO_HEADER, "The data file has no header row"),
        string(COMMENT_MARKER, "MARKER", "Marker for comment lines"),
        string(QUOTE_CHAR, "CHAR", "Character used to quote values"),
        OptionDescriptor::value(
            THREAD,
            ValueType::Integer {
                min: 1,
                max: MAX_INT,
            },
            "Number of threads (defaults to the number of available cores)",
        ),
        string(PREFIX, "STRING", "Prefix for the output file names"),
        string(OUT, "DIRECTORY", "Output directory (defaults to the current directory)"),
        OptionDescriptor::flag(JSON_GRAPH, "Also write the output graph as JSON"),
        OptionDescriptor::flag(SKIP_VALIDATION, "Skip validation of the data"),
        OptionDescriptor::flag(EXPERIMENTAL, "Allow experimental algorithms, tests and scores"),
        OptionDescriptor::flag(
            DEFAULT,
            "Use the declared default for every parameter that isn't given",
        ),
        OptionDescriptor::flag(HELP, "Show help for the options that are still needed"),
        OptionDescriptor::flag(HELP_ALL, "Show help for every option"),
        OptionDescriptor::flag(HELP_ALGORITHMS, "List the available algorithms"),
        OptionDescriptor::flag(HELP_TESTS, "List the available independence tests"),
        OptionDescriptor::flag(HELP_SCORES, "List the available scores"),
        OptionDescriptor::flag(VERSION, "Show the version"),
    ]
}

fn parameter_option(name: &'static str, description: &str, kind: &ParamKind) -> OptionDescriptor {
    let (value, description) = match *kind {
        ParamKind::Boolean { default } => (
            ValueType::Boolean,
            format!("{description} (default: {default})"),
        ),
        ParamKind::Integer { default, min, max } => (
            ValueType::Integer { min, max },
            format!("{description} (default: {default}, range: [{min}, {max}])"),
        ),
        ParamKind::Double { default, min, max } => (
            ValueType::Double { min, max },
            format!("{description} (default: {default}, range: [{min}, {max}])"),
        ),
        ParamKind::String { default } if default.is_empty() => {
            (ValueType::String, description.to_owned())
        }
        ParamKind::String { default } => (
            ValueType::String,
            format!("{description} (default: {default})"),
        ),
    };

    OptionDescriptor::value(name, value, description)
}

/**
An ordered, case-insensitive catalog of option descriptors. Registration
order is display order.

A registry is built once, before any resolution starts, and is only read
after that; it can be shared by reference between resolution runs.
 */
#[derive(Debug, Clone, Default)]
pub struct OptionRegistry {
    descriptors: Vec<Arc<OptionDescriptor>>,
}

impl OptionRegistry {
    /// A registry without any options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in options only
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        builtin_options().into_iter().for_each(|descriptor| {
            registry.register(descriptor);
        });
        registry
    }

    /// The built-in options, followed by one option per declared parameter
    #[must_use]
    pub fn with_catalog(catalog: &impl ParameterRegistry) -> Self {
        let mut registry = Self::builtin();

        catalog.parameters().iter().for_each(|parameter| {
            registry.register(parameter_option(
                parameter.name,
                parameter.description,
                &parameter.kind,
            ));
        });

        tracing::debug!(options = registry.len(), "built option registry");
        registry
    }

    /// Add a descriptor. A descriptor with the same name (ignoring case)
    /// replaces the existing one, keeping its position.
    pub fn register(&mut self, descriptor: OptionDescriptor) -> Arc<OptionDescriptor> {
        let descriptor = Arc::new(descriptor);

        match self
            .descriptors
            .iter_mut()
            .find(|existing| existing.is_named(descriptor.name()))
        {
            Some(existing) => *existing = descriptor.clone(),
            None => self.descriptors.push(descriptor.clone()),
        }

        descriptor
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<OptionDescriptor>> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.is_named(name))
    }

    /// The options that every invocation must provide
    pub fn all_required(&self) -> Schema {
        self.descriptors
            .iter()
            .filter(|descriptor| descriptor.is_required())
            .cloned()
            .collect()
    }

    /// A schema made of the named options, in the order given. Names that
    /// aren't registered are skipped.
    pub fn as_schema<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Schema {
        names
            .into_iter()
            .filter_map(|name| self.lookup(name))
            .cloned()
            .collect()
    }

    /// Every registered option
    pub fn to_schema(&self) -> Schema {
        self.descriptors.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<OptionDescriptor>> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BuiltinCatalog;

    #[test]
    fn required_options_are_the_core_selectors() {
        let registry = OptionRegistry::builtin();
        let required: Vec<_> = registry.all_required().names().map(str::to_owned).collect();

        assert_eq!(required, ["algorithm", "dataset", "delimiter", "data-type"]);
    }

    #[test]
    fn registration_is_case_insensitive_and_last_wins() {
        let mut registry = OptionRegistry::builtin();
        let before = registry.len();

        registry.register(OptionDescriptor::flag("JSON-Graph", "replaced"));

        assert_eq!(registry.len(), before);
        let descriptor = registry.lookup("json-graph").unwrap();
        assert_eq!(descriptor.name(), "JSON-Graph");
        assert_eq!(descriptor.description(), "replaced");
    }

    #[test]
    fn parameters_carry_bounds_from_the_catalog() {
        let registry = OptionRegistry::with_catalog(&BuiltinCatalog);
        let penalty = registry.lookup("penalty-discount").unwrap();

        assert_eq!(
            *penalty.value_type(),
            ValueType::Double {
                min: 0.0,
                max: 100.0
            }
        );
        assert!(!penalty.is_required());
        assert!(penalty.description().contains("default: 2"));
    }

    #[test]
    fn as_schema_skips_unknown_names() {
        let registry = OptionRegistry::builtin();
        let schema = registry.as_schema(["thread", "no-such-option", "out"]);

        assert_eq!(schema.names().collect::<Vec<_>>(), ["thread", "out"]);
    }
}
