//! Resolution runs against the built-in catalog, from raw arguments to a
//! configuration or a failure.

use std::{collections::BTreeSet, fs};

use causal_args::{
    BuiltinCatalog, Failure, HelpRequest, Invocation, OptionRegistry, ParamValue, ResolveError,
    Resolved, Resolver, Stage,
    catalog::{
        AlgorithmInfo, CommandRegistry, DataType, Factory, MethodInfo, ParamKind,
        ParameterRegistry, SelectorKind,
    },
    interpret, tokenize,
};
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    data: String,
    other: String,
    catalog: BuiltinCatalog,
    registry: OptionRegistry,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();

        let data = dir.path().join("d.txt");
        fs::write(&data, "x\ty\tz\n1\t2\t3\n").unwrap();
        let other = dir.path().join("e.txt");
        fs::write(&other, "x\ty\tz\n4\t5\t6\n").unwrap();

        let catalog = BuiltinCatalog;
        let registry = OptionRegistry::with_catalog(&catalog);

        Self {
            data: data.display().to_string(),
            other: other.display().to_string(),
            _dir: dir,
            catalog,
            registry,
        }
    }

    fn resolve(&self, args: &[&str]) -> Result<Resolved, Failure> {
        Resolver::new(&self.registry, &self.catalog).resolve(args)
    }

    /// The four mandatory selectors, with the fixture's dataset
    fn core<'a>(&'a self, algorithm: &'a str, data_type: &'a str) -> Vec<&'a str> {
        vec![
            "--algorithm",
            algorithm,
            "--dataset",
            &self.data,
            "--delimiter",
            "tab",
            "--data-type",
            data_type,
        ]
    }
}

// ============================================
// Scenarios
// ============================================

#[test]
fn score_based_search_without_a_test() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "continuous");
    args.extend(["--score", "sem-bic-score"]);

    let resolved = fixture.resolve(&args).unwrap();
    let configuration = &resolved.configuration;

    assert_eq!(configuration.algorithm, "fges");
    assert_eq!(configuration.score.as_deref(), Some("sem-bic-score"));
    assert_eq!(configuration.test, None);
    assert!(!resolved.schema.contains("test"));
    assert!(
        resolved
            .passes
            .iter()
            .all(|pass| !pass.options.iter().any(|name| name == "test"))
    );
    assert_eq!(
        configuration.parameter("penalty-discount"),
        Some(&ParamValue::Double(2.0))
    );
}

#[test]
fn mixed_data_needs_the_number_of_categories() {
    let fixture = Fixture::new();
    let failure = fixture.resolve(&fixture.core("fges", "mixed")).unwrap_err();

    assert_eq!(
        failure.error,
        ResolveError::MissingRequiredValue {
            option: "numCategories".into()
        }
    );
    assert_eq!(failure.stage, Stage::RequiredCoreResolved);
    assert_eq!(failure.invalid[0].name(), "numCategories");
    assert!(failure.invalid[0].is_required());
}

#[test]
fn malformed_number_of_categories() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "mixed");
    args.extend(["--numCategories", "many"]);

    let failure = fixture.resolve(&args).unwrap_err();
    assert!(matches!(
        failure.error,
        ResolveError::MalformedValue { ref option, .. } if option == "numCategories"
    ));
}

#[test]
fn single_dataset_algorithm_with_two_datasets() {
    let fixture = Fixture::new();
    let datasets = format!("{},{}", fixture.data, fixture.other);
    let args = [
        "--algorithm",
        "gfci",
        "--dataset",
        &datasets,
        "--delimiter",
        "tab",
        "--data-type",
        "continuous",
        "--test",
        "fisher-z-test",
        "--score",
        "sem-bic-score",
    ];

    let failure = fixture.resolve(&args).unwrap_err();

    assert!(matches!(
        failure.error,
        ResolveError::ConflictingOptions { ref option, ref other, .. }
            if option == "dataset" && other == "algorithm"
    ));
    assert_eq!(failure.invalid[0].name(), "dataset");

    let mut args = args.to_vec();
    args[1] = "images";
    args.truncate(args.len() - 4);
    args.extend(["--score", "sem-bic-score"]);

    let resolved = fixture.resolve(&args).unwrap();
    assert_eq!(resolved.configuration.datasets.len(), 2);
}

#[test]
fn continuous_test_on_discrete_data() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "discrete");
    args.extend(["--test", "fisher-z-test"]);

    let failure = fixture.resolve(&args).unwrap_err();

    match &failure.error {
        ResolveError::InapplicableSelector {
            option,
            kind,
            data_type,
            expected,
            ..
        } => {
            assert_eq!(option, "test");
            assert_eq!(*kind, SelectorKind::Test);
            assert_eq!(*data_type, DataType::Discrete);
            assert_eq!(expected, &["chi-square-test", "g-square-test"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert!(failure.invalid[0].description().contains("chi-square-test"));
}

#[test]
fn parameter_above_its_bound() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "continuous");
    args.extend(["--score", "sem-bic-score", "--penalty-discount", "1000000"]);

    let failure = fixture.resolve(&args).unwrap_err();

    assert!(matches!(
        failure.error,
        ResolveError::OutOfRangeValue { ref option, ref value, .. }
            if option == "penalty-discount" && value == "1000000"
    ));
    assert_eq!(failure.invalid[0].name(), "penalty-discount");
}

#[test]
fn help_on_a_broken_invocation() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "discrete");
    args.extend(["--test", "fisher-z-test", "--help"]);

    let invocation = interpret(&args, &fixture.registry, &fixture.catalog).unwrap();

    let (request, projection) = match invocation {
        Invocation::Help {
            request,
            projection,
        } => (request, projection),
        other => panic!("expected help, got {other:?}"),
    };

    assert_eq!(request, HelpRequest::Succinct);

    let invalid: Vec<&str> = projection.invalid().iter().map(|d| d.name()).collect();
    assert_eq!(invalid, ["test"]);

    let shown: Vec<&str> = projection
        .required()
        .iter()
        .chain(projection.optional())
        .map(|descriptor| descriptor.name())
        .collect();

    assert!(shown.contains(&"score"));
    for supplied in ["algorithm", "dataset", "delimiter", "data-type", "test"] {
        assert!(!shown.contains(&supplied), "{supplied} should not be shown");
    }
}

// ============================================
// Unused and unknown options
// ============================================

#[test]
fn knowledge_for_an_algorithm_without_knowledge() {
    let fixture = Fixture::new();
    let mut args = fixture.core("mgm", "mixed");
    args.extend(["--numCategories", "4", "--knowledge", &fixture.data]);

    let resolved = fixture.resolve(&args).unwrap();

    assert_eq!(resolved.configuration.knowledge, None);
    assert_eq!(resolved.configuration.unused, ["knowledge"]);
    assert_eq!(resolved.configuration.data.num_categories, Some(4));
}

#[test]
fn score_for_an_algorithm_that_only_needs_a_test() {
    let fixture = Fixture::new();
    let mut args = fixture.core("pc", "continuous");
    args.extend(["--test", "fisher-z-test", "--score", "sem-bic-score"]);

    let resolved = fixture.resolve(&args).unwrap();

    assert_eq!(resolved.configuration.score, None);
    assert_eq!(resolved.configuration.unused, ["score"]);
    assert!(resolved.configuration.parameter("penalty-discount").is_none());

    // Unneeded selectors are still checked
    let mut args = fixture.core("pc", "continuous");
    args.extend(["--test", "fisher-z-test", "--score", "bdeu-score"]);

    let failure = fixture.resolve(&args).unwrap_err();
    assert_eq!(failure.error.option(), Some("score"));
}

#[test]
fn unknown_option() {
    let fixture = Fixture::new();
    let mut args = fixture.core("pc", "continuous");
    args.extend(["--test", "fisher-z-test", "--frobnicate", "3"]);

    let failure = fixture.resolve(&args).unwrap_err();

    assert_eq!(
        failure.error,
        ResolveError::UnknownOption {
            option: "frobnicate".into()
        }
    );
    assert!(failure.invalid.is_empty());
}

#[test]
fn defaults_flag() {
    let fixture = Fixture::new();
    let mut args = fixture.core("pc", "continuous");
    args.extend(["--test", "fisher-z-test"]);

    let resolved = fixture.resolve(&args).unwrap();
    assert_eq!(
        resolved.configuration.parameter("stable-fas"),
        Some(&ParamValue::Boolean(false))
    );

    args.push("--default");
    let resolved = fixture.resolve(&args).unwrap();
    assert_eq!(
        resolved.configuration.parameter("stable-fas"),
        Some(&ParamValue::Boolean(true))
    );
    assert_eq!(
        resolved.configuration.parameter("alpha"),
        Some(&ParamValue::Double(0.01))
    );
}

#[test]
fn repeated_option_outside_the_schema() {
    let fixture = Fixture::new();
    let mut args = fixture.core("mgm", "mixed");
    args.extend(["--numCategories", "4"]);
    args.extend(["--knowledge", &fixture.data, "--Knowledge", &fixture.other]);

    let failure = fixture.resolve(&args).unwrap_err();

    assert_eq!(
        failure.error,
        ResolveError::RepeatedOption {
            option: "knowledge".into()
        }
    );
    assert_eq!(failure.invalid[0].name(), "knowledge");

    // Same outcome when the option is part of the schema
    let mut args = fixture.core("fges", "continuous");
    args.extend(["--score", "sem-bic-score"]);
    args.extend(["--knowledge", &fixture.data, "--knowledge", &fixture.other]);

    let failure = fixture.resolve(&args).unwrap_err();
    assert_eq!(failure.error.option(), Some("knowledge"));
    assert!(matches!(failure.error, ResolveError::RepeatedOption { .. }));
}

#[test]
fn repeated_flag_on_covariance_data() {
    let fixture = Fixture::new();
    let mut args = fixture.core("mgm", "covariance");
    args.extend(["--no-header", "--no-header"]);

    let failure = fixture.resolve(&args).unwrap_err();
    assert_eq!(
        failure.error,
        ResolveError::RepeatedOption {
            option: "no-header".into()
        }
    );
}

// ============================================
// Schema gating
// ============================================

const TABULAR: [&str; 4] = ["exclude-var", "missing-marker", "no-header", "metadata"];

#[test]
fn covariance_data_has_no_tabular_options() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "covariance");
    args.extend(["--score", "sem-bic-score", "--missing-marker", "?", "--no-header"]);

    let resolved = fixture.resolve(&args).unwrap();

    for name in TABULAR {
        assert!(!resolved.schema.contains(name), "{name} is in the schema");
        assert!(
            resolved
                .passes
                .iter()
                .all(|pass| !pass.options.iter().any(|option| option == name)),
            "{name} entered a pass"
        );
    }

    let unused: BTreeSet<&str> = resolved
        .configuration
        .unused
        .iter()
        .map(String::as_str)
        .collect();
    assert_eq!(unused, BTreeSet::from(["missing-marker", "no-header"]));
    assert_eq!(resolved.configuration.unused.len(), 2);
    assert_eq!(resolved.configuration.data.missing_marker, None);
}

#[test]
fn tabular_data_admits_tabular_options() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "continuous");
    args.extend(["--score", "sem-bic-score", "--missing-marker", "?"]);

    let resolved = fixture.resolve(&args).unwrap();

    for name in TABULAR {
        assert!(resolved.schema.contains(name), "{name} is missing");
    }
    assert_eq!(resolved.configuration.data.missing_marker.as_deref(), Some("?"));
    assert!(resolved.configuration.unused.is_empty());
}

#[test]
fn number_of_categories_only_for_mixed_data() {
    let fixture = Fixture::new();

    for (data_type, score) in [
        ("continuous", "sem-bic-score"),
        ("discrete", "bdeu-score"),
        ("covariance", "sem-bic-score"),
    ] {
        let mut args = fixture.core("fges", data_type);
        args.extend(["--score", score]);

        let resolved = fixture.resolve(&args).unwrap();

        assert!(!resolved.schema.contains("numCategories"), "{data_type}");
        assert!(
            resolved
                .passes
                .iter()
                .all(|pass| !pass.options.iter().any(|name| name == "numCategories")),
            "{data_type}"
        );
        assert_eq!(resolved.configuration.data.num_categories, None);
    }

    let mut args = fixture.core("fges", "mixed");
    args.extend(["--numCategories", "4", "--score", "cg-bic-score"]);

    let resolved = fixture.resolve(&args).unwrap();
    assert!(
        resolved
            .schema
            .get("numCategories")
            .is_some_and(|descriptor| descriptor.is_required())
    );
    assert_eq!(resolved.configuration.data.num_categories, Some(4));
}

// ============================================
// Selector and value errors
// ============================================

#[test]
fn unknown_score() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "continuous");
    args.extend(["--score", "nope"]);

    let failure = fixture.resolve(&args).unwrap_err();

    match &failure.error {
        ResolveError::UnknownSelector {
            option,
            kind,
            value,
            expected,
        } => {
            assert_eq!(option, "score");
            assert_eq!(*kind, SelectorKind::Score);
            assert_eq!(value, "nope");
            assert_eq!(expected, &["sem-bic-score", "ebic-score"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(failure.stage, Stage::AlgorithmResolved);
    assert_eq!(failure.invalid[0].name(), "score");
}

#[test]
fn unknown_test() {
    let fixture = Fixture::new();
    let mut args = fixture.core("pc", "discrete");
    args.extend(["--test", "nope"]);

    let failure = fixture.resolve(&args).unwrap_err();

    assert!(matches!(
        failure.error,
        ResolveError::UnknownSelector { ref option, kind: SelectorKind::Test, .. }
            if option == "test"
    ));
    assert_eq!(failure.invalid[0].name(), "test");
}

#[test]
fn unknown_delimiter_and_data_type() {
    let fixture = Fixture::new();

    let mut args = fixture.core("fges", "continuous");
    args[5] = "slash";

    let failure = fixture.resolve(&args).unwrap_err();
    assert!(matches!(
        failure.error,
        ResolveError::UnknownSelector { ref option, kind: SelectorKind::Delimiter, ref expected, .. }
            if option == "delimiter" && expected.len() == 7
    ));
    assert_eq!(failure.stage, Stage::Init);
    assert_eq!(failure.invalid[0].name(), "delimiter");

    let args = fixture.core("fges", "tabular");

    let failure = fixture.resolve(&args).unwrap_err();
    assert!(matches!(
        failure.error,
        ResolveError::UnknownSelector { ref option, kind: SelectorKind::DataType, .. }
            if option == "data-type"
    ));
    assert_eq!(failure.invalid[0].name(), "data-type");
}

#[test]
fn missing_dataset_file() {
    let fixture = Fixture::new();
    let missing = format!("{}.missing", fixture.data);

    let mut args = fixture.core("fges", "continuous");
    args[3] = missing.as_str();
    args.extend(["--score", "sem-bic-score"]);

    let failure = fixture.resolve(&args).unwrap_err();

    match &failure.error {
        ResolveError::FileNotFound { option, path, .. } => {
            assert_eq!(option, "dataset");
            assert_eq!(path.display().to_string(), missing);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(failure.invalid[0].name(), "dataset");
}

#[test]
fn quote_char_is_a_single_character() {
    let fixture = Fixture::new();
    let mut args = fixture.core("fges", "continuous");
    args.extend(["--score", "sem-bic-score", "--quote-char", "ab"]);

    let failure = fixture.resolve(&args).unwrap_err();
    assert!(matches!(
        failure.error,
        ResolveError::MalformedValue { ref option, ref value, .. }
            if option == "quote-char" && value == "ab"
    ));
    assert_eq!(failure.invalid[0].name(), "quote-char");

    let last = args.len() - 1;
    args[last] = "'";

    let resolved = fixture.resolve(&args).unwrap();
    assert_eq!(resolved.configuration.data.quote_char, Some('\''));
}

// ============================================
// Properties
// ============================================

struct Combination {
    algorithm: &'static AlgorithmInfo,
    data_type: DataType,
    test: Option<&'static MethodInfo>,
    score: Option<&'static MethodInfo>,
}

impl Combination {
    fn args<'a>(&self, fixture: &'a Fixture) -> Vec<&'a str> {
        let mut args = fixture.core(self.algorithm.command, self.data_type.name());
        args.push("--experimental");

        if self.data_type == DataType::Mixed {
            args.extend(["--numCategories", "4"]);
        }
        if let Some(test) = self.test {
            args.extend(["--test", test.command]);
        }
        if let Some(score) = self.score {
            args.extend(["--score", score.command]);
        }

        args
    }
}

/// Every valid combination of algorithm, data type, test and score
fn combinations() -> Vec<Combination> {
    static CATALOG: BuiltinCatalog = BuiltinCatalog;

    let methods = |kind, required: bool, data_type| -> Vec<Option<&'static MethodInfo>> {
        match required {
            true => CATALOG
                .methods_for(kind, data_type, true)
                .into_iter()
                .map(Some)
                .collect(),
            false => vec![None],
        }
    };

    let mut combinations = Vec::new();

    for algorithm in CATALOG.algorithms() {
        for data_type in DataType::ALL {
            for test in methods(SelectorKind::Test, algorithm.requires_test, data_type) {
                for score in methods(SelectorKind::Score, algorithm.requires_score, data_type) {
                    combinations.push(Combination {
                        algorithm,
                        data_type,
                        test,
                        score,
                    });
                }
            }
        }
    }

    combinations
}

#[test]
fn parameters_are_exactly_those_read_by_the_search() {
    let fixture = Fixture::new();

    for combination in combinations() {
        let args = combination.args(&fixture);
        let resolved = fixture
            .resolve(&args)
            .unwrap_or_else(|failure| panic!("{args:?} failed: {failure}"));

        let expected: BTreeSet<String> = fixture
            .catalog
            .parameter_names(combination.algorithm, combination.test, combination.score)
            .into_iter()
            .map(str::to_owned)
            .collect();

        let actual: BTreeSet<String> = resolved.configuration.parameters.keys().cloned().collect();

        assert_eq!(actual, expected, "{args:?}");
    }
}

#[test]
fn schema_only_grows_between_passes() {
    let fixture = Fixture::new();

    for combination in combinations() {
        let resolved = fixture.resolve(&combination.args(&fixture)).unwrap();

        for pair in resolved.passes.windows(2) {
            let [before, after] = pair else {
                unreachable!()
            };

            assert!(after.stage > before.stage);
            assert!(
                before.options.iter().all(|name| after.options.contains(name)),
                "{:?} lost options after {:?}",
                after.stage,
                before.stage
            );
        }
    }
}

#[test]
fn successful_runs_leave_nothing_to_ask_for() {
    let fixture = Fixture::new();

    for combination in combinations() {
        let resolved = fixture.resolve(&combination.args(&fixture)).unwrap();
        assert!(resolved.projection().is_satisfied());
    }
}

#[test]
fn tokenizing_the_same_arguments_twice_agrees() {
    let fixture = Fixture::new();
    let mut args = fixture.core("gfci", "continuous");
    args.extend(["--test", "fisher-z-test", "--score", "sem-bic-score"]);
    args.extend(["--verbose", "--depth", "3", "--unknown"]);

    let failure = fixture.resolve(&args).unwrap_err();
    let schema = &failure.schema;

    assert_eq!(tokenize(&args, schema), tokenize(&args, schema));
}

/// A command line that makes the resolver read the given parameter
fn reading(fixture: &Fixture, parameter: &str) -> Vec<String> {
    let combination = combinations()
        .into_iter()
        .find(|combination| {
            fixture
                .catalog
                .parameter_names(combination.algorithm, combination.test, combination.score)
                .contains(&parameter)
        })
        .unwrap_or_else(|| panic!("no search reads {parameter}"));

    combination
        .args(fixture)
        .into_iter()
        .map(str::to_owned)
        .collect()
}

#[test]
fn numeric_bounds_are_inclusive() {
    let fixture = Fixture::new();

    for info in fixture.catalog.parameters() {
        let name = info.name;
        let option = format!("--{name}");

        let (values, outside) = match info.kind {
            ParamKind::Integer { min, max, .. } => (
                [ParamValue::Integer(min), ParamValue::Integer(max)],
                [
                    min.checked_sub(1).map(|v| v.to_string()),
                    max.checked_add(1).map(|v| v.to_string()),
                ],
            ),
            ParamKind::Double { min, max, .. } if max.is_finite() => (
                [ParamValue::Double(min), ParamValue::Double(max)],
                [Some((min - 1.0).to_string()), Some((max + 1.0).to_string())],
            ),
            ParamKind::Double { min, .. } => (
                [ParamValue::Double(min), ParamValue::Double(min)],
                [Some((min - 1.0).to_string()), None],
            ),
            ParamKind::Boolean { .. } | ParamKind::String { .. } => continue,
        };

        let base = reading(&fixture, name);

        for value in values {
            let mut args = base.clone();
            args.extend([option.clone(), value.to_string()]);

            let resolved = Resolver::new(&fixture.registry, &fixture.catalog)
                .resolve(&args)
                .unwrap_or_else(|failure| panic!("{name} = {value} failed: {failure}"));

            assert_eq!(resolved.configuration.parameter(name), Some(&value));
        }

        for value in outside.into_iter().flatten() {
            let mut args = base.clone();
            args.extend([option.clone(), value.clone()]);

            let failure = Resolver::new(&fixture.registry, &fixture.catalog)
                .resolve(&args)
                .unwrap_err();

            assert!(
                matches!(
                    failure.error,
                    ResolveError::OutOfRangeValue { ref option, .. } if option == name
                ),
                "{name} = {value}: {}",
                failure.error
            );
            assert_eq!(failure.invalid[0].name(), name);
        }
    }
}
