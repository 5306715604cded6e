/*!
The resolver: a state machine that discovers the option schema of an
invocation in several passes over the same arguments.

Resolution starts from the four mandatory selectors and the universal
options. Each validated selector admits more descriptors into the working
schema (tabular options for the data type, test and score for the
algorithm, tunable parameters for the algorithm, test and score), after which
the arguments are tokenized again, because a newly declared option changes
how the arguments following it are read. The first error ends the run.
 */

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    num::NonZeroUsize,
    path::PathBuf,
    sync::Arc,
    thread,
    time::{SystemTime, UNIX_EPOCH},
};

use crate::{
    arguments::{ArgumentMap, tokenize, tokenize_lenient},
    catalog::{AlgorithmInfo, Catalog, DataType, MethodInfo, ParamKind, SelectorKind},
    config::{DataSettings, Delimiter, OutputSettings, ResolvedConfiguration},
    descriptor::{OptionDescriptor, Schema},
    errors::{Failure, ResolveError},
    help::Projection,
    parameter::{ParamValue, ValueError, parse_typed},
    registry::{OptionRegistry, names},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Init,
    RequiredCoreResolved,
    DataTypeResolved,
    AlgorithmResolved,
    TestScoreResolved,
    ParametersResolved,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Init => "init",
            Stage::RequiredCoreResolved => "required core resolved",
            Stage::DataTypeResolved => "data type resolved",
            Stage::AlgorithmResolved => "algorithm resolved",
            Stage::TestScoreResolved => "test and score resolved",
            Stage::ParametersResolved => "parameters resolved",
            Stage::Done => "done",
        })
    }
}

/// The working schema at the time of one tokenization pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSnapshot {
    /// The stage the pass ran in
    pub stage: Stage,
    pub options: Vec<String>,
}

/// A successful resolution run
#[derive(Debug, Clone)]
pub struct Resolved {
    pub configuration: ResolvedConfiguration,

    /// The final working schema
    pub schema: Schema,
    pub arguments: ArgumentMap,
    pub passes: Vec<PassSnapshot>,
}

impl Resolved {
    pub fn projection(&self) -> Projection {
        Projection::from_arguments(&self.arguments, &self.schema, &[])
    }
}

/// Values of the mandatory selectors and the universal options
struct Core<'c> {
    algorithm: &'c AlgorithmInfo,
    datasets: Vec<PathBuf>,
    delimiter: Delimiter,
    data_type: DataType,
    data: DataSettings,
    output: OutputSettings,
    thread_count: usize,
    skip_validation: bool,
    experimental: bool,
    use_defaults: bool,
}

struct Selection<'c> {
    knowledge: Option<PathBuf>,
    test: Option<&'c MethodInfo>,
    score: Option<&'c MethodInfo>,

    /// Selectors that were validated but aren't needed by the algorithm
    unused: Vec<String>,
}

enum Progress<'c> {
    Init,
    Core(Core<'c>),
    DataType(Core<'c>),
    Algorithm(Core<'c>),
    TestScore(Core<'c>, Selection<'c>),
    Parameters(Core<'c>, Selection<'c>, Vec<&'static str>),
    Done(Box<ResolvedConfiguration>),
}

impl Progress<'_> {
    fn stage(&self) -> Stage {
        match self {
            Progress::Init => Stage::Init,
            Progress::Core(..) => Stage::RequiredCoreResolved,
            Progress::DataType(..) => Stage::DataTypeResolved,
            Progress::Algorithm(..) => Stage::AlgorithmResolved,
            Progress::TestScore(..) => Stage::TestScoreResolved,
            Progress::Parameters(..) => Stage::ParametersResolved,
            Progress::Done(..) => Stage::Done,
        }
    }
}

/// The mutable part of a resolution run
struct Working<'t> {
    tokens: &'t [&'t [u8]],
    schema: Schema,
    arguments: ArgumentMap,
    passes: Vec<PassSnapshot>,
}

impl Working<'_> {
    fn admit(&mut self, descriptors: impl IntoIterator<Item = Arc<OptionDescriptor>>) -> usize {
        descriptors
            .into_iter()
            .filter(|descriptor| self.schema.admit(descriptor.clone()))
            .count()
    }

    fn reparse(&mut self, stage: Stage) -> Result<(), ResolveError> {
        self.arguments = tokenize(self.tokens, &self.schema)?;
        self.passes.push(PassSnapshot {
            stage,
            options: self.schema.names().map(str::to_owned).collect(),
        });

        tracing::debug!(%stage, options = self.schema.len(), "resolution pass");
        Ok(())
    }

    fn pass(
        &mut self,
        stage: Stage,
        descriptors: impl IntoIterator<Item = Arc<OptionDescriptor>>,
    ) -> Result<(), ResolveError> {
        self.admit(descriptors);
        self.reparse(stage)
    }
}

fn required_value<'a>(arguments: &'a ArgumentMap, name: &str) -> Result<&'a str, ResolveError> {
    arguments
        .value(name)
        .ok_or_else(|| ResolveError::MissingRequiredValue {
            option: name.to_owned(),
        })
}

/// An option that takes a value may be absent, but not present without one
fn optional_value<'a>(
    arguments: &'a ArgumentMap,
    name: &str,
) -> Result<Option<&'a str>, ResolveError> {
    match arguments.get(name) {
        None => Ok(None),
        Some(None) => Err(ResolveError::MissingRequiredValue {
            option: name.to_owned(),
        }),
        Some(Some(value)) => Ok(Some(value)),
    }
}

fn typed(schema: &Schema, name: &str, value: Option<&str>) -> Result<ParamValue, ResolveError> {
    let descriptor = schema
        .get(name)
        .ok_or_else(|| ResolveError::UnknownOption {
            option: name.to_owned(),
        })?;

    parse_typed::<ValueError>(descriptor.value_type(), value)
        .map_err(|error| ResolveError::from_value(descriptor.name(), error))
}

fn integer(schema: &Schema, name: &str, value: Option<&str>) -> Result<i64, ResolveError> {
    typed(schema, name, value)?
        .as_integer()
        .ok_or_else(|| ResolveError::MalformedValue {
            option: name.to_owned(),
            value: value.unwrap_or_default().to_owned(),
            message: "expected an integer".to_owned(),
        })
}

fn existing_file(option: &str, value: &str) -> Result<PathBuf, ResolveError> {
    let path = PathBuf::from(value);

    let reason = match fs::metadata(&path) {
        Ok(metadata) if metadata.is_file() => return Ok(path),
        Ok(_) => "not a regular file".to_owned(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => "no such file".to_owned(),
        Err(err) => err.to_string(),
    };

    Err(ResolveError::FileNotFound {
        option: option.to_owned(),
        path,
        reason,
    })
}

fn optional_file(arguments: &ArgumentMap, name: &str) -> Result<Option<PathBuf>, ResolveError> {
    optional_value(arguments, name)?
        .map(|value| existing_file(name, value))
        .transpose()
}

fn default_prefix(algorithm: &AlgorithmInfo) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());

    format!("{}_{millis}", algorithm.command)
}

/**
Resolves command lines against an [`OptionRegistry`] and a [`Catalog`]. Both
are only read, so a single resolver can serve any number of runs; each run
keeps its state to itself.
 */
#[derive(Debug)]
pub struct Resolver<'r, C> {
    registry: &'r OptionRegistry,
    catalog: &'r C,
}

impl<'r, C: Catalog> Resolver<'r, C> {
    pub fn new(registry: &'r OptionRegistry, catalog: &'r C) -> Self {
        Self { registry, catalog }
    }

    /// The schema of the first pass: the mandatory selectors and the
    /// universal options
    pub fn core_schema(&self) -> Schema {
        let mut schema = self.registry.all_required();

        names::UNIVERSAL
            .iter()
            .filter_map(|name| self.registry.lookup(name))
            .for_each(|descriptor| {
                schema.admit(descriptor.clone());
            });

        schema
    }

    /// Resolve a command line, excluding the program name
    pub fn resolve<T: AsRef<[u8]>>(&self, tokens: &[T]) -> Result<Resolved, Failure> {
        let tokens: Vec<&[u8]> = tokens.iter().map(|token| token.as_ref()).collect();

        let mut working = Working {
            tokens: &tokens,
            schema: Schema::new(),
            arguments: ArgumentMap::default(),
            passes: Vec::new(),
        };

        let mut progress = Progress::Init;

        loop {
            let stage = progress.stage();

            progress = match self.advance(progress, &mut working) {
                Ok(Progress::Done(configuration)) => {
                    tracing::debug!(passes = working.passes.len(), "resolution done");

                    return Ok(Resolved {
                        configuration: *configuration,
                        schema: working.schema,
                        arguments: working.arguments,
                        passes: working.passes,
                    });
                }
                Ok(next) => next,
                Err(error) => return Err(self.fail(error, stage, working)),
            };
        }
    }

    fn advance(
        &self,
        progress: Progress<'r>,
        working: &mut Working<'_>,
    ) -> Result<Progress<'r>, ResolveError> {
        match progress {
            Progress::Init => self.resolve_core(working).map(Progress::Core),
            Progress::Core(core) => self
                .resolve_data_type(core, working)
                .map(Progress::DataType),
            Progress::DataType(core) => {
                self.admit_selectors(&core, working)?;
                Ok(Progress::Algorithm(core))
            }
            Progress::Algorithm(core) => self
                .resolve_selectors(&core, working)
                .map(|selection| Progress::TestScore(core, selection)),
            Progress::TestScore(core, selection) => self
                .admit_parameters(&core, &selection, working)
                .map(|names| Progress::Parameters(core, selection, names)),
            Progress::Parameters(core, selection, names) => self
                .finish(core, selection, &names, working)
                .map(|configuration| Progress::Done(Box::new(configuration))),
            Progress::Done(configuration) => Ok(Progress::Done(configuration)),
        }
    }

    fn fail(&self, error: ResolveError, stage: Stage, working: Working<'_>) -> Failure {
        let invalid = error
            .option()
            .and_then(|name| {
                working
                    .schema
                    .get(name)
                    .or_else(|| self.registry.lookup(name))
            })
            .cloned()
            .into_iter()
            .collect();

        let arguments = tokenize_lenient(working.tokens, &working.schema);

        tracing::debug!(%stage, %error, "resolution failed");

        Failure {
            error,
            stage,
            schema: working.schema,
            invalid,
            arguments,
        }
    }

    fn descriptor(&self, name: &str) -> Result<Arc<OptionDescriptor>, ResolveError> {
        self.registry
            .lookup(name)
            .cloned()
            .ok_or_else(|| ResolveError::UnknownOption {
                option: name.to_owned(),
            })
    }

    /// Init -> RequiredCoreResolved
    fn resolve_core(&self, working: &mut Working<'_>) -> Result<Core<'r>, ResolveError> {
        let schema = self.core_schema();
        working.pass(Stage::Init, schema.iter().cloned())?;

        let catalog: &'r C = self.catalog;
        let arguments = &working.arguments;
        let experimental = arguments.contains(names::EXPERIMENTAL);

        let value = required_value(arguments, names::ALGORITHM)?;
        let algorithm = catalog
            .algorithm(value)
            .filter(|algorithm| experimental || !algorithm.experimental)
            .ok_or_else(|| ResolveError::UnknownSelector {
                option: names::ALGORITHM.to_owned(),
                kind: SelectorKind::Algorithm,
                value: value.to_owned(),
                expected: catalog
                    .commands(SelectorKind::Algorithm, experimental)
                    .into_iter()
                    .map(|summary| summary.command.to_owned())
                    .collect(),
            })?;

        let datasets = required_value(arguments, names::DATASET)?
            .split(',')
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(|path| existing_file(names::DATASET, path))
            .collect::<Result<Vec<_>, _>>()?;

        if datasets.is_empty() {
            return Err(ResolveError::MissingRequiredValue {
                option: names::DATASET.to_owned(),
            });
        }

        let value = required_value(arguments, names::DELIMITER)?;
        let delimiter =
            Delimiter::from_name(value).ok_or_else(|| ResolveError::UnknownSelector {
                option: names::DELIMITER.to_owned(),
                kind: SelectorKind::Delimiter,
                value: value.to_owned(),
                expected: Delimiter::ALL.iter().map(|d| d.name().to_owned()).collect(),
            })?;

        let value = required_value(arguments, names::DATA_TYPE)?;
        let data_type =
            DataType::from_name(value).ok_or_else(|| ResolveError::UnknownSelector {
                option: names::DATA_TYPE.to_owned(),
                kind: SelectorKind::DataType,
                value: value.to_owned(),
                expected: DataType::ALL.iter().map(|t| t.name().to_owned()).collect(),
            })?;

        let comment_marker = optional_value(arguments, names::COMMENT_MARKER)?.map(str::to_owned);

        let quote_char = optional_value(arguments, names::QUOTE_CHAR)?
            .map(|value| {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ResolveError::MalformedValue {
                        option: names::QUOTE_CHAR.to_owned(),
                        value: value.to_owned(),
                        message: "expected a single character".to_owned(),
                    }),
                }
            })
            .transpose()?;

        let thread_count = match arguments.get(names::THREAD) {
            None => thread::available_parallelism().map_or(1, NonZeroUsize::get),
            Some(value) => {
                let count = integer(&working.schema, names::THREAD, value)?;
                usize::try_from(count).unwrap_or(1)
            }
        };

        let directory = PathBuf::from(optional_value(arguments, names::OUT)?.unwrap_or("."));
        if directory.exists() && !directory.is_dir() {
            return Err(ResolveError::FileNotFound {
                option: names::OUT.to_owned(),
                path: directory,
                reason: "exists and is not a directory".to_owned(),
            });
        }

        let prefix = optional_value(arguments, names::PREFIX)?
            .map_or_else(|| default_prefix(algorithm), str::to_owned);

        tracing::debug!(
            algorithm = algorithm.command,
            %data_type,
            %delimiter,
            datasets = datasets.len(),
            "resolved core selectors"
        );

        Ok(Core {
            algorithm,
            datasets,
            delimiter,
            data_type,
            data: DataSettings {
                comment_marker,
                quote_char,
                has_header: true,
                ..DataSettings::default()
            },
            output: OutputSettings {
                directory,
                prefix,
                json_graph: arguments.contains(names::JSON_GRAPH),
            },
            thread_count,
            skip_validation: arguments.contains(names::SKIP_VALIDATION),
            experimental,
            use_defaults: arguments.contains(names::DEFAULT),
        })
    }

    /// RequiredCoreResolved -> DataTypeResolved
    fn resolve_data_type(
        &self,
        mut core: Core<'r>,
        working: &mut Working<'_>,
    ) -> Result<Core<'r>, ResolveError> {
        let mut admitted = Vec::new();

        if core.data_type.is_tabular() {
            for name in names::TABULAR {
                admitted.push(self.descriptor(name)?);
            }
        }

        if core.data_type == DataType::Mixed {
            let descriptor = self.descriptor(names::NUM_CATEGORIES)?;
            admitted.push(Arc::new(descriptor.promoted()));
        }

        working.pass(Stage::RequiredCoreResolved, admitted)?;
        let arguments = &working.arguments;

        if core.data_type.is_tabular() {
            let has_header = !arguments.contains(names::NO_HEADER);

            if !has_header && arguments.contains(names::METADATA) {
                return Err(ResolveError::ConflictingOptions {
                    option: names::METADATA.to_owned(),
                    other: names::NO_HEADER.to_owned(),
                    reason: "metadata refers to variables by their header names".to_owned(),
                });
            }

            core.data.has_header = has_header;
            core.data.exclude_variables = optional_file(arguments, names::EXCLUDE_VARIABLES)?;
            core.data.metadata = optional_file(arguments, names::METADATA)?;
            core.data.missing_marker =
                optional_value(arguments, names::MISSING_MARKER)?.map(str::to_owned);
        }

        if core.data_type == DataType::Mixed {
            let value = required_value(arguments, names::NUM_CATEGORIES)?;
            let categories = integer(&working.schema, names::NUM_CATEGORIES, Some(value))?;
            core.data.num_categories = u32::try_from(categories).ok();
        }

        Ok(core)
    }

    /// A test or score selector whose description lists the commands that
    /// are valid for the data type
    fn selector_descriptor(
        &self,
        kind: SelectorKind,
        name: &str,
        core: &Core<'_>,
        required: bool,
    ) -> Result<Arc<OptionDescriptor>, ResolveError> {
        let base = self.descriptor(name)?;
        let commands: Vec<&str> = self
            .catalog
            .methods_for(kind, core.data_type, core.experimental)
            .into_iter()
            .map(|method| method.command)
            .collect();

        let description = format!(
            "{} for {} data: {}",
            base.description(),
            core.data_type,
            commands.join(", ")
        );

        let descriptor = match required {
            true => base.promoted(),
            false => OptionDescriptor::clone(&base),
        };

        Ok(Arc::new(descriptor.with_description(description)))
    }

    /// DataTypeResolved -> AlgorithmResolved
    fn admit_selectors(&self, core: &Core<'_>, working: &mut Working<'_>) -> Result<(), ResolveError> {
        let algorithm = core.algorithm;

        if core.datasets.len() > 1 && !algorithm.accepts_multiple_datasets {
            return Err(ResolveError::ConflictingOptions {
                option: names::DATASET.to_owned(),
                other: names::ALGORITHM.to_owned(),
                reason: format!(
                    "{} accepts a single dataset, got {}",
                    algorithm.command,
                    core.datasets.len()
                ),
            });
        }

        let mut admitted = Vec::new();

        if algorithm.accepts_knowledge {
            admitted.push(self.descriptor(names::KNOWLEDGE)?);
        }

        let selectors = [
            (SelectorKind::Test, names::TEST, algorithm.requires_test),
            (SelectorKind::Score, names::SCORE, algorithm.requires_score),
        ];

        // Selectors the algorithm doesn't need are still checked when given
        for (kind, name, required) in selectors {
            if required || working.arguments.mentions(name) {
                admitted.push(self.selector_descriptor(kind, name, core, required)?);
            }
        }

        let added = working.admit(admitted);
        tracing::debug!(algorithm = algorithm.command, added, "admitted selectors");

        Ok(())
    }

    fn select_method(
        &self,
        kind: SelectorKind,
        option: &str,
        value: &str,
        core: &Core<'_>,
    ) -> Result<&'r MethodInfo, ResolveError> {
        let catalog: &'r C = self.catalog;

        let found = match kind {
            SelectorKind::Test => catalog.test(value),
            _ => catalog.score(value),
        }
        .filter(|method| core.experimental || !method.experimental);

        let expected = || -> Vec<String> {
            catalog
                .methods_for(kind, core.data_type, core.experimental)
                .into_iter()
                .map(|method| method.command.to_owned())
                .collect()
        };

        match found {
            None => Err(ResolveError::UnknownSelector {
                option: option.to_owned(),
                kind,
                value: value.to_owned(),
                expected: expected(),
            }),
            Some(method) if !method.supports(core.data_type) => {
                Err(ResolveError::InapplicableSelector {
                    option: option.to_owned(),
                    kind,
                    value: value.to_owned(),
                    data_type: core.data_type,
                    expected: expected(),
                })
            }
            Some(method) => Ok(method),
        }
    }

    /// AlgorithmResolved -> TestScoreResolved
    fn resolve_selectors(
        &self,
        core: &Core<'r>,
        working: &mut Working<'_>,
    ) -> Result<Selection<'r>, ResolveError> {
        working.reparse(Stage::AlgorithmResolved)?;

        let arguments = &working.arguments;
        let algorithm = core.algorithm;

        let mut selection = Selection {
            knowledge: match algorithm.accepts_knowledge {
                true => optional_file(arguments, names::KNOWLEDGE)?,
                false => None,
            },
            test: None,
            score: None,
            unused: Vec::new(),
        };

        let selectors = [
            (SelectorKind::Test, names::TEST, algorithm.requires_test),
            (SelectorKind::Score, names::SCORE, algorithm.requires_score),
        ];

        for (kind, name, required) in selectors {
            if !working.schema.contains(name) {
                continue;
            }

            let value = required_value(arguments, name)?;
            let method = self.select_method(kind, name, value, core)?;

            match (kind, required) {
                (SelectorKind::Test, true) => selection.test = Some(method),
                (SelectorKind::Score, true) => selection.score = Some(method),
                _ => selection.unused.push(name.to_owned()),
            }
        }

        Ok(selection)
    }

    /// TestScoreResolved -> ParametersResolved
    fn admit_parameters(
        &self,
        core: &Core<'r>,
        selection: &Selection<'r>,
        working: &mut Working<'_>,
    ) -> Result<Vec<&'static str>, ResolveError> {
        let algorithm = core.algorithm;
        let parameters = self
            .catalog
            .parameter_names(algorithm, selection.test, selection.score);

        let descriptors = parameters
            .iter()
            .map(|&name| {
                self.registry
                    .lookup(name)
                    .cloned()
                    .ok_or_else(|| ResolveError::UndeclaredParameter {
                        option: names::ALGORITHM.to_owned(),
                        command: algorithm.command.to_owned(),
                        name: name.to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        working.pass(Stage::TestScoreResolved, descriptors)?;
        Ok(parameters)
    }

    /// ParametersResolved -> Done
    fn finish(
        &self,
        core: Core<'r>,
        selection: Selection<'r>,
        parameter_names: &[&'static str],
        working: &Working<'_>,
    ) -> Result<ResolvedConfiguration, ResolveError> {
        let arguments = &working.arguments;
        let mut parameters = BTreeMap::new();

        for &name in parameter_names {
            let info =
                self.catalog
                    .parameter(name)
                    .ok_or_else(|| ResolveError::UndeclaredParameter {
                        option: names::ALGORITHM.to_owned(),
                        command: core.algorithm.command.to_owned(),
                        name: name.to_owned(),
                    })?;

            let value = match arguments.get(name) {
                Some(value) => typed(&working.schema, name, value)?,
                None if core.use_defaults => info.default_value(),
                None => match info.kind {
                    ParamKind::Boolean { .. } => ParamValue::Boolean(false),
                    _ => info.default_value(),
                },
            };

            parameters.insert(info.name.to_owned(), value);
        }

        let mut unused = selection.unused;

        for (name, _) in arguments.unrecognized() {
            match self.registry.lookup(name) {
                None => {
                    return Err(ResolveError::UnknownOption {
                        option: name.to_owned(),
                    });
                }
                Some(descriptor) => {
                    if !unused.iter().any(|option| descriptor.is_named(option)) {
                        unused.push(descriptor.name().to_owned());
                    }
                }
            }
        }

        for option in &unused {
            tracing::warn!(
                option = option.as_str(),
                algorithm = core.algorithm.command,
                "option doesn't apply to this invocation and is ignored"
            );
        }

        Ok(ResolvedConfiguration {
            data_type: core.data_type,
            delimiter: core.delimiter,
            datasets: core.datasets,
            algorithm: core.algorithm.command.to_owned(),
            test: selection.test.map(|test| test.command.to_owned()),
            score: selection.score.map(|score| score.command.to_owned()),
            knowledge: selection.knowledge,
            parameters,
            data: core.data,
            output: core.output,
            thread_count: core.thread_count,
            skip_validation: core.skip_validation,
            experimental: core.experimental,
            use_defaults: core.use_defaults,
            unused,
        })
    }
}
