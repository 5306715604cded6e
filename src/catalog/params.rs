use super::{ParamInfo, ParamKind};

const UNBOUNDED: i64 = i32::MAX as i64;

const fn boolean(name: &'static str, default: bool, description: &'static str) -> ParamInfo {
    ParamInfo {
        name,
        description,
        kind: ParamKind::Boolean { default },
    }
}

const fn integer(
    name: &'static str,
    default: i64,
    (min, max): (i64, i64),
    description: &'static str,
) -> ParamInfo {
    ParamInfo {
        name,
        description,
        kind: ParamKind::Integer { default, min, max },
    }
}

const fn double(
    name: &'static str,
    default: f64,
    (min, max): (f64, f64),
    description: &'static str,
) -> ParamInfo {
    ParamInfo {
        name,
        description,
        kind: ParamKind::Double { default, min, max },
    }
}

pub(super) static PARAMETERS: &[ParamInfo] = &[
    // Tests and scores
    double("alpha", 0.01, (0.0, 1.0), "Cutoff for p values (alpha)"),
    double(
        "penalty-discount",
        2.0,
        (0.0, 100.0),
        "Penalty discount (c) multiplying the BIC penalty term",
    ),
    double(
        "structure-prior",
        0.0,
        (0.0, f64::INFINITY),
        "Structure prior coefficient (0 for no prior)",
    ),
    double(
        "sample-prior",
        10.0,
        (1.0, f64::INFINITY),
        "Sample prior (equivalent sample size) for the BDeu score",
    ),
    double(
        "ebic-gamma",
        0.8,
        (0.0, 1.0),
        "Gamma tuning parameter of the extended BIC",
    ),
    double(
        "min-count-per-cell",
        1.0,
        (0.0, f64::INFINITY),
        "Minimum expected count per cell of a contingency table",
    ),
    boolean(
        "discretize",
        true,
        "Discretize continuous parents of discrete children",
    ),
    integer(
        "num-categories-to-discretize",
        3,
        (2, UNBOUNDED),
        "Number of categories used when discretizing continuous variables",
    ),
    double(
        "kernel-multiplier",
        1.0,
        (f64::MIN_POSITIVE, f64::INFINITY),
        "Bowman and Azzalini kernel bandwidth multiplier",
    ),
    // Algorithms
    integer(
        "max-degree",
        -1,
        (-1, UNBOUNDED),
        "Maximum degree of the output graph (-1 for unlimited)",
    ),
    integer(
        "depth",
        -1,
        (-1, UNBOUNDED),
        "Maximum size of conditioning sets (-1 for unlimited)",
    ),
    integer(
        "max-path-length",
        -1,
        (-1, UNBOUNDED),
        "Maximum length of discriminating paths (-1 for unlimited)",
    ),
    boolean(
        "faithfulness-assumed",
        true,
        "Assume that uncorrelated variables are independent",
    ),
    boolean(
        "symmetric-first-step",
        false,
        "Score both X->Y and Y->X in the first step",
    ),
    boolean("parallelized", false, "Run the search in parallel"),
    boolean(
        "complete-rule-set-used",
        true,
        "Use the complete orientation rule set (Zhang)",
    ),
    boolean(
        "stable-fas",
        true,
        "Use the order-independent adjacency search",
    ),
    integer(
        "conflict-rule",
        1,
        (1, 3),
        "Collider conflict rule: 1 overwrite, 2 orient bidirected, 3 prioritize existing",
    ),
    boolean(
        "concurrent-fas",
        true,
        "Run the adjacency search concurrently",
    ),
    integer(
        "num-starts",
        1,
        (1, UNBOUNDED),
        "Number of random restarts",
    ),
    boolean(
        "use-bes",
        false,
        "Finish with a backward equivalence search",
    ),
    ParamInfo {
        name: "target-name",
        description: "Name of the target variable of a Markov blanket search",
        kind: ParamKind::String { default: "" },
    },
    double(
        "mgm-param1",
        0.1,
        (0.0, f64::INFINITY),
        "MGM tuning parameter for continuous-continuous edges",
    ),
    double(
        "mgm-param2",
        0.1,
        (0.0, f64::INFINITY),
        "MGM tuning parameter for continuous-discrete edges",
    ),
    double(
        "mgm-param3",
        0.1,
        (0.0, f64::INFINITY),
        "MGM tuning parameter for discrete-discrete edges",
    ),
    boolean("verbose", false, "Print additional search information"),
    // Bootstrapping
    integer(
        "number-resampling",
        0,
        (0, UNBOUNDED),
        "Number of bootstrap samples (0 to disable bootstrapping)",
    ),
    integer(
        "percent-resample-size",
        100,
        (10, 100),
        "Size of each resample as a percentage of the dataset",
    ),
    boolean(
        "resampling-with-replacement",
        true,
        "Draw resamples with replacement",
    ),
    integer(
        "resampling-ensemble",
        1,
        (0, 3),
        "Ensemble method: 0 preserved, 1 highest, 2 majority, 3 optimistic",
    ),
    boolean(
        "add-original-dataset",
        false,
        "Add the original dataset as one of the resamples",
    ),
    integer(
        "seed",
        -1,
        (-1, i64::MAX),
        "Seed for the pseudorandom generator (-1 for none)",
    ),
];

pub(super) static BOOTSTRAP: &[&str] = &[
    "number-resampling",
    "percent-resample-size",
    "resampling-with-replacement",
    "resampling-ensemble",
    "add-original-dataset",
    "seed",
];
