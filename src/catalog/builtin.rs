use super::{
    AlgorithmInfo, CommandRegistry, DataType, Factory, MethodInfo, ParamInfo, ParameterRegistry,
    params::{BOOTSTRAP, PARAMETERS},
};

use DataType::{Continuous, Covariance, Discrete, Mixed};

/// The algorithms, tests, scores, and parameters known to `causal-cmd`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

static ALGORITHMS: &[AlgorithmInfo] = &[
    AlgorithmInfo {
        command: "fges",
        description: "Fast Greedy Equivalence Search",
        experimental: false,
        requires_test: false,
        requires_score: true,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &[
            "faithfulness-assumed",
            "symmetric-first-step",
            "max-degree",
            "parallelized",
            "verbose",
        ],
    },
    AlgorithmInfo {
        command: "fges-mb",
        description: "Fast Greedy Equivalence Search restricted to a Markov blanket",
        experimental: false,
        requires_test: false,
        requires_score: true,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &["target-name", "faithfulness-assumed", "max-degree", "verbose"],
    },
    AlgorithmInfo {
        command: "gfci",
        description: "Greedy Fast Causal Inference",
        experimental: false,
        requires_test: true,
        requires_score: true,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &[
            "faithfulness-assumed",
            "max-degree",
            "max-path-length",
            "complete-rule-set-used",
            "depth",
            "verbose",
        ],
    },
    AlgorithmInfo {
        command: "pc",
        description: "PC algorithm",
        experimental: false,
        requires_test: true,
        requires_score: false,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &[
            "stable-fas",
            "conflict-rule",
            "depth",
            "concurrent-fas",
            "verbose",
        ],
    },
    AlgorithmInfo {
        command: "cpc",
        description: "Conservative PC",
        experimental: false,
        requires_test: true,
        requires_score: false,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &["stable-fas", "conflict-rule", "depth", "verbose"],
    },
    AlgorithmInfo {
        command: "fci",
        description: "Fast Causal Inference",
        experimental: false,
        requires_test: true,
        requires_score: false,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &[
            "depth",
            "max-path-length",
            "complete-rule-set-used",
            "stable-fas",
            "verbose",
        ],
    },
    AlgorithmInfo {
        command: "rfci",
        description: "Really Fast Causal Inference",
        experimental: false,
        requires_test: true,
        requires_score: false,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &["depth", "max-path-length", "complete-rule-set-used", "verbose"],
    },
    AlgorithmInfo {
        command: "boss",
        description: "Best Order Score Search",
        experimental: false,
        requires_test: false,
        requires_score: true,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &["num-starts", "use-bes", "verbose"],
    },
    AlgorithmInfo {
        command: "grasp",
        description: "Greedy Relaxations of the Sparsest Permutation",
        experimental: true,
        requires_test: true,
        requires_score: true,
        accepts_knowledge: true,
        accepts_multiple_datasets: false,
        parameters: &["num-starts", "depth", "verbose"],
    },
    AlgorithmInfo {
        command: "images",
        description: "Independent Multiple-sample Greedy Equivalence Search",
        experimental: false,
        requires_test: false,
        requires_score: true,
        accepts_knowledge: true,
        accepts_multiple_datasets: true,
        parameters: &["faithfulness-assumed", "max-degree", "verbose"],
    },
    AlgorithmInfo {
        command: "mgm",
        description: "Mixed Graphical Model",
        experimental: false,
        requires_test: false,
        requires_score: false,
        accepts_knowledge: false,
        accepts_multiple_datasets: false,
        parameters: &["mgm-param1", "mgm-param2", "mgm-param3", "verbose"],
    },
];

static TESTS: &[MethodInfo] = &[
    MethodInfo {
        command: "fisher-z-test",
        description: "Fisher Z test based on partial correlation",
        experimental: false,
        data_types: &[Continuous, Covariance],
        parameters: &["alpha"],
    },
    MethodInfo {
        command: "sem-bic-test",
        description: "Test that accepts independence when the SEM BIC score doesn't improve",
        experimental: false,
        data_types: &[Continuous, Covariance],
        parameters: &["penalty-discount", "structure-prior"],
    },
    MethodInfo {
        command: "chi-square-test",
        description: "Chi square test of conditional independence",
        experimental: false,
        data_types: &[Discrete],
        parameters: &["alpha", "min-count-per-cell"],
    },
    MethodInfo {
        command: "g-square-test",
        description: "G square (likelihood ratio) test of conditional independence",
        experimental: false,
        data_types: &[Discrete],
        parameters: &["alpha", "min-count-per-cell"],
    },
    MethodInfo {
        command: "cg-lr-test",
        description: "Conditional Gaussian likelihood ratio test",
        experimental: false,
        data_types: &[Mixed],
        parameters: &["alpha", "discretize", "num-categories-to-discretize"],
    },
    MethodInfo {
        command: "dg-lr-test",
        description: "Degenerate Gaussian likelihood ratio test",
        experimental: false,
        data_types: &[Mixed],
        parameters: &["alpha"],
    },
    MethodInfo {
        command: "kci-test",
        description: "Kernel conditional independence test",
        experimental: true,
        data_types: &[Continuous],
        parameters: &["alpha", "kernel-multiplier"],
    },
];

static SCORES: &[MethodInfo] = &[
    MethodInfo {
        command: "sem-bic-score",
        description: "BIC score for linear Gaussian structural equation models",
        experimental: false,
        data_types: &[Continuous, Covariance],
        parameters: &["penalty-discount", "structure-prior"],
    },
    MethodInfo {
        command: "ebic-score",
        description: "Extended BIC score",
        experimental: false,
        data_types: &[Continuous, Covariance],
        parameters: &["ebic-gamma"],
    },
    MethodInfo {
        command: "bdeu-score",
        description: "Bayesian Dirichlet likelihood equivalent uniform score",
        experimental: false,
        data_types: &[Discrete],
        parameters: &["sample-prior", "structure-prior"],
    },
    MethodInfo {
        command: "disc-bic-score",
        description: "BIC score for discrete data",
        experimental: false,
        data_types: &[Discrete],
        parameters: &["penalty-discount", "structure-prior"],
    },
    MethodInfo {
        command: "cg-bic-score",
        description: "Conditional Gaussian BIC score",
        experimental: false,
        data_types: &[Mixed],
        parameters: &[
            "penalty-discount",
            "structure-prior",
            "discretize",
            "num-categories-to-discretize",
        ],
    },
    MethodInfo {
        command: "dg-bic-score",
        description: "Degenerate Gaussian BIC score",
        experimental: false,
        data_types: &[Mixed],
        parameters: &["penalty-discount", "structure-prior"],
    },
];

impl CommandRegistry for BuiltinCatalog {
    fn algorithms(&self) -> &[AlgorithmInfo] {
        ALGORITHMS
    }

    fn tests(&self) -> &[MethodInfo] {
        TESTS
    }

    fn scores(&self) -> &[MethodInfo] {
        SCORES
    }
}

impl ParameterRegistry for BuiltinCatalog {
    fn parameters(&self) -> &[ParamInfo] {
        PARAMETERS
    }
}

impl Factory for BuiltinCatalog {
    fn bootstrap_parameters(&self) -> &[&'static str] {
        BOOTSTRAP
    }
}
