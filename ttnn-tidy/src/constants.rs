//! Shared constants: config file names and the default rule knobs.

/// Name of the per-project configuration file.
pub const CONFIG_FILENAME: &str = ".ttnn-tidy.toml";
/// TOML section holding the configuration.
pub const CONFIG_SECTION: &str = "ttnn-tidy";
/// Environment variable read by the driver's log filter.
pub const LOG_ENV_VAR: &str = "TTNN_TIDY_LOG";

/// Registration function whose call sites are simplified.
pub const DEFAULT_HOST_FUNCTION: &str = "ttnn::bind_registered_operation";
/// Leading arguments (module, operation, doc) before overloads begin.
pub const DEFAULT_PREFIX_ARGS: usize = 3;
/// Multi-overload wrapper type.
pub const DEFAULT_MARKER_TYPE: &str = "nanobind_overload_t";
/// Single-overload wrapper type.
pub const DEFAULT_REPLACEMENT_TYPE: &str = "nanobind_arguments_t";
/// Qualifier kept in front of the replacement when present.
pub const DEFAULT_MARKER_QUALIFIER: &str = "ttnn::";
/// Lookahead used to locate the marker inside its argument.
pub const DEFAULT_MARKER_WINDOW: usize = 200;
/// Declaration that becomes unused once the forwarding closure is gone.
pub const DEFAULT_COMPANION_PHRASE: &str = "using OperationType = ";
/// Lookback used to locate the companion declaration.
pub const DEFAULT_COMPANION_WINDOW: usize = 512;

/// Naming convention of operation types files.
pub const DEFAULT_TYPES_FILE_SUFFIX: &str = "_device_operation_types.hpp";
/// Namespace allowed in front of canonical alias targets.
pub const DEFAULT_CANONICAL_NAMESPACE: &str = "ttnn";

/// Structural and category namespaces that never name an operation.
pub const DEFAULT_SCOPE_DENYLIST: &[&str] = &[
    "ttnn",
    "operations",
    "data_movement",
    "eltwise",
    "binary",
    "unary",
    "reduction",
    "matmul",
    "conv",
    "pool",
    "normalization",
    "transformer",
    "embedding",
    "loss",
    "kv_cache",
    "ccl",
    "moreh",
    "experimental",
    "creation",
    "copy",
    "reshape_common",
    "reshape_on_device",
    "program",
];

/// Spellings produced by member aliases of device operation structs.
pub const DEFAULT_RECORD_ALIAS_MARKERS: &[&str] = &["DeviceOperation::", "Operation::"];

/// Leading keywords/qualifiers ignored when comparing type spellings.
pub const TYPE_KEYWORDS: &[&str] = &[
    "const ", "volatile ", "struct ", "class ", "enum ", "union ", "typename ",
];
