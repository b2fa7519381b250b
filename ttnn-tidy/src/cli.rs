use clap::{Args, Parser};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.ttnn-tidy.toml):
  Looked up from the first input upwards; --config overrides the search.

  [ttnn-tidy]
  host_function = \"ttnn::bind_registered_operation\"
  prefix_args = 3                # module, operation, doc
  marker_type = \"nanobind_overload_t\"
  replacement_type = \"nanobind_arguments_t\"
  types_file_suffix = \"_device_operation_types.hpp\"
  scope_denylist = [\"ttnn\", \"operations\", \"data_movement\"]
  ignore = []                    # rule ids to disable

INPUTS:
  Each input is a translation unit exported by a front-end as JSON.
";

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Output findings as a JSON array.
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Exit with code 1 if any finding is reported.
    #[arg(long)]
    pub fail_on_findings: bool,
}

/// Options controlling how edits are applied.
#[derive(Args, Debug, Default, Clone)]
pub struct FixOptions {
    /// Apply every finding's edits to the analyzed file.
    #[arg(long)]
    pub fix: bool,

    /// With --fix, print the rewritten files instead of writing them.
    #[arg(long, requires = "fix")]
    pub dry_run: bool,
}

/// Command line interface configuration using `clap`.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ttnn-tidy - Modernization checks for TT-NN operation sources",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    /// Translation unit documents to analyze.
    #[arg(required_unless_present = "list_rules")]
    pub inputs: Vec<PathBuf>,

    /// Run only these rules (repeatable). Defaults to every enabled rule.
    #[arg(long = "rule", value_name = "ID")]
    pub rules: Vec<String>,

    /// Explicit configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the registered rules and exit.
    #[arg(long)]
    pub list_rules: bool,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,

    /// Fix options.
    #[command(flatten)]
    pub fix: FixOptions,
}
