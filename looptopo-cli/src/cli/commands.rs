//! Command implementations and argument parsing for the `looptopo` binary.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use looptopo_core::{
    Basis, DEFAULT_VAR_NAME, ExtenderBuilder, Lattice, LoopTopoError, MomentumRoles,
    OutputFormatter, ParseError, Topology, extend_all, parse_document, parse_expression,
};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

use super::meta::load_meta;

const DEFAULT_MAX_ADD: usize = 50;
const DEFAULT_INCOMING_LEGS: usize = 2;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "looptopo",
    about = "Complete one-loop topologies by unit-step propagator insertion."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Extend every topology in a file and serialize the result.
    Extend(ExtendCommand),
}

/// Options accepted by the `extend` command.
#[derive(Debug, Args, Clone)]
pub struct ExtendCommand {
    /// Topology file, one `Name: [[momentum, mass], ...]` record per line.
    pub topologies: PathBuf,

    /// External leg configuration.
    #[command(flatten)]
    pub legs: LegArgs,

    /// Prefix of the numbered external momenta.
    #[arg(long = "basis-prefix", default_value = "p")]
    pub basis_prefix: String,

    /// Loop momentum symbol.
    #[arg(long = "loop-symbol", default_value = "l")]
    pub loop_symbol: String,

    /// Propagator count to reach (defaults to the number of legs).
    #[arg(long)]
    pub target: Option<usize>,

    /// Rank to reach (defaults to legs - 1 when eliminating, else 0).
    #[arg(long = "rank-needed")]
    pub rank_needed: Option<usize>,

    /// Momentum to eliminate at output: `last`, `none`, or a 1-based index.
    #[arg(long, default_value = "last")]
    pub eliminate: Eliminate,

    /// Maximum propagators inserted per topology.
    #[arg(long = "max-add", default_value_t = DEFAULT_MAX_ADD)]
    pub max_add: usize,

    /// Mass given to inserted propagators.
    #[arg(long = "default-mass", default_value = "0")]
    pub default_mass: String,

    /// Write the result here instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Name of the serialized list.
    #[arg(long = "var-name", default_value = DEFAULT_VAR_NAME)]
    pub var_name: String,
}

/// Where the external legs come from: a `meta.json` file or explicit flags.
#[derive(Debug, Args, Clone, Default)]
pub struct LegArgs {
    /// Process metadata with `n_in`, `n_out` and `particles`.
    #[arg(long, conflicts_with = "legs", required_unless_present = "legs")]
    pub meta: Option<PathBuf>,

    /// Number of external legs.
    #[arg(long)]
    pub legs: Option<NonZeroUsize>,

    /// 1-based incoming leg indices (default: the first two legs).
    #[arg(long, value_delimiter = ',', requires = "legs")]
    pub incoming: Vec<NonZeroUsize>,

    /// 1-based outgoing leg indices (default: every leg not incoming).
    #[arg(long, value_delimiter = ',', requires = "legs")]
    pub outgoing: Vec<NonZeroUsize>,
}

/// Output-time elimination choice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eliminate {
    /// Eliminate the highest-numbered momentum.
    Last,
    /// Keep every momentum.
    None,
    /// Eliminate the momentum at this 1-based index.
    Index(NonZeroUsize),
}

impl Eliminate {
    /// Zero-based basis index for a process with `legs` external legs.
    #[must_use]
    pub fn resolve(self, legs: usize) -> Option<usize> {
        match self {
            Self::Last => legs.checked_sub(1),
            Self::None => None,
            Self::Index(index) => Some(index.get() - 1),
        }
    }
}

impl FromStr for Eliminate {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "last" => Ok(Self::Last),
            "none" => Ok(Self::None),
            other => other
                .parse::<NonZeroUsize>()
                .map(Self::Index)
                .map_err(|_| format!("expected `last`, `none` or a 1-based index, got `{other}`")),
        }
    }
}

impl fmt::Display for Eliminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Last => f.write_str("last"),
            Self::None => f.write_str("none"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Reading an input or writing the output failed.
    #[error("failed to access `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The metadata file was not valid JSON of the expected shape.
    #[error("invalid process metadata in `{path}`: {source}")]
    Meta {
        /// Metadata path.
        path: PathBuf,
        /// Underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
    /// The metadata decoded but its leg counts are unusable.
    #[error("invalid process metadata in `{path}`: {reason}")]
    InvalidMeta {
        /// Metadata path.
        path: PathBuf,
        /// What is wrong with the decoded values.
        reason: &'static str,
    },
    /// `--default-mass` was not a linear expression.
    #[error("invalid default mass `{raw}`: {source}")]
    InvalidMass {
        /// Raw flag value.
        raw: String,
        /// Underlying parse failure.
        #[source]
        source: ParseError,
    },
    /// Core parsing, mapping or configuration failed.
    #[error(transparent)]
    Core(#[from] LoopTopoError),
}

impl CliError {
    /// Stable code of the underlying core or parse error, if any.
    #[must_use]
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::Core(core) => Some(core.code().as_str()),
            Self::InvalidMass { source, .. } => Some(source.code().as_str()),
            Self::Io { .. } | Self::Meta { .. } | Self::InvalidMeta { .. } => None,
        }
    }
}

/// Outcome of an `extend` run.
#[derive(Debug, Clone)]
pub struct ExtendSummary {
    /// Number of topologies processed.
    pub topologies: usize,
    /// Number of topologies that stopped short of their targets.
    pub shortfalls: usize,
    /// The serialized assignment.
    pub rendered: String,
    /// File the assignment was written to; `None` means stdout.
    pub written_to: Option<PathBuf>,
}

/// External legs and their roles, resolved from metadata or flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LegPlan {
    pub(super) basis: Basis,
    pub(super) roles: MomentumRoles,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when an input cannot be read or parsed, the
/// configuration is inconsistent, or the output cannot be written.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use clap::Parser;
/// # use looptopo_cli::cli::{Cli, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "test2: {{l,0},{l-p1-p2,0}}\n")?;
/// let path = file.path().to_str().ok_or("non UTF-8 temp path")?;
/// let cli = Cli::try_parse_from(["looptopo", "extend", path, "--legs", "4", "--eliminate", "none"])?;
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.topologies, 1);
/// assert!(summary.rendered.contains("{{l, 0}, {l - p1 - p2, 0}, {l - p2, 0}, {l - p1 - p2 - p3, 0}}"));
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExtendSummary, CliError> {
    match cli.command {
        Command::Extend(extend) => {
            Span::current().record("command", field::display("extend"));
            run_extend(extend)
        }
    }
}

#[instrument(
    name = "cli.extend",
    err,
    skip(command),
    fields(
        path = %command.topologies.display(),
        legs = field::Empty,
        eliminate = %command.eliminate,
        target = field::Empty,
        rank_needed = field::Empty,
    ),
)]
pub(super) fn run_extend(command: ExtendCommand) -> Result<ExtendSummary, CliError> {
    let plan = resolve_legs(&command.legs, &command.basis_prefix)?;
    let legs = plan.basis.len();
    let eliminate = command.eliminate.resolve(legs);
    let target = command.target.unwrap_or(legs);
    let rank_needed = command
        .rank_needed
        .unwrap_or_else(|| if eliminate.is_some() { legs - 1 } else { 0 });

    let span = Span::current();
    span.record("legs", legs);
    span.record("target", target);
    span.record("rank_needed", rank_needed);

    let default_mass =
        parse_expression(&command.default_mass).map_err(|source| CliError::InvalidMass {
            raw: command.default_mass.clone(),
            source,
        })?;
    let extender = ExtenderBuilder::new(Lattice::new(command.loop_symbol, plan.basis.clone())?)
        .with_target(target)
        .with_rank_needed(rank_needed)
        .with_eliminate(eliminate)
        .with_max_add(command.max_add)
        .with_default_mass(default_mass)
        .build()?;

    let topologies = read_topologies(&command.topologies)?;
    let outcomes = extend_all(&extender, &topologies)?;

    let mut shortfalls = 0;
    let mut extended = Vec::with_capacity(outcomes.len());
    for (input, outcome) in topologies.iter().zip(outcomes) {
        let name = input.name();
        let before = input.len();
        let after = outcome.topology().len();
        info!(topology = name, before, after, "{name}: {before} -> {after}");
        if !outcome.is_complete() {
            shortfalls += 1;
        }
        extended.push(outcome.into_topology());
    }

    let rendered = OutputFormatter::new(plan.basis)
        .with_eliminate(eliminate)
        .with_roles(plan.roles)
        .with_var_name(command.var_name)
        .render(&extended);

    if let Some(path) = &command.output {
        fs::write(path, &rendered).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
    }

    let destination = command
        .output
        .as_deref()
        .map_or_else(|| "<stdout>".to_owned(), |path| path.display().to_string());
    info!(
        topologies = extended.len(),
        shortfalls,
        output = %destination,
        "extension completed"
    );
    Ok(ExtendSummary {
        topologies: extended.len(),
        shortfalls,
        rendered,
        written_to: command.output,
    })
}

/// Builds the basis and momentum roles from `meta.json` or the leg flags.
pub(super) fn resolve_legs(args: &LegArgs, prefix: &str) -> Result<LegPlan, CliError> {
    if let Some(path) = &args.meta {
        let meta = load_meta(path)?;
        let legs = meta.legs().ok_or_else(|| CliError::InvalidMeta {
            path: path.clone(),
            reason: "n_in + n_out does not fit in a leg count",
        })?;
        let basis = Basis::numbered(prefix, legs)?;
        let roles = meta.roles(&basis)?;
        info!(n_in = meta.n_in, n_out = meta.n_out, "loaded process metadata");
        return Ok(LegPlan { basis, roles });
    }
    let legs = args.legs.map_or(0, NonZeroUsize::get);
    let basis = Basis::numbered(prefix, legs)?;
    let roles = if args.incoming.is_empty() && args.outgoing.is_empty() {
        MomentumRoles::split(legs, DEFAULT_INCOMING_LEGS)
    } else {
        let incoming = zero_based(&args.incoming);
        let outgoing = if args.outgoing.is_empty() {
            (0..legs).filter(|index| !incoming.contains(index)).collect()
        } else {
            zero_based(&args.outgoing)
        };
        MomentumRoles::new(incoming, outgoing, legs)?
    };
    Ok(LegPlan { basis, roles })
}

fn zero_based(indices: &[NonZeroUsize]) -> Vec<usize> {
    indices.iter().map(|index| index.get() - 1).collect()
}

#[instrument(name = "cli.read_topologies", err, fields(path = %path.display()))]
pub(super) fn read_topologies(path: &Path) -> Result<Vec<Topology>, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let topologies = parse_document(&text)?;
    info!(count = topologies.len(), "read topologies");
    Ok(topologies)
}

/// Writes the serialized topologies to `writer` unless they already went to
/// a file.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// # use looptopo_cli::cli::{ExtendSummary, render_summary};
/// let summary = ExtendSummary {
///     topologies: 0,
///     shortfalls: 0,
///     rendered: "Extended = {\n\n};\n".into(),
///     written_to: None,
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(buffer, summary.rendered.as_bytes());
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn render_summary(summary: &ExtendSummary, mut writer: impl Write) -> io::Result<()> {
    if summary.written_to.is_none() {
        writer.write_all(summary.rendered.as_bytes())?;
    }
    Ok(())
}
