//! Command implementations and argument parsing for the `aura` binary.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use aura_core::{
    AugmenterBuilder, AuraError, CompletionService, Preset, ProgressSink, RunSummary,
};
use aura_providers_openai::OpenAiProviderError;
use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing::{Span, field, info, instrument, warn};

use super::prompt::{Console, Step};

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "aura",
    version,
    about = "AURA - Automated Universal Row Augmenter: annotate database attribute lists with generated text."
)]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Returns whether the hidden `--debug` flag was given.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.command.tuning().debug
    }
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Write a short Turkish description next to each attribute.
    Describe(DescribeArgs),
    /// Tag each attribute of an entity as `core`, `local`, or neither.
    Stereotype(StereotypeArgs),
}

impl Command {
    const fn tuning(&self) -> &Tuning {
        match self {
            Self::Describe(args) => &args.tuning,
            Self::Stereotype(args) => &args.tuning,
        }
    }
}

/// Arguments accepted by `describe`.
#[derive(Debug, Args, Clone, Default)]
pub struct DescribeArgs {
    /// Text file with one attribute name per line.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// File that receives one `name: description` line per attribute.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Hidden experimentation flags.
    #[command(flatten)]
    pub tuning: Tuning,
}

/// Arguments accepted by `stereotype`.
#[derive(Debug, Args, Clone, Default)]
pub struct StereotypeArgs {
    /// Entity the attributes belong to, e.g. `Customer`.
    #[arg(value_name = "ENTITY")]
    pub entity: Option<String>,

    /// Text file with one attribute name per line.
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// File that receives one `name: stereotype` line per attribute.
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Hidden experimentation flags.
    #[command(flatten)]
    pub tuning: Tuning,
}

/// Overrides for the preset defaults. Only honoured together with `--debug`.
#[derive(Debug, Args, Clone, Default, PartialEq, Eq)]
pub struct Tuning {
    /// Enables the overrides below and verbose diagnostics.
    #[arg(long, hide = true)]
    pub debug: bool,

    /// Model identifier to request.
    #[arg(long, hide = true)]
    pub model: Option<String>,

    /// System instruction sent with every chunk.
    #[arg(long, hide = true)]
    pub prompt: Option<String>,

    /// Number of attributes per request.
    #[arg(long = "chunk-size", alias = "chunk_size", hide = true)]
    pub chunk_size: Option<usize>,
}

impl Tuning {
    const fn has_overrides(&self) -> bool {
        self.model.is_some() || self.prompt.is_some() || self.chunk_size.is_some()
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// A hidden override was supplied without `--debug`.
    #[error("--model, --prompt, and --chunk-size can only be used with --debug")]
    IllegalOverride,
    /// The user declined the confirmation prompt.
    #[error("operation cancelled")]
    Cancelled,
    /// A chunk size typed at the prompt was not a number.
    #[error("invalid chunk size `{value}`; expected a positive integer")]
    InvalidChunkSize {
        /// Raw answer.
        value: String,
    },
    /// Reading an answer or writing a prompt failed.
    #[error("interactive prompt failed: {0}")]
    Prompt(#[from] io::Error),
    /// Provider configuration failed.
    #[error(transparent)]
    Provider(#[from] OpenAiProviderError),
    /// The pipeline failed.
    #[error(transparent)]
    Core(#[from] AuraError),
}

/// Fully resolved parameters for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Preset the run was seeded from.
    pub preset: &'static Preset,
    /// Entity name, for presets that need one.
    pub entity: Option<String>,
    /// Input artifact.
    pub input: PathBuf,
    /// Output artifact.
    pub output: PathBuf,
    /// Model identifier.
    pub model: String,
    /// System instruction.
    pub instruction: String,
    /// Lines per request.
    pub chunk_size: usize,
}

/// Arguments gathered so far, before defaults are applied.
#[derive(Debug)]
struct Draft {
    preset: &'static Preset,
    entity: Option<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    tuning: Tuning,
}

impl From<Command> for Draft {
    fn from(command: Command) -> Self {
        match command {
            Command::Describe(args) => Self {
                preset: &Preset::DESCRIPTIONS,
                entity: None,
                input: args.input,
                output: args.output,
                tuning: args.tuning,
            },
            Command::Stereotype(args) => Self {
                preset: &Preset::STEREOTYPES,
                entity: args.entity,
                input: args.input,
                output: args.output,
                tuning: args.tuning,
            },
        }
    }
}

impl Draft {
    fn needs_entity(&self) -> bool {
        self.preset.schema.expects_entity() && self.entity.is_none()
    }

    fn is_complete(&self) -> bool {
        !self.needs_entity() && self.input.is_some() && self.output.is_some()
    }

    fn model(&self) -> &str {
        self.tuning.model.as_deref().unwrap_or(self.preset.model)
    }

    fn instruction(&self) -> &str {
        self.tuning.prompt.as_deref().unwrap_or(self.preset.instruction)
    }

    fn chunk_size(&self) -> usize {
        self.tuning.chunk_size.unwrap_or(self.preset.chunk_size)
    }

    fn into_settings(self) -> Result<RunSettings, CliError> {
        let missing = |setting: &'static str| AuraError::InvalidConfiguration {
            setting,
            reason: "a value is required".to_owned(),
        };
        let model = self.model().to_owned();
        let instruction = self.instruction().to_owned();
        let chunk_size = self.chunk_size();
        Ok(RunSettings {
            preset: self.preset,
            entity: self.entity,
            input: self.input.ok_or_else(|| missing("input"))?,
            output: self.output.ok_or_else(|| missing("output"))?,
            model,
            instruction,
            chunk_size,
        })
    }

    fn complete_interactively<R: BufRead, W: Write>(
        mut self,
        console: &mut Console<R, W>,
    ) -> Result<RunSettings, CliError> {
        console.say(&banner(self.preset))?;
        let mut step = Some(Step::Entity);
        while let Some(current) = step {
            step = current.next();
            if current.debug_only() && !self.tuning.debug {
                continue;
            }
            match current {
                Step::Entity if self.needs_entity() => {
                    self.entity = Some(console.ask("Please enter the entity name: ")?);
                }
                Step::Input if self.input.is_none() => {
                    let answer = console.ask("Please enter the input file path: ")?;
                    self.input = Some(PathBuf::from(answer));
                }
                Step::Output if self.output.is_none() => {
                    let answer = console.ask("Please enter the output file path: ")?;
                    self.output = Some(PathBuf::from(answer));
                }
                Step::Model => {
                    let default = self.model().to_owned();
                    let question = format!("Please enter the model (default: {default}): ");
                    self.tuning.model = Some(console.ask_or(&question, &default)?);
                }
                Step::Instruction => {
                    let default = self.instruction().to_owned();
                    let question = "Please enter the prompt or press enter for default prompt: ";
                    self.tuning.prompt = Some(console.ask_or(question, &default)?);
                }
                Step::ChunkSize => {
                    let question = format!(
                        "Please enter the chunk size (default: {}): ",
                        self.chunk_size()
                    );
                    let answer = console.ask(&question)?;
                    if !answer.trim().is_empty() {
                        self.tuning.chunk_size = Some(parse_chunk_size(&answer)?);
                    }
                }
                Step::Confirm => {
                    if !console.confirm("Do you want to proceed with these settings? (yes/no): ")? {
                        console.say("Operation cancelled.")?;
                        return Err(CliError::Cancelled);
                    }
                }
                Step::Entity | Step::Input | Step::Output => {}
            }
        }
        console.say("Processing...")?;
        self.into_settings()
    }
}

fn parse_chunk_size(answer: &str) -> Result<usize, CliError> {
    answer
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidChunkSize {
            value: answer.trim().to_owned(),
        })
}

fn banner(preset: &Preset) -> String {
    let usage = if preset.schema.expects_entity() {
        "<ENTITY> <INPUT> <OUTPUT>"
    } else {
        "<INPUT> <OUTPUT>"
    };
    format!(
        "AURA - Automated Universal Row Augmenter\nPreset: {} (model {})\nUsage: aura {} {usage}\n",
        preset.name, preset.model, preset.name
    )
}

/// Turns parsed arguments into [`RunSettings`], asking on `console` for
/// anything the command line left out.
///
/// Overrides without `--debug` are rejected before any prompt is shown. When
/// every positional argument is present no question is asked.
///
/// # Errors
/// Returns [`CliError::IllegalOverride`], [`CliError::Cancelled`] when the
/// user declines, or a prompt failure.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use aura_cli::cli::{Cli, Console, resolve_settings};
/// use clap::Parser;
///
/// let cli = Cli::try_parse_from(["aura", "describe", "in.txt"])?;
/// let mut console = Console::new(Cursor::new("out.txt\ny\n"), Vec::new());
/// let settings = resolve_settings(cli, &mut console)?;
/// assert_eq!(settings.output.to_str(), Some("out.txt"));
/// assert_eq!(settings.model, "gpt-4o-mini");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(
    name = "cli.resolve",
    err,
    skip(cli, console),
    fields(command = field::Empty, debug = field::Empty, interactive = field::Empty),
)]
pub fn resolve_settings<R: BufRead, W: Write>(
    cli: Cli,
    console: &mut Console<R, W>,
) -> Result<RunSettings, CliError> {
    let draft = Draft::from(cli.command);
    let span = Span::current();
    span.record("command", draft.preset.name);
    span.record("debug", draft.tuning.debug);

    if draft.tuning.debug {
        warn!("debug mode is an experimental feature; use at your own risk");
    } else if draft.tuning.has_overrides() {
        return Err(CliError::IllegalOverride);
    }

    let interactive = !draft.is_complete();
    span.record("interactive", interactive);
    if interactive {
        draft.complete_interactively(console)
    } else {
        draft.into_settings()
    }
}

/// Runs the pipeline described by `settings` against `service`, writing a
/// progress line to `out` after every committed chunk.
///
/// # Errors
/// Returns [`CliError::Core`] when the settings are invalid or the run fails.
#[instrument(
    name = "cli.execute",
    err,
    skip(settings, service, out),
    fields(
        command = settings.preset.name,
        service = service.name(),
        model = settings.model.as_str(),
        chunk_size = settings.chunk_size,
    ),
)]
pub fn execute<S, W>(
    settings: &RunSettings,
    service: &S,
    out: &mut W,
) -> Result<RunSummary, CliError>
where
    S: CompletionService + ?Sized,
    W: Write,
{
    let mut builder = AugmenterBuilder::from_preset(settings.preset)
        .with_model(settings.model.as_str())
        .with_instruction(settings.instruction.as_str())
        .with_chunk_size(settings.chunk_size);
    if let Some(entity) = settings.entity.as_deref() {
        builder = builder.with_entity(entity);
    }
    let augmenter = builder.build()?;

    let mut progress = ConsoleProgress::new(out);
    let summary = augmenter.run_path(service, &settings.input, &settings.output, &mut progress)?;
    info!(
        chunks = summary.chunks,
        entries = summary.entries,
        output = %summary.output.display(),
        "command completed"
    );
    Ok(summary)
}

/// Resolves settings and executes them in one step.
///
/// # Errors
/// See [`resolve_settings`] and [`execute`].
///
/// # Examples
/// ```
/// use std::ffi::OsString;
/// use std::io::Cursor;
/// use aura_cli::cli::{Cli, Console, run_cli};
/// use aura_core::{CompletionService, GenerationRequest, GenerationResponse, ServiceError};
/// use clap::Parser;
///
/// struct Echo;
///
/// impl CompletionService for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn complete(&self, request: &GenerationRequest<'_>) -> Result<GenerationResponse, ServiceError> {
///         let names: Vec<String> = request.chunk_text.lines().map(ToOwned::to_owned).collect();
///         Ok(GenerationResponse {
///             descriptions: names.clone(),
///             attribute_names: names,
///             entity_name: None,
///         })
///     }
/// }
///
/// let dir = tempfile::tempdir()?;
/// let input = dir.path().join("in.txt");
/// let output = dir.path().join("out.txt");
/// std::fs::write(&input, "Order ID\n")?;
/// let cli = Cli::try_parse_from([
///     OsString::from("aura"),
///     OsString::from("describe"),
///     input.into_os_string(),
///     output.clone().into_os_string(),
/// ])?;
/// let mut console = Console::new(Cursor::new(""), Vec::new());
/// let summary = run_cli(cli, &Echo, &mut console)?;
/// assert_eq!(summary.entries, 1);
/// assert_eq!(std::fs::read_to_string(&output)?, "Order ID: Order ID");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(name = "cli.run", err, skip_all)]
pub fn run_cli<S, R, W>(
    cli: Cli,
    service: &S,
    console: &mut Console<R, W>,
) -> Result<RunSummary, CliError>
where
    S: CompletionService + ?Sized,
    R: BufRead,
    W: Write,
{
    let settings = resolve_settings(cli, console)?;
    execute(&settings, service, console.output())
}

/// Builds the completion service with `connect`, then behaves like
/// [`run_cli`].
///
/// `connect` runs before any prompt is shown, so a missing API key fails the
/// command without starting an interactive session.
///
/// # Errors
/// Returns whatever `connect` fails with, otherwise as [`run_cli`].
#[instrument(name = "cli.connect", err, skip_all)]
pub fn connect_and_run<S, C, R, W>(
    cli: Cli,
    connect: C,
    console: &mut Console<R, W>,
) -> Result<RunSummary, CliError>
where
    S: CompletionService,
    C: FnOnce() -> Result<S, CliError>,
    R: BufRead,
    W: Write,
{
    let service = connect()?;
    run_cli(cli, &service, console)
}

/// Writes `Processing chunk i/n... p% complete` after each commit.
#[derive(Debug)]
pub struct ConsoleProgress<'a, W> {
    out: &'a mut W,
}

impl<'a, W: Write> ConsoleProgress<'a, W> {
    /// Reports progress to `out`.
    pub const fn new(out: &'a mut W) -> Self {
        Self { out }
    }
}

impl<W: Write> ProgressSink for ConsoleProgress<'_, W> {
    fn chunk_committed(&mut self, completed: usize, total: usize) {
        let percent = (completed * 100).checked_div(total).unwrap_or(100);
        let written = writeln!(
            self.out,
            "Processing chunk {completed}/{total}... {percent}% complete"
        )
        .and_then(|()| self.out.flush());
        if let Err(err) = written {
            warn!(error = %err, "failed to report progress");
        }
    }
}

/// Renders the closing line of a successful run.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
///
/// # Examples
/// ```
/// use std::path::PathBuf;
/// use aura_cli::cli::render_summary;
/// use aura_core::RunSummary;
///
/// let summary = RunSummary {
///     chunks: 1,
///     lines: 2,
///     entries: 2,
///     output: PathBuf::from("out.txt"),
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, &mut buffer)?;
/// assert_eq!(String::from_utf8(buffer)?, "Descriptions saved to out.txt\n");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn render_summary(summary: &RunSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "Descriptions saved to {}", summary.output.display())
}
