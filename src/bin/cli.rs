use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use genai_automation::engine::{api_tests, conversion, manual_cases};
use genai_automation::prelude::*;
use tracing_subscriber::EnvFilter;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "genai-automation")]
#[command(about = "Drive GenAI test-automation pipelines", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a console YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the generation service (overrides config)
    #[arg(short, long, global = true, env = "GENAI_AUTOMATION_URL")]
    base_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate manual test cases and download them as a spreadsheet
    ManualCases {
        /// URL of the application under test
        #[arg(long)]
        application_url: Option<String>,

        /// User story to derive the test cases from
        #[arg(long)]
        user_story: Option<String>,

        /// Acceptance criteria of the story
        #[arg(long)]
        acceptance_criteria: Option<String>,

        /// Optional epic the story belongs to
        #[arg(long)]
        epic_story: Option<String>,

        #[command(flatten)]
        categories: Categories,
    },

    /// Generate and run API tests from a specification
    Api {
        #[command(subcommand)]
        command: ApiCommands,
    },

    /// Convert a UI test to the target framework
    Convert {
        /// Path to the source test
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Compile the source test instead of converting it
        #[arg(long)]
        compile: bool,

        /// Run the converted test in the sandbox
        #[arg(long)]
        run: bool,

        /// Open the trace viewer after a run
        #[arg(long, requires = "run")]
        open_trace: bool,
    },

    /// List repository branches
    Branches,

    /// Push a source file to a repository branch
    Push {
        /// Path to the source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Target branch (default: first listed branch)
        #[arg(short = 'B', long)]
        branch: Option<String>,

        /// Commit message
        #[arg(short, long)]
        message: String,
    },
}

#[derive(Subcommand)]
enum ApiCommands {
    /// Upload a specification and print its summary
    Parse {
        /// Path to the specification document
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Generate test code from an API summary
    Generate {
        /// Path to the API summary
        #[arg(value_name = "FILE")]
        details: PathBuf,

        #[command(flatten)]
        categories: Categories,
    },

    /// Execute generated test code and print the report
    Run {
        /// Path to the generated test code
        #[arg(value_name = "FILE")]
        code: PathBuf,
    },
}

#[derive(Args)]
struct Categories {
    /// Include positive tests
    #[arg(long)]
    positive: bool,

    /// Include negative tests
    #[arg(long)]
    negative: bool,

    /// Include edge-case tests
    #[arg(long)]
    edge: bool,
}

impl Categories {
    fn updates(&self) -> Vec<FieldUpdate> {
        vec![
            FieldUpdate::flag("positive", self.positive),
            FieldUpdate::flag("negative", self.negative),
            FieldUpdate::flag("edge", self.edge),
        ]
    }
}

#[cfg(feature = "otel")]
fn init_otel_tracing(verbose: bool) {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::runtime::Tokio;
    use opentelemetry_sdk::trace::TracerProvider;

    let filter = if verbose {
        "genai_automation=debug"
    } else {
        "genai_automation=info"
    };

    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&otlp_endpoint)
        .build()
        .expect("Failed to create OTLP exporter");

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, Tokio)
        .build();

    let tracer = provider.tracer("genai-automation");
    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .init();

    opentelemetry::global::set_tracer_provider(provider);
}

#[cfg(not(feature = "otel"))]
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        "genai_automation=debug"
    } else {
        "genai_automation=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    #[cfg(feature = "otel")]
    init_otel_tracing(cli.verbose);

    #[cfg(not(feature = "otel"))]
    init_tracing(cli.verbose);

    let result = run(cli).await;

    #[cfg(feature = "otel")]
    opentelemetry::global::shutdown_tracer_provider();

    match result {
        Ok(success) => {
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Console failed");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url;
    }
    let console = Console::from_config(config)?;

    match cli.command {
        Commands::ManualCases {
            application_url,
            user_story,
            acceptance_criteria,
            epic_story,
            categories,
        } => {
            let workflow = console.manual_cases();
            let texts = [
                (manual_cases::APPLICATION_URL, application_url),
                (manual_cases::USER_STORY, user_story),
                (manual_cases::ACCEPTANCE_CRITERIA, acceptance_criteria),
                (manual_cases::EPIC_STORY, epic_story),
            ];
            for (field, value) in texts {
                workflow.update(FieldUpdate::text(field, value.unwrap_or_default()))?;
            }
            for update in categories.updates() {
                workflow.update(update)?;
            }

            Ok(outcome(workflow.generate_and_download().await, |artifact| {
                println!("Saved {} ({} bytes)", artifact.location, artifact.size);
            }))
        }

        Commands::Api { command } => {
            let workflow = console.api_tests();
            match command {
                ApiCommands::Parse { file } => {
                    let content = read_source(&file).await?;
                    let name = file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    workflow.attach_specification(&name, &content)?;
                    Ok(outcome(workflow.parse_specification().await, |details| {
                        println!("{}", details);
                    }))
                }
                ApiCommands::Generate {
                    details,
                    categories,
                } => {
                    let content = read_source(&details).await?;
                    workflow.update(FieldUpdate::text(api_tests::API_DETAILS, content))?;
                    for update in categories.updates() {
                        workflow.update(update)?;
                    }
                    Ok(outcome(workflow.generate_tests().await, |code| {
                        println!("{}", code);
                    }))
                }
                ApiCommands::Run { code } => {
                    let content = read_source(&code).await?;
                    workflow.update(FieldUpdate::text(api_tests::GENERATED_CODE, content))?;
                    let result = workflow.run_tests().await;
                    Ok(outcome(result, |_| println!("{}", workflow.test_report_text())))
                }
            }
        }

        Commands::Convert {
            file,
            compile,
            run,
            open_trace,
        } => {
            let workflow = console.conversion();
            let content = read_source(&file).await?;

            if compile {
                workflow.update(FieldUpdate::text(conversion::SOURCE_CODE, content))?;
                return Ok(outcome(workflow.compile_source().await, |message| {
                    println!("{}", message);
                }));
            }

            if run {
                workflow.update(FieldUpdate::text(conversion::CONVERTED_CODE, content))?;
                let ran = outcome(workflow.run_converted().await, |sandbox| {
                    println!("{}", sandbox.output);
                    match workflow.trace_url() {
                        Some(url) => println!("Trace: {}", url),
                        None => println!("No trace available"),
                    }
                });
                if ran && open_trace && workflow.trace_url().is_some() {
                    return Ok(outcome(workflow.open_trace().await, |_| {}));
                }
                return Ok(ran);
            }

            workflow.update(FieldUpdate::text(conversion::SOURCE_CODE, content))?;
            Ok(outcome(workflow.convert().await, |converted| {
                println!("{}", converted);
            }))
        }

        Commands::Branches => {
            let publisher = console.api_tests().publisher();
            publisher.open().await;
            let branches = publisher.selection().branches;
            publisher.close();

            if branches.is_empty() {
                eprintln!("No branches available");
                return Ok(false);
            }
            for branch in branches {
                println!("{}", branch);
            }
            Ok(true)
        }

        Commands::Push {
            file,
            branch,
            message,
        } => {
            let source = read_source(&file).await?;
            let publisher = console.api_tests().publisher();
            publisher.open().await;

            if let Some(branch) = branch {
                if !publisher.select_branch(&branch) {
                    publisher.close();
                    eprintln!("Unknown branch: {}", branch);
                    return Ok(false);
                }
            }
            publisher.set_commit_message(&message);

            Ok(outcome(publisher.push(&source).await, |confirmation| {
                println!("{}", confirmation);
            }))
        }
    }
}

async fn read_source(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Print a workflow outcome. Returns whether it succeeded.
fn outcome<T>(result: Result<T, PipelineError>, print: impl FnOnce(T)) -> bool {
    match result {
        Ok(value) => {
            print(value);
            true
        }
        Err(e) => {
            eprintln!("{}", e.diagnostic());
            false
        }
    }
}
