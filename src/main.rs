use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use quillon_agents::{
    agent_flow, chat_flow, keys, orchestrator_flow, simple_flow, AgentOptions, AutoApprover,
    ConsoleApprover, SessionStore,
};
use quillon_core::config::AppConfig;
use quillon_core::traits::{Approver, TextGenerator};
use quillon_core::{AgentKind, ChatTurn, CompletionRequest, OutputMode, QuillonError};
use quillon_flow::{viz, FlowRunner, SharedContext};
use quillon_llm::{create_client, BlockingGenerator, RetryingClient};

#[derive(Parser)]
#[command(name = "quillon", version, about = "LLM-backed assistant for Python codebases")]
struct Cli {
    /// Path to config file (defaults to ~/.quillon/config.toml)
    #[arg(short, long, global = true, env = "QUILLON_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one agent over a source file
    Run {
        /// Python file the agent operates on
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Agent to run (doc, summary, type, migration, test, bug, refactor, orchestrator)
        #[arg(short, long, default_value = "doc", value_parser = parse_agent)]
        agent: AgentKind,

        /// Where generated content goes (console, in-place, new-file)
        #[arg(short, long, value_parser = parse_output)]
        output: Option<OutputMode>,

        /// Override the configured provider (openai, anthropic, google, ollama)
        #[arg(long)]
        provider: Option<String>,

        /// Override the configured model
        #[arg(long)]
        model: Option<String>,

        /// Language or version the migration agent targets
        #[arg(long, default_value = "Python 3")]
        migration_target: String,

        /// Instruction for the orchestrator agent
        #[arg(short, long)]
        instruction: Option<String>,

        /// Skip confirmation prompts
        #[arg(long)]
        no_confirm: bool,
    },
    /// Start an interactive chat session
    Chat {
        /// Named session to resume or create
        #[arg(short, long)]
        session: Option<String>,
    },
    /// Print a Mermaid diagram of a flow
    Flow {
        /// Agent whose flow to draw
        #[arg(short, long, value_parser = parse_agent)]
        agent: Option<AgentKind>,

        /// Draw the chat flow instead
        #[arg(long, conflicts_with = "agent")]
        chat: bool,
    },
    /// Manage stored chat sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// List stored sessions
    List,
    /// Delete a session by name
    Delete {
        /// Session name
        name: String,
    },
}

fn parse_agent(s: &str) -> Result<AgentKind, String> {
    AgentKind::parse(s).ok_or_else(|| {
        let known = AgentKind::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        format!("unknown agent '{}' (expected one of: {})", s, known)
    })
}

fn parse_output(s: &str) -> Result<OutputMode, String> {
    match s {
        "console" => Ok(OutputMode::Console),
        "in-place" => Ok(OutputMode::InPlace),
        "new-file" => Ok(OutputMode::NewFile),
        other => Err(format!(
            "unknown output mode '{}' (expected console, in-place or new-file)",
            other
        )),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "info,quillon=debug,quillon_flow=debug,quillon_llm=debug,quillon_agents=debug"
    } else {
        "warn,quillon=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    // Handle completions before config loading
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "quillon", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            file,
            agent,
            output,
            provider,
            model,
            migration_target,
            instruction,
            no_confirm,
        } => {
            if let Some(name) = provider {
                config.provider.name = name;
            }
            if let Some(id) = model {
                config.provider.model = Some(id);
            }
            let options = AgentOptions {
                file,
                output: output.unwrap_or(config.output.mode),
                no_confirm,
                migration_target,
                instruction,
            };
            run_agent(&config, agent, options)
        }
        Commands::Chat { session } => run_chat(&config, session),
        Commands::Flow { agent, chat } => print_flow(agent, chat),
        Commands::Sessions { action } => handle_sessions(&config, action),
        Commands::Completions { .. } => Ok(()),
    }
}

fn run_agent(config: &AppConfig, agent: AgentKind, mut options: AgentOptions) -> anyhow::Result<()> {
    if agent.requires_file() && options.file.is_none() {
        anyhow::bail!(
            "--file is required for agent '{}'; use `quillon chat` for general conversation",
            agent
        );
    }

    let approver: Arc<dyn Approver> = if options.no_confirm {
        Arc::new(AutoApprover)
    } else {
        Arc::new(ConsoleApprover)
    };

    if agent == AgentKind::Orchestrator && options.instruction.is_none() {
        let instruction = approver.ask("Enter your instruction for the orchestrator agent")?;
        options.instruction = Some(instruction);
    }

    let generator = build_generator(config)?;
    info!("running '{}' agent", agent);

    let no_confirm = options.no_confirm;
    let console = options.output == OutputMode::Console;
    let flow = match agent {
        AgentKind::Orchestrator => orchestrator_flow(generator, approver, options)?,
        kind if no_confirm && console => simple_flow(kind, generator, approver, options)?,
        kind => agent_flow(kind, generator, approver, options)?,
    };

    let mut runner = FlowRunner::new(flow);
    if let Some(limit) = config.flow.step_limit() {
        runner = runner.with_step_limit(limit);
    }

    let mut context = SharedContext::new();
    let report = runner.run(&mut context)?;
    info!(
        "flow finished after {} steps (final label '{}')",
        report.steps, report.final_label
    );

    if let Some(answer) = context.get_str(keys::ANSWER) {
        println!("\n{}", answer);
    }
    Ok(())
}

fn run_chat(config: &AppConfig, session: Option<String>) -> anyhow::Result<()> {
    let generator = build_generator(config)?;
    let approver: Arc<dyn Approver> = Arc::new(ConsoleApprover);

    let store = match session {
        Some(_) => Some(SessionStore::open(&config.session_db_path())?),
        None => None,
    };
    let mut context = match (&store, &session) {
        (Some(store), Some(name)) => match store.load(name)? {
            Some(saved) => {
                println!("Resumed session '{}'.", name);
                saved
            }
            None => {
                println!("Started session '{}'.", name);
                SharedContext::new()
            }
        },
        _ => SharedContext::new(),
    };

    let flow = chat_flow(generator, approver, AgentOptions::default())?;
    let mut runner = FlowRunner::new(flow);
    if let Some(limit) = config.flow.step_limit() {
        runner = runner.with_step_limit(limit);
    }

    println!("\nQuillon chat. Type your instructions or questions. Type 'exit' to quit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("You: ");
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!("\nGoodbye!");
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }

        push_turn(&mut context, ChatTurn::user(input));
        context.set_str(keys::USER_INPUT, input);
        context.remove(keys::ANSWER);
        context.remove(keys::RESULT);
        context.remove(keys::INTENT);

        match runner.run(&mut context) {
            Ok(_) => {
                let answer = context
                    .get_str(keys::ANSWER)
                    .or_else(|| context.get_str(keys::RESULT))
                    .unwrap_or("(no response)")
                    .to_string();
                println!("Quillon: {}\n", answer);
                push_turn(&mut context, ChatTurn::assistant(&answer));
            }
            Err(e) => eprintln!("[error] {}", e),
        }

        if let (Some(store), Some(name)) = (&store, &session) {
            store.save(name, &context)?;
        }
    }

    Ok(())
}

fn push_turn(context: &mut SharedContext, turn: ChatTurn) {
    let mut history = match context.remove(keys::HISTORY) {
        Some(value) => serde_json::from_value::<Vec<ChatTurn>>(value).unwrap_or_default(),
        None => Vec::new(),
    };
    history.push(turn);
    if let Ok(value) = serde_json::to_value(&history) {
        context.set(keys::HISTORY, value);
    }
}

fn print_flow(agent: Option<AgentKind>, chat: bool) -> anyhow::Result<()> {
    let generator: Arc<dyn TextGenerator> = Arc::new(InertGenerator);
    let approver: Arc<dyn Approver> = Arc::new(AutoApprover);
    let options = AgentOptions::default();

    let flow = if chat {
        chat_flow(generator, approver, options)?
    } else {
        match agent {
            Some(AgentKind::Orchestrator) => orchestrator_flow(generator, approver, options)?,
            Some(kind) => agent_flow(kind, generator, approver, options)?,
            None => anyhow::bail!("pass --agent <kind> or --chat to pick a flow"),
        }
    };
    println!("{}", viz::mermaid(&flow));
    Ok(())
}

fn handle_sessions(config: &AppConfig, action: SessionAction) -> anyhow::Result<()> {
    let store = SessionStore::open(&config.session_db_path())?;
    match action {
        SessionAction::List => {
            let records = store.list()?;
            if records.is_empty() {
                println!("No stored sessions.");
            } else {
                for record in records {
                    println!("{}  (updated {})", record.name, record.updated_at);
                }
            }
        }
        SessionAction::Delete { name } => {
            if store.delete(&name)? {
                println!("Deleted session '{}'.", name);
            } else {
                println!("No session named '{}'.", name);
            }
        }
    }
    Ok(())
}

fn build_generator(config: &AppConfig) -> anyhow::Result<Arc<dyn TextGenerator>> {
    let client = create_client(&config.provider)?;
    let retrying = RetryingClient::new(client, config.retry.clone());
    let generator = BlockingGenerator::new(Box::new(retrying))?;
    Ok(Arc::new(generator))
}

/// Stands in for the model when a command only wires a flow without running it.
struct InertGenerator;

impl TextGenerator for InertGenerator {
    fn generate(&self, _request: &CompletionRequest) -> quillon_core::Result<String> {
        Err(QuillonError::Configuration(
            "this generator only wires flows for display".to_string(),
        ))
    }
}
