//! Docent - Entry Point
//!
//! Starts the async runtime, connects a browser session, and runs an
//! interactive loop: free natural language commands drive the browser
//! directly, while `demo` hands the session to the scripted sequencer
//! and keeps a channel open for audience questions.

use docent::browser::session::{Browser, BrowserConfig, WebDriverSession};
use docent::command::{apologize, resolve, CommandExecutor, RuleBook};
use docent::core::error::{DocentError, Result};
use docent::demo::library::ConfigLibrary;
use docent::demo::script::sample_product;
use docent::demo::sequencer::{DemoReport, DemoSequencer};
use docent::llm::client::LlmClient;
use docent::llm::context::ProductContext;
use docent::llm::parser::normalize;
use docent::llm::qa::QaAnswerer;
use docent::speech::narrator::Narrator;

use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "docent", about = "Voice-narrated website demo pilot")]
struct Args {
    /// Product configuration JSON file to demo
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pick a product from the built-in library by id
    #[arg(long)]
    product: Option<String>,

    /// WebDriver endpoint (defaults to WEBDRIVER_URL, then chromedriver's port)
    #[arg(long)]
    webdriver_url: Option<String>,

    /// Run the browser without a visible window
    #[arg(long)]
    headless: bool,

    /// Print narration instead of speaking it
    #[arg(long)]
    mute: bool,
}

/// Who currently owns the browser session
enum DemoState {
    /// Free-command mode; the loop drives the browser directly
    Idle {
        browser: WebDriverSession,
        narrator: Narrator,
    },
    /// A demo run owns the session; we hold the question channel
    Running {
        questions: mpsc::Sender<String>,
        cancel: CancellationToken,
        handle: JoinHandle<(WebDriverSession, Narrator, DemoReport)>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("docent=debug")
        .init();

    let args = Args::parse();

    tracing::info!("Docent starting...");

    let rt = Runtime::new()?;

    // Pick the product to demo
    let mut library = ConfigLibrary::new();
    let product_id = if let Some(path) = &args.config {
        library.load_from_file(path)?
    } else if let Some(id) = &args.product {
        id.clone()
    } else {
        sample_product().slug()
    };
    let Some(product) = library.get(&product_id).cloned() else {
        println!("Unknown product '{}'. Available:", product_id);
        for (id, name) in library.list() {
            println!("  {} - {}", id, name);
        }
        return Err(DocentError::ConfigError(format!(
            "no product '{}' in the library",
            product_id
        )));
    };
    let product = Arc::new(product);

    let rules = RuleBook::for_product(&product)?;
    let mut context = ProductContext::from_config(&product);

    // Optional pieces degrade to fallbacks rather than stopping startup
    let llm_client = LlmClient::from_env().ok();
    if llm_client.is_none() {
        tracing::warn!("LLM_API_KEY not set - falling back to keyword parsing");
    }
    let narrator = Narrator::from_env(args.mute);

    let endpoint = args
        .webdriver_url
        .clone()
        .or_else(|| std::env::var("WEBDRIVER_URL").ok())
        .unwrap_or_else(|| "http://localhost:9515".to_string());
    let browser_config = BrowserConfig::new(endpoint).with_headless(args.headless);

    // No browser, no pilot
    let browser = rt.block_on(WebDriverSession::connect(&browser_config))?;

    let answerer = QaAnswerer::new(llm_client.clone(), Arc::clone(&product));

    println!("\n=== DOCENT ===");
    println!("Voice-narrated demo pilot for {}", product.product_name);
    println!();
    println!("Commands:");
    println!("  demo            - Run the scripted demo");
    println!("  demos           - List available products");
    println!("  ask <question>  - Ask about the product (works mid-demo)");
    println!("  status          - Show the current page");
    println!("  stop            - Stop a running demo");
    println!("  quit / q        - Exit");
    println!("  <any text>      - Natural language browser command");
    println!();

    let mut state = DemoState::Idle { browser, narrator };

    loop {
        // Reap a finished run so its report prints before the prompt
        state = match state {
            DemoState::Running { handle, .. } if handle.is_finished() => {
                finish_demo(&rt, handle, &browser_config, args.mute)?
            }
            other => other,
        };

        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input == "quit" || input == "q" {
            match state {
                DemoState::Idle { browser, .. } => {
                    rt.block_on(browser.close()).ok();
                }
                DemoState::Running { cancel, handle, .. } => {
                    cancel.cancel();
                    if let Ok((browser, _, report)) = rt.block_on(handle) {
                        println!("{}", report.summary());
                        rt.block_on(browser.close()).ok();
                    }
                }
            }
            break;
        }

        if input == "demo" {
            state = match state {
                DemoState::Idle { browser, narrator } => {
                    let answerer = QaAnswerer::new(llm_client.clone(), Arc::clone(&product));
                    let (sequencer, questions, cancel) =
                        DemoSequencer::new(browser, narrator, answerer, Arc::clone(&product));
                    let handle = rt.spawn(sequencer.run());
                    println!(
                        "Demo started. Type 'ask <question>' to interject, 'stop' to end it."
                    );
                    DemoState::Running {
                        questions,
                        cancel,
                        handle,
                    }
                }
                running => {
                    println!("A demo is already running.");
                    running
                }
            };
            continue;
        }

        if input == "demos" {
            println!("Available products:");
            for (id, name) in library.list() {
                let marker = if id == product_id { "*" } else { " " };
                println!(" {} {} - {}", marker, id, name);
            }
            continue;
        }

        if let Some(question) = input.strip_prefix("ask ") {
            let question = question.trim();
            if question.is_empty() {
                println!("Usage: ask <question>");
                continue;
            }
            match &state {
                DemoState::Running { questions, .. } => {
                    match questions.try_send(question.to_string()) {
                        Ok(()) => println!("Question queued; I'll answer at the next pause."),
                        Err(TrySendError::Full(_)) => println!(
                            "I'll answer that after the current question - please ask again in a moment."
                        ),
                        Err(TrySendError::Closed(_)) => {
                            println!("The demo is wrapping up; one moment.")
                        }
                    }
                }
                DemoState::Idle { narrator, .. } => {
                    let answer = rt.block_on(answerer.answer(question));
                    rt.block_on(narrator.narrate(&answer));
                }
            }
            continue;
        }

        if input == "status" {
            match &state {
                DemoState::Running { .. } => {
                    println!(
                        "Demo of {} is running. 'ask <question>' to interject, 'stop' to end it.",
                        product.product_name
                    );
                }
                DemoState::Idle { browser, .. } => match rt.block_on(browser.page_info()) {
                    Ok(info) => {
                        println!("On '{}' ({}) [{}]", info.title, info.url, info.ready_state)
                    }
                    Err(e) => println!("Could not read the page: {}", e),
                },
            }
            continue;
        }

        if input == "stop" {
            state = match state {
                DemoState::Running { cancel, handle, .. } => {
                    cancel.cancel();
                    finish_demo(&rt, handle, &browser_config, args.mute)?
                }
                idle => {
                    println!("No demo is running.");
                    idle
                }
            };
            continue;
        }

        // Everything else is a natural language command
        match &state {
            DemoState::Running { .. } => {
                println!(
                    "A demo is running. Use 'ask <question>' to interject or 'stop' to take over."
                );
            }
            DemoState::Idle { browser, narrator } => {
                let record = rt.block_on(normalize(llm_client.as_ref(), input, &rules, &context));

                println!();
                println!("Parsed intent:");
                println!("  Kind: {}", record.kind);
                if let Some(url) = &record.target_url {
                    println!("  URL: {}", url);
                }
                if let Some(text) = &record.element_text {
                    println!("  Element: {}", text);
                }
                if let Some(field) = &record.field_name {
                    println!("  Field: {}", field);
                }
                println!("  Confidence: {:.0}%", record.confidence * 100.0);

                let action = resolve(&record);
                let result =
                    match rt.block_on(CommandExecutor::execute(browser, action, &answerer)) {
                        Ok(result) => result,
                        Err(e) => apologize(record.kind.clone(), &e),
                    };

                context.add_action(format!("{}: {}", result.action, result.message));
                rt.block_on(narrator.narrate(&result.message));
            }
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

/// Join a demo task, print its report, and return to idle
///
/// If the task panicked the browser session died with it, so a fresh
/// session gets connected in its place.
fn finish_demo(
    rt: &Runtime,
    handle: JoinHandle<(WebDriverSession, Narrator, DemoReport)>,
    browser_config: &BrowserConfig,
    mute: bool,
) -> Result<DemoState> {
    match rt.block_on(handle) {
        Ok((browser, narrator, report)) => {
            println!("{}", report.summary());
            Ok(DemoState::Idle { browser, narrator })
        }
        Err(e) => {
            tracing::error!("demo task failed: {}", e);
            let browser = rt.block_on(WebDriverSession::connect(browser_config))?;
            Ok(DemoState::Idle {
                browser,
                narrator: Narrator::from_env(mute),
            })
        }
    }
}
