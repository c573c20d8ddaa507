use std::env;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use search_sync::samples::{self, GEONAMES_INDEX, HOTELS_INDEX, JOBS_INDEX, SECURED_FILES_INDEX};
use search_sync::{AppError, Dependencies, Settings};
use search_sync_pipeline::{SearchOptions, SourceOutcome, SyncReport, SyncWorkflow};

#[derive(Parser)]
#[command(name = "search-sync")]
#[command(about = "Provision, sync and query a hosted search service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Index to work on (overrides SEARCH_INDEX_NAME and the command default)
    #[arg(long, global = true)]
    index: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the geonames index from the USGS SQL table
    Sync,
    /// Rebuild the hotels index from a SQL and a document-store source
    MultiSource,
    /// Upload the secured files and search them as the given groups
    SecuredFiles {
        /// Group the caller belongs to; repeat for several
        #[arg(long = "group", default_value = "group1")]
        groups: Vec<String>,
    },
    /// Suggest entries for a partial term
    Suggest {
        term: String,
        /// Allow fuzzy matches
        #[arg(long)]
        fuzzy: bool,
        /// Wrap matched text in <b></b>
        #[arg(long)]
        highlight: bool,
    },
    /// Complete a partial term
    Autocomplete { term: String },
    /// List the distinct values of a field with their counts
    Facets {
        #[arg(default_value = "agency")]
        field: String,
    },
    /// Full-text search where every term must match
    Search {
        text: String,
        #[arg(long)]
        top: Option<u32>,
        #[arg(long)]
        filter: Option<String>,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenv::dotenv();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("Command failed: {}", e);
        eprintln!("\nError: {}", e);

        for cause in e.chain().skip(1) {
            eprintln!("  Caused by: {}", cause);
        }

        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env()?;
    let index_for = |default: &str| {
        cli.index
            .clone()
            .unwrap_or_else(|| settings.index_or(default).to_string())
    };

    match &cli.command {
        Commands::Sync => {
            let index = index_for(GEONAMES_INDEX);
            let plan = samples::geonames_plan(
                &index,
                &settings.suggester_name,
                settings.require_sql_connection()?,
            );
            let deps = Dependencies::new(settings.clone()).await?;
            let workflow = deps.workflow();
            let report = run_workflow(&workflow, &plan).await?;
            print_report(&report);
        }
        Commands::MultiSource => {
            let index = index_for(HOTELS_INDEX);
            let plan = samples::hotels_plan(
                &index,
                &settings.suggester_name,
                settings.require_sql_connection()?,
                settings.require_cosmos_connection()?,
                settings.require_cosmos_database()?,
            );
            let deps = Dependencies::new(settings.clone()).await?;
            let workflow = deps.workflow();
            let report = run_workflow(&workflow, &plan).await?;
            print_report(&report);
        }
        Commands::SecuredFiles { groups } => {
            let index = index_for(SECURED_FILES_INDEX);
            let deps = Dependencies::new(settings.clone()).await?;

            deps.provisioning()
                .ensure_index(&samples::secured_files_schema(&index))
                .await?;
            let summary = deps
                .documents()
                .upload(&index, samples::SECURED_FILES_KEY, samples::secured_files_documents())
                .await?;
            info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                "Uploaded secured files"
            );

            let results = deps
                .query(&index)
                .search_for_groups("*", groups.as_slice(), &SearchOptions::default())
                .await?;
            println!("Files visible to {}:", groups.join(", "));
            for document in &results.value {
                println!("  {}", serde_json::to_string(document)?);
            }
        }
        Commands::Suggest {
            term,
            fuzzy,
            highlight,
        } => {
            let deps = Dependencies::new(settings.clone()).await?;
            for text in deps
                .query(&index_for(JOBS_INDEX))
                .suggest(term, *fuzzy, *highlight)
                .await?
            {
                println!("{}", text);
            }
        }
        Commands::Autocomplete { term } => {
            let deps = Dependencies::new(settings.clone()).await?;
            for text in deps.query(&index_for(JOBS_INDEX)).autocomplete(term).await? {
                println!("{}", text);
            }
        }
        Commands::Facets { field } => {
            let deps = Dependencies::new(settings.clone()).await?;
            for facet in deps.query(&index_for(JOBS_INDEX)).facet_counts(field).await? {
                match facet.value.as_str() {
                    Some(value) => println!("{}\t{}", value, facet.count),
                    None => println!("{}\t{}", facet.value, facet.count),
                }
            }
        }
        Commands::Search { text, top, filter } => {
            let deps = Dependencies::new(settings.clone()).await?;
            let options = SearchOptions {
                top: *top,
                filter: filter.clone(),
            };
            let results = deps
                .query(&index_for(GEONAMES_INDEX))
                .search(text, &options)
                .await?;
            if let Some(count) = results.count {
                println!("{} matches", count);
            }
            for document in &results.value {
                println!("{}", serde_json::to_string(document)?);
            }
        }
    }

    Ok(())
}

/// Run a workflow, cancelling the indexer run in flight on Ctrl-C.
async fn run_workflow(
    workflow: &SyncWorkflow,
    plan: &search_sync_pipeline::SyncPlan,
) -> Result<SyncReport, AppError> {
    let shutdown = workflow.runner().shutdown_handle();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            let _ = shutdown.send(());
        }
    });

    let result = workflow.run(plan).await;
    signal.abort();
    Ok(result?)
}

fn print_report(report: &SyncReport) {
    for source in &report.sources {
        match &source.outcome {
            SourceOutcome::Synced { item_count } => {
                println!("{}: synchronized {} rows", source.indexer, item_count)
            }
            SourceOutcome::Failed { message } => {
                println!("{}: synchronization failed: {}", source.indexer, message)
            }
            SourceOutcome::Skipped { reason } => {
                warn!(indexer = %source.indexer, "Source skipped");
                println!("{}: skipped: {}", source.indexer, reason)
            }
        }
    }
}
