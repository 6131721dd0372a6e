use std::io::{self, Write};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use job_portal::{
    api::{JobApiClient, JobBackend},
    app::{App, SubmitOutcome},
    config::Config,
    console::Console,
    filters::{FilterField, FilterState},
    form::{FormField, JobForm},
    views,
};

#[derive(Parser)]
#[command(author, version, about = "Browse and manage job postings from the terminal", long_about = None)]
struct Cli {
    /// Log level (debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(short, long)]
    log_level: Option<String>,

    /// Base URL of the job API, overrides JOB_PORTAL_API_URL
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive mode (the default)
    Interactive,

    /// List jobs, optionally filtered and sorted
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show a single job
    Show { id: i64 },

    /// Add a new job
    Add {
        #[command(flatten)]
        fields: JobArgs,
    },

    /// Edit a job; only the given fields change
    Edit {
        id: i64,

        #[command(flatten)]
        fields: JobArgs,
    },

    /// Delete a job
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show job statistics
    Stats,

    /// Check that the API is reachable
    Health,
}

#[derive(Args)]
struct FilterArgs {
    /// Search title, company and description
    #[arg(short, long)]
    search: Option<String>,

    /// Full-time, Part-time, Contract, Internship or Temporary
    #[arg(short = 't', long)]
    job_type: Option<String>,

    #[arg(short, long)]
    location: Option<String>,

    #[arg(long)]
    tag: Option<String>,

    /// posting_date_desc, posting_date_asc, title_asc, title_desc, company_asc, company_desc
    #[arg(long, default_value = "posting_date_desc")]
    sort: String,
}

#[derive(Args)]
struct JobArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    location: Option<String>,

    #[arg(long)]
    job_type: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    url: Option<String>,
}

impl FilterArgs {
    fn to_state(&self) -> job_portal::Result<FilterState> {
        let mut filters = FilterState::new();
        let given = [
            (FilterField::Search, &self.search),
            (FilterField::JobType, &self.job_type),
            (FilterField::Location, &self.location),
            (FilterField::Tag, &self.tag),
        ];
        for (field, value) in given {
            if let Some(value) = value {
                filters.set(field, value)?;
            }
        }
        filters.set(FilterField::Sort, &self.sort)?;
        Ok(filters)
    }
}

impl JobArgs {
    fn apply(&self, form: &mut JobForm) -> job_portal::Result<()> {
        let given = [
            (FormField::Title, &self.title),
            (FormField::Company, &self.company),
            (FormField::Location, &self.location),
            (FormField::JobType, &self.job_type),
            (FormField::Tags, &self.tags),
            (FormField::Description, &self.description),
            (FormField::Url, &self.url),
        ];
        for (field, value) in given {
            if let Some(value) = value {
                form.set(field, value)?;
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url.as_str())?;
    }

    // Logs go to stderr so they never mix with rendered output
    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();
    info!("Using job API at {}", config.api.base_url);

    let client = JobApiClient::new(&config.api)?;
    let mut app = App::new(client, config.ui.banner_ttl());

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            let stdin = io::stdin();
            let mut console = Console::new(app, stdin.lock(), io::stdout());
            console.run().await?;
        }
        Commands::List { filters } => {
            app.set_filters(filters.to_state()?).await;
            if let Some(message) = app.error_message() {
                bail!("{}", message);
            }
            println!("{}", views::render_job_list(app.jobs(), false)?);
        }
        Commands::Show { id } => {
            let job = app.backend().get_job(id).await?;
            println!("{}", views::render_job_card(&job)?);
        }
        Commands::Add { fields } => {
            app.open_create_form();
            if let Some(form) = app.form_mut() {
                fields.apply(form)?;
            }
            save(&mut app).await?;
        }
        Commands::Edit { id, fields } => {
            app.open_edit_form_by_id(id).await?;
            if let Some(form) = app.form_mut() {
                fields.apply(form)?;
            }
            save(&mut app).await?;
        }
        Commands::Delete { id, yes } => {
            let deleted = app
                .confirm_and_delete(id, yes, |job| Ok(confirm(&views::delete_prompt(job))?))
                .await?;
            if !deleted {
                println!("Not deleted.");
                return Ok(());
            }
            println!("{}", app.success_message().unwrap_or("Job deleted successfully!"));
        }
        Commands::Stats => {
            let stats = app.backend().job_stats().await?;
            println!("{}", views::render_stats(&stats)?);
        }
        Commands::Health => {
            let body = app.backend().health().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

async fn save<B: JobBackend>(app: &mut App<B>) -> Result<()> {
    match app.submit_form().await {
        SubmitOutcome::Saved => {
            println!("{}", app.success_message().unwrap_or("Job saved"));
            Ok(())
        }
        SubmitOutcome::Invalid => {
            if let Some(form) = app.form() {
                for (field, message) in form.errors() {
                    eprintln!("--{}: {}", field.name().replace('_', "-"), message);
                }
            }
            bail!("Job not saved: the form has errors")
        }
        SubmitOutcome::Failed => bail!("{}", app.error_message().unwrap_or("Failed to save job")),
        SubmitOutcome::NoForm => bail!("No form to submit"),
    }
}

fn confirm(question: &str) -> io::Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
