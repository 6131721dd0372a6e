//! Line-oriented interactive front end over [`App`].

use std::io::{BufRead, Write};
use std::str::FromStr;
use std::time::Instant;

use crate::api::JobBackend;
use crate::app::{App, SubmitOutcome};
use crate::filters::FilterField;
use crate::form::FormField;
use crate::{metrics, views, Error, Result};

pub const HELP: &str = "Commands:
  list                      refresh the job list
  show <id>                 show one job
  search|type|location|tag <value>
                            filter the list (no value clears the filter)
  sort <key>                posting_date_desc, posting_date_asc, title_asc,
                            title_desc, company_asc, company_desc
  reset                     reset filters and sort
  add                       add a new job
  edit <id>                 edit a job
  delete <id>               delete a job
  stats                     job statistics
  health                    check the API
  dismiss                   clear messages
  metrics                   request counters
  help                      this text
  quit                      leave

In forms: Enter keeps the shown value, `-` clears it, `cancel` abandons the form.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Show(i64),
    Filter(FilterField, String),
    Reset,
    Add,
    Edit(i64),
    Delete(i64),
    Stats,
    Health,
    Dismiss,
    Metrics,
    Help,
    Quit,
    Nothing,
}

fn parse_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Validation(format!("Expected a job id, got '{}'", raw.trim())))
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        Ok(match word.to_ascii_lowercase().as_str() {
            "" => Command::Nothing,
            "list" | "refresh" => Command::List,
            "show" => Command::Show(parse_id(rest)?),
            "search" | "type" | "job_type" | "location" | "tag" | "sort" => {
                Command::Filter(word.parse()?, rest.to_string())
            }
            "reset" => Command::Reset,
            "add" | "new" => Command::Add,
            "edit" => Command::Edit(parse_id(rest)?),
            "delete" | "rm" => Command::Delete(parse_id(rest)?),
            "stats" => Command::Stats,
            "health" => Command::Health,
            "dismiss" | "clear" => Command::Dismiss,
            "metrics" => Command::Metrics,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => {
                return Err(Error::Validation(format!(
                    "Unknown command '{}', type `help` for a list",
                    other
                )))
            }
        })
    }
}

enum FieldInput {
    Keep,
    Value(String),
    Cancel,
}

pub struct Console<B, R, W> {
    app: App<B>,
    input: R,
    output: W,
}

impl<B, R, W> Console<B, R, W>
where
    B: JobBackend,
    R: BufRead,
    W: Write,
{
    pub fn new(app: App<B>, input: R, output: W) -> Self {
        Self { app, input, output }
    }

    pub fn into_parts(self) -> (App<B>, W) {
        (self.app, self.output)
    }

    pub async fn run(&mut self) -> Result<()> {
        self.app.start().await;
        self.show_screen()?;

        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };
            self.app.expire_messages(Instant::now());

            match line.parse::<Command>() {
                Ok(Command::Quit) => break,
                Ok(command) => self.execute(command).await?,
                Err(e) => writeln!(self.output, "{}", e.user_message())?,
            }
        }

        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Nothing | Command::Quit => {}
            Command::List => {
                self.app.fetch_jobs().await;
                self.show_screen()?;
            }
            Command::Show(id) => match self.app.backend().get_job(id).await {
                Ok(job) => writeln!(self.output, "{}", views::render_job_card(&job)?)?,
                Err(e) => writeln!(self.output, "{}", views::render_error_banner(&e.user_message()))?,
            },
            Command::Filter(field, value) => {
                match self.app.update_filter(field, &value).await {
                    Ok(()) => self.show_screen()?,
                    Err(e) => writeln!(self.output, "{}", e.user_message())?,
                }
            }
            Command::Reset => {
                self.app.reset_filters().await;
                self.show_screen()?;
            }
            Command::Add => {
                self.app.open_create_form();
                self.fill_form().await?;
            }
            Command::Edit(id) => match self.app.open_edit_form_by_id(id).await {
                Ok(()) => self.fill_form().await?,
                Err(e) => writeln!(self.output, "{}", views::render_error_banner(&e.user_message()))?,
            },
            Command::Delete(id) => self.delete(id).await?,
            Command::Stats => {
                self.app.fetch_stats().await;
                match self.app.stats() {
                    Some(stats) => writeln!(self.output, "{}", views::render_stats(stats)?)?,
                    None => writeln!(self.output, "No statistics available")?,
                }
            }
            Command::Health => match self.app.backend().health().await {
                Ok(body) => writeln!(self.output, "{}", serde_json::to_string_pretty(&body)?)?,
                Err(e) => writeln!(self.output, "{}", views::render_error_banner(&e.user_message()))?,
            },
            Command::Dismiss => {
                self.app.dismiss_messages();
                self.show_screen()?;
            }
            Command::Metrics => write!(self.output, "{}", metrics::gather_metrics()?)?,
            Command::Help => writeln!(self.output, "{}", HELP)?,
        }
        Ok(())
    }

    async fn delete(&mut self, id: i64) -> Result<()> {
        let job = match self.app.job(id) {
            Some(job) => job.clone(),
            None => match self.app.backend().get_job(id).await {
                Ok(job) => job,
                Err(e) => {
                    writeln!(self.output, "{}", views::render_error_banner(&e.user_message()))?;
                    return Ok(());
                }
            },
        };

        if !self.confirm(&views::delete_prompt(&job))? {
            writeln!(self.output, "Not deleted.")?;
            return Ok(());
        }

        self.app.delete_job(id).await;
        self.show_screen()
    }

    async fn fill_form(&mut self) -> Result<()> {
        let Some(heading) = self.app.form().map(|form| form.heading()) else {
            return Ok(());
        };
        writeln!(self.output, "{}", heading)?;

        let mut pending: Vec<FormField> = FormField::ALL.to_vec();
        loop {
            for field in pending {
                if !self.prompt_field(field)? {
                    self.app.cancel_form();
                    writeln!(self.output, "Cancelled.")?;
                    return Ok(());
                }
            }

            match self.app.submit_form().await {
                SubmitOutcome::NoForm => return Ok(()),
                SubmitOutcome::Saved => return self.show_screen(),
                SubmitOutcome::Invalid => {
                    let errors = self
                        .app
                        .form()
                        .map(|form| form.errors().clone())
                        .unwrap_or_default();
                    for message in errors.values() {
                        writeln!(self.output, "  ! {}", message)?;
                    }
                    pending = errors.keys().copied().collect();
                }
                SubmitOutcome::Failed => {
                    let message = self.app.error_message().unwrap_or("Failed to save job").to_string();
                    writeln!(self.output, "{}", views::render_error_banner(&message))?;
                    if self.confirm("Edit and try again?")? {
                        pending = FormField::ALL.to_vec();
                    } else {
                        self.app.cancel_form();
                        return self.show_screen();
                    }
                }
            }
        }
    }

    /// Prompts until the field takes a value. Returns false when the user
    /// cancels or input ends.
    fn prompt_field(&mut self, field: FormField) -> Result<bool> {
        loop {
            let current = self
                .app
                .form()
                .map(|form| form.value(field))
                .unwrap_or_default();
            let hint = if current.is_empty() {
                field.placeholder().to_string()
            } else {
                current
            };
            write!(
                self.output,
                "{}{} [{}]: ",
                field.label(),
                if field.is_required() { " *" } else { "" },
                hint
            )?;
            self.output.flush()?;

            let input = match self.read_line()? {
                None => FieldInput::Cancel,
                Some(line) => match line.trim() {
                    "" => FieldInput::Keep,
                    "-" => FieldInput::Value(String::new()),
                    "cancel" => FieldInput::Cancel,
                    value => FieldInput::Value(value.to_string()),
                },
            };

            let value = match input {
                FieldInput::Cancel => return Ok(false),
                FieldInput::Keep => return Ok(true),
                FieldInput::Value(value) => value,
            };

            let result = match self.app.form_mut() {
                Some(form) => form.set(field, &value),
                None => return Ok(false),
            };
            match result {
                Ok(()) => return Ok(true),
                Err(e) => writeln!(self.output, "  ! {}", e.user_message())?,
            }
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{} [y/N] ", question)?;
        self.output.flush()?;
        Ok(self
            .read_line()?
            .map(|answer| matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false))
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string()))
    }

    fn show_screen(&mut self) -> Result<()> {
        let screen = self.app.render()?;
        writeln!(self.output, "{}", screen)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockJobBackend;
    use crate::filters::SortOrder;
    use crate::models::{Job, JobStats};
    use mockall::predicate::eq;
    use std::io::Cursor;
    use std::time::Duration;

    fn job(id: i64) -> Job {
        Job {
            id,
            title: "Life Actuary".into(),
            company: "ABC Insurance".into(),
            location: "Remote".into(),
            job_type: None,
            tags: vec![],
            description: None,
            url: None,
            posting_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn listing_backend(jobs: Vec<Job>) -> MockJobBackend {
        let mut backend = MockJobBackend::new();
        backend
            .expect_list_jobs()
            .returning(move |_| Ok(jobs.clone()));
        backend
            .expect_job_stats()
            .returning(|| Ok(JobStats::default()));
        backend
    }

    async fn run(backend: MockJobBackend, input: &str) -> (App<MockJobBackend>, String) {
        let app = App::new(backend, Duration::from_secs(3));
        let mut console = Console::new(app, Cursor::new(input.as_bytes().to_vec()), Vec::new());
        console.run().await.unwrap();
        let (app, output) = console.into_parts();
        (app, String::from_utf8(output).unwrap())
    }

    #[test]
    fn parses_commands() {
        assert_eq!("list".parse::<Command>().unwrap(), Command::List);
        assert_eq!("  edit 12 ".parse::<Command>().unwrap(), Command::Edit(12));
        assert_eq!(
            "search senior actuary".parse::<Command>().unwrap(),
            Command::Filter(FilterField::Search, "senior actuary".into())
        );
        assert_eq!(
            "type".parse::<Command>().unwrap(),
            Command::Filter(FilterField::JobType, String::new())
        );
        assert_eq!("".parse::<Command>().unwrap(), Command::Nothing);
        assert!("delete abc".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn renders_screen_and_quits() {
        let (_, output) = run(listing_backend(vec![job(1)]), "quit\n").await;
        assert!(output.contains("Job Listing Portal"));
        assert!(output.contains("Showing 1 job"));
        assert!(output.contains("#1 Life Actuary"));
    }

    #[tokio::test]
    async fn end_of_input_ends_the_session() {
        let (_, output) = run(listing_backend(vec![]), "").await;
        assert!(output.contains("No jobs found"));
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let (_, output) = run(listing_backend(vec![]), "launch\nquit\n").await;
        assert!(output.contains("Unknown command 'launch'"));
    }

    #[tokio::test]
    async fn sort_command_updates_filters() {
        let (app, output) = run(listing_backend(vec![]), "sort title_asc\nquit\n").await;
        assert_eq!(app.filters().sort, SortOrder::TitleAsc);
        assert!(output.contains("Sort By:  Job Title: A-Z"));
    }

    #[tokio::test]
    async fn add_flow_sends_form_values() {
        let mut backend = listing_backend(vec![]);
        backend
            .expect_create_job()
            .withf(|payload| {
                payload.title == "Actuary"
                    && payload.company == "ABC"
                    && payload.location == "Remote"
                    && payload.tags == "Pricing"
                    && payload.url.is_empty()
            })
            .times(1)
            .returning(|_| Ok(Some(job(5))));

        let input = "add\nActuary\nABC\nRemote\n\nPricing\n\n\nquit\n";
        let (app, output) = run(backend, input).await;
        assert!(output.contains("Add New Job"));
        assert!(output.contains("[ok] Job added successfully!"));
        assert!(app.form().is_none());
    }

    #[tokio::test]
    async fn invalid_fields_are_prompted_again() {
        let mut backend = listing_backend(vec![]);
        backend
            .expect_create_job()
            .withf(|payload| payload.title == "Actuary" && payload.url == "https://jobs.example.com/1")
            .times(1)
            .returning(|_| Ok(Some(job(6))));

        // title left empty and a bad url on the first pass
        let input = "add\n\nABC\nRemote\n\n\n\nnot a url\nActuary\nhttps://jobs.example.com/1\nquit\n";
        let (_, output) = run(backend, input).await;
        assert!(output.contains("! Job title is required"));
        assert!(output.contains("! Please enter a valid URL"));
        assert!(output.contains("Job added successfully!"));
    }

    #[tokio::test]
    async fn bad_job_type_is_asked_again() {
        let mut backend = listing_backend(vec![]);
        backend
            .expect_create_job()
            .withf(|payload| payload.job_type == crate::models::JobType::Contract)
            .times(1)
            .returning(|_| Ok(Some(job(8))));

        let input = "add\nActuary\nABC\nRemote\nGig\nContract\n\n\n\nquit\n";
        let (_, output) = run(backend, input).await;
        assert!(output.contains("Unknown job type 'Gig'"));
    }

    #[tokio::test]
    async fn cancel_abandons_form() {
        let (app, output) = run(listing_backend(vec![]), "add\nActuary\ncancel\nquit\n").await;
        assert!(output.contains("Cancelled."));
        assert!(app.form().is_none());
    }

    #[tokio::test]
    async fn edit_keeps_values_on_enter() {
        let mut backend = listing_backend(vec![job(3)]);
        backend
            .expect_update_job()
            .withf(|id, payload| {
                *id == 3 && payload.title == "Life Actuary" && payload.location == "Boston, MA"
            })
            .times(1)
            .returning(|id, _| Ok(Some(job(id))));

        let input = "edit 3\n\n\nBoston, MA\n\n\n\n\nquit\n";
        let (_, output) = run(backend, input).await;
        assert!(output.contains("Edit Job"));
        assert!(output.contains("Job updated successfully!"));
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut backend = listing_backend(vec![job(1)]);
        backend
            .expect_delete_job()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));

        let input = "delete 1\nn\ndelete 1\ny\nquit\n";
        let (_, output) = run(backend, input).await;
        assert!(output.contains(
            "Are you sure you want to delete the job \"Life Actuary\" at ABC Insurance? [y/N]"
        ));
        assert!(output.contains("Not deleted."));
        assert!(output.contains("Job deleted successfully!"));
    }

    #[tokio::test]
    async fn show_unknown_job_prints_error() {
        let mut backend = listing_backend(vec![]);
        backend
            .expect_get_job()
            .returning(|_| Err(Error::api(Some(404), "Job not found")));

        let (_, output) = run(backend, "show 77\nquit\n").await;
        assert!(output.contains("[error] Job not found"));
    }

    #[tokio::test]
    async fn dismiss_clears_banners() {
        let mut backend = MockJobBackend::new();
        let mut calls = 0;
        backend.expect_list_jobs().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Err(Error::api(None, "Failed to fetch jobs"))
            } else {
                Ok(vec![])
            }
        });
        backend
            .expect_job_stats()
            .returning(|| Ok(JobStats::default()));

        let (app, output) = run(backend, "dismiss\nquit\n").await;
        assert!(output.contains("[error] Failed to fetch jobs"));
        assert!(app.error_message().is_none());
    }
}
