use clap::ArgMatches;
use colored::Colorize;
use rankwatch_core::check::{CheckEvent, CheckOptions, CheckProgressCallback, execute_check};
use rankwatch_core::credentials::CredentialSource;
use rankwatch_core::data::Database;
use rankwatch_core::error::CoreError;
use rankwatch_core::model::{KeywordStatus, NewProject, Project, parse_keywords};
use rankwatch_core::report::{ReportFormat, gather_report_data, generate_report, save_report};
use rankwatch_core::session::Session;
use rankwatch_lookup::{Device, GeminiClient, RankLookup};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

pub const DATABASE_FILE: &str = "rankwatch.db";

// Helper functions

/// Expands `~` and returns the database path inside the data directory.
pub fn database_path(data_dir: &str) -> PathBuf {
    let expanded = shellexpand::tilde(data_dir);
    Path::new(expanded.as_ref()).join(DATABASE_FILE)
}

/// Opens the session stored under `data_dir`, creating the directory and database on first use.
pub fn open_session(data_dir: &str) -> Result<Session, String> {
    let db_path = database_path(data_dir);
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
    }
    let db = Database::new(&db_path)
        .map_err(|e| format!("Failed to open database {}: {}", db_path.display(), e))?;
    Ok(Session::load(db))
}

/// Load keywords from a newline-delimited file
pub fn load_keywords_from_file(path: &Path) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read keywords file {}: {}", path.display(), e))?;
    Ok(parse_keywords(&content))
}

/// Keywords from repeated `-k` flags followed by those of the keywords file, if any.
pub fn collect_keywords(
    flags: &[String],
    keywords_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    let mut keywords: Vec<String> = flags
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    if let Some(path) = keywords_file {
        keywords.extend(load_keywords_from_file(path)?);
    }

    if keywords.is_empty() {
        return Err("At least one keyword is required (use -k or --keywords-file)".to_string());
    }
    Ok(keywords)
}

/// Builds the Gemini client from the `--model`, `--api-base` and `--timeout` flags.
pub fn build_lookup(model: &str, api_base: &str, timeout_secs: u64) -> Result<GeminiClient, String> {
    GeminiClient::with_timeout(timeout_secs)
        .and_then(|client| client.with_model(model).with_api_base(api_base))
        .map_err(|e| format!("Failed to set up the Gemini client: {}", e))
}

fn lookup_from_args(args: &ArgMatches) -> Result<GeminiClient, String> {
    let model = args
        .get_one::<String>("model")
        .map(String::as_str)
        .unwrap_or(rankwatch_lookup::client::DEFAULT_MODEL);
    let api_base = args
        .get_one::<String>("api-base")
        .map(String::as_str)
        .unwrap_or(rankwatch_lookup::client::DEFAULT_API_BASE);
    let timeout = args
        .get_one::<u64>("timeout")
        .copied()
        .unwrap_or(rankwatch_lookup::client::DEFAULT_TIMEOUT_SECS);
    build_lookup(model, api_base, timeout)
}

/// 1-based position as printed by `keys list`.
pub fn parse_key_position(position: usize, len: usize) -> Result<usize, String> {
    if position == 0 || position > len {
        Err(format!(
            "No API key at position {} ({} stored)",
            position, len
        ))
    } else {
        Ok(position - 1)
    }
}

pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn print_divider() {
    println!("{}", "═".repeat(60).bright_blue().bold());
}

fn print_prompt(msg: &str) -> String {
    print!("{} ", msg.bright_cyan().bold());
    let _ = io::stdout().flush();
    let mut response = String::new();
    if io::stdin().read_line(&mut response).is_err() {
        return String::new();
    }
    response.trim().to_lowercase()
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "✗".red().bold(), msg);
    std::process::exit(1);
}

fn session_or_exit(data_dir: &str) -> Session {
    open_session(data_dir).unwrap_or_else(|e| fail(e))
}

fn status_cell(status: KeywordStatus) -> colored::ColoredString {
    match status {
        KeywordStatus::Pending => status.label().dimmed(),
        KeywordStatus::Loading => status.label().yellow(),
        KeywordStatus::Success => status.label().green(),
        KeywordStatus::Error => status.label().red(),
    }
}

fn print_results_table(project: &Project) {
    let width = project
        .keywords
        .iter()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .max("Keyword".len());

    println!(
        "{:<width$}  {:>9}  {:<8}  {}",
        "Keyword".bold(),
        "Rank".bold(),
        "Status".bold(),
        "Ranking URL".bold(),
        width = width
    );
    for result in &project.results {
        let rank = result.rank();
        let rank_cell = if rank.position().is_some() {
            rank.to_string().bright_white().bold()
        } else {
            rank.to_string().dimmed()
        };
        println!(
            "{:<width$}  {:>9}  {:<8}  {}",
            result.keyword,
            rank_cell,
            status_cell(result.status),
            result.ranking_url().unwrap_or("N/A"),
            width = width
        );
        if let Some(ref error) = result.error {
            println!("  {} {}", "!".red(), error.red());
        }
    }
}

// Handlers

pub fn handle_init(args: &ArgMatches) {
    print_divider();
    println!("{}", "  RANKWATCH INITIALIZATION".bright_white().bold());
    print_divider();
    println!();

    let data_dir = args
        .get_one::<String>("PATH")
        .map(String::as_str)
        .unwrap_or("~/.config/rankwatch/");
    let force = args.get_flag("force");
    let db_loc = database_path(data_dir);
    let db_path = db_loc.as_path();
    let config_dir = db_path.parent().unwrap_or(Path::new("."));

    println!(
        "{} Target: {}",
        "→".blue(),
        config_dir.display().to_string().bright_white()
    );
    println!();

    if let Err(e) = fs::create_dir_all(config_dir) {
        fail(format!("Failed to create {}: {}", config_dir.display(), e));
    }

    if Database::exists(db_path) {
        let overwrite = if force {
            println!(
                "{} Deleting existing database (force mode)",
                "→".yellow().bold()
            );
            true
        } else {
            println!("{}", "⚠ WARNING".yellow().bold());
            println!("Database already exists at:");
            println!(
                "  {} {}",
                "•".yellow(),
                db_path.display().to_string().bright_white()
            );
            println!(
                "{}",
                "Overwriting deletes every project and API key stored in it.".yellow()
            );
            println!();

            let response = print_prompt("Would you like to overwrite it? [y/N]:");
            println!();
            response == "y" || response == "yes"
        };

        if overwrite {
            if let Err(e) = Database::drop(db_path) {
                fail(format!("Failed to remove {}: {}", db_path.display(), e));
            }
            println!("{} Existing database removed", "✓".green().bold());
        } else {
            println!("{} Keeping existing database", "→".blue());
        }
        println!();
    }

    if !Database::exists(db_path) {
        println!("{} Creating database...", "→".blue());
        if let Err(e) = Database::new(db_path) {
            fail(format!("Failed to create database: {}", e));
        }
        println!(
            "{} Database initialized: {}",
            "✓".green().bold(),
            db_path.display().to_string().bright_white()
        );
    }

    println!();
    print_divider();
    println!("{}", "  INITIALIZATION COMPLETE".green().bold());
    print_divider();
    println!();
    println!(
        "{} Next: add a Gemini API key with {}",
        "ℹ".blue(),
        "rankwatch keys add <KEY>".bright_white()
    );
    println!();
}

pub fn handle_project_create(args: &ArgMatches, data_dir: &str) {
    let flags: Vec<String> = args
        .get_many::<String>("keyword")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let keywords = collect_keywords(&flags, args.get_one::<PathBuf>("keywords-file"))
        .unwrap_or_else(|e| fail(e));

    let device = args
        .get_one::<String>("device")
        .and_then(|d| Device::from_str(d))
        .unwrap_or_default();

    let input = NewProject {
        name: args.get_one::<String>("name").cloned().unwrap_or_default(),
        domain: args.get_one::<String>("domain").cloned().unwrap_or_default(),
        keywords,
        device,
        country: args.get_one::<String>("country").cloned().unwrap_or_default(),
        city: args.get_one::<String>("city").cloned(),
    };

    let mut session = session_or_exit(data_dir);
    match session.create_project(input) {
        Ok(project) => {
            println!(
                "{} Created project {} ({})",
                "✓".green().bold(),
                project.name.bright_white().bold(),
                short_id(&project.id).cyan()
            );
            println!(
                "  {} keywords, {}, {}",
                project.keywords.len(),
                project.device,
                project.location_display()
            );
        }
        Err(e) => fail(e),
    }
}

pub fn handle_project_list(data_dir: &str) {
    let session = session_or_exit(data_dir);
    let projects = session.projects().list_all();

    if projects.is_empty() {
        println!(
            "No projects yet. Create one with {}",
            "rankwatch project create".bright_white()
        );
        return;
    }

    for project in projects {
        println!(
            "{}  {}  {}",
            short_id(&project.id).cyan(),
            project.name.bright_white().bold(),
            project.domain.blue()
        );
        println!(
            "          {} keywords | {} | {} | {} ok, {} failed",
            project.keywords.len(),
            project.device,
            project.location_display(),
            project.count_by_status(KeywordStatus::Success).to_string().green(),
            project.count_by_status(KeywordStatus::Error).to_string().red()
        );
    }
}

pub fn handle_project_show(args: &ArgMatches, data_dir: &str) {
    let id = args.get_one::<String>("ID").map(String::as_str).unwrap_or_default();
    let format = args
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);

    let mut session = session_or_exit(data_dir);
    let project = match session.open_project(id) {
        Ok(project) => project.clone(),
        Err(e) => fail(e),
    };

    if matches!(format, ReportFormat::Text) && args.get_one::<PathBuf>("output").is_none() {
        print_divider();
        println!("  {}", project.name.bright_white().bold());
        print_divider();
        println!("{} {}", "Domain:  ".blue(), project.domain);
        println!("{} {}", "Keywords:".blue(), project.keywords.len());
        println!("{} {}", "Device:  ".blue(), project.device);
        println!("{} {}", "Location:".blue(), project.location_display());
        println!();
        print_results_table(&project);
        return;
    }

    let data = gather_report_data(&project);
    let report = generate_report(&data, &format).unwrap_or_else(|e| fail(e));

    match args.get_one::<PathBuf>("output") {
        Some(path) => match save_report(&report, path) {
            Ok(()) => println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            ),
            Err(e) => fail(format!("Failed to write {}: {}", path.display(), e)),
        },
        None => print!("{}", report),
    }
}

pub fn handle_project_delete(args: &ArgMatches, data_dir: &str) {
    let id = args.get_one::<String>("ID").map(String::as_str).unwrap_or_default();
    let skip_confirmation = args.get_flag("yes");

    let mut session = session_or_exit(data_dir);
    let project = match session.projects().find(id) {
        Ok(project) => project.clone(),
        Err(e) => fail(e),
    };

    if !skip_confirmation {
        let response = print_prompt(&format!(
            "Are you sure you want to delete the project \"{}\"? [y/N]:",
            project.name
        ));
        if response != "y" && response != "yes" {
            println!("{} Deletion cancelled.", "✗".red().bold());
            return;
        }
    }

    match session.delete_project(&project.id) {
        Ok(removed) => println!(
            "{} Deleted project {} ({})",
            "✓".green().bold(),
            removed.name.bright_white(),
            short_id(&removed.id).cyan()
        ),
        Err(e) => fail(e),
    }
}

pub async fn handle_check(args: &ArgMatches, data_dir: &str) {
    let id = args.get_one::<String>("ID").map(String::as_str).unwrap_or_default();
    let lookup = lookup_from_args(args).unwrap_or_else(|e| fail(e));

    let mut session = session_or_exit(data_dir);
    let project = match session.projects().find(id) {
        Ok(project) => project.clone(),
        Err(e) => fail(e),
    };

    let credentials = session.shared_credentials();
    if credentials.snapshot().is_empty() {
        fail(CoreError::NoCredentials);
    }

    println!(
        "\nChecking {} keywords for {} with {}",
        project.keywords.len().to_string().bright_white().bold(),
        project.domain.blue(),
        lookup.model().cyan()
    );
    println!(
        "Device: {} | Location: {}\n",
        project.device,
        project.location_display()
    );

    let lookup: Arc<dyn RankLookup> = Arc::new(lookup);

    // The checker runs in its own task; every snapshot it publishes is persisted here
    let (tx, mut rx) = mpsc::unbounded_channel::<Project>();
    let progress_callback: CheckProgressCallback = Arc::new(move |project: &Project, _event: &CheckEvent| {
        let _ = tx.send(project.clone());
    });

    let task = tokio::spawn(async move {
        let mut project = project;
        let result = execute_check(
            lookup,
            &mut project,
            credentials.as_ref(),
            CheckOptions {
                show_progress_bar: true,
            },
            Some(progress_callback),
        )
        .await;
        (project, result)
    });

    while let Some(snapshot) = rx.recv().await {
        if let Err(e) = session.update_project(snapshot) {
            eprintln!("{} Failed to save progress: {}", "⚠".yellow(), e);
        }
    }

    let (project, result) = match task.await {
        Ok(done) => done,
        Err(e) => fail(format!("Check task failed: {}", e)),
    };

    match result {
        Ok(summary) => {
            if let Err(e) = session.update_project(project.clone()) {
                fail(format!("Failed to save results: {}", e));
            }
            println!(
                "\n{} Check complete: {} succeeded, {} failed ({} lookups)\n",
                "✓".green().bold(),
                summary.succeeded.to_string().green(),
                summary.failed.to_string().red(),
                summary.attempts
            );
            print_results_table(&project);
        }
        Err(e) => fail(e),
    }
}

pub fn handle_keys_add(args: &ArgMatches, data_dir: &str) {
    let key = args.get_one::<String>("KEY").map(String::as_str).unwrap_or_default();
    let mut session = session_or_exit(data_dir);

    match session.add_credential(key) {
        Ok(()) => println!(
            "{} Added API key {} ({} stored)",
            "✓".green().bold(),
            rankwatch_core::mask_for_display(key.trim()).cyan(),
            session.credentials().len()
        ),
        Err(e) => fail(e),
    }
}

pub fn handle_keys_remove(args: &ArgMatches, data_dir: &str) {
    let mut session = session_or_exit(data_dir);

    let removed = if let Some(position) = args.get_one::<usize>("index") {
        let len = session.credentials().len();
        let index = parse_key_position(*position, len).unwrap_or_else(|e| fail(e));
        session.remove_credential_at(index).unwrap_or_else(|e| fail(e))
    } else if let Some(key) = args.get_one::<String>("KEY") {
        match session.remove_credential(key) {
            Ok(true) => Some(key.clone()),
            Ok(false) => None,
            Err(e) => fail(e),
        }
    } else {
        fail("Pass the key to remove or --index N");
    };

    match removed {
        Some(key) => println!(
            "{} Removed API key {}",
            "✓".green().bold(),
            rankwatch_core::mask_for_display(&key).cyan()
        ),
        None => fail("No such API key"),
    }
}

pub fn handle_keys_list(data_dir: &str) {
    let session = session_or_exit(data_dir);
    let credentials = session.credentials();

    if credentials.is_empty() {
        println!(
            "No API keys stored. Add one with {}",
            "rankwatch keys add <KEY>".bright_white()
        );
        return;
    }

    for (i, masked) in credentials.masked().iter().enumerate() {
        println!("  {} {}", format!("{:>2}.", i + 1).dimmed(), masked.cyan());
    }
}

pub async fn handle_ui(args: &ArgMatches, data_dir: &str) {
    let lookup = lookup_from_args(args).unwrap_or_else(|e| fail(e));
    let session = session_or_exit(data_dir);
    let lookup: Arc<dyn RankLookup> = Arc::new(lookup);
    let handle = tokio::runtime::Handle::current();

    let outcome =
        tokio::task::spawn_blocking(move || rankwatch_tui::run(session, lookup, handle)).await;

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(e)) => fail(format!("Error running TUI: {}", e)),
        Err(e) => fail(format!("TUI task failed: {}", e)),
    }
}
