use commands::command_argument_builder;
use rankwatch::handlers::*;
use rankwatch_core::print_banner;
use tracing::Level;

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    let data_dir = chosen_command
        .get_one::<String>("data-dir")
        .cloned()
        .unwrap_or_else(|| commands::DEFAULT_DATA_DIR.to_string());

    // The TUI owns the terminal; log output would tear through the alternate screen
    if !matches!(chosen_command.subcommand(), Some(("ui", _))) {
        init_tracing(verbose);
    }

    match chosen_command.subcommand() {
        Some(("ui", primary_command)) => handle_ui(primary_command, &data_dir).await,
        Some(("init", primary_command)) => handle_init(primary_command),
        Some(("project", primary_command)) => match primary_command.subcommand() {
            Some(("create", secondary_command)) => {
                handle_project_create(secondary_command, &data_dir)
            }
            Some(("list", _)) => handle_project_list(&data_dir),
            Some(("show", secondary_command)) => handle_project_show(secondary_command, &data_dir),
            Some(("delete", secondary_command)) => {
                handle_project_delete(secondary_command, &data_dir)
            }
            _ => unreachable!("clap should ensure we don't get here"),
        },
        Some(("check", primary_command)) => handle_check(primary_command, &data_dir).await,
        Some(("keys", primary_command)) => match primary_command.subcommand() {
            Some(("add", secondary_command)) => handle_keys_add(secondary_command, &data_dir),
            Some(("remove", secondary_command)) => handle_keys_remove(secondary_command, &data_dir),
            Some(("list", _)) => handle_keys_list(&data_dir),
            _ => unreachable!("clap should ensure we don't get here"),
        },
        _ => unreachable!("clap should ensure we don't get here"),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
