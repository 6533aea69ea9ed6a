use crate::CLAP_STYLING;
use clap::{arg, command};
use rankwatch_lookup::client::{DEFAULT_API_BASE, DEFAULT_MODEL};

pub(crate) const DEFAULT_DATA_DIR: &str = "~/.config/rankwatch/";

fn lookup_args(cmd: clap::Command) -> clap::Command {
    cmd.arg(
        arg!(--"model" <MODEL>)
            .required(false)
            .help("Gemini model used for lookups")
            .default_value(DEFAULT_MODEL),
    )
    .arg(
        arg!(--"api-base" <URL>)
            .required(false)
            .help("Base URL of the Gemini REST API")
            .default_value(DEFAULT_API_BASE),
    )
    .arg(
        arg!(--"timeout" <SECONDS>)
            .required(false)
            .help("Request timeout in seconds")
            .value_parser(clap::value_parser!(u64))
            .default_value("120"),
    )
}

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("rankwatch")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("rankwatch")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log every lookup attempt to stderr")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"data-dir" <PATH>)
                .required(false)
                .global(true)
                .help("Directory holding the rankwatch database")
                .default_value(DEFAULT_DATA_DIR),
        )
        .subcommand_required(false)
        .subcommand(
            command!("init")
                .about("Initializes the rankwatch database on your filesystem")
                .arg(
                    arg!([PATH])
                        .required(false)
                        .help("Location to store the rankwatch database")
                        .default_value(DEFAULT_DATA_DIR),
                )
                .arg(
                    arg!(-f --"force")
                        .help("Overwrite any existing database at the specified location without asking")
                        .required(false),
                ),
        )
        .subcommand(
            command!("project")
                .about("Manage keyword projects")
                .subcommand_required(true)
                .subcommand(
                    command!("create")
                        .about("Creates a project")
                        .arg(
                            arg!(-n --"name" <NAME>)
                                .required(true)
                                .help("The name of the project"),
                        )
                        .arg(
                            arg!(-d --"domain" <DOMAIN>)
                                .required(true)
                                .help("The domain whose ranking is checked"),
                        )
                        .arg(
                            arg!(-k --"keyword" <KEYWORD>)
                                .required(false)
                                .help("A keyword to track (repeatable)")
                                .action(clap::ArgAction::Append),
                        )
                        .arg(
                            arg!(--"keywords-file" <PATH>)
                                .required(false)
                                .help("Path to a newline-delimited file of keywords")
                                .value_parser(clap::value_parser!(std::path::PathBuf)),
                        )
                        .arg(
                            arg!(--"device" <DEVICE>)
                                .required(false)
                                .help("Device the search is simulated from")
                                .value_parser(["desktop", "mobile"])
                                .default_value("desktop"),
                        )
                        .arg(
                            arg!(--"country" <COUNTRY>)
                                .required(false)
                                .help("Country the search is simulated from")
                                .default_value(rankwatch_core::model::DEFAULT_COUNTRY),
                        )
                        .arg(
                            arg!(--"city" <CITY>)
                                .required(false)
                                .help("Optional city within the country"),
                        ),
                )
                .subcommand(command!("list").about("List all projects"))
                .subcommand(
                    command!("show")
                        .about("Shows a project and its latest results")
                        .arg(arg!(<ID>).help("Project id or unique id prefix"))
                        .arg(
                            arg!(-f --"format" <FORMAT>)
                                .required(false)
                                .help("Report format: text, json, csv, markdown")
                                .value_parser(["text", "json", "csv", "markdown"])
                                .default_value("text"),
                        )
                        .arg(
                            arg!(-o --"output" <PATH>)
                                .required(false)
                                .help("Save report to file (default: display to screen)")
                                .value_parser(clap::value_parser!(std::path::PathBuf)),
                        ),
                )
                .subcommand(
                    command!("delete")
                        .about("Deletes a project")
                        .arg(arg!(<ID>).help("Project id or unique id prefix"))
                        .arg(
                            arg!(-y --"yes")
                                .required(false)
                                .help("Do not ask for confirmation"),
                        ),
                ),
        )
        .subcommand(lookup_args(
            command!("check")
                .about("Checks the ranking of every keyword of a project")
                .arg(arg!(<ID>).help("Project id or unique id prefix")),
        ))
        .subcommand(
            command!("keys")
                .about("Manage Gemini API keys")
                .subcommand_required(true)
                .subcommand(
                    command!("add")
                        .about("Adds an API key")
                        .arg(arg!(<KEY>).help("The API key")),
                )
                .subcommand(
                    command!("remove")
                        .about("Removes an API key")
                        .arg(
                            arg!([KEY])
                                .required(false)
                                .help("The API key to remove")
                                .conflicts_with("index"),
                        )
                        .arg(
                            arg!(-i --"index" <N>)
                                .required(false)
                                .help("Position of the key as shown by 'keys list'")
                                .value_parser(clap::value_parser!(usize)),
                        ),
                )
                .subcommand(command!("list").about("List API keys (masked)")),
        )
        .subcommand(lookup_args(
            command!("ui").about("Launches the interactive terminal UI"),
        ))
}
