use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use diacare_classifiers::data_handling::Measurements;
use diacare_cli::auth::SignupRequest;
use diacare_cli::commands::{assess, data, model, predict, report, user};
use diacare_cli::config::AppConfig;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("DIACARE_LOG", "error,diacare=info"))
        .init();

    let matches = build_cli().get_matches();
    let config_path = matches.get_one::<PathBuf>("config");
    let config = AppConfig::from_arguments(config_path, &matches)?;

    match matches.subcommand() {
        Some(("user", sub_m)) => handle_user(&config, sub_m),
        Some(("predict", sub_m)) => handle_predict(&config, sub_m),
        Some(("assess", sub_m)) => {
            let upload = required_arg(sub_m, "upload")?;
            let assessment = assess::run_assess(&config, upload, chrono::Utc::now())?;
            println!("{}", assessment.render());
            Ok(())
        }
        Some(("data", sub_m)) => handle_data(&config, sub_m),
        Some(("model", sub_m)) => {
            let description = model::run_model(
                &config,
                sub_m.get_one::<PathBuf>("plot"),
                chrono::Utc::now(),
            )?;
            print!("{}", description.render());
            Ok(())
        }
        Some(("report", sub_m)) => {
            let name = sub_m.get_one::<String>("name").map(String::as_str);
            let exported = report::run_report(&config, name, chrono::Utc::now())?;
            println!("Report written to {}", exported.html.display());
            println!("Data written to {}", exported.csv.display());
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn build_cli() -> Command {
    Command::new("diacare")
        .version(clap::crate_version!())
        .about("\u{1FA7A} DiaCare CLI - Diabetes risk assessment from clinical measurements")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .help("Path to a JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf))
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("dataset")
                .short('d')
                .long("dataset")
                .global(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to the reference dataset CSV. Overrides the dataset_path \
                     specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .global(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Directory reports are written to. Overrides output_dir.")
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("user_store")
                .long("user-store")
                .global(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to the user store JSON. Overrides user_store_path.")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("session")
                .long("session")
                .global(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to the session file. Overrides session_path.")
                .value_hint(ValueHint::FilePath),
        )
        .subcommand(
            Command::new("user")
                .about("Manage accounts and the login session")
                .subcommand_required(true)
                .subcommand(
                    Command::new("signup")
                        .about("Create a new account")
                        .arg(Arg::new("name").long("name").required(true).help("Full name"))
                        .arg(Arg::new("username").long("username").required(true))
                        .arg(Arg::new("password").long("password").required(true))
                        .arg(
                            Arg::new("confirm_password")
                                .long("confirm-password")
                                .required(true),
                        ),
                )
                .subcommand(
                    Command::new("login")
                        .about("Log in. Without --password an existing session is reused, or the password is read from stdin")
                        .arg(Arg::new("username").required(true))
                        .arg(Arg::new("password").long("password")),
                )
                .subcommand(Command::new("logout").about("End the current session"))
                .subcommand(Command::new("whoami").about("Show the logged-in user")),
        )
        .subcommand(
            Command::new("predict")
                .about("Predict the diabetes risk class for one set of measurements")
                .arg(measurement_arg("hba1c", "hba1c", "HbA1c level (%)"))
                .arg(measurement_arg("glucose", "glucose", "Plasma glucose (mg/dL)"))
                .arg(measurement_arg(
                    "blood_pressure",
                    "blood-pressure",
                    "Diastolic blood pressure (mm Hg)",
                ))
                .arg(measurement_arg(
                    "skin_thickness",
                    "skin-thickness",
                    "Triceps skin fold thickness (mm)",
                ))
                .arg(measurement_arg("insulin", "insulin", "Serum insulin (mu U/ml)"))
                .arg(measurement_arg("bmi", "bmi", "Body mass index"))
                .arg(measurement_arg(
                    "pedigree",
                    "pedigree",
                    "Diabetes pedigree function (genetic correlation)",
                ))
                .arg(
                    measurement_arg("pregnancies", "pregnancies", "Number of pregnancies")
                        .required(false)
                        .default_value("0"),
                )
                .arg(measurement_arg("age", "age", "Age (years)"))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print the result as JSON")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("assess")
                .about("Assess an uploaded two-column (parameter, value) CSV file")
                .arg(
                    Arg::new("upload")
                        .help("Path to the patient parameter CSV")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("data")
                .about("Inspect the reference dataset")
                .subcommand_required(true)
                .subcommand(
                    Command::new("summary")
                        .about("Descriptive statistics per column")
                        .arg(
                            Arg::new("json")
                                .long("json")
                                .help("Print the summary as JSON")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(
                    Command::new("column")
                        .about("Print the values of one column")
                        .arg(Arg::new("name").required(true).help("CSV header name, e.g. Glucose")),
                ),
        )
        .subcommand(
            Command::new("model")
                .about("Train on the reference dataset and print the tree and feature importances")
                .arg(
                    Arg::new("plot")
                        .long("plot")
                        .help("Write a feature importance chart to this HTML file")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Export the last prediction of this session as HTML and CSV")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("Name printed on the report. Defaults to the logged-in user's name")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}

fn measurement_arg(id: &'static str, long: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(long)
        .help(help)
        .required(true)
        .allow_negative_numbers(true)
        .value_parser(clap::value_parser!(f64))
}

fn required_arg<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .ok_or_else(|| anyhow::anyhow!("Missing required argument: {}", id))
}

fn handle_user(config: &AppConfig, matches: &ArgMatches) -> Result<()> {
    let now = chrono::Utc::now();
    match matches.subcommand() {
        Some(("signup", sub_m)) => {
            let arg = |id: &str| sub_m.get_one::<String>(id).cloned().unwrap_or_default();
            let request = SignupRequest {
                name: arg("name"),
                username: arg("username"),
                password: arg("password"),
                confirm_password: arg("confirm_password"),
            };
            let created = user::run_signup(config, &request, now)?;
            println!(
                "Account created for '{}'. You can now log in.",
                created.username
            );
            Ok(())
        }
        Some(("login", sub_m)) => {
            let username = required_arg(sub_m, "username")?;
            let password = sub_m.get_one::<String>("password").map(String::as_str);
            let session = user::run_login(
                config,
                username,
                password,
                &mut std::io::stdin().lock(),
                now,
            )?;
            println!("Welcome, {}!", session.name);
            Ok(())
        }
        Some(("logout", _)) => {
            match user::run_logout(config)? {
                Some(username) => println!("Logged out '{}'.", username),
                None => println!("No active session."),
            }
            Ok(())
        }
        Some(("whoami", _)) => {
            match user::run_whoami(config, now)? {
                Some(session) => println!("{} ({})", session.name, session.username),
                None => println!("Not logged in."),
            }
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_predict(config: &AppConfig, matches: &ArgMatches) -> Result<()> {
    let value = |id: &str| matches.get_one::<f64>(id).copied().unwrap_or_default();
    let measurements = Measurements {
        hba1c: value("hba1c"),
        glucose: value("glucose"),
        blood_pressure: value("blood_pressure"),
        skin_thickness: value("skin_thickness"),
        insulin: value("insulin"),
        bmi: value("bmi"),
        pedigree: value("pedigree"),
        pregnancies: value("pregnancies"),
        age: value("age"),
    };
    let output = predict::run_predict(
        config,
        measurements.to_feature_vector()?,
        chrono::Utc::now(),
    )?;
    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.render());
    }
    Ok(())
}

fn handle_data(config: &AppConfig, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("summary", sub_m)) => {
            let summary = data::run_summary(config, chrono::Utc::now())?;
            if sub_m.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", data::format_summary(&summary));
            }
            Ok(())
        }
        Some(("column", sub_m)) => {
            let name = required_arg(sub_m, "name")?;
            for value in data::run_column(config, name, chrono::Utc::now())? {
                println!("{}", value);
            }
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}
