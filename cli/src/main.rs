mod logger;
mod output;

use clap::{Arg, ArgAction, ArgMatches, Command};
use posec_core::{CompilerConfig, PosecErrorExt, Script, SessionReport, compile_script};
use std::fs;
use std::path::PathBuf;

use output::FormatStyle;

fn main() {
    let cli = Command::new("posec")
        .version("0.1.0")
        .about("Compiler front end for a small expression language with Pose2D records")
        .arg(
            Arg::new("verbose")
                .help("Increase log verbosity (repeatable)")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .help("Only log errors")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true),
        );

    let cli = setup_cli(cli);
    let matches = cli.get_matches();

    let verbosity = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    logger::init(logger::level_for(verbosity, quiet));

    let code = dispatch_commands(&matches);
    std::process::exit(code);
}

fn config_arg() -> Arg {
    Arg::new("config")
        .help("JSON compiler configuration")
        .short('c')
        .long("config")
        .value_parser(clap::value_parser!(PathBuf))
        .value_name("FILE")
}

/// Sets up the `build` and `run` subcommands.
fn setup_cli(cli: Command) -> Command {
    cli.subcommand(
        Command::new("build")
            .about("Compile the specified source file")
            .arg(
                Arg::new("file")
                    .help("The source file to build")
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .index(1),
            )
            .arg(
                Arg::new("dump")
                    .help("Specify the dump stage")
                    .short('d')
                    .long("dump")
                    .value_parser(["ast", "ir", "json"])
                    .value_name("STAGE"),
            )
            .arg(
                Arg::new("output")
                    .help("Write the dump to this file instead of stdout")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            )
            .arg(config_arg()),
    )
    .subcommand(
        Command::new("run")
            .about("Compile a source file and evaluate its top-level expressions")
            .arg(
                Arg::new("file")
                    .help("The source file to run")
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .index(1),
            )
            .arg(config_arg()),
    )
}

fn report_fatal(error: &dyn PosecErrorExt, style: &FormatStyle) -> i32 {
    eprintln!("{} {}", style.error.apply_to("error:"), output::error_line(error));
    2
}

fn load_config(sub_m: &ArgMatches) -> Result<CompilerConfig, Box<dyn PosecErrorExt>> {
    match sub_m.get_one::<PathBuf>("config") {
        Some(path) => CompilerConfig::load_from_file(path).map_err(|e| Box::new(e) as Box<dyn PosecErrorExt>),
        None => Ok(CompilerConfig::default()),
    }
}

fn load_inputs(sub_m: &ArgMatches) -> Result<(Script, CompilerConfig), Box<dyn PosecErrorExt>> {
    let config = load_config(sub_m)?;
    let file = sub_m.get_one::<PathBuf>("file").cloned().unwrap_or_default();
    let script = Script::new(file)?;
    Ok((script, config))
}

fn exit_code(report: &SessionReport) -> i32 {
    if report.has_failures() { 1 } else { 0 }
}

/// Dispatches the subcommand and returns the process exit code.
fn dispatch_commands(matches: &ArgMatches) -> i32 {
    let style = FormatStyle::default();
    match matches.subcommand() {
        Some(("build", sub_m)) => {
            let (script, mut config) = match load_inputs(sub_m) {
                Ok(inputs) => inputs,
                Err(e) => return report_fatal(&*e, &style),
            };
            config.evaluate_top_level = false;

            let (session, report) = compile_script(&script, config);
            println!("{}", style.title.apply_to(&script.name));
            println!("{}", output::summary_table(&report));
            output::print_failures(&report, &style);

            if let Some(stage) = sub_m.get_one::<String>("dump") {
                let text = match stage.as_str() {
                    "ast" => report
                        .items
                        .iter()
                        .filter_map(|r| r.item.as_ref().map(|item| format!("{}\n", item)))
                        .collect::<String>(),
                    "ir" => session.module().to_string(),
                    _ => match serde_json::to_string_pretty(session.module()) {
                        Ok(json) => json,
                        Err(e) => {
                            eprintln!("{} {}", style.error.apply_to("error:"), e);
                            return 2;
                        }
                    },
                };
                match sub_m.get_one::<PathBuf>("output") {
                    Some(path) => {
                        if let Err(e) = fs::write(path, text) {
                            eprintln!("{} cannot write {}: {}", style.error.apply_to("error:"), path.display(), e);
                            return 2;
                        }
                        println!("{} {}", style.info.apply_to("wrote"), path.display());
                    }
                    None => print!("{}", text),
                }
            }

            if !report.has_failures() {
                println!("{}", style.success.apply_to("build succeeded"));
            }
            exit_code(&report)
        }
        Some(("run", sub_m)) => {
            let (script, mut config) = match load_inputs(sub_m) {
                Ok(inputs) => inputs,
                Err(e) => return report_fatal(&*e, &style),
            };
            config.evaluate_top_level = true;

            let (_session, report) = compile_script(&script, config);
            print!("{}", report.output);
            for value in report.values() {
                println!("{}", value);
            }
            if report.has_failures() {
                eprintln!(
                    "{} {} of {} item(s) failed",
                    style.warning.apply_to("warning:"),
                    report.failures().count(),
                    report.items.len()
                );
            }
            output::print_failures(&report, &style);
            exit_code(&report)
        }
        _ => {
            println!("No valid subcommand was used. Use --help for more information.");
            2
        }
    }
}
