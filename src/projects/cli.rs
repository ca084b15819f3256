//! Command-line entrypoint for the translator.
//!
//! Parses the command, loads the settings and the program document, then hands
//! both to the translation pipeline.

use crate::build_system::core_build::Translator;
use crate::frontend_model::program::Program;
use crate::projects::settings::Settings;
use crate::translator_messages::display_messages::{print_formatted_error, print_translator_errors};
use saying::say;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    // Translates a front-end program document into C++ sources
    Translate {
        program: PathBuf,
        config: Option<PathBuf>,
        out: Option<PathBuf>,
    },

    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Flag {
    DisableTimers,
}

pub fn start_cli() {
    let translator_args: Vec<String> = env::args().collect();

    if translator_args.len() < 2 {
        print_help(false);
        return;
    }

    let command = match get_command(&translator_args[1..]) {
        Ok(command) => command,
        Err(e) => {
            say!(Red e);
            print_help(true);
            return;
        }
    };

    let flags = get_flags(&translator_args);

    match command {
        Command::Help => print_help(false),

        Command::Translate {
            program,
            config,
            out,
        } => run_translate(&program, config.as_deref(), out, &flags),
    }
}

fn run_translate(program_path: &Path, config: Option<&Path>, out: Option<PathBuf>, flags: &[Flag]) {
    let time = Instant::now();

    // Without an explicit config, j2cpp.toml next to the program document is used
    let settings = match config {
        Some(config) => Settings::load(config),
        None => Settings::load_from_dir(program_path.parent().unwrap_or(Path::new("."))),
    };

    let mut settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            print_formatted_error(&e);
            return;
        }
    };

    if let Some(out) = out {
        settings.output_dir = out;
    }

    let program = match Program::load(program_path) {
        Ok(program) => program,
        Err(e) => {
            print_formatted_error(&e);
            return;
        }
    };

    let translator = Translator::new(settings);
    match translator.translate_to_disk(&program) {
        Ok(output) => {
            let file_count = output.file_count();
            let output_dir = translator.settings().output_dir.to_string_lossy().to_string();
            say!("Wrote ", Bright file_count, " files to ", Green output_dir);

            if !flags.contains(&Flag::DisableTimers) {
                say!("Translated in: ", Green #time.elapsed());
            }
        }
        Err(errors) => print_translator_errors(&errors),
    }
}

fn get_command(args: &[String]) -> Result<Command, String> {
    let command = args.first().map(String::as_str);

    match command {
        Some("help") | Some("--help") => Ok(Command::Help),
        Some("translate") => parse_translate_command(args),
        Some(other) => Err(format!("Invalid command: '{}'", other)),
        None => Err(String::from("Missing command")),
    }
}

fn get_flags(args: &[String]) -> Vec<Flag> {
    let mut flags = Vec::new();

    for arg in args {
        if arg == "--hide-timers" {
            flags.push(Flag::DisableTimers);
        }
    }

    flags
}

fn parse_translate_command(args: &[String]) -> Result<Command, String> {
    let mut program: Option<PathBuf> = None;
    let mut config = None;
    let mut out = None;
    let mut index = 1usize;

    while let Some(arg) = args.get(index) {
        match arg.as_str() {
            "--config" | "--out" => {
                let Some(value) = args.get(index + 1) else {
                    return Err(format!("Missing value for {}", arg));
                };
                if value.starts_with("--") {
                    return Err(format!("Missing value for {}", arg));
                }

                if arg == "--config" {
                    config = Some(PathBuf::from(value));
                } else {
                    out = Some(PathBuf::from(value));
                }
                index += 2;
            }
            "--hide-timers" => {
                index += 1;
            }
            _ if arg.starts_with("--") => {
                return Err(format!(
                    "Unknown translate flag: '{arg}'. Supported flags are --config, --out, --hide-timers."
                ));
            }
            _ => {
                if program.is_some() {
                    return Err(String::from(
                        "Translate command accepts exactly one program document.",
                    ));
                }
                program = Some(PathBuf::from(arg));
                index += 1;
            }
        }
    }

    match program {
        Some(program) => Ok(Command::Translate {
            program,
            config,
            out,
        }),
        None => Err(String::from(
            "Missing program document (try 'j2cpp translate program.json')",
        )),
    }
}

fn print_help(commands_only: bool) {
    if !commands_only {
        say!(Bright Black "------------------------------------");
        say!(Green Bold "j2cpp, Java to C++ translator");
        say!("Usage: ", Bold "<command>", Italic " <args>");
    }
    say!(Green Bold "\nCommands:");
    say!("  translate <program.json>   - Translates a front-end program document");
    say!("  help                       - Shows this message");

    say!(Green Bold "\nTranslate options:");
    say!("  --config <file>   (default: j2cpp.toml next to the program document)");
    say!("  --out <dir>       (default: output_dir from the config)");
    say!("  --hide-timers");
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
