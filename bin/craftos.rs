//! Virtual computer executor.

use std::process::ExitCode;

use craftos_runtime::{
    drivers::{ConsoleKeyboard, TerminateSignal},
    machine::ConsoleHaltDisplay,
    programs::{Countdown, Echo, EventLog},
    Halt, Machine, MachineConfig,
};
use log::{info, LevelFilter};

const USAGE: &str = "Usage: craftos [--config FILE] [--log LEVEL] [echo|countdown|events]";

struct Args {
    config: Option<String>,
    log_level: LevelFilter,
    program: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args {
        config: None,
        log_level: LevelFilter::Info,
        program: "echo".to_owned(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                parsed.config = Some(args.next().ok_or("Missing value for --config")?);
            }
            "--log" => {
                let level = args.next().ok_or("Missing value for --log")?;
                parsed.log_level = level
                    .parse()
                    .map_err(|_| format!("Unknown log level '{}'", level))?;
            }
            program if !program.starts_with('-') => parsed.program = program.to_owned(),
            other => return Err(format!("Unknown option '{}'", other)),
        }
    }

    Ok(parsed)
}

fn run(args: &Args) -> Result<Halt, String> {
    let config = match &args.config {
        Some(path) => MachineConfig::from_file(path)?,
        None => MachineConfig::default(),
    };

    let mut machine = Machine::new(config)?;
    machine.add_driver(ConsoleKeyboard::default());
    machine.add_driver(TerminateSignal::default());

    match args.program.as_str() {
        "echo" => {
            println!("Type lines to echo them, 'exit' to halt.");
            machine.load(Echo::printing())?;
        }
        "countdown" => {
            machine.load(Countdown::new(5, 1.0))?;
        }
        "events" => {
            println!("Logging events, '/terminate' to halt.");
            machine.load(EventLog::default())?;
        }
        other => return Err(format!("Unknown program '{}'", other)),
    }

    machine.run(&mut ConsoleHaltDisplay::stdout())
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{}", err);
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .init();

    loop {
        match run(&args) {
            Ok(Halt::Reboot) => info!("Rebooting"),
            Ok(Halt::Completed) | Ok(Halt::Shutdown) => return ExitCode::SUCCESS,
            Ok(Halt::Errored(_)) => return ExitCode::FAILURE,
            Err(err) => {
                eprintln!("{}", err);
                return ExitCode::FAILURE;
            }
        }
    }
}
