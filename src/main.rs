// Entry point: load a problem file, run the division, print portions JSON.
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fairslice::cli::Args;
use fairslice::config::ProtocolConfig;
use fairslice::core::slice::build_portions;
use fairslice::problem::Problem;
use fairslice::protocol::divide;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = ProtocolConfig::load_or_default(&args.config);
    if let Some(epsilon) = args.epsilon {
        config.epsilon = epsilon;
    }

    let problem = match Problem::load(Path::new(&args.problem_path)) {
        Ok(problem) => problem,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match divide(&problem.preferences, problem.cake_size, &config) {
        Ok(division) => {
            let portions =
                build_portions(&problem.preferences, &division.slices, problem.cake_size);
            match serde_json::to_string_pretty(&portions) {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("serialize portions: {err}");
                    return ExitCode::FAILURE;
                }
            }
            if args.steps {
                for step in &division.steps {
                    eprintln!("[agent {}] {}", step.actor, step.action);
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("division failed: {err}");
            ExitCode::FAILURE
        }
    }
}
