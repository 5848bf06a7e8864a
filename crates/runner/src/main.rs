use kairos_runner::{Experiment, ExperimentConfig, Scenario};

fn print_help() {
    eprintln!(
        r#"Kairos - office-hours allocation mechanism simulator

USAGE:
    kairos [OPTIONS]

OPTIONS:
    --scenario <NAME>   Run a built-in experiment (default: current)
                        current, posted-price, fast-pass, pay-per-minute, optimal
    --config <PATH>     Load the experiment from a JSON file
    --trials <N>        Override the number of trials
    --seed <N>          Override the base seed
    --json              Print the report as JSON
    --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG            Log level filter (default: info)

EXAMPLES:
    # Posted prices over 100 trials
    kairos --scenario posted-price --trials 100

    # Reproducible run from a config file
    kairos --config experiment.json --seed 42 --json
"#
    );
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T {
    let Some(value) = value else {
        eprintln!("Error: {} requires a value", flag);
        std::process::exit(1);
    };
    match value.parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Error: {} expects a non-negative integer, got '{}'", flag, value);
            std::process::exit(1);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut scenario: Option<Scenario> = None;
    let mut config_path: Option<String> = None;
    let mut trials: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--scenario" | "-s" => {
                i += 1;
                let Some(name) = args.get(i) else {
                    eprintln!("Error: --scenario requires a name");
                    std::process::exit(1);
                };
                scenario = Some(name.parse()?);
            }
            "--config" | "-c" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    eprintln!("Error: --config requires a path argument");
                    std::process::exit(1);
                };
                config_path = Some(path.clone());
            }
            "--trials" | "-n" => {
                i += 1;
                trials = Some(parse_number("--trials", args.get(i)));
            }
            "--seed" => {
                i += 1;
                seed = Some(parse_number("--seed", args.get(i)));
            }
            "--json" => json = true,
            arg => {
                eprintln!("Unknown argument: {}", arg);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if scenario.is_some() && config_path.is_some() {
        eprintln!("Error: --scenario and --config are mutually exclusive");
        std::process::exit(1);
    }

    let mut config = match config_path {
        Some(path) => {
            log::info!("Loading configuration from: {}", path);
            ExperimentConfig::from_file(&path)?
        }
        None => scenario.unwrap_or(Scenario::Current).config(),
    };
    if let Some(trials) = trials {
        config.trials = trials;
    }
    if seed.is_some() {
        config.seed = seed;
    }

    let report = Experiment::new(config)?.run()?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report);
    }
    Ok(())
}
