use std::env;
use std::fs;
use std::io::{self, Read, Write};

use anyhow::Error;
use clap::{crate_version, value_t, App, AppSettings, Arg};
use env_logger::{fmt, Builder, Target};
use log::{error, info};
use log::{Level, LevelFilter, Record};

use vexsat::{RestartPolicy, SolveResult, Solver, SolverConfig};

fn main() {
    let exit_code = match main_with_err() {
        Err(err) => {
            error!("{}", err);
            1
        }
        Ok(exit_code) => exit_code,
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let format = |buf: &mut fmt::Formatter, record: &Record| {
        if record.level() == Level::Info {
            writeln!(buf, "c {}", record.args())
        } else {
            writeln!(buf, "c {}: {}", record.level(), record.args())
        }
    };

    let mut builder = Builder::new();
    builder
        .target(Target::Stdout)
        .format(format)
        .filter(None, LevelFilter::Info);

    if let Ok(ref env_var) = env::var("VEXSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn banner() {
    info!("This is vexsat {}", crate_version!());
}

fn print_stats(solver: &Solver) {
    let stats = solver.stats();
    info!("restarts:              {}", stats.restarts);
    info!(
        "conflicts:             {:<12} ({:.0} /sec)",
        stats.conflicts,
        stats.conflicts as f64 / stats.time_seconds
    );
    info!(
        "decisions:             {:<12} ({:4.2} % random) ({:.0} /sec)",
        stats.decisions,
        stats.random_decisions as f64 * 100.0 / stats.decisions as f64,
        stats.decisions as f64 / stats.time_seconds
    );
    info!(
        "propagations:          {:<12} ({:.0} /sec)",
        stats.propagations,
        stats.propagations as f64 / stats.time_seconds
    );
    info!("learned clauses:       {}", stats.learned_clauses);
    info!("deleted clauses:       {}", stats.deleted_clauses);
    info!("glue clauses:          {}", stats.glue_clauses);
    info!("minimized literals:    {}", stats.minimized_literals);
    info!("absorbed clauses:      {}", stats.subsumed_clauses);
    info!("max glue:              {}", stats.max_glue);
    info!("CPU time:              {:.3} s", stats.time_seconds);
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("vexsat")
        .version(crate_version!())
        .setting(AppSettings::DisableHelpSubcommand)
        .arg_from_usage("[INPUT] 'The input file to use (stdin if omitted)'")
        .arg_from_usage("[config-file] --config=[FILE] 'Read parameters from a TOML file'")
        .arg(
            Arg::from_usage("[restarts] --restarts=[POLICY] 'Select the restart policy'")
                .possible_values(&["luby", "glucose", "none"])
                .case_insensitive(true),
        )
        .arg_from_usage("[max-conflicts] --max-conflicts=[N] 'Stop after N conflicts'")
        .arg_from_usage("[max-decisions] --max-decisions=[N] 'Stop after N decisions'")
        .arg_from_usage("[max-time] --max-time=[SECONDS] 'Stop after this much wall clock time'")
        .arg_from_usage("--stats 'Print statistics after solving'")
        .get_matches();

    init_logging();
    banner();

    let mut config = SolverConfig::default();

    if let Some(config_path) = matches.value_of("config-file") {
        let mut config_contents = String::new();
        fs::File::open(config_path)?.read_to_string(&mut config_contents)?;

        config = toml::from_str(&config_contents)?;
    }

    if let Some(policy) = matches.value_of("restarts") {
        config.restart_policy = match &policy.to_ascii_lowercase()[..] {
            "luby" => RestartPolicy::Luby,
            "glucose" => RestartPolicy::GlucoseEma,
            "none" => RestartPolicy::None,
            _ => unreachable!(),
        };
    }

    if matches.is_present("max-conflicts") {
        config.max_conflicts = Some(value_t!(matches, "max-conflicts", u64)?);
    }

    if matches.is_present("max-decisions") {
        config.max_decisions = Some(value_t!(matches, "max-decisions", u64)?);
    }

    if matches.is_present("max-time") {
        config.max_time_seconds = Some(value_t!(matches, "max-time", f64)?);
    }

    let mut solver = Solver::with_config(config);

    let stdin = io::stdin();

    let mut locked_stdin;
    let mut opened_file;

    let file = match matches.value_of("INPUT") {
        Some(path) => {
            info!("Reading file '{}'", path);
            opened_file = fs::File::open(path)?;
            &mut opened_file as &mut dyn io::Read
        }
        None => {
            info!("Reading from stdin");
            locked_stdin = stdin.lock();
            &mut locked_stdin as &mut dyn io::Read
        }
    };

    solver.add_dimacs_cnf(file)?;

    let result = solver.solve();

    if matches.is_present("stats") {
        print_stats(&solver);
    }

    match result {
        SolveResult::Sat => {
            println!("s SATISFIABLE");
            print!("v");
            for l in solver.model().unwrap() {
                print!(" {}", l);
            }
            println!(" 0");
            Ok(10)
        }
        SolveResult::Unsat => {
            println!("s UNSATISFIABLE");
            Ok(20)
        }
        SolveResult::Unknown => {
            println!("s UNKNOWN");
            Ok(0)
        }
    }
}
