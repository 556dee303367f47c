use std::env;
use std::io::{self, Write};

use clap::{App, AppSettings, Arg, ErrorKind};
use env_logger::{fmt, Builder, Target};
use log::{error, Level, LevelFilter, Record};

use anyhow::Error;

use tallysat::Solver;
use tallysat_dimacs::{write_dimacs, DimacsParser};

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
    // Prefix all log output with "c " so it reads as DIMACS comments.
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
        .filter(None, LevelFilter::Warn);

    if let Ok(ref env_var) = env::var("TALLYSAT_LOG") {
        builder.parse_filters(env_var);
    }

    builder.init();
}

fn main_with_err() -> Result<i32, Error> {
    let matches = App::new("tallysat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A counter-based CDCL SAT solver. Reads a DIMACS CNF formula from stdin.")
        .setting(AppSettings::DisableHelpSubcommand)
        .arg(
            Arg::with_name("show-cnf")
                .long("show-cnf")
                .conflicts_with("hide-cnf")
                .help("Print the parsed formula before solving"),
        )
        .arg(
            Arg::with_name("hide-cnf")
                .long("hide-cnf")
                .help("Do not print the parsed formula [default]"),
        )
        .arg(
            Arg::with_name("show-model")
                .long("show-model")
                .conflicts_with("hide-model")
                .help("Print a satisfying assignment [default]"),
        )
        .arg(
            Arg::with_name("hide-model")
                .long("hide-model")
                .help("Do not print a satisfying assignment"),
        )
        .arg(
            Arg::with_name("show-learned-clauses")
                .long("show-learned-clauses")
                .conflicts_with("hide-learned-clauses")
                .help("Print the final clause database, learned clauses included"),
        )
        .arg(
            Arg::with_name("hide-learned-clauses")
                .long("hide-learned-clauses")
                .help("Do not print the clause database [default]"),
        )
        .get_matches_safe();

    // Usage goes to stdout, also for misuse. Misuse exits non-zero, help and version exit 0.
    let matches = match matches {
        Ok(matches) => matches,
        Err(err) => {
            println!("{}", err.message);
            let exit_code = match err.kind {
                ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed => 0,
                _ => 1,
            };
            return Ok(exit_code);
        }
    };

    init_logging();

    let show_cnf = matches.is_present("show-cnf");
    let show_model = !matches.is_present("hide-model");
    let show_learned = matches.is_present("show-learned-clauses");

    let stdin = io::stdin();
    let formula = DimacsParser::parse(stdin.lock())?;

    if show_cnf {
        let stdout = io::stdout();
        write_dimacs(&mut stdout.lock(), &formula)?;
    }

    let mut solver = Solver::new();
    solver.add_formula(&formula);

    let satisfiable = solver.solve();
    println!("SAT: {}", satisfiable);

    if satisfiable && show_model {
        if let Some(model) = solver.model() {
            for lit in model {
                println!("\tx{}\t=>\t{}", lit.var().to_dimacs(), lit.is_positive());
            }
        }
    }

    if show_learned {
        print_clause_grid(&solver);
    }

    Ok(0)
}

/// Width of the clause grid in variable columns.
const GRID_COLUMNS: isize = 200;

/// Print the clause database as a fixed-width grid, one row per clause.
///
/// Column k shows `T` when the literal xk occurs positively in the clause and `~` when it occurs
/// negatively. A separator line marks the end of the input clauses; everything below it was
/// learned during the search.
fn print_clause_grid(solver: &Solver) {
    let clauses = solver.clauses();
    let input_clauses = solver.input_clause_count();

    for (index, clause) in clauses.iter().enumerate() {
        if index == input_clauses {
            println!("{}", "-".repeat(GRID_COLUMNS as usize));
        }

        let mut row = vec![b' '; GRID_COLUMNS as usize];
        for &lit in clause.iter() {
            let column = lit.var().to_dimacs();
            if column <= GRID_COLUMNS {
                row[(column - 1) as usize] = if lit.is_positive() { b'T' } else { b'~' };
            }
        }
        println!("{}", String::from_utf8_lossy(&row));
    }

    if clauses.len() == input_clauses {
        println!("{}", "-".repeat(GRID_COLUMNS as usize));
    }
}
