extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

pub mod assembler;

use clap::{Arg, ArgMatches, App};

use std::fs::File;
use std::path::Path;

use assembler::error::Error;
use assembler::{lexer, output, parser, resolver};

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    // INPUT is required, so clap has already rejected a missing path.
    let ifile = args.value_of("INPUT").unwrap_or_default();
    debug!("Arguments:\n\tVerbosity: {}\n\tPrint Debug: {}\n\tInfile: {}",
        args.occurrences_of("verbose"),
        args.is_present("print-debug"),
        ifile
    );

    if let Err(err) = run(Path::new(ifile), args.is_present("print-debug")) {
        error!("fatal: {}", err);
        std::process::exit(1);
    }
}

/// Assembles `ipath` into the image beside it. Nothing is written unless
/// every stage succeeds.
fn run(ipath: &Path, print_debug: bool) -> Result<(), Error> {
    let opath = output::image_path(ipath)?;

    let source = {
        let ifile = File::open(ipath).map_err(|source| Error::Read { path: ipath.to_owned(), source })?;
        lexer::tokenize(Box::new(ifile), ipath)?
    };

    let mut program = parser::Parser::new().run(source)?;
    resolver::resolve(&mut program)?;
    output::terminate(&mut program.words);

    if print_debug {
        print_listing(&program);
    }

    output::write_image(&opath, &program.words)
}

fn print_listing(program: &parser::Program) {
    println!("{}", output::listing(&program.words).fit_into_columns(3));

    let mut symbols: Vec<(&str, u16, &str)> = program.symbols.labels()
        .map(|(name, addr)| (name, addr, "label"))
        .chain(program.symbols.variables().map(|(name, addr)| (name, addr, "variable")))
        .collect();
    symbols.sort_by_key(|&(name, addr, _)| (addr, name));

    for (name, addr, kind) in symbols {
        println!("{:04}  {:<8}  {}", addr, kind, name);
    }
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("INPUT")
            .help("Sets the .k86 source file to assemble")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("print-debug")
            .short("d")
            .alias("show")
            .takes_value(false)
            .help("prints a disassembly of the image and the symbol table to STDOUT"))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .chain(std::io::stderr())
        .apply().ok();
}
