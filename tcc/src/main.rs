#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum IoContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Compile(tcc::CompileError),
    Io(std::io::Error, IoContext, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => write!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IoContext::ReadInput => "reading input",
                    IoContext::WriteOutput => "writing output",
                },
                path.display(),
                err
            ),
            Error::Compile(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Source file to compile")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Assembly file to write")
                .required(true)
                .index(2),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("OUTPUT").unwrap();

    if let Err(err) = run(input, output) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(input: &str, output: &str) -> Result<(), Error> {
    let input_path = Path::new(input);

    let input_file = File::open(input_path)
        .map_err(|err| Error::Io(err, IoContext::ReadInput, input_path.to_owned()))?;
    let mut source = String::new();
    BufReader::new(input_file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, IoContext::ReadInput, input_path.to_owned()))?;

    let lines = tcc::compile(&source).map_err(Error::Compile)?;

    let output_path = Path::new(output);
    let mut out_file = File::create(output_path)
        .map_err(|err| Error::Io(err, IoContext::WriteOutput, output_path.to_owned()))?;

    for line in &lines {
        writeln!(out_file, "{}", line)
            .map_err(|err| Error::Io(err, IoContext::WriteOutput, output_path.to_owned()))?;
    }

    Ok(())
}
