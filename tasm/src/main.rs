#[macro_use]
extern crate clap;

use byteorder::WriteBytesExt;
use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tasm::{SourceMap, SourceMapItem};
use util::Endian;

#[derive(Debug)]
enum IoContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Assemble(tasm::Error),
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
            Error::Assemble(err) => write!(f, "{}", err),
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Assembly source file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Binary image to write (default: input with .bin extension)"),
        )
        .arg(
            Arg::with_name("source_map")
                .short("m")
                .long("source-map")
                .takes_value(true)
                .value_name("SOURCE_MAP")
                .help("Optional source map to write alongside the image"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("output");
    let map = matches.value_of("source_map");

    if let Err(err) = run(input, output, map) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn run(input: &str, output: Option<&str>, map: Option<&str>) -> Result<(), Error> {
    let input_path = Path::new(input);

    let input_file = File::open(input_path)
        .map_err(|err| Error::Io(err, IoContext::ReadInput, input_path.to_owned()))?;
    let mut source = String::new();
    BufReader::new(input_file)
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, IoContext::ReadInput, input_path.to_owned()))?;

    // An undefined-label error still carries a best-effort image (every
    // byte resolved except the unresolved patch locations). Every other
    // error means nothing worth writing was ever assembled, so only this
    // one case falls through to the write below instead of returning early.
    let (image, source_map, undefined_label_err) = match tasm::assemble(&source) {
        Ok((image, source_map)) => (image, source_map, None),
        Err((err, image)) if err.is_undefined_label() => (image, SourceMap::new(), Some(err)),
        Err((err, _image)) => return Err(Error::Assemble(err)),
    };

    let output_path: PathBuf = output
        .map(PathBuf::from)
        .unwrap_or_else(|| input_path.with_extension("bin"));
    let mut out_file = File::create(&output_path)
        .map_err(|err| Error::Io(err, IoContext::WriteOutput, output_path.clone()))?;
    out_file
        .write_all(&image)
        .map_err(|err| Error::Io(err, IoContext::WriteOutput, output_path.clone()))?;

    if let Some(err) = undefined_label_err {
        return Err(Error::Assemble(err));
    }

    if let Some(map_path_str) = map {
        let map_path = PathBuf::from(map_path_str);
        write_source_map(&source_map, &map_path)
            .map_err(|err| Error::Io(err, IoContext::WriteOutput, map_path))?;
    }

    Ok(())
}

fn write_source_map(source_map: &[SourceMapItem], path: &PathBuf) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for item in source_map {
        writer.write_u32::<Endian>(item.start_line)?;
        writer.write_u32::<Endian>(item.line_count)?;
    }
    Ok(())
}
