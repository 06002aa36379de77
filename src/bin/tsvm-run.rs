//! Minimal console runner: loads a flat binary image and executes it with a
//! stdin/stdout-only host. Graphics and mouse `SYS` operations are no-ops;
//! there is no window, so there is nothing to draw to or poll.

#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use tsvm::host::HostIo;
use tsvm::{ExitReason, Memory, Vm};

/// Reads one character at a time from stdin, blocking. `print_char` writes
/// straight to stdout and flushes so output interleaves correctly with any
/// program that also waits on input.
struct ConsoleHost {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl ConsoleHost {
    fn new() -> ConsoleHost {
        ConsoleHost {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl HostIo for ConsoleHost {
    fn print_char(&mut self, ch: u8) {
        let _ = self.stdout.write_all(&[ch]);
        let _ = self.stdout.flush();
    }

    fn take_key(&mut self) -> Option<u8> {
        let mut buf = [0u8; 1];
        match self.stdin.read_exact(&mut buf) {
            Ok(()) => Some(buf[0]),
            Err(_) => Some(0), // EOF: hand back a null byte rather than spin forever
        }
    }

    fn draw_pixel(&mut self, _x: u8, _y: u8, _color: u8) {}

    fn refresh(&mut self) {}

    fn poll_key(&mut self) -> bool {
        false
    }

    fn get_key(&mut self) -> u8 {
        0
    }

    fn poll_mouse(&mut self) -> bool {
        false
    }

    fn mouse_x(&self) -> u16 {
        0
    }

    fn mouse_y(&self) -> u16 {
        0
    }

    fn get_mouse_buttons(&mut self) -> u8 {
        0
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("IMAGE")
                .help("Flat binary image produced by tasm")
                .required(true)
                .index(1),
        )
        .get_matches();

    let path = matches.value_of("IMAGE").unwrap();
    match run(path) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn run(path: &str) -> io::Result<bool> {
    let mut bytes = Vec::new();
    File::open(Path::new(path))?.read_to_end(&mut bytes)?;

    let mut vm = Vm::new(Memory::from(&bytes[..]));
    let mut host = ConsoleHost::new();

    match vm.run(&mut host) {
        ExitReason::Halted | ExitReason::HostShutdown => Ok(true),
        ExitReason::Faulted(kind) => {
            eprintln!("tsvm: {}", kind);
            Ok(false)
        }
    }
}
