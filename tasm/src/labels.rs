use std::collections::HashMap;

/// A forward reference to a label: two zero bytes were emitted at
/// `patch_location` and need the label's resolved address written over
/// them once every label has been seen.
struct LabelRef<'i> {
    name: &'i str,
    patch_location: u16,
    source_line: usize,
}

/// Assembler state threaded through the single pass over the source: the
/// growing output image, the label table, and the list of forward
/// references still waiting on a definition. Kept as an explicit value
/// (not process-global state) so a caller can assemble more than one
/// program concurrently.
#[derive(Default)]
pub struct Assembler<'i> {
    pub output: Vec<u8>,
    labels: HashMap<&'i str, u16>,
    refs: Vec<LabelRef<'i>>,
}

impl<'i> Assembler<'i> {
    pub fn new() -> Assembler<'i> {
        Assembler::default()
    }

    pub fn here(&self) -> u16 {
        self.output.len() as u16
    }

    pub fn emit_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }

    pub fn emit_word(&mut self, value: u16) {
        self.emit_byte((value & 0xFF) as u8);
        self.emit_byte((value >> 8) as u8);
    }

    /// Records `name` at the current offset, or fails if it was already
    /// defined earlier in the same pass.
    pub fn define_label(&mut self, name: &'i str) -> Result<(), String> {
        if self.labels.contains_key(name) {
            return Err(name.to_owned());
        }
        let addr = self.here();
        self.labels.insert(name, addr);
        Ok(())
    }

    /// Emits two placeholder bytes and records them to be patched once
    /// `name` is defined (or resolves immediately if it already is).
    pub fn emit_label_ref(&mut self, name: &'i str, source_line: usize) {
        if let Some(&addr) = self.labels.get(name) {
            self.emit_word(addr);
        } else {
            let patch_location = self.here();
            self.emit_word(0);
            self.refs.push(LabelRef {
                name,
                patch_location,
                source_line,
            });
        }
    }

    /// Patches every forward reference, returning the name and source line
    /// of the first one that was never defined.
    pub fn resolve(&mut self) -> Result<(), (String, usize)> {
        for r in &self.refs {
            match self.labels.get(r.name) {
                Some(&addr) => {
                    let loc = r.patch_location as usize;
                    self.output[loc] = (addr & 0xFF) as u8;
                    self.output[loc + 1] = (addr >> 8) as u8;
                }
                None => return Err((r.name.to_owned(), r.source_line)),
            }
        }
        Ok(())
    }
}
