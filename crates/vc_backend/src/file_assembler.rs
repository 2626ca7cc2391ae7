//! A concrete `Assembler`: serializes declared metadata and emitted
//! instruction streams to a small length-prefixed binary container named
//! after the program. This stands in for the real CLR metadata writer the
//! historical tool used, which is explicitly out of scope here — nothing
//! reads this format back; it only has to exist so `vc` produces an
//! artifact a caller can point at.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};

use vc_ast::{Primitive, Type};
use vc_base::{Interner, Symbol};

use crate::assembler::{Assembler, MethodSig};
use crate::instr::{Instr, Label};

/// Writes `<program-name>.exe` under `dir` once `finish` is called. Holds
/// only `Symbol`s during declaration and emission so a caller can keep the
/// interner mutably borrowed (e.g. to intern `"Main"`) until `finish` needs
/// it to resolve names into the output.
pub struct FileAssembler {
    dir: std::path::PathBuf,
    program_name: Option<Symbol>,
    fields: Vec<(Symbol, Type)>,
    methods: Vec<MethodSig>,
    bodies: HashMap<Symbol, Vec<Instr>>,
    entry_point: Option<Symbol>,
    static_initializer: Option<Symbol>,
}

impl FileAssembler {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        FileAssembler {
            dir: dir.into(),
            program_name: None,
            fields: Vec::new(),
            methods: Vec::new(),
            bodies: HashMap::new(),
            entry_point: None,
            static_initializer: None,
        }
    }
}

impl Assembler for FileAssembler {
    fn declare_type(&mut self, name: Symbol) {
        self.program_name = Some(name);
    }

    fn declare_method(&mut self, sig: MethodSig) {
        self.methods.push(sig);
    }

    fn declare_field(&mut self, name: Symbol, ty: Type) {
        self.fields.push((name, ty));
    }

    fn emit(&mut self, method: Symbol, body: Vec<Instr>) {
        self.bodies.insert(method, body);
    }

    fn set_entry_point(&mut self, method: Symbol) {
        self.entry_point = Some(method);
    }

    fn set_static_initializer(&mut self, method: Symbol) {
        self.static_initializer = Some(method);
    }

    fn finish(&mut self, interner: &Interner) -> io::Result<String> {
        let program_name = self.program_name.map(|s| interner.resolve(s)).unwrap_or("");
        let path = self.dir.join(format!("{program_name}.exe"));
        let mut out = File::create(&path)?;

        out.write_all(b"VCBC")?;
        out.write_all(&[1u8])?;
        write_str(&mut out, program_name)?;

        write_u32(&mut out, self.fields.len() as u32)?;
        for (name, ty) in &self.fields {
            write_str(&mut out, interner.resolve(*name))?;
            write_type(&mut out, ty)?;
        }

        write_u32(&mut out, self.methods.len() as u32)?;
        for sig in &self.methods {
            write_str(&mut out, interner.resolve(sig.name))?;
            write_type(&mut out, &sig.return_type)?;
            write_u32(&mut out, sig.params.len() as u32)?;
            for p in &sig.params {
                write_type(&mut out, p)?;
            }
            let body = self.bodies.get(&sig.name).map(Vec::as_slice).unwrap_or(&[]);
            write_u32(&mut out, body.len() as u32)?;
            for instr in body {
                write_instr(&mut out, instr, interner)?;
            }
        }

        write_str(&mut out, self.entry_point.map(|s| interner.resolve(s)).unwrap_or(""))?;
        write_str(&mut out, self.static_initializer.map(|s| interner.resolve(s)).unwrap_or(""))?;
        out.flush()?;

        log::info!("wrote bytecode artifact to {}", path.display());
        Ok(path.display().to_string())
    }
}

fn write_u32(out: &mut impl Write, n: u32) -> io::Result<()> {
    out.write_all(&n.to_le_bytes())
}

fn write_str(out: &mut impl Write, s: &str) -> io::Result<()> {
    write_u32(out, s.len() as u32)?;
    out.write_all(s.as_bytes())
}

fn write_type(out: &mut impl Write, ty: &Type) -> io::Result<()> {
    match ty {
        Type::Primitive(p) => {
            out.write_all(&[0u8])?;
            let tag: u8 = match p {
                Primitive::Bool => 0,
                Primitive::Int => 1,
                Primitive::Double => 2,
                Primitive::String => 3,
                Primitive::Void => 4,
                Primitive::Unsupported => 5,
            };
            out.write_all(&[tag])
        }
        Type::Array { element, dimensions, .. } => {
            out.write_all(&[1u8])?;
            write_type(out, &Type::Primitive(*element))?;
            write_u32(out, *dimensions as u32)
        }
    }
}

fn write_label(out: &mut impl Write, label: Label) -> io::Result<()> {
    write_u32(out, label.0)
}

fn write_instr(out: &mut impl Write, instr: &Instr, interner: &Interner) -> io::Result<()> {
    match instr {
        Instr::LdcI4S(n) => {
            out.write_all(&[0])?;
            out.write_all(&n.to_le_bytes())
        }
        Instr::LdcI4(n) => {
            out.write_all(&[1])?;
            out.write_all(&n.to_le_bytes())
        }
        Instr::LdcR8(d) => {
            out.write_all(&[2])?;
            out.write_all(&d.to_le_bytes())
        }
        Instr::LdStr(s) => {
            out.write_all(&[3])?;
            write_str(out, interner.resolve(*s))
        }
        Instr::Add => out.write_all(&[4]),
        Instr::Sub => out.write_all(&[5]),
        Instr::Mul => out.write_all(&[6]),
        Instr::Div => out.write_all(&[7]),
        Instr::Rem => out.write_all(&[8]),
        Instr::Neg => out.write_all(&[9]),
        Instr::Ceq => out.write_all(&[10]),
        Instr::Cgt => out.write_all(&[11]),
        Instr::Clt => out.write_all(&[12]),
        Instr::Xor => out.write_all(&[13]),
        Instr::Br(l) => {
            out.write_all(&[14])?;
            write_label(out, *l)
        }
        Instr::Brtrue(l) => {
            out.write_all(&[15])?;
            write_label(out, *l)
        }
        Instr::Brfalse(l) => {
            out.write_all(&[16])?;
            write_label(out, *l)
        }
        Instr::Bgt(l) => {
            out.write_all(&[17])?;
            write_label(out, *l)
        }
        Instr::Blt(l) => {
            out.write_all(&[18])?;
            write_label(out, *l)
        }
        Instr::Mark(l) => {
            out.write_all(&[19])?;
            write_label(out, *l)
        }
        Instr::Ldloc(i) => {
            out.write_all(&[20])?;
            write_u32(out, *i)
        }
        Instr::Stloc(i) => {
            out.write_all(&[21])?;
            write_u32(out, *i)
        }
        Instr::Ldarg(i) => {
            out.write_all(&[22])?;
            write_u32(out, *i)
        }
        Instr::Starg(i) => {
            out.write_all(&[23])?;
            write_u32(out, *i)
        }
        Instr::Ldsfld(s) => {
            out.write_all(&[24])?;
            write_str(out, interner.resolve(*s))
        }
        Instr::Stsfld(s) => {
            out.write_all(&[25])?;
            write_str(out, interner.resolve(*s))
        }
        Instr::LdExternalField(path) => {
            out.write_all(&[26])?;
            write_path(out, path, interner)
        }
        Instr::StExternalField(path) => {
            out.write_all(&[27])?;
            write_path(out, path, interner)
        }
        Instr::ConvI4 => out.write_all(&[28]),
        Instr::ConvR8 => out.write_all(&[29]),
        Instr::Call(name, arity) => {
            out.write_all(&[30])?;
            write_str(out, interner.resolve(*name))?;
            write_u32(out, *arity as u32)
        }
        Instr::CallExternal(path, arity) => {
            out.write_all(&[31])?;
            write_path(out, path, interner)?;
            write_u32(out, *arity as u32)
        }
        Instr::CallStringConcat => out.write_all(&[32]),
        Instr::Newobj { rank } => {
            out.write_all(&[33])?;
            write_u32(out, *rank as u32)
        }
        Instr::CallArrayGet => out.write_all(&[34]),
        Instr::CallArraySet => out.write_all(&[35]),
        Instr::Pop => out.write_all(&[36]),
        Instr::Ret => out.write_all(&[37]),
    }
}

fn write_path(out: &mut impl Write, path: &[Symbol], interner: &Interner) -> io::Result<()> {
    write_u32(out, path.len() as u32)?;
    for seg in path {
        write_str(out, interner.resolve(*seg))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc_ast::Primitive;

    #[test]
    fn finish_writes_an_artifact_named_after_the_program() {
        let mut interner = Interner::new();
        let p = interner.intern("P");
        let dir = tempfile::tempdir().unwrap();
        let mut assembler = FileAssembler::new(dir.path());
        assembler.declare_type(p);
        let main = interner.intern("Main");
        assembler.declare_method(MethodSig { name: main, params: vec![], return_type: Type::void() });
        assembler.emit(main, vec![Instr::Ret]);
        assembler.set_entry_point(main);

        let path = assembler.finish(&interner).unwrap();
        assert!(std::path::Path::new(&path).exists());
        assert!(path.ends_with("P.exe"));
    }

    #[test]
    fn writes_declared_array_field_metadata() {
        let mut interner = Interner::new();
        let p = interner.intern("P");
        let g = interner.intern("g");
        let dir = tempfile::tempdir().unwrap();
        let mut assembler = FileAssembler::new(dir.path());
        assembler.declare_type(p);
        assembler.declare_field(g, Type::Array { element: Primitive::Int, dimensions: 2, sizes: vec![3, 4] });
        let path = assembler.finish(&interner).unwrap();
        let bytes = std::fs::read(path).unwrap();
        assert!(!bytes.is_empty());
    }
}
