//! The nominal bytecode instruction set emission targets: a small
//! stack-machine ISA named after the historical CLR opcodes it mirrors.
//! Labels are resolved by whichever `Assembler` receives the finished
//! stream — the emitter only ever deals in stream-local `Label` handles
//! assigned in allocation order.

use vc_base::Symbol;

/// A branch target local to one method body's instruction stream, paired
/// with a `Mark` at the position it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    /// `Ldc_I4_0` .. `Ldc_I4_8`: the short encoding for small int constants;
    /// booleans reuse `LdcI4S(0)` / `LdcI4S(1)` rather than a dedicated
    /// boolean opcode.
    LdcI4S(i32),
    /// The generic int constant load, for anything outside `0..=8`.
    LdcI4(i32),
    LdcR8(f64),
    LdStr(Symbol),
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    Ceq,
    Cgt,
    Clt,
    /// Bitwise xor; the host's native op, which also behaves as logical xor
    /// over the 0/1 encoding booleans use.
    Xor,
    Br(Label),
    Brtrue(Label),
    Brfalse(Label),
    /// Fused compare-and-branch used only by `for`-loop bound checks:
    /// branches to `Label` when the top two stack values compare greater
    /// (`Bgt`) or less (`Blt`).
    Bgt(Label),
    Blt(Label),
    /// A label definition; later `Br`/`Brtrue`/`Brfalse`/`Bgt`/`Blt`
    /// instructions to the same `Label` land here.
    Mark(Label),
    Ldloc(u32),
    Stloc(u32),
    Ldarg(u32),
    Starg(u32),
    Ldsfld(Symbol),
    Stsfld(Symbol),
    /// Loads a field resolved through the reflective type provider, e.g.
    /// `System.Console.Out`.
    LdExternalField(Vec<Symbol>),
    StExternalField(Vec<Symbol>),
    /// Narrowing `double -> int` / widening `int -> double` conversions.
    ConvI4,
    ConvR8,
    /// Calls a user-declared function by name and argument count.
    Call(Symbol, usize),
    /// Calls a reflected external method by qualified path and arity.
    CallExternal(Vec<Symbol>, usize),
    /// The runtime's string-concatenation helper; lowers string `+`.
    CallStringConcat,
    /// Allocates a rectangular array of the given rank via its constructor.
    Newobj { rank: usize },
    CallArrayGet,
    CallArraySet,
    /// Discards a call's result when used in statement position.
    Pop,
    Ret,
}

/// Picks the short-form or generic int-load opcode per the `0..=8` rule.
pub fn const_int(n: i64) -> Instr {
    if (0..=8).contains(&n) {
        Instr::LdcI4S(n as i32)
    } else {
        Instr::LdcI4(n as i32)
    }
}

pub fn const_bool(b: bool) -> Instr {
    Instr::LdcI4S(if b { 1 } else { 0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_ints_take_the_short_form() {
        assert_eq!(const_int(0), Instr::LdcI4S(0));
        assert_eq!(const_int(8), Instr::LdcI4S(8));
    }

    #[test]
    fn ints_outside_the_short_range_are_generic() {
        assert_eq!(const_int(9), Instr::LdcI4(9));
        assert_eq!(const_int(-1), Instr::LdcI4(-1));
    }

    #[test]
    fn booleans_reuse_the_int_short_forms() {
        assert_eq!(const_bool(true), Instr::LdcI4S(1));
        assert_eq!(const_bool(false), Instr::LdcI4S(0));
    }
}
