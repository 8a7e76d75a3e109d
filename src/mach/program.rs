use super::code::{Code, CodeLine, Opcode};
use super::table::SymTbl;
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Compiled program
///
/// Internal-code lines indexed by source line number (index 0 is a dummy
/// so the two stay aligned), the deduplicated literal pools, the symbol
/// tables, and the line execution starts from. Shared by the checker and
/// the executor.
#[derive(Debug, Default)]
pub struct Program {
    lines: Vec<CodeLine>,
    nbr_lits: Vec<f64>,
    str_lits: Vec<Rc<str>>,
    pub tbl: SymTbl,
    pub start_pc: usize,
}

impl Program {
    pub fn new() -> Program {
        Program::default()
    }

    /// Number of internal-code lines, dummy line 0 included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn push_line(&mut self, line: CodeLine) {
        self.lines.push(line);
    }

    /// Back-patch the block opener on `line` with its end line.
    pub fn patch_jump(&mut self, line: usize, end_line: usize) -> Result<()> {
        let end_line = match u16::try_from(end_line) {
            Ok(n) => n,
            Err(_) => return Err(error!("the internal code is too large")),
        };
        match self.lines.get_mut(line) {
            Some(code_line) => {
                code_line.patch_jump(end_line);
                Ok(())
            }
            None => Err(error!("the internal code is incorrect")),
        }
    }

    /// Leading opcode of a line, without disturbing any cursor.
    pub fn leading(&self, line: usize) -> Result<Opcode> {
        match self.lines.get(line) {
            Some(code_line) => code_line.leading(),
            None => Err(error!("the internal code is incorrect")),
        }
    }

    /// Decode one instruction at a byte offset within a line, returning
    /// it with the offset of the next instruction. The end-of-line marker
    /// does not advance, so repeated decodes at a line's terminator keep
    /// yielding `Code::Eol`.
    pub fn decode(&self, line: usize, pos: usize) -> Result<(Code, usize)> {
        use Opcode::*;
        let bytes = match self.lines.get(line) {
            Some(code_line) => code_line.bytes(),
            None => return Err(error!("the internal code is incorrect")),
        };
        let op = bytes
            .get(pos)
            .copied()
            .and_then(Opcode::from_u8)
            .ok_or_else(|| error!("the internal code is incorrect"))?;
        let code = match op {
            Eol => return Ok((Code::Eol, pos)),
            Func | If | Elif | Else | While | For => {
                let n = read_u16(bytes, pos + 1)? as usize;
                match op {
                    Func => Code::Func(n),
                    If => Code::If(n),
                    Elif => Code::Elif(n),
                    Else => Code::Else(n),
                    While => Code::While(n),
                    _ => Code::For(n),
                }
            }
            Number => {
                let n = read_u16(bytes, pos + 1)? as usize;
                match self.nbr_lits.get(n) {
                    Some(value) => Code::Number(*value),
                    None => return Err(error!("the internal code is incorrect")),
                }
            }
            Str => {
                let n = read_u16(bytes, pos + 1)? as usize;
                match self.str_lits.get(n) {
                    Some(text) => Code::Str(text.clone()),
                    None => return Err(error!("the internal code is incorrect")),
                }
            }
            Gvar | Lvar | Fcall => {
                let n = read_u16(bytes, pos + 1)? as usize;
                match op {
                    Gvar => Code::Gvar(n),
                    Lvar => Code::Lvar(n),
                    _ => Code::Fcall(n),
                }
            }
            _ => plain_code(op),
        };
        let next = match op {
            Func | If | Elif | Else | While | For | Number | Str | Gvar | Lvar | Fcall => pos + 3,
            _ => pos + 1,
        };
        Ok((code, next))
    }

    /// Pool index for a numeric literal, reusing the first identical
    /// entry.
    pub fn nbr_literal(&mut self, value: f64) -> usize {
        match self.nbr_lits.iter().position(|v| *v == value) {
            Some(n) => n,
            None => {
                self.nbr_lits.push(value);
                self.nbr_lits.len() - 1
            }
        }
    }

    /// Pool index for a string literal, reusing the first identical
    /// entry.
    pub fn str_literal(&mut self, text: &str) -> usize {
        match self.str_lits.iter().position(|s| &**s == text) {
            Some(n) => n,
            None => {
                self.str_lits.push(text.into());
                self.str_lits.len() - 1
            }
        }
    }

    #[cfg(test)]
    pub fn nbr_pool_len(&self) -> usize {
        self.nbr_lits.len()
    }
}

fn read_u16(bytes: &[u8], pos: usize) -> Result<u16> {
    match bytes.get(pos..pos + 2) {
        Some(two) => Ok(u16::from_le_bytes([two[0], two[1]])),
        None => Err(error!("the internal code is incorrect")),
    }
}

fn plain_code(op: Opcode) -> Code {
    use Opcode::*;
    match op {
        Var => Code::Var,
        Option => Code::Option,
        End => Code::End,
        To => Code::To,
        Step => Code::Step,
        Break => Code::Break,
        Return => Code::Return,
        Exit => Code::Exit,
        Print => Code::Print,
        Println => Code::Println,
        Input => Code::Input,
        Toint => Code::Toint,
        Lparen => Code::Lparen,
        Rparen => Code::Rparen,
        Lbracket => Code::Lbracket,
        Rbracket => Code::Rbracket,
        Comma => Code::Comma,
        Question => Code::Question,
        Assign => Code::Assign,
        Mul => Code::Mul,
        Div => Code::Div,
        Mod => Code::Mod,
        IntDiv => Code::IntDiv,
        Add => Code::Add,
        Sub => Code::Sub,
        Lt => Code::Lt,
        LtEq => Code::LtEq,
        Gt => Code::Gt,
        GtEq => Code::GtEq,
        Eq => Code::Eq,
        NotEq => Code::NotEq,
        And => Code::And,
        Or => Code::Or,
        Not => Code::Not,
        Eol | Func | If | Elif | Else | While | For | Number | Str | Gvar | Lvar | Fcall => {
            unreachable!("operand-carrying opcode: {:?}", op)
        }
    }
}
