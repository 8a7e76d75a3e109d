use super::code::{Code, Opcode};
use super::memory::Memory;
use super::program::Program;
use super::stack::Stack;
use super::table::DataType;
use crate::error;
use crate::lang::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Result<T> = std::result::Result<T, Error>;

/// Output and interactive-input collaborator of the executor. The binary
/// wires this to stdio; tests use string buffers.
pub trait Console {
    fn print(&mut self, text: &str);
    fn input(&mut self) -> String;
}

/// Byte position of the instruction decoder within the program.
#[derive(Debug, Clone, Default)]
struct Cursor {
    line: usize,
    pos: usize,
}

/// Everything a call must restore on return.
#[derive(Debug)]
struct Frame {
    pc: usize,
    base: usize,
    sp: usize,
    cur: Cursor,
    code: Code,
}

/// ## Checker and executor
///
/// One state machine over the compiled program with two modes. `check`
/// walks every line once with the expression grammar pushing placeholder
/// values and touching no memory or console. `run` executes for real:
/// program counter over lines, base/stack-top offsets into the flat
/// memory, call frames, and the shared operand stack.
pub struct Runtime<'a> {
    prog: &'a mut Program,
    console: &'a mut dyn Console,
    mem: Memory,
    stk: Stack<f64>,
    frames: Stack<Frame>,
    pc: usize,
    max_line: usize,
    base: usize,
    sp: usize,
    cur: Cursor,
    code: Code,
    ret_val: f64,
    break_flg: bool,
    return_flg: bool,
    exit_flg: bool,
    checking: bool,
    steps: usize,
    step_limit: Option<usize>,
    interrupt: Option<Arc<AtomicBool>>,
}

impl<'a> Runtime<'a> {
    pub fn new(prog: &'a mut Program, console: &'a mut dyn Console) -> Runtime<'a> {
        Runtime {
            prog,
            console,
            mem: Memory::new(),
            stk: Stack::new("the operand stack overflowed"),
            frames: Stack::new("the call stack overflowed"),
            pc: 0,
            max_line: 0,
            base: 0,
            sp: 0,
            cur: Cursor::default(),
            code: Code::Eol,
            ret_val: 1.0,
            break_flg: false,
            return_flg: false,
            exit_flg: false,
            checking: false,
            steps: 0,
            step_limit: None,
            interrupt: None,
        }
    }

    /// Report a fatal "interrupted" error when the flag goes high,
    /// typically from a Ctrl-C handler.
    pub fn set_interrupt(&mut self, flag: Arc<AtomicBool>) {
        self.interrupt = Some(flag);
    }

    /// Bound the number of executed statements. Used by test harnesses
    /// to keep intentionally infinite programs finite.
    pub fn set_step_limit(&mut self, limit: usize) {
        self.step_limit = Some(limit);
    }

    // *** Static check

    /// Walk every line once, side-effect free, before execution.
    pub fn check(&mut self) -> Result<()> {
        self.checking = true;
        let result = self.check_lines();
        self.checking = false;
        result.map_err(|e| e.or_line(self.pc))
    }

    fn check_lines(&mut self) -> Result<()> {
        use Opcode::*;
        for pc in 1..self.prog.len() {
            self.pc = pc;
            self.code = self.first_code(pc)?;
            match self.code.op() {
                Func | Option | Var => {} // declarations, checked at compile time
                Else | End | Exit => {
                    self.code = self.next_code()?;
                    self.chk_eol()?;
                }
                If | Elif | While => {
                    self.code = self.next_code()?;
                    self.get_expression_between(None, Some(Eol))?;
                }
                For => {
                    let save = self.next_code()?;
                    self.get_mem_adrs(&save)?;
                    self.get_expression_between(Some(Assign), None)?;
                    self.get_expression_between(Some(To), None)?;
                    if self.code.op() == Step {
                        self.get_expression_between(Some(Step), None)?;
                    }
                    self.chk_eol()?;
                }
                Fcall => {
                    let fnc_nbr = match &self.code {
                        Code::Fcall(n) => *n,
                        _ => unreachable!(),
                    };
                    self.fnc_call_chk(fnc_nbr)?;
                    self.chk_eol()?;
                    self.stk.pop()?; // a bare call leaves no residual value
                }
                Print | Println => self.sys_fnc_chk(self.code.op())?,
                Gvar | Lvar => {
                    let save = self.code.clone();
                    self.get_mem_adrs(&save)?;
                    self.get_expression_between(Some(Assign), Some(Eol))?;
                }
                Return => {
                    self.code = self.next_code()?;
                    if self.code.op() != Question && self.code.op() != Eol {
                        self.get_expression()?;
                    }
                    if self.code.op() == Question {
                        self.get_expression_between(Some(Question), None)?;
                    }
                    self.chk_eol()?;
                }
                Break => {
                    self.code = self.next_code()?;
                    if self.code.op() == Question {
                        self.get_expression_between(Some(Question), None)?;
                    }
                    self.chk_eol()?;
                }
                Eol => {}
                _ => {
                    let text = self.code_text(&self.code);
                    return Err(error!("incorrect value '{}'", text));
                }
            }
        }
        Ok(())
    }

    // *** Execution

    pub fn run(&mut self) -> Result<()> {
        self.base = 0;
        self.sp = self.prog.tbl.global_size();
        self.mem.resize(self.sp + 1000);
        self.stk.clear();
        self.break_flg = false;
        self.return_flg = false;
        self.exit_flg = false;
        self.steps = 0;
        self.pc = self.prog.start_pc;
        self.max_line = self.prog.len().saturating_sub(1);
        let result = self.run_lines();
        result.map_err(|e| e.or_line(self.pc))
    }

    fn run_lines(&mut self) -> Result<()> {
        while self.pc <= self.max_line && !self.exit_flg {
            self.statement()?;
        }
        Ok(())
    }

    /// Interrupt and step-limit bookkeeping, once per statement and once
    /// per loop iteration.
    fn tick(&mut self) -> Result<()> {
        if let Some(interrupt) = &self.interrupt {
            if interrupt.load(Ordering::SeqCst) {
                return Err(error!("interrupted"));
            }
        }
        self.steps += 1;
        if let Some(limit) = self.step_limit {
            if self.steps > limit {
                return Err(error!(
                    "the execution limit of {} statements was exceeded",
                    limit
                ));
            }
        }
        Ok(())
    }

    fn statement(&mut self) -> Result<()> {
        use Opcode::*;
        if self.pc > self.max_line || self.exit_flg {
            return Ok(());
        }
        self.tick()?;
        self.code = self.first_code(self.pc)?;
        let save = self.code.clone();
        let top_line = self.pc;
        let mut end_line = save.jump().unwrap_or(0);
        if save.op() == If {
            end_line = self.endline_of_if(self.pc)?;
        }

        match save.op() {
            If => {
                if self.get_expression_between(Some(If), None)? != 0.0 {
                    self.pc += 1;
                    self.block()?;
                    self.pc = end_line + 1;
                    return Ok(());
                }
                self.pc = jump_of(&save)?;
                while self.prog.leading(self.pc)? == Elif {
                    let sv = self.first_code(self.pc)?;
                    self.code = self.next_code()?;
                    if self.get_expression()? != 0.0 {
                        self.pc += 1;
                        self.block()?;
                        self.pc = end_line + 1;
                        return Ok(());
                    }
                    self.pc = jump_of(&sv)?;
                }
                if self.prog.leading(self.pc)? == Else {
                    self.pc += 1;
                    self.block()?;
                    self.pc = end_line + 1;
                    return Ok(());
                }
                self.pc += 1;
            }

            While => {
                loop {
                    self.tick()?;
                    if self.get_expression_between(Some(While), None)? == 0.0 {
                        break;
                    }
                    self.pc += 1;
                    self.block()?;
                    if self.break_flg || self.return_flg || self.exit_flg {
                        self.break_flg = false;
                        break;
                    }
                    self.pc = top_line;
                    self.code = self.first_code(self.pc)?;
                }
                self.pc = end_line + 1;
            }

            For => {
                let save_var = self.next_code()?;
                let var_adrs = self.get_mem_adrs(&save_var)?;

                self.expression_between(Some(Assign), None)?;
                self.set_dt_typ(&save_var)?;
                let init = self.stk.pop()?;
                self.mem.set(var_adrs, init);

                let end_dt = self.get_expression_between(Some(To), None)?;
                let step_dt = if self.code.op() == Step {
                    self.get_expression_between(Some(Step), None)?
                } else {
                    1.0
                };
                loop {
                    self.tick()?;
                    let value = self.mem.get(var_adrs);
                    if step_dt >= 0.0 {
                        if value > end_dt {
                            break;
                        }
                    } else if value < end_dt {
                        break;
                    }
                    self.pc += 1;
                    self.block()?;
                    if self.break_flg || self.return_flg || self.exit_flg {
                        self.break_flg = false;
                        break;
                    }
                    self.mem.add(var_adrs, step_dt);
                    self.pc = top_line;
                }
                self.pc = end_line + 1;
            }

            Fcall => {
                let fnc_nbr = match &save {
                    Code::Fcall(n) => *n,
                    _ => unreachable!(),
                };
                self.fnc_call(fnc_nbr)?;
                self.stk.pop()?; // statement position, result discarded
                self.pc += 1;
            }

            Func => {
                // declarations execute only when called
                self.pc = end_line + 1;
            }

            Print | Println => {
                self.sys_fnc_exec(save.op())?;
                self.pc += 1;
            }

            Gvar | Lvar => {
                let var_adrs = self.get_mem_adrs(&save)?;
                self.expression_between(Some(Assign), None)?;
                self.set_dt_typ(&save)?;
                let value = self.stk.pop()?;
                self.mem.set(var_adrs, value);
                self.pc += 1;
            }

            Return => {
                let mut value = self.ret_val;
                self.code = self.next_code()?;
                if self.code.op() != Question && self.code.op() != Eol {
                    value = self.get_expression()?;
                }
                if self.post_if()? {
                    self.return_flg = true;
                    self.ret_val = value;
                } else {
                    self.pc += 1;
                }
            }

            Break => {
                self.code = self.next_code()?;
                if self.post_if()? {
                    self.break_flg = true;
                } else {
                    self.pc += 1;
                }
            }

            Exit => {
                self.code = self.next_code()?;
                self.exit_flg = true;
            }

            Option | Var | Eol => {
                self.pc += 1;
            }

            _ => {
                let text = self.code_text(&save);
                return Err(error!("incorrect statement '{}'", text));
            }
        }
        Ok(())
    }

    /// Execute statements up to the end of the current block.
    fn block(&mut self) -> Result<()> {
        use Opcode::*;
        while !self.break_flg && !self.return_flg && !self.exit_flg {
            if self.pc > self.max_line {
                break;
            }
            match self.prog.leading(self.pc)? {
                Elif | Else | End => break,
                _ => self.statement()?,
            }
        }
        Ok(())
    }

    // *** Expressions

    fn get_expression(&mut self) -> Result<f64> {
        self.expression()?;
        self.stk.pop()
    }

    fn get_expression_between(
        &mut self,
        before: Option<Opcode>,
        after: Option<Opcode>,
    ) -> Result<f64> {
        self.expression_between(before, after)?;
        self.stk.pop()
    }

    /// Expression with expected codes on either side, leaving its value
    /// on the operand stack.
    fn expression_between(&mut self, before: Option<Opcode>, after: Option<Opcode>) -> Result<()> {
        if let Some(op) = before {
            self.code = self.chk_next_code(op)?;
        }
        self.expression()?;
        if let Some(op) = after {
            self.code = self.chk_next_code(op)?;
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<()> {
        self.term(1)
    }

    /// Precedence climbing; `n` is the binding strength, factors at 7.
    fn term(&mut self, n: usize) -> Result<()> {
        if n == 7 {
            return self.factor();
        }
        self.term(n + 1)?;
        while op_order(self.code.op()) == n {
            let op = self.code.op();
            self.code = self.next_code()?;
            self.term(n + 1)?;
            if self.checking {
                self.stk.pop()?;
                self.stk.pop()?;
                self.stk.push(1.0)?;
            } else {
                self.binary_expr(op)?;
            }
        }
        Ok(())
    }

    fn factor(&mut self) -> Result<()> {
        use Opcode::*;
        let kd = self.code.op();

        if self.checking {
            match kd {
                Not | Sub | Add => {
                    self.code = self.next_code()?;
                    self.factor()?;
                    self.stk.pop()?;
                    self.stk.push(1.0)?;
                }
                Lparen => self.expression_between(Some(Lparen), Some(Rparen))?,
                Number => {
                    self.stk.push(1.0)?;
                    self.code = self.next_code()?;
                }
                Gvar | Lvar => {
                    let save = self.code.clone();
                    self.get_mem_adrs(&save)?;
                    self.stk.push(1.0)?;
                }
                Toint | Input => self.sys_fnc_chk(kd)?,
                Fcall => {
                    let fnc_nbr = match &self.code {
                        Code::Fcall(n) => *n,
                        _ => unreachable!(),
                    };
                    self.fnc_call_chk(fnc_nbr)?;
                }
                Eol => return Err(error!("the expression is incomplete")),
                _ => {
                    let text = self.code_text(&self.code);
                    return Err(error!("expression error at '{}'", text));
                }
            }
            return Ok(());
        }

        match kd {
            Not | Sub | Add => {
                self.code = self.next_code()?;
                self.factor()?;
                if kd == Not {
                    let value = self.stk.pop()?;
                    self.stk.push(bool_val(value == 0.0))?;
                }
                if kd == Sub {
                    let value = self.stk.pop()?;
                    self.stk.push(-value)?;
                }
                // unary plus needs no work
            }
            Lparen => self.expression_between(Some(Lparen), Some(Rparen))?,
            Number => {
                let value = match &self.code {
                    Code::Number(value) => *value,
                    _ => unreachable!(),
                };
                self.stk.push(value)?;
                self.code = self.next_code()?;
            }
            Gvar | Lvar => {
                let save = self.code.clone();
                self.chk_dt_typ(&save)?;
                let adrs = self.get_mem_adrs(&save)?;
                let value = self.mem.get(adrs);
                self.stk.push(value)?;
            }
            Toint | Input => self.sys_fnc_exec(kd)?,
            Fcall => {
                let fnc_nbr = match &self.code {
                    Code::Fcall(n) => *n,
                    _ => unreachable!(),
                };
                self.fnc_call(fnc_nbr)?;
            }
            Eol => return Err(error!("the expression is incomplete")),
            _ => {
                let text = self.code_text(&self.code);
                return Err(error!("expression error at '{}'", text));
            }
        }
        Ok(())
    }

    fn binary_expr(&mut self, op: Opcode) -> Result<()> {
        use Opcode::*;
        let (d1, d2) = self.stk.pop_2()?;
        if (op == Div || op == Mod || op == IntDiv) && d2 == 0.0 {
            return Err(error!("division by zero"));
        }
        let d = match op {
            Add => d1 + d2,
            Sub => d1 - d2,
            Mul => d1 * d2,
            Div => d1 / d2,
            // integer operations truncate both sides through i64
            Mod => match (d1 as i64).checked_rem(d2 as i64) {
                Some(v) => v as f64,
                None => return Err(error!("division by zero")),
            },
            IntDiv => match (d1 as i64).checked_div(d2 as i64) {
                Some(v) => v as f64,
                None => return Err(error!("division by zero")),
            },
            Lt => bool_val(d1 < d2),
            LtEq => bool_val(d1 <= d2),
            Gt => bool_val(d1 > d2),
            GtEq => bool_val(d1 >= d2),
            Eq => bool_val(d1 == d2),
            NotEq => bool_val(d1 != d2),
            // both sides were already evaluated, there is no short circuit
            And => bool_val(d1 != 0.0 && d2 != 0.0),
            Or => bool_val(d1 != 0.0 || d2 != 0.0),
            _ => return Err(error!("incorrect value '{}'", op)),
        };
        self.stk.push(d)
    }

    /// `? expr` guard after break/return. No guard means taking effect
    /// unconditionally.
    fn post_if(&mut self) -> Result<bool> {
        if self.code.op() == Opcode::Eol {
            return Ok(true);
        }
        Ok(self.get_expression_between(Some(Opcode::Question), None)? != 0.0)
    }

    // *** Function calls

    fn fnc_call_chk(&mut self, fnc_nbr: usize) -> Result<()> {
        let mut arg_ct = 0;
        self.code = self.next_code()?;
        self.code = self.chk_next_code(Opcode::Lparen)?;
        if self.code.op() != Opcode::Rparen {
            loop {
                self.get_expression()?;
                arg_ct += 1;
                if self.code.op() != Opcode::Comma {
                    break;
                }
                self.code = self.next_code()?;
            }
        }
        self.code = self.chk_next_code(Opcode::Rparen)?;
        let entry = self.prog.tbl.global(fnc_nbr);
        if arg_ct != entry.args {
            return Err(error!(
                "the number of arguments for '{}' is wrong: expected {}, found {}",
                entry.name, entry.args, arg_ct
            ));
        }
        self.stk.push(1.0)
    }

    fn fnc_call(&mut self, fnc_nbr: usize) -> Result<()> {
        self.next_code()?; // (
        self.code = self.next_code()?;
        let mut arg_ct = 0;
        if self.code.op() != Opcode::Rparen {
            loop {
                self.expression()?;
                arg_ct += 1;
                if self.code.op() != Opcode::Comma {
                    break;
                }
                self.code = self.next_code()?;
            }
        }
        self.code = self.next_code()?; // )

        // reverse the stack order so the callee pops its parameters in
        // declaration order
        let mut args = Vec::with_capacity(arg_ct);
        for _ in 0..arg_ct {
            args.push(self.stk.pop()?);
        }
        for value in args {
            self.stk.push(value)?;
        }
        self.fnc_exec(fnc_nbr)
    }

    fn fnc_exec(&mut self, fnc_nbr: usize) -> Result<()> {
        self.frames.push(Frame {
            pc: self.pc,
            base: self.base,
            sp: self.sp,
            cur: self.cur.clone(),
            code: self.code.clone(),
        })?;
        self.pc = self.prog.tbl.global(fnc_nbr).addr;
        self.base = self.sp;
        self.sp += self.prog.tbl.global(fnc_nbr).frame;
        self.mem.auto_resize(self.sp);
        self.ret_val = 1.0;

        self.code = self.first_code(self.pc)?; // func
        self.next_code()?; // (
        self.code = self.next_code()?;
        if self.code.op() != Opcode::Rparen {
            loop {
                let param = self.code.clone();
                self.set_dt_typ(&param)?;
                let adrs = self.get_mem_adrs(&param)?;
                let value = self.stk.pop()?;
                self.mem.set(adrs, value);
                if self.code.op() != Opcode::Comma {
                    break;
                }
                self.code = self.next_code()?;
            }
        }
        self.code = self.next_code()?;

        self.pc += 1;
        self.block()?;
        self.return_flg = false;

        let frame = self.frames.pop()?;
        self.pc = frame.pc;
        self.base = frame.base;
        self.sp = frame.sp;
        self.cur = frame.cur;
        self.code = frame.code;
        self.stk.push(self.ret_val)
    }

    // *** Built-in functions

    fn sys_fnc_chk(&mut self, kd: Opcode) -> Result<()> {
        use Opcode::*;
        match kd {
            Toint => {
                self.code = self.next_code()?;
                self.get_expression_between(Some(Lparen), Some(Rparen))?;
                self.stk.push(1.0)?;
            }
            Input => {
                self.code = self.next_code()?;
                self.code = self.chk_next_code(Lparen)?;
                self.code = self.chk_next_code(Rparen)?;
                self.stk.push(1.0)?;
            }
            Print | Println => {
                loop {
                    self.code = self.next_code()?;
                    if self.code.op() == Str {
                        self.code = self.next_code()?;
                    } else {
                        self.get_expression()?;
                    }
                    if self.code.op() != Comma {
                        break;
                    }
                }
                self.chk_eol()?;
            }
            _ => unreachable!("not a built-in: {:?}", kd),
        }
        Ok(())
    }

    fn sys_fnc_exec(&mut self, kd: Opcode) -> Result<()> {
        use Opcode::*;
        match kd {
            Toint => {
                self.code = self.next_code()?;
                let value = self.get_expression_between(Some(Lparen), Some(Rparen))?;
                self.stk.push((value as i64) as f64)?;
            }
            Input => {
                self.next_code()?; // (
                self.next_code()?; // )
                self.code = self.next_code()?;
                let line = self.console.input();
                let value = line.trim().parse::<f64>().unwrap_or(0.0);
                self.stk.push(value)?;
            }
            Print | Println => {
                loop {
                    self.code = self.next_code()?;
                    let text = match &self.code {
                        Code::Str(s) => Some(s.to_string()),
                        _ => None,
                    };
                    match text {
                        Some(text) => {
                            self.console.print(&text);
                            self.code = self.next_code()?;
                        }
                        None => {
                            let value = self.get_expression()?;
                            // an exit inside an argument suppresses output
                            if !self.exit_flg {
                                self.console.print(&fmt_dbl(value));
                            }
                        }
                    }
                    if self.code.op() != Comma {
                        break;
                    }
                }
                if kd == Println {
                    self.console.print("\n");
                }
            }
            _ => unreachable!("not a built-in: {:?}", kd),
        }
        Ok(())
    }

    // *** Variable addressing and type binding

    /// Address of a scalar or of one array element, consuming the
    /// subscript expression when the symbol is an array.
    fn get_mem_adrs(&mut self, cd: &Code) -> Result<usize> {
        let adr = self.get_top_adrs(cd)?;
        let len = self.prog.tbl.sym(cd).ary_len;
        self.code = self.next_code()?;
        if len == 0 {
            return Ok(adr);
        }
        let d = self.get_expression_between(Some(Opcode::Lbracket), Some(Opcode::Rbracket))?;
        if d != d.trunc() {
            return Err(error!(
                "the array index must be an integer, not {}",
                fmt_dbl(d)
            ));
        }
        if self.checking {
            return Ok(adr);
        }
        let index = d as i64;
        if index < 0 || index >= len as i64 {
            return Err(error!(
                "the index {} is outside of the valid range 0-{}",
                index,
                len - 1
            ));
        }
        Ok(adr + index as usize)
    }

    /// Start address of a variable; locals offset from the current
    /// frame's base.
    fn get_top_adrs(&self, cd: &Code) -> Result<usize> {
        match cd {
            Code::Gvar(_) => Ok(self.prog.tbl.sym(cd).addr),
            Code::Lvar(_) => Ok(self.prog.tbl.sym(cd).addr + self.base),
            _ => Err(error!(
                "a variable name is required before '{}'",
                self.code_text(cd)
            )),
        }
    }

    /// First assignment binds a variable to numeric and zero-fills its
    /// whole array extent.
    fn set_dt_typ(&mut self, cd: &Code) -> Result<()> {
        let adrs = self.get_top_adrs(cd)?;
        {
            let sym = self.prog.tbl.sym_mut(cd);
            if sym.ty != DataType::None {
                return Ok(());
            }
            sym.ty = DataType::Dbl;
        }
        let len = self.prog.tbl.sym(cd).ary_len;
        for n in 0..len {
            self.mem.set(adrs + n, 0.0);
        }
        Ok(())
    }

    fn chk_dt_typ(&self, cd: &Code) -> Result<()> {
        if self.prog.tbl.sym(cd).ty == DataType::None {
            return Err(error!(
                "the uninitialized variable '{}' was used",
                self.prog.tbl.sym(cd).name
            ));
        }
        Ok(())
    }

    // *** Decoding

    fn first_code(&mut self, line: usize) -> Result<Code> {
        self.cur = Cursor { line, pos: 0 };
        self.next_code()
    }

    fn next_code(&mut self) -> Result<Code> {
        let (code, pos) = self.prog.decode(self.cur.line, self.cur.pos)?;
        self.cur.pos = pos;
        Ok(code)
    }

    /// Advance past the current code only if it matches.
    fn chk_next_code(&mut self, expected: Opcode) -> Result<Code> {
        if self.code.op() != expected {
            let found = self.code_text(&self.code);
            return Err(if expected == Opcode::Eol {
                error!("unexpected '{}'", found)
            } else if self.code.op() == Opcode::Eol {
                error!("'{}' is required", expected)
            } else {
                error!("'{}' is required before '{}'", expected, found)
            });
        }
        self.next_code()
    }

    fn chk_eol(&mut self) -> Result<()> {
        if self.code.op() != Opcode::Eol {
            let found = self.code_text(&self.code);
            return Err(error!("unexpected '{}'", found));
        }
        Ok(())
    }

    /// Follow the jump chain of an if construct to its end line.
    fn endline_of_if(&self, line: usize) -> Result<usize> {
        use Opcode::*;
        let mut line = line;
        loop {
            let (code, _) = self.prog.decode(line, 0)?;
            match code.op() {
                If | Elif | Else => line = jump_of(&code)?,
                End => return Ok(line),
                _ => return Err(error!("the internal code is incorrect")),
            }
        }
    }

    /// Source-ish spelling of a code, for error messages.
    fn code_text(&self, cd: &Code) -> String {
        match cd {
            Code::Gvar(_) | Code::Lvar(_) | Code::Fcall(_) => self.prog.tbl.sym(cd).name.clone(),
            Code::Number(value) => fmt_dbl(*value),
            Code::Str(s) => format!("\"{}\"", s),
            cd => cd.op().to_string(),
        }
    }
}

fn jump_of(code: &Code) -> Result<usize> {
    match code.jump() {
        Some(line) => Ok(line),
        None => Err(error!("the internal code is incorrect")),
    }
}

fn op_order(op: Opcode) -> usize {
    use Opcode::*;
    match op {
        Mul | Div | Mod | IntDiv => 6,
        Add | Sub => 5,
        Lt | LtEq | Gt | GtEq => 4,
        Eq | NotEq => 3,
        And => 2,
        Or => 1,
        _ => 0,
    }
}

fn bool_val(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

fn fmt_dbl(value: f64) -> String {
    format!("{}", value)
}
