use super::code::{CodeBuf, Opcode};
use super::program::Program;
use super::table::{is_local_name, DataType, SymEntry, SymKind};
use super::{LINE_SIZE, MAX_LINES};
use crate::error;
use crate::lang::{Error, Lexer, Literal, Operator, Token, Word};

type Result<T> = std::result::Result<T, Error>;

/// Compile source lines into a program, fatally on the first malformed
/// construct. Pass 1 pre-registers function names so forward calls
/// resolve; pass 2 generates one internal-code line per source line.
pub fn compile(source: &[String]) -> Result<Program> {
    let mut compiler = Compiler::new(source);
    match compiler.run() {
        Ok(()) => Ok(compiler.prog),
        Err(error) => Err(error.or_line(compiler.src_line)),
    }
}

struct Compiler<'a> {
    source: &'a [String],
    /// Number of the source line currently being lexed, 1-based.
    src_line: usize,
    lexer: Lexer<'a>,
    token: Token,
    prog: Program,
    buf: CodeBuf,
    blk_nest: usize,
    loop_nest: usize,
    local_addr: usize,
    in_func: bool,
    explicit: bool,
    main_nbr: Option<usize>,
    /// Name and array backing size of the symbol being registered.
    name: String,
    ary_len: usize,
}

impl<'a> Compiler<'a> {
    fn new(source: &'a [String]) -> Compiler<'a> {
        Compiler {
            source,
            src_line: 0,
            lexer: Lexer::new(""),
            token: Token::Eof,
            prog: Program::new(),
            buf: CodeBuf::new(),
            blk_nest: 0,
            loop_nest: 0,
            local_addr: 0,
            in_func: false,
            explicit: false,
            main_nbr: None,
            name: String::new(),
            ary_len: 0,
        }
    }

    fn run(&mut self) -> Result<()> {
        self.register_functions()?;

        self.src_line = 0;
        self.push_line()?; // dummy line 0 keeps code and source aligned
        self.next_line_token()?;
        while self.token != Token::Eof {
            self.convert()?;
        }

        self.prog.start_pc = 1;
        if let Some(main_nbr) = self.main_nbr {
            // Top-level lines run first; a synthetic final line then
            // calls main and becomes the start line.
            self.prog.start_pc = self.prog.len();
            self.set_code_ref(Opcode::Fcall, main_nbr)?;
            self.set_code(Opcode::Lparen);
            self.set_code(Opcode::Rparen);
            self.push_line()?;
        }
        Ok(())
    }

    /// Pass 1: register every `func` name so forward calls resolve.
    fn register_functions(&mut self) -> Result<()> {
        self.src_line = 0;
        while self.next_line()? {
            self.next_token()?;
            if self.token == Token::Word(Word::Func) {
                self.next_token()?;
                self.set_name()?;
                self.enter(SymKind::Func)?;
            }
        }
        Ok(())
    }

    fn next_line(&mut self) -> Result<bool> {
        let source = self.source;
        if self.src_line >= source.len() {
            return Ok(false);
        }
        let line = &source[self.src_line];
        self.src_line += 1;
        if self.src_line > MAX_LINES {
            return Err(error!("the program is over {} lines long", MAX_LINES));
        }
        if line.chars().count() > LINE_SIZE {
            return Err(error!(
                "the line is over {} characters long",
                LINE_SIZE
            ));
        }
        self.lexer = Lexer::new(line);
        Ok(true)
    }

    fn next_token(&mut self) -> Result<()> {
        self.token = self.lexer.token()?;
        Ok(())
    }

    fn next_line_token(&mut self) -> Result<()> {
        if self.next_line()? {
            self.next_token()
        } else {
            self.token = Token::Eof;
            Ok(())
        }
    }

    /// Advance past the current token only if it matches.
    fn chk_next(&mut self, expected: Token) -> Result<()> {
        if self.token != expected {
            return Err(self.required(&expected));
        }
        self.next_token()
    }

    fn required(&self, expected: &Token) -> Error {
        if self.token == Token::Eol {
            error!("'{}' is required", expected)
        } else {
            error!("'{}' is required before '{}'", expected, self.token)
        }
    }

    /// One whole statement group, dispatched on the leading keyword.
    fn convert(&mut self) -> Result<()> {
        match &self.token {
            Token::Word(Word::Option) => self.option_set(),
            Token::Word(Word::Var) => self.var_decl(),
            Token::Word(Word::Func) => self.func_decl(),
            Token::Word(Word::While) | Token::Word(Word::For) => {
                self.loop_nest += 1;
                self.convert_block_set()?;
                self.set_code_end()?;
                self.loop_nest -= 1;
                Ok(())
            }
            Token::Word(Word::If) => {
                self.convert_block_set()?;
                while self.token == Token::Word(Word::Elif) {
                    self.convert_block_set()?;
                }
                if self.token == Token::Word(Word::Else) {
                    self.convert_block_set()?;
                }
                self.set_code_end()
            }
            Token::Word(Word::Break) => {
                if self.loop_nest == 0 {
                    return Err(error!("'break' is only allowed inside a loop"));
                }
                self.set_code(Opcode::Break);
                self.next_token()?;
                self.convert_rest()
            }
            Token::Word(Word::Return) => {
                if !self.in_func {
                    return Err(error!("'return' is only allowed inside a function"));
                }
                self.set_code(Opcode::Return);
                self.next_token()?;
                self.convert_rest()
            }
            Token::Word(Word::Exit) => {
                self.set_code(Opcode::Exit);
                self.next_token()?;
                self.convert_rest()
            }
            Token::Word(Word::Print) => {
                self.set_code(Opcode::Print);
                self.next_token()?;
                self.convert_rest()
            }
            Token::Word(Word::Println) => {
                self.set_code(Opcode::Println);
                self.next_token()?;
                self.convert_rest()
            }
            Token::Word(Word::End) => Err(error!("'end' without a block")),
            _ => self.convert_rest(),
        }
    }

    /// A block opener line, its block, and the back-patch of its end
    /// line.
    fn convert_block_set(&mut self) -> Result<()> {
        let op = match &self.token {
            Token::Word(Word::If) => Opcode::If,
            Token::Word(Word::Elif) => Opcode::Elif,
            Token::Word(Word::Else) => Opcode::Else,
            Token::Word(Word::While) => Opcode::While,
            Token::Word(Word::For) => Opcode::For,
            token => unreachable!("not a block opener: {}", token),
        };
        let patch_line = self.set_code_jump(op)?;
        self.next_token()?;
        self.convert_rest()?;
        self.convert_block()?;
        self.prog.patch_jump(patch_line, self.src_line)
    }

    fn convert_block(&mut self) -> Result<()> {
        self.blk_nest += 1;
        loop {
            match &self.token {
                Token::Word(Word::Elif) | Token::Word(Word::Else) | Token::Word(Word::End) => break,
                Token::Eof => break,
                _ => self.convert()?,
            }
        }
        self.blk_nest -= 1;
        Ok(())
    }

    /// The rest of the statement: names resolve to calls or variables,
    /// literals dedupe into the pools, everything else encodes as-is.
    fn convert_rest(&mut self) -> Result<()> {
        loop {
            match self.token.clone() {
                Token::Eol => break,
                Token::Word(word) => match word {
                    Word::To => {
                        self.set_code(Opcode::To);
                        self.next_token()?;
                    }
                    Word::Step => {
                        self.set_code(Opcode::Step);
                        self.next_token()?;
                    }
                    Word::Input => {
                        self.set_code(Opcode::Input);
                        self.next_token()?;
                    }
                    Word::Toint => {
                        self.set_code(Opcode::Toint);
                        self.next_token()?;
                    }
                    word => return Err(error!("incorrect statement '{}'", word)),
                },
                Token::Ident(_) => {
                    self.set_name()?;
                    let name = self.name.clone();
                    if let Some(n) = self.prog.tbl.search_func(&name) {
                        if name == "main" {
                            return Err(error!("the main function cannot be called"));
                        }
                        self.set_code_ref(Opcode::Fcall, n)?;
                        continue;
                    }
                    let n = match self.prog.tbl.search_var(&name, self.in_func)? {
                        Some(n) => n,
                        None => {
                            if self.explicit {
                                return Err(error!(
                                    "a variable declaration is required for '{}'",
                                    name
                                ));
                            }
                            self.enter(SymKind::Var)?
                        }
                    };
                    if is_local_name(&name, SymKind::Var, self.in_func) {
                        self.set_code_ref(Opcode::Lvar, n)?;
                    } else {
                        self.set_code_ref(Opcode::Gvar, n)?;
                    }
                    continue;
                }
                Token::Literal(Literal::Int(value)) | Token::Literal(Literal::Dec(value)) => {
                    let idx = self.prog.nbr_literal(value);
                    self.set_code_ref(Opcode::Number, idx)?;
                    self.next_token()?;
                }
                Token::Literal(Literal::Str(text)) => {
                    let idx = self.prog.str_literal(&text);
                    self.set_code_ref(Opcode::Str, idx)?;
                    self.next_token()?;
                }
                token => {
                    self.set_code(opcode_for(&token)?);
                    self.next_token()?;
                }
            }
        }
        self.push_line()?;
        self.next_line_token()
    }

    fn option_set(&mut self) -> Result<()> {
        self.set_code(Opcode::Option);
        self.next_token()?;
        match &self.token {
            Token::Literal(Literal::Str(s)) if s == "var" => self.explicit = true,
            token => return Err(error!("the option '{}' is not known", token)),
        }
        self.next_token()?;
        self.set_code_eol()
    }

    fn var_decl(&mut self) -> Result<()> {
        self.set_code(Opcode::Var);
        loop {
            self.next_token()?;
            self.var_name_chk()?;
            self.set_name()?;
            self.set_ary_len()?;
            self.enter(SymKind::Var)?;
            if self.token != Token::Comma {
                break;
            }
        }
        self.set_code_eol()
    }

    fn var_name_chk(&mut self) -> Result<()> {
        let name = match &self.token {
            Token::Ident(s) => s.clone(),
            token => return Err(error!("an identifier is required before '{}'", token)),
        };
        if self.in_func && name.starts_with('$') {
            return Err(error!(
                "'$' names cannot be declared inside a function: '{}'",
                name
            ));
        }
        if self.prog.tbl.search_var(&name, self.in_func)?.is_some() {
            return Err(error!("the identifier '{}' is already declared", name));
        }
        Ok(())
    }

    fn set_name(&mut self) -> Result<()> {
        match self.token.clone() {
            Token::Ident(s) => {
                self.name = s;
                self.ary_len = 0;
                self.next_token()
            }
            token => Err(error!("an identifier is required before '{}'", token)),
        }
    }

    fn set_ary_len(&mut self) -> Result<()> {
        self.ary_len = 0;
        if self.token != Token::LBracket {
            return Ok(());
        }
        self.next_token()?;
        let len = match self.token {
            Token::Literal(Literal::Int(value)) if value <= u16::max_value() as f64 => {
                value as usize
            }
            _ => {
                return Err(error!(
                    "the array length must be an integer constant before '{}'",
                    self.token
                ))
            }
        };
        // var a[5] stores 6 cells so indices 0 through 5 are all valid.
        self.ary_len = len + 1;
        self.next_token()?;
        self.chk_next(Token::RBracket)?;
        if self.token == Token::LBracket {
            return Err(error!("multi-dimensional arrays cannot be declared"));
        }
        Ok(())
    }

    fn func_decl(&mut self) -> Result<()> {
        if self.blk_nest > 0 {
            return Err(error!("the function definition must be at the top level"));
        }
        self.in_func = true;
        self.local_addr = 0;
        self.prog.tbl.set_local_start();
        let patch_line = self.set_code_jump(Opcode::Func)?;
        self.next_token()?;

        let name = match &self.token {
            Token::Ident(s) => s.clone(),
            token => return Err(error!("an identifier is required before '{}'", token)),
        };
        // Function names were registered in pass 1.
        let fnc_nbr = match self.prog.tbl.search_func(&name) {
            Some(n) => n,
            None => return Err(error!("the internal code is incorrect")),
        };
        self.prog.tbl.global_mut(fnc_nbr).ty = DataType::Dbl;

        self.next_token()?;
        self.chk_next(Token::LParen)?;
        self.set_code(Opcode::Lparen);
        if self.token != Token::RParen {
            loop {
                self.set_name()?;
                let n = self.enter(SymKind::Param)?;
                self.set_code_ref(Opcode::Lvar, n)?;
                self.prog.tbl.global_mut(fnc_nbr).args += 1;
                if self.token != Token::Comma {
                    break;
                }
                self.set_code(Opcode::Comma);
                self.next_token()?;
            }
        }
        self.chk_next(Token::RParen)?;
        self.set_code(Opcode::Rparen);
        self.set_code_eol()?;
        self.convert_block()?;

        self.prog.patch_jump(patch_line, self.src_line)?;
        self.set_code_end()?;
        self.prog.tbl.global_mut(fnc_nbr).frame = self.local_addr;

        if name == "main" {
            self.main_nbr = Some(fnc_nbr);
            if self.prog.tbl.global(fnc_nbr).args != 0 {
                return Err(error!("the main function cannot have parameters"));
            }
        }
        self.in_func = false;
        Ok(())
    }

    /// Register the pending name, assigning its arena address.
    fn enter(&mut self, kind: SymKind) -> Result<usize> {
        let name = self.name.clone();
        let is_local = is_local_name(&name, kind, self.in_func);
        let mem_size = if self.ary_len == 0 { 1 } else { self.ary_len };
        if kind != SymKind::Var && name.starts_with('$') {
            return Err(error!("'$' is only allowed in variable names: '{}'", name));
        }
        let duplicate = match kind {
            SymKind::Func => self.prog.tbl.search_global(&name),
            SymKind::Param => self.prog.tbl.search_local(&name),
            SymKind::Var => None,
        };
        if duplicate.is_some() {
            return Err(error!("the identifier '{}' is already declared", name));
        }
        let mut entry = SymEntry::new(name, kind);
        entry.ary_len = self.ary_len;
        if kind == SymKind::Func {
            entry.addr = self.src_line;
        } else if is_local {
            entry.addr = self.local_addr;
            self.local_addr += mem_size;
        } else {
            entry.addr = self.prog.tbl.alloc_global(mem_size);
        }
        if is_local {
            Ok(self.prog.tbl.push_local(entry))
        } else {
            Ok(self.prog.tbl.push_global(entry))
        }
    }

    fn set_code(&mut self, op: Opcode) {
        self.buf.emit(op);
    }

    fn set_code_ref(&mut self, op: Opcode, operand: usize) -> Result<()> {
        self.buf.emit_ref(op, operand)
    }

    /// Emit a block opener with an unresolved end line, returning the
    /// line to patch once the end is known.
    fn set_code_jump(&mut self, op: Opcode) -> Result<usize> {
        self.buf.emit_ref(op, 0)?;
        Ok(self.src_line)
    }

    fn set_code_end(&mut self) -> Result<()> {
        if self.token != Token::Word(Word::End) {
            return Err(self.required(&Token::Word(Word::End)));
        }
        self.set_code(Opcode::End);
        self.next_token()?;
        self.set_code_eol()
    }

    fn set_code_eol(&mut self) -> Result<()> {
        if self.token != Token::Eol {
            return Err(error!("unexpected '{}' at the end of the statement", self.token));
        }
        self.push_line()?;
        self.next_line_token()
    }

    fn push_line(&mut self) -> Result<()> {
        let line = self.buf.finish()?;
        self.prog.push_line(line);
        Ok(())
    }
}

fn opcode_for(token: &Token) -> Result<Opcode> {
    use Operator::*;
    let op = match token {
        Token::LParen => Opcode::Lparen,
        Token::RParen => Opcode::Rparen,
        Token::LBracket => Opcode::Lbracket,
        Token::RBracket => Opcode::Rbracket,
        Token::Comma => Opcode::Comma,
        Token::Question => Opcode::Question,
        Token::Assign => Opcode::Assign,
        Token::Operator(op) => match op {
            Multiply => Opcode::Mul,
            Divide => Opcode::Div,
            Modulus => Opcode::Mod,
            DivideInt => Opcode::IntDiv,
            Plus => Opcode::Add,
            Minus => Opcode::Sub,
            Less => Opcode::Lt,
            LessEqual => Opcode::LtEq,
            Greater => Opcode::Gt,
            GreaterEqual => Opcode::GtEq,
            Equal => Opcode::Eq,
            NotEqual => Opcode::NotEq,
            And => Opcode::And,
            Or => Opcode::Or,
            Not => Opcode::Not,
        },
        token => return Err(error!("incorrect statement '{}'", token)),
    };
    Ok(op)
}
