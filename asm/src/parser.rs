use arch::{
    op::{Mode, Opcode, OperandKind},
    Addr, Port, Word,
};
use color_print::cformat;
use std::num::ParseIntError;

use crate::{error::Error, label::Labels};

// ----------------------------------------------------------------------------
// Line

/// One source line after comment stripping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,
    pub labels: Vec<String>,
    pub stmt: Option<Stmt>,
}

impl Line {
    pub fn parse(number: usize, raw: &str) -> Result<Line, Error> {
        let mut rest = strip_comment(raw).trim();
        let mut labels = vec![];

        // `a: b: LOAD x`
        while let Some((head, tail)) = rest.split_once(':') {
            let name = head.trim();
            if !is_ident(name) {
                return Err(Error::SyntaxError(format!("invalid label `{name}`")));
            }
            labels.push(name.to_string());
            rest = tail.trim();
        }

        let stmt = Stmt::parse(rest)?;
        Ok(Line {
            number,
            labels,
            stmt,
        })
    }
}

fn strip_comment(raw: &str) -> &str {
    let end = [raw.find(';'), raw.find("//")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(raw.len());
    &raw[..end]
}

pub fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(head) if head.is_ascii_alphabetic() || head == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Parse every line of `source`, collecting all errors.
pub fn parse(source: &str) -> Result<Vec<Line>, Vec<crate::error::LineError>> {
    let mut lines = vec![];
    let mut errors = vec![];
    for (idx, raw) in source.lines().enumerate() {
        match Line::parse(idx + 1, raw) {
            Ok(line) => lines.push(line),
            Err(err) => errors.push(err.at(idx + 1)),
        }
    }
    if errors.is_empty() {
        Ok(lines)
    } else {
        Err(errors)
    }
}

// ----------------------------------------------------------------------------
// Statement

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Code(Code),
    Org(Addr),
    Word(Vec<Imm>),
}

impl Stmt {
    fn parse(text: &str) -> Result<Option<Stmt>, Error> {
        let Some((head, args)) = split_args(text) else {
            return Ok(None);
        };
        match head.to_ascii_uppercase().as_str() {
            "ORG" => {
                let arg = single(head, &args)?;
                let addr = parse_with_prefix(arg)
                    .ok()
                    .and_then(|v| Addr::try_from(v).ok())
                    .ok_or_else(|| Error::ParseArgument(arg.to_string(), "address".into()))?;
                Ok(Some(Stmt::Org(addr)))
            }
            "WORD" => {
                if args.is_empty() {
                    return Err(Error::MissingArgument(head.to_string()));
                }
                let items = args
                    .iter()
                    .map(|arg| {
                        Imm::parse(arg)
                            .ok_or_else(|| Error::ParseArgument(arg.to_string(), "word".into()))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Some(Stmt::Word(items)))
            }
            _ => Ok(Some(Stmt::Code(Code::parse(head, &args)?))),
        }
    }

    /// Cells occupied in memory.
    pub fn size(&self) -> usize {
        match self {
            Stmt::Code(_) => 1,
            Stmt::Org(_) => 0,
            Stmt::Word(items) => items.len(),
        }
    }
}

/// `OP a, b c` -> (`OP`, [`a`, `b`, `c`])
fn split_args(text: &str) -> Option<(&str, Vec<&str>)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (head, tail) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let args = tail
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    Some((head, args))
}

fn single<'a>(head: &str, args: &[&'a str]) -> Result<&'a str, Error> {
    match args {
        [] => Err(Error::MissingArgument(head.to_string())),
        [arg] => Ok(arg),
        [_, extra, ..] => Err(Error::ExtraArgument(extra.to_string())),
    }
}

// ----------------------------------------------------------------------------
// Operation

/// Operand as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    None,
    Port(Port),
    Imm(Imm),
    /// Absolute target address in `Absolute`, `Relative` or `Indirect` mode.
    Addr(Mode, Imm),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    pub opcode: Opcode,
    pub arg: Arg,
}

impl Code {
    fn parse(op: &str, args: &[&str]) -> Result<Code, Error> {
        // Get the single argument and parse it with `$parse`, reporting `$what`
        // Example: arg!(parse_port, "port") -> Port
        macro_rules! arg {
            ($parse:expr, $what:expr) => {{
                let arg = single(op, args)?;
                $parse(arg).ok_or_else(|| Error::ParseArgument(arg.to_string(), $what.to_string()))?
            }};
        }

        let upper = op.to_ascii_uppercase();
        let immediate = match upper.as_str() {
            "LOADI" => Some(Opcode::LOAD),
            "ADDI" => Some(Opcode::ADD),
            "ANDI" => Some(Opcode::AND),
            "CMPI" => Some(Opcode::CMP),
            _ => None,
        };
        if let Some(opcode) = immediate {
            let imm = arg!(parse_imm16, "16-bit immediate");
            return Ok(Code {
                opcode,
                arg: Arg::Imm(imm),
            });
        }

        let opcode = Opcode::parse(op).map_err(|_| Error::UnknownOperation(op.to_string()))?;
        let arg = match opcode.operand_kind() {
            OperandKind::None => match args.first() {
                None => Arg::None,
                Some(extra) => return Err(Error::ExtraArgument(extra.to_string())),
            },
            OperandKind::Port => Arg::Port(arg!(parse_port, "port")),
            OperandKind::Address | OperandKind::Value => {
                let (mode, imm) = arg!(parse_address, "address");
                Arg::Addr(mode, imm)
            }
        };
        Ok(Code { opcode, arg })
    }

    pub fn mode(&self) -> Mode {
        match &self.arg {
            Arg::None => Mode::Implied,
            Arg::Port(_) | Arg::Imm(_) => Mode::Immediate,
            Arg::Addr(mode, _) => *mode,
        }
    }

    pub fn cformat(&self) -> String {
        let arg = match &self.arg {
            Arg::None => String::new(),
            Arg::Port(port) => cformat!("<y>{}</>", port),
            Arg::Imm(imm) => format!("#{}", imm.cfmt()),
            Arg::Addr(Mode::Absolute, imm) => format!("!{}", imm.cfmt()),
            Arg::Addr(Mode::Indirect, imm) => format!("({})", imm.cfmt()),
            Arg::Addr(_, imm) => imm.cfmt(),
        };
        cformat!("<red>{:<6}</>{}", self.opcode, arg)
    }
}

fn parse_port(s: &str) -> Option<Port> {
    parse_with_prefix(s).ok().and_then(|v| Port::try_from(v).ok())
}

fn parse_imm16(s: &str) -> Option<Imm> {
    Imm::parse(s).filter(|imm| match imm {
        Imm::Literal(v) => *v <= 0xFFFF,
        Imm::Ident(_) => true,
    })
}

/// `!x` absolute, `(x)` indirect, bare `x` relative.
fn parse_address(s: &str) -> Option<(Mode, Imm)> {
    let (mode, inner) = if let Some(inner) = s.strip_prefix('!') {
        (Mode::Absolute, inner)
    } else if let Some(inner) = s.strip_prefix('(') {
        (Mode::Indirect, inner.strip_suffix(')')?)
    } else {
        (Mode::Relative, s)
    };
    parse_imm16(inner).map(|imm| (mode, imm))
}

// ----------------------------------------------------------------------------
// Immediate

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Imm {
    Literal(Word),
    Ident(String),
}

impl Imm {
    fn parse(s: &str) -> Option<Imm> {
        if s.starts_with(|c: char| c.is_ascii_digit()) {
            parse_with_prefix(s).ok().map(Imm::Literal)
        } else if is_ident(s) {
            Some(Imm::Ident(s.to_string()))
        } else {
            None
        }
    }

    pub fn resolve(&self, labels: &Labels) -> Result<Word, Error> {
        match self {
            Imm::Literal(v) => Ok(*v),
            Imm::Ident(s) => match labels.get_val(s) {
                Some(v) => Ok(v as Word),
                None => Err(Error::UndefinedLabel(s.clone())),
            },
        }
    }

    fn cfmt(&self) -> String {
        match self {
            Imm::Ident(s) => cformat!("<g>{}</>", s),
            Imm::Literal(v) => cformat!("<y>0x{:0>4X}</>", v),
        }
    }
}

pub fn parse_with_prefix(s: &str) -> Result<Word, ParseIntError> {
    let s = s.replace('_', "");
    let (radix, digits) = match s.get(..2) {
        Some("0b") => (2, &s[2..]),
        Some("0o") => (8, &s[2..]),
        Some("0x") => (16, &s[2..]),
        _ => (10, s.as_str()),
    };
    Word::from_str_radix(digits, radix)
}
