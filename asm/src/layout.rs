use arch::{
    inst::Inst,
    op::Mode,
    program::{Item, Program, Section},
    Addr, MAX_MEMORY_SIZE,
};
use std::collections::HashMap;
use tracing::debug;

use crate::{
    error::{Error, LineError},
    label::{Labels, Symbol},
    parser::{Arg, Code, Line, Stmt},
};

/// Lines that emit cells, grouped by the `ORG` that placed them.
#[derive(Debug)]
pub struct Block<'a> {
    pub start: Addr,
    pub lines: Vec<&'a Line>,
}

/// Result of the first pass: every label bound, every cell placed.
#[derive(Debug)]
pub struct Layout<'a> {
    pub labels: Labels,
    pub blocks: Vec<Block<'a>>,
    addrs: HashMap<usize, Addr>,
}

fn bind(
    labels: &mut Labels,
    pending: &mut Vec<(&str, usize)>,
    cursor: usize,
    errors: &mut Vec<LineError>,
) {
    for (name, line) in pending.drain(..) {
        let Ok(addr) = Addr::try_from(cursor) else {
            errors.push(Error::AddressOverflow(cursor).at(line));
            continue;
        };
        if let Err(prev) = labels.define(name, Symbol { line, addr }) {
            errors.push(Error::RedefinedLabel(name.to_string(), prev.line).at(line));
        }
    }
}

impl<'a> Layout<'a> {
    pub fn build(lines: &'a [Line]) -> Result<Layout<'a>, Vec<LineError>> {
        let mut labels = Labels::new();
        let mut blocks = vec![Block {
            start: 0,
            lines: vec![],
        }];
        let mut addrs = HashMap::new();
        let mut owner: HashMap<usize, usize> = HashMap::new();
        let mut pending: Vec<(&str, usize)> = vec![];
        let mut errors = vec![];
        let mut cursor: usize = 0;

        for line in lines {
            pending.extend(line.labels.iter().map(|name| (name.as_str(), line.number)));
            match &line.stmt {
                None => {}
                Some(Stmt::Org(addr)) => {
                    cursor = *addr as usize;
                    blocks.push(Block {
                        start: *addr,
                        lines: vec![],
                    });
                }
                Some(stmt) => {
                    bind(&mut labels, &mut pending, cursor, &mut errors);
                    let end = cursor + stmt.size();
                    if end > MAX_MEMORY_SIZE {
                        errors.push(Error::AddressOverflow(end - 1).at(line.number));
                        cursor = end;
                        continue;
                    }
                    for addr in cursor..end {
                        if let Some(prev) = owner.insert(addr, line.number) {
                            errors.push(Error::Overlap(addr, prev).at(line.number));
                            break;
                        }
                    }
                    addrs.insert(line.number, cursor as Addr);
                    if let Some(block) = blocks.last_mut() {
                        block.lines.push(line);
                    }
                    cursor = end;
                }
            }
        }
        // Trailing labels mark the end of the program.
        bind(&mut labels, &mut pending, cursor, &mut errors);

        if !errors.is_empty() {
            return Err(errors);
        }
        blocks.retain(|block| !block.lines.is_empty());
        debug!(
            labels = labels.len(),
            sections = blocks.len(),
            "pass 1 complete"
        );
        Ok(Layout {
            labels,
            blocks,
            addrs,
        })
    }

    /// Address of the first cell emitted by the given source line.
    pub fn addr_of(&self, line: usize) -> Option<Addr> {
        self.addrs.get(&line).copied()
    }

    /// Second pass: resolve labels and encode every cell.
    pub fn encode(&self) -> Result<Program, Vec<LineError>> {
        let mut sections = vec![];
        let mut errors = vec![];
        for block in &self.blocks {
            let mut section = Section::new(block.start);
            for line in &block.lines {
                let Some(addr) = self.addr_of(line.number) else {
                    continue;
                };
                match self.encode_line(line, addr) {
                    Ok(items) => section.items.extend(items),
                    Err(err) => errors.push(err.at(line.number)),
                }
            }
            sections.push(section);
        }
        if errors.is_empty() {
            Ok(Program::new(sections))
        } else {
            Err(errors)
        }
    }

    fn encode_line(&self, line: &Line, addr: Addr) -> Result<Vec<Item>, Error> {
        match &line.stmt {
            Some(Stmt::Code(code)) => Ok(vec![Item::Command(code.resolve(addr, &self.labels)?)]),
            Some(Stmt::Word(items)) => items
                .iter()
                .map(|imm| imm.resolve(&self.labels).map(Item::Data))
                .collect(),
            Some(Stmt::Org(_)) | None => Ok(vec![]),
        }
    }
}

impl Code {
    /// Encode the instruction placed at `addr`.
    pub fn resolve(&self, addr: Addr, labels: &Labels) -> Result<Inst, Error> {
        let operand = match &self.arg {
            Arg::None => 0,
            Arg::Port(port) => *port as u16,
            Arg::Imm(imm) => imm.resolve(labels)? as u16,
            Arg::Addr(Mode::Absolute, imm) => imm.resolve(labels)? as u16,
            // Relative and indirect operands are offsets from the next cell.
            Arg::Addr(_, imm) => (imm.resolve(labels)? as u16).wrapping_sub(addr.wrapping_add(1)),
        };
        debug_assert!(self.opcode.operand_kind().allows(self.mode()));
        Ok(Inst::new(self.opcode, self.mode(), operand))
    }
}
