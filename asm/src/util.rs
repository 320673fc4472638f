use color_print::{ceprintln, cformat};

use crate::{
    layout::Layout,
    parser::{Arg, Imm, Line, Stmt},
};

fn hex_word(bin: u32) -> String {
    format!(
        "{:02X} {:02X} {:02X} {:02X}",
        (bin >> 24) & 0xFF,
        (bin >> 16) & 0xFF,
        (bin >> 8) & 0xFF,
        bin & 0xFF
    )
}

/// One listing row per cell: address, encoded word and the source line.
pub fn listing(source: &str, lines: &[Line], layout: &Layout) -> Vec<String> {
    let mut rows = vec![];
    for (line, raw) in lines.iter().zip(source.lines()) {
        let labels = line
            .labels
            .iter()
            .map(|name| cformat!("<g>{}:</>", name))
            .collect::<Vec<_>>()
            .join(" ");
        let addr = layout.addr_of(line.number);
        let cells: Vec<Option<u32>> = match (&line.stmt, addr) {
            (Some(Stmt::Code(code)), Some(addr)) => {
                vec![code.resolve(addr, &layout.labels).ok().map(|i| i.to_bin())]
            }
            (Some(Stmt::Word(items)), Some(_)) => items
                .iter()
                .map(|imm| imm.resolve(&layout.labels).ok())
                .collect(),
            _ => vec![],
        };
        let source = match &line.stmt {
            Some(Stmt::Code(code)) => {
                let target = match &code.arg {
                    Arg::Imm(Imm::Ident(name)) | Arg::Addr(_, Imm::Ident(name)) => {
                        match layout.labels.get_val(name) {
                            Some(addr) => cformat!(" <g>; {} = 0x{:04X}</>", name, addr),
                            None => cformat!(" <r,u>; {} undefined</>", name),
                        }
                    }
                    _ => String::new(),
                };
                format!("{} {}{}", labels, code.cformat(), target)
            }
            _ => format!("{} {}", labels, raw.trim()),
        };

        if cells.is_empty() {
            rows.push(format!("{:19}| {:>4}: {}", "", line.number, source.trim()));
            continue;
        }
        for (offset, cell) in cells.iter().enumerate() {
            let pc = addr.map(|a| a as usize + offset).unwrap_or(0);
            let bin = match cell {
                Some(bin) => hex_word(*bin),
                None => cformat!("<r,s>!! !! !! !!</>"),
            };
            if offset == 0 {
                rows.push(format!("[{:04X}] {} | {:>4}: {}", pc, bin, line.number, source.trim()));
            } else {
                rows.push(format!("[{:04X}] {} |", pc, bin));
            }
        }
    }
    rows
}

pub fn print_dump(source: &str, lines: &[Line], layout: &Layout) {
    ceprintln!("<s>-------------------+-----------------------------------------------------</>");
    for row in listing(source, lines, layout) {
        eprintln!("{}", row);
    }
    ceprintln!("<s>-------------------+-----------------------------------------------------</>");
}
