use arch::Addr;
use indexmap::IndexMap;

/// Where a label was defined and the address it is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Symbol {
    pub line: usize,
    pub addr: Addr,
}

/// Symbol table in definition order.
#[derive(Debug, Default)]
pub struct Labels {
    labels: IndexMap<String, Symbol>,
}

impl Labels {
    pub fn new() -> Self {
        Labels {
            labels: IndexMap::new(),
        }
    }

    /// Bind `name`. A second definition keeps the first and returns it.
    pub fn define(&mut self, name: &str, symbol: Symbol) -> Result<(), Symbol> {
        match self.labels.get(name) {
            Some(prev) => Err(*prev),
            None => {
                self.labels.insert(name.to_string(), symbol);
                Ok(())
            }
        }
    }

    pub fn get_val(&self, name: &str) -> Option<Addr> {
        self.labels.get(name).map(|symbol| symbol.addr)
    }

    pub(crate) fn len(&self) -> usize {
        self.labels.len()
    }
}

#[test]
fn test() {
    let mut labels = Labels::new();
    assert!(labels.define("start", Symbol { line: 1, addr: 0 }).is_ok());
    assert!(labels.define("Start", Symbol { line: 2, addr: 4 }).is_ok());
    assert_eq!(
        labels.define("start", Symbol { line: 9, addr: 7 }),
        Err(Symbol { line: 1, addr: 0 })
    );
    assert_eq!(labels.get_val("start"), Some(0));
    assert_eq!(labels.get_val("Start"), Some(4));
    assert_eq!(labels.get_val("end"), None);
    assert_eq!(labels.len(), 2);
}
