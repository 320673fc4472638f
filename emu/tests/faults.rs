use acemu::hooks::{trace::Trace, Hook};
use acemu::io::IoController;
use acemu::{Fault, Machine, Outcome, Status};
use arch::program::{Item, Program, ProgramError, Section};
use pretty_assertions::assert_eq;

fn boot(source: &str, input: &[u8], memory_size: usize) -> Machine {
    let program = match acasm::assemble(source) {
        Ok(program) => program,
        Err(errors) => panic!("Errors found: {:?}", errors),
    };
    let mut machine = Machine::new(memory_size, IoController::standard(input.to_vec()));
    machine.load(&program).unwrap();
    machine
}

fn run_logged(machine: &mut Machine, tmax: Option<u64>) -> (Outcome, String) {
    let mut trace = Trace::new(Vec::new());
    let mut hooks: [&mut dyn Hook; 1] = [&mut trace];
    let outcome = acemu::run(machine, &mut hooks, tmax).unwrap();
    (outcome, String::from_utf8(trace.into_inner()).unwrap())
}

#[test]
fn no_record_after_fault() {
    let mut machine = boot("LOADI 1\nSTORE !0x10\nHALT\n", b"", 16);
    let (outcome, log) = run_logged(&mut machine, None);
    let fault = Fault::AddressOutOfRange { pc: 1, addr: 0x10 };
    assert_eq!(
        outcome,
        Outcome::Faulted {
            ticks: 1,
            fault: fault.clone()
        }
    );
    assert_eq!(machine.status(), &Status::Faulted(fault));
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("[0001] 0001: FAULT"));
}

#[test]
fn running_off_the_end_of_memory() {
    let mut machine = boot("NOP\nNOP\n", b"", 2);
    let (outcome, log) = run_logged(&mut machine, None);
    assert_eq!(
        outcome,
        Outcome::Faulted {
            ticks: 2,
            fault: Fault::PcOutOfRange { pc: 2 }
        }
    );
    assert_eq!(
        log.lines().last(),
        Some("[0002] 0002: FAULT program counter is outside of memory")
    );
}

#[test]
fn output_keeps_execution_order() {
    let source = "\
        IN 0
        OUT 1
        IN 0
        OUT 0
        IN 0
        OUT 0
        LOADI 0x0A
        OUT 0
        HALT
";
    let mut machine = boot(source, b"ok", 64);
    let (outcome, _) = run_logged(&mut machine, None);
    assert_eq!(outcome, Outcome::Halted { ticks: 9 });
    assert_eq!(machine.output(), b"2\nok\n");
}

#[test]
fn halted_machine_stays_halted() {
    let mut machine = boot("HALT\n", b"", 4);
    assert!(machine.step().unwrap().is_some());
    assert_eq!(machine.step(), Ok(None));
    let (outcome, log) = run_logged(&mut machine, None);
    assert_eq!(outcome, Outcome::Halted { ticks: 0 });
    assert_eq!(log, "");
}

#[test]
fn load_rejects_overlap_and_oversize() {
    let mut machine = Machine::new(8, IoController::new());
    let overlapping = Program::new(vec![
        Section {
            start: 0,
            items: vec![Item::Data(1), Item::Data(2)],
        },
        Section {
            start: 1,
            items: vec![Item::Data(3)],
        },
    ]);
    assert!(matches!(
        machine.load(&overlapping),
        Err(ProgramError::Overlap(1))
    ));

    let oversized = Program::new(vec![Section {
        start: 7,
        items: vec![Item::Data(1), Item::Data(2)],
    }]);
    assert!(matches!(
        machine.load(&oversized),
        Err(ProgramError::DoesNotFit { start: 7, len: 2, .. })
    ));
    assert_eq!(machine.get(7), Some(0));
}

#[test]
fn artifact_must_be_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.json");
    let program = acasm::assemble("HALT\n").unwrap();
    let mut bytes = program.to_json().unwrap().into_bytes();
    let at = bytes.iter().position(|b| *b == b'H').unwrap();
    bytes[at] = 0xC3;
    std::fs::write(&path, &bytes).unwrap();
    assert!(matches!(
        acemu::load_program(&path),
        Err(acemu::LoadError::Program(ProgramError::Json(_)))
    ));
}

#[test]
fn artifact_version_is_checked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.json");
    std::fs::write(&path, r#"{ "version": 2, "sections": [] }"#).unwrap();
    assert!(matches!(
        acemu::load_program(&path),
        Err(acemu::LoadError::Program(ProgramError::Version { found: 2 }))
    ));
}
