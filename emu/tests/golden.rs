//! End-to-end fixtures: assemble `source`, compare the artifact, run it on
//! `input` and compare program output and the execution log.

use acemu::hooks::{serial::Serial, trace::Trace, Hook};
use acemu::io::IoController;
use acemu::Machine;
use arch::program::Program;
use arch::MEMORY_SIZE;
use pretty_assertions::assert_eq;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Golden {
    source: String,
    input: String,
    machine_code: String,
    output: String,
    out_log: String,
}

fn check(yaml: &str) {
    let golden: Golden = serde_yaml::from_str(yaml).unwrap();

    let program = match acasm::assemble(&golden.source) {
        Ok(program) => program,
        Err(errors) => panic!("Errors found: {:?}", errors),
    };
    let machine_code = program.to_json().unwrap();
    assert_eq!(machine_code, golden.machine_code);

    // The simulator only ever sees the serialized artifact.
    let program = Program::from_json(&machine_code).unwrap();
    let mut machine = Machine::new(
        MEMORY_SIZE,
        IoController::standard(golden.input.into_bytes()),
    );
    machine.load(&program).unwrap();

    let mut trace = Trace::new(Vec::new());
    let mut serial = Serial::new(Vec::new());
    let mut hooks: [&mut dyn Hook; 2] = [&mut trace, &mut serial];
    acemu::run(&mut machine, &mut hooks, None).unwrap();

    let output = String::from_utf8(serial.into_inner()).unwrap();
    assert_eq!(output, golden.output);
    assert_eq!(output.as_bytes(), machine.output());

    let log = String::from_utf8(trace.into_inner()).unwrap();
    assert_eq!(log, golden.out_log);
}

macro_rules! golden {
    ($($name:ident,)*) => {
        $(
            #[test]
            fn $name() {
                check(include_str!(concat!("golden/", stringify!($name), ".yml")));
            }
        )*
    };
}

golden! {
    echo,
    countdown,
    upper,
    shifts,
    input_exhausted,
    write_only,
    illegal_instruction,
}
