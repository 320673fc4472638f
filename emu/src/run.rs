use std::io;
use tracing::{debug, info};

use crate::fault::Fault;
use crate::hooks::Hook;
use crate::model::Machine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Halted { ticks: u64 },
    Faulted { ticks: u64, fault: Fault },
}

/// Run `machine` until it halts or faults, handing every retired instruction
/// to each hook in order. With `tmax`, the run faults once that many
/// instructions have retired.
pub fn run(
    machine: &mut Machine,
    hooks: &mut [&mut dyn Hook],
    tmax: Option<u64>,
) -> io::Result<Outcome> {
    for hook in hooks.iter_mut() {
        hook.init(machine)?;
    }

    let mut tick: u64 = 0;
    let outcome = loop {
        let step = match tmax {
            Some(limit) if tick >= limit => Err(machine.abort(Fault::TickLimit {
                pc: machine.pc(),
                limit,
            })),
            _ => machine.step(),
        };
        match step {
            Ok(Some(retired)) => {
                for hook in hooks.iter_mut() {
                    hook.exec(tick, &retired, machine)?;
                }
                tick += 1;
            }
            Ok(None) => break Outcome::Halted { ticks: tick },
            Err(fault) => {
                debug!(tick, %fault, "run faulted");
                for hook in hooks.iter_mut() {
                    hook.fault(tick, &fault, machine)?;
                }
                break Outcome::Faulted { ticks: tick, fault };
            }
        }
    };

    for hook in hooks.iter_mut() {
        hook.finish(machine)?;
    }
    info!(?outcome, "run finished");
    Ok(outcome)
}
