use std::collections::HashMap;

use super::{Context, Dispatcher, Operation, PcbId, PcbManager, ProcessClass, QueueId};

/// Yield requests each demo process issues before exiting.
const TURNS_PER_PROCESS: u32 = 3;

/// Holds the scheduler state and runs a simulated trap loop over a handful
/// of demo processes.
pub struct Driver {
    pcbs: PcbManager,
    dispatcher: Dispatcher,
}

impl Driver {
    pub fn new() -> Driver {
        Driver {
            pcbs: PcbManager::new(),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn start(&mut self) {
        log::info!("creating demo processes");
        let demo_processes: [(&str, ProcessClass, u8, u32); 4] = [
            ("alpha", ProcessClass::User, 3, 0x1000),
            ("beta", ProcessClass::User, 5, 0x2000),
            ("gamma", ProcessClass::User, 3, 0x3000),
            ("monitor", ProcessClass::System, 0, 0x4000),
        ];

        for (name, class, priority, entry_point) in demo_processes {
            match self.pcbs.setup(name, class, priority) {
                Ok(pcb_id) => {
                    if let Err(err) = self.pcbs.load_context(pcb_id, entry_point) {
                        log::warn!("failed to load context for {:?}: {}", name, err);
                    }
                }
                Err(err) => log::warn!("failed to create {:?}: {}", name, err),
            }
        }

        let turns_taken = self.run();
        log::info!(
            "ready queue drained; {} processes ran to exit",
            turns_taken.len()
        );
    }

    /// Pumps the trap loop from the boot frame until the Ready queue drains:
    /// every resumed process "runs" for a turn and traps again, exiting once
    /// its turns are used up. Returns the turns each process took.
    fn run(&mut self) -> HashMap<PcbId, u32> {
        let mut turns_taken: HashMap<PcbId, u32> = HashMap::new();
        let mut ctx = Context::default();
        ctx.eax = Operation::Idle as u32;

        loop {
            ctx = self.dispatcher.sys_call(&mut self.pcbs, ctx);

            let current = match self.dispatcher.current_process() {
                Some(current) => current,
                None => {
                    if self.pcbs.front(QueueId::Ready).is_none() {
                        break;
                    }
                    // Back on the boot frame with a yielder still parked in
                    // Ready; issue another Idle the way the idle loop does.
                    ctx.eax = Operation::Idle as u32;
                    continue;
                }
            };
            let name = match self.pcbs.pcb(current) {
                Some(pcb) => pcb.name().to_string(),
                None => break,
            };

            let taken = turns_taken.entry(current).or_insert(0);
            *taken += 1;
            let taken = *taken;

            let operation = if taken >= TURNS_PER_PROCESS {
                Operation::Exit
            } else {
                Operation::Idle
            };
            log::info!(
                "{} takes turn {} at eip {:#x}, then requests {:?}",
                name,
                taken,
                ctx.eip,
                operation
            );
            ctx.eax = operation as u32;
        }

        turns_taken
    }
}
