use super::{Context, ExecutionState, KernelError, PcbId, PcbManager, QueueId};

/// Success value written into the result field of every resumed context.
pub(crate) const RESULT_OK: u32 = 0;

/// Error value written into the requesting frame on an unsupported operation.
pub(crate) const RESULT_ERROR: u32 = u32::MAX;

/// Operation selector carried in the `eax` register of a trap request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub(crate) enum Operation {
    Read = 0,
    Write = 1,
    Idle = 2,
    Exit = 3,
}

impl Operation {
    fn from_raw(value: u32) -> Result<Operation, KernelError> {
        match value {
            0 => Ok(Operation::Read),
            1 => Ok(Operation::Write),
            2 => Ok(Operation::Idle),
            3 => Ok(Operation::Exit),
            _ => Err(KernelError::Unsupported),
        }
    }
}

/// Trap entry point: hands the CPU off between processes on a voluntary
/// yield or exit request.
pub(crate) struct Dispatcher {
    current_process: Option<PcbId>,
    /// Fallback frame resumed when nothing is Ready; captured on the first
    /// Idle request and consumed exactly once.
    initial_context: Option<Context>,
    /// Set when the yielding process still has to be re-queued. Insertion is
    /// deferred until after the next selection so a solitary Ready process
    /// gets a turn ahead of the yielder being placed back.
    reinsert_pending: bool,
}

impl Dispatcher {
    pub fn new() -> Dispatcher {
        Dispatcher {
            current_process: None,
            initial_context: None,
            reinsert_pending: false,
        }
    }

    pub fn current_process(&self) -> Option<PcbId> {
        self.current_process
    }

    /// Handles one trap. The operation selector is read out of the captured
    /// context's `eax`; Idle and Exit engage scheduling, anything else is
    /// rejected in place without touching queue state. Returns the context
    /// the caller's trap-return mechanism loads next.
    pub fn sys_call(&mut self, pcbs: &mut PcbManager, mut ctx: Context) -> Context {
        match Operation::from_raw(ctx.eax) {
            Ok(Operation::Idle) => {
                if self.initial_context.is_none() {
                    self.initial_context = Some(ctx);
                }

                if let Some(current) = self.current_process {
                    let pcb = pcbs.pcb_mut(current).expect("current process has no PCB");
                    pcb.execution_state = ExecutionState::Ready;
                    pcb.save_context(&ctx);
                    self.reinsert_pending = true;
                }
            }
            Ok(Operation::Exit) => {
                if let Some(current) = self.current_process.take() {
                    // The running process was unlinked when it was selected,
                    // so this remove normally reports NotFound.
                    let _ = pcbs.remove(current);
                    if let Err(err) = pcbs.free(current) {
                        log::warn!("exit could not free current process: {}", err);
                    }
                }
            }
            Ok(Operation::Read) | Ok(Operation::Write) | Err(_) => {
                // Read, write and unrecognized codes belong to collaborators;
                // report failure in the requesting frame and change nothing.
                log::debug!("rejecting trap request {}: {}", ctx.eax, KernelError::Unsupported);
                ctx.eax = RESULT_ERROR;
                return ctx;
            }
        }

        let previous = self.current_process;
        let next = pcbs.front(QueueId::Ready);

        let mut resume = match next {
            Some(next) => {
                pcbs.remove(next).expect("front of ready queue not linked");
                pcbs.pcb(next).expect("selected process has no PCB").saved_context()
            }
            // Nothing is ready: fall back to the remembered initial frame,
            // clearing it until a future Idle recaptures one.
            None => self.initial_context.take().unwrap_or(ctx),
        };

        // Re-queue the yielder only after the selection above.
        if self.reinsert_pending {
            if let Some(previous) = previous {
                pcbs.insert(previous).expect("yielding process vanished");
            }
            self.reinsert_pending = false;
        }

        self.current_process = next;
        if let Some(next) = next {
            log::debug!(
                "dispatching {:?} at eip {:#x}",
                pcbs.pcb(next).expect("selected process has no PCB").name(),
                resume.eip
            );
        } else {
            log::debug!("ready queue empty, resuming initial context");
        }

        // The requester observes this outcome only at its next resumption.
        resume.eax = RESULT_OK;
        resume
    }
}
