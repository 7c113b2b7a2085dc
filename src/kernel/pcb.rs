use super::Context;

/// Bytes of private stack owned by each process.
pub(crate) const STACK_SIZE: usize = 1024;

/// Longest process name kept as a lookup key.
pub(crate) const NAME_SIZE: usize = 8;

/// Stable arena index identifying a PCB slot.
pub(crate) type PcbId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessClass {
    User,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionState {
    Ready,
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchingState {
    NotSuspended,
    Suspended,
}

/// A process's scheduling record: identity, scheduling attributes, the
/// private stack region, and the link used by whichever queue holds it.
pub(crate) struct Pcb {
    name: String,
    class: ProcessClass,
    pub priority: u8,
    pub execution_state: ExecutionState,
    pub dispatching_state: DispatchingState,
    stack: Box<[u8; STACK_SIZE]>,
    /// Offset into `stack` of the most recently saved context.
    stack_ptr: usize,
    /// Next node in the queue currently holding this PCB.
    pub(super) next: Option<PcbId>,
}

impl Pcb {
    pub fn new(name: &str, class: ProcessClass, priority: u8) -> Pcb {
        let name: String = name.chars().take(NAME_SIZE).collect();

        Pcb {
            name,
            class,
            priority,
            execution_state: ExecutionState::Ready,
            dispatching_state: DispatchingState::NotSuspended,
            stack: Box::new([0; STACK_SIZE]),
            stack_ptr: STACK_SIZE - 2 - std::mem::size_of::<Context>(),
            next: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> ProcessClass {
        self.class
    }

    /// Offset of the saved context within the private stack.
    pub fn stack_ptr(&self) -> usize {
        self.stack_ptr
    }

    /// Reads the context most recently saved at the stack pointer.
    pub fn saved_context(&self) -> Context {
        // The offset leaves the frame unaligned within the byte stack, so the
        // read has to go through an unaligned pointer.
        unsafe {
            let frame = self.stack.as_ptr().add(self.stack_ptr) as *const Context;
            frame.read_unaligned()
        }
    }

    /// Overwrites the saved context at the stack pointer wholesale.
    pub fn save_context(&mut self, ctx: &Context) {
        unsafe {
            let frame = self.stack.as_mut_ptr().add(self.stack_ptr) as *mut Context;
            frame.write_unaligned(*ctx);
        }
    }
}
