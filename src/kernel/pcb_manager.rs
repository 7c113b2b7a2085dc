use super::{Context, DispatchingState, ExecutionState, KernelError, Pcb, PcbId, ProcessClass};

/// Number of PCB slots available for allocation.
pub(crate) const MAX_PCBS: usize = 32;

/// Most urgent priority is 0; least urgent is 9.
pub(crate) const MAX_PRIORITY: u8 = 9;

/// The four queues a PCB can belong to. Ready and Suspended-Ready are
/// priority ordered; Blocked and Suspended-Blocked are strict FIFO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QueueId {
    Ready,
    Blocked,
    SuspendedReady,
    SuspendedBlocked,
}

impl QueueId {
    /// Queue scan order used by `find` and `remove`.
    pub const SEARCH_ORDER: [QueueId; 4] = [
        QueueId::Ready,
        QueueId::Blocked,
        QueueId::SuspendedReady,
        QueueId::SuspendedBlocked,
    ];

    /// The one queue a PCB belongs in, determined by its state pair.
    pub fn for_pcb(pcb: &Pcb) -> QueueId {
        match (pcb.execution_state, pcb.dispatching_state) {
            (ExecutionState::Ready, DispatchingState::NotSuspended) => QueueId::Ready,
            (ExecutionState::Blocked, DispatchingState::NotSuspended) => QueueId::Blocked,
            (ExecutionState::Ready, DispatchingState::Suspended) => QueueId::SuspendedReady,
            (ExecutionState::Blocked, DispatchingState::Suspended) => QueueId::SuspendedBlocked,
        }
    }

    fn is_priority_ordered(self) -> bool {
        matches!(self, QueueId::Ready | QueueId::SuspendedReady)
    }
}

/// A singly linked, front-accessible queue of PCB slots.
struct Queue {
    front: Option<PcbId>,
}

/// Registry owning the PCB arena and the four queue singletons.
///
/// PCBs live in fixed slots and queues link them by slot index, so a PCB can
/// sit in exactly one queue at a time through its single next link.
pub(crate) struct PcbManager {
    slots: Vec<Option<Pcb>>,
    queues: [Queue; 4],
}

impl PcbManager {
    pub fn new() -> PcbManager {
        let mut slots = Vec::new();
        slots.resize_with(MAX_PCBS, || None);

        PcbManager {
            slots,
            queues: [
                Queue { front: None },
                Queue { front: None },
                Queue { front: None },
                Queue { front: None },
            ],
        }
    }

    /// Reserves a slot for the PCB. Fails when every slot is taken.
    pub fn allocate(&mut self, pcb: Pcb) -> Result<PcbId, KernelError> {
        let pcb_id = self
            .slots
            .iter()
            .position(|slot| slot.is_none())
            .ok_or(KernelError::OutOfMemory)?;

        self.slots[pcb_id] = Some(pcb);
        Ok(pcb_id)
    }

    /// Allocates and initializes a new PCB and inserts it into Ready.
    pub fn setup(
        &mut self,
        name: &str,
        class: ProcessClass,
        priority: u8,
    ) -> Result<PcbId, KernelError> {
        if priority > MAX_PRIORITY {
            return Err(KernelError::InvalidPriority);
        }

        let pcb_id = self.allocate(Pcb::new(name, class, priority))?;
        self.insert(pcb_id)?;

        log::info!(
            "created process {:?} ({:?}, priority {})",
            self.slot(pcb_id).name(),
            self.slot(pcb_id).class(),
            priority
        );
        Ok(pcb_id)
    }

    /// Looks a PCB up by name, scanning Ready, then Blocked, then
    /// Suspended-Ready, then Suspended-Blocked.
    pub fn find(&self, name: &str) -> Option<PcbId> {
        for queue_id in QueueId::SEARCH_ORDER {
            let mut current = self.queues[queue_id as usize].front;

            while let Some(pcb_id) = current {
                if self.slot(pcb_id).name() == name {
                    return Some(pcb_id);
                }
                current = self.slot(pcb_id).next;
            }
        }
        None
    }

    /// Inserts the PCB into the one queue its state pair routes it to.
    pub fn insert(&mut self, pcb_id: PcbId) -> Result<(), KernelError> {
        let (queue_id, priority) = {
            let pcb = self.pcb(pcb_id).ok_or(KernelError::NullArgument)?;
            (QueueId::for_pcb(pcb), pcb.priority)
        };

        if queue_id.is_priority_ordered() {
            self.insert_by_priority(queue_id, pcb_id, priority);
        } else {
            self.append(queue_id, pcb_id);
        }

        log::debug!("inserted {:?} into {:?}", self.slot(pcb_id).name(), queue_id);
        Ok(())
    }

    /// Unlinks the PCB from whichever queue holds it.
    pub fn remove(&mut self, pcb_id: PcbId) -> Result<(), KernelError> {
        self.pcb(pcb_id).ok_or(KernelError::NullArgument)?;

        for queue_id in QueueId::SEARCH_ORDER {
            let queue = queue_id as usize;
            let mut prev: Option<PcbId> = None;
            let mut current = self.queues[queue].front;

            while let Some(id) = current {
                if id == pcb_id {
                    let next = self.slot(id).next;
                    match prev {
                        Some(prev) => self.slot_mut(prev).next = next,
                        None => self.queues[queue].front = next,
                    }
                    self.slot_mut(id).next = None;

                    log::debug!("removed {:?} from {:?}", self.slot(id).name(), queue_id);
                    return Ok(());
                }
                prev = current;
                current = self.slot(id).next;
            }
        }

        Err(KernelError::NotFound)
    }

    /// Updates a PCB's priority. A PCB whose execution state is Ready is
    /// re-sorted into its priority queue, suspended or not; a Blocked PCB
    /// only has the stored value changed, since FIFO queues never reorder.
    pub fn set_priority(&mut self, name: &str, new_priority: u8) -> Result<(), KernelError> {
        let pcb_id = self.find(name).ok_or(KernelError::NotFound)?;

        if new_priority > MAX_PRIORITY {
            return Err(KernelError::InvalidPriority);
        }

        if self.slot(pcb_id).execution_state == ExecutionState::Ready {
            self.remove(pcb_id)?;
            self.slot_mut(pcb_id).priority = new_priority;
            self.insert(pcb_id)?;
        } else {
            self.slot_mut(pcb_id).priority = new_priority;
        }

        Ok(())
    }

    /// Releases the PCB's slot and stack storage.
    ///
    /// The caller must have removed the PCB from its queue first; freeing a
    /// still-queued PCB leaves a stale link behind.
    pub fn free(&mut self, pcb_id: PcbId) -> Result<(), KernelError> {
        let slot = self
            .slots
            .get_mut(pcb_id)
            .ok_or(KernelError::NullArgument)?;

        match slot.take() {
            Some(pcb) => {
                log::info!("freed process {:?}", pcb.name());
                Ok(())
            }
            None => Err(KernelError::NullArgument),
        }
    }

    /// Writes the frame the process will first resume from at the PCB's
    /// stack pointer.
    pub fn load_context(&mut self, pcb_id: PcbId, entry_point: u32) -> Result<(), KernelError> {
        let pcb = self.pcb_mut(pcb_id).ok_or(KernelError::NullArgument)?;

        let ctx = Context::fresh(entry_point, 0, pcb.stack_ptr() as u32);
        pcb.save_context(&ctx);
        Ok(())
    }

    pub fn front(&self, queue_id: QueueId) -> Option<PcbId> {
        self.queues[queue_id as usize].front
    }

    /// Queue contents in link order, for callers that display or verify them.
    pub fn queue_pcbs(&self, queue_id: QueueId) -> Vec<PcbId> {
        let mut pcb_ids = Vec::new();
        let mut current = self.queues[queue_id as usize].front;

        while let Some(pcb_id) = current {
            pcb_ids.push(pcb_id);
            current = self.slot(pcb_id).next;
        }

        pcb_ids
    }

    pub fn pcb(&self, pcb_id: PcbId) -> Option<&Pcb> {
        self.slots.get(pcb_id).and_then(|slot| slot.as_ref())
    }

    pub fn pcb_mut(&mut self, pcb_id: PcbId) -> Option<&mut Pcb> {
        self.slots.get_mut(pcb_id).and_then(|slot| slot.as_mut())
    }

    fn slot(&self, pcb_id: PcbId) -> &Pcb {
        self.slots[pcb_id].as_ref().expect("stale PCB link")
    }

    fn slot_mut(&mut self, pcb_id: PcbId) -> &mut Pcb {
        self.slots[pcb_id].as_mut().expect("stale PCB link")
    }

    /// Ordered insert: the new entry goes immediately before the first entry
    /// whose priority is strictly greater, so equal-priority entries keep
    /// their relative insertion order.
    fn insert_by_priority(&mut self, queue_id: QueueId, pcb_id: PcbId, priority: u8) {
        let queue = queue_id as usize;

        match self.queues[queue].front {
            None => {
                self.slot_mut(pcb_id).next = None;
                self.queues[queue].front = Some(pcb_id);
            }
            Some(front) if self.slot(front).priority > priority => {
                self.slot_mut(pcb_id).next = Some(front);
                self.queues[queue].front = Some(pcb_id);
            }
            Some(front) => {
                let mut current = front;
                while let Some(next) = self.slot(current).next {
                    if self.slot(next).priority > priority {
                        break;
                    }
                    current = next;
                }

                let tail = self.slot(current).next;
                self.slot_mut(pcb_id).next = tail;
                self.slot_mut(current).next = Some(pcb_id);
            }
        }
    }

    /// FIFO insert: always appended at the tail.
    fn append(&mut self, queue_id: QueueId, pcb_id: PcbId) {
        let queue = queue_id as usize;
        self.slot_mut(pcb_id).next = None;

        match self.queues[queue].front {
            None => self.queues[queue].front = Some(pcb_id),
            Some(front) => {
                let mut current = front;
                while let Some(next) = self.slot(current).next {
                    current = next;
                }
                self.slot_mut(current).next = Some(pcb_id);
            }
        }
    }
}
