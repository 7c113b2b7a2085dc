use bitflags::bitflags;

/// Code segment selector loaded into a fresh context.
pub(crate) const CODE_SELECTOR: u32 = 0x08;

/// Data/extra/stack segment selector loaded into a fresh context.
pub(crate) const DATA_SELECTOR: u32 = 0x10;

bitflags! {
    /// Bits of the EFLAGS word carried in a context.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct EFlags: u32 {
        /// Bit 1 always reads as set on this frame convention.
        const RESERVED = 0x0002;
        const INTERRUPT_ENABLE = 0x0200;
    }
}

/// Register snapshot of a suspended execution.
///
/// The field order matches the trap-frame convention of the target: segment
/// selectors pushed by the handler first, then the general-purpose registers,
/// then the slots the CPU pushes on the trap itself. The dispatcher treats
/// `eax` as the operation selector on entry and the result field on resume.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Context {
    pub gs: u32,
    pub fs: u32,
    pub es: u32,
    pub ds: u32,
    pub ss: u32,

    pub edi: u32,
    pub esi: u32,
    pub esp: u32,
    pub ebp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,

    pub eip: u32,
    pub cs: u32,
    pub eflags: u32,
}

impl Context {
    /// Builds the frame a process first resumes from: non-system segment
    /// selectors, base pointer at the bottom of the private stack, instruction
    /// pointer at the entry point, interrupts enabled, and every
    /// general-purpose register zeroed.
    pub fn fresh(entry_point: u32, stack_base: u32, stack_top: u32) -> Context {
        Context {
            gs: DATA_SELECTOR,
            fs: DATA_SELECTOR,
            es: DATA_SELECTOR,
            ds: DATA_SELECTOR,
            ss: DATA_SELECTOR,
            edi: 0,
            esi: 0,
            esp: stack_top,
            ebp: stack_base,
            ebx: 0,
            edx: 0,
            ecx: 0,
            eax: 0,
            eip: entry_point,
            cs: CODE_SELECTOR,
            eflags: (EFlags::RESERVED | EFlags::INTERRUPT_ENABLE).bits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_fresh_zeroes_general_purpose_registers() {
        let ctx = Context::fresh(0x1000, 0, 958);

        assert_eq!(ctx.eax, 0);
        assert_eq!(ctx.ebx, 0);
        assert_eq!(ctx.ecx, 0);
        assert_eq!(ctx.edx, 0);
        assert_eq!(ctx.esi, 0);
        assert_eq!(ctx.edi, 0);
    }

    #[test]
    fn test_context_fresh_selectors_and_flags() {
        let ctx = Context::fresh(0x1000, 0, 958);

        assert_eq!(ctx.cs, CODE_SELECTOR);
        assert_eq!(ctx.ds, DATA_SELECTOR);
        assert_eq!(ctx.ss, DATA_SELECTOR);
        assert_eq!(ctx.eflags, 0x0202);
        assert_eq!(ctx.eip, 0x1000);
    }

    #[test]
    fn test_context_layout_is_sixteen_words() {
        assert_eq!(std::mem::size_of::<Context>(), 64);
    }
}
