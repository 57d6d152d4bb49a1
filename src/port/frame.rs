//! Initial task frame synthesis
//!
//! Builds the register image PendSV expects to find on a suspended task's
//! stack. Plain pointer writes only, so it also runs on the host.
//!
//! Layout from the saved stack pointer upwards:
//!
//! ```text
//! sp ->  R4 R5 R6 R7 R8 R9 R10 R11      saved/restored by PendSV
//!        R0 R1 R2 R3 R12 LR PC xPSR     stacked by exception entry
//! ```

use crate::task::OsTaskFn;
use crate::types::OsStkElement;

/// Initial xPSR: Thumb state bit set
pub const INITIAL_XPSR: u32 = 0x0100_0000;

/// EXC_RETURN: return to Thread mode, use PSP, basic frame
pub const EXC_RETURN_THREAD_PSP: u32 = 0xFFFF_FFFD;

/// General-purpose register slots zeroed in a fresh frame (R0-R12)
pub const FRAME_GP_REGS: usize = 13;

/// Words in a full stacked context
pub const CTX_FRAME_WORDS: usize = 16;

/// Context structure stored on stack
#[repr(C, align(4))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtxFrame {
    pub r4: u32,
    pub r5: u32,
    pub r6: u32,
    pub r7: u32,
    pub r8: u32,
    pub r9: u32,
    pub r10: u32,
    pub r11: u32,
    pub r0: u32,
    pub r1: u32,
    pub r2: u32,
    pub r3: u32,
    pub r12: u32,
    pub lr: u32,
    pub pc: u32,
    pub xpsr: u32,
}

const _: () = assert!(core::mem::size_of::<CtxFrame>() == CTX_FRAME_WORDS * 4);

impl CtxFrame {
    /// Frame that resumes into `task_fn` with every GP register cleared
    pub fn initial(task_fn: OsTaskFn) -> Self {
        CtxFrame {
            r4: 0,
            r5: 0,
            r6: 0,
            r7: 0,
            r8: 0,
            r9: 0,
            r10: 0,
            r11: 0,
            r0: 0,
            r1: 0,
            r2: 0,
            r3: 0,
            r12: 0,
            lr: EXC_RETURN_THREAD_PSP,
            pc: task_fn as usize as u32,
            xpsr: INITIAL_XPSR,
        }
    }

    /// R0-R12 in register order
    pub fn gp_regs(&self) -> [u32; FRAME_GP_REGS] {
        [
            self.r0, self.r1, self.r2, self.r3, self.r4, self.r5, self.r6,
            self.r7, self.r8, self.r9, self.r10, self.r11, self.r12,
        ]
    }
}

/// Initialize task stack
///
/// Writes the initial frame just below `stk_top` (rounded down to 8 bytes)
/// and returns the new stack pointer, which addresses the R4 slot.
///
/// # Safety
/// `stk_top` must be one past the end of a writable region of at least
/// `CTX_FRAME_WORDS + 1` words owned by the task.
pub unsafe fn os_task_stk_init(
    task_fn: OsTaskFn,
    stk_top: *mut OsStkElement,
) -> *mut OsStkElement {
    let stk_aligned = ((stk_top as usize) & !7) as *mut OsStkElement;

    unsafe {
        let frame_ptr = stk_aligned.sub(CTX_FRAME_WORDS) as *mut CtxFrame;
        frame_ptr.write(CtxFrame::initial(task_fn));
        frame_ptr as *mut OsStkElement
    }
}

/// Decode the frame at a saved stack pointer
///
/// # Safety
/// `sp` must point at a full context written by [`os_task_stk_init`] or by
/// PendSV.
pub unsafe fn frame_at(sp: *const OsStkElement) -> CtxFrame {
    unsafe { (sp as *const CtxFrame).read() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spin() -> ! {
        loop {}
    }

    #[repr(C, align(8))]
    struct Stk([OsStkElement; 64]);

    #[test]
    fn test_frame_layout() {
        let mut stk = Stk([0xA5A5_A5A5; 64]);
        let top = stk.0.as_mut_ptr_range().end;

        let sp = unsafe { os_task_stk_init(spin, top) };
        assert_eq!(unsafe { top.offset_from(sp) }, CTX_FRAME_WORDS as isize);

        let frame = unsafe { frame_at(sp) };
        assert_eq!(frame.xpsr, INITIAL_XPSR);
        assert_eq!(frame.pc, spin as OsTaskFn as usize as u32);
        assert_eq!(frame.lr, EXC_RETURN_THREAD_PSP);
        assert_eq!(frame.gp_regs(), [0; FRAME_GP_REGS]);

        // Words below the frame are untouched
        assert_eq!(stk.0[64 - CTX_FRAME_WORDS - 1], 0xA5A5_A5A5);
    }

    #[test]
    fn test_frame_word_order() {
        let mut stk = Stk([0; 64]);
        let top = stk.0.as_mut_ptr_range().end;
        unsafe { os_task_stk_init(spin, top) };

        // Walking down from the top: xPSR, PC, LR, then 13 zero slots
        assert_eq!(stk.0[63], INITIAL_XPSR);
        assert_eq!(stk.0[62], spin as OsTaskFn as usize as u32);
        assert_eq!(stk.0[61], EXC_RETURN_THREAD_PSP);
        assert!(stk.0[48..61].iter().all(|&w| w == 0));
    }

    #[test]
    fn test_exc_return_selects_basic_frame() {
        // Bit 4 set: no FP state on the stack. Bits 3:2: Thread mode, PSP.
        assert_ne!(EXC_RETURN_THREAD_PSP & 0x10, 0);
        assert_eq!(EXC_RETURN_THREAD_PSP & 0x0C, 0x0C);
        assert_eq!(CTX_FRAME_WORDS, 8 + 8);
        assert_eq!(core::mem::size_of::<CtxFrame>(), CTX_FRAME_WORDS * 4);
    }

    #[test]
    fn test_unaligned_top_rounds_down() {
        let mut stk = Stk([0; 64]);
        // One word below an 8-byte boundary
        let top = unsafe { stk.0.as_mut_ptr().add(63) };

        let sp = unsafe { os_task_stk_init(spin, top) };
        assert_eq!(sp as usize % 8, 0);
        assert_eq!(sp, unsafe { stk.0.as_mut_ptr().add(62 - CTX_FRAME_WORDS) });
    }
}
