//! Architecture-specific spin-wait support
//!
//! The queues themselves never wait, so the pause hint lives here for the
//! callers that do: benchmark drivers and tests spinning on a full or empty
//! verdict.

/// Executes a CPU-specific instruction to indicate a spin-wait loop to the CPU
///
/// This helps improve performance in busy-wait loops by:
/// - Potentially reducing power consumption
/// - Avoiding pipeline flushes
/// - Giving priority to other hyper-threads
#[inline(always)]
pub fn spin_loop_pause() {
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    unsafe {
        #[cfg(target_arch = "x86")]
        std::arch::x86::_mm_pause();
        #[cfg(target_arch = "x86_64")]
        std::arch::x86_64::_mm_pause();
    }

    #[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
    unsafe {
        #[cfg(target_feature = "v6")]
        std::arch::asm!("yield");
        #[cfg(not(target_feature = "v6"))]
        std::arch::asm!("nop");
    }

    #[cfg(target_arch = "riscv64")]
    unsafe {
        std::arch::asm!(".insn i 0x0F, 0, x0, x0, 0x010");
    }

    #[cfg(not(any(
        target_arch = "x86",
        target_arch = "x86_64",
        target_arch = "arm",
        target_arch = "aarch64",
        target_arch = "riscv64"
    )))]
    {
        std::hint::spin_loop();
    }
}
