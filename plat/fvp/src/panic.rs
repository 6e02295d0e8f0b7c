#[panic_handler]
pub fn panic_handler(info: &core::panic::PanicInfo<'_>) -> ! {
    error!("EL3: {}", info);
    halt()
}

pub fn halt() -> ! {
    loop {
        aarch64_cpu::asm::wfe();
    }
}
