#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

#[cfg(all(
    target_os = "none",
    not(any(feature = "pico-spi0", feature = "pico-spi1"))
))]
compile_error!("One of `pico-spi0` or `pico-spi1` must be enabled.");

#[cfg(all(target_os = "none", feature = "pico-spi0", feature = "pico-spi1"))]
compile_error!("Only one of `pico-spi0` or `pico-spi1` can be enabled.");

#[cfg(target_os = "none")]
mod firmware;

#[cfg(not(target_os = "none"))]
fn main() {
    println!("dual_rtouch runs on the RP2040; build it with `cargo firmware`");
}
