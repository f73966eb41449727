// Interface adapters: wire protocol and console I/O.

pub mod console;
pub mod protocol;
