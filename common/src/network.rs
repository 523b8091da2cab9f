pub mod bss;
pub mod mac;
pub mod ssid;
