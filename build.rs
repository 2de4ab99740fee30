fn main() {
    println!("cargo:rerun-if-env-changed=DOORLOCK_SECRET");
    println!("cargo:rerun-if-env-changed=DOORLOCK_CONFIG_JSON");
    println!("cargo:rerun-if-env-changed=DOORLOCK_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=DOORLOCK_WIFI_PASS");

    // ESP-IDF environment is only needed for the on-target binary.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
