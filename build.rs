fn main() {
    println!("cargo:rerun-if-env-changed=TRAFFIC_NODE_CONFIG");

    // ESP-IDF link arguments are only needed for the device build.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
