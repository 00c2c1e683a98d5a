fn main() {
    // Embedded by `sqlx::migrate!()`; rebuild when a migration is added
    println!("cargo:rerun-if-changed=migrations");
}
