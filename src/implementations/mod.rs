pub mod safe;

#[path = "unsafe"]
pub mod unsafe_impl {
    pub mod barrier_unsafe;
}
