mod atomic;

pub(crate) use atomic::{atomic_write, read_optional};
