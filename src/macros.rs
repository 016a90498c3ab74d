// src/macros.rs

/// `String` from anything `String: From<_>` accepts; `s!()` is empty.
#[macro_export]
macro_rules! s {
    () => {
        ::std::string::String::new()
    };
    ($expr:expr) => {
        ::std::string::String::from($expr)
    };
}
