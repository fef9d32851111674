/// Build a value from its [Default], overriding the named fields
#[macro_export]
macro_rules! new_t {
    ($t:ty, $($k:ident = $v:expr),+ $(,)?) => {{
        let mut c = <$t>::default();
        $(c.$k = $v;)+
        c
    }};
}

/// Stamp out one `test_<name>_<type>` per listed type, with `T` aliased to that type
/// inside the body. A leading attribute such as `#[should_panic(...)]` lands on every test
#[macro_export]
macro_rules! test_t {
    (#[$attr:meta] $name:ident[T: $($impl:ty)|*]() $body:tt) => {$(
        ::paste::paste! {
            #[test]
            #[$attr]
            fn [<test_ $name _ $impl:snake>]() {
                type T = $impl;
                $body
            }
        }
    )+};
    ($name:ident[T: $($impl:ty)|*]() $body:tt) => {$(
        ::paste::paste! {
            #[test]
            fn [<test_ $name _ $impl:snake>]() {
                type T = $impl;
                $body
            }
        }
    )+};
}

/// Compare two f64s to within 1e-9, optionally naming what was compared
#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr $(, $what:expr)?) => {{
        let (l, r): (f64, f64) = ($l, $r);
        let what = String::new() $(+ &format!(" ({})", $what))?;
        assert!((l - r).abs() < 1e-9, "assertion failed: {l} !~ {r}{what}");
    }};
}
