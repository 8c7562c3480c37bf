pub use enclose::*;

/// Builds a [`Computed`](crate::Computed) from a dependency list and a body
/// evaluated against the root model.
///
/// ```
/// use databind::{computed, Value};
///
/// let sum = computed!(["a", "b"] root => Ok(Value::from(root.number("a")? + root.number("b")?)));
/// assert_eq!(sum.dependencies(), ["a", "b"]);
/// ```
#[macro_export]
macro_rules! computed {
    ([ $($dep:expr),* $(,)? ] ( $($d_tt:tt)* ) $root:ident => $($b:tt)*) => {
        $crate::Computed::new(
            {
                let dependencies: ::std::vec::Vec<::std::string::String> = ::std::vec![$( ::std::string::String::from($dep) ),*];
                dependencies
            },
            $crate::macros::enclose!(($( $d_tt )*) move |$root: &$crate::Value| { $($b)* }),
        )
    };
    ([ $($dep:expr),* $(,)? ] $root:ident => $($b:tt)*) => {
        $crate::Computed::new(
            {
                let dependencies: ::std::vec::Vec<::std::string::String> = ::std::vec![$( ::std::string::String::from($dep) ),*];
                dependencies
            },
            move |$root: &$crate::Value| { $($b)* },
        )
    };
}

/// Builds an [`Object`](crate::Object) from `key => value` pairs.
#[macro_export]
macro_rules! object {
    () => {
        $crate::Object::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::Object::new()$(.with($key, $value))+
    };
}

/// Builds an [`Array`](crate::Array) from a list of values.
#[macro_export]
macro_rules! array {
    () => {
        $crate::Array::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Array::new()$(.with($value))+
    };
}
