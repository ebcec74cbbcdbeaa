//! Argument group construction macros.

/// Build a list of argument groups from bracketed values.
///
/// Each bracketed list becomes one group; every value is converted with
/// [`Value::from`](crate::Value).
///
/// ```rust
/// use sqlmerge_query::{args, Value};
///
/// let groups = args![[1], ["RU", "EN"]];
/// assert_eq!(groups.len(), 2);
/// assert_eq!(groups[1], vec![Value::from("RU"), Value::from("EN")]);
///
/// let none = args![];
/// assert!(none.is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::value::ArgumentGroup>::new()
    };
    ($([$($value:expr),* $(,)?]),+ $(,)?) => {{
        let groups: ::std::vec::Vec<$crate::value::ArgumentGroup> = ::std::vec![
            $(::std::vec![$($crate::value::Value::from($value)),*]),+
        ];
        groups
    }};
}

#[cfg(test)]
mod tests {
    use crate::value::Value;

    #[test]
    fn test_args_macro() {
        let groups = args![[1, 2], [], ["x"], [Some(true), None::<bool>]];
        assert_eq!(groups.len(), 4);
        assert_eq!(groups[0], vec![Value::Int(1), Value::Int(2)]);
        assert!(groups[1].is_empty());
        assert_eq!(groups[3], vec![Value::Bool(true), Value::Null]);
    }
}
