//! Shorthand for literal statements.

/// Static text: `s!("Hello {name}")`.
#[macro_export]
macro_rules! s {
    ($($arg:tt)*) => {
        $crate::builder::literal::BuilderStatement::Literal(format!($($arg)*))
    };
}

/// An HTML comment: `c!(" note ")`.
#[macro_export]
macro_rules! c {
    ($($arg:tt)*) => {
        $crate::builder::literal::BuilderStatement::Comment(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use crate::builder::literal::{BuilderStatement, NEWLINE};

    #[test]
    fn test_macros_format() {
        let who = "world";
        assert_eq!(s!("hello {who}"), BuilderStatement::Literal("hello world".into()));
        assert_eq!(
            c!("{NEWLINE}x"),
            BuilderStatement::Comment("\nx".into())
        );
    }
}
