/// Asserts that every item of `$expected` occurs in `$content`, in the given order.
///
/// Occurrences may be separated by any other content.
#[macro_export]
macro_rules! assert_contains_inorder {
    ($content:expr, $expected:expr) => {{
        let content: &str = &$content;
        let mut remaining = content;
        for item in $expected {
            let item: &str = item.as_ref();
            match remaining.find(item) {
                Some(index) => remaining = &remaining[index + item.len()..],
                None => panic!(
                    "expected content not found, or out of order. expected: {:?}, content:\n{}",
                    item, content
                ),
            }
        }
    }};
}
