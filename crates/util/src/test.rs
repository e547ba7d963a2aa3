use std::ffi::OsString;
use std::path::PathBuf;

use predicates::function::{function, FnPredicate};
use tempfile::TempDir;

/// A predicate that always passes, printing the value it was given.
///
/// Useful to show a command's output when a test fails.
pub fn print(label: &str) -> FnPredicate<impl Fn(&str) -> bool, str> {
    let label = label.to_string();
    function(move |content: &str| {
        println!("{}:\n{}", label, content);
        true
    })
}

/// Splits each argument on spaces, so that `"--trace trace.log"` becomes two arguments.
pub fn prepare_args(args: Vec<&str>) -> Vec<String> {
    args.iter()
        .flat_map(|arg| arg.split(' '))
        .filter(|arg| !arg.is_empty())
        .map(str::to_string)
        .collect()
}

/// Builds the path of a file named `<name>.<extension>` inside `temp_dir`.
///
/// Returns the full path and the file name, the file itself is not created.
pub fn build_temp_file(temp_dir: &TempDir, name: &str, extension: &str) -> (PathBuf, OsString) {
    let mut path = temp_dir.path().to_path_buf();
    path.push(format!("{}.{}", name, extension));

    let file_name = path
        .file_name()
        .map(|file_name| file_name.to_os_string())
        .unwrap_or_default();

    (path, file_name)
}

#[cfg(test)]
mod tests {
    use predicates::Predicate;

    use super::*;

    #[test]
    fn prepare_args_splits_on_spaces() {
        assert_eq!(
            prepare_args(vec!["--trace trace.log", "-vvv", "divide"]),
            vec!["--trace", "trace.log", "-vvv", "divide"]
        );
    }

    #[test]
    fn print_always_passes() {
        assert!(print("stdout").eval("anything"));
    }

    #[test]
    fn temp_file_is_inside_temp_dir() {
        // given
        let temp_dir = tempfile::tempdir().unwrap();

        // when
        let (path, file_name) = build_temp_file(&temp_dir, "trace", "log");

        // then
        assert_eq!(file_name, OsString::from("trace.log"));
        assert_eq!(path.parent(), Some(temp_dir.path()));
    }
}
