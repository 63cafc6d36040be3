//! Version command implementation.

/// Version line printed by `yaml5 version`.
#[must_use]
pub fn version_line() -> String {
    format!("yaml5 {}", env!("CARGO_PKG_VERSION"))
}

/// Runs the version command.
pub fn run() {
    println!("{}", version_line());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line() {
        let line = version_line();
        assert!(line.starts_with("yaml5 "));
        assert_eq!(line.split_whitespace().count(), 2);
    }
}
