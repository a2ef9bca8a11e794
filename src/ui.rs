/// Console status and error output
///
/// Log output goes to stderr through env_logger; this module owns the few
/// lines a user sees on stdout: the run summary and fatal errors.
use crate::matrix::ReportSummary;
use lazy_static::lazy_static;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

fn status_lock<F>(f: F)
where
    F: FnOnce(),
{
    lazy_static! {
        static ref LOCK: Mutex<()> = Mutex::new(());
    }
    let _guard = LOCK.lock();
    f();
}

/// Print colored text to terminal, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        let Some(mut t) = term::stdout() else {
            return false;
        };
        if t.fg(fg).is_err() {
            return false;
        }
        let _ = t.attr(term::Attr::Bold);
        if write!(t, "{}", s).is_err() {
            return false;
        }
        let _ = t.reset();
        true
    }
}

/// Print a status message with "matrix: " prefix
pub fn status(s: &str) {
    status_lock(|| {
        print!("matrix: ");
        println!("{}", s);
    });
}

/// One-line description of a finished report
pub fn format_summary(summary: &ReportSummary, output: &Path) -> String {
    let mut line = format!(
        "wrote {} ({} results, {} features, {} suites",
        output.display(),
        summary.results,
        summary.features,
        summary.suites
    );
    if summary.failed > 0 {
        line.push_str(&format!(", {} failed", summary.failed));
    }
    if summary.skipped > 0 {
        line.push_str(&format!(", {} unrecognized records skipped", summary.skipped));
    }
    line.push(')');
    line
}

/// Print the run summary, highlighting failures
pub fn print_summary(summary: &ReportSummary, output: &Path) {
    status(&format_summary(summary, output));
    if summary.failed > 0 {
        status_lock(|| {
            print!("matrix: ");
            print_color("FAILED", term::color::BRIGHT_RED);
            println!(" scenarios are highlighted in the results sheet");
        });
    }
}

/// Print an error message with colored "error" prefix
pub fn print_error(msg: &str) {
    println!();
    print_color("error", term::color::BRIGHT_RED);
    println!(": {}", msg);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_summary() {
        let summary = ReportSummary { results: 3, features: 1, suites: 1, failed: 0, skipped: 0 };
        assert_eq!(
            format_summary(&summary, Path::new("out.xlsx")),
            "wrote out.xlsx (3 results, 1 features, 1 suites)"
        );

        let summary = ReportSummary { results: 3, features: 1, suites: 1, failed: 2, skipped: 4 };
        assert_eq!(
            format_summary(&summary, Path::new("out.xlsx")),
            "wrote out.xlsx (3 results, 1 features, 1 suites, 2 failed, 4 unrecognized records skipped)"
        );
    }
}
