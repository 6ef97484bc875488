//! Plain text formatter.

use crate::uninject::report::Report;
use colored::Colorize;

/// Format reports as status lines, framed by blank lines so they read
/// cleanly after a manifest printed on the same terminal.
pub fn format(reports: &[Report], color: bool) -> String {
    let mut output = String::from("\n");

    for report in reports.iter().filter(|r| !r.kind.is_empty()) {
        let (marker, status) = if report.uninjected.any() {
            ("✔".green(), "uninjected")
        } else {
            ("‼".yellow(), "skipped")
        };

        if color {
            output.push_str(&format!("{} {} {}\n", marker, report.resource_name(), status));
        } else {
            output.push_str(&format!("{} {}\n", report.resource_name(), status));
        }
    }

    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uninject::report::Uninjected;

    #[test]
    fn test_format_plain() {
        let mut web = Report::new("Deployment", "web");
        web.uninjected = Uninjected {
            proxy: true,
            proxy_init: false,
        };
        let cfg = Report::new("ConfigMap", "settings");
        let anonymous = Report::default();

        let output = format(&[web, cfg, anonymous], false);
        assert_eq!(
            output,
            "\ndeployment \"web\" uninjected\nconfigmap \"settings\" skipped\n\n"
        );
    }

    #[test]
    fn test_format_plain_empty() {
        assert_eq!(format(&[], false), "\n\n");
    }
}
