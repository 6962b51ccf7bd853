use tabella_core::resolve::{ProbeAttempt, ProbeOutcome, ResolveReport};

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
pub fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
pub fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

/// One line per probe: green for the match, red for everything else.
pub fn print_attempts(report: &ResolveReport) {
    for attempt in &report.attempts {
        println!("{}", attempt_line(attempt));
    }
}

fn attempt_line(attempt: &ProbeAttempt) -> String {
    let label = format!("{:<12}", attempt.label);
    match &attempt.outcome {
        ProbeOutcome::Matched(id) => format!("  {label} {}", green(&format!("match: {id}"))),
        ProbeOutcome::Mismatch(value) => {
            format!("  {label} {}", red(&format!("no match: '{value}'")))
        }
        ProbeOutcome::Empty => format!("  {label} {}", red("empty")),
        ProbeOutcome::Miss(reason) => format!("  {label} {} {}", red("miss"), dim(reason)),
    }
}
