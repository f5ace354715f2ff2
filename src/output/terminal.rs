// Colored terminal output for verdicts and logs.
//
// main.rs display calls delegate here so the CLI commands stay short.

use colored::Colorize;

use crate::moderation::{Disposition, ModerationOutcome, ModerationPolicy};
use crate::scoring::{RegistrationCandidate, ScoreBreakdown};

/// Display a score breakdown and the decision it leads to.
pub fn display_verdict(
    candidate: &RegistrationCandidate,
    score: &ScoreBreakdown,
    outcome: ModerationOutcome,
    disposition: Option<Disposition>,
    policy: &ModerationPolicy,
) {
    println!(
        "\n{}",
        format!("=== {} <{}> ===", candidate.username, candidate.email).bold()
    );
    println!(
        "  Spam score: {}  (threshold {:.2})",
        colorize_score(score.score, policy.spam_threshold),
        policy.spam_threshold
    );

    if score.signals.is_empty() {
        println!("  Signals: {}", "none".dimmed());
    } else {
        println!("  Signals:");
        for signal in &score.signals {
            println!("    +{:.1}  {}", signal.weight(), signal);
        }
    }

    println!("  Classifier: {}", classifier_summary(score));

    println!("  Decision: {}", colorize_outcome(outcome));
    if let Some(disposition) = disposition {
        println!("  Account: {}", disposition);
    }
}

/// Display log lines (already newest-first) with a heading.
pub fn display_log(title: &str, lines: &[String], empty_message: &str) {
    println!("\n{}", format!("=== {title} ===").bold());
    if lines.is_empty() {
        println!("  {}", empty_message.dimmed());
        return;
    }
    for line in lines {
        println!("  {}", super::truncate_chars(line, 160));
    }
}

/// One-line summary of the classifier's part in a score.
pub fn classifier_summary(score: &ScoreBreakdown) -> String {
    match (score.classifier_consulted, score.classifier_likelihood) {
        (false, _) => "not consulted".dimmed().to_string(),
        (true, Some(likelihood)) => {
            format!("{likelihood:.2} ({} tokens)", score.classifier_tokens)
        }
        (true, None) => "unavailable (request failed, no signal)".yellow().to_string(),
    }
}

fn colorize_score(score: f64, threshold: f64) -> colored::ColoredString {
    let text = format!("{score:.2}");
    if score >= threshold {
        text.red().bold()
    } else if score >= threshold / 2.0 {
        text.yellow()
    } else {
        text.green()
    }
}

fn colorize_outcome(outcome: ModerationOutcome) -> colored::ColoredString {
    match outcome {
        ModerationOutcome::Allow => "allow".green(),
        ModerationOutcome::Delete => "delete".red().bold(),
        ModerationOutcome::Quarantine => "quarantine".yellow().bold(),
    }
}
