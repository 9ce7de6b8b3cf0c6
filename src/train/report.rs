//! Console report of one epoch

use super::history::EpochStats;
use crate::generative::LossBreakdown;

const RULE_WIDTH: usize = 65;

fn row(component: &str, losses: &LossBreakdown) -> String {
    format!(
        "{component:<22} | {:<4.2} | {:<15.4} | {:<5.4}",
        losses.loss, losses.generation_loss, losses.auxiliary_loss
    )
}

/// Loss table of one epoch
///
/// ```text
/// component              | loss | generation_loss | auxiliary_loss
/// -----------------------------------------------------------------
/// generator (train)      | 1.23 | 0.8000          | 0.4300
/// ```
pub fn format_epoch_report(stats: &EpochStats) -> String {
    [
        format!("{:<22} | {:<4} | {:<15} | {:<5}", "component", "loss", "generation_loss", "auxiliary_loss"),
        "-".repeat(RULE_WIDTH),
        row("generator (train)", &stats.generator_train),
        row("generator (test)", &stats.generator_test),
        row("discriminator (train)", &stats.discriminator_train),
        row("discriminator (test)", &stats.discriminator_test),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_layout() {
        let losses = LossBreakdown::new(0.8, 0.43);
        let stats = EpochStats {
            epoch: 1,
            generator_train: losses,
            discriminator_train: losses,
            generator_test: losses,
            discriminator_test: LossBreakdown::new(f32::NAN, 0.1),
            accuracy: 0.5,
        };

        let report = format_epoch_report(&stats);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("component              | loss | generation_loss | auxiliary_loss"));
        assert_eq!(lines[1].len(), RULE_WIDTH);
        assert_eq!(lines[2], "generator (train)      | 1.23 | 0.8000          | 0.4300");
        assert!(lines[5].starts_with("discriminator (test)"));
        assert!(lines[5].contains("NaN"));
    }
}
