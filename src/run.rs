//! Run controller
//!
//! One run draws an assignment, optionally emails it and reports the draw
//! count. More than one run is statistics mode: emails are never sent and only
//! the aggregate draw counts and elapsed time are reported.

use std::io::Write;
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::assign::{Assigner, Assignment};
use crate::config::SantaConfig;
use crate::notify::{Mailer, Notifier};
use crate::stats::RunStatistics;
use crate::SantaError;

/// What a call to [`run`] did
#[derive(Debug, Clone)]
pub enum RunReport {
    Single {
        assignment: Assignment,
        emails_sent: usize,
    },
    Multi {
        statistics: RunStatistics,
        elapsed: Duration,
    },
}

/// Execute the configured number of runs, writing the report to `out`.
///
/// `started` is when the process began; the multi-run "Time taken" line is
/// measured from it, so config loading is included.
///
/// Emails go out only in single-run mode with `send_email` set, and only
/// through `mailer` when one is supplied. The first transport failure aborts
/// the run.
pub fn run<R, W>(
    config: &SantaConfig,
    rng: &mut R,
    mailer: Option<&mut dyn Mailer>,
    started: Instant,
    out: &mut W,
) -> Result<RunReport, SantaError>
where
    R: Rng + ?Sized,
    W: Write,
{
    let runs = config.general.runs;
    let debug_output = config.general.debug;

    if debug_output {
        writeln!(out, "Debug output on")?;
        writeln!(out, "Sending emails: {}", config.email.send_email)?;
        writeln!(out, "Number of runs: {runs}")?;
    }

    let mut assigner = Assigner::new(config.participants.keys().cloned())?;
    info!(
        participants = assigner.participants(),
        runs, "drawing assignments"
    );

    if runs > 1 {
        if config.email.send_email {
            warn!(runs, "email sending disabled for multi-run statistics");
        }

        let mut statistics = RunStatistics::default();
        for _ in 0..runs {
            statistics.observe(assigner.count_draws(rng));
        }
        let elapsed = started.elapsed();

        writeln!(out, "Total number of runs    : {}", statistics.runs)?;
        writeln!(out, "Average number of draws : {:?}", statistics.average_draws())?;
        writeln!(out, "Maximum number of draws : {}", statistics.max_draws)?;
        writeln!(out, "Time taken              : {:.2}s", elapsed.as_secs_f64())?;

        return Ok(RunReport::Multi {
            statistics,
            elapsed,
        });
    }

    let assignment = assigner.draw(rng);
    debug!(draws = assignment.draws(), "assignment drawn");

    let emails_sent = match mailer {
        Some(mailer) if config.sending_enabled() => {
            Notifier::new(config, mailer).notify_all(&assignment)?
        }
        _ => 0,
    };

    if debug_output {
        for line in assignment.summary_lines() {
            writeln!(out, "{line}")?;
        }
    }

    writeln!(
        out,
        "All done! It took {} draws to get a result",
        assignment.draws()
    )?;

    Ok(RunReport::Single {
        assignment,
        emails_sent,
    })
}
