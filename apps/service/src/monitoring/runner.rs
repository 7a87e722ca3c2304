use std::sync::Arc;
use std::time::Instant;

use settings::Check;
use tracing::{debug, error};

use super::executor::ProcessExecutor;
use super::parser::NagiosParser;
use super::publisher::Publish;
use super::translator::{self, MAX_MSG_LEN};
use super::types::{PushParams, PushStatus};

/// Runs one check through execute → parse → translate → publish.
///
/// Nothing that happens inside a run escapes it: executor failures become
/// ordinary `down` results, so one broken check can never stall the
/// scheduler or the other checks.
pub struct CheckRunner {
    check: Check,
    publisher: Arc<dyn Publish>,
    started: Option<Instant>,
}

impl CheckRunner {
    pub fn new(check: Check, publisher: Arc<dyn Publish>) -> Self {
        Self { check, publisher, started: None }
    }

    /// Execute the check once and publish the outcome. The published params
    /// are returned for callers that want to inspect them.
    pub async fn run(&mut self) -> PushParams {
        self.lap();
        debug!(id = %self.check.name, "running check");

        let params = match ProcessExecutor::run(&self.check.name, &self.check.executor).await {
            Ok(raw) => {
                // Plugins that die before printing to stdout usually leave
                // the reason on stderr.
                let text = if raw.stdout.is_empty() { &raw.stderr } else { &raw.stdout };
                let parsed = NagiosParser::parse(&self.check.name, raw.exit_code, text);
                let result = translator::translate(&parsed);
                PushParams {
                    id: self.check.name.clone(),
                    status: result.status,
                    msg: translator::shorten(&result.msg, MAX_MSG_LEN),
                    ping: self.lap(),
                }
            }
            Err(exec_error) => {
                error!(id = %self.check.name, error = %exec_error, "error running check");
                PushParams {
                    id: self.check.name.clone(),
                    status: PushStatus::Down,
                    msg: translator::shorten(
                        &format!("Error executing check: {exec_error}"),
                        MAX_MSG_LEN,
                    ),
                    ping: self.lap(),
                }
            }
        };

        self.publisher.publish(&params).await;
        params
    }

    /// Elapsed milliseconds since the previous lap, resetting the marker so
    /// repeated calls measure successive intervals rather than total
    /// runtime. The first lap of a runner has nothing to measure against.
    fn lap(&mut self) -> Option<u64> {
        let elapsed = self.started.map(|started| started.elapsed().as_millis() as u64);
        self.started = Some(Instant::now());
        elapsed
    }
}
