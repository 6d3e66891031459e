use std::time::Duration;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::event::Event;
use crate::http::fetcher::FragmentSource;

/// Periodic fetch loop. Runs on its own task for the lifetime of the UI.
///
/// The first tick fires one `period` after start because the shell fetches
/// once before launching the loop. On start it sends `Event::Scheduled` with
/// the first deadline. Each tick sends `Event::Fetching` carrying the next
/// deadline, awaits the fetch and sends `Event::Fetched`; the next tick is not
/// taken until that completes, and late ticks are delayed rather than bursted.
///
/// A message on `refresh_rx` triggers an immediate fetch and restarts the
/// period. Requests that arrive while a fetch is running are dropped. The
/// loop returns when `cancel` fires or the UI drops its receiver.
pub async fn run<S: FragmentSource>(
    source: S,
    period: Duration,
    tx: UnboundedSender<Event>,
    mut refresh_rx: UnboundedReceiver<()>,
    cancel: CancellationToken,
) {
    info!(period = %humantime::format_duration(period), "scheduler started");

    let first_tick = Instant::now() + period;
    let mut interval = time::interval_at(first_tick, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if tx.send(Event::Scheduled(first_tick.into_std())).is_err() {
        return;
    }

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => debug!("tick"),
            Some(()) = refresh_rx.recv() => {
                debug!("manual refresh");
                interval.reset();
            }
        }

        // Both a fired tick and `reset` put the next deadline one period out.
        let next_tick = (Instant::now() + period).into_std();
        if tx.send(Event::Fetching { next_tick }).is_err() {
            break;
        }

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = source.fetch() => result,
        };

        // A refresh pressed during this fetch is already satisfied by it.
        while refresh_rx.try_recv().is_ok() {}

        if tx.send(Event::Fetched(result)).is_err() {
            break;
        }
    }

    info!("scheduler stopped");
}
