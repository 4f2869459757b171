use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::Dashboard;
use crate::kernel::services::adapters::AppMessage;
use crate::kernel::Action;
use crate::ui::backend::MapBackend;

impl<B: MapBackend> Dashboard<B> {
    /// Called by the main loop: applies finished requests, buffers log
    /// lines, and fires the weight debounce once its quiet period is over.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        changed |= self.poll_messages();
        changed |= self.poll_logs();
        changed |= self.dispatch_kernel(Action::Tick { now });
        changed
    }

    /// Blocks until every started request has answered. Returns `false` if
    /// `timeout` elapsed first.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            match self.rx.recv_timeout(remaining) {
                Ok(message) => {
                    self.receive(message);
                }
                Err(_) => return false,
            }
        }
        true
    }

    fn receive(&mut self, message: AppMessage) -> bool {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.dispatch_kernel(message.into_action())
    }

    fn poll_messages(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..super::MAX_MESSAGE_DRAIN_PER_TICK {
            match self.rx.try_recv() {
                Ok(message) => changed |= self.receive(message),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    tracing::warn!("runtime message channel closed");
                    break;
                }
            }
        }
        changed
    }

    fn poll_logs(&mut self) -> bool {
        let Some(rx) = self.log_rx.take() else {
            return false;
        };

        let mut changed = false;
        let mut drained = 0usize;
        let mut disconnected = false;

        loop {
            match rx.try_recv() {
                Ok(line) => {
                    changed = true;
                    drained += 1;
                    self.logs.push_back(line);
                    while self.logs.len() > super::LOG_BUFFER_CAP {
                        self.logs.pop_front();
                    }
                    if drained >= super::MAX_LOG_DRAIN_PER_TICK {
                        break;
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if !disconnected {
            self.log_rx = Some(rx);
        }

        changed
    }
}
