use super::Dashboard;
use crate::kernel::{Action, Effect};
use crate::ui::backend::MapBackend;

impl<B: MapBackend> Dashboard<B> {
    pub(super) fn dispatch_kernel(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        self.backend.apply_all(result.commands);
        for effect in result.effects {
            self.run_effect(effect);
        }
        result.state_changed
    }

    fn run_effect(&mut self, effect: Effect) {
        tracing::debug!(?effect, "effect");
        self.in_flight += 1;
        self.runtime.run(effect);
    }
}
