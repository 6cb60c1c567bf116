//! Modal widgets.
//!
//! While the session has modal widgets, only they and their descendants
//! receive pointer events. A button press outside every modal widget asks
//! them to release ([`Ui::reset_modal`]); each may decline through
//! [`Widget::release_modal`](super::Widget::release_modal).

use trellis_core::logging::targets;

use super::{Ui, WidgetId};

impl Ui {
    /// Replace the modal set.
    pub fn set_modal(&mut self, ids: &[WidgetId]) {
        self.session.modal = ids.iter().copied().filter(|id| self.contains(*id)).collect();
        tracing::debug!(target: targets::EVENT, modal = ?self.session.modal, "modal set replaced");
    }

    /// Add a widget to the modal set.
    pub fn add_modal(&mut self, id: WidgetId) {
        if self.contains(id) && !self.session.modal.contains(&id) {
            self.session.modal.push(id);
        }
    }

    /// Whether a widget is modal.
    pub fn is_modal(&self, id: WidgetId) -> bool {
        self.session.modal.contains(&id)
    }

    /// Remove a widget from the modal set unconditionally. Returns whether
    /// it was modal.
    pub fn release_modal(&mut self, id: WidgetId) -> bool {
        let before = self.session.modal.len();
        self.session.modal.retain(|m| *m != id);
        before != self.session.modal.len()
    }

    /// Ask every modal widget to release. Widgets that decline stay modal.
    /// Returns whether the modal set is empty afterwards.
    pub fn reset_modal(&mut self) -> bool {
        let modal = std::mem::take(&mut self.session.modal);
        for id in modal {
            let released = self.with_widget(id, |w, cx| w.release_modal(cx)).unwrap_or(true);
            if !released && self.contains(id) {
                tracing::trace!(target: targets::EVENT, ?id, "modal widget declined release");
                self.session.modal.push(id);
            }
        }
        self.session.modal.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::UiConfig;
    use crate::widget::attributes::WIDGET_ATTRS;
    use crate::widget::context::WidgetCx;
    use crate::widget::traits::Widget;
    use crate::widget::widgets::Spacer;
    use crate::widget::Ui;
    use trellis_core::{AttrMap, AttributeTable};

    struct Sticky;

    impl Widget for Sticky {
        fn attributes(&self) -> &'static AttributeTable {
            &WIDGET_ATTRS
        }

        fn release_modal(&mut self, _cx: &mut WidgetCx<'_>) -> bool {
            false
        }
    }

    #[test]
    fn test_reset_modal_respects_declines() {
        let mut ui = Ui::new(UiConfig::default());
        let plain = ui.spawn(Spacer, AttrMap::new()).unwrap();
        let sticky = ui.spawn(Sticky, AttrMap::new()).unwrap();
        ui.set_modal(&[plain, sticky]);
        assert!(!ui.reset_modal());
        assert!(!ui.is_modal(plain));
        assert!(ui.is_modal(sticky));

        assert!(ui.release_modal(sticky));
        assert!(!ui.release_modal(sticky));
        assert!(ui.session().modal().is_empty());
    }

    #[test]
    fn test_add_modal_dedupes() {
        let mut ui = Ui::new(UiConfig::default());
        let w = ui.spawn(Spacer, AttrMap::new()).unwrap();
        ui.add_modal(w);
        ui.add_modal(w);
        assert_eq!(ui.session().modal(), &[w]);
        ui.destroy(w).unwrap();
        assert!(ui.session().modal().is_empty());
    }
}
