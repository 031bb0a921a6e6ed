// Page-ready initialisation: default date for time entry forms and card entrance animation.
use std::sync::Arc;

use chrono::NaiveDate;
use platform::clock::Scheduler;
use platform::config::settings::PageSettings;

use crate::dom::{elements_by_class, Document};
use crate::error::UiError;

pub const CARD_HIDDEN_STYLE: &str = "opacity: 0; transform: translateY(20px)";
pub const CARD_VISIBLE_STYLE: &str = "transition: all 0.5s ease; opacity: 1; transform: translateY(0)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageReport {
    pub date_filled: bool,
    pub cards: usize,
}

pub struct PageInitializer {
    document: Arc<dyn Document>,
    scheduler: Arc<dyn Scheduler>,
    settings: PageSettings,
}

impl PageInitializer {
    pub fn new(document: Arc<dyn Document>, scheduler: Arc<dyn Scheduler>, settings: PageSettings) -> Self {
        Self {
            document,
            scheduler,
            settings,
        }
    }

    pub fn on_ready(&self, today: NaiveDate) -> Result<PageReport, UiError> {
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "Comsulting admin page ready");
        let date_filled = self.fill_date(today)?;
        let cards = self.animate_cards()?;
        Ok(PageReport { date_filled, cards })
    }

    fn fill_date(&self, today: NaiveDate) -> Result<bool, UiError> {
        let Some(field) = self.document.get_element_by_id(&self.settings.date_field_id) else {
            return Ok(false);
        };
        if self.document.value(field).is_some_and(|v| !v.is_empty()) {
            return Ok(false);
        }
        self.document
            .set_value(field, &today.format("%Y-%m-%d").to_string())?;
        Ok(true)
    }

    fn animate_cards(&self) -> Result<usize, UiError> {
        let cards = elements_by_class(
            self.document.as_ref(),
            self.document.body(),
            &self.settings.card_classes,
        );
        let stagger = self.settings.card_stagger();
        for (index, card) in cards.iter().copied().enumerate() {
            self.document.set_attribute(card, "style", CARD_HIDDEN_STYLE)?;
            let document = Arc::clone(&self.document);
            self.scheduler.schedule(
                stagger * index as u32,
                Box::new(move || {
                    if let Err(e) = document.set_attribute(card, "style", CARD_VISIBLE_STYLE) {
                        tracing::warn!(error = %e, "Could not reveal card");
                    }
                }),
            );
        }
        Ok(cards.len())
    }
}
