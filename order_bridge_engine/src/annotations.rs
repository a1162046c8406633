//! Order annotations
//!
//! The note and tags of an order are the only place the bridge can leave a trace for the people who fulfil it.
use std::fmt::Display;

use log::*;
use shopify_tools::ShopifyOrder;

use crate::{
    tag_ledger::TagLedger,
    traits::{StorefrontApi, StorefrontError},
};

/// Collects note and tag changes for one order so that they can be written back in a single storefront call.
#[derive(Debug, Clone)]
pub struct OrderAnnotation {
    order_id: i64,
    note: String,
    tags: TagLedger,
    changed: bool,
}

impl OrderAnnotation {
    pub fn for_order(order: &ShopifyOrder) -> Self {
        Self {
            order_id: order.id,
            note: order.note.clone().unwrap_or_default(),
            tags: TagLedger::new(&order.tags),
            changed: false,
        }
    }

    pub fn note_text(&self) -> &str {
        self.note.as_str()
    }

    pub fn tags(&self) -> &TagLedger {
        &self.tags
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Adds a line of text to the order note.
    pub fn note(&mut self, text: &str) -> &mut Self {
        self.note = append_note(&self.note, text);
        self.changed = true;
        self
    }

    pub fn tag<T: Display>(&mut self, token: T) -> &mut Self {
        self.tags.append(token);
        self.changed = true;
        self
    }

    pub fn tag_if_absent<T: Display>(&mut self, token: T) -> &mut Self {
        if self.tags.append_if_absent(token) {
            self.changed = true;
        }
        self
    }

    /// Writes the note and tags back to the storefront. Does nothing if no changes were recorded.
    pub async fn apply<S: StorefrontApi>(&self, storefront: &S) -> Result<Option<ShopifyOrder>, StorefrontError> {
        if !self.changed {
            trace!("📝️ No annotations to write for order #{}", self.order_id);
            return Ok(None);
        }
        debug!("📝️ Annotating order #{}. Tags: {}", self.order_id, self.tags);
        storefront.update_order_annotations(self.order_id, &self.note, self.tags.as_str()).await.map(Some)
    }
}

pub fn append_note(note: &str, text: &str) -> String {
    if note.trim().is_empty() {
        text.to_string()
    } else {
        format!("{note}\n{text}")
    }
}

#[cfg(test)]
mod test {
    use shopify_tools::OrderBuilder;

    use super::*;
    use crate::tag_ledger::{LedgerToken, PANEL_ORDER_MARKER};

    #[test]
    fn notes_are_appended_line_by_line() {
        assert_eq!(append_note("", "first"), "first");
        assert_eq!(append_note("first", "second"), "first\nsecond");
    }

    #[test]
    fn annotation_tracks_changes() {
        let mut builder = OrderBuilder::new();
        builder.note("Call ahead".into()).tags("vip".into());
        let order = builder.build();
        let mut annotation = OrderAnnotation::for_order(&order);
        assert!(!annotation.is_changed());
        annotation.tag_if_absent("vip");
        assert!(!annotation.is_changed());
        annotation.tag_if_absent(LedgerToken::Marker(PANEL_ORDER_MARKER)).note("Panel order");
        assert!(annotation.is_changed());
        assert_eq!(annotation.note_text(), "Call ahead\nPanel order");
        assert_eq!(annotation.tags().as_str(), "vip,PANEL_ORDER");
    }
}
