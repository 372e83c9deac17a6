//! Net-profit model for a home sale.
//!
//! Inputs are kept as raw display strings, exactly as typed (possibly
//! comma-grouped, possibly empty). Empty means "unset", which is distinct
//! from zero: profit stays unknown until every required field has text.
//! Nothing here validates; unparseable text flows through the arithmetic
//! as NaN so the user can keep editing.
//!
//! Profit is derived on demand from the current inputs, never cached.
//! Every mutation writes the affected key back to the injected store.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::format::parse_formatted;
use crate::store::Store;

/// Whether a stored number is a dollar amount or a percentage of the
/// gross sale price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Dollar,
    Percent,
}

impl FieldKind {
    pub fn toggled(self) -> Self {
        match self {
            FieldKind::Dollar => FieldKind::Percent,
            FieldKind::Percent => FieldKind::Dollar,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            FieldKind::Dollar => "$",
            FieldKind::Percent => "%",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            FieldKind::Dollar => "dollar",
            FieldKind::Percent => "percent",
        }
    }

    fn from_stored(value: &str) -> Self {
        match value {
            "percent" => FieldKind::Percent,
            _ => FieldKind::Dollar,
        }
    }
}

/// A user-defined deduction line. Display order is insertion order; the id
/// only identifies the field for updates and removal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraField {
    pub id: u64,
    pub label: String,
    pub value: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
}

/// Partial update for an extra field; `None` leaves that part alone.
#[derive(Debug, Default)]
pub struct ExtraFieldPatch {
    pub label: Option<String>,
    pub value: Option<String>,
    pub kind: Option<FieldKind>,
}

/// The required and optional inputs a caller can address by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    SalePrice,
    CommissionPct,
    SellerConcessions,
    CurrentMortgageLoan,
    ClosingCosts,
}

const KEY_SALE_PRICE: &str = "salePrice";
const KEY_COMMISSION_PCT: &str = "commissionPct";
const KEY_SELLER_CONCESSIONS: &str = "sellerConcessions";
const KEY_SELLER_CONCESSIONS_TYPE: &str = "sellerConcessionsType";
const KEY_CURRENT_MORTGAGE_LOAN: &str = "currentMortgageLoan";
const KEY_CLOSING_COSTS: &str = "closingCosts";
const KEY_CLOSING_COSTS_TYPE: &str = "closingCostsType";
const KEY_DYNAMIC_FIELDS: &str = "dynamicFields";

pub struct ProfitModel<S: Store> {
    sale_price: String,
    commission_pct: String,
    seller_concessions: String,
    seller_concessions_kind: FieldKind,
    current_mortgage_loan: String,
    closing_costs: String,
    closing_costs_kind: FieldKind,
    extra_fields: Vec<ExtraField>,
    next_field_id: u64,
    store: S,
}

impl<S: Store> ProfitModel<S> {
    /// Restores the previous session from the store; absent keys keep
    /// their defaults (empty text, dollar kind). A malformed extra-field
    /// payload is discarded rather than surfaced.
    pub fn load(store: S) -> Self {
        let text = |key: &str| store.get(key).unwrap_or_default();
        let kind = |key: &str| FieldKind::from_stored(&store.get(key).unwrap_or_default());

        let extra_fields: Vec<ExtraField> = match store.get(KEY_DYNAMIC_FIELDS) {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                warn!("discarding malformed {KEY_DYNAMIC_FIELDS}: {err}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        let next_field_id = extra_fields.iter().map(|f| f.id).max().map_or(1, |id| id + 1);

        Self {
            sale_price: text(KEY_SALE_PRICE),
            commission_pct: text(KEY_COMMISSION_PCT),
            seller_concessions: text(KEY_SELLER_CONCESSIONS),
            seller_concessions_kind: kind(KEY_SELLER_CONCESSIONS_TYPE),
            current_mortgage_loan: text(KEY_CURRENT_MORTGAGE_LOAN),
            closing_costs: text(KEY_CLOSING_COSTS),
            closing_costs_kind: kind(KEY_CLOSING_COSTS_TYPE),
            extra_fields,
            next_field_id,
            store,
        }
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::SalePrice => &self.sale_price,
            Field::CommissionPct => &self.commission_pct,
            Field::SellerConcessions => &self.seller_concessions,
            Field::CurrentMortgageLoan => &self.current_mortgage_loan,
            Field::ClosingCosts => &self.closing_costs,
        }
    }

    /// The kind of an amount-or-percent field; `None` for fields that are
    /// always one unit.
    pub fn kind(&self, field: Field) -> Option<FieldKind> {
        match field {
            Field::SellerConcessions => Some(self.seller_concessions_kind),
            Field::ClosingCosts => Some(self.closing_costs_kind),
            _ => None,
        }
    }

    pub fn extra_fields(&self) -> &[ExtraField] {
        &self.extra_fields
    }

    /// Stores raw field text. Empty text means "unset"; anything else is
    /// kept verbatim, parseable or not.
    pub fn set_field(&mut self, field: Field, text: String) {
        let (slot, key) = match field {
            Field::SalePrice => (&mut self.sale_price, KEY_SALE_PRICE),
            Field::CommissionPct => (&mut self.commission_pct, KEY_COMMISSION_PCT),
            Field::SellerConcessions => (&mut self.seller_concessions, KEY_SELLER_CONCESSIONS),
            Field::CurrentMortgageLoan => {
                (&mut self.current_mortgage_loan, KEY_CURRENT_MORTGAGE_LOAN)
            }
            Field::ClosingCosts => (&mut self.closing_costs, KEY_CLOSING_COSTS),
        };
        *slot = text;
        let value = slot.clone();
        self.store.set(key, &value);
    }

    /// Switches a field between dollar and percent without touching its
    /// text. The digits keep their face value, so the quantity they denote
    /// jumps; that is the expected behavior of the toggle. No-op for
    /// fields without a kind.
    pub fn set_kind(&mut self, field: Field, kind: FieldKind) {
        match field {
            Field::SellerConcessions => {
                self.seller_concessions_kind = kind;
                self.store.set(KEY_SELLER_CONCESSIONS_TYPE, kind.as_str());
            }
            Field::ClosingCosts => {
                self.closing_costs_kind = kind;
                self.store.set(KEY_CLOSING_COSTS_TYPE, kind.as_str());
            }
            _ => {}
        }
    }

    /// Appends an empty extra field and returns its id. Ids are monotonic
    /// and never reused within a session.
    pub fn add_extra_field(&mut self, label: String, kind: FieldKind) -> u64 {
        let id = self.next_field_id;
        self.next_field_id += 1;
        self.extra_fields.push(ExtraField {
            id,
            label,
            value: String::new(),
            kind,
        });
        self.persist_extra_fields();
        id
    }

    /// Applies a partial update to the field with the given id. Silently a
    /// no-op when the id is gone; removals can race edits in the UI.
    pub fn update_extra_field(&mut self, id: u64, patch: ExtraFieldPatch) {
        let Some(field) = self.extra_fields.iter_mut().find(|f| f.id == id) else {
            return;
        };
        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(value) = patch.value {
            field.value = value;
        }
        if let Some(kind) = patch.kind {
            field.kind = kind;
        }
        self.persist_extra_fields();
    }

    /// Removes by id; no-op when absent.
    pub fn remove_extra_field(&mut self, id: u64) {
        let before = self.extra_fields.len();
        self.extra_fields.retain(|f| f.id != id);
        if self.extra_fields.len() != before {
            self.persist_extra_fields();
        }
    }

    fn persist_extra_fields(&mut self) {
        match serde_json::to_string(&self.extra_fields) {
            Ok(json) => self.store.set(KEY_DYNAMIC_FIELDS, &json),
            Err(err) => warn!("could not encode {KEY_DYNAMIC_FIELDS}: {err}"),
        }
    }

    /// Net profit derived from the current inputs, or `None` while any
    /// required field is still empty.
    ///
    /// Concessions, closing costs and extra fields given as percentages
    /// are taken against the gross sale price. The commission alone is
    /// charged on the concession-adjusted price:
    ///
    /// ```text
    /// adjusted   = sale - concessions
    /// commission = adjusted * pct/100
    /// profit     = adjusted - loan - commission - closing - extras
    /// ```
    pub fn profit(&self) -> Option<f64> {
        if self.sale_price.is_empty()
            || self.commission_pct.is_empty()
            || self.current_mortgage_loan.is_empty()
            || self.closing_costs.is_empty()
        {
            return None;
        }

        let sale_price = parse_formatted(&self.sale_price);
        let commission_pct = parse_formatted(&self.commission_pct);
        let loan = parse_formatted(&self.current_mortgage_loan);

        let concessions = resolve(
            &self.seller_concessions,
            self.seller_concessions_kind,
            sale_price,
        );
        let closing = resolve(&self.closing_costs, self.closing_costs_kind, sale_price);
        let extras: f64 = self
            .extra_fields
            .iter()
            .map(|f| resolve(&f.value, f.kind, sale_price))
            .sum();

        let adjusted = sale_price - concessions;
        let commission = adjusted * (commission_pct / 100.0);
        Some(adjusted - loan - commission - closing - extras)
    }
}

/// An empty optional value contributes nothing, whichever unit is selected.
fn resolve(text: &str, kind: FieldKind, sale_price: f64) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    match kind {
        FieldKind::Dollar => parse_formatted(text),
        FieldKind::Percent => sale_price * (parse_formatted(text) / 100.0),
    }
}
