pub mod aggregator;
pub mod classifier;
pub mod extractor;
pub mod ledger;
pub mod years;

pub use aggregator::summarize;
pub use classifier::{default_regions, CountryClassifier};
pub use ledger::{resolve_slot, DayLedger, InsertOutcome, SlotUpdate};
pub use years::parse_years;
